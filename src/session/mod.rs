//! The open document.
//!
//! This module contains:
//! - The session controller binding the open document to the transaction store
//! - A debouncer for delaying renames while a name is being typed
//! - Route handlers for inspecting, saving and renaming the open document

use std::sync::{Mutex, MutexGuard};

use crate::Error;

mod controller;
mod debounce;
mod handlers;

pub use controller::{SessionController, SessionInfo, SessionState};
pub use debounce::Debouncer;
pub use handlers::{get_session, rename_session, rename_session_input, save_session};

/// Lock the session, logging and mapping a poisoned lock to an [Error].
pub(crate) fn lock_session(
    session: &Mutex<SessionController>,
) -> Result<MutexGuard<'_, SessionController>, Error> {
    session
        .lock()
        .inspect_err(|error| tracing::error!("Could not acquire session lock: {error}"))
        .map_err(|_| Error::LockPoisoned)
}
