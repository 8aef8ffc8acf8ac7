//! Session HTTP handlers.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
    http::StatusCode,
};
use serde::Deserialize;

use crate::{
    AppState, Error,
    document::DocumentSummary,
    session::{
        Debouncer,
        controller::{SessionController, SessionInfo},
        lock_session,
    },
};

/// The state needed for the session handlers.
#[derive(Debug, Clone)]
pub struct SessionHandlerState {
    /// The open document.
    pub session: Arc<Mutex<SessionController>>,
    /// Delays renames sent while the name is being typed.
    pub rename_debouncer: Arc<Debouncer>,
}

impl FromRef<AppState> for SessionHandlerState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            session: state.session.clone(),
            rename_debouncer: state.rename_debouncer.clone(),
        }
    }
}

/// The request body for renaming the open document.
#[derive(Debug, Deserialize)]
pub struct RenameForm {
    /// The new name, blank names use the default name.
    #[serde(default)]
    pub name: String,
}

/// Describe the open document.
pub async fn get_session(
    State(state): State<SessionHandlerState>,
) -> Result<Json<SessionInfo>, Error> {
    Ok(Json(lock_session(&state.session)?.info()))
}

/// Save the open document under its current name.
pub async fn save_session(
    State(state): State<SessionHandlerState>,
) -> Result<Json<DocumentSummary>, Error> {
    lock_session(&state.session)?.save().map(Json)
}

/// Rename the open document immediately.
///
/// Any rename still waiting in the debouncer is dropped so that it cannot
/// overwrite this one.
pub async fn rename_session(
    State(state): State<SessionHandlerState>,
    Json(form): Json<RenameForm>,
) -> Result<Json<SessionInfo>, Error> {
    state.rename_debouncer.cancel();

    let mut session = lock_session(&state.session)?;
    session.rename(&form.name)?;

    Ok(Json(session.info()))
}

/// Rename the open document once the name has stopped changing.
///
/// Responds straight away with `202 Accepted`; only the last name received
/// within the debounce delay is applied.
pub async fn rename_session_input(
    State(state): State<SessionHandlerState>,
    Json(form): Json<RenameForm>,
) -> StatusCode {
    let session = state.session.clone();

    state.rename_debouncer.schedule(async move {
        let result = lock_session(&session).and_then(|mut session| session.rename(&form.name));

        if let Err(error) = result {
            tracing::error!("Could not rename the open document: {error}");
        }
    });

    StatusCode::ACCEPTED
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{Arc, Mutex},
        time::Duration,
    };

    use axum::{Json, extract::State, http::StatusCode};
    use rusqlite::Connection;

    use crate::{
        Error,
        db::initialize,
        document::DocumentRepository,
        session::{
            Debouncer, SessionController, SessionState,
            handlers::{
                RenameForm, SessionHandlerState, get_session, rename_session,
                rename_session_input, save_session,
            },
        },
        storage::LocalStorage,
    };

    const DELAY: Duration = Duration::from_millis(500);

    fn get_test_state() -> SessionHandlerState {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        let storage = LocalStorage::new(Arc::new(Mutex::new(conn)));
        let session = SessionController::new(DocumentRepository::new(storage.clone()), storage);

        SessionHandlerState {
            session: Arc::new(Mutex::new(session)),
            rename_debouncer: Arc::new(Debouncer::new(DELAY)),
        }
    }

    fn rename_form(name: &str) -> Json<RenameForm> {
        Json(RenameForm {
            name: name.to_owned(),
        })
    }

    #[tokio::test]
    async fn get_session_when_unloaded() {
        let state = get_test_state();

        let Json(info) = get_session(State(state)).await.unwrap();

        assert_eq!(info.state, SessionState::Unloaded);
        assert_eq!(info.current_file, None);
    }

    #[tokio::test]
    async fn save_without_open_document_fails() {
        let state = get_test_state();

        let result = save_session(State(state)).await;

        assert_eq!(result.unwrap_err(), Error::NoOpenDocument);
    }

    #[tokio::test]
    async fn save_session_writes_the_document() {
        let state = get_test_state();
        state.session.lock().unwrap().open_new("ledger").unwrap();

        let Json(summary) = save_session(State(state)).await.unwrap();

        assert_eq!(summary.name, "ledger");
    }

    #[tokio::test]
    async fn rename_session_applies_immediately() {
        let state = get_test_state();
        state.session.lock().unwrap().open_new("ledger").unwrap();

        let Json(info) = rename_session(State(state), rename_form("  Budget  "))
            .await
            .unwrap();

        assert_eq!(info.current_file.as_deref(), Some("Budget"));
    }

    #[tokio::test(start_paused = true)]
    async fn rename_input_applies_the_last_name_after_the_delay() {
        let state = get_test_state();
        state.session.lock().unwrap().open_new("ledger").unwrap();

        for name in ["B", "Bu", "Bud"] {
            let status = rename_session_input(State(state.clone()), rename_form(name)).await;
            assert_eq!(status, StatusCode::ACCEPTED);
        }
        assert_eq!(state.session.lock().unwrap().current_file(), Some("ledger"));

        tokio::time::sleep(DELAY * 2).await;

        assert_eq!(state.session.lock().unwrap().current_file(), Some("Bud"));
    }

    #[tokio::test(start_paused = true)]
    async fn immediate_rename_cancels_pending_input() {
        let state = get_test_state();
        state.session.lock().unwrap().open_new("ledger").unwrap();

        rename_session_input(State(state.clone()), rename_form("typing")).await;
        rename_session(State(state.clone()), rename_form("final"))
            .await
            .unwrap();
        tokio::time::sleep(DELAY * 2).await;

        assert_eq!(state.session.lock().unwrap().current_file(), Some("final"));
    }
}
