//! Runtime settings for the ledger.

use std::time::Duration;

/// The default delay before a rename sent while typing is applied.
pub const DEFAULT_RENAME_DEBOUNCE: Duration = Duration::from_millis(1000);

/// Settings that control the behaviour of the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerConfig {
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    ///
    /// Used to work out today's date for quick-add transactions.
    pub local_timezone: String,

    /// How long a rename sent while typing waits for the next one before it
    /// is applied.
    pub rename_debounce: Duration,

    /// The maximum number of bytes the local storage may hold, `None` for no
    /// limit.
    pub storage_quota: Option<usize>,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            local_timezone: "UTC".to_owned(),
            rename_debounce: DEFAULT_RENAME_DEBOUNCE,
            storage_quota: None,
        }
    }
}
