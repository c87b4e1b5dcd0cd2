use derive_more::{Display, From};

/// Failure talking to the durable key-value store.
///
/// None of these are fatal: the in-memory roster stays authoritative and the
/// error is only logged and surfaced through `Roster::flush`.
#[derive(Debug, Display, From)]
pub enum StoreError {
    #[display(fmt = "storage backend error: {}", _0)]
    Backend(sqlx::Error),

    #[display(fmt = "serialization error: {}", _0)]
    Serialization(serde_json::Error),

    #[display(fmt = "persistence writer is no longer running")]
    #[from(ignore)]
    WriterClosed,

    #[display(fmt = "no tokio runtime is running")]
    #[from(ignore)]
    NoRuntime,
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Backend(e) => Some(e),
            StoreError::Serialization(e) => Some(e),
            StoreError::WriterClosed | StoreError::NoRuntime => None,
        }
    }
}
