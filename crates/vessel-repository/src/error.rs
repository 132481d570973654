#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("could not open database at {path}")]
    Open {
        path: String,
        #[source]
        source: rusqlite::Error,
    },

    #[error("schema migration failed")]
    Schema(#[source] rusqlite::Error),

    #[error("repository worker thread panicked")]
    WorkerPanicked(#[source] tokio::task::JoinError),
}
