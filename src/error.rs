use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors from loading configuration or the job store.
///
/// The salary engine itself never fails; these only surface at the edges.
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("RON parse error: {0}")]
    Ron(#[from] ron::error::SpannedError),

    #[error("RON write error: {0}")]
    RonWrite(#[from] ron::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}
