use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("reading {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("'{0}' is not an IPv4 or IPv6 address")]
    InvalidAddress(String),
    #[error("buffer length {len} exceeds the {max} byte limit")]
    BufferTooLarge { len: usize, max: usize },
    #[error("fixture set {} has no cases", path.display())]
    EmptyFixture { path: PathBuf },
    #[error("{failed} of {total} fixture cases failed")]
    VerificationFailed { failed: usize, total: usize },
}
