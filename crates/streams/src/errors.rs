#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    #[error("Chunk size must be at least 1, got {0}")]
    InvalidChunkSize(usize),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
