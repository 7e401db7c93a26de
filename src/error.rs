use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Input rejected before any packing starts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("sheet dimensions must be non-zero, got {length}x{width}")]
    InvalidSheet { length: u32, width: u32 },

    #[error("board '{id}' has invalid dimensions {length}x{width}, both must be non-zero")]
    InvalidPiece { id: String, length: u32, width: u32 },
}
