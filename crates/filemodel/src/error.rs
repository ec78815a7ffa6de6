#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    #[error("binary search requires an active sorter")]
    NoSorter,

    #[error("invalid search range: start {start} is past end {end}")]
    InvalidRange { start: usize, end: usize },

    #[error("search range end {end} is out of bounds for {len} rows")]
    OutOfBounds { end: usize, len: usize },
}

pub type Result<T> = std::result::Result<T, ModelError>;
