use thiserror::Error;

pub type CoreResult<T> = Result<T, CoreError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Index out of bounds: {what} (index={index}, len={len})")]
    IndexOob {
        what: &'static str,
        index: usize,
        len: usize,
    },
}

/// Check `index < len`, naming the collection in the error.
pub fn ensure_index(index: usize, len: usize, what: &'static str) -> CoreResult<usize> {
    if index < len {
        Ok(index)
    } else {
        Err(CoreError::IndexOob { what, index, len })
    }
}
