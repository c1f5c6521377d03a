//! Error types for Parley.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ParleyError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Directory scan error: {0}")]
    Walk(#[from] walkdir::Error),
}
