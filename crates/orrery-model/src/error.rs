//! Error types for orrery-model.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("body has a non-finite mass, position, or velocity component")]
    NonFiniteBody,

    #[error("negative mass: {0}")]
    NegativeMass(f64),

    #[error("active count {n_active} exceeds body count {n}")]
    ActiveCountOutOfRange { n_active: usize, n: usize },
}

pub type Result<T> = std::result::Result<T, ModelError>;
