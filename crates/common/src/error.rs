use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShareMathError {
    #[error("Arithmetic overflow")]
    ArithmeticOverflow,
    #[error("Invalid vault state: {0}")]
    InvalidState(String),
}
