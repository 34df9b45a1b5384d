pub mod error;
pub mod pda;
pub mod share_math;

pub use error::ShareMathError;
