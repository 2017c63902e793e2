use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("Invalid limit_type: {0}. Must be pos, atm, or ecom")]
    InvalidLimitType(String),
}
