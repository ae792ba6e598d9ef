use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("invalid type name: {0}")]
    InvalidTypeName(String),
    #[error("invalid decimal precision({0}) or scale({1})")]
    InvalidDecimal(u8, u8),
    #[error("invalid length of type: {0}")]
    InvalidLength(String),
}
