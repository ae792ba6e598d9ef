use pixels_datatype::error::Error as DataTypeError;
use std::array::TryFromSliceError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("invalid argument")]
    InvalidArgument,
    #[error("invalid state")]
    InvalidState,
    #[error("Invalid format")]
    InvalidFormat,
    #[error("IO Error")]
    IOError,
    #[error("Data type not supported")]
    DataTypeNotSupported,
    #[error("Invalid datatype")]
    InvalidDatatype,
    #[error("invalid config {key}={value}")]
    InvalidConfig { key: String, value: String },
    #[error("missing config {0}")]
    MissingConfig(String),
    #[error("column writer already closed")]
    WriterClosed,
    #[error("{0}")]
    DataType(#[from] DataTypeError),
}

impl Error {
    #[inline]
    pub fn invalid_config(key: &str, value: impl Into<String>) -> Self {
        Error::InvalidConfig {
            key: key.to_string(),
            value: value.into(),
        }
    }
}

impl From<TryFromSliceError> for Error {
    #[inline]
    fn from(_src: TryFromSliceError) -> Error {
        Error::InvalidFormat
    }
}

impl From<std::io::Error> for Error {
    #[inline]
    fn from(_src: std::io::Error) -> Self {
        Error::IOError
    }
}

impl From<toml::de::Error> for Error {
    #[inline]
    fn from(_src: toml::de::Error) -> Self {
        Error::InvalidFormat
    }
}
