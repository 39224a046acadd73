use crate::codec::CodecError;
use crate::names::NameError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LibraryError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Front matter error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid name: {0}")]
    Name(#[from] NameError),

    #[error("Undecodable basename: {0}")]
    Undecodable(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Api Error: {0}")]
    Api(String),
}

impl From<CodecError> for LibraryError {
    fn from(err: CodecError) -> Self {
        LibraryError::Undecodable(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, LibraryError>;
