use std::path::PathBuf;
use thiserror::Error;

/// This type represents all possible errors in kvfile lib.
#[derive(Error, Debug)]
pub enum Error {
    /// The backing file is missing (`key` is `None`), or the file exists
    /// but does not hold `key`.
    #[error("{} not found in {}", .key.as_deref().unwrap_or("data file"), .path.display())]
    NotFound {
        path: PathBuf,
        key: Option<String>,
    },
    /// `set` was given NaN or an infinity, which the value model cannot hold.
    #[error("Non-finite float in value of {0}")]
    NonFiniteFloat(String),
    #[error("Unknown format: {0}")]
    UnknownFormat(String),
    #[error("IO: {0}")]
    IO(#[from] std::io::Error),
    #[error("Serde_json: {0}")]
    SerdeJson(#[from] serde_json::Error),
    #[error("Msgpack encode: {0}")]
    MsgpackEncode(#[from] rmp_serde::encode::Error),
    #[error("Msgpack decode: {0}")]
    MsgpackDecode(#[from] rmp_serde::decode::Error),
}

impl Error {
    /// Returns true for the `NotFound` kind, whether the file or the key was missing.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }
}


/// Alias for a Result with the error type kvfile::Error
pub type Result<T> = std::result::Result<T, crate::Error>;
