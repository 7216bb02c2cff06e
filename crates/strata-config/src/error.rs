use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error(
        "Missing configuration key '{0}'.\n\
        Set it in the stack file (strata.json) or export STRATA_CONFIG_{1}"
    )]
    MissingKey(String, String),

    #[error("Invalid stack file {path}: {message}")]
    InvalidStackFile {
        path: std::path::PathBuf,
        message: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConfigError {
    pub(crate) fn missing(key: &str) -> Self {
        Self::MissingKey(key.to_string(), key.to_uppercase())
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;
