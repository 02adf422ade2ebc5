use thiserror::Error;

/// Configuration loading failures.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("file error: {0}")]
    FileError(String),

    #[error("YAML parse error in {path}: {source}")]
    ParseError { path: String, source: serde_yaml::Error },

    #[error("configuration file {0} does not contain a mapping at its root")]
    NotAMapping(String),
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::FileError(err.to_string())
    }
}
