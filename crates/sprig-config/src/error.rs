#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid config key: {0}")]
    InvalidKey(String),

    #[error("bad config line {line} in {file}: {message}")]
    Parse {
        file: String,
        line: usize,
        message: String,
    },

    #[error("bad boolean config value '{value}' for '{key}'")]
    InvalidBool { key: String, value: String },

    #[error("bad numeric config value '{value}' for '{key}'")]
    InvalidInt { key: String, value: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Lock(#[from] sprig_utils::UtilError),
}
