#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unsupported game: {0}")]
    UnsupportedGame(String),

    #[error("unsupported base build {0}")]
    UnsupportedBaseBuild(u32),

    #[error("archive has no {0} section")]
    MissingSection(&'static str),

    #[error("unexpected end of data")]
    UnexpectedEof,

    #[error("unexpected type tag: expected {expected}, got {actual}")]
    UnexpectedTag { expected: u8, actual: u8 },

    #[error("unknown type tag {0}")]
    UnknownTag(u8),

    #[error("missing field: {0}")]
    MissingField(String),

    #[error("invalid value for {field}: {value}")]
    InvalidValue { field: &'static str, value: String },

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(String),
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
