use std::path::PathBuf;

/// error type for bench operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("cannot walk directory {path}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unknown origin: {0}")]
    UnknownOrigin(String),

    #[error("no source given and none recorded in the local manifest")]
    NoSource,

    #[error("invalid origin url {url}: {message}")]
    InvalidUrl { url: String, message: String },

    #[error("http request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("unsafe path in manifest: {0}")]
    UnsafePath(String),

    #[error("config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("invalid config value for {key}: {value}")]
    InvalidConfigValue { key: &'static str, value: String },

    #[error("logging setup failed: {0}")]
    Logging(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// helper to wrap io errors with path context
pub trait IoResultExt<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|source| Error::Io {
            path: path.into(),
            source,
        })
    }
}

impl Error {
    /// true when the error is an io error of kind NotFound
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound)
    }
}
