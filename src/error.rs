use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Failures surfaced by archive streams and their platform sources.
#[derive(Debug, Error)]
pub enum Error {
    /// The identifier could not be resolved to a platform stream.
    #[error("failed to open archive `{name}`: {source}")]
    Open {
        name: String,
        #[source]
        source: std::io::Error,
    },

    /// The identifier names something outside the asset root.
    #[error("invalid archive name `{0}`")]
    InvalidName(String),

    /// The platform stream reported a negative or otherwise unusable length.
    #[error("could not determine length of archive `{name}` (platform reported {reported})")]
    SizeQuery { name: String, reported: i64 },

    /// A platform read or seek failed, as opposed to reaching end of stream.
    #[error("I/O error on archive `{name}`: {message}")]
    Io { name: String, message: String },

    #[error("seek to {offset} is past end of file (length {length})")]
    PastEndOfFile { offset: u64, length: u64 },

    /// Re-opening or re-positioning a duplicate failed.
    #[error("failed to duplicate archive `{name}`")]
    Duplicate {
        name: String,
        #[source]
        source: Box<Error>,
    },

    #[error("archive streams are read-only")]
    ReadOnly,

    #[error("nothing is mounted at `{0}`")]
    NotMounted(String),
}

impl Error {
    pub(crate) fn io(name: &str, message: impl Into<String>) -> Self {
        Error::Io {
            name: name.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn duplicate(name: &str, source: Error) -> Self {
        Error::Duplicate {
            name: name.to_string(),
            source: Box::new(source),
        }
    }

    /// Map onto the closest `std::io::ErrorKind`, for `std::io` interop.
    pub fn into_io_error(self) -> std::io::Error {
        use std::io::ErrorKind;

        let kind = match &self {
            Error::Open { source, .. } => source.kind(),
            Error::InvalidName(_) | Error::PastEndOfFile { .. } => ErrorKind::InvalidInput,
            Error::ReadOnly => ErrorKind::Unsupported,
            Error::NotMounted(_) => ErrorKind::NotFound,
            Error::SizeQuery { .. } | Error::Io { .. } | Error::Duplicate { .. } => {
                ErrorKind::Other
            }
        };
        std::io::Error::new(kind, self)
    }
}
