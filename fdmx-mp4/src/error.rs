use thiserror::Error;

/// The errors that may occur while parsing boxes or demuxing data.
#[derive(Debug, Error)]
pub enum Error {
    /// Not enough bytes were left in the box to read a field.
    #[error("cannot read {0}")]
    Read(String),

    /// A field was read but holds a value that cannot be used.
    #[error("{0}")]
    Invalid(String),

    /// A string field is not valid UTF-8.
    #[error("cannot decode {field} as utf-8 string")]
    Decode {
        field: &'static str,
        #[source]
        source: std::str::Utf8Error,
    },

    /// The requested operation is not implemented by this demuxer.
    #[error("{0}")]
    Unsupported(String),
}

impl Error {
    /// Returns true if the error was caused by truncated input.
    pub fn is_read_err(&self) -> bool {
        matches!(self, Self::Read(_))
    }

    /// Returns true if the error reports an unsupported operation.
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::Unsupported(_))
    }
}

/// A `Result` alias where the `Err` case is `fdmx_mp4::Error`.
pub type Result<T> = std::result::Result<T, Error>;

#[macro_export]
#[doc(hidden)]
macro_rules! err {
    ($($arg:tt)*) => {
        $crate::Error::Invalid(format!($($arg)*))
    };
}

#[macro_export]
#[doc(hidden)]
macro_rules! bail {
    ($($arg:tt)*) => {
        return Err($crate::err!($($arg)*))
    };
}
