use std::io;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum Error {
    // Wire format
    #[error("insufficient data for base length type")]
    ErrBaseLen,
    #[error("insufficient data for calculated length type")]
    ErrCalcLen,
    #[error("segment length too long")]
    ErrSegTooLong,
    /// The decoded, dotted form of a name would not fit the caller's limit.
    #[error("name exceeds maximum decoded length")]
    ErrNameTooLong,
    #[error("too many pointers")]
    ErrTooManyPtr,
    #[error("invalid pointer")]
    ErrInvalidPtr,
    /// A label length byte used one of the reserved `01`/`10` prefixes.
    #[error("reserved label type")]
    ErrReservedLabel,
    #[error("insufficient data for resource body length")]
    ErrResourceLen,
    #[error("resource length too long")]
    ErrResTooLong,
    #[error("character string exceeds maximum length (255)")]
    ErrStringTooLong,
    #[error("parsing/packing of this section has completed")]
    ErrSectionDone,
    #[error("parsing/packing of this type isn't available yet")]
    ErrNotStarted,
    #[error("nil resource body")]
    ErrNilResourceBody,
    #[error("too many Questions to pack (>65535)")]
    ErrTooManyQuestions,
    #[error("too many Answers to pack (>65535)")]
    ErrTooManyAnswers,
    #[error("too many Authorities to pack (>65535)")]
    ErrTooManyAuthorities,
    #[error("too many Additionals to pack (>65535)")]
    ErrTooManyAdditionals,

    // Session
    #[error("session already started")]
    ErrSessionStarted,
    /// ErrSessionTerminated indicates an input delivered after the session
    /// reached a terminal state.
    #[error("session already terminated")]
    ErrSessionTerminated,

    // Transport
    /// ErrConnectionClosed indicates an operation executed on a transport
    /// that is not open.
    #[error("connection closed")]
    ErrConnectionClosed,
    #[error("short write: sent {actual} of {expected} bytes")]
    ErrShortWrite { expected: usize, actual: usize },

    //Third Party Error
    #[error("{0}")]
    Io(#[source] IoError),
}

impl Error {
    /// Reports whether the error came from decoding or encoding the wire
    /// format, as opposed to session misuse or the transport.
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            Error::ErrBaseLen
                | Error::ErrCalcLen
                | Error::ErrSegTooLong
                | Error::ErrNameTooLong
                | Error::ErrTooManyPtr
                | Error::ErrInvalidPtr
                | Error::ErrReservedLabel
                | Error::ErrResourceLen
                | Error::ErrResTooLong
                | Error::ErrStringTooLong
                | Error::ErrSectionDone
                | Error::ErrNotStarted
                | Error::ErrNilResourceBody
                | Error::ErrTooManyQuestions
                | Error::ErrTooManyAnswers
                | Error::ErrTooManyAuthorities
                | Error::ErrTooManyAdditionals
        )
    }
}

#[derive(Debug, Error)]
#[error("io error: {0}")]
pub struct IoError(#[from] pub io::Error);

// Workaround for wanting PartialEq for io::Error.
impl PartialEq for IoError {
    fn eq(&self, other: &Self) -> bool {
        self.0.kind() == other.0.kind()
    }
}

// io::Error is not Clone; keep the kind and the message.
impl Clone for IoError {
    fn clone(&self) -> Self {
        IoError(io::Error::new(self.0.kind(), self.0.to_string()))
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::Io(IoError(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_compares_by_kind() {
        let a: Error = io::Error::new(io::ErrorKind::WouldBlock, "a").into();
        let b: Error = io::Error::new(io::ErrorKind::WouldBlock, "b").into();
        let c: Error = io::Error::new(io::ErrorKind::NotFound, "c").into();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_io_error_clone_keeps_kind() {
        let a: Error = io::Error::new(io::ErrorKind::AddrInUse, "busy").into();
        let b = a.clone();
        assert_eq!(a, b);
        assert_eq!(b.to_string(), "io error: busy");
    }

    #[test]
    fn test_is_format_error() {
        assert!(Error::ErrTooManyPtr.is_format_error());
        assert!(Error::ErrNameTooLong.is_format_error());
        assert!(!Error::ErrConnectionClosed.is_format_error());
        assert!(!Error::ErrSessionTerminated.is_format_error());
    }
}
