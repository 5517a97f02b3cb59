use std::fmt::{Display, Error, Formatter};

// Error
//------------------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum QRError {
    // Caller input
    DataTooLong,
    InvalidVersion,
    InvalidECLevel,
    InvalidMaskingPattern,
    InvalidShape,
    InvalidScale,
    InvalidPhoneNumber,

    // Pipeline
    InvalidState(&'static str),
    InvariantViolation(&'static str),
}

impl Display for QRError {
    fn fmt(&self, f: &mut Formatter) -> Result<(), Error> {
        match *self {
            Self::DataTooLong => f.write_str("Data too long"),
            Self::InvalidVersion => f.write_str("Invalid version"),
            Self::InvalidECLevel => f.write_str("Invalid error correction level"),
            Self::InvalidMaskingPattern => f.write_str("Invalid masking pattern"),
            Self::InvalidShape => f.write_str("Finder modules must be rendered as squares"),
            Self::InvalidScale => f.write_str("Scale must be at least one pixel per module"),
            Self::InvalidPhoneNumber => f.write_str("Invalid telephone number"),
            Self::InvalidState(msg) => write!(f, "Invalid state: {msg}"),
            Self::InvariantViolation(msg) => write!(f, "Invariant violated: {msg}"),
        }
    }
}

impl std::error::Error for QRError {}

pub type QRResult<T> = Result<T, QRError>;
