use std::fmt::{Display, Error, Formatter};

// Error
//------------------------------------------------------------------------------

#[derive(Debug)]
pub enum QRError {
    // Encoder
    DataTooLong,
    InvalidChar,

    // Renderer
    InvalidConfig(&'static str),
    Io(std::io::Error),
}

impl Display for QRError {
    fn fmt(&self, f: &mut Formatter) -> Result<(), Error> {
        match self {
            Self::DataTooLong => f.write_str("Data too long"),
            Self::InvalidChar => f.write_str("Invalid character for encoding mode"),
            Self::InvalidConfig(msg) => write!(f, "Invalid render config: {msg}"),
            Self::Io(err) => write!(f, "Output write failed: {err}"),
        }
    }
}

impl std::error::Error for QRError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for QRError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<image::ImageError> for QRError {
    fn from(err: image::ImageError) -> Self {
        match err {
            image::ImageError::IoError(e) => Self::Io(e),
            other => Self::Io(std::io::Error::other(other)),
        }
    }
}

pub type QRResult<T> = Result<T, QRError>;
