use std::fmt;
use std::io;

//===========================================================================//

/// The error type for encoding an ICO file.
#[derive(Debug)]
pub enum IcoError {
    /// The requested size list was rejected before any rasterization began
    /// (for example, it was empty or contained a size outside `1..=256`).
    InvalidInput(String),

    /// Rasterizing or PNG-encoding one of the requested sizes failed.  No
    /// partial output is ever produced.
    Encoding {
        /// The requested size (in pixels) whose image couldn't be produced.
        size: u32,
        /// The underlying failure.
        source: io::Error,
    },

    /// The source image couldn't be decoded.
    Decode(image::ImageError),

    /// Writing the assembled file failed.
    Io(io::Error),
}

impl fmt::Display for IcoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IcoError::InvalidInput(message) => {
                write!(f, "Invalid icon sizes: {}", message)
            }
            IcoError::Encoding { size, source } => {
                write!(f, "Failed to encode {}x{} icon: {}", size, size, source)
            }
            IcoError::Decode(error) => {
                write!(f, "Failed to decode source image: {}", error)
            }
            IcoError::Io(error) => {
                write!(f, "Failed to write ICO file: {}", error)
            }
        }
    }
}

impl std::error::Error for IcoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            IcoError::InvalidInput(_) => None,
            IcoError::Encoding { source, .. } => Some(source),
            IcoError::Decode(error) => Some(error),
            IcoError::Io(error) => Some(error),
        }
    }
}

impl From<image::ImageError> for IcoError {
    fn from(error: image::ImageError) -> IcoError {
        IcoError::Decode(error)
    }
}

//===========================================================================//


//===========================================================================//
