use thiserror::Error;

/// Errors returned by the conversion entry points.
///
/// `Decode` means the input bytes were unusable; `SizeRange` and
/// `InvalidSize` mean the caller asked for something the formats cannot
/// hold. `Encoding` is an internal invariant violation and indicates a bug.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// Input bytes are empty, unrecognized, truncated or inconsistent
    #[error("failed to decode image: {0}")]
    Decode(String),

    /// Icon size set is empty (`size == None`) or holds a value outside 1..=256
    #[error("{}", size_range_message(.size))]
    SizeRange { size: Option<u32> },

    /// A single target dimension is outside 1..=256
    #[error("invalid target dimensions: {width}x{height} (each must be between 1 and 256)")]
    InvalidSize { width: u32, height: u32 },

    /// Container or markup assembly broke an internal invariant
    #[error("encoding failed: {0}")]
    Encoding(String),
}

fn size_range_message(size: &Option<u32>) -> String {
    match size {
        Some(size) => format!("invalid icon size: {size}. Size must be between 1 and 256."),
        None => "icon size list is empty".to_string(),
    }
}

impl Error {
    /// True when the input data itself was bad and resubmitting it with
    /// different arguments will not help.
    pub fn is_input_error(&self) -> bool {
        matches!(self, Error::Decode(_))
    }

    /// True when the arguments were bad and the call can be retried with
    /// corrected sizes.
    pub fn is_parameter_error(&self) -> bool {
        matches!(self, Error::SizeRange { .. } | Error::InvalidSize { .. })
    }
}

impl From<image::ImageError> for Error {
    fn from(err: image::ImageError) -> Self {
        match err {
            image::ImageError::Decoding(_)
            | image::ImageError::Unsupported(_)
            | image::ImageError::Limits(_)
            | image::ImageError::IoError(_) => Error::Decode(err.to_string()),
            image::ImageError::Encoding(_) | image::ImageError::Parameter(_) => {
                Error::Encoding(err.to_string())
            }
        }
    }
}

/// Result type for conversion operations.
pub type Result<T> = core::result::Result<T, Error>;
