use std::collections::TryReserveError;
use std::fmt;
pub use Error::*;

/// Error codes
#[non_exhaustive]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Error {
    /// Radius is above [`Attributes::max_radius()`][crate::Attributes::max_radius]. The image has not been modified
    RadiusTooLarge = 99,
    /// Function called with invalid arguments
    ValueOutOfRange = 100,
    /// Either the system/process really hit a limit, or width/height was ridiculously wrong
    OutOfMemory,
    /// Slice needs to be bigger, or width/height needs to be smaller
    BufferTooSmall,
}

impl std::error::Error for Error {}

impl fmt::Display for Error {
    #[cold]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match *self {
            Self::RadiusTooLarge => "RADIUS_TOO_LARGE",
            Self::ValueOutOfRange => "VALUE_OUT_OF_RANGE",
            Self::OutOfMemory => "OUT_OF_MEMORY",
            Self::BufferTooSmall => "BUFFER_TOO_SMALL",
        })
    }
}

impl From<TryReserveError> for Error {
    #[cold]
    fn from(_: TryReserveError) -> Self {
        Self::OutOfMemory
    }
}

#[test]
fn display_codes() {
    assert_eq!("RADIUS_TOO_LARGE", RadiusTooLarge.to_string());
    assert_eq!("BUFFER_TOO_SMALL", BufferTooSmall.to_string());
    let e: Box<dyn std::error::Error> = Box::new(ValueOutOfRange);
    assert_eq!("VALUE_OUT_OF_RANGE", e.to_string());
}
