//! Separable binomial blur for 8-bit RGB images.
//!
//! The kernel is a row of Pascal's triangle, so its weights add up to a power of two and
//! everything is done with integers. The 2-D blur is two 1-D passes (columns, then rows),
//! each one split across rows and run in parallel when the `threads` feature is enabled.
//!
//! Pixels outside of the image are treated as black, so edges get a bit darker.
//!
//! ```rust,ignore
//! let mut attr = binoblur::new();
//! let mut image = attr.new_image(&mut planar_rgb, width, height)?;
//! attr.blur(&mut image, 5)?;
//! ```
#![warn(missing_docs)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_possible_truncation)]

mod attr;
mod blur;
mod error;
mod image;
mod kernel;
mod seacow;

#[cfg(not(feature = "threads"))]
mod rayoff;

pub use attr::{Attributes, DEFAULT_MAX_RADIUS};
pub use blur::{Axis, PassOrder, MAX_SAFE_RADIUS};
pub use error::Error;
pub use error::Error::*;
pub use image::{Image, CHANNELS};
pub use kernel::{binomial_coefficient, Kernel};

/// 8-bit RGB pixel, for interleaved images
pub use rgb::RGB8;

/// Start here: creates new handle for library configuration
///
/// See [`Attributes`]
#[inline(always)]
#[must_use]
pub fn new() -> Attributes {
    Attributes::new()
}

/// Blurs a planar RGB buffer of `width * height * 3` bytes in place, using default settings.
///
/// Radius above [`DEFAULT_MAX_RADIUS`] is refused with `RadiusTooLarge` and the buffer is left as-is.
/// The returned error is the only diagnostic: this function has no log callback, so nothing is printed.
///
/// To see why a blur was refused, or to change settings, make [`Attributes`] with
/// [`Attributes::set_log_callback`] and call [`Attributes::blur`] instead.
pub fn blur(buffer: &mut [u8], width: usize, height: usize, radius: u8) -> Result<(), Error> {
    let attr = Attributes::new();
    let mut image = attr.new_image(buffer, width, height)?;
    attr.blur(&mut image, radius)
}

#[test]
fn identity_at_zero() {
    let mut buf: Vec<u8> = (0..7 * 5 * 3).map(|i| (i * 31 % 256) as u8).collect();
    let orig = buf.clone();
    blur(&mut buf, 7, 5, 0).unwrap();
    assert_eq!(orig, buf);
}

#[test]
fn refuses_large_radius() {
    let mut buf: Vec<u8> = (0..6 * 6 * 3).map(|i| i as u8).collect();
    let orig = buf.clone();
    for radius in [9, 10, 16, 200] {
        assert_eq!(Err(RadiusTooLarge), blur(&mut buf, 6, 6, radius));
        assert_eq!(orig, buf);
    }
}

#[test]
fn rejects_wrong_size() {
    let mut buf = vec![0u8; 10];
    assert_eq!(Err(BufferTooSmall), blur(&mut buf, 2, 2, 1));
    assert_eq!(Err(ValueOutOfRange), blur(&mut buf, 1, 3, 1));
}

#[test]
fn send_sync() {
    fn is_send<T: Send>() {}
    fn is_sync<T: Sync>() {}
    is_send::<Attributes>();
    is_sync::<Attributes>();
    is_send::<Image<'static>>();
    is_sync::<Image<'static>>();
}

#[test]
fn refusal_message_needs_log_callback() {
    use std::sync::{Arc, Mutex};

    let mut buf = vec![9u8; 4 * 4 * 3];
    assert_eq!(Err(RadiusTooLarge), blur(&mut buf, 4, 4, DEFAULT_MAX_RADIUS + 1));

    let log = Arc::new(Mutex::new(Vec::<String>::new()));
    let mut attr = new();
    let log2 = log.clone();
    attr.set_log_callback(move |_, msg| log2.lock().unwrap().push(msg.to_string()));
    let mut img = attr.new_image(&mut buf, 4, 4).unwrap();
    assert_eq!(Err(RadiusTooLarge), attr.blur(&mut img, DEFAULT_MAX_RADIUS + 1));
    drop(img);
    assert_eq!(vec![9u8; 4 * 4 * 3], buf);

    let log = log.lock().unwrap();
    assert_eq!(1, log.len());
    assert!(log[0].contains(&format!("limit is {}", DEFAULT_MAX_RADIUS)), "{}", log[0]);
}
