use crate::attr::Attributes;
use crate::error::*;
use crate::seacow::SeaCow;
use crate::RGB8;

/// Number of planes in an [`Image`]: red, green, blue
pub const CHANNELS: usize = 3;

/// Describes image dimensions and planar pixels for the library.
///
/// Samples are stored plane by plane: all of red first, then all of green, then all of blue.
/// Sample `(x, y)` of channel `c` is at `c * width * height + y * width + x`.
pub struct Image<'pixels> {
    px: SeaCow<'pixels, u8>,
    width: u32,
    height: u32,
}

impl<'pixels> Image<'pixels> {
    /// Wrap a planar RGB buffer, without copying. Blurring modifies `pixels` in place.
    ///
    /// The buffer must be exactly `width * height * 3` bytes.
    #[inline]
    pub fn new(attr: &Attributes, pixels: &'pixels mut [u8], width: usize, height: usize) -> Result<Self, Error> {
        Self::new_internal(attr, SeaCow::borrowed(pixels), width, height)
    }

    /// Like [`Image::new`], but makes a copy of the pixels, so that it makes a self-contained type.
    #[inline]
    pub fn new_copy(attr: &Attributes, pixels: &[u8], width: usize, height: usize) -> Result<Image<'static>, Error> {
        Image::new_internal(attr, SeaCow::boxed(pixels.into()), width, height)
    }

    /// Converts interleaved RGB pixels (as loaded by most image decoders) to a planar image.
    ///
    /// There must be exactly `width * height` pixels, same as for [`Image::new`].
    /// See the [`rgb`] crate for making `[RGB8]` slices from `[u8]` slices.
    pub fn from_rgb(attr: &Attributes, pixels: &[RGB8], width: usize, height: usize) -> Result<Image<'static>, Error> {
        if !Self::check_image_size(width, height) {
            attr.verbose_print(format!("  error: invalid image size {}×{}", width, height));
            return Err(ValueOutOfRange);
        }
        let area = width * height;
        if pixels.len() < area {
            attr.verbose_print(format!("Buffer length is {} pixels, which is not enough for {}×{} RGB pixels", pixels.len(), width, height));
            return Err(BufferTooSmall);
        }
        if pixels.len() > area {
            attr.verbose_print(format!("  error: buffer length is {} pixels, but {}×{} RGB is {} pixels", pixels.len(), width, height, area));
            return Err(ValueOutOfRange);
        }

        let mut planar = zeroed_buf(area * CHANNELS)?;
        let (r, gb) = planar.split_at_mut(area);
        let (g, b) = gb.split_at_mut(area);
        for (px, ((r, g), b)) in pixels.iter().zip(r.iter_mut().zip(g.iter_mut()).zip(b.iter_mut())) {
            *r = px.r;
            *g = px.g;
            *b = px.b;
        }
        Image::new_internal(attr, SeaCow::boxed(planar), width, height)
    }

    fn new_internal(attr: &Attributes, px: SeaCow<'pixels, u8>, width: usize, height: usize) -> Result<Self, Error> {
        if !Self::check_image_size(width, height) {
            attr.verbose_print(format!("  error: invalid image size {}×{}", width, height));
            return Err(ValueOutOfRange);
        }
        let expected = width * height * CHANNELS;
        let len = px.as_slice().len();
        if len < expected {
            attr.verbose_print(format!("Buffer length is {} bytes, which is not enough for {}×{}×3 planar RGB bytes", len, width, height));
            return Err(BufferTooSmall);
        }
        if len > expected {
            attr.verbose_print(format!("  error: buffer length is {} bytes, but {}×{}×3 planar RGB is {} bytes", len, width, height, expected));
            return Err(ValueOutOfRange);
        }
        Ok(Self {
            px,
            width: width as u32,
            height: height as u32,
        })
    }

    fn check_image_size(width: usize, height: usize) -> bool {
        if width == 0 || height == 0 {
            return false;
        }
        if width.max(height) > u32::MAX as usize {
            return false;
        }
        width.checked_mul(height)
            .and_then(|area| area.checked_mul(CHANNELS))
            .map_or(false, |len| len <= isize::MAX as usize)
    }

    /// Width of the image in pixels
    #[must_use]
    #[inline(always)]
    pub fn width(&self) -> usize {
        self.width as _
    }

    /// Height of the image in pixels
    #[must_use]
    #[inline(always)]
    pub fn height(&self) -> usize {
        self.height as _
    }

    #[inline(always)]
    pub(crate) fn plane_len(&self) -> usize {
        self.width() * self.height()
    }

    /// All samples, in planar order
    #[must_use]
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        self.px.as_slice()
    }

    /// Samples of one channel (0 = red, 1 = green, 2 = blue), row by row.
    ///
    /// # Panics
    ///
    /// If `channel` is 3 or more
    #[must_use]
    pub fn plane(&self, channel: usize) -> &[u8] {
        assert!(channel < CHANNELS);
        let len = self.plane_len();
        &self.px.as_slice()[channel * len..][..len]
    }

    /// Mutable version of [`Image::plane`]
    ///
    /// # Panics
    ///
    /// If `channel` is 3 or more
    pub fn plane_mut(&mut self, channel: usize) -> &mut [u8] {
        assert!(channel < CHANNELS);
        let len = self.plane_len();
        &mut self.px.as_mut_slice()[channel * len..][..len]
    }

    #[inline]
    pub(crate) fn planes_mut(&mut self) -> impl Iterator<Item = &mut [u8]> {
        let len = self.plane_len();
        self.px.as_mut_slice().chunks_exact_mut(len)
    }

    /// Color at `(x, y)`, or `None` if it's outside of the image
    #[must_use]
    pub fn pixel(&self, x: usize, y: usize) -> Option<RGB8> {
        if x >= self.width() || y >= self.height() {
            return None;
        }
        let i = y * self.width() + x;
        Some(RGB8::new(self.plane(0)[i], self.plane(1)[i], self.plane(2)[i]))
    }

    /// Interleaves planes back into row-major RGB pixels, e.g. for saving or display
    #[must_use]
    pub fn to_rgb(&self) -> Vec<RGB8> {
        self.plane(0).iter().zip(self.plane(1)).zip(self.plane(2))
            .map(|((&r, &g), &b)| RGB8::new(r, g, b))
            .collect()
    }

    /// Makes the image independent from the borrowed pixels
    #[must_use]
    pub fn into_owned(self) -> Image<'static> {
        Image {
            px: self.px.into_owned(),
            width: self.width,
            height: self.height,
        }
    }
}

/// Zero-filled buffer that reports allocation failure instead of aborting
pub(crate) fn zeroed_buf(len: usize) -> Result<Box<[u8]>, Error> {
    let mut v = Vec::new();
    v.try_reserve_exact(len)?;
    v.resize(len, 0);
    Ok(v.into_boxed_slice())
}

#[test]
fn sizes() {
    let attr = Attributes::new();
    let mut buf = vec![0u8; 4 * 3 * 3];
    assert!(Image::new(&attr, &mut buf, 4, 3).is_ok());
    assert_eq!(Err(BufferTooSmall), Image::new(&attr, &mut buf, 4, 4).map(|_| ()));
    assert_eq!(Err(ValueOutOfRange), Image::new(&attr, &mut buf, 2, 3).map(|_| ()));
    assert_eq!(Err(ValueOutOfRange), Image::new(&attr, &mut buf, 0, 3).map(|_| ()));
    assert_eq!(Err(ValueOutOfRange), Image::new(&attr, &mut [], 0, 0).map(|_| ()));
    assert_eq!(Err(ValueOutOfRange), Image::new_copy(&attr, &buf, usize::MAX, 2).map(|_| ()));
}

#[test]
fn planar_layout() {
    let attr = Attributes::new();
    // 2×1: red plane, green plane, blue plane
    let mut buf = [10u8, 11, 20, 21, 30, 31];
    let img = Image::new(&attr, &mut buf, 2, 1).unwrap();
    assert_eq!(&[20, 21], img.plane(1));
    assert_eq!(Some(RGB8::new(11, 21, 31)), img.pixel(1, 0));
    assert_eq!(None, img.pixel(2, 0));
    assert_eq!(vec![RGB8::new(10, 20, 30), RGB8::new(11, 21, 31)], img.to_rgb());
}

#[test]
fn rgb_conversion() {
    let attr = Attributes::new();
    let px: Vec<_> = (0..6u8).map(|i| RGB8::new(i, i + 100, i + 200)).collect();
    let img = Image::from_rgb(&attr, &px, 3, 2).unwrap();
    assert_eq!(3, img.width());
    assert_eq!(2, img.height());
    assert_eq!(&[0, 1, 2, 3, 4, 5], img.plane(0));
    assert_eq!(&[200, 201, 202, 203, 204, 205], img.plane(2));
    assert_eq!(Some(RGB8::new(4, 104, 204)), img.pixel(1, 1));
    assert_eq!(px, img.to_rgb());
    assert!(Image::from_rgb(&attr, &px, 4, 2).is_err());
}

#[test]
fn rgb_length_must_match() {
    use std::sync::{Arc, Mutex};

    let log = Arc::new(Mutex::new(Vec::<String>::new()));
    let mut attr = Attributes::new();
    let log2 = log.clone();
    attr.set_log_callback(move |_, msg| log2.lock().unwrap().push(msg.to_string()));

    let px = [RGB8::new(1, 2, 3); 10];
    assert_eq!(Err(ValueOutOfRange), Image::from_rgb(&attr, &px, 3, 3).map(|_| ()));
    assert_eq!(Err(BufferTooSmall), Image::from_rgb(&attr, &px, 4, 3).map(|_| ()));
    assert_eq!(Err(ValueOutOfRange), Image::from_rgb(&attr, &px, 0, 10).map(|_| ()));
    assert!(Image::from_rgb(&attr, &px, 5, 2).is_ok());
    assert!(Image::from_rgb(&attr, &px[..9], 3, 3).is_ok());

    // same rule as for planar buffers
    let mut planar = [0u8; 10 * 3];
    assert_eq!(Err(ValueOutOfRange), Image::new(&attr, &mut planar, 3, 3).map(|_| ()));
    assert_eq!(4, log.lock().unwrap().len());
}

#[test]
fn plane_mut_writes_through() {
    let attr = Attributes::new();
    let mut buf = vec![0u8; 2 * 2 * 3];
    {
        let mut img = Image::new(&attr, &mut buf, 2, 2).unwrap();
        img.plane_mut(2)[3] = 99;
        let owned = Image::new_copy(&attr, img.as_slice(), 2, 2).unwrap();
        assert_eq!(Some(RGB8::new(0, 0, 99)), owned.pixel(1, 1));
    }
    assert_eq!(99, buf[11]);
}

#[test]
fn into_owned_detaches_from_buffer() {
    let attr = Attributes::new();
    let mut buf: Vec<u8> = (0..3 * 2 * 3).collect();
    let orig = buf.clone();

    let img = Image::new(&attr, &mut buf, 3, 2).unwrap();
    let mut owned = img.into_owned();
    assert_eq!(3, owned.width());
    assert_eq!(2, owned.height());
    assert_eq!(&orig[..], owned.as_slice());

    owned.plane_mut(1)[0] = 200;
    attr.blur(&mut owned, 1).unwrap();
    assert_ne!(&orig[..], owned.as_slice());
    assert_eq!(orig, buf);

    // already owned images are moved, not copied
    let again = owned.into_owned();
    assert_eq!(3, again.width());
}
