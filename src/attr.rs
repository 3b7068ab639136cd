use crate::blur::{blur_plane, PassOrder, MAX_SAFE_RADIUS};
use crate::error::*;
use crate::image::{zeroed_buf, Image};
use crate::kernel::Kernel;
use crate::RGB8;
use std::sync::Arc;

#[cfg(feature = "threads")]
use rayon::current_num_threads;
#[cfg(not(feature = "threads"))]
use crate::rayoff::current_num_threads;

/// Radius limit used unless changed with [`Attributes::set_max_radius`]
pub const DEFAULT_MAX_RADIUS: u8 = 8;

/// Settings for blurring, and the log callbacks
#[derive(Clone)]
pub struct Attributes {
    max_radius: u8,
    pass_order: PassOrder,

    log_callback: Option<Arc<dyn Fn(&Attributes, &str) + Send + Sync>>,
    log_flush_callback: Option<Arc<dyn Fn(&Attributes) + Send + Sync>>,
}

impl Attributes {
    /// New handle for library configuration
    ///
    /// See also [`Attributes::new_image()`]
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            max_radius: DEFAULT_MAX_RADIUS,
            pass_order: PassOrder::default(),
            log_callback: None,
            log_flush_callback: None,
        }
    }

    /// Describe a planar RGB buffer. See [`Image::new`].
    #[inline]
    pub fn new_image<'pixels>(&self, pixels: &'pixels mut [u8], width: usize, height: usize) -> Result<Image<'pixels>, Error> {
        Image::new(self, pixels, width, height)
    }

    /// Make a planar image from interleaved RGB pixels. See [`Image::from_rgb`].
    #[inline]
    pub fn new_image_rgb(&self, pixels: &[RGB8], width: usize, height: usize) -> Result<Image<'static>, Error> {
        Image::from_rgb(self, pixels, width, height)
    }

    /// Blurs all three planes of the image in place with a binomial kernel of `2*radius+1` taps.
    ///
    /// If the radius is above [`Attributes::max_radius()`] the image is not touched at all,
    /// and `RadiusTooLarge` is returned. Radius 0 leaves the image unchanged.
    pub fn blur(&self, image: &mut Image<'_>, radius: u8) -> Result<(), Error> {
        if radius > self.max_radius {
            self.verbose_print(format!("  error: blur radius {} is too big and would overflow, the limit is {}; image left unchanged", radius, self.max_radius));
            return Err(RadiusTooLarge);
        }
        if radius == 0 {
            return Ok(());
        }

        let kernel = Kernel::binomial(radius)?;
        let width = image.width();
        let height = image.height();
        let mut tmp = zeroed_buf(image.plane_len())?;

        self.verbose_print(format!("  blurring {}×{} with {} taps (sum {}) on {} threads", width, height, kernel.len(), kernel.sum(), current_num_threads()));
        let [first, second] = self.pass_order.axes();
        self.verbose_print(format!("  pass order: {:?}, then {:?}", first, second));

        for plane in image.planes_mut() {
            blur_plane(plane, &mut tmp, width, height, &kernel, self.pass_order);
        }
        self.verbose_printf_flush();
        Ok(())
    }

    /// Largest radius that [`Attributes::blur`] accepts.
    ///
    /// Default is 8. It can't be set higher than [`MAX_SAFE_RADIUS`][crate::MAX_SAFE_RADIUS],
    /// because the 32-bit sums would overflow for bright images.
    #[inline]
    pub fn set_max_radius(&mut self, value: u8) -> Result<(), Error> {
        if value > MAX_SAFE_RADIUS {
            return Err(ValueOutOfRange);
        }
        self.max_radius = value;
        Ok(())
    }

    /// Limit set with [`Attributes::set_max_radius`]
    #[inline(always)]
    #[must_use]
    pub fn max_radius(&self) -> u8 {
        self.max_radius
    }

    /// Vertical pass first by default. The order only affects rounding.
    #[inline(always)]
    pub fn set_pass_order(&mut self, order: PassOrder) {
        self.pass_order = order;
    }

    /// Order set with [`Attributes::set_pass_order`]
    #[inline(always)]
    #[must_use]
    pub fn pass_order(&self) -> PassOrder {
        self.pass_order
    }

    /// Set callback function to be called every time the library wants to print a message.
    ///
    /// To share data with the callback, use `Arc` or `Atomic*` types and `move ||` closures.
    #[inline]
    pub fn set_log_callback<F: Fn(&Attributes, &str) + Send + Sync + 'static>(&mut self, callback: F) {
        self.verbose_printf_flush();
        self.log_callback = Some(Arc::new(callback));
    }

    /// Callback for flushing output (if you buffer messages, that's the time to flush those buffers)
    #[inline]
    pub fn set_log_flush_callback<F: Fn(&Attributes) + Send + Sync + 'static>(&mut self, callback: F) {
        self.verbose_printf_flush();
        self.log_flush_callback = Some(Arc::new(callback));
    }

    #[inline(always)]
    pub(crate) fn verbose_print(self: &Attributes, msg: impl AsRef<str>) {
        fn _print(a: &Attributes, msg: &str) {
            if let Some(f) = &a.log_callback {
                f(a, msg);
            }
        }
        _print(self, msg.as_ref());
    }

    #[inline]
    pub(crate) fn verbose_printf_flush(self: &Attributes) {
        if let Some(f) = &self.log_flush_callback {
            f(self);
        }
    }
}

impl Drop for Attributes {
    fn drop(&mut self) {
        self.verbose_printf_flush();
    }
}

impl Default for Attributes {
    #[inline(always)]
    fn default() -> Attributes {
        Attributes::new()
    }
}

#[test]
fn getset() {
    let mut a = Attributes::new();
    assert_eq!(DEFAULT_MAX_RADIUS, a.max_radius());
    assert_eq!(PassOrder::VerticalFirst, a.pass_order());
    a.set_max_radius(MAX_SAFE_RADIUS).unwrap();
    assert_eq!(MAX_SAFE_RADIUS, a.max_radius());
    assert_eq!(Err(ValueOutOfRange), a.set_max_radius(MAX_SAFE_RADIUS + 1));
    assert_eq!(MAX_SAFE_RADIUS, a.max_radius());
    a.set_max_radius(0).unwrap();
    a.set_pass_order(PassOrder::HorizontalFirst);
    assert_eq!(PassOrder::HorizontalFirst, a.pass_order());
    let b = a.clone();
    assert_eq!(0, b.max_radius());
}

#[test]
fn guard_is_a_logged_noop() {
    use std::sync::Mutex;

    let log = Arc::new(Mutex::new(Vec::<String>::new()));
    let mut a = Attributes::new();
    let log2 = log.clone();
    a.set_log_callback(move |_, msg| log2.lock().unwrap().push(msg.to_string()));

    let mut buf: Vec<u8> = (0..5 * 4 * 3).map(|i| (i * 7) as u8).collect();
    let orig = buf.clone();
    let mut img = a.new_image(&mut buf, 5, 4).unwrap();
    assert_eq!(Err(RadiusTooLarge), a.blur(&mut img, DEFAULT_MAX_RADIUS + 1));
    assert_eq!(Err(RadiusTooLarge), a.blur(&mut img, u8::MAX));
    drop(img);
    assert_eq!(orig, buf);

    let log = log.lock().unwrap();
    assert_eq!(2, log.len());
    assert!(log[0].contains("too big"), "{}", log[0]);
}

#[test]
fn radius_limit_is_configurable() {
    let mut a = Attributes::new();
    a.set_max_radius(MAX_SAFE_RADIUS).unwrap();
    let mut buf = vec![255u8; 30 * 30 * 3];
    let mut img = a.new_image(&mut buf, 30, 30).unwrap();
    a.blur(&mut img, 10).unwrap();
    assert_eq!(Some(RGB8::new(255, 255, 255)), img.pixel(15, 15));
    assert!(img.pixel(0, 0).unwrap().r < 255);

    a.set_max_radius(2).unwrap();
    assert_eq!(Err(RadiusTooLarge), a.blur(&mut img, 3));
}

#[test]
fn flushes_on_drop() {
    use std::sync::atomic::{AtomicUsize, Ordering::SeqCst};

    let flushes = Arc::new(AtomicUsize::new(0));
    let mut a = Attributes::new();
    let f = flushes.clone();
    a.set_log_flush_callback(move |_| { f.fetch_add(1, SeqCst); });
    a.set_log_callback(|_, _| {});
    assert_eq!(1, flushes.load(SeqCst));

    let mut buf = vec![0u8; 3 * 3 * 3];
    let mut img = a.new_image(&mut buf, 3, 3).unwrap();
    a.blur(&mut img, 1).unwrap();
    assert_eq!(2, flushes.load(SeqCst));
    drop(a);
    assert_eq!(3, flushes.load(SeqCst));
}
