//! Frame canvas
//!
//! A 1-bit-per-pixel frame buffer that implements `embedded-graphics`
//! `DrawTarget`. Pixels are stored row-major, MSB first; a set bit is ink
//! (`BinaryColor::On`).

use core::convert::Infallible;

use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::{DrawTarget, OriginDimensions, Pixel, Size};

use crate::backend::{DisplayError, EpdPanel, PanelModel, RefreshKind, Rotation, StatusSurface};

/// In-memory frame
///
/// `BYTES` is the storage capacity; the logical size is chosen at runtime
/// and must fit.
#[derive(Clone)]
pub struct Canvas<const BYTES: usize> {
    width: u16,
    height: u16,
    model: PanelModel,
    rotation: Rotation,
    buf: [u8; BYTES],
    /// Set by any draw, cleared by the transfer side
    dirty: bool,
}

impl<const BYTES: usize> Canvas<BYTES> {
    /// Create a blank canvas of `width` x `height` logical pixels
    pub fn new(width: u16, height: u16) -> Result<Self, DisplayError> {
        if Self::bytes_for(width, height) > BYTES {
            return Err(DisplayError::BufferOverflow);
        }
        Ok(Self {
            width,
            height,
            model: PanelModel::Generic,
            rotation: Rotation::Deg0,
            buf: [0; BYTES],
            dirty: true,
        })
    }

    /// Create a canvas for a known panel in the given rotation
    ///
    /// The logical size is the panel's native size, transposed for 90/270.
    pub fn for_panel(model: PanelModel, rotation: Rotation) -> Result<Self, DisplayError> {
        let (w, h) = model.native_size();
        let (width, height) = if rotation.is_transposed() { (h, w) } else { (w, h) };
        let mut canvas = Self::new(width, height)?;
        canvas.model = model;
        canvas.rotation = rotation;
        Ok(canvas)
    }

    /// Bytes needed for a frame of the given size
    pub const fn bytes_for(width: u16, height: u16) -> usize {
        (width as usize).div_ceil(8) * height as usize
    }

    fn stride(&self) -> usize {
        (self.width as usize).div_ceil(8)
    }

    /// Logical width
    pub fn width(&self) -> u16 {
        self.width
    }

    /// Logical height
    pub fn height(&self) -> u16 {
        self.height
    }

    /// Frame bytes in use
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..Self::bytes_for(self.width, self.height)]
    }

    /// Read back one pixel (out of bounds reads as blank)
    pub fn pixel(&self, x: u16, y: u16) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        let idx = y as usize * self.stride() + (x as usize / 8);
        self.buf[idx] & (0x80 >> (x % 8)) != 0
    }

    /// Count inked pixels inside a rectangle
    pub fn ink_in(&self, x: u16, y: u16, width: u16, height: u16) -> usize {
        let mut count = 0;
        for py in y..y.saturating_add(height).min(self.height) {
            for px in x..x.saturating_add(width).min(self.width) {
                if self.pixel(px, py) {
                    count += 1;
                }
            }
        }
        count
    }

    /// Check whether the frame changed since the last transfer
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Mark the frame as transferred
    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    fn set(&mut self, x: u16, y: u16, on: bool) {
        let idx = y as usize * self.stride() + (x as usize / 8);
        let mask = 0x80 >> (x % 8);
        if on {
            self.buf[idx] |= mask;
        } else {
            self.buf[idx] &= !mask;
        }
    }
}

impl<const BYTES: usize> OriginDimensions for Canvas<BYTES> {
    fn size(&self) -> Size {
        Size::new(self.width as u32, self.height as u32)
    }
}

impl<const BYTES: usize> DrawTarget for Canvas<BYTES> {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if point.x < 0 || point.y < 0 {
                continue;
            }
            let (x, y) = (point.x as u32, point.y as u32);
            if x >= self.width as u32 || y >= self.height as u32 {
                continue;
            }
            self.set(x as u16, y as u16, color.is_on());
        }
        self.dirty = true;
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        let fill = if color.is_on() { 0xFF } else { 0x00 };
        let len = Self::bytes_for(self.width, self.height);
        self.buf[..len].fill(fill);
        self.dirty = true;
        Ok(())
    }
}

/// A bare canvas is a valid surface for the deferred arrangement: it has
/// no glass of its own, the task that owns the panel transfers the bytes.
impl<const BYTES: usize> StatusSurface for Canvas<BYTES> {
    fn model(&self) -> PanelModel {
        self.model
    }

    fn rotation(&self) -> Rotation {
        self.rotation
    }

    fn flush(&mut self, _kind: RefreshKind) -> Result<(), DisplayError> {
        Ok(())
    }
}

/// Canvas and panel bundled for synchronous refresh
pub struct BlockingEpd<P, const BYTES: usize> {
    canvas: Canvas<BYTES>,
    panel: P,
}

impl<P: EpdPanel, const BYTES: usize> BlockingEpd<P, BYTES> {
    /// Initialize the panel and wrap it together with its canvas
    pub fn new(mut panel: P, canvas: Canvas<BYTES>) -> Result<Self, DisplayError> {
        panel.init()?;
        Ok(Self { canvas, panel })
    }

    /// Borrow the frame
    pub fn canvas(&self) -> &Canvas<BYTES> {
        &self.canvas
    }

    /// Borrow the panel
    pub fn panel(&self) -> &P {
        &self.panel
    }

    /// Put the panel to sleep and hand it back
    pub fn release(mut self) -> P {
        let _ = self.panel.sleep();
        self.panel
    }
}

impl<P, const BYTES: usize> OriginDimensions for BlockingEpd<P, BYTES> {
    fn size(&self) -> Size {
        self.canvas.size()
    }
}

impl<P, const BYTES: usize> DrawTarget for BlockingEpd<P, BYTES> {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        self.canvas.draw_iter(pixels)
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.canvas.clear(color)
    }
}

impl<P: EpdPanel, const BYTES: usize> StatusSurface for BlockingEpd<P, BYTES> {
    fn model(&self) -> PanelModel {
        self.canvas.model
    }

    fn rotation(&self) -> Rotation {
        self.canvas.rotation
    }

    fn flush(&mut self, kind: RefreshKind) -> Result<(), DisplayError> {
        self.panel.transfer(
            self.canvas.as_bytes(),
            self.canvas.width,
            self.canvas.height,
            kind,
        )?;
        self.canvas.mark_clean();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::prelude::*;
    use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};

    #[test]
    fn test_rejects_oversized_frame() {
        assert!(Canvas::<100>::new(100, 100).is_err());
        assert!(Canvas::<1250>::new(100, 100).is_ok());
    }

    #[test]
    fn test_for_panel_transposes() {
        let canvas = Canvas::<4000>::for_panel(PanelModel::Gdey0213b74, Rotation::Deg90).unwrap();
        assert_eq!(canvas.size(), Size::new(250, 122));
        assert_eq!(canvas.rotation(), Rotation::Deg90);
    }

    #[test]
    fn test_draw_and_read_back() {
        let mut canvas = Canvas::<200>::new(40, 40).unwrap();
        canvas.mark_clean();

        Rectangle::new(Point::new(2, 3), Size::new(4, 5))
            .into_styled(PrimitiveStyle::with_fill(BinaryColor::On))
            .draw(&mut canvas)
            .unwrap();

        assert!(canvas.is_dirty());
        assert!(canvas.pixel(2, 3));
        assert!(canvas.pixel(5, 7));
        assert!(!canvas.pixel(6, 7));
        assert_eq!(canvas.ink_in(0, 0, 40, 40), 20);
    }

    #[test]
    fn test_out_of_bounds_pixels_ignored() {
        let mut canvas = Canvas::<200>::new(40, 40).unwrap();
        canvas
            .draw_iter([
                Pixel(Point::new(-1, 0), BinaryColor::On),
                Pixel(Point::new(40, 0), BinaryColor::On),
                Pixel(Point::new(0, 40), BinaryColor::On),
            ])
            .unwrap();
        assert_eq!(canvas.ink_in(0, 0, 40, 40), 0);
    }

    #[test]
    fn test_clear_fills_frame() {
        let mut canvas = Canvas::<200>::new(16, 2).unwrap();
        canvas.clear(BinaryColor::On).unwrap();
        assert_eq!(canvas.as_bytes(), &[0xFF; 4]);
        canvas.clear(BinaryColor::Off).unwrap();
        assert_eq!(canvas.as_bytes(), &[0x00; 4]);
    }

    struct MockPanel {
        transfers: usize,
        last_kind: Option<RefreshKind>,
        last_len: usize,
        fail: bool,
    }

    impl EpdPanel for MockPanel {
        fn init(&mut self) -> Result<(), DisplayError> {
            Ok(())
        }

        fn transfer(
            &mut self,
            frame: &[u8],
            _width: u16,
            _height: u16,
            kind: RefreshKind,
        ) -> Result<(), DisplayError> {
            if self.fail {
                return Err(DisplayError::Timeout);
            }
            self.transfers += 1;
            self.last_kind = Some(kind);
            self.last_len = frame.len();
            Ok(())
        }

        fn sleep(&mut self) -> Result<(), DisplayError> {
            Ok(())
        }
    }

    #[test]
    fn test_blocking_flush_transfers_frame() {
        let panel = MockPanel {
            transfers: 0,
            last_kind: None,
            last_len: 0,
            fail: false,
        };
        let canvas = Canvas::<400>::new(32, 32).unwrap();
        let mut epd = BlockingEpd::new(panel, canvas).unwrap();

        epd.clear(BinaryColor::Off).unwrap();
        epd.flush(RefreshKind::Full).unwrap();

        assert_eq!(epd.panel().transfers, 1);
        assert_eq!(epd.panel().last_kind, Some(RefreshKind::Full));
        assert_eq!(epd.panel().last_len, 128);
        assert!(!epd.canvas().is_dirty());
    }

    #[test]
    fn test_failed_flush_keeps_frame_dirty() {
        let panel = MockPanel {
            transfers: 0,
            last_kind: None,
            last_len: 0,
            fail: true,
        };
        let canvas = Canvas::<400>::new(32, 32).unwrap();
        let mut epd = BlockingEpd::new(panel, canvas).unwrap();

        assert_eq!(epd.flush(RefreshKind::Fast), Err(DisplayError::Timeout));
        assert!(epd.canvas().is_dirty());
    }
}
