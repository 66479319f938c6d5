//! Display backend traits
//!
//! Defines the drawing surface used by the status scheduler and the
//! physical transfer interface of e-paper modules.

use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::{DrawTarget, OriginDimensions};

/// Display backend errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayError {
    /// Communication error with the panel controller
    Communication,
    /// Panel stayed busy past its timeout
    Timeout,
    /// Display not initialized
    NotInitialized,
    /// Frame does not fit the buffer
    BufferOverflow,
}

/// Known physical panels
///
/// Some controllers report a RAM geometry that is wider than the glass;
/// the status layout corrects for those.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PanelModel {
    /// Panel whose reported extent is the visible extent
    #[default]
    Generic,
    /// 2.13" DEPG0213BN: 128 px controller width, 122 px visible
    Depg0213bn,
    /// 2.13" GDEY0213B74 (SSD1680)
    Gdey0213b74,
    /// 1.54" GDEH0154D67 (SSD1681), 200x200
    Gdeh0154d67,
}

impl PanelModel {
    /// Native (portrait) width x height in pixels
    pub const fn native_size(self) -> (u16, u16) {
        match self {
            PanelModel::Generic => (0, 0),
            PanelModel::Depg0213bn => (128, 250),
            PanelModel::Gdey0213b74 => (122, 250),
            PanelModel::Gdeh0154d67 => (200, 200),
        }
    }
}

/// Surface rotation relative to the panel's native orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    /// Check whether width and height are swapped
    pub const fn is_transposed(self) -> bool {
        matches!(self, Rotation::Deg90 | Rotation::Deg270)
    }
}

/// E-paper refresh waveform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RefreshKind {
    /// Full waveform: slow, flashes, clears ghosting
    Full,
    /// Partial waveform: fast, leaves some ghosting
    Fast,
}

/// Surface the status scheduler draws on
///
/// Geometry comes from [`OriginDimensions::size`]; drawing goes through
/// `embedded-graphics`.
pub trait StatusSurface: DrawTarget<Color = BinaryColor> + OriginDimensions {
    /// Physical panel behind this surface
    fn model(&self) -> PanelModel;

    /// Current rotation
    fn rotation(&self) -> Rotation;

    /// Push the drawn frame to the glass and wait for completion
    fn flush(&mut self, kind: RefreshKind) -> Result<(), DisplayError>;
}

/// Physical e-paper module
///
/// Implementations own the bus and control pins and know the controller
/// command set. The frame is the 1-bpp row-major buffer of a
/// [`crate::Canvas`] in logical (rotated) coordinates.
pub trait EpdPanel {
    /// Power up and load the controller's initial configuration
    fn init(&mut self) -> Result<(), DisplayError>;

    /// Transfer a frame and run the refresh waveform to completion
    fn transfer(
        &mut self,
        frame: &[u8],
        width: u16,
        height: u16,
        kind: RefreshKind,
    ) -> Result<(), DisplayError>;

    /// Put the controller into deep sleep
    fn sleep(&mut self) -> Result<(), DisplayError>;
}
