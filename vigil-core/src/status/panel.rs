//! Status panels: layout and value formatting

use core::fmt::Write;

use embedded_graphics::prelude::{Point, Size};
use heapless::String;
use vigil_display::{PanelModel, Rotation};

use crate::settings::Settings;

/// Number of panels on the status screen
pub const PANEL_COUNT: usize = 6;

/// Formatted panel value
pub type ValueText = String<12>;

/// Panel identity, in screen order (left to right, top to bottom)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PanelKind {
    /// Aircraft currently tracked
    Traffic,
    /// Battery voltage
    Battery,
    /// Own device address
    Id,
    /// Radio protocol
    Protocol,
    /// Received packets
    Rx,
    /// Transmitted packets
    Tx,
}

impl PanelKind {
    pub const ALL: [PanelKind; PANEL_COUNT] = [
        PanelKind::Traffic,
        PanelKind::Battery,
        PanelKind::Id,
        PanelKind::Protocol,
        PanelKind::Rx,
        PanelKind::Tx,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }

    /// Title drawn in the panel's top-left corner
    pub const fn title(self, wide: bool) -> &'static str {
        match self {
            PanelKind::Traffic => "ACFTS",
            PanelKind::Battery => "BAT",
            PanelKind::Id => "ID",
            PanelKind::Protocol if wide => "PROT",
            PanelKind::Protocol => "PROTOCOL",
            PanelKind::Rx => "RX",
            PanelKind::Tx => "TX",
        }
    }
}

/// One on-screen rectangle showing a live value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Panel {
    pub kind: PanelKind,
    pub origin: Point,
    pub size: Size,
    pub title: &'static str,
    pub value: u32,
    /// Time of the last value update (ms)
    pub timestamp: u32,
}

impl Panel {
    pub const fn empty(kind: PanelKind) -> Self {
        Self {
            kind,
            origin: Point::zero(),
            size: Size::zero(),
            title: kind.title(false),
            value: 0,
            timestamp: 0,
        }
    }
}

/// Visible extent and vertical offset after panel-specific corrections
///
/// The DEPG0213BN controller reports 128 px on its short side but only
/// 122 px are visible; in 90 degree rotation the visible area also starts
/// 6 px down.
pub fn visible_area(reported: Size, model: PanelModel, rotation: Rotation) -> (Size, i32) {
    let mut width = reported.width;
    let mut height = reported.height;
    let mut dy = 0;

    if model == PanelModel::Depg0213bn {
        if width == 128 {
            width = 122;
        }
        if height == 128 {
            height = 122;
            if rotation == Rotation::Deg90 {
                dy = 6;
            }
        }
    }

    (Size::new(width, height), dy)
}

/// Lay out the six panels in two columns and three rows
pub fn layout(reported: Size, model: PanelModel, rotation: Rotation) -> [Panel; PANEL_COUNT] {
    let (area, dy) = visible_area(reported, model, rotation);
    let cell = Size::new(area.width / 2, area.height / 3);
    let wide = area.width >= area.height * 3 / 2;

    PanelKind::ALL.map(|kind| {
        let i = kind.index() as i32;
        let (col, row) = (i % 2, i / 2);
        Panel {
            kind,
            origin: Point::new(col * cell.width as i32, row * cell.height as i32 + dy),
            size: cell,
            title: kind.title(wide),
            value: 0,
            timestamp: 0,
        }
    })
}

/// Render a panel value the way it is shown on screen
///
/// - Battery values are tenths of a volt, shown with one decimal.
/// - The address is six upper-case hex digits.
/// - Protocol shows its short name; `value` is ignored.
/// - Counters wrap at 1000; TX reads `OFF` when the radio cannot transmit.
pub fn format_value(kind: PanelKind, value: u32, settings: &Settings, protocol: &str) -> ValueText {
    let mut out = ValueText::new();
    let _ = match kind {
        PanelKind::Traffic => write!(out, "{}", value),
        PanelKind::Battery => write!(out, "{}.{}", value / 10, value % 10),
        PanelKind::Id => write!(out, "{:06X}", value),
        PanelKind::Protocol => out.push_str(protocol).map_err(|_| core::fmt::Error),
        PanelKind::Rx => write!(out, "{}", value % 1000),
        PanelKind::Tx if !settings.transmits() => out.push_str("OFF").map_err(|_| core::fmt::Error),
        PanelKind::Tx => write!(out, "{}", value % 1000),
    };
    out
}
