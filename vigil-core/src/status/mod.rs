//! Status panel display
//!
//! Six fixed panels (traffic, battery, id, protocol, rx, tx) refreshed at
//! a fixed interval, with at most one e-paper refresh in flight.

pub mod panel;
pub mod scheduler;

pub use panel::{format_value, layout, visible_area, Panel, PanelKind, ValueText, PANEL_COUNT};
pub use scheduler::{
    FlushMode, RefreshState, RepaintOutcome, StatusConfig, StatusScheduler, StatusSource,
};
