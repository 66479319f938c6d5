//! Status screen refresh scheduler
//!
//! Pulls live values from the application at a fixed interval, draws the
//! six panels and hands the frame to the display. E-paper refreshes take
//! hundreds of milliseconds, so at most one refresh is ever in flight:
//! while one is pending, new repaints are dropped rather than queued.

use embedded_graphics::mono_font::ascii::{FONT_10X20, FONT_6X10, FONT_9X15_BOLD};
use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{PrimitiveStyle, Rectangle, RoundedRectangle};
use embedded_graphics::text::{Alignment, Baseline, Text, TextStyleBuilder};
use vigil_display::{DisplayError, RefreshKind, StatusSurface};

use super::panel::{format_value, layout, Panel, PanelKind, PANEL_COUNT};
use crate::settings::Settings;

/// Live values the status screen shows
///
/// Implemented by the application; read on every due tick.
pub trait StatusSource {
    /// Aircraft currently tracked
    fn traffic_count(&self) -> u32;

    /// Battery voltage in volts
    fn battery_voltage(&self) -> f32;

    fn rx_packets(&self) -> u32;

    fn tx_packets(&self) -> u32;

    fn settings(&self) -> Settings;

    /// Own 24-bit device address
    fn device_address(&self) -> u32;

    /// Name shown on the protocol panel
    fn protocol_name(&self) -> &'static str {
        self.settings().protocol.short_name()
    }
}

/// How a finished frame reaches the glass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FlushMode {
    /// The surface flushes synchronously inside `repaint`
    #[default]
    Blocking,
    /// A background task transfers the frame and reports back
    Deferred,
}

/// Scheduler configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StatusConfig {
    /// Minimum time between repaints (ms)
    pub interval_ms: u32,
    pub flush: FlushMode,
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            interval_ms: 2000,
            flush: FlushMode::Blocking,
        }
    }
}

/// Refresh guard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RefreshState {
    /// Nothing in flight
    #[default]
    Idle,
    /// A partial refresh is waiting for or undergoing transfer
    FastPending,
    /// A full refresh is waiting for or undergoing transfer
    FullPending,
}

impl RefreshState {
    fn pending(kind: RefreshKind) -> Self {
        match kind {
            RefreshKind::Fast => RefreshState::FastPending,
            RefreshKind::Full => RefreshState::FullPending,
        }
    }

    /// Waveform the background task should run, if anything is pending
    pub fn pending_kind(self) -> Option<RefreshKind> {
        match self {
            RefreshState::Idle => None,
            RefreshState::FastPending => Some(RefreshKind::Fast),
            RefreshState::FullPending => Some(RefreshKind::Full),
        }
    }
}

/// Result of a repaint request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RepaintOutcome {
    /// A refresh was already in flight (or the screen is not set up); nothing drawn
    Skipped,
    /// Frame drawn and pushed to the glass synchronously
    Flushed(RefreshKind),
    /// Frame drawn and left for the background task
    Queued(RefreshKind),
    /// Drawing or the synchronous flush failed
    Failed(DisplayError),
}

/// Status screen scheduler
pub struct StatusScheduler {
    config: StatusConfig,
    panels: [Panel; PANEL_COUNT],
    state: RefreshState,
    last_repaint_ms: u32,
    full_next: bool,
    initialized: bool,
}

impl StatusScheduler {
    pub fn new(config: StatusConfig) -> Self {
        Self {
            config,
            panels: PanelKind::ALL.map(Panel::empty),
            state: RefreshState::Idle,
            last_repaint_ms: 0,
            full_next: true,
            initialized: false,
        }
    }

    pub fn config(&self) -> &StatusConfig {
        &self.config
    }

    pub fn state(&self) -> RefreshState {
        self.state
    }

    pub fn panels(&self) -> &[Panel; PANEL_COUNT] {
        &self.panels
    }

    /// Time of the last due tick (ms)
    pub fn last_repaint_ms(&self) -> u32 {
        self.last_repaint_ms
    }

    pub fn panel(&self, kind: PanelKind) -> &Panel {
        &self.panels[kind.index()]
    }

    /// Lay the panels out for `surface` and seed their values
    ///
    /// Dynamic counters start at zero; the address and protocol are fixed
    /// for the session. The next deferred frame is a full refresh.
    pub fn initialize<S, Src>(&mut self, now_ms: u32, surface: &S, source: &Src)
    where
        S: StatusSurface,
        Src: StatusSource + ?Sized,
    {
        self.panels = layout(surface.size(), surface.model(), surface.rotation());
        for panel in self.panels.iter_mut() {
            panel.value = match panel.kind {
                PanelKind::Id => source.device_address(),
                PanelKind::Protocol => source.settings().protocol as u32,
                _ => 0,
            };
            panel.timestamp = now_ms;
        }
        self.last_repaint_ms = now_ms;
        self.full_next = true;
        self.initialized = true;
    }

    /// Refresh the screen if the interval has elapsed
    ///
    /// Returns `true` when the tick was due, whether or not the repaint
    /// itself went through.
    pub fn tick<S, Src>(&mut self, now_ms: u32, surface: &mut S, source: &Src) -> bool
    where
        S: StatusSurface,
        Src: StatusSource + ?Sized,
    {
        if !self.initialized || now_ms.wrapping_sub(self.last_repaint_ms) < self.config.interval_ms
        {
            return false;
        }

        self.update(PanelKind::Traffic, source.traffic_count(), now_ms);
        // Saturating float cast: negative or NaN readings show as 0.0
        self.update(
            PanelKind::Battery,
            (source.battery_voltage() * 10.0) as u32,
            now_ms,
        );
        self.update(PanelKind::Rx, source.rx_packets() % 1000, now_ms);
        self.update(PanelKind::Tx, source.tx_packets() % 1000, now_ms);

        let _outcome = self.repaint(surface, source);
        #[cfg(feature = "defmt")]
        defmt::trace!("status: {}", _outcome);

        self.last_repaint_ms = now_ms;
        true
    }

    fn update(&mut self, kind: PanelKind, value: u32, now_ms: u32) {
        let panel = &mut self.panels[kind.index()];
        panel.value = value;
        panel.timestamp = now_ms;
    }

    /// Draw all panels and push or queue the frame
    ///
    /// Does nothing while a refresh is pending.
    pub fn repaint<S, Src>(&mut self, surface: &mut S, source: &Src) -> RepaintOutcome
    where
        S: StatusSurface,
        Src: StatusSource + ?Sized,
    {
        if !self.initialized || self.state != RefreshState::Idle {
            return RepaintOutcome::Skipped;
        }

        let settings = source.settings();
        if self
            .draw(surface, &settings, source.protocol_name())
            .is_err()
        {
            return RepaintOutcome::Failed(DisplayError::Communication);
        }

        let kind = if self.full_next {
            RefreshKind::Full
        } else {
            RefreshKind::Fast
        };

        match self.config.flush {
            FlushMode::Blocking => match surface.flush(kind) {
                Ok(()) => {
                    self.full_next = false;
                    RepaintOutcome::Flushed(kind)
                }
                Err(e) => RepaintOutcome::Failed(e),
            },
            FlushMode::Deferred => {
                self.full_next = false;
                self.set_state(RefreshState::pending(kind));
                RepaintOutcome::Queued(kind)
            }
        }
    }

    /// Background transfer finished
    pub fn flush_complete(&mut self) {
        self.set_state(RefreshState::Idle);
    }

    /// Make the next frame a full refresh
    ///
    /// A refresh already in flight keeps its waveform.
    pub fn request_full(&mut self) {
        self.full_next = true;
    }

    /// Show the next page (single page layout, nothing to do)
    pub fn next(&mut self) {}

    /// Show the previous page (single page layout, nothing to do)
    pub fn previous(&mut self) {}

    fn set_state(&mut self, state: RefreshState) {
        #[cfg(feature = "defmt")]
        if state != self.state {
            defmt::trace!("refresh: {} -> {}", self.state, state);
        }
        self.state = state;
    }

    fn draw<D>(&self, target: &mut D, settings: &Settings, protocol: &str) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = BinaryColor>,
    {
        target.clear(BinaryColor::Off)?;
        for panel in self.panels.iter() {
            let text = format_value(panel.kind, panel.value, settings, protocol);
            draw_panel(target, panel, &text)?;
        }
        Ok(())
    }
}

fn draw_panel<D>(target: &mut D, panel: &Panel, text: &str) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    let frame = Rectangle::new(
        panel.origin + Point::new(1, 1),
        Size::new(
            panel.size.width.saturating_sub(2),
            panel.size.height.saturating_sub(2),
        ),
    );
    RoundedRectangle::with_equal_corners(frame, Size::new(4, 4))
        .into_styled(PrimitiveStyle::with_stroke(BinaryColor::On, 1))
        .draw(target)?;

    let title_style = MonoTextStyle::new(&FONT_6X10, BinaryColor::On);
    Text::with_baseline(
        panel.title,
        panel.origin + Point::new(5, 4),
        title_style,
        Baseline::Top,
    )
    .draw(target)?;

    // Six hex digits need the narrower face to fit a half-width panel
    let font = if panel.kind == PanelKind::Id {
        &FONT_9X15_BOLD
    } else {
        &FONT_10X20
    };
    let value_style = MonoTextStyle::new(font, BinaryColor::On);
    let placement = TextStyleBuilder::new()
        .alignment(Alignment::Right)
        .baseline(Baseline::Bottom)
        .build();
    let anchor = panel.origin
        + Point::new(
            panel.size.width as i32 - 6,
            panel.size.height as i32 - 4,
        );
    Text::with_text_style(text, anchor, value_style, placement).draw(target)?;

    Ok(())
}
