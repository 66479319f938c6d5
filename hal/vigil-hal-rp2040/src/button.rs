//! Active-low push button with click and long-press detection

use embassy_rp::gpio::Input;
use vigil_hal::{Button, ButtonEvent};

/// Samples closer together than this are treated as bounce
const DEBOUNCE_MS: u32 = 30;
/// Hold time that turns a press into a long press
const LONG_PRESS_MS: u32 = 2_000;
/// Window in which a second click makes a double click
const DOUBLE_CLICK_MS: u32 = 400;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Gesture {
    Released,
    Pressed { since: u32 },
    /// Long press already reported, waiting for release
    Held,
    /// One click seen, waiting to see if another follows
    Clicked { at: u32 },
}

/// Button on a GPIO with the internal pull-up enabled
pub struct GpioButton {
    pin: Input<'static>,
    gesture: Gesture,
    last_change: u32,
    enabled: bool,
}

impl GpioButton {
    pub fn new(pin: Input<'static>) -> Self {
        Self {
            pin,
            gesture: Gesture::Released,
            last_change: 0,
            enabled: false,
        }
    }
}

impl Button for GpioButton {
    fn init(&mut self) {
        self.gesture = Gesture::Released;
        self.enabled = true;
    }

    fn poll(&mut self, now_ms: u32) -> Option<ButtonEvent> {
        if !self.enabled {
            return None;
        }
        let down = self.pin.is_low();
        if now_ms.wrapping_sub(self.last_change) < DEBOUNCE_MS {
            return None;
        }

        match (self.gesture, down) {
            (Gesture::Released, true) | (Gesture::Clicked { .. }, true) => {
                let second = matches!(self.gesture, Gesture::Clicked { .. });
                self.last_change = now_ms;
                self.gesture = Gesture::Pressed { since: now_ms };
                if second {
                    self.gesture = Gesture::Held;
                    return Some(ButtonEvent::DoubleClick);
                }
                None
            }
            (Gesture::Pressed { since }, true) => {
                if now_ms.wrapping_sub(since) >= LONG_PRESS_MS {
                    self.gesture = Gesture::Held;
                    return Some(ButtonEvent::LongPress);
                }
                None
            }
            (Gesture::Pressed { .. }, false) => {
                self.last_change = now_ms;
                self.gesture = Gesture::Clicked { at: now_ms };
                None
            }
            (Gesture::Clicked { at }, false) => {
                if now_ms.wrapping_sub(at) >= DOUBLE_CLICK_MS {
                    self.gesture = Gesture::Released;
                    return Some(ButtonEvent::Click);
                }
                None
            }
            (Gesture::Held, false) => {
                self.last_change = now_ms;
                self.gesture = Gesture::Released;
                None
            }
            (Gesture::Held, true) | (Gesture::Released, false) => None,
        }
    }

    fn deinit(&mut self) {
        self.enabled = false;
    }
}
