//! Optional capability groups
//!
//! A target exposes a group by returning `Some` from the matching accessor
//! on [`super::Soc`]. Slots a target has nothing to do for keep their
//! default no-op bodies.

use vigil_hal::ResetCause;

use super::types::{DisplayKind, ShutdownReason, WifiParam};
use crate::settings::Volume;

/// Wireless networking
pub trait WifiOps {
    /// Apply a radio or DHCP parameter
    fn set_param(&mut self, param: WifiParam);

    /// Broadcast one datagram to every reachable peer
    ///
    /// Returns the number of datagrams handed to the socket.
    fn transmit_udp(&mut self, port: u16, payload: &[u8]) -> usize;

    /// Close every open socket
    fn stop_all(&mut self);

    /// Set the DHCP hostname
    fn set_hostname(&mut self, hostname: &str) -> bool;

    /// Associated stations in access-point role
    ///
    /// `None` when the device is not an access point.
    fn clients_count(&mut self) -> Option<usize>;
}

/// Piezo buzzer
pub trait SoundOps {
    /// Play the boot melody selected by the last reset cause
    fn test(&mut self, cause: ResetCause);

    /// Start an alert tone, or silence the buzzer for `hz <= 0`
    fn tone(&mut self, hz: i32, volume: Volume);
}

/// Status display
pub trait DisplayOps {
    /// Probe and initialize the display
    fn setup(&mut self) -> DisplayKind;

    fn loop_tick(&mut self) {}

    fn fini(&mut self, reason: ShutdownReason) {
        let _ = reason;
    }
}

/// Bluetooth serial link
pub trait BluetoothOps {
    fn setup(&mut self) {}

    fn loop_tick(&mut self) {}

    fn fini(&mut self) {}

    /// Bytes waiting to be read
    fn available(&mut self) -> usize;

    fn read(&mut self) -> Option<u8>;

    /// Queue bytes for transmission, returns how many were accepted
    fn write(&mut self, data: &[u8]) -> usize;
}

/// USB device-side serial link
pub trait UsbOps {
    fn setup(&mut self) {}

    fn loop_tick(&mut self) {}

    fn fini(&mut self) {}

    fn available(&mut self) -> usize;

    fn read(&mut self) -> Option<u8>;

    fn write(&mut self, data: &[u8]) -> usize;
}

/// Secondary serial module (978 MHz UAT receiver)
pub trait UatOps {
    fn begin(&mut self, baud: u32);

    fn restart(&mut self) {}
}

/// Hardware watchdog
pub trait WatchdogOps {
    fn setup(&mut self);

    fn feed(&mut self);

    fn fini(&mut self) {}
}

/// User button
pub trait ButtonOps {
    fn setup(&mut self) {}

    fn loop_tick(&mut self);

    fn fini(&mut self) {}
}
