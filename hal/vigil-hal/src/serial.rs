//! Serial input abstractions
//!
//! The GNSS/telemetry input is a serial channel that shares a physical
//! resource window with the radio stack on small chips (software UART on
//! the ESP8266, shared DMA on others). It must be possible to pause
//! reception around a wireless send without tearing down the port.

/// Serial input channel with receive gating
pub trait SerialInput {
    /// Open the port at the given baud rate
    fn begin(&mut self, config: SerialConfig);

    /// Enable or disable reception
    ///
    /// While disabled the implementation must not sample the line. Bytes
    /// arriving in that window may be lost; the caller accepts this.
    fn enable_rx(&mut self, enabled: bool);

    /// Check whether reception is currently enabled
    fn is_rx_enabled(&self) -> bool;
}

/// Serial configuration
///
/// GNSS receivers all speak 8N1; only the rate varies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SerialConfig {
    pub baudrate: u32,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self::with_baud(9600)
    }
}

impl SerialConfig {
    pub const fn with_baud(baudrate: u32) -> Self {
        Self { baudrate }
    }
}
