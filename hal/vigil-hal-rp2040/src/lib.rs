//! RP2040-specific HAL for Vigil boards
//!
//! This crate provides RP2040 implementations of the `vigil-hal` traits:
//! - Chip identity, heap, reset cause and restart
//! - PWM piezo buzzer
//! - GNSS UART receive gate and SPI bring-up latch
//! - EEPROM emulation backed by a wear-leveled flash partition
//! - Hardware watchdog and user button
//! - SSD1680 e-paper controller

#![no_std]

pub mod button;
pub mod buzzer;
pub mod chip;
pub mod eeprom;
pub mod epd;
pub mod gate;
pub mod watchdog;

// Re-export the shared traits for convenience
pub use vigil_hal::{Button, Chip, Eeprom, SerialInput, SpiHost, ToneOutput, Watchdog};
