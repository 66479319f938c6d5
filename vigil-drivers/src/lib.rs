//! Capability-table backends
//!
//! This crate provides concrete [`vigil_core::soc::Soc`] implementations
//! assembled from `vigil-hal` peripherals:
//!
//! - ESP8266-class boards (Wi-Fi, software-serial GNSS, piezo buzzer; no
//!   Bluetooth, USB or display)
//! - Radio module identification shared by the backends

#![no_std]
#![deny(unsafe_code)]

pub mod esp8266;
pub mod radio;
