//! Battery parameters
//!
//! Thresholds depend on the cell chemistry the board is built with; the
//! live voltage comes from an ADC reading scaled by the board's divider.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Quantity requested through the capability table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BatteryParam {
    /// Voltage below which the low-battery warning is shown
    Threshold,
    /// Voltage below which the device shuts down
    Cutoff,
    /// State of charge in percent
    Charge,
    /// Current voltage
    Voltage,
}

/// Cell chemistry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Chemistry {
    /// Two NiMH cells in series
    #[default]
    NiMhX2,
    /// Single lithium-polymer cell
    LiPo,
}

impl Chemistry {
    /// Low-battery warning level in volts
    pub const fn threshold(self) -> f32 {
        match self {
            Chemistry::NiMhX2 => 2.3,
            Chemistry::LiPo => 3.5,
        }
    }

    /// Shutdown level in volts
    pub const fn cutoff(self) -> f32 {
        match self {
            Chemistry::NiMhX2 => 2.1,
            Chemistry::LiPo => 3.2,
        }
    }
}

/// Battery monitor configuration
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BatteryConfig {
    pub chemistry: Chemistry,
    /// ADC counts per volt at the pin, divider included
    pub counts_per_volt: f32,
}

impl Default for BatteryConfig {
    fn default() -> Self {
        Self {
            chemistry: Chemistry::NiMhX2,
            // 10-bit ADC, 1.0 V full scale, 1:4.2 divider
            counts_per_volt: 1023.0 / 4.2,
        }
    }
}

impl BatteryConfig {
    /// Answer a parameter query given the latest raw ADC reading
    ///
    /// Charge is not measured on these boards and always reads 100 %.
    pub fn param(&self, param: BatteryParam, adc: u16) -> f32 {
        match param {
            BatteryParam::Threshold => self.chemistry.threshold(),
            BatteryParam::Cutoff => self.chemistry.cutoff(),
            BatteryParam::Charge => 100.0,
            BatteryParam::Voltage => self.voltage(adc),
        }
    }

    /// Convert a raw ADC reading to volts
    pub fn voltage(&self, adc: u16) -> f32 {
        if self.counts_per_volt <= 0.0 {
            return 0.0;
        }
        adc as f32 / self.counts_per_volt
    }
}
