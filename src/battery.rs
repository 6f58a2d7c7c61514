//! Battery gauge collaborator.
//!
//! The host supplies the battery computation; the engine only forwards raw
//! ADC readings to whatever [`BatteryGauge`] it was built with. A linear
//! gauge is provided as the default.

use serde::{Deserialize, Serialize};

/// Full-scale reading of the 12-bit battery ADC.
pub const ADC_FULL_SCALE: f64 = 4095.0;

/// Battery state derived from one ADC reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BatteryInfo {
    /// Charge level, 0-100
    pub percent: u8,
    /// Estimated cell voltage
    pub voltage_v: f64,
    /// Estimated remaining capacity in mAh
    pub capacity_mah: f64,
}

/// Maps a raw ADC reading to battery state.
pub trait BatteryGauge: Send + Sync {
    fn from_raw_adc(&self, raw_adc: f64) -> BatteryInfo;
}

/// Linear mapping from the ADC range onto voltage and capacity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearBatteryGauge {
    /// Voltage reported at an ADC reading of 0
    pub empty_voltage_v: f64,
    /// Voltage reported at full scale
    pub full_voltage_v: f64,
    /// Capacity reported at full scale
    pub rated_capacity_mah: f64,
}

impl Default for LinearBatteryGauge {
    fn default() -> Self {
        Self {
            empty_voltage_v: 3.0,
            full_voltage_v: 4.2,
            rated_capacity_mah: 500.0,
        }
    }
}

impl BatteryGauge for LinearBatteryGauge {
    fn from_raw_adc(&self, raw_adc: f64) -> BatteryInfo {
        // NaN compares false everywhere; treat it as an empty reading
        let raw = if raw_adc.is_nan() {
            0.0
        } else {
            raw_adc.clamp(0.0, ADC_FULL_SCALE)
        };
        let fraction = raw / ADC_FULL_SCALE;

        BatteryInfo {
            percent: (fraction * 100.0).round() as u8,
            voltage_v: self.empty_voltage_v + fraction * (self.full_voltage_v - self.empty_voltage_v),
            capacity_mah: fraction * self.rated_capacity_mah,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_gauge_endpoints() {
        let gauge = LinearBatteryGauge::default();

        let empty = gauge.from_raw_adc(0.0);
        assert_eq!(empty.percent, 0);
        assert_eq!(empty.voltage_v, 3.0);
        assert_eq!(empty.capacity_mah, 0.0);

        let full = gauge.from_raw_adc(ADC_FULL_SCALE);
        assert_eq!(full.percent, 100);
        assert!((full.voltage_v - 4.2).abs() < 1e-12);
        assert_eq!(full.capacity_mah, 500.0);
    }

    #[test]
    fn test_linear_gauge_clamps() {
        let gauge = LinearBatteryGauge::default();
        assert_eq!(gauge.from_raw_adc(-50.0), gauge.from_raw_adc(0.0));
        assert_eq!(gauge.from_raw_adc(10_000.0), gauge.from_raw_adc(ADC_FULL_SCALE));
        assert_eq!(gauge.from_raw_adc(f64::NAN).percent, 0);
    }

    #[test]
    fn test_linear_gauge_midpoint() {
        let info = LinearBatteryGauge::default().from_raw_adc(ADC_FULL_SCALE / 2.0);
        assert_eq!(info.percent, 50);
        assert!((info.voltage_v - 3.6).abs() < 1e-12);
    }
}
