//! Supply (battery) voltage sensor.
//!
//! The supply feeds ADC1 through an R1/R2 divider.  The reading is
//! scaled back up by the divider ratio and converted to millivolts
//! against the ADC full-scale reference.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: reads the VBAT channel via the oneshot API (initialised by hw_init).
//! On host/test: reads from a static AtomicU16 for injection.

use core::sync::atomic::AtomicU16;
#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::Ordering;

#[cfg(target_os = "espidf")]
use crate::drivers::hw_init;
use crate::config::SystemConfig;
use crate::error::HardwareError;

static SIM_VBAT_ADC: AtomicU16 = AtomicU16::new(0);

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_vbat_adc(raw: u16) {
    SIM_VBAT_ADC.store(raw, Ordering::Relaxed);
}

/// Divider and ADC scaling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoltageDivider {
    pub r1_ohms: u32,
    pub r2_ohms: u32,
    pub adc_ref_mv: u32,
    pub adc_max: u16,
}

impl VoltageDivider {
    pub fn from_config(config: &SystemConfig) -> Self {
        Self {
            r1_ohms: config.vbat_r1_ohms,
            r2_ohms: config.vbat_r2_ohms,
            adc_ref_mv: config.adc_ref_mv,
            adc_max: config.adc_max,
        }
    }

    /// Convert a raw ADC count to supply millivolts.
    pub fn to_millivolts(&self, raw: u16) -> u16 {
        let mut mv = u64::from(raw);
        mv *= u64::from(self.r1_ohms) + u64::from(self.r2_ohms);
        mv /= u64::from(self.r2_ohms.max(1));
        mv *= u64::from(self.adc_ref_mv);
        mv /= u64::from(self.adc_max.max(1));
        mv.min(u64::from(u16::MAX)) as u16
    }
}

#[derive(Debug, Clone, Copy)]
pub struct BatteryReading {
    pub raw: u16,
    pub millivolts: u16,
}

pub struct BatterySensor {
    divider: VoltageDivider,
    adc1_channel: u32,
}

impl BatterySensor {
    pub fn new(adc1_channel: u32, divider: VoltageDivider) -> Self {
        Self {
            divider,
            adc1_channel,
        }
    }

    pub fn channel(&self) -> u32 {
        self.adc1_channel
    }

    pub fn read(&self) -> Result<BatteryReading, HardwareError> {
        let raw = self.read_adc()?;
        Ok(BatteryReading {
            raw,
            millivolts: self.divider.to_millivolts(raw),
        })
    }

    #[cfg(target_os = "espidf")]
    fn read_adc(&self) -> Result<u16, HardwareError> {
        hw_init::adc1_read(self.adc1_channel).ok_or(HardwareError::AdcReadFailed)
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_adc(&self) -> Result<u16, HardwareError> {
        Ok(SIM_VBAT_ADC.load(Ordering::Relaxed))
    }
}
