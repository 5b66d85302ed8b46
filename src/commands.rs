//! Bus addresses and command bytes for the pressure/temperature half of the MS8607

use fugit::MillisDurationU32;

/// 7-bit I2C address of the pressure/temperature sensor
pub const ADDR: u8 = 0x76;

/// Reset the pressure/temperature sensor
pub const RESET: u8 = 0x1E;

/// Read the first PROM word
///
/// Subsequent words live at [`PROM_STRIDE`] byte offsets from here.
pub const PROM_READ_BASE: u8 = 0xA0;

/// Distance between PROM word addresses
pub const PROM_STRIDE: u8 = 2;

/// Number of 16-bit words in the calibration PROM
pub const PROM_WORDS: usize = 7;

/// Start a pressure (`D1`) conversion
pub const START_PRESSURE_CONVERSION: u8 = 0x40;

/// Start a temperature (`D2`) conversion
pub const START_TEMPERATURE_CONVERSION: u8 = 0x50;

/// Read back the result of the last conversion
pub const READ_ADC: u8 = 0x00;

/// Time to wait between starting a conversion and reading it back
///
/// Sized for [`Resolution::Osr8192`], the only resolution this driver uses.
// TODO: derive from the resolution once it becomes configurable
pub const CONVERSION_TIME: MillisDurationU32 = MillisDurationU32::from_ticks(18);

/// Oversampling ratio of the onboard ADC
///
/// Higher ratios give finer readings at the cost of longer conversions.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Resolution {
    /// OSR = 256
    Osr256 = 0,
    /// OSR = 512
    Osr512 = 1,
    /// OSR = 1024
    Osr1024 = 2,
    /// OSR = 2048
    Osr2048 = 3,
    /// OSR = 4096
    Osr4096 = 4,
    /// OSR = 8192
    Osr8192 = 5,
}

/// Which quantity the ADC should convert
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Channel {
    /// Raw temperature, `D2` in the datasheet
    Temperature,
    /// Raw pressure, `D1` in the datasheet
    Pressure,
}

impl Channel {
    /// Command byte starting a conversion of this channel at `resolution`
    #[must_use]
    pub const fn start_command(self, resolution: Resolution) -> u8 {
        let flag = match self {
            Channel::Temperature => START_TEMPERATURE_CONVERSION,
            Channel::Pressure => START_PRESSURE_CONVERSION,
        };
        (resolution as u8 * 2) | flag
    }
}

/// Bus address of PROM word `index`
#[must_use]
pub(crate) const fn prom_address(index: usize) -> u8 {
    // index < PROM_WORDS, so this never truncates
    #[allow(clippy::cast_possible_truncation)]
    let index = index as u8;
    PROM_READ_BASE + PROM_STRIDE * index
}
