//! To get started, create an [`MS8607`] and call [`MS8607::begin`] on it.
//!
//! Only the pressure/temperature half of the MS8607 is driven; the humidity sensor is left alone.
//!
//! ## Examples
//!
//! ```no_run
//! use ms8607::{Measurements, Timestamp, MS8607};
//! # use embedded_hal_mock::eh1::{delay::NoopDelay, i2c::{Mock, Transaction}};
//! # fn main() -> Result<(), ms8607::Error<embedded_hal::i2c::ErrorKind>> {
//!
//! // ... initialise i2c device and a delay
//! # let i2c = Mock::new(&[] as &[Transaction]);
//! # let delay = NoopDelay::new();
//!
//! let mut sensor = MS8607::new(i2c, delay);
//! sensor.begin(0)?; // loads and checks the factory calibration
//!
//! let reading = sensor.measure()?;
//! println!("{}°C, {}mbar", reading.temperature.0, reading.pressure.0);
//!
//! let events = sensor.get_reading(Measurements::PRESSURE, Timestamp::from_ticks(1000))?;
//! assert!(events.temperature.is_none());
//! # Ok(())
//! # }
//! ```
//!
//! ## Features
//!
//! The `defmt` feature provides logging of various levels with the
//! [`defmt`](https://defmt.ferrous-systems.com/introduction.html) crate.
//! It is disabled by default.
#![no_std]
#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::module_name_repetitions)]

pub mod calibration;
pub mod commands;
mod compensation;
mod flags;
pub mod sensor;

pub use calibration::{CalibrationSet, CrcMismatch};
pub use commands::Resolution;
pub use compensation::compensate;
pub use flags::Measurements;

use commands::{Channel, PROM_WORDS};
#[cfg(feature = "defmt")]
use defmt::{debug, info, trace, warn};
use embedded_hal::{delay::DelayNs, i2c::I2c};
use sensor::{Events, PressureSensor, Sensor, TemperatureSensor};

/// Millisecond timestamp attached to sensor events
///
/// The driver has no clock; callers provide these from their own timer.
pub type Timestamp = fugit::TimerInstantU32<1000>;

/// Everything that can go wrong talking to an [`MS8607`]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// The underlying bus reported an error
    I2c(E),
    /// The calibration PROM failed its checksum
    Crc(CrcMismatch),
    /// A measurement was requested before [`MS8607::begin`] succeeded
    NotInitialized,
}

impl<E> From<CrcMismatch> for Error<E> {
    fn from(err: CrcMismatch) -> Self {
        Self::Crc(err)
    }
}

/// A TE MS8607 pressure/temperature/humidity sensor, pressure and temperature side
///
/// The struct owns the I2C device and the delay provider until [`Self::destroy`] is called.
/// Nothing is read from the device until [`Self::begin`]; until that succeeds every measurement
/// method returns [`Error::NotInitialized`].
///
/// Measurements block the calling thread for two conversions of [`commands::CONVERSION_TIME`]
/// each.
pub struct MS8607<I, D> {
    i2c: I,
    delay: D,
    resolution: Resolution,
    calibration: Option<CalibrationSet>,
    reading: Option<Reading>,
    pub(crate) temperature_id: i32,
    pub(crate) pressure_id: i32,
}

impl<I, D> MS8607<I, D> {
    /// Take ownership of the bus and delay
    ///
    /// Performs no I/O; call [`Self::begin`] next.
    #[must_use]
    pub fn new(i2c: I, delay: D) -> Self {
        Self {
            i2c,
            delay,
            resolution: Resolution::Osr8192,
            calibration: None,
            reading: None,
            temperature_id: 0,
            pressure_id: 1,
        }
    }

    /// Destroy the sensor struct and yield the I2C device and delay it held
    #[must_use]
    pub fn destroy(self) -> (I, D) {
        (self.i2c, self.delay)
    }

    /// Whether the calibration has been loaded and passed its checksum
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.calibration.is_some()
    }

    /// Calibration loaded by the last successful [`Self::begin`]
    #[must_use]
    pub fn calibration(&self) -> Option<&CalibrationSet> {
        self.calibration.as_ref()
    }

    /// Oversampling ratio used for conversions
    #[must_use]
    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    /// The most recent reading
    ///
    /// # Note
    ///
    /// A failed measurement does not clear this, so after an error it still holds the last
    /// *successful* reading.
    /// Check the result of [`Self::measure`] if staleness matters.
    #[must_use]
    pub fn reading(&self) -> Option<Reading> {
        self.reading
    }

    /// The temperature channel, as a [`Sensor`]
    #[must_use]
    pub fn temperature_sensor(&self) -> TemperatureSensor<'_, I, D> {
        TemperatureSensor(self)
    }

    /// The pressure channel, as a [`Sensor`]
    #[must_use]
    pub fn pressure_sensor(&self) -> PressureSensor<'_, I, D> {
        PressureSensor(self)
    }
}

impl<I, E, D> MS8607<I, D>
where
    I: I2c<Error = E>,
    D: DelayNs,
{
    /// Load the factory calibration and get ready to measure
    ///
    /// Actions carried out:
    ///
    /// 1. Reads the 7 PROM words.
    /// 1. Checks them against the checksum held in the first word.
    /// 1. Stores the coefficients and fixes the resolution at [`Resolution::Osr8192`].
    ///
    /// The temperature channel takes `sensor_id` as its ID and the pressure channel `sensor_id + 1`.
    ///
    /// Calling this again re-initialises the driver.
    /// On any failure the driver is left uninitialised.
    pub fn begin(&mut self, sensor_id: i32) -> Result<(), Error<E>> {
        #[cfg(feature = "defmt")]
        debug!("Initialising MS8607 with sensor ID {}", sensor_id);
        self.calibration = None;
        self.reading = None;
        self.temperature_id = sensor_id;
        self.pressure_id = sensor_id.wrapping_add(1);

        let prom = self.read_prom()?;
        let calibration = CalibrationSet::from_prom(&prom).map_err(|err| {
            #[cfg(feature = "defmt")]
            warn!(
                "PROM checksum mismatch: expected {}, computed {}",
                err.expected, err.computed
            );
            Error::Crc(err)
        })?;

        self.calibration = Some(calibration);
        self.resolution = Resolution::Osr8192;
        #[cfg(feature = "defmt")]
        info!("MS8607 calibration loaded");
        Ok(())
    }

    /// Send the reset command
    ///
    /// Doesn't reload the calibration - use [`Self::begin`] for this.
    pub fn reset(&mut self) -> Result<(), Error<E>> {
        #[cfg(feature = "defmt")]
        debug!("Resetting device");
        self.i2c
            .write(commands::ADDR, &[commands::RESET])
            .map_err(Error::I2c)
    }

    /// Convert and read back raw temperature, then raw pressure
    ///
    /// The first bus error aborts the cycle.
    pub fn read_raw(&mut self) -> Result<RawSample, Error<E>> {
        if !self.is_initialized() {
            return Err(Error::NotInitialized);
        }
        let temperature = self.convert(Channel::Temperature)?;
        let pressure = self.convert(Channel::Pressure)?;
        Ok(RawSample {
            temperature,
            pressure,
        })
    }

    /// Take a measurement and compensate it
    ///
    /// On success the result is also cached, see [`Self::reading`].
    /// On failure the cache is left as it was.
    pub fn measure(&mut self) -> Result<Reading, Error<E>> {
        let calibration = self.calibration.ok_or(Error::NotInitialized)?;
        let raw = self.read_raw()?;
        let reading = compensate(raw, &calibration);
        #[cfg(feature = "defmt")]
        debug!("Measured {}", reading);
        self.reading = Some(reading);
        Ok(reading)
    }

    /// Take a measurement and package the requested parts of it as sensor events
    pub fn get_reading(
        &mut self,
        wanted: Measurements,
        timestamp: Timestamp,
    ) -> Result<Events, Error<E>> {
        self.measure()?;

        let mut events = Events::default();
        if wanted.contains(Measurements::TEMPERATURE) {
            events.temperature = self.temperature_sensor().event(timestamp);
        }
        if wanted.contains(Measurements::PRESSURE) {
            events.pressure = self.pressure_sensor().event(timestamp);
        }
        Ok(events)
    }

    fn read_prom(&mut self) -> Result<[u16; PROM_WORDS], Error<E>> {
        let mut prom = [0; PROM_WORDS];
        for (i, word) in prom.iter_mut().enumerate() {
            let mut raw = [0; 2];
            self.i2c
                .write_read(commands::ADDR, &[commands::prom_address(i)], &mut raw)
                .map_err(Error::I2c)?;
            *word = u16::from_be_bytes(raw);
        }
        #[cfg(feature = "defmt")]
        trace!("Read PROM {}", prom);
        Ok(prom)
    }

    fn convert(&mut self, ch: Channel) -> Result<u32, Error<E>> {
        let command = ch.start_command(self.resolution);
        #[cfg(feature = "defmt")]
        trace!("Starting {} conversion with {=u8:#x}", ch, command);
        self.i2c
            .write(commands::ADDR, &[command])
            .map_err(Error::I2c)?;

        self.delay.delay_ms(commands::CONVERSION_TIME.to_millis());

        let mut raw = [0; 4];
        self.i2c
            .write_read(commands::ADDR, &[commands::READ_ADC], &mut raw[1..])
            .map_err(Error::I2c)?;
        Ok(u32::from_be_bytes(raw))
    }
}

/// Raw 24-bit ADC counts from one measurement cycle
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RawSample {
    /// Raw temperature, `D2` in the datasheet
    pub temperature: u32,
    /// Raw pressure, `D1` in the datasheet
    pub pressure: u32,
}

/// A compensated temperature and pressure pair
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Reading {
    #[allow(missing_docs)]
    pub temperature: Temperature,
    #[allow(missing_docs)]
    pub pressure: Pressure,
}

macro_rules! reading_impl {
    ($kind:ident, $unit:expr) => {
        paste::paste! {
        #[doc = $kind " reading, in"]
        #[doc = $unit]
        #[derive(Copy, Clone, Debug, PartialEq, PartialOrd)]
        #[repr(transparent)]
        pub struct $kind(pub f32);
        impl $kind {
            #[allow(clippy::cast_precision_loss)]
            pub(crate) fn from_hundredths(raw: i64) -> Self {
                let res = raw as f32 / 100.0;
                #[cfg(feature = "defmt")]
                trace!("Converted compensated output {} to {}", raw, res);
                Self(res)
            }
        }
        #[cfg(feature = "defmt")]
        impl defmt::Format for $kind {
            fn format(&self, f: defmt::Formatter) {
                defmt::write!(f, "{}{}", self.0, $unit);
            }
        }
        }
    };
}

reading_impl!(Pressure, "mbar");
reading_impl!(Temperature, "°C");
