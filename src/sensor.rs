//! Uniform sensor-event view of the two measurement channels
//!
//! The [`Sensor`] trait is the place to start here.
//! Each channel borrows the driver and packages whatever reading it last took; it never talks to
//! the device itself.
//!
//! ## Example
//!
//! ```no_run
//! use ms8607::sensor::{EventData, Sensor};
//! use ms8607::{Timestamp, MS8607};
//! # use embedded_hal_mock::eh1::{delay::NoopDelay, i2c::{Mock, Transaction}};
//! # fn main() -> Result<(), ms8607::Error<embedded_hal::i2c::ErrorKind>> {
//! # let mut sensor = MS8607::new(Mock::new(&[] as &[Transaction]), NoopDelay::new());
//!
//! sensor.begin(0)?;
//! sensor.measure()?;
//!
//! let temp = sensor.temperature_sensor();
//! println!("{} reads from {}", temp.metadata().name, temp.metadata().min_value);
//! if let Some(event) = temp.event(Timestamp::from_ticks(0)) {
//!     if let EventData::Temperature(t) = event.data {
//!         println!("Temperature: {}", t.0);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

use crate::{Pressure, Temperature, Timestamp, MS8607};

/// Version reported in every [`SensorEvent`] and [`SensorMetadata`]
pub const SENSOR_VERSION: i32 = 1;

/// What a channel measures
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorKind {
    /// Ambient temperature, in °C
    AmbientTemperature,
    /// Barometric pressure, in mbar
    Pressure,
}

/// Measured value carried by a [`SensorEvent`]
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EventData {
    #[allow(missing_docs)]
    Temperature(Temperature),
    #[allow(missing_docs)]
    Pressure(Pressure),
}

/// A single timestamped measurement from one channel
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SensorEvent {
    /// Always [`SENSOR_VERSION`]
    pub version: i32,
    /// ID of the channel that produced this
    pub sensor_id: i32,
    /// Kind of the channel that produced this
    pub kind: SensorKind,
    /// When the event was packaged, as given by the caller
    pub timestamp: Timestamp,
    /// The value itself
    pub data: EventData,
}

/// Static description of a channel
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SensorMetadata {
    /// Short human-readable name
    pub name: &'static str,
    /// Always [`SENSOR_VERSION`]
    pub version: i32,
    /// ID of the channel
    pub sensor_id: i32,
    /// Kind of the channel
    pub kind: SensorKind,
    /// Minimum delay between events, in microseconds; 0 means not applicable
    pub min_delay: i32,
    /// Lowest value the channel can report
    pub min_value: f32,
    /// Highest value the channel can report
    pub max_value: f32,
    /// Smallest step between two reported values
    pub resolution: f32,
}

/// Events produced by [`MS8607::get_reading`]
///
/// Measurements that weren't asked for are `None`.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Events {
    #[allow(missing_docs)]
    pub temperature: Option<SensorEvent>,
    #[allow(missing_docs)]
    pub pressure: Option<SensorEvent>,
}

/// A measurement channel of the sensor
pub trait Sensor {
    /// Package the driver's latest reading for this channel
    ///
    /// Returns `None` until the driver has completed a measurement.
    /// After a failed measurement this still returns the previous, stale, value.
    fn event(&self, timestamp: Timestamp) -> Option<SensorEvent>;

    /// Describe this channel
    fn metadata(&self) -> SensorMetadata;
}

macro_rules! sensor_impl {
    (
        $kind:ident,
        $field:ident,
        $sensor_kind:expr,
        $name:literal,
        $id:ident,
        ($min:literal, $max:literal, $res:literal)
    ) => {
        paste::paste! {
        #[doc = "The " $field " channel of an [`MS8607`]"]
        ///
        #[doc = "Get one with [`MS8607::" $field "_sensor`]."]
        pub struct [<$kind Sensor>]<'a, I, D>(pub(crate) &'a MS8607<I, D>);

        impl<'a, I, D> [<$kind Sensor>]<'a, I, D> {
            #[doc = "Metadata of any " $field " channel with ID `sensor_id`"]
            #[must_use]
            pub const fn describe(sensor_id: i32) -> SensorMetadata {
                SensorMetadata {
                    name: $name,
                    version: SENSOR_VERSION,
                    sensor_id,
                    kind: $sensor_kind,
                    min_delay: 0,
                    min_value: $min,
                    max_value: $max,
                    resolution: $res,
                }
            }
        }

        impl<'a, I, D> Sensor for [<$kind Sensor>]<'a, I, D> {
            fn event(&self, timestamp: Timestamp) -> Option<SensorEvent> {
                let reading = self.0.reading()?;
                Some(SensorEvent {
                    version: SENSOR_VERSION,
                    sensor_id: self.0.$id,
                    kind: $sensor_kind,
                    timestamp,
                    data: EventData::$kind(reading.$field),
                })
            }

            fn metadata(&self) -> SensorMetadata {
                Self::describe(self.0.$id)
            }
        }
        }
    };
}

sensor_impl!(
    Temperature,
    temperature,
    SensorKind::AmbientTemperature,
    "MS8607_T",
    temperature_id,
    (-40.0, 85.0, 0.01)
);
sensor_impl!(
    Pressure,
    pressure,
    SensorKind::Pressure,
    "MS8607_P",
    pressure_id,
    (10.0, 2000.0, 0.016)
);
