use bitflags::bitflags;

bitflags! {
    /// Measurements requested from [`crate::MS8607::get_reading`]
    #[cfg_attr(feature = "defmt", derive(defmt::Format))]
    pub struct Measurements: u8 {
        /// Temperature, in °C
        const TEMPERATURE = 0b0000_0001;
        /// Pressure, in mbar
        const PRESSURE = 0b0000_0010;
        /// Both temperature and pressure
        const ALL = Self::TEMPERATURE.bits | Self::PRESSURE.bits;
    }
}
