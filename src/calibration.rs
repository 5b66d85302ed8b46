//! Factory calibration held in the sensor's PROM

use crate::commands::PROM_WORDS;

/// Polynomial used by the PROM checksum
const CRC_POLY: u16 = 0x3000;

/// Bits of PROM word 0 that are not part of the checksum
const CRC_DATA_MASK: u16 = 0x0FFF;

/// The PROM checksum did not match its contents
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CrcMismatch {
    /// Checksum stored in the top nibble of PROM word 0
    pub expected: u8,
    /// Checksum computed over the PROM contents
    pub computed: u8,
}

/// Calculate the 4-bit checksum over a PROM image
///
/// The image is the 7 words read from the device followed by a zero word.
/// The checksum nibble in word 0 is masked out before the calculation and `prom` is left as it was.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn crc4(prom: &[u16; PROM_WORDS + 1]) -> u8 {
    let mut words = *prom;
    words[0] &= CRC_DATA_MASK;
    words[PROM_WORDS] = 0;

    let mut rem: u16 = 0;
    for byte in words.iter().flat_map(|w| w.to_be_bytes()) {
        rem ^= u16::from(byte);
        for _ in 0..8 {
            rem = if rem & 0x8000 == 0 {
                rem << 1
            } else {
                (rem << 1) ^ CRC_POLY
            };
        }
    }

    (rem >> 12) as u8
}

/// Check a PROM image against the checksum `expected`
#[must_use]
pub fn check_crc(prom: &[u16; PROM_WORDS + 1], expected: u8) -> bool {
    crc4(prom) == expected
}

/// Calibration coefficients read from the PROM
///
/// Names follow the datasheet (`C1`..`C6`).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CalibrationSet {
    crc: u8,
    /// Pressure sensitivity, `C1`
    pub press_sens: u16,
    /// Pressure offset, `C2`
    pub press_offset: u16,
    /// Temperature coefficient of pressure sensitivity, `C3`
    pub press_sens_temp_coeff: u16,
    /// Temperature coefficient of pressure offset, `C4`
    pub press_offset_temp_coeff: u16,
    /// Reference temperature, `C5`
    pub ref_temp: u16,
    /// Temperature coefficient of the temperature, `C6`
    pub temp_temp_coeff: u16,
}

impl CalibrationSet {
    /// Validate the 7 PROM words and pick out the coefficients
    ///
    /// Fails if the checksum in the top nibble of word 0 does not match.
    pub fn from_prom(prom: &[u16; PROM_WORDS]) -> Result<Self, CrcMismatch> {
        let mut image = [0; PROM_WORDS + 1];
        image[..PROM_WORDS].copy_from_slice(prom);

        // Top nibble of a u16
        #[allow(clippy::cast_possible_truncation)]
        let expected = (prom[0] >> 12) as u8;
        let computed = crc4(&image);
        if computed != expected {
            return Err(CrcMismatch { expected, computed });
        }

        Ok(Self {
            crc: expected,
            press_sens: prom[1],
            press_offset: prom[2],
            press_sens_temp_coeff: prom[3],
            press_offset_temp_coeff: prom[4],
            ref_temp: prom[5],
            temp_temp_coeff: prom[6],
        })
    }

    /// The checksum this set was validated against
    #[must_use]
    pub fn crc(&self) -> u8 {
        self.crc
    }
}
