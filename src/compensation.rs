//! Fixed-point conversion of raw ADC counts into calibrated readings
//!
//! All intermediates are `i64`.
//! The shifts and thresholds are those of the datasheet and must not be changed.

use crate::calibration::CalibrationSet;
use crate::{Pressure, RawSample, Reading, Temperature};

/// 20.00°C, in hundredths of a degree
const TEMP_REFERENCE: i64 = 2000;

/// -15.00°C, in hundredths of a degree
const TEMP_VERY_LOW: i64 = -1500;

/// Second-order correction terms
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct SecondOrder {
    pub t2: i64,
    pub off2: i64,
    pub sens2: i64,
}

/// Correction terms for non-linearity away from 20°C
///
/// `temp` is the first-order temperature in hundredths of a degree.
/// The branch is chosen on `temp` alone, 20.00°C itself counts as high.
pub(crate) fn second_order(dt: i64, temp: i64) -> SecondOrder {
    if temp >= TEMP_REFERENCE {
        return SecondOrder {
            t2: (5 * dt * dt) >> 38,
            off2: 0,
            sens2: 0,
        };
    }

    let below_ref = (temp - TEMP_REFERENCE) * (temp - TEMP_REFERENCE);
    let mut terms = SecondOrder {
        t2: (3 * dt * dt) >> 33,
        off2: 61 * below_ref / 16,
        sens2: 29 * below_ref / 16,
    };

    if temp < TEMP_VERY_LOW {
        let below_low = (temp - TEMP_VERY_LOW) * (temp - TEMP_VERY_LOW);
        terms.off2 += 17 * below_low;
        terms.sens2 += 9 * below_low;
    }

    terms
}

/// Compensate a raw sample, giving temperature and pressure in hundredths
///
/// Returned as `(temperature, pressure)`.
pub(crate) fn compensate_fixed(raw: RawSample, cal: &CalibrationSet) -> (i64, i64) {
    let dt = i64::from(raw.temperature) - (i64::from(cal.ref_temp) << 8);
    let temp = TEMP_REFERENCE + ((dt * i64::from(cal.temp_temp_coeff)) >> 23);

    let SecondOrder { t2, off2, sens2 } = second_order(dt, temp);

    let off = (i64::from(cal.press_offset) << 17)
        + ((i64::from(cal.press_offset_temp_coeff) * dt) >> 6)
        - off2;
    let sens = (i64::from(cal.press_sens) << 16)
        + ((i64::from(cal.press_sens_temp_coeff) * dt) >> 7)
        - sens2;

    let pres = (((i64::from(raw.pressure) * sens) >> 21) - off) >> 15;

    (temp - t2, pres)
}

/// Turn a raw sample into a calibrated [`Reading`]
///
/// Total over its input; there is nothing to fail here.
#[must_use]
pub fn compensate(raw: RawSample, cal: &CalibrationSet) -> Reading {
    let (temp, pres) = compensate_fixed(raw, cal);
    Reading {
        temperature: Temperature::from_hundredths(temp),
        pressure: Pressure::from_hundredths(pres),
    }
}
