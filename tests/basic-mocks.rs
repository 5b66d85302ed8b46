use ms8607::sensor::{EventData, Sensor, SensorKind};
use ms8607::*;

use embedded_hal::i2c::ErrorKind;
use embedded_hal_mock::eh1::delay::NoopDelay;
use embedded_hal_mock::eh1::i2c::{Mock, Transaction};
use once_cell::sync::Lazy;
use rand::prelude::*;
use std::ops::Deref;
use test_case::test_case;

type MS8607 = ms8607::MS8607<Mock, NoopDelay>;

const ADDR: u8 = commands::ADDR;

macro_rules! w {
    ($($byte:expr),*) => {
        Transaction::write(ADDR, vec![
            $($byte,)*
        ])
    };
}

macro_rules! wr {
    ($($wbyte:expr),* ; $($rbyte:expr),*) => {
        Transaction::write_read(
            ADDR,
            vec![
                $($wbyte,)*
            ],
            vec![
                $($rbyte,)*
            ],
        )
    }
}

// Coefficients from the datasheet's worked example, checksum 3 in the top nibble
const PROM: [u16; 7] = [0x3A14, 0xB524, 0xABCD, 0x7183, 0x6CC2, 0x7B41, 0x6E05];

fn prom_transactions(prom: &[u16; 7]) -> Vec<Transaction> {
    prom.iter()
        .enumerate()
        .map(|(i, word)| {
            let [hi, lo] = word.to_be_bytes();
            wr!(0xA0 + 2 * i as u8; hi, lo)
        })
        .collect()
}

static BEGIN: Lazy<Vec<Transaction>> = Lazy::new(|| prom_transactions(&PROM));

// D2 = 8077636, D1 = 6465444
static MEASURE: Lazy<[Transaction; 4]> = Lazy::new(|| {
    [
        // Start temperature conversion, OSR 8192
        w!(0x5A),
        // Read ADC
        wr!(0x00; 0x7B, 0x41, 0x44),
        // Start pressure conversion, OSR 8192
        w!(0x4A),
        // Read ADC
        wr!(0x00; 0x62, 0xA7, 0xA4),
    ]
});
const TEMP_VAL: f32 = 20.00;
const PRES_VAL: f32 = 1100.02;

macro_rules! sensor {
    ($($seq:expr),*) => {{
        let mut __basic_seq: Vec<Transaction> = Vec::new();
        $(
            __basic_seq.extend_from_slice($seq);
        )*
        MS8607::new(Mock::new(&__basic_seq), NoopDelay::new())
    }};
}

fn done(sensor: MS8607) {
    let (mut i2c, _) = sensor.destroy();
    i2c.done();
}

fn assert_reading(reading: Reading) {
    assert!((reading.temperature.0 - TEMP_VAL).abs() < 0.01);
    assert!((reading.pressure.0 - PRES_VAL).abs() < 0.01);
}

#[test]
fn begin() {
    let mut sensor = sensor!(BEGIN.deref());
    sensor.begin(0).unwrap();
    assert!(sensor.is_initialized());

    let cal = sensor.calibration().unwrap();
    assert_eq!(cal.crc(), 3);
    assert_eq!(cal.press_sens, 46372);
    assert_eq!(cal.temp_temp_coeff, 28165);
    done(sensor);
}

#[test]
fn reset() {
    let mut sensor = sensor!(&[w!(0x1E)]);
    sensor.reset().unwrap();
    done(sensor);
}

#[test]
fn bad_crc_nibble() {
    let mut prom = PROM;
    prom[0] = 0x5A14;
    let mut sensor = sensor!(&prom_transactions(&prom));

    let err = sensor.begin(0).unwrap_err();
    assert_eq!(
        err,
        Error::Crc(CrcMismatch {
            expected: 5,
            computed: 3
        })
    );
    assert!(!sensor.is_initialized());
    done(sensor);
}

#[test]
fn corrupted_prom() {
    let mut rng = thread_rng();

    for _ in 0..20 {
        let mut prom = PROM;
        let word = rng.gen_range(0..7);
        // The checksum nibble isn't covered by itself
        let bit = if word == 0 {
            rng.gen_range(0..12)
        } else {
            rng.gen_range(0..16)
        };
        prom[word] ^= 1 << bit;

        let mut sensor = sensor!(&prom_transactions(&prom));
        assert!(matches!(sensor.begin(0), Err(Error::Crc(_))));
        assert!(!sensor.is_initialized());
        // No cycle is attempted, so no bus traffic is expected
        assert_eq!(sensor.measure(), Err(Error::NotInitialized));
        done(sensor);
    }
}

#[test_case(0)]
#[test_case(1)]
#[test_case(3)]
#[test_case(6)]
fn prom_bus_failure(failing: usize) {
    let mut seq = BEGIN[..failing].to_vec();
    seq.push(BEGIN[failing].clone().with_error(ErrorKind::Other));
    let mut sensor = sensor!(&seq);

    assert_eq!(sensor.begin(0), Err(Error::I2c(ErrorKind::Other)));
    assert!(!sensor.is_initialized());
    assert!(sensor.calibration().is_none());
    done(sensor);
}

#[test]
fn measure_before_begin() {
    let mut sensor = sensor!();
    assert_eq!(sensor.measure(), Err(Error::NotInitialized));
    assert_eq!(sensor.read_raw(), Err(Error::NotInitialized));
    done(sensor);
}

#[test]
fn read_raw() {
    let mut sensor = sensor!(BEGIN.deref(), MEASURE.deref());
    sensor.begin(0).unwrap();
    let raw = sensor.read_raw().unwrap();
    assert_eq!(
        raw,
        RawSample {
            temperature: 8_077_636,
            pressure: 6_465_444,
        }
    );
    // Raw reads don't touch the cache
    assert!(sensor.reading().is_none());
    done(sensor);
}

#[test]
fn measure() {
    let mut sensor = sensor!(BEGIN.deref(), MEASURE.deref());
    sensor.begin(0).unwrap();
    let reading = sensor.measure().unwrap();
    assert_reading(reading);
    assert_eq!(sensor.reading(), Some(reading));
    done(sensor);
}

#[test_case(0)]
#[test_case(1)]
#[test_case(2)]
#[test_case(3)]
fn failed_measure_keeps_stale_reading(failing: usize) {
    let mut seq = MEASURE[..failing].to_vec();
    seq.push(MEASURE[failing].clone().with_error(ErrorKind::Other));
    let mut sensor = sensor!(BEGIN.deref(), MEASURE.deref(), &seq);

    sensor.begin(0).unwrap();
    let first = sensor.measure().unwrap();

    assert_eq!(sensor.measure(), Err(Error::I2c(ErrorKind::Other)));
    assert_eq!(sensor.reading(), Some(first));
    done(sensor);
}

#[test]
fn get_reading_pressure_only() {
    let mut sensor = sensor!(BEGIN.deref(), MEASURE.deref());
    sensor.begin(10).unwrap();

    let events = sensor
        .get_reading(Measurements::PRESSURE, Timestamp::from_ticks(1234))
        .unwrap();
    assert!(events.temperature.is_none());

    let pres = events.pressure.unwrap();
    assert_eq!(pres.sensor_id, 11);
    assert_eq!(pres.kind, SensorKind::Pressure);
    assert_eq!(pres.timestamp, Timestamp::from_ticks(1234));
    match pres.data {
        EventData::Pressure(p) => assert!((p.0 - PRES_VAL).abs() < 0.01),
        other => panic!("unexpected event data {other:?}"),
    }
    done(sensor);
}

#[test]
fn get_reading_all() {
    let mut sensor = sensor!(BEGIN.deref(), MEASURE.deref());
    sensor.begin(10).unwrap();

    let events = sensor
        .get_reading(Measurements::ALL, Timestamp::from_ticks(5))
        .unwrap();
    let temp = events.temperature.unwrap();
    assert_eq!(temp.sensor_id, 10);
    assert_eq!(temp.kind, SensorKind::AmbientTemperature);
    match temp.data {
        EventData::Temperature(t) => assert!((t.0 - TEMP_VAL).abs() < 0.01),
        other => panic!("unexpected event data {other:?}"),
    }
    assert!(events.pressure.is_some());
    done(sensor);
}

#[test]
fn channels() {
    let mut sensor = sensor!(BEGIN.deref(), MEASURE.deref());
    sensor.begin(42).unwrap();

    // Nothing measured yet
    assert!(sensor
        .temperature_sensor()
        .event(Timestamp::from_ticks(0))
        .is_none());
    assert_eq!(sensor.temperature_sensor().metadata().sensor_id, 42);
    assert_eq!(sensor.pressure_sensor().metadata().sensor_id, 43);
    assert_eq!(sensor.pressure_sensor().metadata().name, "MS8607_P");

    sensor.measure().unwrap();

    // Channels only package the cached reading, no further bus traffic
    let now = Timestamp::from_ticks(99);
    let temp = sensor.temperature_sensor().event(now).unwrap();
    let pres = sensor.pressure_sensor().event(now).unwrap();
    assert_eq!(temp.timestamp, now);
    assert_eq!(pres.sensor_id, 43);
    done(sensor);
}

#[test]
fn begin_again_after_failure() {
    let mut bad = PROM;
    bad[3] ^= 0x0100;
    let mut seq = prom_transactions(&bad);
    seq.extend_from_slice(BEGIN.deref());
    let mut sensor = sensor!(&seq);

    assert!(sensor.begin(0).is_err());
    assert!(!sensor.is_initialized());
    sensor.begin(0).unwrap();
    assert!(sensor.is_initialized());
    done(sensor);
}
