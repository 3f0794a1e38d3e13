mod path;
pub use path::*;

use crate::shared::geo::Coordinate;
use thiserror::Error;

/// Number of decimal digits kept by the encoding.
pub const PRECISION: u32 = 5;
const FACTOR: f64 = 100_000.0;

const CHUNK_OFFSET: u8 = 63;
const CONTINUATION: u64 = 0x20;
const CHUNK_MASK: u64 = 0x1f;
// 32 bits of payload need seven groups of five bits.
const MAX_SHIFT: u32 = 30;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Polyline ends inside a value at byte {position}")]
    Truncated { position: usize },
    #[error("Polyline holds a latitude without a longitude at byte {position}")]
    UnpairedValue { position: usize },
    #[error("Invalid polyline character {character:?} at byte {position}")]
    InvalidCharacter { position: usize, character: char },
    #[error("Polyline value starting before byte {position} does not fit in 32 bits")]
    Overflow { position: usize },
    #[error("Decoded point {index} ({coordinate}) is outside the valid coordinate range")]
    OutOfRange { index: usize, coordinate: Coordinate },
}

/// Decodes a precision-5 polyline into its ordered coordinates.
pub fn decode(encoded: &str) -> Result<Path, self::Error> {
    let bytes = encoded.as_bytes();
    let mut coordinates: Vec<Coordinate> = Vec::with_capacity(bytes.len() / 4);
    let mut position = 0;
    let mut latitude: i64 = 0;
    let mut longitude: i64 = 0;

    while position < bytes.len() {
        let (delta_latitude, next) = read_value(bytes, position)?;
        if next >= bytes.len() {
            return Err(self::Error::UnpairedValue { position: next });
        }
        let (delta_longitude, next) = read_value(bytes, next)?;
        position = next;

        latitude += delta_latitude;
        longitude += delta_longitude;
        let coordinate = Coordinate::new(latitude as f64 / FACTOR, longitude as f64 / FACTOR);
        if !coordinate.is_valid() {
            return Err(self::Error::OutOfRange {
                index: coordinates.len(),
                coordinate,
            });
        }
        coordinates.push(coordinate);
    }

    Ok(coordinates.into())
}

/// Encodes coordinates with the same scheme [`decode`] reads.
pub fn encode(coordinates: &[Coordinate]) -> String {
    let mut encoded = String::with_capacity(coordinates.len() * 8);
    let mut previous: (i64, i64) = (0, 0);
    for coordinate in coordinates {
        let latitude = scale(coordinate.latitude);
        let longitude = scale(coordinate.longitude);
        write_value(latitude - previous.0, &mut encoded);
        write_value(longitude - previous.1, &mut encoded);
        previous = (latitude, longitude);
    }
    encoded
}

fn scale(value: f64) -> i64 {
    (value * FACTOR).round() as i64
}

fn read_value(bytes: &[u8], start: usize) -> Result<(i64, usize), self::Error> {
    let mut result: u64 = 0;
    let mut shift: u32 = 0;
    let mut position = start;
    loop {
        let byte = *bytes
            .get(position)
            .ok_or(self::Error::Truncated { position })?;
        if !(CHUNK_OFFSET..=CHUNK_OFFSET + 63).contains(&byte) {
            return Err(self::Error::InvalidCharacter {
                position,
                character: byte as char,
            });
        }
        if shift > MAX_SHIFT {
            return Err(self::Error::Overflow { position });
        }
        let chunk = u64::from(byte - CHUNK_OFFSET);
        result |= (chunk & CHUNK_MASK) << shift;
        shift += 5;
        position += 1;
        if chunk & CONTINUATION == 0 {
            break;
        }
    }

    let value = if result & 1 == 1 {
        (!(result >> 1)) as i64
    } else {
        (result >> 1) as i64
    };
    Ok((value, position))
}

fn write_value(value: i64, encoded: &mut String) {
    let mut folded = if value < 0 {
        !(value << 1) as u64
    } else {
        (value << 1) as u64
    };
    while folded >= CONTINUATION {
        let chunk = (CONTINUATION | (folded & CHUNK_MASK)) as u8 + CHUNK_OFFSET;
        encoded.push(chunk as char);
        folded >>= 5;
    }
    encoded.push((folded as u8 + CHUNK_OFFSET) as char);
}

#[test]
fn decodes_reference_polyline() {
    let path = decode("_p~iF~ps|U_ulLnnqC_mqNvxq`@").unwrap();
    let expected = [(38.5, -120.2), (40.7, -120.95), (43.252, -126.453)];
    assert_eq!(path.len(), expected.len());
    for (coord, (lat, lon)) in path.iter().zip(expected) {
        assert!((coord.latitude - lat).abs() < 1e-9);
        assert!((coord.longitude - lon).abs() < 1e-9);
    }
}

#[test]
fn encodes_reference_polyline() {
    let coords = [
        Coordinate::new(38.5, -120.2),
        Coordinate::new(40.7, -120.95),
        Coordinate::new(43.252, -126.453),
    ];
    assert_eq!(encode(&coords), "_p~iF~ps|U_ulLnnqC_mqNvxq`@");
}

#[test]
fn empty_input_is_an_empty_path() {
    assert!(decode("").unwrap().is_empty());
    assert_eq!(encode(&[]), "");
}
