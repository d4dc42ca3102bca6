//! Line-based meter input for the driver.
//!
//! Each line is `t_ms low mid high all [bin ...]`, whitespace separated. A
//! band value of `-` means no reading for that band; any fields after the
//! five band fields are spectrum magnitudes (0-255). Blank lines and lines
//! starting with `#` are ignored.

use beatframe::analysis::reduction_to_raw;
use beatframe::{Band, BandSet, MeterReadings};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum InputError {
    #[error("line {line}: expected at least 5 fields (t low mid high all), found {found}")]
    FieldCount { line: usize, found: usize },
    #[error("line {line}: invalid number '{token}'")]
    Number { line: usize, token: String },
    #[error("line {line}: spectrum value '{token}' is not in 0-255")]
    Magnitude { line: usize, token: String },
}

/// One parsed input line
#[derive(Debug, PartialEq)]
pub struct InputTick {
    pub readings: MeterReadings,
    pub spectrum: Vec<u8>,
}

/// Parse one line. With `db` set, band values are compressor reduction
/// readings in dB and are converted to raw magnitudes.
pub fn parse_line(line_no: usize, line: &str, db: bool) -> Result<Option<InputTick>, InputError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < 5 {
        return Err(InputError::FieldCount {
            line: line_no,
            found: fields.len(),
        });
    }

    let number = |token: &str| -> Result<f64, InputError> {
        token.parse::<f64>().map_err(|_| InputError::Number {
            line: line_no,
            token: token.to_string(),
        })
    };

    let t_ms = number(fields[0])?;
    let mut bands: BandSet<Option<f32>> = BandSet::default();
    for (band, token) in Band::ALL.into_iter().zip(&fields[1..5]) {
        if *token == "-" {
            continue;
        }
        let value = number(*token)? as f32;
        bands[band] = Some(if db { reduction_to_raw(value) } else { value });
    }

    let spectrum = fields[5..]
        .iter()
        .map(|token| {
            token.parse::<u8>().map_err(|_| InputError::Magnitude {
                line: line_no,
                token: token.to_string(),
            })
        })
        .collect::<Result<Vec<u8>, _>>()?;

    Ok(Some(InputTick {
        readings: MeterReadings { t_ms, bands },
        spectrum,
    }))
}
