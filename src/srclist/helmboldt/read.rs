// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Parsing code for the two Helmboldt catalog text files.
//!
//! Both files are fixed-column. Only lines starting with "J" are catalog
//! entries; everything else is a header or comment.

use indexmap::IndexMap;
use log::{trace, warn};
use marlu::RADec;

use crate::{
    constants::{HELMBOLDT_REF_FREQ_HZ, MISSING_SPEC_INDEX},
    srclist::{
        error::HelmboldtReadError,
        sexagesimal::{sexagesimal_dms_spaced_str_to_degrees, sexagesimal_hms_spaced_str_to_degrees},
        FluxDensity, FluxDensityType,
    },
};

/// The source name occupies the first 9 characters of a line.
const NAME_COLS: std::ops::Range<usize> = 0..9;
/// The RA and Dec occupy these columns of a position-file line.
const RADEC_COLS: std::ops::Range<usize> = 35..57;
/// Within the RA-Dec columns, RA is first, then a space, then Dec.
const RA_LEN: usize = 10;
/// The spectral floats occupy these columns of a fit-file line.
const FIT_COLS: std::ops::Range<usize> = 13..62;

/// Slice a line with byte columns, clamping the end to the length of the line.
/// `None` is returned if the start is beyond the end of the line (or the
/// columns don't fall on character boundaries).
fn clamped_cols(line: &str, cols: std::ops::Range<usize>) -> Option<&str> {
    line.get(cols.start..cols.end.min(line.len()))
}

/// Read the position file. Sources are returned in file order; a repeated
/// name keeps its first position in the order but takes the later
/// coordinates.
pub(super) fn parse_position_file<T: std::io::BufRead>(
    buf: &mut T,
) -> Result<IndexMap<String, RADec>, HelmboldtReadError> {
    let mut positions = IndexMap::new();
    let mut line = String::new();
    let mut line_num: u32 = 0;

    while buf.read_line(&mut line)? > 0 {
        line_num += 1;
        if !line.starts_with('J') {
            line.clear();
            continue;
        }

        let name = line
            .get(NAME_COLS)
            .ok_or(HelmboldtReadError::PositionLineTooShort(line_num))?;
        let radec = clamped_cols(&line, RADEC_COLS)
            .ok_or(HelmboldtReadError::PositionLineTooShort(line_num))?;
        let (ra_str, dec_str) = match (radec.get(..RA_LEN), radec.get(RA_LEN + 1..)) {
            (Some(ra), Some(dec)) => (ra.trim(), dec.trim()),
            _ => return Err(HelmboldtReadError::PositionLineTooShort(line_num)),
        };

        let ra = sexagesimal_hms_spaced_str_to_degrees(ra_str).map_err(|err| {
            HelmboldtReadError::Sexagesimal {
                line_num,
                coord: "RA",
                err,
            }
        })?;
        let dec = sexagesimal_dms_spaced_str_to_degrees(dec_str).map_err(|err| {
            HelmboldtReadError::Sexagesimal {
                line_num,
                coord: "Dec",
                err,
            }
        })?;
        trace!("{name}: RA {ra}°, Dec {dec}°");

        if positions
            .insert(name.to_string(), RADec::from_degrees(ra, dec))
            .is_some()
        {
            warn!("Helmboldt position file line {line_num}: {name} was already listed; using this position");
        }

        line.clear();
    }

    Ok(positions)
}

/// Read the spectral-fit file. Each entry's line number is kept alongside its
/// floats so that merge problems can be reported usefully.
pub(super) fn parse_fit_file<T: std::io::BufRead>(
    buf: &mut T,
) -> Result<Vec<(u32, String, Vec<f64>)>, HelmboldtReadError> {
    let mut fits = vec![];
    let mut line = String::new();
    let mut line_num: u32 = 0;

    while buf.read_line(&mut line)? > 0 {
        line_num += 1;
        if !line.starts_with('J') {
            line.clear();
            continue;
        }

        let name = line
            .get(NAME_COLS)
            .ok_or(HelmboldtReadError::FitLineTooShort(line_num))?;
        let spec = clamped_cols(&line, FIT_COLS)
            .unwrap_or("")
            .split_whitespace()
            .map(|s| {
                s.parse::<f64>()
                    .map_err(|_| HelmboldtReadError::ParseFloat {
                        line_num,
                        string: s.to_string(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        if spec.is_empty() {
            return Err(HelmboldtReadError::EmptySpectrum {
                line_num,
                name: name.to_string(),
            });
        }

        fits.push((line_num, name.to_string(), spec));
        line.clear();
    }

    Ok(fits)
}

/// Choose a spectral law from a fit-file entry.
///
/// Without a good multi-survey fit (fewer than 5 values, or a missing 4th
/// value), the VLSS flux density and spectral index are used as a power law.
/// Otherwise, the 4th value is log10 of the flux-density scale and the
/// following values are the curvature coefficients.
pub(super) fn flux_type_from_spectrum(spec: &[f64]) -> FluxDensityType {
    if spec.len() < 5 || spec[3] == MISSING_SPEC_INDEX {
        FluxDensityType::PowerLaw {
            si: spec.get(1).copied().unwrap_or(MISSING_SPEC_INDEX),
            fd: FluxDensity::stokes_i(HELMBOLDT_REF_FREQ_HZ, spec[0]),
        }
    } else {
        let coeff = |i: usize| spec.get(i).copied().unwrap_or(0.0);
        FluxDensityType::LogPolynomial {
            fd: FluxDensity::stokes_i(HELMBOLDT_REF_FREQ_HZ, 10_f64.powf(spec[3])),
            b: coeff(4),
            c: coeff(5),
            d: coeff(6),
        }
    }
}
