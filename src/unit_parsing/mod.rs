// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Code to parse strings into plain numbers or some quantity with a unit.

mod error;

pub use error::*;

use strum::IntoEnumIterator;
use strum_macros::{EnumIter, EnumString, IntoStaticStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, EnumString, IntoStaticStr)]
#[allow(non_camel_case_types)]
pub(crate) enum FreqFormat {
    /// Hertz
    Hz,

    /// kiloHertz
    kHz,

    /// MegaHertz
    MHz,

    NoUnit,
}

impl FreqFormat {
    /// The multiplier to convert a number in this format to Hz.
    pub(crate) fn to_hz(self) -> f64 {
        match self {
            FreqFormat::Hz | FreqFormat::NoUnit => 1.0,
            FreqFormat::kHz => 1e3,
            FreqFormat::MHz => 1e6,
        }
    }
}

/// Parse a string that may have a unit of frequency attached to it.
pub(crate) fn parse_freq(s: &str) -> Result<(f64, FreqFormat), UnitParseError> {
    let s = s.trim();

    // Try to parse a naked number.
    if let Ok(number) = s.parse() {
        return Ok((number, FreqFormat::NoUnit));
    };

    // That didn't work; split the trailing letters from the number and search
    // over our supported formats.
    let split = s
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_alphabetic())
        .last()
        .map(|(i, _)| i)
        .unwrap_or(s.len());
    let (prefix, suffix) = s.split_at(split);
    for freq_format in FreqFormat::iter().filter(|&ff| ff != FreqFormat::NoUnit) {
        let freq_format_str: &'static str = freq_format.into();
        if suffix.to_uppercase() == freq_format_str.to_uppercase() {
            let number: f64 = match prefix.trim().parse() {
                Ok(n) => n,
                Err(_) => {
                    return Err(UnitParseError::GotUnitButCantParse {
                        input: s.to_string(),
                        unit: freq_format_str,
                    })
                }
            };
            return Ok((number, freq_format));
        }
    }

    // If we made it this far, we don't know how to parse the string.
    Err(UnitParseError::Unknown {
        input: s.to_string(),
        unit_type: "frequency",
    })
}

/// Parse a string that may have a unit of frequency attached to it, and
/// return the frequency in Hz. A bare number is assumed to be in Hz.
pub(crate) fn parse_freq_hz(s: &str) -> Result<f64, UnitParseError> {
    parse_freq(s).map(|(number, format)| number * format.to_hz())
}
