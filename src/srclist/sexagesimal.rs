// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Code for parsing whitespace-delimited sexagesimal strings.
 */

use thiserror::Error;

/// Convert a whitespace-delimited sexagesimal string to a float \[degrees\].
/// The input is assumed to be in "degrees minutes seconds". A leading minus
/// sign applies to the whole value, even if the degrees field is zero.
pub(crate) fn sexagesimal_dms_spaced_str_to_degrees(s: &str) -> Result<f64, SexagesimalError> {
    let [d, m, sec] = three_fields(s)?;
    let num = d.abs() + m / 60.0 + sec / 3600.0;
    Ok(if s.trim_start().starts_with('-') {
        -num
    } else {
        num
    })
}

/// Convert a whitespace-delimited sexagesimal string in "hours minutes
/// seconds" to a float \[degrees\].
pub(crate) fn sexagesimal_hms_spaced_str_to_degrees(s: &str) -> Result<f64, SexagesimalError> {
    sexagesimal_dms_spaced_str_to_degrees(s).map(|f| f * 15.0)
}

fn three_fields(s: &str) -> Result<[f64; 3], SexagesimalError> {
    let mut fields = [0.0; 3];
    let mut count = 0;
    for elem in s.split_whitespace() {
        if count == 3 {
            return Err(SexagesimalError::WrongFieldCount(s.to_string()));
        }
        fields[count] = elem
            .parse()
            .map_err(|_| SexagesimalError::ParseFloat(elem.to_string()))?;
        count += 1;
    }
    if count != 3 {
        return Err(SexagesimalError::WrongFieldCount(s.to_string()));
    }
    Ok(fields)
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SexagesimalError {
    /// Three numbers (fields) are expected; this error is used when the number
    /// of fields is not three.
    #[error("Did not get three sexagesimal fields: '{0}'")]
    WrongFieldCount(String),

    #[error("Couldn't parse '{0}' as a float")]
    ParseFloat(String),
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn dms() {
        let f = sexagesimal_dms_spaced_str_to_degrees("-22 58 52.56").unwrap();
        assert_abs_diff_eq!(f, -22.981267, epsilon = 1e-6);
        let f = sexagesimal_dms_spaced_str_to_degrees("+12 30 00").unwrap();
        assert_abs_diff_eq!(f, 12.5);
    }

    #[test]
    fn negative_zero_degrees_keeps_sign() {
        let f = sexagesimal_dms_spaced_str_to_degrees("-00 30 00.0").unwrap();
        assert_abs_diff_eq!(f, -0.5);
        let f = sexagesimal_dms_spaced_str_to_degrees("+00 30 00.0").unwrap();
        assert_abs_diff_eq!(f, 0.5);
    }

    #[test]
    fn hms() {
        let f = sexagesimal_hms_spaced_str_to_degrees("11 49 01.062").unwrap();
        assert_abs_diff_eq!(f, 177.254425, epsilon = 1e-6);
    }

    #[test]
    fn bad_fields() {
        assert_eq!(
            sexagesimal_dms_spaced_str_to_degrees("12 30"),
            Err(SexagesimalError::WrongFieldCount("12 30".to_string()))
        );
        assert_eq!(
            sexagesimal_dms_spaced_str_to_degrees("12 30 00 00"),
            Err(SexagesimalError::WrongFieldCount("12 30 00 00".to_string()))
        );
        assert_eq!(
            sexagesimal_dms_spaced_str_to_degrees("12 3x 00"),
            Err(SexagesimalError::ParseFloat("3x".to_string()))
        );
    }
}
