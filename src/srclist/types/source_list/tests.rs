// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use marlu::RADec;

use super::*;

fn power_law(flux: f64) -> Source {
    Source {
        radec: RADec::from_degrees(10.0, -27.0),
        flux_type: FluxDensityType::PowerLaw {
            si: -0.8,
            fd: FluxDensity::stokes_i(74e6, flux),
        },
    }
}

fn test_list() -> SourceList {
    SourceList::from([
        ("A".to_string(), power_law(10.0)),
        ("B".to_string(), power_law(2.0)),
        (
            "C".to_string(),
            Source {
                radec: RADec::from_degrees(200.0, 10.0),
                flux_type: FluxDensityType::LogPolynomial {
                    fd: FluxDensity::stokes_i(74e6, 100.0),
                    b: -0.8,
                    c: 0.0,
                    d: 0.0,
                },
            },
        ),
    ])
}

#[test]
fn select_everything() {
    let sl = test_list();
    let selected = sl.select(None, None);
    assert_eq!(selected, sl);
}

#[test]
fn select_names_keeps_requested_order() {
    let sl = test_list();
    let names = ["C".to_string(), "A".to_string()];
    let selected = sl.select(Some(&names), None);
    let keys: Vec<&str> = selected.keys().map(|s| s.as_str()).collect();
    assert_eq!(keys, ["C", "A"]);
}

#[test]
fn select_skips_unknown_names() {
    let sl = test_list();
    let names = ["nope".to_string(), "B".to_string()];
    let selected = sl.select(Some(&names), None);
    assert_eq!(selected.len(), 1);
    assert!(selected.contains_key("B"));

    let names = ["nope".to_string()];
    assert!(sl.select(Some(&names), None).is_empty());
}

#[test]
fn select_with_cutoff() {
    let sl = test_list();
    let cutoff = FluxCutoff {
        flux_jy: 5.0,
        freq_hz: 74e6,
    };
    let selected = sl.select(None, Some(cutoff));
    let keys: Vec<&str> = selected.keys().map(|s| s.as_str()).collect();
    assert_eq!(keys, ["A", "C"]);
}

#[test]
fn cutoff_is_strict() {
    let sl = test_list();
    let cutoff = FluxCutoff {
        flux_jy: 10.0,
        freq_hz: 74e6,
    };
    let selected = sl.select(None, Some(cutoff));
    assert!(!selected.contains_key("A"));
    assert!(selected.contains_key("C"));
}

#[test]
fn cutoff_uses_the_spectral_law() {
    let sl = test_list();
    // At 740 MHz, A is 10 * 10^-0.8 ~= 1.58 Jy and C is ~15.8 Jy.
    let cutoff = FluxCutoff {
        flux_jy: 1.0,
        freq_hz: 740e6,
    };
    let selected = sl.select(None, Some(cutoff));
    let keys: Vec<&str> = selected.keys().map(|s| s.as_str()).collect();
    assert_eq!(keys, ["A", "C"]);

    let cutoff = FluxCutoff {
        flux_jy: 2.0,
        freq_hz: 740e6,
    };
    let selected = sl.select(None, Some(cutoff));
    let keys: Vec<&str> = selected.keys().map(|s| s.as_str()).collect();
    assert_eq!(keys, ["C"]);
}

#[test]
fn names_and_cutoff_together() {
    let sl = test_list();
    let names = ["B".to_string(), "A".to_string()];
    let cutoff = FluxCutoff {
        flux_jy: 5.0,
        freq_hz: 74e6,
    };
    let selected = sl.select(Some(&names), Some(cutoff));
    let keys: Vec<&str> = selected.keys().map(|s| s.as_str()).collect();
    assert_eq!(keys, ["A"]);
}

#[test]
fn counts() {
    let counts = test_list().get_counts();
    assert_eq!(
        counts,
        SourceCounts {
            num_power_laws: 2,
            num_log_polynomials: 1
        }
    );
}
