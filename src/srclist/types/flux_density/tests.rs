// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use approx::assert_abs_diff_eq;
use marlu::{c64, Jones};

use super::*;

#[test]
fn calc_freq_ratio_1() {
    let desired_freq = 160.0;
    let cat_freq = 150.0;
    let spec_index = -0.6;
    let ratio = calc_flux_ratio(desired_freq, cat_freq, spec_index);
    let expected = 0.9620170425907598;
    assert_abs_diff_eq!(ratio, expected, epsilon = 1e-10);
}

#[test]
fn power_law_doubling_freq() {
    let fdt = FluxDensityType::PowerLaw {
        si: -0.8,
        fd: FluxDensity::stokes_i(74e6, 10.0),
    };
    let fd = fdt.estimate_at_freq(148e6);
    assert_abs_diff_eq!(
        fd,
        FluxDensity::stokes_i(148e6, 5.743491774985174),
        epsilon = 1e-10
    );

    // At the reference frequency, nothing changes.
    assert_abs_diff_eq!(fdt.estimate_at_freq(74e6), FluxDensity::stokes_i(74e6, 10.0));
}

#[test]
fn power_law_scales_all_stokes() {
    let fdt = FluxDensityType::PowerLaw {
        si: -1.0,
        fd: FluxDensity {
            freq: 100e6,
            i: 4.0,
            q: 2.0,
            u: -1.0,
            v: 0.5,
        },
    };
    assert_abs_diff_eq!(
        fdt.estimate_at_freq(200e6),
        FluxDensity {
            freq: 200e6,
            i: 2.0,
            q: 1.0,
            u: -0.5,
            v: 0.25,
        },
        epsilon = 1e-12
    );
}

#[test]
fn log_polynomial_matches_hand_calculation() {
    // log10(S) = 1.5 - 0.7x + 0.1 exp(-x)
    let fdt = FluxDensityType::LogPolynomial {
        fd: FluxDensity::stokes_i(74e6, 10_f64.powf(1.5)),
        b: -0.7,
        c: 0.1,
        d: -1.0,
    };

    let fd = fdt.estimate_at_freq(740e6);
    assert_abs_diff_eq!(fd.freq, 740e6);
    assert_abs_diff_eq!(fd.i, 6.867330423836271, epsilon = 1e-10);

    // At the reference frequency, the curvature term still contributes 10^c.
    let fd = fdt.estimate_at_freq(74e6);
    assert_abs_diff_eq!(fd.i, 39.810717055349734, epsilon = 1e-10);

    let fd = fdt.estimate_at_freq(7.4e6);
    assert_abs_diff_eq!(fd.i, 296.36586641982416, epsilon = 1e-8);
}

#[test]
fn log_polynomial_without_curvature_is_a_power_law() {
    let log_poly = FluxDensityType::LogPolynomial {
        fd: FluxDensity::stokes_i(74e6, 20.0),
        b: -0.75,
        c: 0.0,
        d: 0.0,
    };
    let power_law = FluxDensityType::PowerLaw {
        si: -0.75,
        fd: FluxDensity::stokes_i(74e6, 20.0),
    };
    for freq in [50e6, 74e6, 150e6, 1.4e9] {
        assert_abs_diff_eq!(
            log_poly.estimate_at_freq(freq),
            power_law.estimate_at_freq(freq),
            epsilon = 1e-10
        );
    }
}

#[test]
fn to_inst_stokes_unpolarised() {
    let j = FluxDensity::stokes_i(150e6, 3.0).to_inst_stokes();
    assert_abs_diff_eq!(j, Jones::from([
        c64::new(3.0, 0.0),
        c64::default(),
        c64::default(),
        c64::new(3.0, 0.0),
    ]));
}

#[test]
fn serialise_skips_zero_stokes() {
    let fdt = FluxDensityType::PowerLaw {
        si: -0.8,
        fd: FluxDensity::stokes_i(74e6, 10.0),
    };
    let json = serde_json::to_string(&fdt).unwrap();
    assert_eq!(
        json,
        r#"{"power_law":{"si":-0.8,"fd":{"freq":74000000.0,"i":10.0}}}"#
    );
    let back: FluxDensityType = serde_json::from_str(&json).unwrap();
    assert_eq!(back, fdt);
}
