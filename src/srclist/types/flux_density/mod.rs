// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Flux density structures.

#[cfg(test)]
mod tests;

use marlu::{c64, Jones};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
/// At a frequency, four flux densities for each Stokes parameter.
// When serialising/deserialising, ignore Stokes Q U V if they are zero.
pub struct FluxDensity {
    /// The frequency that these flux densities apply to \[Hz\]
    pub freq: f64,

    /// The flux density of Stokes I \[Jy\]
    pub i: f64,

    /// The flux density of Stokes Q \[Jy\]
    #[serde(default)]
    #[serde(skip_serializing_if = "is_zero")]
    pub q: f64,

    /// The flux density of Stokes U \[Jy\]
    #[serde(default)]
    #[serde(skip_serializing_if = "is_zero")]
    pub u: f64,

    /// The flux density of Stokes V \[Jy\]
    #[serde(default)]
    #[serde(skip_serializing_if = "is_zero")]
    pub v: f64,
}

impl FluxDensity {
    /// A Stokes-I-only flux density.
    pub(crate) fn stokes_i(freq: f64, i: f64) -> FluxDensity {
        FluxDensity {
            freq,
            i,
            ..Default::default()
        }
    }

    /// Convert a `FluxDensity` into a [Jones] matrix representing instrumental
    /// Stokes (i.e. XX, XY, YX, YY).
    ///
    /// X is East-West and Y is North-South, so this conversion looks like the
    /// opposite of TMS equation 4.55.
    pub(crate) fn to_inst_stokes(self) -> Jones<f64> {
        Jones::from([
            c64::new(self.i - self.q, 0.0),
            c64::new(self.u, -self.v),
            c64::new(self.u, self.v),
            c64::new(self.i + self.q, 0.0),
        ])
    }
}

/// This is only used for serialisation
#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_zero(num: &f64) -> bool {
    num.abs() < f64::EPSILON
}

impl std::ops::Mul<f64> for FluxDensity {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        FluxDensity {
            freq: self.freq,
            i: self.i * rhs,
            q: self.q * rhs,
            u: self.u * rhs,
            v: self.v * rhs,
        }
    }
}

/// The spectral laws that sources may follow. Helmboldt-catalog sources with a
/// good multi-survey fit use [`FluxDensityType::LogPolynomial`]; everything
/// else falls back to [`FluxDensityType::PowerLaw`] from the VLSS flux
/// density.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FluxDensityType {
    /// $S_\nu = a \nu^{\alpha}$
    PowerLaw {
        /// Spectral index (alpha)
        si: f64,
        /// Flux density (a)
        fd: FluxDensity,
    },

    /// The curved Helmboldt et al. (2008) law:
    ///
    /// $\log_{10} S_\nu = \log_{10} a + b x + c e^{d x}$, $x = \log_{10}(\nu / \nu_0)$
    ///
    /// Note that at the reference frequency, the flux density is $a 10^c$,
    /// not $a$.
    LogPolynomial {
        /// Flux density scale (a) and the reference frequency (nu_0)
        fd: FluxDensity,
        b: f64,
        c: f64,
        d: f64,
    },
}

impl FluxDensityType {
    /// Given flux density information, estimate the flux density at a
    /// particular frequency. The reference flux density is scaled by a ratio
    /// determined by the spectral law.
    pub(crate) fn estimate_at_freq(&self, freq_hz: f64) -> FluxDensity {
        let (fd, ratio) = match self {
            FluxDensityType::PowerLaw { si, fd } => (fd, calc_flux_ratio(freq_hz, fd.freq, *si)),

            FluxDensityType::LogPolynomial { fd, b, c, d } => {
                let x = (freq_hz / fd.freq).log10();
                (fd, 10_f64.powf(b * x + c * (d * x).exp()))
            }
        };
        let mut new_fd = *fd * ratio;
        new_fd.freq = freq_hz;
        new_fd
    }

    /// The reference flux density of this law.
    pub(crate) fn reference(&self) -> &FluxDensity {
        match self {
            FluxDensityType::PowerLaw { fd, .. } | FluxDensityType::LogPolynomial { fd, .. } => fd,
        }
    }

    /// A short description of the spectral law, for display.
    pub(crate) fn describe(&self) -> String {
        match self {
            FluxDensityType::PowerLaw { si, .. } => format!("power law (si {si})"),
            FluxDensityType::LogPolynomial { b, c, d, .. } => {
                format!("log polynomial (b {b}, c {c}, d {d})")
            }
        }
    }
}

/// Given a spectral index, determine the flux-density ratio of two frequencies.
pub(crate) fn calc_flux_ratio(desired_freq_hz: f64, cat_freq_hz: f64, spec_index: f64) -> f64 {
    (desired_freq_hz / cat_freq_hz).powf(spec_index)
}

#[cfg(test)]
impl approx::AbsDiffEq for FluxDensity {
    type Epsilon = f64;

    fn default_epsilon() -> f64 {
        f64::EPSILON
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: f64) -> bool {
        f64::abs_diff_eq(&self.freq, &other.freq, epsilon)
            && f64::abs_diff_eq(&self.i, &other.i, epsilon)
            && f64::abs_diff_eq(&self.q, &other.q, epsilon)
            && f64::abs_diff_eq(&self.u, &other.u, epsilon)
            && f64::abs_diff_eq(&self.v, &other.v, epsilon)
    }
}
