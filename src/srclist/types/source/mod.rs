// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Structures to describe sky-model sources.

use marlu::RADec;
use serde::{Deserialize, Serialize};

use super::{FluxDensity, FluxDensityType};

/// A point source on the sky. Catalog entries don't carry any shape
/// information, so every source is a point.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Source {
    /// Coordinates of the source.
    #[serde(flatten)]
    pub radec: RADec,

    /// The spectral law of the source.
    pub flux_type: FluxDensityType,
}

impl Source {
    /// Estimate the flux density of this source at a frequency.
    pub(crate) fn estimate_at_freq(&self, freq_hz: f64) -> FluxDensity {
        self.flux_type.estimate_at_freq(freq_hz)
    }

    /// Is this source modelled with the curved Helmboldt law?
    pub(crate) fn is_curved(&self) -> bool {
        matches!(self.flux_type, FluxDensityType::LogPolynomial { .. })
    }
}

#[cfg(test)]
impl approx::AbsDiffEq for Source {
    type Epsilon = f64;

    fn default_epsilon() -> Self::Epsilon {
        f64::EPSILON
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: Self::Epsilon) -> bool {
        self.radec.abs_diff_eq(&other.radec, epsilon) && self.flux_type == other.flux_type
    }
}
