// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Useful constants.

All constants *must* be double precision. `skysub` should do as many
calculations as possible in double precision before converting to a lower
precision, if it is ever required.
 */

pub(crate) use marlu::constants::VEL_C;
#[cfg(test)]
pub(crate) use marlu::constants::{MWA_LAT_RAD, MWA_LONG_RAD};

/// The frequency that all Helmboldt-catalog spectral fits are referenced to
/// (the VLSS frequency) \[Hz\].
pub(crate) const HELMBOLDT_REF_FREQ_HZ: f64 = 74e6;

/// The value used by the Helmboldt catalog (and for us, when a spectral index
/// isn't available) to indicate a missing spectral quantity.
pub(crate) const MISSING_SPEC_INDEX: f64 = -99.0;

/// Sources with elevations less than this value are discarded from sky
/// models \[radians\].
pub(crate) const ELEVATION_LIMIT: f64 = 0.0;

/// The string inserted between an input visibility file's stem and its
/// extension to make the output file name.
pub(crate) const DEFAULT_OUTPUT_SUFFIX: &str = "s";

/// The environment variable pointing to the default Helmboldt position file.
pub(crate) const HELMBOLDT_POS_ENV: &str = "HELMBOLDT_POS";

/// The environment variable pointing to the default Helmboldt spectral-fit
/// file.
pub(crate) const HELMBOLDT_FIT_ENV: &str = "HELMBOLDT_FIT";
