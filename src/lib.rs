// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Remove or simulate point-source sky models in radio-interferometer
//! visibilities, using spectral fits from the Helmboldt catalog.

mod cli;
mod constants;
mod io;
mod model;
mod params;
pub mod srclist;
mod unit_parsing;

// Re-exports.
pub use cli::{Skysub, SkysubError};
pub use srclist::{
    helmboldt::{get_srcs, HelmboldtCatalog},
    FluxCutoff, FluxDensity, FluxDensityType, Source, SourceList,
};

use crossbeam_utils::atomic::AtomicCell;

lazy_static::lazy_static! {
    /// Are progress bars being drawn? This should only ever be enabled by CLI
    /// code.
    static ref PROGRESS_BARS: AtomicCell<bool> = AtomicCell::new(false);
}
