// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Code to handle hyperdrive-style source list files.
//!
//! Each source is keyed by its name, and carries its RA and Dec in degrees
//! along with its spectral law.

mod read;
mod write;

// Re-exports.
pub(crate) use read::{source_list_from_json, source_list_from_yaml};
pub(crate) use write::{source_list_to_json, source_list_to_yaml};
