// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Code for sky-model source lists.
//!
//! Sources come from the Helmboldt catalog, but subsets of the catalog can be
//! written to (and read back from) hyperdrive-style yaml or json source lists.

pub mod helmboldt;
pub(crate) mod hyperdrive;
mod read;
pub(crate) mod sexagesimal;
mod types;
mod write;

mod error;

pub use error::HelmboldtReadError;
pub(crate) use error::{ReadSourceListError, WriteSourceListError};
pub(crate) use read::read_source_list_file;
pub use types::*;
pub(crate) use write::write_source_list;

use itertools::Itertools;
use strum::IntoEnumIterator;

/// All of the possible file extensions that a hyperdrive-style sky-model source
/// list can have.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    strum_macros::Display,
    strum_macros::EnumIter,
    strum_macros::EnumString,
)]
pub(crate) enum HyperdriveFileType {
    #[strum(serialize = "yaml", serialize = "yml")]
    Yaml,

    #[strum(serialize = "json")]
    Json,
}

impl HyperdriveFileType {
    /// Determine the file type from a path's extension.
    pub(crate) fn from_path(path: &std::path::Path) -> Option<HyperdriveFileType> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(|e| e.to_lowercase().parse().ok())
    }
}

lazy_static::lazy_static! {
    pub(crate) static ref HYPERDRIVE_SOURCE_LIST_FILE_TYPES_COMMA_SEPARATED: String = HyperdriveFileType::iter().join(", ");
}
