// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Types for sky-model sources and source lists.

mod flux_density;
mod source;
mod source_list;

pub use flux_density::*;
pub use source::*;
pub use source_list::*;
