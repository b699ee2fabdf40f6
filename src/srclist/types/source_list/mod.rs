// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Code surrounding the [`IndexMap`] used to contain all sky-model sources.

#[cfg(test)]
mod tests;

use std::ops::{Deref, DerefMut};

use indexmap::IndexMap;
use log::warn;
use serde::{Deserialize, Serialize};

use super::*;

/// A [`IndexMap`] of source names for keys and [`Source`] structs for values.
/// The order of sources is the order they were read or requested in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceList(
    #[serde(with = "serde_yaml::with::singleton_map_recursive")] IndexMap<String, Source>,
);

/// Only sources brighter than `flux_jy` at `freq_hz` pass this cutoff.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FluxCutoff {
    /// \[Jy\]
    pub flux_jy: f64,

    /// \[Hz\]
    pub freq_hz: f64,
}

impl FluxCutoff {
    /// Does the source pass this cutoff? The comparison is strict; a source
    /// exactly at the cutoff is rejected.
    pub(crate) fn passes(&self, src: &Source) -> bool {
        src.estimate_at_freq(self.freq_hz).i > self.flux_jy
    }
}

impl SourceList {
    /// Create an empty [`SourceList`].
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Get counts of each of the flux-density types.
    pub(crate) fn get_counts(&self) -> SourceCounts {
        let mut counts = SourceCounts::default();
        for src in self.values() {
            if src.is_curved() {
                counts.num_log_polynomials += 1;
            } else {
                counts.num_power_laws += 1;
            }
        }
        counts
    }

    /// Select sources from this [`SourceList`] and return a new one.
    ///
    /// If `names` is given, only those sources are returned, in the order
    /// given; names that aren't in the list are reported and skipped. If
    /// `cutoff` is given, only sources brighter than it are kept. Both filters
    /// apply when both are given.
    pub fn select(&self, names: Option<&[String]>, cutoff: Option<FluxCutoff>) -> SourceList {
        let passes = |src: &Source| cutoff.map(|c| c.passes(src)).unwrap_or(true);

        match names {
            Some(names) => {
                let mut selected = SourceList::new();
                for name in names {
                    match self.get(name) {
                        Some(src) => {
                            if passes(src) {
                                selected.insert(name.clone(), src.clone());
                            }
                        }
                        None => warn!("Source '{name}' is not in the catalog; skipping"),
                    }
                }
                selected
            }

            None => self
                .iter()
                .filter(|(_, src)| passes(src))
                .map(|(name, src)| (name.clone(), src.clone()))
                .collect(),
        }
    }
}

impl From<IndexMap<String, Source>> for SourceList {
    fn from(sl: IndexMap<String, Source>) -> Self {
        Self(sl)
    }
}

impl<const N: usize> From<[(String, Source); N]> for SourceList {
    fn from(value: [(String, Source); N]) -> Self {
        Self(IndexMap::from(value))
    }
}

impl Deref for SourceList {
    type Target = IndexMap<String, Source>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for SourceList {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl FromIterator<(String, Source)> for SourceList {
    fn from_iter<I: IntoIterator<Item = (String, Source)>>(iter: I) -> Self {
        let mut c = Self::new();
        for i in iter {
            c.insert(i.0, i.1);
        }
        c
    }
}

impl IntoIterator for SourceList {
    type Item = (String, Source);
    type IntoIter = indexmap::map::IntoIter<String, Source>;

    fn into_iter(self) -> indexmap::map::IntoIter<String, Source> {
        self.0.into_iter()
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct SourceCounts {
    pub(crate) num_power_laws: usize,
    pub(crate) num_log_polynomials: usize,
}
