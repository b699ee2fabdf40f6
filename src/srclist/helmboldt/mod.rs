// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Code to read the Helmboldt catalog (<http://arxiv.org/abs/0707.3418>).
//!
//! The catalog is made of two text files; one lists source positions, the
//! other lists spectral fits. Entries are merged by source name. Sources with
//! a good fit across surveys get a curved spectrum (see
//! [`crate::srclist::FluxDensityType::LogPolynomial`]); all others get a power
//! law anchored on the 74 MHz VLSS flux density.

mod read;

use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
    sync::OnceLock,
};

use log::{debug, info};

use super::{FluxCutoff, HelmboldtReadError, Source, SourceList};
use crate::constants::{HELMBOLDT_FIT_ENV, HELMBOLDT_POS_ENV};

/// The lazily-loaded catalog used by [`get_srcs`].
static CATALOG: OnceLock<HelmboldtCatalog> = OnceLock::new();

/// The Helmboldt catalog. Once built, it is never modified; flux densities at
/// other frequencies are calculated on demand.
#[derive(Debug, Clone)]
pub struct HelmboldtCatalog {
    sources: SourceList,
}

impl HelmboldtCatalog {
    /// Read the catalog from a position file and a spectral-fit file.
    pub fn from_files<P: AsRef<Path>, P2: AsRef<Path>>(
        pos_file: P,
        fit_file: P2,
    ) -> Result<HelmboldtCatalog, HelmboldtReadError> {
        fn open(file: &Path) -> Result<BufReader<File>, HelmboldtReadError> {
            File::open(file)
                .map(BufReader::new)
                .map_err(|err| HelmboldtReadError::Open {
                    file: file.to_path_buf(),
                    err,
                })
        }

        let pos_file = pos_file.as_ref();
        let fit_file = fit_file.as_ref();
        debug!(
            "Reading Helmboldt catalog from {} and {}",
            pos_file.display(),
            fit_file.display()
        );
        let cat = Self::from_readers(&mut open(pos_file)?, &mut open(fit_file)?)?;
        info!(
            "Read {} sources from the Helmboldt catalog",
            cat.sources.len()
        );
        Ok(cat)
    }

    /// Read the catalog from the files named by the `HELMBOLDT_POS` and
    /// `HELMBOLDT_FIT` environment variables.
    pub fn from_env() -> Result<HelmboldtCatalog, HelmboldtReadError> {
        let var = |name: &'static str| -> Result<PathBuf, HelmboldtReadError> {
            std::env::var_os(name)
                .map(PathBuf::from)
                .ok_or(HelmboldtReadError::MissingEnvVar(name))
        };
        Self::from_files(var(HELMBOLDT_POS_ENV)?, var(HELMBOLDT_FIT_ENV)?)
    }

    /// Read the catalog from the contents of a position file and a
    /// spectral-fit file. Every fit must belong to a listed position, and
    /// every position must have exactly one fit.
    pub fn from_readers<T: std::io::BufRead, T2: std::io::BufRead>(
        pos: &mut T,
        fit: &mut T2,
    ) -> Result<HelmboldtCatalog, HelmboldtReadError> {
        let positions = read::parse_position_file(pos)?;
        let mut spectra = vec![None; positions.len()];
        for (line_num, name, spec) in read::parse_fit_file(fit)? {
            let index = positions.get_index_of(&name).ok_or_else(|| {
                HelmboldtReadError::FitWithoutPosition {
                    line_num,
                    name: name.clone(),
                }
            })?;
            if spectra[index].is_some() {
                return Err(HelmboldtReadError::DuplicateFit { line_num, name });
            }
            spectra[index] = Some(spec);
        }

        let sources = positions
            .into_iter()
            .zip(spectra)
            .map(|((name, radec), spec)| match spec {
                Some(spec) => Ok((
                    name,
                    Source {
                        radec,
                        flux_type: read::flux_type_from_spectrum(&spec),
                    },
                )),
                None => Err(HelmboldtReadError::PositionWithoutFit(name)),
            })
            .collect::<Result<SourceList, _>>()?;

        let counts = sources.get_counts();
        debug!(
            "Helmboldt catalog: {} power-law sources, {} curved sources",
            counts.num_power_laws, counts.num_log_polynomials
        );

        Ok(HelmboldtCatalog { sources })
    }

    /// All of the sources in the catalog, in position-file order.
    pub fn sources(&self) -> &SourceList {
        &self.sources
    }

    /// Select sources from the catalog; see [`SourceList::select`].
    pub fn get_srcs(&self, names: Option<&[String]>, cutoff: Option<FluxCutoff>) -> SourceList {
        self.sources.select(names, cutoff)
    }
}

/// Select sources from the default Helmboldt catalog. The catalog is read
/// from the files named by the `HELMBOLDT_POS` and `HELMBOLDT_FIT`
/// environment variables the first time this function is called, and reused
/// for the rest of the process.
pub fn get_srcs(
    names: Option<&[String]>,
    cutoff: Option<FluxCutoff>,
) -> Result<SourceList, HelmboldtReadError> {
    let cat = match CATALOG.get() {
        Some(cat) => cat,
        None => {
            let cat = HelmboldtCatalog::from_env()?;
            // If another thread won the race, its catalog is used and this
            // one is dropped.
            CATALOG.get_or_init(|| cat)
        }
    };
    Ok(cat.get_srcs(names, cutoff))
}
