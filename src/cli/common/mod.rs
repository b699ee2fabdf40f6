// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Common arguments for command-line interfaces. e.g. the `vis-subtract` and
//! `helm-query` subcommands both select sources from a sky model, so the same
//! sky-model arguments are shared between them.

mod printers;

pub(super) use printers::InfoPrinter;
pub(crate) use printers::{display_warnings, Warn};

use std::path::PathBuf;

use clap::Parser;
use itertools::Itertools;
use log::{debug, trace, Level::Trace};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};
use thiserror::Error;

use crate::{
    constants::{HELMBOLDT_FIT_ENV, HELMBOLDT_POS_ENV, HELMBOLDT_REF_FREQ_HZ},
    srclist::{
        helmboldt::{self, HelmboldtCatalog},
        read_source_list_file, FluxCutoff, HelmboldtReadError, ReadSourceListError, SourceList,
    },
    unit_parsing::{parse_freq_hz, UnitParseError},
};

lazy_static::lazy_static! {
    pub(super) static ref ARG_FILE_TYPES_COMMA_SEPARATED: String = ArgFileTypes::iter().join(", ");

    pub(super) static ref ARG_FILE_HELP: String =
        format!("All arguments may be specified in a file. Any CLI arguments override arguments set in the file. Supported formats: {}", *ARG_FILE_TYPES_COMMA_SEPARATED);

    static ref HELMBOLDT_POS_HELP: String =
        format!("Path to the Helmboldt catalog position file. Default: the value of ${HELMBOLDT_POS_ENV}");

    static ref HELMBOLDT_FIT_HELP: String =
        format!("Path to the Helmboldt catalog spectral-fit file. Default: the value of ${HELMBOLDT_FIT_ENV}");

    static ref CUTOFF_FREQ_HELP: String =
        format!("The frequency at which --flux-cutoff is evaluated. Units may be given (e.g. 150MHz); a bare number is in Hz. Default: {}MHz", HELMBOLDT_REF_FREQ_HZ / 1e6);
}

#[derive(Debug, Display, EnumIter, EnumString)]
pub(super) enum ArgFileTypes {
    #[strum(serialize = "toml")]
    Toml,
    #[strum(serialize = "json")]
    Json,
}

macro_rules! unpack_arg_file {
    ($arg_file:expr) => ({
        use std::{fs::File, io::Read, str::FromStr};

        use crate::cli::common::{ArgFileTypes, ARG_FILE_TYPES_COMMA_SEPARATED};

        debug!("Attempting to parse argument file {}", $arg_file.display());

        let mut contents = String::new();
        let arg_file_type = $arg_file
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .and_then(|e| ArgFileTypes::from_str(&e).ok());

        match arg_file_type {
            Some(ArgFileTypes::Toml) => {
                debug!("Parsing toml file...");
                let mut fh = File::open(&$arg_file)?;
                fh.read_to_string(&mut contents)?;
                match toml::from_str(&contents) {
                    Ok(p) => p,
                    Err(err) => {
                        return Err(SkysubError::ArgFile(format!(
                            "Couldn't decode toml structure from {:?}:\n{err}",
                            $arg_file
                        )))
                    }
                }
            }
            Some(ArgFileTypes::Json) => {
                debug!("Parsing json file...");
                let mut fh = File::open(&$arg_file)?;
                fh.read_to_string(&mut contents)?;
                match serde_json::from_str(&contents) {
                    Ok(p) => p,
                    Err(err) => {
                        return Err(SkysubError::ArgFile(format!(
                            "Couldn't decode json structure from {:?}:\n{err}",
                            $arg_file
                        )))
                    }
                }
            }

            _ => {
                return Err(SkysubError::ArgFile(format!(
                    "Argument file '{:?}' doesn't have a recognised file extension! Valid extensions are: {}", $arg_file, *ARG_FILE_TYPES_COMMA_SEPARATED)
                ))
            }
        }
    });
}

/// Arguments to select sources from a sky model. The sky model is the
/// Helmboldt catalog, unless a hyperdrive-style source list is given.
#[derive(Parser, Debug, Clone, Default, Serialize, Deserialize)]
pub(super) struct SkyModelArgs {
    /// Catalog names of the sources to use (e.g. J0000+123). Names may be
    /// separated by commas, or this flag may be given many times. The default
    /// is to use every source that passes the flux-density cutoff.
    #[clap(short = 'c', long = "cat", use_value_delimiter(true), help_heading = "SKY MODEL")]
    #[serde(rename = "cat")]
    pub(super) source_names: Option<Vec<String>>,

    /// Only use sources brighter than this Stokes I flux density [Jy].
    #[clap(long, help_heading = "SKY MODEL")]
    pub(super) flux_cutoff: Option<f64>,

    #[clap(long, help = CUTOFF_FREQ_HELP.as_str(), help_heading = "SKY MODEL")]
    pub(super) cutoff_freq: Option<String>,

    #[clap(long, help = HELMBOLDT_POS_HELP.as_str(), help_heading = "SKY MODEL")]
    pub(super) helmboldt_pos: Option<PathBuf>,

    #[clap(long, help = HELMBOLDT_FIT_HELP.as_str(), help_heading = "SKY MODEL")]
    pub(super) helmboldt_fit: Option<PathBuf>,

    /// Path to a hyperdrive-style yaml or json source list to select sources
    /// from, instead of the Helmboldt catalog.
    #[clap(long, help_heading = "SKY MODEL")]
    pub(super) source_list: Option<PathBuf>,
}

impl SkyModelArgs {
    pub(super) fn merge(self, other: Self) -> Self {
        Self {
            source_names: self.source_names.or(other.source_names),
            flux_cutoff: self.flux_cutoff.or(other.flux_cutoff),
            cutoff_freq: self.cutoff_freq.or(other.cutoff_freq),
            helmboldt_pos: self.helmboldt_pos.or(other.helmboldt_pos),
            helmboldt_fit: self.helmboldt_fit.or(other.helmboldt_fit),
            source_list: self.source_list.or(other.source_list),
        }
    }

    /// Read the sky model and select sources from it. It is an error for no
    /// sources to be selected.
    pub(super) fn parse(self) -> Result<SourceList, SkyModelArgsError> {
        let Self {
            source_names,
            flux_cutoff,
            cutoff_freq,
            helmboldt_pos,
            helmboldt_fit,
            source_list,
        } = self;

        let mut printer = InfoPrinter::new("Sky model info".into());

        let cutoff = match (flux_cutoff, cutoff_freq) {
            (Some(flux_jy), freq) => {
                let freq_hz = match freq {
                    Some(f) => parse_freq_hz(&f)?,
                    None => HELMBOLDT_REF_FREQ_HZ,
                };
                if freq_hz <= 0.0 {
                    return Err(SkyModelArgsError::BadCutoffFreq(freq_hz));
                }
                printer.push_line(
                    format!("Flux-density cutoff: {flux_jy} Jy at {} MHz", freq_hz / 1e6).into(),
                );
                Some(FluxCutoff { flux_jy, freq_hz })
            }
            (None, Some(_)) => {
                "--cutoff-freq was given without --flux-cutoff; ignoring it".warn();
                None
            }
            (None, None) => None,
        };
        let names = source_names.as_deref();
        if names.is_none() && cutoff.is_none() {
            "No source names or flux-density cutoff were given; using every source in the sky model"
                .warn();
        }

        let sl = match (source_list, helmboldt_pos, helmboldt_fit) {
            (Some(path), pos, fit) => {
                if pos.is_some() || fit.is_some() {
                    "A source list was given; ignoring the Helmboldt catalog files".warn();
                }
                printer.push_line(format!("Source list: {}", path.display()).into());
                read_source_list_file(&path)?.select(names, cutoff)
            }
            (None, Some(pos), Some(fit)) => {
                printer.push_block(vec![
                    "Helmboldt catalog".into(),
                    format!("Positions: {}", pos.display()).into(),
                    format!("Fits:      {}", fit.display()).into(),
                ]);
                HelmboldtCatalog::from_files(&pos, &fit)?.get_srcs(names, cutoff)
            }
            (None, None, None) => {
                printer.push_line(
                    format!("Helmboldt catalog from ${HELMBOLDT_POS_ENV} and ${HELMBOLDT_FIT_ENV}")
                        .into(),
                );
                helmboldt::get_srcs(names, cutoff)?
            }
            (None, _, _) => return Err(SkyModelArgsError::OnlyOneHelmboldtFile),
        };

        if sl.is_empty() {
            return Err(SkyModelArgsError::NoSources);
        }
        let counts = sl.get_counts();
        printer.push_line(
            format!(
                "Using {} sources ({} power laws, {} log polynomials)",
                sl.len(),
                counts.num_power_laws,
                counts.num_log_polynomials
            )
            .into(),
        );
        printer.display();

        if log::log_enabled!(Trace) {
            trace!("Using sources:");
            for chunk in &sl.keys().chunks(5) {
                trace!("  {:?}", chunk.collect::<Vec<_>>());
            }
        }
        debug!("Selected {} sources", sl.len());

        Ok(sl)
    }
}

#[derive(Error, Debug)]
pub(super) enum SkyModelArgsError {
    #[error("Only one of the Helmboldt catalog files was given; both --helmboldt-pos and --helmboldt-fit are needed")]
    OnlyOneHelmboldtFile,

    #[error("No sources were selected from the sky model")]
    NoSources,

    #[error("The cutoff frequency must be positive (got {0} Hz)")]
    BadCutoffFreq(f64),

    #[error(transparent)]
    ParseFreq(#[from] UnitParseError),

    #[error(transparent)]
    Helmboldt(#[from] HelmboldtReadError),

    #[error(transparent)]
    ReadSourceList(#[from] ReadSourceListError),
}
