// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Utilities surrounding the Helmboldt catalog.

#[cfg(test)]
mod tests;

use std::{path::PathBuf, str::FromStr};

use clap::Parser;
use log::{debug, info};
use marlu::sexagesimal::{degrees_to_sexagesimal_dms, degrees_to_sexagesimal_hms};
use thiserror::Error;

use super::common::{display_warnings, SkyModelArgs};
use crate::{
    constants::HELMBOLDT_REF_FREQ_HZ,
    srclist::{
        write_source_list, HyperdriveFileType, SourceList,
        HYPERDRIVE_SOURCE_LIST_FILE_TYPES_COMMA_SEPARATED,
    },
    unit_parsing::parse_freq_hz,
    SkysubError,
};

lazy_static::lazy_static! {
    static ref FREQ_HELP: String =
        format!("The frequency to report flux densities at. Units may be given (e.g. 150MHz); a bare number is in Hz. Default: {}MHz", HELMBOLDT_REF_FREQ_HZ / 1e6);

    static ref OUTPUT_TYPE_HELP: String =
        format!("Specifies the type of the output source list. If not given, the output file's extension is used. Currently supported types: {}",
                *HYPERDRIVE_SOURCE_LIST_FILE_TYPES_COMMA_SEPARATED);
}

/// Print the positions and spectra of sky-model sources.
#[derive(Parser, Debug)]
pub(super) struct HelmQueryArgs {
    #[clap(long, help = FREQ_HELP.as_str())]
    freq: Option<String>,

    #[clap(flatten)]
    srclist_args: SkyModelArgs,
}

impl HelmQueryArgs {
    pub(super) fn run(self) -> Result<(), SkysubError> {
        let freq_hz = match self.freq.as_deref() {
            Some(f) => parse_freq_hz(f)?,
            None => HELMBOLDT_REF_FREQ_HZ,
        };
        if freq_hz <= 0.0 {
            return Err(HelmArgsError::BadFreq(freq_hz).into());
        }
        let sl = self.srclist_args.parse()?;
        display_warnings();

        for line in source_table(&sl, freq_hz) {
            info!("{line}");
        }
        Ok(())
    }
}

/// Render a source list as a table, one line per source after a header. Flux
/// densities are Stokes I at `freq_hz`.
fn source_table(sl: &SourceList, freq_hz: f64) -> Vec<String> {
    let mut lines = Vec::with_capacity(sl.len() + 1);
    lines.push(format!(
        "{:<10} {:>14} {:>15} {:>12}  Spectrum",
        "Name",
        "RA",
        "Dec",
        format!("S({}MHz)", freq_hz / 1e6),
    ));
    for (name, src) in sl.iter() {
        lines.push(format!(
            "{name:<10} {:>14} {:>15} {:>12.4}  {}",
            degrees_to_sexagesimal_hms(src.radec.ra.to_degrees()),
            degrees_to_sexagesimal_dms(src.radec.dec.to_degrees()),
            src.estimate_at_freq(freq_hz).i,
            src.flux_type.describe(),
        ));
    }
    lines
}

/// Write sky-model sources to a hyperdrive-style source list.
#[derive(Parser, Debug)]
pub(super) struct HelmConvertArgs {
    /// Path to the output source list.
    #[clap(name = "OUTPUT_SOURCE_LIST", parse(from_os_str))]
    output: PathBuf,

    #[clap(long, help = OUTPUT_TYPE_HELP.as_str())]
    output_type: Option<String>,

    #[clap(flatten)]
    srclist_args: SkyModelArgs,
}

impl HelmConvertArgs {
    pub(super) fn run(self) -> Result<(), SkysubError> {
        let Self {
            output,
            output_type,
            srclist_args,
        } = self;

        // Check the output type before doing any real work.
        let output_type = match output_type {
            Some(t) => match HyperdriveFileType::from_str(&t.to_lowercase()) {
                Ok(t) => Some(t),
                Err(_) => return Err(HelmArgsError::InvalidOutputType(t).into()),
            },
            None => match HyperdriveFileType::from_path(&output) {
                Some(t) => Some(t),
                None => return Err(HelmArgsError::UnknownOutputType(output).into()),
            },
        };
        debug!("Output source list type: {output_type:?}");

        let sl = srclist_args.parse()?;
        display_warnings();
        write_source_list(&sl, &output, output_type)?;
        Ok(())
    }
}

#[derive(Error, Debug)]
pub(super) enum HelmArgsError {
    #[error("The frequency must be positive (got {0} Hz)")]
    BadFreq(f64),

    #[error("'{0}' is not a supported source list type. Supported types: {}", *HYPERDRIVE_SOURCE_LIST_FILE_TYPES_COMMA_SEPARATED)]
    InvalidOutputType(String),

    #[error("Couldn't determine the source list type of {0} from its extension. Use --output-type or one of: {}", *HYPERDRIVE_SOURCE_LIST_FILE_TYPES_COMMA_SEPARATED)]
    UnknownOutputType(PathBuf),
}
