// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Arguments shared by `vis-subtract` and `vis-simulate`.


use std::path::PathBuf;

use clap::Parser;
use log::{debug, info, trace};
use marlu::LatLngHeight;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use vec1::Vec1;

use super::common::{display_warnings, InfoPrinter, SkyModelArgs, ARG_FILE_HELP};
use crate::{
    constants::DEFAULT_OUTPUT_SUFFIX,
    params::{output_path, VisModelMode, VisModelParams},
    SkysubError,
};

lazy_static::lazy_static! {
    static ref SUFFIX_HELP: String =
        format!("The string inserted between each input file's name and its extension to make the output file name, e.g. obs.uvfits becomes obs{DEFAULT_OUTPUT_SUFFIX}.uvfits. Existing output files are never overwritten; their inputs are skipped. Default: {DEFAULT_OUTPUT_SUFFIX}");
}

#[derive(Parser, Debug, Clone, Default, Serialize, Deserialize)]
struct VisModelCliArgs {
    /// Paths to the input uvfits files.
    #[clap(name = "UVFITS_FILES", parse(from_os_str), help_heading = "INPUT FILES")]
    #[serde(default)]
    inputs: Vec<PathBuf>,

    #[clap(long, help = SUFFIX_HELP.as_str(), help_heading = "OUTPUT FILES")]
    suffix: Option<String>,

    /// The Earth longitude, latitude, and height of the instrumental array
    /// [degrees, degrees, meters]. Default: the position in each uvfits
    /// file's antenna table.
    #[clap(
        long, help_heading = "MODEL PARAMETERS",
        number_of_values = 3,
        allow_hyphen_values = true,
        value_names = &["LONG_DEG", "LAT_DEG", "HEIGHT_M"]
    )]
    array_position: Option<Vec<f64>>,
}

#[derive(Parser, Debug, Clone, Default, Serialize, Deserialize)]
pub(super) struct VisModelArgs {
    #[clap(long = "args-file", help = ARG_FILE_HELP.as_str(), parse(from_os_str))]
    args_file: Option<PathBuf>,

    #[clap(flatten)]
    #[serde(rename = "sky-model")]
    #[serde(default)]
    srclist_args: SkyModelArgs,

    #[clap(flatten)]
    #[serde(rename = "vis")]
    #[serde(default)]
    vis_model_args: VisModelCliArgs,
}

impl VisModelArgs {
    /// Both command-line and file arguments overlap in terms of what is
    /// available; this function consolidates everything that was specified into
    /// a single struct. Where applicable, it will prefer CLI parameters over
    /// those in the file.
    ///
    /// This function should only ever merge arguments, and not try to make
    /// sense of them.
    pub(super) fn merge(self) -> Result<VisModelArgs, SkysubError> {
        debug!("Merging command-line arguments with the argument file");

        let cli_args = self;

        if let Some(arg_file) = cli_args.args_file {
            // Read in the file arguments. Ensure all of the file args are
            // accounted for by pattern matching.
            let VisModelArgs {
                args_file: _,
                srclist_args,
                vis_model_args,
            } = unpack_arg_file!(arg_file);

            // Merge all the arguments, preferring the CLI args when available.
            Ok(VisModelArgs {
                args_file: None,
                srclist_args: cli_args.srclist_args.merge(srclist_args),
                vis_model_args: cli_args.vis_model_args.merge(vis_model_args),
            })
        } else {
            Ok(cli_args)
        }
    }

    fn parse(self, mode: VisModelMode) -> Result<VisModelParams, SkysubError> {
        debug!("{:#?}", self);

        let Self {
            args_file: _,
            srclist_args,
            vis_model_args:
                VisModelCliArgs {
                    inputs,
                    suffix,
                    array_position,
                },
        } = self;

        let inputs = Vec1::try_from_vec(inputs).map_err(|_| VisModelArgsError::NoInputs)?;
        for input in &inputs {
            if !input.exists() {
                return Err(VisModelArgsError::InputDoesNotExist(input.clone()).into());
            }
        }
        let suffix = suffix.unwrap_or_else(|| DEFAULT_OUTPUT_SUFFIX.to_string());
        if suffix.is_empty() {
            return Err(VisModelArgsError::EmptySuffix.into());
        }

        let array_position = match array_position.as_deref() {
            None => None,
            Some(&[longitude_deg, latitude_deg, height_metres]) => Some(LatLngHeight {
                longitude_rad: longitude_deg.to_radians(),
                latitude_rad: latitude_deg.to_radians(),
                height_metres,
            }),
            Some(pos) => {
                return Err(VisModelArgsError::BadArrayPosition { pos: pos.to_vec() }.into())
            }
        };

        let mut printer = InfoPrinter::new(
            match mode {
                VisModelMode::Subtract => "Vis subtracting",
                VisModelMode::Simulate => "Vis simulating",
            }
            .into(),
        );
        printer.push_block(
            inputs
                .iter()
                .map(|input| {
                    let output = output_path(input, &suffix);
                    format!("{} -> {}", input.display(), output.display()).into()
                })
                .collect(),
        );
        if let Some(pos) = array_position {
            printer.push_line(
                format!(
                    "Array position: ({:.4}°, {:.4}°, {}m)",
                    pos.longitude_rad.to_degrees(),
                    pos.latitude_rad.to_degrees(),
                    pos.height_metres
                )
                .into(),
            );
        }
        printer.display();

        let source_list = srclist_args.parse()?;

        display_warnings();

        Ok(VisModelParams {
            inputs,
            suffix,
            source_list,
            array_position,
            mode,
        })
    }

    pub(super) fn run(self, mode: VisModelMode, dry_run: bool) -> Result<(), SkysubError> {
        debug!("Converting arguments into parameters");
        trace!("{:#?}", self);
        let params = self.parse(mode)?;

        if dry_run {
            info!("Dry run -- exiting now.");
            return Ok(());
        }

        params.run()?;
        Ok(())
    }
}

impl VisModelCliArgs {
    fn merge(self, other: Self) -> Self {
        Self {
            inputs: if self.inputs.is_empty() {
                other.inputs
            } else {
                self.inputs
            },
            suffix: self.suffix.or(other.suffix),
            array_position: self.array_position.or(other.array_position),
        }
    }
}

#[derive(Error, Debug)]
pub(super) enum VisModelArgsError {
    #[error("No input uvfits files were supplied")]
    NoInputs,

    #[error("Input file {0} does not exist")]
    InputDoesNotExist(PathBuf),

    #[error("The output suffix must not be empty; outputs would overwrite their inputs")]
    EmptySuffix,

    #[error("Array position specified as {pos:?}, not [<Longitude>, <Latitude>, <Height>]")]
    BadArrayPosition { pos: Vec<f64> },
}
