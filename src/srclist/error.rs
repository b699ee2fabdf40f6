// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::path::PathBuf;

use thiserror::Error;

use super::{sexagesimal::SexagesimalError, HYPERDRIVE_SOURCE_LIST_FILE_TYPES_COMMA_SEPARATED};

/// Errors associated with reading in a hyperdrive-style source list.
#[derive(Error, Debug)]
pub(crate) enum ReadSourceListError {
    #[error(
        "Source list error: Attempted to use RA {0}°, but this is out of range (0° <= RA < 360°)"
    )]
    InvalidRa(f64),

    #[error(
        "Source list error: Attempted to use Dec {0}°, but this is out of range (-90° <= Dec <= 90°)"
    )]
    InvalidDec(f64),

    #[error("Source {source_name}: The flux density is not finite")]
    NonFiniteFluxDensity { source_name: String },

    #[error("'{0}' is an invalid file type for a hyperdrive-style source list; must have one of the following extensions: {}", *HYPERDRIVE_SOURCE_LIST_FILE_TYPES_COMMA_SEPARATED)]
    InvalidHyperdriveFormat(String),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    IO(#[from] std::io::Error),
}

/// Errors associated with reading the Helmboldt catalog.
#[derive(Error, Debug)]
pub enum HelmboldtReadError {
    #[error("Helmboldt position file line {0}: Line is too short to contain a name and position")]
    PositionLineTooShort(u32),

    #[error("Helmboldt fit file line {0}: Line is too short to contain a source name")]
    FitLineTooShort(u32),

    #[error("Helmboldt position file line {line_num}: Couldn't parse the {coord}: {err}")]
    Sexagesimal {
        line_num: u32,
        coord: &'static str,
        err: SexagesimalError,
    },

    #[error("Helmboldt fit file line {line_num}: Error converting string '{string}' to a float")]
    ParseFloat { line_num: u32, string: String },

    #[error("Helmboldt fit file line {line_num}: Source {name} has no spectral information")]
    EmptySpectrum { line_num: u32, name: String },

    #[error("Helmboldt fit file line {line_num}: Source {name} is not in the position file")]
    FitWithoutPosition { line_num: u32, name: String },

    #[error("Helmboldt fit file line {line_num}: Source {name} has already been given a spectral fit")]
    DuplicateFit { line_num: u32, name: String },

    #[error("Helmboldt source {0} has a position but no spectral fit")]
    PositionWithoutFit(String),

    #[error("No Helmboldt catalog file was specified, and the {0} environment variable isn't set")]
    MissingEnvVar(&'static str),

    #[error("Couldn't open Helmboldt catalog file {file}: {err}")]
    Open { file: PathBuf, err: std::io::Error },

    #[error(transparent)]
    IO(#[from] std::io::Error),
}

/// Errors associated with writing out a source list.
#[derive(Error, Debug)]
pub(crate) enum WriteSourceListError {
    #[error("'{0}' is an invalid file type for a hyperdrive-style source list; must have one of the following extensions: {}", *HYPERDRIVE_SOURCE_LIST_FILE_TYPES_COMMA_SEPARATED)]
    InvalidHyperdriveFormat(String),

    /// An IO error.
    #[error(transparent)]
    IO(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
