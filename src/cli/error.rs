// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Error type for all skysub-related errors. This should be the *only* error
//! enum that is publicly visible.

use thiserror::Error;

use super::{common::SkyModelArgsError, helm::HelmArgsError, vis_model::VisModelArgsError};
use crate::{
    io::uvfits::UvfitsPipeError,
    params::VisModelError,
    srclist::{HelmboldtReadError, ReadSourceListError, WriteSourceListError},
    unit_parsing::UnitParseError,
};

const HELMBOLDT_URL: &str = "http://arxiv.org/abs/0707.3418";
const UVFITS_URL: &str = "https://library.nrao.edu/public/memos/aips/memos/AIPSM_117.pdf";

/// The *only* publicly visible error from skysub. Where it helps, the error
/// message includes a pointer to more documentation.
#[derive(Error, Debug)]
pub enum SkysubError {
    /// An error related to vis-subtract or vis-simulate.
    #[error("{0}\n\nSee `skysub vis-subtract --help` for more info")]
    VisModel(String),

    /// An error surrounding the Helmboldt catalog.
    #[error("{0}\n\nThe Helmboldt catalog is described here: {HELMBOLDT_URL}")]
    Helmboldt(String),

    /// Generic error surrounding source lists.
    #[error("{0}\n\nSee `skysub helm-convert --help` for more info")]
    Srclist(String),

    /// An error related to reading or writing uvfits files.
    #[error("{0}\n\nThe uvfits format is described here: {UVFITS_URL}")]
    Uvfits(String),

    /// An error related to argument files.
    #[error("{0}\n\nArgument files are toml or json files of the same arguments given on the command line; see --save-toml")]
    ArgFile(String),

    /// A cfitsio error. Because these are usually quite spartan, some
    /// suggestions are provided here.
    #[error("cfitsio error: {0}\n\nIf you don't know what this means, try turning up verbosity (-v or -vv) and maybe disabling progress bars.")]
    Cfitsio(String),

    /// A generic error that can't be clarified further with documentation, e.g.
    /// IO errors.
    #[error("{0}")]
    Generic(String),
}

// When changing the error propagation below, ensure `Self::from(e)` uses the
// correct `e`!

// Binary sub-command errors.

impl From<VisModelArgsError> for SkysubError {
    fn from(e: VisModelArgsError) -> Self {
        let s = e.to_string();
        match e {
            VisModelArgsError::NoInputs
            | VisModelArgsError::InputDoesNotExist(_)
            | VisModelArgsError::EmptySuffix
            | VisModelArgsError::BadArrayPosition { .. } => Self::VisModel(s),
        }
    }
}

impl From<VisModelError> for SkysubError {
    fn from(e: VisModelError) -> Self {
        let s = e.to_string();
        match e {
            VisModelError::NoSources(_) => Self::VisModel(s),
            VisModelError::Uvfits(e) => Self::from(e),
        }
    }
}

impl From<SkyModelArgsError> for SkysubError {
    fn from(e: SkyModelArgsError) -> Self {
        let s = e.to_string();
        match e {
            SkyModelArgsError::OnlyOneHelmboldtFile => Self::Helmboldt(s),
            SkyModelArgsError::NoSources | SkyModelArgsError::BadCutoffFreq(_) => Self::Srclist(s),
            SkyModelArgsError::ParseFreq(e) => Self::from(e),
            SkyModelArgsError::Helmboldt(e) => Self::from(e),
            SkyModelArgsError::ReadSourceList(e) => Self::from(e),
        }
    }
}

impl From<HelmArgsError> for SkysubError {
    fn from(e: HelmArgsError) -> Self {
        let s = e.to_string();
        match e {
            HelmArgsError::BadFreq(_) => Self::Generic(s),
            HelmArgsError::InvalidOutputType(_) | HelmArgsError::UnknownOutputType(_) => {
                Self::Srclist(s)
            }
        }
    }
}

// Library code errors.

impl From<UvfitsPipeError> for SkysubError {
    fn from(e: UvfitsPipeError) -> Self {
        let s = e.to_string();
        match e {
            UvfitsPipeError::Fitsio(_)
            | UvfitsPipeError::Fits(_)
            | UvfitsPipeError::ReadVis { .. }
            | UvfitsPipeError::WriteVis { .. } => Self::Cfitsio(s),
            UvfitsPipeError::Copy { .. } | UvfitsPipeError::Rename { .. } => Self::Generic(s),
            _ => Self::Uvfits(s),
        }
    }
}

impl From<HelmboldtReadError> for SkysubError {
    fn from(e: HelmboldtReadError) -> Self {
        let s = e.to_string();
        match e {
            HelmboldtReadError::IO(e) => Self::from(e),
            _ => Self::Helmboldt(s),
        }
    }
}

impl From<ReadSourceListError> for SkysubError {
    fn from(e: ReadSourceListError) -> Self {
        let s = e.to_string();
        match e {
            ReadSourceListError::IO(_) => Self::Generic(s),
            _ => Self::Srclist(s),
        }
    }
}

impl From<WriteSourceListError> for SkysubError {
    fn from(e: WriteSourceListError) -> Self {
        let s = e.to_string();
        match e {
            WriteSourceListError::InvalidHyperdriveFormat(_) => Self::Srclist(s),
            WriteSourceListError::IO(e) => Self::from(e),
            WriteSourceListError::Yaml(_) | WriteSourceListError::Json(_) => Self::Generic(s),
        }
    }
}

impl From<UnitParseError> for SkysubError {
    fn from(e: UnitParseError) -> Self {
        Self::Generic(e.to_string())
    }
}

impl From<std::io::Error> for SkysubError {
    fn from(e: std::io::Error) -> Self {
        Self::Generic(e.to_string())
    }
}
