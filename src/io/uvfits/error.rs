// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors when streaming uvfits files.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub(crate) enum UvfitsPipeError {
    #[error("Supplied file path {0} does not exist or is not readable!")]
    BadFile(PathBuf),

    #[error("Supplied file path {0} does not contain any data")]
    Empty(PathBuf),

    #[error("The array position of {0} is not set (ARRAYX, ARRAYY and ARRAYZ are all 0); please supply one")]
    NoArrayPos(PathBuf),

    #[error("The TIMSYS ({0}) wasn't UTC, IAT or TAI; this is unsupported")]
    UnknownTimsys(String),

    #[error("Expected to find key {key} in header of HDU {hdu}")]
    MissingKey { key: &'static str, hdu: usize },

    #[error("Found an index for ANTENNA1, but not ANTENNA2; cannot continue")]
    Antenna1ButNotAntenna2,

    #[error("Found an index for ANTENNA2, but not ANTENNA1; cannot continue")]
    Antenna2ButNotAntenna1,

    #[error("None of BASELINE, ANTENNA1 or ANTENNA2 were specified; cannot continue")]
    NoBaselineInfo,

    #[error("There are {0} floats per polarisation; this is unsupported. The uvfits standard enforces only 2 or 3 floats per polarisation")]
    WrongFloatsPerPolCount(u8),

    #[error("The shape of the visibility data is unsupported; we expect COMPLEX to be NAXIS2 (got {complex}), STOKES to be NAXIS3 (got {stokes}), and FREQ to be NAXIS4 (got {freq})")]
    WrongDataOrder { complex: u8, stokes: u8, freq: u8 },

    #[error("NAXIS{axis} has length {len}; only a length of 1 is supported for axes after FREQ")]
    ExtraAxis { axis: usize, len: usize },

    #[error("STOKES value {0} (from CRVAL, CDELT and CRPIX) is not a valid polarisation code")]
    UnsupportedPolCode(f64),

    #[error("When attempting to read uvfits row {row_num}, cfitsio gave an error: {err}")]
    ReadVis {
        row_num: usize,
        err: fitsio::errors::Error,
    },

    #[error("When attempting to write uvfits row {row_num}, cfitsio gave an error: {err}")]
    WriteVis {
        row_num: usize,
        err: fitsio::errors::Error,
    },

    #[error("Couldn't copy {from} to {to}: {err}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        err: std::io::Error,
    },

    #[error("Couldn't move {from} to {to}: {err}")]
    Rename {
        from: PathBuf,
        to: PathBuf,
        err: std::io::Error,
    },

    /// A generic error associated with fitsio.
    #[error(transparent)]
    Fitsio(#[from] fitsio::errors::Error),

    /// A error from interacting with a fits file. This particular error wraps
    /// those of `rust-fitsio`.
    #[error(transparent)]
    Fits(#[from] crate::io::fits::FitsError),
}
