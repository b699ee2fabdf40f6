// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Helper functions for reading and editing FITS files.
//!
//! All of these functions are `#[track_caller]`; errors report where in
//! `skysub` the failing call was made.

mod error;

pub(crate) use error::FitsError;

use std::{fmt::Display, panic::Location, path::Path};

use fitsio::{hdu::*, FitsFile};

fn fitsio_error(
    e: fitsio::errors::Error,
    fits_fptr: &FitsFile,
    hdu_description: String,
    caller: &'static Location<'static>,
) -> FitsError {
    FitsError::Fitsio {
        fits_error: Box::new(e),
        fits_filename: fits_fptr.file_path().to_path_buf().into_boxed_path(),
        hdu_description: hdu_description.into_boxed_str(),
        source_file: caller.file(),
        source_line: caller.line(),
        source_column: caller.column(),
    }
}

/// Open a fits file for reading.
#[track_caller]
pub(crate) fn fits_open<P: AsRef<Path>>(file: P) -> Result<FitsFile, FitsError> {
    let caller = Location::caller();
    FitsFile::open(file.as_ref()).map_err(|e| FitsError::Open {
        fits_error: Box::new(e),
        fits_filename: file.as_ref().to_path_buf().into_boxed_path(),
        source_file: caller.file(),
        source_line: caller.line(),
        source_column: caller.column(),
    })
}

/// Open a fits file for reading and writing.
#[track_caller]
pub(crate) fn fits_edit<P: AsRef<Path>>(file: P) -> Result<FitsFile, FitsError> {
    let caller = Location::caller();
    FitsFile::edit(file.as_ref()).map_err(|e| FitsError::Open {
        fits_error: Box::new(e),
        fits_filename: file.as_ref().to_path_buf().into_boxed_path(),
        source_file: caller.file(),
        source_line: caller.line(),
        source_column: caller.column(),
    })
}

/// Open a fits file's HDU.
#[track_caller]
pub(crate) fn fits_open_hdu<T: DescribesHdu + Display + Copy>(
    fits_fptr: &mut FitsFile,
    hdu_description: T,
) -> Result<FitsHdu, FitsError> {
    let caller = Location::caller();
    fits_fptr
        .hdu(hdu_description)
        .map_err(|e| fitsio_error(e, fits_fptr, format!("{hdu_description}"), caller))
}

/// Given a FITS file pointer, a HDU that belongs to it, and a keyword that may
/// or may not exist, pull out the value of the keyword, parsing it into the
/// desired type.
#[track_caller]
pub(crate) fn fits_get_optional_key<T: std::str::FromStr>(
    fits_fptr: &mut FitsFile,
    hdu: &FitsHdu,
    keyword: &str,
) -> Result<Option<T>, FitsError> {
    let unparsed_value: String = match hdu.read_key(fits_fptr, keyword) {
        Ok(key_value) => key_value,
        // 202: keyword not found, 204: keyword number out of bounds.
        Err(fitsio::errors::Error::Fits(fe)) if matches!(fe.status, 202 | 204) => return Ok(None),
        Err(e) => {
            return Err(fitsio_error(
                e,
                fits_fptr,
                format!("{}", hdu.number + 1),
                Location::caller(),
            ))
        }
    };

    match unparsed_value.trim().parse() {
        Ok(parsed_value) => Ok(Some(parsed_value)),
        Err(_) => {
            let caller = Location::caller();
            Err(FitsError::Parse {
                key: keyword.to_string().into_boxed_str(),
                fits_filename: fits_fptr.file_path().to_path_buf().into_boxed_path(),
                hdu_num: hdu.number + 1,
                source_file: caller.file(),
                source_line: caller.line(),
                source_column: caller.column(),
            })
        }
    }
}

/// Given a FITS file pointer, a HDU that belongs to it, and a keyword, pull out
/// the value of the keyword, parsing it into the desired type.
#[track_caller]
pub(crate) fn fits_get_required_key<T: std::str::FromStr>(
    fits_fptr: &mut FitsFile,
    hdu: &FitsHdu,
    keyword: &str,
) -> Result<T, FitsError> {
    match fits_get_optional_key(fits_fptr, hdu, keyword)? {
        Some(value) => Ok(value),
        None => {
            let caller = Location::caller();
            Err(FitsError::MissingKey {
                key: keyword.to_string().into_boxed_str(),
                fits_filename: fits_fptr.file_path().to_path_buf().into_boxed_path(),
                hdu_num: hdu.number + 1,
                source_file: caller.file(),
                source_line: caller.line(),
                source_column: caller.column(),
            })
        }
    }
}
