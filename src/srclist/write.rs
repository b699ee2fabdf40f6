// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use log::{info, trace};

use super::{hyperdrive, HyperdriveFileType, SourceList, WriteSourceListError};

/// Write a [`SourceList`] to a hyperdrive-style file. If the file type isn't
/// given, it is determined from the path's extension.
pub(crate) fn write_source_list(
    sl: &SourceList,
    path: &Path,
    file_type: Option<HyperdriveFileType>,
) -> Result<(), WriteSourceListError> {
    trace!("Attempting to write output source list");
    let file_type = match file_type.or_else(|| HyperdriveFileType::from_path(path)) {
        Some(t) => t,
        None => {
            return Err(WriteSourceListError::InvalidHyperdriveFormat(
                path.extension()
                    .and_then(|e| e.to_str())
                    .unwrap_or("<no extension>")
                    .to_string(),
            ))
        }
    };

    let mut f = BufWriter::new(File::create(path)?);
    match file_type {
        HyperdriveFileType::Yaml => hyperdrive::source_list_to_yaml(&mut f, sl)?,
        HyperdriveFileType::Json => hyperdrive::source_list_to_json(&mut f, sl)?,
    }
    f.flush()?;
    info!(
        "Wrote {} sources to hyperdrive-style {file_type} source list {}",
        sl.len(),
        path.display()
    );

    Ok(())
}
