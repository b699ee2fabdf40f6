// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Common code for reading sky-model source list files.

use std::{fs::File, io::BufReader, path::Path};

use log::debug;

use super::{hyperdrive, HyperdriveFileType, ReadSourceListError, SourceList};

/// Given the path to a hyperdrive-style sky-model source list file, return a
/// [`SourceList`]. The file's extension determines whether it is read as yaml
/// or json.
pub(crate) fn read_source_list_file<P: AsRef<Path>>(
    path: P,
) -> Result<SourceList, ReadSourceListError> {
    fn inner(path: &Path) -> Result<SourceList, ReadSourceListError> {
        debug!("Attempting to read source list {}", path.display());

        match HyperdriveFileType::from_path(path) {
            Some(HyperdriveFileType::Yaml) => {
                debug!("Read as hyperdrive yaml");
                let mut f = BufReader::new(File::open(path)?);
                hyperdrive::source_list_from_yaml(&mut f)
            }
            Some(HyperdriveFileType::Json) => {
                debug!("Read as hyperdrive json");
                let mut f = BufReader::new(File::open(path)?);
                hyperdrive::source_list_from_json(&mut f)
            }
            None => Err(ReadSourceListError::InvalidHyperdriveFormat(
                path.extension()
                    .and_then(|e| e.to_str())
                    .unwrap_or("<no extension>")
                    .to_string(),
            )),
        }
    }
    inner(path.as_ref())
}
