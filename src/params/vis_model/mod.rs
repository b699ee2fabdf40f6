// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Given uvfits files and a sky model, either subtract the model from the
//! visibilities or replace the visibilities with the model, writing the
//! results to new files.


use std::path::{Path, PathBuf};

use log::{debug, info, trace};
use marlu::{Jones, LatLngHeight, UVW};
use ndarray::prelude::*;
use thiserror::Error;
use vec1::Vec1;

use crate::{
    cli::display_warnings,
    io::uvfits::{Polarisation, UvfitsChunk, UvfitsPipe, UvfitsPipeError},
    model::PointModeller,
    srclist::SourceList,
};

/// What to do with modelled visibilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub(crate) enum VisModelMode {
    /// Subtract the model from the data.
    #[default]
    Subtract,

    /// Replace the data with the model and unflag everything.
    Simulate,
}

pub(crate) struct VisModelParams {
    /// The uvfits files to process, in order.
    pub(crate) inputs: Vec1<PathBuf>,

    /// The string inserted between an input's file stem and its extension to
    /// make the output file name.
    pub(crate) suffix: String,

    pub(crate) source_list: SourceList,

    /// If supplied, this is used instead of each file's array position.
    pub(crate) array_position: Option<LatLngHeight>,

    pub(crate) mode: VisModelMode,
}

impl VisModelParams {
    pub(crate) fn run(&self) -> Result<(), VisModelError> {
        // Expose all the struct fields to ensure they're all used.
        let VisModelParams {
            inputs,
            suffix,
            source_list,
            array_position,
            mode,
        } = self;

        if source_list.is_empty() {
            return Err(VisModelError::NoSources(*mode));
        }

        for input in inputs {
            info!("{}", input.display());
            let output = output_path(input, suffix);
            if output.exists() {
                info!("File exists: skipping");
                continue;
            }

            let pipe = UvfitsPipe::new(input, *array_position)?;
            // Show anything odd about this file before its data is touched.
            display_warnings();
            let modeller = PointModeller::new(
                source_list,
                &pipe.freqs,
                pipe.phase_centre,
                pipe.array_position,
                pipe.dut1,
            );
            debug!(
                "Modelling {} sources over {} timesteps ({} mode)",
                modeller.num_sources(),
                pipe.num_timesteps(),
                mode
            );
            match pipe.int_time {
                Some(int_time) => debug!(
                    "Each timestep is modelled at the centroid of its {int_time} integration"
                ),
                None => debug!("Each timestep is modelled at its centroid"),
            }
            let pols = &pipe.pols;
            pipe.run(&output, |chunk| {
                apply_model(&modeller, pols, *mode, chunk);
            })?;
        }

        Ok(())
    }
}

/// The output file name for `input`: the suffix goes between the file stem and
/// the extension, e.g. "obs.uvfits" becomes "obss.uvfits".
pub(crate) fn output_path(input: &Path, suffix: &str) -> PathBuf {
    let mut name = input.file_stem().unwrap_or_default().to_os_string();
    name.push(suffix);
    if let Some(ext) = input.extension() {
        name.push(".");
        name.push(ext);
    }
    input.with_file_name(name)
}

/// Model the cross-correlations of a chunk and apply the model to its data
/// according to `mode`. Auto-correlations are left as they are.
fn apply_model(
    modeller: &PointModeller,
    pols: &[Polarisation],
    mode: VisModelMode,
    chunk: &mut UvfitsChunk,
) {
    let cross_rows: Vec<usize> = chunk
        .antennas
        .iter()
        .enumerate()
        .filter(|(_, (ant1, ant2))| ant1 != ant2)
        .map(|(i_row, _)| i_row)
        .collect();
    if cross_rows.is_empty() {
        return;
    }
    let uvws: Vec<UVW> = cross_rows.iter().map(|&i_row| chunk.uvws[i_row]).collect();

    let num_chans = chunk.data.len_of(Axis(1));
    let mut vis_model_bf = Array2::from_elem((uvws.len(), num_chans), Jones::default());
    let num_visible = modeller.model_timestamp(chunk.timestamp, &uvws, vis_model_bf.view_mut());
    if num_visible == 0 && mode == VisModelMode::Subtract {
        trace!("No sources visible; data unchanged");
        return;
    }

    for (&i_row, vis_model_f) in cross_rows.iter().zip(vis_model_bf.outer_iter()) {
        let mut data_fpc = chunk.data.slice_mut(s![i_row, .., .., ..]);
        for (mut data_pc, vis_model) in data_fpc.outer_iter_mut().zip(vis_model_f.iter()) {
            for (mut data_c, &pol) in data_pc.outer_iter_mut().zip(pols.iter()) {
                let model = pol.project(*vis_model);
                match mode {
                    VisModelMode::Subtract => {
                        data_c[0] -= model.re as f32;
                        data_c[1] -= model.im as f32;
                    }
                    VisModelMode::Simulate => {
                        data_c[0] = model.re as f32;
                        data_c[1] = model.im as f32;
                        if let Some(weight) = data_c.get_mut(2) {
                            *weight = unflagged_weight(*weight);
                        }
                    }
                }
            }
        }
    }
}

/// Negative weights are flags. A zero weight is also treated as flagged, and
/// becomes 1.
fn unflagged_weight(weight: f32) -> f32 {
    if weight == 0.0 {
        1.0
    } else {
        weight.abs()
    }
}

#[derive(Error, Debug)]
pub(crate) enum VisModelError {
    #[error("No sources were selected from the sky model; there is nothing to {0}")]
    NoSources(VisModelMode),

    #[error(transparent)]
    Uvfits(#[from] UvfitsPipeError),
}
