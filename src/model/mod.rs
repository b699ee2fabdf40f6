// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Code to generate point-source sky-model visibilities.
//!
//! There is no primary beam; every source above the horizon contributes its
//! full flux density.


use hifitime::{Duration, Epoch};
use log::{debug, trace};
use marlu::{c64, precession::precess_time, Jones, LatLngHeight, LmnRime, RADec, UVW};
use ndarray::{parallel::prelude::*, prelude::*};

use crate::{constants::*, srclist::SourceList};

/// Point-source components, prepared for modelling.
struct PointComponents {
    radecs: Vec<RADec>,
    lmns: Vec<LmnRime>,
    /// Instrumental flux densities. The first axis is frequency, the second is
    /// source.
    flux_densities: Array2<Jones<f64>>,
}

pub(crate) struct PointModeller {
    components: PointComponents,

    /// The frequencies of each channel \[Hz\].
    freqs: Vec<f64>,

    /// The phase centre used for all modelling.
    phase_centre: RADec,

    array_position: LatLngHeight,

    /// The UT1 - UTC offset. If this is 0, effectively UT1 == UTC, which is a
    /// wrong assumption by up to 0.9s.
    dut1: Duration,
}

impl PointModeller {
    pub(crate) fn new(
        source_list: &SourceList,
        freqs_hz: &[f64],
        phase_centre: RADec,
        array_position: LatLngHeight,
        dut1: Duration,
    ) -> PointModeller {
        let radecs: Vec<RADec> = source_list.values().map(|src| src.radec).collect();
        let lmns = radecs
            .iter()
            .map(|radec| radec.to_lmn(phase_centre).prepare_for_rime())
            .collect();

        // Estimate the flux densities of every source at every frequency once.
        let mut flux_densities = Array2::from_elem((freqs_hz.len(), radecs.len()), Jones::default());
        flux_densities
            .outer_iter_mut()
            .into_par_iter()
            .zip(freqs_hz.par_iter())
            .for_each(|(mut fds_for_freq, &freq)| {
                fds_for_freq
                    .iter_mut()
                    .zip(source_list.values())
                    .for_each(|(fd, src)| {
                        *fd = src.estimate_at_freq(freq).to_inst_stokes();
                    });
            });

        PointModeller {
            components: PointComponents {
                radecs,
                lmns,
                flux_densities,
            },
            freqs: freqs_hz.to_vec(),
            phase_centre,
            array_position,
            dut1,
        }
    }

    pub(crate) fn num_sources(&self) -> usize {
        self.components.radecs.len()
    }

    /// Get the indices of the sources that are above the horizon at the given
    /// time. Source coordinates are J2000, so the precessed LMST and array
    /// latitude are used.
    pub(crate) fn visible_sources(&self, timestamp: Epoch) -> Vec<usize> {
        let precession_info = precess_time(
            self.array_position.longitude_rad,
            self.array_position.latitude_rad,
            self.phase_centre,
            timestamp,
            self.dut1,
        );
        debug!(
            "Modelling GPS timestamp {}, LMST {}°, J2000 LMST {}°",
            timestamp.to_gpst_seconds(),
            precession_info.lmst.to_degrees(),
            precession_info.lmst_j2000.to_degrees()
        );

        self.components
            .radecs
            .iter()
            .enumerate()
            .filter(|(_, radec)| {
                radec
                    .to_hadec(precession_info.lmst_j2000)
                    .to_azel(precession_info.array_latitude_j2000)
                    .el
                    >= ELEVATION_LIMIT
            })
            .map(|(i, _)| i)
            .collect()
    }

    /// Model the visibilities of a single baseline over all channels. `uvw`
    /// is in metres, and `visible` holds the indices of the sources to model
    /// (see [`PointModeller::visible_sources`]). The modelled visibilities
    /// overwrite `vis_model_f`.
    pub(crate) fn model_row(&self, uvw: UVW, visible: &[usize], vis_model_f: &mut [Jones<f64>]) {
        assert_eq!(
            vis_model_f.len(),
            self.freqs.len(),
            "vis_model_f.len() != self.freqs.len()"
        );

        let fds = &self.components.flux_densities;
        let lmns = &self.components.lmns;

        vis_model_f
            .iter_mut()
            .zip(fds.outer_iter())
            .zip(self.freqs.iter())
            .for_each(|((vis_model, comp_fds), &freq)| {
                // Divide UVW by lambda to make UVW dimensionless.
                let UVW { u, v, w } = uvw * freq / VEL_C;

                let mut jones_accum: Jones<f64> = Jones::default();
                for &i_src in visible {
                    let LmnRime { l, m, n } = lmns[i_src];
                    jones_accum += comp_fds[i_src] * c64::cis(u * l + v * m + w * n);
                }
                *vis_model = jones_accum;
            });
    }

    /// Model the visibilities of many baselines at a single time. The first
    /// axis of `vis_model_bf` is baseline, the second is frequency; its
    /// contents are overwritten. `uvws` are in metres. The number of visible
    /// sources is returned; if it is 0, the model is all zeros.
    pub(crate) fn model_timestamp(
        &self,
        timestamp: Epoch,
        uvws: &[UVW],
        mut vis_model_bf: ArrayViewMut2<Jones<f64>>,
    ) -> usize {
        assert_eq!(
            vis_model_bf.len_of(Axis(0)),
            uvws.len(),
            "vis_model_bf.len_of(Axis(0)) != uvws.len()"
        );

        let visible = self.visible_sources(timestamp);
        trace!(
            "{} of {} sources are above the horizon",
            visible.len(),
            self.num_sources()
        );
        if visible.is_empty() {
            vis_model_bf.fill(Jones::default());
            return 0;
        }

        vis_model_bf
            .outer_iter_mut()
            .into_par_iter()
            .zip(uvws.par_iter())
            .for_each(|(mut vis_model_f, &uvw)| {
                // Rows of a standard-layout array are contiguous.
                match vis_model_f.as_slice_mut() {
                    Some(slice) => self.model_row(uvw, &visible, slice),
                    None => {
                        let mut row = vec![Jones::default(); self.freqs.len()];
                        self.model_row(uvw, &visible, &mut row);
                        vis_model_f.assign(&ArrayView1::from(&row));
                    }
                }
            });
        visible.len()
    }
}
