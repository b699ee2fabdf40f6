// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Code to stream the visibilities of a uvfits file through a transform and
//! into a copy of that file.
//!
//! Only the data part of each group is ever written; group parameters (UVWs,
//! times and baselines) and all other HDUs are left as they were in the input.
//!
//! The uvfits standard can be found here:
//! <https://library.nrao.edu/public/memos/aips/memos/AIPSM_117.pdf>

mod error;

pub(crate) use error::UvfitsPipeError;

use std::{
    path::{Path, PathBuf},
    thread::{self, ScopedJoinHandle},
};

use crossbeam_channel::{bounded, Receiver, Sender};
use crossbeam_utils::atomic::AtomicCell;
use fitsio::{errors::check_status as fits_check_status, hdu::FitsHdu, FitsFile};
use hifitime::{Duration, Epoch, TimeUnits};
use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use log::{debug, info, trace, warn};
use marlu::{
    c64, constants::VEL_C, io::uvfits::decode_uvfits_baseline, Jones, LatLngHeight, RADec,
    XyzGeocentric, UVW,
};
use ndarray::prelude::*;
use scopeguard::defer_on_unwind;
use vec1::Vec1;

use crate::{
    cli::Warn,
    io::fits::{fits_edit, fits_get_optional_key, fits_get_required_key, fits_open, fits_open_hdu},
    PROGRESS_BARS,
};

/// The maximum number of rows to read group parameters for at once when
/// scanning the file.
const SCAN_BUFFER_ROWS: usize = 8257;

/// A polarisation, as described by an AIPS STOKES code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub(crate) enum Polarisation {
    I,
    Q,
    U,
    V,
    RR,
    LL,
    RL,
    LR,
    XX,
    YY,
    XY,
    YX,
}

impl Polarisation {
    pub(crate) fn from_code(code: i8) -> Option<Polarisation> {
        let pol = match code {
            1 => Polarisation::I,
            2 => Polarisation::Q,
            3 => Polarisation::U,
            4 => Polarisation::V,
            -1 => Polarisation::RR,
            -2 => Polarisation::LL,
            -3 => Polarisation::RL,
            -4 => Polarisation::LR,
            -5 => Polarisation::XX,
            -6 => Polarisation::YY,
            -7 => Polarisation::XY,
            -8 => Polarisation::YX,
            _ => return None,
        };
        Some(pol)
    }

    /// Get this polarisation's value out of an instrumental Jones matrix
    /// (ordered XX, XY, YX, YY).
    pub(crate) fn project(self, j: Jones<f64>) -> c64 {
        let (xx, xy, yx, yy) = (j[0], j[1], j[2], j[3]);
        let i = (xx + yy) * 0.5;
        let q = (yy - xx) * 0.5;
        let u = (xy + yx) * 0.5;
        let v = (yx - xy) * c64::new(0.0, -0.5);
        let iu = u * c64::new(0.0, 1.0);
        match self {
            Polarisation::I => i,
            Polarisation::Q => q,
            Polarisation::U => u,
            Polarisation::V => v,
            Polarisation::RR => i + v,
            Polarisation::LL => i - v,
            Polarisation::RL => q + iu,
            Polarisation::LR => q - iu,
            Polarisation::XX => xx,
            Polarisation::YY => yy,
            Polarisation::XY => xy,
            Polarisation::YX => yx,
        }
    }
}

/// Consecutive uvfits rows that share a timestamp.
pub(crate) struct UvfitsChunk {
    /// The zero-indexed row of the first row in this chunk.
    first_row: usize,

    /// The centroid time of all rows.
    pub(crate) timestamp: Epoch,

    /// The uvfits antenna numbers of each row.
    pub(crate) antennas: Vec<(usize, usize)>,

    /// The UVWs of each row \[metres\].
    pub(crate) uvws: Vec<UVW>,

    /// The data part of each row. The first axis is row, then channel, then
    /// polarisation (in file order). The last axis holds the real part, the
    /// imaginary part and, if present, the weight.
    pub(crate) data: Array4<f32>,
}

struct ChunkInfo {
    first_row: usize,
    num_rows: usize,
    timestamp: Epoch,
}

pub(crate) struct UvfitsPipe {
    /// The path to the uvfits on disk.
    input: PathBuf,

    /// The uvfits-specific metadata, like which indices contain which
    /// parameters.
    metadata: UvfitsMetadata,

    /// Every run of consecutive rows with the same timestamp, in file order.
    chunks: Vec1<ChunkInfo>,

    /// The polarisations of the data, in file order.
    pub(crate) pols: Vec1<Polarisation>,

    /// The frequencies of each channel \[Hz\].
    pub(crate) freqs: Vec1<f64>,

    pub(crate) phase_centre: RADec,

    pub(crate) array_position: LatLngHeight,

    /// The UT1 - UTC offset. If the file has no UT1UTC key, this is 0.
    pub(crate) dut1: Duration,

    /// The integration time, from INTTIM if it's available, otherwise from the
    /// gap between the first two timesteps. `None` if neither is available.
    pub(crate) int_time: Option<Duration>,
}

impl UvfitsPipe {
    /// Inspect a uvfits file. If `array_position` is supplied, it is used
    /// instead of the position in the antenna table.
    pub(crate) fn new(
        input: &Path,
        array_position: Option<LatLngHeight>,
    ) -> Result<UvfitsPipe, UvfitsPipeError> {
        debug!("Using uvfits file: {}", input.display());
        if !input.exists() {
            return Err(UvfitsPipeError::BadFile(input.to_path_buf()));
        }

        let mut uvfits_fptr = fits_open(input)?;
        let primary_hdu = fits_open_hdu(&mut uvfits_fptr, 0)?;
        let antenna_table_hdu = fits_open_hdu(&mut uvfits_fptr, "AIPS AN")?;
        let metadata = UvfitsMetadata::new(&mut uvfits_fptr, &primary_hdu, &antenna_table_hdu)?;

        debug!("Number of rows in the uvfits:   {}", metadata.num_rows);
        debug!("PCOUNT:                         {}", metadata.pcount);
        debug!("Number of polarisations:        {}", metadata.num_pols);
        debug!(
            "Floats per polarisation:        {}",
            metadata.num_floats_per_pol
        );
        debug!("Number of frequency chans:      {}", metadata.num_chans);
        debug!("UU index:       {}", metadata.indices.u);
        debug!("VV index:       {}", metadata.indices.v);
        debug!("WW index:       {}", metadata.indices.w);
        match metadata.indices.baseline_or_antennas {
            BaselineOrAntennas::Baseline { index } => debug!("BASELINE index: {index}"),
            BaselineOrAntennas::Antennas { index1, index2 } => {
                debug!("ANTENNA1 index: {index1}");
                debug!("ANTENNA2 index: {index2}");
            }
        }
        debug!("DATE index:     {}", metadata.indices.date1);
        if let Some(d2) = metadata.indices.date2 {
            debug!("(Second) DATE index: {}", d2);
        }
        if let Some(inttim) = metadata.indices.inttim {
            debug!("INTTIM index:   {}", inttim);
        }
        debug!("STOKES index:   {}", metadata.indices.stokes);
        debug!("FREQ index:     {}", metadata.indices.freq);

        if metadata.num_rows == 0 {
            return Err(UvfitsPipeError::Empty(input.to_path_buf()));
        }

        // The phase centre is described by RA and DEC if there is no SOURCE
        // table (as per the standard).
        let phase_centre = {
            let ra = fits_get_required_key(
                &mut uvfits_fptr,
                &primary_hdu,
                &format!("CRVAL{}", metadata.indices.ra),
            )?;
            let dec = fits_get_required_key(
                &mut uvfits_fptr,
                &primary_hdu,
                &format!("CRVAL{}", metadata.indices.dec),
            )?;
            RADec::from_degrees(ra, dec)
        };
        debug!("Phase centre: {phase_centre}");

        let pols = {
            let codes = read_axis(
                &mut uvfits_fptr,
                &primary_hdu,
                metadata.indices.stokes,
                metadata.num_pols,
            )?;
            let pols = codes
                .into_iter()
                .map(|code| {
                    let rounded = code.round();
                    if (code - rounded).abs() > 1e-3 || rounded.abs() > 127.0 {
                        return Err(UvfitsPipeError::UnsupportedPolCode(code));
                    }
                    Polarisation::from_code(rounded as i8)
                        .ok_or(UvfitsPipeError::UnsupportedPolCode(code))
                })
                .collect::<Result<Vec<_>, _>>()?;
            Vec1::try_from_vec(pols).map_err(|_| UvfitsPipeError::Empty(input.to_path_buf()))?
        };
        debug!(
            "Polarisations: [{}]",
            pols.iter().map(|p| p.to_string()).collect::<Vec<_>>().join(" ")
        );

        let freqs = {
            let freqs = read_axis(
                &mut uvfits_fptr,
                &primary_hdu,
                metadata.indices.freq,
                metadata.num_chans,
            )?;
            Vec1::try_from_vec(freqs).map_err(|_| UvfitsPipeError::Empty(input.to_path_buf()))?
        };
        match freqs.as_slice() {
            [f] => debug!("Only frequency: {:.3} MHz", f / 1e6),
            [f0, .., fn_] => debug!(
                "Frequencies: {:.3} MHz to {:.3} MHz",
                f0 / 1e6,
                fn_ / 1e6
            ),
            [] => unreachable!("Vec1 is never empty"),
        }

        let array_position = match array_position {
            Some(pos) => {
                debug!("Using the user-supplied array position");
                pos
            }
            None => {
                // ARRAY{X,Y,Z} describes the array position.
                let x: f64 =
                    fits_get_required_key(&mut uvfits_fptr, &antenna_table_hdu, "ARRAYX")?;
                let y: f64 =
                    fits_get_required_key(&mut uvfits_fptr, &antenna_table_hdu, "ARRAYY")?;
                let z: f64 =
                    fits_get_required_key(&mut uvfits_fptr, &antenna_table_hdu, "ARRAYZ")?;
                // casacore products set these to 0.
                if x.abs() < f64::EPSILON && y.abs() < f64::EPSILON && z.abs() < f64::EPSILON {
                    return Err(UvfitsPipeError::NoArrayPos(input.to_path_buf()));
                }
                XyzGeocentric { x, y, z }.to_earth_wgs84()
            }
        };
        debug!("Array position: {array_position}");

        let dut1 = {
            let uvfits_dut1: Option<f64> =
                fits_get_optional_key(&mut uvfits_fptr, &antenna_table_hdu, "UT1UTC")?;
            match uvfits_dut1 {
                Some(dut1) => {
                    debug!("uvfits DUT1: {dut1}");
                    Duration::from_seconds(dut1)
                }
                None => {
                    debug!("uvfits has no DUT1 (UT1UTC key); assuming 0");
                    Duration::from_seconds(0.0)
                }
            }
        };

        let _ = fits_open_hdu(&mut uvfits_fptr, 0)?;
        let (chunks, inttim) = metadata.scan_chunks(&mut uvfits_fptr)?;
        let chunks =
            Vec1::try_from_vec(chunks).map_err(|_| UvfitsPipeError::Empty(input.to_path_buf()))?;
        match chunks.as_slice() {
            [c] => debug!("Only timestep (GPS): {:.2}", c.timestamp.to_gpst_seconds()),
            [c0, .., cn] => {
                debug!(
                    "First timestep (GPS): {:.2}",
                    c0.timestamp.to_gpst_seconds()
                );
                debug!(
                    "Last timestep  (GPS): {:.2}",
                    cn.timestamp.to_gpst_seconds()
                );
            }
            [] => unreachable!("Vec1 is never empty"),
        }

        let int_time = match (inttim, chunks.as_slice()) {
            (Some(int_time), _) => {
                debug!("Integration time from INTTIM: {int_time}");
                Some(int_time)
            }
            (None, [c0, c1, ..]) => {
                let int_time = c1.timestamp - c0.timestamp;
                debug!("Integration time from the first two timesteps: {int_time}");
                Some(int_time)
            }
            (None, _) => {
                debug!("Couldn't determine the integration time");
                None
            }
        };

        Ok(UvfitsPipe {
            input: input.to_path_buf(),
            metadata,
            chunks,
            pols,
            freqs,
            phase_centre,
            array_position,
            dut1,
            int_time,
        })
    }

    /// The number of runs of rows with the same timestamp.
    pub(crate) fn num_timesteps(&self) -> usize {
        self.chunks.len()
    }

    #[cfg(test)]
    pub(crate) fn num_rows(&self) -> usize {
        self.metadata.num_rows
    }

    /// Copy the input file next to `output`, then pass every chunk of rows
    /// through `transform` and write its data back into the copy. Reading,
    /// transforming and writing each happen on their own thread. The copy only
    /// becomes `output` once every chunk has been written; if anything fails,
    /// it is removed.
    pub(crate) fn run<F>(&self, output: &Path, transform: F) -> Result<(), UvfitsPipeError>
    where
        F: FnMut(&mut UvfitsChunk) + Send,
    {
        let partial = partial_path(output);
        debug!(
            "Copying {} to {}",
            self.input.display(),
            partial.display()
        );
        std::fs::copy(&self.input, &partial).map_err(|err| UvfitsPipeError::Copy {
            from: self.input.clone(),
            to: partial.clone(),
            err,
        })?;

        let result = self.pipe(&partial, transform).and_then(|()| {
            std::fs::rename(&partial, output).map_err(|err| UvfitsPipeError::Rename {
                from: partial.clone(),
                to: output.to_path_buf(),
                err,
            })
        });
        match result {
            Ok(()) => {
                info!("Visibilities written to {}", output.display());
                Ok(())
            }
            Err(e) => {
                if let Err(rm_err) = std::fs::remove_file(&partial) {
                    warn!("Couldn't remove {}: {rm_err}", partial.display());
                }
                Err(e)
            }
        }
    }

    fn pipe<F>(&self, output: &Path, transform: F) -> Result<(), UvfitsPipeError>
    where
        F: FnMut(&mut UvfitsChunk) + Send,
    {
        // Channel for transforming.
        let (tx_transform, rx_transform) = bounded(5);
        // Channel for writing transformed visibilities.
        let (tx_write, rx_write) = bounded(5);

        // Progress bars.
        let multi_progress = MultiProgress::with_draw_target(if PROGRESS_BARS.load() {
            ProgressDrawTarget::stdout()
        } else {
            ProgressDrawTarget::hidden()
        });
        let new_bar = |message: &'static str| {
            let pb = ProgressBar::new(self.chunks.len() as _)
                .with_style(
                    ProgressStyle::default_bar()
                        .template("{msg:17}: [{wide_bar:.blue}] {pos:2}/{len:2} timesteps ({elapsed_precise}<{eta_precise})").unwrap()
                        .progress_chars("=> "),
                )
                .with_position(0)
                .with_message(message);
            multi_progress.add(pb)
        };
        let read_progress = new_bar("Reading data");
        let model_progress = new_bar("Sky modelling");
        let write_progress = new_bar("Writing data");

        // Use a variable to track whether any threads have an issue.
        let error = AtomicCell::new(false);

        info!("Reading input data, sky modelling, and writing");
        thread::scope(|scope| {
            // Input visibility-data reading thread.
            let read_handle: ScopedJoinHandle<Result<(), UvfitsPipeError>> =
                thread::Builder::new()
                    .name("read".to_string())
                    .spawn_scoped(scope, || {
                        // If a panic happens, update our atomic error.
                        defer_on_unwind! { error.store(true); }
                        read_progress.tick();

                        let result = self.read_thread(tx_transform, &error, read_progress);
                        // If the result of reading data was an error, allow the
                        // other threads to see this so they can abandon their
                        // work early.
                        if result.is_err() {
                            error.store(true);
                        }
                        result
                    })
                    .expect("OS can create threads");

            // Transforming thread.
            let model_handle: ScopedJoinHandle<()> = thread::Builder::new()
                .name("model".to_string())
                .spawn_scoped(scope, || {
                    defer_on_unwind! { error.store(true); }
                    model_progress.tick();

                    transform_thread(transform, rx_transform, tx_write, &error, model_progress);
                })
                .expect("OS can create threads");

            // Transformed vis writing thread.
            let write_handle: ScopedJoinHandle<Result<(), UvfitsPipeError>> =
                thread::Builder::new()
                    .name("write".to_string())
                    .spawn_scoped(scope, || {
                        defer_on_unwind! { error.store(true); }
                        write_progress.tick();

                        let result = write_thread(output, rx_write, &error, write_progress);
                        if result.is_err() {
                            error.store(true);
                        }
                        result
                    })
                    .expect("OS can create threads");

            // Join all thread handles. This propagates any errors and lets us
            // know if any threads panicked, if panics aren't aborting as per
            // the Cargo.toml.
            read_handle.join().unwrap()?;
            model_handle.join().unwrap();
            write_handle.join().unwrap()
        })
    }

    fn read_thread(
        &self,
        tx: Sender<UvfitsChunk>,
        error: &AtomicCell<bool>,
        progress_bar: ProgressBar,
    ) -> Result<(), UvfitsPipeError> {
        let UvfitsMetadata {
            pcount,
            num_floats_per_pol,
            num_pols,
            num_chans,
            ..
        } = self.metadata;

        let mut uvfits_fptr = fits_open(&self.input)?;
        let _ = fits_open_hdu(&mut uvfits_fptr, 0)?;

        let mut group_params = vec![0.0_f32; pcount];
        for chunk in &self.chunks {
            let mut antennas = Vec::with_capacity(chunk.num_rows);
            let mut uvws = Vec::with_capacity(chunk.num_rows);
            let mut data: Array4<f32> = Array4::zeros((
                chunk.num_rows,
                num_chans,
                num_pols,
                usize::from(num_floats_per_pol),
            ));

            // cfitsio treats each group separately; read one row at a time.
            for (i_row, mut data_row) in (chunk.first_row..).zip(data.outer_iter_mut()) {
                read_group_params(&mut uvfits_fptr, i_row, &mut group_params)?;
                antennas.push(self.metadata.antennas(&group_params));
                uvws.push(self.metadata.uvw(&group_params));

                read_data(
                    &mut uvfits_fptr,
                    i_row,
                    data_row.as_slice_mut().expect("is in standard layout"),
                )?;
            }

            // Should we continue?
            if error.load() {
                return Ok(());
            }

            match tx.send(UvfitsChunk {
                first_row: chunk.first_row,
                timestamp: chunk.timestamp,
                antennas,
                uvws,
                data,
            }) {
                Ok(()) => (),
                // If we can't send the message, it's because the channel
                // has been closed on the other side. That should only
                // happen because the writer has exited due to error; in
                // that case, just exit this thread.
                Err(_) => return Ok(()),
            }

            progress_bar.inc(1);
        }

        debug!("Finished reading");
        progress_bar.abandon_with_message("Finished reading visibilities");
        Ok(())
    }
}

fn transform_thread<F>(
    mut transform: F,
    rx: Receiver<UvfitsChunk>,
    tx: Sender<UvfitsChunk>,
    error: &AtomicCell<bool>,
    progress_bar: ProgressBar,
) where
    F: FnMut(&mut UvfitsChunk),
{
    for mut chunk in rx.iter() {
        trace!(
            "Transforming {} rows at GPS timestamp {}",
            chunk.uvws.len(),
            chunk.timestamp.to_gpst_seconds()
        );
        transform(&mut chunk);

        // Should we continue?
        if error.load() {
            return;
        }

        match tx.send(chunk) {
            Ok(()) => (),
            Err(_) => return,
        }
        progress_bar.inc(1);
    }

    debug!("Finished modelling");
    progress_bar.abandon_with_message("Finished generating sky model");
}

fn write_thread(
    output: &Path,
    rx: Receiver<UvfitsChunk>,
    error: &AtomicCell<bool>,
    progress_bar: ProgressBar,
) -> Result<(), UvfitsPipeError> {
    let mut uvfits_fptr = fits_edit(output)?;
    let _ = fits_open_hdu(&mut uvfits_fptr, 0)?;

    for mut chunk in rx.iter() {
        // A write spanning several groups would run over the group parameters
        // between them, so write one row at a time.
        for (i_row, mut data_row) in (chunk.first_row..).zip(chunk.data.outer_iter_mut()) {
            write_data(
                &mut uvfits_fptr,
                i_row,
                data_row.as_slice_mut().expect("is in standard layout"),
            )?;
        }

        // Should we continue?
        if error.load() {
            return Ok(());
        }
        progress_bar.inc(1);
    }

    debug!("Finished writing");
    progress_bar.abandon_with_message("Finished writing visibilities");
    Ok(())
}

/// Where a file is written before it becomes `output`.
fn partial_path(output: &Path) -> PathBuf {
    let mut name = output.file_name().unwrap_or_default().to_os_string();
    name.push(".partial");
    output.with_file_name(name)
}

/// Read group parameters starting at the zero-indexed `first_row`. The number
/// of rows read is determined by the length of `buffer`.
fn read_group_params(
    uvfits_fptr: &mut FitsFile,
    first_row: usize,
    buffer: &mut [f32],
) -> Result<(), UvfitsPipeError> {
    let mut status = 0;
    unsafe {
        // ffggpe = fits_read_grppar_flt
        fitsio_sys::ffggpe(
            uvfits_fptr.as_raw(), /* I - FITS file pointer                       */
            (first_row + 1).try_into().expect("not larger than i64::MAX"), /* I - group to read (1 = 1st group)           */
            1, /* I - first vector element to read (1 = 1st)  */
            buffer.len().try_into().expect("not larger than i64::MAX"), /* I - number of values to read                */
            buffer.as_mut_ptr(), /* O - array of values that are returned       */
            &mut status,         /* IO - error status                           */
        );
    }
    fits_check_status(status).map_err(|err| UvfitsPipeError::ReadVis {
        row_num: first_row + 1,
        err,
    })
}

/// Read the data part of the zero-indexed `row`. `buffer` must not be longer
/// than a row.
fn read_data(
    uvfits_fptr: &mut FitsFile,
    row: usize,
    buffer: &mut [f32],
) -> Result<(), UvfitsPipeError> {
    let mut status = 0;
    unsafe {
        // ffgpve = fits_read_img_flt
        fitsio_sys::ffgpve(
            uvfits_fptr.as_raw(), /* I - FITS file pointer                       */
            (row + 1).try_into().expect("not larger than i64::MAX"), /* I - group to read (1 = 1st group)           */
            1, /* I - first vector element to read (1 = 1st)  */
            buffer.len().try_into().expect("not larger than i64::MAX"), /* I - number of values to read                */
            0.0,                 /* I - value for undefined pixels              */
            buffer.as_mut_ptr(), /* O - array of values that are returned       */
            &mut 0,              /* O - set to 1 if any values are null; else 0 */
            &mut status,         /* IO - error status                           */
        );
    }
    fits_check_status(status).map_err(|err| UvfitsPipeError::ReadVis {
        row_num: row + 1,
        err,
    })
}

/// Write the data part of the zero-indexed `row`. `buffer` must not be longer
/// than a row.
fn write_data(
    uvfits_fptr: &mut FitsFile,
    row: usize,
    buffer: &mut [f32],
) -> Result<(), UvfitsPipeError> {
    let mut status = 0;
    unsafe {
        // ffppre = fits_write_img_flt
        fitsio_sys::ffppre(
            uvfits_fptr.as_raw(), /* I - FITS file pointer                       */
            (row + 1).try_into().expect("not larger than i64::MAX"), /* I - group to write (1 = 1st group)          */
            1, /* I - first vector element to write (1 = 1st) */
            buffer.len().try_into().expect("not larger than i64::MAX"), /* I - number of values to write               */
            buffer.as_mut_ptr(), /* I - array of values that are written        */
            &mut status,         /* IO - error status                           */
        );
    }
    fits_check_status(status).map_err(|err| UvfitsPipeError::WriteVis {
        row_num: row + 1,
        err,
    })
}

/// Read the values along a data axis (e.g. STOKES or FREQ) from its CRVAL,
/// CDELT and CRPIX keys.
fn read_axis(
    uvfits_fptr: &mut FitsFile,
    hdu: &FitsHdu,
    axis: u8,
    len: usize,
) -> Result<Vec<f64>, UvfitsPipeError> {
    let crval: f64 = fits_get_required_key(uvfits_fptr, hdu, &format!("CRVAL{axis}"))?;
    let cdelt: f64 =
        fits_get_optional_key(uvfits_fptr, hdu, &format!("CDELT{axis}"))?.unwrap_or(1.0);
    let crpix: f64 =
        fits_get_optional_key(uvfits_fptr, hdu, &format!("CRPIX{axis}"))?.unwrap_or(1.0);
    Ok((0..len)
        .map(|i| crval + (i as f64 + 1.0 - crpix) * cdelt)
        .collect())
}

struct UvfitsMetadata {
    /// The number of rows (groups) in the file (GCOUNT).
    num_rows: usize,

    /// The number of parameters in each group (PCOUNT).
    pcount: usize,

    /// The number of floats associated with a polarisation. If this value is 3,
    /// these are the real part of the pol, imag part of the pol, and the
    /// weight, respectively. If this value is 2, then it's the same as 3,
    /// except the weight is always 1.0.
    num_floats_per_pol: u8,

    num_pols: usize,

    num_chans: usize,

    /// The Julian date at midnight of the first day of the observation, as per
    /// the uvfits standard.
    jd_zero: Epoch,

    /// The indices of various parameters (e.g. BASELINE is PTYPE4, DATE is
    /// PTYPE5, etc.)
    indices: Indices,
}

impl UvfitsMetadata {
    /// Get metadata on the supplied uvfits file. `hdu` must be the primary
    /// HDU.
    fn new(
        uvfits: &mut FitsFile,
        hdu: &FitsHdu,
        antenna_table_hdu: &FitsHdu,
    ) -> Result<Self, UvfitsPipeError> {
        let indices = Indices::new(uvfits, hdu)?;

        // The file tells us what time standard is being used (probably UTC).
        // The primary header should have it, but it is often only in the
        // antenna table. If this is false, then we assume TAI.
        let uses_utc_time = {
            let mut timsys: Option<String> = fits_get_optional_key(uvfits, hdu, "TIMSYS")?;
            if timsys.is_none() {
                timsys = fits_get_optional_key(uvfits, antenna_table_hdu, "TIMSYS")?;
            }
            match timsys {
                None => {
                    debug!("No TIMSYS present; assuming UTC");
                    true
                }
                Some(timsys) => {
                    if timsys.starts_with("UTC") {
                        true
                    } else if timsys.starts_with("IAT") || timsys.starts_with("TAI") {
                        false
                    } else {
                        return Err(UvfitsPipeError::UnknownTimsys(timsys));
                    }
                }
            }
        };

        // GCOUNT tells us how many visibilities are in the file.
        let num_rows: usize = fits_get_required_key(uvfits, hdu, "GCOUNT")?;
        // PCOUNT tells us how many parameters are in each uvfits group.
        let pcount: usize = fits_get_required_key(uvfits, hdu, "PCOUNT")?;

        // We expect the COMPLEX index to be 2 (mandated by the standard), the
        // STOKES index to be 3, and the FREQ index to be 4. The order of these
        // indices determines the shape of the array of visibilities, and we
        // currently only support this one particular order.
        if indices.complex != 2 || indices.stokes != 3 || indices.freq != 4 {
            return Err(UvfitsPipeError::WrongDataOrder {
                complex: indices.complex,
                stokes: indices.stokes,
                freq: indices.freq,
            });
        }
        // Any axes after FREQ (e.g. RA, DEC, IF) must be degenerate.
        let naxis: usize = fits_get_required_key(uvfits, hdu, "NAXIS")?;
        for axis in 5..=naxis {
            let len: usize = fits_get_required_key(uvfits, hdu, &format!("NAXIS{axis}"))?;
            if len != 1 {
                return Err(UvfitsPipeError::ExtraAxis { axis, len });
            }
        }

        // NAXIS2 (COMPLEX) is how many floats are associated with a
        // polarisation. It must be either 2 or 3, as per the standard. The
        // first two floats represent the real and imag part of a complex
        // number, respectively, and the optional third is the weight. If there
        // are only 2 floats, the weight is set to 1.
        let num_floats_per_pol: u8 = fits_get_required_key(uvfits, hdu, "NAXIS2")?;
        match num_floats_per_pol {
            2 | 3 => (),
            _ => return Err(UvfitsPipeError::WrongFloatsPerPolCount(num_floats_per_pol)),
        }

        let num_pols: usize =
            fits_get_required_key(uvfits, hdu, &format!("NAXIS{}", indices.stokes))?;
        let num_chans: usize =
            fits_get_required_key(uvfits, hdu, &format!("NAXIS{}", indices.freq))?;

        // "JD zero" refers to the Julian date at midnight of the first day of
        // the observation, as per the uvfits standard.
        let jd_zero: f64 =
            fits_get_required_key(uvfits, hdu, &format!("PZERO{}", indices.date1))?;
        // We expect that the PZERO corresponding to the second date (if
        // available) is 0.
        if let Some(d2) = indices.date2 {
            let pzero = format!("PZERO{d2}");
            let value: Option<f64> = fits_get_optional_key(uvfits, hdu, &pzero)?;
            if value.map(|v| v.abs() > f64::EPSILON).unwrap_or(false) {
                format!("uvfits {pzero}, corresponding to the second DATE, was not 0; ignoring it anyway").warn()
            }
        }

        // Given what JD zero is supposed to represent, we can round to the
        // nearest hour; doing this helps ward off float precision issues.
        let jd_zero = {
            let e = if uses_utc_time {
                Epoch::from_jde_utc(jd_zero)
            } else {
                Epoch::from_jde_tai(jd_zero)
            };

            if jd_zero.abs() < f64::EPSILON {
                format!("uvfits PZERO{} is supposed to be non-zero!", indices.date1).warn();
                e
            } else {
                e.round(1.hours())
            }
        };

        Ok(UvfitsMetadata {
            num_rows,
            pcount,
            num_floats_per_pol,
            num_pols,
            num_chans,
            jd_zero,
            indices,
        })
    }

    fn timestamp(&self, params: &[f32]) -> Epoch {
        let mut jd_frac = Duration::from_days(f64::from(
            params[usize::from(self.indices.date1) - 1],
        ));
        // Use the second date, if it's there.
        if let Some(d2) = self.indices.date2 {
            jd_frac += Duration::from_days(f64::from(params[usize::from(d2) - 1]));
        }
        // uvfits timestamps are in the middle of their respective integration
        // periods (centroids). Round to the nearest 10 milliseconds to avoid
        // float precision issues.
        (self.jd_zero + jd_frac).round(10.milliseconds())
    }

    fn antennas(&self, params: &[f32]) -> (usize, usize) {
        match self.indices.baseline_or_antennas {
            BaselineOrAntennas::Baseline { index } => {
                decode_uvfits_baseline(params[usize::from(index) - 1] as usize)
            }
            BaselineOrAntennas::Antennas { index1, index2 } => (
                params[usize::from(index1) - 1] as usize,
                params[usize::from(index2) - 1] as usize,
            ),
        }
    }

    /// uvfits UVWs are in seconds; these are converted to metres.
    fn uvw(&self, params: &[f32]) -> UVW {
        UVW {
            u: f64::from(params[usize::from(self.indices.u) - 1]) * VEL_C,
            v: f64::from(params[usize::from(self.indices.v) - 1]) * VEL_C,
            w: f64::from(params[usize::from(self.indices.w) - 1]) * VEL_C,
        }
    }

    /// The INTTIM of a row, if there is one and it's positive.
    fn int_time(&self, params: &[f32]) -> Option<Duration> {
        let inttim = params[usize::from(self.indices.inttim?) - 1];
        (inttim > 0.0).then(|| Duration::from_seconds(f64::from(inttim)))
    }

    /// Find every run of consecutive rows with the same timestamp, and the
    /// INTTIM of the first row. The primary HDU must be open.
    fn scan_chunks(
        &self,
        uvfits: &mut FitsFile,
    ) -> Result<(Vec<ChunkInfo>, Option<Duration>), UvfitsPipeError> {
        let mut chunks: Vec<ChunkInfo> = vec![];
        let mut int_time = None;
        let buffer_rows = self.num_rows.min(SCAN_BUFFER_ROWS);
        let mut group_params = vec![0.0_f32; buffer_rows * self.pcount];

        let mut i_row = 0;
        while i_row < self.num_rows {
            let num_rows_to_iterate = buffer_rows.min(self.num_rows - i_row);
            let buffer = &mut group_params[..num_rows_to_iterate * self.pcount];
            read_group_params(uvfits, i_row, buffer)?;

            if i_row == 0 {
                int_time = buffer
                    .chunks_exact(self.pcount)
                    .next()
                    .and_then(|params| self.int_time(params));
            }

            for (i, params) in buffer.chunks_exact(self.pcount).enumerate() {
                let timestamp = self.timestamp(params);
                if let Some(chunk) = chunks.last_mut().filter(|c| c.timestamp == timestamp) {
                    chunk.num_rows += 1;
                    continue;
                }
                if chunks.last().is_some_and(|c| timestamp < c.timestamp) {
                    warn!(
                        "uvfits row {} goes back in time; it starts a new timestep",
                        i_row + i + 1
                    );
                }
                chunks.push(ChunkInfo {
                    first_row: i_row + i,
                    num_rows: 1,
                    timestamp,
                });
            }

            i_row += num_rows_to_iterate;
        }

        Ok((chunks, int_time))
    }
}

#[derive(Debug)]
enum BaselineOrAntennas {
    Baseline { index: u8 },

    Antennas { index1: u8, index2: u8 },
}

#[derive(Debug)]
struct Indices {
    /// PTYPE
    u: u8,
    /// PTYPE
    v: u8,
    /// PTYPE
    w: u8,
    /// PTYPE
    baseline_or_antennas: BaselineOrAntennas,
    /// PTYPE
    date1: u8,
    /// PTYPE
    date2: Option<u8>,
    /// PTYPE
    inttim: Option<u8>,
    /// CTYPE
    complex: u8,
    /// CTYPE
    stokes: u8,
    /// CTYPE
    freq: u8,
    /// CTYPE
    ra: u8,
    /// CTYPE
    dec: u8,
}

impl Indices {
    /// Find the 1-indexed indices of "PTYPE" and "CTYPE" keys we require (e.g.
    /// "UU", "VV", "WW", "RA", "DEC"). "BASELINE" will be in most uvfits files,
    /// but "ANTENNA1" and "ANTENNA2" may be used instead. A second
    /// "DATE"/"_DATE" key may also be present but does not have to be.
    fn new(uvfits: &mut FitsFile, hdu: &FitsHdu) -> Result<Self, UvfitsPipeError> {
        let missing = |key: &'static str| UvfitsPipeError::MissingKey {
            key,
            hdu: hdu.number + 1,
        };

        let mut u = None;
        let mut v = None;
        let mut w = None;
        let mut baseline = None;
        let mut antenna1 = None;
        let mut antenna2 = None;
        let mut date1 = None;
        let mut date2 = None;
        let mut inttim = None;

        // Only the first of each key is used.
        let set_once = |slot: &mut Option<u8>, index: u8, key: &str| {
            if slot.is_none() {
                *slot = Some(index);
            } else {
                format!("Found another uvfits {key} key -- only using the first").warn();
            }
        };

        for i in 1_u8.. {
            let ptype: Option<String> = fits_get_optional_key(uvfits, hdu, &format!("PTYPE{i}"))?;
            // A missing key is the end of the PTYPEs.
            let Some(ptype) = ptype else { break };
            match ptype.as_str() {
                "UU" => set_once(&mut u, i, "UU"),
                "VV" => set_once(&mut v, i, "VV"),
                "WW" => set_once(&mut w, i, "WW"),
                "BASELINE" => set_once(&mut baseline, i, "BASELINE"),
                "ANTENNA1" => set_once(&mut antenna1, i, "ANTENNA1"),
                "ANTENNA2" => set_once(&mut antenna2, i, "ANTENNA2"),
                "INTTIM" => set_once(&mut inttim, i, "INTTIM"),
                "DATE" | "_DATE" => match (date1, date2) {
                    (None, _) => date1 = Some(i),
                    (Some(_), None) => date2 = Some(i),
                    (Some(_), Some(_)) => {
                        "Found more than 2 uvfits DATE/_DATE keys -- only using the first two"
                            .warn()
                    }
                },
                _ => (),
            }
        }

        // Handle problems surrounding some combination of BASELINE and
        // ANTENNA1/ANTENNA2.
        let baseline_or_antennas = match (baseline, antenna1, antenna2) {
            // These are OK.
            (Some(index), None, None) => BaselineOrAntennas::Baseline { index },
            (None, Some(index1), Some(index2)) => BaselineOrAntennas::Antennas { index1, index2 },
            (Some(index), _, _) => {
                "Found both uvfits BASELINE and ANTENNA keys; only using BASELINE".warn();
                BaselineOrAntennas::Baseline { index }
            }
            // These are not.
            (None, Some(_), None) => return Err(UvfitsPipeError::Antenna1ButNotAntenna2),
            (None, None, Some(_)) => return Err(UvfitsPipeError::Antenna2ButNotAntenna1),
            (None, None, None) => return Err(UvfitsPipeError::NoBaselineInfo),
        };

        // Now find CTYPEs.
        let mut complex = None;
        let mut stokes = None;
        let mut freq = None;
        let mut ra = None;
        let mut dec = None;
        for i in 2_u8.. {
            let ctype: Option<String> = fits_get_optional_key(uvfits, hdu, &format!("CTYPE{i}"))?;
            let Some(ctype) = ctype else { break };
            match ctype.as_str() {
                "COMPLEX" => complex = Some(i),
                "STOKES" => stokes = Some(i),
                "FREQ" => freq = Some(i),
                "RA" => ra = Some(i),
                "DEC" => dec = Some(i),
                _ => (),
            }
        }

        Ok(Indices {
            u: u.ok_or_else(|| missing("UU"))?,
            v: v.ok_or_else(|| missing("VV"))?,
            w: w.ok_or_else(|| missing("WW"))?,
            baseline_or_antennas,
            date1: date1.ok_or_else(|| missing("DATE"))?,
            date2,
            inttim,
            complex: complex.ok_or_else(|| missing("COMPLEX"))?,
            stokes: stokes.ok_or_else(|| missing("STOKES"))?,
            freq: freq.ok_or_else(|| missing("FREQ"))?,
            ra: ra.ok_or_else(|| missing("RA"))?,
            dec: dec.ok_or_else(|| missing("DEC"))?,
        })
    }
}
