// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Integration tests.
//!
//! Some help for laying out these tests was taken from:
//! https://matklad.github.io/2021/02/27/delete-cargo-integration-tests.html

mod helm;
mod vis_model;

use std::{
    path::{Path, PathBuf},
    process::Output,
    str::from_utf8,
};

use assert_cmd::{output::OutputError, Command};
use fitsio::{errors::check_status, FitsFile};
use hifitime::{Duration, Epoch};
use indoc::indoc;
use marlu::{
    Jones, LatLngHeight, RADec, UvfitsWriter, VisContext, VisWrite, XyzGeodetic,
};
use ndarray::prelude::*;

fn skysub() -> Command {
    Command::cargo_bin("skysub").unwrap()
}

fn get_cmd_output(result: Result<Output, OutputError>) -> (String, String) {
    let output = match result {
        Ok(o) => o,
        Err(o) => o.as_output().unwrap().clone(),
    };
    (
        from_utf8(&output.stdout).unwrap().to_string(),
        from_utf8(&output.stderr).unwrap().to_string(),
    )
}

struct HelmboldtFiles {
    pos: String,
    fit: String,
}

/// Write a two-source Helmboldt catalog. 3C444 is curved; the other source is
/// a power law of 25 Jy at 74 MHz.
fn write_helmboldt_files(dir: &Path) -> HelmboldtFiles {
    let pos = dir.join("helm_pos.txt");
    let fit = dir.join("helm_fit.txt");
    std::fs::write(
        &pos,
        indoc! {"
            # Name                             RA (J2000)  Dec (J2000)
            J2214-170                          22 14 25.8 -17 01 36.0   15.2  0.3
            J0025-260                          00 25 49.2 -26 02 13.0   8.1  0.2
        "},
    )
    .unwrap();
    std::fs::write(
        &fit,
        indoc! {"
            # Name       Spectrum
            J2214-170    60.0 -0.9 0.0 1.75 -0.85 -0.05 0.01
            J0025-260    25.0 -0.75
        "},
    )
    .unwrap();
    HelmboldtFiles {
        pos: pos.display().to_string(),
        fit: fit.display().to_string(),
    }
}

/// Write a small uvfits file of 3 tiles, 2 timesteps and 4 channels, phased
/// towards J0025-260.
fn write_uvfits(path: &Path) -> PathBuf {
    let num_tiles = 3;
    let (tile_names, xyzs): (Vec<String>, Vec<XyzGeodetic>) = (0..num_tiles)
        .map(|i| {
            (
                format!("Tile{i}"),
                XyzGeodetic {
                    x: 20.0 * i as f64,
                    y: -15.0 * i as f64,
                    z: 2.0 * i as f64,
                },
            )
        })
        .unzip();
    let vis_ctx = VisContext {
        num_sel_timesteps: 2,
        // 2014-07-21 20:10:40 UTC, when J0025-260 is up at the MWA.
        start_timestamp: Epoch::from_gpst_seconds(1090008640.0),
        int_time: Duration::from_seconds(8.0),
        num_sel_chans: 4,
        start_freq_hz: 180e6,
        freq_resolution_hz: 80e3,
        sel_baselines: vec![(0, 1), (0, 2), (1, 2)],
        avg_time: 1,
        avg_freq: 1,
        num_vis_pols: 4,
    };
    let vis = Array3::from_elem(vis_ctx.sel_dims(), Jones::identity());
    let weights = Array3::from_elem(vis_ctx.sel_dims(), 1.0);

    let mut writer = UvfitsWriter::from_marlu(
        path,
        &vis_ctx,
        LatLngHeight::mwa(),
        RADec::from_degrees(6.455, -26.037),
        Duration::from_seconds(0.0),
        Some("integration"),
        tile_names,
        xyzs,
        false,
        None,
    )
    .unwrap();
    writer
        .write_vis(vis.view(), weights.view(), &vis_ctx)
        .unwrap();
    writer.finalise().unwrap();
    path.to_path_buf()
}

/// The group parameters and the data part of a uvfits row.
struct Row {
    params: Vec<f32>,
    data: Vec<f32>,
}

/// Read every row of a uvfits file, one row at a time.
fn read_uvfits_rows(path: &Path) -> Vec<Row> {
    let mut fptr = FitsFile::open(path).unwrap();
    let hdu = fptr.hdu(0).unwrap();
    let num_rows: i64 = hdu.read_key(&mut fptr, "GCOUNT").unwrap();
    let pcount: i64 = hdu.read_key(&mut fptr, "PCOUNT").unwrap();
    let naxis: i64 = hdu.read_key(&mut fptr, "NAXIS").unwrap();
    let row_len: i64 = (2..=naxis)
        .map(|i| hdu.read_key::<i64>(&mut fptr, &format!("NAXIS{i}")).unwrap())
        .product();

    (1..=num_rows)
        .map(|group| {
            let mut params = vec![0.0; pcount as usize];
            let mut data = vec![0.0; row_len as usize];
            let mut status = 0;
            unsafe {
                fitsio_sys::ffggpe(
                    fptr.as_raw(),
                    group,
                    1,
                    pcount,
                    params.as_mut_ptr(),
                    &mut status,
                );
                fitsio_sys::ffgpve(
                    fptr.as_raw(),
                    group,
                    1,
                    row_len,
                    0.0,
                    data.as_mut_ptr(),
                    &mut 0,
                    &mut status,
                );
            }
            check_status(status).unwrap();
            Row { params, data }
        })
        .collect()
}

#[test]
fn test_help() {
    let cmd = skysub().arg("--help").ok();
    assert!(cmd.is_ok(), "{:?}", get_cmd_output(cmd));
    let (stdout, _) = get_cmd_output(cmd);
    for sub in ["vis-subtract", "vis-simulate", "helm-query", "helm-convert"] {
        assert!(stdout.contains(sub), "{sub} is missing from --help");
    }
}

#[test]
fn test_no_subcommand_is_an_error() {
    let cmd = skysub().ok();
    assert!(cmd.is_err());
}
