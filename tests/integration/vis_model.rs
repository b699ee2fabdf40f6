// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Tests against vis-subtract and vis-simulate.

use approx::assert_abs_diff_eq;
use tempfile::TempDir;

use crate::{
    get_cmd_output, read_uvfits_rows, skysub, write_helmboldt_files, write_uvfits,
    HelmboldtFiles,
};

#[test]
fn test_simulate_then_subtract() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let HelmboldtFiles { pos, fit } = write_helmboldt_files(tmp_dir.path());
    let input = write_uvfits(&tmp_dir.path().join("obs.uvfits"));

    #[rustfmt::skip]
    let cmd = skysub()
        .args([
            "vis-simulate",
            &input.display().to_string(),
            "--helmboldt-pos", &pos,
            "--helmboldt-fit", &fit,
            "--suffix", "_sim",
            "--no-progress-bars",
        ])
        .ok();
    assert!(cmd.is_ok(), "vis-simulate failed: {:?}", get_cmd_output(cmd));
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.is_empty(), "stderr wasn't empty: {stderr}");
    let simulated = tmp_dir.path().join("obs_sim.uvfits");
    assert!(simulated.exists());
    // The input isn't touched.
    assert_eq!(
        std::fs::metadata(&input).unwrap().len(),
        std::fs::metadata(&simulated).unwrap().len()
    );

    #[rustfmt::skip]
    let cmd = skysub()
        .args([
            "vis-subtract",
            &simulated.display().to_string(),
            "--helmboldt-pos", &pos,
            "--helmboldt-fit", &fit,
            "-c", "J0025-260,J2214-170",
            "--no-progress-bars",
        ])
        .ok();
    assert!(cmd.is_ok(), "vis-subtract failed: {:?}", get_cmd_output(cmd));
    let subtracted = tmp_dir.path().join("obs_sims.uvfits");
    assert!(subtracted.exists());

    let input_rows = read_uvfits_rows(&input);
    let simulated_rows = read_uvfits_rows(&simulated);
    let subtracted_rows = read_uvfits_rows(&subtracted);
    // 3 baselines over 2 timesteps.
    assert_eq!(input_rows.len(), 6);
    assert_eq!(simulated_rows.len(), 6);
    assert_eq!(subtracted_rows.len(), 6);

    let mut changed = false;
    for ((input, simulated), subtracted) in input_rows
        .iter()
        .zip(simulated_rows.iter())
        .zip(subtracted_rows.iter())
    {
        // Times, baselines and UVWs are never touched.
        assert_eq!(input.params, simulated.params);
        assert_eq!(input.params, subtracted.params);

        for ((vis_in, vis_sim), vis_sub) in input
            .data
            .chunks_exact(3)
            .zip(simulated.data.chunks_exact(3))
            .zip(subtracted.data.chunks_exact(3))
        {
            if (vis_sim[0] - vis_in[0]).abs() > 1e-3 || (vis_sim[1] - vis_in[1]).abs() > 1e-3 {
                changed = true;
            }
            // Subtracting the simulated sources leaves nothing.
            assert_abs_diff_eq!(vis_sub[0], 0.0, epsilon = 1e-3);
            assert_abs_diff_eq!(vis_sub[1], 0.0, epsilon = 1e-3);
            // Weights are kept.
            assert_abs_diff_eq!(vis_sim[2], vis_in[2]);
            assert_abs_diff_eq!(vis_sub[2], vis_in[2]);
        }
    }
    assert!(changed, "vis-simulate didn't change any visibilities");
}

#[test]
fn test_existing_outputs_are_skipped() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let HelmboldtFiles { pos, fit } = write_helmboldt_files(tmp_dir.path());
    let input = write_uvfits(&tmp_dir.path().join("obs.uvfits"));
    let output = tmp_dir.path().join("obss.uvfits");
    std::fs::write(&output, "not a uvfits file").unwrap();

    #[rustfmt::skip]
    let cmd = skysub()
        .args([
            "vis-subtract",
            &input.display().to_string(),
            "--helmboldt-pos", &pos,
            "--helmboldt-fit", &fit,
        ])
        .ok();
    assert!(cmd.is_ok(), "vis-subtract failed: {:?}", get_cmd_output(cmd));
    let (stdout, _) = get_cmd_output(cmd);
    assert!(stdout.contains("File exists: skipping"), "{stdout}");
    assert_eq!(
        std::fs::read_to_string(&output).unwrap(),
        "not a uvfits file"
    );
}

#[test]
fn test_dry_run() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let HelmboldtFiles { pos, fit } = write_helmboldt_files(tmp_dir.path());
    let input = write_uvfits(&tmp_dir.path().join("obs.uvfits"));
    let toml = tmp_dir.path().join("args.toml");

    #[rustfmt::skip]
    let cmd = skysub()
        .args([
            "vis-subtract",
            &input.display().to_string(),
            "--helmboldt-pos", &pos,
            "--helmboldt-fit", &fit,
            "--dry-run",
            "--save-toml", &toml.display().to_string(),
        ])
        .ok();
    assert!(cmd.is_ok(), "vis-subtract failed: {:?}", get_cmd_output(cmd));
    assert!(!tmp_dir.path().join("obss.uvfits").exists());

    // The saved arguments reproduce the run.
    let cmd = skysub()
        .args([
            "vis-subtract",
            "--args-file",
            &toml.display().to_string(),
            "--dry-run",
        ])
        .ok();
    assert!(cmd.is_ok(), "vis-subtract failed: {:?}", get_cmd_output(cmd));
    let (stdout, _) = get_cmd_output(cmd);
    assert!(stdout.contains("obss.uvfits"), "{stdout}");
}

#[test]
fn test_missing_input() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let HelmboldtFiles { pos, fit } = write_helmboldt_files(tmp_dir.path());

    #[rustfmt::skip]
    let cmd = skysub()
        .args([
            "vis-subtract",
            &tmp_dir.path().join("nothing.uvfits").display().to_string(),
            "--helmboldt-pos", &pos,
            "--helmboldt-fit", &fit,
        ])
        .ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.contains("nothing.uvfits"), "{stderr}");
    assert!(stderr.contains("does not exist"), "{stderr}");
}

#[test]
fn test_not_a_uvfits_file() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let HelmboldtFiles { pos, fit } = write_helmboldt_files(tmp_dir.path());
    let input = tmp_dir.path().join("obs.uvfits");
    std::fs::write(&input, "definitely not fits").unwrap();

    #[rustfmt::skip]
    let cmd = skysub()
        .args([
            "vis-subtract",
            &input.display().to_string(),
            "--helmboldt-pos", &pos,
            "--helmboldt-fit", &fit,
        ])
        .ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.contains("Error:"), "{stderr}");
}
