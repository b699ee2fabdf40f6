// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Tests against the Helmboldt catalog subcommands.

use tempfile::TempDir;

use crate::{get_cmd_output, skysub, write_helmboldt_files, HelmboldtFiles};

#[test]
fn test_helm_query() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let HelmboldtFiles { pos, fit } = write_helmboldt_files(tmp_dir.path());

    #[rustfmt::skip]
    let cmd = skysub()
        .args([
            "helm-query",
            "--helmboldt-pos", &pos,
            "--helmboldt-fit", &fit,
            "--flux-cutoff", "30",
        ])
        .ok();
    assert!(cmd.is_ok(), "helm-query failed: {:?}", get_cmd_output(cmd));
    let (stdout, stderr) = get_cmd_output(cmd);
    assert!(stderr.is_empty(), "stderr wasn't empty: {stderr}");
    assert!(stdout.contains("J2214-170"), "{stdout}");
    assert!(!stdout.contains("J0025-260 "), "{stdout}");
    assert!(stdout.contains("S(74MHz)"), "{stdout}");
}

#[test]
fn test_helm_query_from_env() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let HelmboldtFiles { pos, fit } = write_helmboldt_files(tmp_dir.path());

    let cmd = skysub()
        .env("HELMBOLDT_POS", &pos)
        .env("HELMBOLDT_FIT", &fit)
        .args(["helm-query", "-c", "J0025-260", "--freq", "150MHz"])
        .ok();
    assert!(cmd.is_ok(), "helm-query failed: {:?}", get_cmd_output(cmd));
    let (stdout, _) = get_cmd_output(cmd);
    assert!(stdout.contains("J0025-260"), "{stdout}");
    assert!(stdout.contains("S(150MHz)"), "{stdout}");
}

#[test]
fn test_helm_query_without_catalog() {
    let cmd = skysub()
        .env_remove("HELMBOLDT_POS")
        .env_remove("HELMBOLDT_FIT")
        .args(["helm-query", "-c", "J0025-260"])
        .ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.contains("HELMBOLDT_POS"), "{stderr}");
}

#[test]
fn test_helm_convert() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let HelmboldtFiles { pos, fit } = write_helmboldt_files(tmp_dir.path());
    let output = tmp_dir.path().join("srclist.yaml");

    #[rustfmt::skip]
    let cmd = skysub()
        .args([
            "helm-convert",
            &output.display().to_string(),
            "--helmboldt-pos", &pos,
            "--helmboldt-fit", &fit,
        ])
        .ok();
    assert!(cmd.is_ok(), "helm-convert failed: {:?}", get_cmd_output(cmd));
    let contents = std::fs::read_to_string(&output).unwrap();
    assert!(contents.contains("J2214-170"));
    assert!(contents.contains("J0025-260"));

    // The written source list can be used as a sky model.
    let cmd = skysub()
        .args([
            "helm-query",
            "--source-list",
            &output.display().to_string(),
            "-c",
            "J2214-170",
        ])
        .ok();
    assert!(cmd.is_ok(), "helm-query failed: {:?}", get_cmd_output(cmd));
    let (stdout, _) = get_cmd_output(cmd);
    assert!(stdout.contains("J2214-170"), "{stdout}");
}
