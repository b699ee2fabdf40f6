// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use clap::Parser;
use marlu::RADec;
use tempfile::tempdir;

use super::*;
use crate::{
    cli::common::tests::write_helmboldt_files,
    srclist::{read_source_list_file, FluxDensity, FluxDensityType, Source},
};

#[test]
fn table_has_a_line_per_source() {
    let dir = tempdir().unwrap();
    let (pos, fit) = write_helmboldt_files(dir.path());
    let sl = crate::HelmboldtCatalog::from_files(pos, fit)
        .unwrap()
        .sources()
        .clone();

    let lines = source_table(&sl, 74e6);
    assert_eq!(lines.len(), 4);
    assert!(lines[0].starts_with("Name"));
    assert!(lines[0].contains("S(74MHz)"));
    assert!(lines[1].starts_with("J0000+123"));
    assert!(lines[1].contains("10.0000"));
    assert!(lines[1].contains("power law"));
    assert!(lines[2].starts_with("J1200-005"));
    assert!(lines[2].contains("log polynomial"));
    assert!(lines[3].starts_with("J2359-270"));
    assert!(lines[3].contains("5.0000"));
}

#[test]
fn table_positions_never_show_sixty_seconds() {
    let sl = SourceList::from([(
        "J0159-1059".to_string(),
        Source {
            radec: RADec::from_degrees(
                15.0 * (1.0 + 59.0 / 60.0 + 59.999 / 3600.0),
                -(10.0 + 59.0 / 60.0 + 59.999 / 3600.0),
            ),
            flux_type: FluxDensityType::PowerLaw {
                si: -0.8,
                fd: FluxDensity::stokes_i(74e6, 1.0),
            },
        },
    )]);

    let lines = source_table(&sl, 74e6);
    assert!(lines[1].contains("1h59m59.99"), "{}", lines[1]);
    assert!(lines[1].contains("-10d59m59.99"), "{}", lines[1]);
    assert!(!lines[1].contains("m60."), "{}", lines[1]);
}

#[test]
fn convert_uses_the_output_extension() {
    let dir = tempdir().unwrap();
    let (pos, fit) = write_helmboldt_files(dir.path());
    let output = dir.path().join("bright.json");

    let args = HelmConvertArgs::parse_from([
        "helm-convert",
        output.to_str().unwrap(),
        "--helmboldt-pos",
        pos.to_str().unwrap(),
        "--helmboldt-fit",
        fit.to_str().unwrap(),
        "--flux-cutoff",
        "8",
    ]);
    args.run().unwrap();

    let sl = read_source_list_file(&output).unwrap();
    assert_eq!(sl.keys().collect::<Vec<_>>(), vec!["J0000+123", "J1200-005"]);
}

#[test]
fn convert_with_explicit_type() {
    let dir = tempdir().unwrap();
    let (pos, fit) = write_helmboldt_files(dir.path());
    let output = dir.path().join("srclist.txt");

    let args = HelmConvertArgs::parse_from([
        "helm-convert",
        output.to_str().unwrap(),
        "--output-type",
        "YAML",
        "--helmboldt-pos",
        pos.to_str().unwrap(),
        "--helmboldt-fit",
        fit.to_str().unwrap(),
        "-c",
        "J2359-270",
    ]);
    args.run().unwrap();
    let contents = std::fs::read_to_string(&output).unwrap();
    assert!(contents.contains("J2359-270"));
    assert!(!contents.contains("J0000+123"));

    // Without a type, a .txt output can't be written.
    let args = HelmConvertArgs::parse_from([
        "helm-convert",
        dir.path().join("other.txt").to_str().unwrap(),
        "--helmboldt-pos",
        pos.to_str().unwrap(),
        "--helmboldt-fit",
        fit.to_str().unwrap(),
    ]);
    assert!(matches!(args.run(), Err(SkysubError::Srclist(_))));

    let args = HelmConvertArgs::parse_from([
        "helm-convert",
        output.to_str().unwrap(),
        "--output-type",
        "fits",
    ]);
    assert!(matches!(args.run(), Err(SkysubError::Srclist(_))));
}
