//! Smoke tests for the pagelift binary.

use assert_cmd::Command;
use lopdf::{dictionary, Document, Object, Stream};
use predicates::prelude::*;

/// Minimal one-page PDF with a line of text.
fn sample_pdf() -> Vec<u8> {
    let mut doc = Document::with_version("1.4");

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });
    let content_id = doc.add_object(Stream::new(
        dictionary! {},
        b"BT /F1 12 Tf 72 700 Td (Smoke test) Tj ET".to_vec(),
    ));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        "Resources" => resources_id,
        "Contents" => content_id,
    });
    let pages_id = doc.add_object(dictionary! {
        "Type" => "Pages",
        "Kids" => vec![page_id.into()],
        "Count" => 1,
    });
    if let Ok(Object::Dictionary(dict)) = doc.get_object_mut(page_id) {
        dict.set("Parent", pages_id);
    }
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).unwrap();
    buffer
}

#[test]
fn help_lists_subcommands() {
    Command::cargo_bin("pagelift")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("convert"))
        .stdout(predicate::str::contains("batch"))
        .stdout(predicate::str::contains("info"));
}

#[test]
fn convert_rejects_missing_input() {
    Command::cargo_bin("pagelift")
        .unwrap()
        .args(["convert", "/nonexistent/input.pdf"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file not found"));
}

#[test]
fn convert_writes_single_file_html() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("sample.pdf");
    let output = dir.path().join("sample.html");
    std::fs::write(&input, sample_pdf()).unwrap();

    Command::cargo_bin("pagelift")
        .unwrap()
        .args(["convert"])
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .assert()
        .success();

    let html = std::fs::read_to_string(&output).unwrap();
    assert!(html.contains("<!DOCTYPE html>"));
    assert!(html.contains("Smoke test"));
}

#[test]
fn convert_writes_package_archive() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("sample.pdf");
    let output = dir.path().join("sample.zip");
    std::fs::write(&input, sample_pdf()).unwrap();

    Command::cargo_bin("pagelift")
        .unwrap()
        .args(["convert"])
        .arg(&input)
        .args(["-o"])
        .arg(&output)
        .args(["--mode", "package"])
        .assert()
        .success();

    let bytes = std::fs::read(&output).unwrap();
    // ZIP magic
    assert_eq!(&bytes[..2], b"PK");
}

#[test]
fn info_reports_page_count() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("sample.pdf");
    std::fs::write(&input, sample_pdf()).unwrap();

    Command::cargo_bin("pagelift")
        .unwrap()
        .args(["info"])
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("Pages: 1"));
}
