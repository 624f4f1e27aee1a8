//! Integration tests for unpacking bundled data archives.

use mofa_pipeline::prelude::*;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use zip::write::SimpleFileOptions;

fn bundled_data_zip(path: &Path) {
    let mut writer = zip::ZipWriter::new(File::create(path).unwrap());
    let options = SimpleFileOptions::default();
    writer.add_directory("data/", options).unwrap();
    for (name, body) in [
        ("data/mRNA.csv", ",H045\nENSG1,0.5\n"),
        ("data/drugs.csv", ",H045\nD_001,1\n"),
        ("data/sample_metadata.txt", "sample\tGender\nH045\tm\n"),
        ("data/evodevo.csv", "sample,feature,view,value,time,group\n"),
    ] {
        writer.start_file(name, options).unwrap();
        writer.write_all(body.as_bytes()).unwrap();
    }
    writer.finish().unwrap();
}

#[test]
fn test_manifest_matches_archive() {
    let src = TempDir::new().unwrap();
    let dest = TempDir::new().unwrap();
    let zip_path = src.path().join("data.zip");
    bundled_data_zip(&zip_path);

    let manifest = extract_archive(&zip_path, dest.path()).unwrap();

    assert_eq!(
        manifest,
        vec![
            PathBuf::from("data/mRNA.csv"),
            PathBuf::from("data/drugs.csv"),
            PathBuf::from("data/sample_metadata.txt"),
            PathBuf::from("data/evodevo.csv"),
        ]
    );
    for file in &manifest {
        assert!(dest.path().join(file).is_file());
    }
    assert_eq!(
        fs::read_to_string(dest.path().join("data/drugs.csv")).unwrap(),
        ",H045\nD_001,1\n"
    );
}

#[test]
fn test_extracted_data_feeds_loader() {
    let src = TempDir::new().unwrap();
    let dest = TempDir::new().unwrap();
    let zip_path = src.path().join("data.zip");
    bundled_data_zip(&zip_path);
    extract_archive(&zip_path, dest.path()).unwrap();

    let views = load_modalities(dest.path().join("data"), &["mRNA", "drugs"]).unwrap();
    assert_eq!(views.len(), 2);
    assert_eq!(views[1].get("H045", "D_001"), Some(1.0));
}

#[test]
fn test_extract_twice_is_stable() {
    let src = TempDir::new().unwrap();
    let dest = TempDir::new().unwrap();
    let zip_path = src.path().join("data.zip");
    bundled_data_zip(&zip_path);

    let first = extract_archive(&zip_path, dest.path()).unwrap();
    let second = extract_archive(&zip_path, dest.path()).unwrap();
    assert_eq!(first, second);
}
