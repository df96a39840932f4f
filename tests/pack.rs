use std::fs;
use std::io::Read;

use assert_matches::assert_matches;
use zip::ZipArchive;

use things_datasets::error::ThingsError;
use things_datasets::pack;

#[test]
fn archive_preserves_relative_paths_and_content() {
    let temp = tempfile::tempdir().unwrap();
    let source = temp.path().join("extracted");
    fs::create_dir_all(source.join("a")).unwrap();
    fs::create_dir_all(source.join("b")).unwrap();
    fs::write(source.join("a/x.txt"), b"first").unwrap();
    fs::write(source.join("b/y.txt"), b"second").unwrap();
    let output = temp.path().join("out.zip");

    pack::pack(&source, &output).unwrap();

    let mut archive = ZipArchive::new(fs::File::open(&output).unwrap()).unwrap();
    let mut names: Vec<String> = (0..archive.len())
        .map(|i| archive.by_index(i).unwrap().name().to_string())
        .collect();
    names.sort();
    assert_eq!(names, vec!["a/x.txt", "b/y.txt"]);

    let mut content = String::new();
    archive
        .by_name("a/x.txt")
        .unwrap()
        .read_to_string(&mut content)
        .unwrap();
    assert_eq!(content, "first");

    content.clear();
    archive
        .by_name("b/y.txt")
        .unwrap()
        .read_to_string(&mut content)
        .unwrap();
    assert_eq!(content, "second");
}

#[test]
fn missing_source_fails_without_creating_output() {
    let temp = tempfile::tempdir().unwrap();
    let output = temp.path().join("out.zip");

    let err = pack::pack(&temp.path().join("absent"), &output).unwrap_err();
    assert_matches!(err, ThingsError::Packaging(_));
    assert!(!output.exists());
}

#[test]
fn empty_source_fails_without_creating_output() {
    let temp = tempfile::tempdir().unwrap();
    let source = temp.path().join("extracted");
    fs::create_dir_all(&source).unwrap();
    let output = temp.path().join("out.zip");

    let err = pack::pack(&source, &output).unwrap_err();
    assert_matches!(err, ThingsError::Packaging(_));
    assert!(!output.exists());
}
