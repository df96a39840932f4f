use std::fs;
use std::path::Path;

use assert_matches::assert_matches;

use things_datasets::catalog::{CatalogStore, SourceKind};
use things_datasets::error::ThingsError;

fn write_catalog(dir: &Path, rows: &str) {
    let header = "name,sub-dataset name,description,files,download_url,size,include_files,code\n";
    fs::write(dir.join("datasets.csv"), format!("{header}{rows}")).unwrap();
}

fn write_descriptions(dir: &Path, rows: &str) {
    let header = "name,name_description\n";
    fs::write(
        dir.join("dataset_descriptions.csv"),
        format!("{header}{rows}"),
    )
    .unwrap();
}

#[test]
fn load_preserves_row_order_and_splits_multi_values() {
    let temp = tempfile::tempdir().unwrap();
    write_catalog(
        temp.path(),
        "THINGS,Images,Object images,images.zip; labels.csv,https://figshare.com/ndownloader/files/1,5GB,,c1\n\
         THINGS,Behaviour,Similarity judgements,behaviour.tsv,https://osf.io/download/abc,10MB,,c2\n\
         fMRI,Scans,BOLD runs,sub-01,https://openneuro.org/datasets/ds004192,2GB,sub-01/*; participants.tsv,\n",
    );

    let store = CatalogStore::new(temp.path().to_str().unwrap());
    let catalog = store.load().unwrap();

    let groups = catalog.groups();
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].name, "THINGS");
    assert_eq!(groups[0].entries.len(), 2);
    assert_eq!(groups[0].entries[0].sub_name, "Images");
    assert_eq!(groups[0].entries[1].sub_name, "Behaviour");

    let images = &groups[0].entries[0];
    assert_eq!(images.files, vec!["images.zip", "labels.csv"]);
    assert!(images.files.iter().all(|file| !file.contains("; ")));
    assert_eq!(images.folder_name, "THINGS_Images");
    assert_eq!(images.kind, SourceKind::ArchiveHost);
    assert_eq!(images.code, "c1");

    assert_eq!(groups[0].entries[1].kind, SourceKind::DirectFile);

    let scans = &groups[1].entries[0];
    assert_eq!(scans.kind, SourceKind::ExternalTool);
    assert_eq!(scans.include_files, vec!["sub-01/*", "participants.tsv"]);
    assert_eq!(scans.code, "");
}

#[test]
fn load_defaults_code_when_column_is_absent() {
    let temp = tempfile::tempdir().unwrap();
    let header = "name,sub-dataset name,description,files,download_url,size,include_files\n";
    let row = "THINGS,Images,desc,images.zip,https://figshare.com/files/1,5GB,\n";
    fs::write(temp.path().join("datasets.csv"), format!("{header}{row}")).unwrap();

    let store = CatalogStore::new(temp.path().to_str().unwrap());
    let catalog = store.load().unwrap();
    assert_eq!(catalog.groups()[0].entries[0].code, "");
}

#[test]
fn load_fails_on_missing_file() {
    let temp = tempfile::tempdir().unwrap();
    let store = CatalogStore::new(temp.path().to_str().unwrap());
    assert_matches!(store.load().unwrap_err(), ThingsError::CatalogRead(_));
    assert_matches!(
        store.load_descriptions().unwrap_err(),
        ThingsError::CatalogRead(_)
    );
}

#[test]
fn load_fails_on_malformed_row() {
    let temp = tempfile::tempdir().unwrap();
    write_catalog(temp.path(), "THINGS,only-two-fields\n");

    let store = CatalogStore::new(temp.path().to_str().unwrap());
    assert_matches!(store.load().unwrap_err(), ThingsError::CatalogParse(_));
}

#[test]
fn load_fails_on_unknown_host() {
    let temp = tempfile::tempdir().unwrap();
    write_catalog(
        temp.path(),
        "THINGS,Images,desc,images.zip,https://example.com/data.zip,5GB,,\n",
    );

    let store = CatalogStore::new(temp.path().to_str().unwrap());
    assert_matches!(store.load().unwrap_err(), ThingsError::UnknownHost(_));
}

#[test]
fn load_descriptions_maps_group_to_text() {
    let temp = tempfile::tempdir().unwrap();
    write_descriptions(
        temp.path(),
        "THINGS,Core object image database\nfMRI,Neuroimaging recordings\n",
    );

    let store = CatalogStore::new(temp.path().to_str().unwrap());
    let descriptions = store.load_descriptions().unwrap();
    assert_eq!(
        descriptions.get("THINGS").unwrap(),
        "Core object image database"
    );
    assert_eq!(descriptions.get("fMRI").unwrap(), "Neuroimaging recordings");
}

#[test]
fn quoted_description_with_comma_stays_one_field() {
    let temp = tempfile::tempdir().unwrap();
    write_catalog(
        temp.path(),
        "THINGS,Images,\"1,854 object concepts\",images.zip,https://figshare.com/files/1,5GB,,\n",
    );

    let store = CatalogStore::new(temp.path().to_str().unwrap());
    let catalog = store.load().unwrap();
    assert_eq!(
        catalog.groups()[0].entries[0].description,
        "1,854 object concepts"
    );
}
