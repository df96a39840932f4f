use std::fs;

use things_datasets::catalog::{Catalog, CatalogStore};
use things_datasets::selection::SelectionResolver;

fn one_group_catalog() -> (tempfile::TempDir, Catalog) {
    let temp = tempfile::tempdir().unwrap();
    let header = "name,sub-dataset name,description,files,download_url,size,include_files,code\n";
    let rows = "Demo,Images,demo images,images.zip,https://osf.io/download/abc,10MB,,\n\
                Demo,Labels,demo labels,labels.csv,https://osf.io/download/def,1MB,,\n";
    fs::write(temp.path().join("datasets.csv"), format!("{header}{rows}")).unwrap();
    let catalog = CatalogStore::new(temp.path().to_str().unwrap())
        .load()
        .unwrap();
    (temp, catalog)
}

fn tokens(raw: &[&str]) -> Vec<String> {
    raw.iter().map(|token| token.to_string()).collect()
}

#[test]
fn invalid_tokens_are_dropped_not_fatal() {
    let (_temp, catalog) = one_group_catalog();
    let selected = SelectionResolver::resolve(&tokens(&["1.1", "9.9", "abc"]), &catalog);
    assert_eq!(selected.len(), 1);
    assert_eq!(selected[0].sub_name, "Images");
}

#[test]
fn empty_input_resolves_to_nothing() {
    let (_temp, catalog) = one_group_catalog();
    assert!(SelectionResolver::resolve(&[], &catalog).is_empty());
    assert!(SelectionResolver::resolve(&tokens(&["0.1", "1.0", "x.y"]), &catalog).is_empty());
}

#[test]
fn order_and_duplicates_are_preserved() {
    let (_temp, catalog) = one_group_catalog();
    let selected = SelectionResolver::resolve(&tokens(&["1.2", "1.1", "1.2"]), &catalog);
    let names: Vec<&str> = selected
        .iter()
        .map(|entry| entry.sub_name.as_str())
        .collect();
    assert_eq!(names, vec!["Labels", "Images", "Labels"]);
}
