use mph_engine::config::{EngineConfig, ResourceConfig};
use mph_engine::resources::{LookupTables, ResourceError, ResourceSource, SiteTable};
use mph_engine::{EngineError, MphEngine, PrimaryResult, TumorInput};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn copy_packaged_tables() -> TempDir {
    let dir = tempfile::tempdir().expect("temp dir");
    let data = Path::new(env!("CARGO_MANIFEST_DIR")).join("data");
    for entry in fs::read_dir(&data).expect("data directory") {
        let path = entry.expect("data entry").path();
        let name = path.file_name().expect("file name");
        fs::copy(&path, dir.path().join(name)).expect("copy table");
    }
    dir
}

fn config_for(directory: PathBuf) -> EngineConfig {
    EngineConfig {
        resources: ResourceConfig {
            directory: Some(directory),
        },
        fixed_year: Some(2024),
        ..EngineConfig::default()
    }
}

#[test]
fn directory_tables_match_packaged_tables() {
    let dir = copy_packaged_tables();
    let loaded = LookupTables::load(&ResourceSource::Directory(dir.path().to_path_buf()))
        .expect("directory tables load");
    let packaged = LookupTables::packaged().expect("packaged tables");

    assert_eq!(loaded.hematopoietic_1998.len(), packaged.hematopoietic_1998.len());
    assert_eq!(loaded.hematopoietic_2010.len(), packaged.hematopoietic_2010.len());
    for table in SiteTable::ALL {
        assert_eq!(
            loaded.site(table).map(|table| table.len()),
            packaged.site(table).map(|table| table.len()),
            "{table:?}"
        );
    }
}

#[test]
fn engine_uses_overridden_tables() {
    let dir = copy_packaged_tables();
    fs::write(
        dir.path().join("hematopoietic_1998.csv"),
        "first,second\n9650,9980\n",
    )
    .expect("write override");

    let engine = MphEngine::new(&config_for(dir.path().to_path_buf())).expect("engine builds");
    let first = TumorInput::new("C421", "9650", "3", "1997");
    let second = TumorInput::new("C421", "9980", "3", "1998");

    let classification = engine.compute(&first, &second);
    assert_eq!(classification.result, PrimaryResult::SinglePrimary);
    assert_eq!(classification.step, Some("M2"));
}

#[test]
fn missing_table_fails_engine_construction() {
    let dir = tempfile::tempdir().expect("temp dir");
    match MphEngine::new(&config_for(dir.path().to_path_buf())) {
        Err(EngineError::Resource(ResourceError::Missing { name })) => {
            assert_eq!(name, "hematopoietic_1998.csv");
        }
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("engine built without tables"),
    }
}

#[test]
fn malformed_table_reports_the_resource() {
    let dir = copy_packaged_tables();
    fs::write(
        dir.path().join("hematopoietic_2001.csv"),
        "first,second\n\"9731,9732\n",
    )
    .expect("write malformed table");

    match MphEngine::new(&config_for(dir.path().to_path_buf())) {
        Err(EngineError::Resource(ResourceError::Malformed { name, .. })) => {
            assert_eq!(name, "hematopoietic_2001.csv");
        }
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("engine built from a malformed table"),
    }
}

#[test]
fn invalid_histology_code_reports_row() {
    let dir = copy_packaged_tables();
    fs::write(
        dir.path().join("histology_2018_lung.csv"),
        "row,subtype,code\nAdenocarcinoma,,8140\nAdenocarcinoma,Acinar,85510\n",
    )
    .expect("write invalid table");

    let error = LookupTables::load(&ResourceSource::Directory(dir.path().to_path_buf()))
        .expect_err("invalid code rejected");
    match error {
        ResourceError::InvalidValue { name, row, .. } => {
            assert_eq!(name, "histology_2018_lung.csv");
            assert_eq!(row, 2);
        }
        other => panic!("unexpected error: {other}"),
    }
}
