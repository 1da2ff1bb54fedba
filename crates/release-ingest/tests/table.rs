//! Integration tests for release file I/O.

use std::fs;

use release_ingest::{list_csv_files, probe_delimiter, read_table, write_table};
use release_model::Delimiter;
use tempfile::TempDir;

#[test]
fn probed_delimiter_reads_back_what_was_written() {
    let dir = TempDir::new().unwrap();
    let comma = dir.path().join("ITEM_1_a.csv");
    let semicolon = dir.path().join("ITEM_2_b.csv");
    fs::write(&comma, "participant_identifier,unit\nP1,ward a\n").unwrap();
    fs::write(&semicolon, "participant_identifier;unit\nP2;ward b\n").unwrap();

    for path in list_csv_files(dir.path()).unwrap() {
        let delimiter = probe_delimiter(&path).unwrap().unwrap();
        let table = read_table(&path, delimiter).unwrap();
        assert_eq!(table.headers, vec!["participant_identifier", "unit"]);
        assert_eq!(table.height(), 1);
    }
}

#[test]
fn write_replaces_existing_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("1_a_filtered.csv");
    fs::write(&path, "stale;content\nx;y\nz;w\n").unwrap();

    let mut table = read_table(&path, Delimiter::Semicolon).unwrap();
    table.retain_rows(|row| row[0] == "x");
    write_table(&path, &table, Delimiter::Semicolon).unwrap();

    assert_eq!(fs::read_to_string(&path).unwrap(), "stale;content\nx;y\n");
}
