//! Integration tests for the filter stages over a release directory.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use release_filter::{
    FilterError, IdentityMode, IdentitySetFilter, SummaryBuilder, WindowFilter,
    promote_final_files, write_headerless_copies,
};
use release_ingest::read_table;
use release_model::{Delimiter, SkipReason};
use tempfile::TempDir;

fn write(dir: &Path, name: &str, content: &str) {
    fs::write(dir.join(name), content).unwrap();
}

fn ids(values: &[&str]) -> BTreeSet<String> {
    values.iter().map(|v| (*v).to_string()).collect()
}

fn identifiers_in(path: &Path) -> Vec<String> {
    read_table(path, Delimiter::Semicolon)
        .unwrap()
        .rows
        .into_iter()
        .map(|row| row[0].clone())
        .collect()
}

#[test]
fn window_stage_filters_and_skips() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "1_esm.csv",
        "participant_identifier;VisitCode;mood\nP1;0;3\nP1;1;4\nP2;2;5\n",
    );
    write(
        dir.path(),
        "2_scale.csv",
        "participant_identifier;visit_name\nP1;Baseline (Arm 1)\nP2;T2 (Arm 2)\n",
    );
    write(dir.path(), "3_demo.csv", "participant_identifier;unit\nP1;u1\n");

    let filter =
        WindowFilter::new(&["Baseline", "Unknown window"], Delimiter::Semicolon).unwrap();
    let report = filter.run(dir.path()).unwrap();

    assert_eq!(
        report.written_names(),
        vec!["1_esm_filtered.csv", "2_scale_filtered.csv"]
    );
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].subject, "3_demo.csv");
    assert_eq!(report.skipped[0].reason, SkipReason::NoTimepointColumn);
    assert_eq!(
        fs::read_to_string(dir.path().join("1_esm_filtered.csv")).unwrap(),
        "participant_identifier;VisitCode;mood\nP1;0;3\n"
    );
    assert_eq!(
        identifiers_in(&dir.path().join("2_scale_filtered.csv")),
        vec!["P1"]
    );
    // Originals are preserved.
    assert!(
        fs::read_to_string(dir.path().join("1_esm.csv"))
            .unwrap()
            .contains("P2;2;5")
    );
}

#[test]
fn window_filter_is_idempotent() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "1_esm.csv",
        "participant_identifier;VisitCode\nA;0\nB;1\nC;3\nD;1.0\n",
    );
    let windows = ["2-month post-baseline", "12-month post-baseline"];
    let filter = WindowFilter::new(&windows, Delimiter::Semicolon).unwrap();

    let once = dir.path().join("once.csv");
    let twice = dir.path().join("twice.csv");
    filter.filter_file(&dir.path().join("1_esm.csv"), &once).unwrap();
    filter.filter_file(&once, &twice).unwrap();

    let first = read_table(&once, Delimiter::Semicolon).unwrap();
    let second = read_table(&twice, Delimiter::Semicolon).unwrap();
    assert_eq!(first, second);
    assert_eq!(identifiers_in(&once), vec!["B", "C", "D"]);
}

#[test]
fn rerunning_the_window_stage_ignores_its_own_outputs() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "1_esm.csv", "participant_identifier;VisitCode\nA;0\n");
    let filter = WindowFilter::new(&["Baseline"], Delimiter::Semicolon).unwrap();

    filter.run(dir.path()).unwrap();
    let again = filter.run(dir.path()).unwrap();

    assert_eq!(again.written_names(), vec!["1_esm_filtered.csv"]);
    assert!(!dir.path().join("1_esm_filtered_filtered.csv").exists());
}

#[test]
fn empty_window_selector_is_fatal() {
    let names: Vec<String> = Vec::new();
    assert!(matches!(
        WindowFilter::new(&names, Delimiter::Semicolon),
        Err(FilterError::EmptyWindowSelector)
    ));
}

fn composed(exclude: &[&str], include: &[&str]) -> Vec<String> {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "1_esm_filtered.csv",
        "participant_identifier;VisitCode\nA;0\nB;0\nC;0\nD;0\n",
    );
    IdentitySetFilter::exclusion(ids(exclude), Delimiter::Semicolon)
        .run(dir.path())
        .unwrap();
    IdentitySetFilter::inclusion(ids(include), Delimiter::Semicolon)
        .run(dir.path())
        .unwrap();
    identifiers_in(&dir.path().join("ITEM_1_esm.csv"))
}

#[test]
fn exclusion_then_inclusion_composes() {
    assert_eq!(composed(&["B"], &["A", "C"]), vec!["A", "C"]);
    assert!(composed(&["B"], &["B"]).is_empty());
}

#[test]
fn identity_stages_read_only_their_predecessor() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "1_esm.csv", "participant_identifier\nA\nB\n");
    write(dir.path(), "1_esm_filtered.csv", "participant_identifier\nA\nB\n");
    write(dir.path(), "2_demo_filtered.csv", "id;unit\nA;u\n");

    let report = IdentitySetFilter::exclusion(ids(&["A"]), Delimiter::Semicolon)
        .run(dir.path())
        .unwrap();

    assert_eq!(report.written_names(), vec!["1_esm_exclusion_filter.csv"]);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].subject, "2_demo_filtered.csv");
    assert_eq!(report.skipped[0].reason, SkipReason::MissingIdentifierColumn);
    assert_eq!(
        identifiers_in(&dir.path().join("1_esm_exclusion_filter.csv")),
        vec!["B"]
    );
}

#[test]
fn identifier_list_is_read_from_file() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "dropouts.csv", "B\n D \n");
    write(
        dir.path(),
        "1_esm_filtered.csv",
        "participant_identifier;x\nA;1\nB;2\nD;3\n",
    );

    let filter = IdentitySetFilter::from_list_file(
        IdentityMode::Exclude,
        &dir.path().join("dropouts.csv"),
        Delimiter::Semicolon,
    )
    .unwrap();
    assert_eq!(filter.identifier_count(), 2);
    filter.run(dir.path()).unwrap();

    assert_eq!(
        identifiers_in(&dir.path().join("1_esm_exclusion_filter.csv")),
        vec!["A"]
    );
}

#[test]
fn missing_identifier_list_is_fatal() {
    let dir = TempDir::new().unwrap();
    let result = IdentitySetFilter::from_list_file(
        IdentityMode::Include,
        &dir.path().join("absent.csv"),
        Delimiter::Semicolon,
    );
    assert!(matches!(result, Err(FilterError::IdentifierList { .. })));
}

#[test]
fn promotion_names_final_files() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "1_esm_exclusion_filter.csv",
        "participant_identifier;VisitCode\nA;0\nC;0\n",
    );

    let report = promote_final_files(dir.path(), Delimiter::Semicolon).unwrap();

    assert_eq!(report.written_names(), vec!["ITEM_1_esm.csv"]);
    assert_eq!(report.total_rows(), 2);
    assert_eq!(
        identifiers_in(&dir.path().join("ITEM_1_esm.csv")),
        vec!["A", "C"]
    );
}

#[test]
fn summary_keeps_first_seen_participant() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "ITEM_1_esm.csv",
        "participant_identifier;VisitCode;unit;condition;randomize\n\
         P1;0;u1;control;r1\n\
         P2;0;u2;treatment;r2\n\
         P1;1;u9;treatment;r9\n",
    );
    write(
        dir.path(),
        "ITEM_2_scale.csv",
        "participant_identifier,unit,condition,randomize\nP1,u7,other,r7\nP3,u3,control,r3\n",
    );
    write(
        dir.path(),
        "ITEM_2_scale_no_headers.csv",
        "P4,u4,control,r4\n",
    );

    let report = SummaryBuilder::default().run(dir.path()).unwrap();

    assert_eq!(
        report.written_names(),
        vec!["participants_conditions_summary.csv"]
    );
    assert_eq!(report.total_rows(), 3);
    let summary =
        fs::read_to_string(dir.path().join("participants_conditions_summary.csv")).unwrap();
    insta::assert_snapshot!(summary, @r"
    participant_identifier;unit;condition;randomize
    P1;u1;control;r1
    P2;u2;treatment;r2
    P3;u3;control;r3
    ");
}

#[test]
fn headerless_copies_follow_final_files() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "ITEM_1_esm.csv",
        "participant_identifier;VisitCode\nA;0\n",
    );
    write(dir.path(), "1_esm.csv", "participant_identifier;VisitCode\nA;0\n");

    let report = write_headerless_copies(dir.path(), Delimiter::Semicolon).unwrap();

    assert_eq!(report.written_names(), vec!["ITEM_1_esm_no_headers.csv"]);
    assert_eq!(
        fs::read_to_string(dir.path().join("ITEM_1_esm_no_headers.csv")).unwrap(),
        "A;0\n"
    );
}
