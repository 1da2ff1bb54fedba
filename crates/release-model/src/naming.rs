//! File-naming conventions shared by the pipeline stages.
//!
//! Every stage marks its outputs with a suffix or prefix so the working
//! directory doubles as an audit trail, and so each stage can find the files
//! of its predecessor without any in-memory hand-off:
//!
//! | stage      | output                                   |
//! |------------|------------------------------------------|
//! | export     | `{item}_{table}.csv`                     |
//! | window     | `{stem}_filtered.csv`                    |
//! | exclude    | `{stem}_exclusion_filter.csv`            |
//! | include    | `ITEM_{stem}.csv`                        |
//! | headerless | `ITEM_{stem}_no_headers.csv`             |
//! | summary    | `participants_conditions_summary.csv`    |

pub const CSV_EXTENSION: &str = "csv";
pub const FILTERED_SUFFIX: &str = "_filtered";
pub const EXCLUSION_SUFFIX: &str = "_exclusion_filter";
pub const FINAL_PREFIX: &str = "ITEM_";
pub const HEADERLESS_SUFFIX: &str = "_no_headers";
pub const SUMMARY_FILE_NAME: &str = "participants_conditions_summary.csv";

pub fn export_file_name(item_number: u32, table: &str) -> String {
    format!("{item_number}_{table}.{CSV_EXTENSION}")
}

pub fn is_csv(file_name: &str) -> bool {
    csv_stem(file_name).is_some()
}

/// File name without a (case-insensitive) `.csv` extension.
pub fn csv_stem(file_name: &str) -> Option<&str> {
    let (stem, ext) = file_name.rsplit_once('.')?;
    (ext.eq_ignore_ascii_case(CSV_EXTENSION) && !stem.is_empty()).then_some(stem)
}

/// True for files written by any stage after export.
pub fn is_stage_output(file_name: &str) -> bool {
    let Some(stem) = csv_stem(file_name) else {
        return false;
    };
    stem.ends_with(FILTERED_SUFFIX)
        || stem.ends_with(EXCLUSION_SUFFIX)
        || stem.ends_with(HEADERLESS_SUFFIX)
        || stem.starts_with(FINAL_PREFIX)
        || file_name == SUMMARY_FILE_NAME
}

pub fn window_output_name(file_name: &str) -> String {
    let stem = csv_stem(file_name).unwrap_or(file_name);
    format!("{stem}{FILTERED_SUFFIX}.{CSV_EXTENSION}")
}

pub fn is_window_output(file_name: &str) -> bool {
    csv_stem(file_name).is_some_and(|stem| stem.ends_with(FILTERED_SUFFIX))
}

pub fn exclusion_output_name(file_name: &str) -> String {
    let stem = csv_stem(file_name).unwrap_or(file_name);
    let base = stem.strip_suffix(FILTERED_SUFFIX).unwrap_or(stem);
    format!("{base}{EXCLUSION_SUFFIX}.{CSV_EXTENSION}")
}

pub fn is_exclusion_output(file_name: &str) -> bool {
    csv_stem(file_name).is_some_and(|stem| stem.ends_with(EXCLUSION_SUFFIX))
}

/// Final item name for an exclusion-stage file (used by inclusion and promotion).
pub fn final_output_name(file_name: &str) -> String {
    let stem = csv_stem(file_name).unwrap_or(file_name);
    let base = stem.strip_suffix(EXCLUSION_SUFFIX).unwrap_or(stem);
    format!("{FINAL_PREFIX}{base}.{CSV_EXTENSION}")
}

pub fn is_final_output(file_name: &str) -> bool {
    csv_stem(file_name)
        .is_some_and(|stem| stem.starts_with(FINAL_PREFIX) && !stem.ends_with(HEADERLESS_SUFFIX))
}

pub fn headerless_name(file_name: &str) -> String {
    let stem = csv_stem(file_name).unwrap_or(file_name);
    format!("{stem}{HEADERLESS_SUFFIX}.{CSV_EXTENSION}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_chain_through_the_stages() {
        let exported = export_file_name(4, "esm_daily");
        assert_eq!(exported, "4_esm_daily.csv");
        let filtered = window_output_name(&exported);
        assert_eq!(filtered, "4_esm_daily_filtered.csv");
        let excluded = exclusion_output_name(&filtered);
        assert_eq!(excluded, "4_esm_daily_exclusion_filter.csv");
        let final_name = final_output_name(&excluded);
        assert_eq!(final_name, "ITEM_4_esm_daily.csv");
        assert_eq!(headerless_name(&final_name), "ITEM_4_esm_daily_no_headers.csv");
    }

    #[test]
    fn stage_outputs_are_recognized() {
        assert!(!is_stage_output("4_esm_daily.csv"));
        assert!(is_stage_output("4_esm_daily_filtered.csv"));
        assert!(is_stage_output("4_esm_daily_exclusion_filter.csv"));
        assert!(is_stage_output("ITEM_4_esm_daily.csv"));
        assert!(is_stage_output(SUMMARY_FILE_NAME));
        assert!(!is_stage_output("notes.txt"));
    }

    #[test]
    fn final_outputs_exclude_headerless_copies() {
        assert!(is_final_output("ITEM_4_esm_daily.csv"));
        assert!(!is_final_output("ITEM_4_esm_daily_no_headers.csv"));
        assert!(!is_final_output("4_esm_daily.csv"));
    }

    #[test]
    fn extension_check_is_case_insensitive() {
        assert_eq!(csv_stem("DATA.CSV"), Some("DATA"));
        assert_eq!(csv_stem(".csv"), None);
        assert!(!is_csv("data.xlsx"));
    }
}
