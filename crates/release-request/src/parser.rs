//! Free-text request grammar.
//!
//! ```text
//! Data request ID: 22
//! Assessment window: Baseline, 2-month post-baseline
//!
//! ITEM 1: ESM questionnaires (esm_daily.csv, esm_beeps.xlsx)
//!   Interested variables: [mood, stress, sleep_quality]
//!
//! ITEM 2 - clinical scales: panss.csv
//!   Interested variables:
//!     panss_total
//!     panss_positive, panss_negative
//! ```
//!
//! Blocks start at lines beginning with `ITEM` (not `ITEM_`, which is a file
//! name). A block without a positive leading item number, or without any file
//! reference, is dropped silently.

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use release_model::{ManifestItem, RequestManifest};
use tracing::{debug, info, warn};

use crate::error::{RequestError, Result};

/// File extensions recognized as table references.
pub const TABULAR_EXTENSIONS: &[&str] = &["csv", "xlsx", "xls", "tsv"];

static ITEM_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?im)^[ \t]*ITEM(?:[^A-Za-z_]|$)").expect("Invalid item header regex")
});

static ITEM_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\A\s*ITEM[ \t]*(?:no\.?|nr\.?|number|#)?[ \t]*[:.#-]?[ \t]*(\d+)")
        .expect("Invalid item number regex")
});

static FILE_REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    let extensions = TABULAR_EXTENSIONS.join("|");
    Regex::new(&format!(
        r"(?i)([A-Za-z0-9_][A-Za-z0-9_.\-]*)\.(?:{extensions})\b"
    ))
    .expect("Invalid file reference regex")
});

static INLINE_VARIABLES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)interested[ \t]+variables?[ \t]*:?\s*\[([^\]]*)\]")
        .expect("Invalid inline variables regex")
});

static BLOCK_VARIABLES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)interested[ \t]+variables?[ \t]*:?[ \t]*\r?\n((?:[ \t]+\S[^\r\n]*(?:\r?\n|\z))+)",
    )
    .expect("Invalid block variables regex")
});

static WINDOW_DIRECTIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?im)^[ \t]*assessment[ \t]+windows?[ \t]*:[ \t]*([^\r\n]*?)[ \t]*\r?$")
        .expect("Invalid assessment window regex")
});

static REQUEST_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?im)^[ \t]*(?:data[ \t]+)?request[ \t]*(?:id|no\.?|number|#)?",
        r"[ \t]*[:#][ \t]*(\S[^\r\n]*?)[ \t]*\r?$",
    ))
    .expect("Invalid request id regex")
});

/// Reads and parses a request document. A missing document is fatal.
pub fn parse_request_file(path: &Path) -> Result<RequestManifest> {
    let text = std::fs::read_to_string(path).map_err(|e| RequestError::read(path, e))?;
    let manifest = parse_request(&text);
    info!(
        path = %path.display(),
        items = manifest.items.len(),
        tables = manifest.table_reference_count(),
        windows = manifest.assessment_window.len(),
        "request parsed"
    );
    Ok(manifest)
}

/// Parses request text. Never fails: unparsable blocks are dropped.
pub fn parse_request(text: &str) -> RequestManifest {
    let starts: Vec<usize> = ITEM_HEADER.find_iter(text).map(|m| m.start()).collect();
    let mut items: Vec<ManifestItem> = Vec::with_capacity(starts.len());

    for (idx, &start) in starts.iter().enumerate() {
        let end = starts.get(idx + 1).copied().unwrap_or(text.len());
        let block = &text[start..end];
        let Some(item) = parse_item_block(block) else {
            continue;
        };
        if items.iter().any(|seen| seen.item_number == item.item_number) {
            warn!(
                item = item.item_number,
                "duplicate item number in request, keeping the first block"
            );
            continue;
        }
        items.push(item);
    }

    RequestManifest {
        request_id: parse_request_id(text),
        items,
        assessment_window: parse_window_directive(text),
    }
}

fn parse_item_block(block: &str) -> Option<ManifestItem> {
    let Some(number) = ITEM_NUMBER
        .captures(block)
        .and_then(|caps| caps[1].parse::<u32>().ok())
        .filter(|&number| number > 0)
    else {
        debug!(block = %first_line(block), "item block without item number dropped");
        return None;
    };

    let table_names = parse_table_names(block);
    if table_names.is_empty() {
        debug!(item = number, "item block without file references dropped");
        return None;
    }

    Some(ManifestItem {
        item_number: number,
        table_names,
        requested_variables: parse_variables(block),
    })
}

fn parse_table_names(block: &str) -> Vec<String> {
    let mut seen = BTreeSet::new();
    FILE_REFERENCE
        .captures_iter(block)
        .map(|caps| caps[1].to_string())
        .filter(|name| seen.insert(name.clone()))
        .collect()
}

/// Bracketed list first, indented block as fallback.
fn parse_variables(block: &str) -> Vec<String> {
    if let Some(caps) = INLINE_VARIABLES.captures(block) {
        return split_entries(&caps[1]);
    }
    if let Some(caps) = BLOCK_VARIABLES.captures(block) {
        return split_entries(&caps[1]);
    }
    Vec::new()
}

fn split_entries(raw: &str) -> Vec<String> {
    let mut seen = BTreeSet::new();
    raw.split([',', '\n'])
        .map(clean_entry)
        .filter(|entry| !entry.is_empty())
        .filter(|entry| seen.insert(entry.clone()))
        .collect()
}

fn clean_entry(raw: &str) -> String {
    raw.trim()
        .trim_start_matches(['-', '*', '•'])
        .trim()
        .trim_matches(['"', '\''])
        .trim()
        .to_string()
}

fn parse_window_directive(text: &str) -> Vec<String> {
    let Some(caps) = WINDOW_DIRECTIVE.captures(text) else {
        return Vec::new();
    };
    caps[1]
        .trim_matches(['[', ']'])
        .split(',')
        .map(clean_entry)
        .filter(|name| !name.is_empty())
        .collect()
}

fn parse_request_id(text: &str) -> Option<String> {
    REQUEST_ID
        .captures(text)
        .map(|caps| caps[1].trim().to_string())
        .filter(|id| !id.is_empty())
}

fn first_line(block: &str) -> &str {
    block.trim_start().lines().next().unwrap_or("").trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_number_variants() {
        for header in ["ITEM 3: x.csv", "Item #3 x.csv", "ITEM no. 3 - x.csv", "ITEM3 x.csv"] {
            let item = parse_item_block(header).expect(header);
            assert_eq!(item.item_number, 3, "{header}");
        }
        assert!(parse_item_block("ITEM: x.csv").is_none());
        assert!(parse_item_block("ITEM 0: zero.csv").is_none());
    }

    #[test]
    fn item_zero_is_dropped() {
        let manifest = parse_request("ITEM 0: zero.csv\nITEM 2: two.csv\n");
        let numbers: Vec<u32> = manifest.items.iter().map(|i| i.item_number).collect();
        assert_eq!(numbers, vec![2]);
    }

    #[test]
    fn file_names_starting_with_item_do_not_open_blocks() {
        let text = "ITEM 1: esm.csv\nITEM_list.csv\n  Interested variables: [mood]\n";
        let manifest = parse_request(text);
        assert_eq!(manifest.items.len(), 1);
        assert_eq!(manifest.items[0].table_names, vec!["esm", "ITEM_list"]);
        assert_eq!(manifest.items[0].requested_variables, vec!["mood"]);
    }

    #[test]
    fn table_names_strip_extensions_and_dedupe() {
        let names = parse_table_names(
            "ITEM 1: raw/esm_daily.csv, esm_beeps.XLSX and esm_daily.csv, notes.docx",
        );
        assert_eq!(names, vec!["esm_daily", "esm_beeps"]);
    }

    #[test]
    fn xls_does_not_shadow_xlsx() {
        assert_eq!(parse_table_names("scale.xlsx scale2.xls"), vec!["scale", "scale2"]);
    }

    #[test]
    fn inline_variables_with_quotes() {
        let vars = parse_variables("Interested variables: ['mood', \"stress\" , , sleep]");
        assert_eq!(vars, vec!["mood", "stress", "sleep"]);
    }

    #[test]
    fn block_variables_stop_at_unindented_line() {
        let block = "ITEM 2 panss.csv\nInterested variables:\n  - panss_total\n  \
                     panss_pos, panss_neg\nComment: none\n  ignored\n";
        assert_eq!(
            parse_variables(block),
            vec!["panss_total", "panss_pos", "panss_neg"]
        );
    }

    #[test]
    fn bracket_form_takes_precedence() {
        let block = "Interested variables: [a, b]\nInterested variables:\n  c\n";
        assert_eq!(parse_variables(block), vec!["a", "b"]);
    }

    #[test]
    fn window_directive_splits_names() {
        let text = "Assessment windows: [Baseline, 6-month post-baseline ]\n";
        assert_eq!(
            parse_window_directive(text),
            vec!["Baseline", "6-month post-baseline"]
        );
        assert!(parse_window_directive("no directive here").is_empty());
    }

    #[test]
    fn request_id_from_header() {
        assert_eq!(
            parse_request_id("Data request ID: R-22 \nITEM 1 a.csv"),
            Some("R-22".to_string())
        );
        assert_eq!(parse_request_id("ITEM 1 a.csv"), None);
    }
}
