//! Structured form of a free-text data request.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

/// One numbered request for one or more source tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestItem {
    #[serde(rename = "item")]
    pub item_number: u32,
    #[serde(rename = "name", default)]
    pub table_names: Vec<String>,
    /// Empty means "export all columns".
    #[serde(rename = "variables", default)]
    pub requested_variables: Vec<String>,
}

impl ManifestItem {
    pub fn exports_all_columns(&self) -> bool {
        self.requested_variables.is_empty()
    }
}

/// Ordered items of a request plus the assessment windows it targets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestManifest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    #[serde(rename = "files", default)]
    pub items: Vec<ManifestItem>,
    #[serde(default)]
    pub assessment_window: Vec<String>,
}

impl RequestManifest {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn item(&self, item_number: u32) -> Option<&ManifestItem> {
        self.items
            .iter()
            .find(|item| item.item_number == item_number)
    }

    /// Total number of (item, table) pairs named by the request.
    pub fn table_reference_count(&self) -> usize {
        self.items.iter().map(|item| item.table_names.len()).sum()
    }

    /// Checks that item numbers are unique.
    pub fn validate(&self) -> Result<()> {
        let mut seen = BTreeSet::new();
        for item in &self.items {
            if item.item_number == 0 {
                return Err(ModelError::ZeroItemNumber);
            }
            if !seen.insert(item.item_number) {
                return Err(ModelError::DuplicateItem(item.item_number));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(number: u32, tables: &[&str]) -> ManifestItem {
        ManifestItem {
            item_number: number,
            table_names: tables.iter().map(|t| (*t).to_string()).collect(),
            requested_variables: Vec::new(),
        }
    }

    #[test]
    fn validate_rejects_duplicate_items() {
        let manifest = RequestManifest {
            items: vec![item(1, &["a"]), item(2, &["b"]), item(1, &["c"])],
            ..RequestManifest::default()
        };
        assert!(matches!(
            manifest.validate(),
            Err(ModelError::DuplicateItem(1))
        ));
    }

    #[test]
    fn validate_rejects_item_zero() {
        let manifest = RequestManifest {
            items: vec![item(0, &["zero"]), item(2, &["two"])],
            ..RequestManifest::default()
        };
        assert!(matches!(
            manifest.validate(),
            Err(ModelError::ZeroItemNumber)
        ));
    }

    #[test]
    fn counts_table_references() {
        let manifest = RequestManifest {
            items: vec![item(1, &["a", "b"]), item(2, &["c"])],
            ..RequestManifest::default()
        };
        assert_eq!(manifest.table_reference_count(), 3);
        assert_eq!(manifest.item(2).unwrap().table_names, vec!["c"]);
        assert!(manifest.item(7).is_none());
    }

    #[test]
    fn missing_variables_default_to_all_columns() {
        let parsed: ManifestItem =
            serde_json::from_str(r#"{"item": 4, "name": ["t"]}"#).expect("parse item");
        assert!(parsed.exports_all_columns());
    }
}
