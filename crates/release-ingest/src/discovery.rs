//! File discovery for release directories.

use std::path::{Path, PathBuf};

use crate::error::{IngestError, Result};

/// A CSV file of a release directory together with its file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageFile {
    pub path: PathBuf,
    pub name: String,
}

/// Lists all CSV files in a directory, sorted by file name.
pub fn list_csv_files(dir: &Path) -> Result<Vec<PathBuf>> {
    Ok(list_stage_files(dir, |_| true)?
        .into_iter()
        .map(|file| file.path)
        .collect())
}

/// Lists the CSV files of `dir` whose names pass `accept`.
///
/// Sorted by file name, so every stage visits its inputs in the same order on
/// every run. Subdirectories are ignored even when named `*.csv`.
pub fn list_stage_files(dir: &Path, accept: impl Fn(&str) -> bool) -> Result<Vec<StageFile>> {
    if !dir.is_dir() {
        return Err(IngestError::DirectoryNotFound {
            path: dir.to_path_buf(),
        });
    }
    let read_err = |source: std::io::Error| IngestError::DirectoryRead {
        path: dir.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(read_err)? {
        let path = entry.map_err(read_err)?.path();
        if !path.is_file() || !has_csv_extension(&path) {
            continue;
        }
        let name = file_name_of(&path);
        if accept(&name) {
            files.push(StageFile { path, name });
        }
    }
    files.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(files)
}

fn has_csv_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
}

/// File name component as an owned string (empty for paths without one).
pub fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_dir() -> TempDir {
        let dir = TempDir::new().unwrap();

        for name in &["2_scale.csv", "1_esm.csv", "notes.txt", "ITEM_1_esm.CSV"] {
            let path = dir.path().join(name);
            std::fs::write(&path, "header\ndata").unwrap();
        }
        std::fs::create_dir(dir.path().join("archive.csv")).unwrap();

        dir
    }

    #[test]
    fn test_list_csv_files() {
        let dir = create_test_dir();
        let files = list_csv_files(dir.path()).unwrap();

        let names: Vec<String> = files.iter().map(|p| file_name_of(p)).collect();
        assert_eq!(names, vec!["1_esm.csv", "2_scale.csv", "ITEM_1_esm.CSV"]);
    }

    #[test]
    fn test_list_stage_files_applies_name_filter() {
        let dir = create_test_dir();
        let files = list_stage_files(dir.path(), |name| name.starts_with("ITEM_")).unwrap();

        assert_eq!(files.len(), 1);
        assert_eq!(files[0].name, "ITEM_1_esm.CSV");
        assert_eq!(files[0].path, dir.path().join("ITEM_1_esm.CSV"));
    }

    #[test]
    fn test_list_csv_files_empty_dir() {
        let dir = TempDir::new().unwrap();
        let files = list_csv_files(dir.path()).unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn test_list_csv_files_not_a_directory() {
        let dir = TempDir::new().unwrap();
        let file_path = dir.path().join("test.csv");
        std::fs::write(&file_path, "data").unwrap();

        let result = list_csv_files(&file_path);
        assert!(matches!(result, Err(IngestError::DirectoryNotFound { .. })));
    }
}
