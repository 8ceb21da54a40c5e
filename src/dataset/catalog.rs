use std::fs;
use std::path::Path;

use rust_embed::Embed;
use tracing::{info, warn};

use crate::dataset::{self, Dataset};
use crate::session::module::ModuleKind;

#[derive(Embed)]
#[folder = "assets/datasets/"]
struct BundledDatasets;

/// Every dataset the menu can offer: the bundled samples plus any loaded
/// from disk. Ids are unique; a later dataset with a known id replaces the
/// earlier one.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    entries: Vec<Dataset>,
}

impl Catalog {
    pub fn bundled() -> Self {
        let mut catalog = Self::default();
        for name in BundledDatasets::iter() {
            if !name.ends_with(".json") {
                continue;
            }
            let Some(file) = BundledDatasets::get(&name) else {
                continue;
            };
            match std::str::from_utf8(file.data.as_ref())
                .map_err(|e| e.to_string())
                .and_then(|text| dataset::parse_dataset(text).map_err(|e| e.to_string()))
            {
                Ok(dataset) => catalog.insert(dataset),
                Err(e) => warn!(
                    target: "lingodrill::dataset",
                    file = %name,
                    error = %e,
                    "skipping bundled dataset"
                ),
            }
        }
        catalog
    }

    /// Load a dataset file, or every `*.json` file in a directory.
    /// Returns how many datasets were added.
    pub fn load_path(&mut self, path: &Path) -> dataset::Result<usize> {
        if !path.is_dir() {
            self.insert(dataset::load_file(path)?);
            return Ok(1);
        }
        let entries = fs::read_dir(path).map_err(|source| dataset::DatasetError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut files: Vec<_> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.extension().and_then(|ext| ext.to_str()) == Some("json"))
            .collect();
        files.sort();

        let mut added = 0;
        for file in files {
            match dataset::load_file(&file) {
                Ok(dataset) => {
                    self.insert(dataset);
                    added += 1;
                }
                Err(e) => warn!(
                    target: "lingodrill::dataset",
                    file = %file.display(),
                    error = %e,
                    "skipping dataset file"
                ),
            }
        }
        info!(
            target: "lingodrill::dataset",
            dir = %path.display(),
            added,
            "loaded dataset directory"
        );
        Ok(added)
    }

    pub fn insert(&mut self, dataset: Dataset) {
        let id = dataset.metadata().id.clone();
        match self
            .entries
            .iter()
            .position(|existing| existing.metadata().id == id)
        {
            Some(index) => self.entries[index] = dataset,
            None => self.entries.push(dataset),
        }
        self.entries.sort_by_key(|d| (mode_rank(d.kind()), d.metadata().name.to_lowercase()));
    }

    pub fn entries(&self) -> &[Dataset] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Dataset> {
        self.entries.get(index)
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.entries.iter().position(|d| d.metadata().id == id)
    }
}

fn mode_rank(kind: ModuleKind) -> usize {
    ModuleKind::ALL
        .iter()
        .position(|&k| k == kind)
        .unwrap_or(ModuleKind::ALL.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_bundled_catalog_covers_every_mode() {
        let catalog = Catalog::bundled();
        for kind in ModuleKind::ALL {
            assert!(
                catalog.entries().iter().any(|d| d.kind() == kind),
                "no bundled dataset for {}",
                kind.as_str()
            );
        }
        assert!(catalog.entries().iter().all(|d| !d.is_empty()));
    }

    #[test]
    fn test_load_directory_skips_bad_files() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("good.json"),
            r#"{"id": "local", "name": "Local", "mode": "flashcard",
                "items": [{"front": "hola", "back": "hello"}]}"#,
        )
        .unwrap();
        fs::write(dir.path().join("bad.json"), "{ not json").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let mut catalog = Catalog::default();
        assert_eq!(catalog.load_path(dir.path()).unwrap(), 1);
        assert_eq!(catalog.position("local"), Some(0));
    }

    #[test]
    fn test_insert_replaces_same_id() {
        let mut catalog = Catalog::default();
        let first = dataset::parse_dataset(
            r#"{"id": "a", "name": "First", "mode": "flashcard", "items": []}"#,
        )
        .unwrap();
        let second = dataset::parse_dataset(
            r#"{"id": "a", "name": "Second", "mode": "flashcard", "items": []}"#,
        )
        .unwrap();
        catalog.insert(first);
        catalog.insert(second);
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.entries()[0].metadata().name, "Second");
    }

    #[test]
    fn test_load_missing_file_is_error() {
        let mut catalog = Catalog::default();
        assert!(catalog.load_path(Path::new("/no/such/set.json")).is_err());
        assert!(catalog.is_empty());
    }
}
