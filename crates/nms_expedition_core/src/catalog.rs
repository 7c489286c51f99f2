//! Expedition dataset catalog.
//!
//! A catalog is a directory of expedition datasets plus one metadata file:
//!
//! ```text
//! data/expeditions/
//!   expeditions-metadata.json    # id -> descriptor fields
//!   01_pioneers.json             # dataset, swapped in as SEASON_DATA_CACHE.JSON
//!   02_beachhead.json
//! ```
//!
//! Metadata is advisory. A dataset without a metadata record is still listed,
//! and a missing or malformed metadata file never blocks an operation.

use crate::error::CatalogError;
use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;

pub const METADATA_FILE_NAME: &str = "expeditions-metadata.json";

const DATASET_EXTENSION: &str = ".json";

/// Descriptive fields of an expedition. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpeditionMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
    /// Sort key; missing sorts as 0.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rewards: Vec<String>,
}

/// A dataset in the catalog together with its metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpeditionDescriptor {
    /// Dataset file name without the `.json` extension, e.g. `01_pioneers`.
    pub id: String,
    /// Dataset file name, e.g. `01_pioneers.json`.
    pub file: String,
    #[serde(flatten)]
    pub metadata: ExpeditionMetadata,
}

impl ExpeditionDescriptor {
    /// Display name, falling back to the id.
    pub fn display_name(&self) -> &str {
        self.metadata.display_name.as_deref().unwrap_or(&self.id)
    }

    pub fn order(&self) -> i64 {
        self.metadata.order.unwrap_or(0)
    }
}

/// Read-only view of an expedition data directory.
#[derive(Debug, Clone)]
pub struct ExpeditionCatalog {
    data_dir: Utf8PathBuf,
}

impl ExpeditionCatalog {
    pub fn new(data_dir: impl Into<Utf8PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Utf8Path {
        &self.data_dir
    }

    /// All datasets, sorted ascending by `order` (ties keep file name order).
    pub fn list_available(&self) -> Result<Vec<ExpeditionDescriptor>, CatalogError> {
        let files = self.dataset_files()?;
        let mut store = self.load_metadata_store();

        let mut expeditions: Vec<ExpeditionDescriptor> = files
            .into_iter()
            .map(|file| {
                let id = dataset_id(&file).to_string();
                let metadata = store.remove(&id).unwrap_or_default();
                ExpeditionDescriptor { id, file, metadata }
            })
            .collect();

        expeditions.sort_by_key(ExpeditionDescriptor::order);
        Ok(expeditions)
    }

    /// Metadata for `id`, or empty metadata when there is no usable record.
    pub fn metadata(&self, id: &str) -> ExpeditionMetadata {
        self.load_metadata_store().remove(id).unwrap_or_default()
    }

    /// Descriptor for `id` if its dataset file exists.
    pub fn descriptor(&self, id: &str) -> Option<ExpeditionDescriptor> {
        let path = self.dataset_path(id)?;
        if !path.as_std_path().is_file() {
            return None;
        }
        Some(ExpeditionDescriptor {
            id: id.to_string(),
            file: format!("{id}{DATASET_EXTENSION}"),
            metadata: self.metadata(id),
        })
    }

    /// Path of the dataset file for `id`, whether or not it exists.
    ///
    /// Returns `None` unless `id` is a single plain file name component: no
    /// separators, no drive or root prefix, not `.`/`..`, and not the metadata
    /// file's stem in any letter case. An id can never escape the data directory.
    pub fn dataset_path(&self, id: &str) -> Option<Utf8PathBuf> {
        let mut components = Utf8Path::new(id).components();
        let single = matches!(
            (components.next(), components.next()),
            (Some(Utf8Component::Normal(name)), None) if name == id
        );
        let plain = single
            && !id.contains([':', '/', '\\'])
            && !id.eq_ignore_ascii_case(metadata_stem());
        plain.then(|| self.data_dir.join(format!("{id}{DATASET_EXTENSION}")))
    }

    /// Finds the first dataset whose bytes equal `content`.
    ///
    /// Datasets that cannot be read are skipped with a warning.
    pub fn find_by_content(
        &self,
        content: &[u8],
    ) -> Result<Option<ExpeditionDescriptor>, CatalogError> {
        for file in self.dataset_files()? {
            let path = self.data_dir.join(&file);
            let dataset = match fs::read(path.as_std_path()) {
                Ok(bytes) => bytes,
                Err(e) => {
                    tracing::warn!("Skipping unreadable dataset {}: {}", path, e);
                    continue;
                }
            };

            if dataset == content {
                let id = dataset_id(&file).to_string();
                let metadata = self.metadata(&id);
                return Ok(Some(ExpeditionDescriptor { id, file, metadata }));
            }
        }
        Ok(None)
    }

    /// Dataset file names in the data directory, sorted by name.
    fn dataset_files(&self) -> Result<Vec<String>, CatalogError> {
        let read_dir_err = |source| CatalogError::ReadDir {
            path: self.data_dir.clone(),
            source,
        };

        let mut files = Vec::new();
        for entry in fs::read_dir(self.data_dir.as_std_path()).map_err(read_dir_err)? {
            let entry = entry.map_err(read_dir_err)?;
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            if !is_dataset_file_name(&name) {
                continue;
            }
            if entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
                files.push(name);
            }
        }

        files.sort();
        tracing::debug!("Found {} datasets in {}", files.len(), self.data_dir);
        Ok(files)
    }

    fn load_metadata_store(&self) -> BTreeMap<String, ExpeditionMetadata> {
        let path = self.data_dir.join(METADATA_FILE_NAME);
        let contents = match fs::read_to_string(path.as_std_path()) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No expedition metadata at {}", path);
                return BTreeMap::new();
            }
            Err(e) => {
                tracing::warn!("Could not read expedition metadata {}: {}", path, e);
                return BTreeMap::new();
            }
        };

        let records: BTreeMap<String, serde_json::Value> = match serde_json::from_str(&contents) {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!("Could not parse expedition metadata {}: {}", path, e);
                return BTreeMap::new();
            }
        };

        // A bad record only loses its own fields.
        records
            .into_iter()
            .map(|(id, record)| {
                let metadata = serde_json::from_value(record).unwrap_or_else(|e| {
                    tracing::warn!("Ignoring invalid metadata for {} in {}: {}", id, path, e);
                    ExpeditionMetadata::default()
                });
                (id, metadata)
            })
            .collect()
    }
}

fn metadata_stem() -> &'static str {
    &METADATA_FILE_NAME[..METADATA_FILE_NAME.len() - DATASET_EXTENSION.len()]
}

fn is_dataset_file_name(name: &str) -> bool {
    !name.eq_ignore_ascii_case(METADATA_FILE_NAME)
        && name.len() > DATASET_EXTENSION.len()
        && name.ends_with(DATASET_EXTENSION)
}

fn dataset_id(file: &str) -> &str {
    &file[..file.len() - DATASET_EXTENSION.len()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn catalog_dir() -> (tempfile::TempDir, ExpeditionCatalog) {
        let dir = tempdir().unwrap();
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
        (dir, ExpeditionCatalog::new(root))
    }

    fn write(catalog: &ExpeditionCatalog, name: &str, contents: &str) {
        fs::write(catalog.data_dir().join(name), contents).unwrap();
    }

    #[test]
    fn test_list_sorted_by_order() {
        let (_dir, catalog) = catalog_dir();
        write(&catalog, "a_first.json", "{}");
        write(&catalog, "b_second.json", "{}");
        write(&catalog, "c_third.json", "{}");
        write(
            &catalog,
            METADATA_FILE_NAME,
            r#"{
                "a_first": { "displayName": "A", "order": 3 },
                "b_second": { "displayName": "B", "order": 1, "rewards": ["Hat", "Ship"] },
                "c_third": { "displayName": "C", "order": 2, "releaseDate": "2021-03-31" }
            }"#,
        );

        let list = catalog.list_available().unwrap();
        let ids: Vec<&str> = list.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["b_second", "c_third", "a_first"]);
        assert_eq!(list[0].metadata.rewards, vec!["Hat", "Ship"]);
        assert_eq!(list[1].metadata.release_date.as_deref(), Some("2021-03-31"));
        assert_eq!(list[0].file, "b_second.json");
    }

    #[test]
    fn test_missing_order_sorts_first() {
        let (_dir, catalog) = catalog_dir();
        write(&catalog, "ordered.json", "{}");
        write(&catalog, "unordered.json", "{}");
        write(&catalog, METADATA_FILE_NAME, r#"{ "ordered": { "order": 1 } }"#);

        let list = catalog.list_available().unwrap();
        assert_eq!(list[0].id, "unordered");
        assert_eq!(list[1].id, "ordered");
    }

    #[test]
    fn test_entry_without_metadata_has_id_and_file_only() {
        let (_dir, catalog) = catalog_dir();
        write(&catalog, "05_lonely.json", "{}");

        let list = catalog.list_available().unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].id, "05_lonely");
        assert_eq!(list[0].file, "05_lonely.json");
        assert_eq!(list[0].metadata, ExpeditionMetadata::default());
        assert_eq!(list[0].display_name(), "05_lonely");
    }

    #[test]
    fn test_non_dataset_files_ignored() {
        let (_dir, catalog) = catalog_dir();
        write(&catalog, "x.json", "{}");
        write(&catalog, "notes.txt", "hello");
        write(&catalog, "UPPER.JSON", "{}");
        write(&catalog, METADATA_FILE_NAME, "{}");
        fs::create_dir(catalog.data_dir().join("nested.json")).unwrap();

        let list = catalog.list_available().unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].id, "x");
    }

    #[test]
    fn test_missing_directory_is_catalog_error() {
        let catalog = ExpeditionCatalog::new("/definitely/not/here/expeditions");
        let err = catalog.list_available().unwrap_err();
        assert!(matches!(err, CatalogError::ReadDir { .. }));
    }

    #[test]
    fn test_metadata_missing_store_is_empty() {
        let (_dir, catalog) = catalog_dir();
        assert_eq!(catalog.metadata("anything"), ExpeditionMetadata::default());
    }

    #[test]
    fn test_metadata_malformed_store_is_empty() {
        let (_dir, catalog) = catalog_dir();
        write(&catalog, METADATA_FILE_NAME, "[ broken");
        assert_eq!(catalog.metadata("x"), ExpeditionMetadata::default());
    }

    #[test]
    fn test_dataset_path_rejects_traversal() {
        let (_dir, catalog) = catalog_dir();
        assert!(catalog.dataset_path("../secret").is_none());
        assert!(catalog.dataset_path("a/b").is_none());
        assert!(catalog.dataset_path("a\\b").is_none());
        assert!(catalog.dataset_path("..").is_none());
        assert!(catalog.dataset_path("").is_none());
        assert!(catalog.dataset_path("expeditions-metadata").is_none());
        assert!(catalog.dataset_path(".").is_none());
        assert!(catalog.dataset_path("a/").is_none());
        assert!(catalog.dataset_path("/abs").is_none());
        assert_eq!(
            catalog.dataset_path("01_pioneers").unwrap(),
            catalog.data_dir().join("01_pioneers.json")
        );
    }

    #[test]
    fn test_dataset_path_rejects_metadata_in_any_case() {
        let (_dir, catalog) = catalog_dir();
        assert!(catalog.dataset_path("Expeditions-Metadata").is_none());
        assert!(catalog.dataset_path("EXPEDITIONS-METADATA").is_none());
        assert!(catalog.dataset_path("expeditions-metadata-extra").is_some());
    }

    #[test]
    fn test_dataset_path_rejects_drive_prefix() {
        let (_dir, catalog) = catalog_dir();
        assert!(catalog.dataset_path("C:x").is_none());
        assert!(catalog.dataset_path("C:").is_none());
        assert!(catalog.dataset_path("x:stream").is_none());
    }

    #[test]
    fn test_metadata_file_in_other_case_is_not_listed() {
        let (_dir, catalog) = catalog_dir();
        write(&catalog, "01_pioneers.json", "{}");
        write(&catalog, "Expeditions-Metadata.json", "{}");

        let ids: Vec<_> = catalog
            .list_available()
            .unwrap()
            .into_iter()
            .map(|e| e.id)
            .collect();
        assert_eq!(ids, vec!["01_pioneers"]);
    }

    #[test]
    fn test_invalid_record_does_not_discard_others() {
        let (_dir, catalog) = catalog_dir();
        write(&catalog, "01_pioneers.json", "{}");
        write(&catalog, "02_beachhead.json", "{}");
        write(
            &catalog,
            METADATA_FILE_NAME,
            r#"{
                "01_pioneers": { "displayName": "Pioneers", "order": 2 },
                "02_beachhead": { "displayName": "Beachhead", "rewards": null }
            }"#,
        );

        let pioneers = catalog.metadata("01_pioneers");
        assert_eq!(pioneers.display_name.as_deref(), Some("Pioneers"));
        assert_eq!(pioneers.order, Some(2));
        assert_eq!(catalog.metadata("02_beachhead"), ExpeditionMetadata::default());

        let list = catalog.list_available().unwrap();
        assert_eq!(list[0].id, "02_beachhead");
        assert_eq!(list[1].display_name(), "Pioneers");
    }

    #[test]
    fn test_find_by_content() {
        let (_dir, catalog) = catalog_dir();
        write(&catalog, "x.json", r#"{"v":2}"#);
        write(&catalog, "y.json", r#"{"v":3}"#);
        write(&catalog, METADATA_FILE_NAME, r#"{ "y": { "displayName": "Why" } }"#);

        let found = catalog.find_by_content(br#"{"v":3}"#).unwrap().unwrap();
        assert_eq!(found.id, "y");
        assert_eq!(found.display_name(), "Why");

        assert!(catalog.find_by_content(br#"{"v":4}"#).unwrap().is_none());
    }

    #[test]
    fn test_descriptor_requires_dataset() {
        let (_dir, catalog) = catalog_dir();
        write(&catalog, "x.json", "{}");

        assert_eq!(catalog.descriptor("x").unwrap().file, "x.json");
        assert!(catalog.descriptor("missing").is_none());
    }

    #[test]
    fn test_descriptor_serialization_is_flat() {
        let descriptor = ExpeditionDescriptor {
            id: "01_pioneers".to_string(),
            file: "01_pioneers.json".to_string(),
            metadata: ExpeditionMetadata {
                display_name: Some("The Pioneers".to_string()),
                order: Some(1),
                ..Default::default()
            },
        };
        let json = serde_json::to_string(&descriptor).unwrap();

        assert!(json.contains("\"id\":\"01_pioneers\""));
        assert!(json.contains("\"displayName\":\"The Pioneers\""));
        assert!(json.contains("\"order\":1"));
        assert!(!json.contains("metadata"));
    }
}
