//! Product collection document.
//!
//! The whole collection lives in a single JSON array document. Callers always read and write
//! the full collection; there is no partial or incremental access.
//!
//! Writes go to a hidden sibling file which is then renamed over the document, so readers see
//! either the previous collection or the new one, never a truncated file.

use crate::constants::EMPTY_COLLECTION;
use crate::product::Product;
use crate::{CatalogError, CatalogResult};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Reads and writes the product collection document.
#[derive(Clone, Debug)]
pub struct ProductStore {
    path: PathBuf,
}

impl ProductStore {
    /// Opens the document at `path`, creating it (and its parent directory) as an empty
    /// collection if it does not exist yet.
    ///
    /// # Errors
    ///
    /// - [`CatalogError::DirCreation`] if the parent directory cannot be created
    /// - [`CatalogError::StorageUnavailable`] if the empty document cannot be written
    pub fn open(path: &Path) -> CatalogResult<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| CatalogError::DirCreation {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        match fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
        {
            Ok(mut file) => {
                file.write_all(EMPTY_COLLECTION.as_bytes())
                    .map_err(CatalogError::StorageUnavailable)?;
                tracing::info!("created empty product collection at {}", path.display());
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {}
            Err(e) => return Err(CatalogError::StorageUnavailable(e)),
        }

        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    /// Reads and parses the full collection.
    ///
    /// # Errors
    ///
    /// - [`CatalogError::StorageUnavailable`] if the document cannot be read
    /// - [`CatalogError::StorageCorrupt`] if it is not a well-formed (UTF-8 JSON) product array
    pub fn load(&self) -> CatalogResult<Vec<Product>> {
        let raw = fs::read(&self.path).map_err(CatalogError::StorageUnavailable)?;
        serde_json::from_slice(&raw).map_err(CatalogError::StorageCorrupt)
    }

    /// Serialises the full collection and replaces the document with it.
    ///
    /// # Errors
    ///
    /// - [`CatalogError::Serialization`] if the collection cannot be serialised
    /// - [`CatalogError::StorageUnavailable`] if writing or renaming fails
    pub fn save(&self, products: &[Product]) -> CatalogResult<()> {
        let mut raw = serde_json::to_string_pretty(products).map_err(CatalogError::Serialization)?;
        raw.push('\n');

        let tmp = self.tmp_path();
        let written = fs::File::create(&tmp)
            .and_then(|mut file| {
                file.write_all(raw.as_bytes())?;
                file.sync_all()
            })
            .and_then(|()| fs::rename(&tmp, &self.path));

        if let Err(e) = written {
            let _ = fs::remove_file(&tmp);
            return Err(CatalogError::StorageUnavailable(e));
        }

        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "products.json".into());
        self.path.with_file_name(format!(".{}.tmp", name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{NonEmptyText, ProductId};
    use tempfile::TempDir;

    fn product(id: &str, name: &str) -> Product {
        Product {
            id: ProductId::parse(id).unwrap(),
            name: NonEmptyText::new(name).unwrap(),
            category: NonEmptyText::new("Stationery").unwrap(),
            price: 19.99,
            image: Some(format!("/uploads/{}.png", id)),
            description: NonEmptyText::new("Writing things").unwrap(),
        }
    }

    #[test]
    fn test_open_seeds_empty_collection() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("data").join("products.json");

        let store = ProductStore::open(&path).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "[]\n");
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_open_keeps_existing_document() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("products.json");
        let store = ProductStore::open(&path).unwrap();
        store.save(&[product("100001", "Pen")]).unwrap();

        let reopened = ProductStore::open(&path).unwrap();
        assert_eq!(reopened.load().unwrap().len(), 1);
    }

    #[test]
    fn test_save_preserves_order_and_values() {
        let temp = TempDir::new().unwrap();
        let store = ProductStore::open(&temp.path().join("products.json")).unwrap();

        let products = vec![
            product("300003", "Pencil"),
            product("100001", "Pen"),
            product("200002", "Eraser"),
        ];
        store.save(&products).unwrap();

        assert_eq!(store.load().unwrap(), products);
    }

    #[test]
    fn test_save_writes_pretty_json_and_leaves_no_tmp_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("products.json");
        let store = ProductStore::open(&path).unwrap();

        store.save(&[product("100001", "Pen")]).unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.starts_with("[\n  {\n    \"id\": \"100001\""));
        assert!(raw.contains("\"harga\": 19.99"));
        assert!(raw.ends_with("]\n"));
        assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_load_corrupt_document() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("products.json");
        let store = ProductStore::open(&path).unwrap();

        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(store.load(), Err(CatalogError::StorageCorrupt(_))));

        fs::write(&path, r#"[{"id":"1"}]"#).unwrap();
        assert!(matches!(store.load(), Err(CatalogError::StorageCorrupt(_))));

        fs::write(&path, [0xff, 0xfe, b'[', b']']).unwrap();
        assert!(matches!(store.load(), Err(CatalogError::StorageCorrupt(_))));
    }

    #[test]
    fn test_load_missing_document() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("products.json");
        let store = ProductStore::open(&path).unwrap();

        fs::remove_file(&path).unwrap();
        assert!(matches!(
            store.load(),
            Err(CatalogError::StorageUnavailable(_))
        ));
    }
}
