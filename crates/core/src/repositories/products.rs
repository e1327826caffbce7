//! Product repository.
//!
//! This module implements create/read/update/delete over the product collection and keeps
//! each record consistent with its image file:
//!
//! - Every operation is one load, one mutation, one save of the full collection
//! - All operations on clones of one [`ProductRepository`] are serialised behind a shared
//!   mutex, so concurrent requests cannot interleave their load/save pairs and lose updates
//! - A record never references an image that was not written to disk first
//! - Images stored for a request that then fails (validation or save) are removed again
//! - A superseded or deleted image is removed only after the collection without it has been
//!   saved; removal failures are logged and never fail the operation
//!
//! ## Pure Data Operations
//!
//! This module contains **only** data operations. Multipart parsing, upload pre-validation and
//! response shaping belong in `api-rest`.

use crate::config::CoreConfig;
use crate::constants::MAX_ID_ATTEMPTS;
use crate::product::{Product, ProductFields};
use crate::store::ProductStore;
use crate::validation::ProductCandidate;
use crate::{CatalogError, CatalogResult, ProductId};
use catalog_images::{ImagesService, UploadedImage};
use std::fs;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug)]
struct Inner {
    store: ProductStore,
    images: ImagesService,
    lock: Mutex<()>,
}

/// Service for managing product records and their images.
///
/// Cheap to clone; clones share the same document, uploads directory and lock.
#[derive(Clone, Debug)]
pub struct ProductRepository {
    cfg: Arc<CoreConfig>,
    inner: Arc<Inner>,
}

impl ProductRepository {
    /// Opens the repository described by `cfg`.
    ///
    /// Creates the uploads directory and an empty collection document if they are missing.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if:
    /// - the uploads directory cannot be created ([`CatalogError::DirCreation`])
    /// - the collection document cannot be created ([`CatalogError::StorageUnavailable`])
    /// - the uploads directory cannot be opened ([`CatalogError::Image`])
    pub fn open(cfg: Arc<CoreConfig>) -> CatalogResult<Self> {
        fs::create_dir_all(cfg.uploads_dir()).map_err(|source| CatalogError::DirCreation {
            path: cfg.uploads_dir().to_path_buf(),
            source,
        })?;

        let store = ProductStore::open(cfg.data_file())?;
        let images = ImagesService::new(cfg.uploads_dir())?;

        Ok(Self {
            cfg,
            inner: Arc::new(Inner {
                store,
                images,
                lock: Mutex::new(()),
            }),
        })
    }

    pub fn config(&self) -> &CoreConfig {
        &self.cfg
    }

    pub fn images(&self) -> &ImagesService {
        &self.inner.images
    }

    /// Creates a product.
    ///
    /// A fresh id is drawn and checked against the collection. When `upload` is given it is
    /// stored first and its reference becomes the record's `image`.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if:
    /// - the candidate fails validation ([`CatalogError::ValidationFailed`]); the stored
    ///   upload is removed again and nothing is persisted
    /// - no unused id could be drawn ([`CatalogError::IdAllocationFailed`])
    /// - the upload cannot be stored ([`CatalogError::Image`])
    /// - the collection cannot be loaded or saved
    pub fn create(
        &self,
        fields: ProductFields,
        upload: Option<&UploadedImage>,
    ) -> CatalogResult<Product> {
        let _guard = self.lock();
        let mut products = self.inner.store.load()?;

        let id = allocate_id(&products, ProductId::generate)?;
        let new_image = self.store_upload(&id, upload)?;

        let candidate = ProductCandidate::from_fields(id, &fields, new_image.clone());
        let product = match candidate.into_product() {
            Ok(product) => product,
            Err(errors) => {
                self.discard_image(new_image.as_deref());
                return Err(CatalogError::ValidationFailed(errors));
            }
        };

        products.push(product.clone());
        if let Err(e) = self.inner.store.save(&products) {
            self.discard_image(new_image.as_deref());
            return Err(e);
        }

        tracing::info!("created product {}", product.id);
        Ok(product)
    }

    /// Lists every product, with image references materialised against `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NoProducts`] if the collection is empty, or a storage error.
    pub fn list(&self, base_url: &str) -> CatalogResult<Vec<Product>> {
        let products = {
            let _guard = self.lock();
            self.inner.store.load()?
        };

        if products.is_empty() {
            return Err(CatalogError::NoProducts);
        }

        Ok(products
            .into_iter()
            .map(|p| self.materialized(p, base_url))
            .collect())
    }

    /// Fetches one product, with its image reference materialised against `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] if no record has `id`, or a storage error.
    pub fn get(&self, id: &str, base_url: &str) -> CatalogResult<Product> {
        let products = {
            let _guard = self.lock();
            self.inner.store.load()?
        };

        products
            .into_iter()
            .find(|p| p.id.as_str() == id)
            .map(|p| self.materialized(p, base_url))
            .ok_or_else(|| CatalogError::NotFound(id.to_string()))
    }

    /// Updates a product in place.
    ///
    /// See [`ProductCandidate::merged`] for how request fields combine with the stored record.
    /// When `upload` is given it replaces the image; the previous file is removed after the
    /// collection has been saved.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if:
    /// - no record has `id` ([`CatalogError::NotFound`])
    /// - the merged candidate fails validation ([`CatalogError::ValidationFailed`]); the new
    ///   upload is removed again and the stored record is untouched
    /// - the upload cannot be stored, or the collection cannot be loaded or saved
    pub fn update(
        &self,
        id: &str,
        fields: ProductFields,
        upload: Option<&UploadedImage>,
    ) -> CatalogResult<Product> {
        let _guard = self.lock();
        let mut products = self.inner.store.load()?;

        let index = products
            .iter()
            .position(|p| p.id.as_str() == id)
            .ok_or_else(|| CatalogError::NotFound(id.to_string()))?;

        let new_image = self.store_upload(&products[index].id, upload)?;

        let candidate = ProductCandidate::merged(&products[index], &fields, new_image.clone());
        let updated = match candidate.into_product() {
            Ok(product) => product,
            Err(errors) => {
                self.discard_image(new_image.as_deref());
                return Err(CatalogError::ValidationFailed(errors));
            }
        };

        let superseded = match &new_image {
            Some(_) => products[index].image.clone(),
            None => None,
        };

        products[index] = updated.clone();
        if let Err(e) = self.inner.store.save(&products) {
            self.discard_image(new_image.as_deref());
            return Err(e);
        }

        if let Some(old) = superseded.filter(|old| Some(old) != new_image.as_ref()) {
            self.discard_image(Some(old.as_str()));
        }

        tracing::info!("updated product {}", updated.id);
        Ok(updated)
    }

    /// Deletes a product and its image file.
    ///
    /// Every record carrying `id` is removed. Image files are removed after the collection has
    /// been saved; failures to remove them are logged and do not fail the deletion.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] if no record has `id`, or a storage error.
    pub fn delete(&self, id: &str) -> CatalogResult<()> {
        let _guard = self.lock();
        let products = self.inner.store.load()?;

        let (removed, kept): (Vec<Product>, Vec<Product>) =
            products.into_iter().partition(|p| p.id.as_str() == id);

        if removed.is_empty() {
            return Err(CatalogError::NotFound(id.to_string()));
        }

        self.inner.store.save(&kept)?;

        for product in &removed {
            self.discard_image(product.image.as_deref());
        }

        tracing::info!("deleted product {}", id);
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        // The mutex guards no data, so a poisoned lock is still usable.
        self.inner
            .lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn store_upload(
        &self,
        id: &ProductId,
        upload: Option<&UploadedImage>,
    ) -> CatalogResult<Option<String>> {
        let Some(upload) = upload else {
            return Ok(None);
        };

        let stored = self.inner.images.store(upload)?;
        tracing::info!(
            "stored image {} for product {} ({} bytes, {})",
            stored.reference,
            id,
            stored.size_bytes,
            stored.media_type.as_deref().unwrap_or("unknown type")
        );
        Ok(Some(stored.reference.into_string()))
    }

    fn discard_image(&self, reference: Option<&str>) {
        let Some(reference) = reference else {
            return;
        };

        if let Err(e) = self.inner.images.remove(reference) {
            tracing::warn!("image cleanup failed, leaving orphan: {}", e);
        }
    }

    fn materialized(&self, mut product: Product, base_url: &str) -> Product {
        product.image = product
            .image
            .map(|reference| self.inner.images.materialize(&reference, base_url));
        product
    }
}

/// Draws ids from `id_source` until one is not used by `products`.
///
/// Guards against the (rare) collision of a random six-digit id with an existing record by
/// limiting retries.
fn allocate_id(
    products: &[Product],
    mut id_source: impl FnMut() -> ProductId,
) -> CatalogResult<ProductId> {
    for _attempt in 0..MAX_ID_ATTEMPTS {
        let id = id_source();
        if !products.iter().any(|p| p.id == id) {
            return Ok(id);
        }
    }

    Err(CatalogError::IdAllocationFailed(MAX_ID_ATTEMPTS))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::FieldError;
    use crate::NonEmptyText;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    const PNG_HEADER: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
    const BASE_URL: &str = "http://localhost:3000";

    fn repository(temp: &TempDir) -> ProductRepository {
        let cfg = CoreConfig::new(
            temp.path().join("data").join("products.json"),
            temp.path().join("uploads"),
        )
        .unwrap();
        ProductRepository::open(Arc::new(cfg)).unwrap()
    }

    fn pen_fields() -> ProductFields {
        ProductFields {
            name: Some("Pen".into()),
            category: Some("Stationery".into()),
            price: Some("2.5".into()),
            description: Some("Blue ink pen".into()),
        }
    }

    fn png(name: &str) -> UploadedImage {
        UploadedImage::new(PNG_HEADER.to_vec(), Some(name.into()), Some("image/png".into()))
    }

    fn uploads(temp: &TempDir) -> Vec<PathBuf> {
        fs::read_dir(temp.path().join("uploads"))
            .unwrap()
            .map(|e| e.unwrap().path())
            .collect()
    }

    fn file_for(repo: &ProductRepository, reference: &str) -> PathBuf {
        repo.images().path_for(reference).unwrap()
    }

    fn raw_document(temp: &TempDir) -> String {
        fs::read_to_string(temp.path().join("data").join("products.json")).unwrap()
    }

    #[test]
    fn test_open_creates_layout() {
        let temp = TempDir::new().unwrap();
        let repo = repository(&temp);

        assert!(temp.path().join("uploads").is_dir());
        assert_eq!(raw_document(&temp), "[]\n");
        assert!(repo.config().data_file().ends_with("products.json"));
    }

    #[test]
    fn test_create_assigns_id_and_stores_image() {
        let temp = TempDir::new().unwrap();
        let repo = repository(&temp);

        let product = repo.create(pen_fields(), Some(&png("pen.png"))).unwrap();

        assert!(ProductId::is_canonical(product.id.as_str()));
        assert_eq!(product.price, 2.5);
        let image = product.image.clone().unwrap();
        assert!(image.starts_with("/uploads/"));
        assert!(file_for(&repo, &image).exists());

        let fetched = repo.get(product.id.as_str(), BASE_URL).unwrap();
        assert_eq!(fetched.name, product.name);
        assert_eq!(
            fetched.image.unwrap(),
            format!("{}{}", BASE_URL, image)
        );
    }

    #[test]
    fn test_create_persists_relative_reference() {
        let temp = TempDir::new().unwrap();
        let repo = repository(&temp);

        let product = repo.create(pen_fields(), Some(&png("pen.png"))).unwrap();
        repo.list(BASE_URL).unwrap();

        let raw = raw_document(&temp);
        assert!(raw.contains(&format!("\"image\": \"{}\"", product.image.unwrap())));
        assert!(!raw.contains("http://"));
    }

    #[test]
    fn test_create_validation_failure_persists_nothing_and_removes_upload() {
        let temp = TempDir::new().unwrap();
        let repo = repository(&temp);

        let mut fields = pen_fields();
        fields.price = Some("abc".into());
        fields.name = Some("".into());

        let result = repo.create(fields, Some(&png("pen.png")));

        match result {
            Err(CatalogError::ValidationFailed(errors)) => assert_eq!(
                errors,
                vec![FieldError::MissingName, FieldError::InvalidPrice]
            ),
            other => panic!("expected validation failure, got {:?}", other),
        }
        assert_eq!(raw_document(&temp), "[]\n");
        assert!(uploads(&temp).is_empty());
    }

    #[test]
    fn test_create_without_image_is_rejected() {
        let temp = TempDir::new().unwrap();
        let repo = repository(&temp);

        let result = repo.create(pen_fields(), None);
        assert!(matches!(
            result,
            Err(CatalogError::ValidationFailed(ref errors)) if errors == &vec![FieldError::MissingImage]
        ));
    }

    #[test]
    fn test_list_empty_collection() {
        let temp = TempDir::new().unwrap();
        let repo = repository(&temp);

        assert!(matches!(repo.list(BASE_URL), Err(CatalogError::NoProducts)));
    }

    #[test]
    fn test_list_returns_all_in_insertion_order_with_urls() {
        let temp = TempDir::new().unwrap();
        let repo = repository(&temp);

        let mut names = Vec::new();
        for name in ["Pen", "Pencil", "Eraser"] {
            let mut fields = pen_fields();
            fields.name = Some(name.into());
            repo.create(fields, Some(&png("x.png"))).unwrap();
            names.push(name);
        }

        let listed = repo.list("https://shop.example").unwrap();
        assert_eq!(
            listed.iter().map(|p| p.name.as_str()).collect::<Vec<_>>(),
            names
        );
        for product in listed {
            assert!(product
                .image
                .unwrap()
                .starts_with("https://shop.example/uploads/"));
        }
    }

    #[test]
    fn test_get_unknown_id() {
        let temp = TempDir::new().unwrap();
        let repo = repository(&temp);
        repo.create(pen_fields(), Some(&png("pen.png"))).unwrap();

        assert!(matches!(
            repo.get("000000", BASE_URL),
            Err(CatalogError::NotFound(ref id)) if id == "000000"
        ));
    }

    #[test]
    fn test_update_keeps_omitted_fields_and_sets_exact_price() {
        let temp = TempDir::new().unwrap();
        let repo = repository(&temp);
        let created = repo.create(pen_fields(), Some(&png("pen.png"))).unwrap();

        let update = ProductFields {
            price: Some("19.99".into()),
            ..ProductFields::default()
        };
        let updated = repo.update(created.id.as_str(), update, None).unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.price, 19.99);
        assert_eq!(updated.name.as_str(), "Pen");
        assert_eq!(updated.category.as_str(), "Stationery");
        assert_eq!(updated.description.as_str(), "Blue ink pen");
        assert_eq!(updated.image, created.image);
    }

    #[test]
    fn test_update_preserves_position() {
        let temp = TempDir::new().unwrap();
        let repo = repository(&temp);
        let first = repo.create(pen_fields(), Some(&png("a.png"))).unwrap();
        repo.create(pen_fields(), Some(&png("b.png"))).unwrap();

        let update = ProductFields {
            name: Some("Fountain pen".into()),
            ..ProductFields::default()
        };
        repo.update(first.id.as_str(), update, None).unwrap();

        let listed = repo.list(BASE_URL).unwrap();
        assert_eq!(listed[0].id, first.id);
        assert_eq!(listed[0].name.as_str(), "Fountain pen");
    }

    #[test]
    fn test_update_replaces_image_and_removes_old_file() {
        let temp = TempDir::new().unwrap();
        let repo = repository(&temp);
        let created = repo.create(pen_fields(), Some(&png("old.png"))).unwrap();
        let old = created.image.clone().unwrap();

        let updated = repo
            .update(
                created.id.as_str(),
                ProductFields::default(),
                Some(&png("new.png")),
            )
            .unwrap();
        let new = updated.image.unwrap();

        assert_ne!(old, new);
        assert!(!file_for(&repo, &old).exists());
        assert!(file_for(&repo, &new).exists());
        assert_eq!(uploads(&temp).len(), 1);
    }

    #[test]
    fn test_update_validation_failure_keeps_record_and_old_image() {
        let temp = TempDir::new().unwrap();
        let repo = repository(&temp);
        let created = repo.create(pen_fields(), Some(&png("old.png"))).unwrap();
        let before = raw_document(&temp);

        let update = ProductFields {
            price: Some("abc".into()),
            ..ProductFields::default()
        };
        let result = repo.update(created.id.as_str(), update, Some(&png("new.png")));

        assert!(matches!(
            result,
            Err(CatalogError::ValidationFailed(ref errors)) if errors == &vec![FieldError::InvalidPrice]
        ));
        assert_eq!(raw_document(&temp), before);
        let files = uploads(&temp);
        assert_eq!(files.len(), 1);
        assert_eq!(
            files[0].file_name(),
            file_for(&repo, &created.image.unwrap()).file_name()
        );
    }

    /// Makes every later save fail by occupying the temp file path with a directory.
    fn block_saves(temp: &TempDir) {
        fs::create_dir(temp.path().join("data").join(".products.json.tmp")).unwrap();
    }

    #[test]
    fn test_create_save_failure_removes_upload() {
        let temp = TempDir::new().unwrap();
        let repo = repository(&temp);
        block_saves(&temp);

        let result = repo.create(pen_fields(), Some(&png("pen.png")));

        assert!(matches!(result, Err(CatalogError::StorageUnavailable(_))));
        assert!(uploads(&temp).is_empty());
        assert_eq!(raw_document(&temp), "[]\n");
    }

    #[test]
    fn test_update_save_failure_keeps_old_image() {
        let temp = TempDir::new().unwrap();
        let repo = repository(&temp);
        let created = repo.create(pen_fields(), Some(&png("old.png"))).unwrap();
        let old_path = file_for(&repo, created.image.as_deref().unwrap());
        let before = raw_document(&temp);
        block_saves(&temp);

        let result = repo.update(
            created.id.as_str(),
            ProductFields::default(),
            Some(&png("new.png")),
        );

        assert!(matches!(result, Err(CatalogError::StorageUnavailable(_))));
        assert!(old_path.exists());
        let files = uploads(&temp);
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].file_name(), old_path.file_name());
        assert_eq!(raw_document(&temp), before);
    }

    #[test]
    fn test_update_unknown_id_stores_nothing() {
        let temp = TempDir::new().unwrap();
        let repo = repository(&temp);

        let result = repo.update("123456", pen_fields(), Some(&png("pen.png")));

        assert!(matches!(result, Err(CatalogError::NotFound(_))));
        assert!(uploads(&temp).is_empty());
    }

    #[test]
    fn test_delete_removes_record_and_image() {
        let temp = TempDir::new().unwrap();
        let repo = repository(&temp);
        let created = repo.create(pen_fields(), Some(&png("pen.png"))).unwrap();
        let image_path = file_for(&repo, created.image.as_deref().unwrap());

        repo.delete(created.id.as_str()).unwrap();

        assert!(matches!(
            repo.get(created.id.as_str(), BASE_URL),
            Err(CatalogError::NotFound(_))
        ));
        assert!(!image_path.exists());
        assert_eq!(raw_document(&temp), "[]\n");
    }

    #[test]
    fn test_delete_succeeds_when_image_file_is_missing() {
        let temp = TempDir::new().unwrap();
        let repo = repository(&temp);
        let created = repo.create(pen_fields(), Some(&png("pen.png"))).unwrap();
        fs::remove_file(file_for(&repo, created.image.as_deref().unwrap())).unwrap();

        repo.delete(created.id.as_str()).unwrap();

        assert!(matches!(repo.list(BASE_URL), Err(CatalogError::NoProducts)));
    }

    #[test]
    fn test_delete_unknown_id() {
        let temp = TempDir::new().unwrap();
        let repo = repository(&temp);

        assert!(matches!(
            repo.delete("999999"),
            Err(CatalogError::NotFound(_))
        ));
    }

    #[test]
    fn test_legacy_record_without_image_is_readable_and_deletable() {
        let temp = TempDir::new().unwrap();
        let repo = repository(&temp);
        fs::write(
            temp.path().join("data").join("products.json"),
            r#"[{"id":"100001","nama":"Old","kategori":"Misc","harga":3,"image":null,"deskripsi":"Legacy"}]"#,
        )
        .unwrap();

        let product = repo.get("100001", BASE_URL).unwrap();
        assert_eq!(product.image, None);

        let update = ProductFields {
            name: Some("Renamed".into()),
            ..ProductFields::default()
        };
        assert!(matches!(
            repo.update("100001", update, None),
            Err(CatalogError::ValidationFailed(_))
        ));

        repo.delete("100001").unwrap();
        assert!(matches!(repo.list(BASE_URL), Err(CatalogError::NoProducts)));
    }

    #[test]
    fn test_corrupt_document_fails_every_operation() {
        let temp = TempDir::new().unwrap();
        let repo = repository(&temp);
        fs::write(temp.path().join("data").join("products.json"), "not json").unwrap();

        assert!(matches!(
            repo.list(BASE_URL),
            Err(CatalogError::StorageCorrupt(_))
        ));
        assert!(matches!(
            repo.get("100001", BASE_URL),
            Err(CatalogError::StorageCorrupt(_))
        ));
        assert!(matches!(
            repo.create(pen_fields(), Some(&png("pen.png"))),
            Err(CatalogError::StorageCorrupt(_))
        ));
        assert!(matches!(
            repo.update("100001", pen_fields(), None),
            Err(CatalogError::StorageCorrupt(_))
        ));
        assert!(matches!(
            repo.delete("100001"),
            Err(CatalogError::StorageCorrupt(_))
        ));
        assert!(uploads(&temp).is_empty());
    }

    #[test]
    fn test_concurrent_creates_do_not_lose_updates() {
        let temp = TempDir::new().unwrap();
        let repo = repository(&temp);

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let repo = repo.clone();
                std::thread::spawn(move || {
                    let mut fields = pen_fields();
                    fields.name = Some(format!("Pen {}", i));
                    repo.create(fields, Some(&png("pen.png"))).unwrap()
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(repo.list(BASE_URL).unwrap().len(), 8);
        assert_eq!(uploads(&temp).len(), 8);
    }

    #[test]
    fn test_allocate_id_skips_taken_ids() {
        let taken = Product {
            id: ProductId::parse("111111").unwrap(),
            name: NonEmptyText::new("Pen").unwrap(),
            category: NonEmptyText::new("Stationery").unwrap(),
            price: 1.0,
            image: None,
            description: NonEmptyText::new("x").unwrap(),
        };

        let mut ids = vec!["222222", "111111"];
        let id = allocate_id(std::slice::from_ref(&taken), || {
            ProductId::parse(ids.pop().unwrap()).unwrap()
        })
        .unwrap();
        assert_eq!(id.as_str(), "222222");

        let result = allocate_id(&[taken], || ProductId::parse("111111").unwrap());
        assert!(matches!(
            result,
            Err(CatalogError::IdAllocationFailed(n)) if n == MAX_ID_ATTEMPTS
        ));
    }

    #[test]
    fn test_pen_scenario_end_to_end() {
        let temp = TempDir::new().unwrap();
        let repo = repository(&temp);

        let created = repo.create(pen_fields(), Some(&png("pen.png"))).unwrap();
        assert_eq!(created.price, 2.5);
        let reference = created.image.clone().unwrap();
        assert!(reference.starts_with("/uploads/"));

        let fetched = repo.get(created.id.as_str(), BASE_URL).unwrap();
        assert_eq!(
            fetched.image.as_deref(),
            Some(format!("http://localhost:3000{}", reference).as_str())
        );

        let path = file_for(&repo, &reference);
        repo.delete(created.id.as_str()).unwrap();
        assert!(!Path::new(&path).exists());
    }
}
