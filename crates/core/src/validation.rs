//! Candidate validation.
//!
//! A [`ProductCandidate`] is assembled from request input (merged with the stored record for
//! updates) and checked field by field before anything is persisted. Every failing field
//! contributes exactly one [`FieldError`], in declaration order: name, category, price,
//! description, image.

use crate::product::{Product, ProductFields};
use crate::{NonEmptyText, ProductId};

/// A single failed field rule. The display text is the message returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    #[error("Product name is required")]
    MissingName,
    #[error("Product category is required")]
    MissingCategory,
    #[error("Product price must be a number")]
    InvalidPrice,
    #[error("Product price must not be negative")]
    NegativePrice,
    #[error("Product description is required")]
    MissingDescription,
    #[error("Product image is required")]
    MissingImage,
}

/// A not-yet-validated, not-yet-persisted product.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductCandidate {
    pub id: ProductId,
    pub name: String,
    pub category: String,
    /// `None` when the submitted price did not parse.
    pub price: Option<f64>,
    pub description: String,
    pub image: Option<String>,
}

impl ProductCandidate {
    /// Builds the candidate for a new record.
    pub fn from_fields(id: ProductId, fields: &ProductFields, image: Option<String>) -> Self {
        Self {
            id,
            name: fields.name.clone().unwrap_or_default(),
            category: fields.category.clone().unwrap_or_default(),
            price: fields.price.as_deref().and_then(parse_price),
            description: fields.description.clone().unwrap_or_default(),
            image,
        }
    }

    /// Merges an update request onto a stored record.
    ///
    /// - Absent text fields keep the stored value; present ones replace it, blank included,
    ///   so a blank field fails validation instead of being silently ignored.
    /// - An absent or blank price keeps the stored price; any other value must parse.
    /// - The image changes only when `new_image` is supplied.
    ///
    /// Blank text fields and unparseable prices are reported as validation errors rather than
    /// silently falling back to the stored values.
    pub fn merged(stored: &Product, fields: &ProductFields, new_image: Option<String>) -> Self {
        let text = |incoming: &Option<String>, current: &NonEmptyText| {
            incoming
                .clone()
                .unwrap_or_else(|| current.as_str().to_string())
        };

        let price = match fields.price.as_deref() {
            Some(raw) if !raw.trim().is_empty() => parse_price(raw),
            _ => Some(stored.price),
        };

        Self {
            id: stored.id.clone(),
            name: text(&fields.name, &stored.name),
            category: text(&fields.category, &stored.category),
            price,
            description: text(&fields.description, &stored.description),
            image: new_image.or_else(|| stored.image.clone()),
        }
    }

    /// Validates the candidate and, if every rule passes, turns it into a record.
    ///
    /// # Errors
    ///
    /// Returns every failing field, in declaration order.
    pub fn into_product(self) -> Result<Product, Vec<FieldError>> {
        self.check()
    }

    fn check(&self) -> Result<Product, Vec<FieldError>> {
        let mut errors = Vec::new();

        let name = NonEmptyText::new(&self.name)
            .map_err(|_| errors.push(FieldError::MissingName))
            .ok();
        let category = NonEmptyText::new(&self.category)
            .map_err(|_| errors.push(FieldError::MissingCategory))
            .ok();

        let price = match self.price {
            Some(p) if !p.is_finite() => {
                errors.push(FieldError::InvalidPrice);
                None
            }
            Some(p) if p < 0.0 => {
                errors.push(FieldError::NegativePrice);
                None
            }
            Some(p) => Some(p),
            None => {
                errors.push(FieldError::InvalidPrice);
                None
            }
        };

        let description = NonEmptyText::new(&self.description)
            .map_err(|_| errors.push(FieldError::MissingDescription))
            .ok();

        let image = self
            .image
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty());
        if image.is_none() {
            errors.push(FieldError::MissingImage);
        }

        match (name, category, price, description, image) {
            (Some(name), Some(category), Some(price), Some(description), Some(image))
                if errors.is_empty() =>
            {
                Ok(Product {
                    id: self.id.clone(),
                    name,
                    category,
                    price,
                    image: Some(image.to_string()),
                    description,
                })
            }
            _ => Err(errors),
        }
    }
}

/// Checks a candidate and returns one message per failing field. Empty means valid.
pub fn validate(candidate: &ProductCandidate) -> Vec<FieldError> {
    candidate.check().err().unwrap_or_default()
}

/// Parses a submitted price.
///
/// Surrounding whitespace is ignored. Returns `None` for anything that is not a decimal
/// number; non-finite values parse and are left for [`validate`] to reject.
pub fn parse_price(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok()
}
