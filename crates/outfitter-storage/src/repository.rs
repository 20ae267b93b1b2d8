//! Repository for SQLite-backed product persistence.
//!
//! Operates on the Database struct using raw SQL. The repository owns all
//! SQL touching the products table; nothing else in the workspace writes
//! to it.

use std::sync::Arc;

use rusqlite::OptionalExtension;
use serde::{Deserialize, Serialize};

use outfitter_core::error::OutfitterError;
use outfitter_core::types::ProductRecord;

use crate::db::Database;

/// Writable product fields, used for both create and update.
///
/// The id is never part of this payload; it is assigned by the database on
/// insert and immutable afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub image_url: String,
}

/// Repository for product catalog entries.
pub struct ProductRepository {
    db: Arc<Database>,
}

impl ProductRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Insert a new product and return the stored record with its
    /// assigned id.
    pub fn insert(&self, product: &NewProduct) -> Result<ProductRecord, OutfitterError> {
        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO products (name, description, price, image_url)
                 VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![
                    product.name,
                    product.description,
                    product.price,
                    product.image_url,
                ],
            )
            .map_err(|e| OutfitterError::Storage(format!("Failed to insert product: {}", e)))?;

            let id = conn.last_insert_rowid();
            Ok(ProductRecord {
                id,
                name: product.name.clone(),
                description: product.description.clone(),
                price: product.price,
                image_url: product.image_url.clone(),
            })
        })
    }

    /// List every product, ordered by id ascending.
    pub fn list_all(&self) -> Result<Vec<ProductRecord>, OutfitterError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT id, name, description, price, image_url
                     FROM products ORDER BY id ASC",
                )
                .map_err(|e| OutfitterError::Storage(e.to_string()))?;

            let rows = stmt
                .query_map([], row_to_product)
                .map_err(|e| OutfitterError::Storage(e.to_string()))?;

            let mut products = Vec::new();
            for row in rows {
                products.push(row.map_err(|e| OutfitterError::Storage(e.to_string()))?);
            }
            Ok(products)
        })
    }

    /// Find a product by id.
    pub fn find_by_id(&self, id: i64) -> Result<Option<ProductRecord>, OutfitterError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT id, name, description, price, image_url
                     FROM products WHERE id = ?1",
                )
                .map_err(|e| OutfitterError::Storage(e.to_string()))?;

            stmt.query_row(rusqlite::params![id], row_to_product)
                .optional()
                .map_err(|e| OutfitterError::Storage(e.to_string()))
        })
    }

    /// Update the writable fields of an existing product.
    ///
    /// Returns false if no product with that id exists. The id itself is
    /// never rewritten.
    pub fn update(&self, id: i64, product: &NewProduct) -> Result<bool, OutfitterError> {
        self.db.with_conn(|conn| {
            let affected = conn
                .execute(
                    "UPDATE products
                     SET name = ?1, description = ?2, price = ?3, image_url = ?4
                     WHERE id = ?5",
                    rusqlite::params![
                        product.name,
                        product.description,
                        product.price,
                        product.image_url,
                        id,
                    ],
                )
                .map_err(|e| OutfitterError::Storage(format!("Failed to update product: {}", e)))?;
            Ok(affected == 1)
        })
    }

    /// Delete a product by id. Returns false if it did not exist.
    pub fn delete(&self, id: i64) -> Result<bool, OutfitterError> {
        self.db.with_conn(|conn| {
            let affected = conn
                .execute("DELETE FROM products WHERE id = ?1", rusqlite::params![id])
                .map_err(|e| OutfitterError::Storage(format!("Failed to delete product: {}", e)))?;
            Ok(affected == 1)
        })
    }

    /// Count products in the catalog.
    pub fn count(&self) -> Result<u64, OutfitterError> {
        self.db.with_conn(|conn| {
            let count: i64 = conn
                .query_row("SELECT COUNT(*) FROM products", [], |row| row.get(0))
                .map_err(|e| OutfitterError::Storage(e.to_string()))?;
            Ok(count as u64)
        })
    }
}

fn row_to_product(row: &rusqlite::Row<'_>) -> rusqlite::Result<ProductRecord> {
    Ok(ProductRecord {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        price: row.get(3)?,
        image_url: row.get(4)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_repo() -> ProductRepository {
        ProductRepository::new(Arc::new(Database::in_memory().unwrap()))
    }

    fn tent() -> NewProduct {
        NewProduct {
            name: "Tent".to_string(),
            description: "A waterproof tent".to_string(),
            price: 199.99,
            image_url: "tent.png".to_string(),
        }
    }

    #[test]
    fn test_insert_assigns_id() {
        let repo = make_repo();
        let stored = repo.insert(&tent()).unwrap();

        assert_eq!(stored.id, 1);
        assert_eq!(stored.name, "Tent");
        assert!((stored.price - 199.99).abs() < f64::EPSILON);
    }

    #[test]
    fn test_find_by_id() {
        let repo = make_repo();
        let stored = repo.insert(&tent()).unwrap();

        let found = repo.find_by_id(stored.id).unwrap().unwrap();
        assert_eq!(found, stored);
    }

    #[test]
    fn test_find_missing_returns_none() {
        let repo = make_repo();
        assert!(repo.find_by_id(999).unwrap().is_none());
    }

    #[test]
    fn test_list_all_ordered_by_id() {
        let repo = make_repo();
        repo.insert(&NewProduct {
            name: "Zulu".to_string(),
            description: "last alphabetically".to_string(),
            price: 1.0,
            image_url: String::new(),
        })
        .unwrap();
        repo.insert(&tent()).unwrap();

        let all = repo.list_all().unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, 1);
        assert_eq!(all[0].name, "Zulu");
        assert_eq!(all[1].id, 2);
    }

    #[test]
    fn test_update_changes_fields_keeps_id() {
        let repo = make_repo();
        let stored = repo.insert(&tent()).unwrap();

        let revised = NewProduct {
            name: "Tent MkII".to_string(),
            description: "An even more waterproof tent".to_string(),
            price: 249.5,
            image_url: "tent2.png".to_string(),
        };
        let updated = repo.update(stored.id, &revised).unwrap();
        assert!(updated);

        let found = repo.find_by_id(stored.id).unwrap().unwrap();
        assert_eq!(found.id, stored.id);
        assert_eq!(found.name, "Tent MkII");
        assert!((found.price - 249.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_update_missing_returns_false() {
        let repo = make_repo();
        assert!(!repo.update(42, &tent()).unwrap());
    }

    #[test]
    fn test_delete() {
        let repo = make_repo();
        let stored = repo.insert(&tent()).unwrap();

        assert!(repo.delete(stored.id).unwrap());
        assert!(repo.find_by_id(stored.id).unwrap().is_none());
        assert!(!repo.delete(stored.id).unwrap());
    }

    #[test]
    fn test_count() {
        let repo = make_repo();
        assert_eq!(repo.count().unwrap(), 0);

        repo.insert(&tent()).unwrap();
        repo.insert(&tent()).unwrap();
        assert_eq!(repo.count().unwrap(), 2);
    }

    #[test]
    fn test_new_product_deserialize_defaults() {
        let json = r#"{"name": "Minimal"}"#;
        let product: NewProduct = serde_json::from_str(json).unwrap();
        assert_eq!(product.name, "Minimal");
        assert_eq!(product.description, "");
        assert_eq!(product.price, 0.0);
        assert_eq!(product.image_url, "");
    }
}
