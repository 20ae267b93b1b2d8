//! Starter catalog seeding.
//!
//! A fresh database gets a small outdoor-gear catalog so the service is
//! searchable out of the box. Seeding only runs against an empty products
//! table, so restarting never duplicates rows.

use tracing::{debug, info};

use outfitter_core::error::OutfitterError;

use crate::repository::{NewProduct, ProductRepository};

/// The built-in catalog inserted into an empty database.
fn starter_catalog() -> Vec<NewProduct> {
    let items = [
        (
            "Alpine Ridge Tent",
            "A four-season two-person tent with a waterproof fly and aluminum poles",
            199.99,
        ),
        (
            "Switchback 60 Backpack",
            "A 60 liter internal-frame pack with an adjustable harness and rain cover",
            89.99,
        ),
        (
            "Ember Camping Stove",
            "A compact canister stove that boils a liter of water in under four minutes",
            44.95,
        ),
        (
            "Firefly Lantern",
            "A rechargeable LED lantern with a dimmable warm light and USB output",
            24.5,
        ),
        (
            "Cascade Rain Jacket",
            "A breathable three-layer shell with taped seams and pit zips",
            129.0,
        ),
        (
            "Summit Trekking Poles",
            "Collapsible carbon trekking poles with cork grips and tungsten tips",
            59.99,
        ),
        (
            "Drift Sleeping Bag",
            "A 15 degree down sleeping bag with a draft collar and compression sack",
            149.5,
        ),
        (
            "Basecamp Cook Set",
            "A nested aluminum cook set with two pots, a pan and folding handles",
            39.99,
        ),
        (
            "Lookout Binoculars",
            "Compact 10x42 binoculars with fully multi-coated lenses and a tripod mount",
            74.25,
        ),
    ];

    items
        .into_iter()
        .map(|(name, description, price)| NewProduct {
            name: name.to_string(),
            description: description.to_string(),
            price,
            image_url: String::new(),
        })
        .collect()
}

/// Insert the starter catalog if the products table is empty.
///
/// Returns the number of products inserted (zero when the table already
/// has rows).
pub fn seed_catalog(repo: &ProductRepository) -> Result<usize, OutfitterError> {
    let existing = repo.count()?;
    if existing > 0 {
        debug!(existing, "Catalog already populated, skipping seed");
        return Ok(0);
    }

    let catalog = starter_catalog();
    let seeded = catalog.len();
    for product in &catalog {
        repo.insert(product)?;
    }

    info!(seeded, "Seeded starter catalog");
    Ok(seeded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use std::sync::Arc;

    fn make_repo() -> ProductRepository {
        ProductRepository::new(Arc::new(Database::in_memory().unwrap()))
    }

    #[test]
    fn test_seed_populates_empty_catalog() {
        let repo = make_repo();
        let seeded = seed_catalog(&repo).unwrap();

        assert_eq!(seeded, 9);
        assert_eq!(repo.count().unwrap(), 9);
    }

    #[test]
    fn test_seed_is_idempotent() {
        let repo = make_repo();
        seed_catalog(&repo).unwrap();

        let second = seed_catalog(&repo).unwrap();
        assert_eq!(second, 0);
        assert_eq!(repo.count().unwrap(), 9);
    }

    #[test]
    fn test_seed_skips_nonempty_catalog() {
        let repo = make_repo();
        repo.insert(&NewProduct {
            name: "Existing".to_string(),
            description: "Already here".to_string(),
            price: 1.0,
            image_url: String::new(),
        })
        .unwrap();

        let seeded = seed_catalog(&repo).unwrap();
        assert_eq!(seeded, 0);
        assert_eq!(repo.count().unwrap(), 1);
    }

    #[test]
    fn test_seeded_products_are_indexable() {
        let repo = make_repo();
        seed_catalog(&repo).unwrap();

        // Every seeded product needs a non-blank description; an empty one
        // is rejected by the embedder and would abort the startup rebuild.
        for product in repo.list_all().unwrap() {
            assert!(!product.description.trim().is_empty(), "{}", product.name);
            assert!(product.price > 0.0, "{}", product.name);
        }
    }
}
