use serde::{Deserialize, Serialize};

/// Response text returned when the catalog index has nothing to offer
/// for a query.
pub const NO_MATCH_TEXT: &str = "No matching products found.";

/// A product in the catalog.
///
/// `id` is the SQLite rowid and doubles as the key of the product's entry
/// in the vector index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub price: f64,
    #[serde(default)]
    pub image_url: String,
}

impl ProductRecord {
    pub fn new(
        id: i64,
        name: impl Into<String>,
        description: impl Into<String>,
        price: f64,
        image_url: impl Into<String>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            description: description.into(),
            price,
            image_url: image_url.into(),
        }
    }
}

/// The answer handed back to a search caller: generated (or fallback)
/// text plus the catalog records it talks about.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub response: String,
    pub products: Vec<ProductRecord>,
}

impl SearchResponse {
    /// A response backed by a matched product.
    pub fn matched(response: impl Into<String>, product: ProductRecord) -> Self {
        Self {
            response: response.into(),
            products: vec![product],
        }
    }

    /// The fixed response for a query with no catalog match. Not an
    /// error; callers receive this with an empty product list.
    pub fn no_match() -> Self {
        Self {
            response: NO_MATCH_TEXT.to_string(),
            products: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_product() -> ProductRecord {
        ProductRecord::new(
            1,
            "Trailhead Tent",
            "A two-person tent with a waterproof fly.",
            199.99,
            "https://example.test/img/tent.png",
        )
    }

    #[test]
    fn test_product_record_new() {
        let product = sample_product();
        assert_eq!(product.id, 1);
        assert_eq!(product.name, "Trailhead Tent");
        assert!((product.price - 199.99).abs() < f64::EPSILON);
    }

    #[test]
    fn test_product_record_serde_roundtrip() {
        let product = sample_product();
        let json = serde_json::to_string(&product).unwrap();
        let back: ProductRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, product);
    }

    #[test]
    fn test_product_record_missing_image_url_defaults_empty() {
        let json = r#"{"id": 7, "name": "Lantern", "description": "Bright.", "price": 12.5}"#;
        let product: ProductRecord = serde_json::from_str(json).unwrap();
        assert_eq!(product.id, 7);
        assert_eq!(product.image_url, "");
    }

    #[test]
    fn test_search_response_matched() {
        let response = SearchResponse::matched("Try the Trailhead Tent.", sample_product());
        assert_eq!(response.response, "Try the Trailhead Tent.");
        assert_eq!(response.products.len(), 1);
        assert_eq!(response.products[0].id, 1);
    }

    #[test]
    fn test_search_response_no_match() {
        let response = SearchResponse::no_match();
        assert_eq!(response.response, NO_MATCH_TEXT);
        assert!(response.products.is_empty());
    }

    #[test]
    fn test_search_response_wire_shape() {
        let response = SearchResponse::matched("Answer text", sample_product());
        let value: serde_json::Value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["response"], "Answer text");
        assert!(value["products"].is_array());
        assert_eq!(value["products"][0]["name"], "Trailhead Tent");
        // No stray top-level fields
        let object = value.as_object().unwrap();
        assert_eq!(object.len(), 2);
    }
}
