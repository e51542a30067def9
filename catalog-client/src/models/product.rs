use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: f64,
    pub category: CategoryRef,
    #[serde(default)]
    pub images: Vec<ProductImage>,
    #[serde(default)]
    pub specifications: BTreeMap<String, String>,
    #[serde(default)]
    pub stock: u32,
    #[serde(default = "default_min_order_quantity")]
    pub min_order_quantity: u32,
    #[serde(default = "active_by_default")]
    pub is_active: bool,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

fn default_min_order_quantity() -> u32 {
    1
}

fn active_by_default() -> bool {
    true
}

/// A product's category, either populated with name and slug or as a bare id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CategoryRef {
    Populated {
        #[serde(rename = "_id")]
        id: String,
        name: String,
        #[serde(default)]
        slug: Option<String>,
    },
    Id(String),
}

impl CategoryRef {
    pub fn id(&self) -> &str {
        match self {
            CategoryRef::Populated { id, .. } => id,
            CategoryRef::Id(id) => id,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            CategoryRef::Populated { name, .. } => Some(name),
            CategoryRef::Id(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductImage {
    pub url: String,
    #[serde(default)]
    pub public_id: Option<String>,
}

/// Products in the same category plus a selection of others, for a product page.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelatedProducts {
    #[serde(default)]
    pub related_products: Vec<Product>,
    #[serde(default)]
    pub other_products: Vec<Product>,
}

/// Filters for the public product listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductQuery {
    pub category: Option<String>,
    pub featured: bool,
    pub search: Option<String>,
}

impl ProductQuery {
    pub fn in_category(category: impl Into<String>) -> Self {
        Self {
            category: Some(category.into()),
            ..Self::default()
        }
    }

    pub fn featured() -> Self {
        Self {
            featured: true,
            ..Self::default()
        }
    }

    pub fn search(term: impl Into<String>) -> Self {
        Self {
            search: Some(term.into()),
            ..Self::default()
        }
    }

    pub(crate) fn to_path(&self, path: &str) -> String {
        let featured = if self.featured { "true" } else { "" };
        utils::url_path::with_query(
            path,
            [
                ("category", self.category.as_deref().unwrap_or_default()),
                ("featured", featured),
                ("search", self.search.as_deref().unwrap_or_default().trim()),
            ],
        )
    }
}

/// Fields submitted when creating or updating a product. Images are managed separately.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductDraft {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub category: String,
    pub stock: u32,
    pub min_order_quantity: u32,
    pub featured: bool,
    pub specifications: BTreeMap<String, String>,
}

impl ProductDraft {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        price: f64,
        category: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            price,
            category: category.into(),
            stock: 0,
            min_order_quantity: 1,
            featured: false,
            specifications: BTreeMap::new(),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty()
            || self.description.trim().is_empty()
            || self.category.trim().is_empty()
        {
            return Err("Missing required fields".to_string());
        }
        if !self.price.is_finite() || self.price < 0.0 {
            return Err("Invalid price. Must be a positive number.".to_string());
        }
        if self.min_order_quantity < 1 {
            return Err("Minimum order quantity must be at least 1".to_string());
        }
        Ok(())
    }

    pub(crate) fn form_fields(&self) -> Result<Vec<(&'static str, String)>, serde_json::Error> {
        Ok(vec![
            ("name", self.name.trim().to_string()),
            ("description", self.description.trim().to_string()),
            ("price", self.price.to_string()),
            ("category", self.category.clone()),
            ("stock", self.stock.to_string()),
            ("minOrderQuantity", self.min_order_quantity.to_string()),
            ("featured", self.featured.to_string()),
            ("specifications", serde_json::to_string(&self.specifications)?),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_populated_and_bare_category() {
        let populated: Product = serde_json::from_str(
            r#"{"_id":"p1","name":"Ergo Chair","slug":"ergo-chair-1700000000","price":4999,
                "category":{"_id":"c1","name":"Chairs","slug":"chairs"},
                "images":[{"url":"https://cdn.example.com/a.jpg","publicId":"tos-products/a"}],
                "featured":true}"#,
        )
        .unwrap();
        assert_eq!(populated.category.id(), "c1");
        assert_eq!(populated.category.name(), Some("Chairs"));
        assert_eq!(populated.min_order_quantity, 1);
        assert!(populated.is_active);
        assert_eq!(populated.images[0].public_id.as_deref(), Some("tos-products/a"));

        let bare: Product = serde_json::from_str(
            r#"{"_id":"p2","name":"Desk","slug":"desk","price":12.5,"category":"c2","stock":3}"#,
        )
        .unwrap();
        assert_eq!(bare.category, CategoryRef::Id("c2".to_string()));
        assert_eq!(bare.category.name(), None);
        assert_eq!(bare.stock, 3);
    }

    #[test]
    fn test_query_path() {
        assert_eq!(ProductQuery::default().to_path("/api/products"), "/api/products");
        assert_eq!(
            ProductQuery::featured().to_path("/api/products"),
            "/api/products?featured=true"
        );

        let query = ProductQuery {
            category: Some("c1".to_string()),
            featured: false,
            search: Some(" steel desk ".to_string()),
        };
        assert_eq!(
            query.to_path("/api/products"),
            "/api/products?category=c1&search=steel+desk"
        );
    }

    #[test]
    fn test_draft_validation() {
        let draft = ProductDraft::new("Chair", "Mesh back", 120.0, "c1");
        assert!(draft.validate().is_ok());

        let negative = ProductDraft::new("Chair", "Mesh back", -1.0, "c1");
        assert_eq!(
            negative.validate().unwrap_err(),
            "Invalid price. Must be a positive number."
        );

        let missing = ProductDraft::new("Chair", "", 10.0, "c1");
        assert_eq!(missing.validate().unwrap_err(), "Missing required fields");
    }

    #[test]
    fn test_draft_form_fields() {
        let mut draft = ProductDraft::new("Chair", "Mesh back", 120.5, "c1");
        draft.specifications.insert("Color".to_string(), "Black".to_string());

        let fields = draft.form_fields().unwrap();
        assert!(fields.contains(&("price", "120.5".to_string())));
        assert!(fields.contains(&("minOrderQuantity", "1".to_string())));
        assert!(fields.contains(&("specifications", r#"{"Color":"Black"}"#.to_string())));
    }
}
