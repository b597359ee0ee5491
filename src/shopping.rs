//! Shopping-list helpers: availability classes and product lookup.

use crate::ports::backend::{Product, ShoppingListResponse};

/// Stock class derived from a product's free-text availability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    /// Available.
    InStock,
    /// On sale; stock may run out.
    LimitedStock,
    /// Anything else.
    OutOfStock,
}

impl Availability {
    /// Classifies availability text, case-insensitively. "sale" wins over
    /// "stock", so `"On sale - in stock"` is limited.
    #[must_use]
    pub fn classify(text: &str) -> Self {
        let text = text.to_lowercase();
        if text.contains("sale") {
            Self::LimitedStock
        } else if text.contains("stock") {
            Self::InStock
        } else {
            Self::OutOfStock
        }
    }

    /// Short human label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::InStock => "in stock",
            Self::LimitedStock => "limited stock",
            Self::OutOfStock => "out of stock",
        }
    }
}

impl ShoppingListResponse {
    /// Finds a listed product by id, searching ingredients in order.
    #[must_use]
    pub fn find_product(&self, id: &str) -> Option<&Product> {
        self.shopping_list
            .iter()
            .flat_map(|entry| entry.products.iter())
            .find(|product| product.id == id)
    }

    /// The best match for each ingredient that has one.
    pub fn best_matches(&self) -> impl Iterator<Item = (&str, &Product)> {
        self.shopping_list
            .iter()
            .filter_map(|entry| entry.products.first().map(|p| (entry.ingredient.as_str(), p)))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn list() -> ShoppingListResponse {
        serde_json::from_value(json!({
            "matched_ingredients": 2,
            "total_ingredients": 3,
            "dish_name": "Pancakes",
            "shopping_list": [
                {"ingredient": "flour", "products": [
                    {"id": "f1", "name": "Flour 1kg", "price": "$2.10", "availability": "In Stock"},
                    {"id": "f2", "name": "Flour 2kg", "price": "$3.90", "availability": "Sold out"}
                ]},
                {"ingredient": "milk", "products": [
                    {"id": "m1", "name": "Milk", "price": "$1.05", "availability": "On SALE"}
                ]},
                {"ingredient": "eggs", "products": []}
            ],
            "unmatched_ingredients": ["saffron"]
        }))
        .unwrap()
    }

    #[test]
    fn classifies_availability_text() {
        assert_eq!(Availability::classify("In Stock"), Availability::InStock);
        assert_eq!(Availability::classify("on sale, low stock"), Availability::LimitedStock);
        assert_eq!(Availability::classify("Sold out"), Availability::OutOfStock);
        assert_eq!(Availability::classify(""), Availability::OutOfStock);
    }

    #[test]
    fn finds_products_across_ingredients() {
        let list = list();
        assert_eq!(list.find_product("m1").map(|p| p.name.as_str()), Some("Milk"));
        assert_eq!(list.find_product("f2").map(|p| p.price.as_str()), Some("$3.90"));
        assert!(list.find_product("nope").is_none());
    }

    #[test]
    fn best_match_is_the_first_product() {
        let list = list();
        let best: Vec<_> =
            list.best_matches().map(|(ingredient, p)| (ingredient, p.id.as_str())).collect();
        assert_eq!(best, vec![("flour", "f1"), ("milk", "m1")]);
    }
}
