//! Ingredient register: the deduplicated list of scanned products.
//!
//! Entries are keyed on barcode and kept in scan order. Their names seed the
//! ingredient context of recipe requests.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A product that was scanned and resolved to a name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScannedIngredient {
    /// Resolved (or synthesized) product name.
    pub name: String,
    /// The decoded barcode; unique within a register.
    pub barcode: String,
    /// When the ingredient was added.
    pub timestamp: DateTime<Utc>,
}

/// What [`IngredientRegister::add`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// A new entry was appended.
    Added,
    /// The barcode was already present; nothing changed.
    AlreadyScanned,
}

/// Insertion-ordered set of scanned ingredients, unique by barcode.
#[derive(Debug, Clone, Default)]
pub struct IngredientRegister {
    items: Vec<ScannedIngredient>,
}

impl IngredientRegister {
    /// Creates an empty register.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an ingredient unless its barcode is already registered.
    ///
    /// A repeated barcode keeps the original entry, whatever `name` is.
    pub fn add(&mut self, name: &str, barcode: &str, now: DateTime<Utc>) -> AddOutcome {
        if self.contains(barcode) {
            return AddOutcome::AlreadyScanned;
        }
        self.items.push(ScannedIngredient {
            name: name.to_string(),
            barcode: barcode.to_string(),
            timestamp: now,
        });
        AddOutcome::Added
    }

    /// Removes the entry for `barcode`. Returns whether one was removed.
    pub fn remove(&mut self, barcode: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.barcode != barcode);
        self.items.len() != before
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Entries in scan order.
    #[must_use]
    pub fn list(&self) -> &[ScannedIngredient] {
        &self.items
    }

    /// Entry names in scan order, as sent with recipe requests.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.items.iter().map(|item| item.name.clone()).collect()
    }

    /// Whether `barcode` is registered.
    #[must_use]
    pub fn contains(&self, barcode: &str) -> bool {
        self.items.iter().any(|item| item.barcode == barcode)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the register is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn at(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 15, 14, minute, 0).unwrap()
    }

    #[test]
    fn duplicate_barcode_keeps_first_name() {
        let mut register = IngredientRegister::new();

        assert_eq!(register.add("Coca-Cola 12oz", "049000028911", at(0)), AddOutcome::Added);
        assert_eq!(register.add("Other", "049000028911", at(1)), AddOutcome::AlreadyScanned);

        assert_eq!(register.len(), 1);
        assert_eq!(register.list()[0].name, "Coca-Cola 12oz");
        assert_eq!(register.list()[0].timestamp, at(0));
    }

    #[test]
    fn preserves_insertion_order() {
        let mut register = IngredientRegister::new();
        register.add("Milk", "111", at(0));
        register.add("Eggs", "222", at(1));
        register.add("Flour", "333", at(2));

        assert_eq!(register.names(), vec!["Milk", "Eggs", "Flour"]);
    }

    #[test]
    fn remove_is_noop_for_unknown_barcode() {
        let mut register = IngredientRegister::new();
        register.add("Milk", "111", at(0));

        assert!(!register.remove("999"));
        assert_eq!(register.len(), 1);
        assert!(register.remove("111"));
        assert!(register.is_empty());
    }

    #[test]
    fn removed_barcode_can_be_scanned_again() {
        let mut register = IngredientRegister::new();
        register.add("Milk", "111", at(0));
        register.remove("111");

        assert_eq!(register.add("Whole milk", "111", at(5)), AddOutcome::Added);
        assert_eq!(register.list()[0].name, "Whole milk");
    }

    #[test]
    fn clear_empties_everything() {
        let mut register = IngredientRegister::new();
        register.add("Milk", "111", at(0));
        register.add("Eggs", "222", at(1));
        register.clear();

        assert!(register.is_empty());
        assert!(register.names().is_empty());
    }

    #[test]
    fn timestamp_serializes_as_rfc3339() {
        let mut register = IngredientRegister::new();
        register.add("Milk", "111", at(30));
        let json = serde_json::to_value(&register.list()[0]).unwrap();
        assert_eq!(json["timestamp"], "2025-03-15T14:30:00Z");
    }
}
