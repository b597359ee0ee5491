//! ID generator port for producing unique identifiers.

/// Generates unique identifiers.
///
/// Every scan session is tagged with an ID from this port so that its log
/// lines can be correlated.
pub trait IdGenerator: Send + Sync {
    /// Generates a new unique identifier string.
    fn generate_id(&self) -> String;
}
