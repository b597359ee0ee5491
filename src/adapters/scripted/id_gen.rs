//! Predictable ID sequence.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::ports::id_gen::IdGenerator;

/// Produces `scan-1`, `scan-2`, ...
#[derive(Debug, Default)]
pub struct SequentialIdGenerator {
    next: AtomicU64,
}

impl SequentialIdGenerator {
    /// Creates a generator starting at 1.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn generate_id(&self) -> String {
        let n = self.next.fetch_add(1, Ordering::Relaxed) + 1;
        format!("scan-{n}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_up_from_one() {
        let gen = SequentialIdGenerator::new();
        assert_eq!(gen.generate_id(), "scan-1");
        assert_eq!(gen.generate_id(), "scan-2");
    }
}
