//! Call-id generator.
//!
//! Call-ids tag method calls within one request envelope so that later
//! calls can point back at earlier results.

/// Generator for JMAP call-ids.
///
/// Generates sequential ids in the format "m0", "m1", etc. Ids are unique
/// for the lifetime of the generator, which is scoped to one envelope.
#[derive(Debug, Clone)]
pub struct CallIdGenerator {
    counter: u32,
    prefix: char,
}

impl CallIdGenerator {
    /// Creates a new generator with the given prefix.
    #[must_use]
    pub const fn new(prefix: char) -> Self {
        Self { counter: 0, prefix }
    }

    /// Generates the next call-id.
    ///
    /// # Panics
    ///
    /// Panics if the counter would overflow `u32::MAX`. No envelope carries
    /// anywhere near that many calls.
    #[must_use]
    pub fn next_id(&mut self) -> String {
        let n = self.counter;
        self.counter = n
            .checked_add(1)
            .unwrap_or_else(|| panic!("call-id counter overflow after {n} ids"));
        format!("{}{n}", self.prefix)
    }

    /// Returns the number of ids handed out so far.
    #[must_use]
    pub const fn issued(&self) -> u32 {
        self.counter
    }

    /// Resets the counter to zero.
    pub const fn reset(&mut self) {
        self.counter = 0;
    }
}

impl Default for CallIdGenerator {
    fn default() -> Self {
        Self::new('c')
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::redundant_clone,
    clippy::needless_collect,
    clippy::similar_names
)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence() {
        let mut generator = CallIdGenerator::default();
        assert_eq!(generator.next_id(), "c0");
        assert_eq!(generator.next_id(), "c1");
        assert_eq!(generator.next_id(), "c2");
    }

    #[test]
    fn test_custom_prefix() {
        let mut generator = CallIdGenerator::new('m');
        assert_eq!(generator.next_id(), "m0");
        assert_eq!(generator.next_id(), "m1");
    }

    #[test]
    fn test_reset() {
        let mut generator = CallIdGenerator::default();
        let _ = generator.next_id();
        let _ = generator.next_id();
        assert_eq!(generator.issued(), 2);
        generator.reset();
        assert_eq!(generator.next_id(), "c0");
    }

    #[test]
    fn test_uniqueness() {
        let mut generator = CallIdGenerator::default();
        let mut seen = std::collections::HashSet::new();
        for _ in 0..1000 {
            assert!(seen.insert(generator.next_id()), "duplicate call-id");
        }
    }

    #[test]
    #[should_panic(expected = "call-id counter overflow")]
    fn test_overflow_detection() {
        let mut generator = CallIdGenerator {
            counter: u32::MAX,
            ..CallIdGenerator::default()
        };
        let _ = generator.next_id();
    }
}
