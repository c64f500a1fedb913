//! Generation stamps.
//!
//! Every selector change and every recompute request takes a fresh
//! generation. Work started under one generation carries the stamp and is
//! dropped on arrival if a newer generation has been issued since.

use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Generation(u64);

impl Generation {
    pub const INITIAL: Generation = Generation(0);

    /// The generation issued after this one
    pub fn next(self) -> Generation {
        Generation(self.0.wrapping_add(1))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "g{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_is_newer() {
        let first = Generation::INITIAL.next();
        assert!(first > Generation::INITIAL);
        assert_eq!(first.next().get(), 2);
        assert_eq!(first.to_string(), "g1");
    }
}
