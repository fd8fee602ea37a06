//! Supporting type used in error structures

use std::fmt;
use thiserror::Error;

#[derive(Debug, PartialEq, Eq, Clone, Copy, Error)]
/// Error indicating an expected value was not found.
pub struct Mismatch<T> {
    /// Value expected.
    pub expected: T,
    /// Value found.
    pub found: T,
}

impl<T> Mismatch<T> {
    pub fn new(expected: T, found: T) -> Self {
        Self { expected, found }
    }
}

impl<T: fmt::Display> fmt::Display for Mismatch<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Expected {}, found {}", self.expected, self.found)
    }
}

#[cfg(test)]
mod tests {
    use super::Mismatch;
    use pretty_assertions::assert_eq;

    #[test]
    fn display_mismatch() {
        let mismatch = Mismatch::new("0xaa", "0xbb");
        assert_eq!("Expected 0xaa, found 0xbb", mismatch.to_string());
    }
}
