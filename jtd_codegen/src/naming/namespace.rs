//! Scopes of already-claimed identifiers.

use std::collections::BTreeSet;

/// A set of identifiers in one scope. Claiming a taken name appends the
/// smallest unused integer suffix: `foo`, `foo0`, `foo1`, ...
#[derive(Debug, Clone, Default)]
pub struct Namespace {
    taken: BTreeSet<String>,
}

impl Namespace {
    /// Marks `name` as taken without claiming it for anything.
    pub fn reserve(&mut self, name: &str) {
        self.taken.insert(name.to_string());
    }

    /// Returns `base` if free, otherwise `base` followed by the smallest
    /// non-negative integer that makes it free. The result is taken.
    pub fn claim(&mut self, base: &str) -> String {
        if self.taken.insert(base.to_string()) {
            return base.to_string();
        }
        let mut suffix: usize = 0;
        loop {
            let candidate: String = format!("{base}{suffix}");
            if self.taken.insert(candidate.clone()) {
                return candidate;
            }
            suffix += 1;
        }
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.taken.contains(name)
    }
}
