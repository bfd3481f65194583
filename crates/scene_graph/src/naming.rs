//! Unique name generation within one naming domain
//!
//! Collisions are resolved by appending a decimal suffix with no separator:
//! `Cube`, `Cube1`, `Cube2`. A colliding name that already ends in digits is
//! treated as `<base><n>` and continues from `base` (`Cube1` → `Cube2`).

use std::collections::{HashMap, HashSet};

/// Hands out names that are unique among everything reserved so far
#[derive(Debug, Default, Clone)]
pub struct UniqueNamer {
    used: HashSet<String>,
    /// Next suffix to try per base name
    next_suffix: HashMap<String, u64>,
}

impl UniqueNamer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve `candidate`, or the first free suffixed variant of it
    pub fn reserve(&mut self, candidate: &str) -> String {
        if self.used.insert(candidate.to_string()) {
            return candidate.to_string();
        }

        let base = base_name(candidate);
        let mut suffix = self.next_suffix.get(base).copied().unwrap_or(1);
        loop {
            let name = format!("{}{}", base, suffix);
            suffix += 1;
            if self.used.insert(name.clone()) {
                self.next_suffix.insert(base.to_string(), suffix);
                return name;
            }
        }
    }

    pub fn is_reserved(&self, name: &str) -> bool {
        self.used.contains(name)
    }

    pub fn len(&self) -> usize {
        self.used.len()
    }

    pub fn is_empty(&self) -> bool {
        self.used.is_empty()
    }

    /// Forget every reservation
    pub fn clear(&mut self) {
        self.used.clear();
        self.next_suffix.clear();
    }
}

/// `candidate` without its trailing digits, unless it is all digits
fn base_name(candidate: &str) -> &str {
    let trimmed = candidate.trim_end_matches(|c: char| c.is_ascii_digit());
    if trimmed.is_empty() {
        candidate
    } else {
        trimmed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unused_name_unchanged() {
        let mut namer = UniqueNamer::new();
        assert_eq!(namer.reserve("Cube"), "Cube");
        assert_eq!(namer.reserve("Sphere"), "Sphere");
        assert_eq!(namer.len(), 2);
    }

    #[test]
    fn test_suffix_no_separator() {
        let mut namer = UniqueNamer::new();
        assert_eq!(namer.reserve("Cube"), "Cube");
        assert_eq!(namer.reserve("Cube"), "Cube1");
        assert_eq!(namer.reserve("Cube"), "Cube2");
    }

    #[test]
    fn test_numbered_collision_continues_base() {
        let mut namer = UniqueNamer::new();
        assert_eq!(namer.reserve("Cube1"), "Cube1");
        assert_eq!(namer.reserve("Cube1"), "Cube2");
        assert_eq!(namer.reserve("Cube"), "Cube");
        assert_eq!(namer.reserve("Cube"), "Cube3");
    }

    #[test]
    fn test_skips_taken_suffixes() {
        let mut namer = UniqueNamer::new();
        namer.reserve("Light");
        namer.reserve("Light1");
        namer.reserve("Light2");
        assert_eq!(namer.reserve("Light"), "Light3");
    }

    #[test]
    fn test_all_digit_name() {
        let mut namer = UniqueNamer::new();
        assert_eq!(namer.reserve("42"), "42");
        assert_eq!(namer.reserve("42"), "421");
    }

    #[test]
    fn test_empty_name() {
        let mut namer = UniqueNamer::new();
        assert_eq!(namer.reserve(""), "");
        assert_eq!(namer.reserve(""), "1");
    }

    #[test]
    fn test_clear() {
        let mut namer = UniqueNamer::new();
        namer.reserve("Cube");
        namer.reserve("Cube");
        namer.clear();
        assert!(namer.is_empty());
        assert!(!namer.is_reserved("Cube"));
        assert_eq!(namer.reserve("Cube"), "Cube");
        assert_eq!(namer.reserve("Cube"), "Cube1");
    }

    #[test]
    fn test_many_collisions_stay_unique() {
        let mut namer = UniqueNamer::new();
        let names: HashSet<String> = (0..500).map(|_| namer.reserve("Node")).collect();
        assert_eq!(names.len(), 500);
        assert!(names.contains("Node499"));
    }
}
