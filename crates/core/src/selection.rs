//! Selected pantry ingredients
//!
//! A [`SelectionSet`] is a value type: every mutator returns a new set and
//! leaves the receiver untouched, so holders of the previous set never see it
//! change underneath them.

use serde::{Serialize, Serializer};
use std::collections::HashMap;

/// Set of ingredient names with case-insensitive identity.
///
/// Keys are the lowercased, trimmed names. The first spelling seen for a key
/// is kept for display.
#[derive(Debug, Clone, Default)]
pub struct SelectionSet {
    names: HashMap<String, String>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// An empty selection means no ingredient filter is active
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains_key(&normalize(name))
    }

    /// Return a new set with `name` removed if present, added otherwise.
    ///
    /// Blank names are never members, so toggling one returns an equal set.
    pub fn toggled(&self, name: &str) -> Self {
        let key = normalize(name);
        let mut next = self.clone();

        if key.is_empty() {
            return next;
        }

        if next.names.remove(&key).is_none() {
            next.names.insert(key, name.trim().to_string());
        }

        next
    }

    /// Lowercased names, the form the filter engine matches with
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.names.keys().map(String::as_str)
    }

    /// Display names sorted case-insensitively
    pub fn names(&self) -> Vec<&str> {
        let mut entries: Vec<(&String, &String)> = self.names.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries.into_iter().map(|(_, display)| display.as_str()).collect()
    }
}

impl PartialEq for SelectionSet {
    fn eq(&self, other: &Self) -> bool {
        self.names.len() == other.names.len()
            && self.names.keys().all(|k| other.names.contains_key(k))
    }
}

impl Eq for SelectionSet {}

impl<S: AsRef<str>> FromIterator<S> for SelectionSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut names = HashMap::new();
        for name in iter {
            let key = normalize(name.as_ref());
            if !key.is_empty() {
                names
                    .entry(key)
                    .or_insert_with(|| name.as_ref().trim().to_string());
            }
        }
        Self { names }
    }
}

impl Serialize for SelectionSet {
    fn serialize<Ser: Serializer>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error> {
        serializer.collect_seq(self.names())
    }
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_adds_missing_name() {
        let set = SelectionSet::new().toggled("Tomato");
        assert!(set.contains("tomato"));
        assert!(set.contains("TOMATO"));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_toggle_removes_case_insensitively() {
        let set = SelectionSet::new().toggled("Tomato").toggled("tOmAtO");
        assert!(set.is_empty());
    }

    #[test]
    fn test_toggle_does_not_mutate_previous_set() {
        let before = SelectionSet::from_iter(["salt"]);
        let after = before.toggled("pepper");

        assert_eq!(before.len(), 1);
        assert!(!before.contains("pepper"));
        assert_eq!(after.len(), 2);
    }

    #[test]
    fn test_toggle_is_an_involution() {
        let sets = [
            SelectionSet::new(),
            SelectionSet::from_iter(["salt"]),
            SelectionSet::from_iter(["Salt", "Tomato", "basil"]),
        ];
        let names = ["salt", "SALT", "tomato", "garlic", " Basil ", ""];

        for set in &sets {
            for name in names {
                assert_eq!(&set.toggled(name).toggled(name), set, "name {name:?}");
            }
        }
    }

    #[test]
    fn test_blank_name_is_ignored() {
        let set = SelectionSet::new().toggled("   ");
        assert!(set.is_empty());
    }

    #[test]
    fn test_from_iter_deduplicates() {
        let set = SelectionSet::from_iter(["Egg", "egg", " EGG", "milk"]);
        assert_eq!(set.len(), 2);
        assert_eq!(set.names(), vec!["Egg", "milk"]);
    }

    #[test]
    fn test_keys_are_lowercase() {
        let set = SelectionSet::from_iter(["Olive Oil"]);
        assert_eq!(set.keys().collect::<Vec<_>>(), vec!["olive oil"]);
    }

    #[test]
    fn test_serialize_as_sorted_names() {
        let set = SelectionSet::from_iter(["salt", "Basil"]);
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, r#"["Basil","salt"]"#);
    }
}
