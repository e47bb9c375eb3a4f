//! Choice tables and name disambiguation
//!
//! Choice names are canonicalised to upper snake case. Two raw values whose
//! names collapse to the same canonical form get the raw value appended, and
//! underscores after that until every name is unique.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Raw value -> display name mapping of an enum-like signal
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChoiceTable {
    choices: BTreeMap<i64, String>,
}

impl ChoiceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: add a choice
    pub fn with_choice(mut self, raw: i64, name: impl Into<String>) -> Self {
        self.choices.insert(raw, name.into());
        self
    }

    /// Declared name of a raw value
    pub fn get(&self, raw: i64) -> Option<&str> {
        self.choices.get(&raw).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.choices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.choices.is_empty()
    }

    /// Choices in ascending raw value order
    pub fn iter(&self) -> impl Iterator<Item = (i64, &str)> {
        self.choices.iter().map(|(raw, name)| (*raw, name.as_str()))
    }

    /// Canonical, collision-free names keyed by raw value
    pub fn unique_names(&self) -> BTreeMap<i64, String> {
        let canonical: BTreeMap<i64, String> = self
            .choices
            .iter()
            .map(|(raw, name)| (*raw, canonical_name(name)))
            .collect();

        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for name in canonical.values() {
            *counts.entry(name.as_str()).or_default() += 1;
        }

        let mut unique: BTreeMap<i64, String> = canonical
            .iter()
            .filter(|(_, name)| counts[name.as_str()] == 1)
            .map(|(raw, name)| (*raw, name.clone()))
            .collect();

        for (raw, name) in &canonical {
            if counts[name.as_str()] == 1 {
                continue;
            }
            let mut candidate = format!("{}{}", name, canonical_name(&format!("_{}", raw)));
            while unique.values().any(|existing| *existing == candidate) {
                candidate.push('_');
            }
            log::trace!("choice {} renamed '{}' -> '{}'", raw, name, candidate);
            unique.insert(*raw, candidate);
        }

        unique
    }
}

impl FromIterator<(i64, String)> for ChoiceTable {
    fn from_iter<I: IntoIterator<Item = (i64, String)>>(iter: I) -> Self {
        Self {
            choices: iter.into_iter().collect(),
        }
    }
}

/// Upper snake case with every non-alphanumeric character turned into `_`.
///
/// Word boundaries inside camel case ("NotAvailable", "speedKPH") also get a
/// separator.
pub fn canonical_name(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if c.is_ascii_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_lower = chars.get(i + 1).is_some_and(|n| n.is_ascii_lowercase());
            let boundary = prev.is_ascii_lowercase()
                || prev.is_ascii_digit()
                || (next_lower && prev.is_ascii_uppercase());
            if boundary && !out.ends_with('_') {
                out.push('_');
            }
        }

        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push('_');
        }
    }

    out
}
