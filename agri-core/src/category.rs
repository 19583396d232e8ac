//! Keyword categories
//!
//! A category is a named set of literal keywords tested against a signal's
//! commodity tag and headline. Matching lower-cases both sides and checks
//! plain substring containment; a signal belongs to a category if any
//! (field, keyword) pair matches. There is no stemming or word-boundary
//! logic, so "ban" also matches "urban".

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Signal;

/// Errors from building a category table
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CategoryError {
    #[error("Category name is empty")]
    EmptyName,

    #[error("Category '{0}' has no keywords")]
    NoKeywords(String),
}

/// A named keyword filter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    /// Keywords tested against the commodity tag
    #[serde(default)]
    pub commodity_keywords: Vec<String>,
    /// Keywords tested against the headline
    #[serde(default)]
    pub headline_keywords: Vec<String>,
}

impl Category {
    pub fn new(name: &str, commodity_keywords: &[&str], headline_keywords: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            commodity_keywords: commodity_keywords.iter().map(|k| k.to_string()).collect(),
            headline_keywords: headline_keywords.iter().map(|k| k.to_string()).collect(),
        }
    }

    /// Check that the category can match anything at all
    pub fn validate(&self) -> Result<(), CategoryError> {
        if self.name.trim().is_empty() {
            return Err(CategoryError::EmptyName);
        }
        if self.commodity_keywords.is_empty() && self.headline_keywords.is_empty() {
            return Err(CategoryError::NoKeywords(self.name.clone()));
        }
        Ok(())
    }

    /// Does the signal fall into this category?
    pub fn matches(&self, signal: &Signal) -> bool {
        let commodity_hit = signal
            .commodity
            .as_deref()
            .map(|commodity| contains_any(commodity, &self.commodity_keywords))
            .unwrap_or(false);

        commodity_hit || contains_any(&signal.headline, &self.headline_keywords)
    }
}

fn contains_any(field: &str, keywords: &[String]) -> bool {
    let haystack = field.to_lowercase();
    keywords
        .iter()
        .any(|keyword| haystack.contains(&keyword.to_lowercase()))
}

/// Ordered table of categories, looked up by case-insensitive name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryTable {
    categories: Vec<Category>,
}

impl CategoryTable {
    /// Empty table
    pub fn empty() -> Self {
        Self {
            categories: Vec::new(),
        }
    }

    /// The categories served by the dashboard pages
    pub fn builtin() -> Self {
        Self {
            categories: vec![
                Category::new(
                    "coffee",
                    &["coffee"],
                    &["coffee", "brazil", "frost", "drought"],
                ),
                Category::new(
                    "cannabis",
                    &["cannabis"],
                    &["cannabis", "marijuana", "dea", "schedule", "dispensary"],
                ),
                Category::new(
                    "cracks",
                    &["oil", "gas"],
                    &["refinery", "diesel", "gasoline", "crack", "spread"],
                ),
                Category::new(
                    "regulatory",
                    &[],
                    &[
                        "regulatory",
                        "tariff",
                        "lawsuit",
                        "policy",
                        "ban",
                        "regulation",
                        "compliance",
                    ],
                ),
                Category::new(
                    "visas",
                    &[],
                    &[
                        "visa",
                        "h-2a",
                        "h-2b",
                        "labor",
                        "worker",
                        "immigration",
                        "seasonal",
                    ],
                ),
            ],
        }
    }

    /// Add a category, replacing any existing one with the same name
    pub fn insert(&mut self, category: Category) -> Result<(), CategoryError> {
        category.validate()?;
        match self.position(&category.name) {
            Some(idx) => self.categories[idx] = category,
            None => self.categories.push(category),
        }
        Ok(())
    }

    /// Merge a list of categories into the table
    pub fn extend<I>(&mut self, categories: I) -> Result<(), CategoryError>
    where
        I: IntoIterator<Item = Category>,
    {
        for category in categories {
            self.insert(category)?;
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Category> {
        self.position(name).map(|idx| &self.categories[idx])
    }

    pub fn names(&self) -> Vec<&str> {
        self.categories.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Category> {
        self.categories.iter()
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Names of every category the signal belongs to
    pub fn classify(&self, signal: &Signal) -> Vec<&str> {
        self.categories
            .iter()
            .filter(|c| c.matches(signal))
            .map(|c| c.name.as_str())
            .collect()
    }

    fn position(&self, name: &str) -> Option<usize> {
        let wanted = name.trim().to_lowercase();
        self.categories
            .iter()
            .position(|c| c.name.to_lowercase() == wanted)
    }
}

impl Default for CategoryTable {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signal(headline: &str, commodity: Option<&str>) -> Signal {
        let builder = Signal::builder(1, headline).score(85.0);
        match commodity {
            Some(c) => builder.commodity(c).build(),
            None => builder.build(),
        }
    }

    #[test]
    fn test_category_independence() {
        let table = CategoryTable::builtin();
        let dea = signal("DEA pushes cannabis rescheduling", Some("cannabis"));

        assert!(table.get("cannabis").unwrap().matches(&dea));
        assert!(!table.get("regulatory").unwrap().matches(&dea));
    }

    #[test]
    fn test_commodity_field_match() {
        let table = CategoryTable::builtin();
        let quiet = signal("Harvest on schedule", Some("Coffee"));

        // commodity tag alone is enough, case-insensitively
        assert!(table.get("coffee").unwrap().matches(&quiet));
        // "schedule" is a cannabis headline keyword
        assert!(table.get("cannabis").unwrap().matches(&quiet));
    }

    #[test]
    fn test_substring_drift_is_kept() {
        let table = CategoryTable::builtin();
        let urban = signal("Urban water districts raise rates", Some("water"));

        // "ban" inside "urban"
        assert!(table.get("regulatory").unwrap().matches(&urban));
    }

    #[test]
    fn test_missing_commodity_only_checks_headline() {
        let table = CategoryTable::builtin();
        let no_tag = signal("Refinery outage in Texas", None);

        assert!(table.get("cracks").unwrap().matches(&no_tag));
        assert!(!table.get("coffee").unwrap().matches(&no_tag));
    }

    #[test]
    fn test_mixed_case_keywords() {
        let category = Category::new("visas", &[], &["H-2A"]);
        assert!(category.matches(&signal("h-2a wage rule tightens", None)));
    }

    #[test]
    fn test_lookup_and_classify() {
        let table = CategoryTable::builtin();
        assert!(table.get("  Coffee ").is_some());
        assert!(table.get("water").is_none());
        assert_eq!(table.len(), 5);

        let s = signal("Brazil tariff on coffee imports", Some("coffee"));
        assert_eq!(table.classify(&s), vec!["coffee", "regulatory"]);
    }

    #[test]
    fn test_insert_replaces_and_validates() {
        let mut table = CategoryTable::builtin();
        table
            .insert(Category::new("water", &["water"], &["aquifer"]))
            .unwrap();
        assert_eq!(table.len(), 6);

        table.insert(Category::new("COFFEE", &[], &["arabica"])).unwrap();
        assert_eq!(table.len(), 6);
        assert_eq!(table.get("coffee").unwrap().headline_keywords, vec!["arabica"]);

        assert_eq!(
            table.insert(Category::new("empty", &[], &[])),
            Err(CategoryError::NoKeywords("empty".to_string()))
        );
        assert_eq!(
            table.insert(Category::new(" ", &["x"], &[])),
            Err(CategoryError::EmptyName)
        );
    }
}
