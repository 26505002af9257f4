//! Regulation catalog snapshot used to derive filter options.

use audit_types::RegulationRecord;
use std::collections::HashSet;

/// Regulation rows loaded once at session start.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    records: Vec<RegulationRecord>,
}

impl Catalog {
    pub fn new(records: Vec<RegulationRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[RegulationRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct titles of rows in `domain`; every title when `domain` is empty.
    pub fn titles(&self, domain: &str) -> Vec<String> {
        distinct(
            self.records
                .iter()
                .filter(|r| domain.is_empty() || r.domain == domain)
                .map(|r| r.title.as_str()),
        )
    }

    /// Distinct domains of rows titled `title`; every domain when `title` is empty.
    pub fn domains(&self, title: &str) -> Vec<String> {
        distinct(
            self.records
                .iter()
                .filter(|r| title.is_empty() || r.title == title)
                .map(|r| r.domain.as_str()),
        )
    }
}

/// First-occurrence order is kept.
fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    values
        .filter(|v| seen.insert(*v))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: i64, title: &str, domain: &str) -> RegulationRecord {
        RegulationRecord {
            id,
            title: title.into(),
            domain: domain.into(),
            requirement: String::new(),
        }
    }

    #[test]
    fn distinct_values_keep_catalog_order() {
        let catalog = Catalog::new(vec![
            row(1, "B", "Y"),
            row(2, "A", "X"),
            row(3, "B", "X"),
            row(4, "C", "Y"),
        ]);
        assert_eq!(catalog.titles(""), vec!["B", "A", "C"]);
        assert_eq!(catalog.titles("X"), vec!["A", "B"]);
        assert_eq!(catalog.domains(""), vec!["Y", "X"]);
        assert_eq!(catalog.domains("B"), vec!["Y", "X"]);
        assert!(catalog.titles("Z").is_empty());
    }
}
