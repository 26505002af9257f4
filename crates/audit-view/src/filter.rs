//! Dependent title/domain dropdowns and the free-text query.

use crate::Catalog;
use audit_types::SearchFilters;
use serde::Serialize;

/// Options currently offered by the two dropdowns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterOptions {
    pub titles: Vec<String>,
    pub domains: Vec<String>,
}

/// Current filter values; empty means "all".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterState {
    pub query: String,
    pub title: String,
    pub domain: String,
}

/// Tracks the selected filters and keeps each dropdown consistent with the other.
///
/// Operates on an already-loaded [`Catalog`]; never touches the network.
#[derive(Debug, Clone, Default)]
pub struct FilterController {
    state: FilterState,
    options: FilterOptions,
}

impl FilterController {
    pub fn new(catalog: &Catalog) -> Self {
        let mut controller = Self::default();
        controller.load(catalog);
        controller
    }

    /// Reset both option lists to the full catalog, dropping selections it no longer contains.
    pub fn load(&mut self, catalog: &Catalog) -> &FilterOptions {
        self.options.titles = catalog.titles("");
        self.options.domains = catalog.domains("");
        if !self.options.titles.contains(&self.state.title) {
            self.state.title.clear();
        }
        if !self.options.domains.contains(&self.state.domain) {
            self.state.domain.clear();
        }
        &self.options
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.state.query = query.into();
    }

    /// Select a domain and narrow the title options to it.
    pub fn set_domain(&mut self, catalog: &Catalog, domain: impl Into<String>) -> &FilterOptions {
        self.state.domain = domain.into();
        self.options.titles = catalog.titles(&self.state.domain);
        if !self.options.titles.contains(&self.state.title) {
            self.state.title.clear();
        }
        &self.options
    }

    /// Select a title and narrow the domain options to it.
    pub fn set_title(&mut self, catalog: &Catalog, title: impl Into<String>) -> &FilterOptions {
        self.state.title = title.into();
        self.options.domains = catalog.domains(&self.state.title);
        if !self.options.domains.contains(&self.state.domain) {
            self.state.domain.clear();
        }
        &self.options
    }

    pub fn state(&self) -> &FilterState {
        &self.state
    }

    pub fn options(&self) -> &FilterOptions {
        &self.options
    }

    pub fn filters(&self) -> SearchFilters {
        SearchFilters::new(
            self.state.query.clone(),
            self.state.title.clone(),
            self.state.domain.clone(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use audit_types::RegulationRecord;

    fn catalog(rows: &[(&str, &str)]) -> Catalog {
        Catalog::new(
            rows.iter()
                .enumerate()
                .map(|(i, (title, domain))| RegulationRecord {
                    id: i as i64 + 1,
                    title: title.to_string(),
                    domain: domain.to_string(),
                    requirement: String::new(),
                })
                .collect(),
        )
    }

    #[test]
    fn selecting_a_domain_narrows_titles_and_empty_restores_them() {
        let catalog = catalog(&[("A", "X"), ("B", "Y")]);
        let mut filters = FilterController::new(&catalog);

        assert_eq!(filters.set_domain(&catalog, "X").titles, vec!["A"]);
        assert_eq!(filters.set_domain(&catalog, "").titles, vec!["A", "B"]);
    }

    #[test]
    fn selecting_a_title_narrows_domains() {
        let catalog = catalog(&[("A", "X"), ("A", "Z"), ("B", "Y")]);
        let mut filters = FilterController::new(&catalog);

        assert_eq!(filters.set_title(&catalog, "A").domains, vec!["X", "Z"]);
        assert_eq!(filters.set_title(&catalog, "").domains, vec!["X", "Z", "Y"]);
    }

    #[test]
    fn derived_titles_match_catalog_for_every_domain() {
        let catalog = catalog(&[("A", "X"), ("B", "X"), ("A", "Y"), ("C", "Z"), ("B", "X")]);
        let mut filters = FilterController::new(&catalog);
        for domain in catalog.domains("") {
            let expected: Vec<String> = {
                let mut out: Vec<String> = Vec::new();
                for r in catalog.records().iter().filter(|r| r.domain == domain) {
                    if !out.contains(&r.title) {
                        out.push(r.title.clone());
                    }
                }
                out
            };
            assert_eq!(filters.set_domain(&catalog, domain.clone()).titles, expected);
        }
    }

    #[test]
    fn invalidated_title_is_cleared() {
        let catalog = catalog(&[("A", "X"), ("B", "Y")]);
        let mut filters = FilterController::new(&catalog);
        filters.set_title(&catalog, "B");
        assert_eq!(filters.state().title, "B");

        filters.set_domain(&catalog, "X");
        assert_eq!(filters.state().title, "");
        assert_eq!(filters.state().domain, "X");
    }

    #[test]
    fn still_valid_title_is_kept() {
        let catalog = catalog(&[("A", "X"), ("A", "Y"), ("B", "Y")]);
        let mut filters = FilterController::new(&catalog);
        filters.set_title(&catalog, "A");
        filters.set_domain(&catalog, "Y");
        assert_eq!(filters.state().title, "A");
        assert_eq!(filters.options().titles, vec!["A", "B"]);
    }

    #[test]
    fn invalidated_domain_is_cleared() {
        let catalog = catalog(&[("A", "X"), ("B", "Y")]);
        let mut filters = FilterController::new(&catalog);
        filters.set_domain(&catalog, "Y");
        filters.set_title(&catalog, "A");
        assert_eq!(filters.state().domain, "");
        assert_eq!(filters.options().domains, vec!["X"]);
    }

    #[test]
    fn filters_carry_query_and_selections() {
        let catalog = catalog(&[("A", "X")]);
        let mut filters = FilterController::new(&catalog);
        filters.set_query("incendie");
        filters.set_domain(&catalog, "X");
        assert_eq!(filters.filters(), SearchFilters::new("incendie", "", "X"));
    }
}
