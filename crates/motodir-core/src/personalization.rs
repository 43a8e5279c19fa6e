use std::collections::BTreeSet;

use crate::account::BikeBrand;

/// Brands derived from the signed-in user's bikes.
///
/// Empty when nobody is signed in, the user has no bikes, or resolution
/// failed. A non-empty context both filters and ranks the catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersonalizationContext {
    brands: BTreeSet<String>,
    bike_labels: Vec<String>,
}

impl PersonalizationContext {
    /// Builds a context from bike rows. Brands are trimmed, lower-cased and
    /// de-duplicated; blank brands are skipped.
    #[must_use]
    pub fn from_bikes(bikes: &[BikeBrand]) -> Self {
        let brands = bikes
            .iter()
            .map(|b| b.brand.trim().to_lowercase())
            .filter(|b| !b.is_empty())
            .collect();
        let bike_labels = bikes
            .iter()
            .filter(|b| !b.brand.trim().is_empty())
            .map(|b| match b.model.as_deref().filter(|m| !m.trim().is_empty()) {
                Some(model) => format!("{} {model}", b.brand),
                None => b.brand.clone(),
            })
            .collect();
        Self {
            brands,
            bike_labels,
        }
    }

    /// Builds a context straight from brand names.
    pub fn from_brands<I, S>(brands: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            brands: brands
                .into_iter()
                .map(|b| b.as_ref().trim().to_lowercase())
                .filter(|b| !b.is_empty())
                .collect(),
            bike_labels: Vec::new(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.brands.is_empty()
    }

    pub fn brands(&self) -> impl Iterator<Item = &str> {
        self.brands.iter().map(String::as_str)
    }

    /// `"Brand Model"` labels of the bikes the brands came from.
    #[must_use]
    pub fn bike_labels(&self) -> &[String] {
        &self.bike_labels
    }

    /// Number of distinct brands appearing as substrings of `haystack`, which
    /// must already be lower-cased.
    #[must_use]
    pub fn hits_in(&self, haystack: &str) -> usize {
        self.brands
            .iter()
            .filter(|b| haystack.contains(b.as_str()))
            .count()
    }
}
