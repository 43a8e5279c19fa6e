//! Aggregates computed once over the loaded catalog: dropdown option sets,
//! per-option counts and headline statistics.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Serialize, Serializer};

use crate::shop::Shop;

/// A dropdown entry with the number of shops carrying that exact value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FacetOption {
    pub value: String,
    pub count: usize,
}

impl fmt::Display for FacetOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.value, self.count)
    }
}

/// Distinct non-blank countries, codepoint-sorted.
#[must_use]
pub fn unique_countries(shops: &[Shop]) -> Vec<String> {
    distinct(shops.iter().map(|s| s.country.as_deref()))
}

/// Distinct non-blank cities of shops in exactly `country`, codepoint-sorted.
#[must_use]
pub fn unique_cities_for(shops: &[Shop], country: &str) -> Vec<String> {
    distinct(
        shops
            .iter()
            .filter(|s| s.country.as_deref() == Some(country))
            .map(|s| s.city.as_deref()),
    )
}

/// Distinct non-blank business types, codepoint-sorted.
#[must_use]
pub fn unique_business_types(shops: &[Shop]) -> Vec<String> {
    distinct(shops.iter().map(|s| s.business_type.as_deref()))
}

#[must_use]
pub fn country_options(shops: &[Shop]) -> Vec<FacetOption> {
    counted(shops.iter().map(|s| s.country.as_deref()))
}

#[must_use]
pub fn city_options_for(shops: &[Shop], country: &str) -> Vec<FacetOption> {
    counted(
        shops
            .iter()
            .filter(|s| s.country.as_deref() == Some(country))
            .map(|s| s.city.as_deref()),
    )
}

#[must_use]
pub fn business_type_options(shops: &[Shop]) -> Vec<FacetOption> {
    counted(shops.iter().map(|s| s.business_type.as_deref()))
}

fn distinct<'a>(values: impl Iterator<Item = Option<&'a str>>) -> Vec<String> {
    values
        .flatten()
        .filter(|v| !v.trim().is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_owned)
        .collect()
}

fn counted<'a>(values: impl Iterator<Item = Option<&'a str>>) -> Vec<FacetOption> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for value in values.flatten().filter(|v| !v.trim().is_empty()) {
        *counts.entry(value).or_default() += 1;
    }
    counts
        .into_iter()
        .map(|(value, count)| FacetOption {
            value: value.to_owned(),
            count,
        })
        .collect()
}

/// Mean rating over rated shops, or the "no data" marker.
///
/// Serializes as its display text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AvgRating {
    NoData,
    /// Already rounded to one decimal place.
    Value(f64),
}

impl fmt::Display for AvgRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AvgRating::NoData => f.write_str("\u{2014}"),
            AvgRating::Value(v) => write!(f, "{v:.1}"),
        }
    }
}

impl Serialize for AvgRating {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogStats {
    pub total_shops: usize,
    pub total_countries: usize,
    pub total_cities: usize,
    pub avg_rating: AvgRating,
}

/// Headline numbers for the catalog.
///
/// Cities are counted by name across all countries. The average only
/// includes shops whose rating parses to a positive number, and is rounded
/// to one decimal by [`round_to_tenth`].
#[must_use]
pub fn compute_stats(shops: &[Shop]) -> CatalogStats {
    let total_countries = unique_countries(shops).len();
    let total_cities = distinct(shops.iter().map(|s| s.city.as_deref())).len();

    let ratings: Vec<f64> = shops.iter().filter_map(Shop::rating_value).collect();
    let avg_rating = if ratings.is_empty() {
        AvgRating::NoData
    } else {
        #[allow(clippy::cast_precision_loss)]
        let mean = ratings.iter().sum::<f64>() / ratings.len() as f64;
        AvgRating::Value(round_to_tenth(mean))
    };

    CatalogStats {
        total_shops: shops.len(),
        total_countries,
        total_cities,
        avg_rating,
    }
}

/// Rounds to one decimal using the exact binary value of `value`.
///
/// `4.35` is stored just below 4.35 and rounds down to `4.3`. Only values that
/// sit exactly halfway between two tenths (odd multiples of 0.25, such as
/// `4.25`) round up.
#[must_use]
#[allow(clippy::float_cmp)]
pub fn round_to_tenth(value: f64) -> f64 {
    let quarters = value * 4.0;
    if quarters.fract() == 0.0 && quarters.rem_euclid(2.0) == 1.0 {
        return (value * 10.0).round() / 10.0;
    }
    format!("{value:.1}").parse().unwrap_or(value)
}

#[cfg(test)]
#[path = "catalog_test.rs"]
mod tests;
