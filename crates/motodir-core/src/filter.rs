//! Filter & rank engine over the in-memory shop catalog.
//!
//! A shop is kept when every active predicate holds:
//!
//! | Predicate | Active when | Match rule |
//! |---|---|---|
//! | search | search text is not blank | case-insensitive substring of name, city, country, business type or address |
//! | country | country is not blank | exact equality |
//! | city | city is not blank | exact equality |
//! | business type | type is not blank | trimmed, lower-cased equality |
//! | brand | personalization has brands | some brand is a substring of `name services description specialties` |
//!
//! With brands present the kept shops are then stable-sorted by the number of
//! distinct brands found in `name services description`, most hits first.
//! Without brands the catalog order is preserved.
//!
//! Brand matching is plain substring containment, so a short brand can match
//! inside an unrelated word. That is accepted behaviour.

use std::cmp::Reverse;

use crate::criteria::FilterCriteria;
use crate::personalization::PersonalizationContext;
use crate::shop::Shop;

/// Ordered shops that passed the filters, borrowed from the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct FilteredResult<'a> {
    shops: Vec<&'a Shop>,
}

impl<'a> FilteredResult<'a> {
    #[must_use]
    pub fn shops(&self) -> &[&'a Shop] {
        &self.shops
    }

    /// Result count shown next to the list.
    #[must_use]
    pub fn len(&self) -> usize {
        self.shops.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shops.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Shop> + '_ {
        self.shops.iter().copied()
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<&'a Shop> {
        self.shops
    }
}

/// Applies `criteria` and `personalization` to `shops`.
#[must_use]
pub fn apply_filters<'a>(
    shops: &'a [Shop],
    criteria: &FilterCriteria,
    personalization: &PersonalizationContext,
) -> FilteredResult<'a> {
    let search = criteria.search_term().map(str::to_lowercase);
    let country = criteria.country();
    let city = criteria.city();
    let business_type = criteria.business_type().map(|t| t.trim().to_lowercase());

    let kept = shops.iter().filter(|shop| {
        search.as_deref().is_none_or(|term| matches_search(shop, term))
            && country.is_none_or(|c| shop.country.as_deref() == Some(c))
            && city.is_none_or(|c| shop.city.as_deref() == Some(c))
            && business_type
                .as_deref()
                .is_none_or(|t| matches_business_type(shop, t))
            && (personalization.is_empty()
                || personalization.hits_in(&brand_match_text(shop)) > 0)
    });

    if personalization.is_empty() {
        return FilteredResult {
            shops: kept.collect(),
        };
    }

    let mut ranked: Vec<(usize, &Shop)> = kept
        .map(|shop| (personalization.hits_in(&brand_rank_text(shop)), shop))
        .collect();
    // `sort_by_key` is stable: equal hit counts keep their filtered order.
    ranked.sort_by_key(|(hits, _)| Reverse(*hits));

    FilteredResult {
        shops: ranked.into_iter().map(|(_, shop)| shop).collect(),
    }
}

/// `term` must already be lower-cased.
fn matches_search(shop: &Shop, term: &str) -> bool {
    [
        &shop.name,
        &shop.city,
        &shop.country,
        &shop.business_type,
        &shop.address,
    ]
    .into_iter()
    .any(|field| {
        field
            .as_deref()
            .is_some_and(|v| v.to_lowercase().contains(term))
    })
}

/// `selected` must already be trimmed and lower-cased.
fn matches_business_type(shop: &Shop, selected: &str) -> bool {
    shop.business_type
        .as_deref()
        .is_some_and(|t| t.trim().to_lowercase() == selected)
}

fn brand_match_text(shop: &Shop) -> String {
    joined_lowercase(&[
        shop.name.as_deref(),
        shop.services.as_deref(),
        shop.description.as_deref(),
        shop.specialties.as_deref(),
    ])
}

fn brand_rank_text(shop: &Shop) -> String {
    joined_lowercase(&[
        shop.name.as_deref(),
        shop.services.as_deref(),
        shop.description.as_deref(),
    ])
}

fn joined_lowercase(fields: &[Option<&str>]) -> String {
    fields
        .iter()
        .map(|f| f.unwrap_or_default())
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[cfg(test)]
#[path = "filter_test.rs"]
mod tests;
