//! Explicit application state for the directory view.
//!
//! Input handlers mutate the state and get back a [`Ticket`] stamped with the
//! new generation. Work that completes asynchronously carries the ticket it
//! was started with and is only applied while that ticket is still current,
//! so a late response can never overwrite a newer one.

use crate::catalog::{
    business_type_options, city_options_for, compute_stats, country_options, CatalogStats,
    FacetOption,
};
use crate::criteria::FilterCriteria;
use crate::filter::{apply_filters, FilteredResult};
use crate::personalization::PersonalizationContext;
use crate::shop::Shop;

/// Monotonic stamp of a state mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

impl Ticket {
    #[must_use]
    pub fn generation(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone)]
pub struct DirectoryState {
    shops: Vec<Shop>,
    countries: Vec<FacetOption>,
    business_types: Vec<FacetOption>,
    stats: CatalogStats,
    criteria: FilterCriteria,
    personalization: PersonalizationContext,
    generation: u64,
}

impl DirectoryState {
    /// Takes ownership of the loaded catalog and computes the option sets
    /// and statistics once.
    #[must_use]
    pub fn new(shops: Vec<Shop>) -> Self {
        let countries = country_options(&shops);
        let business_types = business_type_options(&shops);
        let stats = compute_stats(&shops);
        Self {
            shops,
            countries,
            business_types,
            stats,
            criteria: FilterCriteria::default(),
            personalization: PersonalizationContext::default(),
            generation: 0,
        }
    }

    #[must_use]
    pub fn shops(&self) -> &[Shop] {
        &self.shops
    }

    #[must_use]
    pub fn countries(&self) -> &[FacetOption] {
        &self.countries
    }

    #[must_use]
    pub fn business_types(&self) -> &[FacetOption] {
        &self.business_types
    }

    /// Cities for the selected country; empty while no country is selected.
    #[must_use]
    pub fn cities(&self) -> Vec<FacetOption> {
        self.criteria
            .country()
            .map(|c| city_options_for(&self.shops, c))
            .unwrap_or_default()
    }

    #[must_use]
    pub fn stats(&self) -> &CatalogStats {
        &self.stats
    }

    #[must_use]
    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    #[must_use]
    pub fn personalization(&self) -> &PersonalizationContext {
        &self.personalization
    }

    /// Ticket for the current generation.
    #[must_use]
    pub fn ticket(&self) -> Ticket {
        Ticket(self.generation)
    }

    #[must_use]
    pub fn is_current(&self, ticket: Ticket) -> bool {
        ticket.0 == self.generation
    }

    pub fn set_search(&mut self, text: impl Into<String>) -> Ticket {
        self.criteria.search = text.into();
        self.bump()
    }

    /// Selects a country. City and business type are reset and the city
    /// options for the new country are returned.
    pub fn select_country(&mut self, country: Option<String>) -> (Ticket, Vec<FacetOption>) {
        self.criteria.country = country;
        self.criteria.city = None;
        self.criteria.business_type = None;
        (self.bump(), self.cities())
    }

    /// Selects a city and resets the business type.
    pub fn select_city(&mut self, city: Option<String>) -> Ticket {
        self.criteria.city = city;
        self.criteria.business_type = None;
        self.bump()
    }

    pub fn select_business_type(&mut self, business_type: Option<String>) -> Ticket {
        self.criteria.business_type = business_type;
        self.bump()
    }

    /// Replaces all criteria at once.
    pub fn set_criteria(&mut self, criteria: FilterCriteria) -> Ticket {
        self.criteria = criteria;
        self.bump()
    }

    /// Applies a personalization result computed under `ticket`.
    ///
    /// Returns `false` and leaves the state untouched when the state moved on
    /// since the ticket was taken.
    pub fn apply_personalization(
        &mut self,
        ticket: Ticket,
        personalization: PersonalizationContext,
    ) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.personalization = personalization;
        self.bump();
        true
    }

    /// Installs a personalization context unconditionally.
    pub fn set_personalization(&mut self, personalization: PersonalizationContext) -> Ticket {
        self.personalization = personalization;
        self.bump()
    }

    /// Drops personalization and shows every shop again.
    pub fn clear_personalization(&mut self) -> Ticket {
        self.personalization = PersonalizationContext::default();
        self.bump()
    }

    /// Runs the filter engine against the current state.
    #[must_use]
    pub fn results(&self) -> FilteredResult<'_> {
        apply_filters(&self.shops, &self.criteria, &self.personalization)
    }

    fn bump(&mut self) -> Ticket {
        self.generation += 1;
        Ticket(self.generation)
    }
}
