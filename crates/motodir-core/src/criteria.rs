use serde::{Deserialize, Serialize};

/// The user's current filter choices.
///
/// Every field is optional in practice: a blank or whitespace-only value means
/// "any" and matches every shop.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCriteria {
    /// Case-insensitive substring searched in name, city, country, business
    /// type and address.
    #[serde(default)]
    pub search: String,
    /// Exact country value.
    #[serde(default)]
    pub country: Option<String>,
    /// Exact city value. Only meaningful once a country is chosen; clearing it
    /// on country change is the caller's job.
    #[serde(default)]
    pub city: Option<String>,
    /// Business type, compared trimmed and case-insensitively.
    #[serde(default)]
    pub business_type: Option<String>,
}

impl FilterCriteria {
    #[must_use]
    pub fn search_term(&self) -> Option<&str> {
        active(Some(self.search.as_str()))
    }

    #[must_use]
    pub fn country(&self) -> Option<&str> {
        active(self.country.as_deref())
    }

    #[must_use]
    pub fn city(&self) -> Option<&str> {
        active(self.city.as_deref())
    }

    #[must_use]
    pub fn business_type(&self) -> Option<&str> {
        active(self.business_type.as_deref())
    }

    /// True when no criterion is active.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.search_term().is_none()
            && self.country().is_none()
            && self.city().is_none()
            && self.business_type().is_none()
    }
}

fn active(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
