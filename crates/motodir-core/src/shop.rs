//! Shop records as they come out of the `motorcycle_shops` table.
//!
//! ## Observed column shapes
//!
//! The table was filled by a scraper that wrote `"N/A"` for anything it could
//! not find, so most text columns carry either real text, `"N/A"`, or null.
//! `rating`, `latitude` and `longitude` are the awkward ones: depending on the
//! import they arrive as JSON numbers, numeric strings, `"N/A"`, or null.
//!
//! - `rating` is kept as raw text. Callers that need a number go through
//!   [`Shop::rating_value`], which parses a leading number the way a lenient
//!   float parser would (`"4.5"`, `"4.5 stars"` → 4.5; `"N/A"` → none).
//! - `latitude` / `longitude` become `Option<f64>`; non-numeric text is `None`.
//! - Unknown columns (`hours`, `type`, ids, timestamps) are ignored.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One directory entry describing a motorcycle-service business.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Shop {
    #[serde(default, deserialize_with = "lenient_text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub city: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub country: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub business_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub services: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub specialties: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub rating: Option<String>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub reviews_count: Option<u64>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub website: Option<String>,
    #[serde(default, deserialize_with = "lenient_coordinate")]
    pub latitude: Option<f64>,
    #[serde(default, deserialize_with = "lenient_coordinate")]
    pub longitude: Option<f64>,
}

impl Shop {
    /// Numeric rating, if the raw value starts with a positive finite number.
    #[must_use]
    pub fn rating_value(&self) -> Option<f64> {
        self.rating
            .as_deref()
            .and_then(parse_leading_number)
            .filter(|r| r.is_finite() && *r > 0.0)
    }

    /// Coordinates when both halves are present.
    #[must_use]
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        Some((self.latitude?, self.longitude?))
    }
}

/// Parses the longest numeric prefix of `raw` after leading whitespace.
///
/// Accepts an optional sign, digits with an optional fractional part, and an
/// optional exponent. Returns `None` when no digits are found.
#[must_use]
pub fn parse_leading_number(raw: &str) -> Option<f64> {
    let s = raw.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        if digits > 0 {
            end = frac_end;
        }
    }

    if digits == 0 {
        return None;
    }

    // Exponent only counts when it carries at least one digit.
    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && matches!(bytes[exp_end], b'+' | b'-') {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    s[..end].parse::<f64>().ok()
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

fn lenient_coordinate<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|v| v.is_finite()))
}

fn lenient_count<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n.as_u64(),
        Some(Value::String(s)) => s.trim().parse::<u64>().ok(),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn deserializes_scraper_row_with_placeholders() {
        let shop: Shop = serde_json::from_value(json!({
            "id": 17,
            "name": "Moto Rossi",
            "country": "Italy",
            "city": "Roma",
            "address": "Via Appia 12, Roma",
            "phone": "N/A",
            "website": "N/A",
            "rating": 4.6,
            "reviews_count": "132",
            "latitude": "41.9028",
            "longitude": 12.4964,
            "business_type": "Motorcycle Repair Shop",
            "hours": "N/A"
        }))
        .unwrap();

        assert_eq!(shop.name.as_deref(), Some("Moto Rossi"));
        assert_eq!(shop.rating.as_deref(), Some("4.6"));
        assert_eq!(shop.reviews_count, Some(132));
        assert_eq!(shop.coordinates(), Some((41.9028, 12.4964)));
        assert!(shop.services.is_none());
    }

    #[test]
    fn non_numeric_coordinates_become_none() {
        let shop: Shop =
            serde_json::from_value(json!({"latitude": "N/A", "longitude": null})).unwrap();
        assert!(shop.latitude.is_none());
        assert!(shop.coordinates().is_none());
    }

    #[test]
    fn rating_value_ignores_placeholder_and_non_positive() {
        let mut shop = Shop {
            rating: Some("N/A".into()),
            ..Shop::default()
        };
        assert!(shop.rating_value().is_none());

        shop.rating = Some("0".into());
        assert!(shop.rating_value().is_none());

        shop.rating = Some("-3".into());
        assert!(shop.rating_value().is_none());

        shop.rating = Some(" 4.5 stars".into());
        assert_eq!(shop.rating_value(), Some(4.5));
    }

    #[test]
    fn parse_leading_number_variants() {
        assert_eq!(parse_leading_number("4"), Some(4.0));
        assert_eq!(parse_leading_number(".5"), Some(0.5));
        assert_eq!(parse_leading_number("3."), Some(3.0));
        assert_eq!(parse_leading_number("1e2x"), Some(100.0));
        assert_eq!(parse_leading_number("2e"), Some(2.0));
        assert_eq!(parse_leading_number("-1.5"), Some(-1.5));
        assert!(parse_leading_number("abc").is_none());
        assert!(parse_leading_number(".").is_none());
        assert!(parse_leading_number("").is_none());
    }
}
