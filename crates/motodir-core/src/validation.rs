//! Form validation. Everything here runs before a request is built, so a
//! rejected form never reaches the backend.

use serde::{Deserialize, Serialize};

use crate::account::{BikeRecord, RecordId};
use crate::error::ValidationError;

pub const MIN_PASSWORD_LEN: usize = 6;
pub const MIN_BIKE_YEAR: i32 = 1885;
pub const MAX_BIKE_YEAR: i32 = 2100;

/// Sign-up form as entered.
#[derive(Clone, Default, Deserialize)]
pub struct Registration {
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub password: String,
}

impl std::fmt::Debug for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration")
            .field("full_name", &self.full_name)
            .field("email", &self.email)
            .field("phone", &self.phone)
            .field("password", &"[redacted]")
            .finish()
    }
}

impl Registration {
    /// Trims the text fields and checks required values.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::Required`] for a blank name, e-mail or
    /// password and [`ValidationError::PasswordTooShort`] for a password under
    /// [`MIN_PASSWORD_LEN`] characters.
    pub fn validate(self) -> Result<Self, ValidationError> {
        let full_name = required("full name", &self.full_name)?;
        let email = required("email", &self.email)?;
        if self.password.is_empty() {
            return Err(ValidationError::Required("password"));
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(ValidationError::PasswordTooShort {
                min: MIN_PASSWORD_LEN,
            });
        }
        Ok(Self {
            full_name,
            email,
            phone: optional(self.phone.as_deref()),
            password: self.password,
        })
    }
}

/// Profile edit form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub full_name: String,
    pub phone: Option<String>,
}

impl ProfileUpdate {
    /// # Errors
    ///
    /// Returns [`ValidationError::Required`] when the full name is blank.
    pub fn validate(self) -> Result<Self, ValidationError> {
        Ok(Self {
            full_name: required("full name", &self.full_name)?,
            phone: optional(self.phone.as_deref()),
        })
    }
}

/// Bike form with every field still in its entered text form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BikeForm {
    pub brand: String,
    pub model: String,
    pub year: String,
    pub mileage: String,
    pub color: Option<String>,
    pub engine_size: Option<String>,
    pub vin: Option<String>,
    pub license_plate: Option<String>,
    pub notes: Option<String>,
}

impl BikeForm {
    /// Validates the form and produces the row to store for `biker_id`.
    ///
    /// Blank optional fields are stored as null.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] when brand or model is blank, the year is
    /// not an integer within [`MIN_BIKE_YEAR`]`..=`[`MAX_BIKE_YEAR`], or the
    /// mileage is not a non-negative integer.
    pub fn into_record(self, biker_id: RecordId) -> Result<BikeRecord, ValidationError> {
        let brand = required("brand", &self.brand)?;
        let model = required("model", &self.model)?;

        let year_raw = required("year", &self.year)?;
        let year: i32 = year_raw.parse().map_err(|_| ValidationError::Invalid {
            field: "year",
            reason: format!("'{year_raw}' is not a whole number"),
        })?;
        if !(MIN_BIKE_YEAR..=MAX_BIKE_YEAR).contains(&year) {
            return Err(ValidationError::Invalid {
                field: "year",
                reason: format!("must be between {MIN_BIKE_YEAR} and {MAX_BIKE_YEAR}"),
            });
        }

        let mileage_raw = required("mileage", &self.mileage)?;
        let mileage: i64 = mileage_raw.parse().map_err(|_| ValidationError::Invalid {
            field: "mileage",
            reason: format!("'{mileage_raw}' is not a whole number"),
        })?;
        if mileage < 0 {
            return Err(ValidationError::Invalid {
                field: "mileage",
                reason: "must not be negative".to_string(),
            });
        }

        Ok(BikeRecord {
            biker_id,
            brand,
            model,
            year,
            mileage,
            color: optional(self.color.as_deref()),
            engine_size: optional(self.engine_size.as_deref()),
            vin: optional(self.vin.as_deref()),
            license_plate: optional(self.license_plate.as_deref()),
            notes: optional(self.notes.as_deref()),
        })
    }
}

fn required(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ValidationError::Required(field))
    } else {
        Ok(trimmed.to_string())
    }
}

fn optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registration(password: &str) -> Registration {
        Registration {
            full_name: " Ada Rider ".into(),
            email: "ada@example.com".into(),
            phone: Some(String::new()),
            password: password.into(),
        }
    }

    fn bike_form(year: &str, mileage: &str) -> BikeForm {
        BikeForm {
            brand: "Honda".into(),
            model: "CBR600".into(),
            year: year.into(),
            mileage: mileage.into(),
            color: Some("  ".into()),
            vin: Some("JH2PC".into()),
            ..BikeForm::default()
        }
    }

    #[test]
    fn registration_requires_six_character_password() {
        assert_eq!(
            registration("12345").validate().unwrap_err(),
            ValidationError::PasswordTooShort { min: 6 }
        );
        assert_eq!(
            registration("").validate().unwrap_err(),
            ValidationError::Required("password")
        );
        let ok = registration("123456").validate().unwrap();
        assert_eq!(ok.full_name, "Ada Rider");
        assert!(ok.phone.is_none());
    }

    #[test]
    fn registration_requires_name_and_email() {
        let mut form = registration("secret1");
        form.full_name = "   ".into();
        assert_eq!(
            form.validate().unwrap_err(),
            ValidationError::Required("full name")
        );

        let mut form = registration("secret1");
        form.email = String::new();
        assert_eq!(form.validate().unwrap_err(), ValidationError::Required("email"));
    }

    #[test]
    fn registration_debug_hides_password() {
        let debug = format!("{:?}", registration("topsecret"));
        assert!(!debug.contains("topsecret"));
    }

    #[test]
    fn profile_update_requires_name() {
        let update = ProfileUpdate {
            full_name: " ".into(),
            phone: None,
        };
        assert_eq!(
            update.validate().unwrap_err(),
            ValidationError::Required("full name")
        );
    }

    #[test]
    fn bike_form_builds_record() {
        let record = bike_form("2019", "12500")
            .into_record(RecordId::new("7"))
            .unwrap();
        assert_eq!(record.biker_id.as_str(), "7");
        assert_eq!(record.year, 2019);
        assert_eq!(record.mileage, 12_500);
        assert!(record.color.is_none());
        assert_eq!(record.vin.as_deref(), Some("JH2PC"));
    }

    #[test]
    fn bike_form_rejects_bad_year() {
        for year in ["1884", "2101", "20x9", "2019.5", ""] {
            let err = bike_form(year, "0").into_record(RecordId::new("1"));
            assert!(err.is_err(), "year {year:?} should be rejected");
        }
        assert!(bike_form("1885", "0").into_record(RecordId::new("1")).is_ok());
        assert!(bike_form("2100", "0").into_record(RecordId::new("1")).is_ok());
    }

    #[test]
    fn bike_form_rejects_negative_or_fractional_mileage() {
        let err = bike_form("2019", "-1")
            .into_record(RecordId::new("1"))
            .unwrap_err();
        assert!(matches!(err, ValidationError::Invalid { field: "mileage", .. }));
        assert!(bike_form("2019", "10.5")
            .into_record(RecordId::new("1"))
            .is_err());
    }

    #[test]
    fn bike_form_requires_brand_and_model() {
        let mut form = bike_form("2019", "0");
        form.model = " ".into();
        assert_eq!(
            form.into_record(RecordId::new("1")).unwrap_err(),
            ValidationError::Required("model")
        );
    }
}
