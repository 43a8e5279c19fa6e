//! Account-side records: auth users and sessions, biker profiles, bikes and
//! their attached photos and service documents.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Opaque row id. Tables may use integer or text keys, so both are accepted
/// and kept as text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Value::deserialize(deserializer)? {
            Value::String(s) => Ok(Self(s)),
            Value::Number(n) => Ok(Self(n.to_string())),
            other => Err(serde::de::Error::custom(format!(
                "expected string or number id, got {other}"
            ))),
        }
    }
}

/// Free-form metadata stored on the auth user at sign-up.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserMetadata {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: UserMetadata,
}

impl AuthUser {
    /// Name to seed a new profile with: the sign-up full name, otherwise the
    /// local part of the e-mail address.
    #[must_use]
    pub fn display_name(&self) -> String {
        if let Some(name) = self
            .user_metadata
            .full_name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
        {
            return name.to_owned();
        }
        self.email
            .as_deref()
            .and_then(|e| e.split('@').next())
            .unwrap_or_default()
            .to_owned()
    }
}

/// An authenticated session as issued by the auth service.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
    pub user: AuthUser,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("access_token", &"[redacted]")
            .field(
                "refresh_token",
                &self.refresh_token.as_ref().map(|_| "[redacted]"),
            )
            .field("expires_in", &self.expires_in)
            .field("user", &self.user)
            .finish()
    }
}

/// A row of the `bikers` table, one per auth user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BikerProfile {
    pub id: RecordId,
    pub user_id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Insert payload for `bikers`.
#[derive(Debug, Clone, Serialize)]
pub struct NewBikerProfile {
    pub user_id: Uuid,
    pub email: Option<String>,
    pub full_name: String,
    pub phone: Option<String>,
}

/// Partial update payload for `bikers`.
#[derive(Debug, Clone, Serialize)]
pub struct ProfilePatch {
    pub full_name: String,
    pub phone: Option<String>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BikePhoto {
    pub id: RecordId,
    pub bike_id: RecordId,
    pub photo_url: String,
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub is_primary: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewBikePhoto {
    pub bike_id: RecordId,
    pub photo_url: String,
    pub is_primary: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceDocument {
    pub id: RecordId,
    pub bike_id: RecordId,
    pub document_url: String,
    pub document_name: String,
    #[serde(default)]
    pub service_date: Option<NaiveDate>,
    #[serde(default)]
    pub service_provider: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewServiceDocument {
    pub bike_id: RecordId,
    pub document_url: String,
    pub document_name: String,
}

/// A row of the `bikes` table. Photos and documents are only populated when
/// the query embeds them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bike {
    pub id: RecordId,
    pub biker_id: RecordId,
    pub brand: String,
    pub model: String,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub mileage: Option<i64>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub engine_size: Option<String>,
    #[serde(default)]
    pub vin: Option<String>,
    #[serde(default)]
    pub license_plate: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub bike_photos: Vec<BikePhoto>,
    #[serde(default)]
    pub service_documents: Vec<ServiceDocument>,
}

impl Bike {
    /// `"Brand Model"`, as shown in listings and the personalization banner.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{} {}", self.brand, self.model)
    }

    /// The photo flagged primary, or the first one.
    #[must_use]
    pub fn primary_photo(&self) -> Option<&BikePhoto> {
        self.bike_photos
            .iter()
            .find(|p| p.is_primary)
            .or_else(|| self.bike_photos.first())
    }
}

/// Just the columns personalization needs from `bikes`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BikeBrand {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub brand: String,
    #[serde(default)]
    pub model: Option<String>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Insert/update payload for `bikes`, produced by form validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BikeRecord {
    pub biker_id: RecordId,
    pub brand: String,
    pub model: String,
    pub year: i32,
    pub mileage: i64,
    pub color: Option<String>,
    pub engine_size: Option<String>,
    pub vin: Option<String>,
    pub license_plate: Option<String>,
    pub notes: Option<String>,
}
