//! Display projections of shops and bikes.
//!
//! Each card decides which fields are shown; the `Display` impls produce the
//! plain-text layout used by the command-line front end.

use std::fmt;

use serde::Serialize;

use crate::account::Bike;
use crate::shop::Shop;

/// Zoom level used for single-shop map links.
pub const MAP_ZOOM: u8 = 15;

const PLACEHOLDER: &str = "N/A";

/// `None` for absent values and the scraper's "N/A" placeholder.
fn shown(value: Option<&str>) -> Option<String> {
    value
        .filter(|v| !v.trim().is_empty() && *v != PLACEHOLDER)
        .map(str::to_string)
}

/// OpenStreetMap address centred on the given point.
#[must_use]
pub fn map_url(latitude: f64, longitude: f64) -> String {
    format!(
        "https://www.openstreetmap.org/?mlat={latitude}&mlon={longitude}#map={MAP_ZOOM}/{latitude}/{longitude}"
    )
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShopCard {
    pub name: String,
    pub rating: Option<String>,
    pub address: String,
    pub location: String,
    pub business_type: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub map_url: Option<String>,
}

impl From<&Shop> for ShopCard {
    fn from(shop: &Shop) -> Self {
        Self {
            name: shop.name.clone().unwrap_or_default(),
            rating: shown(shop.rating.as_deref()),
            address: shop
                .address
                .clone()
                .filter(|a| !a.is_empty())
                .unwrap_or_else(|| PLACEHOLDER.to_string()),
            location: format!(
                "{}, {}",
                shop.city.as_deref().unwrap_or_default(),
                shop.country.as_deref().unwrap_or_default()
            ),
            business_type: shop.business_type.clone().filter(|t| !t.is_empty()),
            phone: shown(shop.phone.as_deref()),
            website: shown(shop.website.as_deref()),
            map_url: shop.coordinates().map(|(lat, lng)| map_url(lat, lng)),
        }
    }
}

impl fmt::Display for ShopCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if let Some(rating) = &self.rating {
            write!(f, "  [rating {rating}]")?;
        }
        writeln!(f)?;
        writeln!(f, "  address:  {}", self.address)?;
        writeln!(f, "  location: {}", self.location)?;
        if let Some(business_type) = &self.business_type {
            writeln!(f, "  type:     {business_type}")?;
        }
        if let Some(phone) = &self.phone {
            writeln!(f, "  phone:    {phone}")?;
        }
        if let Some(website) = &self.website {
            writeln!(f, "  website:  {website}")?;
        }
        if let Some(url) = &self.map_url {
            writeln!(f, "  map:      {url}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BikeCard {
    pub id: String,
    pub title: String,
    pub year: Option<i32>,
    pub mileage_km: Option<i64>,
    pub color: Option<String>,
    pub engine_size: Option<String>,
    pub license_plate: Option<String>,
    pub vin: Option<String>,
    pub notes: Option<String>,
    pub photo_count: usize,
    pub document_count: usize,
    pub primary_photo_url: Option<String>,
}

impl From<&Bike> for BikeCard {
    fn from(bike: &Bike) -> Self {
        Self {
            id: bike.id.to_string(),
            title: bike.label(),
            year: bike.year,
            mileage_km: bike.mileage,
            color: shown(bike.color.as_deref()),
            engine_size: shown(bike.engine_size.as_deref()),
            license_plate: shown(bike.license_plate.as_deref()),
            vin: shown(bike.vin.as_deref()),
            notes: shown(bike.notes.as_deref()),
            photo_count: bike.bike_photos.len(),
            document_count: bike.service_documents.len(),
            primary_photo_url: bike.primary_photo().map(|p| p.photo_url.clone()),
        }
    }
}

/// Groups digits in thousands, e.g. `12500` as `12,500`.
fn thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if value < 0 {
        grouped.insert(0, '-');
    }
    grouped
}

impl fmt::Display for BikeCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {}", self.id, self.title)?;
        if let Some(year) = self.year {
            write!(f, " ({year})")?;
        }
        writeln!(f)?;
        if let Some(km) = self.mileage_km {
            writeln!(f, "  mileage: {} km", thousands(km))?;
        }
        for (label, value) in [
            ("color", &self.color),
            ("engine", &self.engine_size),
            ("plate", &self.license_plate),
            ("vin", &self.vin),
            ("notes", &self.notes),
        ] {
            if let Some(value) = value {
                writeln!(f, "  {label}: {value}")?;
            }
        }
        writeln!(
            f,
            "  photos: {}  documents: {}",
            self.photo_count, self.document_count
        )?;
        if let Some(url) = &self.primary_photo_url {
            writeln!(f, "  photo: {url}")?;
        }
        Ok(())
    }
}
