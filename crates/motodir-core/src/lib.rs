//! Domain model and pure logic for the motorcycle shop directory.
//!
//! Nothing in this crate performs I/O apart from reading configuration from
//! the environment.

pub mod account;
pub mod app_config;
pub mod catalog;
pub mod config;
pub mod criteria;
pub mod error;
pub mod filter;
pub mod notice;
pub mod personalization;
pub mod render;
pub mod shop;
pub mod state;
pub mod validation;
pub mod view;

pub use account::{
    AuthUser, Bike, BikeBrand, BikePhoto, BikeRecord, BikerProfile, NewBikePhoto,
    NewBikerProfile, NewServiceDocument, ProfilePatch, RecordId, ServiceDocument, Session,
    UserMetadata,
};
pub use app_config::{AppConfig, Environment};
pub use catalog::{
    business_type_options, city_options_for, compute_stats, country_options, unique_business_types,
    unique_cities_for, unique_countries, AvgRating, CatalogStats, FacetOption,
};
pub use config::{load_app_config, load_app_config_from_env};
pub use criteria::FilterCriteria;
pub use error::{ConfigError, ValidationError};
pub use filter::{apply_filters, FilteredResult};
pub use notice::{Notice, NoticeLevel};
pub use personalization::PersonalizationContext;
pub use render::{map_url, BikeCard, ShopCard};
pub use shop::Shop;
pub use state::{DirectoryState, Ticket};
pub use validation::{BikeForm, ProfileUpdate, Registration};
pub use view::{Navigator, View, ViewEntered};
