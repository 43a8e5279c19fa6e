//! The signed-in biker's garage: bikes, their photos and service documents.

use std::path::Path;

use chrono::Utc;
use motodir_core::{
    Bike, BikeForm, BikePhoto, BikerProfile, NewBikePhoto, NewServiceDocument, RecordId,
    ServiceDocument,
};
use motodir_gateway::{Gateway, GatewayError, Query};

use crate::error::DirectoryError;

pub const BIKES_TABLE: &str = "bikes";
pub const BIKE_PHOTOS_TABLE: &str = "bike_photos";
pub const SERVICE_DOCUMENTS_TABLE: &str = "service_documents";
pub const DEFAULT_BUCKET: &str = "images";

const BIKE_WITH_ATTACHMENTS: &str = "*, bike_photos(*), service_documents(*)";

/// A file picked for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Outcome of uploading several photos. Failed files are skipped.
#[derive(Debug, Default)]
pub struct PhotoUploadReport {
    pub uploaded: Vec<BikePhoto>,
    pub failed: Vec<(String, DirectoryError)>,
}

/// Bikes of `profile`, newest first, with photos and documents attached.
///
/// # Errors
///
/// Returns any [`GatewayError`].
pub async fn list_bikes<G: Gateway>(
    gateway: &G,
    profile: &BikerProfile,
) -> Result<Vec<Bike>, GatewayError> {
    let query = Query::new()
        .select(BIKE_WITH_ATTACHMENTS)
        .eq("biker_id", &profile.id)
        .order_by("created_at", true);
    gateway.fetch_many(BIKES_TABLE, &query).await
}

/// # Errors
///
/// Returns [`DirectoryError::BikeNotFound`] when `profile` owns no bike with
/// that id.
pub async fn get_bike<G: Gateway>(
    gateway: &G,
    profile: &BikerProfile,
    id: &RecordId,
) -> Result<Bike, DirectoryError> {
    let query = Query::new()
        .select(BIKE_WITH_ATTACHMENTS)
        .eq("id", id)
        .eq("biker_id", &profile.id);
    gateway
        .fetch_one(BIKES_TABLE, &query)
        .await?
        .ok_or_else(|| DirectoryError::BikeNotFound(id.clone()))
}

/// Inserts a new bike, or updates `existing` when given.
///
/// # Errors
///
/// Returns [`DirectoryError::Validation`] before any request when the form is
/// invalid, [`DirectoryError::BikeNotFound`] when `existing` does not exist,
/// and [`DirectoryError::DataAccess`] for backend failures.
pub async fn save_bike<G: Gateway>(
    gateway: &G,
    profile: &BikerProfile,
    existing: Option<&RecordId>,
    form: BikeForm,
) -> Result<Bike, DirectoryError> {
    let record = form.into_record(profile.id.clone())?;
    let saved: Bike = match existing {
        Some(id) => gateway
            .update(BIKES_TABLE, id, &record)
            .await
            .map_err(|e| match e {
                GatewayError::NotFound { .. } => DirectoryError::BikeNotFound(id.clone()),
                other => other.into(),
            })?,
        None => gateway.insert(BIKES_TABLE, &record).await?,
    };
    tracing::info!(bike_id = %saved.id, updated = existing.is_some(), "bike saved");
    Ok(saved)
}

/// Deletes a bike. Photos and documents go with it through the backend's
/// cascading foreign keys.
///
/// # Errors
///
/// Returns any backend failure.
pub async fn delete_bike<G: Gateway>(gateway: &G, id: &RecordId) -> Result<(), DirectoryError> {
    gateway.delete(BIKES_TABLE, id).await?;
    tracing::info!(bike_id = %id, "bike deleted");
    Ok(())
}

/// # Errors
///
/// Returns any backend failure.
pub async fn delete_photo<G: Gateway>(gateway: &G, id: &RecordId) -> Result<(), DirectoryError> {
    gateway.delete(BIKE_PHOTOS_TABLE, id).await?;
    Ok(())
}

/// # Errors
///
/// Returns any backend failure.
pub async fn delete_document<G: Gateway>(
    gateway: &G,
    id: &RecordId,
) -> Result<(), DirectoryError> {
    gateway.delete(SERVICE_DOCUMENTS_TABLE, id).await?;
    Ok(())
}

/// Blob path `<bike_id>/<millis>[_<index>].<ext>`.
#[must_use]
pub fn blob_path(
    bike_id: &RecordId,
    millis: i64,
    index: Option<usize>,
    file_name: &str,
) -> String {
    let ext = extension(file_name);
    match index {
        Some(i) => format!("{bike_id}/{millis}_{i}.{ext}"),
        None => format!("{bike_id}/{millis}.{ext}"),
    }
}

fn extension(file_name: &str) -> String {
    Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty())
        .map_or_else(|| "bin".to_owned(), str::to_ascii_lowercase)
}

#[must_use]
pub fn content_type_for(file_name: &str) -> &'static str {
    match extension(file_name).as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "heic" => "image/heic",
        "pdf" => "application/pdf",
        _ => "application/octet-stream",
    }
}

async fn store_blob<G: Gateway>(
    gateway: &G,
    bucket: &str,
    bike_id: &RecordId,
    index: Option<usize>,
    upload: &Upload,
) -> Result<String, GatewayError> {
    let path = blob_path(bike_id, Utc::now().timestamp_millis(), index, &upload.file_name);
    gateway
        .upload_blob(
            bucket,
            &path,
            upload.bytes.clone(),
            content_type_for(&upload.file_name),
        )
        .await
}

/// Stores one photo and records it against the bike.
///
/// # Errors
///
/// Returns the upload or insert failure.
pub async fn upload_photo<G: Gateway>(
    gateway: &G,
    bucket: &str,
    bike_id: &RecordId,
    upload: &Upload,
    is_primary: bool,
) -> Result<BikePhoto, DirectoryError> {
    upload_photo_at(gateway, bucket, bike_id, None, upload, is_primary).await
}

async fn upload_photo_at<G: Gateway>(
    gateway: &G,
    bucket: &str,
    bike_id: &RecordId,
    index: Option<usize>,
    upload: &Upload,
    is_primary: bool,
) -> Result<BikePhoto, DirectoryError> {
    let photo_url = store_blob(gateway, bucket, bike_id, index, upload).await?;
    let photo = NewBikePhoto {
        bike_id: bike_id.clone(),
        photo_url,
        is_primary,
    };
    Ok(gateway.insert(BIKE_PHOTOS_TABLE, &photo).await?)
}

/// Uploads the photos picked while saving a bike. The first file is the
/// primary photo; each failure is logged, reported and skipped.
pub async fn upload_photos<G: Gateway>(
    gateway: &G,
    bucket: &str,
    bike_id: &RecordId,
    uploads: &[Upload],
) -> PhotoUploadReport {
    let mut report = PhotoUploadReport::default();
    for (i, upload) in uploads.iter().enumerate() {
        match upload_photo_at(gateway, bucket, bike_id, Some(i), upload, i == 0).await {
            Ok(photo) => report.uploaded.push(photo),
            Err(e) => {
                tracing::warn!(
                    bike_id = %bike_id,
                    file = %upload.file_name,
                    error = %e,
                    "photo upload failed"
                );
                report.failed.push((upload.file_name.clone(), e));
            }
        }
    }
    report
}

/// Stores a service document and records it against the bike.
///
/// # Errors
///
/// Returns [`DirectoryError::Validation`] for a blank document name, or the
/// upload or insert failure.
pub async fn upload_document<G: Gateway>(
    gateway: &G,
    bucket: &str,
    bike_id: &RecordId,
    upload: &Upload,
    document_name: &str,
) -> Result<ServiceDocument, DirectoryError> {
    let document_name = document_name.trim();
    if document_name.is_empty() {
        return Err(motodir_core::ValidationError::Required("document name").into());
    }
    let document_url = store_blob(gateway, bucket, bike_id, None, upload).await?;
    let document = NewServiceDocument {
        bike_id: bike_id.clone(),
        document_url,
        document_name: document_name.to_owned(),
    };
    Ok(gateway.insert(SERVICE_DOCUMENTS_TABLE, &document).await?)
}
