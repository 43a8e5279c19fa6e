//! Bike command handlers: the signed-in biker's garage.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Args, Subcommand};
use motodir_core::{Bike, BikeCard, BikeForm, BikerProfile, RecordId};
use motodir_directory::bikes::{
    delete_bike, delete_document, delete_photo, get_bike, list_bikes, save_bike, upload_document,
    upload_photo, upload_photos,
};
use motodir_directory::profile::get_or_create_profile;
use motodir_directory::Upload;

use crate::Context;

/// Sub-commands available under `bikes`.
#[derive(Debug, Subcommand)]
pub enum BikesCommands {
    /// List your bikes, newest first
    List,
    /// Show one bike with its photos and documents
    Show { id: String },
    /// Add a bike
    Add {
        #[command(flatten)]
        fields: NewBikeArgs,
        /// Photos to upload; the first becomes the primary photo
        #[arg(long = "photo")]
        photos: Vec<PathBuf>,
    },
    /// Change fields of a bike; omitted fields keep their value
    Edit {
        id: String,
        #[command(flatten)]
        fields: EditBikeArgs,
    },
    /// Delete a bike with its photos and documents
    Delete { id: String },
    /// Upload a photo for a bike
    UploadPhoto {
        id: String,
        path: PathBuf,
        /// Mark the photo as the primary one
        #[arg(long)]
        primary: bool,
    },
    /// Upload a service document for a bike
    UploadDoc {
        id: String,
        path: PathBuf,
        /// Document name shown in listings
        #[arg(long)]
        name: String,
    },
    /// Delete a photo by id
    DeletePhoto { id: String },
    /// Delete a service document by id
    DeleteDoc { id: String },
}

#[derive(Debug, Args)]
pub struct NewBikeArgs {
    #[arg(long)]
    pub brand: String,
    #[arg(long)]
    pub model: String,
    #[arg(long)]
    pub year: String,
    /// Mileage in km
    #[arg(long)]
    pub mileage: String,
    #[arg(long)]
    pub color: Option<String>,
    #[arg(long)]
    pub engine_size: Option<String>,
    #[arg(long)]
    pub vin: Option<String>,
    #[arg(long)]
    pub license_plate: Option<String>,
    #[arg(long)]
    pub notes: Option<String>,
}

impl From<NewBikeArgs> for BikeForm {
    fn from(args: NewBikeArgs) -> Self {
        Self {
            brand: args.brand,
            model: args.model,
            year: args.year,
            mileage: args.mileage,
            color: args.color,
            engine_size: args.engine_size,
            vin: args.vin,
            license_plate: args.license_plate,
            notes: args.notes,
        }
    }
}

#[derive(Debug, Args)]
pub struct EditBikeArgs {
    #[arg(long)]
    pub brand: Option<String>,
    #[arg(long)]
    pub model: Option<String>,
    #[arg(long)]
    pub year: Option<String>,
    #[arg(long)]
    pub mileage: Option<String>,
    #[arg(long)]
    pub color: Option<String>,
    #[arg(long)]
    pub engine_size: Option<String>,
    #[arg(long)]
    pub vin: Option<String>,
    #[arg(long)]
    pub license_plate: Option<String>,
    #[arg(long)]
    pub notes: Option<String>,
}

impl EditBikeArgs {
    /// The stored bike as a form, with the given fields replaced.
    fn apply_to(self, bike: &Bike) -> BikeForm {
        BikeForm {
            brand: self.brand.unwrap_or_else(|| bike.brand.clone()),
            model: self.model.unwrap_or_else(|| bike.model.clone()),
            year: self
                .year
                .or_else(|| bike.year.map(|y| y.to_string()))
                .unwrap_or_default(),
            mileage: self
                .mileage
                .or_else(|| bike.mileage.map(|m| m.to_string()))
                .unwrap_or_default(),
            color: self.color.or_else(|| bike.color.clone()),
            engine_size: self.engine_size.or_else(|| bike.engine_size.clone()),
            vin: self.vin.or_else(|| bike.vin.clone()),
            license_plate: self.license_plate.or_else(|| bike.license_plate.clone()),
            notes: self.notes.or_else(|| bike.notes.clone()),
        }
    }
}

async fn read_upload(path: &Path) -> anyhow::Result<Upload> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .with_context(|| format!("{} is not a file", path.display()))?;
    Ok(Upload { file_name, bytes })
}

async fn signed_in_profile(ctx: &Context) -> anyhow::Result<BikerProfile> {
    let session = ctx.sign_in().await?;
    get_or_create_profile(ctx.gateway.as_ref(), &session.user)
        .await
        .context("failed to load profile")
}

/// # Errors
///
/// Returns an error if sign-in fails, a file cannot be read, or a backend
/// call fails. Individual photo upload failures while adding a bike are
/// reported and skipped.
pub(crate) async fn run_bikes(ctx: &Context, command: BikesCommands) -> anyhow::Result<()> {
    let profile = signed_in_profile(ctx).await?;
    let gateway = ctx.gateway.as_ref();
    let bucket = ctx.config.storage_bucket.as_str();

    match command {
        BikesCommands::List => {
            let bikes = list_bikes(gateway, &profile).await?;
            if bikes.is_empty() {
                println!("no bikes yet; add one with `motodir bikes add`");
            }
            for bike in &bikes {
                print!("{}", BikeCard::from(bike));
            }
        }
        BikesCommands::Show { id } => {
            let bike = get_bike(gateway, &profile, &RecordId::new(id)).await?;
            print!("{}", BikeCard::from(&bike));
            for photo in &bike.bike_photos {
                let marker = if photo.is_primary { " (primary)" } else { "" };
                println!("  photo #{}{marker}: {}", photo.id, photo.photo_url);
            }
            for document in &bike.service_documents {
                println!(
                    "  document #{} {}: {}",
                    document.id, document.document_name, document.document_url
                );
            }
        }
        BikesCommands::Add { fields, photos } => {
            let mut uploads = Vec::with_capacity(photos.len());
            for path in &photos {
                uploads.push(read_upload(path).await?);
            }
            let bike = save_bike(gateway, &profile, None, fields.into()).await?;
            println!("bike saved: #{} {}", bike.id, bike.label());

            if !uploads.is_empty() {
                let report = upload_photos(gateway, bucket, &bike.id, &uploads).await;
                println!("{} photo(s) uploaded", report.uploaded.len());
                for (file, error) in &report.failed {
                    println!("failed to upload {file}: {error}");
                }
            }
        }
        BikesCommands::Edit { id, fields } => {
            let id = RecordId::new(id);
            let existing = get_bike(gateway, &profile, &id).await?;
            let bike = save_bike(gateway, &profile, Some(&id), fields.apply_to(&existing)).await?;
            println!("bike updated: #{} {}", bike.id, bike.label());
        }
        BikesCommands::Delete { id } => {
            let id = RecordId::new(id);
            let bike = get_bike(gateway, &profile, &id).await?;
            delete_bike(gateway, &id).await?;
            println!("bike deleted: {}", bike.label());
        }
        BikesCommands::UploadPhoto { id, path, primary } => {
            let bike = get_bike(gateway, &profile, &RecordId::new(id)).await?;
            let upload = read_upload(&path).await?;
            let photo = upload_photo(gateway, bucket, &bike.id, &upload, primary).await?;
            println!("photo uploaded: {}", photo.photo_url);
        }
        BikesCommands::UploadDoc { id, path, name } => {
            let bike = get_bike(gateway, &profile, &RecordId::new(id)).await?;
            let upload = read_upload(&path).await?;
            let document = upload_document(gateway, bucket, &bike.id, &upload, &name).await?;
            println!(
                "document uploaded: {} ({})",
                document.document_name, document.document_url
            );
        }
        BikesCommands::DeletePhoto { id } => {
            delete_photo(gateway, &RecordId::new(id)).await?;
            println!("photo deleted");
        }
        BikesCommands::DeleteDoc { id } => {
            delete_document(gateway, &RecordId::new(id)).await?;
            println!("document deleted");
        }
    }
    Ok(())
}
