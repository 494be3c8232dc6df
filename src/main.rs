use admin_auth::{AuthGate, CredentialSlot, HttpAuthBackend};
use clap::{Parser, Subcommand};
use event_gallery::camera::{CaptureController, FacingMode, StillImageDevices};
use event_gallery::{
    AppError, BulkCoordinator, BulkDeleteOutcome, CollectionKind, GalleryConfig, GuestProfile,
    Photo, PhotoStore, UploadOrchestrator,
};
use photo_service::{build_client, format_date_time, HttpPhotoService};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "event-gallery", version, about = "Share and moderate event photos")]
struct Cli {
    /// Path to a TOML config file
    #[arg(long, global = true, default_value = "event-gallery.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the shared gallery
    Gallery {
        /// Only photos whose uploader matches
        #[arg(long)]
        name: Option<String>,
    },
    /// List your own photos
    Mine,
    /// Remember your display name
    SetName { name: String },
    /// Save photos to disk: a zip of the whole gallery, or a single photo
    Download {
        /// Only your own photos
        #[arg(long)]
        mine: bool,
        /// Save just this photo instead of a zip
        #[arg(long)]
        photo: Option<String>,
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },
    /// Share a photo
    Upload {
        path: PathBuf,
        /// Take the photo through the camera pipeline (9:16 capture, JPEG)
        #[arg(long)]
        capture: bool,
    },
    /// Moderation commands
    Admin {
        #[arg(long, env = "EVENT_GALLERY_ADMIN_PASSWORD", hide_env_values = true)]
        password: String,

        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// List every upload
    List,
    /// Delete photos by id
    Delete {
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Download photos as a zip (all photos if no ids are given)
    Download {
        #[arg(long, default_value = ".")]
        out: PathBuf,
        ids: Vec<String>,
    },
}

type Store = PhotoStore<HttpPhotoService>;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    env_logger::init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        log::error!("{}", e);
        eprintln!("{}", e.user_message());
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), AppError> {
    let config = GalleryConfig::load(Some(&cli.config))?;
    let service_config = config.service_config();
    let client = build_client(&service_config)?;
    let credentials = CredentialSlot::default();
    let service = Arc::new(HttpPhotoService::new(
        service_config,
        client.clone(),
        credentials.clone(),
    ));
    let store = PhotoStore::new(service);

    match cli.command {
        Command::Gallery { name } => {
            store.fetch_all(name.as_deref()).await;
            print_collection(&store, CollectionKind::All)
        }
        Command::Mine => {
            let guest = require_guest(&config.guest_profile_path)?;
            store.fetch_mine(&guest.name).await;
            print_collection(&store, CollectionKind::Mine)
        }
        Command::SetName { name } => {
            let guest = GuestProfile::new(&name)?;
            guest.save(&config.guest_profile_path)?;
            println!("Welcome, {}!", guest.name);
            Ok(())
        }
        Command::Download { mine, photo, out } => {
            let kind = if mine {
                let guest = require_guest(&config.guest_profile_path)?;
                store.fetch_mine(&guest.name).await;
                CollectionKind::Mine
            } else {
                store.fetch_all(None).await;
                CollectionKind::All
            };
            ensure_loaded(&store, kind)?;

            let bulk = BulkCoordinator::new(store.clone(), kind)
                .with_archive_name(config.archive_name.clone());
            let path = match photo {
                Some(id) => bulk.download_photo(&id).await?.save_to(&out)?,
                None => bulk.download_all().await?.save_to(&out)?,
            };
            println!("Download complete: {}", path.display());
            Ok(())
        }
        Command::Upload { path, capture } => {
            let guest = require_guest(&config.guest_profile_path)?;
            let photo = upload(&config, &store, &guest, &path, capture).await?;
            println!("Thanks {}! Your photo is added ({}).", guest.name, photo.id);
            Ok(())
        }
        Command::Admin { password, action } => {
            let backend = HttpAuthBackend::new(config.api_url.clone(), client);
            let gate = AuthGate::new(backend, credentials);
            if !gate.login(&password).await? {
                return Err(AppError::Validation("Invalid password".to_string()));
            }
            let result = admin(&config, &store, &gate, action).await;
            gate.logout().await;
            result
        }
    }
}

fn require_guest(path: &Path) -> Result<GuestProfile, AppError> {
    GuestProfile::load(path)?.ok_or_else(|| {
        AppError::Validation("Please set your name first with `event-gallery set-name`".to_string())
    })
}

async fn upload(
    config: &GalleryConfig,
    store: &Store,
    guest: &GuestProfile,
    path: &Path,
    capture: bool,
) -> Result<Photo, AppError> {
    let uploads = UploadOrchestrator::new(store.clone());

    if capture {
        let devices = StillImageDevices::from_path(path)?;
        let mut camera = CaptureController::new(devices).with_jpeg_quality(config.jpeg_quality);
        camera.start_capture(FacingMode::Environment).await?;
        let image = camera.capture_frame();
        camera.stop();
        return Ok(uploads.upload_captured(image?, &guest.name).await?);
    }

    let bytes = std::fs::read(path)?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "photo.jpg".to_string());
    Ok(uploads.upload_file(bytes, &file_name, &guest.name).await?)
}

async fn admin(
    config: &GalleryConfig,
    store: &Store,
    gate: &AuthGate<HttpAuthBackend>,
    action: AdminAction,
) -> Result<(), AppError> {
    if !gate.is_privileged() {
        return Err(AppError::Validation("Admin login required".to_string()));
    }
    store.fetch_admin().await;
    ensure_loaded(store, CollectionKind::Admin)?;

    let mut bulk = BulkCoordinator::new(store.clone(), CollectionKind::Admin)
        .with_archive_name(config.archive_name.clone());

    match action {
        AdminAction::List => print_collection(store, CollectionKind::Admin),
        AdminAction::Delete { ids } => {
            bulk.enter_selection_mode();
            for id in &ids {
                if !bulk.toggle(id) {
                    log::warn!("Photo {} is not in the gallery, skipping", id);
                }
            }
            let outcome = bulk.delete_selected().await;
            println!("{}", deletion_report(outcome)?);
            Ok(())
        }
        AdminAction::Download { out, ids } => {
            let archive = if ids.is_empty() {
                bulk.download_all().await?
            } else {
                bulk.download_archive(Some(ids.as_slice())).await?
            };
            let path = archive.save_to(&out)?;
            println!("Download complete: {}", path.display());
            Ok(())
        }
    }
}

fn ensure_loaded(store: &Store, kind: CollectionKind) -> Result<(), AppError> {
    match store.load_state(kind).error {
        Some(error) => Err(AppError::Validation(error)),
        None => Ok(()),
    }
}

/// Summary line for a finished bulk delete, or the error to exit with
fn deletion_report(outcome: BulkDeleteOutcome) -> Result<String, AppError> {
    if outcome.attempted == 0 {
        return Err(AppError::Validation(
            "None of the given photos are in the gallery".to_string(),
        ));
    }
    if !outcome.is_complete_success() {
        return Err(AppError::Validation(format!(
            "Failed to delete {} of {} photos",
            outcome.failed, outcome.attempted
        )));
    }
    Ok(format!("Deleted {} photos successfully", outcome.deleted))
}

fn print_collection(store: &Store, kind: CollectionKind) -> Result<(), AppError> {
    let state = store.load_state(kind);
    let photos = store.photos(kind);
    if let Some(error) = state.error {
        // Stale contents are still worth showing
        eprintln!("{}", error);
        if photos.is_empty() {
            return Err(AppError::Validation(error));
        }
    }

    if photos.is_empty() {
        println!("No photos yet.");
    }
    for photo in &photos {
        println!(
            "{}\t{}\t{}\t{}",
            photo.id,
            photo.uploader_name,
            format_date_time(photo.timestamp),
            photo.url
        );
    }
    Ok(())
}
