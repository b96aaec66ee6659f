use std::path::{Path, PathBuf};

use async_trait::async_trait;
use evidence_deck_domain::{
    ImageFormat, ImageRef, Orientation, PhotoId, PhotoRecord, ReportMetadata, ReportSettings,
};

use crate::ApplicationError;

/// Durable store for photo records. `retrieve_all` returns records in no
/// particular order.
#[async_trait]
pub trait PhotoRepository: Send + Sync {
    async fn initialize(&self) -> Result<(), ApplicationError>;

    /// Stores a new record and returns the id assigned to it.
    async fn add_photo(&self, photo: &PhotoRecord) -> Result<PhotoId, ApplicationError>;

    /// Fails with `NotFound` when no stored record has the photo's id.
    async fn update_photo(&self, photo: &PhotoRecord) -> Result<(), ApplicationError>;

    async fn delete_photo(&self, id: PhotoId) -> Result<(), ApplicationError>;

    async fn clear_all(&self) -> Result<(), ApplicationError>;

    async fn retrieve_all(&self) -> Result<Vec<PhotoRecord>, ApplicationError>;
}

pub trait SettingsStore: Send + Sync {
    fn load(&self) -> Result<ReportSettings, ApplicationError>;

    fn save(&self, settings: &ReportSettings) -> Result<(), ApplicationError>;

    fn clear(&self) -> Result<(), ApplicationError>;
}

pub trait ImageDecoder: Send + Sync {
    /// Returns `(width, height)` of the encoded payload.
    fn decode_dimensions(&self, image: &ImageRef) -> Result<(u32, u32), ApplicationError>;
}

#[derive(Debug, Clone)]
pub struct ImageFile {
    pub path: PathBuf,
    pub stem: String,
    pub format: ImageFormat,
}

pub trait ImageSource: Send + Sync {
    fn load_image(&self, path: &Path) -> Result<ImageRef, ApplicationError>;

    /// Supported image files below `folder`, sorted by path.
    fn scan_folder(&self, folder: &Path) -> Result<Vec<ImageFile>, ApplicationError>;
}

#[derive(Debug, Clone)]
pub struct ExportPhoto {
    pub label: String,
    pub uid_suffix: String,
    pub description: String,
    pub orientation: Orientation,
    pub image: ImageRef,
}

#[derive(Debug, Clone)]
pub struct ExportRequest {
    pub metadata: ReportMetadata,
    pub photos: Vec<ExportPhoto>,
    pub generated_at: String,
    pub output_dir: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub file_path: PathBuf,
    pub slide_count: usize,
}

pub trait ReportExporter: Send + Sync {
    fn export(&self, request: &ExportRequest) -> Result<ExportArtifact, ApplicationError>;
}

pub trait Clock: Send + Sync {
    fn now_timestamp_string(&self) -> String;
}
