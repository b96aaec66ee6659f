use std::path::PathBuf;

use evidence_deck_domain::{FieldErrors, ImageRef, PhotoField, PhotoId, ReportSettings};

#[derive(Debug, Clone, Default)]
pub struct LoadPhotosCommand;

#[derive(Debug, Clone, Default)]
pub struct ListPhotosQuery;

#[derive(Debug, Clone)]
pub struct AppendPhotoCommand {
    pub image: ImageRef,
    pub uid_suffix: String,
    pub description: String,
}

#[derive(Debug, Clone)]
pub struct ImportFolderCommand {
    pub folder: PathBuf,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub supported_files: usize,
    pub appended: usize,
    /// Files that could not be read; they are left out of the list.
    pub skipped: Vec<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct UpdateFieldCommand {
    pub id: PhotoId,
    pub field: PhotoField,
    pub value: String,
}

#[derive(Debug, Clone, Copy)]
pub struct CreateCopyCommand {
    pub id: PhotoId,
}

#[derive(Debug, Clone, Copy)]
pub struct DeletePhotoCommand {
    pub id: PhotoId,
}

#[derive(Debug, Clone, Default)]
pub struct DeleteAllCommand;

#[derive(Debug, Clone, Copy)]
pub struct ReorderCommand {
    pub drag_index: usize,
    pub hover_index: usize,
}

#[derive(Debug, Clone, Copy)]
pub struct OrientationQuery {
    pub id: PhotoId,
}

#[derive(Debug, Clone, Default)]
pub struct LoadSettingsQuery;

#[derive(Debug, Clone)]
pub struct SaveSettingsCommand {
    pub settings: ReportSettings,
}

#[derive(Debug, Clone)]
pub struct ExportReportCommand {
    pub output_dir: PathBuf,
    pub field_errors: FieldErrors,
}
