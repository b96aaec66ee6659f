mod error;
mod policy;
mod ports;
mod service;
mod use_cases;

pub use error::ApplicationError;
pub use policy::{PersistencePolicy, DEFAULT_PERSISTENCE_ATTEMPTS, DEFAULT_PERSISTENCE_TIMEOUT};
pub use ports::{
    Clock, ExportArtifact, ExportPhoto, ExportRequest, ImageDecoder, ImageFile, ImageSource,
    PhotoRepository, ReportExporter, SettingsStore,
};
pub use service::ApplicationService;
pub use use_cases::{
    AppendPhotoCommand, CreateCopyCommand, DeleteAllCommand, DeletePhotoCommand,
    ExportReportCommand, ImportFolderCommand, ImportReport, ListPhotosQuery, LoadPhotosCommand,
    LoadSettingsQuery, OrientationQuery, ReorderCommand, SaveSettingsCommand, UpdateFieldCommand,
};
