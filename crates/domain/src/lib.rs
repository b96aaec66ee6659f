mod error;
mod list;
mod photo;
mod report;

pub use error::DomainError;
pub use list::{Normalization, PhotoList, Removal, Reorder};
pub use photo::{
    detect_image_format, display_label, ImageFormat, ImageRef, Orientation, PhotoField, PhotoId,
    PhotoRecord,
};
pub use report::{FieldErrors, ReportMetadata, ReportSettings, ReportType, DEFAULT_PAGE_SIZE};
