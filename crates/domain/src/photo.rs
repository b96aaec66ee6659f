use std::fmt::{Display, Formatter};
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PhotoId(i64);

impl PhotoId {
    pub fn new(value: i64) -> Result<Self, DomainError> {
        if value <= 0 {
            return Err(DomainError::InvalidPhotoId(value));
        }
        Ok(Self(value))
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

impl Display for PhotoId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Jpeg,
    Png,
    Heic,
    Raw,
    Unsupported,
}

impl ImageFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Jpeg => "jpeg",
            Self::Png => "png",
            Self::Heic => "heic",
            Self::Raw => "raw",
            Self::Unsupported => "unsupported",
        }
    }

    pub fn parse(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Self::Jpeg,
            "png" => Self::Png,
            "heic" => Self::Heic,
            "raw" => Self::Raw,
            _ => Self::Unsupported,
        }
    }
}

pub fn detect_image_format(path: &Path) -> ImageFormat {
    let Some(ext) = path.extension().and_then(|ext| ext.to_str()) else {
        return ImageFormat::Unsupported;
    };
    ImageFormat::parse(ext)
}

/// Shared handle to an encoded image payload. A copy points at the same bytes
/// as its original.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    bytes: Arc<[u8]>,
    format: ImageFormat,
}

impl ImageRef {
    pub fn new(bytes: impl Into<Arc<[u8]>>, format: ImageFormat) -> Self {
        Self {
            bytes: bytes.into(),
            format,
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn shares_payload_with(&self, other: &ImageRef) -> bool {
        Arc::ptr_eq(&self.bytes, &other.bytes)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Landscape,
    Portrait,
}

impl Orientation {
    pub fn from_dimensions(width: u32, height: u32) -> Self {
        if width > height {
            Self::Landscape
        } else {
            Self::Portrait
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhotoField {
    UidSuffix,
    Description,
}

impl PhotoField {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "uid" | "uid_suffix" | "photo_number" => Some(Self::UidSuffix),
            "description" => Some(Self::Description),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoRecord {
    /// `None` until the persistence adapter has assigned an id.
    pub id: Option<PhotoId>,
    pub order_number: u32,
    pub uid_suffix: String,
    pub description: String,
    pub copy_of: Option<PhotoId>,
    pub has_copy: Option<PhotoId>,
    pub image: ImageRef,
}

impl PhotoRecord {
    pub fn new_original(
        image: ImageRef,
        order_number: u32,
        uid_suffix: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<Self, DomainError> {
        if order_number == 0 {
            return Err(DomainError::InvalidOrderNumber(0));
        }
        let uid_suffix = uid_suffix.into();
        if uid_suffix.trim().is_empty() {
            return Err(DomainError::EmptyUidSuffix);
        }
        Ok(Self {
            id: None,
            order_number,
            uid_suffix,
            description: description.into(),
            copy_of: None,
            has_copy: None,
            image,
        })
    }

    pub fn is_copy(&self) -> bool {
        self.copy_of.is_some()
    }

    pub fn display_label(&self) -> String {
        display_label(self.is_copy(), self.order_number)
    }

    pub fn update_order_number(&mut self, order_number: u32) {
        self.order_number = order_number;
    }

    /// Builds the unpersisted "Copy of N" record for this original.
    pub fn create_copy(&self) -> Result<PhotoRecord, DomainError> {
        let id = self.id.ok_or(DomainError::UnpersistedOriginal)?;
        if self.is_copy() {
            return Err(DomainError::CopyOfCopy(id));
        }
        if let Some(copy) = self.has_copy {
            return Err(DomainError::AlreadyHasCopy { original: id, copy });
        }
        Ok(PhotoRecord {
            id: None,
            order_number: self.order_number,
            uid_suffix: self.uid_suffix.clone(),
            description: String::new(),
            copy_of: Some(id),
            has_copy: None,
            image: self.image.clone(),
        })
    }

    /// Returns whether the stored value changed.
    pub fn set_field(&mut self, field: PhotoField, value: &str) -> Result<bool, DomainError> {
        let slot = match field {
            PhotoField::UidSuffix => {
                if value.trim().is_empty() {
                    return Err(DomainError::EmptyUidSuffix);
                }
                &mut self.uid_suffix
            }
            PhotoField::Description => &mut self.description,
        };
        if slot == value {
            return Ok(false);
        }
        *slot = value.to_string();
        Ok(true)
    }
}

pub fn display_label(is_copy: bool, order_number: u32) -> String {
    if is_copy {
        format!("Copy of {order_number}")
    } else {
        order_number.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image() -> ImageRef {
        ImageRef::new(vec![1_u8, 2, 3], ImageFormat::Jpeg)
    }

    fn persisted(id: i64, order_number: u32) -> PhotoRecord {
        let mut record =
            PhotoRecord::new_original(image(), order_number, "A1", "front door").expect("record");
        record.id = Some(PhotoId::new(id).expect("id"));
        record
    }

    #[test]
    fn photo_id_must_be_positive() {
        assert!(PhotoId::new(1).is_ok());
        assert!(matches!(
            PhotoId::new(-1),
            Err(DomainError::InvalidPhotoId(-1))
        ));
    }

    #[test]
    fn format_detection_follows_upload_extensions() {
        assert_eq!(detect_image_format(Path::new("a.JPG")), ImageFormat::Jpeg);
        assert_eq!(detect_image_format(Path::new("b.heic")), ImageFormat::Heic);
        assert_eq!(detect_image_format(Path::new("c.raw")), ImageFormat::Raw);
        assert_eq!(
            detect_image_format(Path::new("d.gif")),
            ImageFormat::Unsupported
        );
        assert_eq!(
            detect_image_format(Path::new("no_extension")),
            ImageFormat::Unsupported
        );
    }

    #[test]
    fn copy_inherits_number_and_uid_but_not_description() {
        let original = persisted(7, 3);
        let copy = original.create_copy().expect("copy");

        assert_eq!(copy.id, None);
        assert_eq!(copy.order_number, 3);
        assert_eq!(copy.uid_suffix, "A1");
        assert!(copy.description.is_empty());
        assert_eq!(copy.copy_of, original.id);
        assert_eq!(copy.has_copy, None);
        assert!(copy.image.shares_payload_with(&original.image));
        assert_eq!(copy.display_label(), "Copy of 3");
    }

    #[test]
    fn copies_cannot_be_copied_and_originals_only_once() {
        let mut original = persisted(1, 1);
        original.has_copy = Some(PhotoId::new(2).expect("id"));
        assert!(matches!(
            original.create_copy(),
            Err(DomainError::AlreadyHasCopy { .. })
        ));

        let mut copy = persisted(2, 1);
        copy.copy_of = Some(PhotoId::new(1).expect("id"));
        assert!(matches!(copy.create_copy(), Err(DomainError::CopyOfCopy(_))));

        let unsaved = PhotoRecord::new_original(image(), 1, "A1", "").expect("record");
        assert!(matches!(
            unsaved.create_copy(),
            Err(DomainError::UnpersistedOriginal)
        ));
    }

    #[test]
    fn label_tracks_order_number() {
        let mut record = persisted(1, 4);
        assert_eq!(record.display_label(), "4");
        record.update_order_number(2);
        assert_eq!(record.display_label(), "2");
    }

    #[test]
    fn orientation_is_landscape_only_when_wider() {
        assert_eq!(Orientation::from_dimensions(640, 480), Orientation::Landscape);
        assert_eq!(Orientation::from_dimensions(480, 640), Orientation::Portrait);
        assert_eq!(Orientation::from_dimensions(500, 500), Orientation::Portrait);
    }

    #[test]
    fn set_field_rejects_blank_uid_and_reports_changes() {
        let mut record = persisted(1, 1);
        assert!(matches!(
            record.set_field(PhotoField::UidSuffix, "  "),
            Err(DomainError::EmptyUidSuffix)
        ));
        assert_eq!(record.set_field(PhotoField::Description, "front door"), Ok(false));
        assert_eq!(record.set_field(PhotoField::Description, "hallway"), Ok(true));
        assert_eq!(record.description, "hallway");
    }
}
