mod export;
pub mod fs;
pub mod migrations;
pub mod presenters;
pub mod sqlite;

pub use export::JsonDeckExporter;
pub use fs::{FsImageSource, JsonSettingsStore, SystemClock};
pub use presenters::{present_artifact, present_import_report, present_photo_row, present_settings};
pub use sqlite::SqlitePhotoRepository;

use std::io::Cursor;

use evidence_deck_application::{ApplicationError, ImageDecoder};
use evidence_deck_domain::{ImageFormat, ImageRef};

#[derive(Debug, Default)]
pub struct ImageCrateDecoder;

impl ImageDecoder for ImageCrateDecoder {
    fn decode_dimensions(&self, image: &ImageRef) -> Result<(u32, u32), ApplicationError> {
        match image.format() {
            ImageFormat::Jpeg | ImageFormat::Png => {
                image::io::Reader::new(Cursor::new(image.bytes()))
                    .with_guessed_format()
                    .map_err(|error| ApplicationError::Decode(error.to_string()))?
                    .into_dimensions()
                    .map_err(|error| ApplicationError::Decode(error.to_string()))
            }
            format @ (ImageFormat::Heic | ImageFormat::Raw) => Err(ApplicationError::Decode(
                format!("{} decode not implemented yet", format.as_str()),
            )),
            ImageFormat::Unsupported => Err(ApplicationError::Decode(
                "unsupported image format".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageOutputFormat, RgbImage};

    fn png(width: u32, height: u32) -> ImageRef {
        let mut bytes = Vec::new();
        RgbImage::new(width, height)
            .write_to(&mut Cursor::new(&mut bytes), ImageOutputFormat::Png)
            .expect("encode");
        ImageRef::new(bytes, ImageFormat::Png)
    }

    #[test]
    fn reads_dimensions_without_full_decode() {
        assert_eq!(ImageCrateDecoder.decode_dimensions(&png(6, 4)).expect("dims"), (6, 4));
    }

    #[test]
    fn raw_and_garbage_are_decode_errors() {
        let raw = ImageRef::new(vec![1_u8, 2, 3], ImageFormat::Raw);
        assert!(matches!(
            ImageCrateDecoder.decode_dimensions(&raw),
            Err(ApplicationError::Decode(_))
        ));
        let garbage = ImageRef::new(vec![1_u8, 2, 3], ImageFormat::Jpeg);
        assert!(matches!(
            ImageCrateDecoder.decode_dimensions(&garbage),
            Err(ApplicationError::Decode(_))
        ));
    }
}
