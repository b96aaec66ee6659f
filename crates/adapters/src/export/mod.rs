//! Writes the report as a JSON deck outline: one title block shared by every
//! page and one slide per photo, in list order.

use std::fs;

use evidence_deck_application::{ApplicationError, ExportArtifact, ExportRequest, ReportExporter};
use evidence_deck_domain::{Orientation, ReportType};
use serde::Serialize;
use tracing::info;

const SUBJECT: &str = "Fire Report";
const CONFIDENTIAL_HEADER: &str = "CONFIDENTIAL";
const ANNEX: &str = "A";

#[derive(Debug, Serialize)]
struct Deck<'a> {
    subject: &'static str,
    header: &'static str,
    incident_number: &'a str,
    location: String,
    postal_code: &'a str,
    evidence_bag_number: &'a str,
    report_type: ReportType,
    generated_at: &'a str,
    slides: Vec<Slide<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum Slide<'a> {
    Drawing {
        page: String,
        title: &'static str,
    },
    Photo {
        page: String,
        title: String,
        uid: String,
        description: &'a str,
        orientation: Orientation,
        format: &'static str,
        bytes: usize,
    },
}

#[derive(Debug, Default)]
pub struct JsonDeckExporter;

impl ReportExporter for JsonDeckExporter {
    fn export(&self, request: &ExportRequest) -> Result<ExportArtifact, ApplicationError> {
        let metadata = &request.metadata;
        let mut slides = Vec::with_capacity(request.photos.len() + 1);
        if metadata.report_type == ReportType::C1Accidental {
            slides.push(Slide::Drawing {
                page: page_label(slides.len()),
                title: "SKETCH OF FIRE SCENE",
            });
        }
        for photo in &request.photos {
            slides.push(Slide::Photo {
                page: page_label(slides.len()),
                title: format!("PHOTO {}", photo.label.to_uppercase()),
                uid: format!("{}-{}", metadata.incident_number.trim(), photo.uid_suffix),
                description: &photo.description,
                orientation: photo.orientation,
                format: photo.image.format().as_str(),
                bytes: photo.image.len(),
            });
        }

        let deck = Deck {
            subject: SUBJECT,
            header: CONFIDENTIAL_HEADER,
            incident_number: metadata.incident_number.trim(),
            location: metadata.location.trim().to_uppercase(),
            postal_code: metadata.postal_code.trim(),
            evidence_bag_number: metadata.evidence_bag_number.trim(),
            report_type: metadata.report_type,
            generated_at: &request.generated_at,
            slides,
        };
        let slide_count = deck.slides.len();

        fs::create_dir_all(&request.output_dir)
            .map_err(|error| ApplicationError::Io(error.to_string()))?;
        let file_path = request
            .output_dir
            .join(format!("{}.json", metadata.file_stem()));
        let raw = serde_json::to_string_pretty(&deck)
            .map_err(|error| ApplicationError::Export(error.to_string()))?;
        fs::write(&file_path, raw).map_err(|error| ApplicationError::Io(error.to_string()))?;

        info!(path = %file_path.display(), slide_count, "report exported");
        Ok(ExportArtifact {
            file_path,
            slide_count,
        })
    }
}

fn page_label(index: usize) -> String {
    format!("{ANNEX}-{}", index + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use evidence_deck_application::ExportPhoto;
    use evidence_deck_domain::{ImageFormat, ImageRef, ReportMetadata};
    use serde_json::Value;
    use tempfile::TempDir;

    fn photo(label: &str, description: &str, orientation: Orientation) -> ExportPhoto {
        ExportPhoto {
            label: label.to_string(),
            uid_suffix: "P1".to_string(),
            description: description.to_string(),
            orientation,
            image: ImageRef::new(vec![0_u8; 4], ImageFormat::Png),
        }
    }

    fn request(dir: &TempDir, report_type: ReportType) -> ExportRequest {
        ExportRequest {
            metadata: ReportMetadata {
                incident_number: "20240101/0001".to_string(),
                location: "Block 5 Jurong".to_string(),
                postal_code: "600005".to_string(),
                evidence_bag_number: "EB-1".to_string(),
                report_type,
            },
            photos: vec![
                photo("1", "kitchen", Orientation::Landscape),
                photo("Copy of 1", "", Orientation::Landscape),
                photo("2", "stove", Orientation::Portrait),
            ],
            generated_at: "1700000000000".to_string(),
            output_dir: dir.path().join("out"),
        }
    }

    fn read(path: &std::path::Path) -> Value {
        serde_json::from_str(&fs::read_to_string(path).expect("read")).expect("json")
    }

    #[test]
    fn full_report_has_one_slide_per_photo() {
        let dir = TempDir::new().expect("tempdir");
        let artifact = JsonDeckExporter
            .export(&request(&dir, ReportType::Full))
            .expect("export");

        assert_eq!(
            artifact.file_path,
            dir.path().join("out").join("20240101-0001-location.json")
        );
        assert_eq!(artifact.slide_count, 3);

        let deck = read(&artifact.file_path);
        assert_eq!(deck["location"], "BLOCK 5 JURONG");
        assert_eq!(deck["slides"][0]["page"], "A-1");
        assert_eq!(deck["slides"][0]["title"], "PHOTO 1");
        assert_eq!(deck["slides"][1]["title"], "PHOTO COPY OF 1");
        assert_eq!(deck["slides"][1]["uid"], "20240101/0001-P1");
        assert_eq!(deck["slides"][2]["orientation"], "portrait");
    }

    #[test]
    fn accidental_report_starts_with_drawing_slide() {
        let dir = TempDir::new().expect("tempdir");
        let artifact = JsonDeckExporter
            .export(&request(&dir, ReportType::C1Accidental))
            .expect("export");

        assert_eq!(artifact.slide_count, 4);
        let deck = read(&artifact.file_path);
        assert_eq!(deck["slides"][0]["kind"], "drawing");
        assert_eq!(deck["slides"][1]["page"], "A-2");
        assert_eq!(deck["report_type"], "c1_accidental");
    }
}
