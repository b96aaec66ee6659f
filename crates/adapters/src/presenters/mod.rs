use evidence_deck_application::{ExportArtifact, ImportReport};
use evidence_deck_domain::{PhotoRecord, ReportSettings};

pub fn present_photo_row(photo: &PhotoRecord) -> String {
    format!(
        "{}\t{}\t{}\t{}\t{}",
        photo.id.map(|id| id.get()).unwrap_or_default(),
        photo.display_label(),
        photo.uid_suffix,
        photo.image.format().as_str().to_ascii_uppercase(),
        photo.description
    )
}

pub fn present_settings(settings: &ReportSettings) -> String {
    let metadata = &settings.metadata;
    format!(
        "incident={} location={} postal_code={} evidence_bag={} report_type={:?} page_size={}",
        metadata.incident_number,
        metadata.location,
        metadata.postal_code,
        metadata.evidence_bag_number,
        metadata.report_type,
        settings.page_size
    )
}

pub fn present_import_report(report: &ImportReport) -> String {
    let mut summary = format!(
        "imported {} of {} supported files",
        report.appended, report.supported_files
    );
    for path in &report.skipped {
        summary.push_str(&format!("\nskipped unreadable file {}", path.display()));
    }
    summary
}

pub fn present_artifact(artifact: &ExportArtifact) -> String {
    format!(
        "exported {} slides to {}",
        artifact.slide_count,
        artifact.file_path.display()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    use evidence_deck_domain::{ImageFormat, ImageRef, PhotoId};

    #[test]
    fn photo_row_shows_label_and_format() {
        let mut original = PhotoRecord::new_original(
            ImageRef::new(vec![1_u8], ImageFormat::Jpeg),
            2,
            "B7",
            "doorway",
        )
        .expect("record");
        original.id = Some(PhotoId::new(9).expect("id"));
        assert_eq!(present_photo_row(&original), "9\t2\tB7\tJPEG\tdoorway");

        let mut copy = original.create_copy().expect("copy");
        copy.id = Some(PhotoId::new(10).expect("id"));
        assert_eq!(present_photo_row(&copy), "10\tCopy of 2\tB7\tJPEG\t");
    }

    #[test]
    fn import_report_summary() {
        let report = ImportReport {
            supported_files: 3,
            appended: 2,
            skipped: vec![PathBuf::from("/photos/torn.jpg")],
        };
        assert_eq!(
            present_import_report(&report),
            "imported 2 of 3 supported files\nskipped unreadable file /photos/torn.jpg"
        );
    }
}
