use std::fs;
use std::path::Path;

use evidence_deck_application::{ApplicationError, ImageFile, ImageSource};
use evidence_deck_domain::{detect_image_format, ImageFormat, ImageRef};
use walkdir::WalkDir;

#[derive(Debug, Default)]
pub struct FsImageSource;

impl ImageSource for FsImageSource {
    fn load_image(&self, path: &Path) -> Result<ImageRef, ApplicationError> {
        let format = detect_image_format(path);
        if format == ImageFormat::Unsupported {
            return Err(ApplicationError::InvalidInput(format!(
                "file {} has an invalid file format",
                path.display()
            )));
        }
        let bytes = fs::read(path).map_err(|error| ApplicationError::Io(error.to_string()))?;
        if bytes.is_empty() {
            return Err(ApplicationError::InvalidInput(format!(
                "file {} is empty",
                path.display()
            )));
        }
        Ok(ImageRef::new(bytes, format))
    }

    fn scan_folder(&self, folder: &Path) -> Result<Vec<ImageFile>, ApplicationError> {
        if !folder.is_dir() {
            return Err(ApplicationError::InvalidInput(format!(
                "folder does not exist or is not a directory: {}",
                folder.display()
            )));
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(folder)
            .sort_by_file_name()
            .into_iter()
            .filter_map(Result::ok)
        {
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            let format = detect_image_format(path);
            if format == ImageFormat::Unsupported {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };
            files.push(ImageFile {
                path: path.to_path_buf(),
                stem: stem.to_string(),
                format,
            });
        }

        files.sort_by(|left, right| left.path.cmp(&right.path));
        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn scan_keeps_supported_files_in_path_order() {
        let dir = TempDir::new().expect("tempdir");
        fs::create_dir(dir.path().join("day2")).expect("mkdir");
        for name in ["b.jpg", "a.PNG", "notes.txt", "day2/c.heic"] {
            fs::write(dir.path().join(name), b"data").expect("write");
        }

        let files = FsImageSource.scan_folder(dir.path()).expect("scan");
        let stems: Vec<&str> = files.iter().map(|file| file.stem.as_str()).collect();
        assert_eq!(stems, vec!["a", "b", "c"]);
        assert_eq!(files[0].format, ImageFormat::Png);
    }

    #[test]
    fn scan_rejects_missing_folder() {
        let dir = TempDir::new().expect("tempdir");
        let result = FsImageSource.scan_folder(&dir.path().join("missing"));
        assert!(matches!(result, Err(ApplicationError::InvalidInput(_))));
    }

    #[test]
    fn load_rejects_unsupported_extension() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("clip.gif");
        fs::write(&path, b"GIF89a").expect("write");
        assert!(matches!(
            FsImageSource.load_image(&path),
            Err(ApplicationError::InvalidInput(_))
        ));
    }

    #[test]
    fn load_reads_bytes_and_format() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("door.jpeg");
        fs::write(&path, [1_u8, 2, 3]).expect("write");
        let image = FsImageSource.load_image(&path).expect("load");
        assert_eq!(image.bytes(), &[1, 2, 3]);
        assert_eq!(image.format(), ImageFormat::Jpeg);
    }
}
