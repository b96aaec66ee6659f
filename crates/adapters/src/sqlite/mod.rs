mod queries;

use std::fs;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use evidence_deck_application::{ApplicationError, PhotoRepository};
use evidence_deck_domain::{PhotoId, PhotoRecord};
use rusqlite::Connection;
use tracing::debug;

use crate::migrations::MIGRATIONS;

/// Photo store backed by a single SQLite file. Each call opens its own
/// connection on the blocking pool.
#[derive(Debug, Clone)]
pub struct SqlitePhotoRepository {
    path: PathBuf,
}

impl SqlitePhotoRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    async fn run<T, F>(&self, task: F) -> Result<T, ApplicationError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, ApplicationError> + Send + 'static,
    {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || {
            let conn = open_connection(&path)?;
            task(&conn)
        })
        .await
        .map_err(|error| ApplicationError::PersistenceFailure(error.to_string()))?
    }
}

fn open_connection(path: &Path) -> Result<Connection, ApplicationError> {
    let conn = Connection::open(path).map_err(persistence)?;
    conn.execute_batch("PRAGMA foreign_keys=ON;")
        .map_err(persistence)?;
    Ok(conn)
}

fn persistence(error: rusqlite::Error) -> ApplicationError {
    ApplicationError::PersistenceFailure(error.to_string())
}

fn require_id(photo: &PhotoRecord) -> Result<i64, ApplicationError> {
    photo
        .id
        .map(PhotoId::get)
        .ok_or_else(|| ApplicationError::InvalidInput("photo has not been stored yet".to_string()))
}

#[async_trait]
impl PhotoRepository for SqlitePhotoRepository {
    async fn initialize(&self) -> Result<(), ApplicationError> {
        if self.path.as_os_str().is_empty() {
            return Err(ApplicationError::InvalidInput(
                "database path must not be empty".to_string(),
            ));
        }

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .map_err(|error| ApplicationError::Io(error.to_string()))?;
            }
        }

        self.run(|conn| {
            conn.execute_batch("PRAGMA journal_mode=WAL;")
                .map_err(persistence)?;
            for migration in MIGRATIONS {
                conn.execute_batch(migration).map_err(persistence)?;
            }
            Ok(())
        })
        .await?;
        debug!(path = %self.path.display(), "photo database ready");
        Ok(())
    }

    async fn add_photo(&self, photo: &PhotoRecord) -> Result<PhotoId, ApplicationError> {
        let photo = photo.clone();
        let id = self
            .run(move |conn| queries::insert_photo(conn, &photo).map_err(persistence))
            .await?;
        Ok(PhotoId::new(id)?)
    }

    async fn update_photo(&self, photo: &PhotoRecord) -> Result<(), ApplicationError> {
        let id = require_id(photo)?;
        let photo = photo.clone();
        self.run(move |conn| {
            let touched = queries::update_photo(conn, id, &photo).map_err(persistence)?;
            if touched == 0 {
                return Err(ApplicationError::NotFound(format!("photo id={id}")));
            }
            Ok(())
        })
        .await
    }

    async fn delete_photo(&self, id: PhotoId) -> Result<(), ApplicationError> {
        self.run(move |conn| queries::delete_photo(conn, id.get()).map_err(persistence))
            .await
    }

    async fn clear_all(&self) -> Result<(), ApplicationError> {
        self.run(|conn| queries::clear_photos(conn).map_err(persistence))
            .await
    }

    async fn retrieve_all(&self) -> Result<Vec<PhotoRecord>, ApplicationError> {
        self.run(|conn| queries::list_photos(conn).map_err(persistence))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use evidence_deck_domain::{ImageFormat, ImageRef};
    use tempfile::TempDir;

    fn original(order_number: u32, uid: &str) -> PhotoRecord {
        PhotoRecord::new_original(
            ImageRef::new(vec![0xff_u8, 0xd8, 0xff], ImageFormat::Jpeg),
            order_number,
            uid,
            "living room",
        )
        .expect("record")
    }

    async fn repository(dir: &TempDir) -> SqlitePhotoRepository {
        let repo = SqlitePhotoRepository::new(dir.path().join("nested").join("photos.sqlite3"));
        repo.initialize().await.expect("initialize");
        repo
    }

    #[tokio::test]
    async fn initialize_creates_schema() {
        let dir = TempDir::new().expect("tempdir");
        repository(&dir).await;

        let conn =
            Connection::open(dir.path().join("nested").join("photos.sqlite3")).expect("open");
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='photos'",
                [],
                |row| row.get(0),
            )
            .expect("query");
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn add_update_and_retrieve_roundtrip() {
        let dir = TempDir::new().expect("tempdir");
        let repo = repository(&dir).await;

        let mut first = original(1, "A1");
        first.id = Some(repo.add_photo(&first).await.expect("add"));
        let mut copy = first.create_copy().expect("copy");
        copy.id = Some(repo.add_photo(&copy).await.expect("add copy"));
        first.has_copy = copy.id;
        first.description = "hallway".to_string();
        repo.update_photo(&first).await.expect("update");

        let mut stored = repo.retrieve_all().await.expect("retrieve");
        stored.sort_by_key(|record| record.id);
        assert_eq!(stored, vec![first, copy]);
    }

    #[tokio::test]
    async fn updating_missing_photo_is_not_found() {
        let dir = TempDir::new().expect("tempdir");
        let repo = repository(&dir).await;

        let mut ghost = original(1, "A1");
        ghost.id = Some(PhotoId::new(77).expect("id"));
        let result = repo.update_photo(&ghost).await;
        assert!(matches!(result, Err(ApplicationError::NotFound(_))));
    }

    #[tokio::test]
    async fn delete_and_clear_remove_rows() {
        let dir = TempDir::new().expect("tempdir");
        let repo = repository(&dir).await;

        let first = repo.add_photo(&original(1, "A1")).await.expect("add");
        repo.add_photo(&original(2, "A2")).await.expect("add");
        repo.add_photo(&original(3, "A3")).await.expect("add");

        repo.delete_photo(first).await.expect("delete");
        assert_eq!(repo.retrieve_all().await.expect("retrieve").len(), 2);

        repo.clear_all().await.expect("clear");
        assert!(repo.retrieve_all().await.expect("retrieve").is_empty());
    }

    #[tokio::test]
    async fn empty_path_is_rejected() {
        let repo = SqlitePhotoRepository::new("");
        assert!(matches!(
            repo.initialize().await,
            Err(ApplicationError::InvalidInput(_))
        ));
    }
}
