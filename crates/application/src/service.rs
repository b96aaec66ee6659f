use std::collections::HashMap;
use std::future::Future;

use evidence_deck_domain::{
    ImageRef, Orientation, PhotoId, PhotoList, PhotoRecord, Reorder, ReportSettings,
};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::{
    AppendPhotoCommand, ApplicationError, Clock, CreateCopyCommand, DeleteAllCommand,
    DeletePhotoCommand, ExportArtifact, ExportPhoto, ExportReportCommand, ExportRequest,
    ImageDecoder, ImageSource, ImportFolderCommand, ImportReport, ListPhotosQuery,
    LoadPhotosCommand, LoadSettingsQuery, OrientationQuery, PersistencePolicy, PhotoRepository,
    ReorderCommand, ReportExporter, SaveSettingsCommand, SettingsStore, UpdateFieldCommand,
};

#[derive(Debug, Default)]
struct ListState {
    photos: PhotoList,
    /// Set when a store write failed part way; the list is reloaded from the
    /// store before the next change.
    dirty: bool,
    orientations: HashMap<PhotoId, Orientation>,
}

/// Owns the photo list. Every operation holds the list lock until its store
/// writes have finished, so overlapping requests run one after another.
pub struct ApplicationService {
    repository: Box<dyn PhotoRepository>,
    settings: Box<dyn SettingsStore>,
    images: Box<dyn ImageSource>,
    decoder: Box<dyn ImageDecoder>,
    exporter: Box<dyn ReportExporter>,
    clock: Box<dyn Clock>,
    policy: PersistencePolicy,
    state: Mutex<ListState>,
}

impl ApplicationService {
    pub fn new(
        repository: Box<dyn PhotoRepository>,
        settings: Box<dyn SettingsStore>,
        images: Box<dyn ImageSource>,
        decoder: Box<dyn ImageDecoder>,
        exporter: Box<dyn ReportExporter>,
        clock: Box<dyn Clock>,
        policy: PersistencePolicy,
    ) -> Self {
        Self {
            repository,
            settings,
            images,
            decoder,
            exporter,
            clock,
            policy,
            state: Mutex::new(ListState::default()),
        }
    }

    /// Reads every stored record, repairs what an interrupted write left behind
    /// and replaces the in-memory list.
    pub async fn load_photos(
        &self,
        _command: LoadPhotosCommand,
    ) -> Result<Vec<PhotoRecord>, ApplicationError> {
        let repository = self.repository.as_ref();
        self.persist("initialize store", move || repository.initialize())
            .await?;

        let mut state = self.state.lock().await;
        self.reconcile_locked(&mut state).await?;
        Ok(state.photos.records().to_vec())
    }

    pub async fn list_photos(&self, _query: ListPhotosQuery) -> Vec<PhotoRecord> {
        self.state.lock().await.photos.records().to_vec()
    }

    pub async fn has_pending_reconcile(&self) -> bool {
        self.state.lock().await.dirty
    }

    pub async fn append_photo(
        &self,
        command: AppendPhotoCommand,
    ) -> Result<PhotoRecord, ApplicationError> {
        let mut state = self.state.lock().await;
        self.ensure_synced(&mut state).await?;

        let order_number = state.photos.next_order_number();
        let mut record = PhotoRecord::new_original(
            command.image,
            order_number,
            command.uid_suffix,
            command.description,
        )?;

        let repository = self.repository.as_ref();
        let stored = &record;
        let id = match self
            .persist_insert("add photo", move || repository.add_photo(stored))
            .await
        {
            Ok(id) => id,
            Err(error) => return Err(mark_dirty(&mut state, "append photo", error)),
        };

        record.id = Some(id);
        state.photos.push_original(record.clone())?;
        info!(id = %id, order_number, "photo appended");
        Ok(record)
    }

    pub async fn import_folder(
        &self,
        command: ImportFolderCommand,
    ) -> Result<ImportReport, ApplicationError> {
        let files = self.images.scan_folder(&command.folder)?;
        let mut report = ImportReport {
            supported_files: files.len(),
            ..ImportReport::default()
        };

        for file in files {
            let image = match self.images.load_image(&file.path) {
                Ok(image) => image,
                Err(error) => {
                    warn!(path = %file.path.display(), %error, "skipping unreadable image");
                    report.skipped.push(file.path);
                    continue;
                }
            };
            if let Err(error) = self
                .append_photo(AppendPhotoCommand {
                    image,
                    uid_suffix: file.stem,
                    description: String::new(),
                })
                .await
            {
                error!(
                    folder = %command.folder.display(),
                    appended = report.appended,
                    remaining = report.supported_files - report.appended - report.skipped.len(),
                    %error,
                    "folder import stopped"
                );
                return Err(error);
            }
            report.appended += 1;
        }

        info!(
            folder = %command.folder.display(),
            appended = report.appended,
            skipped = report.skipped.len(),
            "folder imported"
        );
        Ok(report)
    }

    pub async fn update_field(
        &self,
        command: UpdateFieldCommand,
    ) -> Result<Vec<PhotoRecord>, ApplicationError> {
        let mut state = self.state.lock().await;
        self.ensure_synced(&mut state).await?;

        let mut working = state.photos.clone();
        let changed = working.update_field(command.id, command.field, &command.value)?;
        let touched: Vec<PhotoRecord> = changed
            .iter()
            .filter_map(|&index| working.get(index).cloned())
            .collect();

        self.commit(&mut state, working, &[], &changed, "update field")
            .await?;
        debug!(
            id = %command.id,
            field = ?command.field,
            changed = changed.len(),
            "photo field updated"
        );
        Ok(touched)
    }

    pub async fn create_copy(
        &self,
        command: CreateCopyCommand,
    ) -> Result<PhotoRecord, ApplicationError> {
        let mut state = self.state.lock().await;
        self.ensure_synced(&mut state).await?;

        let mut copy = state.photos.find(command.id)?.create_copy()?;

        let repository = self.repository.as_ref();
        let stored = &copy;
        let copy_id = match self
            .persist_insert("add copy", move || repository.add_photo(stored))
            .await
        {
            Ok(id) => id,
            Err(error) => return Err(mark_dirty(&mut state, "create copy", error)),
        };
        copy.id = Some(copy_id);

        let mut working = state.photos.clone();
        let original_index = match working.insert_copy(copy.clone()) {
            Ok(index) => index,
            Err(error) => return Err(mark_dirty(&mut state, "create copy", error.into())),
        };

        self.commit(&mut state, working, &[], &[original_index], "create copy")
            .await?;
        info!(original = %command.id, copy = %copy_id, "copy created");
        Ok(copy)
    }

    /// Deletes a photo (and its copy, for an original). Returns the removed
    /// records in deletion order.
    pub async fn delete_photo(
        &self,
        command: DeletePhotoCommand,
    ) -> Result<Vec<PhotoRecord>, ApplicationError> {
        let mut state = self.state.lock().await;
        self.ensure_synced(&mut state).await?;

        let mut working = state.photos.clone();
        let removal = working.remove(command.id)?;

        self.commit(
            &mut state,
            working,
            &removal.removed,
            &removal.updated,
            "delete photo",
        )
        .await?;
        for id in removal.removed.iter().filter_map(|record| record.id) {
            state.orientations.remove(&id);
        }
        info!(
            id = %command.id,
            removed = removal.removed.len(),
            renumbered = removal.updated.len(),
            "photo deleted"
        );
        Ok(removal.removed)
    }

    /// Empties the store, the list and the saved report details.
    pub async fn delete_all(&self, _command: DeleteAllCommand) -> Result<(), ApplicationError> {
        let mut state = self.state.lock().await;
        self.settings.clear()?;

        let repository = self.repository.as_ref();
        if let Err(error) = self
            .persist("clear photos", move || repository.clear_all())
            .await
        {
            return Err(mark_dirty(&mut state, "delete all", error));
        }

        state.photos.clear();
        state.orientations.clear();
        state.dirty = false;
        info!("all photos and report details cleared");
        Ok(())
    }

    /// Returns `false` when the drop target lies inside the dragged photo's own
    /// pair and nothing moved.
    pub async fn reorder(&self, command: ReorderCommand) -> Result<bool, ApplicationError> {
        let mut state = self.state.lock().await;
        self.ensure_synced(&mut state).await?;

        let mut working = state.photos.clone();
        match working.move_block(command.drag_index, command.hover_index)? {
            Reorder::Unchanged => {
                debug!(
                    drag = command.drag_index,
                    hover = command.hover_index,
                    "reorder left list unchanged"
                );
                Ok(false)
            }
            Reorder::Moved { updated } => {
                self.commit(&mut state, working, &[], &updated, "reorder")
                    .await?;
                info!(
                    drag = command.drag_index,
                    hover = command.hover_index,
                    renumbered = updated.len(),
                    "photos reordered"
                );
                Ok(true)
            }
        }
    }

    pub async fn orientation(
        &self,
        query: OrientationQuery,
    ) -> Result<Orientation, ApplicationError> {
        let mut state = self.state.lock().await;
        let image = state.photos.find(query.id)?.image.clone();
        self.orientation_of(&mut state, query.id, &image)
    }

    pub fn load_settings(
        &self,
        _query: LoadSettingsQuery,
    ) -> Result<ReportSettings, ApplicationError> {
        self.settings.load()
    }

    pub fn save_settings(&self, command: SaveSettingsCommand) -> Result<(), ApplicationError> {
        if command.settings.page_size == 0 {
            return Err(ApplicationError::InvalidInput(
                "page size must be at least 1".to_string(),
            ));
        }
        self.settings.save(&command.settings)
    }

    pub async fn export_report(
        &self,
        command: ExportReportCommand,
    ) -> Result<ExportArtifact, ApplicationError> {
        let settings = self.settings.load()?;
        let missing = settings.metadata.missing_required_fields();
        if !missing.is_empty() {
            return Err(ApplicationError::InvalidInput(format!(
                "missing report details: {}",
                missing.join(", ")
            )));
        }
        if command.field_errors.has_errors() {
            return Err(ApplicationError::InvalidInput(format!(
                "fix the form errors first: {}",
                command.field_errors.failing_fields().join(", ")
            )));
        }

        let mut state = self.state.lock().await;
        self.ensure_synced(&mut state).await?;
        state.photos.validate()?;

        let records = state.photos.records().to_vec();
        let mut photos = Vec::with_capacity(records.len());
        for record in records {
            let orientation = match record.id {
                Some(id) => self
                    .orientation_of(&mut state, id, &record.image)
                    .unwrap_or_else(|error| {
                        warn!(
                            id = %id,
                            %error,
                            "image dimensions unavailable, using portrait layout"
                        );
                        Orientation::Portrait
                    }),
                None => Orientation::Portrait,
            };
            photos.push(ExportPhoto {
                label: record.display_label(),
                uid_suffix: record.uid_suffix,
                description: record.description,
                orientation,
                image: record.image,
            });
        }
        drop(state);

        let request = ExportRequest {
            metadata: settings.metadata,
            photos,
            generated_at: self.clock.now_timestamp_string(),
            output_dir: command.output_dir,
        };
        let artifact = self.exporter.export(&request)?;
        info!(
            path = %artifact.file_path.display(),
            slides = artifact.slide_count,
            "report exported"
        );
        Ok(artifact)
    }

    fn orientation_of(
        &self,
        state: &mut ListState,
        id: PhotoId,
        image: &ImageRef,
    ) -> Result<Orientation, ApplicationError> {
        if let Some(orientation) = state.orientations.get(&id) {
            return Ok(*orientation);
        }
        let (width, height) = self.decoder.decode_dimensions(image)?;
        let orientation = Orientation::from_dimensions(width, height);
        state.orientations.insert(id, orientation);
        Ok(orientation)
    }

    async fn ensure_synced(&self, state: &mut ListState) -> Result<(), ApplicationError> {
        if state.dirty {
            warn!("reloading photo list after an earlier failed write");
            self.reconcile_locked(state).await?;
        }
        Ok(())
    }

    async fn reconcile_locked(&self, state: &mut ListState) -> Result<(), ApplicationError> {
        let repository = self.repository.as_ref();
        let records = self
            .persist("retrieve photos", move || repository.retrieve_all())
            .await?;

        let mut photos = PhotoList::from_records(records);
        let repair = photos.normalize();
        if !repair.is_clean() {
            warn!(
                removed = repair.removed.len(),
                updated = repair.updated.len(),
                "repairing stored photo list"
            );
            if let Err(error) = self
                .write_changes(&photos, &repair.removed, &repair.updated)
                .await
            {
                return Err(mark_dirty(state, "repair photo list", error));
            }
        }

        state
            .orientations
            .retain(|id, _| photos.position(*id).is_some());
        state.photos = photos;
        state.dirty = false;
        info!(count = state.photos.len(), "photo list loaded");
        Ok(())
    }

    /// Writes the outcome of a mutation, then swaps it in. On failure the
    /// visible list keeps its previous state and is marked for reload.
    async fn commit(
        &self,
        state: &mut ListState,
        working: PhotoList,
        removed: &[PhotoRecord],
        updated: &[usize],
        action: &'static str,
    ) -> Result<(), ApplicationError> {
        if let Err(error) = self.write_changes(&working, removed, updated).await {
            return Err(mark_dirty(state, action, error));
        }
        state.photos = working;
        Ok(())
    }

    async fn write_changes(
        &self,
        photos: &PhotoList,
        removed: &[PhotoRecord],
        updated: &[usize],
    ) -> Result<(), ApplicationError> {
        let repository = self.repository.as_ref();
        for id in removed.iter().filter_map(|record| record.id) {
            self.persist("delete photo", move || repository.delete_photo(id))
                .await?;
        }
        for record in updated.iter().filter_map(|&index| photos.get(index)) {
            self.persist("update photo", move || repository.update_photo(record))
                .await?;
        }
        Ok(())
    }

    async fn persist<T, F, Fut>(&self, action: &'static str, call: F) -> Result<T, ApplicationError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ApplicationError>>,
    {
        self.persist_with(action, Replay::AfterTimeout, call).await
    }

    /// For calls that create a record. A timed-out insert may still commit in
    /// the store, so it is never sent a second time; the caller marks the list
    /// dirty and the next reload adopts whatever landed.
    async fn persist_insert<T, F, Fut>(
        &self,
        action: &'static str,
        call: F,
    ) -> Result<T, ApplicationError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ApplicationError>>,
    {
        self.persist_with(action, Replay::OnRejection, call).await
    }

    async fn persist_with<T, F, Fut>(
        &self,
        action: &'static str,
        replay: Replay,
        mut call: F,
    ) -> Result<T, ApplicationError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ApplicationError>>,
    {
        let attempts = self.policy.attempts();
        let mut attempt = 0;
        loop {
            attempt += 1;
            let (error, timed_out) = match tokio::time::timeout(self.policy.timeout, call()).await {
                Ok(Ok(value)) => return Ok(value),
                Ok(Err(error)) => (error, false),
                Err(_) => (
                    ApplicationError::PersistenceFailure(format!(
                        "{action} timed out after {} ms",
                        self.policy.timeout.as_millis()
                    )),
                    true,
                ),
            };

            let retryable = match error {
                ApplicationError::NotFound(_) => false,
                _ => !timed_out || replay == Replay::AfterTimeout,
            };
            if !retryable || attempt >= attempts {
                return Err(match error {
                    ApplicationError::PersistenceFailure(message) => {
                        ApplicationError::PersistenceFailure(message)
                    }
                    other => ApplicationError::PersistenceFailure(format!("{action}: {other}")),
                });
            }
            warn!(action, attempt, attempts, %error, "retrying photo store call");
        }
    }
}

/// Whether a failed store call may be sent again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Replay {
    AfterTimeout,
    OnRejection,
}

fn mark_dirty(state: &mut ListState, action: &str, error: ApplicationError) -> ApplicationError {
    state.dirty = true;
    error!(
        action,
        %error,
        "photo store write failed, list will be reloaded before the next change"
    );
    error
}
