//! Per-file page state: preferences, title/description editing, pillars.
//!
//! Loads a neural file and resolves its display preferences. The order
//! preference keeps its unset sentinel until the stored value arrives, so
//! note lists never sort with a guessed order and then visibly reflow. A
//! temporary (not yet persisted) file skips all backend writes until the
//! first title save creates it.

use std::sync::Arc;

use tracing::{debug, info, warn};

use notarium_core::{
    BlockList, CreateFileRequest, Error, EventBus, FileId, FileStore, NeuralFile, OrderMode,
    PillarRequest, Result, ScopeEvent, UpdateFileRequest,
};

/// State behind a file page.
pub struct FilePageState {
    files: Arc<dyn FileStore>,
    events: Arc<EventBus>,
    file: Option<NeuralFile>,
    temporary: bool,
    title: String,
    description: BlockList,
    order: Option<OrderMode>,
    toc_mode: bool,
}

impl FilePageState {
    /// Load an existing file and resolve its preferences.
    pub async fn load(
        files: Arc<dyn FileStore>,
        events: Arc<EventBus>,
        file_id: FileId,
    ) -> Result<Self> {
        let file = files.fetch_file(file_id).await?;
        // Stored preference wins; files from before the preference existed
        // resolve to latest-last.
        let order = Some(OrderMode::resolve(file.note_order));
        debug!(file_id, stored = ?file.note_order, "order preference resolved");

        Ok(Self {
            files,
            events,
            title: file.name.clone(),
            description: BlockList::from_text(&file.description),
            order,
            toc_mode: file.table_of_contents_mode,
            file: Some(file),
            temporary: false,
        })
    }

    /// A brand-new file that exists only locally until the title is saved.
    pub fn temporary(files: Arc<dyn FileStore>, events: Arc<EventBus>) -> Self {
        Self {
            files,
            events,
            file: None,
            temporary: true,
            title: String::new(),
            description: BlockList::default(),
            // Nothing stored to wait for; temp files default immediately.
            order: Some(OrderMode::LatestLast),
            toc_mode: false,
        }
    }

    pub fn is_temporary(&self) -> bool {
        self.temporary
    }

    pub fn file(&self) -> Option<&NeuralFile> {
        self.file.as_ref()
    }

    pub fn file_id(&self) -> Option<FileId> {
        self.file.as_ref().map(|f| f.id)
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    /// Resolved order preference. `None` only before a load completed.
    pub fn order(&self) -> Option<OrderMode> {
        self.order
    }

    pub fn toc_mode(&self) -> bool {
        self.toc_mode
    }

    pub fn description(&self) -> &BlockList {
        &self.description
    }

    pub fn description_mut(&mut self) -> &mut BlockList {
        &mut self.description
    }

    /// Persist the title. For a temporary file this creates the real file
    /// (blank names are rejected); for an existing file it renames.
    pub async fn save_title(&mut self) -> Result<()> {
        let name = self.title.trim().to_string();
        if self.temporary {
            if name.is_empty() {
                return Err(Error::Validation("file name must not be empty".to_string()));
            }
            let created = self
                .files
                .create_file(CreateFileRequest {
                    name,
                    description: self.description.to_text(),
                })
                .await?;
            info!(file_id = created.id, "file created");
            self.temporary = false;
            self.title = created.name.clone();
            self.file = Some(created);
            self.events.emit(ScopeEvent::FileListChanged);
            return Ok(());
        }

        let Some(file) = self.file.as_mut() else {
            return Err(Error::Internal("file page has no loaded file".to_string()));
        };
        let updated = self
            .files
            .update_file(
                file.id,
                UpdateFileRequest {
                    name: Some(name),
                    ..Default::default()
                },
            )
            .await?;
        *file = updated;
        self.title = file.name.clone();
        self.events.emit(ScopeEvent::FileListChanged);
        Ok(())
    }

    /// Persist the description blocks.
    pub async fn save_description(&mut self) -> Result<()> {
        if self.temporary {
            return Ok(());
        }
        let Some(file) = self.file.as_mut() else {
            return Err(Error::Internal("file page has no loaded file".to_string()));
        };
        let updated = self
            .files
            .update_file(
                file.id,
                UpdateFileRequest {
                    description: Some(self.description.to_text()),
                    ..Default::default()
                },
            )
            .await?;
        *file = updated;
        Ok(())
    }

    /// Change the order preference. The local value is kept even when
    /// persistence fails: the preference is pure display state and the
    /// next successful save repairs the stored copy.
    pub async fn set_order(&mut self, order: OrderMode) -> Result<()> {
        self.order = Some(order);
        if let Some(file) = self.file.as_mut() {
            file.note_order = Some(order);
        }
        if self.temporary {
            return Ok(());
        }
        let Some(file_id) = self.file_id() else {
            return Ok(());
        };
        match self
            .files
            .update_file(
                file_id,
                UpdateFileRequest {
                    note_order: Some(order),
                    ..Default::default()
                },
            )
            .await
        {
            Ok(_) => {
                debug!(file_id, %order, "order preference saved");
                Ok(())
            }
            Err(e) => {
                warn!(file_id, error = %e, "order preference save failed");
                Err(e)
            }
        }
    }

    /// Toggle table-of-contents mode. Reverts the local flag when the
    /// backend rejects the change.
    pub async fn toggle_toc(&mut self) -> Result<bool> {
        let new_mode = !self.toc_mode;
        self.toc_mode = new_mode;
        if let Some(file) = self.file.as_mut() {
            file.table_of_contents_mode = new_mode;
        }
        if self.temporary {
            return Ok(new_mode);
        }
        let Some(file_id) = self.file_id() else {
            return Ok(new_mode);
        };
        match self
            .files
            .update_file(
                file_id,
                UpdateFileRequest {
                    table_of_contents_mode: Some(new_mode),
                    ..Default::default()
                },
            )
            .await
        {
            Ok(_) => Ok(new_mode),
            Err(e) => {
                self.toc_mode = !new_mode;
                if let Some(file) = self.file.as_mut() {
                    file.table_of_contents_mode = !new_mode;
                }
                warn!(file_id, error = %e, "toc mode save failed, reverted");
                Err(e)
            }
        }
    }

    /// Topic pillars for this file. Cached pillars are served as-is;
    /// otherwise the AI subsystem generates a fresh set, which is cached on
    /// the file for next time.
    pub async fn pillars(&mut self) -> Result<Vec<String>> {
        if let Some(file) = &self.file {
            if !file.pillars.is_empty() {
                debug!(file_id = file.id, "using cached pillars");
                return Ok(file.pillars.clone());
            }
        }
        let Some(file_id) = self.file_id() else {
            return Ok(vec![]);
        };

        let generated = self
            .files
            .generate_pillars(PillarRequest {
                page_title: self.title.clone(),
                page_description: self.description.to_text(),
                notes: vec![],
            })
            .await?;

        if !generated.is_empty() {
            // Cache failures only cost a regeneration next visit.
            match self
                .files
                .update_file(
                    file_id,
                    UpdateFileRequest {
                        pillars: Some(generated.clone()),
                        ..Default::default()
                    },
                )
                .await
            {
                Ok(updated) => self.file = Some(updated),
                Err(e) => warn!(file_id, error = %e, "pillar cache save failed"),
            }
        }
        Ok(generated)
    }

    /// Delete this file. The backend cascades note removal.
    pub async fn delete(&mut self) -> Result<()> {
        let Some(file_id) = self.file_id() else {
            return Ok(());
        };
        self.files.delete_file(file_id).await?;
        self.file = None;
        self.events.emit(ScopeEvent::FileListChanged);
        info!(file_id, "file deleted");
        Ok(())
    }
}
