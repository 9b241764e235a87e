use std::sync::Arc;

use generation_client::GenerationClient;
use shared::domain::{
    HistoryId, HistoryItem, ImagePayload, PresetAngle, Project, TransformationState, ViewMode,
};
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info};

use crate::{
    events::{ConfirmationPrompt, SessionEvent, CLEAR_HISTORY_PROMPT},
    history::HistoryLedger,
    orchestrator::{GenerationOrchestrator, GenerationOutcome, SkipReason},
    preset,
    thumbnail::DEFAULT_THUMBNAIL_MAX_EDGE,
};

const EVENT_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Default)]
pub(crate) struct SessionDocument {
    pub(crate) source_image: Option<ImagePayload>,
    pub(crate) current_result: Option<ImagePayload>,
    pub(crate) active_transformation: TransformationState,
    pub(crate) history: HistoryLedger,
    pub(crate) view_mode: ViewMode,
}

/// Read-only copy of the session for the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub source_image: Option<ImagePayload>,
    pub current_result: Option<ImagePayload>,
    pub active_transformation: TransformationState,
    pub history: Vec<HistoryItem>,
    pub is_generating: bool,
    pub view_mode: ViewMode,
}

#[derive(Debug, Clone, Copy)]
pub struct SessionOptions {
    /// Longest thumbnail edge in pixels; 0 keeps thumbnails identical to the
    /// generated image.
    pub thumbnail_max_edge: u32,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            thumbnail_max_edge: DEFAULT_THUMBNAIL_MAX_EDGE,
        }
    }
}

/// Owner of the single in-memory session document.
///
/// Every user intent goes through one of the methods below. None of them hold
/// the document lock across the call to the generation service, so the user
/// can keep adjusting, browsing history or navigating while a request is out.
pub struct SessionController {
    orchestrator: GenerationOrchestrator,
    confirmation: Arc<dyn ConfirmationPrompt>,
    document: Mutex<SessionDocument>,
    events: broadcast::Sender<SessionEvent>,
}

impl SessionController {
    pub fn new(
        client: Arc<dyn GenerationClient>,
        confirmation: Arc<dyn ConfirmationPrompt>,
    ) -> Arc<Self> {
        Self::new_with_options(client, confirmation, SessionOptions::default())
    }

    pub fn new_with_options(
        client: Arc<dyn GenerationClient>,
        confirmation: Arc<dyn ConfirmationPrompt>,
        options: SessionOptions,
    ) -> Arc<Self> {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Arc::new(Self {
            orchestrator: GenerationOrchestrator::new(
                client,
                options.thumbnail_max_edge,
                events.clone(),
            ),
            confirmation,
            document: Mutex::new(SessionDocument::default()),
            events,
        })
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub fn is_generating(&self) -> bool {
        self.orchestrator.is_busy()
    }

    /// Starts a fresh document around `image`, discarding any previous result
    /// and transformation. History is kept.
    pub async fn upload(&self, image: ImagePayload) {
        {
            let mut doc = self.document.lock().await;
            doc.source_image = Some(image);
            doc.current_result = None;
            doc.active_transformation = TransformationState::default();
            doc.view_mode = ViewMode::Editor;
        }
        info!("session: source image uploaded");
        let _ = self.events.send(SessionEvent::ImageUploaded);
    }

    /// Moves the controls to the preset's canonical transformation and
    /// requests a generation for it. The controls keep the resolved value
    /// even if the generation is dropped or fails.
    pub async fn apply_preset(&self, preset: PresetAngle) -> GenerationOutcome {
        let resolved = preset::resolve(preset);
        let source = {
            let mut doc = self.document.lock().await;
            if doc.view_mode != ViewMode::Editor {
                return GenerationOutcome::Skipped(SkipReason::NotInEditor);
            }
            doc.active_transformation = resolved;
            doc.source_image.clone()
        };
        debug!(preset = %preset, "session: preset applied");
        self.orchestrator
            .request_generation(&self.document, source, resolved, Some(preset))
            .await
    }

    /// Replaces the active transformation wholesale. No generation.
    pub async fn adjust_transformation(&self, transformation: TransformationState) -> bool {
        let mut doc = self.document.lock().await;
        if doc.view_mode != ViewMode::Editor {
            return false;
        }
        doc.active_transformation = transformation;
        true
    }

    /// Requests a free-form generation with the active transformation.
    pub async fn generate(&self) -> GenerationOutcome {
        let (source, transformation) = {
            let doc = self.document.lock().await;
            if doc.view_mode != ViewMode::Editor {
                return GenerationOutcome::Skipped(SkipReason::NotInEditor);
            }
            (doc.source_image.clone(), doc.active_transformation)
        };
        self.orchestrator
            .request_generation(&self.document, source, transformation, None)
            .await
    }

    /// Shows a past result and restores the transformation that produced it.
    pub async fn select_history(&self, item: &HistoryItem) -> bool {
        let mut doc = self.document.lock().await;
        if doc.view_mode != ViewMode::Editor {
            return false;
        }
        doc.current_result = Some(item.image_data.clone());
        // copied out; the ledger entry stays untouched by later adjustments
        doc.active_transformation = item.transformation;
        true
    }

    pub async fn select_history_by_id(&self, id: HistoryId) -> bool {
        let item = {
            let doc = self.document.lock().await;
            doc.history.get(id).cloned()
        };
        match item {
            Some(item) => self.select_history(&item).await,
            None => false,
        }
    }

    /// Empties the history after an affirmative confirmation. Returns whether
    /// the history was cleared.
    pub async fn clear_history(&self) -> bool {
        if !self.confirmation.confirm(CLEAR_HISTORY_PROMPT) {
            debug!("session: clear history declined");
            return false;
        }
        self.document.lock().await.history.clear();
        info!("session: history cleared");
        let _ = self.events.send(SessionEvent::HistoryCleared);
        true
    }

    pub async fn go_home(&self) {
        {
            let mut doc = self.document.lock().await;
            doc.source_image = None;
            doc.current_result = None;
            doc.history.clear();
            doc.view_mode = ViewMode::Landing;
        }
        info!("session: returned to landing");
        let _ = self.events.send(SessionEvent::ReturnedHome);
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        let doc = self.document.lock().await;
        SessionSnapshot {
            source_image: doc.source_image.clone(),
            current_result: doc.current_result.clone(),
            active_transformation: doc.active_transformation,
            history: doc.history.items().to_vec(),
            is_generating: self.orchestrator.is_busy(),
            view_mode: doc.view_mode,
        }
    }

    /// Latest result, or the source image when nothing was generated yet.
    pub async fn display_image(&self) -> Option<ImagePayload> {
        let doc = self.document.lock().await;
        doc.current_result
            .clone()
            .or_else(|| doc.source_image.clone())
    }

    pub async fn project(&self, name: impl Into<String>) -> Project {
        let items = self.document.lock().await.history.items().to_vec();
        Project::new(name, items)
    }
}
