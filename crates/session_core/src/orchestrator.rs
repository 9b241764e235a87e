use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use chrono::Utc;
use generation_client::GenerationClient;
use shared::domain::{HistoryItem, ImagePayload, PresetAngle, TransformationState};
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, error, info};

use crate::{
    events::{SessionEvent, GENERATION_FAILURE_MESSAGE},
    history::HistoryIdSource,
    session::SessionDocument,
    thumbnail::make_thumbnail,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NotInEditor,
    NoSourceImage,
    AlreadyGenerating,
}

/// Result of one generation request. Skips and failures are absorbed here and
/// never surface as errors.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationOutcome {
    Skipped(SkipReason),
    Completed(HistoryItem),
    Failed,
}

impl GenerationOutcome {
    pub fn completed(&self) -> Option<&HistoryItem> {
        match self {
            GenerationOutcome::Completed(item) => Some(item),
            _ => None,
        }
    }
}

/// Releases the busy flag when dropped, including when the request future is
/// dropped mid-flight.
struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct GenerationOrchestrator {
    client: Arc<dyn GenerationClient>,
    busy: AtomicBool,
    ids: HistoryIdSource,
    thumbnail_max_edge: u32,
    events: broadcast::Sender<SessionEvent>,
}

impl GenerationOrchestrator {
    pub(crate) fn new(
        client: Arc<dyn GenerationClient>,
        thumbnail_max_edge: u32,
        events: broadcast::Sender<SessionEvent>,
    ) -> Self {
        Self {
            client,
            busy: AtomicBool::new(false),
            ids: HistoryIdSource::default(),
            thumbnail_max_edge,
            events,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    fn try_acquire(&self) -> Option<BusyGuard<'_>> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| BusyGuard(&self.busy))
    }

    /// Runs one generation and, on success, records it in `document`'s
    /// history and makes it the current result.
    ///
    /// The result is applied to whatever `document` holds when the client
    /// returns; there is no staleness check against the request.
    pub(crate) async fn request_generation(
        &self,
        document: &Mutex<SessionDocument>,
        source: Option<ImagePayload>,
        transformation: TransformationState,
        preset: Option<PresetAngle>,
    ) -> GenerationOutcome {
        let Some(source) = source else {
            debug!("generation: no source image; request dropped");
            return GenerationOutcome::Skipped(SkipReason::NoSourceImage);
        };
        let Some(_busy) = self.try_acquire() else {
            debug!("generation: already in flight; request dropped");
            return GenerationOutcome::Skipped(SkipReason::AlreadyGenerating);
        };

        let _ = self.events.send(SessionEvent::GenerationStarted { preset });

        match self.client.generate(&source, transformation, preset).await {
            Ok(image) => {
                let item = self.record(image, transformation, preset);
                {
                    let mut doc = document.lock().await;
                    doc.current_result = Some(item.image_data.clone());
                    doc.history.append(item.clone());
                }
                info!(
                    history_id = item.id.0,
                    description = %item.description,
                    "generation: view recorded"
                );
                let _ = self
                    .events
                    .send(SessionEvent::GenerationCompleted { item_id: item.id });
                GenerationOutcome::Completed(item)
            }
            Err(err) => {
                error!(error = %format!("{err:#}"), preset = ?preset, "generation: request failed");
                let _ = self.events.send(SessionEvent::GenerationFailed {
                    message: GENERATION_FAILURE_MESSAGE.to_string(),
                });
                GenerationOutcome::Failed
            }
        }
    }

    fn record(
        &self,
        image: ImagePayload,
        transformation: TransformationState,
        preset: Option<PresetAngle>,
    ) -> HistoryItem {
        let timestamp = Utc::now();
        HistoryItem {
            id: self.ids.next(timestamp),
            thumbnail: make_thumbnail(&image, self.thumbnail_max_edge),
            image_data: image,
            description: describe(&transformation, preset),
            timestamp,
            transformation,
        }
    }
}

/// History label: `"<preset> View"`, or the X/Y rotation for free-form
/// requests. Z rotation, zoom, distortion and lighting are not part of it.
pub fn describe(transformation: &TransformationState, preset: Option<PresetAngle>) -> String {
    match preset {
        Some(preset) => format!("{} View", preset.label()),
        None => format!(
            "Custom: X:{}° Y:{}°",
            format_degrees(transformation.rotate_x),
            format_degrees(transformation.rotate_y)
        ),
    }
}

fn format_degrees(value: f64) -> String {
    // -0 prints as "0"
    let value = if value == 0.0 { 0.0 } else { value };
    format!("{value}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preset_description_uses_label() {
        let t = TransformationState::default();
        assert_eq!(describe(&t, Some(PresetAngle::Left)), "Left Side View");
        assert_eq!(describe(&t, Some(PresetAngle::Top)), "Top-down View");
        assert_eq!(describe(&t, Some(PresetAngle::Bottom)), "Low angle View");
    }

    #[test]
    fn custom_description_only_reflects_x_and_y() {
        let mut t = TransformationState::with_rotation(10.0, 20.0, 0.0);
        assert_eq!(describe(&t, None), "Custom: X:10° Y:20°");

        t.rotate_z = 30.0;
        t.zoom = 2.0;
        t.lighting_angle = 90.0;
        assert_eq!(describe(&t, None), "Custom: X:10° Y:20°");
    }

    #[test]
    fn custom_description_formats_fractions_and_negative_zero() {
        let t = TransformationState::with_rotation(-0.0, 12.5, 0.0);
        assert_eq!(describe(&t, None), "Custom: X:0° Y:12.5°");
    }
}
