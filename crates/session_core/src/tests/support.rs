use std::{
    collections::VecDeque,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use generation_client::GenerationClient;
use shared::domain::{ImagePayload, PresetAngle, TransformationState};
use tokio::sync::{Mutex, Notify};

use crate::events::ConfirmationPrompt;

pub(super) type SeenRequest = (ImagePayload, TransformationState, Option<PresetAngle>);

/// Returns queued responses in order. When gated, every call parks until the
/// gate is notified once.
pub(super) struct ScriptedClient {
    responses: Mutex<VecDeque<std::result::Result<String, String>>>,
    seen: Mutex<Vec<SeenRequest>>,
    calls: AtomicUsize,
    started: Arc<Notify>,
    gate: Option<Arc<Notify>>,
}

impl ScriptedClient {
    pub(super) fn ok(images: &[&str]) -> Self {
        Self::scripted(images.iter().map(|image| Ok(image.to_string())).collect())
    }

    pub(super) fn failing(err: &str) -> Self {
        Self::scripted(vec![Err(err.to_string())])
    }

    pub(super) fn scripted(responses: Vec<std::result::Result<String, String>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            seen: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
            started: Arc::new(Notify::new()),
            gate: None,
        }
    }

    pub(super) fn gated(mut self) -> (Self, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        self.gate = Some(Arc::clone(&gate));
        (self, gate)
    }

    pub(super) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(super) fn started(&self) -> Arc<Notify> {
        Arc::clone(&self.started)
    }

    pub(super) async fn seen(&self) -> Vec<SeenRequest> {
        self.seen.lock().await.clone()
    }
}

#[async_trait]
impl GenerationClient for ScriptedClient {
    async fn generate(
        &self,
        source: &ImagePayload,
        transformation: TransformationState,
        preset: Option<PresetAngle>,
    ) -> Result<ImagePayload> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen
            .lock()
            .await
            .push((source.clone(), transformation, preset));
        self.started.notify_one();

        if let Some(gate) = &self.gate {
            gate.notified().await;
        }

        match self.responses.lock().await.pop_front() {
            Some(Ok(image)) => Ok(ImagePayload::new(image)),
            Some(Err(err)) => Err(anyhow!(err)),
            None => Err(anyhow!("no scripted response left")),
        }
    }
}

pub(super) struct RecordingPrompt {
    answer: bool,
    asked: std::sync::Mutex<Vec<String>>,
}

impl RecordingPrompt {
    pub(super) fn answering(answer: bool) -> Self {
        Self {
            answer,
            asked: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub(super) fn asked(&self) -> Vec<String> {
        self.asked
            .lock()
            .map(|asked| asked.clone())
            .unwrap_or_default()
    }
}

impl ConfirmationPrompt for RecordingPrompt {
    fn confirm(&self, message: &str) -> bool {
        if let Ok(mut asked) = self.asked.lock() {
            asked.push(message.to_string());
        }
        self.answer
    }
}
