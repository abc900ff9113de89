//! The fixed endpoint catalog and its per-key request plans.
//!
//! Relays disagree wildly about which API surfaces they implement, so the
//! catalog is a closed, ordered set: generation endpoints first, then data
//! endpoints, then endpoints that need resources the engine cannot
//! synthesize (uploads, sockets, training configs) and are only ever
//! recorded as skipped.

use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;

/// Fixed model used for the `/embeddings` probe request.
pub const EMBEDDING_PROBE_MODEL: &str = "text-embedding-3-small";

/// Fixed model used for the `/moderations` probe request.
pub const MODERATION_PROBE_MODEL: &str = "omni-moderation-latest";

/// One logical API surface, independent of which base URL variant it is
/// combined with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndpointKey {
    Responses,
    ChatCompletions,
    Completions,
    Models,
    Embeddings,
    Moderations,
    Realtime,
    Assistants,
    Batch,
    FineTuning,
    ImagesGenerations,
    ImagesEdits,
    Videos,
    AudioSpeech,
    AudioTranscriptions,
    AudioTranslations,
}

/// How one candidate is exercised on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestPlan {
    /// Plain GET, no body.
    Get,
    /// POST with a JSON body.
    Post(serde_json::Value),
    /// Never dispatched; recorded with this human-readable reason.
    Skip(&'static str),
}

impl EndpointKey {
    /// The full catalog, in probing order. Ordering is significant: it fixes
    /// candidate precedence and the conclusion tie-breaks downstream.
    pub const CATALOG: [EndpointKey; 16] = [
        EndpointKey::Responses,
        EndpointKey::ChatCompletions,
        EndpointKey::Completions,
        EndpointKey::Models,
        EndpointKey::Embeddings,
        EndpointKey::Moderations,
        EndpointKey::Realtime,
        EndpointKey::Assistants,
        EndpointKey::Batch,
        EndpointKey::FineTuning,
        EndpointKey::ImagesGenerations,
        EndpointKey::ImagesEdits,
        EndpointKey::Videos,
        EndpointKey::AudioSpeech,
        EndpointKey::AudioTranscriptions,
        EndpointKey::AudioTranslations,
    ];

    /// URL path suffix for this key.
    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            EndpointKey::Responses => "/responses",
            EndpointKey::ChatCompletions => "/chat/completions",
            EndpointKey::Completions => "/completions",
            EndpointKey::Models => "/models",
            EndpointKey::Embeddings => "/embeddings",
            EndpointKey::Moderations => "/moderations",
            EndpointKey::Realtime => "/realtime",
            EndpointKey::Assistants => "/assistants",
            EndpointKey::Batch => "/batch",
            EndpointKey::FineTuning => "/fine-tuning",
            EndpointKey::ImagesGenerations => "/images/generations",
            EndpointKey::ImagesEdits => "/images/edits",
            EndpointKey::Videos => "/videos",
            EndpointKey::AudioSpeech => "/audio/speech",
            EndpointKey::AudioTranscriptions => "/audio/transcriptions",
            EndpointKey::AudioTranslations => "/audio/translations",
        }
    }

    /// A successful response on these endpoints implies the target model
    /// actually executed.
    #[must_use]
    pub fn is_generation(self) -> bool {
        matches!(
            self,
            EndpointKey::Responses | EndpointKey::ChatCompletions | EndpointKey::Completions
        )
    }

    /// Skip reason for endpoints the engine cannot exercise, `None` for
    /// dispatchable keys.
    #[must_use]
    pub fn skip_reason(self) -> Option<&'static str> {
        match self {
            EndpointKey::Realtime => Some("realtime voice/text session (WebSocket connection)"),
            EndpointKey::Assistants => Some("assistants workflow (needs thread/tool setup)"),
            EndpointKey::Batch => Some("batch jobs (needs a file upload)"),
            EndpointKey::FineTuning => Some("model fine-tuning (needs training config/files)"),
            EndpointKey::ImagesGenerations => Some("image generation (needs image parameters)"),
            EndpointKey::ImagesEdits => Some("image editing (needs an image file)"),
            EndpointKey::Videos => Some("video generation (needs video parameters)"),
            EndpointKey::AudioSpeech => Some("speech synthesis (needs audio parameters)"),
            EndpointKey::AudioTranscriptions => Some("audio transcription (needs an audio file)"),
            EndpointKey::AudioTranslations => Some("audio translation (needs an audio file)"),
            _ => None,
        }
    }

    /// Resolve the verb and payload used to exercise this key.
    ///
    /// `model` is the target model; embeddings and moderations use fixed
    /// probe models because the target model is not expected to serve them.
    #[must_use]
    pub fn request_plan(self, model: &str) -> RequestPlan {
        if let Some(reason) = self.skip_reason() {
            return RequestPlan::Skip(reason);
        }
        match self {
            EndpointKey::Models => RequestPlan::Get,
            EndpointKey::Moderations => RequestPlan::Post(json!({
                "model": MODERATION_PROBE_MODEL,
                "input": "hello",
            })),
            EndpointKey::Embeddings => RequestPlan::Post(json!({
                "model": EMBEDDING_PROBE_MODEL,
                "input": "hello",
            })),
            EndpointKey::ChatCompletions => RequestPlan::Post(json!({
                "model": model,
                "messages": [{"role": "user", "content": "hello"}],
            })),
            EndpointKey::Completions => RequestPlan::Post(json!({
                "model": model,
                "prompt": "hello",
            })),
            // /responses and any future generation-shaped key share this body.
            _ => RequestPlan::Post(json!({
                "model": model,
                "input": "hello",
            })),
        }
    }
}

impl fmt::Display for EndpointKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_orders_generation_endpoints_first() {
        assert_eq!(EndpointKey::CATALOG.len(), 16);
        assert!(EndpointKey::CATALOG[..3].iter().all(|k| k.is_generation()));
        assert!(EndpointKey::CATALOG[3..].iter().all(|k| !k.is_generation()));
    }

    #[test]
    fn exactly_ten_keys_are_skipped() {
        let skipped = EndpointKey::CATALOG
            .iter()
            .filter(|k| k.skip_reason().is_some())
            .count();
        assert_eq!(skipped, 10);
    }

    #[test]
    fn models_is_the_only_get() {
        for key in EndpointKey::CATALOG {
            match key.request_plan("gpt-4") {
                RequestPlan::Get => assert_eq!(key, EndpointKey::Models),
                RequestPlan::Post(_) | RequestPlan::Skip(_) => {}
            }
        }
    }

    #[test]
    fn generation_payloads_carry_the_target_model() {
        for key in [
            EndpointKey::Responses,
            EndpointKey::ChatCompletions,
            EndpointKey::Completions,
        ] {
            match key.request_plan("my-model") {
                RequestPlan::Post(body) => {
                    assert_eq!(body["model"], "my-model", "key {key}");
                }
                other => panic!("expected POST for {key}, got {other:?}"),
            }
        }
    }

    #[test]
    fn embeddings_and_moderations_use_fixed_probe_models() {
        match EndpointKey::Embeddings.request_plan("gpt-4") {
            RequestPlan::Post(body) => assert_eq!(body["model"], EMBEDDING_PROBE_MODEL),
            other => panic!("expected POST, got {other:?}"),
        }
        match EndpointKey::Moderations.request_plan("gpt-4") {
            RequestPlan::Post(body) => assert_eq!(body["model"], MODERATION_PROBE_MODEL),
            other => panic!("expected POST, got {other:?}"),
        }
    }

    #[test]
    fn chat_payload_shape() {
        match EndpointKey::ChatCompletions.request_plan("m") {
            RequestPlan::Post(body) => {
                assert_eq!(body["messages"][0]["role"], "user");
                assert_eq!(body["messages"][0]["content"], "hello");
            }
            other => panic!("expected POST, got {other:?}"),
        }
    }
}
