//! Diagnosis narrative generation via a streaming text-generation service
//!
//! The backing service speaks the Ollama generate protocol: one POST with
//! `stream: true`, answered by newline-delimited JSON frames each carrying
//! a `response` fragment. Fragments are concatenated in arrival order;
//! malformed frames are skipped and transport failures keep whatever text
//! had accumulated, so the pipeline always receives a narrative.

pub mod prompts;
pub mod validation;

use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::model::{DiagnosisNarrative, GenerationConfig};
use prompts::build_diagnosis_prompt;
use validation::normalize_reply;

/// Bounds the whole streaming call so a stalled service cannot hang a request
const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

/// Trait for narrative generation, the seam mocked in pipeline tests
#[async_trait]
pub trait NarrativeGenerator: Send + Sync {
    /// Generate the two-section narrative from retrieved context and query.
    ///
    /// Never fails: generation problems degrade to the placeholder
    /// narrative after the "Remarks:" prefix validation.
    async fn generate(&self, context: &str, query: &str) -> DiagnosisNarrative;
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct StreamFrame {
    #[serde(default)]
    response: String,
    #[serde(default)]
    done: bool,
}

/// Parse one stream line into a frame, skipping anything that is not a
/// JSON object. The stream framing is treated as best-effort.
fn parse_frame(line: &str) -> Option<StreamFrame> {
    let line = line.trim();
    if !line.starts_with('{') {
        return None;
    }
    serde_json::from_str(line).ok()
}

/// Append the fragments of every complete line in `buffer` to `reply`.
/// Returns true once a frame signals the end of the stream.
fn drain_complete_lines(buffer: &mut String, reply: &mut String) -> bool {
    while let Some(pos) = buffer.find('\n') {
        let line: String = buffer.drain(..=pos).collect();
        if let Some(frame) = parse_frame(&line) {
            reply.push_str(&frame.response);
            if frame.done {
                return true;
            }
        }
    }
    false
}

/// Streaming client for an Ollama-compatible generation service
pub struct OllamaGenerator {
    client: Client,
    base_url: String,
    model: String,
}

impl OllamaGenerator {
    pub fn new(config: &GenerationConfig) -> Self {
        Self {
            client: Client::builder()
                .user_agent("dga-agent/0.1")
                .timeout(REQUEST_TIMEOUT)
                .build()
                .unwrap_or_else(|_| Client::new()),
            base_url: config.url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        }
    }

    /// Run the streaming call and accumulate fragments in arrival order.
    ///
    /// Transport failure at any point leaves the text accumulated so far;
    /// the caller applies the same validation either way.
    async fn stream_reply(&self, prompt: &str) -> String {
        let url = format!("{}/api/generate", self.base_url);
        let mut reply = String::new();

        let response = match self
            .client
            .post(&url)
            .json(&GenerateRequest {
                model: &self.model,
                prompt,
                stream: true,
            })
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(error = %e, url = %url, "Generation request failed");
                return reply;
            }
        };

        if !response.status().is_success() {
            tracing::error!(status = %response.status(), url = %url, "Generation service returned error status");
            return reply;
        }

        let mut stream = response.bytes_stream();
        let mut buffer = String::new();

        while let Some(chunk) = stream.next().await {
            match chunk {
                Ok(bytes) => {
                    buffer.push_str(&String::from_utf8_lossy(&bytes));
                    if drain_complete_lines(&mut buffer, &mut reply) {
                        return reply;
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Generation stream interrupted, keeping partial reply");
                    return reply;
                }
            }
        }

        // Final line may arrive without a trailing newline
        if let Some(frame) = parse_frame(&buffer) {
            reply.push_str(&frame.response);
        }

        reply
    }
}

#[async_trait]
impl NarrativeGenerator for OllamaGenerator {
    async fn generate(&self, context: &str, query: &str) -> DiagnosisNarrative {
        let prompt = build_diagnosis_prompt(context, query);
        let start = std::time::Instant::now();

        let reply = self.stream_reply(&prompt).await;

        tracing::info!(
            model = %self.model,
            elapsed_ms = start.elapsed().as_millis(),
            reply_length = reply.len(),
            "Generation call completed"
        );

        normalize_reply(&reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_frame() {
        let frame = parse_frame(r#"{"response": "Remarks", "done": false}"#).unwrap();
        assert_eq!(frame.response, "Remarks");
        assert!(!frame.done);
    }

    #[test]
    fn skips_malformed_and_non_object_lines() {
        assert!(parse_frame("").is_none());
        assert!(parse_frame("not json").is_none());
        assert!(parse_frame("{broken").is_none());
        assert!(parse_frame(r#"["array"]"#).is_none());
    }

    #[test]
    fn frame_without_response_field_contributes_nothing() {
        let frame = parse_frame(r#"{"done": true}"#).unwrap();
        assert_eq!(frame.response, "");
        assert!(frame.done);
    }

    #[test]
    fn fragments_accumulate_across_chunk_boundaries() {
        let mut reply = String::new();
        let mut buffer = String::new();

        // First chunk ends mid-frame
        buffer.push_str("{\"response\": \"Remarks: gas \", \"done\": false}\n{\"respon");
        assert!(!drain_complete_lines(&mut buffer, &mut reply));
        assert_eq!(reply, "Remarks: gas ");

        // Second chunk completes the frame and ends the stream
        buffer.push_str("se\": \"levels ok\", \"done\": true}\n");
        assert!(drain_complete_lines(&mut buffer, &mut reply));
        assert_eq!(reply, "Remarks: gas levels ok");
    }

    #[test]
    fn malformed_frames_do_not_abort_accumulation() {
        let mut reply = String::new();
        let mut buffer = String::new();

        buffer.push_str("{\"response\": \"a\"}\ngarbage line\n{\"response\": \"b\"}\n");
        drain_complete_lines(&mut buffer, &mut reply);

        assert_eq!(reply, "ab");
        assert!(buffer.is_empty());
    }
}
