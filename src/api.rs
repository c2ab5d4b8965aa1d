//! OpenRouter chat-completion client for press-release summarization.
//!
//! Two call shapes are exposed:
//! - [`SummaryClient::summarize_stream`]: streamed completion, decoded
//!   chunk-by-chunk from the provider's SSE wire format so tokens can be
//!   forwarded to the caller as they arrive.
//! - [`SummaryClient::summarize`]: single-shot completion for batch use.
//!
//! Failures propagate once to the caller; no retries are performed. A
//! malformed JSON chunk inside an otherwise healthy stream is skipped and
//! the stream continues.

use std::pin::Pin;
use std::time::Instant;

use anyhow::{Context, Result, bail};
use bytes::Bytes;
use futures::{Stream, StreamExt};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info, instrument, warn};

use crate::utils::truncate_for_log;

/// One decoded piece of a streaming completion.
#[derive(Debug, Clone)]
pub struct SummaryChunk {
    /// Text delta carried by this chunk; may be empty.
    pub delta: String,
    /// Whether the provider signalled end of stream.
    pub done: bool,
}

/// Boxed stream of decoded completion chunks.
pub type SummaryStream = Pin<Box<dyn Stream<Item = Result<SummaryChunk>> + Send>>;

#[derive(Debug, Deserialize)]
struct StreamChunk {
    choices: Vec<StreamChoice>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    delta: StreamDelta,
}

#[derive(Debug, Deserialize)]
struct StreamDelta {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Client for an OpenAI-compatible chat-completion endpoint.
#[derive(Clone)]
pub struct SummaryClient {
    http: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl SummaryClient {
    /// Create a client for the given API base, bearer token, and model.
    pub fn new(base_url: String, api_key: String, model: String) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            model,
        }
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    fn request_body(&self, prompt: &str, stream: bool) -> serde_json::Value {
        json!({
            "model": self.model,
            "messages": [{ "role": "user", "content": prompt }],
            "stream": stream,
        })
    }

    /// Request a streamed completion and decode it into [`SummaryChunk`]s.
    ///
    /// # Errors
    ///
    /// Fails if the request cannot be sent or the provider answers with a
    /// non-2xx status. Errors inside the byte stream surface as `Err` items.
    #[instrument(level = "info", skip_all, fields(model = %self.model))]
    pub async fn summarize_stream(&self, prompt: &str) -> Result<SummaryStream> {
        debug!(prompt_bytes = prompt.len(), "Requesting streamed completion");

        let response = self
            .http
            .post(self.completions_url())
            .bearer_auth(&self.api_key)
            .json(&self.request_body(prompt, true))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            bail!("OpenRouter API error: {}", status.as_u16());
        }

        Ok(decode_sse_stream(response.bytes_stream()))
    }

    /// Request a completion and return the full summary text.
    ///
    /// # Errors
    ///
    /// Fails on network errors, non-2xx statuses, or a response carrying
    /// no message content.
    #[instrument(level = "info", skip_all, fields(model = %self.model))]
    pub async fn summarize(&self, prompt: &str) -> Result<String> {
        let t0 = Instant::now();

        let response = self
            .http
            .post(self.completions_url())
            .bearer_auth(&self.api_key)
            .json(&self.request_body(prompt, false))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            bail!("OpenRouter API error: {}", status.as_u16());
        }

        let parsed: CompletionResponse = response.json().await?;
        let summary = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .context("completion response carried no content")?;

        info!(
            elapsed_ms = t0.elapsed().as_millis() as u64,
            summary_bytes = summary.len(),
            "Completion finished"
        );
        Ok(summary)
    }
}

/// Decode an SSE byte stream into completion chunks.
///
/// Lines are buffered until newline-complete, `data: [DONE]` terminates
/// the stream, and chunks that fail JSON parsing are skipped so one
/// malformed frame cannot kill an otherwise healthy stream. A transport
/// error ends the stream after surfacing as the final item.
fn decode_sse_stream(
    bytes: impl Stream<Item = reqwest::Result<Bytes>> + Send + 'static,
) -> SummaryStream {
    Box::pin(async_stream::stream! {
        futures::pin_mut!(bytes);
        let mut buffer = String::new();

        while let Some(next) = bytes.next().await {
            let chunk = match next {
                Ok(chunk) => chunk,
                Err(e) => {
                    yield Err(e.into());
                    return;
                }
            };
            buffer.push_str(&String::from_utf8_lossy(&chunk));

            while let Some(newline) = buffer.find('\n') {
                let line = buffer[..newline].trim().to_string();
                buffer.drain(..=newline);

                let Some(data) = line.strip_prefix("data: ") else {
                    continue;
                };

                if data == "[DONE]" {
                    yield Ok(SummaryChunk { delta: String::new(), done: true });
                    return;
                }

                match serde_json::from_str::<StreamChunk>(data) {
                    Ok(parsed) => {
                        let delta = parsed
                            .choices
                            .into_iter()
                            .next()
                            .and_then(|choice| choice.delta.content)
                            .unwrap_or_default();
                        if !delta.is_empty() {
                            yield Ok(SummaryChunk { delta, done: false });
                        }
                    }
                    Err(e) => {
                        warn!(
                            error = %e,
                            data = %truncate_for_log(data, 200),
                            "Skipping malformed stream chunk"
                        );
                    }
                }
            }
        }
    })
}

/// Build the professional-analyst prompt wrapped around scraped content.
pub fn analyst_prompt(content: &str) -> String {
    format!(
        "You are a professional business analyst. Please analyze the following press release \
content and provide a comprehensive, well-structured summary. \n\n\
Format your response as follows:\n\
- **Executive Summary**: A brief overview in 2-3 sentences\n\
- **Key Announcements**: Main points and announcements\n\
- **Financial Highlights**: Any financial data, revenue, profits, etc.\n\
- **Strategic Implications**: Business impact and strategic importance\n\
- **Key Figures**: Important people mentioned\n\
- **Timeline**: Important dates mentioned\n\
- **Market Impact**: Potential effects on market/industry\n\n\
Keep the analysis professional, objective, and well-formatted with clear headings and \
bullet points where appropriate.\n\n\
Content to analyze:\n{content}"
    )
}
