// Copyright 2024-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Sampling priority assigned to chunks whose producer expressed no
/// preference. Matches the agent's `PriorityNone` marker.
pub const PRIORITY_NONE: i32 = i8::MIN as i32;

/// A single span as emitted by a Datadog tracer.
///
/// Every field carries a serde default so that legacy JSON bodies, which
/// routinely omit unset fields, still deserialize.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct Span {
    /// Name of the service with which this span is associated.
    #[serde(default)]
    pub service: String,
    /// Operation name of this span.
    #[serde(default)]
    pub name: String,
    /// Resource name of this span, also called the endpoint for web spans.
    #[serde(default)]
    pub resource: String,
    /// ID of the trace to which this span belongs.
    #[serde(default)]
    pub trace_id: u64,
    /// ID of this span.
    #[serde(default)]
    pub span_id: u64,
    /// ID of this span's parent, or zero if this span has no parent.
    #[serde(default)]
    pub parent_id: u64,
    /// Nanoseconds between the Unix epoch and the beginning of this span.
    #[serde(default)]
    pub start: i64,
    /// Duration of this span in nanoseconds.
    #[serde(default)]
    pub duration: i64,
    /// Non-zero if there is an error associated with this span.
    #[serde(default)]
    pub error: i32,
    /// String-valued tags.
    #[serde(default)]
    pub meta: HashMap<String, String>,
    /// Numeric-valued tags.
    #[serde(default)]
    pub metrics: HashMap<String, f64>,
    /// Span type tag, e.g. "web" or "custom".
    #[serde(default, rename = "type")]
    pub r#type: String,
    /// Opaque per-key binary payloads attached by the tracer.
    #[serde(default)]
    pub meta_struct: HashMap<String, Vec<u8>>,
}

/// An ordered group of spans that share an originating trace.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct TraceChunk {
    /// Sampling priority of the chunk, [`PRIORITY_NONE`] when absent.
    #[serde(default)]
    pub priority: i32,
    /// Origin of the chunk, e.g. "lambda".
    #[serde(default)]
    pub origin: String,
    /// The spans of the chunk.
    #[serde(default)]
    pub spans: Vec<Span>,
    /// Chunk-level tags.
    #[serde(default)]
    pub tags: HashMap<String, String>,
    /// Whether the tracer suggested dropping this chunk.
    #[serde(default)]
    pub dropped_trace: bool,
}

/// The normalized intermediate representation of one decoded request,
/// independent of the wire version it arrived in.
///
/// Constructed fresh per request by the decoder and consumed immediately by
/// the translator; never retained.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct TracerPayload {
    /// ID of the container where the tracer runs.
    #[serde(default)]
    pub container_id: String,
    /// Language of the tracer, e.g. "python".
    #[serde(default)]
    pub language_name: String,
    /// Version of the tracer's language.
    #[serde(default)]
    pub language_version: String,
    /// Version of the tracer itself.
    #[serde(default)]
    pub tracer_version: String,
    /// Unique runtime identifier of the traced process.
    #[serde(default)]
    pub runtime_id: String,
    /// The trace chunks of the payload.
    #[serde(default)]
    pub chunks: Vec<TraceChunk>,
    /// Payload-level tags.
    #[serde(default)]
    pub tags: HashMap<String, String>,
    /// Deployment environment of the traced application.
    #[serde(default)]
    pub env: String,
    /// Hostname of the machine running the tracer.
    #[serde(default)]
    pub hostname: String,
    /// Version of the traced application.
    #[serde(default)]
    pub app_version: String,
}

impl TracerPayload {
    /// Total number of spans across all chunks.
    pub fn span_count(&self) -> usize {
        self.chunks.iter().map(|c| c.spans.len()).sum()
    }
}
