// Copyright 2024-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Version-dispatched decoding of trace intake bodies into a
//! [`TracerPayload`].

use crate::api_version::ApiVersion;
use crate::msgpack_decoder;
use crate::msgpack_decoder::error::DecodeError;
use crate::span::{Span, TraceChunk, TracerPayload, PRIORITY_NONE};
use crate::tracer_header_tags::TracerHeaderTags;
use indexmap::IndexMap;

pub const APPLICATION_MSGPACK: &str = "application/msgpack";
pub const APPLICATION_JSON: &str = "application/json";
const TEXT_JSON: &str = "text/json";

/// Extracts the media type from a Content-Type header value, stripping any
/// parameters. An absent, empty, or unparseable value falls back to JSON,
/// mirroring the agent's behavior.
pub fn media_type_or_default(content_type: Option<&str>) -> String {
    let media_type = content_type
        .and_then(|value| value.split(';').next())
        .map(|value| value.trim().to_ascii_lowercase())
        .unwrap_or_default();

    if media_type.is_empty() {
        APPLICATION_JSON.to_owned()
    } else {
        media_type
    }
}

/// Decodes one request body into a [`TracerPayload`].
///
/// The dispatch is a total match over [`ApiVersion`]. Header tags supply the
/// payload-level metadata for every wire version older than v0.7, which is
/// the only one carrying its own.
pub fn decode_tracer_payload(
    version: ApiVersion,
    media_type: &str,
    body: &[u8],
    header_tags: &TracerHeaderTags,
) -> Result<TracerPayload, DecodeError> {
    match version {
        ApiVersion::V01 => {
            // Legacy flat span array; spans are regrouped into one synthetic
            // chunk per distinct trace id. The format carries no payload or
            // chunk metadata of its own.
            let spans: Vec<Span> = serde_json::from_slice(body).map_err(json_error)?;
            Ok(payload_from_header_tags(
                trace_chunks_from_spans(spans),
                header_tags,
            ))
        }
        ApiVersion::V05 => {
            let traces = msgpack_decoder::v05::from_slice(&mut &*body)?;
            Ok(payload_from_header_tags(
                trace_chunks_from_traces(traces),
                header_tags,
            ))
        }
        ApiVersion::V07 => rmp_serde::from_slice(body)
            .map_err(|e| DecodeError::InvalidFormat(format!("Invalid v0.7 payload: {e}"))),
        ApiVersion::V02 | ApiVersion::V03 | ApiVersion::V04 | ApiVersion::Unknown => {
            let traces = decode_traces(media_type, body)?;
            Ok(payload_from_header_tags(
                trace_chunks_from_traces(traces),
                header_tags,
            ))
        }
    }
}

/// Decodes a v0.2/v0.3/v0.4 body according to its declared media type.
fn decode_traces(media_type: &str, body: &[u8]) -> Result<Vec<Vec<Span>>, DecodeError> {
    match media_type {
        APPLICATION_MSGPACK => msgpack_decoder::v04::from_slice(&mut &*body),
        APPLICATION_JSON | TEXT_JSON | "" => serde_json::from_slice(body).map_err(json_error),
        _ => {
            // Unrecognized media type: do our best. JSON is attempted first;
            // its error is discarded and replaced by the outcome of a
            // msgpack decode.
            match serde_json::from_slice(body) {
                Ok(traces) => Ok(traces),
                Err(_) => msgpack_decoder::v04::from_slice(&mut &*body),
            }
        }
    }
}

fn json_error(e: serde_json::Error) -> DecodeError {
    DecodeError::InvalidFormat(format!("Invalid JSON payload: {e}"))
}

/// Groups a flat span list into one chunk per distinct trace id, preserving
/// the order in which trace ids first appear.
fn trace_chunks_from_spans(spans: Vec<Span>) -> Vec<TraceChunk> {
    let mut by_trace_id: IndexMap<u64, Vec<Span>> = IndexMap::new();
    for span in spans {
        by_trace_id.entry(span.trace_id).or_default().push(span);
    }
    by_trace_id
        .into_values()
        .map(chunk_with_no_priority)
        .collect()
}

fn trace_chunks_from_traces(traces: Vec<Vec<Span>>) -> Vec<TraceChunk> {
    traces.into_iter().map(chunk_with_no_priority).collect()
}

fn chunk_with_no_priority(spans: Vec<Span>) -> TraceChunk {
    TraceChunk {
        priority: PRIORITY_NONE,
        spans,
        ..Default::default()
    }
}

fn payload_from_header_tags(
    chunks: Vec<TraceChunk>,
    header_tags: &TracerHeaderTags,
) -> TracerPayload {
    TracerPayload {
        container_id: header_tags.container_id.to_owned(),
        language_name: header_tags.lang.to_owned(),
        language_version: header_tags.lang_version.to_owned(),
        tracer_version: header_tags.tracer_version.to_owned(),
        chunks,
        ..Default::default()
    }
}
