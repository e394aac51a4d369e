// Copyright 2024-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Regroups a decoded [`TracerPayload`] into the OTLP resource → scope →
//! span hierarchy.

use crate::attributes::translate_span_key;
use datadog_otlp_protobuf::common::{InstrumentationScope, KeyValue};
use datadog_otlp_protobuf::resource::Resource;
use datadog_otlp_protobuf::semconv;
use datadog_otlp_protobuf::trace::{
    span::SpanKind, status::StatusCode, ResourceSpans, ScopeSpans, Span, Status, TracesData,
};
use datadog_trace_decoder::span::{Span as DatadogSpan, TraceChunk, TracerPayload};
use indexmap::IndexMap;

/// Translates one tracer payload into OTLP traces.
///
/// Spans are grouped by service name into resource groups, then by
/// `"{language}-{tracer version}"` into scope groups. Both indices preserve
/// insertion order so the produced hierarchy is reproducible for a given
/// payload. Returns the trace forest together with the translated span count.
pub fn translate_traces(payload: &TracerPayload) -> (TracesData, usize) {
    let mut resource_groups: IndexMap<String, ResourceGroup> = IndexMap::new();
    let mut span_count = 0;

    for chunk in &payload.chunks {
        for span in &chunk.spans {
            let group = resource_groups
                .entry(span.service.clone())
                .or_insert_with(|| ResourceGroup::new(span, chunk, payload));

            let scope_key = format!("{}-{}", payload.language_name, payload.tracer_version);
            let scope_group = group.scopes.entry(scope_key).or_insert_with(|| ScopeSpans {
                scope: Some(InstrumentationScope {
                    name: format!("datadog-{}", payload.language_name),
                    version: payload.tracer_version.clone(),
                    attributes: Vec::new(),
                    dropped_attributes_count: 0,
                }),
                spans: Vec::new(),
                schema_url: semconv::SCHEMA_URL.to_owned(),
            });

            scope_group.spans.push(translate_span(span, chunk, payload));
            span_count += 1;
        }
    }

    let resource_spans = resource_groups
        .into_values()
        .map(ResourceGroup::into_resource_spans)
        .collect();
    (TracesData { resource_spans }, span_count)
}

/// One resource group in the making: the resource attributes plus its scope
/// groups, keyed by language + tracer version.
struct ResourceGroup {
    resource: Resource,
    scopes: IndexMap<String, ScopeSpans>,
}

impl ResourceGroup {
    fn new(span: &DatadogSpan, chunk: &TraceChunk, payload: &TracerPayload) -> Self {
        let mut attributes = vec![KeyValue::string(semconv::SERVICE_NAME, &span.service)];
        if let Some(version) = resolve_service_version(span, chunk, payload) {
            attributes.push(KeyValue::string(semconv::SERVICE_VERSION, version));
        }
        ResourceGroup {
            resource: Resource {
                attributes,
                dropped_attributes_count: 0,
            },
            scopes: IndexMap::new(),
        }
    }

    fn into_resource_spans(self) -> ResourceSpans {
        ResourceSpans {
            resource: Some(self.resource),
            scope_spans: self.scopes.into_values().collect(),
            schema_url: semconv::SCHEMA_URL.to_owned(),
        }
    }
}

/// Resolution order for the resource-level service version: span tag, chunk
/// tag, payload tag, payload app version. First non-empty wins.
fn resolve_service_version<'a>(
    span: &'a DatadogSpan,
    chunk: &'a TraceChunk,
    payload: &'a TracerPayload,
) -> Option<&'a str> {
    [
        span.meta.get("version").map(String::as_str),
        chunk.tags.get("version").map(String::as_str),
        payload.tags.get("version").map(String::as_str),
        Some(payload.app_version.as_str()),
    ]
    .into_iter()
    .flatten()
    .find(|version| !version.is_empty())
}

fn translate_span(span: &DatadogSpan, chunk: &TraceChunk, payload: &TracerPayload) -> Span {
    Span {
        trace_id: trace_id_bytes(0, span.trace_id),
        span_id: span_id_bytes(span.span_id),
        parent_span_id: span_id_bytes(span.parent_id),
        name: span.resource.clone(),
        kind: span_kind(span) as i32,
        start_time_unix_nano: span.start as u64,
        end_time_unix_nano: span.start.saturating_add(span.duration) as u64,
        attributes: translate_attributes(span, chunk, payload),
        dropped_attributes_count: 0,
        status: Some(Status {
            message: String::new(),
            code: status_code(span) as i32,
        }),
    }
}

fn span_kind(span: &DatadogSpan) -> SpanKind {
    // Direct string match only; an absent or unrecognized value stays
    // unspecified rather than being guessed from the span type.
    match span.meta.get("span.kind").map(String::as_str) {
        Some("server") => SpanKind::Server,
        Some("client") => SpanKind::Client,
        Some("producer") => SpanKind::Producer,
        Some("consumer") => SpanKind::Consumer,
        Some("internal") => SpanKind::Internal,
        _ => SpanKind::Unspecified,
    }
}

fn status_code(span: &DatadogSpan) -> StatusCode {
    if span.error > 0 {
        StatusCode::Error
    } else {
        StatusCode::Ok
    }
}

/// Builds the span attributes with first-assignment-wins precedence: span
/// tags, then chunk tags, then payload tags, then payload-level fallbacks.
fn translate_attributes(
    span: &DatadogSpan,
    chunk: &TraceChunk,
    payload: &TracerPayload,
) -> Vec<KeyValue> {
    let mut attributes: IndexMap<String, String> = IndexMap::new();

    for (key, value) in &span.meta {
        put_translated(&mut attributes, key, value);
    }
    for (key, value) in &chunk.tags {
        put_translated(&mut attributes, key, value);
    }
    for (key, value) in &payload.tags {
        put_translated(&mut attributes, key, value);
    }

    put_fallback(
        &mut attributes,
        semconv::DEPLOYMENT_ENVIRONMENT,
        &payload.env,
    );
    put_fallback(&mut attributes, semconv::CONTAINER_ID, &payload.container_id);
    put_fallback(&mut attributes, semconv::HOST_NAME, &payload.hostname);
    put_fallback(&mut attributes, semconv::SERVICE_VERSION, &payload.app_version);

    attributes
        .into_iter()
        .map(|(key, value)| KeyValue::string(key, value))
        .collect()
}

fn put_translated(attributes: &mut IndexMap<String, String>, key: &str, value: &str) {
    if let Some(translated) = translate_span_key(key) {
        if !attributes.contains_key(translated) {
            attributes.insert(translated.to_owned(), value.to_owned());
        }
    }
}

fn put_fallback(attributes: &mut IndexMap<String, String>, key: &str, value: &str) {
    if !value.is_empty() && !attributes.contains_key(key) {
        attributes.insert(key.to_owned(), value.to_owned());
    }
}

fn trace_id_bytes(high: u64, low: u64) -> Vec<u8> {
    let mut trace_id = [0u8; 16];
    trace_id[..8].copy_from_slice(&high.to_be_bytes());
    trace_id[8..].copy_from_slice(&low.to_be_bytes());
    trace_id.to_vec()
}

fn span_id_bytes(id: u64) -> Vec<u8> {
    id.to_be_bytes().to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn span_for_service(service: &str, trace_id: u64, span_id: u64) -> DatadogSpan {
        DatadogSpan {
            service: service.to_owned(),
            name: "op".to_owned(),
            resource: "res".to_owned(),
            trace_id,
            span_id,
            start: 1000,
            duration: 500,
            ..Default::default()
        }
    }

    fn payload_with_spans(spans: Vec<DatadogSpan>) -> TracerPayload {
        TracerPayload {
            language_name: "nodejs".to_owned(),
            language_version: "v19.7.0".to_owned(),
            tracer_version: "4.0.0".to_owned(),
            chunks: vec![TraceChunk {
                spans,
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    fn attribute<'a>(attributes: &'a [KeyValue], key: &str) -> Option<&'a str> {
        attributes
            .iter()
            .find(|kv| kv.key == key)
            .and_then(|kv| kv.value.as_ref())
            .and_then(|v| v.as_str())
    }

    #[test]
    fn empty_payload_translates_to_empty_traces() {
        let (traces, count) = translate_traces(&TracerPayload::default());
        assert!(traces.resource_spans.is_empty());
        assert_eq!(count, 0);
    }

    #[test]
    fn spans_of_one_service_share_a_resource_group() {
        let payload = TracerPayload {
            language_name: "go".to_owned(),
            tracer_version: "1.60.0".to_owned(),
            chunks: vec![
                TraceChunk {
                    spans: vec![
                        span_for_service("svc", 1, 1),
                        span_for_service("svc", 2, 2),
                    ],
                    ..Default::default()
                },
                TraceChunk {
                    spans: vec![span_for_service("svc", 3, 3)],
                    ..Default::default()
                },
            ],
            ..Default::default()
        };

        let (traces, count) = translate_traces(&payload);
        assert_eq!(count, 3);
        assert_eq!(traces.resource_spans.len(), 1);
        assert_eq!(traces.span_count(), 3);
        let resource = traces.resource_spans[0].resource.as_ref().unwrap();
        assert_eq!(
            attribute(&resource.attributes, semconv::SERVICE_NAME),
            Some("svc")
        );
    }

    #[test]
    fn distinct_services_get_distinct_groups_in_first_seen_order() {
        let payload = payload_with_spans(vec![
            span_for_service("backend", 1, 1),
            span_for_service("db", 1, 2),
            span_for_service("backend", 1, 3),
        ]);

        let (traces, count) = translate_traces(&payload);
        assert_eq!(count, 3);
        assert_eq!(traces.resource_spans.len(), 2);
        let services: Vec<_> = traces
            .resource_spans
            .iter()
            .map(|rs| {
                attribute(
                    &rs.resource.as_ref().unwrap().attributes,
                    semconv::SERVICE_NAME,
                )
                .unwrap()
                .to_owned()
            })
            .collect();
        assert_eq!(services, vec!["backend", "db"]);
    }

    #[test]
    fn scope_is_derived_from_language_and_tracer_version() {
        let payload = payload_with_spans(vec![span_for_service("svc", 1, 1)]);

        let (traces, _) = translate_traces(&payload);
        let scope = traces.resource_spans[0].scope_spans[0]
            .scope
            .as_ref()
            .unwrap();
        assert_eq!(scope.name, "datadog-nodejs");
        assert_eq!(scope.version, "4.0.0");
    }

    #[test]
    fn ids_and_timestamps_are_derived() {
        let payload = payload_with_spans(vec![DatadogSpan {
            service: "svc".to_owned(),
            resource: "GET /users".to_owned(),
            trace_id: 42,
            span_id: 7,
            parent_id: 3,
            start: 1000,
            duration: 500,
            ..Default::default()
        }]);

        let (traces, _) = translate_traces(&payload);
        let span = &traces.resource_spans[0].scope_spans[0].spans[0];

        let mut expected_trace_id = vec![0u8; 8];
        expected_trace_id.extend_from_slice(&42u64.to_be_bytes());
        assert_eq!(span.trace_id, expected_trace_id);
        assert_eq!(span.span_id, 7u64.to_be_bytes().to_vec());
        assert_eq!(span.parent_span_id, 3u64.to_be_bytes().to_vec());
        assert_eq!(span.name, "GET /users");
        assert_eq!(span.start_time_unix_nano, 1000);
        assert_eq!(span.end_time_unix_nano, 1500);
    }

    #[test]
    fn span_kind_comes_from_the_span_kind_tag() {
        let cases = [
            ("server", SpanKind::Server),
            ("client", SpanKind::Client),
            ("producer", SpanKind::Producer),
            ("consumer", SpanKind::Consumer),
            ("internal", SpanKind::Internal),
            ("something-else", SpanKind::Unspecified),
        ];
        for (value, expected) in cases {
            let mut span = span_for_service("svc", 1, 1);
            span.meta
                .insert("span.kind".to_owned(), value.to_owned());
            let (traces, _) = translate_traces(&payload_with_spans(vec![span]));
            let translated = &traces.resource_spans[0].scope_spans[0].spans[0];
            assert_eq!(translated.kind, expected as i32, "span.kind = {value}");
        }

        // Absent tag maps to unspecified.
        let (traces, _) =
            translate_traces(&payload_with_spans(vec![span_for_service("svc", 1, 1)]));
        assert_eq!(
            traces.resource_spans[0].scope_spans[0].spans[0].kind,
            SpanKind::Unspecified as i32
        );
    }

    #[test]
    fn status_comes_from_the_error_flag() {
        let mut errored = span_for_service("svc", 1, 1);
        errored.error = 1;
        let ok = span_for_service("svc", 1, 2);

        let (traces, _) = translate_traces(&payload_with_spans(vec![errored, ok]));
        let spans = &traces.resource_spans[0].scope_spans[0].spans;
        assert_eq!(
            spans[0].status.as_ref().unwrap().code,
            StatusCode::Error as i32
        );
        assert_eq!(spans[1].status.as_ref().unwrap().code, StatusCode::Ok as i32);
    }

    #[test]
    fn span_tags_win_over_payload_tags() {
        let mut span = span_for_service("svc", 1, 1);
        span.meta.insert("env".to_owned(), "prod".to_owned());
        let mut payload = payload_with_spans(vec![span]);
        payload.tags =
            HashMap::from([("env".to_owned(), "staging".to_owned())]);

        let (traces, _) = translate_traces(&payload);
        let span = &traces.resource_spans[0].scope_spans[0].spans[0];
        assert_eq!(
            attribute(&span.attributes, semconv::DEPLOYMENT_ENVIRONMENT),
            Some("prod")
        );
    }

    #[test]
    fn chunk_tags_win_over_payload_tags() {
        let mut payload = payload_with_spans(vec![span_for_service("svc", 1, 1)]);
        payload.chunks[0].tags = HashMap::from([("env".to_owned(), "canary".to_owned())]);
        payload.tags = HashMap::from([("env".to_owned(), "staging".to_owned())]);

        let (traces, _) = translate_traces(&payload);
        let span = &traces.resource_spans[0].scope_spans[0].spans[0];
        assert_eq!(
            attribute(&span.attributes, semconv::DEPLOYMENT_ENVIRONMENT),
            Some("canary")
        );
    }

    #[test]
    fn reserved_tags_never_reach_the_output() {
        let mut span = span_for_service("svc", 1, 1);
        span.meta
            .insert("_dd.origin".to_owned(), "lambda".to_owned());
        span.meta
            .insert("_dd.sampling_rate".to_owned(), "1".to_owned());

        let (traces, _) = translate_traces(&payload_with_spans(vec![span]));
        let span = &traces.resource_spans[0].scope_spans[0].spans[0];
        assert!(span
            .attributes
            .iter()
            .all(|kv| !kv.key.starts_with("_dd.") && kv.key != "lambda"));
        assert_eq!(attribute(&span.attributes, "_dd.origin"), None);
    }

    #[test]
    fn payload_fallbacks_fill_unset_attributes() {
        let mut payload = payload_with_spans(vec![span_for_service("svc", 1, 1)]);
        payload.env = "prod".to_owned();
        payload.container_id = "abc123".to_owned();
        payload.hostname = "host-1".to_owned();
        payload.app_version = "2.0.0".to_owned();

        let (traces, _) = translate_traces(&payload);
        let span = &traces.resource_spans[0].scope_spans[0].spans[0];
        assert_eq!(
            attribute(&span.attributes, semconv::DEPLOYMENT_ENVIRONMENT),
            Some("prod")
        );
        assert_eq!(
            attribute(&span.attributes, semconv::CONTAINER_ID),
            Some("abc123")
        );
        assert_eq!(attribute(&span.attributes, semconv::HOST_NAME), Some("host-1"));
        assert_eq!(
            attribute(&span.attributes, semconv::SERVICE_VERSION),
            Some("2.0.0")
        );
    }

    #[test]
    fn payload_fallbacks_do_not_overwrite_span_tags() {
        let mut span = span_for_service("svc", 1, 1);
        span.meta.insert("env".to_owned(), "prod".to_owned());
        let mut payload = payload_with_spans(vec![span]);
        payload.env = "staging".to_owned();

        let (traces, _) = translate_traces(&payload);
        let span = &traces.resource_spans[0].scope_spans[0].spans[0];
        assert_eq!(
            attribute(&span.attributes, semconv::DEPLOYMENT_ENVIRONMENT),
            Some("prod")
        );
    }

    #[test]
    fn empty_payload_fallbacks_are_skipped() {
        let (traces, _) =
            translate_traces(&payload_with_spans(vec![span_for_service("svc", 1, 1)]));
        let span = &traces.resource_spans[0].scope_spans[0].spans[0];
        assert_eq!(attribute(&span.attributes, semconv::DEPLOYMENT_ENVIRONMENT), None);
        assert_eq!(attribute(&span.attributes, semconv::CONTAINER_ID), None);
        assert_eq!(attribute(&span.attributes, semconv::HOST_NAME), None);
    }

    #[test]
    fn resource_version_resolution_order() {
        // Span-level version wins over everything.
        let mut span = span_for_service("svc", 1, 1);
        span.meta.insert("version".to_owned(), "from-span".to_owned());
        let mut payload = payload_with_spans(vec![span]);
        payload.chunks[0].tags = HashMap::from([("version".to_owned(), "from-chunk".to_owned())]);
        payload.tags = HashMap::from([("version".to_owned(), "from-payload".to_owned())]);
        payload.app_version = "from-app".to_owned();

        let (traces, _) = translate_traces(&payload);
        let resource = traces.resource_spans[0].resource.as_ref().unwrap();
        assert_eq!(
            attribute(&resource.attributes, semconv::SERVICE_VERSION),
            Some("from-span")
        );

        // With no tags anywhere, the payload app version is used.
        let mut payload = payload_with_spans(vec![span_for_service("svc", 1, 1)]);
        payload.app_version = "from-app".to_owned();
        let (traces, _) = translate_traces(&payload);
        let resource = traces.resource_spans[0].resource.as_ref().unwrap();
        assert_eq!(
            attribute(&resource.attributes, semconv::SERVICE_VERSION),
            Some("from-app")
        );
    }

    #[test]
    fn unknown_tags_pass_through_to_attributes() {
        let mut span = span_for_service("svc", 1, 1);
        span.meta
            .insert("http.method".to_owned(), "GET".to_owned());

        let (traces, _) = translate_traces(&payload_with_spans(vec![span]));
        let span = &traces.resource_spans[0].scope_spans[0].spans[0];
        assert_eq!(attribute(&span.attributes, "http.method"), Some("GET"));
    }
}
