// Copyright 2024-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use http_body_util::{BodyExt, Full};
use hyper::body::{Buf, Bytes};
use hyper::service::service_fn;
use hyper::{header, http, HeaderMap, Method, Request, Response, StatusCode};
use tracing::{debug, error};

use crate::config::Config;
use crate::http_utils::{self, log_and_create_http_response};
use crate::trace_consumer::TraceConsumer;
use datadog_otlp_translator::attributes::translate_container_tag_key;
use datadog_otlp_translator::translate_traces;
use datadog_trace_decoder::api_version::ApiVersion;
use datadog_trace_decoder::buffer_pool::BufferPool;
use datadog_trace_decoder::decoder;
use datadog_trace_decoder::span::TracerPayload;
use datadog_trace_decoder::tracer_header_tags::TracerHeaderTags;

const CONTAINER_TAGS_HEADER: &str = "datadog-container-tags";

/// HTTP server accepting Datadog tracer payloads on the versioned trace
/// endpoints and forwarding the translated OpenTelemetry traces to a
/// [`TraceConsumer`].
pub struct TraceReceiver {
    pub config: Arc<Config>,
    pub consumer: Arc<dyn TraceConsumer + Send + Sync>,
    pub buffer_pool: Arc<BufferPool>,
}

impl TraceReceiver {
    pub fn new(config: Arc<Config>, consumer: Arc<dyn TraceConsumer + Send + Sync>) -> Self {
        TraceReceiver {
            config,
            consumer,
            buffer_pool: Arc::new(BufferPool::default()),
        }
    }

    pub async fn start(&self) -> Result<(), Box<dyn std::error::Error>> {
        let addr: SocketAddr = format!("{}:{}", self.config.host, self.config.port).parse()?;
        let listener = tokio::net::TcpListener::bind(&addr).await?;

        debug!("Trace receiver started: listening on {addr}");

        let config = self.config.clone();
        let consumer = self.consumer.clone();
        let buffer_pool = self.buffer_pool.clone();
        let service = service_fn(move |req| {
            let config = config.clone();
            let consumer = consumer.clone();
            let buffer_pool = buffer_pool.clone();
            async move { handle_request(config, consumer, buffer_pool, req).await }
        });

        let server = hyper::server::conn::http1::Builder::new();
        let mut joinset = tokio::task::JoinSet::new();
        loop {
            let conn = tokio::select! {
                con_res = listener.accept() => match con_res {
                    Err(e)
                        if matches!(
                            e.kind(),
                            io::ErrorKind::ConnectionAborted
                                | io::ErrorKind::ConnectionReset
                                | io::ErrorKind::ConnectionRefused
                        ) =>
                    {
                        continue;
                    }
                    Err(e) => {
                        error!("Server error: {e}");
                        return Err(e.into());
                    }
                    Ok((conn, _)) => conn,
                },
                finished = async {
                    match joinset.join_next().await {
                        Some(finished) => finished,
                        None => std::future::pending().await,
                    }
                } => match finished {
                    Err(e) if e.is_panic() => {
                        std::panic::resume_unwind(e.into_panic());
                    },
                    Ok(()) | Err(_) => continue,
                },
            };
            let conn = hyper_util::rt::TokioIo::new(conn);
            let server = server.clone();
            let service = service.clone();
            joinset.spawn(async move {
                if let Err(e) = server.serve_connection(conn, service).await {
                    error!("Connection error: {e}");
                }
            });
        }
    }
}

/// Handles one request end to end: route, content checks, body read, decode,
/// translate, consume.
pub async fn handle_request<B>(
    config: Arc<Config>,
    consumer: Arc<dyn TraceConsumer + Send + Sync>,
    buffer_pool: Arc<BufferPool>,
    req: Request<B>,
) -> http::Result<Response<Full<Bytes>>>
where
    B: hyper::body::Body,
    B::Error: std::fmt::Display,
{
    if !matches!(*req.method(), Method::POST | Method::PUT) {
        return not_found();
    }
    let version = match ApiVersion::from_path(req.uri().path()) {
        Some(version) => version,
        None => return not_found(),
    };

    let (parts, body) = req.into_parts();

    let media_type = decoder::media_type_or_default(
        parts
            .headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok()),
    );
    if media_type == decoder::APPLICATION_MSGPACK && !version.accepts_msgpack() {
        return log_and_create_http_response(
            &format!("Content-Type application/msgpack is not supported by the {version} endpoint"),
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
        );
    }

    if let Some(response) = http_utils::verify_request_content_length(
        &parts.headers,
        config.max_request_content_length,
        "Error processing traces",
    ) {
        return response;
    }

    let header_tags = TracerHeaderTags::from(&parts.headers);

    let mut buffer = buffer_pool.acquire();
    if let Some(response) =
        read_body(body, &mut buffer, config.max_request_content_length).await
    {
        return response;
    }

    let mut payload =
        match decoder::decode_tracer_payload(version, &media_type, &buffer, &header_tags) {
            Ok(payload) => payload,
            Err(err) => {
                return log_and_create_http_response(
                    &format!("Error decoding trace from request body: {err}"),
                    StatusCode::BAD_REQUEST,
                );
            }
        };
    apply_container_tags(&mut payload, &parts.headers);

    let (traces, span_count) = translate_traces(&payload);
    debug!("Translated {span_count} spans received on {version}");

    match consumer.consume_traces(traces).await {
        Ok(()) => Response::builder()
            .status(StatusCode::OK)
            .body(Full::new(Bytes::from_static(b"{}"))),
        Err(err) => log_and_create_http_response(
            &format!("Error consuming traces: {err}"),
            StatusCode::INTERNAL_SERVER_ERROR,
        ),
    }
}

/// Reads the whole request body into the pooled buffer, enforcing the size
/// limit as frames arrive. Returns the response to send on failure.
async fn read_body<B>(
    body: B,
    buffer: &mut Vec<u8>,
    max_content_length: usize,
) -> Option<http::Result<Response<Full<Bytes>>>>
where
    B: hyper::body::Body,
    B::Error: std::fmt::Display,
{
    let mut body = std::pin::pin!(body);
    while let Some(frame) = body.frame().await {
        let frame = match frame {
            Ok(frame) => frame,
            Err(err) => {
                return Some(log_and_create_http_response(
                    &format!("Error reading request body: {err}"),
                    StatusCode::INTERNAL_SERVER_ERROR,
                ));
            }
        };
        if let Ok(mut data) = frame.into_data() {
            if buffer.len() + data.remaining() > max_content_length {
                return Some(log_and_create_http_response(
                    "Error processing traces: Payload too large",
                    StatusCode::PAYLOAD_TOO_LARGE,
                ));
            }
            while data.has_remaining() {
                let chunk = data.chunk();
                buffer.extend_from_slice(chunk);
                let read = chunk.len();
                data.advance(read);
            }
        }
    }
    None
}

/// Merges the comma-separated `key:value` pairs of the container tags
/// header into the payload tags. Keys go through the case-insensitive
/// container table; tags already present on the payload win.
fn apply_container_tags(payload: &mut TracerPayload, headers: &HeaderMap) {
    let Some(raw_tags) = headers
        .get(CONTAINER_TAGS_HEADER)
        .and_then(|v| v.to_str().ok())
    else {
        return;
    };
    for pair in raw_tags.split(',') {
        let Some((key, value)) = pair.split_once(':') else {
            continue;
        };
        let (key, value) = (key.trim(), value.trim());
        if key.is_empty() || value.is_empty() {
            continue;
        }
        if let Some(translated) = translate_container_tag_key(key) {
            payload
                .tags
                .entry(translated.to_owned())
                .or_insert_with(|| value.to_owned());
        }
    }
}

fn not_found() -> http::Result<Response<Full<Bytes>>> {
    Response::builder()
        .status(StatusCode::NOT_FOUND)
        .body(Full::new(Bytes::new()))
}
