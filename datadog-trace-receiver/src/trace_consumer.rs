// Copyright 2024-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use datadog_otlp_protobuf::trace::TracesData;
use tracing::info;

/// Sink for translated traces. The receiver hands every successfully decoded
/// and translated request to exactly one consumer; a consumer error turns
/// into a 500 for that request.
#[async_trait]
pub trait TraceConsumer {
    async fn consume_traces(&self, traces: TracesData) -> anyhow::Result<()>;
}

/// Consumer that only logs what it receives. Useful as a default sink and
/// for smoke-testing tracer setups.
#[derive(Clone, Default)]
pub struct LoggingTraceConsumer {}

#[async_trait]
impl TraceConsumer for LoggingTraceConsumer {
    async fn consume_traces(&self, traces: TracesData) -> anyhow::Result<()> {
        info!(
            "Received {} spans across {} resources",
            traces.span_count(),
            traces.resource_spans.len()
        );
        Ok(())
    }
}
