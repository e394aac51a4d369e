// Copyright 2024-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Static mapping of Datadog tag keys onto OpenTelemetry semantic convention
//! names. Pure data, no state.

use datadog_otlp_protobuf::semconv;

/// Tags under this prefix carry internal tracer bookkeeping and are never
/// exported.
const RESERVED_PREFIX: &str = "_dd.";

/// Maps a span-level Datadog tag key to its semantic convention name.
///
/// Returns `None` for reserved internal keys, which must be dropped. Keys
/// without a known mapping pass through unchanged. The lookup is
/// case-sensitive; span tags are emitted lowercase by the tracers.
pub fn translate_span_key(key: &str) -> Option<&str> {
    if key.starts_with(RESERVED_PREFIX) {
        return None;
    }
    let translated = match key {
        "env" => semconv::DEPLOYMENT_ENVIRONMENT,
        "version" => semconv::SERVICE_VERSION,
        "runtime-id" => semconv::SERVICE_INSTANCE_ID,
        "container_id" => semconv::CONTAINER_ID,
        "container_name" => semconv::CONTAINER_NAME,
        "image_name" => semconv::CONTAINER_IMAGE_NAME,
        "image_tag" => semconv::CONTAINER_IMAGE_TAG,
        "process_id" => semconv::PROCESS_PID,
        "system.pid" => semconv::PROCESS_PID,
        "error.msg" => semconv::EXCEPTION_MESSAGE,
        "error.stack" => semconv::EXCEPTION_STACKTRACE,
        "error.type" => semconv::EXCEPTION_TYPE,
        "http.host" => semconv::HTTP_HOST,
        "out.host" => semconv::NET_PEER_NAME,
        "out.port" => semconv::NET_PEER_PORT,
        "db.type" => semconv::DB_SYSTEM,
        "db.instance" => semconv::DB_NAME,
        "db.user" => semconv::DB_USER,
        other => other,
    };
    Some(translated)
}

/// Maps a container tag key (carried on request headers rather than spans)
/// to its semantic convention name. Header-derived keys arrive with
/// arbitrary casing, so this lookup is case-insensitive.
pub fn translate_container_tag_key(key: &str) -> Option<&str> {
    if key.starts_with(RESERVED_PREFIX) {
        return None;
    }
    let translated = match key.to_ascii_lowercase().as_str() {
        "env" => semconv::DEPLOYMENT_ENVIRONMENT,
        "container_id" => semconv::CONTAINER_ID,
        "container_name" => semconv::CONTAINER_NAME,
        "image_name" => semconv::CONTAINER_IMAGE_NAME,
        "image_tag" => semconv::CONTAINER_IMAGE_TAG,
        "cloud_provider" => semconv::CLOUD_PROVIDER,
        "region" => semconv::CLOUD_REGION,
        "zone" => semconv::CLOUD_AVAILABILITY_ZONE,
        "task_family" => semconv::AWS_ECS_TASK_FAMILY,
        "task_arn" => semconv::AWS_ECS_TASK_ARN,
        "ecs_cluster_name" => semconv::AWS_ECS_CLUSTER_ARN,
        "ecs_container_name" => semconv::AWS_ECS_CONTAINER_ARN,
        "kube_cluster_name" => semconv::K8S_CLUSTER_NAME,
        "kube_container_name" => semconv::K8S_CONTAINER_NAME,
        "pod_name" => semconv::K8S_POD_NAME,
        _ => return Some(key),
    };
    Some(translated)
}
