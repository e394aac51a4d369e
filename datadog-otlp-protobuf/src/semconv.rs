// Copyright 2024-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! OpenTelemetry semantic convention attribute keys used by the translator.

pub const SCHEMA_URL: &str = "https://opentelemetry.io/schemas/1.6.1";

pub const SERVICE_NAME: &str = "service.name";
pub const SERVICE_VERSION: &str = "service.version";
pub const SERVICE_INSTANCE_ID: &str = "service.instance.id";
pub const DEPLOYMENT_ENVIRONMENT: &str = "deployment.environment";

pub const CONTAINER_ID: &str = "container.id";
pub const CONTAINER_NAME: &str = "container.name";
pub const CONTAINER_IMAGE_NAME: &str = "container.image.name";
pub const CONTAINER_IMAGE_TAG: &str = "container.image.tag";

pub const CLOUD_PROVIDER: &str = "cloud.provider";
pub const CLOUD_REGION: &str = "cloud.region";
pub const CLOUD_AVAILABILITY_ZONE: &str = "cloud.availability_zone";

pub const AWS_ECS_TASK_FAMILY: &str = "aws.ecs.task.family";
pub const AWS_ECS_TASK_ARN: &str = "aws.ecs.task.arn";
pub const AWS_ECS_CLUSTER_ARN: &str = "aws.ecs.cluster.arn";
pub const AWS_ECS_CONTAINER_ARN: &str = "aws.ecs.container.arn";

pub const K8S_CLUSTER_NAME: &str = "k8s.cluster.name";
pub const K8S_CONTAINER_NAME: &str = "k8s.container.name";
pub const K8S_POD_NAME: &str = "k8s.pod.name";

pub const HOST_NAME: &str = "host.name";
pub const HTTP_HOST: &str = "http.host";
pub const NET_PEER_NAME: &str = "net.peer.name";
pub const NET_PEER_PORT: &str = "net.peer.port";

pub const PROCESS_PID: &str = "process.pid";

pub const EXCEPTION_MESSAGE: &str = "exception.message";
pub const EXCEPTION_STACKTRACE: &str = "exception.stacktrace";
pub const EXCEPTION_TYPE: &str = "exception.type";

pub const DB_SYSTEM: &str = "db.system";
pub const DB_NAME: &str = "db.name";
pub const DB_USER: &str = "db.user";
