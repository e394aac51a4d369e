// Copyright 2024-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

pub mod api_version;
pub mod buffer_pool;
pub mod decoder;
pub mod msgpack_decoder;
pub mod span;
pub mod tracer_header_tags;
