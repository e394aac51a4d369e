// Copyright 2024-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

pub mod common;
pub mod resource;
pub mod semconv;
pub mod trace;
