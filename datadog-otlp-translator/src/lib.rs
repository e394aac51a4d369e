// Copyright 2024-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

pub mod attributes;
pub mod translate;

pub use translate::translate_traces;
