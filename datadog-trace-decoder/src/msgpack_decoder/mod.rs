// Copyright 2024-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

pub mod error;
pub mod number;
pub mod string;
pub mod v04;
pub mod v05;
