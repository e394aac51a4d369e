// Copyright 2024-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

/// Errors surfaced while decoding a trace intake body. All of them are
/// terminal for the request; there is no partial-payload recovery.
#[derive(Debug, PartialEq)]
pub enum DecodeError {
    InvalidConversion(String),
    InvalidType(String),
    InvalidFormat(String),
    Utf8Error(String),
    IoError,
}

impl std::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DecodeError::InvalidConversion(msg) => write!(f, "Failed to convert value: {msg}"),
            DecodeError::InvalidType(msg) => write!(f, "Invalid type encountered: {msg}"),
            DecodeError::InvalidFormat(msg) => write!(f, "Invalid format: {msg}"),
            DecodeError::Utf8Error(msg) => write!(f, "Failed to read utf8 value: {msg}"),
            DecodeError::IoError => write!(f, "Failed to read from buffer"),
        }
    }
}

impl std::error::Error for DecodeError {}
