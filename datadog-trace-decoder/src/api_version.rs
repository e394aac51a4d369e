// Copyright 2024-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

/// Wire versions of the tracer intake API.
///
/// Each version is served on its own endpoint and owns a distinct body
/// layout. The decoder is a total match over this enum, so adding or
/// removing a version is a compile-time-checked change.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ApiVersion {
    /// JSON flat span array, no chunk grouping. Deprecated.
    V01,
    /// JSON array of traces. Deprecated.
    V02,
    /// JSON or msgpack array of traces.
    V03,
    /// JSON or msgpack array of traces.
    V04,
    /// Msgpack traces with a shared string dictionary.
    V05,
    /// Msgpack-encoded TracerPayload.
    V07,
    /// Version tag not recognized; handled like v0.3/v0.4.
    Unknown,
}

impl ApiVersion {
    /// Maps a request path onto its API version. Returns `None` for paths
    /// that are not trace intake endpoints.
    pub fn from_path(path: &str) -> Option<Self> {
        match path {
            "/v0.1/spans" => Some(ApiVersion::V01),
            "/v0.2/traces" => Some(ApiVersion::V02),
            "/v0.3/traces" => Some(ApiVersion::V03),
            "/v0.4/traces" => Some(ApiVersion::V04),
            "/v0.5/traces" => Some(ApiVersion::V05),
            "/v0.7/traces" => Some(ApiVersion::V07),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ApiVersion::V01 => "v0.1",
            ApiVersion::V02 => "v0.2",
            ApiVersion::V03 => "v0.3",
            ApiVersion::V04 => "v0.4",
            ApiVersion::V05 => "v0.5",
            ApiVersion::V07 => "v0.7",
            ApiVersion::Unknown => "unknown",
        }
    }

    /// Whether msgpack bodies are accepted for this version. The binary
    /// encoding is only supported from v0.3 onwards.
    pub fn accepts_msgpack(&self) -> bool {
        !matches!(self, ApiVersion::V01 | ApiVersion::V02)
    }
}

impl std::fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
