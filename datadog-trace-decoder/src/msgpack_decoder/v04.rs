// Copyright 2024-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Decoder for the v0.4-style msgpack body: an array of traces, each an
//! array of spans, each span a map keyed by field name. Also serves v0.2 and
//! v0.3 msgpack bodies, which share the layout.

use super::error::DecodeError;
use super::number::read_number;
use super::string::{read_string, read_string_ref};
use crate::span::Span;
use std::collections::HashMap;

pub fn from_slice(buf: &mut &[u8]) -> Result<Vec<Vec<Span>>, DecodeError> {
    let trace_count = rmp::decode::read_array_len(buf)
        .map_err(|_| DecodeError::InvalidFormat("Unable to read trace count".to_owned()))?;

    let mut traces: Vec<Vec<Span>> = Vec::with_capacity(trace_count as usize);

    for _ in 0..trace_count {
        let span_count = rmp::decode::read_array_len(buf)
            .map_err(|_| DecodeError::InvalidFormat("Unable to read span count".to_owned()))?;
        let mut trace: Vec<Span> = Vec::with_capacity(span_count as usize);

        for _ in 0..span_count {
            trace.push(decode_span(buf)?);
        }
        traces.push(trace);
    }

    Ok(traces)
}

fn decode_span(buf: &mut &[u8]) -> Result<Span, DecodeError> {
    let mut span = Span::default();

    let field_count = rmp::decode::read_map_len(buf)
        .map_err(|_| DecodeError::InvalidFormat("Unable to read span field count".to_owned()))?;

    for _ in 0..field_count {
        fill_span_field(&mut span, buf)?;
    }
    Ok(span)
}

fn fill_span_field(span: &mut Span, buf: &mut &[u8]) -> Result<(), DecodeError> {
    // The key is matched in place and never retained.
    let key = read_string_ref(buf)?;
    match key {
        "service" => span.service = read_string(buf)?,
        "name" => span.name = read_string(buf)?,
        "resource" => span.resource = read_string(buf)?,
        "trace_id" => span.trace_id = read_number(buf)?.try_into()?,
        "span_id" => span.span_id = read_number(buf)?.try_into()?,
        "parent_id" => span.parent_id = read_number(buf)?.try_into()?,
        "start" => span.start = read_number(buf)?.try_into()?,
        "duration" => span.duration = read_number(buf)?.try_into()?,
        "error" => span.error = read_number(buf)?.try_into()?,
        "meta" => span.meta = read_str_map(buf)?,
        "metrics" => span.metrics = read_metrics(buf)?,
        "type" => span.r#type = read_string(buf)?,
        "meta_struct" => span.meta_struct = read_meta_struct(buf)?,
        // Fields this model does not carry (span links, events) are skipped
        // so payloads from newer tracers still decode.
        _ => skip_value(buf)?,
    }
    Ok(())
}

fn skip_value(buf: &mut &[u8]) -> Result<(), DecodeError> {
    rmpv::decode::read_value_ref(buf)
        .map_err(|e| DecodeError::InvalidFormat(format!("Unable to skip value: {e}")))?;
    Ok(())
}

fn read_str_map(buf: &mut &[u8]) -> Result<HashMap<String, String>, DecodeError> {
    let len = rmp::decode::read_map_len(buf)
        .map_err(|_| DecodeError::InvalidFormat("Unable to read string map length".to_owned()))?;

    let mut map = HashMap::with_capacity(len as usize);
    for _ in 0..len {
        let k = read_string(buf)?;
        let v = read_string(buf)?;
        map.insert(k, v);
    }
    Ok(map)
}

fn read_metrics(buf: &mut &[u8]) -> Result<HashMap<String, f64>, DecodeError> {
    let len = rmp::decode::read_map_len(buf)
        .map_err(|_| DecodeError::InvalidFormat("Unable to read metrics map length".to_owned()))?;

    let mut metrics = HashMap::with_capacity(len as usize);
    for _ in 0..len {
        let k = read_string(buf)?;
        let v = read_number(buf)?.try_into()?;
        metrics.insert(k, v);
    }
    Ok(metrics)
}

fn read_meta_struct(buf: &mut &[u8]) -> Result<HashMap<String, Vec<u8>>, DecodeError> {
    let len = rmp::decode::read_map_len(buf).map_err(|_| {
        DecodeError::InvalidFormat("Unable to read meta_struct map length".to_owned())
    })?;

    let mut meta_struct = HashMap::with_capacity(len as usize);
    for _ in 0..len {
        let k = read_string(buf)?;
        let byte_count = rmp::decode::read_array_len(buf).map_err(|_| {
            DecodeError::InvalidFormat("Unable to read meta_struct value length".to_owned())
        })?;
        let mut v = Vec::with_capacity(byte_count as usize);
        for _ in 0..byte_count {
            let byte: u64 = read_number(buf)?.try_into()?;
            v.push(byte as u8);
        }
        meta_struct.insert(k, v);
    }
    Ok(meta_struct)
}
