// Copyright 2024-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Decoder for the v0.5 msgpack body. The payload is an array of exactly two
//! elements: a dictionary of every distinct string in the payload, and an
//! array of traces whose spans are 12-element positional arrays that carry
//! string fields as indices into the dictionary:
//!
//! ```text
//!  0: service   (index)     6: start     (i64)
//!  1: name      (index)     7: duration  (i64)
//!  2: resource  (index)     8: error     (i32)
//!  3: trace_id  (u64)       9: meta      (map index -> index)
//!  4: span_id   (u64)      10: metrics   (map index -> f64)
//!  5: parent_id (u64)      11: type      (index)
//! ```
//!
//! None of the positions may be absent; unset fields occupy their position
//! with a zero value (the empty string is dictionary index 0 when used).
//! Every index is resolved to its string during decode, so downstream code
//! only ever sees ordinary spans.

use super::error::DecodeError;
use super::number::read_number;
use super::string::read_string;
use crate::span::Span;
use std::collections::HashMap;

const PAYLOAD_ELEMENTS: u32 = 2;
const SPAN_ELEMENTS: u32 = 12;

pub fn from_slice(buf: &mut &[u8]) -> Result<Vec<Vec<Span>>, DecodeError> {
    let element_count = rmp::decode::read_array_len(buf)
        .map_err(|_| DecodeError::InvalidFormat("Unable to read payload length".to_owned()))?;

    if element_count != PAYLOAD_ELEMENTS {
        return Err(DecodeError::InvalidFormat(format!(
            "Dictionary payload must hold exactly {PAYLOAD_ELEMENTS} elements, got {element_count}"
        )));
    }

    let dict = read_dictionary(buf)?;

    let trace_count = rmp::decode::read_array_len(buf)
        .map_err(|_| DecodeError::InvalidFormat("Unable to read trace count".to_owned()))?;

    let mut traces: Vec<Vec<Span>> = Vec::with_capacity(trace_count as usize);

    for _ in 0..trace_count {
        let span_count = rmp::decode::read_array_len(buf)
            .map_err(|_| DecodeError::InvalidFormat("Unable to read span count".to_owned()))?;
        let mut trace: Vec<Span> = Vec::with_capacity(span_count as usize);

        for _ in 0..span_count {
            trace.push(decode_span(buf, &dict)?);
        }
        traces.push(trace);
    }

    Ok(traces)
}

fn read_dictionary(buf: &mut &[u8]) -> Result<Vec<String>, DecodeError> {
    let len = rmp::decode::read_array_len(buf)
        .map_err(|_| DecodeError::InvalidFormat("Unable to read dictionary length".to_owned()))?;

    let mut dict = Vec::with_capacity(len as usize);
    for _ in 0..len {
        dict.push(read_string(buf)?);
    }
    Ok(dict)
}

/// Each position is mandatory; a missing one would desynchronize every
/// subsequent span in the pass, so the element count is checked up front.
fn decode_span(buf: &mut &[u8], dict: &[String]) -> Result<Span, DecodeError> {
    let element_count = rmp::decode::read_array_len(buf)
        .map_err(|_| DecodeError::InvalidFormat("Unable to read span length".to_owned()))?;

    if element_count != SPAN_ELEMENTS {
        return Err(DecodeError::InvalidFormat(format!(
            "Span must hold exactly {SPAN_ELEMENTS} elements, got {element_count}"
        )));
    }

    // Struct fields are evaluated in source order, which matches the wire
    // order of the twelve positions.
    Ok(Span {
        service: read_dict_string(buf, dict)?,
        name: read_dict_string(buf, dict)?,
        resource: read_dict_string(buf, dict)?,
        trace_id: read_number(buf)?.try_into()?,
        span_id: read_number(buf)?.try_into()?,
        parent_id: read_number(buf)?.try_into()?,
        start: read_number(buf)?.try_into()?,
        duration: read_number(buf)?.try_into()?,
        error: read_number(buf)?.try_into()?,
        meta: read_indexed_str_map(buf, dict)?,
        metrics: read_indexed_metrics(buf, dict)?,
        r#type: read_dict_string(buf, dict)?,
        meta_struct: HashMap::new(),
    })
}

fn read_dict_string(buf: &mut &[u8], dict: &[String]) -> Result<String, DecodeError> {
    let index: u32 = read_number(buf)?.try_into()?;
    match dict.get(index as usize) {
        Some(value) => Ok(value.clone()),
        None => Err(DecodeError::InvalidFormat(format!(
            "String index {index} outside of dictionary of size {}",
            dict.len()
        ))),
    }
}

fn read_indexed_str_map(
    buf: &mut &[u8],
    dict: &[String],
) -> Result<HashMap<String, String>, DecodeError> {
    let len = rmp::decode::read_map_len(buf)
        .map_err(|_| DecodeError::InvalidFormat("Unable to read meta map length".to_owned()))?;

    let mut map = HashMap::with_capacity(len as usize);
    for _ in 0..len {
        let k = read_dict_string(buf, dict)?;
        let v = read_dict_string(buf, dict)?;
        map.insert(k, v);
    }
    Ok(map)
}

fn read_indexed_metrics(
    buf: &mut &[u8],
    dict: &[String],
) -> Result<HashMap<String, f64>, DecodeError> {
    let len = rmp::decode::read_map_len(buf)
        .map_err(|_| DecodeError::InvalidFormat("Unable to read metrics map length".to_owned()))?;

    let mut metrics = HashMap::with_capacity(len as usize);
    for _ in 0..len {
        let k = read_dict_string(buf, dict)?;
        let v = read_number(buf)?.try_into()?;
        metrics.insert(k, v);
    }
    Ok(metrics)
}

#[cfg(test)]
mod tests {
    use super::*;

    type RawSpan = (
        u32,
        u32,
        u32,
        u64,
        u64,
        u64,
        i64,
        i64,
        i32,
        HashMap<u32, u32>,
        HashMap<u32, f64>,
        u32,
    );

    fn encode(dict: Vec<&str>, traces: Vec<Vec<RawSpan>>) -> Vec<u8> {
        rmp_serde::to_vec(&(dict, traces)).unwrap()
    }

    #[test]
    fn decode_resolves_dictionary_indices() {
        let payload = encode(
            vec![
                "",
                "my-service",
                "my-name",
                "my-resource",
                "env",
                "prod",
                "cpu",
                "sql",
            ],
            vec![vec![(
                1,
                2,
                3,
                10,
                20,
                30,
                1000,
                500,
                1,
                HashMap::from([(4, 5)]),
                HashMap::from([(6, 1.2)]),
                7,
            )]],
        );

        let traces = from_slice(&mut payload.as_ref()).unwrap();
        let span = &traces[0][0];
        assert_eq!(span.service, "my-service");
        assert_eq!(span.name, "my-name");
        assert_eq!(span.resource, "my-resource");
        assert_eq!(span.trace_id, 10);
        assert_eq!(span.span_id, 20);
        assert_eq!(span.parent_id, 30);
        assert_eq!(span.start, 1000);
        assert_eq!(span.duration, 500);
        assert_eq!(span.error, 1);
        assert_eq!(span.meta.get("env").map(String::as_str), Some("prod"));
        assert_eq!(span.metrics.get("cpu"), Some(&1.2));
        assert_eq!(span.r#type, "sql");
    }

    #[test]
    fn decode_zero_value_span() {
        // A fully unset span references the empty string at index 0.
        let payload = encode(
            vec![""],
            vec![vec![(
                0,
                0,
                0,
                0,
                0,
                0,
                0,
                0,
                0,
                HashMap::new(),
                HashMap::new(),
                0,
            )]],
        );

        let traces = from_slice(&mut payload.as_ref()).unwrap();
        let span = &traces[0][0];
        assert_eq!(span.service, "");
        assert_eq!(span.name, "");
        assert_eq!(span.r#type, "");
        assert_eq!(span.trace_id, 0);
    }

    #[test]
    fn decode_index_out_of_range() {
        let payload = encode(
            vec![""],
            vec![vec![(
                9,
                0,
                0,
                0,
                0,
                0,
                0,
                0,
                0,
                HashMap::new(),
                HashMap::new(),
                0,
            )]],
        );

        assert!(matches!(
            from_slice(&mut payload.as_ref()),
            Err(DecodeError::InvalidFormat(_))
        ));
    }

    #[test]
    fn decode_wrong_payload_arity() {
        let payload = rmp_serde::to_vec(&(vec![""], Vec::<Vec<RawSpan>>::new(), 0u8)).unwrap();
        assert!(matches!(
            from_slice(&mut payload.as_ref()),
            Err(DecodeError::InvalidFormat(_))
        ));
    }

    #[test]
    fn decode_wrong_span_arity() {
        let short_span = (0u32, 0u32, 0u32, 0u64);
        let payload = rmp_serde::to_vec(&(vec![""], vec![vec![short_span]])).unwrap();
        assert!(matches!(
            from_slice(&mut payload.as_ref()),
            Err(DecodeError::InvalidFormat(_))
        ));
    }
}
