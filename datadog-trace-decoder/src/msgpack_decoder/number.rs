// Copyright 2024-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use super::error::DecodeError;
use rmp::{decode::RmpRead, Marker};

/// A msgpack number read off the wire before it is narrowed to the field
/// type it belongs to.
pub enum Number {
    Unsigned(u64),
    Signed(i64),
    Float(f64),
}

impl TryFrom<Number> for u64 {
    type Error = DecodeError;
    fn try_from(value: Number) -> Result<Self, Self::Error> {
        match value {
            Number::Unsigned(v) => Ok(v),
            Number::Signed(v) => u64::try_from(v)
                .map_err(|_| DecodeError::InvalidConversion(format!("{v} out of range for u64"))),
            Number::Float(_) => Err(DecodeError::InvalidConversion(
                "float encountered where an integer was expected".to_owned(),
            )),
        }
    }
}

impl TryFrom<Number> for u32 {
    type Error = DecodeError;
    fn try_from(value: Number) -> Result<Self, Self::Error> {
        let v: u64 = value.try_into()?;
        u32::try_from(v)
            .map_err(|_| DecodeError::InvalidConversion(format!("{v} out of range for u32")))
    }
}

impl TryFrom<Number> for i64 {
    type Error = DecodeError;
    fn try_from(value: Number) -> Result<Self, Self::Error> {
        match value {
            Number::Unsigned(v) => i64::try_from(v)
                .map_err(|_| DecodeError::InvalidConversion(format!("{v} out of range for i64"))),
            Number::Signed(v) => Ok(v),
            Number::Float(_) => Err(DecodeError::InvalidConversion(
                "float encountered where an integer was expected".to_owned(),
            )),
        }
    }
}

impl TryFrom<Number> for i32 {
    type Error = DecodeError;
    fn try_from(value: Number) -> Result<Self, Self::Error> {
        let v: i64 = value.try_into()?;
        i32::try_from(v)
            .map_err(|_| DecodeError::InvalidConversion(format!("{v} out of range for i32")))
    }
}

impl TryFrom<Number> for f64 {
    type Error = DecodeError;
    fn try_from(value: Number) -> Result<Self, Self::Error> {
        match value {
            Number::Unsigned(v) => Ok(v as f64),
            Number::Signed(v) => Ok(v as f64),
            Number::Float(v) => Ok(v),
        }
    }
}

pub fn read_number(buf: &mut &[u8]) -> Result<Number, DecodeError> {
    match rmp::decode::read_marker(buf)
        .map_err(|_| DecodeError::InvalidFormat("Unable to read marker for number".to_owned()))?
    {
        Marker::FixPos(val) => Ok(Number::Unsigned(val as u64)),
        Marker::FixNeg(val) => Ok(Number::Signed(val as i64)),
        Marker::U8 => Ok(Number::Unsigned(
            buf.read_data_u8().map_err(|_| DecodeError::IoError)? as u64,
        )),
        Marker::U16 => Ok(Number::Unsigned(
            buf.read_data_u16().map_err(|_| DecodeError::IoError)? as u64,
        )),
        Marker::U32 => Ok(Number::Unsigned(
            buf.read_data_u32().map_err(|_| DecodeError::IoError)? as u64,
        )),
        Marker::U64 => Ok(Number::Unsigned(
            buf.read_data_u64().map_err(|_| DecodeError::IoError)?,
        )),
        Marker::I8 => Ok(Number::Signed(
            buf.read_data_i8().map_err(|_| DecodeError::IoError)? as i64,
        )),
        Marker::I16 => Ok(Number::Signed(
            buf.read_data_i16().map_err(|_| DecodeError::IoError)? as i64,
        )),
        Marker::I32 => Ok(Number::Signed(
            buf.read_data_i32().map_err(|_| DecodeError::IoError)? as i64,
        )),
        Marker::I64 => Ok(Number::Signed(
            buf.read_data_i64().map_err(|_| DecodeError::IoError)?,
        )),
        Marker::F32 => Ok(Number::Float(
            buf.read_data_f32().map_err(|_| DecodeError::IoError)? as f64,
        )),
        Marker::F64 => Ok(Number::Float(
            buf.read_data_f64().map_err(|_| DecodeError::IoError)?,
        )),
        marker => Err(DecodeError::InvalidType(format!(
            "Expected a number, got marker {marker:?}"
        ))),
    }
}
