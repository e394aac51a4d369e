// Copyright 2024-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use super::error::DecodeError;
use rmp::decode;
use rmp::decode::DecodeStringError;

#[inline]
pub fn read_string_ref<'a>(buf: &mut &'a [u8]) -> Result<&'a str, DecodeError> {
    let (value, next) = decode::read_str_from_slice(*buf).map_err(|e| match e {
        DecodeStringError::InvalidMarkerRead(e) => DecodeError::InvalidFormat(e.to_string()),
        DecodeStringError::InvalidDataRead(e) => DecodeError::InvalidConversion(e.to_string()),
        DecodeStringError::TypeMismatch(marker) => {
            DecodeError::InvalidType(format!("Type mismatch at marker {marker:?}"))
        }
        DecodeStringError::InvalidUtf8(_, e) => DecodeError::Utf8Error(e.to_string()),
        _ => DecodeError::IoError,
    })?;
    *buf = next;
    Ok(value)
}

#[inline]
pub fn read_string(buf: &mut &[u8]) -> Result<String, DecodeError> {
    read_string_ref(buf).map(ToOwned::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_string_success() {
        let payload = rmp_serde::to_vec("foobar").unwrap();
        assert_eq!("foobar", read_string(&mut payload.as_ref()).unwrap());
    }

    #[test]
    fn read_string_advances_buffer() {
        let mut payload = rmp_serde::to_vec("a").unwrap();
        payload.extend(rmp_serde::to_vec("b").unwrap());
        let buf = &mut payload.as_ref();
        assert_eq!("a", read_string_ref(buf).unwrap());
        assert_eq!("b", read_string_ref(buf).unwrap());
        assert!(buf.is_empty());
    }

    #[test]
    fn read_string_wrong_marker() {
        let payload = rmp_serde::to_vec(&42u8).unwrap();
        assert!(matches!(
            read_string(&mut payload.as_ref()),
            Err(DecodeError::InvalidType(_))
        ));
    }
}
