//! UTF-8 string with 2-byte little-endian byte-length prefix.

use crate::{
    deserialize::{cold_err, DecodeError, DecodeErrorKind, Deserializer},
    serialize::{EncodeError, Serializer, LEN_PREFIX_SIZE},
    ty::Type,
    value::Value,
};

fn str_value(value: &Value) -> Result<&str, EncodeError> {
    match value {
        Value::String(string) => Ok(string),
        other => Err(EncodeError::type_mismatch(Type::STRING_KEYWORD, other)),
    }
}

pub(crate) fn serialize(value: &Value, serializer: &mut Serializer<'_>) -> Result<(), EncodeError> {
    let string = str_value(value)?;
    serializer.write_len(string.len())?;
    serializer.write_bytes(string.as_bytes());
    Ok(())
}

pub(crate) fn encoded_size(value: &Value) -> Result<usize, EncodeError> {
    let string = str_value(value)?;
    Ok(LEN_PREFIX_SIZE + string.len())
}

pub(crate) fn deserialize(deserializer: &mut Deserializer<'_>) -> Result<Value, DecodeError> {
    let len = deserializer.read_len()?;
    let start = deserializer.position();
    let bytes = deserializer.read_bytes(len)?;
    match core::str::from_utf8(bytes) {
        Ok(string) => Ok(Value::String(string.to_owned())),
        Err(error) => cold_err(DecodeError::new(
            start + error.valid_up_to(),
            DecodeErrorKind::NonUtf8(error),
        )),
    }
}
