use crate::{
    deserialize::{DecodeError, Deserialize, Deserializer},
    serialize::{cold_err, EncodeError, EncodeErrorKind, Serialize, Serializer},
    ty::PrimitiveKind,
    value::Value,
};

fn int_value<T>(kind: PrimitiveKind, value: &Value) -> Result<T, EncodeError>
where
    T: TryFrom<i64>,
{
    match value {
        Value::Int(int) => match T::try_from(*int) {
            Ok(int) => Ok(int),
            Err(_) => cold_err(EncodeError::new(EncodeErrorKind::OutOfRange {
                ty: kind.keyword(),
                value: int.to_string(),
            })),
        },
        other => cold_err(EncodeError::type_mismatch(kind.keyword(), other)),
    }
}

fn float_value(kind: PrimitiveKind, value: &Value) -> Result<f64, EncodeError> {
    match value {
        Value::Float(float) => Ok(*float),
        Value::Int(int) => Ok(*int as f64),
        other => cold_err(EncodeError::type_mismatch(kind.keyword(), other)),
    }
}

fn f32_value(value: &Value) -> Result<f32, EncodeError> {
    let float = float_value(PrimitiveKind::Float, value)?;
    if float.is_finite() && float.abs() > f64::from(f32::MAX) {
        return cold_err(EncodeError::new(EncodeErrorKind::OutOfRange {
            ty: PrimitiveKind::Float.keyword(),
            value: float.to_string(),
        }));
    }
    Ok(float as f32)
}

impl Serialize for PrimitiveKind {
    fn serialize(&self, value: &Value, serializer: &mut Serializer<'_>) -> Result<(), EncodeError> {
        macro_rules! write_int {
            ($ty:ty) => {{
                let int = int_value::<$ty>(*self, value)?;
                serializer.write_bytes(&int.to_le_bytes());
            }};
        }

        match self {
            PrimitiveKind::Int8 => write_int!(i8),
            PrimitiveKind::Int16 => write_int!(i16),
            PrimitiveKind::Int32 => write_int!(i32),
            PrimitiveKind::UInt8 => write_int!(u8),
            PrimitiveKind::UInt16 => write_int!(u16),
            PrimitiveKind::UInt32 => write_int!(u32),
            PrimitiveKind::Float => serializer.write_bytes(&f32_value(value)?.to_le_bytes()),
            PrimitiveKind::Double => {
                let float = float_value(*self, value)?;
                serializer.write_bytes(&float.to_le_bytes());
            }
            PrimitiveKind::Bool => match value {
                Value::Bool(flag) => serializer.write_byte(u8::from(*flag)),
                other => return cold_err(EncodeError::type_mismatch(self.keyword(), other)),
            },
        }
        Ok(())
    }

    #[inline]
    fn encoded_size(&self, _value: &Value) -> Result<usize, EncodeError> {
        Ok(self.size())
    }
}

impl Deserialize for PrimitiveKind {
    fn deserialize(&self, deserializer: &mut Deserializer<'_>) -> Result<Value, DecodeError> {
        macro_rules! read_int {
            ($ty:ty) => {{
                let bytes = deserializer.read_byte_array::<{ core::mem::size_of::<$ty>() }>()?;
                Value::Int(i64::from(<$ty>::from_le_bytes(bytes)))
            }};
        }

        let value = match self {
            PrimitiveKind::Int8 => read_int!(i8),
            PrimitiveKind::Int16 => read_int!(i16),
            PrimitiveKind::Int32 => read_int!(i32),
            PrimitiveKind::UInt8 => read_int!(u8),
            PrimitiveKind::UInt16 => read_int!(u16),
            PrimitiveKind::UInt32 => read_int!(u32),
            PrimitiveKind::Float => {
                let bytes = deserializer.read_byte_array::<4>()?;
                Value::Float(f64::from(f32::from_le_bytes(bytes)))
            }
            PrimitiveKind::Double => {
                let bytes = deserializer.read_byte_array::<8>()?;
                Value::Float(f64::from_le_bytes(bytes))
            }
            PrimitiveKind::Bool => Value::Bool(deserializer.read_byte()? != 0),
        };
        Ok(value)
    }
}
