use std::collections::HashSet;

use rand::{
    distributions::{Alphanumeric, DistString},
    rngs::SmallRng,
    Rng, SeedableRng,
};

use crate::{
    deserialize, deserialize_prefix, serialize_to_vec, ArrayField, ArrayLen, ArrayType,
    CompositeBuilder, CompositeFieldBuilder, DecodeErrorKind, Descriptor, DescriptorsCache,
    EncodeErrorKind, Field, Ident, PrimitiveKind, ScalarField, Serialize, SizeBound, Type, Value,
};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn composite(members: &[(&str, Type)]) -> Type {
    let builder: CompositeBuilder = members
        .iter()
        .map(|(name, ty)| (Ident::from(*name), ty.clone()))
        .collect();
    Type::composite(builder.finish())
}

fn int32() -> Type {
    Type::Primitive(PrimitiveKind::Int32)
}

fn encode(ty: &Type, value: &Value) -> Vec<u8> {
    let mut output = Vec::new();
    let size = serialize_to_vec(ty, value, &mut output).expect("expected success");
    assert_eq!(size, output.len());
    assert_eq!(ty.encoded_size(value).expect("expected success"), size);
    output
}

fn test_round_trip(ty: &Type, value: Value, expected: &[u8]) {
    let bytes = encode(ty, &value);
    assert_eq!(bytes, expected);

    if let SizeBound::Exact(size) = ty.size() {
        assert_eq!(size, bytes.len());
    }

    let decoded = deserialize(ty, &bytes).expect("expected success");
    assert_eq!(decoded, value);
}

#[test]
fn test_primitives() {
    init_logger();

    test_round_trip(&PrimitiveKind::Int8.into(), Value::Int(-1), &[0xff]);
    test_round_trip(&PrimitiveKind::UInt8.into(), Value::Int(200), &[200]);
    test_round_trip(&PrimitiveKind::Int16.into(), Value::Int(-2), &[0xfe, 0xff]);
    test_round_trip(&PrimitiveKind::UInt16.into(), Value::Int(0x1234), &[0x34, 0x12]);
    test_round_trip(
        &PrimitiveKind::UInt32.into(),
        Value::Int(0x0102_0304),
        &[0x04, 0x03, 0x02, 0x01],
    );
    test_round_trip(
        &int32(),
        Value::Int(i64::from(i32::MIN)),
        &[0x00, 0x00, 0x00, 0x80],
    );
    test_round_trip(
        &PrimitiveKind::Float.into(),
        Value::Float(1.5),
        &1.5f32.to_le_bytes(),
    );
    test_round_trip(
        &PrimitiveKind::Double.into(),
        Value::Float(-0.25),
        &(-0.25f64).to_le_bytes(),
    );
    test_round_trip(&PrimitiveKind::Bool.into(), Value::Bool(true), &[1]);
    test_round_trip(&PrimitiveKind::Bool.into(), Value::Bool(false), &[0]);
}

#[test]
fn test_float_accepts_integer() {
    let bytes = encode(&PrimitiveKind::Double.into(), &Value::Int(3));
    assert_eq!(bytes, 3.0f64.to_le_bytes());
}

#[test]
fn test_bool_non_zero_is_true() {
    let value = deserialize(&Type::from(PrimitiveKind::Bool), &[0x02]).expect("expected success");
    assert_eq!(value, Value::Bool(true));
}

#[test]
fn test_string_framing() {
    let mut expected = vec![0x09, 0x00];
    expected.extend_from_slice("骨精灵".as_bytes());
    test_round_trip(&Type::String, Value::from("骨精灵"), &expected);

    test_round_trip(&Type::String, Value::from(""), &[0x00, 0x00]);
}

#[test]
fn test_string_errors() {
    let err = deserialize(&Type::String, &[0x05, 0x00, b'a', b'b']).unwrap_err();
    assert_eq!(
        *err.kind(),
        DecodeErrorKind::OutOfBounds {
            needed: 5,
            remaining: 2
        }
    );
    assert_eq!(err.offset(), 2);

    let err = deserialize(&Type::String, &[0x02, 0x00, b'a', 0xff]).unwrap_err();
    assert!(matches!(err.kind(), DecodeErrorKind::NonUtf8(_)));
    assert_eq!(err.offset(), 3);

    let long = "x".repeat(0x1_0000);
    let mut output = Vec::new();
    let err = serialize_to_vec(&Type::String, &Value::from(long), &mut output).unwrap_err();
    assert_eq!(
        *err.kind(),
        EncodeErrorKind::TooLong {
            len: 0x1_0000,
            max: 0xffff
        }
    );
    assert!(output.is_empty());
}

#[test]
fn test_variable_array() {
    let ty = Type::array(PrimitiveKind::Int8.into(), ArrayLen::Variable);
    assert_eq!(ty.size(), SizeBound::Unbounded);
    test_round_trip(
        &ty,
        Value::list([1, 2, 3]),
        &[0x03, 0x00, 0x01, 0x02, 0x03],
    );
    test_round_trip(&ty, Value::List(Vec::new()), &[0x00, 0x00]);

    let err = deserialize(&ty, &[0x03]).unwrap_err();
    assert_eq!(
        *err.kind(),
        DecodeErrorKind::OutOfBounds {
            needed: 2,
            remaining: 1
        }
    );

    let err = deserialize(&ty, &[0x03, 0x00, 0x01]).unwrap_err();
    assert_eq!(err.path().to_string(), "[1]");
}

#[test]
fn test_fixed_array() {
    let ty = Type::array(PrimitiveKind::UInt16.into(), ArrayLen::Fixed(2));
    assert_eq!(ty.size(), SizeBound::Exact(4));
    test_round_trip(&ty, Value::list([1, 2]), &[0x01, 0x00, 0x02, 0x00]);

    let mut output = Vec::new();
    let err = serialize_to_vec(&ty, &Value::list([1, 2, 3]), &mut output).unwrap_err();
    assert_eq!(
        *err.kind(),
        EncodeErrorKind::LengthMismatch {
            expected: 2,
            found: 3
        }
    );
}

#[test]
fn test_coercion_errors() {
    let mut output = vec![0xaa];

    let err = serialize_to_vec(&int32(), &Value::from("1"), &mut output).unwrap_err();
    assert_eq!(
        *err.kind(),
        EncodeErrorKind::TypeMismatch {
            expected: "int32",
            found: "string"
        }
    );

    let err =
        serialize_to_vec(&Type::from(PrimitiveKind::UInt8), &Value::Int(256), &mut output).unwrap_err();
    assert!(matches!(err.kind(), EncodeErrorKind::OutOfRange { ty: "uint8", .. }));

    let err =
        serialize_to_vec(&Type::from(PrimitiveKind::Int8), &Value::Int(-129), &mut output).unwrap_err();
    assert!(matches!(err.kind(), EncodeErrorKind::OutOfRange { ty: "int8", .. }));

    let err = serialize_to_vec(&Type::from(PrimitiveKind::Float), &Value::Float(1e39), &mut output)
        .unwrap_err();
    assert!(matches!(err.kind(), EncodeErrorKind::OutOfRange { ty: "float", .. }));

    let err =
        serialize_to_vec(&Type::from(PrimitiveKind::Bool), &Value::Int(1), &mut output).unwrap_err();
    assert!(matches!(err.kind(), EncodeErrorKind::TypeMismatch { .. }));

    assert_eq!(output, [0xaa]);
}

#[test]
fn test_composite_round_trip() {
    init_logger();

    let skill = composite(&[("id", int32()), ("level", PrimitiveKind::UInt8.into())]);
    let ty = composite(&[
        ("name", Type::String),
        ("skills", Type::array(skill, ArrayLen::Variable)),
        ("alive", PrimitiveKind::Bool.into()),
    ]);

    let value = Value::record([
        ("name", Value::from("kat")),
        (
            "skills",
            Value::list([
                Value::record([("id", 7), ("level", 1)]),
                Value::record([("id", 8), ("level", 2)]),
            ]),
        ),
        ("alive", Value::Bool(true)),
    ]);

    let expected = [
        0x03, 0x00, b'k', b'a', b't', // name
        0x02, 0x00, // skills count
        0x07, 0x00, 0x00, 0x00, 0x01, // skills[0]
        0x08, 0x00, 0x00, 0x00, 0x02, // skills[1]
        0x01, // alive
    ];
    test_round_trip(&ty, value, &expected);
}

#[test]
fn test_composite_errors() {
    let pet = composite(&[("name", Type::String), ("age", PrimitiveKind::UInt8.into())]);
    let ty = composite(&[("id", int32()), ("pet", pet)]);

    let mut output = Vec::new();
    let value = Value::record([
        ("id", Value::from(1)),
        ("pet", Value::record([("age", 3)])),
    ]);
    let err = serialize_to_vec(&ty, &value, &mut output).unwrap_err();
    assert_eq!(err.path().to_string(), "pet.name");
    assert_eq!(err.path().last_field(), Some("name"));
    assert_eq!(*err.kind(), EncodeErrorKind::MissingField("name".into()));
    assert!(output.is_empty());

    let value = Value::record([
        ("id", Value::from(1)),
        ("pet", Value::record([("name", "rex"), ("age", "old")])),
        ("extra", Value::Bool(false)),
    ]);
    let err = serialize_to_vec(&ty, &value, &mut output).unwrap_err();
    assert_eq!(err.path().to_string(), "pet.age");
    assert!(output.is_empty());

    let err = serialize_to_vec(&ty, &Value::from(1), &mut output).unwrap_err();
    assert!(err.path().is_root());
    assert_eq!(err.path().to_string(), "<root>");

    let err = deserialize(&ty, &[0x01, 0x00, 0x00, 0x00, 0x03, 0x00, b'r']).unwrap_err();
    assert_eq!(err.path().to_string(), "pet.name");
}

#[test]
fn test_extra_keys_ignored() {
    init_logger();

    let ty = composite(&[("a", int32())]);
    let value = Value::record([("a", 1), ("b", 2)]);
    assert_eq!(encode(&ty, &value), [0x01, 0x00, 0x00, 0x00]);
}

#[test]
fn test_trailing_bytes() {
    let ty = composite(&[("a", PrimitiveKind::UInt8.into())]);

    let err = deserialize(&ty, &[0x01, 0x02]).unwrap_err();
    assert_eq!(*err.kind(), DecodeErrorKind::TrailingBytes { remaining: 1 });
    assert_eq!(err.offset(), 1);

    let (value, consumed) = deserialize_prefix(&ty, &[0x01, 0x02]).expect("expected success");
    assert_eq!(consumed, 1);
    assert_eq!(value, Value::record([("a", 1)]));
}

#[test]
fn test_descriptor_grouping() {
    let ty = composite(&[("a", int32()), ("b", int32()), ("c", Type::String)]);
    assert_eq!(ty.descriptor(), "int32_2:string_1");

    let composite_ty = ty.as_composite().expect("composite");
    let map = composite_ty.type_map();
    assert_eq!(map, [(&int32(), 2), (&Type::String, 1)]);

    let reordered = composite(&[("s", Type::String), ("x", int32()), ("y", int32())]);
    assert_eq!(reordered.descriptor(), ty.descriptor());
    assert_eq!(reordered, ty);
    assert!(!reordered.same_layout(&ty));
}

#[test]
fn test_nested_descriptor() {
    let inner = composite(&[("id", int32())]);
    let ty = composite(&[("a", inner.clone()), ("b", inner.clone())]);
    assert_eq!(ty.descriptor(), "{int32_1}_2");

    let items = composite(&[("items", Type::array(inner, ArrayLen::Variable))]);
    assert_eq!(items.descriptor(), "{int32_1}[]_1");

    let fixed = Type::array(Type::String, ArrayLen::Fixed(3));
    assert_eq!(fixed.descriptor(), "string[3]");
}

#[test]
fn test_types_as_keys() {
    let mut set = HashSet::new();
    set.insert(composite(&[("a", int32()), ("b", Type::String)]));
    set.insert(composite(&[("x", Type::String), ("y", int32())]));
    set.insert(int32());
    set.insert(PrimitiveKind::Int32.into());
    set.insert(Type::array(int32(), ArrayLen::Fixed(2)));
    set.insert(Type::array(int32(), ArrayLen::Fixed(2)));
    set.insert(Type::array(int32(), ArrayLen::Variable));

    assert_eq!(set.len(), 4);
    assert_ne!(int32(), Type::from(PrimitiveKind::UInt32));
}

#[test]
fn test_sizes() {
    let point = composite(&[("x", PrimitiveKind::Float.into()), ("y", PrimitiveKind::Float.into())]);
    assert_eq!(point.size(), SizeBound::Exact(8));

    let path = Type::array(point.clone(), ArrayLen::Fixed(4));
    assert_eq!(path.size(), SizeBound::Exact(32));

    let named = composite(&[("name", Type::String), ("at", point)]);
    assert_eq!(named.size(), SizeBound::Unbounded);

    let empty = composite(&[]);
    assert_eq!(empty.size(), SizeBound::ZERO);
    assert!(encode(&empty, &Value::record::<&str, Value, _>([])).is_empty());
}

#[test]
fn test_descriptors_cache() {
    init_logger();

    let mut cache = DescriptorsCache::new();
    let a = composite(&[("a", int32()), ("b", Type::String)]);
    let b = composite(&[("x", Type::String), ("y", int32())]);

    assert_eq!(cache.id_of(&a), 0);
    assert_eq!(cache.id_of(&Type::String), 1);
    assert_eq!(cache.id_of(&b), 0);
    assert_eq!(cache.descriptor(&b).as_str(), "int32_1:string_1");
    assert_eq!(cache.len(), 2);
}

#[test]
fn test_field_builder() {
    let mut pet = CompositeFieldBuilder::new();
    pet.add_field(ScalarField::new("name".into(), Type::String).into());
    pet.add_field(
        ArrayField::new(
            "tags".into(),
            ArrayType::new(PrimitiveKind::UInt8.into(), ArrayLen::Fixed(2)),
        )
        .into(),
    );
    assert!(pet.contains("tags"));
    assert!(!pet.contains("age"));

    let mut root = CompositeFieldBuilder::new();
    root.add_field(ScalarField::new("id".into(), int32()).into());
    root.add_field(pet.finish("pet".into()).into());
    let root = root.finish("root".into());

    assert_eq!(root.fields().len(), 2);
    assert_eq!(root.composite_type().len(), 2);
    assert!(root.lookup("pet.name").is_some());
    assert!(root.lookup("pet.age").is_none());
    assert!(root.lookup("id.name").is_none());

    match root.lookup("pet.tags") {
        Some(Field::Array(tags)) => {
            assert_eq!(tags.array_type().len(), ArrayLen::Fixed(2));
            assert_eq!(tags.element_count(&Value::list([1, 2])), Ok(2));
        }
        other => panic!("unexpected field {other:?}"),
    }

    assert_eq!(
        root.to_string(),
        "{\n    int32 id;\n    {\n        string name;\n        uint8[2] tags;\n    } pet;\n}"
    );
}

#[test]
fn test_descriptor_of_composite_type() {
    let inner = composite(&[("id", int32())]);
    let ty = composite(&[("a", int32()), ("b", int32()), ("c", Type::String)]);

    let composite_ty = ty.as_composite().expect("composite");
    assert_eq!(ty.descriptor(), composite_ty.descriptor());
    assert_eq!(Descriptor::new(&ty).as_str(), "int32_2:string_1");
    assert_eq!(inner.descriptor(), "int32_1");

    let mut cache = DescriptorsCache::new();
    assert_eq!(cache.descriptor(&ty).as_str(), composite_ty.descriptor());
    assert_eq!(cache.descriptor(&inner).as_str(), "int32_1");

    let items = Type::array(inner, ArrayLen::Fixed(2));
    assert_eq!(cache.descriptor(&items).as_str(), "{int32_1}[2]");
}

#[cfg(feature = "global-cache")]
#[test]
fn test_cached_descriptor_of_composite_type() {
    let ty = composite(&[("a", int32()), ("b", Type::String)]);
    assert_eq!(crate::cached_descriptor(&ty).as_str(), "int32_1:string_1");
}

#[test]
fn test_size_overflow() {
    assert_eq!(SizeBound::Exact(usize::MAX).checked_add(SizeBound::Exact(1)), None);
    assert_eq!(SizeBound::Exact(2).checked_mul(usize::MAX), None);
    assert_eq!(
        SizeBound::Unbounded.checked_mul(usize::MAX),
        Some(SizeBound::Unbounded)
    );
    assert_eq!(SizeBound::Exact(usize::MAX) + SizeBound::Exact(1), SizeBound::Unbounded);

    let huge = Type::array(PrimitiveKind::Double.into(), ArrayLen::Fixed(3_000_000_000_000_000_000));
    assert_eq!(huge.size(), SizeBound::Unbounded);

    let wide = composite(&[
        ("a", Type::array(PrimitiveKind::UInt8.into(), ArrayLen::Fixed(usize::MAX))),
        ("b", PrimitiveKind::UInt8.into()),
    ]);
    assert_eq!(wide.size(), SizeBound::Unbounded);

    let mut builder = CompositeFieldBuilder::new();
    builder.add_field(ScalarField::new("a".into(), int32()).into());
    builder.add_field(ScalarField::new("b".into(), PrimitiveKind::UInt16.into()).into());
    assert_eq!(builder.size(), SizeBound::Exact(6));
}

fn random_value(ty: &Type, rng: &mut SmallRng) -> Value {
    match ty {
        Type::Primitive(kind) => match kind {
            PrimitiveKind::Int8 => Value::from(rng.gen::<i8>()),
            PrimitiveKind::Int16 => Value::from(rng.gen::<i16>()),
            PrimitiveKind::Int32 => Value::from(rng.gen::<i32>()),
            PrimitiveKind::UInt8 => Value::from(rng.gen::<u8>()),
            PrimitiveKind::UInt16 => Value::from(rng.gen::<u16>()),
            PrimitiveKind::UInt32 => Value::from(rng.gen::<u32>()),
            PrimitiveKind::Float => Value::from(rng.gen::<f32>()),
            PrimitiveKind::Double => Value::from(rng.gen::<f64>()),
            PrimitiveKind::Bool => Value::from(rng.gen::<bool>()),
        },
        Type::String => {
            let len = rng.gen_range(0..24);
            Value::from(Alphanumeric.sample_string(rng, len))
        }
        Type::Array(array) => {
            let len = array.len().fixed().unwrap_or_else(|| rng.gen_range(0..8));
            Value::List((0..len).map(|_| random_value(array.element(), rng)).collect())
        }
        Type::Composite(composite) => Value::Record(
            composite
                .members()
                .iter()
                .map(|member| (member.name.to_string(), random_value(&member.ty, rng)))
                .collect(),
        ),
    }
}

#[test]
fn test_random_round_trip() {
    init_logger();

    let skill = composite(&[
        ("id", PrimitiveKind::UInt16.into()),
        ("power", PrimitiveKind::Float.into()),
    ]);
    let ty = composite(&[
        ("a", PrimitiveKind::Int8.into()),
        ("b", PrimitiveKind::Int16.into()),
        ("c", int32()),
        ("d", PrimitiveKind::UInt8.into()),
        ("e", PrimitiveKind::UInt16.into()),
        ("f", PrimitiveKind::UInt32.into()),
        ("g", PrimitiveKind::Double.into()),
        ("h", PrimitiveKind::Bool.into()),
        ("name", Type::String),
        ("skills", Type::array(skill, ArrayLen::Variable)),
        ("position", Type::array(PrimitiveKind::Double.into(), ArrayLen::Fixed(3))),
        ("tags", Type::array(Type::String, ArrayLen::Variable)),
    ]);

    let mut rng = SmallRng::seed_from_u64(42);
    for _ in 0..200 {
        let value = random_value(&ty, &mut rng);
        let bytes = encode(&ty, &value);

        let (decoded, consumed) = deserialize_prefix(&ty, &bytes).expect("expected success");
        assert_eq!(consumed, bytes.len());
        assert_eq!(decoded, value);
    }
}
