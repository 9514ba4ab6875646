
use crate::{
    compile, decode, encode, from_hex, to_hex, DecodeErrorKind, DescriptorsCache, EncodeErrorKind,
    Error, FormatErrorKind, Schema, SyntaxErrorKind, Value,
};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn items() -> Value {
    Value::record([(
        "items",
        Value::list([Value::record([("id", 1)]), Value::record([("id", 2)])]),
    )])
}

#[test]
fn test_items_scenario() {
    init_logger();

    let schema = compile("{ {int32 id;}[] items; }").expect("expected success");
    let bytes = encode(&schema, &items()).expect("expected success");
    assert_eq!(
        bytes,
        [0x02, 0x00, 0x01, 0x00, 0x00, 0x00, 0x02, 0x00, 0x00, 0x00]
    );
    assert_eq!(to_hex(&bytes), "02000100000002000000");
    assert_eq!(decode(&schema, &bytes), Ok(items()));
}

#[test]
fn test_missing_field() {
    let schema: Schema = "{ int32 id; string name; }".parse().expect("expected success");

    let mut output = vec![0xab, 0xcd];
    let err = schema
        .encode_into(&Value::record([("id", 1)]), &mut output)
        .unwrap_err();
    assert_eq!(*err.kind(), EncodeErrorKind::MissingField("name".into()));
    assert_eq!(err.path().to_string(), "name");
    assert_eq!(output, [0xab, 0xcd]);
}

#[test]
fn test_strict_decode() {
    let schema = compile("{ uint8 a; }").expect("expected success");

    let err = schema.decode(&[0x01, 0x02]).unwrap_err();
    assert_eq!(*err.kind(), DecodeErrorKind::TrailingBytes { remaining: 1 });

    let (value, consumed) = schema.decode_prefix(&[0x01, 0x02]).expect("expected success");
    assert_eq!(consumed, 1);
    assert_eq!(value.get("a"), Some(&Value::Int(1)));

    let err = schema.decode(&[]).unwrap_err();
    assert!(matches!(err.kind(), DecodeErrorKind::OutOfBounds { .. }));
    assert_eq!(err.path().to_string(), "a");
}

#[test]
fn test_hex() {
    let bytes = [0x00, 0x7f, 0x80, 0xff, 0x0a];
    assert_eq!(to_hex(&bytes), "007f80ff0a");
    assert_eq!(from_hex("007f80ff0a"), Ok(bytes.to_vec()));
    assert_eq!(from_hex("007F80FF0A"), Ok(bytes.to_vec()));
    assert_eq!(from_hex(""), Ok(Vec::new()));

    let err = from_hex("abc").unwrap_err();
    assert_eq!(err.kind(), FormatErrorKind::OddLength);

    let err = from_hex("0g").unwrap_err();
    assert_eq!(err.kind(), FormatErrorKind::InvalidDigit('g'));
    assert_eq!(err.offset(), 1);
}

#[test]
fn test_dumps_loads() {
    let schema = compile("{ string s; bool f; }").expect("expected success");
    let value = Value::record([("s", Value::from("hi")), ("f", Value::from(true))]);

    let text = schema.dumps(&value).expect("expected success");
    assert_eq!(text, "0200686901");
    assert_eq!(schema.loads(&text), Ok(value));

    assert!(matches!(schema.loads("02006869"), Err(Error::Decode(_))));
    assert!(matches!(schema.loads("0200zz"), Err(Error::Format(_))));
}

#[test]
fn test_error_chain() {
    fn compile_and_load(source: &str, text: &str) -> Result<Value, Error> {
        let schema = compile(source)?;
        let bytes = from_hex(text)?;
        Ok(schema.decode(&bytes)?)
    }

    assert_eq!(
        compile_and_load("{ int16 a; }", "0100"),
        Ok(Value::record([("a", 1)]))
    );

    match compile_and_load("{ int16 a }", "0100") {
        Err(Error::Syntax(err)) => assert!(matches!(
            err.kind(),
            SyntaxErrorKind::UnexpectedCharacter { found: '}', .. }
        )),
        other => panic!("unexpected result {other:?}"),
    }
}

#[test]
fn test_display_recompiles() {
    let source = "{
        string name;
        { uint16 id; { bool on; } flags; }[] skills;
        double[3] position;
        int8 level;
    }";
    let schema = compile(source).expect("expected success");

    let printed = schema.to_string();
    let recompiled = compile(&printed).expect("expected success");
    assert!(recompiled.ty().same_layout(schema.ty()));
    assert_eq!(recompiled.to_string(), printed);
}

#[test]
fn test_descriptor_cache() {
    let a = compile("{ int32 x; string y; }").expect("expected success");
    let b = compile("{ string name; int32 id; }").expect("expected success");
    let c = compile("{ int32 x; }").expect("expected success");

    let mut cache = DescriptorsCache::new();
    let id = cache.id_of(a.root().ty());
    assert_eq!(cache.id_of(b.root().ty()), id);
    assert_ne!(cache.id_of(c.root().ty()), id);
    assert_eq!(cache.descriptor(a.root().ty()).as_str(), a.descriptor());
}

#[test]
fn test_oversized_schemas_rejected() {
    let err = compile("{ double[3000000000000000000] a; }").unwrap_err();
    assert_eq!(*err.kind(), SyntaxErrorKind::SizeOverflow);

    let err = compile("{ {}[4000000000] e; }").unwrap_err();
    assert_eq!(*err.kind(), SyntaxErrorKind::ZeroSizeArray);

    let schema = compile("{ {}[] e; }").expect("expected success");
    let value = Value::record([("e", Value::list([Value::record::<&str, Value, _>([])]))]);
    let bytes = schema.encode(&value).expect("expected success");
    assert_eq!(bytes, [0x01, 0x00]);
    assert_eq!(schema.decode(&bytes), Ok(value));
}

#[cfg(feature = "global-cache")]
#[test]
fn test_global_cache() {
    let a = compile("{ int32 x; string y; }").expect("expected success");
    let b = compile("{ string name; int32 id; }").expect("expected success");

    let da = crate::cached_descriptor(a.root().ty());
    let db = crate::cached_descriptor(b.root().ty());
    assert_eq!(da, db);
    assert_eq!(da.as_str(), "int32_1:string_1");
}

#[test]
fn test_shared_between_threads() {
    let schema = compile("{ uint32 n; string s; }").expect("expected success");

    std::thread::scope(|scope| {
        for n in 0..4u32 {
            let schema = &schema;
            scope.spawn(move || {
                let value = Value::record([("n", Value::from(n)), ("s", Value::from("x"))]);
                let bytes = schema.encode(&value).expect("expected success");
                assert_eq!(schema.decode(&bytes), Ok(value));
            });
        }
    });
}

#[cfg(feature = "serde")]
#[test]
fn test_json_values() {
    let schema = compile("{ string name; uint16[] scores; double ratio; bool ok; }")
        .expect("expected success");

    let value: Value = serde_json::from_str(
        r#"{ "name": "骨精灵", "scores": [1, 2, 3], "ratio": 0.5, "ok": true }"#,
    )
    .expect("expected success");

    let bytes = schema.encode(&value).expect("expected success");
    let decoded = schema.decode(&bytes).expect("expected success");
    assert_eq!(decoded, value);

    let json = serde_json::to_string(&decoded).expect("expected success");
    assert_eq!(
        json,
        r#"{"name":"骨精灵","ok":true,"ratio":0.5,"scores":[1,2,3]}"#
    );
}
