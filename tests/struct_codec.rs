use bencodec::{
    Decode, DecodeError, Encode, ErrorKind, RawValue, Value, YesNo, decode_bytes,
    encode_to_bytes,
    hook::{DecodeHook, EncodeHook, HookError},
    record,
};

#[derive(Debug, Default, PartialEq)]
struct Example {
    foo: Vec<i64>,
    bar: i64,
}

record! {
    Example {
        foo,
        bar,
    }
}

#[test]
fn should_encode_struct() {
    let example = Example {
        foo: vec![2, 3],
        bar: 1,
    };
    let encoded = example.to_bencode().expect("example encoding is broken");

    assert_eq!(encoded, b"d3:bari1e3:fooli2ei3eee".to_vec(),)
}

#[test]
fn should_decode_struct() {
    let encoded = b"d3:bari1e3:fooli2ei3eee".to_vec();
    let example = Example::from_bencode(&encoded).expect("example decoding is broken");

    assert_eq!(
        example,
        Example {
            foo: vec![2, 3],
            bar: 1,
        }
    )
}

#[derive(Debug, Default, PartialEq)]
struct Tagged {
    first: String,
    second: String,
    third: String,
    fourth: String,
}

record! {
    Tagged {
        fourth => "D",
        third => "C",
        second => "B",
        first => "A",
    }
}

#[test]
fn tags_replace_field_names() -> Result<(), DecodeError> {
    let tagged = Tagged {
        first: "foo".to_owned(),
        second: "far".to_owned(),
        third: "boo".to_owned(),
        fourth: "bar".to_owned(),
    };
    let encoded = encode_to_bytes(&tagged).expect("tagged encoding is broken");
    assert_eq!(encoded, b"d1:A3:foo1:B3:far1:C3:boo1:D3:bare");

    assert_eq!(Tagged::from_bencode(&encoded)?, tagged);
    Ok(())
}

#[test]
fn tagged_fields_do_not_answer_to_their_names() -> Result<(), DecodeError> {
    let tagged = Tagged::from_bencode(b"d1:A1:x5:first1:ye")?;
    assert_eq!(tagged.first, "x");
    Ok(())
}

#[derive(Debug, Default, PartialEq)]
struct Sparse {
    name: String,
    count: u32,
    items: Vec<u8>,
    extra: Option<Box<Sparse>>,
    enabled: bool,
}

record! {
    Sparse {
        #[omit_empty] name,
        #[omit_empty] count,
        #[omit_empty] items,
        #[omit_empty] extra,
        #[omit_empty] enabled,
    }
}

#[test]
fn empty_fields_are_left_out() {
    let encoded = encode_to_bytes(&Sparse::default()).expect("sparse encoding is broken");
    assert_eq!(encoded, b"de");
}

#[test]
fn nested_records_allocate_on_demand() -> Result<(), DecodeError> {
    let encoded = b"d5:extrad5:counti2e4:name5:innere4:name5:outere";
    let sparse = Sparse::from_bencode(encoded)?;

    let inner = sparse.extra.as_deref().expect("inner record was decoded");
    assert_eq!(inner.name, "inner");
    assert_eq!(inner.count, 2);
    assert_eq!(inner.extra, None);
    assert_eq!(sparse.name, "outer");

    assert_eq!(encode_to_bytes(&sparse).expect("nested encoding is broken"), encoded);
    Ok(())
}

#[test]
fn unknown_keys_are_skipped() -> Result<(), DecodeError> {
    let encoded = b"d3:abcd1:xl1:yi-4eee5:counti9e7:zzzzzzzi0ee";
    let sparse = Sparse::from_bencode(encoded)?;
    assert_eq!(
        sparse,
        Sparse {
            count: 9,
            ..Sparse::default()
        }
    );
    Ok(())
}

#[test]
fn unknown_keys_may_hold_any_integer() -> Result<(), DecodeError> {
    let encoded = b"d4:bigsli18446744073709551615ei-99999999999999999999ee5:counti1e4:sizei18446744073709551615ee";
    let sparse = Sparse::from_bencode(encoded)?;
    assert_eq!(sparse.count, 1);

    let error = Sparse::from_bencode(b"d4:sizei01ee").unwrap_err();
    assert_eq!(error.kind(), ErrorKind::MalformedInput);
    Ok(())
}

#[test]
fn field_names_match_ignoring_case() -> Result<(), DecodeError> {
    let sparse = Sparse::from_bencode(b"d5:COUNTi3e4:Name3:abce")?;
    assert_eq!(sparse.count, 3);
    assert_eq!(sparse.name, "abc");
    Ok(())
}

#[test]
fn mismatched_fields_name_both_shapes() {
    let error = Sparse::from_bencode(b"d5:itemsi3ee").unwrap_err();
    assert_eq!(error.kind(), ErrorKind::TypeMismatch);
    assert_eq!(error.to_string(), "cannot decode integer into list");
}

#[derive(Debug, Default, PartialEq)]
struct Envelope {
    key: String,
    raw: RawValue,
    val: i64,
}

record! {
    Envelope {
        key => "Key",
        raw => "Raw",
        val => "Val",
    }
}

#[test]
fn raw_fields_keep_their_bytes() -> Result<(), DecodeError> {
    let encoded = b"d3:Key5:hello3:Rawldedei5e1:ae3:Vali10ee";
    let envelope = Envelope::from_bencode(encoded)?;

    assert_eq!(envelope.key, "hello");
    assert_eq!(envelope.raw.as_bytes(), b"ldedei5e1:ae");
    assert_eq!(envelope.val, 10);

    assert_eq!(encode_to_bytes(&envelope).expect("envelope encoding is broken"), encoded);

    let mut inner = Value::default();
    envelope.raw.decode_into(&mut inner)?;
    assert_eq!(inner.as_list().map(<[Value]>::len), Some(4));
    Ok(())
}

#[test]
fn raw_values_keep_unsorted_keys() -> Result<(), DecodeError> {
    let raw = RawValue::new(&b"d1:bi1e1:ai2ee"[..])?;
    assert_eq!(raw.as_bytes(), b"d1:bi1e1:ai2ee");
    assert_eq!(encode_to_bytes(&raw).expect("raw encoding is broken"), raw.as_bytes());

    let value = Value::from_bencode(raw.as_bytes())?;
    assert_eq!(
        encode_to_bytes(&value).expect("dynamic encoding is broken"),
        b"d1:ai2e1:bi1ee"
    );
    Ok(())
}

#[derive(Debug, Default, PartialEq)]
struct Minutes(u32);

impl DecodeHook for Minutes {
    fn decode_hook(&mut self, raw: &[u8]) -> Result<(), HookError> {
        let mut text = String::new();
        decode_bytes(raw, &mut text)?;
        let digits = text
            .strip_suffix('m')
            .ok_or_else(|| format!("{text:?} is not a number of minutes"))?;
        self.0 = digits.parse()?;
        Ok(())
    }
}

impl EncodeHook for Minutes {
    fn encode_hook(&self) -> Result<Vec<u8>, HookError> {
        Ok(encode_to_bytes(&format!("{}m", self.0))?)
    }
}

bencodec::hook!(Minutes);

#[derive(Debug, Default, PartialEq)]
struct Schedule {
    interval: Minutes,
    active: YesNo,
    backup: Value,
}

record! {
    Schedule {
        interval,
        active,
        #[omit_empty] backup,
    }
}

#[test]
fn hooks_and_flags_in_records() -> Result<(), DecodeError> {
    let encoded = b"d6:active1:y6:backupl1:ai1ee8:interval3:15me";
    let schedule = Schedule::from_bencode(encoded)?;

    assert_eq!(schedule.interval, Minutes(15));
    assert_eq!(schedule.active, YesNo(true));
    assert_eq!(
        schedule.backup,
        Value::List(vec![Value::from("a"), Value::Integer(1)])
    );
    assert_eq!(encode_to_bytes(&schedule).expect("schedule encoding is broken"), encoded);
    Ok(())
}

#[test]
fn hook_failures_are_reported() {
    let error = Schedule::from_bencode(b"d8:interval5:sixtye").unwrap_err();
    assert_eq!(error.kind(), ErrorKind::CustomHook);
    assert!(error.to_string().contains("is not a number of minutes"));
}

#[derive(Debug, Default, PartialEq)]
struct Account {
    user: String,
    balance: i64,
}

record! {
    Account {
        user,
        #[read_only] balance,
    }
}

#[test]
fn read_only_fields_are_encoded_but_not_decoded() {
    let account = Account {
        user: "ann".to_owned(),
        balance: 10,
    };
    assert_eq!(
        encode_to_bytes(&account).expect("account encoding is broken"),
        b"d7:balancei10e4:user3:anne"
    );

    let mut account = Account::default();
    let error = decode_bytes(b"d7:balancei10e4:user3:anne", &mut account).unwrap_err();
    assert_eq!(error.kind(), ErrorKind::UnwritableField);
}

#[test]
fn decoding_overwrites_previous_state() -> Result<(), DecodeError> {
    let mut example = Example {
        foo: vec![7, 8, 9, 10],
        bar: 5,
    };
    decode_bytes(b"d3:fooli1eee", &mut example)?;
    assert_eq!(
        example,
        Example {
            foo: vec![1],
            bar: 5,
        }
    );
    Ok(())
}

#[test]
fn encoding_is_canonical_after_decoding_unsorted_input() -> Result<(), DecodeError> {
    let example = Example::from_bencode(b"d3:fooli2ee3:bari1ee")?;
    assert_eq!(
        example.to_bencode().expect("example encoding is broken"),
        b"d3:bari1e3:fooli2eee"
    );
    Ok(())
}
