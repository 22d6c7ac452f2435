use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use flux_gnmi::typed_value::Value as Typed;
use flux_gnmi::{Encoding, ScalarArray, TypedValue, Update};

use super::json::format_json;
use super::number::{format_decimal, format_f32, format_f64};
use crate::error::CodecError;

/// 格式化一次更新中的值
///
/// 设备仍可能填充已废弃的 `value` 字段，存在时优先使用。
pub fn format_update_value(update: &Update, pretty: bool) -> Result<String, CodecError> {
    if let Some(value) = &update.value {
        let text = match Encoding::try_from(value.r#type) {
            Ok(Encoding::Json) | Ok(Encoding::JsonIetf) => format_json(&value.value, pretty),
            Ok(Encoding::Bytes) | Ok(Encoding::Proto) => STANDARD.encode(&value.value),
            Ok(Encoding::Ascii) | Err(_) => String::from_utf8_lossy(&value.value).into_owned(),
        };
        return Ok(text);
    }

    match &update.val {
        Some(val) => format_typed_value(val, pretty),
        None => Err(CodecError::MissingValue),
    }
}

/// 格式化 TypedValue
///
/// 未填充任何分支时返回 `CodecError::MissingValue`，调用方不能吞掉这个错误。
pub fn format_typed_value(value: &TypedValue, pretty: bool) -> Result<String, CodecError> {
    let variant = value.value.as_ref().ok_or(CodecError::MissingValue)?;

    let text = match variant {
        Typed::StringVal(s) => s.clone(),
        Typed::JsonIetfVal(raw) | Typed::JsonVal(raw) => format_json(raw, pretty),
        Typed::IntVal(v) => v.to_string(),
        Typed::UintVal(v) => v.to_string(),
        Typed::BoolVal(v) => v.to_string(),
        Typed::BytesVal(raw) | Typed::ProtoBytes(raw) => STANDARD.encode(raw),
        Typed::DecimalVal(d) => format_decimal(d.digits, d.precision),
        Typed::FloatVal(v) => format_f32(*v),
        Typed::DoubleVal(v) => format_f64(*v),
        Typed::LeaflistVal(list) => format_leaflist(list)?,
        Typed::AsciiVal(s) => s.clone(),
        Typed::AnyVal(any) => format!(
            "type_url:\"{}\" value:\"{}\"",
            any.type_url,
            escape_bytes(&any.value)
        ),
    };
    Ok(text)
}

/// leaf-list 输出为 `[a, b, c]`，元素一律按紧凑模式格式化
pub fn format_leaflist(list: &ScalarArray) -> Result<String, CodecError> {
    let elements = list
        .element
        .iter()
        .map(|elem| format_typed_value(elem, false))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(format!("[{}]", elements.join(", ")))
}

fn escape_bytes(raw: &[u8]) -> String {
    let mut out = String::with_capacity(raw.len());
    for &b in raw {
        match b {
            b'"' => out.push_str("\\\""),
            b'\\' => out.push_str("\\\\"),
            b'\n' => out.push_str("\\n"),
            b'\r' => out.push_str("\\r"),
            b'\t' => out.push_str("\\t"),
            0x20..=0x7e => out.push(b as char),
            _ => out.push_str(&format!("\\{:03o}", b)),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use flux_gnmi::{Decimal64, Value};

    fn typed(v: Typed) -> TypedValue {
        TypedValue::new(v)
    }

    #[test]
    fn test_scalars() {
        assert_eq!(format_typed_value(&typed(Typed::StringVal("up".into())), false).unwrap(), "up");
        assert_eq!(format_typed_value(&typed(Typed::IntVal(-42)), false).unwrap(), "-42");
        assert_eq!(
            format_typed_value(&typed(Typed::UintVal(u64::MAX)), false).unwrap(),
            "18446744073709551615"
        );
        assert_eq!(format_typed_value(&typed(Typed::BoolVal(true)), false).unwrap(), "true");
        assert_eq!(format_typed_value(&typed(Typed::AsciiVal("abc".into())), false).unwrap(), "abc");
        assert_eq!(format_typed_value(&typed(Typed::DoubleVal(2.5)), false).unwrap(), "2.5");
    }

    #[test]
    fn test_bytes_as_base64() {
        assert_eq!(
            format_typed_value(&typed(Typed::BytesVal(b"hello".to_vec())), false).unwrap(),
            "aGVsbG8="
        );
        assert_eq!(
            format_typed_value(&typed(Typed::ProtoBytes(vec![0xff, 0x00])), false).unwrap(),
            "/wA="
        );
    }

    #[test]
    fn test_decimal_variant() {
        let v = typed(Typed::DecimalVal(Decimal64 {
            digits: 12345,
            precision: 2,
        }));
        assert_eq!(format_typed_value(&v, false).unwrap(), "123.45");
    }

    #[test]
    fn test_json_variants_respect_pretty() {
        let raw = br#"{"a":1,"b":2}"#.to_vec();
        let v = typed(Typed::JsonIetfVal(raw.clone()));
        assert_eq!(format_typed_value(&v, false).unwrap(), r#"{"a":1,"b":2}"#);
        assert!(format_typed_value(&v, true).unwrap().contains('\n'));
        assert_eq!(
            format_typed_value(&typed(Typed::JsonVal(raw)), false).unwrap(),
            r#"{"a":1,"b":2}"#
        );
    }

    #[test]
    fn test_leaflist() {
        let list = typed(Typed::LeaflistVal(ScalarArray {
            element: vec![
                typed(Typed::StringVal("a".into())),
                typed(Typed::StringVal("b".into())),
                typed(Typed::StringVal("c".into())),
            ],
        }));
        assert_eq!(format_typed_value(&list, true).unwrap(), "[a, b, c]");
    }

    #[test]
    fn test_leaflist_elements_are_compact() {
        let list = typed(Typed::LeaflistVal(ScalarArray {
            element: vec![typed(Typed::JsonVal(br#"{"x": 1, "y": 2}"#.to_vec()))],
        }));
        assert_eq!(format_typed_value(&list, true).unwrap(), r#"[{"x":1,"y":2}]"#);
    }

    #[test]
    fn test_empty_leaflist() {
        let list = typed(Typed::LeaflistVal(ScalarArray::default()));
        assert_eq!(format_typed_value(&list, false).unwrap(), "[]");
    }

    #[test]
    fn test_any_value() {
        let any = prost_types::Any {
            type_url: "type.googleapis.com/x.Y".to_string(),
            value: vec![b'o', b'k', 1],
        };
        assert_eq!(
            format_typed_value(&typed(Typed::AnyVal(any)), false).unwrap(),
            r#"type_url:"type.googleapis.com/x.Y" value:"ok\001""#
        );
    }

    #[test]
    fn test_missing_variant_is_error() {
        assert!(matches!(
            format_typed_value(&TypedValue::default(), false),
            Err(CodecError::MissingValue)
        ));

        let list = typed(Typed::LeaflistVal(ScalarArray {
            element: vec![TypedValue::default()],
        }));
        assert!(format_typed_value(&list, false).is_err());
    }

    #[test]
    fn test_update_prefers_legacy_value() {
        let update = Update {
            value: Some(Value {
                value: b"raw".to_vec(),
                r#type: Encoding::Bytes as i32,
            }),
            val: Some(typed(Typed::StringVal("ignored".into()))),
            ..Default::default()
        };
        assert_eq!(format_update_value(&update, false).unwrap(), "cmF3");

        let ascii = Update {
            value: Some(Value {
                value: b"text".to_vec(),
                r#type: Encoding::Ascii as i32,
            }),
            ..Default::default()
        };
        assert_eq!(format_update_value(&ascii, false).unwrap(), "text");
    }

    #[test]
    fn test_update_without_value_is_error() {
        assert!(format_update_value(&Update::default(), false).is_err());
    }
}
