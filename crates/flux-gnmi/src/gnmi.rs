//! gNMI 协议子集
//!
//! 只包含 dial-out 采集需要的消息：路径、TypedValue、订阅请求与订阅响应。
//! 字段编号与上游 `gnmi.proto` 保持一致，保证与设备侧的编码兼容。

use std::collections::HashMap;

/// 数据编码方式（旧版 `Value` 使用）
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum Encoding {
    Json = 0,
    Bytes = 1,
    Proto = 2,
    Ascii = 3,
    JsonIetf = 4,
}

/// 订阅模式
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum SubscriptionMode {
    TargetDefined = 0,
    OnChange = 1,
    Sample = 2,
}

/// 数据路径
///
/// `element` 是 v0.3 及更早的扁平编码，`elem` 是 v0.4 之后带键的编码，
/// 同一个路径只会填充其中一种。
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Path {
    #[prost(string, repeated, tag = "1")]
    pub element: Vec<String>,
    #[prost(string, tag = "2")]
    pub origin: String,
    #[prost(message, repeated, tag = "3")]
    pub elem: Vec<PathElem>,
    #[prost(string, tag = "4")]
    pub target: String,
}

impl Path {
    /// 使用 v0.4 编码构造路径
    pub fn from_elems(elem: Vec<PathElem>) -> Self {
        Self {
            elem,
            ..Default::default()
        }
    }

    /// 使用 v0.3 扁平编码构造路径
    pub fn from_elements<I, S>(element: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            element: element.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }
}

/// 路径元素（名称 + 无序键集合）
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PathElem {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(map = "string, string", tag = "2")]
    pub key: HashMap<String, String>,
}

impl PathElem {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            key: HashMap::new(),
        }
    }

    pub fn with_key(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.key.insert(key.into(), value.into());
        self
    }
}

/// 旧版带编码标记的值
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Value {
    #[prost(bytes = "vec", tag = "1")]
    pub value: Vec<u8>,
    #[prost(enumeration = "Encoding", tag = "2")]
    pub r#type: i32,
}

/// 定点小数：`digits / 10^precision`
#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct Decimal64 {
    #[prost(int64, tag = "1")]
    pub digits: i64,
    #[prost(uint32, tag = "2")]
    pub precision: u32,
}

/// leaf-list 值
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ScalarArray {
    #[prost(message, repeated, tag = "1")]
    pub element: Vec<TypedValue>,
}

/// 带类型的值，`value` 中恰好填充一个分支
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TypedValue {
    #[prost(
        oneof = "typed_value::Value",
        tags = "1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14"
    )]
    pub value: Option<typed_value::Value>,
}

pub mod typed_value {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Value {
        #[prost(string, tag = "1")]
        StringVal(String),
        #[prost(int64, tag = "2")]
        IntVal(i64),
        #[prost(uint64, tag = "3")]
        UintVal(u64),
        #[prost(bool, tag = "4")]
        BoolVal(bool),
        #[prost(bytes = "vec", tag = "5")]
        BytesVal(Vec<u8>),
        #[prost(float, tag = "6")]
        FloatVal(f32),
        #[prost(message, tag = "7")]
        DecimalVal(super::Decimal64),
        #[prost(message, tag = "8")]
        LeaflistVal(super::ScalarArray),
        #[prost(message, tag = "9")]
        AnyVal(::prost_types::Any),
        #[prost(bytes = "vec", tag = "10")]
        JsonVal(Vec<u8>),
        #[prost(bytes = "vec", tag = "11")]
        JsonIetfVal(Vec<u8>),
        #[prost(string, tag = "12")]
        AsciiVal(String),
        #[prost(bytes = "vec", tag = "13")]
        ProtoBytes(Vec<u8>),
        #[prost(double, tag = "14")]
        DoubleVal(f64),
    }
}

impl TypedValue {
    pub fn new(value: typed_value::Value) -> Self {
        Self { value: Some(value) }
    }
}

/// 单个叶子更新
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Update {
    #[prost(message, optional, tag = "1")]
    pub path: Option<Path>,
    /// 已废弃的旧版值，设备仍可能发送
    #[prost(message, optional, tag = "2")]
    pub value: Option<Value>,
    #[prost(message, optional, tag = "3")]
    pub val: Option<TypedValue>,
    #[prost(uint32, tag = "4")]
    pub duplicates: u32,
}

/// 一次通知：时间戳（纳秒）+ 前缀 + 更新列表
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Notification {
    #[prost(int64, tag = "1")]
    pub timestamp: i64,
    #[prost(message, optional, tag = "2")]
    pub prefix: Option<Path>,
    #[prost(message, repeated, tag = "4")]
    pub update: Vec<Update>,
    #[prost(message, repeated, tag = "5")]
    pub delete: Vec<Path>,
    #[prost(bool, tag = "6")]
    pub atomic: bool,
}

/// 设备上报的错误
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Error {
    #[prost(uint32, tag = "1")]
    pub code: u32,
    #[prost(string, tag = "2")]
    pub message: String,
    #[prost(message, optional, tag = "3")]
    pub data: Option<::prost_types::Any>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Subscription {
    #[prost(message, optional, tag = "1")]
    pub path: Option<Path>,
    #[prost(enumeration = "SubscriptionMode", tag = "2")]
    pub mode: i32,
    /// 采样周期
    #[prost(uint64, tag = "3")]
    pub sample_interval: u64,
    #[prost(bool, tag = "4")]
    pub suppress_redundant: bool,
    #[prost(uint64, tag = "5")]
    pub heartbeat_interval: u64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SubscriptionList {
    #[prost(message, optional, tag = "1")]
    pub prefix: Option<Path>,
    #[prost(message, repeated, tag = "2")]
    pub subscription: Vec<Subscription>,
    #[prost(enumeration = "subscription_list::Mode", tag = "5")]
    pub mode: i32,
    #[prost(enumeration = "Encoding", tag = "8")]
    pub encoding: i32,
    #[prost(bool, tag = "9")]
    pub updates_only: bool,
}

pub mod subscription_list {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
    #[repr(i32)]
    pub enum Mode {
        Stream = 0,
        Once = 1,
        Poll = 2,
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SubscribeRequest {
    #[prost(oneof = "subscribe_request::Request", tags = "1")]
    pub request: Option<subscribe_request::Request>,
}

pub mod subscribe_request {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Request {
        #[prost(message, tag = "1")]
        Subscribe(super::SubscriptionList),
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SubscribeResponse {
    #[prost(oneof = "subscribe_response::Response", tags = "1, 3, 4")]
    pub response: Option<subscribe_response::Response>,
}

pub mod subscribe_response {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Response {
        #[prost(message, tag = "1")]
        Update(super::Notification),
        #[prost(bool, tag = "3")]
        SyncResponse(bool),
        #[prost(message, tag = "4")]
        Error(super::Error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prost::Message;

    #[test]
    fn test_path_elem_builder() {
        let elem = PathElem::new("interface").with_key("name", "eth0");
        assert_eq!(elem.name, "interface");
        assert_eq!(elem.key.get("name"), Some(&"eth0".to_string()));
    }

    #[test]
    fn test_leaflist_survives_wire_encoding() {
        let value = TypedValue::new(typed_value::Value::LeaflistVal(ScalarArray {
            element: vec![
                TypedValue::new(typed_value::Value::StringVal("a".to_string())),
                TypedValue::new(typed_value::Value::IntVal(-7)),
            ],
        }));

        let bytes = value.encode_to_vec();
        let decoded = TypedValue::decode(bytes.as_slice()).unwrap();
        assert_eq!(decoded, value);
    }

    #[test]
    fn test_empty_typed_value_has_no_variant() {
        let decoded = TypedValue::decode(&[][..]).unwrap();
        assert!(decoded.value.is_none());
    }
}
