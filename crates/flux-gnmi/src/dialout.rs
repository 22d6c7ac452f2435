//! Dial-out 遥测服务消息
//!
//! 设备主动连接采集端：先建立会话，再上报能力，最后通过双向流接收订阅并推送数据。

use crate::gnmi::{Path, SubscribeRequest, SubscribeResponse};

/// 设备会话状态
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum DeviceSessionState {
    SessionUnknown = 0,
    SessionInit = 1,
    SessionActive = 2,
    SessionTerminated = 3,
}

/// 设备身份
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DeviceIdentity {
    /// 序列号，作为关联主键
    #[prost(string, tag = "1")]
    pub serial: String,
    #[prost(string, tag = "2")]
    pub software_version: String,
    #[prost(string, tag = "3")]
    pub hostname: String,
    #[prost(string, tag = "4")]
    pub ipv4_address: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DeviceSessionStartRequest {
    #[prost(message, optional, tag = "1")]
    pub device_identity: Option<DeviceIdentity>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DeviceSessionStartResponse {
    #[prost(string, tag = "1")]
    pub session_id: String,
    #[prost(message, optional, tag = "2")]
    pub session_created_time: Option<::prost_types::Timestamp>,
    #[prost(enumeration = "DeviceSessionState", tag = "3")]
    pub device_session_state: i32,
}

/// 一组可订阅路径及设备期望的发布周期
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DeviceCapabilities {
    #[prost(message, repeated, tag = "1")]
    pub device_paths: Vec<Path>,
    #[prost(uint32, tag = "2")]
    pub publish_interval: u32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DiscoverDeviceCapabilityRequest {
    #[prost(string, tag = "1")]
    pub session_id: String,
    #[prost(string, tag = "2")]
    pub serial: String,
    #[prost(message, repeated, tag = "3")]
    pub device_capabilities: Vec<DeviceCapabilities>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DiscoverDeviceCapabilityResponse {
    #[prost(string, tag = "1")]
    pub session_id: String,
    #[prost(string, tag = "2")]
    pub serial: String,
    #[prost(string, tag = "3")]
    pub cloud_request_id: String,
}

/// 设备 -> 采集端
///
/// `device_subscribe_responses` 为空表示请求订阅，否则是数据推送。
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct StreamDeviceChangeNotificationsDeviceMessage {
    #[prost(string, tag = "1")]
    pub session_id: String,
    #[prost(string, tag = "2")]
    pub serial: String,
    #[prost(string, tag = "3")]
    pub cloud_request_id: String,
    #[prost(message, repeated, tag = "4")]
    pub device_subscribe_responses: Vec<SubscribeResponse>,
}

/// 采集端 -> 设备
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct StreamDeviceChangeNotificationsCloudMessage {
    #[prost(string, tag = "1")]
    pub session_id: String,
    #[prost(string, tag = "2")]
    pub serial: String,
    #[prost(string, tag = "3")]
    pub cloud_request_id: String,
    #[prost(message, optional, tag = "4")]
    pub subscribe_request: Option<SubscribeRequest>,
    #[prost(string, tag = "5")]
    pub data_push_url: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DeviceSessionTerminateRequest {
    #[prost(string, tag = "1")]
    pub session_id: String,
    #[prost(string, tag = "2")]
    pub serial: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DeviceSessionTerminateResponse {}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct QueryDeviceSessionStatisticsRequest {
    #[prost(string, tag = "1")]
    pub session_id: String,
    #[prost(string, tag = "2")]
    pub serial: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct QueryDeviceSessionStatisticsResponse {}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct QueryServiceStatisticsRequest {}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct QueryServiceStatisticsResponse {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gnmi::PathElem;
    use prost::Message;

    #[test]
    fn test_capabilities_wire_roundtrip() {
        let caps = DeviceCapabilities {
            device_paths: vec![
                Path::from_elems(vec![PathElem::new("system"), PathElem::new("cpu")]),
                Path::from_elements(["interfaces", "counters"]),
            ],
            publish_interval: 30,
        };

        let decoded = DeviceCapabilities::decode(caps.encode_to_vec().as_slice()).unwrap();
        assert_eq!(decoded, caps);
    }

    #[test]
    fn test_session_state_from_wire() {
        assert_eq!(
            DeviceSessionState::try_from(1).ok(),
            Some(DeviceSessionState::SessionInit)
        );
        assert!(DeviceSessionState::try_from(42).is_err());
    }
}
