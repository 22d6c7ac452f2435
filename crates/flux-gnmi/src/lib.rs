pub mod dialout;
pub mod gnmi;

pub use dialout::{
    DeviceCapabilities, DeviceIdentity, DeviceSessionStartRequest, DeviceSessionStartResponse,
    DeviceSessionState, DeviceSessionTerminateRequest, DeviceSessionTerminateResponse,
    DiscoverDeviceCapabilityRequest, DiscoverDeviceCapabilityResponse,
    QueryDeviceSessionStatisticsRequest, QueryDeviceSessionStatisticsResponse,
    QueryServiceStatisticsRequest, QueryServiceStatisticsResponse,
    StreamDeviceChangeNotificationsCloudMessage, StreamDeviceChangeNotificationsDeviceMessage,
};
pub use gnmi::{
    subscribe_request, subscribe_response, typed_value, Decimal64, Encoding, Error, Notification,
    Path, PathElem, ScalarArray, SubscribeRequest, SubscribeResponse, Subscription,
    SubscriptionList, SubscriptionMode, TypedValue, Update, Value,
};
