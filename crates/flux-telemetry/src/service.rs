use async_trait::async_trait;
use flux_gnmi::{
    DeviceSessionStartRequest, DeviceSessionStartResponse, DeviceSessionTerminateRequest,
    DeviceSessionTerminateResponse, DiscoverDeviceCapabilityRequest,
    DiscoverDeviceCapabilityResponse, QueryDeviceSessionStatisticsRequest,
    QueryDeviceSessionStatisticsResponse, QueryServiceStatisticsRequest,
    QueryServiceStatisticsResponse, StreamDeviceChangeNotificationsCloudMessage,
    StreamDeviceChangeNotificationsDeviceMessage,
};
use futures::Stream;
use std::pin::Pin;
use tokio_stream::wrappers::ReceiverStream;
use tonic::{Request, Response, Status};

/// 设备侧发来的消息流，`tonic::Streaming<T>` 可直接装箱成该类型
pub type InboundStream<T> = Pin<Box<dyn Stream<Item = Result<T, Status>> + Send + 'static>>;

/// 返回给设备的消息流
pub type OutboundStream<T> = ReceiverStream<Result<T, Status>>;

/// Dial-out 遥测服务接口
///
/// 传输层（监听、TLS 终结）在外部完成，收到调用后转交给这里。
#[async_trait]
pub trait CloudTelemetryService: Send + Sync + 'static {
    /// 建立会话
    async fn device_session_start(
        &self,
        request: Request<DeviceSessionStartRequest>,
    ) -> Result<Response<DeviceSessionStartResponse>, Status>;

    /// 能力上报双向流
    async fn discover_device_capability(
        &self,
        request: Request<InboundStream<DiscoverDeviceCapabilityRequest>>,
    ) -> Result<Response<OutboundStream<DiscoverDeviceCapabilityResponse>>, Status>;

    /// 订阅下发与数据推送双向流
    async fn stream_device_change_notifications(
        &self,
        request: Request<InboundStream<StreamDeviceChangeNotificationsDeviceMessage>>,
    ) -> Result<Response<OutboundStream<StreamDeviceChangeNotificationsCloudMessage>>, Status>;

    async fn device_session_terminate(
        &self,
        request: Request<DeviceSessionTerminateRequest>,
    ) -> Result<Response<DeviceSessionTerminateResponse>, Status>;

    async fn query_device_session_statistics(
        &self,
        request: Request<QueryDeviceSessionStatisticsRequest>,
    ) -> Result<Response<QueryDeviceSessionStatisticsResponse>, Status>;

    async fn query_service_statistics(
        &self,
        request: Request<QueryServiceStatisticsRequest>,
    ) -> Result<Response<QueryServiceStatisticsResponse>, Status>;
}
