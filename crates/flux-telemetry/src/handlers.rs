use async_trait::async_trait;
use bytes::BytesMut;
use flux_gnmi::{
    subscribe_request, DeviceCapabilities, DeviceSessionStartRequest,
    DeviceSessionStartResponse, DeviceSessionState, DeviceSessionTerminateRequest,
    DeviceSessionTerminateResponse, DiscoverDeviceCapabilityRequest,
    DiscoverDeviceCapabilityResponse, QueryDeviceSessionStatisticsRequest,
    QueryDeviceSessionStatisticsResponse, QueryServiceStatisticsRequest,
    QueryServiceStatisticsResponse, StreamDeviceChangeNotificationsCloudMessage,
    StreamDeviceChangeNotificationsDeviceMessage, SubscribeRequest, Subscription,
    SubscriptionList,
};
use prost::Message;
use std::sync::Arc;
use std::time::SystemTime;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::StreamExt;
use tonic::{Request, Response, Status};
use tracing::{debug, error, info};

use crate::codec::format_path;
use crate::metrics::ServiceMetrics;
use crate::pipeline::NotificationQueue;
use crate::service::{CloudTelemetryService, InboundStream, OutboundStream};
use crate::session::{SessionEvent, SessionTracker};
use crate::store::{cloud_request_id, is_cloud_request_id, TelemetryStore};

/// 每条返回流的发送缓冲
const OUTBOUND_BUFFER: usize = 16;

type DiscoverSender = mpsc::Sender<Result<DiscoverDeviceCapabilityResponse, Status>>;
type CloudSender = mpsc::Sender<Result<StreamDeviceChangeNotificationsCloudMessage, Status>>;

/// Dial-out 协议处理器
#[derive(Clone)]
pub struct TelemetryService {
    store: Arc<TelemetryStore>,
    sessions: Arc<SessionTracker>,
    queue: NotificationQueue,
    metrics: ServiceMetrics,
}

impl TelemetryService {
    pub fn new(
        store: Arc<TelemetryStore>,
        sessions: Arc<SessionTracker>,
        queue: NotificationQueue,
        metrics: ServiceMetrics,
    ) -> Self {
        Self {
            store,
            sessions,
            queue,
            metrics,
        }
    }

    pub fn store(&self) -> &Arc<TelemetryStore> {
        &self.store
    }

    pub fn sessions(&self) -> &Arc<SessionTracker> {
        &self.sessions
    }

    pub fn metrics(&self) -> &ServiceMetrics {
        &self.metrics
    }

    /// 处理一条能力上报：每个能力分配一个标识并回执
    async fn register_capabilities(
        &self,
        request: DiscoverDeviceCapabilityRequest,
        tx: &DiscoverSender,
    ) -> Result<(), Status> {
        info!(
            serial = %request.serial,
            session_id = %request.session_id,
            capabilities = request.device_capabilities.len(),
            "DiscoverDeviceCapability"
        );

        self.sessions
            .advance(&request.session_id, SessionEvent::RegisterCapabilities)?;

        for capability in &request.device_capabilities {
            for path in &capability.device_paths {
                info!(
                    path = %format_path(Some(path)),
                    interval = capability.publish_interval,
                    "Device capability"
                );
            }
        }

        for (index, capability) in request.device_capabilities.iter().enumerate() {
            let id = cloud_request_id(index);

            let mut buf = BytesMut::with_capacity(capability.encoded_len());
            if let Err(e) = capability.encode(&mut buf) {
                error!(serial = %request.serial, "DiscoverDeviceCapability encode error: {}", e);
                self.metrics.record_capability_error();
                continue;
            }
            self.store.put_record(&id, buf.freeze()).await;
            self.metrics.record_capability_registered();

            let response = DiscoverDeviceCapabilityResponse {
                session_id: request.session_id.clone(),
                serial: request.serial.clone(),
                cloud_request_id: id,
            };
            debug!(
                serial = %request.serial,
                cloud_request_id = %response.cloud_request_id,
                "DiscoverDeviceCapability response"
            );
            if tx.send(Ok(response)).await.is_err() {
                return Err(Status::cancelled("device stopped receiving capability responses"));
            }
        }

        Ok(())
    }

    /// 处理设备在通知流上的一条消息
    async fn handle_device_message(
        &self,
        message: StreamDeviceChangeNotificationsDeviceMessage,
        tx: &CloudSender,
    ) -> Result<(), Status> {
        debug!(
            session_id = %message.session_id,
            cloud_request_id = %message.cloud_request_id,
            responses = message.device_subscribe_responses.len(),
            "StreamDeviceChangeNotifications recv"
        );

        self.sessions
            .advance(&message.session_id, SessionEvent::StreamNotifications)?;

        if message.device_subscribe_responses.is_empty() {
            return self.push_subscription(message, tx).await;
        }

        for response in message.device_subscribe_responses {
            self.queue.enqueue(response).await?;
        }
        Ok(())
    }

    // 设备请求订阅：按能力标识找回记录并下发订阅
    async fn push_subscription(
        &self,
        message: StreamDeviceChangeNotificationsDeviceMessage,
        tx: &CloudSender,
    ) -> Result<(), Status> {
        let Some(record) = self.store.get_record(&message.cloud_request_id).await else {
            error!(
                serial = %message.serial,
                cloud_request_id = %message.cloud_request_id,
                "StreamDeviceChangeNotifications cannot find db entry"
            );
            self.metrics.record_unknown_request_id();
            return Ok(());
        };

        if !is_cloud_request_id(&message.cloud_request_id) {
            error!(
                cloud_request_id = %message.cloud_request_id,
                "StreamDeviceChangeNotifications: Unknown CloudRequest-Id"
            );
            self.metrics.record_unknown_request_id();
            return Ok(());
        }

        let capabilities = match DeviceCapabilities::decode(record) {
            Ok(capabilities) => capabilities,
            Err(e) => {
                error!(
                    cloud_request_id = %message.cloud_request_id,
                    "StreamDeviceChangeNotifications decode error: {}", e
                );
                return Ok(());
            }
        };

        let response = StreamDeviceChangeNotificationsCloudMessage {
            session_id: message.session_id,
            serial: message.serial,
            cloud_request_id: message.cloud_request_id,
            subscribe_request: Some(subscription_request(&capabilities)),
            data_push_url: String::new(),
        };

        tx.send(Ok(response))
            .await
            .map_err(|_| Status::cancelled("device stopped receiving subscriptions"))?;
        self.metrics.record_subscription_pushed();
        Ok(())
    }
}

/// 能力记录转订阅请求：每条路径一个订阅，采样周期取发布周期
pub fn subscription_request(capabilities: &DeviceCapabilities) -> SubscribeRequest {
    let subscription = capabilities
        .device_paths
        .iter()
        .map(|path| Subscription {
            path: Some(path.clone()),
            sample_interval: u64::from(capabilities.publish_interval),
            ..Default::default()
        })
        .collect();

    SubscribeRequest {
        request: Some(subscribe_request::Request::Subscribe(SubscriptionList {
            subscription,
            ..Default::default()
        })),
    }
}

#[async_trait]
impl CloudTelemetryService for TelemetryService {
    async fn device_session_start(
        &self,
        request: Request<DeviceSessionStartRequest>,
    ) -> Result<Response<DeviceSessionStartResponse>, Status> {
        let identity = request.into_inner().device_identity.unwrap_or_default();
        debug!(
            serial = %identity.serial,
            version = %identity.software_version,
            hostname = %identity.hostname,
            ipv4 = %identity.ipv4_address,
            "DeviceSessionStart"
        );

        let session_id = uuid::Uuid::new_v4().to_string();
        self.sessions.advance(&session_id, SessionEvent::Start)?;
        self.store.put_session(&identity.serial, &session_id).await;
        self.metrics.record_session_started();

        debug!(session_id = %session_id, "Session created");

        Ok(Response::new(DeviceSessionStartResponse {
            session_id,
            session_created_time: Some(prost_types::Timestamp::from(SystemTime::now())),
            device_session_state: DeviceSessionState::SessionInit as i32,
        }))
    }

    async fn discover_device_capability(
        &self,
        request: Request<InboundStream<DiscoverDeviceCapabilityRequest>>,
    ) -> Result<Response<OutboundStream<DiscoverDeviceCapabilityResponse>>, Status> {
        let mut inbound = request.into_inner();
        let (tx, rx) = mpsc::channel(OUTBOUND_BUFFER);
        let service = self.clone();

        tokio::spawn(async move {
            // 接收失败或设备关闭流都视为正常结束
            while let Some(Ok(request)) = inbound.next().await {
                if let Err(status) = service.register_capabilities(request, &tx).await {
                    let _ = tx.send(Err(status)).await;
                    break;
                }
            }
            debug!("DiscoverDeviceCapability stream finished");
        });

        Ok(Response::new(ReceiverStream::new(rx)))
    }

    async fn stream_device_change_notifications(
        &self,
        request: Request<InboundStream<StreamDeviceChangeNotificationsDeviceMessage>>,
    ) -> Result<Response<OutboundStream<StreamDeviceChangeNotificationsCloudMessage>>, Status>
    {
        let mut inbound = request.into_inner();
        let (tx, rx) = mpsc::channel(OUTBOUND_BUFFER);
        let service = self.clone();

        tokio::spawn(async move {
            loop {
                let message = match inbound.next().await {
                    Some(Ok(message)) => message,
                    Some(Err(status)) => {
                        error!("StreamDeviceChangeNotifications stream recv err={}", status);
                        let _ = tx.send(Err(status)).await;
                        break;
                    }
                    None => {
                        error!("StreamDeviceChangeNotifications stream closed by device");
                        let _ = tx
                            .send(Err(Status::cancelled("notification stream closed by device")))
                            .await;
                        break;
                    }
                };

                if let Err(status) = service.handle_device_message(message, &tx).await {
                    let _ = tx.send(Err(status)).await;
                    break;
                }
            }
        });

        Ok(Response::new(ReceiverStream::new(rx)))
    }

    async fn device_session_terminate(
        &self,
        request: Request<DeviceSessionTerminateRequest>,
    ) -> Result<Response<DeviceSessionTerminateResponse>, Status> {
        let request = request.into_inner();
        info!(
            serial = %request.serial,
            session_id = %request.session_id,
            "DeviceSessionTerminate"
        );
        self.metrics.record_session_terminated();
        Ok(Response::new(DeviceSessionTerminateResponse {}))
    }

    async fn query_device_session_statistics(
        &self,
        request: Request<QueryDeviceSessionStatisticsRequest>,
    ) -> Result<Response<QueryDeviceSessionStatisticsResponse>, Status> {
        let request = request.into_inner();
        info!(
            serial = %request.serial,
            session_id = %request.session_id,
            state = ?self.sessions.state(&request.session_id),
            "QueryDeviceSessionStatistics"
        );
        Ok(Response::new(QueryDeviceSessionStatisticsResponse {}))
    }

    async fn query_service_statistics(
        &self,
        _request: Request<QueryServiceStatisticsRequest>,
    ) -> Result<Response<QueryServiceStatisticsResponse>, Status> {
        let snapshot = self.metrics.snapshot();
        info!(
            stats = %serde_json::to_string(&snapshot).unwrap_or_default(),
            "QueryServiceStatistics"
        );
        Ok(Response::new(QueryServiceStatisticsResponse {}))
    }
}
