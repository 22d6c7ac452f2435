use bytes::Bytes;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

/// 能力记录标识前缀
///
/// 通知阶段只靠这个前缀判断一个标识是否来自能力注册，
/// 不能与设备侧自带的标识冲突。
pub const CLOUD_ID_PREFIX: &str = "cloud_";

/// 生成能力记录标识：`cloud_<序号>_<uuid>`
pub fn cloud_request_id(index: usize) -> String {
    format!("{}{}_{}", CLOUD_ID_PREFIX, index, uuid::Uuid::new_v4())
}

pub fn is_cloud_request_id(id: &str) -> bool {
    id.starts_with(CLOUD_ID_PREFIX)
}

/// 会话与能力存储
///
/// 序列号 -> 会话 ID、能力标识 -> 序列化后的能力记录共用一张表，
/// 由一把读写锁保护。记录没有过期清理，随进程生命周期存在。
#[derive(Default)]
pub struct TelemetryStore {
    entries: RwLock<HashMap<String, Bytes>>,
}

impl TelemetryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录设备当前会话，覆盖该序列号之前的会话
    pub async fn put_session(&self, serial: &str, session_id: &str) {
        let mut entries = self.entries.write().await;
        if let Some(old) = entries.insert(
            serial.to_string(),
            Bytes::copy_from_slice(session_id.as_bytes()),
        ) {
            debug!(
                serial = %serial,
                previous = %String::from_utf8_lossy(&old),
                "Session superseded"
            );
        }
    }

    /// 查询设备当前会话
    pub async fn session(&self, serial: &str) -> Option<String> {
        let entries = self.entries.read().await;
        entries
            .get(serial)
            .map(|v| String::from_utf8_lossy(v).into_owned())
    }

    pub async fn put_record(&self, id: &str, record: Bytes) {
        let mut entries = self.entries.write().await;
        entries.insert(id.to_string(), record);
    }

    /// 按标识查询，未命中返回 `None`（不是错误）
    pub async fn get_record(&self, id: &str) -> Option<Bytes> {
        let entries = self.entries.read().await;
        entries.get(id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    #[test]
    fn test_cloud_request_id_format() {
        let id = cloud_request_id(3);
        assert!(id.starts_with("cloud_3_"));
        assert!(is_cloud_request_id(&id));
        assert!(uuid::Uuid::parse_str(&id["cloud_3_".len()..]).is_ok());
        assert!(!is_cloud_request_id("SERIAL-001"));
        assert_ne!(cloud_request_id(0), cloud_request_id(0));
    }

    #[tokio::test]
    async fn test_session_overwrite() {
        let store = TelemetryStore::new();
        store.put_session("SN1", "a").await;
        store.put_session("SN1", "b").await;
        assert_eq!(store.session("SN1").await, Some("b".to_string()));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_record_miss_is_none() {
        let store = TelemetryStore::new();
        assert!(store.is_empty().await);
        assert!(store.get_record("cloud_0_missing").await.is_none());
    }

    #[tokio::test]
    async fn test_concurrent_records_stay_isolated() {
        let store = Arc::new(TelemetryStore::new());
        let mut handles = vec![];
        for i in 0..32 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                let id = cloud_request_id(i);
                let record = Bytes::from(format!("record-{}", i));
                store.put_record(&id, record.clone()).await;
                (id, record)
            }));
        }

        let mut ids = HashSet::new();
        for handle in handles {
            let (id, record) = handle.await.unwrap();
            assert_eq!(store.get_record(&id).await, Some(record));
            ids.insert(id);
        }
        assert_eq!(ids.len(), 32);
        assert_eq!(store.len().await, 32);
    }
}
