use anyhow::{Context, Result};
use rustls::{Certificate, PrivateKey, ServerConfig};
use rustls_pemfile::{certs, pkcs8_private_keys, rsa_private_keys};
use std::fs::File;
use std::io::BufReader;
use std::sync::Arc;

use crate::config::TelemetryConfig;
use crate::error::TelemetryError;

/// TLS 证书配置
#[derive(Debug, Clone)]
pub struct TlsConfig {
    /// 证书文件路径
    pub cert_path: String,
    /// 私钥文件路径
    pub key_path: String,
}

impl TlsConfig {
    pub fn new(cert_path: impl Into<String>, key_path: impl Into<String>) -> Self {
        Self {
            cert_path: cert_path.into(),
            key_path: key_path.into(),
        }
    }

    /// 从服务配置提取，未配置证书时返回 `None`
    pub fn from_config(config: &TelemetryConfig) -> Option<Self> {
        match (&config.tls_cert, &config.tls_key) {
            (Some(cert), Some(key)) => Some(Self::new(cert.clone(), key.clone())),
            _ => None,
        }
    }
}

/// 加载 TLS 配置，失败时服务无法启动
pub fn load_tls_config(config: &TlsConfig) -> crate::error::Result<Arc<ServerConfig>> {
    build_server_config(config)
        .map(Arc::new)
        .map_err(|e| TelemetryError::tls(format!("{:#}", e)))
}

fn build_server_config(config: &TlsConfig) -> Result<ServerConfig> {
    // 1. 加载证书链
    let cert_file = File::open(&config.cert_path)
        .context(format!("Failed to open cert file: {}", config.cert_path))?;
    let mut cert_reader = BufReader::new(cert_file);
    let cert_chain: Vec<Certificate> = certs(&mut cert_reader)
        .context("Failed to parse certificate")?
        .into_iter()
        .map(Certificate)
        .collect();

    if cert_chain.is_empty() {
        anyhow::bail!("No certificate found in {}", config.cert_path);
    }

    // 2. 加载私钥，PKCS#8 优先，其次 RSA
    let private_key = load_private_key(&config.key_path)?;

    // 3. 构建 ServerConfig
    let mut tls_config = ServerConfig::builder()
        .with_safe_defaults()
        .with_no_client_auth()
        .with_single_cert(cert_chain, private_key)
        .context("Failed to build TLS config")?;

    // gRPC 走 HTTP/2
    tls_config.alpn_protocols = vec![b"h2".to_vec()];

    Ok(tls_config)
}

fn load_private_key(path: &str) -> Result<PrivateKey> {
    let key_file = File::open(path).context(format!("Failed to open key file: {}", path))?;
    let mut keys = pkcs8_private_keys(&mut BufReader::new(key_file))
        .context("Failed to parse private key")?;

    if keys.is_empty() {
        let key_file = File::open(path).context(format!("Failed to open key file: {}", path))?;
        keys = rsa_private_keys(&mut BufReader::new(key_file))
            .context("Failed to parse RSA private key")?;
    }

    if keys.is_empty() {
        anyhow::bail!("No private key found in {}", path);
    }

    Ok(PrivateKey(keys.remove(0)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_from_config_requires_both_files() {
        let mut config = TelemetryConfig::default();
        assert!(TlsConfig::from_config(&config).is_none());

        config.tls_cert = Some("cert.pem".to_string());
        assert!(TlsConfig::from_config(&config).is_none());

        config.tls_key = Some("key.pem".to_string());
        let tls = TlsConfig::from_config(&config).unwrap();
        assert_eq!(tls.cert_path, "cert.pem");
        assert_eq!(tls.key_path, "key.pem");
    }

    #[test]
    fn test_missing_cert_file_is_tls_error() {
        let temp_dir = tempdir().unwrap();
        let config = TlsConfig::new(
            temp_dir.path().join("missing.pem").to_string_lossy(),
            temp_dir.path().join("missing.key").to_string_lossy(),
        );

        let err = load_tls_config(&config).unwrap_err();
        assert!(matches!(err, TelemetryError::Tls(_)));
        assert!(err.to_string().contains("Failed to open cert file"));
    }

    #[test]
    fn test_empty_cert_file_is_tls_error() {
        let temp_dir = tempdir().unwrap();
        let cert = temp_dir.path().join("cert.pem");
        let key = temp_dir.path().join("key.pem");
        fs::write(&cert, "").unwrap();
        fs::write(&key, "").unwrap();

        let err = load_tls_config(&TlsConfig::new(
            cert.to_string_lossy(),
            key.to_string_lossy(),
        ))
        .unwrap_err();
        assert!(err.to_string().contains("No certificate found"));
    }
}
