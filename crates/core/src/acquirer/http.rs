use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};

use super::{AcquireError, AcquirerConfig, AssetAcquirer};

/// HTTP asset downloader with bounded retries.
pub struct HttpAcquirer {
    client: Client,
    config: AcquirerConfig,
}

impl HttpAcquirer {
    pub fn new(config: AcquirerConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .expect("Failed to create HTTP client");

        Self { client, config }
    }

    async fn download_once(&self, url: &str, part_path: &Path) -> Result<(), AcquireError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AcquireError::Download(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AcquireError::Download(format!(
                "HTTP {} from {}",
                response.status(),
                url
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| AcquireError::Download(e.to_string()))?;

        tokio::fs::write(part_path, &body).await?;
        Ok(())
    }
}

#[async_trait]
impl AssetAcquirer for HttpAcquirer {
    async fn acquire(&self, reference: &str, dest: &Path) -> Result<PathBuf, AcquireError> {
        if !reference.starts_with("http://") && !reference.starts_with("https://") {
            return Err(AcquireError::InvalidReference(reference.to_string()));
        }

        let part_path = {
            let mut name = dest.as_os_str().to_owned();
            name.push(".part");
            PathBuf::from(name)
        };

        let mut last_error = String::new();
        for attempt in 1..=self.config.attempts {
            match self.download_once(reference, &part_path).await {
                Ok(()) => {
                    tokio::fs::rename(&part_path, dest).await?;
                    debug!(url = %reference, dest = %dest.display(), attempt, "Asset acquired");
                    return Ok(dest.to_path_buf());
                }
                Err(e) => {
                    warn!(
                        url = %reference,
                        attempt,
                        attempts = self.config.attempts,
                        error = %e,
                        "Asset download attempt failed"
                    );
                    last_error = e.to_string();
                }
            }

            if attempt < self.config.attempts {
                tokio::time::sleep(Duration::from_millis(self.config.retry_delay_ms)).await;
            }
        }

        // Best effort; a stale .part file is harmless but untidy.
        let _ = tokio::fs::remove_file(&part_path).await;

        Err(AcquireError::RetriesExhausted {
            attempts: self.config.attempts,
            last_error,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quick_acquirer() -> HttpAcquirer {
        HttpAcquirer::new(AcquirerConfig {
            attempts: 2,
            retry_delay_ms: 1,
        })
    }

    #[tokio::test]
    async fn test_rejects_non_http_reference() {
        let acquirer = quick_acquirer();
        let temp_dir = tempfile::tempdir().unwrap();
        let dest = temp_dir.path().join("asset.png");

        let err = acquirer
            .acquire("ftp://example.com/file.png", &dest)
            .await
            .unwrap_err();
        assert!(matches!(err, AcquireError::InvalidReference(_)));
        assert!(!dest.exists());
    }

    #[tokio::test]
    async fn test_unreachable_host_exhausts_retries() {
        let acquirer = quick_acquirer();
        let temp_dir = tempfile::tempdir().unwrap();
        let dest = temp_dir.path().join("asset.png");

        // Bind and drop a local port so the connection is refused immediately.
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let err = acquirer
            .acquire(&format!("http://127.0.0.1:{port}/file.png"), &dest)
            .await
            .unwrap_err();

        match err {
            AcquireError::RetriesExhausted { attempts, .. } => assert_eq!(attempts, 2),
            other => panic!("unexpected error: {other}"),
        }
        assert!(!dest.exists());
    }

    #[tokio::test]
    async fn test_recovers_within_attempt_bound() {
        let acquirer = quick_acquirer();
        let temp_dir = tempfile::tempdir().unwrap();
        let dest = temp_dir.path().join("asset.png");

        // Serve a 500 to the first request and the asset to the second.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let server = std::thread::spawn(move || {
            use std::io::{Read, Write};
            let responses: [&[u8]; 2] = [
                b"HTTP/1.1 500 Internal Server Error\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
                b"HTTP/1.1 200 OK\r\nContent-Length: 8\r\nConnection: close\r\n\r\nartwork!",
            ];
            for response in responses {
                let (mut stream, _) = listener.accept().unwrap();
                let mut buf = [0u8; 1024];
                let _ = stream.read(&mut buf);
                stream.write_all(response).unwrap();
            }
        });

        let path = acquirer
            .acquire(&format!("http://127.0.0.1:{port}/asset.png"), &dest)
            .await
            .unwrap();
        server.join().unwrap();

        assert_eq!(path, dest);
        assert_eq!(std::fs::read(&dest).unwrap(), b"artwork!");
        let mut part = dest.into_os_string();
        part.push(".part");
        assert!(!PathBuf::from(part).exists());
    }

    #[test]
    fn test_config_defaults() {
        let config = AcquirerConfig::default();
        assert_eq!(config.attempts, 5);
        assert_eq!(config.retry_delay_ms, 1000);
    }
}
