//! HTTP binding for the DBE tree server.
//!
//! Every operation is a `POST` with query parameters. A call succeeds when the
//! server answers 200 and, for writes, the body carries `code == 0`.

use std::time::Duration;

use async_trait::async_trait;
use tfs_hooks::{HookResult, NodeSnapshot, TreeDbBackend};
use tfs_types::HookKind;

use crate::error::{ClientError, ClientResult};
use crate::wire;

/// [`TreeDbBackend`] served by a DBE server over HTTP.
#[derive(Debug, Clone)]
pub struct DbeBackend {
    client: reqwest::Client,
    base_url: String,
}

impl DbeBackend {
    pub fn new(server: &str, request_timeout: Duration) -> ClientResult<Self> {
        let base_url = server.trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ClientError::Config(format!(
                "server must be an http(s) url, got {:?}",
                server
            )));
        }
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(request_timeout)
            .build()?;
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post(&self, endpoint: &str, params: &[(&str, &str)]) -> ClientResult<String> {
        let url = format!("{}{}", self.base_url, endpoint);
        tracing::debug!(url = %url, ?params, "dbe request");
        let response = self.client.post(&url).query(params).send().await?;
        let status = response.status();
        let body = response.text().await?;
        if status != reqwest::StatusCode::OK {
            tracing::error!(url = %url, status = status.as_u16(), "dbe request failed");
            tracing::debug!(body = %body, "dbe response body");
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }

    async fn write(&self, endpoint: &str, params: &[(&str, &str)]) -> ClientResult<()> {
        let body = self.post(endpoint, params).await?;
        wire::check_write(&body)
    }

    pub async fn fetch(&self, host: &str, real_path: &str) -> ClientResult<NodeSnapshot> {
        let (filename, path) = wire::split_file(real_path)?;
        let body = self
            .post(
                wire::OPEN,
                &[("host", host), ("filename", filename.as_str()), ("path", path.as_str())],
            )
            .await?;
        let snapshot = wire::parse_open(&body)?;
        tracing::info!(host, filename = %filename, path = %path, "tree data fetched");
        Ok(snapshot)
    }
}

#[async_trait]
impl TreeDbBackend for DbeBackend {
    fn bindings(&self) -> Vec<HookKind> {
        HookKind::ALL.to_vec()
    }

    async fn open(&self, host: &str, real_path: &str) -> HookResult<NodeSnapshot> {
        Ok(self.fetch(host, real_path).await?)
    }

    async fn add(&self, host: &str, real_path: &str) -> HookResult<()> {
        let (path, sub_key) = wire::split_parent(real_path)?;
        self.write(
            wire::ADD,
            &[("host", host), ("path", path.as_str()), ("sub_key", sub_key.as_str())],
        )
        .await?;
        Ok(())
    }

    async fn remove(&self, host: &str, real_path: &str) -> HookResult<()> {
        let path = wire::server_path(real_path)?;
        self.write(wire::DELETE, &[("host", host), ("path", path.as_str())]).await?;
        Ok(())
    }

    async fn update(&self, host: &str, real_path: &str, new_name: &str) -> HookResult<()> {
        let path = wire::server_path(real_path)?;
        self.write(
            wire::UPDATE,
            &[("host", host), ("path", path.as_str()), ("sub_key", new_name)],
        )
        .await?;
        Ok(())
    }

    async fn attr_add(&self, host: &str, real_path: &str, key: &str, value: &str) -> HookResult<()> {
        let path = wire::server_path(real_path)?;
        self.write(
            wire::PROPS_UPDATE,
            &[
                ("host", host),
                ("path", path.as_str()),
                ("prop_name", key),
                ("prop_val", value),
            ],
        )
        .await?;
        Ok(())
    }

    async fn attr_remove(&self, host: &str, real_path: &str, key: &str) -> HookResult<()> {
        let path = wire::server_path(real_path)?;
        self.write(
            wire::PROPS_DELETE,
            &[("host", host), ("path", path.as_str()), ("prop_name", key)],
        )
        .await?;
        Ok(())
    }

    async fn attr_update(
        &self,
        host: &str,
        real_path: &str,
        key: &str,
        value: &str,
    ) -> HookResult<()> {
        self.attr_add(host, real_path, key, value).await
    }
}
