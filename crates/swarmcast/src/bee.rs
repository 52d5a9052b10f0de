//! Bee HTTP API client.
//!
//! Only the three endpoints the relay needs: byte upload, feed index lookup
//! and single-owner chunk upload. Every request carries the client-wide
//! deadline, so a wedged node becomes a per-request error instead of a
//! stalled relay.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::StatusCode;
use serde::Deserialize;
use swarmchunk::{feed, Address, SingleOwnerChunk, SwarmAddress, Topic};
use tracing::debug;

use crate::error::BeeError;

pub const POSTAGE_BATCH_HEADER: &str = "Swarm-Postage-Batch-Id";
pub const FEED_INDEX_HEADER: &str = "Swarm-Feed-Index";

/// The storage network as the relay sees it.
#[async_trait]
pub trait StorageApi: Send + Sync {
    /// Upload raw bytes and return their Swarm reference.
    async fn upload_bytes(&self, data: Bytes) -> Result<SwarmAddress, BeeError>;

    /// Latest index of the feed at `(owner, topic)`, or `None` if it has
    /// never been written.
    async fn feed_index(&self, owner: &Address, topic: &Topic) -> Result<Option<u64>, BeeError>;

    /// Upload a signed single-owner chunk.
    async fn upload_soc(&self, soc: &SingleOwnerChunk) -> Result<SwarmAddress, BeeError>;
}

#[derive(Debug, Deserialize)]
struct ReferenceResponse {
    reference: String,
}

/// [`StorageApi`] backed by a Bee node's HTTP API.
#[derive(Debug, Clone)]
pub struct BeeClient {
    base_url: String,
    batch_id: String,
    client: reqwest::Client,
}

impl BeeClient {
    pub fn new(base_url: &str, batch_id: &str, timeout: Duration) -> Result<Self, BeeError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BeeError::transport(base_url, e))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            batch_id: batch_id.to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn reference(url: &str, response: reqwest::Response) -> Result<SwarmAddress, BeeError> {
        let response = check_status(url, response).await?;
        let body: ReferenceResponse = response.json().await.map_err(|e| BeeError::Decode {
            url: url.to_string(),
            message: e.to_string(),
        })?;
        SwarmAddress::from_str_checked(&body.reference).map_err(|e| BeeError::Decode {
            url: url.to_string(),
            message: format!("bad reference {:?}: {}", body.reference, e),
        })
    }
}

async fn check_status(url: &str, response: reqwest::Response) -> Result<reqwest::Response, BeeError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(BeeError::Status {
        url: url.to_string(),
        status: status.as_u16(),
        body,
    })
}

#[async_trait]
impl StorageApi for BeeClient {
    #[tracing::instrument(skip(self, data), fields(bytes = data.len()))]
    async fn upload_bytes(&self, data: Bytes) -> Result<SwarmAddress, BeeError> {
        let url = format!("{}/bytes", self.base_url);
        let response = self
            .client
            .post(&url)
            .header(POSTAGE_BATCH_HEADER, &self.batch_id)
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(data)
            .send()
            .await
            .map_err(|e| BeeError::transport(&url, e))?;

        let reference = Self::reference(&url, response).await?;
        debug!(%reference, "uploaded bytes");
        Ok(reference)
    }

    #[tracing::instrument(skip(self, owner, topic), fields(owner = %owner, topic = %topic))]
    async fn feed_index(&self, owner: &Address, topic: &Topic) -> Result<Option<u64>, BeeError> {
        let url = format!(
            "{}/feeds/{}/{}",
            self.base_url,
            hex::encode(owner.as_slice()),
            topic.to_hex()
        );
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| BeeError::transport(&url, e))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = check_status(&url, response).await?;

        let value = response
            .headers()
            .get(FEED_INDEX_HEADER)
            .ok_or_else(|| BeeError::Decode {
                url: url.clone(),
                message: format!("missing {} header", FEED_INDEX_HEADER),
            })?
            .to_str()
            .map_err(|e| BeeError::Decode {
                url: url.clone(),
                message: e.to_string(),
            })?
            .to_string();

        let index = feed::parse_index(&value).map_err(|e| BeeError::InvalidIndex {
            value: value.clone(),
            message: e.to_string(),
        })?;
        Ok(Some(index))
    }

    #[tracing::instrument(skip(self, soc), fields(id = %soc.id(), owner = %soc.owner()))]
    async fn upload_soc(&self, soc: &SingleOwnerChunk) -> Result<SwarmAddress, BeeError> {
        let url = format!(
            "{}/soc/{}/{}",
            self.base_url,
            hex::encode(soc.owner().as_slice()),
            soc.id().to_hex()
        );
        let response = self
            .client
            .post(&url)
            .query(&[("sig", soc.signature_hex())])
            .header(POSTAGE_BATCH_HEADER, &self.batch_id)
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(soc.chunk().data())
            .send()
            .await
            .map_err(|e| BeeError::transport(&url, e))?;

        Self::reference(&url, response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use swarmchunk::{ContentChunk, LocalSigner};
    use wiremock::matchers::{body_bytes, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const KEY: &str = "0x0000000000000000000000000000000000000000000000000000000000000001";

    fn reference(byte: u8) -> String {
        hex::encode([byte; 32])
    }

    async fn client(server: &MockServer) -> BeeClient {
        BeeClient::new(&server.uri(), "batch-1", Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_upload_bytes_sends_batch_header() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/bytes"))
            .and(header(POSTAGE_BATCH_HEADER, "batch-1"))
            .and(body_bytes(b"segment data".to_vec()))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "reference": reference(0xab) })))
            .expect(1)
            .mount(&server)
            .await;

        let address = client(&server)
            .await
            .upload_bytes(Bytes::from_static(b"segment data"))
            .await
            .unwrap();
        assert_eq!(address.to_hex(), reference(0xab));
    }

    #[tokio::test]
    async fn test_upload_bytes_reports_status_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/bytes"))
            .respond_with(ResponseTemplate::new(402).set_body_string("batch exhausted"))
            .mount(&server)
            .await;

        let err = client(&server)
            .await
            .upload_bytes(Bytes::from_static(b"x"))
            .await
            .unwrap_err();
        match err {
            BeeError::Status { status, body, .. } => {
                assert_eq!(status, 402);
                assert_eq!(body, "batch exhausted");
            }
            other => panic!("expected status error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_upload_bytes_rejects_malformed_reference() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/bytes"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "reference": "nope" })))
            .mount(&server)
            .await;

        let err = client(&server)
            .await
            .upload_bytes(Bytes::from_static(b"x"))
            .await
            .unwrap_err();
        assert!(matches!(err, BeeError::Decode { .. }));
    }

    #[tokio::test]
    async fn test_slow_node_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/bytes"))
            .respond_with(
                ResponseTemplate::new(201)
                    .set_body_json(json!({ "reference": reference(1) }))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let client = BeeClient::new(&server.uri(), "batch-1", Duration::from_millis(50)).unwrap();
        let err = client.upload_bytes(Bytes::from_static(b"x")).await.unwrap_err();
        assert!(matches!(err, BeeError::Timeout { .. }), "got {:?}", err);
    }

    #[tokio::test]
    async fn test_feed_index_found() {
        let server = MockServer::start().await;
        let signer = LocalSigner::from_hex(KEY).unwrap();
        let owner = swarmchunk::Signer::address(&signer);
        let topic = Topic::from_name("test radio");

        Mock::given(method("GET"))
            .and(path(format!(
                "/feeds/{}/{}",
                hex::encode(owner.as_slice()),
                topic.to_hex()
            )))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header(FEED_INDEX_HEADER, "0000000000000029")
                    .set_body_json(json!({ "reference": reference(2) })),
            )
            .mount(&server)
            .await;

        let index = client(&server).await.feed_index(&owner, &topic).await.unwrap();
        assert_eq!(index, Some(41));
    }

    #[tokio::test]
    async fn test_feed_index_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let index = client(&server)
            .await
            .feed_index(&Address::ZERO, &Topic::from_name("test radio"))
            .await
            .unwrap();
        assert_eq!(index, None);
    }

    #[tokio::test]
    async fn test_feed_index_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("/feeds/{}/{}", "00".repeat(20), Topic::from_name("a").to_hex())))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(format!("/feeds/{}/{}", "00".repeat(20), Topic::from_name("b").to_hex())))
            .respond_with(ResponseTemplate::new(200).insert_header(FEED_INDEX_HEADER, "zz"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(format!("/feeds/{}/{}", "00".repeat(20), Topic::from_name("c").to_hex())))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let client = client(&server).await;
        let owner = Address::ZERO;
        assert!(matches!(
            client.feed_index(&owner, &Topic::from_name("a")).await,
            Err(BeeError::Status { status: 500, .. })
        ));
        assert!(matches!(
            client.feed_index(&owner, &Topic::from_name("b")).await,
            Err(BeeError::InvalidIndex { .. })
        ));
        assert!(matches!(
            client.feed_index(&owner, &Topic::from_name("c")).await,
            Err(BeeError::Decode { .. })
        ));
    }

    #[tokio::test]
    async fn test_upload_soc_wire_format() {
        let server = MockServer::start().await;
        let signer = LocalSigner::from_hex(KEY).unwrap();
        let topic = Topic::from_name("test radio");
        let chunk = ContentChunk::new(feed::update_payload(7, &SwarmAddress::new([3; 32]))).unwrap();
        let soc = SingleOwnerChunk::sign(feed::identifier(&topic, 0), chunk, &signer).unwrap();

        Mock::given(method("POST"))
            .and(path(format!(
                "/soc/{}/{}",
                hex::encode(soc.owner().as_slice()),
                soc.id().to_hex()
            )))
            .and(query_param("sig", soc.signature_hex()))
            .and(header(POSTAGE_BATCH_HEADER, "batch-1"))
            .and(header("content-type", "application/octet-stream"))
            .and(body_bytes(soc.chunk().data()))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "reference": soc.address().to_hex() })))
            .expect(1)
            .mount(&server)
            .await;

        let reference = client(&server).await.upload_soc(&soc).await.unwrap();
        assert_eq!(reference, soc.address());
    }
}
