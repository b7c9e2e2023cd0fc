use core::fmt::{Display, Formatter, Result as FmtResult};

use anyhow::{ensure, Result};
use async_trait::async_trait;
use mime::APPLICATION_JSON;
use reqwest::{header::ACCEPT, Client, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize};
use thiserror::Error;
use tracing::{debug, trace};
use types::{
    nonstandard::{BlockWithRoot, Phase},
    phase0::{
        containers::{Attestation, BeaconBlockHeader},
        primitives::{Slot, H256},
    },
    redacting_url::RedactingUrl,
};

use crate::block_source::BlockSource;

#[derive(Debug, Error)]
#[cfg_attr(test, derive(PartialEq, Eq))]
pub enum Error {
    #[error("beacon node responded with header for slot {returned} when asked for slot {requested}")]
    SlotMismatch { requested: Slot, returned: Slot },
    #[error("block {root:?} at slot {slot} disappeared between requests")]
    BlockDisappeared { root: H256, slot: Slot },
    #[error(
        "{phase} block at slot {slot} carries multi-committee attestations, \
         which cannot be attributed to committee seats"
    )]
    UnsupportedPhase { phase: Phase, slot: Slot },
    #[error("beacon node responded with {status} (response: {message})")]
    UnexpectedStatus { status: StatusCode, message: String },
}

#[derive(Deserialize)]
struct Data<T> {
    data: T,
}

#[derive(Deserialize)]
struct VersionedData<T> {
    version: Phase,
    data: T,
}

#[derive(Deserialize)]
struct HeaderResponse {
    root: H256,
    header: SignedHeader,
}

#[derive(Deserialize)]
struct SignedHeader {
    message: BeaconBlockHeader,
}

#[derive(Deserialize)]
struct NodeVersion {
    version: String,
}

/// [`BlockSource`] backed by the Eth Beacon Node API.
///
/// Blocks are assembled from the header and attestation endpoints instead of the full block
/// endpoint. Execution payloads are never downloaded.
pub struct HttpBlockSource {
    client: Client,
    url: RedactingUrl,
}

impl Display for HttpBlockSource {
    fn fmt(&self, formatter: &mut Formatter) -> FmtResult {
        Display::fmt(&self.url, formatter)
    }
}

#[async_trait]
impl BlockSource for HttpBlockSource {
    async fn node_version(&self) -> Result<String> {
        let Data {
            data: NodeVersion { version },
        } = self.get("/eth/v1/node/version").await?.ok_or(Error::UnexpectedStatus {
            status: StatusCode::NOT_FOUND,
            message: "node version endpoint not found".to_owned(),
        })?;

        Ok(version)
    }

    async fn fetch_block(&self, slot: Slot) -> Result<Option<BlockWithRoot>> {
        let Some(Data {
            data: HeaderResponse { root, header },
        }) = self
            .get::<Data<HeaderResponse>>(&format!("/eth/v1/beacon/headers/{slot}"))
            .await?
        else {
            trace!("no block at slot {slot} according to {self}");
            return Ok(None);
        };

        let BeaconBlockHeader {
            slot: header_slot,
            parent_root,
            ..
        } = header.message;

        ensure!(
            header_slot == slot,
            Error::SlotMismatch {
                requested: slot,
                returned: header_slot,
            },
        );

        // Request attestations by root rather than by slot.
        // The node may have switched forks since the header was returned.
        let VersionedData {
            version,
            data: attestations,
        } = self
            .get::<VersionedData<Vec<Attestation>>>(&format!(
                "/eth/v2/beacon/blocks/{root:?}/attestations"
            ))
            .await?
            .ok_or(Error::BlockDisappeared { root, slot })?;

        ensure!(
            version.has_single_committee_attestations(),
            Error::UnsupportedPhase {
                phase: version,
                slot,
            },
        );

        Ok(Some(BlockWithRoot {
            root,
            slot,
            parent_root,
            attestations,
        }))
    }
}

impl HttpBlockSource {
    #[must_use]
    pub const fn new(client: Client, url: RedactingUrl) -> Self {
        Self { client, url }
    }

    // Returns `Ok(None)` on 404 Not Found, which is how beacon nodes report empty slots.
    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>> {
        let url = self.url.join(path)?;

        debug!("requesting {url}");

        let response = self
            .client
            .get(url.into_url())
            .header(ACCEPT, APPLICATION_JSON.as_ref())
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let response = handle_error(response).await?;

        Ok(Some(response.json().await?))
    }
}

async fn handle_error(response: Response) -> Result<Response> {
    let status = response.status();

    if status.is_success() {
        return Ok(response);
    }

    let message = response.text().await?;

    Err(Error::UnexpectedStatus { status, message }.into())
}

#[cfg(test)]
mod tests {
    use bitvec::{bitvec, order::Lsb0};
    use httpmock::{Method, MockServer};
    use serde_json::{json, Value};

    use super::*;

    const ROOT: &str = "0x1111111111111111111111111111111111111111111111111111111111111111";
    const PARENT_ROOT: &str = "0x2222222222222222222222222222222222222222222222222222222222222222";

    fn header_json(slot: Slot) -> Value {
        json!({
            "execution_optimistic": false,
            "finalized": true,
            "data": {
                "root": ROOT,
                "canonical": true,
                "header": {
                    "message": {
                        "slot": slot.to_string(),
                        "proposer_index": "42",
                        "parent_root": PARENT_ROOT,
                        "state_root": PARENT_ROOT,
                        "body_root": PARENT_ROOT,
                    },
                    "signature": "0x00",
                },
            },
        })
    }

    fn attestations_json(version: &str) -> Value {
        json!({
            "version": version,
            "execution_optimistic": false,
            "finalized": true,
            "data": [{
                "aggregation_bits": "0x15",
                "signature": "0x00",
                "data": {
                    "slot": "99",
                    "index": "7",
                    "beacon_block_root": PARENT_ROOT,
                    "source": { "epoch": "2", "root": PARENT_ROOT },
                    "target": { "epoch": "3", "root": PARENT_ROOT },
                },
            }],
        })
    }

    fn source(server: &MockServer) -> Result<HttpBlockSource> {
        Ok(HttpBlockSource::new(Client::new(), server.url("/").parse()?))
    }

    #[tokio::test]
    async fn test_fetch_block_assembles_header_and_attestations() -> Result<()> {
        let server = MockServer::start();

        server.mock(|when, then| {
            when.method(Method::GET).path("/eth/v1/beacon/headers/100");
            then.status(200).json_body(header_json(100));
        });

        server.mock(|when, then| {
            when.method(Method::GET)
                .path(format!("/eth/v2/beacon/blocks/{ROOT}/attestations"));
            then.status(200).json_body(attestations_json("deneb"));
        });

        let block = source(&server)?
            .fetch_block(100)
            .await?
            .expect("block at slot 100 should be present");

        assert_eq!(block.root, ROOT.parse()?);
        assert_eq!(block.parent_root, PARENT_ROOT.parse()?);
        assert_eq!(block.slot, 100);
        assert_eq!(block.attestations.len(), 1);
        assert_eq!(block.attestations[0].data.slot, 99);
        assert_eq!(block.attestations[0].data.index, 7);
        assert_eq!(
            block.attestations[0].aggregation_bits,
            bitvec![u8, Lsb0; 1, 0, 1, 0],
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_fetch_block_treats_not_found_as_empty_slot() -> Result<()> {
        let server = MockServer::start();

        server.mock(|when, then| {
            when.method(Method::GET).path("/eth/v1/beacon/headers/101");
            then.status(404)
                .json_body(json!({ "code": 404, "message": "Could not find requested block" }));
        });

        assert_eq!(source(&server)?.fetch_block(101).await?, None);

        Ok(())
    }

    #[tokio::test]
    async fn test_fetch_block_fails_on_server_error() -> Result<()> {
        let server = MockServer::start();

        server.mock(|when, then| {
            when.method(Method::GET).path("/eth/v1/beacon/headers/102");
            then.status(500).body("internal error");
        });

        let error = source(&server)?
            .fetch_block(102)
            .await
            .expect_err("500 response should be an error")
            .downcast::<Error>()?;

        assert_eq!(
            error,
            Error::UnexpectedStatus {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                message: "internal error".to_owned(),
            },
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_fetch_block_rejects_header_for_other_slot() -> Result<()> {
        let server = MockServer::start();

        server.mock(|when, then| {
            when.method(Method::GET).path("/eth/v1/beacon/headers/103");
            then.status(200).json_body(header_json(90));
        });

        let error = source(&server)?
            .fetch_block(103)
            .await
            .expect_err("header for a different slot should be rejected")
            .downcast::<Error>()?;

        assert_eq!(
            error,
            Error::SlotMismatch {
                requested: 103,
                returned: 90,
            },
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_fetch_block_rejects_multi_committee_attestations() -> Result<()> {
        let server = MockServer::start();

        server.mock(|when, then| {
            when.method(Method::GET).path("/eth/v1/beacon/headers/104");
            then.status(200).json_body(header_json(104));
        });

        server.mock(|when, then| {
            when.method(Method::GET)
                .path(format!("/eth/v2/beacon/blocks/{ROOT}/attestations"));
            then.status(200).json_body(attestations_json("electra"));
        });

        let error = source(&server)?
            .fetch_block(104)
            .await
            .expect_err("Electra attestations should be rejected")
            .downcast::<Error>()?;

        assert_eq!(
            error,
            Error::UnsupportedPhase {
                phase: Phase::Electra,
                slot: 104,
            },
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_fetch_block_fails_if_block_disappears() -> Result<()> {
        let server = MockServer::start();

        server.mock(|when, then| {
            when.method(Method::GET).path("/eth/v1/beacon/headers/105");
            then.status(200).json_body(header_json(105));
        });

        server.mock(|when, then| {
            when.method(Method::GET)
                .path(format!("/eth/v2/beacon/blocks/{ROOT}/attestations"));
            then.status(404).body("{}");
        });

        let error = source(&server)?
            .fetch_block(105)
            .await
            .expect_err("block missing on second request should be an error")
            .downcast::<Error>()?;

        assert_eq!(
            error,
            Error::BlockDisappeared {
                root: ROOT.parse()?,
                slot: 105,
            },
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_node_version() -> Result<()> {
        let server = MockServer::start();

        server.mock(|when, then| {
            when.method(Method::GET).path("/eth/v1/node/version");
            then.status(200)
                .json_body(json!({ "data": { "version": "Grandine/1.0.0/x86_64-linux" } }));
        });

        assert_eq!(
            source(&server)?.node_version().await?,
            "Grandine/1.0.0/x86_64-linux",
        );

        Ok(())
    }
}
