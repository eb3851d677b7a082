//! Client for the Safe Transaction Service, the relay that collects co-signatures.

use alloy_primitives::{Address, B256};
use async_trait::async_trait;
use safe_proposal_types::SafeTransactionData;
use serde::Serialize;
use zeroize::Zeroizing;

use crate::{
    config::Config,
    error::{Error, Result},
};

/// A proposal ready for the relay: the transaction, its hash and the proposer's signature over it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignedProposal {
    pub safe: Address,
    pub transaction: SafeTransactionData,
    pub safe_tx_hash: B256,
    pub sender: Address,
    pub signature: [u8; 65],
}

#[async_trait]
pub trait TransactionService: Send + Sync {
    /// Store the proposal. The relay owns deduplication and conflict policy.
    async fn propose(&self, proposal: &SignedProposal) -> Result<()>;
}

/// Wire body of `POST /api/v1/safes/{safe}/multisig-transactions/`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProposeTransactionBody {
    to: String,
    value: String,
    data: Option<String>,
    operation: u8,
    safe_tx_gas: String,
    base_gas: String,
    gas_price: String,
    gas_token: String,
    refund_receiver: String,
    nonce: String,
    contract_transaction_hash: String,
    sender: String,
    signature: String,
}

impl From<&SignedProposal> for ProposeTransactionBody {
    fn from(p: &SignedProposal) -> Self {
        let tx = &p.transaction;
        Self {
            to: tx.to.to_checksum(None),
            value: tx.value.to_string(),
            data: (!tx.data.is_empty()).then(|| format!("0x{}", hex::encode(&tx.data))),
            operation: tx.operation.as_u8(),
            safe_tx_gas: tx.safe_tx_gas.to_string(),
            base_gas: tx.base_gas.to_string(),
            gas_price: tx.gas_price.to_string(),
            gas_token: tx.gas_token.to_checksum(None),
            refund_receiver: tx.refund_receiver.to_checksum(None),
            nonce: tx.nonce.to_string(),
            contract_transaction_hash: format!("0x{}", hex::encode(p.safe_tx_hash)),
            sender: p.sender.to_checksum(None),
            signature: format!("0x{}", hex::encode(p.signature)),
        }
    }
}

/// HTTP [`TransactionService`] talking to a hosted or self-run Safe Transaction Service.
pub struct SafeTransactionService {
    client: reqwest::Client,
    base_url: String,
    api_key: Zeroizing<String>,
}

impl SafeTransactionService {
    pub fn new(base_url: impl Into<String>, api_key: Zeroizing<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.tx_service_url.clone(), config.tx_service_api_key.clone())
    }

    fn proposals_url(&self, safe: Address) -> String {
        format!(
            "{}/api/v1/safes/{}/multisig-transactions/",
            self.base_url,
            safe.to_checksum(None)
        )
    }
}

#[async_trait]
impl TransactionService for SafeTransactionService {
    async fn propose(&self, proposal: &SignedProposal) -> Result<()> {
        let url = self.proposals_url(proposal.safe);
        tracing::debug!(%url, safe_tx_hash = %proposal.safe_tx_hash, "posting proposal");

        let response = self
            .client
            .post(&url)
            .bearer_auth(self.api_key.as_str())
            .json(&ProposeTransactionBody::from(proposal))
            .send()
            .await
            .map_err(|e| Error::Network(format!("transaction service: {e}")))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response
            .text()
            .await
            .map_err(|e| Error::Network(format!("transaction service: {e}")))?;
        Err(Error::RelayRejection {
            status: status.as_u16(),
            body,
        })
    }
}


#[cfg(test)]
mod tests {
    use alloy_primitives::{address, b256, Bytes, U256};
    use safe_proposal_types::Operation;
    use tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::TcpListener,
    };

    use super::*;

    fn signed() -> SignedProposal {
        SignedProposal {
            safe: address!("2222222222222222222222222222222222222222"),
            transaction: SafeTransactionData::new(
                address!("1111111111111111111111111111111111111111"),
                U256::ZERO,
                Bytes::from_static(&[0xaa, 0xbb]),
                Operation::Call,
                U256::from(5),
            ),
            safe_tx_hash: b256!("c78a12a55f4f2ddb5f30c9c070726d7d16f6614f8ab1de17363ddc66a5e055ab"),
            sender: address!("7E5F4552091A69125d5DfCb7b8C2659029395Bdf"),
            signature: [0x11; 65],
        }
    }

    /// Serve exactly one request with the given status line and body; returns the raw request.
    async fn serve_once(status: &'static str, body: &'static str) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut chunk = [0u8; 4096];
            loop {
                let n = socket.read(&mut chunk).await.unwrap();
                request.extend_from_slice(&chunk[..n]);
                let text = String::from_utf8_lossy(&request).to_string();
                if let Some(end) = text.find("\r\n\r\n") {
                    let length = text[..end]
                        .lines()
                        .find_map(|l| {
                            l.to_ascii_lowercase()
                                .strip_prefix("content-length:")
                                .map(|v| v.trim().parse::<usize>().unwrap())
                        })
                        .unwrap_or(0);
                    if request.len() >= end + 4 + length {
                        break;
                    }
                }
                if n == 0 {
                    break;
                }
            }
            let response = format!(
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            String::from_utf8_lossy(&request).to_string()
        });
        (base, handle)
    }

    #[test]
    fn test_body_fields() {
        let body = serde_json::to_value(ProposeTransactionBody::from(&signed())).unwrap();
        assert_eq!(body["to"], "0x1111111111111111111111111111111111111111");
        assert_eq!(body["value"], "0");
        assert_eq!(body["data"], "0xaabb");
        assert_eq!(body["operation"], 0);
        assert_eq!(body["safeTxGas"], "0");
        assert_eq!(body["gasToken"], "0x0000000000000000000000000000000000000000");
        assert_eq!(body["nonce"], "5");
        assert_eq!(
            body["contractTransactionHash"],
            "0xc78a12a55f4f2ddb5f30c9c070726d7d16f6614f8ab1de17363ddc66a5e055ab"
        );
        assert_eq!(body["sender"], "0x7E5F4552091A69125d5DfCb7b8C2659029395Bdf");
        assert_eq!(body["signature"].as_str().unwrap().len(), 2 + 130);
    }

    #[test]
    fn test_empty_data_is_null() {
        let mut proposal = signed();
        proposal.transaction.data = Bytes::new();
        let body = serde_json::to_value(ProposeTransactionBody::from(&proposal)).unwrap();
        assert!(body["data"].is_null());
    }

    #[test]
    fn test_proposals_url() {
        let service = SafeTransactionService::new("https://example.org/tx-service/sep/", Zeroizing::new("k".into()));
        assert_eq!(
            service.proposals_url(signed().safe),
            "https://example.org/tx-service/sep/api/v1/safes/0x2222222222222222222222222222222222222222/multisig-transactions/"
        );
    }

    #[tokio::test]
    async fn test_propose_posts_authenticated_json() {
        let (base, server) = serve_once("201 Created", "").await;
        let service = SafeTransactionService::new(base, Zeroizing::new("secret-key".into()));
        service.propose(&signed()).await.unwrap();

        let request = server.await.unwrap();
        assert!(request.starts_with(
            "POST /api/v1/safes/0x2222222222222222222222222222222222222222/multisig-transactions/ "
        ));
        assert!(request.to_ascii_lowercase().contains("authorization: bearer secret-key"));
        assert!(request.contains("\"contractTransactionHash\""));
    }

    #[tokio::test]
    async fn test_rejection_body_is_verbatim() {
        let body = r#"{"nonFieldErrors":["Tx with safe-tx-hash=0xc78a already exists"]}"#;
        let (base, server) = serve_once("422 Unprocessable Entity", body).await;
        let service = SafeTransactionService::new(base, Zeroizing::new("k".into()));

        let err = service.propose(&signed()).await.unwrap_err();
        server.await.unwrap();
        match err {
            Error::RelayRejection { status, body: got } => {
                assert_eq!(status, 422);
                assert_eq!(got, body);
            }
            other => panic!("expected relay rejection, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unreachable_relay_is_network_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);

        let service = SafeTransactionService::new(base, Zeroizing::new("k".into()));
        assert!(matches!(
            service.propose(&signed()).await,
            Err(Error::Network(_))
        ));
    }
}
