//! Read-only chain access: on-chain configuration lookups and the Safe nonce.

use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::SolCall;
use async_trait::async_trait;
use ethers::{
    providers::{Http, Middleware, Provider},
    types::{transaction::eip2718::TypedTransaction, TransactionRequest, H160},
};

use crate::{
    abi::ISafe,
    config::RPC_URL,
    error::{Error, Result},
};

/// Request/response view of a chain. Calls are `eth_call` against the latest block.
#[async_trait]
pub trait ChainReader: Send + Sync {
    async fn chain_id(&self) -> Result<u64>;

    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes>;
}

/// JSON-RPC backed [`ChainReader`].
#[derive(Clone, Debug)]
pub struct ChainClient {
    provider: Provider<Http>,
}

impl ChainClient {
    /// Parse the endpoint. No request is made until the first read.
    pub fn connect(rpc_url: &str) -> Result<Self> {
        let provider = Provider::<Http>::try_from(rpc_url).map_err(|e| Error::InvalidConfig {
            name: RPC_URL,
            reason: e.to_string(),
        })?;
        Ok(Self { provider })
    }
}

#[async_trait]
impl ChainReader for ChainClient {
    async fn chain_id(&self) -> Result<u64> {
        let id = self
            .provider
            .get_chainid()
            .await
            .map_err(|e| Error::Network(format!("eth_chainId: {e}")))?;
        u64::try_from(id).map_err(|_| Error::Network(format!("eth_chainId out of range: {id}")))
    }

    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes> {
        let tx: TypedTransaction = TransactionRequest::new()
            .to(H160::from_slice(to.as_slice()))
            .data(data.to_vec())
            .into();
        let out = self
            .provider
            .call(&tx, None)
            .await
            .map_err(|e| Error::Network(format!("eth_call to {to}: {e}")))?;
        Ok(Bytes::from(out.to_vec()))
    }
}

/// Execute a typed view call and decode its return values.
pub async fn read_call<R, C>(reader: &R, to: Address, call: &C) -> Result<C::Return>
where
    R: ChainReader + ?Sized,
    C: SolCall,
{
    let out = reader.call(to, call.abi_encode().into()).await?;
    C::abi_decode_returns(&out, true).map_err(|e| Error::Contract {
        function: C::SIGNATURE,
        reason: e.to_string(),
    })
}

/// The Safe's current nonce, i.e. the nonce the next executed transaction must carry.
pub async fn safe_nonce<R: ChainReader + ?Sized>(reader: &R, safe: Address) -> Result<U256> {
    Ok(read_call(reader, safe, &ISafe::nonceCall {}).await?._0)
}

/// Refuse to continue when the RPC endpoint serves a different chain than the one configured.
pub async fn ensure_chain_id<R: ChainReader + ?Sized>(reader: &R, configured: u64) -> Result<()> {
    let rpc = reader.chain_id().await?;
    if rpc != configured {
        return Err(Error::ChainIdMismatch { configured, rpc });
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod mock {
    use std::{collections::HashMap, sync::Mutex};

    use super::*;

    /// Canned responses keyed by `(to, calldata)`.
    #[derive(Default)]
    pub struct MockChain {
        pub chain_id: u64,
        pub responses: HashMap<(Address, Vec<u8>), Vec<u8>>,
        pub calls: Mutex<Vec<(Address, Vec<u8>)>>,
    }

    impl MockChain {
        pub fn new(chain_id: u64) -> Self {
            Self {
                chain_id,
                ..Default::default()
            }
        }

        pub fn respond<C: SolCall>(mut self, to: Address, call: &C, ret: Vec<u8>) -> Self {
            self.responses.insert((to, call.abi_encode()), ret);
            self
        }
    }

    #[async_trait]
    impl ChainReader for MockChain {
        async fn chain_id(&self) -> Result<u64> {
            Ok(self.chain_id)
        }

        async fn call(&self, to: Address, data: Bytes) -> Result<Bytes> {
            self.calls.lock().unwrap().push((to, data.to_vec()));
            self.responses
                .get(&(to, data.to_vec()))
                .cloned()
                .map(Bytes::from)
                .ok_or_else(|| Error::Network(format!("no canned response for {to}")))
        }
    }
}
