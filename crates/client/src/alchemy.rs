//! Alchemy token API client.
//!
//! Speaks the `alchemy_getTokenBalances` and `alchemy_getTokenMetadata`
//! JSON-RPC methods over HTTP. The endpoint URL embeds the API key, so it is
//! never logged.

use crate::ClientError;
use alloy_primitives::Address;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Value};
use std::{
    fmt,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};
use tracing::debug;

/// Client for the Alchemy token API.
///
/// # Example
///
/// ```ignore
/// let client = AlchemyClient::new(network.alchemy_url(&api_key));
/// let page = client.get_token_balances(owner, None).await?;
/// let metadata = client.get_token_metadata(page.token_balances[0].contract_address).await?;
/// ```
#[derive(Clone)]
pub struct AlchemyClient {
    client: reqwest::Client,
    url: String,
    next_id: Arc<AtomicU64>,
}

impl fmt::Debug for AlchemyClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlchemyClient")
            .field("url", &"<redacted>")
            .finish_non_exhaustive()
    }
}

impl AlchemyClient {
    /// Creates a new client for the given endpoint (including the API key).
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), url)
    }

    /// Creates a new client with a custom HTTP client.
    pub fn with_client(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Fetches one page of ERC20 balances held by `owner`.
    ///
    /// Pass the `page_key` of the previous page to continue; the returned
    /// page carries the key of the next one, if any.
    pub async fn get_token_balances(
        &self,
        owner: Address,
        page_key: Option<&str>,
    ) -> Result<TokenBalancesPage, ClientError> {
        let params = match page_key {
            Some(key) => json!([owner, "erc20", { "pageKey": key }]),
            None => json!([owner, "erc20"]),
        };

        self.call("alchemy_getTokenBalances", params).await
    }

    /// Fetches metadata for a token contract.
    pub async fn get_token_metadata(
        &self,
        contract: Address,
    ) -> Result<TokenMetadataResponse, ClientError> {
        self.call("alchemy_getTokenMetadata", json!([contract]))
            .await
    }

    async fn call<R: DeserializeOwned>(
        &self,
        method: &'static str,
        params: Value,
    ) -> Result<R, ClientError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            method,
            params,
            id,
        };

        debug!(method, id, "Sending token API request");

        let response = self.client.post(&self.url).json(&request).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown".to_string());
            return Err(ClientError::Http { status, body });
        }

        let rpc_response: JsonRpcResponse<R> = response.json().await?;
        rpc_response.into_result()
    }
}

#[derive(Debug, Serialize)]
struct JsonRpcRequest {
    jsonrpc: &'static str,
    method: &'static str,
    params: Value,
    id: u64,
}

#[derive(Debug, Deserialize)]
struct JsonRpcResponse<T> {
    result: Option<T>,
    error: Option<JsonRpcError>,
}

impl<T> JsonRpcResponse<T> {
    fn into_result(self) -> Result<T, ClientError> {
        match (self.result, self.error) {
            (_, Some(error)) => Err(ClientError::Rpc {
                code: error.code,
                message: error.message,
            }),
            (Some(result), None) => Ok(result),
            (None, None) => Err(ClientError::Decode(
                "response has neither result nor error".to_string(),
            )),
        }
    }
}

#[derive(Debug, Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
}

/// One page of `alchemy_getTokenBalances`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenBalancesPage {
    /// Owner the balances were queried for
    pub address: Address,
    /// Balance entries in service order
    pub token_balances: Vec<RawTokenBalance>,
    /// Continuation key, present when more pages exist
    #[serde(default)]
    pub page_key: Option<String>,
}

/// A balance entry as returned by the service.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTokenBalance {
    /// Token contract address
    pub contract_address: Address,
    /// Integer-encoded balance (hex with `0x` prefix), absent on per-entry error
    #[serde(default)]
    pub token_balance: Option<String>,
    /// Per-entry error reported by the service
    #[serde(default)]
    pub error: Option<String>,
}

/// Response of `alchemy_getTokenMetadata`. Every field may be absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenMetadataResponse {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub decimals: Option<u8>,
    #[serde(default)]
    pub logo: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    #[test]
    fn test_debug_redacts_url() {
        let client = AlchemyClient::new("https://eth-sepolia.g.alchemy.com/v2/secret");
        let debug = format!("{client:?}");
        assert!(!debug.contains("secret"));
    }

    #[test]
    fn test_decode_balances_page() {
        let body = r#"{
            "jsonrpc": "2.0",
            "id": 1,
            "result": {
                "address": "0x5cffa347b0ae99cc01e5c01714ca5658e54a23d1",
                "tokenBalances": [
                    {
                        "contractAddress": "0x1f9840a85d5af5bf1d1762f925bdaddc4201f984",
                        "tokenBalance": "0x0000000000000000000000000000000000000000000000000de0b6b3a7640000"
                    },
                    {
                        "contractAddress": "0x6b175474e89094c44da98b954eedeac495271d0f",
                        "tokenBalance": null,
                        "error": "execution reverted"
                    }
                ],
                "pageKey": "0x6b17"
            }
        }"#;

        let response: JsonRpcResponse<TokenBalancesPage> = serde_json::from_str(body).unwrap();
        let page = response.into_result().unwrap();

        assert_eq!(
            page.address,
            address!("5CFFA347b0aE99cc01E5c01714cA5658e54a23D1")
        );
        assert_eq!(page.token_balances.len(), 2);
        assert!(page.token_balances[0].token_balance.is_some());
        assert!(page.token_balances[1].token_balance.is_none());
        assert_eq!(page.page_key.as_deref(), Some("0x6b17"));
    }

    #[test]
    fn test_decode_metadata_with_nulls() {
        let body = r#"{
            "jsonrpc": "2.0",
            "id": 2,
            "result": { "name": null, "symbol": "UNI", "decimals": 18, "logo": null }
        }"#;

        let response: JsonRpcResponse<TokenMetadataResponse> = serde_json::from_str(body).unwrap();
        let metadata = response.into_result().unwrap();

        assert_eq!(metadata.symbol.as_deref(), Some("UNI"));
        assert_eq!(metadata.decimals, Some(18));
        assert!(metadata.name.is_none());
        assert!(metadata.logo.is_none());
    }

    #[test]
    fn test_rpc_error_is_surfaced() {
        let body = r#"{
            "jsonrpc": "2.0",
            "id": 3,
            "error": { "code": -32602, "message": "invalid address" }
        }"#;

        let response: JsonRpcResponse<TokenMetadataResponse> = serde_json::from_str(body).unwrap();
        match response.into_result() {
            Err(ClientError::Rpc { code, message }) => {
                assert_eq!(code, -32602);
                assert_eq!(message, "invalid address");
            }
            other => panic!("expected rpc error, got {other:?}"),
        }
    }

    #[test]
    fn test_request_serialization() {
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            method: "alchemy_getTokenBalances",
            params: json!([address!("5CFFA347b0aE99cc01E5c01714cA5658e54a23D1"), "erc20"]),
            id: 7,
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["method"], "alchemy_getTokenBalances");
        assert_eq!(value["params"][1], "erc20");
        assert_eq!(value["id"], 7);
    }
}
