mod alchemy;

pub use alchemy::{AlchemyClient, RawTokenBalance, TokenBalancesPage, TokenMetadataResponse};
use alloy_provider::{Provider, ProviderBuilder};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    /// Error parsing or validating URLs
    #[error("Invalid RPC URL: {0}")]
    InvalidUrl(String),

    /// Error connecting to the endpoint
    #[error("Connection error: {0}")]
    Connection(String),

    /// Endpoint answered with a non-success HTTP status
    #[error("Endpoint returned {status}: {body}")]
    Http { status: u16, body: String },

    /// Endpoint answered with a JSON-RPC error object
    #[error("JSON-RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// Response could not be decoded
    #[error("Malformed response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Connection(err.to_string())
        }
    }
}

/// Convenience function to create an ethereum rpc provider from url.
pub async fn create_provider(
    rpc_url: &str,
) -> Result<impl Provider + Clone + 'static, ClientError> {
    let url = rpc_url
        .parse()
        .map_err(|e| ClientError::InvalidUrl(format!("{}", e)))?;
    let provider = ProviderBuilder::new().connect_http(url);

    Ok(provider)
}
