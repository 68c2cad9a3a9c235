use thiserror::Error;

/// Errors raised while resolving prices from the market price provider.
///
/// Any of these aborts the operation that needed the prices. An individual
/// asset without a price is not an error.
#[derive(Error, Debug)]
pub enum MarketDataError {
    /// The provider failed to answer.
    #[error("Provider error: {provider} - {message}")]
    ProviderError { provider: String, message: String },

    /// The lookup did not finish within the configured timeout (milliseconds).
    #[error("Price lookup timed out after {0} ms")]
    Timeout(u64),
}
