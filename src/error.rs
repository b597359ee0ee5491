//! Error types for each external boundary and for the cart ledger.

use thiserror::Error;

/// Failure talking to the recipe assistant backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The request never produced a response.
    #[error("request to {endpoint} failed: {message}")]
    Transport {
        /// Endpoint path, e.g. `/api/chat`.
        endpoint: String,
        /// Underlying transport error.
        message: String,
    },

    /// The backend answered with a non-2xx status.
    #[error("{endpoint} returned HTTP {status}: {body}")]
    Status {
        /// Endpoint path.
        endpoint: String,
        /// HTTP status code.
        status: u16,
        /// Response body, for diagnostics.
        body: String,
    },

    /// The body could not be decoded into the expected shape.
    #[error("failed to decode {endpoint} response: {message}")]
    Decode {
        /// Endpoint path.
        endpoint: String,
        /// Decoder error.
        message: String,
    },
}

/// Failure acquiring a camera stream.
#[derive(Debug, Error)]
pub enum CameraError {
    /// The user or platform refused camera access.
    #[error("camera permission denied")]
    PermissionDenied,

    /// No usable video source.
    #[error("camera unavailable: {0}")]
    Unavailable(String),
}

/// Failure of the decoder boundary itself (not of a single decode).
#[derive(Debug, Error)]
pub enum DecoderError {
    /// The engine failed to load before reporting ready.
    #[error("decoder failed to start: {0}")]
    Startup(String),

    /// The worker stopped listening.
    #[error("decoder worker is gone")]
    WorkerGone,

    /// The worker sent a message that makes no sense at this point.
    #[error("unexpected decoder message: {0}")]
    Protocol(String),
}

/// Why a scan session could not enter the scanning state.
#[derive(Debug, Error)]
pub enum StartError {
    /// A session is already starting or scanning.
    #[error("a scan is already in progress")]
    Busy,

    /// The camera could not be opened.
    #[error(transparent)]
    Camera(#[from] CameraError),

    /// The decoder boundary did not come up.
    #[error(transparent)]
    Decoder(#[from] DecoderError),
}

/// A price string that cannot be read as an amount of money.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PriceError {
    /// Nothing but whitespace or a currency symbol.
    #[error("price is empty")]
    Empty,

    /// A minus sign in front of the amount.
    #[error("price is negative")]
    Negative,

    /// More than two fraction digits.
    #[error("price has sub-cent precision")]
    SubCent,

    /// Anything else that is not a decimal amount.
    #[error("price is not a decimal amount")]
    Malformed,

    /// Larger than the ledger can represent.
    #[error("price is too large")]
    Overflow,
}

/// Rejected cart operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// The product's price cannot be parsed, so it cannot be totalled.
    #[error("product {id} has an invalid price {price:?}: {source}")]
    InvalidPrice {
        /// Product identifier.
        id: String,
        /// The offending price string.
        price: String,
        /// Why parsing failed.
        source: PriceError,
    },

    /// The product is not on the current shopping list.
    #[error("no listed product with id {0}")]
    UnknownProduct(String),
}

/// Invalid configuration value.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A variable was set to something unparseable.
    #[error("invalid value for {key}: {value:?} ({reason})")]
    Invalid {
        /// Environment variable name.
        key: &'static str,
        /// Raw value.
        value: String,
        /// What was expected.
        reason: &'static str,
    },
}
