use crate::config::ClientConfigError;

/// How the remote cart differs from the list of items the caller expected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartDiscrepancy {
    /// The cart holds a different number of rows than expected.
    CountMismatch { expected: usize, found: usize },
    /// An expected app is not (or not often enough) present in the cart.
    NotFound { app_id: u32 },
}

impl std::fmt::Display for CartDiscrepancy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CartDiscrepancy::CountMismatch { expected, found } => {
                write!(f, "carts don't match: expected {expected} items, found {found}")
            }
            CartDiscrepancy::NotFound { app_id } => write!(f, "not found in cart: app {app_id}"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GiftError {
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Not logged in")]
    NotAuthenticated,

    #[error("HTTP error {code}")]
    Http { code: u16 },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("No shopping cart cookie present")]
    CartMissing,

    #[error("Cart mismatch: {0}")]
    CartMismatch(CartDiscrepancy),

    #[error("Protocol violation: {0}")]
    ProtocolViolation(String),

    #[error("Rejected by storefront: {detail} ({code})")]
    DomainRejected { code: i32, detail: String },

    #[error("Invalid Steam ID: {0}")]
    InvalidSteamId(String),

    #[error("Invalid cookie: {0}")]
    InvalidCookie(String),

    #[error("Invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Invalid configuration: {0}")]
    Config(#[from] ClientConfigError),
}

impl GiftError {
    /// Only transport failures may succeed when the same call is repeated.
    pub fn is_retryable(&self) -> bool {
        matches!(self, GiftError::Transport(_))
    }
}
