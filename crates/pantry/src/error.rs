#[derive(thiserror::Error, Debug, Clone, serde::Deserialize, serde::Serialize)]
#[allow(clippy::enum_variant_names)]
pub enum Error {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Remote returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Not signed in. Set PANTRY_ACCESS_TOKEN or pass --token to use favorites")]
    Unauthorized,

    #[error("The favorites service rejected the access token (HTTP {0}). Check PANTRY_ACCESS_TOKEN or --token")]
    TokenRejected(u16),

    #[error("Failed to load catalog: {0}")]
    CatalogLoad(String),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Error::Decode(err.to_string())
        } else {
            Error::Network(err.to_string())
        }
    }
}

impl From<pantry_core::recipe::CatalogError> for Error {
    fn from(err: pantry_core::recipe::CatalogError) -> Self {
        Error::CatalogLoad(err.to_string())
    }
}
