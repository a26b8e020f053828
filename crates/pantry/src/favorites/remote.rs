use crate::config::Credential;
use crate::error::Error;
use async_trait::async_trait;
use pantry_core::recipe::FavoriteRecord;

/// The remote favorites collection.
///
/// Adds are not idempotent on the remote side; callers must avoid issuing a
/// second add for a title that is already stored.
#[async_trait]
pub trait FavoritesRemote: Send + Sync {
    /// Fetch the user's current favorites
    async fn list(&self, credential: &Credential) -> Result<Vec<FavoriteRecord>, Error>;

    /// Store one recipe
    async fn add(&self, credential: &Credential, record: &FavoriteRecord) -> Result<(), Error>;

    /// Delete by exact title
    async fn remove(&self, credential: &Credential, title: &str) -> Result<(), Error>;
}

/// HTTP implementation against the recipe backend
#[derive(Debug, Clone)]
pub struct HttpFavorites {
    client: reqwest::Client,
    base_url: String,
}

impl HttpFavorites {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn list_url(&self) -> String {
        format!("{}/get_recipes/", self.base_url)
    }

    pub fn add_url(&self) -> String {
        format!("{}/recipes/", self.base_url)
    }

    pub fn remove_url(&self, title: &str) -> String {
        format!(
            "{}/delete_recipes/?title={}",
            self.base_url,
            urlencoding::encode(title)
        )
    }
}

/// Map a non-success response to an error, keeping the body for context
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, Error> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    Err(status_error(
        status,
        response.text().await.unwrap_or_default(),
    ))
}

fn status_error(status: reqwest::StatusCode, body: String) -> Error {
    match status {
        reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN => {
            Error::TokenRejected(status.as_u16())
        }
        _ => Error::Status {
            status: status.as_u16(),
            body,
        },
    }
}

#[async_trait]
impl FavoritesRemote for HttpFavorites {
    async fn list(&self, credential: &Credential) -> Result<Vec<FavoriteRecord>, Error> {
        let response = self
            .client
            .get(self.list_url())
            .bearer_auth(credential.as_str())
            .send()
            .await?;

        let records = check_status(response)
            .await?
            .json::<Vec<FavoriteRecord>>()
            .await
            .map_err(|e| Error::Decode(e.to_string()))?;

        log::debug!("fetched {} favorite(s)", records.len());
        Ok(records)
    }

    async fn add(&self, credential: &Credential, record: &FavoriteRecord) -> Result<(), Error> {
        let response = self
            .client
            .post(self.add_url())
            .bearer_auth(credential.as_str())
            .json(record)
            .send()
            .await?;

        check_status(response).await?;
        Ok(())
    }

    async fn remove(&self, credential: &Credential, title: &str) -> Result<(), Error> {
        let response = self
            .client
            .delete(self.remove_url(title))
            .bearer_auth(credential.as_str())
            .send()
            .await?;

        check_status(response).await?;
        Ok(())
    }
}
