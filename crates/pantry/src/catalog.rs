use crate::config::{AuthState, CatalogLocation};
use crate::error::Error;
use crate::favorites::FavoritesRemote;
use pantry_core::recipe::{empty_catalog, normalize_favorites, parse_catalog, CatalogSnapshot};

/// Which collection a view filters over
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogSource {
    /// The static bulk catalog
    Static(CatalogLocation),
    /// The signed-in user's favorites collection
    Favorites,
}

/// Result of loading a catalog.
///
/// Filtering always has a snapshot to work with: anything but `Ready` filters
/// over an empty catalog.
#[derive(Debug, Clone)]
pub enum LoadState {
    Loading,
    Ready(CatalogSnapshot),
    Failed(String),
}

impl LoadState {
    pub fn snapshot(&self) -> CatalogSnapshot {
        match self {
            LoadState::Ready(snapshot) => snapshot.clone(),
            LoadState::Loading | LoadState::Failed(_) => empty_catalog(),
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            LoadState::Failed(message) => Some(message),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading)
    }

    fn from_result(result: Result<CatalogSnapshot, Error>, source: &str) -> Self {
        match result {
            Ok(snapshot) => {
                log::info!("loaded {} recipe(s) from {}", snapshot.len(), source);
                LoadState::Ready(snapshot)
            }
            Err(err) => {
                log::warn!("failed to load recipes from {}: {}", source, err);
                LoadState::Failed(err.to_string())
            }
        }
    }
}

/// Fetch and normalize the static catalog from a file or URL
pub async fn fetch_static(
    client: &reqwest::Client,
    location: &CatalogLocation,
) -> Result<CatalogSnapshot, Error> {
    let body = match location {
        CatalogLocation::File(path) => tokio::fs::read_to_string(path)
            .await
            .map_err(|e| Error::CatalogLoad(format!("{}: {}", path.display(), e)))?,
        CatalogLocation::Url(url) => {
            let response = client.get(url).send().await?;

            if !response.status().is_success() {
                return Err(Error::Status {
                    status: response.status().as_u16(),
                    body: response.text().await.unwrap_or_default(),
                });
            }

            response.text().await?
        }
    };

    Ok(parse_catalog(&body)?)
}

/// Load the static catalog into a [`LoadState`]
pub async fn load_static(client: &reqwest::Client, location: &CatalogLocation) -> LoadState {
    LoadState::from_result(fetch_static(client, location).await, &location.to_string())
}

/// Load the favorites collection into a [`LoadState`]
pub async fn load_favorites<R: FavoritesRemote + ?Sized>(remote: &R, auth: &AuthState) -> LoadState {
    let result = match auth.credential() {
        Some(credential) => remote.list(credential).await.map(normalize_favorites),
        None => Err(Error::Unauthorized),
    };
    LoadState::from_result(result, "favorites")
}

/// Load whichever collection `source` names
pub async fn load<R: FavoritesRemote + ?Sized>(
    source: &CatalogSource,
    client: &reqwest::Client,
    remote: &R,
    auth: &AuthState,
) -> LoadState {
    match source {
        CatalogSource::Static(location) => load_static(client, location).await,
        CatalogSource::Favorites => load_favorites(remote, auth).await,
    }
}
