use crate::prelude::*;
use std::path::PathBuf;

/// Bearer credential for the favorites store. `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Blank tokens are treated as no credential at all
    pub fn new(token: impl Into<String>) -> Option<Self> {
        let token = token.into();
        if token.trim().is_empty() {
            None
        } else {
            Some(Self(token.trim().to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Credential(***)")
    }
}

/// Whether a user is signed in. Passed explicitly to everything that gates
/// on it; nothing looks the credential up on its own.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthState {
    credential: Option<Credential>,
}

impl AuthState {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn signed_in(credential: Credential) -> Self {
        Self {
            credential: Some(credential),
        }
    }

    pub fn credential(&self) -> Option<&Credential> {
        self.credential.as_ref()
    }

    pub fn is_signed_in(&self) -> bool {
        self.credential.is_some()
    }
}

/// Where the static recipe catalog lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogLocation {
    File(PathBuf),
    Url(String),
}

impl CatalogLocation {
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value.starts_with("http://") || value.starts_with("https://") {
            CatalogLocation::Url(value.to_string())
        } else {
            CatalogLocation::File(PathBuf::from(value))
        }
    }
}

impl std::fmt::Display for CatalogLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogLocation::File(path) => write!(f, "{}", path.display()),
            CatalogLocation::Url(url) => f.write_str(url),
        }
    }
}

/// Pantry configuration from environment variables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PantryConfig {
    pub api_base_url: String,
    pub access_token: Option<String>,
    pub catalog: String,
    pub page_size: usize,
}

impl PantryConfig {
    pub const DEFAULT_API_BASE_URL: &'static str = "https://supe-cook-backend.vercel.app";
    pub const DEFAULT_CATALOG: &'static str = "recipes.json";
    pub const DEFAULT_PAGE_SIZE: usize = 20;

    /// Load configuration from environment variables
    ///
    /// Uses PANTRY_API_BASE_URL, PANTRY_CATALOG and PANTRY_PAGE_SIZE with
    /// defaults, and PANTRY_ACCESS_TOKEN when set.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let page_size = match lookup("PANTRY_PAGE_SIZE") {
            Some(raw) => parse_page_size(&raw)?,
            None => Self::DEFAULT_PAGE_SIZE,
        };

        Ok(Self {
            api_base_url: lookup("PANTRY_API_BASE_URL")
                .unwrap_or_else(|| Self::DEFAULT_API_BASE_URL.to_string()),
            access_token: lookup("PANTRY_ACCESS_TOKEN").filter(|t| !t.trim().is_empty()),
            catalog: lookup("PANTRY_CATALOG").unwrap_or_else(|| Self::DEFAULT_CATALOG.to_string()),
            page_size,
        })
    }

    /// Apply CLI overrides to the configuration
    pub fn with_overrides(
        mut self,
        api_base_url: Option<String>,
        access_token: Option<String>,
        catalog: Option<String>,
    ) -> Self {
        if let Some(url) = api_base_url {
            self.api_base_url = url;
        }
        if let Some(token) = access_token {
            self.access_token = Some(token);
        }
        if let Some(catalog) = catalog {
            self.catalog = catalog;
        }
        self
    }

    pub fn auth(&self) -> AuthState {
        match self.access_token.as_deref().and_then(Credential::new) {
            Some(credential) => AuthState::signed_in(credential),
            None => AuthState::anonymous(),
        }
    }

    pub fn catalog_location(&self) -> CatalogLocation {
        CatalogLocation::parse(&self.catalog)
    }

    /// Load the configuration and apply the global CLI flags
    pub fn resolve(global: &crate::Global) -> Result<Self> {
        Ok(Self::from_env()?.with_overrides(
            global.api_url.clone(),
            global.token.clone(),
            global.catalog.clone(),
        ))
    }
}

fn parse_page_size(raw: &str) -> Result<usize> {
    let size = raw
        .trim()
        .parse::<usize>()
        .wrap_err("PANTRY_PAGE_SIZE must be a positive number")?;

    if size == 0 {
        return Err(eyre!("PANTRY_PAGE_SIZE must be at least 1"));
    }

    Ok(size)
}
