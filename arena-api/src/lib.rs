//! Minimal client for the fighter arena character API.
//!
//! This crate provides a focused client for the remote service that owns
//! accounts, fighters and their images:
//! - Account registration
//! - Character listing, lookup, creation, update and deletion
//! - Bearer token storage between runs

mod token;

pub use token::TokenStore;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{multipart, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use url::{Host, Url};

const DEFAULT_BASE_URL: &str = "https://127.0.0.1:8000";

/// Lowest value a user-created stat may take.
pub const STAT_MIN: u32 = 0;
/// Highest value a user-created stat may take.
pub const STAT_MAX: u32 = 100;
/// Starting value of every stat on a fresh character form.
pub const DEFAULT_STAT: u32 = 50;

/// Errors that can occur when talking to the arena API.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("No bearer token configured")]
    NoToken,

    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Invalid character: {0}")]
    Form(#[from] FormError),
}

/// Validation failures for a character form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("name must not be empty")]
    EmptyName,

    #[error("{stat} must be between 0 and 100, got {value}")]
    StatOutOfRange { stat: &'static str, value: u32 },
}

/// Connection settings for [`ArenaApi`].
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL without the `/api` suffix, e.g. `https://127.0.0.1:8000`.
    pub base_url: String,
    pub timeout: Duration,
    pub connect_timeout: Duration,
    /// Accept self-signed certificates. On by default for loopback hosts,
    /// where the API is usually served with a development certificate.
    pub accept_invalid_certs: bool,
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let accept_invalid_certs = is_loopback(&base_url);
        Self {
            base_url,
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            accept_invalid_certs,
        }
    }

    /// Read `ARENA_API_URL` and `ARENA_API_INSECURE` from the environment.
    pub fn from_env() -> Self {
        let base_url =
            std::env::var("ARENA_API_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let mut config = Self::new(base_url);
        if let Ok(value) = std::env::var("ARENA_API_INSECURE") {
            config.accept_invalid_certs = parse_flag(&value);
        }
        config
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

/// Interpret an environment flag such as `1`, `true` or `yes`.
pub fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn is_loopback(base_url: &str) -> bool {
    match Url::parse(base_url).ok().as_ref().and_then(Url::host) {
        Some(Host::Domain(domain)) => domain.eq_ignore_ascii_case("localhost"),
        Some(Host::Ipv4(ip)) => ip.is_loopback(),
        Some(Host::Ipv6(ip)) => ip.is_loopback(),
        None => false,
    }
}

/// Arena API client.
#[derive(Clone)]
pub struct ArenaApi {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ArenaApi {
    /// Create a client from explicit configuration.
    pub fn new(config: ApiConfig) -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url,
            token: None,
        })
    }

    /// Create a client configured from the environment.
    pub fn from_env() -> Result<Self, Error> {
        Self::new(ApiConfig::from_env())
    }

    /// Attach a bearer token to every authenticated request.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full URL of an `/api/...` endpoint.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/api/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Register a new account. The response body is returned untouched.
    pub async fn register(&self, registration: &Registration) -> Result<serde_json::Value, Error> {
        let request = self
            .client
            .post(self.endpoint("register"))
            .json(registration);
        self.send_json(request).await
    }

    /// List the fighters owned by the authenticated user.
    pub async fn list_characters(&self) -> Result<Vec<Character>, Error> {
        let request = self.authorized(Method::GET, "characters")?;
        self.send_json(request).await
    }

    /// Fetch a single fighter record.
    pub async fn get_character(&self, id: u64) -> Result<Character, Error> {
        let request = self.authorized(Method::GET, &format!("characters/{id}"))?;
        self.send_json(request).await
    }

    pub async fn create_character(&self, form: &CharacterForm) -> Result<Character, Error> {
        form.validate()?;
        let request = self
            .authorized(Method::POST, "characters")?
            .multipart(form.to_multipart()?);
        self.send_json(request).await
    }

    /// Update a fighter. The API accepts updates as a multipart POST.
    pub async fn update_character(&self, id: u64, form: &CharacterForm) -> Result<Character, Error> {
        form.validate()?;
        let request = self
            .authorized(Method::POST, &format!("characters/{id}"))?
            .multipart(form.to_multipart()?);
        self.send_json(request).await
    }

    pub async fn delete_character(&self, id: u64) -> Result<(), Error> {
        let request = self.authorized(Method::DELETE, &format!("characters/{id}"))?;
        self.send(request).await.map(|_| ())
    }

    /// Resolve a fighter's image to an absolute URL.
    pub fn image_url(&self, character: &Character) -> Option<String> {
        let image = character.image.as_deref()?.trim();
        if image.is_empty() {
            None
        } else if Url::parse(image).is_ok_and(|url| url.has_host()) {
            Some(image.to_string())
        } else {
            Some(format!("{}/{}", self.base_url, image.trim_start_matches('/')))
        }
    }

    fn authorized(&self, method: Method, path: &str) -> Result<RequestBuilder, Error> {
        let token = self.token.as_deref().ok_or(Error::NoToken)?;
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|e| Error::Config(format!("Invalid token: {e}")))?,
        );
        Ok(self
            .client
            .request(method, self.endpoint(path))
            .headers(headers))
    }

    async fn send(&self, request: RequestBuilder) -> Result<reqwest::Response, Error> {
        let response = request
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            tracing::warn!(url = %response.url(), "request rejected as unauthenticated");
            return Err(Error::NotAuthenticated);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Api {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        tracing::debug!(url = %response.url(), status = status.as_u16(), "api request succeeded");
        Ok(response)
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, Error> {
        let response = self.send(request).await?;
        response
            .json()
            .await
            .map_err(|e| Error::Parse(e.to_string()))
    }
}

/// Pull the `error` field out of an API error body, falling back to the raw text.
fn error_message(body: &str) -> String {
    serde_json::from_str::<ApiErrorBody>(body)
        .ok()
        .and_then(|b| b.error)
        .unwrap_or_else(|| body.to_string())
}

// ============================================================================
// Public types
// ============================================================================

/// A persisted fighter as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    pub id: u64,
    pub name: String,
    pub strength: u32,
    pub speed: u32,
    pub durability: u32,
    pub power: u32,
    pub combat: u32,
    #[serde(default)]
    pub user: Option<u64>,
    #[serde(default)]
    pub image: Option<String>,
}

/// Payload for account registration.
#[derive(Debug, Clone, Serialize)]
pub struct Registration {
    pub email: String,
    pub pseudo: String,
    pub password: String,
}

impl Registration {
    pub fn new(
        email: impl Into<String>,
        pseudo: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            pseudo: pseudo.into(),
            password: password.into(),
        }
    }
}

/// An image file attached to a character form.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// Create/edit payload for a fighter.
#[derive(Debug, Clone)]
pub struct CharacterForm {
    pub name: String,
    pub strength: u32,
    pub speed: u32,
    pub durability: u32,
    pub power: u32,
    pub combat: u32,
    pub image: Option<ImageUpload>,
}

impl CharacterForm {
    /// A blank form with every stat at its default.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            strength: DEFAULT_STAT,
            speed: DEFAULT_STAT,
            durability: DEFAULT_STAT,
            power: DEFAULT_STAT,
            combat: DEFAULT_STAT,
            image: None,
        }
    }

    /// Prefill a form from an existing fighter.
    pub fn from_character(character: &Character) -> Self {
        Self {
            name: character.name.clone(),
            strength: character.strength,
            speed: character.speed,
            durability: character.durability,
            power: character.power,
            combat: character.combat,
            image: None,
        }
    }

    pub fn with_image(mut self, image: ImageUpload) -> Self {
        self.image = Some(image);
        self
    }

    /// Stats in display order, paired with their field names.
    pub fn stats(&self) -> [(&'static str, u32); 5] {
        [
            ("strength", self.strength),
            ("speed", self.speed),
            ("durability", self.durability),
            ("power", self.power),
            ("combat", self.combat),
        ]
    }

    pub fn validate(&self) -> Result<(), FormError> {
        if self.name.trim().is_empty() {
            return Err(FormError::EmptyName);
        }
        for (stat, value) in self.stats() {
            if !(STAT_MIN..=STAT_MAX).contains(&value) {
                return Err(FormError::StatOutOfRange { stat, value });
            }
        }
        Ok(())
    }

    fn to_multipart(&self) -> Result<multipart::Form, Error> {
        let mut form = multipart::Form::new().text("name", self.name.trim().to_string());
        for (stat, value) in self.stats() {
            form = form.text(stat, value.to_string());
        }

        if let Some(image) = &self.image {
            let part = multipart::Part::bytes(image.bytes.clone())
                .file_name(image.file_name.clone())
                .mime_str(&image.mime_type)
                .map_err(|e| Error::Config(format!("Invalid image type: {e}")))?;
            form = form.part("image", part);
        }

        Ok(form)
    }
}

// ============================================================================
// Internal API types
// ============================================================================

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    error: Option<String>,
}
