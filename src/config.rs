//! Configuration for the desk client.
//!
//! The backend base address is resolved exactly once, when the client is
//! constructed, from whatever page origin the hosting context exposes.
//! An HTTP(S) origin is reduced to scheme, host and port so same-origin
//! deployments need no configuration; anything else resolves to
//! [`FALLBACK_BASE_URL`].

use std::env;
use std::path::PathBuf;

use url::Url;

use crate::error::DeskError;

/// Local development backend used when there is no usable page origin.
pub const FALLBACK_BASE_URL: &str = "http://127.0.0.1:8000";

/// Default location of the durable session file used by the binary host.
pub const DEFAULT_SESSION_FILE: &str = ".desklink-session.json";

/// Strategy for discovering the origin of the page hosting the client.
pub trait OriginSource {
    /// Returns the page origin, or `None` when there is no page context.
    fn page_origin(&self) -> Option<String>;
}

/// Execution without any page context (tests, CLIs, background tasks).
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPage;

impl OriginSource for NoPage {
    fn page_origin(&self) -> Option<String> {
        None
    }
}

/// An origin handed over by the hosting page.
#[derive(Debug, Clone, Default)]
pub struct PageOrigin {
    origin: Option<String>,
}

impl PageOrigin {
    /// Wraps the origin reported by the host, which may be absent.
    pub fn new(origin: Option<String>) -> Self {
        Self { origin }
    }
}

impl OriginSource for PageOrigin {
    fn page_origin(&self) -> Option<String> {
        self.origin.clone()
    }
}

/// Resolved client configuration. Immutable once built.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base address prefixed to every endpoint path.
    pub base_url: String,
}

impl Config {
    /// Resolves the base address from the given origin source.
    ///
    /// Never fails: a missing, unparsable or non-HTTP origin yields the
    /// local fallback. Any path or trailing slash is dropped, since
    /// endpoint paths are appended with their own leading slash.
    pub fn resolve(source: &dyn OriginSource) -> Self {
        let base_url = source
            .page_origin()
            .and_then(|origin| Self::http_origin(&origin))
            .unwrap_or_else(|| FALLBACK_BASE_URL.to_string());

        Config { base_url }
    }

    /// Uses a fixed base address, bypassing origin detection.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Config {
            base_url: base_url.into(),
        }
    }

    fn http_origin(origin: &str) -> Option<String> {
        let url = Url::parse(origin).ok()?;
        if matches!(url.scheme(), "http" | "https") && url.has_host() {
            Some(url.origin().ascii_serialization())
        } else {
            None
        }
    }
}

/// Host context for the `desklink` binary.
///
/// This is what the embedding process presents to the client: the page
/// origin it is serving from, and where the session survives restarts.
#[derive(Debug, Clone)]
pub struct HostConfig {
    /// Origin of the page the client runs in, if any.
    pub page_origin: Option<String>,

    /// File backing the durable session store.
    pub session_file: PathBuf,
}

impl HostConfig {
    /// Loads the host context from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `DESK_PAGE_ORIGIN`: origin of the hosting page (optional)
    /// - `DESK_SESSION_FILE`: session file path (default `.desklink-session.json`)
    ///
    /// # Errors
    ///
    /// Returns `DeskError::Config` if a variable is set but not valid unicode.
    pub fn from_env() -> Result<Self, DeskError> {
        let page_origin = Self::get_optional_env("DESK_PAGE_ORIGIN")?;
        let session_file = Self::get_optional_env("DESK_SESSION_FILE")?
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SESSION_FILE));

        Ok(HostConfig {
            page_origin,
            session_file,
        })
    }

    /// The origin source this host context provides to the client.
    pub fn origin_source(&self) -> PageOrigin {
        PageOrigin::new(self.page_origin.clone())
    }

    /// Gets an optional environment variable, treating empty values as unset.
    fn get_optional_env(name: &str) -> Result<Option<String>, DeskError> {
        match env::var(name) {
            Ok(value) if value.trim().is_empty() => Ok(None),
            Ok(value) => Ok(Some(value.trim().to_string())),
            Err(env::VarError::NotPresent) => Ok(None),
            Err(env::VarError::NotUnicode(_)) => Err(DeskError::invalid_config(format!(
                "{} is not valid unicode",
                name
            ))),
        }
    }
}
