//! Controller configuration.
//!
//! # Design
//! Everything that used to be process-wide (the base URL) or hard-coded into
//! the request builder (package name, app type, user agent) lives in one
//! `ClientConfig` owned by the controller instance. Each field falls back to
//! its default when absent from JSON, so a host can ship a config containing
//! only `base_url`.

use serde::{Deserialize, Serialize};

use crate::error::Result;

pub const DEFAULT_PACKAGE_NAME: &str = "vn.giaohanggiare.customer";
pub const DEFAULT_APP_TYPE: &str = "user";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 9_3 like Mac OS X) \
AppleWebKit/601.1.46 (KHTML, like Gecko) Version/9.0 Mobile/13E188a Safari/601.1";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Host and path prefix; endpoints are appended to it verbatim.
    pub base_url: String,
    pub package_name: String,
    pub app_type: String,
    pub user_agent: String,
    /// Whole-request timeout for the reqwest transport. `None` keeps the
    /// library default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            package_name: DEFAULT_PACKAGE_NAME.to_string(),
            app_type: DEFAULT_APP_TYPE.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: None,
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            ..Self::default()
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Join the base URL and an endpoint path. A slash present on both sides
    /// of the seam is collapsed to one; otherwise the two are concatenated.
    pub fn endpoint_url(&self, endpoint: &str) -> String {
        match (self.base_url.ends_with('/'), endpoint.strip_prefix('/')) {
            (true, Some(rest)) => format!("{}{rest}", self.base_url),
            _ => format!("{}{endpoint}", self.base_url),
        }
    }
}
