//! The fixed device/app identification headers sent with every request.

use crate::config::ClientConfig;

pub const DEVICE_ID: &str = "device-id";
pub const PACKAGE_NAME: &str = "package-name";
pub const APP_TYPE: &str = "app-type";
pub const USER_AGENT: &str = "User-Agent";
pub const CONTENT_TYPE: &str = "Content-Type";
pub const ACCEPT: &str = "Accept";

pub const APPLICATION_JSON: &str = "application/json";

/// Build the header bundle for one request, in the order they are sent.
pub fn fixed_headers(device_id: &str, config: &ClientConfig) -> Vec<(String, String)> {
    [
        (DEVICE_ID, device_id),
        (PACKAGE_NAME, config.package_name.as_str()),
        (APP_TYPE, config.app_type.as_str()),
        (USER_AGENT, config.user_agent.as_str()),
        (CONTENT_TYPE, APPLICATION_JSON),
        (ACCEPT, APPLICATION_JSON),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}
