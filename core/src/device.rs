//! Per-install device identity.

use uuid::Uuid;

/// Supplies the stable identifier sent in the `device-id` header.
pub trait DeviceIdentity: Send + Sync {
    fn device_id(&self) -> String;
}

/// A fixed identifier, either supplied by the host platform or generated
/// once for this install.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallId(String);

impl InstallId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh random identifier, upper-case hyphenated like the
    /// vendor identifiers mobile platforms hand out.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().hyphenated().to_string().to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl DeviceIdentity for InstallId {
    fn device_id(&self) -> String {
        self.0.clone()
    }
}
