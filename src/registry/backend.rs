//! Backend identity.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::BackendConfig;
use crate::registry::RegistryError;

/// Immutable description of one remote service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendDescriptor {
    /// Unique key.
    pub name: String,
    /// Base URL every probe and call is built from.
    pub endpoint: Url,
    /// Counts towards the aggregate rollup as a required service.
    pub critical: bool,
}

impl BackendDescriptor {
    pub fn new(name: impl Into<String>, endpoint: Url, critical: bool) -> Self {
        Self {
            name: name.into(),
            endpoint,
            critical,
        }
    }
}

impl TryFrom<&BackendConfig> for BackendDescriptor {
    type Error = RegistryError;

    fn try_from(config: &BackendConfig) -> Result<Self, Self::Error> {
        let endpoint = Url::parse(&config.endpoint).map_err(|e| RegistryError::InvalidEndpoint {
            name: config.name.clone(),
            reason: e.to_string(),
        })?;
        Ok(Self::new(config.name.clone(), endpoint, config.critical))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config() {
        let config = BackendConfig {
            name: "github".into(),
            endpoint: "http://localhost:3102".into(),
            critical: true,
        };
        let descriptor = BackendDescriptor::try_from(&config).unwrap();
        assert_eq!(descriptor.name, "github");
        assert_eq!(descriptor.endpoint.port(), Some(3102));
        assert!(descriptor.critical);
    }

    #[test]
    fn test_from_config_bad_endpoint() {
        let config = BackendConfig {
            name: "github".into(),
            endpoint: "not a url".into(),
            critical: false,
        };
        assert!(matches!(
            BackendDescriptor::try_from(&config),
            Err(RegistryError::InvalidEndpoint { .. })
        ));
    }
}
