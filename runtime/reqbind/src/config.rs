//! Per-endpoint configuration.
//!
//! [`EndpointConfig::load`] layers, from lowest to highest priority:
//!
//! - the defaults;
//! - an optional YAML file;
//! - environment variables prefixed with `REQBIND_`, using `__` to separate nested keys
//!   (e.g. `REQBIND_BODY_SIZE_LIMIT__KIND=disabled`).
use std::path::Path;

use anyhow::Context;
use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};

use crate::request::body::BodySizeLimit;

/// How an [`Endpoint`](crate::pipeline::Endpoint) reads incoming requests.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    /// The maximum size of request bodies.
    ///
    /// Bodies are only read for request shapes that declare a body region.
    pub body_size_limit: BodySizeLimit,
    /// Reject bodies whose `Content-Type` isn't `application/json` (or `application/*+json`)
    /// with `415 Unsupported Media Type`.
    pub require_json_content_type: bool,
}

impl EndpointConfig {
    /// Load the configuration, optionally reading the YAML file at `path`.
    ///
    /// A missing file is not an error.
    pub fn load(path: Option<&Path>) -> Result<Self, errors::ConfigLoadError> {
        let mut figment = Figment::new();
        if let Some(path) = path {
            figment = figment.merge(Yaml::file(path));
        }
        figment = figment.merge(Env::prefixed("REQBIND_").split("__"));
        let config: Self = figment
            .extract()
            .context("Failed to load the endpoint configuration")
            .map_err(errors::ConfigLoadError)?;
        tracing::debug!(?config, "Loaded endpoint configuration");
        Ok(config)
    }
}

pub mod errors {
    #[derive(Debug, thiserror::Error)]
    #[error("Failed to load configuration")]
    pub struct ConfigLoadError(#[source] pub(super) anyhow::Error);
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use figment::Jail;
    use ubyte::ToByteUnit;

    use super::*;

    #[test]
    fn defaults() {
        let config = EndpointConfig::default();
        assert_eq!(
            config.body_size_limit,
            BodySizeLimit::Enabled {
                max_size: 2.megabytes()
            }
        );
        assert!(!config.require_json_content_type);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        Jail::expect_with(|_jail| {
            let config = EndpointConfig::load(Some(Path::new("missing.yml"))).unwrap();
            assert_eq!(config, EndpointConfig::default());
            Ok(())
        });
    }

    #[test]
    fn file_and_environment_are_layered() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "reqbind.yml",
                "body_size_limit:\n  kind: enabled\n  max_size: 1024\nrequire_json_content_type: false\n",
            )?;
            jail.set_env("REQBIND_REQUIRE_JSON_CONTENT_TYPE", "true");

            let config = EndpointConfig::load(Some(Path::new("reqbind.yml"))).unwrap();
            assert_eq!(
                config.body_size_limit,
                BodySizeLimit::Enabled {
                    max_size: 1024.bytes()
                }
            );
            assert!(config.require_json_content_type);
            Ok(())
        });
    }

    #[test]
    fn limits_can_be_disabled_from_the_environment() {
        Jail::expect_with(|jail| {
            jail.set_env("REQBIND_BODY_SIZE_LIMIT__KIND", "disabled");
            let config = EndpointConfig::load(None).unwrap();
            assert_eq!(config.body_size_limit, BodySizeLimit::Disabled);
            Ok(())
        });
    }
}
