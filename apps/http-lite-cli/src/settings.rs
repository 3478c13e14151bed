//! Layered client settings: defaults, then an optional YAML file, then
//! `HTTP_LITE_*` environment variables. Command-line flags are applied on
//! top by the caller.

use anyhow::{Context, Result};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use modkit_http_lite::{
    DEFAULT_MAX_BODY_SIZE, DEFAULT_MAX_REDIRECTS, EncodingPolicy, HttpClientBuilder,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

pub const ENV_PREFIX: &str = "HTTP_LITE_";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Overrides the default `User-Agent`
    pub user_agent: Option<String>,
    /// Client-wide redirect default; unset means redirects are not followed
    pub allow_redirects: Option<bool>,
    pub max_redirects: usize,
    pub max_body_size: usize,
    /// Per-hop timeout in seconds
    pub timeout_secs: u64,
    /// Accept responses without `Content-Encoding`
    pub allow_identity: bool,
    /// Extra default headers
    pub headers: BTreeMap<String, String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            user_agent: None,
            allow_redirects: None,
            max_redirects: DEFAULT_MAX_REDIRECTS,
            max_body_size: DEFAULT_MAX_BODY_SIZE,
            timeout_secs: 30,
            allow_identity: false,
            headers: BTreeMap::new(),
        }
    }
}

impl Settings {
    /// Load settings from defaults, `path` (if given) and the environment.
    ///
    /// # Errors
    /// Returns an error if the file does not exist or a layer fails to parse.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::new().merge(Serialized::defaults(Self::default()));

        if let Some(path) = path {
            if !path.is_file() {
                anyhow::bail!("config file does not exist: {}", path.display());
            }
            figment = figment.merge(Yaml::file(path));
        }

        figment
            .merge(Env::prefixed(ENV_PREFIX))
            .extract()
            .context("invalid http-lite configuration")
    }

    /// Translate the settings into a client builder.
    #[must_use]
    pub fn to_builder(&self) -> HttpClientBuilder {
        let mut builder = HttpClientBuilder::new()
            .max_redirects(self.max_redirects)
            .max_body_size(self.max_body_size)
            .timeout(Duration::from_secs(self.timeout_secs));

        if let Some(allow) = self.allow_redirects {
            builder = builder.allow_redirects(allow);
        }
        if let Some(user_agent) = &self.user_agent {
            builder = builder.user_agent(user_agent.clone());
        }
        if self.allow_identity {
            builder = builder.encoding_policy(EncodingPolicy::AllowIdentity);
        }
        for (name, value) in &self.headers {
            builder = builder.default_header(name.clone(), value.clone());
        }
        builder
    }
}
