use std::{env, fmt, str::FromStr};

use anyhow::{anyhow, bail};
use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue},
    Url,
};
use tracing::info;

use crate::transport::HttpTransport;

pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8000/graphql";

/// Environment variable overriding [`DEFAULT_ENDPOINT`].
pub const ENDPOINT_ENV: &str = "ZKOOL_ENDPOINT";

/// The GraphQL endpoint of a wallet backend.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Endpoint {
    url: Url,
}

impl Endpoint {
    pub fn parse(s: &str) -> anyhow::Result<Self> {
        let url = Url::parse(s.trim()).map_err(|e| anyhow!("'{}' is not a valid URL: {}", s, e))?;
        match url.scheme() {
            "http" | "https" => Ok(Endpoint { url }),
            other => bail!("'{}' must use http or https, not {}", s, other),
        }
    }

    /// Reads the endpoint from `ZKOOL_ENDPOINT`, falling back to the default when it is
    /// unset or empty.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::select(None, env::var(ENDPOINT_ENV).ok().as_deref())
    }

    /// The first non-empty of `explicit` and `env_value`, or the default endpoint.
    pub fn select(explicit: Option<&str>, env_value: Option<&str>) -> anyhow::Result<Self> {
        match explicit
            .into_iter()
            .chain(env_value)
            .find(|value| !value.trim().is_empty())
        {
            Some(value) => Self::parse(value),
            None => Ok(Self::default()),
        }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    fn use_tls(&self) -> bool {
        self.url.scheme() == "https"
    }

    pub fn connect(&self, headers: &[Header]) -> anyhow::Result<HttpTransport> {
        info!(
            "Using wallet backend at {}{}",
            self,
            if self.use_tls() { "" } else { " (no TLS)" }
        );

        let headers = headers
            .iter()
            .map(|h| (h.name.clone(), h.value.clone()))
            .collect::<HeaderMap>();
        Ok(HttpTransport::new(self.url.clone(), headers)?)
    }
}

impl Default for Endpoint {
    fn default() -> Self {
        Endpoint {
            url: Url::parse(DEFAULT_ENDPOINT).expect("default endpoint is a valid URL"),
        }
    }
}

impl FromStr for Endpoint {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.url)
    }
}

/// An extra header sent with every request, given as `NAME:VALUE`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Header {
    name: HeaderName,
    value: HeaderValue,
}

impl Header {
    pub fn parse(s: &str) -> anyhow::Result<Self> {
        let (name, value) = s
            .split_once(':')
            .ok_or(anyhow!("'{}' must be of the form NAME:VALUE", s))?;
        Ok(Header {
            name: HeaderName::from_bytes(name.trim().as_bytes())
                .map_err(|e| anyhow!("Invalid header name '{}': {}", name.trim(), e))?,
            value: HeaderValue::from_str(value.trim())
                .map_err(|e| anyhow!("Invalid value for header '{}': {}", name.trim(), e))?,
        })
    }
}
