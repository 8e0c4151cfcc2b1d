/* Proxy management */
use log::debug;
use reqwest::{ClientBuilder, NoProxy, Proxy};
use serde::Deserialize;
use std::env;

/// Structure to store proxies information. It may be gathered from
/// the configuration file or from the environment variables
/// `http_proxy` and `https_proxy`.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
pub struct Proxies {
    pub http: Option<String>,
    pub https: Option<String>,
}

// Gets an environment variable as an Option<String>. Lower case
// is tried first, then upper case.
fn get_variable_value(variable: &str) -> Option<String> {
    for name in [variable.to_lowercase(), variable.to_uppercase()] {
        match env::var(&name) {
            Ok(value) if !value.is_empty() => return Some(value),
            Ok(_) => debug!("{name} is empty"),
            Err(e) => debug!("{name}: {e}"),
        }
    }
    None
}

impl Proxies {
    /// Proxies found in the environment
    #[must_use]
    pub fn from_env() -> Self {
        Proxies {
            http: get_variable_value("http_proxy"),
            https: get_variable_value("https_proxy"),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.http.is_none() && self.https.is_none()
    }

    /// Installs these proxies on the client being built. System
    /// proxies are discarded first so that only what is described
    /// here is used. Hosts listed in `NO_PROXY` (or `no_proxy`) are
    /// still reached directly.
    ///
    /// # Errors
    ///
    /// Fails when one of the proxy urls can not be parsed
    pub fn apply(&self, builder: ClientBuilder) -> Result<ClientBuilder, reqwest::Error> {
        let mut builder = builder.no_proxy();
        if let Some(http) = &self.http {
            debug!("Using {http} as http proxy");
            builder = builder.proxy(Proxy::http(http)?.no_proxy(NoProxy::from_env()));
        }
        if let Some(https) = &self.https {
            debug!("Using {https} as https proxy");
            builder = builder.proxy(Proxy::https(https)?.no_proxy(NoProxy::from_env()));
        }
        Ok(builder)
    }
}

#[test]
fn test_proxies_apply() {
    let proxies = Proxies {
        http: Some("http://127.0.0.1:3128".to_string()),
        https: None,
    };
    assert!(!proxies.is_empty());
    assert!(proxies.apply(reqwest::Client::builder()).is_ok());
}

#[test]
fn test_proxies_apply_invalid_url() {
    let proxies = Proxies {
        http: None,
        https: Some("not a proxy url".to_string()),
    };
    assert!(proxies.apply(reqwest::Client::builder()).is_err());
}
