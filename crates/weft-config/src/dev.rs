//! Development proxy configuration types.

use serde::{Deserialize, Serialize};

/// Options of the browser-sync style development proxy.
///
/// The proxy forwards requests to an existing backend (`proxy`) and reloads
/// connected browsers whenever the build emits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DevProxyOptions {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Backend URL requests are forwarded to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy: Option<String>,

    /// Open a browser window on start
    #[serde(default)]
    pub open: bool,

    /// Extra files that trigger a reload when they change
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<String>,
}

impl DevProxyOptions {
    /// Address the proxy listens on.
    pub fn listen_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

impl Default for DevProxyOptions {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            proxy: None,
            open: false,
            files: Vec::new(),
        }
    }
}

fn default_host() -> String {
    "localhost".into()
}

fn default_port() -> u16 {
    3000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listen_url_uses_host_and_port() {
        let options = DevProxyOptions {
            host: "0.0.0.0".into(),
            port: 8080,
            ..Default::default()
        };
        assert_eq!(options.listen_url(), "http://0.0.0.0:8080");
    }
}
