use std::time::Duration;

use anyhow::anyhow;

use crate::ReconcilePolicy;

pub const DEFAULT_HOST: &str = "http://localhost:3000";

/// Time to wait between two attempts at (re)connecting to the live update feed
pub const RECONNECT_SPACING: Duration = Duration::from_secs(1);

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClientConfig {
    /// Base url of the comment store, eg. `http://localhost:3000`
    pub host: String,

    /// Path of the live update websocket on the same host
    pub feed_path: String,

    pub reconnect_spacing: Duration,

    pub reconcile: ReconcilePolicy,
}

impl ClientConfig {
    pub fn new(host: impl Into<String>) -> ClientConfig {
        ClientConfig {
            host: host.into(),
            ..ClientConfig::default()
        }
    }

    /// The websocket url matching `host`: `http` becomes `ws`, `https` becomes `wss`
    pub fn feed_url(&self) -> anyhow::Result<String> {
        let rest = self.host.strip_prefix("http").ok_or_else(|| {
            anyhow!(
                "host {:?} should start with http:// or https://",
                self.host
            )
        })?;
        if !rest.starts_with("://") && !rest.starts_with("s://") {
            return Err(anyhow!(
                "host {:?} should start with http:// or https://",
                self.host
            ));
        }
        let path = self.feed_path.trim_start_matches('/');
        Ok(format!("ws{}/{}", rest.trim_end_matches('/'), path))
    }
}

impl Default for ClientConfig {
    fn default() -> ClientConfig {
        ClientConfig {
            host: String::from(DEFAULT_HOST),
            feed_path: String::from("/"),
            reconnect_spacing: RECONNECT_SPACING,
            reconcile: ReconcilePolicy::default(),
        }
    }
}
