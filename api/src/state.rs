use std::sync::Arc;

use crate::config::GatewayConfig;
use crate::upstream::{UPSTREAM_TIMEOUT, UpstreamClient, UpstreamError};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<GatewayConfig>,
    pub upstream: UpstreamClient,
}

impl AppState {
    pub fn new(config: GatewayConfig) -> Result<Self, UpstreamError> {
        let upstream = UpstreamClient::new(
            config.upstream_base_url.clone(),
            config.access_token.clone(),
            UPSTREAM_TIMEOUT,
        )?;
        Ok(Self {
            config: Arc::new(config),
            upstream,
        })
    }
}
