//! Application state and shared resources.

use std::sync::Arc;

use anyhow::Result;
use ocean_common::LayerTable;
use outlook::Thresholds;
use time_resolve::TimeResolver;
use tracing::info;
use upstream_client::{ClientConfig, UpstreamClient};
use zonal_sampler::ZonalSampler;

use crate::config::ServiceConfig;

/// Shared application state.
pub struct AppState {
    pub layers: LayerTable,
    pub client: Arc<UpstreamClient>,
    pub resolver: TimeResolver<UpstreamClient>,
    pub sampler: ZonalSampler<UpstreamClient>,
    pub thresholds: Thresholds,
}

impl AppState {
    pub fn new() -> Result<Self> {
        let config = ServiceConfig::from_env()?;
        let client = Arc::new(UpstreamClient::new(ClientConfig::default())?);
        let resolver = TimeResolver::new(client.clone(), config.time_cache_ttl_secs);
        let sampler = ZonalSampler::new(client.clone());

        info!(
            layers = config.layers.len(),
            time_cache_ttl_secs = config.time_cache_ttl_secs,
            "application state initialized"
        );

        Ok(Self {
            layers: config.layers,
            client,
            resolver,
            sampler,
            thresholds: config.thresholds,
        })
    }
}
