use std::sync::Arc;

use crate::{
    config::Settings,
    error::{ApiError, ApiResult},
    models::{Host, WebAsset},
    services::{AssetDataSource, LiveDataSource, MockDataSource, SummaryPoller},
};

pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod services;

/// Shared client state. The data source variant is fixed here, once.
#[derive(Clone)]
pub struct ClientState {
    pub config: Arc<Settings>,
    pub data_source: Arc<dyn AssetDataSource>,
}

impl ClientState {
    /// Build the data source selected by `use_mock_data`
    pub fn new(config: Settings) -> Result<Self, ApiError> {
        let data_source: Arc<dyn AssetDataSource> = if config.use_mock_data {
            tracing::info!(
                latency_enabled = config.mock_latency_enabled,
                "Using mock data source"
            );
            Arc::new(MockDataSource::from_fixtures(config.mock_latency())?)
        } else {
            tracing::info!(base_url = %config.api_base_url(), "Using live data source");
            Arc::new(LiveDataSource::from_settings(&config)?)
        };

        Ok(Self::with_data_source(config, data_source))
    }

    /// Wrap an already-built data source
    pub fn with_data_source(config: Settings, data_source: Arc<dyn AssetDataSource>) -> Self {
        Self {
            config: Arc::new(config),
            data_source,
        }
    }

    pub fn poller(&self) -> SummaryPoller {
        SummaryPoller::new(self.data_source.clone(), self.config.poll_policy())
    }

    /// Fetch both inventories concurrently; either failure fails the whole call
    pub async fn inventory(&self) -> ApiResult<(Vec<Host>, Vec<WebAsset>)> {
        futures::future::try_join(
            self.data_source.list_hosts(),
            self.data_source.list_web_assets(),
        )
        .await
    }
}
