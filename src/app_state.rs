use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::{
    config::Config,
    services::{HttpChatGateway, PipelineService},
    store::{DraftStore, ResultCache},
};

#[derive(Clone)]
pub struct AppState {
    pub pipeline_service: Arc<PipelineService>,
    pub drafts: Arc<DraftStore>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let gateway = Arc::new(HttpChatGateway::new(
            config.gateway_base_url.clone(),
            config.gateway_api_key.clone(),
            Duration::from_secs(config.gateway_timeout_secs),
        ));

        let cache = Arc::new(ResultCache::default());
        let drafts = Arc::new(DraftStore::new(
            config.draft_store_path.clone().map(PathBuf::from),
        ));

        let pipeline_service = Arc::new(PipelineService::new(
            gateway,
            cache,
            drafts.clone(),
            config.model.clone(),
            config.title_model.clone(),
        ));

        Self {
            pipeline_service,
            drafts,
            config: Arc::new(config),
        }
    }
}
