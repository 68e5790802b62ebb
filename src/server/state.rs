use axum::extract::FromRef;

use crate::dataset::DataSource;
use std::sync::Arc;

use super::ServerConfig;

pub type SharedDataSource = Arc<DataSource>;

/// Everything handlers can reach. Only immutable configuration: the dataset
/// itself is loaded again by every request.
#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub data_source: SharedDataSource,
}

impl ServerState {
    pub fn new(config: ServerConfig, data_source: DataSource) -> ServerState {
        ServerState {
            config,
            data_source: Arc::new(data_source),
        }
    }
}

impl FromRef<ServerState> for SharedDataSource {
    fn from_ref(input: &ServerState) -> Self {
        input.data_source.clone()
    }
}
