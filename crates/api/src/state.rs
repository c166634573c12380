use std::sync::Arc;
use std::time::Duration;

use text2midi_core::converter::Converter;
use text2midi_core::workspace::Workspace;

use crate::config::ServerConfig;
use crate::engine::runner::JobRunner;
use crate::engine::store::JobStore;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Registry of all jobs since start-up.
    pub store: Arc<JobStore>,
    /// Background executor for conversions.
    pub runner: Arc<JobRunner>,
    /// Scratch directories under the storage root.
    pub workspace: Arc<Workspace>,
}

impl AppState {
    /// Wire up the store, runner and workspace around `converter`.
    pub fn new(config: ServerConfig, converter: Arc<dyn Converter>) -> Self {
        let store = Arc::new(JobStore::new());
        let runner = JobRunner::new(Arc::clone(&store), converter)
            .with_job_timeout(config.job_timeout_secs.map(Duration::from_secs));
        let workspace = Workspace::new(&config.storage_root);

        Self {
            config: Arc::new(config),
            store,
            runner: Arc::new(runner),
            workspace: Arc::new(workspace),
        }
    }
}
