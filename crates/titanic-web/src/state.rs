//! Shared application state for the web server.

use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::info;

use titanic_agent::{AgentError, AgentSettings, DataFrameAgent};
use titanic_charts::{fonts, ChartRenderer};
use titanic_config::Config;
use titanic_data::DatasetStore;
use titanic_llm::{LlmBackend, LlmError, OpenAiCompatibleBackend};

/// Shared state injected into every Axum handler.
pub struct AppState {
    pub config: Config,
    pub dataset: DatasetStore,
    pub llm: Arc<dyn LlmBackend>,
    pub charts: ChartRenderer,
    /// Built on first use, then reused for every request.
    agent: OnceCell<Arc<DataFrameAgent>>,
}

impl AppState {
    /// State backed by the hosted model named in `config.llm`.
    pub fn new(config: Config) -> Result<Self, LlmError> {
        let llm: Arc<dyn LlmBackend> = Arc::new(OpenAiCompatibleBackend::from_config(&config.llm)?);
        let dataset = DatasetStore::new(&config.dataset.path);
        let charts = ChartRenderer::from_config(&config.charts);
        let (width, height) = charts.size();
        info!(
            width,
            height,
            text = charts.draws_text(),
            font = ?fonts::registered_font(),
            "Chart renderer ready"
        );
        Ok(Self::with_parts(config, dataset, llm, charts))
    }

    pub fn with_parts(
        config: Config,
        dataset: DatasetStore,
        llm: Arc<dyn LlmBackend>,
        charts: ChartRenderer,
    ) -> Self {
        Self { config, dataset, llm, charts, agent: OnceCell::new() }
    }

    /// The dataframe agent, built once from the memoized dataset.
    /// A failed build is retried on the next call.
    pub async fn agent(&self) -> Result<Arc<DataFrameAgent>, AgentError> {
        self.agent
            .get_or_try_init(|| async {
                let dataset = self.dataset.get().await?;
                let settings = AgentSettings::from(&self.config.agent);
                let agent = DataFrameAgent::new(self.llm.clone(), dataset, settings)?;
                info!(model = agent.model_id(), "Agent initialised");
                Ok::<_, AgentError>(Arc::new(agent))
            })
            .await
            .cloned()
    }
}

pub type SharedState = Arc<AppState>;
