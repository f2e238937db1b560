pub mod browser;
pub mod client;
pub mod config;
pub mod dispatch;
pub mod extractor;
pub mod llm;
pub mod metrics;
pub mod pipeline;
pub mod planner;
pub mod search_tool;
pub mod task;
pub mod testing;
pub mod transcript;

pub use browser::{BrowserConfig, BrowserDriver, BrowserError, BrowserSession, WebDriverBrowser};
pub use client::{ClientError, PollOptions, TravelApiClient};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, SanitizedConfig,
    ServerConfig,
};
pub use dispatch::{DispatchError, PoolStatus, WorkerPool, WorkerPoolConfig};
pub use extractor::{Extractor, ExtractorError, LlmPageExtractor};
pub use llm::{create_llm_client, LlmClient, LlmConfig, LlmError, LlmProvider};
pub use pipeline::{
    into_job, FlightSearchRequest, HotelSearchRequest, PipelineDeps, PipelineError, Pipelines,
    RestaurantSearchRequest, SearchPipeline, SitesConfig, ValidationError, VideoSearchRequest,
};
pub use planner::{
    PlannerError, RequestParser, ResearchAssistant, TravelContext, TravelSummarizer,
};
pub use search_tool::{DuckDuckGoSearch, SearchTool, SearchToolConfig, SearchToolError};
pub use task::{
    InMemoryTaskStore, SearchKind, TaskError, TaskRecord, TaskState, TaskStore, TaskStoreConfig,
};
pub use transcript::{TranscriptConfig, TranscriptError, TranscriptSource, YoutubeTranscriptSource};
