use crate::cache::AggregateCache;
use crate::incident::pipeline::AggregationPipeline;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<AggregationPipeline>,
    pub cache: Arc<AggregateCache>,
    /// Held for the duration of one aggregation run. The refresh loop takes
    /// it with `try_lock` (a busy guard suppresses the tick); a cold-start
    /// read awaits it and re-checks the cache afterwards.
    pub run_guard: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(pipeline: AggregationPipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            cache: Arc::new(AggregateCache::new()),
            run_guard: Arc::new(Mutex::new(())),
        }
    }
}
