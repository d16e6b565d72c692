/// Start-time parallelism knobs (§5: "all compile- or start-time constants;
/// no runtime reconfiguration"). Callers build one `KnnConfig` and pass it by
/// reference; nothing here is ever reloaded.
#[derive(Debug, Clone, Copy)]
pub struct KnnConfig {
    /// `W` — worker count for parallel distance work (parallel search, VPT build fan-out).
    pub workers: usize,
    /// Frontier size above which VPT search parallelizes a batch.
    pub threshold_parallel: usize,
    /// Cap on frontier nodes processed per parallel search batch.
    pub max_parallel_frontier: usize,
}

impl Default for KnnConfig {
    fn default() -> Self {
        let workers = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        Self {
            workers,
            threshold_parallel: 64,
            max_parallel_frontier: 32,
        }
    }
}

impl KnnConfig {
    pub fn with_workers(workers: usize) -> Self {
        Self {
            workers,
            ..Self::default()
        }
    }
}
