//! Replica configuration.

use venn_sentiment::AdmissionConfig;

/// How many queued intents one replay pass will attempt.
pub const DEFAULT_REPLAY_LIMIT: usize = 25;

/// Retries after a failed or still-empty aggregate read.
pub const DEFAULT_READ_RETRIES: u32 = 3;

/// Bootstrap read attempts before falling back to the local cache.
pub const DEFAULT_HYDRATE_ATTEMPTS: u32 = 3;

/// Tunable knobs for one replica. Built programmatically; tests override
/// individual fields from `Default`.
#[derive(Clone, Copy, Debug)]
pub struct ReplicaConfig {
    pub admission: AdmissionConfig,
    pub replay_limit: usize,
    pub read_retries: u32,
    pub hydrate_attempts: u32,
}

impl Default for ReplicaConfig {
    fn default() -> Self {
        Self {
            admission: AdmissionConfig::default(),
            replay_limit: DEFAULT_REPLAY_LIMIT,
            read_retries: DEFAULT_READ_RETRIES,
            hydrate_attempts: DEFAULT_HYDRATE_ATTEMPTS,
        }
    }
}
