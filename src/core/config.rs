//! Explicit configuration structs for the cache/eviction/request-loop stack.
//!
//! None of this is global: every limit, radius, and cooldown is passed in at
//! construction and threaded through explicitly, per the design's "no global
//! mutable state" note.

/// Tunables for the [`crate::client::eviction::EvictionController`].
#[derive(Clone, Copy, Debug)]
pub struct EvictionConfig {
    /// Start trimming proactively once cache size exceeds this.
    pub soft_limit: usize,
    /// Emergency trim synchronously once cache size exceeds this.
    pub hard_limit: usize,
    /// Interval between proactive trim sweeps.
    pub trim_interval_millis: u64,
    /// Cooldown after an emergency trim before proactive trims resume.
    pub cooldown_millis: u64,
    /// Chunks younger than this are never evicted.
    pub min_chunk_age_millis: u64,
    /// Chunks within this Chebyshev distance of the camera are never evicted.
    pub camera_protection_radius: i32,
    /// Per-call cap on evictions, except for `reason=manual`.
    pub max_evictions_per_frame: usize,
    /// Age (millis) at which the age term of the eviction score saturates to 1.0.
    pub max_age_millis: u64,
    /// Chebyshev distance at which the distance term of the eviction score saturates to 1.0.
    pub max_distance: i32,
}

impl Default for EvictionConfig {
    fn default() -> Self {
        Self {
            soft_limit: 20_000,
            hard_limit: 25_000,
            trim_interval_millis: 5_000,
            cooldown_millis: 3_000,
            min_chunk_age_millis: 2_000,
            camera_protection_radius: 3,
            max_evictions_per_frame: 100,
            max_age_millis: 60_000,
            max_distance: 64,
        }
    }
}

/// Tunables for the [`crate::client::request_loop::RequestLoop`].
#[derive(Clone, Copy, Debug)]
pub struct RequestLoopConfig {
    /// Radius of the cubic request grid around the camera chunk: `(2R+1)^3` slots.
    pub request_radius: i32,
    /// Upper bound on chunk fetches dispatched per frame.
    pub max_fetches_per_frame: usize,
    /// Upper bound on concurrently in-flight fetches.
    pub max_parallel: usize,
}

impl Default for RequestLoopConfig {
    fn default() -> Self {
        Self {
            request_radius: 16,
            max_fetches_per_frame: 200,
            max_parallel: 8,
        }
    }
}

/// Tunables for the [`crate::region::cache::RegionCache`].
#[derive(Clone, Copy, Debug)]
pub struct RegionCacheConfig {
    /// Maximum number of regions kept resident before LRU eviction.
    pub capacity: usize,
}

impl Default for RegionCacheConfig {
    fn default() -> Self {
        Self { capacity: 20 }
    }
}

/// Bundled configuration for a running world-streaming instance.
#[derive(Clone, Copy, Debug, Default)]
pub struct StreamingConfig {
    pub eviction: EvictionConfig,
    pub request_loop: RequestLoopConfig,
    pub region_cache: RegionCacheConfig,
}
