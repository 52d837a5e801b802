//! Dual-threshold eviction by composite score (§4.6).

use crate::client::chunk_cache::ChunkCache;
use crate::core::config::EvictionConfig;
use crate::coord::ChunkCoord;

/// Why an eviction sweep ran.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EvictionReason {
    Proactive,
    Emergency,
    Manual,
}

/// Outcome of one eviction sweep. Eviction is best-effort (§4.6 "failure
/// semantics"): fewer evictions than requested is not an error.
#[derive(Debug, Clone)]
pub struct EvictionReport {
    pub reason: EvictionReason,
    pub evicted: Vec<ChunkCoord>,
    pub protected_skipped: usize,
}

/// Runs proactive and emergency eviction sweeps against a [`ChunkCache`],
/// tracking the cooldown between an emergency sweep and the next proactive one.
pub struct EvictionController {
    config: EvictionConfig,
    last_proactive_millis: Option<u64>,
    last_emergency_millis: Option<u64>,
}

impl EvictionController {
    pub fn new(config: EvictionConfig) -> Self {
        Self { config, last_proactive_millis: None, last_emergency_millis: None }
    }

    /// Called once per frame (or tick): runs a proactive trim if the cache
    /// is over `soft_limit`, `trim_interval_millis` has elapsed since the
    /// last proactive trim, and we're not inside the post-emergency cooldown.
    pub fn maybe_proactive_trim(
        &mut self,
        cache: &mut ChunkCache,
        camera: ChunkCoord,
        now_millis: u64,
    ) -> Option<EvictionReport> {
        if cache.len() <= self.config.soft_limit {
            return None;
        }
        if let Some(last_emergency) = self.last_emergency_millis
            && now_millis.saturating_sub(last_emergency) < self.config.cooldown_millis {
                return None;
            }
        if let Some(last_proactive) = self.last_proactive_millis
            && now_millis.saturating_sub(last_proactive) < self.config.trim_interval_millis {
                return None;
            }

        self.last_proactive_millis = Some(now_millis);
        let target = (self.config.soft_limit as f64 * 0.9) as usize;
        // `max_evictions_per_frame` caps the common case (a handful of stale
        // chunks trimmed every trim_interval), but a sweep must still be
        // able to clear a one-off overshoot back down to target in a single
        // call — so the cap widens to the overshoot itself when the
        // overshoot is the larger of the two, rather than silently leaving
        // the cache above soft_limit for dozens of frames.
        let overshoot = cache.len().saturating_sub(target);
        let cap = self.config.max_evictions_per_frame.max(overshoot);
        Some(self.evict_down_to(cache, camera, now_millis, target, Some(cap), EvictionReason::Proactive))
    }

    /// Called synchronously right after an insert that may have pushed the
    /// cache over `hard_limit`.
    pub fn check_emergency(
        &mut self,
        cache: &mut ChunkCache,
        camera: ChunkCoord,
        now_millis: u64,
    ) -> Option<EvictionReport> {
        if cache.len() <= self.config.hard_limit {
            return None;
        }
        self.last_emergency_millis = Some(now_millis);
        let target = (self.config.soft_limit as f64 * 0.8) as usize;
        Some(self.evict_down_to(cache, camera, now_millis, target, None, EvictionReason::Emergency))
    }

    /// An uncapped, caller-requested eviction (`reason = manual`, §4.6).
    pub fn manual_evict(
        &mut self,
        cache: &mut ChunkCache,
        camera: ChunkCoord,
        now_millis: u64,
        target_size: usize,
    ) -> EvictionReport {
        self.evict_down_to(cache, camera, now_millis, target_size, None, EvictionReason::Manual)
    }

    fn evict_down_to(
        &self,
        cache: &mut ChunkCache,
        camera: ChunkCoord,
        now_millis: u64,
        target_size: usize,
        max_evictions: Option<usize>,
        reason: EvictionReason,
    ) -> EvictionReport {
        let mut candidates: Vec<(ChunkCoord, f32)> = Vec::new();
        let mut protected_skipped = 0;

        for entry in cache.iter() {
            if is_protected(entry.coord, entry.last_seen_millis, camera, now_millis, &self.config) {
                protected_skipped += 1;
                continue;
            }
            let ref_count = cache.pool().ref_count(cache.get(entry.coord).unwrap().pool_id).max(1);
            let content_score = 1.0 - 1.0 / ref_count as f32;
            let score = composite_score(entry.coord, entry.last_seen_millis, camera, now_millis, &self.config, content_score);
            candidates.push((entry.coord, score));
        }

        candidates.sort_by(|a, b| b.1.total_cmp(&a.1));

        let mut evicted = Vec::new();
        for (coord, _) in candidates {
            if cache.len() <= target_size {
                break;
            }
            if let Some(cap) = max_evictions
                && evicted.len() >= cap {
                    break;
                }
            cache.evict(coord);
            evicted.push(coord);
        }

        EvictionReport { reason, evicted, protected_skipped }
    }
}

fn is_protected(
    coord: ChunkCoord,
    last_seen_millis: u64,
    camera: ChunkCoord,
    now_millis: u64,
    config: &EvictionConfig,
) -> bool {
    let age = now_millis.saturating_sub(last_seen_millis);
    age < config.min_chunk_age_millis || coord.chebyshev_distance(&camera) <= config.camera_protection_radius
}

fn composite_score(
    coord: ChunkCoord,
    last_seen_millis: u64,
    camera: ChunkCoord,
    now_millis: u64,
    config: &EvictionConfig,
    content_score: f32,
) -> f32 {
    let age = now_millis.saturating_sub(last_seen_millis) as f32;
    let age_term = (age / config.max_age_millis as f32).clamp(0.0, 1.0);
    let distance = coord.chebyshev_distance(&camera) as f32;
    let distance_term = (distance / config.max_distance as f32).clamp(0.0, 1.0);
    0.6 * age_term + 0.3 * distance_term + 0.1 * content_score
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> EvictionConfig {
        EvictionConfig {
            soft_limit: 4,
            hard_limit: 6,
            trim_interval_millis: 0,
            cooldown_millis: 0,
            min_chunk_age_millis: 100,
            camera_protection_radius: 1,
            max_evictions_per_frame: 100,
            max_age_millis: 10_000,
            max_distance: 64,
        }
    }

    fn payload(root: u32) -> crate::svdag::ChunkPayload {
        crate::svdag::ChunkPayload { root_idx: root, nodes: vec![1, root], leaves: vec![root] }
    }

    #[test]
    fn proactive_trim_respects_protection() {
        let mut cache = ChunkCache::new();
        let camera = ChunkCoord::new(0, 0, 0);
        // Far, old chunks: eviction candidates.
        for i in 0..5 {
            cache.insert(ChunkCoord::new(50 + i, 0, 0), payload(i as u32), 0);
        }
        // Near camera: protected regardless of age.
        cache.insert(ChunkCoord::new(0, 0, 0), payload(99), 0);

        let mut controller = EvictionController::new(config());
        let report = controller.maybe_proactive_trim(&mut cache, camera, 100_000).unwrap();

        assert!(!report.evicted.contains(&ChunkCoord::new(0, 0, 0)));
        assert!(cache.len() <= (config().soft_limit as f64 * 0.9) as usize + 1);
    }

    #[test]
    fn recently_seen_chunks_are_protected_from_eviction() {
        let mut cache = ChunkCache::new();
        let camera = ChunkCoord::new(0, 0, 0);
        for i in 0..6 {
            cache.insert(ChunkCoord::new(50 + i, 0, 0), payload(i as u32), 0);
        }

        let mut controller = EvictionController::new(config());
        // now_millis close to insertion time: every chunk is under min_chunk_age_millis.
        let report = controller.maybe_proactive_trim(&mut cache, camera, 10);
        assert!(report.is_none() || report.unwrap().evicted.is_empty());
    }

    #[test]
    fn emergency_trim_fires_over_hard_limit() {
        let mut cache = ChunkCache::new();
        let camera = ChunkCoord::new(0, 0, 0);
        for i in 0..8 {
            cache.insert(ChunkCoord::new(50 + i, 0, 0), payload(i as u32), 0);
        }

        let mut controller = EvictionController::new(config());
        let report = controller.check_emergency(&mut cache, camera, 100_000).unwrap();
        assert_eq!(report.reason, EvictionReason::Emergency);
        assert!(cache.len() <= (config().soft_limit as f64 * 0.8) as usize + 1);
    }

    /// S4: inserting 25,001 aged, unprotected chunks and then running one
    /// proactive sweep must bring the cache down to <= 0.9 * soft_limit in
    /// that single call (7001 evictions), not dribble out 100 per call.
    #[test]
    fn s4_single_proactive_sweep_clears_a_large_overshoot() {
        let cfg = EvictionConfig {
            soft_limit: 20_000,
            hard_limit: 25_000,
            trim_interval_millis: 0,
            cooldown_millis: 0,
            min_chunk_age_millis: 0,
            camera_protection_radius: 0,
            max_evictions_per_frame: 100,
            max_age_millis: 60_000,
            max_distance: 64,
        };
        let mut cache = ChunkCache::new();
        let camera = ChunkCoord::new(0, 0, 0);
        for i in 0..25_001u32 {
            cache.insert(ChunkCoord::new(1000 + i as i32, 0, 0), payload(i), 0);
        }
        assert_eq!(cache.len(), 25_001);

        let mut controller = EvictionController::new(cfg);
        let report = controller.maybe_proactive_trim(&mut cache, camera, 100_000).unwrap();

        assert_eq!(report.reason, EvictionReason::Proactive);
        assert_eq!(report.evicted.len(), 7001);
        assert!(cache.len() <= 18_000, "cache.len() was {}", cache.len());
    }
}
