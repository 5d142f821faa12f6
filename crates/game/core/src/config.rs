/// Frontier selection tunables for map exploration.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExplorationConfig {
    /// Recompute the frontier once fewer than this many candidates remain.
    /// Kept above the number of cooperating bots so randomized picks spread them out.
    pub refresh_threshold: usize,
    /// A nearest candidate farther than this (Manhattan) is considered stale.
    pub distance_threshold: u32,
}

impl ExplorationConfig {
    // ===== compile-time constants =====
    /// Maximum number of members in a party, leader included.
    pub const MAX_PARTY_SIZE: usize = 3;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_REFRESH_THRESHOLD: usize = 10;
    pub const DEFAULT_DISTANCE_THRESHOLD: u32 = 5;

    pub fn new() -> Self {
        Self {
            refresh_threshold: Self::DEFAULT_REFRESH_THRESHOLD,
            distance_threshold: Self::DEFAULT_DISTANCE_THRESHOLD,
        }
    }

    pub fn with_thresholds(refresh_threshold: usize, distance_threshold: u32) -> Self {
        Self {
            refresh_threshold,
            distance_threshold,
        }
    }
}

impl Default for ExplorationConfig {
    fn default() -> Self {
        Self::new()
    }
}
