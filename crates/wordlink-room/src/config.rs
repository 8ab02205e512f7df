//! Room configuration.

use std::time::Duration;

/// Tunables shared by every room in a registry.
///
/// The defaults match the live game; tests shrink the timing values.
#[derive(Debug, Clone)]
pub struct RoomConfig {
    /// Length of generated room codes.
    pub code_length: usize,

    /// Advisory seconds per turn, sent to clients in every snapshot.
    pub round_time_secs: u32,

    /// A room with no accepted word or resume for this long is stale.
    pub inactivity_threshold: Duration,

    /// How often the health monitor sweeps the registry.
    pub sweep_interval: Duration,

    /// Bounded mailbox size for each room actor.
    pub mailbox_size: usize,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            code_length: 6,
            round_time_secs: 30,
            inactivity_threshold: Duration::from_secs(3600),
            sweep_interval: Duration::from_secs(30),
            mailbox_size: 64,
        }
    }
}
