/// Match configuration.
/// 
/// This module defines scoring and the delays used by the ready/countdown/match
/// lifecycle. Delays are grouped in `MatchTimings` so the coordinator can be
/// started with shorter values in tests.
use std::time::Duration;

/// Points per hit with a pistol.
pub const PISTOL_HIT_SCORE: u32 = 10;

/// Points per hit with a shotgun.
pub const SHOTGUN_HIT_SCORE: u32 = 40;

/// Points per hit with a bow.
pub const ARCHER_HIT_SCORE: u32 = 70;

/// Number of countdown steps announced in `game_start_countdown`.
pub const COUNTDOWN_STEPS: u32 = 3;

/// Minimum number of ready players before a match can start.
pub const MIN_READY_PLAYERS: usize = 2;

/// Message carried by `game_start`.
pub const GAME_START_MESSAGE: &str = "Game has started!";

/// Message carried by `game_end`.
pub const GAME_END_MESSAGE: &str = "Game has ended!";

/// Delays used by the coordinator for deferred work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchTimings {
    /// Length of one countdown step.
    pub countdown_step: Duration,
    /// How long a match runs before it ends on its own.
    pub match_duration: Duration,
    /// Delay of the second `lobby_members` broadcast after a join.
    pub join_rebroadcast_delay: Duration,
    /// Delay of the `lobby_list` broadcast after a join.
    pub lobby_list_delay: Duration,
    /// Delay of the `lobby_status` refresh after a match ends.
    pub post_end_refresh_delay: Duration,
}

impl MatchTimings {
    /// Total time between the countdown broadcast and the start attempt.
    pub fn countdown_duration(&self) -> Duration {
        self.countdown_step * COUNTDOWN_STEPS
    }
}

impl Default for MatchTimings {
    fn default() -> Self {
        Self {
            countdown_step: Duration::from_secs(1),
            match_duration: Duration::from_secs(100),
            join_rebroadcast_delay: Duration::from_secs(2),
            lobby_list_delay: Duration::from_millis(300),
            post_end_refresh_delay: Duration::from_secs(3),
        }
    }
}
