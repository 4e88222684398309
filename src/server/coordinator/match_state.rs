/// Process-wide match state machine: `Idle -> Starting -> Running -> Idle`.
///
/// Only one match runs at a time across all lobbies, but several lobbies may
/// each have a countdown pending. Starting is idempotent, so the countdown
/// expiry and the manual `ready` check may race safely.
use std::collections::HashMap;
use std::time::Instant;
use actix::SpawnHandle;

use super::types::LobbyCode;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchPhase {
    Idle,
    /// No match runs and at least one lobby has a countdown pending.
    Starting,
    /// `lobby` is `None` when the start could not be tied to a lobby.
    Running { lobby: Option<LobbyCode>, started_at: Instant },
}

#[derive(Debug, Clone)]
struct RunningMatch {
    lobby: Option<LobbyCode>,
    started_at: Instant,
}

#[derive(Default)]
pub struct MatchState {
    running: Option<RunningMatch>,
    /// Pending countdowns, each with the ticket its timer carries.
    countdowns: HashMap<LobbyCode, u64>,
    next_ticket: u64,
    end_timer: Option<SpawnHandle>,
}

impl MatchState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> MatchPhase {
        match &self.running {
            Some(running) => MatchPhase::Running {
                lobby: running.lobby.clone(),
                started_at: running.started_at,
            },
            None if !self.countdowns.is_empty() => MatchPhase::Starting,
            None => MatchPhase::Idle,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    pub fn is_counting_down(&self, code: &str) -> bool {
        self.countdowns.contains_key(code)
    }

    /// Mark a countdown pending for `code` and return the ticket its timer
    /// must present. Refused while a match runs or while the same lobby
    /// already has one pending.
    pub fn begin_countdown(&mut self, code: &str) -> Option<u64> {
        if self.is_running() || self.is_counting_down(code) {
            return None;
        }
        self.next_ticket += 1;
        self.countdowns.insert(code.to_string(), self.next_ticket);
        Some(self.next_ticket)
    }

    /// Clear the countdown of `code` when its timer fires. Returns `false`
    /// if that countdown was cancelled in the meantime.
    pub fn end_countdown(&mut self, code: &str, ticket: u64) -> bool {
        if self.countdowns.get(code) != Some(&ticket) {
            return false;
        }
        self.countdowns.remove(code);
        true
    }

    /// Drop the pending countdown of a lobby that no longer exists.
    pub fn cancel_countdown(&mut self, code: &str) -> bool {
        self.countdowns.remove(code).is_some()
    }

    /// Enter `Running`. Returns `false` (and changes nothing) if a match is
    /// already running.
    pub fn start(&mut self, lobby: Option<LobbyCode>) -> bool {
        if self.is_running() {
            return false;
        }
        self.running = Some(RunningMatch { lobby, started_at: Instant::now() });
        true
    }

    /// Keep the end timer so an explicit end can cancel it.
    pub fn arm_end_timer(&mut self, handle: SpawnHandle) {
        self.end_timer = Some(handle);
    }

    /// Leave `Running`. Yields `None` when no match was running, otherwise
    /// the end timer to cancel (if one was armed).
    pub fn finish(&mut self) -> Option<Option<SpawnHandle>> {
        self.running.take()?;
        Some(self.end_timer.take())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_is_idempotent() {
        let mut state = MatchState::new();
        assert!(state.start(Some("ABCDEF".into())));
        assert!(!state.start(Some("QWERTY".into())));
        assert!(matches!(state.phase(), MatchPhase::Running { lobby: Some(code), .. } if code == "ABCDEF"));
    }

    #[test]
    fn countdown_not_rearmed_for_same_lobby() {
        let mut state = MatchState::new();
        let ticket = state.begin_countdown("ABCDEF").unwrap();
        assert!(state.begin_countdown("ABCDEF").is_none());
        assert!(state.is_counting_down("ABCDEF"));
        assert_eq!(state.phase(), MatchPhase::Starting);
        assert!(state.end_countdown("ABCDEF", ticket));
        assert_eq!(state.phase(), MatchPhase::Idle);
    }

    #[test]
    fn countdowns_of_different_lobbies_are_independent() {
        let mut state = MatchState::new();
        let first = state.begin_countdown("AAAAAA").unwrap();
        let second = state.begin_countdown("BBBBBB").unwrap();
        assert!(state.begin_countdown("AAAAAA").is_none());

        assert!(state.end_countdown("BBBBBB", second));
        assert!(!state.end_countdown("BBBBBB", second));
        assert!(state.is_counting_down("AAAAAA"));
        assert!(state.begin_countdown("AAAAAA").is_none());
        assert!(state.end_countdown("AAAAAA", first));
    }

    #[test]
    fn stale_timer_does_not_clear_newer_countdown() {
        let mut state = MatchState::new();
        let stale = state.begin_countdown("ABCDEF").unwrap();
        assert!(state.cancel_countdown("ABCDEF"));
        let fresh = state.begin_countdown("ABCDEF").unwrap();

        assert!(!state.end_countdown("ABCDEF", stale));
        assert!(state.is_counting_down("ABCDEF"));
        assert!(state.end_countdown("ABCDEF", fresh));
    }

    #[test]
    fn no_countdown_while_running() {
        let mut state = MatchState::new();
        state.start(None);
        assert!(state.begin_countdown("ABCDEF").is_none());
    }

    #[test]
    fn finish_returns_to_idle_once() {
        let mut state = MatchState::new();
        assert!(state.finish().is_none());
        assert!(state.start(Some("ABCDEF".into())));
        assert!(matches!(state.finish(), Some(None)));
        assert_eq!(state.phase(), MatchPhase::Idle);
        assert!(state.finish().is_none());
    }
}
