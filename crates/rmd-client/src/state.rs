//! 控制循环状态机
//!
//! ```text
//! Idle ──► Connected ──► Running ──► Stopping ──► Stopped
//!  │                        │            │
//!  └────────────────────────┴────────────┴──────► Faulted
//! ```
//!
//! 每次运行只有一个状态实例，状态只能向前推进。

use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Connected,
    Running,
    Stopping,
    Stopped,
    Faulted,
}

impl LoopState {
    /// 是否允许 `self → next`
    pub fn can_transition_to(self, next: LoopState) -> bool {
        use LoopState::*;
        matches!(
            (self, next),
            (Idle, Connected)
                | (Idle, Faulted)
                | (Connected, Running)
                | (Running, Stopping)
                | (Running, Faulted)
                | (Stopping, Stopped)
                | (Stopping, Faulted)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, LoopState::Stopped | LoopState::Faulted)
    }
}

impl fmt::Display for LoopState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LoopState::Idle => "Idle",
            LoopState::Connected => "Connected",
            LoopState::Running => "Running",
            LoopState::Stopping => "Stopping",
            LoopState::Stopped => "Stopped",
            LoopState::Faulted => "Faulted",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Invalid loop state transition: {from} -> {to}")]
pub struct InvalidTransition {
    pub from: LoopState,
    pub to: LoopState,
}

/// 单调状态跟踪器
#[derive(Debug)]
pub struct StateTracker {
    current: LoopState,
    history: Vec<LoopState>,
}

impl StateTracker {
    pub fn new() -> Self {
        Self {
            current: LoopState::Idle,
            history: vec![LoopState::Idle],
        }
    }

    pub fn current(&self) -> LoopState {
        self.current
    }

    /// 经历过的全部状态（含 Idle）
    pub fn history(&self) -> &[LoopState] {
        &self.history
    }

    pub fn transition(&mut self, next: LoopState) -> Result<(), InvalidTransition> {
        if !self.current.can_transition_to(next) {
            return Err(InvalidTransition {
                from: self.current,
                to: next,
            });
        }
        tracing::debug!("Loop state: {} -> {}", self.current, next);
        self.current = next;
        self.history.push(next);
        Ok(())
    }
}

impl Default for StateTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use LoopState::*;

    #[test]
    fn test_happy_path() {
        let mut tracker = StateTracker::new();
        for next in [Connected, Running, Stopping, Stopped] {
            tracker.transition(next).unwrap();
        }
        assert_eq!(tracker.current(), Stopped);
        assert!(tracker.current().is_terminal());
        assert_eq!(tracker.history(), &[Idle, Connected, Running, Stopping, Stopped]);
    }

    #[test]
    fn test_no_backwards_transitions() {
        let mut tracker = StateTracker::new();
        tracker.transition(Connected).unwrap();
        tracker.transition(Running).unwrap();
        assert_eq!(
            tracker.transition(Connected),
            Err(InvalidTransition {
                from: Running,
                to: Connected
            })
        );
        assert_eq!(tracker.current(), Running);
    }

    #[test]
    fn test_terminal_states_are_final() {
        for terminal in [Stopped, Faulted] {
            for next in [Idle, Connected, Running, Stopping, Stopped, Faulted] {
                assert!(!terminal.can_transition_to(next));
            }
        }
    }

    #[test]
    fn test_fault_paths() {
        assert!(Idle.can_transition_to(Faulted));
        assert!(Running.can_transition_to(Faulted));
        assert!(Stopping.can_transition_to(Faulted));
        assert!(!Connected.can_transition_to(Stopping));
        assert!(!Idle.can_transition_to(Running));
    }

    #[test]
    fn test_invalid_transition_display() {
        let err = InvalidTransition {
            from: Stopped,
            to: Running,
        };
        assert_eq!(err.to_string(), "Invalid loop state transition: Stopped -> Running");
    }
}
