//! Per-room call state machine.
//!
//! ```text
//!          invite             accept
//!   Idle ─────────▶ Ringing ─────────▶ Active
//!    ▲                 │                  │
//!    └──── reject ─────┘                  │
//!    └──────────────── end ───────────────┘
//! ```
//!
//! Every rejected transition leaves the state untouched and reports a
//! [`CallError`]; callers drop those silently.

use serde::{Deserialize, Serialize};

use super::{
    error::CallError,
    value_object::{ConnectionId, Timestamp},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallKind {
    Audio,
    Video,
}

/// The call currently ringing or active in a room.
#[derive(Debug, Clone, PartialEq)]
pub struct CallSession {
    pub caller: ConnectionId,
    /// Name the caller announced in `call_user`.
    pub caller_name: String,
    /// Set once somebody accepts.
    pub callee: Option<ConnectionId>,
    pub kind: CallKind,
    pub started_at: Timestamp,
}

impl CallSession {
    fn involves(&self, connection_id: &ConnectionId) -> bool {
        self.caller == *connection_id || self.callee.as_ref() == Some(connection_id)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum CallState {
    #[default]
    Idle,
    Ringing(CallSession),
    Active(CallSession),
}

impl CallState {
    pub fn name(&self) -> &'static str {
        match self {
            CallState::Idle => "idle",
            CallState::Ringing(_) => "ringing",
            CallState::Active(_) => "active",
        }
    }

    pub fn session(&self) -> Option<&CallSession> {
        match self {
            CallState::Idle => None,
            CallState::Ringing(session) | CallState::Active(session) => Some(session),
        }
    }
}

/// Owns the single call slot of a room.
#[derive(Debug, Default)]
pub struct CallCoordinator {
    state: CallState,
}

impl CallCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &CallState {
        &self.state
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, CallState::Idle)
    }

    /// idle → ringing.
    pub fn invite(
        &mut self,
        caller: ConnectionId,
        caller_name: String,
        kind: CallKind,
        at: Timestamp,
    ) -> Result<(), CallError> {
        if !self.is_idle() {
            return Err(CallError::AlreadyInProgress);
        }
        self.state = CallState::Ringing(CallSession {
            caller,
            caller_name,
            callee: None,
            kind,
            started_at: at,
        });
        Ok(())
    }

    /// ringing → active. Returns the kind of the call being accepted.
    pub fn accept(&mut self, callee: ConnectionId) -> Result<CallKind, CallError> {
        match std::mem::take(&mut self.state) {
            CallState::Ringing(mut session) => {
                let kind = session.kind;
                session.callee = Some(callee);
                self.state = CallState::Active(session);
                Ok(kind)
            }
            other => {
                self.state = other;
                Err(CallError::NotRinging)
            }
        }
    }

    /// ringing → idle.
    pub fn reject(&mut self) -> Result<(), CallError> {
        match self.state {
            CallState::Ringing(_) => {
                self.state = CallState::Idle;
                Ok(())
            }
            _ => Err(CallError::NotRinging),
        }
    }

    /// ringing/active → idle.
    pub fn end(&mut self) -> Result<(), CallError> {
        if self.is_idle() {
            return Err(CallError::NoCallInProgress);
        }
        self.state = CallState::Idle;
        Ok(())
    }

    /// Ends the call when a departing participant leaves it orphaned.
    ///
    /// That is the case when the leaver is the caller or the accepted
    /// callee, or when fewer than two participants remain. Returns whether
    /// the call was torn down.
    pub fn participant_left(&mut self, connection_id: &ConnectionId, remaining: usize) -> bool {
        let orphaned = match self.state.session() {
            Some(session) => session.involves(connection_id) || remaining < 2,
            None => false,
        };
        if orphaned {
            self.state = CallState::Idle;
        }
        orphaned
    }
}
