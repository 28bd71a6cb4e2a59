//! Per-helper session state machine.
//!
//! One `HelperSession` tracks one helper through pairing and keep-alive. The
//! machine performs no I/O: every call to [`HelperSession::handle`] returns
//! the actions the runner should carry out, in order.
//!
//! ```text
//! PairRequested --pairAccepted--> Paired.OutOfSync <--> Paired.InSync
//!       |                                   |
//!   pairRefused                       unPairRequest
//!       v                                   v
//!   Unpaired  <-----------------------------+
//! ```

use std::fmt;

use tracing::{debug, trace};

use crate::common::HelperId;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SyncState {
    OutOfSync,
    InSync,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SessionState {
    PairRequested,
    Paired(SyncState),
    /// Terminal.
    Unpaired,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::PairRequested => f.write_str("pairRequested"),
            SessionState::Paired(SyncState::OutOfSync) => f.write_str("paired.outOfSync"),
            SessionState::Paired(SyncState::InSync) => f.write_str("paired.inSync"),
            SessionState::Unpaired => f.write_str("unpaired"),
        }
    }
}

/// Inputs to a session: transport replies, timer expiries and removal.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SessionEvent {
    PairTimeout,
    PairRefused,
    PairAccepted,
    KeepAliveReplyReceived,
    KeepAliveTimeout,
    KeepAliveDelayElapsed,
    UnpairRequest,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum TimerId {
    /// Waiting for an answer to a pair request.
    Pair,
    /// Waiting for a keep-alive reply.
    KeepAliveResponse,
    /// Pause before the next keep-alive request.
    KeepAliveDelay,
}

impl TimerId {
    /// The event delivered when this timer fires.
    pub fn event(&self) -> SessionEvent {
        match self {
            TimerId::Pair => SessionEvent::PairTimeout,
            TimerId::KeepAliveResponse => SessionEvent::KeepAliveTimeout,
            TimerId::KeepAliveDelay => SessionEvent::KeepAliveDelayElapsed,
        }
    }
}

/// Lifecycle notifications a session sends toward the controller.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SessionSignal {
    HelperAdded,
    HelperInSync,
    HelperOutOfSync,
    HelperRemoved,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SessionAction {
    SendPairRequest,
    SendKeepAliveRequest,
    /// Arm a timer, replacing any running timer with the same id.
    SetTimer(TimerId),
    CancelTimer(TimerId),
    Signal(SessionSignal),
}

#[derive(Debug)]
pub struct HelperSession {
    helper: HelperId,
    state: SessionState,
}

impl HelperSession {
    /// Create a session in `PairRequested` together with its entry actions.
    pub fn start(helper: HelperId) -> (Self, Vec<SessionAction>) {
        let session = HelperSession {
            helper,
            state: SessionState::PairRequested,
        };
        let actions = vec![SessionAction::SendPairRequest, SessionAction::SetTimer(TimerId::Pair)];
        (session, actions)
    }

    pub fn helper(&self) -> &HelperId {
        &self.helper
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_terminated(&self) -> bool {
        self.state == SessionState::Unpaired
    }

    pub fn handle(&mut self, event: SessionEvent) -> Vec<SessionAction> {
        use SessionAction::*;
        use SessionEvent::*;

        let actions = match (self.state, event) {
            (SessionState::PairRequested, PairTimeout) => {
                vec![SendPairRequest, SetTimer(TimerId::Pair)]
            }
            (SessionState::PairRequested, PairRefused) => self.unpair(),
            (SessionState::PairRequested, PairAccepted) => {
                let mut actions = vec![CancelTimer(TimerId::Pair), Signal(SessionSignal::HelperAdded)];
                actions.extend(self.enter_out_of_sync());
                actions
            }

            (SessionState::Paired(_), UnpairRequest) => self.unpair(),

            (SessionState::Paired(SyncState::OutOfSync), KeepAliveReplyReceived) => {
                let mut actions = vec![
                    CancelTimer(TimerId::KeepAliveResponse),
                    Signal(SessionSignal::HelperInSync),
                ];
                actions.extend(self.enter_in_sync());
                actions
            }
            (SessionState::Paired(SyncState::OutOfSync), KeepAliveTimeout) => {
                vec![SetTimer(TimerId::KeepAliveDelay)]
            }
            (SessionState::Paired(SyncState::OutOfSync), KeepAliveDelayElapsed) => {
                vec![SendKeepAliveRequest, SetTimer(TimerId::KeepAliveResponse)]
            }

            (SessionState::Paired(SyncState::InSync), KeepAliveDelayElapsed) => {
                vec![SendKeepAliveRequest, SetTimer(TimerId::KeepAliveResponse)]
            }
            (SessionState::Paired(SyncState::InSync), KeepAliveReplyReceived) => {
                vec![CancelTimer(TimerId::KeepAliveResponse), SetTimer(TimerId::KeepAliveDelay)]
            }
            (SessionState::Paired(SyncState::InSync), KeepAliveTimeout) => {
                let mut actions = vec![
                    CancelTimer(TimerId::KeepAliveDelay),
                    Signal(SessionSignal::HelperOutOfSync),
                ];
                actions.extend(self.enter_out_of_sync());
                actions
            }

            (state, event) => {
                trace!(helper = %self.helper, %state, ?event, "Session event ignored");
                return Vec::new();
            }
        };

        debug!(helper = %self.helper, ?event, state = %self.state, "Session event handled");
        actions
    }

    fn enter_out_of_sync(&mut self) -> Vec<SessionAction> {
        self.state = SessionState::Paired(SyncState::OutOfSync);
        vec![
            SessionAction::SendKeepAliveRequest,
            SessionAction::SetTimer(TimerId::KeepAliveResponse),
        ]
    }

    fn enter_in_sync(&mut self) -> Vec<SessionAction> {
        self.state = SessionState::Paired(SyncState::InSync);
        vec![SessionAction::SetTimer(TimerId::KeepAliveDelay)]
    }

    fn unpair(&mut self) -> Vec<SessionAction> {
        self.state = SessionState::Unpaired;
        vec![
            SessionAction::CancelTimer(TimerId::Pair),
            SessionAction::CancelTimer(TimerId::KeepAliveResponse),
            SessionAction::CancelTimer(TimerId::KeepAliveDelay),
            SessionAction::Signal(SessionSignal::HelperRemoved),
        ]
    }
}
