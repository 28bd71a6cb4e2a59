//! The user-side controller: membership with nested quorum.
//!
//! [`HelperController::handle`] runs one signal to completion: validate
//! against the registry, evaluate the guard of the active state on the
//! pre-mutation counts, mutate (which recounts), then move state.

use tracing::{debug, info, warn};

use super::{
    membership::{enough_after_accept, too_few_after_remove, Membership},
    quorum::{loses_quorum, quorum, regains_quorum, QuorumState},
    registry::{HelperRecord, HelperRegistry},
    signal::Signal,
};
use crate::common::RegistryError;
use crate::config::MIN_HELPERS;

/// What a successfully handled signal did.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Handled {
    /// The registry changed; the state did not.
    Applied,
    Transitioned { from: Membership, to: Membership },
}

/// Read-only view of the controller for the presentation side.
#[derive(Clone, Debug)]
pub struct ControllerSnapshot {
    pub state: Membership,
    pub previous: Option<Membership>,
    pub accepted_count: usize,
    pub online_count: usize,
    pub quorum: usize,
    pub min_helpers: usize,
    pub helpers: Vec<HelperRecord>,
    pub last_signal: Option<Signal>,
    pub last_error: Option<String>,
}

impl ControllerSnapshot {
    pub fn top_state(&self) -> &'static str {
        self.state.name()
    }

    pub fn quorum_state(&self) -> Option<QuorumState> {
        self.state.quorum_state()
    }

    pub fn path(&self) -> String {
        self.state.path()
    }
}

#[derive(Debug)]
pub struct HelperController {
    registry: HelperRegistry,
    state: Membership,
    previous: Option<Membership>,
    last_signal: Option<Signal>,
    last_error: Option<String>,
}

impl Default for HelperController {
    fn default() -> Self {
        Self::new()
    }
}

impl HelperController {
    pub fn new() -> Self {
        HelperController {
            registry: HelperRegistry::new(),
            state: Membership::TooFewHelpers,
            previous: None,
            last_signal: None,
            last_error: None,
        }
    }

    pub fn state(&self) -> Membership {
        self.state
    }

    pub fn registry(&self) -> &HelperRegistry {
        &self.registry
    }

    pub fn quorum(&self) -> usize {
        quorum(self.registry.accepted_count())
    }

    pub fn snapshot(&self) -> ControllerSnapshot {
        ControllerSnapshot {
            state: self.state,
            previous: self.previous,
            accepted_count: self.registry.accepted_count(),
            online_count: self.registry.online_count(),
            quorum: self.quorum(),
            min_helpers: MIN_HELPERS,
            helpers: self.registry.records(),
            last_signal: self.last_signal.clone(),
            last_error: self.last_error.clone(),
        }
    }

    /// Handle a single signal.
    ///
    /// A rejected signal leaves registry and state untouched; the error is
    /// logged here and also returned to the caller.
    pub fn handle(&mut self, signal: Signal) -> Result<Handled, RegistryError> {
        let result = match &signal {
            Signal::CreateHelper(raw) => self.on_create(raw),
            Signal::HelperAccepted(raw) => self.on_accepted(raw),
            Signal::HelperRemoved(raw) => self.on_removed(raw),
            Signal::HelperInSync(raw) => self.on_in_sync(raw),
            Signal::HelperOutOfSync(raw) => self.on_out_of_sync(raw),
        };

        match &result {
            Ok(Handled::Transitioned { from, to }) => {
                self.previous = Some(*from);
                info!(
                    signal = signal.name(),
                    helper = signal.helper(),
                    %from,
                    %to,
                    accepted = self.registry.accepted_count(),
                    online = self.registry.online_count(),
                    "Controller state changed"
                );
            }
            Ok(Handled::Applied) => {
                debug!(
                    signal = signal.name(),
                    helper = signal.helper(),
                    state = %self.state,
                    accepted = self.registry.accepted_count(),
                    online = self.registry.online_count(),
                    "Signal applied"
                );
            }
            Err(e) => {
                warn!(signal = signal.name(), helper = signal.helper(), error = %e, "Signal rejected");
                self.last_error = Some(e.to_string());
                self.unmatched(&signal);
            }
        }

        self.last_signal = Some(signal);
        result
    }

    fn on_create(&mut self, raw: &str) -> Result<Handled, RegistryError> {
        self.registry.create(raw)?;
        Ok(Handled::Applied)
    }

    fn on_accepted(&mut self, raw: &str) -> Result<Handled, RegistryError> {
        let id = self.registry.check_accept(raw)?;
        match self.state {
            Membership::TooFewHelpers => {
                let enough = enough_after_accept(&self.registry, &id);
                self.registry.accept(&id)?;
                if enough {
                    return Ok(self.enter_enough_helpers());
                }
                Ok(Handled::Applied)
            }
            Membership::EnoughHelpers(_) => {
                self.registry.accept(&id)?;
                Ok(self.find_quorum())
            }
        }
    }

    fn on_removed(&mut self, raw: &str) -> Result<Handled, RegistryError> {
        let id = self.registry.check_remove(raw)?;
        match self.state {
            Membership::EnoughHelpers(_) => {
                let too_few = too_few_after_remove(&self.registry, &id);
                self.registry.remove(&id)?;
                if too_few {
                    return Ok(self.transition(Membership::TooFewHelpers));
                }
                Ok(self.find_quorum())
            }
            Membership::TooFewHelpers => {
                self.registry.remove(&id)?;
                Ok(Handled::Applied)
            }
        }
    }

    fn on_in_sync(&mut self, raw: &str) -> Result<Handled, RegistryError> {
        let id = self.registry.check_online(raw)?;
        match self.state {
            Membership::EnoughHelpers(QuorumState::Inquorate) => {
                let regained = regains_quorum(&self.registry, &id);
                self.registry.mark_online(&id)?;
                if regained {
                    return Ok(self.transition(Membership::EnoughHelpers(QuorumState::Quorate)));
                }
                Ok(Handled::Applied)
            }
            _ => {
                self.registry.mark_online(&id)?;
                Ok(Handled::Applied)
            }
        }
    }

    fn on_out_of_sync(&mut self, raw: &str) -> Result<Handled, RegistryError> {
        let id = self.registry.check_offline(raw)?;
        match self.state {
            Membership::EnoughHelpers(QuorumState::Quorate) => {
                let lost = loses_quorum(&self.registry, &id);
                self.registry.mark_offline(&id)?;
                if lost {
                    return Ok(self.transition(Membership::EnoughHelpers(QuorumState::Inquorate)));
                }
                Ok(Handled::Applied)
            }
            _ => {
                self.registry.mark_offline(&id)?;
                Ok(Handled::Applied)
            }
        }
    }

    fn enter_enough_helpers(&mut self) -> Handled {
        self.transition(Membership::EnoughHelpers(QuorumState::find(&self.registry)))
    }

    /// Re-derive the quorum sub-state after the accepted count moved but
    /// membership held.
    fn find_quorum(&mut self) -> Handled {
        let next = Membership::EnoughHelpers(QuorumState::find(&self.registry));
        if next == self.state {
            return Handled::Applied;
        }
        self.transition(next)
    }

    fn transition(&mut self, to: Membership) -> Handled {
        let from = self.state;
        self.state = to;
        Handled::Transitioned { from, to }
    }

    fn unmatched(&self, signal: &Signal) {
        info!(
            signal = signal.name(),
            helper = signal.helper(),
            state = %self.state,
            helper_count = self.registry.accepted_count(),
            helpers_online = self.registry.online_count(),
            "Signal not matched in current state"
        );
    }
}
