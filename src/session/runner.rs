use std::time::Duration;

use tokio::sync::mpsc::{self, Receiver};
use tokio::task::JoinHandle;
use tracing::{debug, info, trace};

use super::{
    machine::{HelperSession, SessionAction, SessionEvent, SessionSignal, SessionState, TimerId},
    timers::{TimerFired, TimerManager},
};
use crate::common::{HelperId, SessionError};
use crate::config::SessionConfig;
use crate::controller::{ControllerHandle, Signal};
use crate::network::{PeerSender, Transport};

const INBOX_CAPACITY: usize = 32;

/// Drives one `HelperSession`: feeds it transport replies and timer expiries,
/// carries out its actions, and forwards its lifecycle signals to the
/// controller. Ends when the session reaches `Unpaired`.
pub struct SessionRunner<T: Transport> {
    session: HelperSession,
    pending: Vec<SessionAction>,
    transport: T,
    timers: TimerManager,
    config: SessionConfig,
    controller: ControllerHandle,
    inbox_tx: PeerSender,
    inbox_rx: Receiver<SessionEvent>,
    fired_rx: Receiver<TimerFired>,
}

/// Lets the user side talk to a running session.
#[derive(Clone, Debug)]
pub struct SessionHandle {
    helper: HelperId,
    inbox_tx: PeerSender,
}

impl<T: Transport + 'static> SessionRunner<T> {
    pub fn new(
        helper: HelperId,
        transport: T,
        config: SessionConfig,
        controller: ControllerHandle,
    ) -> (Self, SessionHandle) {
        let (inbox_tx, inbox_rx) = mpsc::channel(INBOX_CAPACITY);
        let (fired_tx, fired_rx) = mpsc::channel(INBOX_CAPACITY);
        let (session, pending) = HelperSession::start(helper.clone());

        let runner = SessionRunner {
            session,
            pending,
            transport,
            timers: TimerManager::new(fired_tx),
            config,
            controller,
            inbox_tx: inbox_tx.clone(),
            inbox_rx,
            fired_rx,
        };
        (runner, SessionHandle { helper, inbox_tx })
    }

    /// Start the session on its own task.
    pub fn spawn(
        helper: HelperId,
        transport: T,
        config: SessionConfig,
        controller: ControllerHandle,
    ) -> (SessionHandle, JoinHandle<Result<SessionState, SessionError>>) {
        let (runner, handle) = Self::new(helper, transport, config, controller);
        (handle, tokio::spawn(runner.run()))
    }

    pub async fn run(mut self) -> Result<SessionState, SessionError> {
        info!(helper = %self.session.helper(), "Running helper session");

        let pending = std::mem::take(&mut self.pending);
        self.execute(pending).await?;

        while !self.session.is_terminated() {
            let event = tokio::select! {
                Some(event) = self.inbox_rx.recv() => event,
                Some(fired) = self.fired_rx.recv() => {
                    if !self.timers.take_fired(fired) {
                        continue;
                    }
                    fired.id.event()
                }
                else => break,
            };

            let actions = self.session.handle(event);
            self.execute(actions).await?;
        }

        self.timers.cancel_all();
        info!(helper = %self.session.helper(), state = %self.session.state(), "Helper session ended");
        Ok(self.session.state())
    }

    async fn execute(&mut self, actions: Vec<SessionAction>) -> Result<(), SessionError> {
        for action in actions {
            trace!(helper = %self.session.helper(), ?action, "Executing session action");
            match action {
                SessionAction::SendPairRequest => {
                    self.transport.send_pair_request(self.session.helper(), self.inbox_tx.clone());
                }
                SessionAction::SendKeepAliveRequest => {
                    self.transport
                        .send_keep_alive_request(self.session.helper(), self.inbox_tx.clone());
                }
                SessionAction::SetTimer(id) => {
                    let duration = self.duration(id);
                    self.timers.set_timer(id, duration);
                }
                SessionAction::CancelTimer(id) => self.timers.cancel_timer(id),
                SessionAction::Signal(signal) => {
                    let signal = controller_signal(self.session.helper(), signal);
                    debug!(signal = signal.name(), helper = signal.helper(), "Signalling controller");
                    self.controller.send(signal).await?;
                }
            }
        }
        Ok(())
    }

    fn duration(&self, id: TimerId) -> Duration {
        match id {
            TimerId::Pair => self.config.pair_timeout,
            TimerId::KeepAliveResponse => self.config.keep_alive_timeout,
            TimerId::KeepAliveDelay => self.config.keep_alive_delay,
        }
    }
}

/// The controller knows a newly paired helper as accepted.
fn controller_signal(helper: &HelperId, signal: SessionSignal) -> Signal {
    let id = helper.to_string();
    match signal {
        SessionSignal::HelperAdded => Signal::HelperAccepted(id),
        SessionSignal::HelperInSync => Signal::HelperInSync(id),
        SessionSignal::HelperOutOfSync => Signal::HelperOutOfSync(id),
        SessionSignal::HelperRemoved => Signal::HelperRemoved(id),
    }
}

impl SessionHandle {
    pub fn helper(&self) -> &HelperId {
        &self.helper
    }

    /// Deliver an event as if it came from the transport.
    pub async fn deliver(&self, event: SessionEvent) -> Result<(), SessionError> {
        self.inbox_tx
            .send(event)
            .await
            .map_err(|_| SessionError::Closed(self.helper.clone()))
    }

    /// Ask the session to unpair. A session that has already ended is left
    /// alone.
    pub async fn unpair(&self) -> Result<(), SessionError> {
        match self.deliver(SessionEvent::UnpairRequest).await {
            Err(SessionError::Closed(helper)) => {
                trace!(%helper, "Unpair for ended session ignored");
                Ok(())
            }
            result => result,
        }
    }
}
