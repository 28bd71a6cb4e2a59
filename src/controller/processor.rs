use tokio::sync::{
    mpsc::{self, Receiver, Sender},
    oneshot,
};
use tracing::{debug, info};

use super::{
    machine::{ControllerSnapshot, HelperController},
    signal::Signal,
};
use crate::common::ControllerError;
use crate::config::ControllerConfig;

/*
    Sessions run concurrently and may signal at any time. The controller
    itself is a single consumer: one message is taken off the mailbox and
    handled to completion before the next, so guard evaluation, mutation and
    recount for one signal never interleave with another.
*/

#[derive(Debug)]
pub enum ControllerMessage {
    Signal(Signal),
    Snapshot(oneshot::Sender<ControllerSnapshot>),
}

pub struct ControllerProcessor {
    pub controller: HelperController,
    pub msg_rx: Receiver<ControllerMessage>,
}

/// Cloneable sending side of the controller mailbox.
#[derive(Clone, Debug)]
pub struct ControllerHandle {
    msg_tx: Sender<ControllerMessage>,
}

impl ControllerProcessor {
    pub fn new(config: &ControllerConfig) -> (Self, ControllerHandle) {
        let (msg_tx, msg_rx) = mpsc::channel(config.mailbox_capacity);
        let processor = ControllerProcessor {
            controller: HelperController::new(),
            msg_rx,
        };
        (processor, ControllerHandle { msg_tx })
    }

    /// Process messages until every handle has been dropped, then hand the
    /// controller back.
    pub async fn run(mut self) -> HelperController {
        info!("Running controller processor");
        while let Some(message) = self.msg_rx.recv().await {
            match message {
                ControllerMessage::Signal(signal) => {
                    // Rejections are already reported by the controller.
                    let _ = self.controller.handle(signal);
                }
                ControllerMessage::Snapshot(reply) => {
                    if reply.send(self.controller.snapshot()).is_err() {
                        debug!("Snapshot requester went away");
                    }
                }
            }
        }
        info!(state = %self.controller.state(), "Controller mailbox closed");
        self.controller
    }
}

impl ControllerHandle {
    pub async fn send(&self, signal: Signal) -> Result<(), ControllerError> {
        self.msg_tx
            .send(ControllerMessage::Signal(signal))
            .await
            .map_err(|_| ControllerError::MailboxClosed)
    }

    pub async fn create_helper(&self, id: impl Into<String>) -> Result<(), ControllerError> {
        self.send(Signal::CreateHelper(id.into())).await
    }

    pub async fn helper_accepted(&self, id: impl Into<String>) -> Result<(), ControllerError> {
        self.send(Signal::HelperAccepted(id.into())).await
    }

    pub async fn helper_removed(&self, id: impl Into<String>) -> Result<(), ControllerError> {
        self.send(Signal::HelperRemoved(id.into())).await
    }

    pub async fn helper_in_sync(&self, id: impl Into<String>) -> Result<(), ControllerError> {
        self.send(Signal::HelperInSync(id.into())).await
    }

    pub async fn helper_out_of_sync(&self, id: impl Into<String>) -> Result<(), ControllerError> {
        self.send(Signal::HelperOutOfSync(id.into())).await
    }

    /// Snapshot taken after every message queued before this call.
    pub async fn snapshot(&self) -> Result<ControllerSnapshot, ControllerError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.msg_tx
            .send(ControllerMessage::Snapshot(reply_tx))
            .await
            .map_err(|_| ControllerError::MailboxClosed)?;
        reply_rx.await.map_err(|_| ControllerError::MailboxClosed)
    }
}
