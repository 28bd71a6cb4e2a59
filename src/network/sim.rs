use std::time::Duration;

use rand::{rngs::StdRng, Rng, SeedableRng};
use tracing::trace;

use super::{PeerSender, Transport};
use crate::common::HelperId;
use crate::session::SessionEvent;

/// Behaviour of a simulated helper.
#[derive(Debug, Clone)]
pub struct SimulatedPeerConfig {
    /// Chance that a pairing answer is a refusal.
    pub refuse_probability: f64,
    /// Chance that any request goes unanswered.
    pub loss_probability: f64,
    pub min_latency: Duration,
    pub max_latency: Duration,
}

impl Default for SimulatedPeerConfig {
    fn default() -> Self {
        Self {
            refuse_probability: 0.0,
            loss_probability: 0.0,
            min_latency: Duration::from_millis(5),
            max_latency: Duration::from_millis(50),
        }
    }
}

/// A helper that answers from a seeded RNG, after a random delay.
pub struct SimulatedTransport {
    config: SimulatedPeerConfig,
    rng: StdRng,
}

impl SimulatedTransport {
    pub fn new(config: SimulatedPeerConfig, seed: u64) -> Self {
        SimulatedTransport {
            config,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    fn latency(&mut self) -> Duration {
        let min = self.config.min_latency.as_millis() as u64;
        let max = self.config.max_latency.as_millis() as u64;
        if max <= min {
            return self.config.min_latency;
        }
        Duration::from_millis(self.rng.gen_range(min..=max))
    }

    fn lost(&mut self) -> bool {
        self.rng.gen_bool(self.config.loss_probability.clamp(0.0, 1.0))
    }

    fn reply(&mut self, helper: &HelperId, event: SessionEvent, reply_to: PeerSender) {
        let latency = self.latency();
        trace!(%helper, ?event, ?latency, "Simulated reply scheduled");
        tokio::spawn(async move {
            tokio::time::sleep(latency).await;
            let _ = reply_to.send(event).await;
        });
    }
}

impl Transport for SimulatedTransport {
    fn send_pair_request(&mut self, helper: &HelperId, reply_to: PeerSender) {
        if self.lost() {
            trace!(%helper, "Simulated pair request lost");
            return;
        }
        let refused = self.rng.gen_bool(self.config.refuse_probability.clamp(0.0, 1.0));
        let event = if refused {
            SessionEvent::PairRefused
        } else {
            SessionEvent::PairAccepted
        };
        self.reply(helper, event, reply_to);
    }

    fn send_keep_alive_request(&mut self, helper: &HelperId, reply_to: PeerSender) {
        if self.lost() {
            trace!(%helper, "Simulated keep-alive lost");
            return;
        }
        self.reply(helper, SessionEvent::KeepAliveReplyReceived, reply_to);
    }
}
