pub mod machine;
pub mod membership;
pub mod processor;
pub mod quorum;
pub mod registry;
pub mod signal;

pub use machine::*;
pub use membership::*;
pub use processor::*;
pub use quorum::*;
pub use registry::*;
pub use signal::*;

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::common::HelperId;
    use crate::config::{ControllerConfig, SessionConfig};
    use crate::network::{SimulatedPeerConfig, SimulatedTransport};
    use crate::session::{SessionRunner, SessionState};

    #[tokio::test(start_paused = true)]
    async fn test_end_to_end() {
        // Arrange: controller and four reliable helpers
        let (processor, controller) = ControllerProcessor::new(&ControllerConfig::default());
        tokio::spawn(processor.run());

        let session_config = SessionConfig::default()
            .with_pair_timeout(Duration::from_millis(200))
            .with_keep_alive_timeout(Duration::from_millis(100))
            .with_keep_alive_delay(Duration::from_millis(50));

        let mut sessions = Vec::new();
        for (seed, name) in ["Alice", "bob", "carol", "dave"].into_iter().enumerate() {
            controller.create_helper(name).await.unwrap();
            let transport = SimulatedTransport::new(SimulatedPeerConfig::default(), seed as u64);
            let helper = HelperId::parse(name).unwrap();
            sessions.push(SessionRunner::spawn(helper, transport, session_config.clone(), controller.clone()));
        }

        // Act: let pairing and the first keep-alive rounds complete
        tokio::time::sleep(Duration::from_secs(1)).await;

        // Assert: every helper paired and online
        let snapshot = controller.snapshot().await.unwrap();
        assert_eq!(snapshot.accepted_count, 4);
        assert_eq!(snapshot.online_count, 4);
        assert_eq!(snapshot.quorum, 2);
        assert_eq!(snapshot.path(), "enoughHelpers.quorate");

        // Act: two helpers leave
        for (handle, task) in sessions.drain(..2) {
            handle.unpair().await.unwrap();
            assert_eq!(task.await.unwrap(), Ok(SessionState::Unpaired));
        }

        // Assert: membership falls back, removed records stay behind
        let snapshot = controller.snapshot().await.unwrap();
        assert_eq!(snapshot.state, Membership::TooFewHelpers);
        assert_eq!(snapshot.accepted_count, 2);
        assert_eq!(snapshot.online_count, 2);
        assert_eq!(snapshot.helpers.len(), 4);
        assert!(!snapshot.helpers[0].accepted);
        assert!(!snapshot.helpers[1].accepted);
    }

    #[tokio::test(start_paused = true)]
    async fn test_silent_helpers_never_reach_quorum() {
        let (processor, controller) = ControllerProcessor::new(&ControllerConfig::default());
        tokio::spawn(processor.run());

        let silent = SimulatedPeerConfig {
            loss_probability: 1.0,
            ..Default::default()
        };
        for (seed, name) in ["alice", "bob", "carol"].into_iter().enumerate() {
            controller.create_helper(name).await.unwrap();
            let transport = SimulatedTransport::new(silent.clone(), seed as u64);
            let _session = SessionRunner::spawn(
                HelperId::parse(name).unwrap(),
                transport,
                SessionConfig::default(),
                controller.clone(),
            );
        }

        tokio::time::sleep(Duration::from_secs(30)).await;

        let snapshot = controller.snapshot().await.unwrap();
        assert_eq!(snapshot.state, Membership::TooFewHelpers);
        assert_eq!(snapshot.accepted_count, 0);
        assert_eq!(snapshot.helpers.len(), 3);
    }
}
