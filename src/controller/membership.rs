use std::fmt;

use super::{quorum::QuorumState, registry::HelperRegistry};
use crate::common::HelperId;
use crate::config::MIN_HELPERS;

/// Top-level controller state. `EnoughHelpers` carries the nested quorum state.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Membership {
    TooFewHelpers,
    EnoughHelpers(QuorumState),
}

impl Membership {
    pub fn name(&self) -> &'static str {
        match self {
            Membership::TooFewHelpers => "tooFewHelpers",
            Membership::EnoughHelpers(_) => "enoughHelpers",
        }
    }

    pub fn quorum_state(&self) -> Option<QuorumState> {
        match self {
            Membership::TooFewHelpers => None,
            Membership::EnoughHelpers(quorum) => Some(*quorum),
        }
    }

    /// Dotted path of the active leaf state, e.g. `enoughHelpers.quorate`.
    pub fn path(&self) -> String {
        match self {
            Membership::TooFewHelpers => self.name().to_string(),
            Membership::EnoughHelpers(quorum) => format!("{}.{}", self.name(), quorum.name()),
        }
    }
}

impl fmt::Display for Membership {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// A valid accept of `id` brings the accepted count up to `MIN_HELPERS`.
pub fn enough_after_accept(registry: &HelperRegistry, id: &HelperId) -> bool {
    registry.check_accept(id.as_str()).is_ok() && registry.accepted_count() + 1 >= MIN_HELPERS
}

/// A valid removal of `id` drops the accepted count below `MIN_HELPERS`.
pub fn too_few_after_remove(registry: &HelperRegistry, id: &HelperId) -> bool {
    registry.check_remove(id.as_str()).is_ok() && registry.accepted_count().saturating_sub(1) < MIN_HELPERS
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry(created: &[&str], accepted: &[&str]) -> HelperRegistry {
        let mut registry = HelperRegistry::new();
        for raw in created {
            registry.create(raw).unwrap();
        }
        for raw in accepted {
            registry.accept(&HelperId::parse(raw).unwrap()).unwrap();
        }
        registry
    }

    fn id(raw: &str) -> HelperId {
        HelperId::parse(raw).unwrap()
    }

    #[test]
    fn test_enough_after_third_accept() {
        let two = registry(&["alice", "bob", "carol"], &["alice", "bob"]);
        assert!(enough_after_accept(&two, &id("carol")));

        let one = registry(&["alice", "bob", "carol"], &["alice"]);
        assert!(!enough_after_accept(&one, &id("bob")));
    }

    #[test]
    fn test_enough_after_accept_requires_valid_accept() {
        let two = registry(&["alice", "bob", "carol"], &["alice", "bob"]);

        assert!(!enough_after_accept(&two, &id("bob")));
        assert!(!enough_after_accept(&two, &id("dave")));
    }

    #[test]
    fn test_too_few_after_remove() {
        let three = registry(&["alice", "bob", "carol", "dave"], &["alice", "bob", "carol"]);
        assert!(too_few_after_remove(&three, &id("alice")));
        assert!(!too_few_after_remove(&three, &id("dave")));

        let four = registry(&["alice", "bob", "carol", "dave"], &["alice", "bob", "carol", "dave"]);
        assert!(!too_few_after_remove(&four, &id("alice")));
    }

    #[test]
    fn test_state_paths() {
        assert_eq!(Membership::TooFewHelpers.path(), "tooFewHelpers");
        assert_eq!(Membership::EnoughHelpers(QuorumState::Quorate).path(), "enoughHelpers.quorate");
        assert_eq!(Membership::EnoughHelpers(QuorumState::Inquorate).to_string(), "enoughHelpers.inquorate");
    }
}
