use std::fmt;

use super::registry::HelperRegistry;
use crate::common::HelperId;

/*
    Quorum is only meaningful once membership is satisfied. Whenever the
    controller (re-)enters EnoughHelpers it passes through FindQuorum, which
    derives Quorate/Inquorate from the current recount and is never a resting
    state. The two event guards look at the count *before* the pending mark is
    applied, so "one more" or "one fewer" is folded into the comparison.
*/

/// Minimum number of online helpers for the given accepted count.
pub fn quorum(accepted: usize) -> usize {
    accepted.div_ceil(2)
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum QuorumState {
    Quorate,
    Inquorate,
}

impl QuorumState {
    /// The FindQuorum pass-through.
    pub fn find(registry: &HelperRegistry) -> Self {
        if registry.online_count() >= quorum(registry.accepted_count()) {
            QuorumState::Quorate
        } else {
            QuorumState::Inquorate
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            QuorumState::Quorate => "quorate",
            QuorumState::Inquorate => "inquorate",
        }
    }
}

impl fmt::Display for QuorumState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Whether taking `id` offline drops the user out of quorum.
///
/// Valid only for an accepted, online helper. Compares the current online
/// count with `<=`, i.e. the count after the mark falls below quorum.
pub fn loses_quorum(registry: &HelperRegistry, id: &HelperId) -> bool {
    if registry.check_offline(id.as_str()).is_err() {
        return false;
    }
    registry.online_count() <= quorum(registry.accepted_count())
}

/// Whether bringing `id` online restores quorum.
///
/// Valid only for an accepted, offline helper. The current count is compared
/// against one less than quorum, since the helper being marked counts too.
pub fn regains_quorum(registry: &HelperRegistry, id: &HelperId) -> bool {
    if registry.check_online(id.as_str()).is_err() {
        return false;
    }
    registry.online_count() >= quorum(registry.accepted_count()).saturating_sub(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry(accepted: &[&str], online: &[&str]) -> HelperRegistry {
        let mut registry = HelperRegistry::new();
        for raw in accepted {
            let id = registry.create(raw).unwrap();
            registry.accept(&id).unwrap();
        }
        for raw in online {
            registry.mark_online(&HelperId::parse(raw).unwrap()).unwrap();
        }
        registry
    }

    fn id(raw: &str) -> HelperId {
        HelperId::parse(raw).unwrap()
    }

    #[test]
    fn test_quorum_rounds_up() {
        assert_eq!(quorum(0), 0);
        assert_eq!(quorum(1), 1);
        assert_eq!(quorum(3), 2);
        assert_eq!(quorum(4), 2);
        assert_eq!(quorum(5), 3);
    }

    #[test]
    fn test_find_quorum() {
        assert_eq!(QuorumState::find(&registry(&["a", "b", "c"], &[])), QuorumState::Inquorate);
        assert_eq!(QuorumState::find(&registry(&["a", "b", "c"], &["a"])), QuorumState::Inquorate);
        assert_eq!(QuorumState::find(&registry(&["a", "b", "c"], &["a", "b"])), QuorumState::Quorate);
    }

    #[test]
    fn test_regains_quorum_on_second_helper() {
        let none_online = registry(&["a", "b", "c"], &[]);
        assert!(!regains_quorum(&none_online, &id("a")));

        let one_online = registry(&["a", "b", "c"], &["a"]);
        assert!(regains_quorum(&one_online, &id("b")));
    }

    #[test]
    fn test_regains_quorum_rejects_invalid_signal() {
        let one_online = registry(&["a", "b", "c"], &["a"]);

        assert!(!regains_quorum(&one_online, &id("a")));
        assert!(!regains_quorum(&one_online, &id("zed")));
    }

    #[test]
    fn test_loses_quorum() {
        let two_online = registry(&["a", "b", "c"], &["a", "b"]);
        assert!(loses_quorum(&two_online, &id("b")));

        let three_online = registry(&["a", "b", "c"], &["a", "b", "c"]);
        assert!(!loses_quorum(&three_online, &id("c")));
    }

    #[test]
    fn test_loses_quorum_rejects_offline_helper() {
        let two_online = registry(&["a", "b", "c"], &["a", "b"]);
        assert!(!loses_quorum(&two_online, &id("c")));
    }
}
