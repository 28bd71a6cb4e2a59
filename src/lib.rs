/*
    A user spreads the recoverability of its secrets over a pool of helpers.
    To stay operational it needs two things at once: enough helpers paired
    (membership), and enough of those reachable right now (quorum).

    Each helper is tracked by its own session machine, which owns pairing and
    the keep-alive loop for that helper and reports lifecycle changes. A
    single controller consumes those reports one at a time, keeps the
    authoritative helper registry, and decides membership and, nested inside
    it, quorum. Signals only ever flow from sessions to the controller.
*/

pub mod common;
pub mod config;
pub mod controller;
pub mod network;
pub mod session;

pub use common::{ControllerError, HelperId, RegistryError, SessionError};
pub use config::{ControllerConfig, SessionConfig, MIN_HELPERS};
pub use controller::{
    ControllerHandle, ControllerProcessor, ControllerSnapshot, HelperController, HelperRecord,
    HelperRegistry, Membership, QuorumState, Signal,
};
pub use session::{HelperSession, SessionEvent, SessionHandle, SessionRunner, SessionState};
