pub mod sim;

pub use sim::*;

use tokio::sync::mpsc;

use crate::common::HelperId;
use crate::session::SessionEvent;

/*
    The transport is whatever actually reaches a helper. The session only
    needs two requests to go out; whatever comes back is delivered to the
    session's inbox as pairAccepted, pairRefused or keepAliveReplyReceived.
    A request that is never answered is indistinguishable from a lost one:
    the session's own timers take care of it.
*/

/// Where a transport delivers a helper's replies.
pub type PeerSender = mpsc::Sender<SessionEvent>;

pub trait Transport: Send {
    fn send_pair_request(&mut self, helper: &HelperId, reply_to: PeerSender);

    fn send_keep_alive_request(&mut self, helper: &HelperId, reply_to: PeerSender);
}
