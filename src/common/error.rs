use super::identity::HelperId;

/// Reasons the registry refuses a request.
///
/// `EmptyId` and `AlreadyExists` are malformed create requests; the rest are
/// signals that reference a helper not in the prerequisite state. None of them
/// is fatal: the registry is left exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("helper id must not be empty")]
    EmptyId,

    #[error("helper {0} already exists")]
    AlreadyExists(HelperId),

    #[error("helper '{0}' is unknown")]
    UnknownHelper(String),

    #[error("helper {0} is already accepted")]
    AlreadyAccepted(HelperId),

    #[error("helper {0} is not accepted")]
    NotAccepted(HelperId),

    #[error("helper {0} is already online")]
    AlreadyOnline(HelperId),

    #[error("helper {0} is not online")]
    NotOnline(HelperId),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ControllerError {
    #[error("controller mailbox is closed")]
    MailboxClosed,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("session for helper {0} has ended")]
    Closed(HelperId),

    #[error(transparent)]
    Controller(#[from] ControllerError),
}
