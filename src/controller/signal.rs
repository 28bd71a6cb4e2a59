/*
    Signals are what the controller consumes. Helper sessions produce the
    lifecycle ones (accepted, removed, in-sync, out-of-sync); the presentation
    side creates helpers and may inject any of them directly. Ids arrive as
    free-form strings and are only normalized once they reach the registry.
*/

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Signal {
    CreateHelper(String),
    HelperAccepted(String),
    HelperRemoved(String),
    HelperInSync(String),
    HelperOutOfSync(String),
}

impl Signal {
    /// Event name used in diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            Signal::CreateHelper(_) => "createHelper",
            Signal::HelperAccepted(_) => "helperAccepted",
            Signal::HelperRemoved(_) => "helperRemoved",
            Signal::HelperInSync(_) => "helperInSync",
            Signal::HelperOutOfSync(_) => "helperOutOfSync",
        }
    }

    pub fn helper(&self) -> &str {
        match self {
            Signal::CreateHelper(id)
            | Signal::HelperAccepted(id)
            | Signal::HelperRemoved(id)
            | Signal::HelperInSync(id)
            | Signal::HelperOutOfSync(id) => id,
        }
    }
}
