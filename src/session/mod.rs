pub mod machine;
pub mod runner;
pub mod timers;

pub use machine::*;
pub use runner::*;
pub use timers::*;
