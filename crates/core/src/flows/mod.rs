pub mod engine;
pub mod states;

pub use engine::{DispatchFlow, DispatchTransitionError};
pub use states::{DispatchEvent, DispatchState, DispatchTrace};
