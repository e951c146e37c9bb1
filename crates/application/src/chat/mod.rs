mod dispatcher;
mod frames;
mod simulation;

pub use dispatcher::{ChatDispatcher, ChatDispatcherDependencies, ChatSettings, SessionState};
pub use frames::{DispatchRequest, DispatchResponse, HeaderPayload, MessagePayload};
pub use simulation::{BusinessFailureSimulation, DEFAULT_TRIGGER, SIMULATED_REASON};
