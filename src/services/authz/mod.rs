pub mod gate;

pub use gate::{AuthorizationGate, Decision, DenyReason, GateError, Operation};
