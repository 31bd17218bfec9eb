pub mod cookie;
pub mod gate;
pub mod identity;
pub mod partition;
pub mod response;
pub mod route_gate;

pub use cookie::extract_credential;
pub use gate::{Decision, GateRejection, RouteGate};
pub use identity::{CurrentIdentity, IDENTITY_HEADER};
pub use partition::{LandingRule, PartitionError, PartitionOutcome, PartitionRule, PartitionTable};
pub use response::ApiResponse;
pub use route_gate::route_gate_middleware;
