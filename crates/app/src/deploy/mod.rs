//! Client side of a deploy: the form, the workflow state machine, and the
//! transport it talks through.

mod error;
mod events;
mod form;
mod phase;
mod transport;
mod workflow;

pub use error::DeployError;
pub use events::DeployEvent;
pub use form::DeployForm;
pub use phase::DeployPhase;
pub use transport::{parse_deployment, DeployTransport, HttpTransport};
pub use workflow::{DeployOptions, DeployOutcome, Deployer, DEFAULT_MEDIA_CONCURRENCY};
