use super::phase::DeployPhase;

/// Progress emitted while a deploy runs
#[derive(Debug, Clone, PartialEq)]
pub enum DeployEvent {
    /// One line of the running log
    Log(String),
    /// The run entered a new phase
    Phase(DeployPhase),
    /// The deployment is live at `url`
    Done { url: String },
    /// The run stopped at the first failing step
    Failed { error: String },
}
