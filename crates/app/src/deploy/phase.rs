use std::fmt;

/// Where a deploy run currently is. Runs only move forward; `Failed` may be
/// entered from any non-terminal phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeployPhase {
    Idle,
    Picking,
    Validating,
    UploadingMedia,
    RewritingText,
    UploadingText,
    CreatingDeployment,
    Done,
    Failed,
}

impl DeployPhase {
    fn rank(self) -> u8 {
        match self {
            DeployPhase::Idle => 0,
            DeployPhase::Picking => 1,
            DeployPhase::Validating => 2,
            DeployPhase::UploadingMedia => 3,
            DeployPhase::RewritingText => 4,
            DeployPhase::UploadingText => 5,
            DeployPhase::CreatingDeployment => 6,
            DeployPhase::Done | DeployPhase::Failed => 7,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, DeployPhase::Done | DeployPhase::Failed)
    }

    pub fn can_advance_to(self, next: DeployPhase) -> bool {
        if self.is_terminal() {
            return false;
        }
        next == DeployPhase::Failed || next.rank() > self.rank()
    }
}

impl fmt::Display for DeployPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DeployPhase::Idle => "idle",
            DeployPhase::Picking => "picking",
            DeployPhase::Validating => "validating",
            DeployPhase::UploadingMedia => "uploading media",
            DeployPhase::RewritingText => "rewriting text",
            DeployPhase::UploadingText => "uploading text",
            DeployPhase::CreatingDeployment => "creating deployment",
            DeployPhase::Done => "done",
            DeployPhase::Failed => "failed",
        };
        f.write_str(name)
    }
}
