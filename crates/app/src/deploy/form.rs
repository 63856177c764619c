use common::selection::FileSelection;

/// The user's inputs for one deploy: a project name and a file selection.
#[derive(Debug, Clone, Default)]
pub struct DeployForm {
    name: String,
    selection: FileSelection,
}

impl DeployForm {
    pub fn new(name: impl Into<String>, selection: FileSelection) -> Self {
        Self {
            name: name.into(),
            selection,
        }
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Replace the selection wholesale
    pub fn set_selection(&mut self, selection: FileSelection) {
        self.selection = selection;
    }

    /// Trimmed project name
    pub fn project_name(&self) -> &str {
        self.name.trim()
    }

    pub fn selection(&self) -> &FileSelection {
        &self.selection
    }

    /// True exactly when the trimmed name is non-empty and files are picked
    pub fn can_deploy(&self) -> bool {
        !self.project_name().is_empty() && !self.selection.is_empty()
    }
}
