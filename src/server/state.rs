//! Application state management

use crate::inference::ArtifactBundle;

/// Application state shared across handlers; read-only after startup
pub struct AppState {
    pub artifacts: Option<ArtifactBundle>,
}

impl AppState {
    pub fn new(artifacts: Option<ArtifactBundle>) -> Self {
        Self { artifacts }
    }

    /// State serving the given bundle
    pub fn with_artifacts(artifacts: ArtifactBundle) -> Self {
        Self::new(Some(artifacts))
    }

    /// State with nothing loaded; `/predict` answers 500
    pub fn without_artifacts() -> Self {
        Self::new(None)
    }

    pub fn artifacts(&self) -> Option<&ArtifactBundle> {
        self.artifacts.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_without_artifacts() {
        let state = AppState::without_artifacts();
        assert!(state.artifacts().is_none());
    }
}
