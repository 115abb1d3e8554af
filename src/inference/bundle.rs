//! Loaded artifact bundle

use std::path::{Path, PathBuf};
use tracing::info;

use crate::config::{ENCODER_FILE, IMPUTER_FILE, MODEL_FILE};
use crate::error::Result;
use crate::preprocessing::{MedianImputer, OneHotEncoder};
use crate::training::HousingModel;
use crate::utils::{load_artifact, save_artifact};

/// The three fitted objects needed to serve predictions
#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactBundle {
    pub model: HousingModel,
    pub imputer: MedianImputer,
    pub encoder: OneHotEncoder,
}

impl ArtifactBundle {
    /// Write `model.bin`, `imputer.bin` and `encoder.bin` into `dir`
    pub fn save(&self, dir: &Path) -> Result<()> {
        save_artifact(&self.model, &dir.join(MODEL_FILE))?;
        save_artifact(&self.imputer, &dir.join(IMPUTER_FILE))?;
        save_artifact(&self.encoder, &dir.join(ENCODER_FILE))?;
        info!(dir = %dir.display(), "Saved model, imputer and encoder");
        Ok(())
    }

    /// Paths of the artifact files inside `dir`
    pub fn files(dir: &Path) -> [PathBuf; 3] {
        [
            dir.join(MODEL_FILE),
            dir.join(IMPUTER_FILE),
            dir.join(ENCODER_FILE),
        ]
    }
}

/// Load all three artifacts; `ArtifactMissing` names the first absent file
pub fn load_artifacts(dir: &Path) -> Result<ArtifactBundle> {
    let [model_path, imputer_path, encoder_path] = ArtifactBundle::files(dir);

    let bundle = ArtifactBundle {
        model: load_artifact(&model_path)?,
        imputer: load_artifact(&imputer_path)?,
        encoder: load_artifact(&encoder_path)?,
    };

    info!(
        dir = %dir.display(),
        n_features = bundle.model.feature_names().len(),
        n_iter = bundle.model.regressor().n_iter(),
        "Loaded artifacts"
    );
    Ok(bundle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HousingError;

    #[test]
    fn test_empty_dir_reports_missing_model() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_artifacts(dir.path()).unwrap_err();
        assert!(matches!(err, HousingError::ArtifactMissing(p) if p == dir.path().join("model.bin")));
    }

    #[test]
    fn test_file_layout() {
        let files = ArtifactBundle::files(Path::new("artifacts"));
        assert_eq!(files[0], PathBuf::from("artifacts/model.bin"));
        assert_eq!(files[1], PathBuf::from("artifacts/imputer.bin"));
        assert_eq!(files[2], PathBuf::from("artifacts/encoder.bin"));
    }
}
