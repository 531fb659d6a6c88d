// ABOUTME: Artifact store for the testsmith home directory: features, scripts, test-case CSVs, token logs.
// ABOUTME: Handles directory creation, name validation, CSV export and filename lookup for downloads.

use std::fs;
use std::path::{Path, PathBuf};

use testsmith_core::{GenerationError, TEST_CASE_COLUMNS, TestCase, TokenDebug};
use thiserror::Error;
use ulid::Ulid;

/// Errors that can occur while writing or locating artifacts.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid artifact name: {0}")]
    InvalidName(String),
}

impl From<StoreError> for GenerationError {
    fn from(err: StoreError) -> Self {
        GenerationError::Storage(err.to_string())
    }
}

/// The subdirectory an artifact lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Feature,
    Script,
    TestCases,
    Log,
}

impl ArtifactKind {
    pub const ALL: [ArtifactKind; 4] = [
        ArtifactKind::Feature,
        ArtifactKind::Script,
        ArtifactKind::TestCases,
        ArtifactKind::Log,
    ];

    /// Kinds a client may download, in lookup order.
    pub const DOWNLOADABLE: [ArtifactKind; 3] = [
        ArtifactKind::Feature,
        ArtifactKind::TestCases,
        ArtifactKind::Script,
    ];

    pub fn dir_name(self) -> &'static str {
        match self {
            ArtifactKind::Feature => "features",
            ArtifactKind::Script => "scripts",
            ArtifactKind::TestCases => "test_cases",
            ArtifactKind::Log => "logs",
        }
    }
}

/// Owns the artifact home directory layout.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    home: PathBuf,
}

impl ArtifactStore {
    /// Create a store rooted at `home`, creating every artifact subdirectory.
    pub fn new(home: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let home = home.into();
        for kind in ArtifactKind::ALL {
            fs::create_dir_all(home.join(kind.dir_name()))?;
        }
        Ok(Self { home })
    }

    pub fn home(&self) -> &Path {
        &self.home
    }

    pub fn dir(&self, kind: ArtifactKind) -> PathBuf {
        self.home.join(kind.dir_name())
    }

    /// Write a `.feature` file, overwriting any previous file of the same name.
    pub fn save_feature(&self, file_name: &str, content: &str) -> Result<PathBuf, StoreError> {
        self.write_text(ArtifactKind::Feature, file_name, content)
    }

    /// Write a generated script file.
    pub fn save_script(&self, file_name: &str, content: &str) -> Result<PathBuf, StoreError> {
        self.write_text(ArtifactKind::Script, file_name, content)
    }

    /// Export test cases as CSV with a header row of column labels.
    /// `.csv` is appended when `file_name` lacks it.
    pub fn save_test_cases(
        &self,
        file_name: &str,
        cases: &[TestCase],
    ) -> Result<PathBuf, StoreError> {
        let file_name = if file_name.ends_with(".csv") {
            file_name.to_string()
        } else {
            format!("{file_name}.csv")
        };
        let path = self.path_for(ArtifactKind::TestCases, &file_name)?;

        let mut writer = csv::Writer::from_path(&path)?;
        writer.write_record(TEST_CASE_COLUMNS)?;
        for case in cases {
            writer.write_record(case.to_row())?;
        }
        writer.flush()?;

        tracing::info!(path = %path.display(), count = cases.len(), "saved test cases");
        Ok(path)
    }

    /// Persist a token debug report as `logs/token_debug_<ulid>.json`.
    pub fn save_token_debug(&self, debug: &TokenDebug) -> Result<PathBuf, StoreError> {
        let file_name = format!("token_debug_{}.json", Ulid::new());
        let path = self.path_for(ArtifactKind::Log, &file_name)?;
        fs::write(&path, serde_json::to_string_pretty(debug)?)?;
        tracing::debug!(path = %path.display(), "saved token debug log");
        Ok(path)
    }

    /// Locate a downloadable artifact by bare file name.
    /// Searches features, then test cases, then scripts.
    pub fn find(&self, file_name: &str) -> Option<PathBuf> {
        validate_name(file_name).ok()?;
        ArtifactKind::DOWNLOADABLE
            .iter()
            .map(|kind| self.dir(*kind).join(file_name))
            .find(|path| path.is_file())
    }

    fn write_text(
        &self,
        kind: ArtifactKind,
        file_name: &str,
        content: &str,
    ) -> Result<PathBuf, StoreError> {
        let path = self.path_for(kind, file_name)?;
        fs::write(&path, content)?;
        tracing::info!(path = %path.display(), bytes = content.len(), "saved {}", kind.dir_name());
        Ok(path)
    }

    fn path_for(&self, kind: ArtifactKind, file_name: &str) -> Result<PathBuf, StoreError> {
        validate_name(file_name)?;
        let dir = self.dir(kind);
        fs::create_dir_all(&dir)?;
        Ok(dir.join(file_name))
    }
}

/// Artifact names are single, non-hidden path components.
fn validate_name(file_name: &str) -> Result<(), StoreError> {
    let invalid = file_name.trim().is_empty()
        || file_name.starts_with('.')
        || file_name.contains(['/', '\\'])
        || file_name.contains('\0');
    if invalid {
        Err(StoreError::InvalidName(file_name.to_string()))
    } else {
        Ok(())
    }
}
