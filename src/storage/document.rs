//! Output file for generated documents

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// A text document written atomically to disk
pub struct DocumentFile {
    path: PathBuf,
}

impl DocumentFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the path of the document
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replaces the document contents (temp file + rename)
    pub fn write(&self, text: &str) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let mut temp_name = self.path.as_os_str().to_owned();
        temp_name.push(".tmp");
        let temp_path = PathBuf::from(temp_name);

        fs::write(&temp_path, text)
            .with_context(|| format!("Failed to write temp file: {}", temp_path.display()))?;

        fs::rename(&temp_path, &self.path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                temp_path.display(),
                self.path.display()
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn writes_and_replaces_content() {
        let dir = TempDir::new().unwrap();
        let doc = DocumentFile::new(dir.path().join("nested").join("Requirements.md"));

        doc.write("first").unwrap();
        doc.write("second").unwrap();

        assert_eq!(fs::read_to_string(doc.path()).unwrap(), "second");
        assert!(!dir.path().join("nested").join("Requirements.md.tmp").exists());
    }
}
