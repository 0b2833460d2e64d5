//! Cover image storage below the configured media root

use std::path::{Path, PathBuf};

use tokio::fs;

use crate::error::{AppError, AppResult};
use crate::models::book::CoverUpload;

const COVERS_DIR: &str = "covers";

#[derive(Clone)]
pub struct MediaStore {
    root: PathBuf,
}

impl MediaStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Store an uploaded cover and return its relative media path
    /// (`covers/<filename>`). Only the final path component of the uploaded
    /// name is kept.
    pub async fn save_cover(&self, upload: &CoverUpload) -> AppResult<String> {
        let filename = Path::new(&upload.filename)
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| AppError::BadRequest("Invalid cover image filename".to_string()))?
            .to_string();

        let dir = self.root.join(COVERS_DIR);
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to create media directory: {}", e)))?;

        let path = dir.join(&filename);
        fs::write(&path, &upload.content)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to store cover image: {}", e)))?;

        tracing::debug!("Stored cover image at {}", path.display());

        Ok(format!("{}/{}", COVERS_DIR, filename))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_cover_writes_under_covers_namespace() {
        let root = std::env::temp_dir().join("bookshelf-media-test");
        let store = MediaStore::new(&root);
        let upload = CoverUpload {
            filename: "cover.jpg".to_string(),
            content: b"file_content".to_vec(),
        };

        let path = tokio_test::block_on(store.save_cover(&upload)).expect("saved");
        assert_eq!(path, "covers/cover.jpg");
        assert_eq!(
            std::fs::read(root.join("covers").join("cover.jpg")).expect("file on disk"),
            b"file_content"
        );

        std::fs::remove_dir_all(&root).ok();
    }

    #[test]
    fn upload_filename_is_stripped_to_its_last_component() {
        let root = std::env::temp_dir().join("bookshelf-media-test-strip");
        let store = MediaStore::new(&root);
        let upload = CoverUpload {
            filename: "../../etc/cover.png".to_string(),
            content: b"x".to_vec(),
        };

        let path = tokio_test::block_on(store.save_cover(&upload)).expect("saved");
        assert_eq!(path, "covers/cover.png");

        std::fs::remove_dir_all(&root).ok();
    }
}
