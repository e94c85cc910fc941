//! Uploaded event-image storage.
//!
//! Images live on the local filesystem under `<upload_dir>/events/` and are
//! referenced from `events.event_image` by filename only. Filenames are
//! generated as `{unix_ts}_{random10}.{ext}` so concurrent uploads cannot
//! collide.

use std::path::{Path, PathBuf};

use rand::Rng;

use crate::error::CoreError;

/// Subdirectory of the upload root that holds event images.
pub const EVENTS_DIR: &str = "events";

/// Maximum accepted upload size (2 MiB, matching the form-level limit).
pub const MAX_IMAGE_BYTES: usize = 2 * 1024 * 1024;

/// Accepted image file extensions.
const ALLOWED_EXTENSIONS: &[&str] = &["jpeg", "jpg", "png", "gif", "webp"];

/// Length of the random filename suffix.
const RANDOM_SUFFIX_LEN: usize = 10;

/// Validate an uploaded image and return its normalized (lowercase) extension.
///
/// Checks, in order: the filename extension is in the allow-list, the payload
/// is within [`MAX_IMAGE_BYTES`], and the magic bytes actually decode as a
/// known image format (a renamed `.exe` does not get stored).
pub fn validate_image_upload(filename: &str, data: &[u8]) -> Result<String, CoreError> {
    let ext = filename
        .rsplit('.')
        .next()
        .unwrap_or("")
        .to_ascii_lowercase();
    if !ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
        return Err(CoreError::Validation(format!(
            "Unsupported image type '{ext}'. Must be one of: {ALLOWED_EXTENSIONS:?}"
        )));
    }
    if data.len() > MAX_IMAGE_BYTES {
        return Err(CoreError::Validation(format!(
            "Image exceeds the maximum size of {} KB",
            MAX_IMAGE_BYTES / 1024
        )));
    }
    if image::guess_format(data).is_err() {
        return Err(CoreError::Validation(
            "Uploaded file is not a recognized image".into(),
        ));
    }
    Ok(ext)
}

/// Generate a collision-resistant stored filename for an image with the
/// given extension: `{unix_ts}_{random10}.{ext}`.
pub fn generate_image_filename(ext: &str) -> String {
    let ts = chrono::Utc::now().timestamp();
    let suffix: String = rand::rng()
        .sample_iter(&rand::distr::Alphanumeric)
        .take(RANDOM_SUFFIX_LEN)
        .map(char::from)
        .collect();
    format!("{ts}_{suffix}.{ext}")
}

/// Absolute path of a stored event image.
pub fn image_path(upload_dir: &Path, filename: &str) -> PathBuf {
    upload_dir.join(EVENTS_DIR).join(filename)
}

/// Write image bytes to `<upload_dir>/events/<filename>`, creating the
/// directory if needed.
pub async fn save_event_image(
    upload_dir: &Path,
    filename: &str,
    data: &[u8],
) -> Result<(), CoreError> {
    let dir = upload_dir.join(EVENTS_DIR);
    tokio::fs::create_dir_all(&dir)
        .await
        .map_err(|e| CoreError::Storage(format!("Failed to create {}: {e}", dir.display())))?;

    let path = dir.join(filename);
    tokio::fs::write(&path, data)
        .await
        .map_err(|e| CoreError::Storage(format!("Failed to write {}: {e}", path.display())))?;
    Ok(())
}

/// Remove a stored event image.
///
/// A missing file is not an error (the row may reference an image that was
/// already cleaned up); any other filesystem failure is surfaced.
pub async fn delete_event_image(upload_dir: &Path, filename: &str) -> Result<(), CoreError> {
    let path = image_path(upload_dir, filename);
    match tokio::fs::remove_file(&path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(CoreError::Storage(format!(
            "Failed to delete {}: {e}",
            path.display()
        ))),
    }
}
