//! Turns an image file on disk into the payload handed to the session.

use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use shared::domain::ImagePayload;

pub async fn read_image(path: &Path) -> Result<ImagePayload> {
    let mime_type = mime_guess::from_path(path)
        .first_raw()
        .filter(|mime| mime.starts_with("image/"))
        .ok_or_else(|| anyhow!("'{}' does not look like an image file", path.display()))?;

    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read image '{}'", path.display()))?;
    if bytes.is_empty() {
        bail!("image file '{}' is empty", path.display());
    }

    Ok(ImagePayload::from_bytes(mime_type, &bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn builds_data_url_from_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("subject.png");
        tokio::fs::write(&path, b"png-bytes").await.expect("write");

        let payload = read_image(&path).await.expect("read");
        assert_eq!(payload.mime_type(), Some("image/png"));
        assert_eq!(payload.decode_bytes().as_deref(), Some(&b"png-bytes"[..]));
    }

    #[tokio::test]
    async fn rejects_non_image_extension() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("notes.txt");
        tokio::fs::write(&path, b"hello").await.expect("write");

        let err = read_image(&path).await.expect_err("must fail");
        assert!(err.to_string().contains("does not look like an image"));
    }

    #[tokio::test]
    async fn rejects_missing_and_empty_files() {
        let dir = tempfile::tempdir().expect("temp dir");
        let missing = dir.path().join("missing.jpg");
        assert!(read_image(&missing).await.is_err());

        let empty = dir.path().join("empty.jpg");
        tokio::fs::write(&empty, b"").await.expect("write");
        let err = read_image(&empty).await.expect_err("must fail");
        assert!(err.to_string().contains("is empty"));
    }
}
