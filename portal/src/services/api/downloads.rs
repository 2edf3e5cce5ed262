//! # File Downloads
//!
//! Authenticated downloads are fetched as bytes and written to a local file.

use crate::core::error::Result;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

/// Write downloaded bytes to `dir/file_name`, creating `dir` if needed.
///
/// An existing file with the same name is not overwritten: ` (1)`, ` (2)`, ...
/// is appended before the extension. Each candidate is claimed with an
/// exclusive create, so concurrent saves of one name never share a file.
pub async fn save_download(dir: &Path, file_name: &str, bytes: &[u8]) -> Result<PathBuf> {
    tokio::fs::create_dir_all(dir).await?;

    let file_name = sanitize_file_name(file_name);
    let mut n = 0;
    let (target, mut file) = loop {
        let candidate = dir.join(numbered_name(&file_name, n));
        match tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&candidate)
            .await
        {
            Ok(file) => break (candidate, file),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => n += 1,
            Err(e) => return Err(e.into()),
        }
    };

    file.write_all(bytes).await?;
    file.flush().await?;

    tracing::info!(path = %target.display(), size = bytes.len(), "Download saved");
    Ok(target)
}

/// Strip path separators and control characters from a server-supplied name.
fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| if c == '/' || c == '\\' || c.is_control() { '_' } else { c })
        .collect();
    let cleaned = cleaned.trim_matches('.').trim();
    if cleaned.is_empty() {
        "download".to_string()
    } else {
        cleaned.to_string()
    }
}

/// `statement.pdf`, then `statement (1).pdf`, `statement (2).pdf`, ...
fn numbered_name(file_name: &str, n: u32) -> String {
    if n == 0 {
        return file_name.to_string();
    }
    match file_name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{} ({}).{}", stem, n, ext),
        _ => format!("{} ({})", file_name, n),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("../../etc/passwd"), "_.._etc_passwd");
        assert_eq!(sanitize_file_name("statement-2024-05.pdf"), "statement-2024-05.pdf");
        assert_eq!(sanitize_file_name(".."), "download");
    }

    #[tokio::test]
    async fn test_save_download_does_not_overwrite() {
        let dir = tempfile::tempdir().unwrap();

        let first = save_download(dir.path(), "statement.pdf", b"one").await.unwrap();
        let second = save_download(dir.path(), "statement.pdf", b"two").await.unwrap();

        assert_eq!(first.file_name().unwrap(), "statement.pdf");
        assert_eq!(second.file_name().unwrap(), "statement (1).pdf");
        assert_eq!(std::fs::read(&first).unwrap(), b"one");
        assert_eq!(std::fs::read(&second).unwrap(), b"two");
    }

    #[test]
    fn test_numbered_name_keeps_extension() {
        assert_eq!(numbered_name("statement.pdf", 2), "statement (2).pdf");
        assert_eq!(numbered_name("README", 1), "README (1)");
        assert_eq!(numbered_name(".env", 1), ".env (1)");
    }

    #[tokio::test]
    async fn test_concurrent_saves_of_one_name_get_distinct_files() {
        let dir = tempfile::tempdir().unwrap();

        let (a, b, c) = tokio::join!(
            save_download(dir.path(), "report.csv", b"alpha"),
            save_download(dir.path(), "report.csv", b"beta"),
            save_download(dir.path(), "report.csv", b"gamma"),
        );
        let paths = [a.unwrap(), b.unwrap(), c.unwrap()];

        let mut names: Vec<_> = paths.iter().map(|p| p.file_name().unwrap().to_owned()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), 3);

        let mut contents: Vec<Vec<u8>> = paths.iter().map(|p| std::fs::read(p).unwrap()).collect();
        contents.sort();
        assert_eq!(contents, vec![b"alpha".to_vec(), b"beta".to_vec(), b"gamma".to_vec()]);
    }
}
