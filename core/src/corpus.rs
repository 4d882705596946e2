use crate::error::{EngineError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A document as read from the corpus, before analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDocument {
    pub id: String,
    pub text: String,
    pub path: Option<PathBuf>,
}

impl RawDocument {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self { id: id.into(), text: text.into(), path: None }
    }
}

fn is_text_file(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map_or(false, |ext| ext.eq_ignore_ascii_case("txt"))
}

/// Read every `*.txt` file directly inside `dir`, sorted by file name.
///
/// A missing folder is fatal. Files that cannot be read are skipped with a warning.
pub fn load_corpus<P: AsRef<Path>>(dir: P) -> Result<Vec<RawDocument>> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Err(EngineError::CorpusNotFound(dir.to_path_buf()));
    }

    let mut docs = Vec::new();
    let walker = WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name();
    for entry in walker {
        let entry = entry.map_err(|source| EngineError::CorpusScan { path: dir.to_path_buf(), source })?;
        let path = entry.path();
        if !entry.file_type().is_file() || !is_text_file(path) {
            continue;
        }
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "skipping unreadable document");
                continue;
            }
        };
        docs.push(RawDocument {
            id: entry.file_name().to_string_lossy().into_owned(),
            text: String::from_utf8_lossy(&bytes).into_owned(),
            path: Some(path.to_path_buf()),
        });
    }
    tracing::info!(dir = %dir.display(), num_docs = docs.len(), "loaded corpus");
    Ok(docs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn reads_txt_files_sorted_and_non_recursive() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("b.txt"), "second").unwrap();
        fs::write(dir.path().join("a.TXT"), "first").unwrap();
        fs::write(dir.path().join("notes.md"), "ignored").unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested/c.txt"), "ignored").unwrap();

        let docs = load_corpus(dir.path()).unwrap();
        let ids: Vec<&str> = docs.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["a.TXT", "b.txt"]);
        assert_eq!(docs[0].text, "first");
        assert_eq!(docs[1].path.as_deref(), Some(dir.path().join("b.txt").as_path()));
    }

    #[test]
    fn invalid_utf8_is_decoded_lossily() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("bad.txt"), b"caf\xff bar").unwrap();
        let docs = load_corpus(dir.path()).unwrap();
        assert_eq!(docs[0].text, "caf\u{fffd} bar");
    }

    #[test]
    fn missing_folder_is_an_error() {
        let dir = tempdir().unwrap();
        let err = load_corpus(dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, EngineError::CorpusNotFound(_)));
    }
}
