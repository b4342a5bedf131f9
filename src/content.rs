//! File-backed content store.
//!
//! Raw memory content lives on disk under a configured root, one file per
//! memory at `root/YYYY/MM/DD/<slug>[-N].md`. The database only holds the
//! path; deleting a memory row never deletes its file. Name collisions are
//! resolved with `O_EXCL` creates, so two writers racing on the same slug
//! both end up with their own file.

use chrono::{DateTime, Utc};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Component, Path, PathBuf};

use crate::error::{MemoryError, Result};

/// Longest slug kept from a name hint; the `-N` suffix comes on top.
const MAX_SLUG_LEN: usize = 60;

/// Outcome of a capped content read.
///
/// `Missing` is a normal outcome, not an error — the entity row outlives its
/// file by design. Real IO failures (permissions, bad sectors) surface as
/// [`MemoryError::Io`] instead.
#[derive(Debug)]
pub enum ContentRead {
    /// No file at this path.
    Missing,
    /// File exists but exceeds the read cap; content withheld.
    Oversized { size: u64 },
    /// Full content.
    Full { size: u64, text: String },
}

/// Handle on the content root directory.
#[derive(Debug, Clone)]
pub struct ContentStore {
    root: PathBuf,
}

impl ContentStore {
    /// Open the store, creating the root directory if needed.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root: PathBuf = root.into();
        fs::create_dir_all(&root)?;
        // Canonicalize so the raw-read boundary check compares real paths
        let root = root.canonicalize()?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Pick a free path under `root/YYYY/MM/DD/` derived from `name_hint` and
    /// write `content` there. Returns the final path and byte length.
    ///
    /// The name is claimed with an exclusive create; on `AlreadyExists` the
    /// next `-N` suffix is tried. Never overwrites an existing file.
    pub fn assign_and_write(
        &self,
        name_hint: &str,
        content: &str,
        now: DateTime<Utc>,
    ) -> Result<(PathBuf, u64)> {
        let dir = self.root.join(now.format("%Y/%m/%d").to_string());
        fs::create_dir_all(&dir)?;

        let base = slugify(name_hint);
        let mut n = 0u32;
        loop {
            let file_name = if n == 0 {
                format!("{base}.md")
            } else {
                format!("{base}-{n}.md")
            };
            let path = dir.join(file_name);

            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(mut file) => {
                    file.write_all(content.as_bytes())?;
                    tracing::debug!(path = %path.display(), bytes = content.len(), "content written");
                    return Ok((path, content.len() as u64));
                }
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                    n += 1;
                }
                Err(e) => return Err(MemoryError::Io(e)),
            }
        }
    }

    /// Overwrite the content of an already-assigned path.
    pub fn overwrite(&self, path: &Path, content: &str) -> Result<u64> {
        fs::write(path, content.as_bytes())?;
        tracing::debug!(path = %path.display(), bytes = content.len(), "content overwritten");
        Ok(content.len() as u64)
    }

    /// Read the file at `path`, refusing to load more than `limit` bytes.
    pub fn read_capped(&self, path: &Path, limit: u64) -> Result<ContentRead> {
        let meta = match fs::metadata(path) {
            Ok(meta) => meta,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(ContentRead::Missing)
            }
            Err(e) => return Err(MemoryError::Io(e)),
        };

        let size = meta.len();
        if size > limit {
            return Ok(ContentRead::Oversized { size });
        }

        let text = fs::read_to_string(path)?;
        Ok(ContentRead::Full { size, text })
    }

    /// Validate a caller-supplied path for raw reads: absolute, no `..`
    /// traversal, and under the content root.
    pub fn resolve_within_root(&self, path: &Path) -> Result<PathBuf> {
        if !path.is_absolute() {
            return Err(MemoryError::PathOutsideRoot(path.to_path_buf()));
        }
        if path
            .components()
            .any(|c| matches!(c, Component::ParentDir | Component::CurDir))
        {
            return Err(MemoryError::PathOutsideRoot(path.to_path_buf()));
        }
        if !path.starts_with(&self.root) {
            return Err(MemoryError::PathOutsideRoot(path.to_path_buf()));
        }
        Ok(path.to_path_buf())
    }
}

/// Derive a filesystem-safe base name from a summary or title.
///
/// Lowercases, maps anything that is not ASCII alphanumeric to `-`, collapses
/// runs of `-`, and trims. Falls back to `"memory"` for hints with no usable
/// characters.
pub fn slugify(hint: &str) -> String {
    let mut slug = String::with_capacity(hint.len());
    let mut last_dash = true; // suppress leading dash
    for c in hint.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            last_dash = false;
        } else if !last_dash {
            slug.push('-');
            last_dash = true;
        }
        if slug.len() >= MAX_SLUG_LEN {
            break;
        }
    }
    let slug = slug.trim_matches('-').to_string();
    if slug.is_empty() {
        "memory".to_string()
    } else {
        slug
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn test_store() -> (ContentStore, tempfile::TempDir) {
        let tmp = tempfile::tempdir().unwrap();
        let store = ContentStore::open(tmp.path().join("content")).unwrap();
        (store, tmp)
    }

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 14, 9, 26, 53).unwrap()
    }

    #[test]
    fn slugify_basic() {
        assert_eq!(slugify("Fix the deploy pipeline"), "fix-the-deploy-pipeline");
        assert_eq!(slugify("  Rust 2024!  "), "rust-2024");
        assert_eq!(slugify("héllo wörld"), "h-llo-w-rld");
        assert_eq!(slugify("***"), "memory");
        assert_eq!(slugify(""), "memory");
    }

    #[test]
    fn slugify_caps_length() {
        let long = "a".repeat(500);
        assert!(slugify(&long).len() <= MAX_SLUG_LEN);
    }

    #[test]
    fn write_places_file_under_date_dir() {
        let (store, _tmp) = test_store();
        let (path, len) = store
            .assign_and_write("Deploy notes", "hello world", fixed_now())
            .unwrap();

        assert!(path.ends_with("2025/03/14/deploy-notes.md"));
        assert_eq!(len, 11);
        assert_eq!(fs::read_to_string(&path).unwrap(), "hello world");
    }

    #[test]
    fn collision_appends_suffix() {
        let (store, _tmp) = test_store();
        let now = fixed_now();
        let (p0, _) = store.assign_and_write("Same hint", "first", now).unwrap();
        let (p1, _) = store.assign_and_write("Same hint", "second", now).unwrap();
        let (p2, _) = store.assign_and_write("Same hint", "third", now).unwrap();

        assert!(p0.ends_with("same-hint.md"));
        assert!(p1.ends_with("same-hint-1.md"));
        assert!(p2.ends_with("same-hint-2.md"));
        assert_eq!(fs::read_to_string(&p0).unwrap(), "first");
        assert_eq!(fs::read_to_string(&p1).unwrap(), "second");
    }

    #[test]
    fn read_capped_missing_is_not_an_error() {
        let (store, _tmp) = test_store();
        let read = store
            .read_capped(&store.root().join("nope.md"), 1024)
            .unwrap();
        assert!(matches!(read, ContentRead::Missing));
    }

    #[test]
    fn read_capped_withholds_oversized_content() {
        let (store, _tmp) = test_store();
        let (path, _) = store
            .assign_and_write("big", &"x".repeat(100), fixed_now())
            .unwrap();

        match store.read_capped(&path, 10).unwrap() {
            ContentRead::Oversized { size } => assert_eq!(size, 100),
            other => panic!("expected Oversized, got {other:?}"),
        }

        // Under the cap, full content comes back
        match store.read_capped(&path, 1000).unwrap() {
            ContentRead::Full { size, text } => {
                assert_eq!(size, 100);
                assert_eq!(text.len(), 100);
            }
            other => panic!("expected Full, got {other:?}"),
        }
    }

    #[test]
    fn raw_read_boundary_rejects_escapes() {
        let (store, tmp) = test_store();

        assert!(store
            .resolve_within_root(Path::new("relative/file.md"))
            .is_err());
        assert!(store
            .resolve_within_root(&store.root().join("../outside.md"))
            .is_err());
        assert!(store.resolve_within_root(tmp.path()).is_err());

        let inside = store.root().join("2025/03/14/note.md");
        assert_eq!(store.resolve_within_root(&inside).unwrap(), inside);
    }
}
