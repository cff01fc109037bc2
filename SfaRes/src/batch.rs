//! Batch container decoding
//!
//! Finds every file under a directory and decodes each one in parallel,
//! mirroring the source tree into an output directory.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::prelude::*;
use walkdir::WalkDir;

use crate::error::Result;
use crate::formats::container::{ContainerKind, decode_container, decode_nested};

/// How many container layers to strip from each file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeDepth {
    Single,
    Nested { max_depth: usize },
}

impl DecodeDepth {
    /// Decode `data` to this depth.
    pub fn decode(self, data: &[u8]) -> Result<Vec<u8>> {
        match self {
            DecodeDepth::Single => Ok(decode_container(data)?.into_owned()),
            DecodeDepth::Nested { max_depth } => Ok(decode_nested(data, max_depth)?.into_owned()),
        }
    }
}

/// Result of a batch decode
#[derive(Debug, Clone, Default)]
pub struct BatchDecodeResult {
    /// Files with a recognized container that decoded cleanly
    pub decoded_count: usize,
    /// Files without a recognized container tag, skipped
    pub skipped_count: usize,
    pub fail_count: usize,
    /// One message per file
    pub results: Vec<String>,
}

/// Find every regular file under `dir`
///
/// # Arguments
/// * `dir` - Directory to search, following symlinks
///
/// # Returns
/// A sorted list of file paths. Unreadable entries are skipped.
pub fn find_resource_files<P: AsRef<Path>>(dir: P) -> Vec<PathBuf> {
    let mut files: Vec<_> = WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(walkdir::DirEntry::into_path)
        .collect();

    files.sort();
    files
}

/// Decode `files` in parallel into `dest_base`, keeping paths relative to
/// `source_base`.
///
/// Files with no recognized container tag are skipped rather than copied.
///
/// # Arguments
/// * `files` - Files to decode
/// * `source_base` - Base directory the output paths are made relative to
/// * `dest_base` - Output directory, created as needed
/// * `depth` - Container layers to strip from each file
/// * `progress` - Called with (current, total, relative path) once per file
///
/// # Returns
/// Summary of the batch decode, with one message per file.
pub fn batch_decode<F>(
    files: &[PathBuf],
    source_base: &Path,
    dest_base: &Path,
    depth: DecodeDepth,
    progress: F,
) -> BatchDecodeResult
where
    F: Fn(usize, usize, &str) + Send + Sync,
{
    let decoded = AtomicUsize::new(0);
    let skipped = AtomicUsize::new(0);
    let failed = AtomicUsize::new(0);
    let processed = AtomicUsize::new(0);
    let total = files.len();

    let results: Vec<String> = files
        .par_iter()
        .map(|path| {
            let relative = path.strip_prefix(source_base).unwrap_or(path.as_path());
            let display = relative.to_string_lossy();

            let current = processed.fetch_add(1, Ordering::SeqCst) + 1;
            progress(current, total, &display);

            match decode_file(path, &dest_base.join(relative), depth) {
                Ok(true) => {
                    decoded.fetch_add(1, Ordering::SeqCst);
                    format!("Decoded: {display}")
                }
                Ok(false) => {
                    skipped.fetch_add(1, Ordering::SeqCst);
                    format!("Skipped (no container): {display}")
                }
                Err(e) => {
                    failed.fetch_add(1, Ordering::SeqCst);
                    format!("Failed {display}: {e}")
                }
            }
        })
        .collect();

    BatchDecodeResult {
        decoded_count: decoded.load(Ordering::SeqCst),
        skipped_count: skipped.load(Ordering::SeqCst),
        fail_count: failed.load(Ordering::SeqCst),
        results,
    }
}

/// Returns `false` if `src` has no recognized container.
fn decode_file(src: &Path, dest: &Path, depth: DecodeDepth) -> Result<bool> {
    let data = std::fs::read(src)?;
    if ContainerKind::identify(&data).is_none() {
        return Ok(false);
    }

    let decoded = depth.decode(&data)?;
    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(dest, decoded)?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::container::{wrap_dir, wrap_zlb};

    #[test]
    fn test_batch_decode_mirrors_tree() {
        let src = tempfile::tempdir().unwrap();
        let dest = tempfile::tempdir().unwrap();

        std::fs::create_dir_all(src.path().join("swaphol")).unwrap();
        std::fs::write(src.path().join("a.zlb"), wrap_zlb(b"zlib payload").unwrap()).unwrap();
        std::fs::write(src.path().join("swaphol/b.bin"), wrap_dir(b"dir payload")).unwrap();
        std::fs::write(src.path().join("plain.txt"), b"not a container").unwrap();
        std::fs::write(src.path().join("bad.zlb"), b"ZLB\0\0\0\0\0\0\0\0\0\0\0\0\x10xx").unwrap();

        let files = find_resource_files(src.path());
        assert_eq!(files.len(), 4);

        let calls = AtomicUsize::new(0);
        let result = batch_decode(&files, src.path(), dest.path(), DecodeDepth::Single, |_, total, _| {
            assert_eq!(total, 4);
            calls.fetch_add(1, Ordering::SeqCst);
        });

        assert_eq!(calls.load(Ordering::SeqCst), 4);
        assert_eq!(result.decoded_count, 2);
        assert_eq!(result.skipped_count, 1);
        assert_eq!(result.fail_count, 1);
        assert_eq!(std::fs::read(dest.path().join("a.zlb")).unwrap(), b"zlib payload");
        assert_eq!(std::fs::read(dest.path().join("swaphol/b.bin")).unwrap(), b"dir payload");
        assert!(!dest.path().join("plain.txt").exists());
    }

    #[test]
    fn test_nested_depth() {
        let inner = wrap_zlb(b"core").unwrap();
        let outer = wrap_dir(&inner);
        assert_eq!(DecodeDepth::Single.decode(&outer).unwrap(), inner);
        assert_eq!(DecodeDepth::Nested { max_depth: 4 }.decode(&outer).unwrap(), b"core");
    }
}
