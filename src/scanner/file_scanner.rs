//! File discovery for the command-line gallery.
//!
//! Expands command-line paths into an ordered list of image files:
//! - Directories are walked with walkdir (one level unless recursive)
//! - Media type is detected by file extension
//! - An optional list file adds one path per line

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::models::MediaType;

/// Configuration for the file scanner.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Whether to scan directories recursively.
    pub recursive: bool,
    /// Maximum directory depth when recursive (0 = unlimited).
    pub max_depth: usize,
    /// Whether to follow symbolic links.
    pub follow_symlinks: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            recursive: false,
            max_depth: 0, // unlimited
            follow_symlinks: false,
        }
    }
}

pub struct FileScanner {
    config: ScanConfig,
}

impl FileScanner {
    pub fn new() -> Self {
        Self {
            config: ScanConfig::default(),
        }
    }

    pub fn with_config(config: ScanConfig) -> Self {
        Self { config }
    }

    /// Expand `paths` and the optional list file into image files.
    ///
    /// Explicit files are kept in argument order even without a known
    /// extension; each directory contributes its images sorted by path.
    pub fn collect(&self, paths: &[PathBuf], file_list: Option<&Path>) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();

        for path in paths {
            if path.is_dir() {
                files.extend(self.discover_files(path));
            } else {
                files.push(path.clone());
            }
        }

        if let Some(list) = file_list {
            files.extend(read_file_list(list)?);
        }

        info!("Collected {} image files", files.len());
        Ok(files)
    }

    /// Discovers all image files in a directory, sorted by path.
    fn discover_files(&self, dir: &Path) -> Vec<PathBuf> {
        let mut walker = WalkDir::new(dir).follow_links(self.config.follow_symlinks);

        if !self.config.recursive {
            walker = walker.max_depth(1);
        } else if self.config.max_depth > 0 {
            walker = walker.max_depth(self.config.max_depth);
        }

        let mut entries = Vec::new();
        for entry in walker.into_iter() {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    warn!("Skipping unreadable entry under {:?}: {}", dir, e);
                    continue;
                }
            };
            if entry.file_type().is_dir() {
                continue;
            }
            if MediaType::from_path(entry.path()).is_some() {
                entries.push(entry.into_path());
            }
        }

        entries.sort();
        debug!(?dir, count = entries.len(), "Scanned directory");
        entries
    }
}

impl Default for FileScanner {
    fn default() -> Self {
        Self::new()
    }
}

/// One path per line; blank lines and `#` comments are skipped.
fn read_file_list(list: &Path) -> Result<Vec<PathBuf>> {
    let text = std::fs::read_to_string(list)
        .with_context(|| format!("Failed to read file list: {:?}", list))?;
    Ok(text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(PathBuf::from)
        .collect())
}

/// Convenience wrapper used by the binary.
pub fn collect_images(
    paths: &[PathBuf],
    file_list: Option<&Path>,
    config: &ScanConfig,
) -> Result<Vec<PathBuf>> {
    FileScanner::with_config(config.clone()).collect(paths, file_list)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use tempfile::tempdir;

    fn touch(path: &Path) {
        File::create(path).unwrap();
    }

    fn flat() -> ScanConfig {
        ScanConfig::default()
    }

    fn recursive() -> ScanConfig {
        ScanConfig {
            recursive: true,
            ..ScanConfig::default()
        }
    }

    #[test]
    fn test_scan_config_default() {
        let config = ScanConfig::default();
        assert!(!config.recursive);
        assert_eq!(config.max_depth, 0);
        assert!(!config.follow_symlinks);
    }

    #[test]
    fn test_directory_filters_and_sorts() {
        let dir = tempdir().unwrap();
        touch(&dir.path().join("b.png"));
        touch(&dir.path().join("a.JPG"));
        touch(&dir.path().join("notes.txt"));

        let files = collect_images(&[dir.path().to_path_buf()], None, &flat()).unwrap();

        assert_eq!(
            files,
            vec![dir.path().join("a.JPG"), dir.path().join("b.png")]
        );
    }

    #[test]
    fn test_recursive_flag() {
        let dir = tempdir().unwrap();
        let subdir = dir.path().join("subdir");
        fs::create_dir(&subdir).unwrap();
        touch(&dir.path().join("root.png"));
        touch(&subdir.join("nested.png"));

        let shallow = collect_images(&[dir.path().to_path_buf()], None, &flat()).unwrap();
        assert_eq!(shallow.len(), 1);

        let deep = collect_images(&[dir.path().to_path_buf()], None, &recursive()).unwrap();
        assert_eq!(deep.len(), 2);
    }

    #[test]
    fn test_max_depth_limits_recursion() {
        let dir = tempdir().unwrap();
        let one = dir.path().join("one");
        let two = one.join("two");
        fs::create_dir_all(&two).unwrap();
        touch(&dir.path().join("a.png"));
        touch(&one.join("b.png"));
        touch(&two.join("c.png"));

        let config = ScanConfig {
            max_depth: 2,
            ..recursive()
        };
        let files = collect_images(&[dir.path().to_path_buf()], None, &config).unwrap();

        assert_eq!(files, vec![dir.path().join("a.png"), one.join("b.png")]);

        let all = collect_images(&[dir.path().to_path_buf()], None, &recursive()).unwrap();
        assert_eq!(all.len(), 3);
    }

    #[cfg(unix)]
    #[test]
    fn test_follow_symlinks() {
        let dir = tempdir().unwrap();
        let target = tempdir().unwrap();
        touch(&target.path().join("linked.png"));
        std::os::unix::fs::symlink(target.path(), dir.path().join("link")).unwrap();

        let plain = collect_images(&[dir.path().to_path_buf()], None, &recursive()).unwrap();
        assert!(plain.is_empty());

        let config = ScanConfig {
            follow_symlinks: true,
            ..recursive()
        };
        let followed = collect_images(&[dir.path().to_path_buf()], None, &config).unwrap();
        assert_eq!(followed, vec![dir.path().join("link").join("linked.png")]);
    }

    #[test]
    fn test_explicit_files_and_list() {
        let dir = tempdir().unwrap();
        let list = dir.path().join("list.txt");
        fs::write(&list, "# picks\n/photos/one.png\n\n  /photos/two.webp  \n").unwrap();

        let files = collect_images(
            &[PathBuf::from("/elsewhere/raw-image")],
            Some(&list),
            &flat(),
        )
        .unwrap();

        assert_eq!(
            files,
            vec![
                PathBuf::from("/elsewhere/raw-image"),
                PathBuf::from("/photos/one.png"),
                PathBuf::from("/photos/two.webp"),
            ]
        );
    }

    #[test]
    fn test_missing_list_is_error() {
        let dir = tempdir().unwrap();
        assert!(collect_images(&[], Some(&dir.path().join("nope.txt")), &flat()).is_err());
    }
}
