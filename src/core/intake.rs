//! Turns command-line paths into candidates.
//!
//! Files are taken as given. Directories are walked with walkdir (one level
//! unless `recursive`), hidden entries skipped. No filtering by type
//! happens here: validation decides what is an image, so a stray text file
//! shows up as a `type` rejection instead of vanishing.

use crate::core::validation::Candidate;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::{DirEntry, WalkDir};

/// A path that could not be turned into a candidate
#[derive(Error, Debug)]
#[error("{}: {}", .path.display(), .reason)]
pub struct IntakeError {
    pub path: PathBuf,
    pub reason: String,
}

/// How directories are expanded
#[derive(Debug, Clone, Copy, Default)]
pub struct IntakeConfig {
    /// Descend into subdirectories
    pub recursive: bool,
    /// Include dot-files and dot-directories
    pub include_hidden: bool,
    pub follow_symlinks: bool,
}

/// Candidates in argument order (directory contents sorted by name),
/// plus the paths that could not be read.
#[derive(Debug, Default)]
pub struct Intake {
    pub candidates: Vec<Candidate>,
    pub errors: Vec<IntakeError>,
}

/// Collect candidates from files and directories
pub fn collect_candidates(paths: &[PathBuf], config: &IntakeConfig) -> Intake {
    let mut intake = Intake::default();

    for path in paths {
        if path.is_dir() {
            walk_directory(path, config, &mut intake);
        } else {
            add_file(path, &mut intake);
        }
    }

    tracing::debug!(
        candidates = intake.candidates.len(),
        errors = intake.errors.len(),
        "collected input files"
    );
    intake
}

fn walk_directory(root: &Path, config: &IntakeConfig, intake: &mut Intake) {
    let mut walker = WalkDir::new(root)
        .follow_links(config.follow_symlinks)
        .min_depth(1)
        .sort_by_file_name();

    if !config.recursive {
        walker = walker.max_depth(1);
    }

    let entries = walker
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || config.include_hidden || !is_hidden(entry));

    for entry in entries {
        match entry {
            Ok(entry) if entry.file_type().is_file() => add_file(entry.path(), intake),
            Ok(_) => {}
            Err(e) => intake.errors.push(IntakeError {
                path: e.path().map(Path::to_path_buf).unwrap_or_else(|| root.to_path_buf()),
                reason: e.to_string(),
            }),
        }
    }
}

fn add_file(path: &Path, intake: &mut Intake) {
    match Candidate::from_path(path) {
        Ok(candidate) => intake.candidates.push(candidate),
        Err(e) => {
            tracing::warn!(path = %path.display(), "skipping unreadable path: {}", e);
            intake.errors.push(IntakeError {
                path: path.to_path_buf(),
                reason: e.to_string(),
            });
        }
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn names(intake: &Intake) -> Vec<&str> {
        intake.candidates.iter().map(Candidate::name).collect()
    }

    fn setup() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("b.png"), b"png").unwrap();
        fs::write(dir.path().join("a.jpg"), b"jpeg").unwrap();
        fs::write(dir.path().join("notes.txt"), b"text").unwrap();
        fs::write(dir.path().join(".hidden.jpg"), b"jpeg").unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested").join("c.webp"), b"webp").unwrap();
        dir
    }

    #[test]
    fn directory_is_sorted_and_keeps_non_images() {
        let dir = setup();
        let intake = collect_candidates(&[dir.path().to_path_buf()], &IntakeConfig::default());

        assert_eq!(names(&intake), ["a.jpg", "b.png", "notes.txt"]);
        assert_eq!(intake.candidates[2].media_type(), "application/octet-stream");
        assert!(intake.errors.is_empty());
    }

    #[test]
    fn recursive_descends_into_subdirectories() {
        let dir = setup();
        let config = IntakeConfig {
            recursive: true,
            ..Default::default()
        };
        let intake = collect_candidates(&[dir.path().to_path_buf()], &config);

        assert!(names(&intake).contains(&"c.webp"));
    }

    #[test]
    fn hidden_files_are_opt_in() {
        let dir = setup();
        let config = IntakeConfig {
            include_hidden: true,
            ..Default::default()
        };
        let intake = collect_candidates(&[dir.path().to_path_buf()], &config);

        assert!(names(&intake).contains(&".hidden.jpg"));
    }

    #[test]
    fn explicit_files_keep_argument_order() {
        let dir = setup();
        let paths = vec![dir.path().join("b.png"), dir.path().join("a.jpg")];
        let intake = collect_candidates(&paths, &IntakeConfig::default());

        assert_eq!(names(&intake), ["b.png", "a.jpg"]);
    }

    #[test]
    fn missing_path_is_reported() {
        let dir = setup();
        let intake = collect_candidates(&[dir.path().join("gone.jpg")], &IntakeConfig::default());

        assert!(intake.candidates.is_empty());
        assert_eq!(intake.errors.len(), 1);
        assert!(intake.errors[0].to_string().contains("gone.jpg"));
    }
}
