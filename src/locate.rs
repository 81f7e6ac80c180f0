//! Finding downloaded files by experiment and variable name

use crate::constants::experiment_subdir;
use crate::errors::Result;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::debug;
use walkdir::WalkDir;

/// One `*{first}*{second}*.{extension}` file name pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamePattern {
    pub first: String,
    pub second: String,
    pub extension: &'static str,
}

impl NamePattern {
    /// The four patterns tried for an (experiment, variable) pair
    pub fn candidates(experiment: &str, variable: &str) -> Vec<Self> {
        let mut patterns = Vec::with_capacity(4);
        for extension in ["nc", "zip"] {
            for (first, second) in [(experiment, variable), (variable, experiment)] {
                patterns.push(Self {
                    first: first.to_string(),
                    second: second.to_string(),
                    extension,
                });
            }
        }
        patterns
    }

    /// Glob semantics: `first` and `second` appear in that order without
    /// overlapping, and the name ends with `.extension`. Hidden files never
    /// match the leading `*`.
    pub fn matches(&self, file_name: &str) -> bool {
        if file_name.starts_with('.') {
            return false;
        }
        let Some(stem) = file_name
            .strip_suffix(self.extension)
            .and_then(|s| s.strip_suffix('.'))
        else {
            return false;
        };
        let Some(first_at) = stem.find(&self.first) else {
            return false;
        };
        stem[first_at + self.first.len()..].contains(&self.second)
    }
}

/// Most recently modified file in the experiment's subdirectory matching
/// any of the candidate patterns, or `None`.
pub fn find_file(base: &Path, experiment: &str, variable: &str) -> Result<Option<PathBuf>> {
    let folder = base.join(experiment_subdir(experiment));
    if !folder.is_dir() {
        debug!(folder = %folder.display(), "Experiment folder does not exist");
        return Ok(None);
    }

    let patterns = NamePattern::candidates(experiment, variable);
    let mut newest: Option<(SystemTime, PathBuf)> = None;

    for entry in WalkDir::new(&folder).min_depth(1).max_depth(1) {
        let entry = entry.map_err(std::io::Error::from)?;
        let matched = {
            let name = entry.file_name().to_string_lossy();
            patterns.iter().any(|p| p.matches(&name))
        };
        if !matched || !entry.file_type().is_file() {
            continue;
        }
        let modified = entry.metadata().map_err(std::io::Error::from)?.modified()?;
        if newest.as_ref().map_or(true, |(t, _)| modified > *t) {
            newest = Some((modified, entry.into_path()));
        }
    }

    if let Some((_, path)) = &newest {
        debug!(experiment, variable, path = %path.display(), "Located input file");
    }
    Ok(newest.map(|(_, path)| path))
}
