//! Opening downloaded files, zipped or not
//!
//! CDS delivers CMIP6 subsets as zip archives holding one NetCDF file. The
//! loader extracts the first `.nc` member into a temporary directory and keeps
//! that directory alive for as long as the dataset is open.

use crate::errors::{CmipVisError, Result};
use std::fs::File as FsFile;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::debug;
use zip::ZipArchive;

const ZIP_MAGIC: [u8; 4] = *b"PK\x03\x04";

/// An open NetCDF dataset plus the scratch directory it may live in.
///
/// Fields drop in declaration order: the NetCDF handle closes before the
/// temporary directory is removed.
pub struct OpenedDataset {
    file: netcdf::File,
    source: PathBuf,
    scratch: Option<TempDir>,
}

impl OpenedDataset {
    /// Open `path` directly, or through its first `.nc` member when it is a zip archive.
    pub fn open(path: &Path) -> Result<Self> {
        if is_zip(path)? {
            let scratch = tempfile::tempdir()?;
            let extracted = extract_first_netcdf(path, scratch.path())?;
            debug!(
                archive = %path.display(),
                member = %extracted.display(),
                "Extracted NetCDF member"
            );
            let file = netcdf::open(&extracted)?;
            return Ok(Self {
                file,
                source: path.to_path_buf(),
                scratch: Some(scratch),
            });
        }

        Ok(Self {
            file: netcdf::open(path)?,
            source: path.to_path_buf(),
            scratch: None,
        })
    }

    pub fn file(&self) -> &netcdf::File {
        &self.file
    }

    /// Path the caller asked for (the archive, not the extracted member)
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Temporary directory holding the extracted member, for zip sources
    pub fn scratch_dir(&self) -> Option<&Path> {
        self.scratch.as_ref().map(TempDir::path)
    }

    /// File name of the source, used in error messages
    pub fn display_name(&self) -> String {
        self.source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.source.display().to_string())
    }
}

/// Scoped access: the dataset and any scratch directory are released when
/// `f` returns, whether it succeeded or not.
pub fn with_dataset<T>(path: &Path, f: impl FnOnce(&OpenedDataset) -> Result<T>) -> Result<T> {
    let dataset = OpenedDataset::open(path)?;
    f(&dataset)
}

fn is_zip(path: &Path) -> Result<bool> {
    let by_extension = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("zip"))
        .unwrap_or(false);
    if by_extension {
        return Ok(true);
    }

    let mut magic = [0u8; 4];
    let mut handle = FsFile::open(path)?;
    match handle.read_exact(&mut magic) {
        Ok(()) => Ok(magic == ZIP_MAGIC),
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Ok(false),
        Err(e) => Err(e.into()),
    }
}

/// Extracts the first member ending in `.nc` into `dest` and returns its path.
pub fn extract_first_netcdf(archive_path: &Path, dest: &Path) -> Result<PathBuf> {
    let mut archive = ZipArchive::new(FsFile::open(archive_path)?)?;

    for index in 0..archive.len() {
        let mut member = archive.by_index(index)?;
        if member.is_dir() || !member.name().ends_with(".nc") {
            continue;
        }
        // Only the base name is kept so members cannot escape `dest`
        let Some(file_name) = member
            .enclosed_name()
            .and_then(|p| p.file_name().map(|n| n.to_os_string()))
        else {
            continue;
        };

        let target = dest.join(file_name);
        let mut out = FsFile::create(&target)?;
        io::copy(&mut member, &mut out)?;
        return Ok(target);
    }

    Err(CmipVisError::NoNetcdfInArchive {
        path: archive_path.to_path_buf(),
    })
}
