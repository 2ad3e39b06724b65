use crate::domain::model::{ArchiveMember, ArchiveSummary, CleanupWarning};
use crate::utils::error::{DocGenError, Result};
use std::collections::{BTreeSet, HashMap};
use std::fs::{self, File};
use std::io;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Packs files of one extension into a deflated zip and verifies the result.
#[derive(Debug, Clone)]
pub struct ArchiveBuilder {
    member_extension: String,
}

impl ArchiveBuilder {
    pub fn new(member_extension: impl Into<String>) -> Self {
        Self {
            member_extension: member_extension.into(),
        }
    }

    /// Files that `build` would pack, with entry names relative to
    /// `source_dir`.
    pub fn collect_members(
        &self,
        source_dir: &Path,
        archive_path: &Path,
        recursive: bool,
    ) -> Result<Vec<ArchiveMember>> {
        if !source_dir.is_dir() {
            return Err(DocGenError::NoInputError {
                dir: source_dir.to_path_buf(),
            });
        }

        let walker = WalkDir::new(source_dir)
            .min_depth(1)
            .max_depth(if recursive { usize::MAX } else { 1 })
            .sort_by_file_name();

        let mut members = Vec::new();
        for entry in walker {
            let entry = entry.map_err(|e| DocGenError::ArchiveError {
                path: archive_path.to_path_buf(),
                message: format!("cannot walk {}: {}", source_dir.display(), e),
            })?;
            if !entry.file_type().is_file() || entry.path() == archive_path {
                continue;
            }
            let matches = entry
                .path()
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| ext.eq_ignore_ascii_case(&self.member_extension))
                .unwrap_or(false);
            if !matches {
                continue;
            }

            let relative = entry.path().strip_prefix(source_dir).map_err(|e| {
                DocGenError::ArchiveError {
                    path: archive_path.to_path_buf(),
                    message: e.to_string(),
                }
            })?;
            let size = entry.metadata().map(|m| m.len()).unwrap_or(0);

            members.push(ArchiveMember {
                name: entry_name(relative),
                source_path: entry.path().to_path_buf(),
                size,
            });
        }

        if members.is_empty() {
            return Err(DocGenError::NoInputError {
                dir: source_dir.to_path_buf(),
            });
        }
        Ok(members)
    }

    /// Members for an explicit list of files, named relative to `base_dir`
    /// and kept in the given order.
    pub fn members_from_paths(
        &self,
        base_dir: &Path,
        paths: &[PathBuf],
        archive_path: &Path,
    ) -> Result<Vec<ArchiveMember>> {
        if paths.is_empty() {
            return Err(DocGenError::NoInputError {
                dir: base_dir.to_path_buf(),
            });
        }

        paths
            .iter()
            .map(|path| {
                let relative = match path.strip_prefix(base_dir) {
                    Ok(relative) => relative,
                    Err(_) => Path::new(path.file_name().unwrap_or(path.as_os_str())),
                };
                let size = fs::metadata(path)
                    .map_err(|e| DocGenError::ArchiveError {
                        path: archive_path.to_path_buf(),
                        message: format!("cannot read {}: {}", path.display(), e),
                    })?
                    .len();
                Ok(ArchiveMember {
                    name: entry_name(relative),
                    source_path: path.clone(),
                    size,
                })
            })
            .collect()
    }

    /// Packs every matching file under `source_dir`. See `build_from`.
    pub fn build(
        &self,
        source_dir: &Path,
        archive_path: &Path,
        recursive: bool,
    ) -> Result<ArchiveSummary> {
        let members = self.collect_members(source_dir, archive_path, recursive)?;
        self.build_from(members, archive_path)
    }

    /// Writes the archive, then re-reads every entry. A failed verification is
    /// an error even though the file is left on disk.
    pub fn build_from(
        &self,
        members: Vec<ArchiveMember>,
        archive_path: &Path,
    ) -> Result<ArchiveSummary> {
        if members.is_empty() {
            return Err(DocGenError::NoInputError {
                dir: archive_path
                    .parent()
                    .map(Path::to_path_buf)
                    .unwrap_or_default(),
            });
        }
        tracing::info!("Creating ZIP file at {}...", archive_path.display());

        let archive_error = |e: DocGenError| match e {
            e @ DocGenError::ArchiveError { .. } => e,
            other => DocGenError::ArchiveError {
                path: archive_path.to_path_buf(),
                message: other.to_string(),
            },
        };

        write_archive(&members, archive_path).map_err(archive_error)?;
        Self::verify(archive_path, &members).map_err(archive_error)?;

        tracing::info!(
            "ZIP file created successfully at: {} ({} members)",
            archive_path.display(),
            members.len()
        );
        Ok(ArchiveSummary {
            path: archive_path.to_path_buf(),
            members,
        })
    }

    /// Integrity test: the archive holds exactly `expected` and every entry
    /// decompresses with a matching checksum and size.
    pub fn verify(archive_path: &Path, expected: &[ArchiveMember]) -> Result<()> {
        let corrupted = |message: String| DocGenError::ArchiveError {
            path: archive_path.to_path_buf(),
            message,
        };

        let mut archive = ZipArchive::new(File::open(archive_path)?)?;
        if archive.len() != expected.len() {
            return Err(corrupted(format!(
                "expected {} members, found {}",
                expected.len(),
                archive.len()
            )));
        }

        let sizes: HashMap<&str, u64> = expected.iter().map(|m| (m.name.as_str(), m.size)).collect();

        for i in 0..archive.len() {
            let mut entry = archive.by_index(i)?;
            let name = entry.name().to_string();
            let expected_size = sizes
                .get(name.as_str())
                .copied()
                .ok_or_else(|| corrupted(format!("unexpected member '{}'", name)))?;

            let read = io::copy(&mut entry, &mut io::sink())
                .map_err(|e| corrupted(format!("member '{}' is corrupted: {}", name, e)))?;
            if read != expected_size {
                return Err(corrupted(format!(
                    "member '{}' has {} bytes, expected {}",
                    name, read, expected_size
                )));
            }
        }

        tracing::debug!("ZIP file {} is valid", archive_path.display());
        Ok(())
    }

    /// Removes packed source files, then any directories under `source_dir`
    /// (and `source_dir` itself) left empty. Never fails; problems come back
    /// as warnings.
    pub fn cleanup(&self, summary: &ArchiveSummary, source_dir: &Path) -> Vec<CleanupWarning> {
        let mut warnings = Vec::new();
        let mut dirs = BTreeSet::new();

        for member in &summary.members {
            if let Err(e) = fs::remove_file(&member.source_path) {
                if e.kind() != io::ErrorKind::NotFound {
                    warnings.push(CleanupWarning {
                        path: member.source_path.clone(),
                        message: e.to_string(),
                    });
                }
            }
            let mut parent = member.source_path.parent();
            while let Some(dir) = parent {
                if !dir.starts_with(source_dir) {
                    break;
                }
                dirs.insert(dir.to_path_buf());
                parent = dir.parent();
            }
        }

        // Deepest first so parents are empty by the time we reach them.
        let mut dirs: Vec<PathBuf> = dirs.into_iter().collect();
        dirs.sort_by_key(|d| std::cmp::Reverse(d.components().count()));
        for dir in dirs {
            if let Err(e) = fs::remove_dir(&dir) {
                if e.kind() != io::ErrorKind::NotFound {
                    warnings.push(CleanupWarning {
                        path: dir,
                        message: e.to_string(),
                    });
                }
            }
        }

        for warning in &warnings {
            tracing::warn!(
                "Cleanup could not remove {}: {}",
                warning.path.display(),
                warning.message
            );
        }
        warnings
    }
}

fn write_archive(members: &[ArchiveMember], archive_path: &Path) -> Result<()> {
    if let Some(parent) = archive_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut zip = ZipWriter::new(File::create(archive_path)?);
    for member in members {
        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .large_file(member.size >= u32::MAX as u64);
        zip.start_file(member.name.as_str(), options)?;
        let mut source = File::open(&member.source_path)?;
        io::copy(&mut source, &mut zip)?;
        tracing::debug!("Added {} to ZIP archive", member.name);
    }
    zip.finish()?.sync_all()?;
    Ok(())
}

/// `/`-joined relative path, the separator zip entry names use everywhere.
fn entry_name(relative: &Path) -> String {
    relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
