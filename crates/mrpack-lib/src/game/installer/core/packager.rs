use std::fs::File;
use std::io::{Read, Seek, Write};
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::error::{ModpackError, Result};
use crate::game::installer::config::COMPRESSED_ARCHIVE_SUFFIX;
use crate::game::installer::types::ExistingOutput;
use crate::game::modpack::types::ResolvedFileSet;

/// Where a packaged modpack lives on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageLayout {
    /// `<base> (Compressed).zip`
    pub archive_path: PathBuf,
    /// `<base>/`, the unpacked tree
    pub directory: PathBuf,
}

impl PackageLayout {
    pub fn new(destination: &Path, base_name: &str) -> Self {
        Self {
            archive_path: destination.join(format!("{}{}", base_name, COMPRESSED_ARCHIVE_SUFFIX)),
            directory: destination.join(base_name),
        }
    }

    fn is_taken(&self) -> Result<bool> {
        Ok(self.archive_path.exists() || is_non_empty_dir(&self.directory)?)
    }
}

fn is_non_empty_dir(path: &Path) -> Result<bool> {
    if !path.exists() {
        return Ok(false);
    }
    if !path.is_dir() {
        return Ok(true);
    }
    Ok(std::fs::read_dir(path)?.next().is_some())
}

/// Pick the output layout for `base_name` under `destination`.
pub fn plan_layout(destination: &Path, base_name: &str, existing: ExistingOutput) -> Result<PackageLayout> {
    let layout = PackageLayout::new(destination, base_name);
    if !layout.is_taken()? {
        return Ok(layout);
    }

    match existing {
        ExistingOutput::Fail => {
            let taken = if layout.archive_path.exists() {
                layout.archive_path
            } else {
                layout.directory
            };
            log::error!("[plan_layout] Output already exists: {:?}", taken);
            Err(ModpackError::DestinationExists(taken))
        }
        ExistingOutput::Disambiguate => {
            let mut idx = 2;
            loop {
                let candidate = PackageLayout::new(destination, &format!("{}_{}", base_name, idx));
                if !candidate.is_taken()? {
                    log::info!("[plan_layout] {:?} is taken, using {:?}", base_name, candidate.directory);
                    return Ok(candidate);
                }
                idx += 1;
            }
        }
    }
}

/// Write `files` as stored members of a new zip at `archive_path`.
pub fn write_archive(files: &ResolvedFileSet, archive_path: &Path) -> Result<()> {
    if let Some(parent) = archive_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = File::create(archive_path)?;
    write_archive_to(files, file)?;
    log::info!("[write_archive] Wrote {} files to {:?}", files.len(), archive_path);
    Ok(())
}

fn write_archive_to<W: Write + Seek>(files: &ResolvedFileSet, writer: W) -> Result<W> {
    let mut zip = ZipWriter::new(writer);
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Stored)
        .large_file(true);

    for (path, data) in files.iter() {
        zip.start_file(path, options)?;
        zip.write_all(data)?;
    }
    Ok(zip.finish()?)
}

/// Extract a packaged archive into `directory`, creating parents as needed.
/// Returns the relative paths written.
pub fn unpack_archive(archive_path: &Path, directory: &Path) -> Result<Vec<PathBuf>> {
    let file = File::open(archive_path)?;
    unpack_from(file, directory)
}

fn unpack_from<R: Read + Seek>(reader: R, directory: &Path) -> Result<Vec<PathBuf>> {
    let mut archive = ZipArchive::new(reader)?;
    std::fs::create_dir_all(directory)?;
    let mut extracted = Vec::with_capacity(archive.len());

    for i in 0..archive.len() {
        let mut file = archive.by_index(i)?;
        let relative = file.enclosed_name().ok_or_else(|| {
            ModpackError::manifest(format!("archive entry {:?} escapes the output directory", file.name()))
        })?;
        let target = directory.join(&relative);

        if file.is_dir() {
            std::fs::create_dir_all(&target)?;
            continue;
        }
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut outfile = File::create(&target)?;
        std::io::copy(&mut file, &mut outfile)?;
        extracted.push(relative);
    }

    log::debug!("[unpack_archive] Extracted {} files to {:?}", extracted.len(), directory);
    Ok(extracted)
}

/// Read a single member of a packaged archive, if present.
pub fn read_member(archive_path: &Path, name: &str) -> Result<Option<Vec<u8>>> {
    let file = File::open(archive_path)?;
    let mut archive = ZipArchive::new(file)?;
    let mut member = match archive.by_name(name) {
        Ok(member) => member,
        Err(zip::result::ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let mut data = Vec::new();
    member.read_to_end(&mut data)?;
    Ok(Some(data))
}

/// Package `files` under `destination` and unpack the result next to it.
pub fn package(
    files: &ResolvedFileSet,
    destination: &Path,
    base_name: &str,
    existing: ExistingOutput,
) -> Result<PackageLayout> {
    let layout = plan_layout(destination, base_name, existing)?;
    log::info!("Writing output zip file {:?}", layout.archive_path);
    write_archive(files, &layout.archive_path)?;
    log::info!("Extracting output zip file to {:?}", layout.directory);
    unpack_archive(&layout.archive_path, &layout.directory)?;
    Ok(layout)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tempfile::tempdir;

    fn sample() -> ResolvedFileSet {
        let mut files = ResolvedFileSet::new();
        files.insert("mods/a.jar", b"jar".to_vec());
        files.insert("config/a.txt", b"client".to_vec());
        files.insert("options.txt", b"x".to_vec());
        files
    }

    #[test]
    fn archive_members_are_stored_with_relative_names() {
        let bytes = write_archive_to(&sample(), Cursor::new(Vec::new()))
            .unwrap()
            .into_inner();
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut names: Vec<String> = archive.file_names().map(str::to_owned).collect();
        names.sort();
        assert_eq!(names, vec!["config/a.txt", "mods/a.jar", "options.txt"]);
        let member = archive.by_name("mods/a.jar").unwrap();
        assert_eq!(member.compression(), CompressionMethod::Stored);
    }

    #[test]
    fn package_writes_archive_and_tree() {
        let tmp = tempdir().unwrap();
        let layout = package(&sample(), tmp.path(), "Pack - 1.0", ExistingOutput::Fail).unwrap();

        assert_eq!(layout.archive_path, tmp.path().join("Pack - 1.0 (Compressed).zip"));
        assert!(layout.archive_path.is_file());
        assert_eq!(std::fs::read(layout.directory.join("mods/a.jar")).unwrap(), b"jar");
        assert_eq!(std::fs::read(layout.directory.join("config/a.txt")).unwrap(), b"client");
        assert_eq!(
            read_member(&layout.archive_path, "options.txt").unwrap(),
            Some(b"x".to_vec())
        );
        assert_eq!(read_member(&layout.archive_path, "icon.png").unwrap(), None);
    }

    #[test]
    fn packaging_mode_refuses_existing_output() {
        let tmp = tempdir().unwrap();
        package(&sample(), tmp.path(), "Pack - 1.0", ExistingOutput::Fail).unwrap();
        let err = package(&sample(), tmp.path(), "Pack - 1.0", ExistingOutput::Fail).unwrap_err();
        assert!(matches!(err, ModpackError::DestinationExists(_)));
    }

    #[test]
    fn empty_existing_directory_is_not_a_conflict() {
        let tmp = tempdir().unwrap();
        std::fs::create_dir_all(tmp.path().join("Pack - 1.0")).unwrap();
        let layout = plan_layout(tmp.path(), "Pack - 1.0", ExistingOutput::Fail).unwrap();
        assert_eq!(layout.directory, tmp.path().join("Pack - 1.0"));
    }

    #[test]
    fn disambiguation_picks_lowest_free_suffix() {
        let tmp = tempdir().unwrap();
        let first = package(&sample(), tmp.path(), "Pack", ExistingOutput::Disambiguate).unwrap();
        let second = package(&sample(), tmp.path(), "Pack", ExistingOutput::Disambiguate).unwrap();
        let third = package(&sample(), tmp.path(), "Pack", ExistingOutput::Disambiguate).unwrap();
        assert_eq!(first.directory, tmp.path().join("Pack"));
        assert_eq!(second.directory, tmp.path().join("Pack_2"));
        assert_eq!(third.directory, tmp.path().join("Pack_3"));
        assert_eq!(third.archive_path, tmp.path().join("Pack_3 (Compressed).zip"));
    }

    #[test]
    fn unpack_refuses_entries_escaping_directory() {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        zip.start_file("../evil.txt", SimpleFileOptions::default()).unwrap();
        zip.write_all(b"x").unwrap();
        let bytes = zip.finish().unwrap().into_inner();

        let tmp = tempdir().unwrap();
        let out = tmp.path().join("out");
        let err = unpack_from(Cursor::new(bytes), &out).unwrap_err();
        assert!(matches!(err, ModpackError::Manifest(_)));
        assert!(!tmp.path().join("evil.txt").exists());
    }
}
