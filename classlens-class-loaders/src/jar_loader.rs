use std::{
    collections::BTreeSet,
    fs::File,
    io::Read,
    path::{Path, PathBuf},
};

use classlens_base::data::class_file_loader::LoadClassFileError;
use zip::ZipArchive;

use crate::SearchRootError;

/// A jar (or zip) file of classes.
/// The names of the entries are read when it is created, but the archive itself is only opened
/// again for as long as it takes to read an entry out of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JarRoot {
    jar_path: PathBuf,
    entries: BTreeSet<String>,
}
impl JarRoot {
    pub fn new(jar_path: PathBuf) -> Result<JarRoot, SearchRootError> {
        let file = File::open(&jar_path)?;
        let archive = ZipArchive::new(file)?;
        let entries = archive.file_names().map(ToOwned::to_owned).collect();

        Ok(JarRoot { jar_path, entries })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.jar_path
    }

    #[must_use]
    pub fn contains(&self, entry: &str) -> bool {
        self.entries.contains(entry)
    }

    pub fn entries(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(String::as_str)
    }

    /// The names of the files and directories directly inside of `dir`, which should not have a
    /// trailing slash. An empty `dir` is the root of the archive.
    pub fn children<'a>(&'a self, dir: &str) -> impl Iterator<Item = &'a str> + 'a {
        let prefix = if dir.is_empty() {
            String::new()
        } else {
            format!("{}/", dir)
        };

        self.entries
            .iter()
            .filter_map(move |entry| entry.strip_prefix(prefix.as_str()))
            // Directories within are named by their first part
            .filter_map(|rest| rest.split('/').next())
            .filter(|name| !name.is_empty())
            .collect::<BTreeSet<_>>()
            .into_iter()
    }

    pub fn read_entry(&self, entry: &str) -> Result<Vec<u8>, LoadClassFileError> {
        read_archive_entry(&self.jar_path, entry)
    }
}

/// Whether the archive at `jar_path` has a file entry with exactly that name.
/// Directories that are only implied by the names of the entries inside of them don't count.
#[must_use]
pub fn archive_has_entry(jar_path: &Path, entry: &str) -> bool {
    let archive = File::open(jar_path)
        .ok()
        .and_then(|file| ZipArchive::new(file).ok());
    match archive {
        Some(archive) => archive
            .file_names()
            .any(|name| name == entry && !name.ends_with('/')),
        None => false,
    }
}

/// Read a single entry out of the archive at `jar_path`.
/// The archive is closed again before this returns.
pub fn read_archive_entry(jar_path: &Path, entry: &str) -> Result<Vec<u8>, LoadClassFileError> {
    let file = File::open(jar_path).map_err(LoadClassFileError::ReadError)?;
    let mut archive =
        ZipArchive::new(file).map_err(|x| LoadClassFileError::OpaqueError(x.into()))?;
    let mut file = archive
        .by_name(entry)
        .map_err(|x| LoadClassFileError::OpaqueError(x.into()))?;

    // Read the data out from the file
    let mut data = Vec::new();
    file.read_to_end(&mut data)
        .map_err(LoadClassFileError::ReadError)?;
    Ok(data)
}

#[cfg(test)]
mod tests {
    use std::{fs::File, io::Write};

    use zip::write::{FileOptions, ZipWriter};

    use super::{archive_has_entry, JarRoot};

    #[test]
    fn test_jar_entries() {
        let dir = tempfile::tempdir().unwrap();
        let jar_path = dir.path().join("lib.jar");

        let mut zip = ZipWriter::new(File::create(&jar_path).unwrap());
        zip.start_file("pkg/A.class", FileOptions::default()).unwrap();
        zip.write_all(b"first").unwrap();
        zip.start_file("pkg/sub/B.class", FileOptions::default())
            .unwrap();
        zip.write_all(b"second").unwrap();
        zip.start_file("Top.class", FileOptions::default()).unwrap();
        zip.write_all(b"top").unwrap();
        zip.finish().unwrap();

        let jar = JarRoot::new(jar_path.clone()).unwrap();
        assert_eq!(jar.path(), jar_path);
        assert!(jar.contains("pkg/A.class"));
        assert!(!jar.contains("pkg/B.class"));
        assert_eq!(jar.children("pkg").collect::<Vec<_>>(), vec!["A.class", "sub"]);
        assert_eq!(jar.children("").collect::<Vec<_>>(), vec!["Top.class", "pkg"]);
        assert_eq!(jar.read_entry("pkg/sub/B.class").unwrap(), b"second");
        assert!(jar.read_entry("pkg/Missing.class").is_err());

        assert!(archive_has_entry(&jar_path, "pkg/sub/B.class"));
        assert!(!archive_has_entry(&jar_path, "pkg/sub"));
        assert!(!archive_has_entry(&dir.path().join("missing.jar"), "Top.class"));
    }

    #[test]
    fn test_not_a_jar() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.jar");
        std::fs::write(&path, b"not a zip").unwrap();
        assert!(JarRoot::new(path).is_err());
        assert!(JarRoot::new(dir.path().join("missing.jar")).is_err());
    }
}
