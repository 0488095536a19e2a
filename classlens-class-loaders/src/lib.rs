use std::{
    collections::BTreeMap,
    fmt,
    path::{Path, PathBuf},
};

use classlens_base::{
    data::class_file_loader::{ClassFileData, ClassFileLoader, LoadClassFileError},
    util, ClassFile,
};

pub use jar_loader::JarRoot;

pub mod jar_loader;

#[derive(Debug)]
#[non_exhaustive]
pub enum SearchRootError {
    Io(std::io::Error),
    /// The file could not be read as a zip archive
    Zip(zip::result::ZipError),
}
impl From<std::io::Error> for SearchRootError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}
impl From<zip::result::ZipError> for SearchRootError {
    fn from(err: zip::result::ZipError) -> Self {
        Self::Zip(err)
    }
}
impl fmt::Display for SearchRootError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "{}", err),
            Self::Zip(err) => write!(f, "invalid archive: {}", err),
        }
    }
}
impl std::error::Error for SearchRootError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchRoot {
    Directory(PathBuf),
    Archive(JarRoot),
}
impl SearchRoot {
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            SearchRoot::Directory(path) => path,
            SearchRoot::Archive(jar) => jar.path(),
        }
    }

    fn find(&self, class_name: &str) -> Option<ClassSource> {
        match self {
            SearchRoot::Directory(root) => {
                let relative_path = util::class_name_to_relative_path(class_name);
                root.join(&relative_path).is_file().then(|| ClassSource::File {
                    root: root.clone(),
                    relative_path,
                })
            }
            SearchRoot::Archive(jar) => {
                let entry = util::class_name_to_entry_name(class_name);
                jar.contains(&entry).then(|| ClassSource::ArchiveEntry {
                    archive: jar.path().to_path_buf(),
                    entry,
                })
            }
        }
    }
}

/// Somewhere that the bytes of a class file can be read from
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ClassSource {
    File {
        root: PathBuf,
        relative_path: PathBuf,
    },
    ArchiveEntry {
        archive: PathBuf,
        /// The name of the entry within the archive, which always uses `/`
        entry: String,
    },
    /// A class that could not be found. This never exists.
    Absent { relative_path: PathBuf },
}
impl ClassSource {
    #[must_use]
    pub fn exists(&self) -> bool {
        match self {
            ClassSource::File {
                root,
                relative_path,
            } => root.join(relative_path).is_file(),
            ClassSource::ArchiveEntry { archive, entry } => {
                jar_loader::archive_has_entry(archive, entry)
            }
            ClassSource::Absent { .. } => false,
        }
    }

    /// Read all of the bytes. The file or archive is closed again before this returns.
    pub fn open(&self) -> Result<Vec<u8>, LoadClassFileError> {
        match self {
            ClassSource::File {
                root,
                relative_path,
            } => std::fs::read(root.join(relative_path)).map_err(LoadClassFileError::ReadError),
            ClassSource::ArchiveEntry { archive, entry } => {
                jar_loader::read_archive_entry(archive, entry)
            }
            ClassSource::Absent { relative_path } => Err(LoadClassFileError::Nonexistent(
                relative_path.display().to_string(),
            )),
        }
    }

    /// The path of the class file relative to the root it is in
    #[must_use]
    pub fn relative_path(&self) -> PathBuf {
        match self {
            ClassSource::File { relative_path, .. } | ClassSource::Absent { relative_path } => {
                relative_path.clone()
            }
            ClassSource::ArchiveEntry { entry, .. } => PathBuf::from(entry),
        }
    }

    /// The location in the form a user would recognize, with archive entries written as
    /// `archive.jar!/entry`
    #[must_use]
    pub fn display_path(&self) -> String {
        match self {
            ClassSource::File {
                root,
                relative_path,
            } => root.join(relative_path).display().to_string(),
            ClassSource::ArchiveEntry { archive, entry } => {
                format!("{}!/{}", archive.display(), entry)
            }
            ClassSource::Absent { relative_path } => {
                format!("<absent> {}", relative_path.display())
            }
        }
    }
}

/// An ordered list of directories and archives to look for classes in.
/// The first root that has a class is the one it is loaded from.
#[derive(Debug, Default, Clone)]
pub struct SearchPath {
    roots: Vec<SearchRoot>,
}
impl SearchPath {
    #[must_use]
    pub fn new() -> SearchPath {
        SearchPath::default()
    }

    /// Build a search path from a class path string, like `classes:lib/dep.jar`.
    /// Entries that don't exist or can't be opened are skipped with a warning.
    #[must_use]
    pub fn from_class_path(class_path: &str) -> SearchPath {
        let mut search_path = SearchPath::new();
        search_path.add_class_path(class_path);
        search_path
    }

    /// Add every entry of a class path string to the end, skipping (with a warning) those that
    /// can't be used
    pub fn add_class_path(&mut self, class_path: &str) {
        for path in std::env::split_paths(class_path) {
            if path.as_os_str().is_empty() {
                continue;
            }

            if let Err(err) = self.add(&path) {
                tracing::warn!("Skipping class path entry {:?}: {}", path, err);
            }
        }
    }

    pub fn add_directory(&mut self, path: &Path) -> std::io::Result<()> {
        self.roots
            .push(SearchRoot::Directory(path.canonicalize()?));
        Ok(())
    }

    pub fn add_archive(&mut self, path: &Path) -> Result<(), SearchRootError> {
        let jar = JarRoot::new(path.canonicalize()?)?;
        tracing::debug!(
            "Indexed {} entries in {}",
            jar.entries().count(),
            jar.path().display()
        );
        self.roots.push(SearchRoot::Archive(jar));
        Ok(())
    }

    /// Add a root, as an archive if it is a file and as a directory otherwise
    pub fn add(&mut self, path: &Path) -> Result<(), SearchRootError> {
        if path.is_file() {
            self.add_archive(path)
        } else {
            Ok(self.add_directory(path)?)
        }
    }

    #[must_use]
    pub fn roots(&self) -> &[SearchRoot] {
        &self.roots
    }

    /// Find the first root that has the class
    #[must_use]
    pub fn resolve(&self, class_name: &str) -> Option<ClassSource> {
        self.roots.iter().find_map(|root| root.find(class_name))
    }

    /// The same as [`SearchPath::resolve`], but a missing class gives [`ClassSource::Absent`]
    #[must_use]
    pub fn locate(&self, class_name: &str) -> ClassSource {
        self.resolve(class_name)
            .unwrap_or_else(|| ClassSource::Absent {
                relative_path: util::class_name_to_relative_path(class_name),
            })
    }

    /// List what is directly inside of the package directory `dir` (like `java/lang`) across all
    /// of the roots, keeping only the names that `filter` accepts.
    /// When several roots have the same name, the earliest root's is the one that is kept.
    /// The results are sorted by name.
    pub fn children(&self, dir: &str, filter: impl Fn(&str) -> bool) -> Vec<ClassSource> {
        let dir = dir.replace('.', "/");
        let dir = dir.trim_matches('/');
        let dir_path: PathBuf = util::access_path_iter(dir)
            .filter(|part| !part.is_empty())
            .collect();

        let mut found: BTreeMap<String, ClassSource> = BTreeMap::new();
        for root in &self.roots {
            match root {
                SearchRoot::Directory(root_path) => {
                    let read_dir = match std::fs::read_dir(root_path.join(&dir_path)) {
                        Ok(read_dir) => read_dir,
                        Err(_) => continue,
                    };

                    for entry in read_dir.flatten() {
                        let name = match entry.file_name().into_string() {
                            Ok(name) => name,
                            Err(_) => continue,
                        };
                        if !filter(&name) {
                            continue;
                        }

                        let relative_path = dir_path.join(&name);
                        found.entry(name).or_insert_with(|| ClassSource::File {
                            root: root_path.clone(),
                            relative_path,
                        });
                    }
                }
                SearchRoot::Archive(jar) => {
                    for name in jar.children(dir).filter(|name| filter(name)) {
                        let entry = if dir.is_empty() {
                            name.to_owned()
                        } else {
                            format!("{}/{}", dir, name)
                        };
                        found
                            .entry(name.to_owned())
                            .or_insert_with(|| ClassSource::ArchiveEntry {
                                archive: jar.path().to_path_buf(),
                                entry,
                            });
                    }
                }
            }
        }

        found.into_values().collect()
    }
}

impl ClassFileLoader for SearchPath {
    fn load_class_file(&self, class_name: &str) -> Result<ClassFileData, LoadClassFileError> {
        if class_name.is_empty() {
            return Err(LoadClassFileError::EmptyName);
        }

        let source = self
            .resolve(class_name)
            .ok_or_else(|| LoadClassFileError::Nonexistent(class_name.to_owned()))?;
        tracing::trace!("Loading {} from {}", class_name, source.display_path());

        let data = source.open()?;
        let class_file = ClassFile::from_bytes(&data)?;

        Ok(ClassFileData {
            source: source.display_path(),
            class_file,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::{
        fs::{self, File},
        io::Write,
        path::Path,
    };

    use classlens_base::{
        data::class_file_loader::{ClassFileLoader, LoadClassFileError},
        CLASS_FILE_MAGIC,
    };
    use zip::write::{FileOptions, ZipWriter};

    use super::{ClassSource, SearchPath, SearchRoot};

    /// The smallest class file that decodes: a class with only a name and a super class
    fn minimal_class(name: &str) -> Vec<u8> {
        let mut data = Vec::new();
        data.extend_from_slice(&CLASS_FILE_MAGIC.to_be_bytes());
        data.extend_from_slice(&[0, 0, 0, 52]);
        data.extend_from_slice(&5u16.to_be_bytes());
        for text in [name, "java/lang/Object"] {
            data.push(1);
            data.extend_from_slice(&(text.len() as u16).to_be_bytes());
            data.extend_from_slice(text.as_bytes());
            data.push(7);
            let name_index = if text == name { 1u16 } else { 3 };
            data.extend_from_slice(&name_index.to_be_bytes());
        }
        // access flags, this class, super class
        data.extend_from_slice(&[0, 0x21, 0, 2, 0, 4]);
        // no interfaces, fields, methods or attributes
        data.extend_from_slice(&[0, 0, 0, 0, 0, 0, 0, 0]);
        data
    }

    fn write_file(root: &Path, relative: &str, data: &[u8]) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, data).unwrap();
    }

    fn write_jar(path: &Path, entries: &[(&str, &[u8])]) {
        let mut zip = ZipWriter::new(File::create(path).unwrap());
        for (name, data) in entries {
            zip.start_file(*name, FileOptions::default()).unwrap();
            zip.write_all(data).unwrap();
        }
        zip.finish().unwrap();
    }

    #[test]
    fn test_first_root_wins() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        write_file(first.path(), "pkg/Both.class", b"first");
        write_file(second.path(), "pkg/Both.class", b"second");
        write_file(second.path(), "pkg/Only.class", b"only");

        let mut search_path = SearchPath::new();
        search_path.add(first.path()).unwrap();
        search_path.add(second.path()).unwrap();

        let source = search_path.resolve("pkg.Both").unwrap();
        assert_eq!(source.open().unwrap(), b"first");
        // Dotted and slashed names are the same class
        assert_eq!(search_path.resolve("pkg/Both"), Some(source));

        let source = search_path.resolve("pkg/Only.class").unwrap();
        assert!(source.exists());
        assert_eq!(source.open().unwrap(), b"only");
        assert_eq!(
            source.relative_path(),
            Path::new("pkg").join("Only.class")
        );
    }

    #[test]
    fn test_absent() {
        let dir = tempfile::tempdir().unwrap();
        let mut search_path = SearchPath::new();
        search_path.add_directory(dir.path()).unwrap();

        assert_eq!(search_path.resolve("pkg/Missing"), None);
        let source = search_path.locate("pkg/Missing");
        assert!(matches!(source, ClassSource::Absent { .. }));
        assert!(!source.exists());
        assert!(matches!(
            source.open(),
            Err(LoadClassFileError::Nonexistent(_))
        ));
        assert!(matches!(
            search_path.load_class_file("pkg/Missing"),
            Err(LoadClassFileError::Nonexistent(_))
        ));
        assert!(matches!(
            search_path.load_class_file(""),
            Err(LoadClassFileError::EmptyName)
        ));
    }

    #[test]
    fn test_children_are_unique() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        write_file(first.path(), "pkg/A.class", b"a");
        write_file(first.path(), "pkg/B.class", b"b1");
        write_file(second.path(), "pkg/B.class", b"b2");
        write_file(second.path(), "pkg/C.class", b"c");
        write_file(second.path(), "pkg/notes.txt", b"text");

        let mut search_path = SearchPath::new();
        search_path.add(first.path()).unwrap();
        search_path.add(second.path()).unwrap();

        let children = search_path.children("pkg", |name| name.ends_with(".class"));
        let names: Vec<_> = children
            .iter()
            .map(|x| x.relative_path().file_name().unwrap().to_owned())
            .collect();
        assert_eq!(names, vec!["A.class", "B.class", "C.class"]);
        // B comes from the first root
        assert_eq!(children[1].open().unwrap(), b"b1");

        let everything = search_path.children("pkg", |_| true);
        assert_eq!(everything.len(), 4);
        assert!(search_path.children("nothing/here", |_| true).is_empty());
    }

    #[test]
    fn test_archive_root() {
        let dir = tempfile::tempdir().unwrap();
        let classes = dir.path().join("classes");
        write_file(&classes, "pkg/Local.class", &minimal_class("pkg/Local"));
        let jar_path = dir.path().join("dep.jar");
        let jarred = minimal_class("pkg/Jarred");
        write_jar(
            &jar_path,
            &[("pkg/Jarred.class", &jarred[..]), ("pkg/Local.class", &b"shadowed"[..])],
        );

        let class_path = std::env::join_paths([&classes, &jar_path]).unwrap();
        let search_path = SearchPath::from_class_path(class_path.to_str().unwrap());
        assert_eq!(search_path.roots().len(), 2);
        assert!(matches!(search_path.roots()[1], SearchRoot::Archive(_)));

        let data = search_path.load_class_file("pkg.Jarred").unwrap();
        assert_eq!(data.class_file.this_class_name().unwrap(), "pkg/Jarred");
        assert!(data.source.ends_with("dep.jar!/pkg/Jarred.class"));

        // The directory is earlier, so the jar's copy is never used
        let data = search_path.load_class_file("pkg/Local").unwrap();
        assert_eq!(data.class_file.this_class_name().unwrap(), "pkg/Local");

        let children = search_path.children("pkg", |name| name.ends_with(".class"));
        assert_eq!(children.len(), 2);
        assert!(matches!(children[0], ClassSource::ArchiveEntry { .. }));
        assert!(matches!(children[1], ClassSource::File { .. }));
    }

    #[test]
    fn test_nested_packages_exist_like_directories() {
        let dir = tempfile::tempdir().unwrap();
        let jar_path = dir.path().join("lib.jar");
        write_jar(&jar_path, &[("pkg/sub/B.class", &b"nested"[..])]);
        let classes = dir.path().join("classes");
        write_file(&classes, "pkg/sub/B.class", b"nested");

        let mut search_path = SearchPath::new();
        search_path.add_archive(&jar_path).unwrap();
        search_path.add_directory(&classes).unwrap();

        // The archive is first, so its package directory is the one that is kept
        let children = search_path.children("pkg", |_| true);
        assert_eq!(children.len(), 1);
        assert!(matches!(children[0], ClassSource::ArchiveEntry { .. }));
        assert!(!children[0].exists());
        assert!(children[0].open().is_err());

        let mut dir_only = SearchPath::new();
        dir_only.add_directory(&classes).unwrap();
        let children = dir_only.children("pkg", |_| true);
        assert_eq!(children.len(), 1);
        assert!(!children[0].exists());

        for source in search_path.children("pkg/sub", |_| true) {
            assert!(source.exists());
            assert_eq!(source.open().unwrap(), b"nested");
        }
    }

    #[test]
    fn test_missing_roots_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing");
        let class_path = std::env::join_paths([dir.path(), missing.as_path()]).unwrap();
        let search_path = SearchPath::from_class_path(class_path.to_str().unwrap());
        assert_eq!(search_path.roots().len(), 1);
    }
}
