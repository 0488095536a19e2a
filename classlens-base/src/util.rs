use std::path::PathBuf;

/// Convert a class name into the path of its class file, relative to a search root.
/// Both `java.lang.String` and `java/lang/String` become `java/lang/String.class`, and a name
/// that already ends in `.class` keeps it.
#[must_use]
pub fn class_name_to_relative_path(class_name: &str) -> PathBuf {
    let name = class_name.strip_suffix(".class").unwrap_or(class_name);

    let mut path = PathBuf::new();
    for part in name.split(|c| c == '.' || c == '/') {
        path.push(part);
    }
    path.set_extension("class");
    path
}

/// The same as [`class_name_to_relative_path`] but with `/` as the separator regardless of
/// platform, which is how entries are named inside of jars
#[must_use]
pub fn class_name_to_entry_name(class_name: &str) -> String {
    let name = class_name.strip_suffix(".class").unwrap_or(class_name);
    format!("{}.class", name.replace('.', "/"))
}

/// Iterate over the parts of a slashed package or class name
#[must_use]
pub fn access_path_iter(package: &str) -> impl DoubleEndedIterator<Item = &str> + Clone {
    package.split('/')
}

/// The last part of a class name, like `String` for `java/lang/String`
#[must_use]
pub fn base_name(class_name: &str) -> &str {
    access_path_iter(class_name).next_back().unwrap_or(class_name)
}

#[must_use]
pub fn format_class_as_object_desc(class_name: &str) -> String {
    let mut res = String::with_capacity(2 + class_name.len());
    res.push('L');
    res.push_str(class_name);
    res.push(';');
    res
}

// `RandomState` has no type parameter while `BuildNoHashHasher<T>` does, so the choice between
// them goes through a trait that can carry the unused `T`.
pub(crate) trait HashWrapperTrait<T> {
    type HashMapHasher;
}
pub(crate) struct HashWrapper;
impl<T> HashWrapperTrait<T> for HashWrapper {
    #[cfg(feature = "implementation-cheaper-map-hashing")]
    type HashMapHasher = nohash_hasher::BuildNoHashHasher<T>;
    #[cfg(not(feature = "implementation-cheaper-map-hashing"))]
    type HashMapHasher = std::collections::hash_map::RandomState;
}
