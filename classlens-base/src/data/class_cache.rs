use indexmap::IndexMap;

use crate::{
    class::{ArrayClass, ClassVariant, LoadedClass, TypeTag},
    code::line_table::SteppingInfo,
    id::{is_array_class, ClassId, ClassStatus, MethodId},
    util::{self},
};

use super::class_file_loader::ClassFileLoader;

/// The classes that have been registered, keyed by the id the vm gave them.
///
/// Registering takes `&mut self`, so checking for a class and then loading and inserting it
/// can't be interleaved with another registration. Wrap the cache in a `Mutex` to share it
/// between threads.
#[derive(Debug)]
pub struct ClassCache<L> {
    /// Whether to log that we're loading a class
    /// Uses `tracing::info!`
    pub log_load: bool,
    loader: L,
    map: IndexMap<
        ClassId,
        ClassVariant,
        <util::HashWrapper as util::HashWrapperTrait<ClassId>>::HashMapHasher,
    >,
}
impl<L: ClassFileLoader> ClassCache<L> {
    pub fn new(loader: L) -> ClassCache<L> {
        ClassCache {
            log_load: false,
            loader,
            map: IndexMap::with_hasher(Default::default()),
        }
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    #[must_use]
    pub fn contains_key(&self, key: &ClassId) -> bool {
        self.map.contains_key(key)
    }

    #[must_use]
    pub fn get(&self, key: &ClassId) -> Option<&ClassVariant> {
        self.map.get(key)
    }

    /// Iterate over the classes in the order they were registered
    pub fn iter(&self) -> impl Iterator<Item = &ClassVariant> + '_ {
        self.map.values()
    }

    /// Returns false if there is no class with that id
    pub fn set_status(&mut self, key: ClassId, status: ClassStatus) -> bool {
        if let Some(class) = self.map.get_mut(&key) {
            class.set_status(status);
            true
        } else {
            false
        }
    }

    /// Find a registered class by its name, in either the dotted or slashed form
    #[must_use]
    pub fn lookup_by_name(&self, name: &str) -> Option<&ClassVariant> {
        let name = name.replace('.', "/");
        self.map.values().find(|class| class.name() == name)
    }

    /// Get the class registered under `id`, loading and registering it if it isn't there yet.
    ///
    /// A class that is already registered only has its status updated. Arrays have no class
    /// file, and so are registered with just their name. If the class file can't be found or
    /// decoded then that is logged, nothing is registered, and `None` is returned.
    pub fn find_class(
        &mut self,
        id: ClassId,
        name: &str,
        type_tag: TypeTag,
        status: ClassStatus,
    ) -> Option<&ClassVariant> {
        if self.map.contains_key(&id) {
            let class = self.map.get_mut(&id)?;
            if class.name() != name.replace('.', "/") {
                tracing::warn!(
                    "Class {:?} was registered again as {}, but it is already {}",
                    id,
                    name,
                    class.name()
                );
            }
            class.set_status(status);
            return Some(class);
        }

        if self.log_load {
            tracing::info!("====> C{} ({:?})", name, id);
        }

        let class = if type_tag == TypeTag::Array || is_array_class(name) {
            ClassVariant::Array(ArrayClass::new(id, status, name.to_owned()))
        } else {
            let data = match self.loader.load_class_file(name) {
                Ok(data) => data,
                Err(err) => {
                    tracing::warn!("Failed to load class {}: {}", name, err);
                    return None;
                }
            };

            let mut class = match LoadedClass::new(id, status, data) {
                Ok(class) => class,
                Err(err) => {
                    tracing::warn!("Class file for {} is malformed: {}", name, err);
                    return None;
                }
            };

            // The vm's name for the class is what it is registered as
            let requested = name.replace('.', "/");
            if class.name() != requested {
                tracing::warn!(
                    "Requested class {} but its class file is for {}",
                    requested,
                    class.name()
                );
                class.set_name(requested);
            }

            if type_tag != class.type_tag() {
                tracing::debug!(
                    "Class {} was requested as {:?} but is {:?}",
                    name,
                    type_tag,
                    class.type_tag()
                );
            }

            ClassVariant::Class(class)
        };

        self.map.insert(id, class);
        self.map.get(&id)
    }

    /// Where to put breakpoints to step over the line containing `offset` in the method.
    /// `None` if the class isn't registered, is an array, or doesn't have the method.
    #[must_use]
    pub fn stepping_info(&self, method_id: MethodId, offset: u32) -> Option<SteppingInfo> {
        let (class_id, method_index) = method_id.decompose();
        let class = self.get(&class_id)?.as_class()?;
        let method = class.class_file().method_by_index(method_index)?;
        Some(method.stepping_info(offset))
    }
}
