//! Descriptors identify a type by shape.
//!
//! Two types that are equal produce equal descriptors,
//! so descriptors can stand in for types when deduplicating
//! schemas or tagging payloads.
//!
//! Computing a descriptor walks the whole type,
//! [`DescriptorsCache`] keeps them around
//! and assigns each distinct shape a small sequential id.

use core::{fmt, ops::Deref};
use std::sync::Arc;

use hashbrown::{
    hash_map::{Entry, VacantEntry},
    HashMap,
};

use crate::ty::Type;

/// Canonical descriptor string of a type.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Descriptor(Arc<str>);

impl Descriptor {
    pub fn new(ty: &Type) -> Self {
        Descriptor(Arc::from(ty.descriptor()))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Deref for Descriptor {
    type Target = str;

    #[inline(always)]
    fn deref(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

impl fmt::Display for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

struct Cached {
    id: u32,
    descriptor: Descriptor,
}

/// Cache of type descriptors.
/// Used to avoid recomputation of descriptors.
#[derive(Default)]
pub struct DescriptorsCache {
    descriptors: HashMap<Type, Cached>,
}

impl DescriptorsCache {
    /// Creates new cache.
    pub fn new() -> Self {
        DescriptorsCache {
            descriptors: HashMap::new(),
        }
    }

    /// Returns descriptor of the type.
    pub fn descriptor(&mut self, ty: &Type) -> &Descriptor {
        &self.entry(ty).descriptor
    }

    /// Returns id of the type's shape.
    ///
    /// Ids are assigned sequentially from zero in order of first request.
    /// Equal types share an id.
    pub fn id_of(&mut self, ty: &Type) -> u32 {
        self.entry(ty).id
    }

    /// Number of distinct shapes seen.
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    fn entry(&mut self, ty: &Type) -> &Cached {
        #[cold]
        fn new_descriptor<'a>(entry: VacantEntry<'a, Type, Cached>, id: u32) -> &'a Cached {
            let descriptor = Descriptor::new(entry.key());
            log::trace!("new descriptor #{id}: {descriptor}");
            &*entry.insert(Cached { id, descriptor })
        }

        // Ids are never reused since entries are never removed.
        let next_id = self.descriptors.len() as u32;
        match self.descriptors.entry(ty.clone()) {
            Entry::Occupied(entry) => &*entry.into_mut(),
            Entry::Vacant(entry) => new_descriptor(entry, next_id),
        }
    }
}

impl fmt::Debug for DescriptorsCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(
                self.descriptors
                    .values()
                    .map(|cached| (cached.id, &cached.descriptor)),
            )
            .finish()
    }
}

#[cfg(feature = "global-cache")]
mod global_cache {
    use std::sync::OnceLock;

    use hashbrown::{hash_map::Entry, HashMap};

    use crate::ty::Type;

    use super::Descriptor;

    type GlobalCache = HashMap<Type, Descriptor, ahash::RandomState>;

    static GLOBAL_CACHE: OnceLock<parking_lot::RwLock<GlobalCache>> = OnceLock::new();

    fn cache() -> &'static parking_lot::RwLock<GlobalCache> {
        GLOBAL_CACHE
            .get_or_init(|| parking_lot::RwLock::new(HashMap::with_hasher(Default::default())))
    }

    /// Returns descriptor of the type from the process-wide cache.
    pub fn descriptor(ty: &Type) -> Descriptor {
        let cache = cache().read();
        if let Some(d) = cache.get(ty) {
            return d.clone();
        }

        drop(cache);
        new_descriptor(ty)
    }

    #[cold]
    fn new_descriptor(ty: &Type) -> Descriptor {
        let d = Descriptor::new(ty);

        let mut cache = cache().write();
        match cache.entry(ty.clone()) {
            Entry::Occupied(entry) => entry.get().clone(),
            Entry::Vacant(entry) => entry.insert(d).clone(),
        }
    }
}

#[cfg(feature = "global-cache")]
pub use global_cache::descriptor;
