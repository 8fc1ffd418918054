//! Interned symbols for variables, constants and function names.
//!
//! Symbols are interned globally for O(1) equality comparisons: each unique
//! name exists exactly once, and every reference shares the same slotmap key.
//! The registry is sharded by name hash to minimize lock contention, with a
//! thread-local cache in front of it for the parsing hot path.

use std::cell::RefCell;
use std::hash::Hasher;
use std::sync::{Arc, LazyLock, Mutex, RwLock};

use rustc_hash::{FxHashMap, FxHasher};
use slotmap::{DefaultKey, Key, SlotMap};

// ============================================================================
// Interned symbol type
// ============================================================================

/// A name interned in the global registry.
///
/// Equality and hashing use the slotmap key only; the `Arc<str>` name rides
/// along so display never has to go back through the registry lock.
#[derive(Debug, Clone)]
pub struct InternedSymbol {
    key: DefaultKey,
    name: Arc<str>,
}

impl InternedSymbol {
    fn new(name: &str, key: DefaultKey) -> Self {
        Self {
            key,
            name: Arc::from(name),
        }
    }

    /// Unique 64-bit ID of this symbol.
    #[inline]
    #[must_use]
    pub fn id(&self) -> u64 {
        self.key.data().as_ffi()
    }

    /// The symbol's name.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl PartialEq for InternedSymbol {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for InternedSymbol {}

impl std::hash::Hash for InternedSymbol {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl PartialOrd for InternedSymbol {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for InternedSymbol {
    /// Canonical ordering is by name so serialized forms are stable across
    /// processes, with the key as a tiebreaker.
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.name
            .as_ref()
            .cmp(other.name.as_ref())
            .then_with(|| self.key.cmp(&other.key))
    }
}

impl AsRef<str> for InternedSymbol {
    fn as_ref(&self) -> &str {
        &self.name
    }
}

// ============================================================================
// Global registry
// ============================================================================

const NUM_SHARDS: usize = 16;

struct RegistryShard {
    name_to_key: FxHashMap<String, DefaultKey>,
}

struct SymbolRegistry {
    shards: [Mutex<RegistryShard>; NUM_SHARDS],
    key_to_data: RwLock<SlotMap<DefaultKey, InternedSymbol>>,
}

impl SymbolRegistry {
    fn new() -> Self {
        let shards: [Mutex<RegistryShard>; NUM_SHARDS] = std::array::from_fn(|_| {
            Mutex::new(RegistryShard {
                name_to_key: FxHashMap::default(),
            })
        });
        Self {
            shards,
            key_to_data: RwLock::new(SlotMap::with_key()),
        }
    }

    fn shard(&self, name: &str) -> &Mutex<RegistryShard> {
        let mut hasher = FxHasher::default();
        std::hash::Hash::hash(name, &mut hasher);
        let hash = hasher.finish();
        #[allow(
            clippy::cast_possible_truncation,
            reason = "Only the low bits matter for shard selection"
        )]
        let idx = (hash as usize) % NUM_SHARDS;
        &self.shards[idx]
    }
}

static REGISTRY: LazyLock<SymbolRegistry> = LazyLock::new(SymbolRegistry::new);

thread_local! {
    // Name -> symbol cache to avoid global lock contention during parsing
    static NAME_CACHE: RefCell<FxHashMap<String, InternedSymbol>> =
        RefCell::new(FxHashMap::default());
}

fn key_from_id(id: u64) -> DefaultKey {
    slotmap::KeyData::from_ffi(id).into()
}

/// Intern a name, creating it on first use.
///
/// # Panics
///
/// Panics if a global registry lock is poisoned.
#[must_use]
pub fn symb(name: &str) -> InternedSymbol {
    // Fast path: thread-local cache, no locks
    if let Some(sym) = NAME_CACHE.with(|cache| cache.borrow().get(name).cloned()) {
        return sym;
    }

    let shard_lock = REGISTRY.shard(name);
    let mut shard = shard_lock.lock().expect("Symbol registry shard poisoned");

    let interned = if let Some(&key) = shard.name_to_key.get(name) {
        REGISTRY
            .key_to_data
            .read()
            .expect("Symbol registry poisoned")
            .get(key)
            .cloned()
            .unwrap_or_else(|| InternedSymbol::new(name, key))
    } else {
        let key = REGISTRY
            .key_to_data
            .write()
            .expect("Symbol registry poisoned")
            .insert_with_key(|k| InternedSymbol::new(name, k));
        shard.name_to_key.insert(name.to_owned(), key);
        InternedSymbol::new(name, key)
    };
    drop(shard);

    NAME_CACHE.with(|cache| {
        cache.borrow_mut().insert(name.to_owned(), interned.clone());
    });
    interned
}

/// Look up a symbol by its 64-bit ID.
///
/// # Panics
///
/// Panics if the global registry lock is poisoned.
#[must_use]
pub fn lookup_by_id(id: u64) -> Option<InternedSymbol> {
    REGISTRY
        .key_to_data
        .read()
        .expect("Symbol registry poisoned")
        .get(key_from_id(id))
        .cloned()
}

/// Number of distinct symbols interned so far.
///
/// # Panics
///
/// Panics if the global registry lock is poisoned.
#[must_use]
pub fn symbol_count() -> usize {
    REGISTRY
        .key_to_data
        .read()
        .expect("Symbol registry poisoned")
        .len()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "Standard test relaxations")]
mod tests {
    use super::*;

    #[test]
    fn test_interning_is_stable() {
        let a = symb("intern_test_x");
        let b = symb("intern_test_x");
        assert_eq!(a, b);
        assert_eq!(a.id(), b.id());
        assert_eq!(a.name(), "intern_test_x");
    }

    #[test]
    fn test_distinct_names_distinct_ids() {
        let a = symb("intern_test_a");
        let b = symb("intern_test_b");
        assert_ne!(a.id(), b.id());
        assert!(a < b);
    }

    #[test]
    fn test_lookup_by_id() {
        let a = symb("intern_test_lookup");
        let found = lookup_by_id(a.id()).unwrap();
        assert_eq!(found, a);
        assert_eq!(found.name(), "intern_test_lookup");
    }
}
