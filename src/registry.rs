//! The object registry: single owner of every entity in a project file.
//!
//! [`AllObjects`] is an arena keyed by [`Guid`]. All cross-object links are
//! weak [`Reference`] handles (just an identifier plus a type marker);
//! dereferencing is always a fresh lookup, so mutation of the graph is always
//! observed and there is no shared ownership to form cycles. Creating a
//! reference increments the target's count, removing one decrements it, and a
//! count reaching zero evicts the entity: the count *is* the ownership
//! mechanism, not a cache policy.

use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

use rustc_hash::FxHashMap;

use crate::base::{Guid, PBXIdentifier, ResolvedPath};
use crate::error::ReferenceError;
use crate::objects::Object;

// ============================================================================
// TYPED REFERENCES
// ============================================================================

/// Projection of a typed view out of an [`Object`].
///
/// Implemented by each concrete entity struct and by the shared tier structs
/// (`Target`, `BuildPhase`, `ReferenceInfo`, `Group`) whose projections span
/// several [`crate::ObjectKind`] variants.
pub trait Resolve {
    fn resolve(object: &Object) -> Option<&Self>;
}

/// Identity projection: a reference to "any object".
impl Resolve for Object {
    fn resolve(object: &Object) -> Option<&Self> {
        Some(object)
    }
}

/// A weak, typed handle to an object in the registry.
///
/// Holds only the target identifier; the registry is passed at dereference
/// time ([`AllObjects::get`]). A reference to a wrong or missing target
/// simply resolves to `None` - dangling references are a validation concern,
/// not a construction error.
pub struct Reference<T: ?Sized> {
    id: Guid,
    _marker: PhantomData<fn() -> T>,
}

impl<T: ?Sized> Reference<T> {
    pub(crate) fn new(id: Guid) -> Self {
        Self {
            id,
            _marker: PhantomData,
        }
    }

    /// The identifier of the referenced object.
    pub fn id(&self) -> &Guid {
        &self.id
    }

    /// Re-type this handle. The target is unchanged; resolution through the
    /// new marker may simply yield `None`.
    pub fn retyped<U>(&self) -> Reference<U> {
        Reference::new(self.id.clone())
    }
}

impl<T: ?Sized> Clone for Reference<T> {
    fn clone(&self) -> Self {
        Self::new(self.id.clone())
    }
}

impl<T: ?Sized> fmt::Debug for Reference<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Reference").field(&self.id).finish()
    }
}

impl<T: ?Sized> PartialEq for Reference<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T: ?Sized> Eq for Reference<T> {}

impl<T: ?Sized> Hash for Reference<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl<T: ?Sized> PartialOrd for Reference<T> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<T: ?Sized> Ord for Reference<T> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.id.cmp(&other.id)
    }
}

// ============================================================================
// REGISTRY
// ============================================================================

/// Owner of all entities in one project file, plus the reference-count map
/// and the full-path cache for file-like entities.
#[derive(Debug, Default)]
pub struct AllObjects {
    objects: FxHashMap<Guid, Object>,
    ref_counts: FxHashMap<Guid, usize>,
    full_file_paths: FxHashMap<Guid, ResolvedPath>,
}

impl AllObjects {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Look up an object by identifier.
    pub fn object(&self, id: &Guid) -> Option<&Object> {
        self.objects.get(id)
    }

    /// Mutable lookup, for the mutation API.
    pub fn object_mut(&mut self, id: &Guid) -> Option<&mut Object> {
        self.objects.get_mut(id)
    }

    pub fn contains(&self, id: &Guid) -> bool {
        self.objects.contains_key(id)
    }

    /// Iterate all stored objects in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = &Object> {
        self.objects.values()
    }

    /// Dereference a typed handle against current registry state.
    pub fn get<T: Resolve>(&self, reference: &Reference<T>) -> Option<&T> {
        self.objects.get(reference.id()).and_then(T::resolve)
    }

    /// Current reference count for an identifier (zero if never referenced).
    pub fn ref_count(&self, id: &Guid) -> usize {
        self.ref_counts.get(id).copied().unwrap_or(0)
    }

    /// Resolved path for a file reference or synchronized root group,
    /// computed at load time.
    pub fn full_path(&self, id: &Guid) -> Option<&ResolvedPath> {
        self.full_file_paths.get(id)
    }

    pub(crate) fn set_full_paths(&mut self, paths: FxHashMap<Guid, ResolvedPath>) {
        self.full_file_paths = paths;
    }

    // ------------------------------------------------------------------
    // Reference creation / removal
    // ------------------------------------------------------------------

    /// Create a reference to `id`, incrementing its count.
    ///
    /// Never fails, even for an absent target: real-world pbxproj files with
    /// merge-conflict damage contain dangling identifiers, and those are
    /// caught later by [`Self::validate_references`].
    pub fn create_reference<T>(&mut self, id: Guid) -> Reference<T> {
        *self.ref_counts.entry(id.clone()).or_insert(0) += 1;
        Reference::new(id)
    }

    pub fn create_references<T>(&mut self, ids: Vec<Guid>) -> Vec<Reference<T>> {
        ids.into_iter().map(|id| self.create_reference(id)).collect()
    }

    pub fn create_optional_reference<T>(&mut self, id: Option<Guid>) -> Option<Reference<T>> {
        id.map(|id| self.create_reference(id))
    }

    pub fn create_optional_references<T>(
        &mut self,
        ids: Option<Vec<Guid>>,
    ) -> Option<Vec<Reference<T>>> {
        ids.map(|ids| self.create_references(ids))
    }

    /// Store an object keyed by its own identifier without touching counts.
    /// Used while building the table; counts accumulate as reference fields
    /// decode.
    pub fn insert(&mut self, object: Object) {
        self.objects.insert(object.id.clone(), object);
    }

    /// Insert an object into the registry keyed by its own identifier and
    /// return a counted reference to it.
    pub fn insert_reference<T>(&mut self, object: Object) -> Reference<T> {
        let id = object.id.clone();
        self.objects.insert(id.clone(), object);
        self.create_reference(id)
    }

    /// Drop a reference, decrementing the target's count. At zero the entity
    /// is evicted from storage. Decrementing a count that is already zero is
    /// a programming error and is reported, not silently ignored.
    pub fn remove_reference<T>(&mut self, reference: Reference<T>) {
        let id = reference.id().clone();
        match self.ref_counts.get_mut(&id) {
            Some(count) if *count > 0 => {
                *count -= 1;
                if *count == 0 {
                    self.ref_counts.remove(&id);
                    self.objects.remove(&id);
                    self.full_file_paths.remove(&id);
                }
            }
            _ => {
                tracing::error!(id = %id, "remove_reference: no active references to decrement");
                debug_assert!(false, "ref count for {id} is already zero");
            }
        }
    }

    // ------------------------------------------------------------------
    // Fresh identifiers
    // ------------------------------------------------------------------

    /// Mint an identifier not currently present in the registry, derived from
    /// `seed` so it looks like it came from the same host and user.
    ///
    /// Ten attempts with fresh time/random components, then a UUID fallback
    /// (also used when the seed is not a well-formed 24-hex identifier). The
    /// minting path never returns an in-use identifier; the UUID fallback is
    /// collision-free only probabilistically.
    pub fn create_fresh_guid(&self, seed: &Guid) -> Guid {
        let Some(identifier) = PBXIdentifier::parse(seed.as_str()) else {
            return uuid_guid();
        };

        for _ in 0..10 {
            let guid = Guid::new(identifier.create_fresh_identifier().string_value());
            if self.objects.contains_key(&guid) {
                continue;
            }
            return guid;
        }

        uuid_guid()
    }

    // ------------------------------------------------------------------
    // Validation
    // ------------------------------------------------------------------

    /// Check referential integrity of the whole graph.
    ///
    /// Dead references are identifiers with a reference count but no stored
    /// object; orphans are stored objects nothing references. Errors come
    /// back in deterministic order (referring object id, then key path) and
    /// the caller decides whether they are fatal.
    pub fn validate_references(&self) -> Result<(), Vec<ReferenceError>> {
        let ref_keys: BTreeSet<&Guid> = self.ref_counts.keys().collect();
        let obj_keys: BTreeSet<&Guid> = self.objects.keys().collect();

        let dead_refs: BTreeSet<&Guid> = ref_keys.difference(&obj_keys).copied().collect();
        let orphans: BTreeSet<&Guid> = obj_keys.difference(&ref_keys).copied().collect();

        if dead_refs.is_empty() && orphans.is_empty() {
            return Ok(());
        }

        let mut errors = Vec::new();
        let mut covered: BTreeSet<&Guid> = BTreeSet::new();

        let mut sorted_objects: Vec<&Object> = self.objects.values().collect();
        sorted_objects.sort_by(|a, b| a.id.cmp(&b.id));

        for object in &sorted_objects {
            for (key_path, target) in object.references() {
                if !self.objects.contains_key(&target) {
                    if let Some(known) = self.ref_counts.get_key_value(&target) {
                        covered.insert(known.0);
                    }
                    errors.push(ReferenceError::DeadReference {
                        isa: object.isa.clone(),
                        id: object.id.clone(),
                        key_path,
                        target,
                    });
                }
            }
        }

        // A counted identifier with no referring field left (possible after
        // manual reference surgery) still makes the graph inconsistent.
        for id in dead_refs.difference(&covered) {
            errors.push(ReferenceError::DeadReference {
                isa: String::from("(unknown)"),
                id: (*id).clone(),
                key_path: String::from("(no referring field)"),
                target: (*id).clone(),
            });
        }

        for id in &orphans {
            if let Some(object) = self.objects.get(id) {
                errors.push(ReferenceError::OrphanObject {
                    isa: object.isa.clone(),
                    id: (*id).clone(),
                });
            }
        }

        Err(errors)
    }
}

fn uuid_guid() -> Guid {
    Guid::new(uuid::Uuid::new_v4().to_string().to_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::{Object, ObjectKind};
    use crate::value::Fields;

    fn raw_object(id: &str, isa: &str) -> Object {
        let mut fields = Fields::new();
        fields.insert("isa".into(), isa.into());
        Object {
            id: Guid::new(id),
            isa: isa.to_owned(),
            fields,
            kind: ObjectKind::Unknown,
        }
    }

    #[test]
    fn ref_count_tracks_creates_and_removes() {
        let mut objects = AllObjects::new();
        let id = Guid::new("AAAA00000000000000000001");

        let r1: Reference<Object> = objects.create_reference(id.clone());
        let r2: Reference<Object> = objects.create_reference(id.clone());
        let r3: Reference<Object> = objects.create_reference(id.clone());
        assert_eq!(objects.ref_count(&id), 3);

        objects.remove_reference(r1);
        objects.remove_reference(r2);
        assert_eq!(objects.ref_count(&id), 1);
        objects.remove_reference(r3);
        assert_eq!(objects.ref_count(&id), 0);
    }

    #[test]
    fn entity_evicted_when_count_reaches_zero() {
        let mut objects = AllObjects::new();
        let object = raw_object("AAAA00000000000000000001", "PBXBuildFile");
        let id = object.id.clone();

        let reference: Reference<Object> = objects.insert_reference(object);
        assert!(objects.contains(&id));

        objects.remove_reference(reference);
        assert!(!objects.contains(&id));
    }

    #[test]
    fn dereference_observes_current_state() {
        let mut objects = AllObjects::new();
        let object = raw_object("AAAA00000000000000000001", "PBXBuildFile");
        let id = object.id.clone();

        let reference: Reference<Object> = objects.create_reference(id.clone());
        assert!(objects.get(&reference).is_none(), "not inserted yet");

        let _owner: Reference<Object> = objects.insert_reference(object);
        assert!(objects.get(&reference).is_some(), "insertion is observed");
        assert_eq!(objects.get(&reference).map(|o| o.isa.as_str()), Some("PBXBuildFile"));
    }

    #[test]
    fn fresh_guid_avoids_collisions_and_decodes() {
        let mut objects = AllObjects::new();
        let seed = Guid::new("8B0A20D31D3FD1FF00E67113");
        let _r: Reference<Object> =
            objects.insert_reference(raw_object("8B0A20D31D3FD1FF00E67113", "PBXProject"));

        let fresh = objects.create_fresh_guid(&seed);
        assert_ne!(fresh, seed);
        assert!(!objects.contains(&fresh));
        assert!(PBXIdentifier::parse(fresh.as_str()).is_some());
    }

    #[test]
    fn fresh_guid_falls_back_to_uuid_for_odd_seed() {
        let objects = AllObjects::new();
        let fresh = objects.create_fresh_guid(&Guid::new("not-a-pbx-identifier"));
        assert!(fresh.as_str().contains('-'), "uuid-shaped: {fresh}");
    }

    #[test]
    fn validation_of_consistent_graph_is_clean() {
        let mut objects = AllObjects::new();
        let object = raw_object("AAAA00000000000000000001", "PBXBuildFile");
        let _r: Reference<Object> = objects.insert_reference(object);
        assert!(objects.validate_references().is_ok());
    }

    #[test]
    fn unreferenced_object_is_an_orphan() {
        let mut objects = AllObjects::new();
        let object = raw_object("AAAA00000000000000000001", "PBXFileReference");
        let id = object.id.clone();
        objects.insert(object);

        let errors = objects.validate_references().expect_err("should fail");
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0],
            ReferenceError::OrphanObject {
                isa: "PBXFileReference".into(),
                id,
            }
        );
    }
}
