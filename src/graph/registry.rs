use std::cell::Cell;
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use crate::base::*;
use crate::base::types::*;

use super::{Closure, Indirect, Loader, State, Walk};

/// The object registry: the cross-reference table of a live document.
///
/// Owns one [`Indirect`] node per indirect object, keyed (and thus iterated) in ascending
/// [`ObjRef`] order. The registry allocates fresh object numbers, resolves references
/// (substituting a [`DeadObject`] placeholder for anything unresolvable), and carries the
/// trailer dictionary that roots the reachability analysis.
#[derive(Debug, Default)]
pub struct Registry {
    table: BTreeMap<ObjRef, Indirect>,
    trailer: Dict,
    max_num: ObjNum,
    under_construction: bool,
    dead: DeadObject,
}

impl Registry {
    pub fn new() -> Registry {
        Registry::default()
    }

    /// The trailer dictionary. Its `/Root` entry (and everything else it references) is the
    /// entry point for reachability.
    pub fn trailer(&self) -> &Dict {
        &self.trailer
    }

    pub fn trailer_mut(&mut self) -> &mut Dict {
        &mut self.trailer
    }

    pub fn set_trailer(&mut self, trailer: Dict) {
        self.trailer = trailer;
    }

    /// Toggles construction mode. While a document is being built up from a parsed file,
    /// duplicate object numbers are a tolerated input defect (first occurrence wins); outside
    /// of it they are a caller bug and rejected with [`Error::DuplicateObject`].
    pub fn set_under_construction(&mut self, flag: bool) {
        self.under_construction = flag;
    }

    pub fn is_under_construction(&self) -> bool {
        self.under_construction
    }

    /// The largest object number ever registered.
    pub fn max_number(&self) -> ObjNum {
        self.max_num
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn contains(&self, oref: &ObjRef) -> bool {
        self.table.contains_key(oref)
    }

    pub fn get(&self, oref: &ObjRef) -> Option<&Indirect> {
        self.table.get(oref)
    }

    /// All registered references in ascending [`ObjRef`] order — the basis for both closure
    /// output and serialization.
    pub fn refs_sorted(&self) -> impl Iterator<Item = &ObjRef> {
        self.table.keys()
    }

    /// Registers `obj` as a new indirect object under a freshly allocated number
    /// (generation 0) and returns its identity.
    ///
    /// An [`Object::Ref`] is already indirect by definition and is refused with
    /// [`Error::AlreadyIndirect`]; wrapping a reference in a second identity would break the
    /// one-node-per-object invariant.
    pub fn add(&mut self, obj: Object) -> Result<ObjRef, Error> {
        if matches!(obj, Object::Ref(_)) {
            return Err(Error::AlreadyIndirect);
        }
        self.max_num += 1;
        let oref = ObjRef { num: self.max_num, gen: 0 };
        self.table.insert(oref, Indirect::new(oref, State::Loaded(obj)));
        Ok(oref)
    }

    /// Registers `obj` under an identity carried over from a parsed file.
    pub fn insert(&mut self, oref: ObjRef, obj: Object) -> Result<(), Error> {
        self.occupy(oref, State::Loaded(obj))
    }

    /// Records an object awaiting lazy load from a plain byte offset.
    pub fn add_offset(&mut self, oref: ObjRef, offset: Offset) -> Result<(), Error> {
        self.occupy(oref, State::Offset(offset))
    }

    /// Records an object awaiting lazy load from an object stream (type 2 entry).
    pub fn add_in_stream(&mut self, oref: ObjRef, num_within: ObjNum, index: ObjIndex) -> Result<(), Error> {
        self.occupy(oref, State::InStream { num_within, index })
    }

    fn occupy(&mut self, oref: ObjRef, state: State) -> Result<(), Error> {
        if oref.is_empty() {
            return Err(Error::Malformed("empty object number"));
        }
        match self.table.entry(oref) {
            Entry::Vacant(entry) => {
                entry.insert(Indirect::new(oref, state));
                self.max_num = std::cmp::max(self.max_num, oref.num);
                Ok(())
            },
            Entry::Occupied(_) => {
                if self.under_construction {
                    log::warn!("Duplicate object number {oref} R, keeping the first occurrence.");
                    Ok(())
                } else {
                    Err(Error::DuplicateObject(oref))
                }
            }
        }
    }

    /// Replaces the value of an already registered object.
    pub fn replace(&mut self, oref: ObjRef, obj: Object) -> Result<(), Error> {
        match self.table.get_mut(&oref) {
            Some(ind) => {
                *ind.state.get_mut() = State::Loaded(obj);
                Ok(())
            },
            None => Err(Error::Malformed("replacing an unregistered object"))
        }
    }

    /// Removes the mapping for `oref`. Objects still referencing it are left alone; such
    /// dangling references resolve to the dead object placeholder at read time.
    pub fn remove(&mut self, oref: &ObjRef) -> bool {
        self.table.remove(oref).is_some()
    }

    /// Resolves a reference into an owned object. This never fails: a missing entry or a
    /// failed materialization substitutes the [`DeadObject`] placeholder (and bumps its
    /// counter), because files in the wild routinely contain dangling references.
    pub fn resolve(&self, oref: &ObjRef, loader: &dyn Loader) -> Object {
        match self.table.get(oref) {
            Some(ind) => match ind.resolve(loader) {
                Ok(obj) => obj,
                Err(err) => {
                    log::warn!("Could not materialize {oref} R: {err}");
                    self.dead.substitute()
                }
            },
            None => {
                log::warn!("Dangling reference {oref} R.");
                self.dead.substitute()
            }
        }
    }

    /// How many times an unresolvable reference has been substituted by the dead object.
    pub fn dead_count(&self) -> u32 {
        self.dead.count()
    }

    /// Computes the set of objects transitively reachable from the trailer.
    pub fn closure(&self, loader: &dyn Loader) -> Closure {
        let mut walk = Walk::new(self, loader);
        walk.scan(&Object::Dict(self.trailer.clone()), 0);
        walk.finish()
    }

    /// Computes the set of objects transitively reachable from an arbitrary root, e.g. a
    /// single page dictionary about to be cloned into another document.
    pub fn closure_from(&self, root: &Object, loader: &dyn Loader) -> Closure {
        let mut walk = Walk::new(self, loader);
        walk.scan(root, 0);
        walk.finish()
    }

    /// Drops every object not reachable from the trailer and returns the number of entries
    /// removed.
    pub fn compact(&mut self, loader: &dyn Loader) -> usize {
        let closure = self.closure(loader);
        let before = self.table.len();
        self.table.retain(|oref, _ind| closure.contains(oref));
        let removed = before - self.table.len();
        if removed > 0 {
            log::info!("Compaction removed {removed} unreachable object(s).");
        }
        removed
    }

    /// Reassigns object numbers `1..=N`, generation 0, in ascending order of the old
    /// identities, rewriting every reference embedded in the stored values and in the
    /// trailer.
    ///
    /// Must only be called on a fully materialized registry — in practice, after
    /// [`Registry::compact()`], which resolves every surviving object. References inside a
    /// still-deferred value cannot be rewritten and would come out stale.
    pub fn renumber(&mut self) {
        let map = self.table.keys()
            .enumerate()
            .map(|(ix, &old)| (old, ObjRef { num: ix as ObjNum + 1, gen: 0 }))
            .collect::<BTreeMap<_, _>>();
        let old_table = std::mem::take(&mut self.table);
        for (old_ref, mut ind) in old_table {
            let new_ref = map[&old_ref];
            ind.oref = new_ref;
            match ind.state.get_mut() {
                State::Loaded(obj) => renumber_obj(obj, &map),
                _ => log::warn!("Renumbering deferred object {old_ref} R, embedded references are left unrewritten.")
            }
            self.table.insert(new_ref, ind);
        }
        for obj in self.trailer.values_mut() {
            renumber_obj(obj, &map);
        }
        self.max_num = self.table.len() as ObjNum;
    }
}

fn renumber_obj(obj: &mut Object, map: &BTreeMap<ObjRef, ObjRef>) {
    match obj {
        Object::Ref(oref) => match map.get(oref) {
            Some(new_ref) => *oref = *new_ref,
            None => {
                // a stale number could collide with a freshly assigned one; point the
                // dangling link at the never-assigned number zero instead
                log::warn!("Dangling reference {oref} R detached during renumbering.");
                *oref = ObjRef::EMPTY;
            }
        },
        Object::Array(arr) => for item in arr {
            renumber_obj(item, map);
        },
        Object::Dict(dict) => for item in dict.values_mut() {
            renumber_obj(item, map);
        },
        Object::Stream(stm) => for item in stm.dict.values_mut() {
            renumber_obj(item, map);
        },
        _ => ()
    }
}

/// The placeholder substituted for references that cannot be resolved.
///
/// A single counter per document records how many times the substitution happened, so the
/// damage done by a corrupt input stays observable.
#[derive(Debug, Default)]
pub struct DeadObject {
    count: Cell<u32>,
}

impl DeadObject {
    pub(crate) fn substitute(&self) -> Object {
        self.count.set(self.count.get() + 1);
        Object::Dict(Dict::from(vec![
            (Name::from(b"Type"), Object::new_name(b"DeadObject")),
        ]))
    }

    pub fn count(&self) -> u32 {
        self.count.get()
    }
}

/// Adapts a [`Registry`] + [`Loader`] pair to the [`Resolver`] interface consumed by
/// collaborators that walk object values generically.
pub struct RegistryResolver<'a> {
    pub registry: &'a Registry,
    pub loader: &'a dyn Loader,
}

impl Resolver for RegistryResolver<'_> {
    fn resolve_ref(&self, objref: &ObjRef) -> Result<Object, Error> {
        Ok(self.registry.resolve(objref, self.loader))
    }
}
