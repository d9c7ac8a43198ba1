use std::collections::{HashSet, VecDeque};

use crate::base::*;

use super::{Loader, Registry};

/// Recursion ceiling for the reachability scan. References encountered deeper than this are
/// queued and revisited iteratively instead of growing the call stack.
const MAX_DEPTH: usize = 1000;

/// The result of a reachability analysis: the set of indirect objects transitively
/// reachable from a chosen root.
///
/// Remembers discovery order (stable across runs thanks to the registry's sorted iteration),
/// which serializers rely on for reproducible output.
#[derive(Debug, Default)]
pub struct Closure {
    visited: HashSet<ObjRef>,
    order: Vec<ObjRef>,
}

impl Closure {
    pub fn contains(&self, oref: &ObjRef) -> bool {
        self.visited.contains(oref)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// References in the order they were first discovered.
    pub fn iter(&self) -> impl Iterator<Item = &ObjRef> {
        self.order.iter()
    }

    /// References in ascending [`ObjRef`] order.
    pub fn sorted(&self) -> Vec<ObjRef> {
        let mut refs = self.order.clone();
        refs.sort();
        refs
    }
}

/// One reachability scan in progress. All of its state is owned here, so concurrent or
/// repeated scans over the same registry cannot interfere with each other.
pub(crate) struct Walk<'a> {
    registry: &'a Registry,
    loader: &'a dyn Loader,
    closure: Closure,
    overflow: VecDeque<ObjRef>,
}

impl<'a> Walk<'a> {
    pub(crate) fn new(registry: &'a Registry, loader: &'a dyn Loader) -> Self {
        Walk { registry, loader, closure: Closure::default(), overflow: VecDeque::new() }
    }

    /// Scans a value for references. Direct containers are descended into in place; they have
    /// no identity of their own and never appear in the closure.
    pub(crate) fn scan(&mut self, obj: &Object, depth: usize) {
        match obj {
            Object::Ref(oref) => self.visit(*oref, depth),
            Object::Array(arr) => for item in arr {
                self.scan(item, depth);
            },
            Object::Dict(dict) => for (_name, item) in dict {
                self.scan(item, depth);
            },
            Object::Stream(stm) => for (_name, item) in &stm.dict {
                self.scan(item, depth);
            },
            _ => ()
        }
    }

    fn visit(&mut self, oref: ObjRef, depth: usize) {
        if self.closure.visited.contains(&oref) {
            return;
        }
        if depth >= MAX_DEPTH {
            self.overflow.push_back(oref);
            return;
        }
        self.closure.visited.insert(oref);
        if !self.registry.contains(&oref) {
            // counted as a dead access, but a dangling target is not part of the closure
            let _ = self.registry.resolve(&oref, self.loader);
            self.closure.visited.remove(&oref);
            return;
        }
        self.closure.order.push(oref);
        let obj = self.registry.resolve(&oref, self.loader);
        self.scan(&obj, depth + 1);
    }

    fn drain(&mut self) {
        while let Some(oref) = self.overflow.pop_front() {
            self.visit(oref, 0);
        }
    }

    pub(crate) fn finish(mut self) -> Closure {
        self.drain();
        self.closure
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_self_cycle() {
        let mut reg = Registry::new();
        let r1 = reg.add(Object::Null).unwrap();
        reg.replace(r1, Object::Dict(Dict::from(vec![
            (Name::from(b"Me"), Object::Ref(r1)),
        ]))).unwrap();

        let closure = reg.closure_from(&Object::Ref(r1), &());
        assert_eq!(closure.len(), 1);
        assert!(closure.contains(&r1));
    }

    #[test]
    fn test_idempotent() {
        let mut reg = Registry::new();
        let r1 = reg.add(Object::Null).unwrap();
        let r2 = reg.add(Object::Array(vec![Object::Ref(r1), Object::Ref(r1)])).unwrap();
        reg.trailer_mut().set(Name::from(b"Root"), Object::Ref(r2));

        let first = reg.closure(&());
        let second = reg.closure(&());
        assert_eq!(first.sorted(), second.sorted());
        assert_eq!(first.iter().collect::<Vec<_>>(), second.iter().collect::<Vec<_>>());
        assert_eq!(first.len(), 2);
    }

    #[test]
    fn test_discovery_order() {
        let mut reg = Registry::new();
        let r1 = reg.add(Object::Null).unwrap();
        let r2 = reg.add(Object::Null).unwrap();
        let r3 = reg.add(Object::Array(vec![Object::Ref(r2), Object::Ref(r1)])).unwrap();

        let closure = reg.closure_from(&Object::Ref(r3), &());
        assert_eq!(closure.iter().copied().collect::<Vec<_>>(), vec![r3, r2, r1]);
        assert_eq!(closure.sorted(), vec![r1, r2, r3]);
    }

    #[test]
    fn test_deep_chain_terminates() {
        // a linked list three times deeper than the recursion ceiling
        let mut reg = Registry::new();
        const LEN: u64 = 3000;
        for num in 1..LEN {
            reg.insert(ObjRef { num, gen: 0 }, Object::Dict(Dict::from(vec![
                (Name::from(b"Next"), Object::Ref(ObjRef { num: num + 1, gen: 0 })),
            ]))).unwrap();
        }
        reg.insert(ObjRef { num: LEN, gen: 0 }, Object::Null).unwrap();

        let closure = reg.closure_from(&Object::Ref(ObjRef { num: 1, gen: 0 }), &());
        assert_eq!(closure.len(), LEN as usize);
    }

    #[test]
    fn test_direct_containers_descended() {
        let mut reg = Registry::new();
        let r1 = reg.add(Object::Bool(true)).unwrap();
        let root = Object::Dict(Dict::from(vec![
            (Name::from(b"Kids"), Object::Array(vec![
                Object::Dict(Dict::from(vec![
                    (Name::from(b"Leaf"), Object::Ref(r1)),
                ])),
            ])),
        ]));

        let closure = reg.closure_from(&root, &());
        // only the indirect object is indexed, the anonymous containers are not
        assert_eq!(closure.sorted(), vec![r1]);
    }

    #[test]
    fn test_dangling_not_included() {
        let mut reg = Registry::new();
        let missing = ObjRef { num: 77, gen: 0 };
        let r1 = reg.add(Object::Array(vec![Object::Ref(missing)])).unwrap();

        let closure = reg.closure_from(&Object::Ref(r1), &());
        assert_eq!(closure.sorted(), vec![r1]);
        assert!(!closure.contains(&missing));
        assert_eq!(reg.dead_count(), 1);
    }
}
