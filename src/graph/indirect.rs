use std::cell::RefCell;

use crate::base::*;
use crate::base::types::*;

use super::Loader;

/// The indirection node for a single indirect object.
///
/// Exactly one `Indirect` exists per indirect object, owned by the
/// [`Registry`](super::Registry). The node either holds the materialized value or remembers
/// where the value can be loaded from on first access. Equality and ordering are by
/// [`ObjRef`].
#[derive(Debug)]
pub struct Indirect {
    pub(crate) oref: ObjRef,
    pub(crate) state: RefCell<State>,
}

/// Resolution state of an [`Indirect`] node.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum State {
    /// The value is materialized.
    Loaded(Object),
    /// Awaiting lazy load from a plain byte offset.
    Offset(Offset),
    /// Awaiting lazy load from an object stream (a "type 2" cross-reference entry).
    InStream { num_within: ObjNum, index: ObjIndex },
}

impl Indirect {
    pub(crate) fn new(oref: ObjRef, state: State) -> Self {
        Indirect { oref, state: RefCell::new(state) }
    }

    /// The identity this node is registered under.
    pub fn oref(&self) -> ObjRef {
        self.oref
    }

    /// The byte position recorded at registration time, while the value is not yet
    /// materialized. `None` once loaded or when the object lives in an object stream.
    pub fn offset(&self) -> Option<Offset> {
        match *self.state.borrow() {
            State::Offset(offset) => Some(offset),
            _ => None
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(*self.state.borrow(), State::Loaded(_))
    }

    /// Resolves this node into an owned [`Object`].
    ///
    /// A deferred node is materialized through `loader` exactly once and the result cached in
    /// place; subsequent calls clone the cached value. Materialization is an explicit step, so
    /// callers can distinguish "not yet loaded" (via [`Indirect::is_loaded()`]) from "loaded".
    pub fn resolve(&self, loader: &dyn Loader) -> Result<Object, Error> {
        let loaded = {
            let state = self.state.borrow();
            match &*state {
                State::Loaded(obj) => return Ok(obj.clone()),
                &State::Offset(offset) => loader.load_at(offset, &self.oref)?,
                &State::InStream { num_within, index } => loader.load_in_stream(num_within, index, &self.oref)?
            }
        };
        *self.state.borrow_mut() = State::Loaded(loaded.clone());
        Ok(loaded)
    }
}

impl PartialEq for Indirect {
    fn eq(&self, other: &Self) -> bool {
        self.oref == other.oref
    }
}

impl Eq for Indirect {}

impl PartialOrd for Indirect {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Indirect {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.oref.cmp(&other.oref)
    }
}
