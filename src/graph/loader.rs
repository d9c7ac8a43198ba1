use crate::base::*;
use crate::base::types::*;

/// Provides deferred loading of objects known only by their location.
///
/// Parsing collaborators register objects with a byte position (or an object stream slot)
/// long before the values are needed; the first [`Indirect::resolve()`](super::Indirect::resolve)
/// call goes through this trait to materialize them. The `oref` argument carries the expected
/// identity so that implementations can verify they read the right object.
pub trait Loader {
    /// Loads the object stored uncompressed at `offset` (relative to `%PDF`).
    fn load_at(&self, offset: Offset, oref: &ObjRef) -> Result<Object, Error>;

    /// Loads the object stored at `index` within the object stream numbered `num_within`.
    fn load_in_stream(&self, num_within: ObjNum, index: ObjIndex, oref: &ObjRef) -> Result<Object, Error>;
}

/// The no-op loader for fully in-memory documents.
impl Loader for () {
    fn load_at(&self, _: Offset, _: &ObjRef) -> Result<Object, Error> {
        Err(Error::Malformed("no loader provided for deferred objects"))
    }

    fn load_in_stream(&self, _: ObjNum, _: ObjIndex, _: &ObjRef) -> Result<Object, Error> {
        Err(Error::Malformed("no loader provided for deferred objects"))
    }
}
