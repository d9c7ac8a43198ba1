use thiserror::Error;

use super::object::ObjRef;

/// The crate-wide error type.
///
/// Consistency faults ([`Error::AlreadyIndirect`], [`Error::DuplicateObject`],
/// [`Error::Config`]) indicate caller bugs and are surfaced immediately. Corrupt input, on the
/// other hand, is tolerated wherever possible: the graph walk substitutes dead objects for
/// unresolvable references instead of failing, and duplicate numbers encountered while a
/// document is under construction are dropped with a warning.
#[derive(Debug, Error)]
pub enum Error {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The object is already registered as indirect and may not be registered again.
    #[error("object is already indirect")]
    AlreadyIndirect,

    /// The object number is already occupied in the registry.
    #[error("duplicate object number {0} R")]
    DuplicateObject(ObjRef),

    /// Malformed data (corrupt object stream, empty object number, and the like).
    #[error("{0}")]
    Malformed(&'static str),

    /// The requested save configuration is not expressible (caller contract violation).
    #[error("invalid save configuration: {0}")]
    Config(&'static str),
}
