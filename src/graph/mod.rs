//! The indirect object graph: identities, the registry that owns them, reachability
//! analysis, compaction, renumbering, and the bookkeeping used when objects are cloned
//! between documents.

mod loader;
pub use loader::*;

mod indirect;
pub use indirect::*;

mod registry;
pub use registry::*;

mod closure;
pub use closure::*;

mod import;
pub use import::*;
