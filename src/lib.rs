//! Building, mutating and serializing PDF documents as a graph of indirectly-referenced
//! objects.
//!
//! The centre of the crate is [`graph::Registry`]: it assigns object identities, resolves
//! indirect references (lazily, through a [`graph::Loader`] when objects are known only by
//! their byte position), computes the set of objects reachable from the trailer, compacts
//! and renumbers the object space, and finally hands the surviving graph to [`writer`],
//! which emits either the classic cross-reference table or a cross-reference stream with
//! companion object streams.
//!
//! The object model itself lives in [`base`] and is deliberately small: graph nodes are
//! plain [`base::Object`] values and the higher-level document semantics (pages, fonts,
//! content streams, encryption) are left to collaborating crates, which interact with this
//! one through the registration and resolution API only.

pub mod base;
pub mod codecs;
pub mod graph;
pub mod writer;

pub(crate) mod utils;

pub use base::*;
pub use base::types::*;
