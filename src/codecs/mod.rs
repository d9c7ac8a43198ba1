//! Stream filters. Only `/FlateDecode` is implemented, which is all the cross-reference
//! machinery needs: object streams and cross-reference streams are Flate-compressed.

mod flate;
pub use flate::{deflate, inflate};
