use std::collections::BTreeMap;

use super::*;
use super::types::*;

/// An assembled cross-reference section, in either of the two encodings.
///
/// The [`writer`](crate::writer) builds one of these from the live entries of a
/// [`Registry`](crate::graph::Registry) before emitting it; reading collaborators produce the
/// same shape when they parse a file.
#[derive(Debug)]
pub struct XRef {
    /// The format in which this section appears or should appear in a file.
    pub tpe: XRefType,
    /// The mapping itself.
    pub map: BTreeMap<ObjNum, Record>,
    /// The trailer dictionary (for [`XRefType::Table`]) or the cross-reference stream
    /// dictionary (for [`XRefType::Stream`]).
    pub dict: Dict,
    /// The `/Size` entry in the dictionary, for convenience.
    pub size: ObjNum
}

/// The format of a cross-reference section.
#[derive(Debug)]
pub enum XRefType {
    /// Classical table (`xref ... trailer << ... >>`)
    Table,
    /// A cross-reference stream (`<< /Type/XRef ... >> stream ... endstream`)
    Stream(ObjRef)
}

/// A single record in a cross-reference section.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Record {
    /// An uncompressed object (`n` entry).
    Used {
        /// The generation number.
        gen: ObjGen,
        /// Location of the object in PDF file (w.r.t. `%PDF`).
        offset: Offset,
    },
    /// An object number marked as free (`f` entry).
    Free {
        /// The generation number to be used if this object number is reused for a new object.
        gen: ObjGen,
        /// The next number in the free object list, or zero if `gen` is 65535 (`u16::MAX`).
        next: ObjNum,
    },
    /// An object which is stored compressed within an object stream. The generation number of
    /// both the compressed object and the containing stream is zero.
    Compr {
        /// The object number of the object stream (generation number is always zero).
        num_within: ObjNum,
        /// 0-based order of this compressed object within the object stream.
        index: ObjIndex,
    },
}

impl Default for Record {
    /// Returns `Record::Free { gen: 65535, next: 0 }.`
    fn default() -> Self {
        Record::Free { gen: 65535, next: 0 }
    }
}
