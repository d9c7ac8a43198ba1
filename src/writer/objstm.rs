use std::io::Write;

use crate::base::*;
use crate::base::types::*;
use crate::codecs;
use crate::utils;

/// Accumulates non-stream objects into a `/Type /ObjStm` stream.
///
/// The layout follows §7.5.7 of the PDF specification: a header of ASCII
/// `object-number offset` pairs, then the serialized objects back to back, with `/First`
/// pointing past the header and offsets measured from there.
#[derive(Debug, Default)]
pub struct ObjStmBuilder {
    entries: Vec<(ObjNum, Offset)>,
    body: Vec<u8>,
    extends: Option<ObjRef>,
}

impl ObjStmBuilder {
    pub fn new() -> Self {
        ObjStmBuilder::default()
    }

    /// Links this stream to an earlier object stream in the same collection (`/Extends`).
    pub fn extends(&mut self, prior: ObjRef) {
        self.extends = Some(prior);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Appends the object numbered `num`. Generation numbers are not stored: only
    /// generation-0 objects may live in an object stream. Streams may not be nested in an
    /// object stream at all and are refused.
    pub fn push(&mut self, num: ObjNum, obj: &Object) -> Result<(), Error> {
        if matches!(obj, Object::Stream(_)) {
            return Err(Error::Malformed("streams cannot be stored inside an object stream"));
        }
        self.entries.push((num, self.body.len() as Offset));
        write!(self.body, "{obj}")?;
        self.body.push(b'\n');
        Ok(())
    }

    /// Finalizes into a complete, Flate-compressed stream object ready for serialization.
    pub fn finish(self) -> Result<Stream, Error> {
        let mut payload = Vec::new();
        for &(num, offset) in &self.entries {
            write!(payload, "{num} {offset} ")?;
        }
        let first = payload.len();
        payload.extend_from_slice(&self.body);
        let packed = codecs::deflate(&payload);
        let mut dict = Dict::from(vec![
            (Name::from(b"Type"), Object::new_name(b"ObjStm")),
            (Name::from(b"N"), Object::Number(Number::Int(self.entries.len() as i64))),
            (Name::from(b"First"), Object::Number(Number::Int(first as i64))),
            (Name::from(b"Filter"), Object::new_name(b"FlateDecode")),
            (Name::from(b"Length"), Object::Number(Number::Int(packed.len() as i64))),
        ]);
        if let Some(prior) = self.extends {
            dict.set(Name::from(b"Extends"), Object::Ref(prior));
        }
        Ok(Stream::new(dict, packed))
    }
}

/// A decoded `/Type /ObjStm` stream: the parsed header plus the raw body, sliceable into
/// the individual objects' bytes.
#[derive(Debug)]
pub struct ObjStm {
    entries: Vec<(ObjNum, Offset)>,
    body: Vec<u8>,
}

impl ObjStm {
    /// Decompresses and parses an object stream. The stream data needs to be owned; deferred
    /// data is not accepted here.
    pub fn from_stream(stm: &Stream) -> Result<ObjStm, Error> {
        if stm.dict.lookup(b"Type").as_name() != Some(&Name::from(b"ObjStm")) {
            return Err(Error::Malformed("not an object stream"));
        }
        let count = stm.dict.lookup(b"N").num_value::<usize>()
            .ok_or(Error::Malformed("object stream: missing or malformed /N"))?;
        let first = stm.dict.lookup(b"First").num_value::<usize>()
            .ok_or(Error::Malformed("object stream: missing or malformed /First"))?;
        let Data::Val(data) = &stm.data else {
            return Err(Error::Malformed("object stream data not loaded"));
        };
        let decoded = match stm.dict.lookup(b"Filter") {
            Object::Null => data.clone(),
            Object::Name(name) if name == b"FlateDecode" => codecs::inflate(data)?,
            _ => return Err(Error::Malformed("object stream: unsupported /Filter"))
        };
        Self::parse(decoded, count, first)
    }

    fn parse(decoded: Vec<u8>, count: usize, first: usize) -> Result<ObjStm, Error> {
        if first > decoded.len() {
            return Err(Error::Malformed("object stream: /First out of bounds"));
        }
        let mut tokens = decoded[..first].split(|ch| ch.is_ascii_whitespace())
            .filter(|tok| !tok.is_empty());
        let mut entries = Vec::with_capacity(count);
        for _ in 0..count {
            let num = tokens.next().and_then(utils::parse_num::<ObjNum>)
                .ok_or(Error::Malformed("object stream: malformed header"))?;
            let offset = tokens.next().and_then(utils::parse_num::<Offset>)
                .ok_or(Error::Malformed("object stream: malformed header"))?;
            entries.push((num, offset));
        }
        let body = decoded[first..].to_vec();
        let mut prev = 0;
        for &(_num, offset) in &entries {
            if offset as usize > body.len() || offset < prev {
                return Err(Error::Malformed("object stream: malformed offsets"));
            }
            prev = offset;
        }
        Ok(ObjStm { entries, body })
    }

    pub fn entries(&self) -> &[(ObjNum, Offset)] {
        &self.entries
    }

    /// The object number and serialized bytes of the object at `index`.
    pub fn get(&self, index: ObjIndex) -> Option<(ObjNum, &[u8])> {
        let ix = index as usize;
        let &(num, start) = self.entries.get(ix)?;
        let end = match self.entries.get(ix + 1) {
            Some(&(_num, next)) => next as usize,
            None => self.body.len()
        };
        Some((num, &self.body[start as usize..end]))
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_and_decode() {
        let mut builder = ObjStmBuilder::new();
        builder.push(3, &Object::new_name(b"Catalog")).unwrap();
        builder.push(7, &Object::Array(vec![
            Object::Number(Number::Int(1)),
            Object::Ref(ObjRef { num: 3, gen: 0 }),
        ])).unwrap();
        builder.push(8, &Object::Null).unwrap();
        builder.extends(ObjRef { num: 2, gen: 0 });
        assert_eq!(builder.len(), 3);
        let stm = builder.finish().unwrap();
        assert_eq!(stm.dict.lookup(b"Extends"), &Object::Ref(ObjRef { num: 2, gen: 0 }));

        assert_eq!(stm.dict.lookup(b"Type"), &Object::new_name(b"ObjStm"));
        assert_eq!(stm.dict.lookup(b"N"), &Object::Number(Number::Int(3)));
        assert_eq!(stm.dict.lookup(b"Filter"), &Object::new_name(b"FlateDecode"));
        let Data::Val(packed) = &stm.data else { panic!() };
        assert_eq!(stm.dict.lookup(b"Length"), &Object::Number(Number::Int(packed.len() as i64)));

        let objstm = ObjStm::from_stream(&stm).unwrap();
        assert_eq!(objstm.entries().iter().map(|&(num, _)| num).collect::<Vec<_>>(), vec![3, 7, 8]);
        let (num, bytes) = objstm.get(0).unwrap();
        assert_eq!(num, 3);
        assert_eq!(bytes, b"/Catalog\n");
        let (num, bytes) = objstm.get(1).unwrap();
        assert_eq!(num, 7);
        assert_eq!(bytes, b"[ 1 3 0 R ]\n");
        assert_eq!(objstm.get(3), None);
    }

    #[test]
    fn test_rejects_stream() {
        let mut builder = ObjStmBuilder::new();
        let stm = Object::Stream(Stream::new(Dict::default(), b"x".to_vec()));
        assert!(builder.push(1, &stm).is_err());
        assert!(builder.is_empty());
    }

    #[test]
    fn test_malformed_header() {
        let stm = Stream::new(Dict::from(vec![
            (Name::from(b"Type"), Object::new_name(b"ObjStm")),
            (Name::from(b"N"), Object::Number(Number::Int(2))),
            (Name::from(b"First"), Object::Number(Number::Int(4))),
        ]), b"1 0 null".to_vec());
        // claims two entries but the header holds only one pair
        assert!(ObjStm::from_stream(&stm).is_err());
    }

    #[test]
    fn test_malformed_offsets() {
        let objstm_dict = |n: i64, first: i64| Dict::from(vec![
            (Name::from(b"Type"), Object::new_name(b"ObjStm")),
            (Name::from(b"N"), Object::Number(Number::Int(n))),
            (Name::from(b"First"), Object::Number(Number::Int(first))),
        ]);
        // an offset past the body must not survive parsing into a slicing panic
        let stm = Stream::new(objstm_dict(2, 8), b"3 9 4 0 ABCDEF".to_vec());
        assert!(matches!(ObjStm::from_stream(&stm), Err(Error::Malformed(_))));
        // offsets running backwards are equally corrupt
        let stm = Stream::new(objstm_dict(2, 8), b"3 4 4 2 ABCDEF".to_vec());
        assert!(matches!(ObjStm::from_stream(&stm), Err(Error::Malformed(_))));
        // in-bounds, non-decreasing offsets still pass
        let stm = Stream::new(objstm_dict(2, 8), b"3 0 4 3 ABCDEF".to_vec());
        let objstm = ObjStm::from_stream(&stm).unwrap();
        assert_eq!(objstm.get(0), Some((3, &b"ABC"[..])));
        assert_eq!(objstm.get(1), Some((4, &b"DEF"[..])));
    }

    #[test]
    fn test_not_an_objstm() {
        let stm = Stream::new(Dict::default(), Vec::new());
        assert!(matches!(ObjStm::from_stream(&stm), Err(Error::Malformed(_))));
    }
}
