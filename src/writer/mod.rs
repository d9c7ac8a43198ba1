//! Document serialization: emitting a registry's objects followed by a cross-reference
//! section in either the classic table encoding or as a cross-reference stream, optionally
//! packing small objects into object streams.

use std::collections::BTreeMap;
use std::io::Write;

use crate::base::*;
use crate::base::types::*;
use crate::codecs;
use crate::graph::{Loader, Registry};

mod objstm;
pub use objstm::*;

/// Which cross-reference encoding to emit.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum XRefKind {
    /// The classic `xref` table followed by a `trailer` dictionary (PDF 1.0).
    #[default]
    Table,
    /// A `/Type /XRef` cross-reference stream (PDF 1.5).
    Stream,
}

/// Serialization settings for [`write_document()`].
#[derive(Debug, Clone)]
pub struct SaveOptions {
    pub xref_kind: XRefKind,
    /// Pack eligible objects (generation 0, not themselves streams) into `/Type /ObjStm`
    /// object streams. Requires [`XRefKind::Stream`]: the classic table has no entry type
    /// for a compressed object.
    pub use_object_streams: bool,
    /// Cap on the number of objects per object stream.
    pub max_objects_per_stream: usize,
    /// Byte offset of a previous cross-reference section, recorded as `/Prev` when writing
    /// an incremental update.
    pub prev: Option<Offset>,
}

impl Default for SaveOptions {
    fn default() -> Self {
        SaveOptions {
            xref_kind: XRefKind::Table,
            use_object_streams: false,
            max_objects_per_stream: 100,
            prev: None,
        }
    }
}

impl SaveOptions {
    pub fn validate(&self) -> Result<(), Error> {
        if self.use_object_streams && self.xref_kind == XRefKind::Table {
            return Err(Error::Config("object streams require a cross-reference stream"));
        }
        if self.use_object_streams && self.max_objects_per_stream == 0 {
            return Err(Error::Config("max_objects_per_stream must be positive"));
        }
        Ok(())
    }
}

/// A position-tracking wrapper over the output sink. Cross-reference entries need the byte
/// offset of every object written.
struct DocWriter<W: Write> {
    sink: W,
    pos: Offset,
}

impl<W: Write> DocWriter<W> {
    fn new(sink: W) -> Self {
        DocWriter { sink, pos: 0 }
    }
}

impl<W: Write> Write for DocWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let written = self.sink.write(buf)?;
        self.pos += written as Offset;
        Ok(written)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.sink.flush()
    }
}

/// Serializes the full contents of `registry` into `sink` as a standalone PDF file body:
/// header, every registered object, a cross-reference section per `opts`, and the
/// `startxref` trailer. Returns the byte offset of the cross-reference section.
///
/// All registered objects are written, reachable or not; run
/// [`Registry::compact()`](crate::graph::Registry::compact) first to drop garbage.
pub fn write_document<W: Write>(registry: &Registry, loader: &dyn Loader, sink: W, opts: &SaveOptions)
    -> Result<Offset, Error>
{
    opts.validate()?;
    let mut w = DocWriter::new(sink);
    let version = match opts.xref_kind {
        XRefKind::Table => "1.4",
        XRefKind::Stream => "1.5",
    };
    write!(w, "%PDF-{version}\n")?;
    w.write_all(b"%\xE2\xE3\xCF\xD3\n")?;

    // object number 0 is always the head of the free list
    let mut map = BTreeMap::new();
    map.insert(0, Record::default());

    let mut packed = Vec::new();
    for &oref in registry.refs_sorted() {
        let obj = registry.resolve(&oref, loader);
        if opts.use_object_streams && oref.gen == 0 && !matches!(obj, Object::Stream(_)) {
            packed.push((oref.num, obj));
        } else {
            map.insert(oref.num, Record::Used { gen: oref.gen, offset: w.pos });
            write_indirect(&mut w, &oref, &obj)?;
        }
    }

    let mut next_num = registry.max_number() + 1;
    for chunk in packed.chunks(opts.max_objects_per_stream.max(1)) {
        let mut builder = ObjStmBuilder::new();
        for (index, (num, obj)) in chunk.iter().enumerate() {
            builder.push(*num, obj)?;
            map.insert(*num, Record::Compr { num_within: next_num, index: index as ObjIndex });
        }
        map.insert(next_num, Record::Used { gen: 0, offset: w.pos });
        let container = ObjRef { num: next_num, gen: 0 };
        write_indirect(&mut w, &container, &Object::Stream(builder.finish()?))?;
        next_num += 1;
    }

    let xref_pos = w.pos;
    match opts.xref_kind {
        XRefKind::Table => {
            let xref = assemble_table(map, registry.trailer().clone(), opts.prev);
            write_xref_table(&mut w, &xref)?;
        },
        XRefKind::Stream => {
            map.insert(next_num, Record::Used { gen: 0, offset: xref_pos });
            let oref = ObjRef { num: next_num, gen: 0 };
            let xref = assemble_stream(map, registry.trailer().clone(), opts.prev, oref);
            write_xref_stream(&mut w, &xref)?;
        }
    }
    write!(w, "startxref\n{xref_pos}\n%%EOF\n")?;
    w.flush()?;
    Ok(xref_pos)
}

fn write_indirect<W: Write>(w: &mut DocWriter<W>, oref: &ObjRef, obj: &Object) -> Result<(), Error> {
    match obj {
        Object::Stream(stm) => {
            let Data::Val(data) = &stm.data else {
                return Err(Error::Malformed("stream data not loaded"));
            };
            let mut dict = stm.dict.clone();
            dict.set(Name::from(b"Length"), Object::Number(Number::Int(data.len() as i64)));
            write!(w, "{oref} obj\n{dict}\nstream\n")?;
            w.write_all(data)?;
            w.write_all(b"\nendstream\nendobj\n")?;
        },
        _ => write!(w, "{oref} obj\n{obj}\nendobj\n")?
    }
    Ok(())
}

/// Completes a classic-table section: gaps in the numbering become free entries chained
/// into the free list headed by object number 0, per ISO 32000 §7.5.4. With no gaps (the
/// normal case after compacting and renumbering) the chain is empty and entry 0 keeps its
/// all-zero `0000000000 65535 f` form.
fn assemble_table(mut map: BTreeMap<ObjNum, Record>, mut dict: Dict, prev: Option<Offset>) -> XRef {
    let max = *map.keys().next_back().unwrap_or(&0);
    for num in 0..=max {
        map.entry(num).or_default();
    }
    let free_nums = map.iter()
        .filter(|(_num, rec)| matches!(rec, Record::Free { .. }))
        .map(|(&num, _rec)| num)
        .collect::<Vec<_>>();
    for pair in free_nums.windows(2) {
        if let Some(Record::Free { next, .. }) = map.get_mut(&pair[0]) {
            *next = pair[1];
        }
    }
    let size = max + 1;
    dict.set(Name::from(b"Size"), Object::Number(Number::Int(size as i64)));
    if let Some(prev) = prev {
        dict.set(Name::from(b"Prev"), Object::Number(Number::Int(prev as i64)));
    }
    XRef { tpe: XRefType::Table, map, dict, size }
}

fn assemble_stream(map: BTreeMap<ObjNum, Record>, mut dict: Dict, prev: Option<Offset>, oref: ObjRef) -> XRef {
    let size = *map.keys().next_back().unwrap_or(&0) + 1;
    dict.set(Name::from(b"Type"), Object::new_name(b"XRef"));
    dict.set(Name::from(b"Size"), Object::Number(Number::Int(size as i64)));
    if let Some(prev) = prev {
        dict.set(Name::from(b"Prev"), Object::Number(Number::Int(prev as i64)));
    }
    XRef { tpe: XRefType::Stream(oref), map, dict, size }
}

fn write_xref_table<W: Write>(w: &mut DocWriter<W>, xref: &XRef) -> Result<(), Error> {
    write!(w, "xref\n0 {}\n", xref.size)?;
    for rec in xref.map.values() {
        // each entry is exactly 20 bytes including the two-byte line end
        match *rec {
            Record::Used { gen, offset } => write!(w, "{offset:010} {gen:05} n \n")?,
            Record::Free { gen, next } => write!(w, "{next:010} {gen:05} f \n")?,
            Record::Compr { .. } =>
                return Err(Error::Config("object streams require a cross-reference stream"))
        }
    }
    write!(w, "trailer\n{}\n", xref.dict)?;
    Ok(())
}

fn write_xref_stream<W: Write>(w: &mut DocWriter<W>, xref: &XRef) -> Result<(), Error> {
    let XRefType::Stream(oref) = xref.tpe else {
        return Err(Error::Config("not a cross-reference stream"));
    };
    let mut fields_max = [1u64, 0, 0];
    for rec in xref.map.values() {
        let fields = record_fields(rec);
        for (max, val) in fields_max.iter_mut().zip(fields) {
            *max = std::cmp::max(*max, val);
        }
    }
    let widths = fields_max.map(byte_width);

    let mut data = Vec::new();
    for rec in xref.map.values() {
        for (val, width) in record_fields(rec).into_iter().zip(widths) {
            data.extend_from_slice(&val.to_be_bytes()[8 - width..]);
        }
    }
    let packed = codecs::deflate(&data);

    let mut dict = xref.dict.clone();
    dict.set(Name::from(b"W"), Object::Array(widths.iter()
        .map(|&width| Object::Number(Number::Int(width as i64)))
        .collect()));
    let runs = index_runs(&xref.map);
    if runs != [(0, xref.size)] {
        dict.set(Name::from(b"Index"), Object::Array(runs.into_iter()
            .flat_map(|(start, len)| [
                Object::Number(Number::Int(start as i64)),
                Object::Number(Number::Int(len as i64)),
            ])
            .collect()));
    }
    dict.set(Name::from(b"Filter"), Object::new_name(b"FlateDecode"));
    write_indirect(w, &oref, &Object::Stream(Stream::new(dict, packed)))
}

fn record_fields(rec: &Record) -> [u64; 3] {
    match *rec {
        Record::Free { gen, next } => [0, next, gen.into()],
        Record::Used { gen, offset } => [1, offset, gen.into()],
        Record::Compr { num_within, index } => [2, num_within, index.into()],
    }
}

fn byte_width(val: u64) -> usize {
    std::cmp::max(1, (64 - val.leading_zeros() as usize).div_ceil(8))
}

fn index_runs(map: &BTreeMap<ObjNum, Record>) -> Vec<(ObjNum, ObjNum)> {
    let mut runs: Vec<(ObjNum, ObjNum)> = Vec::new();
    for &num in map.keys() {
        match runs.last_mut() {
            Some((start, len)) if *start + *len == num => *len += 1,
            _ => runs.push((num, 1))
        }
    }
    runs
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils;

    fn sample_registry() -> Registry {
        let mut reg = Registry::new();
        let catalog = reg.add(Object::Null).unwrap();
        let pages = reg.add(Object::Dict(Dict::from(vec![
            (Name::from(b"Type"), Object::new_name(b"Pages")),
            (Name::from(b"Count"), Object::Number(Number::Int(0))),
        ]))).unwrap();
        reg.replace(catalog, Object::Dict(Dict::from(vec![
            (Name::from(b"Type"), Object::new_name(b"Catalog")),
            (Name::from(b"Pages"), Object::Ref(pages)),
        ]))).unwrap();
        reg.trailer_mut().set(Name::from(b"Root"), Object::Ref(catalog));
        reg
    }

    fn find(haystack: &[u8], needle: &[u8], from: usize) -> usize {
        (from..=haystack.len() - needle.len())
            .find(|&ix| &haystack[ix..ix + needle.len()] == needle)
            .unwrap()
    }

    #[test]
    fn test_classic_table() {
        let reg = sample_registry();
        let mut out = Vec::new();
        let xref_pos = write_document(&reg, &(), &mut out, &SaveOptions::default()).unwrap();

        assert!(out.starts_with(b"%PDF-1.4\n"));
        assert!(out.ends_with(b"%%EOF\n"));
        assert!(out[xref_pos as usize..].starts_with(b"xref\n0 3\n"));

        let table_start = xref_pos as usize + b"xref\n0 3\n".len();
        let lines = out[table_start..].chunks(20).take(3).collect::<Vec<_>>();
        assert_eq!(lines[0], b"0000000000 65535 f \n");
        for (num, line) in lines.iter().enumerate().skip(1) {
            assert_eq!(line.len(), 20);
            assert_eq!(&line[16..], b" n \n");
            let offset: usize = utils::parse_num(&line[..10]).unwrap();
            assert!(out[offset..].starts_with(format!("{num} 0 obj\n").as_bytes()));
        }

        let trailer_at = find(&out, b"trailer\n", xref_pos as usize);
        let trailer = std::str::from_utf8(&out[trailer_at..]).unwrap();
        assert!(trailer.contains("/Size 3"));
        assert!(trailer.contains("/Root 1 0 R"));

        let startxref_at = find(&out, b"startxref\n", 0) + b"startxref\n".len();
        let end = find(&out, b"\n", startxref_at);
        assert_eq!(utils::parse_num::<Offset>(&out[startxref_at..end]), Some(xref_pos));
    }

    #[test]
    fn test_free_chain() {
        let mut reg = Registry::new();
        reg.insert(ObjRef { num: 2, gen: 0 }, Object::Null).unwrap();
        reg.insert(ObjRef { num: 4, gen: 0 }, Object::Null).unwrap();
        let mut out = Vec::new();
        let xref_pos = write_document(&reg, &(), &mut out, &SaveOptions::default()).unwrap();

        let table_start = xref_pos as usize + b"xref\n0 5\n".len();
        let lines = out[table_start..].chunks(20).take(5).collect::<Vec<_>>();
        // with numbering gaps the free list threads 0 -> 1 -> 3 -> end, so entry 0 carries
        // a nonzero link; only a gap-free registry keeps it all zeroes (see test_classic_table)
        assert_eq!(lines[0], b"0000000001 65535 f \n");
        assert_eq!(lines[1], b"0000000003 65535 f \n");
        assert_eq!(lines[3], b"0000000000 65535 f \n");
        assert_eq!(&lines[2][16..], b" n \n");
        assert_eq!(&lines[4][16..], b" n \n");
    }

    #[test]
    fn test_xref_stream() {
        let reg = sample_registry();
        let opts = SaveOptions { xref_kind: XRefKind::Stream, ..SaveOptions::default() };
        let mut out = Vec::new();
        let xref_pos = write_document(&reg, &(), &mut out, &opts).unwrap();

        assert!(out.starts_with(b"%PDF-1.5\n"));
        // the section is itself an indirect object, numbered past the registry's objects
        assert!(out[xref_pos as usize..].starts_with(b"3 0 obj\n"));
        let text = String::from_utf8_lossy(&out);
        assert!(text.contains("/Type /XRef"));
        assert!(text.contains("/Size 4"));
        assert!(!text.contains("/Index"));

        let data_start = find(&out, b"stream\n", xref_pos as usize) + b"stream\n".len();
        let data_end = find(&out, b"\nendstream", data_start);
        let data = codecs::inflate(&out[data_start..data_end]).unwrap();

        // W is [1, byte_width(xref_pos), 2]: offsets dominate field 2, the gen 65535 of
        // entry 0 forces two bytes for field 3
        let width = byte_width(xref_pos);
        assert!(text.contains(&format!("/W [ 1 {width} 2 ]")));
        assert_eq!(data.len(), 4 * (3 + width));
        let entry = |ix: usize| &data[ix * (3 + width)..(ix + 1) * (3 + width)];
        assert_eq!(entry(0)[0], 0);
        assert_eq!(&entry(0)[1 + width..], &[0xFF, 0xFF]);
        for num in 1..=3usize {
            let fields = entry(num);
            assert_eq!(fields[0], 1);
            let offset = fields[1..1 + width].iter().fold(0usize, |acc, &b| (acc << 8) | b as usize);
            assert!(out[offset..].starts_with(format!("{num} 0 obj\n").as_bytes()));
            assert_eq!(&fields[1 + width..], &[0, 0]);
        }
    }

    #[test]
    fn test_object_streams() {
        let mut reg = sample_registry();
        reg.add(Object::new_string(b"leaf")).unwrap();
        let big = reg.add(Object::Stream(Stream::new(Dict::default(), b"raw content".to_vec()))).unwrap();
        let opts = SaveOptions {
            xref_kind: XRefKind::Stream,
            use_object_streams: true,
            max_objects_per_stream: 2,
            ..SaveOptions::default()
        };
        let mut out = Vec::new();
        let xref_pos = write_document(&reg, &(), &mut out, &opts).unwrap();
        let text = String::from_utf8_lossy(&out);

        // three small objects in chunks of two makes two containers (5 and 6), the stream
        // object stays uncompressed, the section itself is object 7
        assert_eq!(text.matches("/Type /ObjStm").count(), 2);
        assert!(text.contains(&format!("{big} obj\n<< /Length 11 >>\nstream\nraw content")));
        assert!(out[xref_pos as usize..].starts_with(b"7 0 obj\n"));
        assert!(text.contains("/Size 8"));

        let data_start = find(&out, b"stream\n", xref_pos as usize) + b"stream\n".len();
        let data_end = find(&out, b"\nendstream", data_start);
        let data = codecs::inflate(&out[data_start..data_end]).unwrap();
        let width = byte_width(xref_pos);
        // entries 1 and 2 are compressed into container 5 at indices 0 and 1
        let entry = |ix: usize| &data[ix * (3 + width)..(ix + 1) * (3 + width)];
        assert_eq!(entry(1)[0], 2);
        assert_eq!(entry(1)[width], 5);
        assert_eq!(&entry(1)[1 + width..], &[0, 0]);
        assert_eq!(entry(2)[0], 2);
        assert_eq!(&entry(2)[1 + width..], &[0, 1]);
        assert_eq!(entry(4)[0], 1);
    }

    #[test]
    fn test_validate() {
        let opts = SaveOptions { use_object_streams: true, ..SaveOptions::default() };
        assert!(matches!(opts.validate(), Err(Error::Config(_))));
        assert!(matches!(
            write_document(&Registry::new(), &(), &mut Vec::new(), &opts),
            Err(Error::Config(_))));

        let opts = SaveOptions {
            xref_kind: XRefKind::Stream,
            use_object_streams: true,
            max_objects_per_stream: 0,
            ..SaveOptions::default()
        };
        assert!(matches!(opts.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_prev_link() {
        let reg = sample_registry();
        let opts = SaveOptions { prev: Some(1234), ..SaveOptions::default() };
        let mut out = Vec::new();
        write_document(&reg, &(), &mut out, &opts).unwrap();
        assert!(String::from_utf8_lossy(&out).contains("/Prev 1234"));
    }

    #[test]
    fn test_helpers() {
        assert_eq!(byte_width(0), 1);
        assert_eq!(byte_width(255), 1);
        assert_eq!(byte_width(256), 2);
        assert_eq!(byte_width(65535), 2);
        assert_eq!(byte_width(1 << 24), 4);

        let mut map = BTreeMap::new();
        for num in [0, 1, 2, 5, 6, 9] {
            map.insert(num, Record::default());
        }
        assert_eq!(index_runs(&map), vec![(0, 3), (5, 2), (9, 1)]);
    }
}
