use pdfgraph as pdf;

use pdf::{Dict, Name, Number, Object, Stream};
use pdf::graph::Registry;
use pdf::writer::{self, SaveOptions, XRefKind};

fn main() -> Result<(), pdf::Error> {
    stderrlog::new()
        .verbosity(log::Level::Info)
        .init()
        .unwrap();

    let stem = std::env::args().nth(1).unwrap_or_else(|| "hello".into());

    let mut reg = Registry::new();
    build_document(&mut reg)?;
    // leave some garbage behind for compaction to find
    reg.add(Object::new_string(b"orphaned scratch data"))?;
    reg.add(Object::Stream(Stream::new(Dict::default(), b"more garbage".to_vec())))?;

    let removed = reg.compact(&());
    log::info!("Dropped {removed} unreachable object(s), {} remain.", reg.len());
    reg.renumber();

    save(&reg, format!("{stem}-table.pdf"), &SaveOptions::default())?;
    save(&reg, format!("{stem}-xrefstm.pdf"), &SaveOptions {
        xref_kind: XRefKind::Stream,
        use_object_streams: true,
        ..SaveOptions::default()
    })?;
    Ok(())
}

/// A one-page document: catalog, page tree, page, its content stream and font.
fn build_document(reg: &mut Registry) -> Result<(), pdf::Error> {
    // the page needs its parent's number before the page tree can be filled in
    let pages = reg.add(Object::Null)?;

    let content = reg.add(Object::Stream(Stream::new(Dict::default(),
        b"BT /F1 24 Tf 72 720 Td (Hello, world!) Tj ET".to_vec())))?;
    let font = reg.add(Object::Dict(Dict::from(vec![
        (Name::from(b"Type"), Object::new_name(b"Font")),
        (Name::from(b"Subtype"), Object::new_name(b"Type1")),
        (Name::from(b"BaseFont"), Object::new_name(b"Helvetica")),
    ])))?;
    let page = reg.add(Object::Dict(Dict::from(vec![
        (Name::from(b"Type"), Object::new_name(b"Page")),
        (Name::from(b"Parent"), Object::Ref(pages)),
        (Name::from(b"MediaBox"), Object::Array(
            [0, 0, 612, 792].map(|x| Object::Number(Number::Int(x))).to_vec())),
        (Name::from(b"Contents"), Object::Ref(content)),
        (Name::from(b"Resources"), Object::Dict(Dict::from(vec![
            (Name::from(b"Font"), Object::Dict(Dict::from(vec![
                (Name::from(b"F1"), Object::Ref(font)),
            ]))),
        ]))),
    ])))?;
    reg.replace(pages, Object::Dict(Dict::from(vec![
        (Name::from(b"Type"), Object::new_name(b"Pages")),
        (Name::from(b"Kids"), Object::Array(vec![Object::Ref(page)])),
        (Name::from(b"Count"), Object::Number(Number::Int(1))),
    ])))?;

    let catalog = reg.add(Object::Dict(Dict::from(vec![
        (Name::from(b"Type"), Object::new_name(b"Catalog")),
        (Name::from(b"Pages"), Object::Ref(pages)),
    ])))?;
    reg.trailer_mut().set(Name::from(b"Root"), Object::Ref(catalog));
    Ok(())
}

fn save(reg: &Registry, fname: String, opts: &SaveOptions) -> Result<(), pdf::Error> {
    let mut out = Vec::new();
    let xref_pos = writer::write_document(reg, &(), &mut out, opts)?;
    std::fs::write(&fname, &out)?;
    log::info!("{fname}: {} bytes, cross-reference section at offset {xref_pos}.", out.len());
    Ok(())
}
