use std::io::{Read, Write};

use flate2::Compression;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;

use crate::base::Error;

/// Compresses `data` with the zlib encoding expected by `/FlateDecode`.
pub fn deflate(data: &[u8]) -> Vec<u8> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    // writing to a Vec cannot fail
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

/// Decompresses a `/FlateDecode` stream payload.
pub fn inflate(data: &[u8]) -> Result<Vec<u8>, Error> {
    let mut decoder = ZlibDecoder::new(data);
    let mut out = Vec::new();
    decoder.read_to_end(&mut out)?;
    Ok(out)
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip() {
        let data = b"1 0 obj << /Type /Catalog >> endobj".repeat(10);
        let packed = deflate(&data);
        assert!(packed.len() < data.len());
        assert_eq!(inflate(&packed).unwrap(), data);
    }

    #[test]
    fn test_inflate_garbage() {
        assert!(inflate(b"certainly not zlib").is_err());
    }
}
