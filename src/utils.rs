pub fn parse_num<T: std::str::FromStr>(bstr: &[u8]) -> Option<T> {
    std::str::from_utf8(bstr).ok()?
        .parse::<T>().ok()
}

#[derive(Debug, PartialEq)]
pub enum CharClass {
    Space,
    Delim,
    Reg
}

impl CharClass {
    pub fn of(ch: u8) -> CharClass {
        match ch {
            b'\x00' | b'\x09' | b'\x0A' | b'\x0C' | b'\x0D' | b'\x20' => CharClass::Space,
            b'(' | b')' | b'<' | b'>' | b'[' | b']' | b'{' | b'}' | b'/' | b'%' => CharClass::Delim,
            _ => CharClass::Reg
        }
    }
}
