use std::fmt::{Display, Formatter};

use super::name::Name;
use super::object::Object;

/// Dictionary objects (like `<< /Length 42 >>`).
///
/// Key order is preserved; lookups are linear, which is fine for the small dictionaries the
/// graph machinery handles (trailers, stream dictionaries).
#[derive(Debug, PartialEq, Clone, Default)]
pub struct Dict(Vec<(Name, Object)>);

impl Dict {
    /// Looks up a value for a given [`Name`] key. If not present, returns a static reference
    /// to [`Object::Null`].
    pub fn lookup(&self, key: &[u8]) -> &Object {
        self.0.iter()
            .find(|(name, _obj)| name == &key)
            .map(|(_name, obj)| obj)
            .unwrap_or(&Object::Null)
    }

    /// Sets `key` to `value`, replacing an existing entry or appending a new one.
    pub fn set(&mut self, key: Name, value: Object) {
        match self.0.iter_mut().find(|(name, _obj)| name == &key) {
            Some((_name, obj)) => *obj = value,
            None => self.0.push((key, value))
        }
    }

    /// Removes `key`, returning its former value if present.
    pub fn remove(&mut self, key: &[u8]) -> Option<Object> {
        let ix = self.0.iter().position(|(name, _obj)| name == &key)?;
        Some(self.0.remove(ix).1)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub(crate) fn values_mut(&mut self) -> impl Iterator<Item = &mut Object> {
        self.0.iter_mut().map(|(_name, obj)| obj)
    }

    pub fn into_inner(self) -> Vec<(Name, Object)> {
        self.0
    }
}

impl From<Vec<(Name, Object)>> for Dict {
    fn from(vec: Vec<(Name, Object)>) -> Dict {
        Dict(vec)
    }
}

impl IntoIterator for Dict {
    type Item = (Name, Object);
    type IntoIter = <Vec<(Name, Object)> as IntoIterator>::IntoIter;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Dict {
    type Item = &'a (Name, Object);
    type IntoIter = std::slice::Iter<'a, (Name, Object)>;

    fn into_iter(self: &'a Dict) -> Self::IntoIter {
        self.0.iter()
    }
}

impl Display for Dict {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("<< ")?;
        for (key, val) in &self.0 {
            write!(f, "{key} {val} ")?;
        }
        f.write_str(">>")
    }
}
