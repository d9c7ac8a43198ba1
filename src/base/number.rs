/// A PDF number, which can be integer or real.
///
/// The specification does not require particular bit widths, so `i64` and `f64` were chosen,
/// respectively.
#[derive(Debug, PartialEq, Clone)]
pub enum Number {
    Int(i64),
    Real(f64)
}
