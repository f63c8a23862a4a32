//! Repository operations over the catalog tables.
//!
//! Every function takes the connection it works on; writes run inside a
//! single immediate transaction (see [`crate::db::write_transaction`]) so a
//! failed operation leaves nothing behind and concurrent writers queue on
//! the busy timeout.

mod category;
mod food;
mod ingredient;
mod links;
mod nutrition;
mod recipe;
mod search;

pub use category::*;
pub use food::*;
pub use ingredient::*;
pub use links::*;
pub use nutrition::*;
pub use recipe::*;
pub use search::*;

/// Builds a LIKE pattern matching `needle` anywhere, with `\` as the escape
/// character for literal wildcards.
pub(crate) fn contains_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[cfg(test)]
mod tests {
    use super::contains_pattern;

    #[test]
    fn pattern_escapes_wildcards() {
        assert_eq!(contains_pattern("tom"), "%tom%");
        assert_eq!(contains_pattern("50%_off"), "%50\\%\\_off%");
    }
}
