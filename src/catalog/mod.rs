//! Static lookup tables: ellipsoids, datums, prime meridians and linear units.
//!
//! Keys are matched exactly first, then case-insensitively with whitespace,
//! `_`, `-`, `/` and parentheses ignored, so `"GRS_1980"`, `"grs 80"` style
//! spellings resolve the same way WKT and PROJJSON writers emit them.

pub mod datum;
pub mod ellipsoid;
pub mod prime_meridian;
pub mod units;

/// Normalise a catalog key for the loose second lookup pass.
pub(crate) fn loose_key(key: &str) -> String {
    key.chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, '_' | '-' | '/' | '(' | ')'))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Find an entry by exact key, then by loose key.
pub(crate) fn find<'a, T>(
    entries: &'a [T],
    key: &str,
    keys_of: impl Fn(&T) -> [&str; 2],
) -> Option<&'a T> {
    if let Some(hit) = entries.iter().find(|e| keys_of(e).contains(&key)) {
        return Some(hit);
    }
    let wanted = loose_key(key);
    entries
        .iter()
        .find(|e| keys_of(e).iter().any(|k| loose_key(k) == wanted))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loose_key_strips_punctuation() {
        assert_eq!(loose_key("GRS 1980(IUGG, 1980)"), "grs1980iugg,1980");
        assert_eq!(loose_key("North_American-Datum/1983"), "northamericandatum1983");
    }
}
