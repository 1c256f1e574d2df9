use log::{debug, trace};

use crate::{
    error::SortError,
    order::SortOrder,
    record::Record,
    sort::{sort_keyed, Keyed},
};

/// Finds records whose `key` field contains `query`, ignoring case.
///
/// The records are first sorted ascending by `key`. A binary probe then
/// looks for any record containing the query, stepping right when the
/// probed value sorts below the query and left otherwise. From the first
/// hit the neighbours are collected while they keep matching.
///
/// The result holds the hit, then its left neighbours nearest first, then
/// its right neighbours nearest first. It is empty when the probe never
/// lands on a match, even if a match exists elsewhere in the collection.
pub fn locate<R: Record>(records: Vec<R>, key: &str, query: &str) -> Result<Vec<R>, SortError> {
    if records.is_empty() {
        return Ok(Vec::new());
    }

    let sorted = sort_keyed(records, key, SortOrder::Ascending)?;
    let needle = query.to_lowercase();

    let Some(hit) = probe(&sorted, &needle) else {
        debug!("no record with `{}` containing {:?}", key, query);
        return Ok(Vec::new());
    };

    let matches = |index: &usize| lowered(&sorted, *index).contains(&needle);

    let mut found = vec![hit];
    found.extend((0..hit).rev().take_while(matches));
    found.extend((hit + 1..sorted.len()).take_while(matches));

    debug!(
        "{} records with `{}` containing {:?} around position {}",
        found.len(),
        key,
        query,
        hit
    );

    let mut slots = sorted
        .into_iter()
        .map(|(_, record)| Some(record))
        .collect::<Vec<_>>();

    Ok(found
        .into_iter()
        .filter_map(|index| slots[index].take())
        .collect())
}

fn lowered<R>(sorted: &[Keyed<R>], index: usize) -> String {
    sorted[index].0.to_string().to_lowercase()
}

/// Returns the position of the first probed record containing `needle`.
fn probe<R>(sorted: &[Keyed<R>], needle: &str) -> Option<usize> {
    let mut low = 0;
    let mut high = sorted.len().checked_sub(1)?;

    while low <= high {
        let middle = low + (high - low) / 2;
        let candidate = lowered(sorted, middle);
        trace!("probing {} ({:?})", middle, candidate);

        if candidate.contains(needle) {
            return Some(middle);
        }

        if candidate.as_str() < needle {
            low = middle + 1;
        } else if middle == 0 {
            break;
        } else {
            high = middle - 1;
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use rstest::rstest;

    use crate::{FieldValue, SortError};

    use super::locate;

    type Row = HashMap<String, FieldValue>;

    fn rows(keys: &[&str]) -> Vec<Row> {
        keys.iter()
            .map(|key| HashMap::from([("k".to_string(), FieldValue::from(*key))]))
            .collect()
    }

    fn keys(rows: &[Row]) -> Vec<String> {
        rows.iter().map(|row| row["k"].to_string()).collect()
    }

    #[test]
    fn test_probe_hits_and_stops_at_non_matching_neighbours() {
        let records = rows(&["pineapple", "grape", "banana", "apple"]);

        let found = locate(records, "k", "an").unwrap();

        assert_eq!(keys(&found), vec!["banana"]);
    }

    #[test]
    fn test_expansion_collects_neighbours_nearest_first() {
        let records = rows(&["mango", "band", "banana", "bandana", "cherry", "bank"]);

        // Sorted: banana, band, bandana, bank, cherry, mango.
        // The probe lands on "bandana" first.
        let found = locate(records, "k", "BAN").unwrap();

        assert_eq!(keys(&found), vec!["bandana", "band", "banana", "bank"]);
    }

    #[test]
    fn test_matching_ignores_case() {
        let records = rows(&["Zeta", "Alpha", "MIKE"]);

        let found = locate(records, "k", "ik").unwrap();

        assert_eq!(keys(&found), vec!["MIKE"]);
    }

    #[rstest]
    #[case(&["bzq", "ccc", "ddd"], "zq")]
    #[case(&["mango", "pear", "zapp"], "app")]
    fn test_probe_can_miss_existing_matches(#[case] input: &[&str], #[case] query: &str) {
        let records = rows(input);
        assert!(keys(&records).iter().any(|key| key.contains(query)));

        let found = locate(records, "k", query).unwrap();

        assert!(found.is_empty());
    }

    #[test]
    fn test_matches_separated_by_a_miss_are_not_collected() {
        let records = rows(&["b", "xa", "xc", "xd", "xe", "ax"]);

        // Sorted: ax, b, xa, xc, xd, xe. The probe hits "xa" and "b" halts
        // the leftward expansion before "ax".
        let found = locate(records, "k", "x").unwrap();

        assert_eq!(keys(&found), vec!["xa", "xc", "xd", "xe"]);
    }

    #[test]
    fn test_empty_query_returns_every_record_in_expansion_order() {
        let records = rows(&["e", "c", "a", "d", "b"]);

        let found = locate(records, "k", "").unwrap();

        assert_eq!(keys(&found), vec!["c", "b", "a", "d", "e"]);
    }

    #[test]
    fn test_empty_input_returns_nothing() {
        assert!(locate(Vec::<Row>::new(), "k", "x").unwrap().is_empty());
        assert!(locate(Vec::<Row>::new(), "missing", "").unwrap().is_empty());
    }

    #[test]
    fn test_no_match_returns_nothing() {
        let records = rows(&["apple", "banana", "grape"]);

        assert!(locate(records, "k", "kiwi").unwrap().is_empty());
    }

    #[test]
    fn test_numeric_keys_are_matched_as_text() {
        let records = vec![
            HashMap::from([("k".to_string(), FieldValue::Integer(120))]),
            HashMap::from([("k".to_string(), FieldValue::Integer(7))]),
            HashMap::from([("k".to_string(), FieldValue::Integer(12))]),
        ];

        // Sorted numerically: 7, 12, 120. The probe lands on 12.
        let found = locate(records, "k", "12").unwrap();

        assert_eq!(keys(&found), vec!["12", "120"]);
    }

    #[test]
    fn test_missing_key_is_reported() {
        let records = rows(&["a", "b"]);

        let err = locate(records, "name", "a").unwrap_err();

        assert!(matches!(err, SortError::FieldAccess { .. }));
    }

    #[test]
    fn test_incomparable_keys_are_reported() {
        let mut records = rows(&["a", "b"]);
        records[1].insert("k".to_string(), FieldValue::Null);

        let err = locate(records, "k", "a").unwrap_err();

        assert!(matches!(err, SortError::Comparison { .. }));
    }
}
