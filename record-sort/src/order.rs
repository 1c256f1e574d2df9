use std::str::FromStr;

use derive_more::Display;

/// The direction of a sort.
#[derive(Debug, Display, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    /// Lowest key first.
    #[default]
    #[display(fmt = "asc")]
    Ascending,
    /// Highest key first.
    #[display(fmt = "desc")]
    Descending,
}

impl From<bool> for SortOrder {
    /// `true` means descending.
    fn from(descending: bool) -> Self {
        if descending {
            SortOrder::Descending
        } else {
            SortOrder::Ascending
        }
    }
}

#[derive(Debug, Display, Clone, PartialEq, Eq)]
#[display(fmt = "unknown sort order `{}`, expected `asc` or `desc`", _0)]
pub struct ParseSortOrderError(String);

impl std::error::Error for ParseSortOrderError {}

impl FromStr for SortOrder {
    type Err = ParseSortOrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortOrder::Ascending),
            "desc" | "descending" => Ok(SortOrder::Descending),
            _ => Err(ParseSortOrderError(s.to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::SortOrder;

    #[rstest]
    #[case("asc", SortOrder::Ascending)]
    #[case("ASC", SortOrder::Ascending)]
    #[case("ascending", SortOrder::Ascending)]
    #[case("desc", SortOrder::Descending)]
    #[case("Descending", SortOrder::Descending)]
    fn test_parsing_sort_order(#[case] input: &str, #[case] expected: SortOrder) {
        assert_eq!(input.parse::<SortOrder>().unwrap(), expected);
    }

    #[test]
    fn test_unknown_sort_order_is_rejected() {
        let err = "sideways".parse::<SortOrder>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "unknown sort order `sideways`, expected `asc` or `desc`"
        );
    }

    #[test]
    fn test_bool_maps_to_descending_flag() {
        assert_eq!(SortOrder::from(true), SortOrder::Descending);
        assert_eq!(SortOrder::from(false), SortOrder::Ascending);
        assert_eq!(SortOrder::default(), SortOrder::Ascending);
    }
}
