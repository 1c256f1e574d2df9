use derive_more::Display;

#[derive(Debug, Display, Clone, PartialEq, Eq)]
pub enum SortError {
    /// `index` is the record's position in the input, before any reordering.
    #[display(fmt = "record at position {} has no field `{}`", index, key)]
    FieldAccess { key: String, index: usize },

    #[display(
        fmt = "field `{}` holds values that cannot be compared: {} and {}",
        key,
        left,
        right
    )]
    Comparison {
        key: String,
        left: &'static str,
        right: &'static str,
    },
}

impl std::error::Error for SortError {}
