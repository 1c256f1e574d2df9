use std::{cmp::Ordering, collections::VecDeque};

use log::debug;

use crate::{
    error::SortError,
    order::SortOrder,
    record::{FieldValue, Record},
};

/// A record paired with the value of the field it is ordered by.
pub(crate) type Keyed<R> = (FieldValue, R);

/// Merge sorts `records` by the value of `key`.
///
/// With [`SortOrder::Ascending`] records with equal keys keep their input
/// order. With [`SortOrder::Descending`] a run of equal keys comes out in
/// reverse input order.
///
/// Every record must expose `key`, even when there is nothing to compare it
/// against. Nothing is returned if any pair of keys cannot be compared.
pub fn sort<R: Record>(records: Vec<R>, key: &str, order: SortOrder) -> Result<Vec<R>, SortError> {
    let sorted = sort_keyed(records, key, order)?;
    Ok(sorted.into_iter().map(|(_, record)| record).collect())
}

pub(crate) fn sort_keyed<R: Record>(
    records: Vec<R>,
    key: &str,
    order: SortOrder,
) -> Result<Vec<Keyed<R>>, SortError> {
    let keyed = records
        .into_iter()
        .enumerate()
        .map(|(index, record)| match record.field(key) {
            Some(value) => Ok((value, record)),
            None => Err(SortError::FieldAccess {
                key: key.to_owned(),
                index,
            }),
        })
        .collect::<Result<Vec<_>, _>>()?;

    debug!(
        "merge sorting {} records by `{}` ({})",
        keyed.len(),
        key,
        order
    );

    merge_sort(keyed, key, order)
}

fn merge_sort<R>(
    mut items: Vec<Keyed<R>>,
    key: &str,
    order: SortOrder,
) -> Result<Vec<Keyed<R>>, SortError> {
    if items.len() < 2 {
        return Ok(items);
    }

    let middle = items.len() / 2;
    let right = items.split_off(middle);

    let left = merge_sort(items, key, order)?;
    let right = merge_sort(right, key, order)?;

    merge(left, right, key, order)
}

fn merge<R>(
    left: Vec<Keyed<R>>,
    right: Vec<Keyed<R>>,
    key: &str,
    order: SortOrder,
) -> Result<Vec<Keyed<R>>, SortError> {
    let mut sorted = Vec::with_capacity(left.len() + right.len());
    let mut left = VecDeque::from(left);
    let mut right = VecDeque::from(right);

    loop {
        let take_left = match (left.front(), right.front()) {
            (Some((left_value, _)), Some((right_value, _))) => {
                let ordering =
                    left_value
                        .compare(right_value)
                        .ok_or_else(|| SortError::Comparison {
                            key: key.to_owned(),
                            left: left_value.kind(),
                            right: right_value.kind(),
                        })?;

                // Ties go left when ascending and right when descending.
                match order {
                    SortOrder::Ascending => ordering != Ordering::Greater,
                    SortOrder::Descending => ordering == Ordering::Greater,
                }
            }
            _ => break,
        };

        let next = if take_left {
            left.pop_front()
        } else {
            right.pop_front()
        };
        sorted.extend(next);
    }

    sorted.extend(left);
    sorted.extend(right);

    Ok(sorted)
}
