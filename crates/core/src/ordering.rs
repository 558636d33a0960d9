//! Display ordering and visibility rules for catalog entries.
//!
//! One `order` sequence spans the whole catalog. Values need not be
//! contiguous; only their relative order matters. Entries saved before
//! ordering existed have no `order` and sort after every ordered entry.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::error::CoreError;
use crate::types::Timestamp;

/// Sort position used for entries without an explicit `order`.
pub const ORDER_SENTINEL: i64 = i64::MAX;

/// Read access to the fields the ordering rules depend on.
pub trait CatalogEntry {
    fn order(&self) -> Option<i64>;
    fn is_active(&self) -> Option<bool>;
    fn created_at(&self) -> Timestamp;
}

pub fn sort_key(order: Option<i64>) -> i64 {
    order.unwrap_or(ORDER_SENTINEL)
}

/// An unset flag counts as visible.
pub fn is_visible(is_active: Option<bool>) -> bool {
    is_active != Some(false)
}

/// `max(existing orders, 0) + 1`.
pub fn next_order<I>(orders: I) -> i64
where
    I: IntoIterator<Item = Option<i64>>,
{
    orders
        .into_iter()
        .flatten()
        .fold(0, i64::max)
        .saturating_add(1)
}

/// Display comparison: ascending `order`, ties broken by newest first.
pub fn display_cmp<T: CatalogEntry>(a: &T, b: &T) -> Ordering {
    sort_key(a.order())
        .cmp(&sort_key(b.order()))
        .then_with(|| b.created_at().cmp(&a.created_at()))
}

/// Stable in-place sort into display order.
pub fn sort_for_display<T: CatalogEntry>(entries: &mut [T]) {
    entries.sort_by(display_cmp);
}

/// Map each id in a caller-supplied sequence to its 1-based position.
///
/// Rejects sequences that name the same id twice.
pub fn reorder_positions(ordered_ids: &[String]) -> Result<HashMap<&str, i64>, CoreError> {
    let mut positions = HashMap::with_capacity(ordered_ids.len());
    for (index, id) in ordered_ids.iter().enumerate() {
        let position = i64::try_from(index + 1)
            .map_err(|_| CoreError::Validation("Reorder list is too long".into()))?;
        if positions.insert(id.as_str(), position).is_some() {
            return Err(CoreError::Validation(format!(
                "Duplicate id '{id}' in reorder list"
            )));
        }
    }
    Ok(positions)
}
