//! Find-by-name over fetched collections.
//!
//! Collections are fetched whole and scanned locally; server-side filters are
//! not trusted for exact equality.

/// Anything addressable by a display name.
pub trait Named {
    fn name(&self) -> &str;
}

/// First item whose name equals `name` exactly.
pub fn find_by_name<T, I>(items: I, name: &str) -> Option<T>
where
    T: Named,
    I: IntoIterator<Item = T>,
{
    find_by(items, |item| item.name() == name)
}

/// First item matching `predicate`.
pub fn find_by<T, I, P>(items: I, mut predicate: P) -> Option<T>
where
    I: IntoIterator<Item = T>,
    P: FnMut(&T) -> bool,
{
    items.into_iter().find(|item| predicate(item))
}
