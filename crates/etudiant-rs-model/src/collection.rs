//! Identifier-keyed ordered collections.
//!
//! [`IdentifiedSet`] keeps records in order and refuses a second record with
//! an identifier it already holds. Selection widgets are fed from it so that
//! the current choice is always among the options, even when it fell outside
//! the last page fetched.

use std::collections::HashSet;

use crate::entity::{Entity, Id};

/// An ordered set of records keyed by identifier.
///
/// Records without an identifier are kept as-is and never deduplicated.
/// When two records share an identifier the one already present wins and
/// keeps its position.
#[derive(Debug, Clone, PartialEq)]
pub struct IdentifiedSet<E: Entity> {
    items: Vec<E>,
    ids: HashSet<Id>,
}

impl<E: Entity> Default for IdentifiedSet<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Entity> IdentifiedSet<E> {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            ids: HashSet::new(),
        }
    }

    /// Builds a set from records in order, dropping later duplicates.
    pub fn from_items(items: impl IntoIterator<Item = E>) -> Self {
        let mut set = Self::new();
        for item in items {
            set.insert(item);
        }
        set
    }

    /// Appends a record. Returns `false` if its identifier is already present.
    pub fn insert(&mut self, item: E) -> bool {
        if let Some(id) = item.id() {
            if !self.ids.insert(id) {
                return false;
            }
        }
        self.items.push(item);
        true
    }

    /// Prepends every candidate whose identifier is not yet present.
    ///
    /// Candidates without an identifier are skipped. Prepended candidates
    /// keep their relative order. Returns how many were added.
    pub fn merge_front(&mut self, candidates: impl IntoIterator<Item = E>) -> usize {
        let mut front = Vec::new();
        for candidate in candidates {
            let Some(id) = candidate.id() else { continue };
            if self.ids.insert(id) {
                front.push(candidate);
            }
        }
        let added = front.len();
        if added > 0 {
            front.append(&mut self.items);
            self.items = front;
        }
        added
    }

    /// Returns `true` if a record with this identifier is present.
    pub fn contains_id(&self, id: Id) -> bool {
        self.ids.contains(&id)
    }

    /// Returns the record with this identifier.
    pub fn get(&self, id: Id) -> Option<&E> {
        if !self.contains_id(id) {
            return None;
        }
        self.items.iter().find(|item| item.id() == Some(id))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, E> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[E] {
        &self.items
    }

    /// Identifiers in order, skipping records without one.
    pub fn ids(&self) -> Vec<Id> {
        self.items.iter().filter_map(Entity::id).collect()
    }

    pub fn into_vec(self) -> Vec<E> {
        self.items
    }
}

impl<E: Entity> IntoIterator for IdentifiedSet<E> {
    type Item = E;
    type IntoIter = std::vec::IntoIter<E>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a, E: Entity> IntoIterator for &'a IdentifiedSet<E> {
    type Item = &'a E;
    type IntoIter = std::slice::Iter<'a, E>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<E: Entity> FromIterator<E> for IdentifiedSet<E> {
    fn from_iter<T: IntoIterator<Item = E>>(iter: T) -> Self {
        Self::from_items(iter)
    }
}

/// Ensures every candidate with an identifier is present in `collection`.
///
/// Missing candidates are prepended in the order given, followed by the
/// original collection with duplicate identifiers removed. Candidates may be
/// passed as records or as `Option`s; `None` and identifier-less candidates
/// are ignored.
///
/// # Examples
///
/// ```
/// use etudiant_rs_model::{add_to_collection_if_missing, Country};
///
/// let fetched = vec![Country::with_id(6802)];
/// let current = Some(Country::with_id(39517));
/// let options = add_to_collection_if_missing(fetched, [current]);
/// let ids: Vec<_> = options.iter().map(|c| c.id.unwrap()).collect();
/// assert_eq!(ids, vec![39517, 6802]);
/// ```
pub fn add_to_collection_if_missing<E, I>(collection: Vec<E>, candidates: I) -> Vec<E>
where
    E: Entity,
    I: IntoIterator,
    I::Item: Into<Option<E>>,
{
    let mut set = IdentifiedSet::from_items(collection);
    set.merge_front(candidates.into_iter().filter_map(Into::into));
    set.into_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{Country, Level};

    fn ids<E: Entity>(items: &[E]) -> Vec<Option<Id>> {
        items.iter().map(Entity::id).collect()
    }

    #[test]
    fn test_adds_missing_candidate_in_front() {
        let result = add_to_collection_if_missing(vec![Level::with_id(80158)], [Level::with_id(29537)]);
        assert_eq!(ids(&result), vec![Some(29537), Some(80158)]);
    }

    #[test]
    fn test_present_candidate_is_not_duplicated() {
        let collection = vec![Country::with_id(1).name("server copy"), Country::with_id(2)];
        let result = add_to_collection_if_missing(collection, [Country::with_id(1).name("stale")]);
        assert_eq!(ids(&result), vec![Some(1), Some(2)]);
        assert_eq!(result[0].name.as_deref(), Some("server copy"));
    }

    #[test]
    fn test_none_and_unset_candidates_are_ignored() {
        let collection = vec![Country::with_id(1)];
        let result = add_to_collection_if_missing(
            collection.clone(),
            [None, Some(Country::new()), Some(Country::new().name("no id"))],
        );
        assert_eq!(result, collection);
    }

    #[test]
    fn test_duplicate_candidates_added_once_in_order() {
        let result = add_to_collection_if_missing(
            Vec::<Country>::new(),
            [Country::with_id(3), Country::with_id(4), Country::with_id(3)],
        );
        assert_eq!(ids(&result), vec![Some(3), Some(4)]);
    }

    #[test]
    fn test_collection_duplicates_removed() {
        let result = add_to_collection_if_missing(
            vec![Country::with_id(1), Country::with_id(1), Country::new()],
            std::iter::empty::<Country>(),
        );
        assert_eq!(ids(&result), vec![Some(1), None]);
    }

    #[test]
    fn test_every_candidate_exactly_once_and_no_duplicate_ids() {
        let collections: Vec<Vec<Id>> = vec![vec![], vec![1], vec![1, 2, 3], vec![5, 5, 6]];
        let candidate_sets: Vec<Vec<Id>> = vec![vec![], vec![1], vec![4, 1], vec![7, 7, 8, 5]];
        for collection in &collections {
            for candidates in &candidate_sets {
                let result = add_to_collection_if_missing(
                    collection.iter().copied().map(Level::with_id).collect(),
                    candidates.iter().copied().map(Level::with_id),
                );
                let result_ids: Vec<Id> = result.iter().filter_map(|l| l.id).collect();
                for c in candidates.iter().chain(collection.iter()) {
                    assert_eq!(
                        result_ids.iter().filter(|id| *id == c).count(),
                        1,
                        "id {c} in {result_ids:?}"
                    );
                }
                let unique: HashSet<Id> = result_ids.iter().copied().collect();
                assert_eq!(unique.len(), result_ids.len());
            }
        }
    }

    #[test]
    fn test_set_accessors() {
        let mut set: IdentifiedSet<Country> = [Country::with_id(1).name("A")].into_iter().collect();
        assert!(set.insert(Country::with_id(2)));
        assert!(!set.insert(Country::with_id(1)));
        assert_eq!(set.merge_front([Country::with_id(0), Country::with_id(2)]), 1);
        assert_eq!(set.ids(), vec![0, 1, 2]);
        assert_eq!(set.get(1).and_then(|c| c.name.as_deref()), Some("A"));
        assert!(set.get(9).is_none());
        assert_eq!(set.len(), 3);
        assert!(!set.is_empty());
    }
}
