//! Move, delete and combine selection sets.
//!
//! A shape id belongs to at most one set at a time; every membership change
//! goes through [`Selection::toggle`], which refuses ids claimed elsewhere.

use uuid::Uuid;

/// One of the three selection sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelectionSet {
    Move,
    Delete,
    Combine,
}

/// Result of a [`Selection::toggle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    Added,
    Removed,
    /// The id is in another set, or another shape is already being moved
    Refused,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    move_target: Option<Uuid>,
    delete: Vec<Uuid>,
    combine: Vec<Uuid>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// The set `id` currently belongs to.
    pub fn set_of(&self, id: Uuid) -> Option<SelectionSet> {
        if self.move_target == Some(id) {
            Some(SelectionSet::Move)
        } else if self.delete.contains(&id) {
            Some(SelectionSet::Delete)
        } else if self.combine.contains(&id) {
            Some(SelectionSet::Combine)
        } else {
            None
        }
    }

    /// Add `id` to `set`, or remove it when it is already there.
    ///
    /// The move set holds a single shape: while one is active, clicking any
    /// other shape is refused.
    pub fn toggle(&mut self, set: SelectionSet, id: Uuid) -> Toggle {
        match self.set_of(id) {
            Some(current) if current == set => {
                self.remove(id);
                return Toggle::Removed;
            }
            Some(_) => return Toggle::Refused,
            None => {}
        }

        match set {
            SelectionSet::Move => {
                if self.move_target.is_some() {
                    return Toggle::Refused;
                }
                self.move_target = Some(id);
            }
            SelectionSet::Delete => self.delete.push(id),
            SelectionSet::Combine => self.combine.push(id),
        }
        Toggle::Added
    }

    /// Drop `id` from whichever set holds it.
    pub fn remove(&mut self, id: Uuid) -> bool {
        if self.move_target == Some(id) {
            self.move_target = None;
            return true;
        }
        let before = self.delete.len() + self.combine.len();
        self.delete.retain(|other| *other != id);
        self.combine.retain(|other| *other != id);
        before != self.delete.len() + self.combine.len()
    }

    pub fn move_target(&self) -> Option<Uuid> {
        self.move_target
    }

    pub fn delete_set(&self) -> &[Uuid] {
        &self.delete
    }

    pub fn combine_set(&self) -> &[Uuid] {
        &self.combine
    }

    /// Empty the delete set and return what it held.
    pub fn take_delete(&mut self) -> Vec<Uuid> {
        std::mem::take(&mut self.delete)
    }

    pub fn clear_combine(&mut self) {
        self.combine.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.move_target.is_none() && self.delete.is_empty() && self.combine.is_empty()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_adds_and_removes() {
        let mut selection = Selection::new();
        let id = Uuid::new_v4();
        assert_eq!(selection.toggle(SelectionSet::Delete, id), Toggle::Added);
        assert_eq!(selection.set_of(id), Some(SelectionSet::Delete));
        assert_eq!(selection.toggle(SelectionSet::Delete, id), Toggle::Removed);
        assert_eq!(selection.set_of(id), None);
        assert!(selection.is_empty());
    }

    #[test]
    fn test_sets_are_exclusive() {
        let mut selection = Selection::new();
        let id = Uuid::new_v4();
        selection.toggle(SelectionSet::Combine, id);

        assert_eq!(selection.toggle(SelectionSet::Delete, id), Toggle::Refused);
        assert_eq!(selection.toggle(SelectionSet::Move, id), Toggle::Refused);
        assert_eq!(selection.combine_set(), &[id]);
        assert!(selection.delete_set().is_empty());
        assert_eq!(selection.move_target(), None);
    }

    #[test]
    fn test_single_move_target() {
        let mut selection = Selection::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        assert_eq!(selection.toggle(SelectionSet::Move, a), Toggle::Added);
        assert_eq!(selection.toggle(SelectionSet::Move, b), Toggle::Refused);
        assert_eq!(selection.move_target(), Some(a));
        assert_eq!(selection.toggle(SelectionSet::Move, a), Toggle::Removed);
        assert_eq!(selection.toggle(SelectionSet::Move, b), Toggle::Added);
    }

    #[test]
    fn test_remove_purges_any_set() {
        let mut selection = Selection::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        selection.toggle(SelectionSet::Move, a);
        selection.toggle(SelectionSet::Delete, b);
        assert!(selection.remove(a));
        assert!(selection.remove(b));
        assert!(!selection.remove(b));
        assert!(selection.is_empty());
    }

    #[test]
    fn test_take_delete_empties_set() {
        let mut selection = Selection::new();
        let ids = [Uuid::new_v4(), Uuid::new_v4()];
        for id in ids {
            selection.toggle(SelectionSet::Delete, id);
        }
        assert_eq!(selection.take_delete(), ids.to_vec());
        assert!(selection.delete_set().is_empty());
    }
}
