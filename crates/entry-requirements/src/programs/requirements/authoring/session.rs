use super::{NewRequirement, RequirementCollection, RequirementPatch};
use crate::programs::requirements::domain::RequirementId;

/// One editor's working copy with undo/redo over whole collections.
#[derive(Debug, Clone, Default)]
pub struct AuthoringSession {
    current: RequirementCollection,
    undo_stack: Vec<RequirementCollection>,
    redo_stack: Vec<RequirementCollection>,
}

impl AuthoringSession {
    pub fn new(collection: RequirementCollection) -> Self {
        Self {
            current: collection,
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
        }
    }

    pub fn current(&self) -> &RequirementCollection {
        &self.current
    }

    pub fn into_collection(self) -> RequirementCollection {
        self.current
    }

    /// Replace the working copy with `next`. Edits that change nothing leave history alone.
    pub fn commit(&mut self, next: RequirementCollection) -> bool {
        if next == self.current {
            return false;
        }
        let previous = std::mem::replace(&mut self.current, next);
        self.undo_stack.push(previous);
        self.redo_stack.clear();
        true
    }

    pub fn add_requirement(&mut self, new: NewRequirement) -> RequirementId {
        let (next, id) = self.current.add_requirement(new);
        self.commit(next);
        id
    }

    pub fn add_alternative(&mut self, existing: &RequirementId) -> Option<RequirementId> {
        let (next, id) = self.current.add_alternative(existing);
        self.commit(next);
        id
    }

    pub fn remove_from_group(&mut self, id: &RequirementId) -> bool {
        let next = self.current.remove_from_group(id);
        self.commit(next)
    }

    pub fn delete_requirement(&mut self, id: &RequirementId) -> bool {
        let next = self.current.delete_requirement(id);
        self.commit(next)
    }

    pub fn update_requirement(&mut self, id: &RequirementId, patch: RequirementPatch) -> bool {
        let next = self.current.update_requirement(id, patch);
        self.commit(next)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo(&mut self) -> bool {
        match self.undo_stack.pop() {
            Some(previous) => {
                let undone = std::mem::replace(&mut self.current, previous);
                self.redo_stack.push(undone);
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        match self.redo_stack.pop() {
            Some(next) => {
                let replaced = std::mem::replace(&mut self.current, next);
                self.undo_stack.push(replaced);
                true
            }
            None => false,
        }
    }
}
