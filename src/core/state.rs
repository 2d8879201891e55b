use crate::core::relationships::PersonId;

/// Assignment and giver load under construction
///
/// Owned by one search call chain. Every `commit` is undone by a matching
/// `rollback` on the same receiver, in reverse order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialAssignment {
    giver_of: Vec<Option<PersonId>>,
    gives_to: Vec<Vec<PersonId>>,
    assigned: usize,
}

impl PartialAssignment {
    pub fn new(participants: usize) -> Self {
        Self {
            giver_of: vec![None; participants],
            gives_to: vec![Vec::new(); participants],
            assigned: 0,
        }
    }

    /// Assign `giver` to `receiver` and bump the giver's load
    pub fn commit(&mut self, receiver: PersonId, giver: PersonId) {
        debug_assert!(self.giver_of[receiver.0].is_none(), "receiver already assigned");
        self.giver_of[receiver.0] = Some(giver);
        self.gives_to[giver.0].push(receiver);
        self.assigned += 1;
    }

    /// Undo the commit for `receiver`, returning the giver that was removed
    pub fn rollback(&mut self, receiver: PersonId) -> Option<PersonId> {
        let giver = self.giver_of[receiver.0].take()?;
        let receivers = &mut self.gives_to[giver.0];
        if let Some(pos) = receivers.iter().rposition(|&r| r == receiver) {
            receivers.remove(pos);
        }
        self.assigned -= 1;
        Some(giver)
    }

    pub fn giver_of(&self, receiver: PersonId) -> Option<PersonId> {
        self.giver_of[receiver.0]
    }

    /// Receivers currently assigned to `giver`, in commit order
    pub fn receivers_of(&self, giver: PersonId) -> &[PersonId] {
        &self.gives_to[giver.0]
    }

    /// Current gift count of `giver`
    pub fn load(&self, giver: PersonId) -> u32 {
        self.gives_to[giver.0].len() as u32
    }

    pub fn loads(&self) -> Vec<u32> {
        self.gives_to.iter().map(|r| r.len() as u32).collect()
    }

    pub fn assigned(&self) -> usize {
        self.assigned
    }

    pub fn is_complete(&self) -> bool {
        self.assigned == self.giver_of.len()
    }
}
