use std::collections::{BTreeSet, HashMap};

use crate::models::{Role, Roster};

/// Index of a participant in roster order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PersonId(pub usize);

impl PersonId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Everything the roster says about one participant
///
/// Role flags are independent: a malformed roster can list the same name
/// as both a parent and a child, and both flags are then kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Person {
    pub name: String,
    pub is_child: bool,
    pub is_adult: bool,
    pub is_grandparent: bool,
    /// Grandparents reachable through family membership
    pub ancestors: BTreeSet<PersonId>,
    /// Direct parents, only populated for children
    pub parents: BTreeSet<PersonId>,
    /// Indices of the families the person is listed in as parent or child
    pub families: BTreeSet<usize>,
}

impl Person {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            is_child: false,
            is_adult: false,
            is_grandparent: false,
            ancestors: BTreeSet::new(),
            parents: BTreeSet::new(),
            families: BTreeSet::new(),
        }
    }

    /// Single display role: grandparent wins over child, child over adult
    pub fn role(&self) -> Role {
        if self.is_grandparent {
            Role::Grandparent
        } else if self.is_child {
            Role::Child
        } else {
            Role::Adult
        }
    }
}

/// Who-is-related-to-whom, derived once from a roster
///
/// Participants are numbered by first appearance, walking families in
/// roster order and, within a family, grandparents, then parents, then
/// children. That numbering is the receiver order of the search and the
/// enumeration order of eligible givers.
#[derive(Debug, Clone)]
pub struct RelationshipModel {
    people: Vec<Person>,
    index: HashMap<String, PersonId>,
    eligible_givers: Vec<PersonId>,
}

impl RelationshipModel {
    pub fn build(roster: &Roster) -> Self {
        let mut model = Self {
            people: Vec::new(),
            index: HashMap::new(),
            eligible_givers: Vec::new(),
        };

        for (family_id, family) in roster.families.iter().enumerate() {
            let grandparents: Vec<PersonId> = family
                .grandparents
                .iter()
                .map(|name| model.intern(name))
                .collect();

            for &gp in &grandparents {
                let person = &mut model.people[gp.0];
                person.is_adult = true;
                person.is_grandparent = true;
                person.ancestors.insert(gp);
            }

            let parents: Vec<PersonId> = family
                .parents
                .iter()
                .map(|name| model.intern(name))
                .collect();

            for &parent in &parents {
                let person = &mut model.people[parent.0];
                person.is_adult = true;
                person.families.insert(family_id);
                person.ancestors.extend(grandparents.iter().copied());
            }

            for name in &family.children {
                let child = model.intern(name);
                let person = &mut model.people[child.0];
                person.is_child = true;
                person.families.insert(family_id);
                person.ancestors.extend(grandparents.iter().copied());
                person.parents.extend(parents.iter().copied());
            }
        }

        model.eligible_givers = model
            .people
            .iter()
            .enumerate()
            .filter(|(_, person)| !person.is_child)
            .map(|(i, _)| PersonId(i))
            .collect();

        tracing::debug!(
            "Relationship model built: {} participants, {} eligible givers",
            model.people.len(),
            model.eligible_givers.len()
        );

        model
    }

    fn intern(&mut self, name: &str) -> PersonId {
        if let Some(&id) = self.index.get(name) {
            return id;
        }
        let id = PersonId(self.people.len());
        self.people.push(Person::new(name));
        self.index.insert(name.to_string(), id);
        id
    }

    pub fn len(&self) -> usize {
        self.people.len()
    }

    pub fn is_empty(&self) -> bool {
        self.people.is_empty()
    }

    pub fn person(&self, id: PersonId) -> &Person {
        &self.people[id.0]
    }

    pub fn name(&self, id: PersonId) -> &str {
        &self.people[id.0].name
    }

    pub fn id_of(&self, name: &str) -> Option<PersonId> {
        self.index.get(name).copied()
    }

    /// All participants in receiver order
    pub fn participants(&self) -> impl Iterator<Item = PersonId> + '_ {
        (0..self.people.len()).map(PersonId)
    }

    pub fn children(&self) -> impl Iterator<Item = PersonId> + '_ {
        self.participants().filter(|&id| self.is_child(id))
    }

    pub fn adults(&self) -> impl Iterator<Item = PersonId> + '_ {
        self.participants().filter(|&id| self.is_adult(id))
    }

    pub fn grandparents(&self) -> impl Iterator<Item = PersonId> + '_ {
        self.participants().filter(|&id| self.is_grandparent(id))
    }

    /// Participants who may give, in participant order
    pub fn eligible_givers(&self) -> &[PersonId] {
        &self.eligible_givers
    }

    pub fn is_child(&self, id: PersonId) -> bool {
        self.people[id.0].is_child
    }

    pub fn is_adult(&self, id: PersonId) -> bool {
        self.people[id.0].is_adult
    }

    pub fn is_grandparent(&self, id: PersonId) -> bool {
        self.people[id.0].is_grandparent
    }

    pub fn ancestors(&self, id: PersonId) -> &BTreeSet<PersonId> {
        &self.people[id.0].ancestors
    }

    pub fn parents_of(&self, id: PersonId) -> &BTreeSet<PersonId> {
        &self.people[id.0].parents
    }

    /// True when `parent` is listed as a parent of `child`
    pub fn is_parent_of(&self, parent: PersonId, child: PersonId) -> bool {
        self.people[child.0].parents.contains(&parent)
    }

    pub fn share_grandparent(&self, a: PersonId, b: PersonId) -> bool {
        !self.people[a.0].ancestors.is_disjoint(&self.people[b.0].ancestors)
    }
}
