use serde::{Deserialize, Serialize};
use validator::Validate;

/// One household in the roster
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Family {
    #[serde(default)]
    pub parents: Vec<String>,
    #[serde(default)]
    pub children: Vec<String>,
    #[serde(default)]
    pub grandparents: Vec<String>,
}

impl Family {
    /// Number of names listed, counting repeats
    pub fn headcount(&self) -> usize {
        self.parents.len() + self.children.len() + self.grandparents.len()
    }

    pub fn new<P, C, G>(parents: P, children: C, grandparents: G) -> Self
    where
        P: IntoIterator,
        P::Item: Into<String>,
        C: IntoIterator,
        C::Item: Into<String>,
        G: IntoIterator,
        G::Item: Into<String>,
    {
        Self {
            parents: parents.into_iter().map(Into::into).collect(),
            children: children.into_iter().map(Into::into).collect(),
            grandparents: grandparents.into_iter().map(Into::into).collect(),
        }
    }
}

/// Ordered list of families taking part in the exchange
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roster {
    #[serde(default)]
    pub families: Vec<Family>,
}

impl Roster {
    pub fn new(families: Vec<Family>) -> Self {
        Self { families }
    }
}

/// Display role of a participant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Child,
    Adult,
    Grandparent,
}

impl Role {
    pub fn is_child(self) -> bool {
        matches!(self, Role::Child)
    }
}

/// Penalty and bonus values applied by the candidate scorer
///
/// Lower totals are preferred. Bonuses are negative values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct PenaltyWeights {
    /// Gift count from which `too_many_gifts` applies
    #[validate(range(min = 1))]
    pub max_ideal_gifts: u32,
    pub parent_child: i32,
    pub grandparent_grandchild: i32,
    pub shared_grandparents: i32,
    pub grandparent_to_grandparent: i32,
    pub too_many_gifts: i32,
    pub first_gift_bonus: i32,
    pub two_adults: i32,
    pub two_children: i32,
    pub mixed_bonus: i32,
}

impl Default for PenaltyWeights {
    fn default() -> Self {
        Self {
            max_ideal_gifts: 2,
            parent_child: 25,
            grandparent_grandchild: 25,
            shared_grandparents: 20,
            grandparent_to_grandparent: 15,
            too_many_gifts: 40,
            first_gift_bonus: -5,
            two_adults: 100,
            two_children: 10,
            mixed_bonus: -5,
        }
    }
}

/// A (giver, receiver) pair that must never be assigned
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForbiddenPair {
    pub giver: String,
    pub receiver: String,
}

/// Exclusions applied before scoring. Empty by default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HardRules {
    #[serde(default)]
    pub forbid_parent_child: bool,
    #[serde(default)]
    pub forbidden_pairs: Vec<ForbiddenPair>,
}

impl HardRules {
    pub fn is_empty(&self) -> bool {
        !self.forbid_parent_child && self.forbidden_pairs.is_empty()
    }
}

/// One committed gift
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GiftPair {
    pub receiver: String,
    pub giver: String,
    #[serde(rename = "receiverRole")]
    pub receiver_role: Role,
}

/// Completed receiver -> giver mapping, in receiver order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pairs: Vec<GiftPair>,
}

impl Assignment {
    pub(crate) fn from_pairs(pairs: Vec<GiftPair>) -> Self {
        Self { pairs }
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn pairs(&self) -> &[GiftPair] {
        &self.pairs
    }

    pub fn iter(&self) -> impl Iterator<Item = &GiftPair> {
        self.pairs.iter()
    }

    /// Giver assigned to `receiver`, if they take part
    pub fn giver_of(&self, receiver: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|pair| pair.receiver == receiver)
            .map(|pair| pair.giver.as_str())
    }

    /// Receivers of `giver` in receiver order
    pub fn receivers_of<'a>(&'a self, giver: &'a str) -> impl Iterator<Item = &'a GiftPair> + 'a {
        self.pairs.iter().filter(move |pair| pair.giver == giver)
    }
}
