//! Grouped views of an assignment and their plain-text rendering.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::Assignment;

/// Everything one giver is responsible for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GiverSummary {
    pub giver: String,
    pub children: Vec<String>,
    pub adults: Vec<String>,
}

impl GiverSummary {
    pub fn total(&self) -> usize {
        self.children.len() + self.adults.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiverSummary {
    pub receiver: String,
    pub giver: String,
}

/// Assignment grouped by giver and by receiver, both sorted by name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentReport {
    pub givers: Vec<GiverSummary>,
    pub receivers: Vec<ReceiverSummary>,
}

impl AssignmentReport {
    pub fn from_assignment(assignment: &Assignment) -> Self {
        let mut by_giver: BTreeMap<&str, GiverSummary> = BTreeMap::new();
        for pair in assignment.iter() {
            let summary = by_giver
                .entry(pair.giver.as_str())
                .or_insert_with(|| GiverSummary {
                    giver: pair.giver.clone(),
                    children: Vec::new(),
                    adults: Vec::new(),
                });
            if pair.receiver_role.is_child() {
                summary.children.push(pair.receiver.clone());
            } else {
                summary.adults.push(pair.receiver.clone());
            }
        }

        let mut receivers: Vec<ReceiverSummary> = assignment
            .iter()
            .map(|pair| ReceiverSummary {
                receiver: pair.receiver.clone(),
                giver: pair.giver.clone(),
            })
            .collect();
        receivers.sort_by(|a, b| a.receiver.cmp(&b.receiver));

        Self {
            givers: by_giver.into_values().collect(),
            receivers,
        }
    }
}

/// The two-section text report
impl fmt::Display for AssignmentReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "---- Who gives to whom ----")?;
        for summary in &self.givers {
            writeln!(f, "{}", giver_line(summary))?;
        }

        writeln!(f)?;
        writeln!(f, "---- Who receives from whom ----")?;
        for summary in &self.receivers {
            writeln!(f, "{}", receiver_line(summary))?;
        }

        Ok(())
    }
}

/// "X gives to child A, B and to adult C"
pub fn giver_line(summary: &GiverSummary) -> String {
    let mut line = format!("{} gives", summary.giver);
    if !summary.children.is_empty() {
        line.push_str(" to child ");
        line.push_str(&summary.children.join(", "));
    }
    if !summary.adults.is_empty() {
        if !summary.children.is_empty() {
            line.push_str(" and");
        }
        line.push_str(" to adult ");
        line.push_str(&summary.adults.join(", "));
    }
    line
}

pub fn receiver_line(summary: &ReceiverSummary) -> String {
    format!("{} receives from {}", summary.receiver, summary.giver)
}
