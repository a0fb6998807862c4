//! The adjacency rule table: a pure mapping from an **ordered** pair of
//! object types to a score delta triple.
//!
//! The pair is ordered on purpose. `lookup(A, B)` answers "what does an A
//! gain from standing near a B", which need not equal what a B gains from
//! the A. Absent pairs score zero, and a type paired with itself may carry
//! a clustering bonus or penalty.
//!
//! Rules are data, not code: the const [`RULES`] list is folded into a
//! hash map at startup so balancing passes edit one table instead of
//! branching logic.

use bevy::prelude::*;
use bevy::utils::HashMap;

use crate::objects::{ObjectType, ScoreTriple};

type Rule = (ObjectType, ObjectType, ScoreTriple);

/// (subject, neighbor) -> delta. Subjects in the natural band never appear
/// here; natural features only influence others.
const RULES: &[Rule] = &[
    // Prototyping band, used by balancing experiments
    (
        ObjectType::ProtoBeta,
        ObjectType::ProtoAlpha,
        ScoreTriple::new(-5, 0, 0),
    ),
    (
        ObjectType::ProtoAlpha,
        ObjectType::ProtoBeta,
        ScoreTriple::new(0, 1, 0),
    ),
    // Power
    (
        ObjectType::WindTurbine,
        ObjectType::WindTurbine,
        ScoreTriple::new(0, -2, 0),
    ),
    (
        ObjectType::WindTurbine,
        ObjectType::Boulder,
        ScoreTriple::new(0, 1, 0),
    ),
    (
        ObjectType::SolarArray,
        ObjectType::SolarArray,
        ScoreTriple::new(0, 1, 0),
    ),
    (
        ObjectType::SolarArray,
        ObjectType::Grove,
        ScoreTriple::new(0, -1, 0),
    ),
    (
        ObjectType::CoalBurner,
        ObjectType::CoalBurner,
        ScoreTriple::new(-2, -1, 0),
    ),
    // Residential
    (
        ObjectType::Cabin,
        ObjectType::Cabin,
        ScoreTriple::new(1, 0, 0),
    ),
    (
        ObjectType::Cabin,
        ObjectType::Thicket,
        ScoreTriple::new(1, 0, 0),
    ),
    (
        ObjectType::Cabin,
        ObjectType::Well,
        ScoreTriple::new(0, 0, 1),
    ),
    (
        ObjectType::House,
        ObjectType::Park,
        ScoreTriple::new(2, 0, 0),
    ),
    (
        ObjectType::House,
        ObjectType::Well,
        ScoreTriple::new(0, 0, 1),
    ),
    (
        ObjectType::House,
        ObjectType::Tavern,
        ScoreTriple::new(2, 0, 0),
    ),
    (
        ObjectType::House,
        ObjectType::CoalBurner,
        ScoreTriple::new(-3, 0, 0),
    ),
    (
        ObjectType::House,
        ObjectType::WindTurbine,
        ScoreTriple::new(-1, 0, 0),
    ),
    (
        ObjectType::House,
        ObjectType::Workshop,
        ScoreTriple::new(-1, 0, 0),
    ),
    (
        ObjectType::Tenement,
        ObjectType::Park,
        ScoreTriple::new(3, 0, 0),
    ),
    (
        ObjectType::Tenement,
        ObjectType::Tenement,
        ScoreTriple::new(-2, 0, 0),
    ),
    (
        ObjectType::Manor,
        ObjectType::Manor,
        ScoreTriple::new(-3, 0, 0),
    ),
    (
        ObjectType::Manor,
        ObjectType::Park,
        ScoreTriple::new(2, 0, 0),
    ),
    (
        ObjectType::Manor,
        ObjectType::Pond,
        ScoreTriple::new(2, 0, 0),
    ),
    // Environment
    (
        ObjectType::Park,
        ObjectType::House,
        ScoreTriple::new(1, 0, 0),
    ),
    (
        ObjectType::Orchard,
        ObjectType::Well,
        ScoreTriple::new(0, 0, 2),
    ),
    (
        ObjectType::Orchard,
        ObjectType::Orchard,
        ScoreTriple::new(0, 0, 1),
    ),
    (
        ObjectType::Well,
        ObjectType::Pond,
        ScoreTriple::new(0, 0, 2),
    ),
    (
        ObjectType::Grove,
        ObjectType::Grove,
        ScoreTriple::new(1, 0, 0),
    ),
    // Commercial
    (
        ObjectType::Market,
        ObjectType::House,
        ScoreTriple::new(1, 0, 1),
    ),
    (
        ObjectType::Market,
        ObjectType::Tenement,
        ScoreTriple::new(2, 0, 1),
    ),
    (
        ObjectType::Market,
        ObjectType::Market,
        ScoreTriple::new(-2, 0, -1),
    ),
    (
        ObjectType::Bakery,
        ObjectType::Orchard,
        ScoreTriple::new(0, 0, 2),
    ),
    (
        ObjectType::Bakery,
        ObjectType::Market,
        ScoreTriple::new(1, 0, 0),
    ),
    (
        ObjectType::Workshop,
        ObjectType::Warehouse,
        ScoreTriple::new(0, 0, 2),
    ),
    (
        ObjectType::Tavern,
        ObjectType::House,
        ScoreTriple::new(1, 0, 0),
    ),
    (
        ObjectType::Tavern,
        ObjectType::Tavern,
        ScoreTriple::new(-2, 0, 0),
    ),
    (
        ObjectType::Warehouse,
        ObjectType::Market,
        ScoreTriple::new(0, 0, 1),
    ),
];

/// The rule table, folded from [`RULES`] at startup.
#[derive(Resource)]
pub struct AdjacencyRules {
    table: HashMap<(ObjectType, ObjectType), ScoreTriple>,
}

impl Default for AdjacencyRules {
    fn default() -> Self {
        let mut table = HashMap::with_capacity(RULES.len());
        for &(subject, neighbor, delta) in RULES {
            let prev = table.insert((subject, neighbor), delta);
            debug_assert!(
                prev.is_none(),
                "duplicate adjacency rule for ({subject:?}, {neighbor:?})"
            );
        }
        Self { table }
    }
}

impl AdjacencyRules {
    /// Delta a `subject` gains from one `neighbor` in sensing range.
    /// Total over all pairs; unknown pairs score zero.
    pub fn lookup(&self, subject: ObjectType, neighbor: ObjectType) -> ScoreTriple {
        self.table
            .get(&(subject, neighbor))
            .copied()
            .unwrap_or(ScoreTriple::ZERO)
    }

    /// Full contribution of `subject` given its current neighbor types:
    /// base score plus the summed adjacency deltas.
    pub fn contribution(
        &self,
        subject: ObjectType,
        neighbors: impl Iterator<Item = ObjectType>,
    ) -> ScoreTriple {
        neighbors.fold(subject.base_score(), |acc, n| acc + self.lookup(subject, n))
    }

    pub fn rule_count(&self) -> usize {
        self.table.len()
    }
}
