//! Builder object catalog: type bands, base scores, and the components
//! attached to every placed-or-placing object.
//!
//! Type identifiers live in a reserved numeric space partitioned into
//! bands of one hundred, so save files and external drivers can rely on
//! stable ids while each band stays open for new entries.

use bevy::prelude::*;
use bitcode::{Decode, Encode};
use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

// =============================================================================
// Score triple
// =============================================================================

/// A contribution to the three session resources. Viability is the sum.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Encode, Decode, Serialize, Deserialize,
)]
pub struct ScoreTriple {
    pub happiness: i32,
    pub power: i32,
    pub sustenance: i32,
}

impl ScoreTriple {
    pub const ZERO: ScoreTriple = ScoreTriple::new(0, 0, 0);

    pub const fn new(happiness: i32, power: i32, sustenance: i32) -> Self {
        Self {
            happiness,
            power,
            sustenance,
        }
    }

    /// Happiness + Power + Sustenance.
    pub fn viability(&self) -> i32 {
        self.happiness + self.power + self.sustenance
    }

    /// True iff every resource is strictly positive.
    pub fn all_positive(&self) -> bool {
        self.happiness > 0 && self.power > 0 && self.sustenance > 0
    }
}

impl Add for ScoreTriple {
    type Output = ScoreTriple;
    fn add(self, rhs: ScoreTriple) -> ScoreTriple {
        ScoreTriple::new(
            self.happiness + rhs.happiness,
            self.power + rhs.power,
            self.sustenance + rhs.sustenance,
        )
    }
}

impl AddAssign for ScoreTriple {
    fn add_assign(&mut self, rhs: ScoreTriple) {
        *self = *self + rhs;
    }
}

impl Sub for ScoreTriple {
    type Output = ScoreTriple;
    fn sub(self, rhs: ScoreTriple) -> ScoreTriple {
        ScoreTriple::new(
            self.happiness - rhs.happiness,
            self.power - rhs.power,
            self.sustenance - rhs.sustenance,
        )
    }
}

impl SubAssign for ScoreTriple {
    fn sub_assign(&mut self, rhs: ScoreTriple) {
        *self = *self - rhs;
    }
}

impl Neg for ScoreTriple {
    type Output = ScoreTriple;
    fn neg(self) -> ScoreTriple {
        ScoreTriple::new(-self.happiness, -self.power, -self.sustenance)
    }
}

// =============================================================================
// Type bands
// =============================================================================

/// The reserved id band an [`ObjectType`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeBand {
    /// 0–99: balancing prototypes, never shipped in the goal deck.
    Prototyping,
    /// 100–199: natural features with no adjacency rules of their own.
    Natural,
    /// 200–299: power producers.
    Power,
    /// 300–399: residential buildings.
    Residential,
    /// 400–499: environment and greenery.
    Environment,
    /// 500–599: commercial buildings.
    Commercial,
}

// =============================================================================
// Object types
// =============================================================================

/// Every placeable builder object. Discriminants are the stable numeric
/// ids; keep them inside their band when adding entries.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Encode,
    Decode,
    Serialize,
    Deserialize,
)]
#[repr(u16)]
pub enum ObjectType {
    // Prototyping band
    ProtoAlpha = 0,
    ProtoBeta = 1,
    // Natural band
    Boulder = 100,
    Thicket = 101,
    Pond = 102,
    // Power band
    WindTurbine = 200,
    SolarArray = 201,
    CoalBurner = 202,
    PeatFurnace = 203,
    // Residential band
    Cabin = 300,
    House = 301,
    Tenement = 302,
    Manor = 303,
    // Environment band
    Park = 400,
    Orchard = 401,
    Well = 402,
    Grove = 403,
    // Commercial band
    Market = 500,
    Bakery = 501,
    Workshop = 502,
    Tavern = 503,
    Warehouse = 504,
}

impl ObjectType {
    /// All types in id order.
    pub const ALL: &'static [ObjectType] = &[
        ObjectType::ProtoAlpha,
        ObjectType::ProtoBeta,
        ObjectType::Boulder,
        ObjectType::Thicket,
        ObjectType::Pond,
        ObjectType::WindTurbine,
        ObjectType::SolarArray,
        ObjectType::CoalBurner,
        ObjectType::PeatFurnace,
        ObjectType::Cabin,
        ObjectType::House,
        ObjectType::Tenement,
        ObjectType::Manor,
        ObjectType::Park,
        ObjectType::Orchard,
        ObjectType::Well,
        ObjectType::Grove,
        ObjectType::Market,
        ObjectType::Bakery,
        ObjectType::Workshop,
        ObjectType::Tavern,
        ObjectType::Warehouse,
    ];

    /// Stable numeric id (the enum discriminant).
    pub fn id(self) -> u16 {
        self as u16
    }

    /// The reserved band this type's id falls in.
    pub fn band(self) -> TypeBand {
        match self.id() / 100 {
            0 => TypeBand::Prototyping,
            1 => TypeBand::Natural,
            2 => TypeBand::Power,
            3 => TypeBand::Residential,
            4 => TypeBand::Environment,
            _ => TypeBand::Commercial,
        }
    }

    /// Constant contribution applied once when an instance of this type
    /// exists in isolation (no neighbors in sensing range).
    pub fn base_score(self) -> ScoreTriple {
        match self {
            ObjectType::ProtoAlpha => ScoreTriple::new(0, 3, 0),
            ObjectType::ProtoBeta => ScoreTriple::new(0, -5, -5),
            ObjectType::Boulder | ObjectType::Thicket | ObjectType::Pond => ScoreTriple::ZERO,
            ObjectType::WindTurbine => ScoreTriple::new(0, 4, 0),
            ObjectType::SolarArray => ScoreTriple::new(0, 3, 0),
            ObjectType::CoalBurner => ScoreTriple::new(-2, 8, 0),
            ObjectType::PeatFurnace => ScoreTriple::new(-1, 5, 0),
            ObjectType::Cabin => ScoreTriple::new(2, 0, -1),
            ObjectType::House => ScoreTriple::new(3, -1, -1),
            ObjectType::Tenement => ScoreTriple::new(5, -2, -3),
            ObjectType::Manor => ScoreTriple::new(4, -1, -1),
            ObjectType::Park => ScoreTriple::new(3, 0, 0),
            ObjectType::Orchard => ScoreTriple::new(1, 0, 3),
            ObjectType::Well => ScoreTriple::new(0, 0, 2),
            ObjectType::Grove => ScoreTriple::new(2, 0, 1),
            ObjectType::Market => ScoreTriple::new(1, 0, 2),
            ObjectType::Bakery => ScoreTriple::new(1, -1, 3),
            ObjectType::Workshop => ScoreTriple::new(0, -2, 2),
            ObjectType::Tavern => ScoreTriple::new(3, -1, 0),
            ObjectType::Warehouse => ScoreTriple::new(0, 0, 1),
        }
    }

    /// Tight footprint radius used for the collision check. Much smaller
    /// than [`crate::config::PROXIMITY_RADIUS`].
    pub fn footprint_radius(self) -> f32 {
        match self.band() {
            TypeBand::Prototyping => 3.0,
            TypeBand::Natural => 4.0,
            TypeBand::Power => 6.0,
            TypeBand::Residential => 4.0,
            TypeBand::Environment => 5.0,
            TypeBand::Commercial => 5.0,
        }
    }

    /// Display name.
    pub fn name(self) -> &'static str {
        match self {
            ObjectType::ProtoAlpha => "Proto Alpha",
            ObjectType::ProtoBeta => "Proto Beta",
            ObjectType::Boulder => "Boulder",
            ObjectType::Thicket => "Thicket",
            ObjectType::Pond => "Pond",
            ObjectType::WindTurbine => "Wind Turbine",
            ObjectType::SolarArray => "Solar Array",
            ObjectType::CoalBurner => "Coal Burner",
            ObjectType::PeatFurnace => "Peat Furnace",
            ObjectType::Cabin => "Cabin",
            ObjectType::House => "House",
            ObjectType::Tenement => "Tenement",
            ObjectType::Manor => "Manor",
            ObjectType::Park => "Park",
            ObjectType::Orchard => "Orchard",
            ObjectType::Well => "Well",
            ObjectType::Grove => "Grove",
            ObjectType::Market => "Market",
            ObjectType::Bakery => "Bakery",
            ObjectType::Workshop => "Workshop",
            ObjectType::Tavern => "Tavern",
            ObjectType::Warehouse => "Warehouse",
        }
    }
}

// =============================================================================
// Components
// =============================================================================

/// Whether an object is still under the cursor or settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildState {
    /// Spawned and movable; its contribution lives in the potential ledger.
    Placing,
    /// Committed; its contribution is frozen in the committed ledger.
    Placed,
}

/// World-space placement of an object. The gameplay core treats this as
/// opaque apart from feeding it to the geometry provider.
#[derive(Component, Debug, Clone, Copy)]
pub struct Position {
    pub translation: Vec3,
    pub yaw: f32,
}

impl Position {
    pub fn at(translation: Vec3) -> Self {
        Self {
            translation,
            yaw: 0.0,
        }
    }
}

/// Core component of every builder object instance.
#[derive(Component, Debug, Clone)]
pub struct PlacedObject {
    pub object_type: ObjectType,
    pub state: BuildState,
    /// Supplied by the geometry provider each tick while `Placing`.
    pub grounded: bool,
    /// True iff the footprint currently overlaps another non-self object.
    pub collided: bool,
    /// Contribution locked in at the moment of commit. Zero while `Placing`
    /// and for objects rehydrated from a snapshot (which can never be
    /// revoked, since the undo window is not persisted).
    pub frozen: ScoreTriple,
}

impl PlacedObject {
    pub fn placing(object_type: ObjectType) -> Self {
        Self {
            object_type,
            state: BuildState::Placing,
            grounded: false,
            collided: false,
            frozen: ScoreTriple::ZERO,
        }
    }

    /// A `Placing` object may commit only while this holds.
    pub fn valid(&self) -> bool {
        self.grounded && !self.collided
    }
}
