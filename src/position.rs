use serde::{Deserialize, Serialize};

/// Coarse position group used by every squad-shape rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PositionGroup {
    GK,
    DEF,
    MID,
    ATT,
}

impl PositionGroup {
    /// Fixed enumeration order; sell/buy passes iterate groups in this order.
    pub const ALL: [PositionGroup; 4] = [
        PositionGroup::GK,
        PositionGroup::DEF,
        PositionGroup::MID,
        PositionGroup::ATT,
    ];

    /// Headcount bounds (min, max) per group.
    ///
    /// Ranges are wide on purpose: scraped squads include B-team and youth
    /// players alongside the first team (typically 30-40 total). The GK
    /// range is tight to prevent circular sell/buy.
    pub fn thresholds(self) -> (usize, usize) {
        match self {
            PositionGroup::GK => (2, 3),
            PositionGroup::DEF => (5, 12),
            PositionGroup::MID => (5, 12),
            PositionGroup::ATT => (3, 10),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PositionGroup::GK => "GK",
            PositionGroup::DEF => "DEF",
            PositionGroup::MID => "MID",
            PositionGroup::ATT => "ATT",
        }
    }
}

/// Maps a raw Transfermarkt position label to its group.
///
/// Returns `None` for missing or unmapped labels; such players are invisible
/// to every group-based rule and pass through squads untouched.
pub fn position_group(position: Option<&str>) -> Option<PositionGroup> {
    match position? {
        "Goalkeeper" => Some(PositionGroup::GK),
        "Sweeper" | "Centre-Back" | "Left-Back" | "Right-Back" => Some(PositionGroup::DEF),
        "Defensive Midfield" | "Central Midfield" | "Left Midfield" | "Right Midfield"
        | "Attacking Midfield" => Some(PositionGroup::MID),
        "Left Winger" | "Right Winger" | "Second Striker" | "Centre-Forward" => {
            Some(PositionGroup::ATT)
        }
        _ => None,
    }
}
