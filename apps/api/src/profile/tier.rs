use std::fmt;

use serde::{Deserialize, Serialize};

/// Display tier derived from completion percentage. Independent of eligibility.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum Tier {
    Bronze,
    Silver,
    Gold,
    Platinum,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Bronze => "Bronze",
            Tier::Silver => "Silver",
            Tier::Gold => "Gold",
            Tier::Platinum => "Platinum",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn classify_tier(percentage: u8) -> Tier {
    match percentage {
        p if p >= 90 => Tier::Platinum,
        p if p >= 80 => Tier::Gold,
        p if p >= 60 => Tier::Silver,
        _ => Tier::Bronze,
    }
}
