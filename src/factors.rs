use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Upper bound (inclusive) of the lowest tier
pub const LOW_TIER_MAX: u8 = 30;
/// Upper bound (inclusive) of the middle tier
pub const MID_TIER_MAX: u8 = 70;

/// Self-reported context captured before a session starts.
///
/// Values are validated once, at capture time, by [`Factors::new`]. Stored
/// records are trusted as-is by the analytics code.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Factors {
    pub stress: Option<u8>,
    pub fatigue: Option<u8>,
    pub age: Option<u32>,
}

impl Factors {
    pub fn new(stress: Option<i64>, fatigue: Option<i64>, age: Option<i64>) -> Result<Self> {
        Ok(Self {
            stress: stress.map(|v| percent("stress", v)).transpose()?,
            fatigue: fatigue.map(|v| percent("fatigue", v)).transpose()?,
            age: age
                .map(|v| {
                    u32::try_from(v)
                        .ok()
                        .filter(|a| *a > 0)
                        .ok_or(Error::InvalidFactor {
                            factor: "age",
                            range: "a positive number of years",
                            value: v,
                        })
                })
                .transpose()?,
        })
    }

    pub fn none() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.stress.is_none() && self.fatigue.is_none() && self.age.is_none()
    }

    pub fn stress_tier(&self) -> Option<StressTier> {
        self.stress.map(StressTier::from_level)
    }

    pub fn fatigue_tier(&self) -> Option<FatigueTier> {
        self.fatigue.map(FatigueTier::from_level)
    }
}

fn percent(factor: &'static str, value: i64) -> Result<u8> {
    u8::try_from(value)
        .ok()
        .filter(|v| *v <= 100)
        .ok_or(Error::InvalidFactor {
            factor,
            range: "0..=100",
            value,
        })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FactorKind {
    Stress,
    Fatigue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StressTier {
    Low,
    Medium,
    High,
}

impl StressTier {
    pub fn from_level(level: u8) -> Self {
        match level {
            0..=LOW_TIER_MAX => StressTier::Low,
            0..=MID_TIER_MAX => StressTier::Medium,
            _ => StressTier::High,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            StressTier::Low => "Low",
            StressTier::Medium => "Medium",
            StressTier::High => "High",
        }
    }

    /// Compact form used in combined stress/fatigue bucket labels
    pub fn short_label(self) -> &'static str {
        match self {
            StressTier::Low => "Low",
            StressTier::Medium => "Med",
            StressTier::High => "High",
        }
    }

    pub fn range(self) -> &'static str {
        match self {
            StressTier::Low => "0-30%",
            StressTier::Medium => "31-70%",
            StressTier::High => "71-100%",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FatigueTier {
    WellRested,
    Tired,
    VeryTired,
}

impl FatigueTier {
    pub fn from_level(level: u8) -> Self {
        match level {
            0..=LOW_TIER_MAX => FatigueTier::WellRested,
            0..=MID_TIER_MAX => FatigueTier::Tired,
            _ => FatigueTier::VeryTired,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FatigueTier::WellRested => "Well-rested",
            FatigueTier::Tired => "Tired",
            FatigueTier::VeryTired => "Very Tired",
        }
    }

    pub fn short_label(self) -> &'static str {
        match self {
            FatigueTier::WellRested => "Rested",
            FatigueTier::Tired => "Tired",
            FatigueTier::VeryTired => "V.Tired",
        }
    }

    pub fn range(self) -> &'static str {
        match self {
            FatigueTier::WellRested => "0-30%",
            FatigueTier::Tired => "31-70%",
            FatigueTier::VeryTired => "71-100%",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn stress_tier_boundaries() {
        assert_eq!(StressTier::from_level(0), StressTier::Low);
        assert_eq!(StressTier::from_level(30), StressTier::Low);
        assert_eq!(StressTier::from_level(31), StressTier::Medium);
        assert_eq!(StressTier::from_level(70), StressTier::Medium);
        assert_eq!(StressTier::from_level(71), StressTier::High);
        assert_eq!(StressTier::from_level(100), StressTier::High);
    }

    #[test]
    fn fatigue_tier_boundaries() {
        assert_eq!(FatigueTier::from_level(30), FatigueTier::WellRested);
        assert_eq!(FatigueTier::from_level(31), FatigueTier::Tired);
        assert_eq!(FatigueTier::from_level(70), FatigueTier::Tired);
        assert_eq!(FatigueTier::from_level(71), FatigueTier::VeryTired);
    }

    #[test]
    fn capture_accepts_valid_values() {
        let f = Factors::new(Some(0), Some(100), Some(34)).unwrap();
        assert_eq!(f.stress, Some(0));
        assert_eq!(f.fatigue, Some(100));
        assert_eq!(f.age, Some(34));
        assert!(!f.is_empty());
        assert!(Factors::new(None, None, None).unwrap().is_empty());
    }

    #[test]
    fn capture_rejects_out_of_range() {
        assert_matches!(
            Factors::new(Some(101), None, None),
            Err(Error::InvalidFactor {
                factor: "stress",
                value: 101,
                ..
            })
        );
        assert_matches!(
            Factors::new(None, Some(-1), None),
            Err(Error::InvalidFactor {
                factor: "fatigue",
                ..
            })
        );
        assert_matches!(
            Factors::new(None, None, Some(0)),
            Err(Error::InvalidFactor { factor: "age", .. })
        );
    }

    #[test]
    fn serializes_nulls_for_missing_factors() {
        let json = serde_json::to_string(&Factors::new(Some(40), None, None).unwrap()).unwrap();
        assert_eq!(json, r#"{"stress":40,"fatigue":null,"age":null}"#);
    }
}
