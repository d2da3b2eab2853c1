use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Closed set of activity categories with a free-text escape hatch.
///
/// Stored as text; parsing never fails: an unrecognized tag becomes
/// `Custom`, so typos stay visible as custom workouts instead of silently
/// forking a new tracked category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivityType {
    Walking,
    Running,
    BonusHydration,
    BonusMeditation,
    BonusSleep,
    BonusSauna,
    BonusColdPlunge,
    BonusStretch,
    BonusDetox,
    BonusLifting,
    BonusGratitude,
    Custom(String),
}

impl ActivityType {
    pub fn as_str(&self) -> &str {
        match self {
            ActivityType::Walking => "Walking",
            ActivityType::Running => "Running",
            ActivityType::BonusHydration => "Bonus: Hydration",
            ActivityType::BonusMeditation => "Bonus: Meditation",
            ActivityType::BonusSleep => "Bonus: Sleep",
            ActivityType::BonusSauna => "Bonus: Sauna",
            ActivityType::BonusColdPlunge => "Bonus: Cold Plunge",
            ActivityType::BonusStretch => "Bonus: Stretch",
            ActivityType::BonusDetox => "Bonus: Detox",
            ActivityType::BonusLifting => "Bonus: Lifting",
            ActivityType::BonusGratitude => "Bonus: Gratitude",
            ActivityType::Custom(label) => label,
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "Walking" => ActivityType::Walking,
            "Running" => ActivityType::Running,
            "Bonus: Hydration" => ActivityType::BonusHydration,
            "Bonus: Meditation" => ActivityType::BonusMeditation,
            "Bonus: Sleep" => ActivityType::BonusSleep,
            "Bonus: Sauna" => ActivityType::BonusSauna,
            "Bonus: Cold Plunge" => ActivityType::BonusColdPlunge,
            "Bonus: Stretch" => ActivityType::BonusStretch,
            "Bonus: Detox" => ActivityType::BonusDetox,
            "Bonus: Lifting" => ActivityType::BonusLifting,
            "Bonus: Gratitude" => ActivityType::BonusGratitude,
            other => ActivityType::Custom(other.to_string()),
        }
    }
}

impl fmt::Display for ActivityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for ActivityType {
    fn from(s: &str) -> Self {
        ActivityType::parse(s)
    }
}

impl Serialize for ActivityType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ActivityType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(ActivityType::parse(&s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_tags_parse_to_variants() {
        assert_eq!(ActivityType::parse("Walking"), ActivityType::Walking);
        assert_eq!(
            ActivityType::parse("Bonus: Cold Plunge"),
            ActivityType::BonusColdPlunge
        );
        assert_eq!(ActivityType::parse("Bonus: Sleep").as_str(), "Bonus: Sleep");
    }

    #[test]
    fn test_unknown_tag_falls_back_to_custom() {
        let t = ActivityType::parse("Underwater Basket Weaving");
        assert_eq!(
            t,
            ActivityType::Custom("Underwater Basket Weaving".to_string())
        );
        assert_eq!(t.as_str(), "Underwater Basket Weaving");
    }

    #[test]
    fn test_typo_does_not_match_a_tracked_category() {
        // "walking" (lowercase) is a custom workout, not the Walking category.
        assert_eq!(
            ActivityType::parse("walking"),
            ActivityType::Custom("walking".to_string())
        );
    }

    #[test]
    fn test_serde_round_trip_via_string() {
        let json = serde_json::to_string(&ActivityType::BonusSauna).unwrap();
        assert_eq!(json, "\"Bonus: Sauna\"");
        let back: ActivityType = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ActivityType::BonusSauna);
    }
}
