//! Fragrance concentration levels.

use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Concentration of a perfume, ordered from weakest to strongest.
///
/// `Unknown` sorts below every real level. Stored as an integer code
/// (see [`Concentration::code`]) and rendered by its display name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(i16)]
pub enum Concentration {
    #[default]
    Unknown = -1,
    EauFraiche = 0,
    EauDeCologne = 1,
    EauDeToilette = 2,
    EauDeParfum = 3,
    Parfum = 4,
    ExtraitDeParfum = 5,
}

impl Concentration {
    /// Returns every known concentration, weakest first.
    pub fn all() -> &'static [Concentration] {
        &[
            Concentration::EauFraiche,
            Concentration::EauDeCologne,
            Concentration::EauDeToilette,
            Concentration::EauDeParfum,
            Concentration::Parfum,
            Concentration::ExtraitDeParfum,
        ]
    }

    /// Integer code used in storage.
    pub fn code(&self) -> i16 {
        *self as i16
    }

    /// Maps a stored code back to a concentration.
    pub fn from_code(code: i16) -> Option<Self> {
        match code {
            -1 => Some(Concentration::Unknown),
            0 => Some(Concentration::EauFraiche),
            1 => Some(Concentration::EauDeCologne),
            2 => Some(Concentration::EauDeToilette),
            3 => Some(Concentration::EauDeParfum),
            4 => Some(Concentration::Parfum),
            5 => Some(Concentration::ExtraitDeParfum),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Concentration::Unknown => "Unknown",
            Concentration::EauFraiche => "Eau Fraiche",
            Concentration::EauDeCologne => "Eau De Cologne",
            Concentration::EauDeToilette => "Eau De Toilette",
            Concentration::EauDeParfum => "Eau De Parfum",
            Concentration::Parfum => "Parfum",
            Concentration::ExtraitDeParfum => "Extrait De Parfum",
        }
    }
}

impl std::fmt::Display for Concentration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Concentration {
    type Err = String;

    /// Parses one of the display names; `"Unknown"` itself is not accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Concentration::all()
            .iter()
            .find(|c| c.as_str() == s)
            .copied()
            .ok_or_else(|| format!("unknown concentration: {}", s))
    }
}

impl Serialize for Concentration {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Concentration {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_display_round_trip() {
        for c in Concentration::all() {
            assert_eq!(c.to_string().parse::<Concentration>().unwrap(), *c);
        }
    }

    #[test]
    fn test_parse_unknown_is_error() {
        let err = "Body Mist".parse::<Concentration>().unwrap_err();
        assert_eq!(err, "unknown concentration: Body Mist");
        assert!("Unknown".parse::<Concentration>().is_err());
        assert!("eau de parfum".parse::<Concentration>().is_err());
    }

    #[test]
    fn test_ordering() {
        assert!(Concentration::ExtraitDeParfum > Concentration::Parfum);
        assert!(Concentration::Parfum > Concentration::EauDeParfum);
        assert!(Concentration::EauDeParfum > Concentration::EauDeToilette);
        assert!(Concentration::EauDeToilette > Concentration::EauDeCologne);
        assert!(Concentration::EauDeCologne > Concentration::EauFraiche);
        assert!(Concentration::EauFraiche > Concentration::Unknown);
    }

    #[test]
    fn test_codes() {
        assert_eq!(Concentration::EauFraiche.code(), 0);
        assert_eq!(Concentration::Parfum.code(), 4);
        assert_eq!(Concentration::Unknown.code(), -1);
        assert_eq!(Concentration::from_code(3), Some(Concentration::EauDeParfum));
        assert_eq!(Concentration::from_code(42), None);
    }

    #[test]
    fn test_serializes_as_display_name() {
        let json = serde_json::to_string(&Concentration::EauDeParfum).unwrap();
        assert_eq!(json, "\"Eau De Parfum\"");
    }
}
