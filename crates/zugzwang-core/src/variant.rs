//! Chess rule variants.

use std::fmt;
use std::str::FromStr;

/// Which rule set governs move legality and game termination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variant {
    Standard,
    Atomic,
    Antichess,
    ThreeCheck,
}

impl Variant {
    /// All variants, in no particular order.
    pub const ALL: [Variant; 4] = [
        Variant::Standard,
        Variant::Atomic,
        Variant::Antichess,
        Variant::ThreeCheck,
    ];
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Variant::Standard => "standard",
            Variant::Atomic => "atomic",
            Variant::Antichess => "antichess",
            Variant::ThreeCheck => "threeCheck",
        };
        write!(f, "{s}")
    }
}

/// Error returned when parsing an unrecognized variant name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown variant: {0}")]
pub struct UnknownVariant(pub String);

impl FromStr for Variant {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Variant, UnknownVariant> {
        match s {
            "standard" => Ok(Variant::Standard),
            "atomic" => Ok(Variant::Atomic),
            "antichess" => Ok(Variant::Antichess),
            "threeCheck" => Ok(Variant::ThreeCheck),
            other => Err(UnknownVariant(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_wire_names() {
        assert_eq!(Variant::Standard.to_string(), "standard");
        assert_eq!(Variant::Atomic.to_string(), "atomic");
        assert_eq!(Variant::Antichess.to_string(), "antichess");
        assert_eq!(Variant::ThreeCheck.to_string(), "threeCheck");
    }

    #[test]
    fn from_str_roundtrip() {
        for v in Variant::ALL {
            assert_eq!(v.to_string().parse::<Variant>().unwrap(), v);
        }
    }

    #[test]
    fn from_str_rejects_unknown() {
        assert!("chess960".parse::<Variant>().is_err());
    }
}
