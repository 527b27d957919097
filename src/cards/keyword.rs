//! Keywords.
//!
//! Keywords travel through card data in their printed form ("Ward",
//! "Resist +2", "Singer 4"). They are parsed once into `Keyword`; numeric
//! keywords read the number after the name, with or without a leading `+`.
//! Unrecognised text is preserved as `Keyword::Other` so nothing printed
//! on a card is lost.

use serde::{Deserialize, Serialize};

/// A keyword ability.
///
/// ```
/// use lore_engine::cards::Keyword;
///
/// assert_eq!(Keyword::parse("Resist +2"), Keyword::Resist(2));
/// assert_eq!(Keyword::parse("singer 5"), Keyword::Singer(5));
/// assert_eq!(Keyword::Challenger(3).to_string(), "Challenger +3");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum Keyword {
    Ward,
    Evasive,
    Bodyguard,
    Rush,
    Reckless,
    Support,
    Vanish,
    /// Damage dealt to this card is reduced by N.
    Resist(u32),
    /// +N strength while challenging.
    Challenger(u32),
    /// Counts as cost N for singing songs.
    Singer(u32),
    Shift(u32),
    Boost(u32),
    Other(String),
}

impl Keyword {
    /// Parse a printed keyword.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        let (name, rest) = match text.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (text, ""),
        };
        let number = rest.trim_start_matches('+').trim().parse::<u32>().ok();

        match (name.to_ascii_lowercase().as_str(), number) {
            ("ward", None) => Self::Ward,
            ("evasive", None) => Self::Evasive,
            ("bodyguard", None) => Self::Bodyguard,
            ("rush", None) => Self::Rush,
            ("reckless", None) => Self::Reckless,
            ("support", None) => Self::Support,
            ("vanish", None) => Self::Vanish,
            ("resist", Some(n)) => Self::Resist(n),
            ("challenger", Some(n)) => Self::Challenger(n),
            ("singer", Some(n)) => Self::Singer(n),
            ("shift", Some(n)) => Self::Shift(n),
            ("boost", Some(n)) => Self::Boost(n),
            _ => Self::Other(text.to_string()),
        }
    }

    /// Numeric value of a numbered keyword.
    #[must_use]
    pub fn value(&self) -> Option<u32> {
        match self {
            Self::Resist(n) | Self::Challenger(n) | Self::Singer(n) | Self::Shift(n) | Self::Boost(n) => {
                Some(*n)
            }
            _ => None,
        }
    }

    /// Same keyword ignoring its number ("Resist +1" is the same kind as "Resist +3").
    #[must_use]
    pub fn same_kind(&self, other: &Keyword) -> bool {
        match (self, other) {
            (Self::Other(a), Self::Other(b)) => a.eq_ignore_ascii_case(b),
            _ => std::mem::discriminant(self) == std::mem::discriminant(other),
        }
    }
}

impl std::fmt::Display for Keyword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ward => write!(f, "Ward"),
            Self::Evasive => write!(f, "Evasive"),
            Self::Bodyguard => write!(f, "Bodyguard"),
            Self::Rush => write!(f, "Rush"),
            Self::Reckless => write!(f, "Reckless"),
            Self::Support => write!(f, "Support"),
            Self::Vanish => write!(f, "Vanish"),
            Self::Resist(n) => write!(f, "Resist +{}", n),
            Self::Challenger(n) => write!(f, "Challenger +{}", n),
            Self::Singer(n) => write!(f, "Singer {}", n),
            Self::Shift(n) => write!(f, "Shift {}", n),
            Self::Boost(n) => write!(f, "Boost {}", n),
            Self::Other(text) => write!(f, "{}", text),
        }
    }
}

impl From<Keyword> for String {
    fn from(keyword: Keyword) -> Self {
        keyword.to_string()
    }
}

impl From<String> for Keyword {
    fn from(text: String) -> Self {
        Self::parse(&text)
    }
}

impl From<&str> for Keyword {
    fn from(text: &str) -> Self {
        Self::parse(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain() {
        assert_eq!(Keyword::parse("Ward"), Keyword::Ward);
        assert_eq!(Keyword::parse(" evasive "), Keyword::Evasive);
        assert_eq!(Keyword::parse("Support"), Keyword::Support);
    }

    #[test]
    fn test_parse_numeric_suffix() {
        assert_eq!(Keyword::parse("Resist +2"), Keyword::Resist(2));
        assert_eq!(Keyword::parse("Resist 1"), Keyword::Resist(1));
        assert_eq!(Keyword::parse("Challenger +3"), Keyword::Challenger(3));
        assert_eq!(Keyword::parse("Boost 2"), Keyword::Boost(2));
    }

    #[test]
    fn test_parse_unknown_is_preserved() {
        assert_eq!(Keyword::parse("Sparkle"), Keyword::Other("Sparkle".to_string()));
        // A numbered keyword without its number is not guessed at.
        assert_eq!(Keyword::parse("Resist"), Keyword::Other("Resist".to_string()));
    }

    #[test]
    fn test_display_round_trip() {
        for keyword in [
            Keyword::Ward,
            Keyword::Resist(4),
            Keyword::Singer(5),
            Keyword::Shift(3),
            Keyword::Other("Sparkle".to_string()),
        ] {
            assert_eq!(Keyword::parse(&keyword.to_string()), keyword);
        }
    }

    #[test]
    fn test_same_kind() {
        assert!(Keyword::Resist(1).same_kind(&Keyword::Resist(3)));
        assert!(!Keyword::Resist(1).same_kind(&Keyword::Challenger(1)));
    }

    #[test]
    fn test_serializes_as_printed_text() {
        let json = serde_json::to_string(&Keyword::Resist(2)).unwrap();
        assert_eq!(json, "\"Resist +2\"");
        let parsed: Keyword = serde_json::from_str("\"Singer 4\"").unwrap();
        assert_eq!(parsed, Keyword::Singer(4));
    }
}
