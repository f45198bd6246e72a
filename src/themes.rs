//! Theme catalog
//!
//! The fixed set of narrative tones a story can be written in. Each theme
//! carries a display label, an icon glyph, and the style instruction that is
//! spliced into the generation prompt.

use crate::error::MicrofavolaError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier of a narrative tone
///
/// Serializes as its lowercase tag (`"noir"`, `"poetico"`, ...), which is
/// also the form stored in the history snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ThemeId {
    /// Dark, cynical, 1940s detective voice
    Noir,
    /// Magical and epic
    Fantasy,
    /// Futuristic, technological or alien settings
    Fantascienza,
    /// Unsettling atmosphere and a disorienting ending
    Horror,
    /// Lyrical, delicate, dreamy language
    #[default]
    Poetico,
    /// Funny, sarcastic, light
    Ironico,
}

impl ThemeId {
    /// All identifiers, in catalog order
    pub const ALL: [ThemeId; 6] = [
        ThemeId::Noir,
        ThemeId::Fantasy,
        ThemeId::Fantascienza,
        ThemeId::Horror,
        ThemeId::Poetico,
        ThemeId::Ironico,
    ];

    /// The string tag for this identifier
    ///
    /// # Examples
    ///
    /// ```
    /// use microfavola::themes::ThemeId;
    ///
    /// assert_eq!(ThemeId::Fantascienza.as_str(), "fantascienza");
    /// ```
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Noir => "noir",
            Self::Fantasy => "fantasy",
            Self::Fantascienza => "fantascienza",
            Self::Horror => "horror",
            Self::Poetico => "poetico",
            Self::Ironico => "ironico",
        }
    }

    /// The catalog record for this identifier
    pub fn theme(&self) -> &'static Theme {
        // every ThemeId has exactly one catalog row
        &THEMES[*self as usize]
    }
}

impl fmt::Display for ThemeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThemeId {
    type Err = MicrofavolaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        ThemeId::ALL
            .into_iter()
            .find(|id| id.as_str() == wanted)
            .ok_or_else(|| MicrofavolaError::UnknownTheme(s.to_string()))
    }
}

/// A narrative tone record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    /// Identifier
    pub id: ThemeId,
    /// Display label
    pub label: &'static str,
    /// Icon glyph shown next to the label
    pub icon: &'static str,
    /// Natural-language style instruction used to steer generation
    pub style: &'static str,
}

static THEMES: [Theme; 6] = [
    Theme {
        id: ThemeId::Noir,
        label: "Noir",
        icon: "🕵️",
        style: "Uno stile cupo, cinico, tipico dei detective degli anni 40.",
    },
    Theme {
        id: ThemeId::Fantasy,
        label: "Fantasy",
        icon: "🧙‍♂️",
        style: "Un mondo magico, epico e incantato.",
    },
    Theme {
        id: ThemeId::Fantascienza,
        label: "Sci-Fi",
        icon: "🚀",
        style: "Ambientazione futuristica, tecnologica o aliena.",
    },
    Theme {
        id: ThemeId::Horror,
        label: "Horror",
        icon: "👻",
        style: "Atmosfera inquietante, brividi e finale spiazzante.",
    },
    Theme {
        id: ThemeId::Poetico,
        label: "Poetico",
        icon: "✨",
        style: "Linguaggio lirico, delicato e sognante.",
    },
    Theme {
        id: ThemeId::Ironico,
        label: "Ironico",
        icon: "🎭",
        style: "Stile divertente, sarcastico e leggero.",
    },
];

/// The full catalog, in display order
pub fn catalog() -> &'static [Theme] {
    &THEMES
}

/// Look up a theme by its string identifier
///
/// Unknown identifiers yield `None`; callers fall back to an empty style.
///
/// # Examples
///
/// ```
/// use microfavola::themes;
///
/// assert_eq!(themes::find("noir").map(|t| t.label), Some("Noir"));
/// assert!(themes::find("western").is_none());
/// ```
pub fn find(id: &str) -> Option<&'static Theme> {
    THEMES.iter().find(|t| t.id.as_str() == id)
}

/// Style instruction for an identifier, or `""` when the theme is unknown
pub fn style_instruction(id: &str) -> &'static str {
    find(id).map(|t| t.style).unwrap_or("")
}
