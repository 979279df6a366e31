//! Visual themes and their background catalogues.
//!
//! Each [`Theme`] owns a fixed, ordered set of background images. The first
//! image of a theme is the one selected whenever the theme is (re)selected.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::qr::QrColors;

const ANIME_BACKGROUNDS: [&str; 3] = [
    "https://images.unsplash.com/photo-1578632767115-351597cf2477?auto=format&fit=crop&w=800&q=80",
    "https://images.unsplash.com/photo-1541562232579-512a21360020?auto=format&fit=crop&w=800&q=80",
    "https://images.unsplash.com/photo-1560972550-aba3456b5564?auto=format&fit=crop&w=800&q=80",
];

const CARTOON_BACKGROUNDS: [&str; 3] = [
    "https://images.unsplash.com/photo-1569982175971-d92b01cf8694?auto=format&fit=crop&w=800&q=80",
    "https://images.unsplash.com/photo-1566577134770-3d85bb3a9cc4?auto=format&fit=crop&w=800&q=80",
    "https://images.unsplash.com/photo-1550747545-c896b5f89ff7?auto=format&fit=crop&w=800&q=80",
];

// ============================================================================
// Theme
// ============================================================================

/// A named visual category controlling which backgrounds are offered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Theme {
    /// The first category, selected on startup.
    #[default]
    Anime,
    /// The second category.
    Cartoon,
}

impl Theme {
    /// Every theme, in the order a picker shows them.
    pub const ALL: [Theme; 2] = [Theme::Anime, Theme::Cartoon];

    /// Returns this theme's background image URLs, in display order.
    pub fn backgrounds(self) -> &'static [&'static str] {
        match self {
            Self::Anime => &ANIME_BACKGROUNDS,
            Self::Cartoon => &CARTOON_BACKGROUNDS,
        }
    }

    /// Returns the background selected when this theme becomes active.
    pub fn first_background(self) -> &'static str {
        self.backgrounds()[0]
    }

    /// Returns true if `url` is one of this theme's own backgrounds.
    pub fn owns(self, url: &str) -> bool {
        self.backgrounds().contains(&url)
    }

    /// Looks up a background by its position in the theme's list.
    pub fn background_at(self, index: usize) -> Option<&'static str> {
        self.backgrounds().get(index).copied()
    }

    /// Button label for the theme picker.
    pub fn label(self) -> &'static str {
        match self {
            Self::Anime => "Anime Style",
            Self::Cartoon => "Cartoon Style",
        }
    }

    /// Colors the QR graphic is drawn with under this theme.
    pub fn qr_colors(self) -> QrColors {
        // Both themes draw black modules on a see-through background.
        match self {
            Self::Anime | Self::Cartoon => QrColors::default(),
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::Anime => "anime",
            Self::Cartoon => "cartoon",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when parsing an unknown theme name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown theme `{0}` (expected `anime` or `cartoon`)")]
pub struct UnknownTheme(pub String);

impl FromStr for Theme {
    type Err = UnknownTheme;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Theme::ALL
            .into_iter()
            .find(|theme| theme.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownTheme(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_theme_has_three_backgrounds() {
        for theme in Theme::ALL {
            assert_eq!(theme.backgrounds().len(), 3);
            assert_eq!(theme.first_background(), theme.backgrounds()[0]);
        }
    }

    #[test]
    fn background_sets_are_disjoint() {
        for url in Theme::Anime.backgrounds() {
            assert!(Theme::Anime.owns(url));
            assert!(!Theme::Cartoon.owns(url));
        }
        for url in Theme::Cartoon.backgrounds() {
            assert!(!Theme::Anime.owns(url));
        }
    }

    #[test]
    fn parse_and_display() {
        assert_eq!("anime".parse::<Theme>().unwrap(), Theme::Anime);
        assert_eq!(" Cartoon ".parse::<Theme>().unwrap(), Theme::Cartoon);
        assert!("pixel-art".parse::<Theme>().is_err());
        assert_eq!(Theme::Cartoon.to_string(), "cartoon");
    }

    #[test]
    fn background_at_bounds() {
        assert_eq!(Theme::Cartoon.background_at(2), Some(CARTOON_BACKGROUNDS[2]));
        assert_eq!(Theme::Cartoon.background_at(3), None);
    }
}
