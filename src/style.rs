//! Theme and background selection.

use crate::theme::Theme;

/// Error returned when a selection would break the theme/background pairing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StyleError {
    /// The background is not one of the active theme's images.
    #[error("background `{url}` does not belong to the {theme} theme")]
    ForeignBackground { theme: Theme, url: String },
}

/// A background offered by the picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackgroundChoice {
    pub index: usize,
    pub url: &'static str,
    pub selected: bool,
}

/// Owns the active theme and the background chosen within it.
///
/// The selected background is always one of the active theme's own images.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleSelector {
    theme: Theme,
    background: &'static str,
}

impl Default for StyleSelector {
    fn default() -> Self {
        Self::new(Theme::default())
    }
}

impl StyleSelector {
    /// Creates a selector with `theme` active and its first background chosen.
    pub fn new(theme: Theme) -> Self {
        Self {
            theme,
            background: theme.first_background(),
        }
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn background(&self) -> &'static str {
        self.background
    }

    /// Activates `theme` and resets the background to its first image.
    ///
    /// The reset happens even when `theme` is already active.
    pub fn select_theme(&mut self, theme: Theme) {
        self.theme = theme;
        self.background = theme.first_background();
    }

    /// Selects a background from the active theme.
    ///
    /// Leaves the selection unchanged and returns an error if `url` belongs
    /// to another theme or to no theme at all.
    pub fn select_background(&mut self, url: &str) -> Result<(), StyleError> {
        let found = self
            .theme
            .backgrounds()
            .iter()
            .copied()
            .find(|candidate| *candidate == url)
            .ok_or_else(|| StyleError::ForeignBackground {
                theme: self.theme,
                url: url.to_string(),
            })?;
        self.background = found;
        Ok(())
    }

    /// Selects a background by its position in the active theme's list.
    pub fn select_background_at(&mut self, index: usize) -> Result<(), StyleError> {
        let url = self
            .theme
            .background_at(index)
            .ok_or_else(|| StyleError::ForeignBackground {
                theme: self.theme,
                url: format!("#{index}"),
            })?;
        self.background = url;
        Ok(())
    }

    /// The active theme's backgrounds, flagged with the current selection.
    pub fn choices(&self) -> impl Iterator<Item = BackgroundChoice> + '_ {
        self.theme
            .backgrounds()
            .iter()
            .enumerate()
            .map(|(index, &url)| BackgroundChoice {
                index,
                url,
                selected: url == self.background,
            })
    }
}
