use std::fs;

use ratatui::style::Color;
use rust_embed::Embed;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Embed)]
#[folder = "assets/themes/"]
struct ThemeAssets;

pub const DEFAULT_THEME: &str = "terminal-default";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Theme {
    pub name: String,
    pub colors: ThemeColors,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ThemeColors {
    pub bg: String,
    pub fg: String,
    pub muted: String,
    pub accent: String,
    pub border: String,
    pub border_focused: String,
    pub header_bg: String,
    pub header_fg: String,
    pub correct: String,
    pub incorrect: String,
    pub incorrect_bg: String,
    pub selected: String,
    pub matched: String,
    pub bar_filled: String,
    pub bar_empty: String,
}

impl Theme {
    /// User themes in `<config_dir>/lingodrill/themes/` shadow bundled ones.
    pub fn load(name: &str) -> Option<Self> {
        let filename = format!("{name}.toml");

        if let Some(config_dir) = dirs::config_dir() {
            let user_theme_path = config_dir.join("lingodrill").join("themes").join(&filename);
            if let Ok(content) = fs::read_to_string(&user_theme_path)
                && let Ok(theme) = toml::from_str::<Theme>(&content)
            {
                debug!(target: "lingodrill::ui", theme = name, "loaded user theme");
                return Some(theme);
            }
        }

        let file = ThemeAssets::get(&filename)?;
        let content = std::str::from_utf8(file.data.as_ref()).ok()?;
        toml::from_str::<Theme>(content).ok()
    }

    pub fn available_themes() -> Vec<String> {
        ThemeAssets::iter()
            .filter_map(|f| f.strip_suffix(".toml").map(|n| n.to_string()))
            .collect()
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::load(DEFAULT_THEME).unwrap_or_else(|| Self {
            name: "default".to_string(),
            colors: ThemeColors::default(),
        })
    }
}

impl Default for ThemeColors {
    fn default() -> Self {
        Self {
            bg: "#1e1e2e".to_string(),
            fg: "#cdd6f4".to_string(),
            muted: "#6c7086".to_string(),
            accent: "#89b4fa".to_string(),
            border: "#45475a".to_string(),
            border_focused: "#89b4fa".to_string(),
            header_bg: "#313244".to_string(),
            header_fg: "#cdd6f4".to_string(),
            correct: "#a6e3a1".to_string(),
            incorrect: "#f38ba8".to_string(),
            incorrect_bg: "#45273a".to_string(),
            selected: "#f9e2af".to_string(),
            matched: "#94e2d5".to_string(),
            bar_filled: "#89b4fa".to_string(),
            bar_empty: "#313244".to_string(),
        }
    }
}

impl ThemeColors {
    pub fn parse_color(hex: &str) -> Color {
        let hex = hex.trim_start_matches('#');
        if hex.len() == 6
            && let (Ok(r), Ok(g), Ok(b)) = (
                u8::from_str_radix(&hex[0..2], 16),
                u8::from_str_radix(&hex[2..4], 16),
                u8::from_str_radix(&hex[4..6], 16),
            )
        {
            return Color::Rgb(r, g, b);
        }
        Color::Reset
    }

    pub fn bg(&self) -> Color { Self::parse_color(&self.bg) }
    pub fn fg(&self) -> Color { Self::parse_color(&self.fg) }
    pub fn muted(&self) -> Color { Self::parse_color(&self.muted) }
    pub fn accent(&self) -> Color { Self::parse_color(&self.accent) }
    pub fn border(&self) -> Color { Self::parse_color(&self.border) }
    pub fn border_focused(&self) -> Color { Self::parse_color(&self.border_focused) }
    pub fn header_bg(&self) -> Color { Self::parse_color(&self.header_bg) }
    pub fn header_fg(&self) -> Color { Self::parse_color(&self.header_fg) }
    pub fn correct(&self) -> Color { Self::parse_color(&self.correct) }
    pub fn incorrect(&self) -> Color { Self::parse_color(&self.incorrect) }
    pub fn incorrect_bg(&self) -> Color { Self::parse_color(&self.incorrect_bg) }
    pub fn selected(&self) -> Color { Self::parse_color(&self.selected) }
    pub fn matched(&self) -> Color { Self::parse_color(&self.matched) }
    pub fn bar_filled(&self) -> Color { Self::parse_color(&self.bar_filled) }
    pub fn bar_empty(&self) -> Color { Self::parse_color(&self.bar_empty) }
}
