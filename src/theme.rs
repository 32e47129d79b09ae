//! Light/dark display preference.
//!
//! The preference is a single persisted flag in the config file. When the
//! flag is absent, the effective theme falls back to the terminal's own
//! color scheme (best-effort, via `COLORFGBG`).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    /// Terminal color-scheme preference, or `Light` when it cannot be told.
    pub fn system_preference() -> Self {
        std::env::var("COLORFGBG")
            .ok()
            .and_then(|v| from_colorfgbg(&v))
            .unwrap_or(Self::Light)
    }
}

/// Parse the `COLORFGBG` convention ("foreground;background"). Background
/// colors 0-6 and 8 are the dark half of the 16-color palette.
fn from_colorfgbg(value: &str) -> Option<Theme> {
    let bg: u8 = value.rsplit(';').next()?.trim().parse().ok()?;
    Some(if bg <= 6 || bg == 8 {
        Theme::Dark
    } else {
        Theme::Light
    })
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Light => write!(f, "light"),
            Self::Dark => write!(f, "dark"),
        }
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            other => Err(format!("unknown theme '{other}' (expected light or dark)")),
        }
    }
}
