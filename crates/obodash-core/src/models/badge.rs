use serde::{Deserialize, Serialize};

use super::status::CheckStatus;

pub const ODK_LOGO_SVG: &str = "<svg xmlns=\"http://www.w3.org/2000/svg\" viewBox=\"0 0 64 64\"><circle cx=\"32\" cy=\"32\" r=\"30\" fill=\"#2c6e9b\"/><text x=\"32\" y=\"40\" font-size=\"22\" text-anchor=\"middle\" fill=\"#fff\" font-family=\"sans-serif\">ODK</text></svg>";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BadgeColor {
    Green,
    Yellowgreen,
    Yellow,
    Orange,
    Red,
    Blue,
    Lightgrey,
}

impl BadgeColor {
    #[must_use]
    pub const fn for_status(status: CheckStatus) -> Self {
        match status {
            CheckStatus::Pass => Self::Green,
            CheckStatus::Info => Self::Blue,
            CheckStatus::Warn => Self::Yellow,
            CheckStatus::Error => Self::Red,
        }
    }

    #[must_use]
    pub fn for_score(score: f64) -> Self {
        if score >= 90.0 {
            Self::Green
        } else if score >= 70.0 {
            Self::Yellowgreen
        } else if score >= 50.0 {
            Self::Yellow
        } else if score >= 30.0 {
            Self::Orange
        } else {
            Self::Red
        }
    }
}

/// Shields.io endpoint badge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Badge {
    pub schema_version: u8,
    pub label: String,
    pub message: String,
    pub color: BadgeColor,
    pub logo_svg: String,
}

impl Badge {
    #[must_use]
    pub fn new(label: impl Into<String>, message: impl Into<String>, color: BadgeColor) -> Self {
        Self {
            schema_version: 1,
            label: label.into(),
            message: message.into(),
            color,
            logo_svg: ODK_LOGO_SVG.to_string(),
        }
    }
}
