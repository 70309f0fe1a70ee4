use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::domain::Steps;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PreviewMode {
    #[default]
    Desktop,
    Tablet,
    Mobile,
}

impl PreviewMode {
    pub const ALL: [PreviewMode; 3] = [PreviewMode::Desktop, PreviewMode::Tablet, PreviewMode::Mobile];

    pub fn as_str(self) -> &'static str {
        match self {
            PreviewMode::Desktop => "desktop",
            PreviewMode::Tablet => "tablet",
            PreviewMode::Mobile => "mobile",
        }
    }
}

impl fmt::Display for PreviewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PreviewMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        PreviewMode::ALL
            .into_iter()
            .find(|mode| mode.as_str().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| format!("unknown preview mode '{value}'"))
    }
}

/// The part of the builder that is resumed across runs; history is not kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub steps: Steps,
    #[serde(default)]
    pub form_title: String,
    #[serde(default)]
    pub form_description: String,
    #[serde(default)]
    pub theme: Theme,
    #[serde(default)]
    pub preview_mode: PreviewMode,
    #[serde(default)]
    pub form_id: Option<String>,
    #[serde(default)]
    pub current_step: usize,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn theme_toggles_back_and_forth() {
        assert_eq!(Theme::default().toggled(), Theme::Dark);
        assert_eq!(Theme::Dark.toggled(), Theme::Light);
    }

    #[test]
    fn preview_mode_parses_case_insensitively() {
        assert_eq!("Mobile".parse::<PreviewMode>(), Ok(PreviewMode::Mobile));
        assert!("watch".parse::<PreviewMode>().is_err());
    }

    #[test]
    fn session_uses_camel_case_keys() {
        let raw = json!({"steps": [[]], "formTitle": "Signup", "previewMode": "tablet"});
        let session: SessionState = serde_json::from_value(raw).unwrap();
        assert_eq!(session.form_title, "Signup");
        assert_eq!(session.preview_mode, PreviewMode::Tablet);
        assert_eq!(session.theme, Theme::Light);
        assert_eq!(session.form_id, None);
    }
}
