use serde::{Deserialize, Serialize};

/// Setting keys the admin API may read and write.
pub const SETTING_KEYS: [&str; 4] = ["site_title", "footer_text", "social_facebook", "social_twitter"];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CmsSettings {
    pub site_title: Option<String>,
    pub footer_text: Option<String>,
    pub social_facebook: Option<String>,
    pub social_twitter: Option<String>,
}

impl CmsSettings {
    /// Builds settings from `(key, value)` pairs, ignoring unknown keys.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, Option<String>)>,
    {
        let mut settings = Self::default();
        for (key, value) in pairs {
            match key.as_str() {
                "site_title" => settings.site_title = value,
                "footer_text" => settings.footer_text = value,
                "social_facebook" => settings.social_facebook = value,
                "social_twitter" => settings.social_twitter = value,
                _ => {}
            }
        }
        settings
    }
}

pub fn is_setting_key(key: &str) -> bool {
    SETTING_KEYS.contains(&key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_pairs_ignores_unknown_keys() {
        let settings = CmsSettings::from_pairs(vec![
            ("site_title".to_string(), Some("Handbook".to_string())),
            ("theme".to_string(), Some("dark".to_string())),
            ("footer_text".to_string(), None),
        ]);

        assert_eq!(settings.site_title.as_deref(), Some("Handbook"));
        assert_eq!(settings.footer_text, None);
        assert!(is_setting_key("social_twitter"));
        assert!(!is_setting_key("theme"));
    }
}
