use crate::storage::KeyValueStore;

pub const THEME_KEY: &str = "theme";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            _ => None,
        }
    }
}

/// Stored light/dark choice. Without one, the system preference wins.
pub struct ThemePreference<'a> {
    store: &'a dyn KeyValueStore,
}

impl<'a> ThemePreference<'a> {
    pub fn new(store: &'a dyn KeyValueStore) -> Self {
        Self { store }
    }

    pub fn stored(&self) -> Option<Theme> {
        self.store.get(THEME_KEY).and_then(|value| Theme::parse(&value))
    }

    pub fn is_dark(&self, system_prefers_dark: bool) -> bool {
        match self.stored() {
            Some(theme) => theme == Theme::Dark,
            None => system_prefers_dark,
        }
    }

    /// Persists the opposite of what is currently shown.
    pub fn toggle(&self, currently_dark: bool) -> Theme {
        let theme = if currently_dark {
            Theme::Light
        } else {
            Theme::Dark
        };
        self.store.set(THEME_KEY, theme.as_str());
        theme
    }

    pub fn reset(&self) {
        self.store.remove(THEME_KEY);
    }
}
