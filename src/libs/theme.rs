use crate::libs::dom::{ DARK_CLASS, Element };
use strum::{ Display, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr };

/// Color theme of the page. Stored and emitted as `"dark"` / `"light"`.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumIter,
    EnumString,
    IntoStaticStr
)]
#[strum(serialize_all = "lowercase")]
pub enum Theme {
    Dark,
    #[default]
    Light,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        self.into()
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }

    pub fn is_dark(self) -> bool {
        self == Theme::Dark
    }

    /// Get all available themes
    pub fn all() -> Vec<Theme> {
        Theme::iter().collect()
    }

    /// The theme the stylesheet is currently showing, judged by the root `dark` class
    pub fn from_root(root: &dyn Element) -> Self {
        if root.has_class(DARK_CLASS) { Theme::Dark } else { Theme::Light }
    }
}
