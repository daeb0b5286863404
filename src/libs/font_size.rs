use crate::libs::dom::{ require_element, BindError, Document, Element };
use crate::libs::storage::{ Storage, FONT_SIZE_KEY };
use log::{ debug, info, warn };
use std::fmt;
use std::rc::Rc;
use strum::{ EnumIter, IntoEnumIterator };

pub const FONT_SIZE_SWITCHER_ID: &str = "font-size-switcher";
const FONT_SIZE_PROPERTY: &str = "font-size";

/// Root font sizes the switcher steps through, smallest first
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, EnumIter)]
pub enum FontSize {
    #[default]
    Base,
    Large,
    ExtraLarge,
}

impl FontSize {
    pub fn px(self) -> u32 {
        match self {
            FontSize::Base => 16,
            FontSize::Large => 18,
            FontSize::ExtraLarge => 20,
        }
    }

    pub fn from_px(px: u32) -> Option<Self> {
        FontSize::iter().find(|size| size.px() == px)
    }

    /// 16 → 18 → 20 → 16
    pub fn next(self) -> Self {
        match self {
            FontSize::Base => FontSize::Large,
            FontSize::Large => FontSize::ExtraLarge,
            FontSize::ExtraLarge => FontSize::Base,
        }
    }

    /// Reads a stored pixel count such as `"18"` or `"018"`.
    pub fn parse_stored(value: &str) -> Option<Self> {
        value.trim().parse().ok().and_then(FontSize::from_px)
    }

    /// Like [`FontSize::parse_stored`], but anything outside the set resets to the base size.
    pub fn from_stored(value: &str) -> Self {
        FontSize::parse_stored(value).unwrap_or_default()
    }

    /// Reads an inline style value such as `"18px"` by its first two characters.
    pub fn from_css(value: &str) -> Option<Self> {
        value.get(..2)?.parse().ok().and_then(FontSize::from_px)
    }

    pub fn css_value(self) -> String {
        format!("{}px", self.px())
    }

    /// Get all available sizes
    pub fn all() -> Vec<FontSize> {
        FontSize::iter().collect()
    }
}

impl fmt::Display for FontSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}px", self.px())
    }
}

pub struct FontSizeSwitcher {
    root: Rc<dyn Element>,
    button: Rc<dyn Element>,
    storage: Rc<dyn Storage>,
}

impl FontSizeSwitcher {
    pub fn bind(document: &dyn Document, storage: Rc<dyn Storage>) -> Result<Self, BindError> {
        let button = require_element(document, FONT_SIZE_SWITCHER_ID)?;
        Ok(Self {
            root: document.root(),
            button,
            storage,
        })
    }

    pub fn button(&self) -> &Rc<dyn Element> {
        &self.button
    }

    /// The size the root currently carries, if it is one of ours
    pub fn current(&self) -> Option<FontSize> {
        self.root.style(FONT_SIZE_PROPERTY).as_deref().and_then(FontSize::from_css)
    }

    /// Restores the stored size. A bad stored value is reset to the base size
    /// and written back; nothing stored leaves the page alone. A supported size
    /// spelled differently (`"018"`) is kept and rewritten in canonical form.
    pub fn initialize(&self) -> Option<FontSize> {
        let stored = match self.storage.get(FONT_SIZE_KEY) {
            Ok(Some(value)) => value,
            Ok(None) => {
                return None;
            }
            Err(e) => {
                debug!("Font size preference unavailable: {}", e);
                return None;
            }
        };

        let size = match FontSize::parse_stored(&stored) {
            Some(size) => {
                if stored != size.px().to_string() {
                    debug!("Normalizing stored font size '{}' to {}", stored, size.px());
                    self.persist(size);
                }
                size
            }
            None => {
                let size = FontSize::default();
                warn!("⚠️ Stored font size '{}' is not supported, resetting to {}", stored, size);
                self.persist(size);
                size
            }
        };
        self.apply(size);
        Some(size)
    }

    /// Click handler: advances the root font size one step and remembers it.
    pub fn cycle(&self) -> FontSize {
        let next = match self.current() {
            Some(size) => size.next(),
            None => FontSize::default(),
        };

        self.persist(next);
        self.apply(next);
        info!("🔠 Font size set to {}", next);
        next
    }

    fn apply(&self, size: FontSize) {
        self.root.set_style(FONT_SIZE_PROPERTY, &size.css_value());
    }

    fn persist(&self, size: FontSize) {
        if let Err(e) = self.storage.set(FONT_SIZE_KEY, &size.px().to_string()) {
            warn!("⚠️ Failed to persist font size {}: {}", size, e);
        }
    }
}
