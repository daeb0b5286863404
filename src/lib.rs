//! Presentation helpers for the madin blog theme.
//!
//! The relative-date formatter and scroll helper are plain functions. The
//! theme toggle and font-size switcher are bound to an injected [`Document`]
//! and [`Storage`], so they run the same against a real page or a
//! [`VirtualDocument`].

pub mod libs;
pub mod state;
pub mod utils;

pub use libs::dom::{
    BindError,
    ColorSchemePreference,
    Document,
    Element,
    StaticPreference,
    VirtualDocument,
    VirtualElement,
};
pub use libs::font_size::{ FontSize, FontSizeSwitcher };
pub use libs::storage::{ JsonFileStorage, MemoryStorage, Storage, StorageError };
pub use libs::theme::Theme;
pub use libs::theme_toggle::{ SubscriptionId, ThemeSwitch, ThemeToggle };
pub use state::config::AppConfig;
pub use utils::scroll::{ scroll_percentage, scroll_percentage_of, ScrollMetrics };
pub use utils::time::{
    format_relative_time,
    format_relative_time_at,
    Clock,
    FixedClock,
    RelativeTimeFormatter,
    SystemClock,
    Timestamp,
    TimestampError,
};
