pub mod dom;
pub mod font_size;
pub mod storage;
pub mod theme;
pub mod theme_toggle;
