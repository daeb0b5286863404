pub mod constants;
pub mod data;
pub mod logger;
pub mod scroll;
pub mod time;
