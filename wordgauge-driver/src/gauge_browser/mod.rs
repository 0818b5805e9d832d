pub mod driver;
pub mod pacing;
pub mod page;
pub mod stealth;
