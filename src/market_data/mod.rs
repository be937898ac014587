pub mod bar_feed;
pub mod history;
pub mod price_window;

// Re-export for convenient access (e.g. `use crate::market_data::Bar`).
pub use bar_feed::parse_bar_event;
pub use history::load_history;
pub use price_window::{Bar, PriceWindow};
