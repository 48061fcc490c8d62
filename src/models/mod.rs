pub mod price_history;
pub mod product;

pub use price_history::PriceHistory;
pub use product::*;
