pub mod data_set;
pub mod fetch_state;
pub mod media_item;

pub use data_set::*;
pub use fetch_state::*;
pub use media_item::*;
