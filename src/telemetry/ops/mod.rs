pub mod feed;
pub mod stats;
pub mod inventory;
