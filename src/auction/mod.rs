pub mod entity;
pub mod store;

pub use entity::{Auction, AuctionStatus, NewAuction, ProductCondition};
pub use store::{AuctionFilter, AuctionStore, CloseOutcome};
