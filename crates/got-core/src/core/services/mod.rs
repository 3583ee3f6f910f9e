pub mod config_service;
pub mod house_service;
pub mod paged_feed;

pub use house_service::{HouseService, HousesStatus};
pub use paged_feed::{FeedState, FeedStatus, PageSource, PagedFeed};
