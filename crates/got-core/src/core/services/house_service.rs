//! "Get houses" use case.

use async_trait::async_trait;

use super::paged_feed::PageSource;
use crate::api::client::{ApiCall, IceAndFireClient};
use crate::api::models::{House, Page};
use crate::error::ApiError;
use crate::networking::{Call, RequestStatus};

pub type HousesStatus = RequestStatus<Vec<House>, String>;

/// Fetches pages of houses through [`IceAndFireClient`].
#[derive(Clone)]
pub struct HouseService {
    client: IceAndFireClient,
    page_size: u32,
}

impl HouseService {
    pub fn new(client: IceAndFireClient, page_size: u32) -> Self {
        Self { client, page_size }
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// The call for `page`, not yet enqueued. Callers that need to cancel
    /// keep this around.
    pub fn houses_call(&self, page: u32) -> Result<ApiCall<Page<House>>, ApiError> {
        self.client.houses(page, self.page_size)
    }

    /// Fetches `page` and waits for the outcome.
    ///
    /// `None` only if the underlying call was canceled.
    pub async fn get_houses(&self, page: u32) -> Option<HousesStatus> {
        let call = match self.houses_call(page) {
            Ok(call) => call,
            Err(e) => {
                log::error!("Could not build houses request: {}", e);
                return Some(RequestStatus::UnknownError);
            }
        };

        call.enqueue()
            .await
            .map(|status| status.map(Page::into_items))
    }
}

#[async_trait]
impl PageSource for HouseService {
    type Item = House;
    type Error = String;

    async fn fetch_page(&self, page: u32) -> Option<HousesStatus> {
        self.get_houses(page).await
    }
}
