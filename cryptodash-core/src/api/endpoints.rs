use super::{client::ApiClient, models::*};
use crate::controller::ListDataSource;
use crate::error::DashError;
use crate::pagination::{Page, PageRequest, PageResponse};
use async_trait::async_trait;
use log::debug;
use std::sync::Arc;

const CRYPTO_LIST_PATH: &[&str] = &["api", "v1", "crypto", "all"];
const COIN_DETAIL_PATH: &[&str] = &["api", "v1", "crypto", "details"];

impl ApiClient {
    pub async fn get_crypto_page(
        &self,
        request: &PageRequest,
    ) -> Result<Page<CryptoSummary>, DashError> {
        let mut url = self.endpoint(CRYPTO_LIST_PATH)?;
        url.query_pairs_mut()
            .append_pair("page", &request.page_index.to_string())
            .append_pair("size", &request.page_size.to_string())
            .append_pair("sortBy", &request.sort_by);

        let response: PageResponse<CryptoSummary> = self.get_json(url).await?;
        debug!(
            "received {} coins for page {} ({} total)",
            response.content.len(),
            request.page_index,
            response.total_elements
        );
        Ok(Page::from_response(request, response))
    }

    pub async fn get_coin_detail(&self, coin_id: &str) -> Result<CoinDetail, DashError> {
        let coin_id = coin_id.trim();
        if coin_id.is_empty() {
            return Err(DashError::InvalidData("coin id must not be empty".to_string()));
        }

        let mut segments = COIN_DETAIL_PATH.to_vec();
        segments.push(coin_id);
        let url = self.endpoint(&segments)?;
        self.get_json(url).await
    }
}

/// The paginated cryptocurrency listing as a [`ListDataSource`].
#[derive(Debug, Clone)]
pub struct CryptoListSource {
    client: Arc<ApiClient>,
}

impl CryptoListSource {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ListDataSource for CryptoListSource {
    type Item = CryptoSummary;

    async fn fetch_page(&self, request: &PageRequest) -> Result<Page<CryptoSummary>, DashError> {
        self.client.get_crypto_page(request).await
    }
}
