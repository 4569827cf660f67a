pub mod api;
pub mod config;
pub mod controller;
pub mod error;
pub mod format;
pub mod pagination;
pub mod session;

pub use api::{ApiCall, ApiClient, CoinDetail, CoinLink, CryptoListSource, CryptoSummary, MarketData};
pub use config::DashConfig;
pub use controller::{
    FailureKind, FetchFailure, FetchOutcome, ListDataSource, ListStatus, ListView,
    PaginatedListController, PendingFetch,
};
pub use error::DashError;
pub use pagination::{ListQuery, Page, PageRequest, PageSizes, PageWindow};
pub use session::{MemorySession, SessionStore, global_session};

use std::sync::Arc;

/// Rows shown in the home page table.
pub const TOP_LIST_SIZE: usize = 10;

pub type CryptoListController = PaginatedListController<CryptoListSource>;

/// Main entry point for the display layers: builds list controllers and
/// one-shot lookups on top of a shared [`ApiClient`].
#[derive(Debug, Clone)]
pub struct Dashboard {
    client: Arc<ApiClient>,
    config: DashConfig,
}

impl Dashboard {
    pub fn new(config: DashConfig, session: Arc<dyn SessionStore>) -> Result<Self, DashError> {
        let client = Arc::new(ApiClient::new(&config, session)?);
        Ok(Dashboard { client, config })
    }

    /// Configuration from the environment, authenticated through the global session.
    pub fn from_env() -> Result<Self, DashError> {
        Self::new(DashConfig::from_env()?, global_session())
    }

    pub fn client(&self) -> &Arc<ApiClient> {
        &self.client
    }

    pub fn config(&self) -> &DashConfig {
        &self.config
    }

    /// The home page list: first page only, fixed size.
    pub fn top_cryptos(&self) -> CryptoListController {
        PaginatedListController::new(
            self.list_source(),
            PageSizes::fixed(TOP_LIST_SIZE),
            self.config.sort_key.clone(),
        )
    }

    /// The full, user-paginated cryptocurrency list.
    pub fn crypto_list(&self) -> CryptoListController {
        PaginatedListController::new(
            self.list_source(),
            self.config.page_sizes.clone(),
            self.config.sort_key.clone(),
        )
    }

    pub async fn coin_detail(&self, coin_id: &str) -> Result<CoinDetail, DashError> {
        self.client.get_coin_detail(coin_id).await
    }

    pub fn is_authenticated(&self) -> bool {
        self.client.session().is_authenticated()
    }

    pub fn logout(&self) {
        self.client.session().end();
    }

    fn list_source(&self) -> Arc<CryptoListSource> {
        Arc::new(CryptoListSource::new(Arc::clone(&self.client)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_controllers_use_configured_sizes() {
        let dashboard = Dashboard::new(DashConfig::default(), Arc::new(MemorySession::new())).unwrap();

        let top = dashboard.top_cryptos();
        assert_eq!(top.page_sizes().as_slice(), &[TOP_LIST_SIZE]);
        assert_eq!(top.query().page_size, 10);

        let list = dashboard.crypto_list();
        assert_eq!(list.page_sizes().as_slice(), &[10, 15, 20]);
        assert_eq!(list.query().page_index, 0);
    }

    #[test]
    fn test_logout_clears_injected_session() {
        let session = Arc::new(MemorySession::new());
        session.begin("token".to_string());
        let dashboard = Dashboard::new(DashConfig::default(), session.clone()).unwrap();
        assert!(dashboard.is_authenticated());

        dashboard.logout();
        assert!(!dashboard.is_authenticated());
        assert_eq!(session.token(), None);
    }
}
