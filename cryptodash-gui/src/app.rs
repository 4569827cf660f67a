use cryptodash_core::format::{format_percent, format_usd};
use cryptodash_core::{
    CoinDetail, CryptoListController, CryptoSummary, Dashboard, FetchOutcome, ListView,
    PendingFetch,
};
use iced::widget::{Column, button, column, container, pick_list, row, scrollable, text};
use iced::{Element, Length, Task};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Home,
    Cryptocurrencies,
    CoinDetail,
}

#[derive(Debug, Clone)]
pub enum Message {
    ShowHome,
    ShowCryptocurrencies,
    TopLoaded(FetchOutcome<CryptoSummary>),
    ListLoaded(FetchOutcome<CryptoSummary>),

    // Paging for the full list
    NextPage,
    PrevPage,
    PageSizeSelected(usize),
    Refresh,

    OpenCoin(String),
    CoinLoaded(String, Result<CoinDetail, String>),
    Logout,
}

pub struct AppState {
    dashboard: Dashboard,
    screen: Screen,
    top: CryptoListController,
    list: CryptoListController,
    requested_coin: Option<String>,
    coin: Option<CoinDetail>,
    error_message: Option<String>,
}

impl AppState {
    pub fn new(dashboard: Dashboard) -> Self {
        Self {
            top: dashboard.top_cryptos(),
            list: dashboard.crypto_list(),
            dashboard,
            screen: Screen::Home,
            requested_coin: None,
            coin: None,
            error_message: None,
        }
    }
}

fn load_top(pending: PendingFetch<CryptoSummary>) -> Task<Message> {
    Task::perform(pending.run(), Message::TopLoaded)
}

fn load_list(pending: PendingFetch<CryptoSummary>) -> Task<Message> {
    Task::perform(pending.run(), Message::ListLoaded)
}

pub fn initialize(dashboard: Dashboard) -> (AppState, Task<Message>) {
    let mut state = AppState::new(dashboard);
    let task = load_top(state.top.refresh());
    (state, task)
}

pub fn update(state: &mut AppState, message: Message) -> Task<Message> {
    match message {
        Message::ShowHome => {
            state.screen = Screen::Home;
            state.error_message = None;
        }
        Message::ShowCryptocurrencies => {
            state.screen = Screen::Cryptocurrencies;
            state.error_message = None;
            // First visit mounts the list
            if state.list.last_page().is_none() && !state.list.is_loading() {
                return load_list(state.list.refresh());
            }
        }
        Message::TopLoaded(outcome) => {
            state.top.complete(outcome);
        }
        Message::ListLoaded(outcome) => {
            if !state.list.complete(outcome) {
                log::debug!("Ignored out-of-date list response");
            }
        }
        Message::NextPage => {
            let view = state.list.current_view();
            return load_list(state.list.set_page_index(view.page_index + 1));
        }
        Message::PrevPage => {
            let view = state.list.current_view();
            if view.page_index > 0 {
                return load_list(state.list.set_page_index(view.page_index - 1));
            }
        }
        Message::PageSizeSelected(size) => match state.list.set_page_size(size) {
            Ok(pending) => return load_list(pending),
            Err(e) => {
                log::warn!("{}", e);
                state.error_message = Some(e.to_string());
            }
        },
        Message::Refresh => {
            return match state.screen {
                Screen::Home => load_top(state.top.refresh()),
                _ => load_list(state.list.refresh()),
            };
        }
        Message::OpenCoin(coin_id) => {
            state.screen = Screen::CoinDetail;
            state.coin = None;
            state.error_message = None;
            state.requested_coin = Some(coin_id.clone());

            let dashboard = state.dashboard.clone();
            let requested = coin_id.clone();
            return Task::perform(
                async move {
                    dashboard
                        .coin_detail(&requested)
                        .await
                        .map_err(|e| e.to_string())
                },
                move |result| Message::CoinLoaded(coin_id.clone(), result),
            );
        }
        Message::CoinLoaded(coin_id, result) => {
            if state.requested_coin.as_deref() != Some(coin_id.as_str()) {
                log::debug!("Ignored detail for '{}', no longer selected", coin_id);
                return Task::none();
            }
            match result {
                Ok(coin) => state.coin = Some(coin),
                Err(e) => {
                    log::error!("Failed to load coin '{}': {}", coin_id, e);
                    state.error_message = Some(format!("Could not load {}: {}", coin_id, e));
                }
            }
        }
        Message::Logout => {
            state.dashboard.logout();
            state.screen = Screen::Home;
        }
    }

    Task::none()
}

pub fn view(state: &AppState) -> Element<'_, Message> {
    let mut nav = row![
        button("Home").on_press(Message::ShowHome).padding(5),
        button("Cryptocurrencies")
            .on_press(Message::ShowCryptocurrencies)
            .padding(5),
    ]
    .spacing(10);
    if state.dashboard.is_authenticated() {
        nav = nav.push(button("Logout").on_press(Message::Logout).padding(5));
    }

    let body: Element<'_, Message> = match state.screen {
        Screen::Home => home_view(&state.top.current_view()),
        Screen::Cryptocurrencies => list_view(
            &state.list.current_view(),
            state.list.page_sizes().as_slice(),
        ),
        Screen::CoinDetail => coin_view(state),
    };

    let mut content = column![nav, body].spacing(20);
    if let Some(error) = &state.error_message {
        content = content.push(text(error.clone()).size(14));
    }

    container(content).padding(20).into()
}

fn home_view<'a>(view: &ListView<CryptoSummary>) -> Element<'a, Message> {
    let body: Element<'a, Message> = if view.is_loading && view.items.is_empty() {
        text("Loading...").into()
    } else {
        coin_table(&view.items, 0)
    };

    let mut content = column![text("Top 10 cryptocurrencies").size(24), body].spacing(10);
    if let Some(failure) = &view.failure {
        content = content.push(text(failure.to_string()).size(14));
    }
    content.into()
}

fn list_view<'a>(view: &ListView<CryptoSummary>, sizes: &[usize]) -> Element<'a, Message> {
    let window = view.window();

    let table: Element<'a, Message> = if view.is_loading && view.items.is_empty() {
        text("Loading...").into()
    } else {
        coin_table(&view.items, view.page_index.saturating_mul(view.page_size))
    };

    let controls = row![
        text("Rows per page:").size(14),
        pick_list(sizes.to_vec(), Some(view.page_size), Message::PageSizeSelected),
        text(window.displayed_rows_label()).size(14),
        button("Previous")
            .on_press_maybe(window.can_go_prev().then_some(Message::PrevPage))
            .padding(5),
        button("Next")
            .on_press_maybe(window.can_go_next().then_some(Message::NextPage))
            .padding(5),
        button("Refresh").on_press(Message::Refresh).padding(5),
    ]
    .spacing(10);

    let status: Element<'a, Message> = match (&view.failure, view.is_loading) {
        (Some(failure), _) => text(failure.to_string()).size(14).into(),
        (None, true) => text("Loading...").size(14).into(),
        (None, false) => text("").size(14).into(),
    };

    column![
        text("Cryptocurrencies").size(24),
        scrollable(table).height(Length::Fill),
        controls,
        status,
    ]
    .spacing(10)
    .into()
}

fn coin_table<'a>(items: &[CryptoSummary], offset: usize) -> Element<'a, Message> {
    let header: Element<'a, Message> = row![
        text("#").width(Length::Fixed(40.0)),
        text("Name (Symbol)").width(Length::FillPortion(3)),
        text("Price").width(Length::FillPortion(2)),
        text("Market Cap").width(Length::FillPortion(3)),
        text("24h High").width(Length::FillPortion(2)),
        text("24h Low").width(Length::FillPortion(2)),
        text("24h Change").width(Length::FillPortion(2)),
        text("Volume").width(Length::FillPortion(3)),
    ]
    .spacing(10)
    .into();

    let rows = items.iter().enumerate().map(|(i, coin)| -> Element<'a, Message> {
        button(
            row![
                text(format!("{}", offset + i + 1)).width(Length::Fixed(40.0)),
                text(format!("{} ({})", coin.name, coin.symbol.to_uppercase()))
                    .width(Length::FillPortion(3)),
                text(format_usd(coin.current_price)).width(Length::FillPortion(2)),
                text(format_usd(coin.market_cap)).width(Length::FillPortion(3)),
                text(format_usd(coin.high_24h)).width(Length::FillPortion(2)),
                text(format_usd(coin.low_24h)).width(Length::FillPortion(2)),
                text(format_usd(coin.price_change_24h)).width(Length::FillPortion(2)),
                text(format_usd(coin.total_volume)).width(Length::FillPortion(3)),
            ]
            .spacing(10),
        )
        .on_press(Message::OpenCoin(coin.id.clone()))
        .width(Length::Fill)
        .into()
    });

    Column::with_children(std::iter::once(header).chain(rows))
        .spacing(4)
        .into()
}

fn coin_view(state: &AppState) -> Element<'_, Message> {
    let Some(coin) = &state.coin else {
        return if state.error_message.is_some() {
            text("").into()
        } else {
            text("Loading...").into()
        };
    };

    let mut details = column![
        text(format!("{} ({})", coin.name, coin.symbol.to_uppercase())).size(28),
        text(coin.description.en.trim().to_string()).size(14),
        text(format!(
            "Sentiment votes up: {}   down: {}",
            format_percent(coin.sentiment_votes_up_percentage),
            format_percent(coin.sentiment_votes_down_percentage)
        )),
    ]
    .spacing(10);

    if !coin.categories.is_empty() {
        details = details.push(text(format!("Categories: {}", coin.categories.join(", "))));
    }
    if let Some(score) = coin.developer_score {
        details = details.push(text(format!("Developer score: {:.1}", score)));
    }
    if let Some(score) = coin.community_score {
        details = details.push(text(format!("Community score: {:.1}", score)));
    }

    match coin.market_data() {
        Ok(market) => {
            let usd = |amount: Option<f64>| amount.map(format_usd).unwrap_or_else(|| "-".to_string());
            details = details.push(
                column![
                    text("Market data").size(20),
                    text(format!("Current price: {}", usd(market.current_price.usd))),
                    text(format!("Market cap: {}", usd(market.market_cap.usd))),
                    text(format!("24h high: {}", usd(market.high_24h.usd))),
                    text(format!("24h low: {}", usd(market.low_24h.usd))),
                    text(format!("Total volume: {}", usd(market.total_volume.usd))),
                    text(format!(
                        "Market cap rank: {}",
                        market
                            .market_cap_rank
                            .map(|rank| format!("#{}", rank))
                            .unwrap_or_else(|| "-".to_string())
                    )),
                ]
                .spacing(4),
            );
        }
        Err(e) => log::warn!("No market data for {}: {}", coin.name, e),
    }

    for link in &coin.links {
        details = details.push(text(format!("{}: {}", link.label(), link.link_value)).size(14));
    }

    scrollable(details).height(Length::Fill).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use cryptodash_core::{DashConfig, FailureKind, FetchFailure, MemorySession, PageRequest};
    use std::sync::Arc;

    fn state() -> AppState {
        let dashboard =
            Dashboard::new(DashConfig::default(), Arc::new(MemorySession::new())).unwrap();
        AppState::new(dashboard)
    }

    fn failed_outcome(tag: u64) -> FetchOutcome<CryptoSummary> {
        FetchOutcome {
            tag,
            request: PageRequest {
                page_index: 0,
                page_size: 10,
                sort_by: "id".to_string(),
            },
            result: Err(FetchFailure {
                kind: FailureKind::Transport,
                message: "offline".to_string(),
            }),
        }
    }

    #[test]
    fn test_page_size_change_goes_back_to_first_page() {
        let mut state = state();
        let _ = update(&mut state, Message::NextPage);
        let _ = update(&mut state, Message::NextPage);
        assert_eq!(state.list.query().page_index, 2);

        let _ = update(&mut state, Message::PageSizeSelected(20));
        assert_eq!(state.list.query().page_index, 0);
        assert_eq!(state.list.query().page_size, 20);
    }

    #[test]
    fn test_unsupported_page_size_shows_error() {
        let mut state = state();
        let _ = update(&mut state, Message::PageSizeSelected(7));
        assert!(state.error_message.is_some());
        assert_eq!(state.list.query().page_size, 10);
    }

    #[test]
    fn test_stale_coin_detail_is_ignored() {
        let mut state = state();
        let _ = update(&mut state, Message::OpenCoin("bitcoin".to_string()));
        let _ = update(&mut state, Message::OpenCoin("ethereum".to_string()));

        let _ = update(
            &mut state,
            Message::CoinLoaded("bitcoin".to_string(), Err("timeout".to_string())),
        );
        assert!(state.error_message.is_none());
        assert_eq!(state.requested_coin.as_deref(), Some("ethereum"));
    }

    #[test]
    fn test_list_failure_is_surfaced_in_view() {
        let mut state = state();
        let _ = update(&mut state, Message::ShowCryptocurrencies);
        assert!(state.list.is_loading());

        let _ = update(&mut state, Message::ListLoaded(failed_outcome(1)));
        let view = state.list.current_view();
        assert!(!view.is_loading);
        assert_eq!(view.failure.map(|f| f.kind), Some(FailureKind::Transport));
    }
}
