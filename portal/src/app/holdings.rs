//! Owned investments and portfolios, refreshed in the background.

use crate::app::events::{publish, AppEvent};
use crate::app::refresh::RefreshTimer;
use crate::core::error::Result;
use crate::core::service::PortfolioService;
use async_channel::Sender;
use parking_lot::RwLock;
use rust_decimal::Decimal;
use shared::{Investment, Portfolio};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HoldingsState {
    pub investments: Vec<Investment>,
    pub portfolios: Vec<Portfolio>,
    pub error: Option<String>,
}

impl HoldingsState {
    pub fn total_value(&self) -> Decimal {
        self.investments.iter().map(|i| i.current_value).sum()
    }

    pub fn total_gain_loss(&self) -> Decimal {
        self.investments.iter().map(Investment::gain_loss).sum()
    }
}

pub struct HoldingsStore {
    state: RwLock<HoldingsState>,
    api: Arc<dyn PortfolioService>,
    events: Option<Sender<AppEvent>>,
}

impl HoldingsStore {
    pub fn new(api: Arc<dyn PortfolioService>) -> Self {
        Self {
            state: RwLock::new(HoldingsState::default()),
            api,
            events: None,
        }
    }

    pub fn with_events(mut self, tx: Sender<AppEvent>) -> Self {
        self.events = Some(tx);
        self
    }

    pub fn snapshot(&self) -> HoldingsState {
        self.state.read().clone()
    }

    pub fn holding(&self, id: &str) -> Option<Investment> {
        self.state.read().investments.iter().find(|i| i.id == id).cloned()
    }

    /// Fetch investments and portfolios together. On failure the previous
    /// data is kept and the error recorded.
    pub async fn load(&self) -> Result<()> {
        let (investments, portfolios) = tokio::join!(self.api.list_investments(), self.api.list_portfolios());

        let loaded = investments.and_then(|i| portfolios.map(|p| (i, p)));
        let mut state = self.state.write();
        match loaded {
            Ok((investments, portfolios)) => {
                tracing::debug!(
                    investments = investments.len(),
                    portfolios = portfolios.len(),
                    "Holdings loaded"
                );
                state.investments = investments;
                state.portfolios = portfolios;
                state.error = None;
                let total = state.investments.len() as u64;
                drop(state);
                publish(self.events.as_ref(), AppEvent::ListRefreshed { source: "holdings", total });
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "Holdings refresh failed");
                state.error = Some(e.user_message("Failed to load investments"));
                Err(e)
            }
        }
    }

    pub fn clear(&self) {
        *self.state.write() = HoldingsState::default();
    }

    /// Reload every `period` while the returned timer is alive.
    pub fn start_auto_refresh(self: &Arc<Self>, period: Duration) -> RefreshTimer {
        let store = Arc::downgrade(self);
        RefreshTimer::start(period, move || {
            let store = store.clone();
            async move {
                if let Some(store) = store.upgrade() {
                    let _ = store.load().await;
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::PortalError;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use rust_decimal_macros::dec;
    use shared::{InvestmentType, RiskLevel};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn holding(id: &str, quantity: Decimal, purchase: Decimal, current: Decimal) -> Investment {
        Investment {
            id: id.to_string(),
            name: format!("Holding {}", id),
            symbol: id.to_uppercase(),
            investment_type: InvestmentType::Stock,
            quantity,
            purchase_price: purchase,
            current_price: current,
            current_value: current * quantity,
            risk_level: RiskLevel::Medium,
            minimum_investment: None,
            maximum_investment: None,
            portfolio_id: None,
            purchase_date: None,
        }
    }

    struct MockPortfolios {
        investments: Mutex<Result<Vec<Investment>>>,
        loads: AtomicUsize,
    }

    #[async_trait]
    impl PortfolioService for MockPortfolios {
        async fn list_investments(&self) -> Result<Vec<Investment>> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            self.investments.lock().clone()
        }

        async fn list_portfolios(&self) -> Result<Vec<Portfolio>> {
            Ok(vec![Portfolio {
                id: "p1".to_string(),
                name: "Main".to_string(),
                total_value: dec!(0),
                total_gain_loss: dec!(0),
                investments: Vec::new(),
            }])
        }
    }

    fn mock(investments: Result<Vec<Investment>>) -> Arc<MockPortfolios> {
        Arc::new(MockPortfolios {
            investments: Mutex::new(investments),
            loads: AtomicUsize::new(0),
        })
    }

    #[tokio::test]
    async fn test_load_and_totals() {
        let api = mock(Ok(vec![
            holding("aapl", dec!(10), dec!(150), dec!(170)),
            holding("tsla", dec!(2), dec!(250), dec!(200)),
        ]));
        let store = HoldingsStore::new(api);

        store.load().await.unwrap();
        let state = store.snapshot();

        assert_eq!(state.portfolios.len(), 1);
        assert_eq!(state.total_value(), dec!(2100));
        assert_eq!(state.total_gain_loss(), dec!(100));
        assert_eq!(store.holding("tsla").unwrap().quantity, dec!(2));
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_previous_data() {
        let api = mock(Ok(vec![holding("aapl", dec!(1), dec!(100), dec!(110))]));
        let store = HoldingsStore::new(api.clone());
        store.load().await.unwrap();

        *api.investments.lock() = Err(PortalError::Network("connection refused".to_string()));
        assert!(store.load().await.is_err());

        let state = store.snapshot();
        assert_eq!(state.investments.len(), 1);
        assert_eq!(state.error.as_deref(), Some("Failed to load investments"));
    }

    #[tokio::test]
    async fn test_auto_refresh_stops_with_timer() {
        let api = mock(Ok(Vec::new()));
        let store = Arc::new(HoldingsStore::new(api.clone()));

        let timer = store.start_auto_refresh(Duration::from_millis(25));
        tokio::time::sleep(Duration::from_millis(90)).await;
        drop(timer);
        let loads = api.loads.load(Ordering::SeqCst);
        assert!(loads >= 2);

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(api.loads.load(Ordering::SeqCst), loads);
    }
}
