//! # Trade Wizard
//!
//! Buy/sell flow: `Input → Preview → Confirming → Done`.
//!
//! The input (cash amount for a buy, units for a sell) is bounds-checked before
//! a preview is requested, and again before confirming. When the preview
//! endpoint fails for any reason other than authentication, a local estimate
//! with a fixed fee is shown instead and marked `estimated`.
//!
//! [`PreviewScheduler`] runs live previews while the user types: every input
//! change aborts the in-flight request and starts a debounced one, and results
//! carry a generation number so a slow stale response can never replace a
//! newer one.

use crate::core::error::{PortalError, Result};
use crate::core::service::TradeService;
use crate::utils::validation::{parse_amount, validate_positive, FieldErrors};
use parking_lot::Mutex;
use rust_decimal::Decimal;
use shared::{BuyRequest, Investment, MarketplaceItem, SellRequest, TradePreview, TradeSide, Transaction};
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Fee applied to local estimates: 1%
pub const ESTIMATE_FEE_RATE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);
/// Pause between a successful trade and the caller's success callback
pub const DEFAULT_SUCCESS_DELAY: Duration = Duration::from_millis(1500);

pub const EXCEEDS_UNITS_MESSAGE: &str = "quantity exceeds available units";
pub const TOO_LARGE_MESSAGE: &str = "Amount is too large";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeStep {
    Input,
    Preview,
    Confirming,
    Done,
}

#[derive(Debug, Clone)]
pub enum TradeTarget {
    Buy {
        item: MarketplaceItem,
        portfolio_id: Option<String>,
    },
    Sell {
        holding: Investment,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum TradeRequest {
    Buy(BuyRequest),
    Sell(SellRequest),
}

/// Inputs for the local fallback estimate.
#[derive(Debug, Clone, Copy)]
struct Estimator {
    price: Decimal,
    purchase_price: Decimal,
    fee_rate: Decimal,
}

impl Estimator {
    fn estimate(&self, request: &TradeRequest) -> Option<TradePreview> {
        match request {
            TradeRequest::Buy(buy) => estimate_buy(buy.amount, self.price, self.fee_rate),
            TradeRequest::Sell(sell) => {
                estimate_sell(sell.quantity, self.price, self.purchase_price, self.fee_rate)
            }
        }
    }
}

/// Buy estimate: fee taken from the amount, the rest buys units at `price`.
///
/// `None` when the figures do not fit in a `Decimal`.
pub fn estimate_buy(amount: Decimal, price: Decimal, fee_rate: Decimal) -> Option<TradePreview> {
    let fee = amount.checked_mul(fee_rate)?.round_dp(2);
    let net_amount = amount.checked_sub(fee)?;
    let quantity = if price.is_zero() {
        Decimal::ZERO
    } else {
        net_amount.checked_div(price)?.round_dp(8)
    };
    Some(TradePreview {
        side: TradeSide::Buy,
        quantity,
        price,
        gross_amount: amount,
        fee,
        fee_percentage: fee_rate.checked_mul(Decimal::ONE_HUNDRED)?,
        net_amount,
        gain_loss: None,
        estimated: true,
    })
}

/// Sell estimate: proceeds at `price` less fee; gain/loss against the cost basis.
///
/// `None` when the figures do not fit in a `Decimal`.
pub fn estimate_sell(
    quantity: Decimal,
    price: Decimal,
    purchase_price: Decimal,
    fee_rate: Decimal,
) -> Option<TradePreview> {
    let gross_amount = quantity.checked_mul(price)?.round_dp(2);
    let fee = gross_amount.checked_mul(fee_rate)?.round_dp(2);
    let net_amount = gross_amount.checked_sub(fee)?;
    let cost_basis = quantity.checked_mul(purchase_price)?.round_dp(2);
    Some(TradePreview {
        side: TradeSide::Sell,
        quantity,
        price,
        gross_amount,
        fee,
        fee_percentage: fee_rate.checked_mul(Decimal::ONE_HUNDRED)?,
        net_amount,
        gain_loss: Some(net_amount.checked_sub(cost_basis)?),
        estimated: true,
    })
}

/// Server preview, or the local estimate when the server cannot provide one.
async fn fetch_preview(
    api: Arc<dyn TradeService>,
    request: TradeRequest,
    estimator: Estimator,
) -> Result<TradePreview> {
    let result = match &request {
        TradeRequest::Buy(buy) => api.preview_buy(buy.clone()).await,
        TradeRequest::Sell(sell) => api.preview_sell(sell.clone()).await,
    };
    match result {
        Ok(preview) => Ok(preview),
        Err(e) if e.is_auth_failure() => Err(e),
        Err(e) => {
            tracing::warn!(error = %e, "Preview unavailable, using local estimate");
            estimator
                .estimate(&request)
                .ok_or_else(|| PortalError::State(TOO_LARGE_MESSAGE.to_string()))
        }
    }
}

pub struct TradeWizard {
    api: Arc<dyn TradeService>,
    target: TradeTarget,
    input: String,
    step: TradeStep,
    preview: Option<TradePreview>,
    error: Option<String>,
    fee_rate: Decimal,
    success_delay: Duration,
}

impl TradeWizard {
    pub fn buy(api: Arc<dyn TradeService>, item: MarketplaceItem, portfolio_id: Option<String>) -> Self {
        Self::new(api, TradeTarget::Buy { item, portfolio_id })
    }

    pub fn sell(api: Arc<dyn TradeService>, holding: Investment) -> Self {
        Self::new(api, TradeTarget::Sell { holding })
    }

    fn new(api: Arc<dyn TradeService>, target: TradeTarget) -> Self {
        Self {
            api,
            target,
            input: String::new(),
            step: TradeStep::Input,
            preview: None,
            error: None,
            fee_rate: ESTIMATE_FEE_RATE,
            success_delay: DEFAULT_SUCCESS_DELAY,
        }
    }

    pub fn with_success_delay(mut self, delay: Duration) -> Self {
        self.success_delay = delay;
        self
    }

    pub fn side(&self) -> TradeSide {
        match self.target {
            TradeTarget::Buy { .. } => TradeSide::Buy,
            TradeTarget::Sell { .. } => TradeSide::Sell,
        }
    }

    pub fn step(&self) -> TradeStep {
        self.step
    }

    pub fn preview(&self) -> Option<&TradePreview> {
        self.preview.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    /// New input: back to the input step, any preview is discarded.
    pub fn set_input(&mut self, raw: impl Into<String>) {
        self.input = raw.into();
        self.step = TradeStep::Input;
        self.preview = None;
        self.error = None;
    }

    fn field(&self) -> &'static str {
        match self.side() {
            TradeSide::Buy => "amount",
            TradeSide::Sell => "quantity",
        }
    }

    /// Parse and bounds-check the input.
    pub fn validate_input(&self) -> std::result::Result<Decimal, String> {
        let value = self.check_bounds()?;
        if self.estimator().estimate(&self.build_request(value)).is_none() {
            return Err(TOO_LARGE_MESSAGE.to_string());
        }
        Ok(value)
    }

    fn check_bounds(&self) -> std::result::Result<Decimal, String> {
        match &self.target {
            TradeTarget::Buy { item, .. } => {
                if !item.is_available {
                    return Err("This investment is not currently available".to_string());
                }
                let amount = parse_amount(&self.input, "Amount")?;
                if let Some(message) = validate_positive(amount, "Amount").error {
                    return Err(message);
                }
                if amount < item.minimum_investment {
                    return Err(format!("Minimum investment is {}", item.minimum_investment));
                }
                if let Some(maximum) = item.maximum_investment {
                    if amount > maximum {
                        return Err(format!("Maximum investment is {}", maximum));
                    }
                }
                Ok(amount)
            }
            TradeTarget::Sell { holding } => {
                let quantity = parse_amount(&self.input, "Quantity")?;
                if let Some(message) = validate_positive(quantity, "Quantity").error {
                    return Err(message);
                }
                if quantity > holding.quantity {
                    return Err(EXCEEDS_UNITS_MESSAGE.to_string());
                }
                Ok(quantity)
            }
        }
    }

    fn build_request(&self, value: Decimal) -> TradeRequest {
        match &self.target {
            TradeTarget::Buy { item, portfolio_id } => TradeRequest::Buy(BuyRequest {
                investment_id: item.id.clone(),
                amount: value,
                portfolio_id: portfolio_id.clone(),
            }),
            TradeTarget::Sell { holding } => TradeRequest::Sell(SellRequest {
                investment_id: holding.id.clone(),
                quantity: value,
            }),
        }
    }

    fn estimator(&self) -> Estimator {
        match &self.target {
            TradeTarget::Buy { item, .. } => Estimator {
                price: item.current_price,
                purchase_price: item.current_price,
                fee_rate: self.fee_rate,
            },
            TradeTarget::Sell { holding } => Estimator {
                price: holding.current_price,
                purchase_price: holding.purchase_price,
                fee_rate: self.fee_rate,
            },
        }
    }

    fn validated_request(&mut self) -> Result<TradeRequest> {
        match self.validate_input() {
            Ok(value) => Ok(self.build_request(value)),
            Err(message) => {
                self.error = Some(message.clone());
                let mut errors = FieldErrors::new();
                errors.insert(self.field(), message);
                Err(PortalError::Validation(errors))
            }
        }
    }

    /// Advance to the preview step.
    pub async fn request_preview(&mut self) -> Result<&TradePreview> {
        let request = self.validated_request()?;
        self.error = None;

        let preview = fetch_preview(self.api.clone(), request, self.estimator()).await?;
        tracing::debug!(side = ?preview.side, estimated = preview.estimated, "Trade preview ready");
        self.step = TradeStep::Preview;
        let preview = self.preview.insert(preview);
        Ok(&*preview)
    }

    /// Start a debounced live preview for the current input.
    ///
    /// Returns `false` (and cancels any pending preview) when the input is invalid.
    pub fn schedule_preview(&self, scheduler: &PreviewScheduler) -> bool {
        let Ok(value) = self.validate_input() else {
            scheduler.cancel();
            return false;
        };
        let request = self.build_request(value);
        let api = self.api.clone();
        let estimator = self.estimator();
        scheduler.schedule(move || fetch_preview(api, request, estimator));
        true
    }

    /// Show a live preview result without leaving the input step.
    pub fn show_preview(&mut self, preview: TradePreview) {
        if self.step == TradeStep::Input {
            self.preview = Some(preview);
        }
    }

    pub fn back(&mut self) {
        if self.step == TradeStep::Preview {
            self.step = TradeStep::Input;
        }
    }

    /// Confirm is only reachable from a preview of a valid input.
    pub fn can_confirm(&self) -> bool {
        self.step == TradeStep::Preview && self.preview.is_some() && self.validate_input().is_ok()
    }

    /// Commit the trade. On success `on_success` runs after the success delay.
    pub async fn confirm<F>(&mut self, on_success: F) -> Result<Transaction>
    where
        F: FnOnce(&Transaction),
    {
        if !self.can_confirm() {
            let request = self.validated_request();
            return Err(match request {
                Err(e) => e,
                Ok(_) => PortalError::State("Review the order before confirming".to_string()),
            });
        }
        let request = self.validated_request()?;
        self.step = TradeStep::Confirming;

        let result = match request {
            TradeRequest::Buy(buy) => self.api.buy(buy).await,
            TradeRequest::Sell(sell) => self.api.sell(sell).await,
        };

        match result {
            Ok(transaction) => {
                tracing::info!(
                    transaction_id = %transaction.id,
                    side = ?self.side(),
                    amount = %transaction.amount,
                    "Trade confirmed"
                );
                self.step = TradeStep::Done;
                tokio::time::sleep(self.success_delay).await;
                on_success(&transaction);
                Ok(transaction)
            }
            Err(e) => {
                tracing::warn!(error = %e, side = ?self.side(), "Trade failed");
                self.step = TradeStep::Preview;
                self.error = Some(e.user_message("Trade failed"));
                Err(e)
            }
        }
    }
}

/// Latest live preview state
#[derive(Debug, Clone, PartialEq)]
pub enum PreviewSlot {
    Idle,
    Pending { generation: u64 },
    Ready { generation: u64, preview: TradePreview },
    Failed { generation: u64, message: String },
}

pub struct PreviewScheduler {
    debounce: Duration,
    generation: Arc<AtomicU64>,
    inflight: Mutex<Option<JoinHandle<()>>>,
    slot: Arc<watch::Sender<PreviewSlot>>,
}

impl PreviewScheduler {
    pub fn new(debounce: Duration) -> Self {
        let (slot, _) = watch::channel(PreviewSlot::Idle);
        Self {
            debounce,
            generation: Arc::new(AtomicU64::new(0)),
            inflight: Mutex::new(None),
            slot: Arc::new(slot),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<PreviewSlot> {
        self.slot.subscribe()
    }

    pub fn latest(&self) -> PreviewSlot {
        self.slot.borrow().clone()
    }

    /// Abort the previous fetch and start `fetch` after the debounce delay.
    pub fn schedule<F, Fut>(&self, fetch: F) -> u64
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<TradePreview>> + Send + 'static,
    {
        let mut generation = 0;
        // Bumped under the watch lock so a finishing task cannot interleave.
        self.slot.send_modify(|slot| {
            generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            *slot = PreviewSlot::Pending { generation };
        });

        let debounce = self.debounce;
        let current = self.generation.clone();
        let slot = self.slot.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(debounce).await;
            let outcome = fetch().await;
            slot.send_if_modified(|state| {
                if current.load(Ordering::SeqCst) != generation {
                    tracing::trace!(generation, "Discarding stale preview");
                    return false;
                }
                *state = match outcome {
                    Ok(preview) => PreviewSlot::Ready { generation, preview },
                    Err(e) => PreviewSlot::Failed {
                        generation,
                        message: e.user_message("Preview unavailable"),
                    },
                };
                true
            });
        });

        if let Some(previous) = self.inflight.lock().replace(handle) {
            previous.abort();
        }
        generation
    }

    /// Drop any pending preview.
    pub fn cancel(&self) {
        self.slot.send_modify(|slot| {
            self.generation.fetch_add(1, Ordering::SeqCst);
            *slot = PreviewSlot::Idle;
        });
        if let Some(previous) = self.inflight.lock().take() {
            previous.abort();
        }
    }
}

impl Drop for PreviewScheduler {
    fn drop(&mut self) {
        if let Some(handle) = self.inflight.lock().take() {
            handle.abort();
        }
    }
}
