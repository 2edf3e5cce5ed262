//! Deposit and withdrawal request forms.

use super::FormCore;
use crate::core::error::Result;
use crate::core::service::FundsService;
use crate::utils::validation::{parse_amount, validate_currency, validate_positive, FieldErrors, ValidationResult};
use rust_decimal::Decimal;
use shared::{format_money, Deposit, DepositRequest, Withdrawal, WithdrawalRequest};

pub const DEFAULT_DEPOSIT_METHOD: &str = "BANK_TRANSFER";

fn parse_positive(errors: &mut FieldErrors, raw: &str) -> Option<Decimal> {
    match parse_amount(raw, "Amount") {
        Ok(amount) => {
            errors.check("amount", validate_positive(amount, "Amount"));
            Some(amount)
        }
        Err(message) => {
            errors.check("amount", ValidationResult::err(message));
            None
        }
    }
}

fn require_account(errors: &mut FieldErrors, bank_account_id: &Option<String>) {
    if bank_account_id.as_deref().map_or(true, |id| id.trim().is_empty()) {
        errors.insert("bankAccountId", "Bank account is required");
    }
}

#[derive(Debug, Clone)]
pub struct DepositForm {
    pub amount: String,
    pub currency: String,
    pub method: String,
    pub bank_account_id: Option<String>,
    core: FormCore,
}

impl Default for DepositForm {
    fn default() -> Self {
        Self {
            amount: String::new(),
            currency: "USD".to_string(),
            method: DEFAULT_DEPOSIT_METHOD.to_string(),
            bank_account_id: None,
            core: FormCore::default(),
        }
    }
}

impl DepositForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn core(&self) -> &FormCore {
        &self.core
    }

    pub fn set_amount(&mut self, amount: impl Into<String>) {
        self.amount = amount.into();
        self.core.touch("amount");
    }

    pub fn select_account(&mut self, bank_account_id: &str) {
        self.bank_account_id = Some(bank_account_id.to_string());
        self.core.touch("bankAccountId");
    }

    pub fn validate(&self) -> std::result::Result<DepositRequest, FieldErrors> {
        let mut errors = FieldErrors::new();
        let amount = parse_positive(&mut errors, &self.amount);
        require_account(&mut errors, &self.bank_account_id);
        errors.check("currency", validate_currency(&self.currency));

        match amount {
            Some(amount) if errors.is_empty() => Ok(DepositRequest {
                amount,
                currency: self.currency.trim().to_string(),
                method: self.method.clone(),
                bank_account_id: self.bank_account_id.clone(),
            }),
            _ => Err(errors),
        }
    }

    pub async fn submit<F>(&mut self, api: &dyn FundsService, on_success: F) -> Result<Deposit>
    where
        F: FnOnce(&Deposit),
    {
        let request = self.validate().map_err(|errors| self.core.reject(errors))?;
        self.core.begin()?;
        let result = api.request_deposit(request).await;
        let deposit = self.core.finish(result, "Failed to submit deposit request")?;
        tracing::info!(deposit_id = %deposit.id, "Deposit requested");
        on_success(&deposit);
        Ok(deposit)
    }
}

#[derive(Debug, Clone)]
pub struct WithdrawalForm {
    pub amount: String,
    pub currency: String,
    pub bank_account_id: Option<String>,
    /// Funds available to withdraw
    available: Decimal,
    core: FormCore,
}

impl WithdrawalForm {
    pub fn new(available: Decimal) -> Self {
        Self {
            amount: String::new(),
            currency: "USD".to_string(),
            bank_account_id: None,
            available,
            core: FormCore::default(),
        }
    }

    pub fn available(&self) -> Decimal {
        self.available
    }

    pub fn core(&self) -> &FormCore {
        &self.core
    }

    pub fn set_amount(&mut self, amount: impl Into<String>) {
        self.amount = amount.into();
        self.core.touch("amount");
    }

    pub fn select_account(&mut self, bank_account_id: &str) {
        self.bank_account_id = Some(bank_account_id.to_string());
        self.core.touch("bankAccountId");
    }

    pub fn validate(&self) -> std::result::Result<WithdrawalRequest, FieldErrors> {
        let mut errors = FieldErrors::new();
        let amount = parse_positive(&mut errors, &self.amount);
        if let Some(amount) = amount {
            if amount > self.available {
                errors.insert(
                    "amount",
                    format!(
                        "Amount exceeds available balance of {}",
                        format_money(self.available, &self.currency)
                    ),
                );
            }
        }
        require_account(&mut errors, &self.bank_account_id);
        errors.check("currency", validate_currency(&self.currency));

        match (amount, &self.bank_account_id) {
            (Some(amount), Some(bank_account_id)) if errors.is_empty() => Ok(WithdrawalRequest {
                amount,
                currency: self.currency.trim().to_string(),
                bank_account_id: bank_account_id.clone(),
            }),
            _ => Err(errors),
        }
    }

    pub async fn submit<F>(&mut self, api: &dyn FundsService, on_success: F) -> Result<Withdrawal>
    where
        F: FnOnce(&Withdrawal),
    {
        let request = self.validate().map_err(|errors| self.core.reject(errors))?;
        self.core.begin()?;
        let result = api.request_withdrawal(request).await;
        let withdrawal = self.core.finish(result, "Failed to submit withdrawal request")?;
        tracing::info!(withdrawal_id = %withdrawal.id, "Withdrawal requested");
        on_success(&withdrawal);
        Ok(withdrawal)
    }
}
