//! Add / edit bank account form.

use super::FormCore;
use crate::core::error::Result;
use crate::core::service::BankAccountService;
use crate::utils::validation::{
    parse_amount, validate_account_number, validate_currency, validate_length, validate_non_negative,
    validate_required, validate_sort_code, FieldErrors, ValidationResult,
};
use shared::{AccountType, BankAccount, CreateBankAccountRequest, UpdateBankAccountRequest};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BankAccountField {
    AccountHolderName,
    AccountNumber,
    BankName,
    BankCode,
    AccountType,
    Currency,
    Balance,
}

impl BankAccountField {
    /// Wire name, also used as the error key.
    pub fn key(&self) -> &'static str {
        match self {
            BankAccountField::AccountHolderName => "accountHolderName",
            BankAccountField::AccountNumber => "accountNumber",
            BankAccountField::BankName => "bankName",
            BankAccountField::BankCode => "bankCode",
            BankAccountField::AccountType => "accountType",
            BankAccountField::Currency => "currency",
            BankAccountField::Balance => "balance",
        }
    }
}

#[derive(Debug, Clone)]
pub struct BankAccountForm {
    pub account_holder_name: String,
    pub account_number: String,
    pub bank_name: String,
    pub bank_code: String,
    pub account_type: Option<AccountType>,
    pub currency: String,
    pub balance: String,
    editing: Option<String>,
    core: FormCore,
}

impl Default for BankAccountForm {
    fn default() -> Self {
        Self::new()
    }
}

impl BankAccountForm {
    pub fn new() -> Self {
        Self {
            account_holder_name: String::new(),
            account_number: String::new(),
            bank_name: String::new(),
            bank_code: String::new(),
            account_type: None,
            currency: "USD".to_string(),
            balance: "0".to_string(),
            editing: None,
            core: FormCore::default(),
        }
    }

    /// Prefill from an existing account; submit then updates it.
    pub fn edit(account: &BankAccount) -> Self {
        Self {
            account_holder_name: account.account_holder_name.clone(),
            account_number: account.account_number.clone(),
            bank_name: account.bank_name.clone(),
            bank_code: account.bank_code.clone(),
            account_type: Some(account.account_type),
            currency: account.currency.clone(),
            balance: account.balance.to_string(),
            editing: Some(account.id.clone()),
            core: FormCore::default(),
        }
    }

    pub fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    pub fn core(&self) -> &FormCore {
        &self.core
    }

    pub fn error(&self, field: BankAccountField) -> Option<&str> {
        self.core.errors.get(field.key())
    }

    pub fn submit_label(&self) -> &str {
        self.core
            .submit_label(if self.is_editing() { "Update account" } else { "Add account" })
    }

    /// Set a text field. Account type is set with [`Self::set_account_type`].
    pub fn set(&mut self, field: BankAccountField, value: impl Into<String>) {
        let value = value.into();
        match field {
            BankAccountField::AccountHolderName => self.account_holder_name = value,
            BankAccountField::AccountNumber => self.account_number = value,
            BankAccountField::BankName => self.bank_name = value,
            BankAccountField::BankCode => self.bank_code = value,
            BankAccountField::Currency => self.currency = value.to_uppercase(),
            BankAccountField::Balance => self.balance = value,
            BankAccountField::AccountType => return,
        }
        self.core.touch(field.key());
    }

    pub fn set_account_type(&mut self, account_type: AccountType) {
        self.account_type = Some(account_type);
        self.core.touch(BankAccountField::AccountType.key());
    }

    /// Check every field; on success returns the request body.
    pub fn validate(&self) -> std::result::Result<CreateBankAccountRequest, FieldErrors> {
        let mut errors = FieldErrors::new();

        let holder = BankAccountField::AccountHolderName.key();
        errors.check(holder, validate_required(&self.account_holder_name, "Account holder name"));
        errors.check(
            holder,
            validate_length(&self.account_holder_name, "Account holder name", 2, 100),
        );
        errors.check(
            BankAccountField::AccountNumber.key(),
            validate_account_number(&self.account_number),
        );
        errors.check(
            BankAccountField::BankName.key(),
            validate_required(&self.bank_name, "Bank name"),
        );
        errors.check(BankAccountField::BankCode.key(), validate_sort_code(&self.bank_code));
        if self.account_type.is_none() {
            errors.insert(BankAccountField::AccountType.key(), "Account type is required");
        }
        errors.check(BankAccountField::Currency.key(), validate_currency(&self.currency));

        let balance = match parse_amount(&self.balance, "Balance") {
            Ok(balance) => {
                errors.check(
                    BankAccountField::Balance.key(),
                    validate_non_negative(balance, "Balance"),
                );
                Some(balance)
            }
            Err(message) => {
                errors.check(BankAccountField::Balance.key(), ValidationResult::err(message));
                None
            }
        };

        match (self.account_type, balance) {
            (Some(account_type), Some(balance)) if errors.is_empty() => Ok(CreateBankAccountRequest {
                account_holder_name: self.account_holder_name.trim().to_string(),
                account_number: self.account_number.trim().to_string(),
                bank_name: self.bank_name.trim().to_string(),
                bank_code: self.bank_code.trim().to_string(),
                account_type,
                currency: self.currency.trim().to_string(),
                balance,
            }),
            _ => Err(errors),
        }
    }

    /// Validate, then create (or update) the account and call `on_success`.
    pub async fn submit<F>(&mut self, api: &dyn BankAccountService, on_success: F) -> Result<BankAccount>
    where
        F: FnOnce(&BankAccount),
    {
        let request = self.validate().map_err(|errors| self.core.reject(errors))?;
        self.core.begin()?;

        let result = match &self.editing {
            None => api.create_bank_account(request).await,
            Some(id) => {
                let update = UpdateBankAccountRequest {
                    account_holder_name: Some(request.account_holder_name),
                    account_number: Some(request.account_number),
                    bank_name: Some(request.bank_name),
                    bank_code: Some(request.bank_code),
                    account_type: Some(request.account_type),
                    currency: Some(request.currency),
                    balance: Some(request.balance),
                    is_primary: None,
                };
                api.update_bank_account(id, update).await
            }
        };

        let account = self.core.finish(result, "Failed to save bank account")?;
        tracing::info!(account_id = %account.id, "Bank account saved");
        on_success(&account);
        Ok(account)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::PortalError;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use rust_decimal_macros::dec;

    #[derive(Default)]
    struct MockBankAccounts {
        created: Mutex<Vec<CreateBankAccountRequest>>,
        updated: Mutex<Vec<(String, UpdateBankAccountRequest)>>,
        fail_with: Option<PortalError>,
    }

    fn account_from(id: &str, request: &CreateBankAccountRequest) -> BankAccount {
        BankAccount {
            id: id.to_string(),
            account_holder_name: request.account_holder_name.clone(),
            account_number: request.account_number.clone(),
            bank_name: request.bank_name.clone(),
            bank_code: request.bank_code.clone(),
            account_type: request.account_type,
            currency: request.currency.clone(),
            balance: request.balance,
            is_verified: false,
            is_primary: false,
            created_at: None,
            updated_at: None,
        }
    }

    #[async_trait]
    impl BankAccountService for MockBankAccounts {
        async fn create_bank_account(&self, request: CreateBankAccountRequest) -> Result<BankAccount> {
            if let Some(err) = &self.fail_with {
                return Err(err.clone());
            }
            let account = account_from("ba-1", &request);
            self.created.lock().push(request);
            Ok(account)
        }

        async fn update_bank_account(&self, id: &str, request: UpdateBankAccountRequest) -> Result<BankAccount> {
            self.updated.lock().push((id.to_string(), request));
            Ok(account_from(id, &filled().validate().unwrap()))
        }
    }

    fn filled() -> BankAccountForm {
        let mut form = BankAccountForm::new();
        form.set(BankAccountField::AccountHolderName, "Jane Doe");
        form.set(BankAccountField::AccountNumber, "9876543210");
        form.set(BankAccountField::BankName, "New Bank");
        form.set(BankAccountField::BankCode, "NB");
        form.set_account_type(AccountType::Checking);
        form.set(BankAccountField::Currency, "USD");
        form.set(BankAccountField::Balance, "1000");
        form
    }

    #[tokio::test]
    async fn test_required_field_blocks_submission() {
        let api = MockBankAccounts::default();
        let mut form = filled();
        form.set(BankAccountField::BankName, "  ");

        let mut called = false;
        let result = form.submit(&api, |_| called = true).await;

        assert!(matches!(result, Err(PortalError::Validation(_))));
        assert_eq!(form.error(BankAccountField::BankName), Some("Bank name is required"));
        assert!(api.created.lock().is_empty());
        assert!(!called);
    }

    #[tokio::test]
    async fn test_short_account_number_message() {
        let api = MockBankAccounts::default();
        let mut form = filled();
        form.set(BankAccountField::AccountNumber, "1234567");

        assert!(form.submit(&api, |_| {}).await.is_err());
        assert_eq!(
            form.error(BankAccountField::AccountNumber),
            Some("Account number must be at least 8 digits")
        );
        assert!(api.created.lock().is_empty());
    }

    #[test]
    fn test_every_missing_field_is_reported() {
        let mut form = BankAccountForm::new();
        form.set(BankAccountField::Currency, "");
        form.set(BankAccountField::Balance, "-5");

        let errors = form.validate().unwrap_err();

        assert_eq!(errors.get("accountHolderName"), Some("Account holder name is required"));
        assert_eq!(errors.get("accountNumber"), Some("Account number is required"));
        assert_eq!(errors.get("bankCode"), Some("Bank code is required"));
        assert_eq!(errors.get("accountType"), Some("Account type is required"));
        assert_eq!(errors.get("currency"), Some("Currency is required"));
        assert_eq!(errors.get("balance"), Some("Balance cannot be negative"));
    }

    #[tokio::test]
    async fn test_valid_form_creates_account_and_calls_back() {
        let api = MockBankAccounts::default();
        let mut form = filled();

        let mut saved = None;
        let account = form.submit(&api, |a| saved = Some(a.id.clone())).await.unwrap();

        assert_eq!(saved.as_deref(), Some("ba-1"));
        assert_eq!(account.balance, dec!(1000));
        assert_eq!(form.core().state, super::super::FormState::Succeeded);
        let created = api.created.lock();
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].account_type, AccountType::Checking);
        assert_eq!(created[0].bank_code, "NB");
    }

    #[tokio::test]
    async fn test_backend_error_is_shown_verbatim() {
        let api = MockBankAccounts {
            fail_with: Some(PortalError::api(409, "Account number already registered")),
            ..Default::default()
        };
        let mut form = filled();

        assert!(form.submit(&api, |_| {}).await.is_err());
        assert_eq!(
            form.core().state.error(),
            Some("Account number already registered")
        );
        assert_eq!(form.submit_label(), "Add account");
    }

    #[tokio::test]
    async fn test_edit_mode_updates_existing_account() {
        let api = MockBankAccounts::default();
        let existing = account_from("ba-7", &filled().validate().unwrap());
        let mut form = BankAccountForm::edit(&existing);
        form.set(BankAccountField::BankName, "Other Bank");

        form.submit(&api, |_| {}).await.unwrap();

        let updated = api.updated.lock();
        assert_eq!(updated[0].0, "ba-7");
        assert_eq!(updated[0].1.bank_name.as_deref(), Some("Other Bank"));
        assert!(api.created.lock().is_empty());
    }
}
