//! Admin marketplace listing form (create / edit).

use super::FormCore;
use crate::core::error::Result;
use crate::core::service::CatalogAdminService;
use crate::utils::validation::{
    parse_amount, validate_length, validate_non_negative, validate_positive, validate_required,
    validate_symbol, FieldErrors, ValidationResult,
};
use rust_decimal::Decimal;
use shared::{CreateInvestmentRequest, InvestmentType, MarketplaceItem, RiskLevel};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvestmentField {
    Name,
    Symbol,
    InvestmentType,
    CurrentPrice,
    RiskLevel,
    MinimumInvestment,
    MaximumInvestment,
    Description,
    ExpectedReturn,
}

impl InvestmentField {
    pub fn key(&self) -> &'static str {
        match self {
            InvestmentField::Name => "name",
            InvestmentField::Symbol => "symbol",
            InvestmentField::InvestmentType => "type",
            InvestmentField::CurrentPrice => "currentPrice",
            InvestmentField::RiskLevel => "riskLevel",
            InvestmentField::MinimumInvestment => "minimumInvestment",
            InvestmentField::MaximumInvestment => "maximumInvestment",
            InvestmentField::Description => "description",
            InvestmentField::ExpectedReturn => "expectedReturn",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct InvestmentForm {
    pub name: String,
    pub symbol: String,
    pub investment_type: Option<InvestmentType>,
    pub current_price: String,
    pub risk_level: Option<RiskLevel>,
    pub minimum_investment: String,
    /// Empty means no upper bound
    pub maximum_investment: String,
    pub description: String,
    pub expected_return: String,
    editing: Option<String>,
    core: FormCore,
}

/// Parse `raw` into `field`, recording the error.
fn amount(errors: &mut FieldErrors, field: InvestmentField, raw: &str, label: &str) -> Option<Decimal> {
    match parse_amount(raw, label) {
        Ok(value) => Some(value),
        Err(message) => {
            errors.check(field.key(), ValidationResult::err(message));
            None
        }
    }
}

impl InvestmentForm {
    pub fn new() -> Self {
        Self {
            minimum_investment: "0".to_string(),
            ..Default::default()
        }
    }

    pub fn edit(item: &MarketplaceItem) -> Self {
        Self {
            name: item.name.clone(),
            symbol: item.symbol.clone(),
            investment_type: Some(item.investment_type),
            current_price: item.current_price.to_string(),
            risk_level: Some(item.risk_level),
            minimum_investment: item.minimum_investment.to_string(),
            maximum_investment: item.maximum_investment.map(|m| m.to_string()).unwrap_or_default(),
            description: item.description.clone().unwrap_or_default(),
            expected_return: item.expected_return.map(|r| r.to_string()).unwrap_or_default(),
            editing: Some(item.id.clone()),
            core: FormCore::default(),
        }
    }

    pub fn core(&self) -> &FormCore {
        &self.core
    }

    pub fn error(&self, field: InvestmentField) -> Option<&str> {
        self.core.errors.get(field.key())
    }

    pub fn set(&mut self, field: InvestmentField, value: impl Into<String>) {
        let value = value.into();
        match field {
            InvestmentField::Name => self.name = value,
            InvestmentField::Symbol => self.symbol = value.trim().to_uppercase(),
            InvestmentField::CurrentPrice => self.current_price = value,
            InvestmentField::MinimumInvestment => self.minimum_investment = value,
            InvestmentField::MaximumInvestment => self.maximum_investment = value,
            InvestmentField::Description => self.description = value,
            InvestmentField::ExpectedReturn => self.expected_return = value,
            InvestmentField::InvestmentType | InvestmentField::RiskLevel => return,
        }
        self.core.touch(field.key());
    }

    pub fn set_investment_type(&mut self, investment_type: InvestmentType) {
        self.investment_type = Some(investment_type);
        self.core.touch(InvestmentField::InvestmentType.key());
    }

    pub fn set_risk_level(&mut self, risk_level: RiskLevel) {
        self.risk_level = Some(risk_level);
        self.core.touch(InvestmentField::RiskLevel.key());
    }

    pub fn validate(&self) -> std::result::Result<CreateInvestmentRequest, FieldErrors> {
        let mut errors = FieldErrors::new();

        errors.check(InvestmentField::Name.key(), validate_required(&self.name, "Name"));
        errors.check(InvestmentField::Name.key(), validate_length(&self.name, "Name", 2, 100));
        errors.check(InvestmentField::Symbol.key(), validate_symbol(&self.symbol));
        if self.investment_type.is_none() {
            errors.insert(InvestmentField::InvestmentType.key(), "Investment type is required");
        }
        if self.risk_level.is_none() {
            errors.insert(InvestmentField::RiskLevel.key(), "Risk level is required");
        }

        let price = amount(&mut errors, InvestmentField::CurrentPrice, &self.current_price, "Price");
        if let Some(price) = price {
            errors.check(InvestmentField::CurrentPrice.key(), validate_positive(price, "Price"));
        }

        let minimum = amount(
            &mut errors,
            InvestmentField::MinimumInvestment,
            &self.minimum_investment,
            "Minimum investment",
        );
        if let Some(minimum) = minimum {
            errors.check(
                InvestmentField::MinimumInvestment.key(),
                validate_non_negative(minimum, "Minimum investment"),
            );
        }

        let maximum = if self.maximum_investment.trim().is_empty() {
            None
        } else {
            amount(
                &mut errors,
                InvestmentField::MaximumInvestment,
                &self.maximum_investment,
                "Maximum investment",
            )
        };
        if let (Some(minimum), Some(maximum)) = (minimum, maximum) {
            if maximum < minimum {
                errors.insert(
                    InvestmentField::MaximumInvestment.key(),
                    "Maximum investment must be greater than or equal to minimum investment",
                );
            }
        }

        let expected_return = if self.expected_return.trim().is_empty() {
            None
        } else {
            amount(
                &mut errors,
                InvestmentField::ExpectedReturn,
                &self.expected_return,
                "Expected return",
            )
        };

        match (self.investment_type, self.risk_level, price, minimum) {
            (Some(investment_type), Some(risk_level), Some(current_price), Some(minimum_investment))
                if errors.is_empty() =>
            {
                let description = self.description.trim();
                Ok(CreateInvestmentRequest {
                    name: self.name.trim().to_string(),
                    symbol: self.symbol.trim().to_string(),
                    investment_type,
                    current_price,
                    risk_level,
                    minimum_investment,
                    maximum_investment: maximum,
                    description: (!description.is_empty()).then(|| description.to_string()),
                    expected_return,
                })
            }
            _ => Err(errors),
        }
    }

    pub async fn submit<F>(&mut self, api: &dyn CatalogAdminService, on_success: F) -> Result<MarketplaceItem>
    where
        F: FnOnce(&MarketplaceItem),
    {
        let request = self.validate().map_err(|errors| self.core.reject(errors))?;
        self.core.begin()?;

        let result = match &self.editing {
            None => api.create_marketplace_item(request).await,
            Some(id) => api.update_marketplace_item(id, request).await,
        };
        let item = self.core.finish(result, "Failed to save investment")?;
        tracing::info!(item_id = %item.id, symbol = %item.symbol, "Marketplace item saved");
        on_success(&item);
        Ok(item)
    }
}
