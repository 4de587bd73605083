//! Payment models

use std::borrow::Cow;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Money received from customers or paid to distributors
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PaymentDirection {
    In,
    Out,
}

impl PaymentDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentDirection::In => "in",
            PaymentDirection::Out => "out",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "in" => Some(PaymentDirection::In),
            "out" => Some(PaymentDirection::Out),
            _ => None,
        }
    }

    fn number_prefix(&self) -> &'static str {
        match self {
            PaymentDirection::In => "PI",
            PaymentDirection::Out => "PO",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    Cash,
    Upi,
    Card,
    BankTransfer,
    Cheque,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Upi => "upi",
            PaymentMethod::Card => "card",
            PaymentMethod::BankTransfer => "bank_transfer",
            PaymentMethod::Cheque => "cheque",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "cash" => Some(PaymentMethod::Cash),
            "upi" => Some(PaymentMethod::Upi),
            "card" => Some(PaymentMethod::Card),
            "bank_transfer" => Some(PaymentMethod::BankTransfer),
            "cheque" => Some(PaymentMethod::Cheque),
            _ => None,
        }
    }
}

/// A recorded payment
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: Uuid,
    pub payment_number: String,
    pub party_name: String,
    pub direction: PaymentDirection,
    pub method: PaymentMethod,
    pub amount: Decimal,
    pub remarks: Option<String>,
    pub payment_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

/// Input for recording a payment
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentInput {
    #[validate(length(min = 1, max = 100, message = "Party name is required"))]
    pub party_name: String,
    pub direction: PaymentDirection,
    #[serde(default)]
    pub method: PaymentMethod,
    #[validate(custom = "positive_amount")]
    pub amount: Decimal,
    #[validate(length(max = 500, message = "Remarks must be at most 500 characters"))]
    pub remarks: Option<String>,
    pub payment_date: Option<NaiveDate>,
}

fn positive_amount(amount: &Decimal) -> Result<(), ValidationError> {
    if *amount <= Decimal::ZERO {
        let mut error = ValidationError::new("amount");
        error.message = Some(Cow::Borrowed("Amount must be positive"));
        return Err(error);
    }
    Ok(())
}

/// Human-facing payment number, e.g. `PI-000042`
pub fn format_payment_number(direction: PaymentDirection, sequence: u64) -> String {
    format!("{}-{:06}", direction.number_prefix(), sequence)
}

/// Turn a search box value into an `ILIKE` pattern; blank searches match all
pub fn search_pattern(search: Option<&str>) -> Option<String> {
    let term = search?.trim();
    if term.is_empty() {
        return None;
    }
    let escaped: String = term
        .chars()
        .flat_map(|c| match c {
            '%' | '_' | '\\' => vec!['\\', c],
            _ => vec![c],
        })
        .collect();
    Some(format!("%{}%", escaped))
}
