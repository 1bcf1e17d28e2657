use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ParseEnumError;
use crate::PaymentId;

/// Kind of payment method accepted at the till.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentType {
    #[serde(rename = "CASH")]
    Cash,
    #[serde(rename = "E-WALLET")]
    EWallet,
    #[serde(rename = "EDC")]
    Edc,
}

impl PaymentType {
    /// Returns the stored representation.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Cash => "CASH",
            Self::EWallet => "E-WALLET",
            Self::Edc => "EDC",
        }
    }
}

impl std::fmt::Display for PaymentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PaymentType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CASH" => Ok(Self::Cash),
            "E-WALLET" => Ok(Self::EWallet),
            "EDC" => Ok(Self::Edc),
            other => Err(ParseEnumError {
                kind: "payment type",
                value: other.to_string(),
            }),
        }
    }
}

/// A payment method. Names are unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    pub name: String,
    #[serde(rename = "type")]
    pub payment_type: PaymentType,
    pub logo: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a payment method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPayment {
    pub name: String,
    #[serde(rename = "type")]
    pub payment_type: PaymentType,
    pub logo: String,
}

/// Partial update of a payment method. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentUpdate {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub payment_type: Option<PaymentType>,
    pub logo: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payment_type_wire_names() {
        assert_eq!(
            serde_json::to_string(&PaymentType::EWallet).unwrap(),
            "\"E-WALLET\""
        );
        assert_eq!("EDC".parse::<PaymentType>(), Ok(PaymentType::Edc));
        assert!("card".parse::<PaymentType>().is_err());
    }
}
