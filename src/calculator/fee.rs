//! Segmented processing-fee calculator
//!
//! The fee depends on the client segment, the market, and the applicant's
//! declared income band relative to the requested amount.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Lower bound of any processing fee
pub const MIN_PROCESSING_FEE: i64 = 100;

/// Upper bound of any processing fee
pub const MAX_PROCESSING_FEE: i64 = 500;

/// Client segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ClientType {
    #[default]
    #[serde(rename = "particulier")]
    Particulier,
    #[serde(rename = "indépendant")]
    Independant,
    #[serde(rename = "commerçant")]
    Commercant,
    #[serde(rename = "entreprise")]
    Entreprise,
}

impl ClientType {
    pub const ALL: [ClientType; 4] = [
        ClientType::Particulier,
        ClientType::Independant,
        ClientType::Commercant,
        ClientType::Entreprise,
    ];

    /// Base fee before market and income adjustments
    pub fn base_fee(&self) -> i64 {
        match self {
            ClientType::Particulier => 150,
            ClientType::Independant => 250,
            ClientType::Commercant => 300,
            ClientType::Entreprise => 500,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ClientType::Particulier => "particulier",
            ClientType::Independant => "indépendant",
            ClientType::Commercant => "commerçant",
            ClientType::Entreprise => "entreprise",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ClientType::Particulier => "Particulier",
            ClientType::Independant => "Travailleur indépendant",
            ClientType::Commercant => "Commerçant",
            ClientType::Entreprise => "Entreprise",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == s)
    }
}

/// Market the application is filed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Country {
    #[default]
    #[serde(rename = "France")]
    France,
    #[serde(rename = "Côte d'Ivoire")]
    CoteDIvoire,
}

impl Country {
    pub fn multiplier(&self) -> f64 {
        match self {
            Country::France => 1.0,
            Country::CoteDIvoire => 0.75,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Country::France => "France",
            Country::CoteDIvoire => "Côte d'Ivoire",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "France" => Some(Country::France),
            "Côte d'Ivoire" => Some(Country::CoteDIvoire),
            _ => None,
        }
    }
}

/// Declared monthly income band
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncomeBand {
    Below1000,
    From1000To1500,
    From1500To2000,
    From2000To2500,
    From2500To3000,
    From3000To4000,
    Above4000,
}

impl IncomeBand {
    /// Band used when the declared key is not recognized
    pub const FALLBACK: IncomeBand = IncomeBand::From1500To2000;

    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "moins-1000" => Some(IncomeBand::Below1000),
            "1000-1500" => Some(IncomeBand::From1000To1500),
            "1500-2000" => Some(IncomeBand::From1500To2000),
            "2000-2500" => Some(IncomeBand::From2000To2500),
            "2500-3000" => Some(IncomeBand::From2500To3000),
            "3000-4000" => Some(IncomeBand::From3000To4000),
            "plus-4000" => Some(IncomeBand::Above4000),
            _ => None,
        }
    }

    /// Resolve a key, falling back to the 1500-2000 band
    pub fn resolve(key: &str) -> Self {
        Self::from_key(key).unwrap_or(Self::FALLBACK)
    }

    pub fn multiplier(&self) -> f64 {
        match self {
            IncomeBand::Below1000 => 0.85,
            IncomeBand::From1000To1500 => 0.90,
            IncomeBand::From1500To2000 => 1.0,
            IncomeBand::From2000To2500 => 1.1,
            IncomeBand::From2500To3000 => 1.2,
            IncomeBand::From3000To4000 => 1.3,
            IncomeBand::Above4000 => 1.4,
        }
    }

    /// Representative monthly income of the band
    pub fn average_income(&self) -> f64 {
        match self {
            IncomeBand::Below1000 => 800.0,
            IncomeBand::From1000To1500 => 1250.0,
            IncomeBand::From1500To2000 => 1750.0,
            IncomeBand::From2000To2500 => 2250.0,
            IncomeBand::From2500To3000 => 2750.0,
            IncomeBand::From3000To4000 => 3500.0,
            IncomeBand::Above4000 => 4500.0,
        }
    }

    /// Band multiplier scaled by the loan-to-income ratio
    pub fn adjustment(&self, loan_amount: i64) -> f64 {
        let ratio = loan_amount as f64 / self.average_income();

        let ratio_adjustment = if ratio > 2.0 {
            1.15
        } else if ratio > 1.5 {
            1.05
        } else if ratio < 0.8 {
            0.95
        } else {
            1.0
        };

        self.multiplier() * ratio_adjustment
    }
}

/// Fee calculator input
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct FeeRequest {
    pub client_type: ClientType,
    pub country: Country,
    #[validate(length(min = 1, message = "Monthly income is required"))]
    pub monthly_income: String,
    #[validate(range(min = 0, message = "Loan amount must not be negative"))]
    pub loan_amount: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeBreakdown {
    pub base_rate: i64,
    pub country_multiplier: f64,
    pub income_adjustment: f64,
    pub final_fee: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeResult {
    pub processing_fee: i64,
    pub description: String,
    pub breakdown: FeeBreakdown,
}

/// Compute the processing fee, clamped to [MIN_PROCESSING_FEE, MAX_PROCESSING_FEE]
pub fn calculate_processing_fee(request: &FeeRequest) -> FeeResult {
    let base_rate = request.client_type.base_fee();
    let country_multiplier = request.country.multiplier();
    let income_adjustment =
        IncomeBand::resolve(&request.monthly_income).adjustment(request.loan_amount);

    let raw_fee = (base_rate as f64 * country_multiplier * income_adjustment).round() as i64;
    let processing_fee = raw_fee.clamp(MIN_PROCESSING_FEE, MAX_PROCESSING_FEE);

    FeeResult {
        processing_fee,
        description: format!(
            "Frais de dossier pour {} - {}",
            request.client_type.label(),
            request.country.as_str()
        ),
        breakdown: FeeBreakdown {
            base_rate,
            country_multiplier,
            income_adjustment,
            final_fee: processing_fee,
        },
    }
}

/// Published fee range of a segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FeeRange {
    pub min: i64,
    pub max: i64,
}

/// Display ranges per segment. France publishes flat prices, so min == max.
pub fn fee_ranges() -> Vec<(ClientType, FeeRange)> {
    ClientType::ALL
        .into_iter()
        .map(|client_type| {
            let fee = client_type.base_fee();
            (client_type, FeeRange { min: fee, max: fee })
        })
        .collect()
}
