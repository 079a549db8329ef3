//! Static pricing grids shown on the marketing site.
//!
//! These are published prices per market and are not derived from
//! [`calculate_processing_fee`](super::calculate_processing_fee).

use serde::Serialize;

use super::{ClientType, Country};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingEntry {
    pub client_type: ClientType,
    pub label: &'static str,
    pub price: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingGrid {
    pub country: Country,
    pub currency: &'static str,
    pub entries: Vec<PricingEntry>,
}

pub fn pricing_grid(country: Country) -> PricingGrid {
    let (currency, prices): (&'static str, [i64; 4]) = match country {
        Country::France => ("EUR", [150, 250, 300, 500]),
        Country::CoteDIvoire => ("FCFA", [50_000, 75_000, 100_000, 150_000]),
    };

    let entries = ClientType::ALL
        .into_iter()
        .zip(prices)
        .map(|(client_type, price)| PricingEntry {
            client_type,
            label: client_type.label(),
            price,
        })
        .collect();

    PricingGrid {
        country,
        currency,
        entries,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_france_grid_matches_base_fees() {
        let grid = pricing_grid(Country::France);
        assert_eq!(grid.currency, "EUR");
        for entry in grid.entries {
            assert_eq!(entry.price, entry.client_type.base_fee());
        }
    }

    #[test]
    fn test_ivory_coast_grid_in_fcfa() {
        let grid = pricing_grid(Country::CoteDIvoire);
        assert_eq!(grid.currency, "FCFA");
        assert_eq!(grid.entries[0].price, 50_000);
        assert_eq!(grid.entries[3].client_type, ClientType::Entreprise);
        assert_eq!(grid.entries[3].price, 150_000);
    }
}
