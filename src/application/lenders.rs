//! Partner lender catalogue

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Lender {
    pub id: &'static str,
    pub name: &'static str,
}

pub static LENDERS: [Lender; 5] = [
    Lender { id: "BANK001", name: "Crédit Mutuel" },
    Lender { id: "BANK002", name: "BNP Paribas" },
    Lender { id: "BANK003", name: "Société Générale" },
    Lender { id: "BANK004", name: "LCL" },
    Lender { id: "BANK005", name: "Crédit Agricole" },
];

pub fn find_lender(id: &str) -> Option<&'static Lender> {
    LENDERS.iter().find(|lender| lender.id == id)
}
