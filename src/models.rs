use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Text fragment believed to describe one holding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawBlock {
    pub text: String,
    /// 1-based line number in the extracted text
    pub line: usize,
    /// Wallet title the block was listed under, when the report is sectioned
    pub context: Option<String>,
}

/// Parsed holding, immutable once created
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Holding {
    pub ticker: String,
    pub quantity: Decimal,
    /// Value in BRL on 31 December of the report year
    pub value_brl: Decimal,
    pub source_label: String,
    pub line: usize,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum SourceKind {
    Exchange,
    PersonalWallet,
    Unknown,
}

/// Generic display name for a self-custodied wallet without a known brand
pub const OWN_WALLET_NAME: &str = "Carteira Própria";

/// Classification of a holding's source label
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct SourceInfo {
    pub kind: SourceKind,
    pub display_name: String,
    pub network: Option<String>,
    /// Partial display form, never the full address
    pub address: Option<String>,
}

impl SourceInfo {
    pub fn exchange(name: &str) -> Self {
        SourceInfo {
            kind: SourceKind::Exchange,
            display_name: name.to_string(),
            network: None,
            address: None,
        }
    }

    pub fn unknown(label: &str) -> Self {
        SourceInfo {
            kind: SourceKind::Unknown,
            display_name: label.to_string(),
            network: None,
            address: None,
        }
    }

    pub fn with_address(mut self, address: Option<String>) -> Self {
        self.address = address;
        self
    }
}

/// What goes into the "Valor R$ 31/12/YYYY" column
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ValueBasis {
    /// Market value on 31 December, from the wallet tables
    #[default]
    Market,
    /// Acquisition cost, split across wallets by quantity
    Cost,
}

/// Final CSV row, one per distinct ticker in a file
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct OutputRecord {
    pub ticker: String,
    pub quantity: Decimal,
    pub value_brl: Decimal,
    pub discrimination: String,
    /// Filled in manually by the taxpayer
    pub cnpj: String,
}
