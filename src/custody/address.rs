// Wallet address extraction
//
// Finds the first address-shaped token in a source label and renders it in a
// partial form (first 6 + "..." + last 4) so two wallets stay distinguishable
// without the CSV exposing the full address.

use once_cell::sync::Lazy;
use regex::Regex;

const PREFIX_LEN: usize = 6;
const SUFFIX_LEN: usize = 4;
const ELLIPSIS: &str = "...";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressShape {
    /// 0x + 40 hex digits (Ethereum, BSC, Polygon, ...)
    Evm,
    /// xpub/ypub/zpub extended public key
    BitcoinExtendedKey,
    /// bc1 SegWit address
    BitcoinBech32,
    /// P2PKH/P2SH address starting with 1 or 3
    BitcoinLegacy,
    /// Bare base58 account (Solana and similar)
    Base58,
    /// Already shortened by the report, e.g. "0xcf...69"
    Shortened,
}

impl AddressShape {
    /// Network implied by the address format alone
    pub fn implied_network(&self) -> Option<&'static str> {
        match self {
            AddressShape::BitcoinExtendedKey
            | AddressShape::BitcoinBech32
            | AddressShape::BitcoinLegacy => Some("Bitcoin"),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletAddress {
    pub shape: AddressShape,
    pub raw: String,
}

impl WalletAddress {
    pub fn display(&self) -> String {
        shorten(&self.raw)
    }
}

// Order matters: specific shapes first, base58 and shortened forms as fallbacks.
static PATTERNS: Lazy<Vec<(AddressShape, Regex)>> = Lazy::new(|| {
    let build = |shape, pattern: &str| (shape, Regex::new(pattern).expect("valid address regex"));
    vec![
        build(AddressShape::Evm, r"\b0x[0-9a-fA-F]{40}\b"),
        build(
            AddressShape::BitcoinExtendedKey,
            r"\b[xyzXYZ]pub[1-9A-HJ-NP-Za-km-z]{50,}\b",
        ),
        build(AddressShape::BitcoinBech32, r"\bbc1[02-9ac-hj-np-z]{11,71}\b"),
        build(
            AddressShape::BitcoinLegacy,
            r"\b[13][1-9A-HJ-NP-Za-km-z]{25,34}\b",
        ),
        build(AddressShape::Base58, r"\b[1-9A-HJ-NP-Za-km-z]{32,44}\b"),
        build(
            AddressShape::Shortened,
            r"\b[0-9A-Za-z]{2,}(?:\.\.\.|…)[0-9A-Za-z]{2,}\b",
        ),
    ]
});

/// Find the first address-shaped substring in a label
pub fn extract_address(label: &str) -> Option<WalletAddress> {
    for (shape, regex) in PATTERNS.iter() {
        for found in regex.find_iter(label) {
            let candidate = found.as_str();
            if *shape == AddressShape::Base58 && !looks_like_base58_account(candidate) {
                continue;
            }
            return Some(WalletAddress {
                shape: *shape,
                raw: candidate.to_string(),
            });
        }
    }
    None
}

// Long words in labels are all letters; real accounts mix digits and both cases.
fn looks_like_base58_account(candidate: &str) -> bool {
    candidate.chars().any(|c| c.is_ascii_digit())
        && candidate.chars().any(|c| c.is_ascii_uppercase())
        && candidate.chars().any(|c| c.is_ascii_lowercase())
}

/// Render an address as prefix + "..." + suffix
pub fn shorten(address: &str) -> String {
    let address = address.trim();
    let split = address
        .split_once(ELLIPSIS)
        .or_else(|| address.split_once('…'));

    if let Some((head, tail)) = split {
        let prefix: String = head.chars().take(PREFIX_LEN).collect();
        let suffix = last_chars(tail, SUFFIX_LEN);
        return format!("{}{}{}", prefix, ELLIPSIS, suffix);
    }

    let len = address.chars().count();
    if len <= PREFIX_LEN + SUFFIX_LEN {
        return address.to_string();
    }

    let prefix: String = address.chars().take(PREFIX_LEN).collect();
    format!("{}{}{}", prefix, ELLIPSIS, last_chars(address, SUFFIX_LEN))
}

fn last_chars(s: &str, n: usize) -> String {
    let len = s.chars().count();
    s.chars().skip(len.saturating_sub(n)).collect()
}
