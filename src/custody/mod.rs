//! Custody identification: which exchange, wallet or network holds an asset
//!
//! The classifier is built once from the static tables in [`tables`] (plus
//! any entries appended through the config file) and is read-only afterwards.

pub mod address;
pub mod network;
pub mod tables;

use itertools::Itertools;
use tracing::debug;
use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

use crate::config::{ClassificationConfig, TableEntry};
use crate::error::ConversionError;
use crate::models::{SourceInfo, SourceKind, OWN_WALLET_NAME};

pub use address::{extract_address, AddressShape, WalletAddress};
pub use network::correct_network;

#[derive(Debug, Clone)]
struct Pattern {
    fragment: String,
    name: String,
}

impl Pattern {
    fn new(fragment: &str, name: &str) -> Self {
        Pattern {
            fragment: normalize_label(fragment),
            name: name.trim().to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Hit<'a> {
    start: usize,
    end: usize,
    order: usize,
    name: &'a str,
}

impl Hit<'_> {
    fn len(&self) -> usize {
        self.end - self.start
    }
}

/// Result of classifying one label
#[derive(Debug)]
pub struct Classification {
    pub info: SourceInfo,
    /// Set when the label had to fall back to Unknown because it named several custodians
    pub ambiguity: Option<ConversionError>,
}

impl From<SourceInfo> for Classification {
    fn from(info: SourceInfo) -> Self {
        Classification {
            info,
            ambiguity: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SourceClassifier {
    /// Global exchanges, then Brazilian ones, then config extras
    exchanges: Vec<Pattern>,
    networks: Vec<Pattern>,
    wallets: Vec<Pattern>,
    /// Network names that contain an exchange name ("binance smart chain")
    exchange_lookalikes: Vec<String>,
}

impl Default for SourceClassifier {
    fn default() -> Self {
        Self::with_extras(&ClassificationConfig::default())
    }
}

impl SourceClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_extras(extras: &ClassificationConfig) -> Self {
        let build = |builtin: &[tables::Entry], extra: &[TableEntry]| -> Vec<Pattern> {
            builtin
                .iter()
                .map(|(fragment, name)| Pattern::new(fragment, name))
                .chain(extra.iter().map(|e| Pattern::new(&e.fragment, &e.name)))
                .collect()
        };

        let builtin_exchanges: Vec<tables::Entry> = tables::GLOBAL_EXCHANGES
            .iter()
            .chain(tables::BRAZILIAN_EXCHANGES)
            .copied()
            .collect();
        let exchanges = build(builtin_exchanges.as_slice(), extras.extra_exchanges.as_slice());
        let networks = build(tables::NETWORKS, extras.extra_networks.as_slice());
        let wallets = build(tables::WALLET_BRANDS, extras.extra_wallets.as_slice());

        let exchange_lookalikes = networks
            .iter()
            .filter(|n| {
                exchanges
                    .iter()
                    .any(|e| find_word(&n.fragment, &e.fragment).is_some())
            })
            .map(|n| n.fragment.clone())
            .unique()
            .collect();

        SourceClassifier {
            exchanges,
            networks,
            wallets,
            exchange_lookalikes,
        }
    }

    /// Map a free-text source label to a custodian.
    ///
    /// Priority: exact exchange name > exchange named inside the label >
    /// wallet brand / network / address shape > Unknown. An exchange always
    /// beats a network mentioned in the same label.
    pub fn classify(&self, label: &str) -> Classification {
        let label = label.trim();
        let normalized = normalize_label(label);
        let address = extract_address(label);
        let address_display = address.as_ref().map(WalletAddress::display);

        if normalized.is_empty() {
            return SourceInfo::unknown(label).into();
        }

        if let Some(exact) = self.exchanges.iter().find(|p| p.fragment == normalized) {
            debug!("Exact exchange match: '{}' -> {}", label, exact.name);
            return SourceInfo::exchange(&exact.name)
                .with_address(address_display)
                .into();
        }

        let masked = self.mask_exchange_lookalikes(&normalized);
        let exchange_hits = find_hits(&self.exchanges, &masked);
        let exchange_names: Vec<&str> = exchange_hits.iter().map(|h| h.name).unique().collect();

        match exchange_names.as_slice() {
            [] => {}
            [name] => {
                debug!("Exchange match: '{}' -> {}", label, name);
                return SourceInfo::exchange(name).with_address(address_display).into();
            }
            several => {
                let reason = format!("names several exchanges ({})", several.join(", "));
                debug!("Ambiguous label '{}': {}", label, reason);
                return Classification {
                    info: SourceInfo::unknown(label).with_address(address_display),
                    ambiguity: Some(ConversionError::ClassificationAmbiguity {
                        label: label.to_string(),
                        reason,
                    }),
                };
            }
        }

        let network = find_hits(&self.networks, &normalized)
            .first()
            .map(|h| h.name.to_string())
            .or_else(|| {
                address
                    .as_ref()
                    .and_then(|a| a.shape.implied_network())
                    .map(str::to_string)
            });
        let brand = find_hits(&self.wallets, &normalized)
            .first()
            .map(|h| h.name.to_string());

        if brand.is_none() && network.is_none() && address.is_none() {
            debug!("No custodian recognised in '{}'", label);
            return SourceInfo::unknown(label).into();
        }

        let info = SourceInfo {
            kind: SourceKind::PersonalWallet,
            display_name: brand.unwrap_or_else(|| OWN_WALLET_NAME.to_string()),
            network,
            address: address_display,
        };
        debug!("Wallet match: '{}' -> {:?}", label, info);
        info.into()
    }

    /// Classify and apply the network fix-ups in one step
    pub fn identify(&self, label: &str) -> Classification {
        let Classification { info, ambiguity } = self.classify(label);
        Classification {
            info: correct_network(info),
            ambiguity,
        }
    }

    fn mask_exchange_lookalikes(&self, normalized: &str) -> String {
        let mut masked = normalized.to_string();
        for lookalike in &self.exchange_lookalikes {
            while let Some((start, end)) = find_word(&masked, lookalike) {
                masked.replace_range(start..end, &" ".repeat(end - start));
            }
        }
        masked
    }
}

/// Lowercase, strip accents and collapse whitespace
pub fn normalize_label(label: &str) -> String {
    label
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
        .split_whitespace()
        .join(" ")
}

/// Byte span of the first occurrence of `needle` that sits on word boundaries
fn find_word(haystack: &str, needle: &str) -> Option<(usize, usize)> {
    if needle.is_empty() {
        return None;
    }
    haystack
        .match_indices(needle)
        .map(|(start, _)| (start, start + needle.len()))
        .find(|&(start, end)| {
            let before = haystack[..start].chars().next_back();
            let after = haystack[end..].chars().next();
            before.map_or(true, |c| !c.is_alphanumeric())
                && after.map_or(true, |c| !c.is_alphanumeric())
        })
}

/// All table entries found in the label, minus hits nested inside a longer
/// hit, ordered by position, then length, then table order.
fn find_hits<'a>(patterns: &'a [Pattern], haystack: &str) -> Vec<Hit<'a>> {
    let hits: Vec<Hit<'a>> = patterns
        .iter()
        .enumerate()
        .filter_map(|(order, p)| {
            find_word(haystack, &p.fragment).map(|(start, end)| Hit {
                start,
                end,
                order,
                name: p.name.as_str(),
            })
        })
        .collect();

    hits.iter()
        .filter(|h| {
            !hits
                .iter()
                .any(|o| o.start <= h.start && h.end <= o.end && o.len() > h.len())
        })
        .copied()
        .sorted_by_key(|h| (h.start, std::cmp::Reverse(h.len()), h.order))
        .collect()
}
