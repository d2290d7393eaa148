// Binance Smart Chain naming fix-up
//
// Koinly still labels BNB Smart Chain wallets with the chain's former names.
// This is a single substitution applied after classification; running it on
// an already corrected SourceInfo is a no-op.

use tracing::debug;

use crate::models::SourceInfo;

pub const BSC_CANONICAL_NAME: &str = "BNB Smart Chain";

/// Names the report generator uses for BNB Smart Chain, longest first
pub const BSC_LEGACY_NAMES: &[&str] = &["BNB Smart Chain (antigo)", "Binance Smart Chain", "BSC"];

/// Rewrite a legacy BSC network name to the current one
pub fn correct_network(info: SourceInfo) -> SourceInfo {
    let legacy = info
        .network
        .as_deref()
        .and_then(|network| BSC_LEGACY_NAMES.iter().copied().find(|name| *name == network));
    let Some(legacy) = legacy else {
        return info;
    };

    debug!("Correcting network '{}' -> '{}'", legacy, BSC_CANONICAL_NAME);

    let display_name = if info.display_name.contains(legacy) {
        info.display_name.replace(legacy, BSC_CANONICAL_NAME)
    } else {
        info.display_name
    };

    SourceInfo {
        display_name,
        network: Some(BSC_CANONICAL_NAME.to_string()),
        ..info
    }
}
