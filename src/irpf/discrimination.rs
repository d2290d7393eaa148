// Discriminação text for the IRPF "Bens e Direitos" crypto entries
//
//   BTC custodiado na exchange Binance
//   ETH custodiado em carteira própria MetaMask na rede Arbitrum, endereço 0xcf...69
//   SOL custodiado em Minha conta XYZ
//
// Pure function of (ticker, SourceInfo): same input, same bytes.

use crate::models::{SourceInfo, SourceKind, OWN_WALLET_NAME};

const UNIDENTIFIED_SOURCE: &str = "origem não identificada";

/// Build the description for one holding's custody
pub fn format_discrimination(ticker: &str, source: &SourceInfo) -> String {
    let name = source.display_name.trim();

    let mut text = match source.kind {
        SourceKind::Exchange => format!("{} custodiado na exchange {}", ticker, name),
        SourceKind::PersonalWallet => {
            let mut text = format!("{} custodiado em carteira própria", ticker);
            if !name.is_empty() && name != OWN_WALLET_NAME {
                text.push(' ');
                text.push_str(name);
            }
            if let Some(network) = &source.network {
                text.push_str(" na rede ");
                text.push_str(network);
            }
            text
        }
        SourceKind::Unknown if name.is_empty() => {
            format!("{} custodiado em {}", ticker, UNIDENTIFIED_SOURCE)
        }
        SourceKind::Unknown => format!("{} custodiado em {}", ticker, name),
    };

    // Unknown labels are printed verbatim and already carry whatever address they had
    if source.kind != SourceKind::Unknown {
        if let Some(address) = &source.address {
            text.push_str(", endereço ");
            text.push_str(address);
        }
    }

    text
}
