// Custodian lookup tables
//
// Append-only: new names go at the end of their table. Fragments are matched
// case- and accent-insensitively on word boundaries; `name` is what the
// report shows. Legacy network labels are kept verbatim here and rewritten
// by `custody::network`.

pub type Entry = (&'static str, &'static str);

pub const GLOBAL_EXCHANGES: &[Entry] = &[
    ("binance", "Binance"),
    ("binance us", "Binance US"),
    ("coinbase", "Coinbase"),
    ("kraken", "Kraken"),
    ("bybit", "Bybit"),
    ("okx", "OKX"),
    ("kucoin", "KuCoin"),
    ("gate.io", "Gate.io"),
    ("mexc", "MEXC"),
    ("bitget", "Bitget"),
    ("bingx", "BingX"),
    ("bitfinex", "Bitfinex"),
    ("huobi", "Huobi"),
    ("htx", "HTX"),
    ("crypto.com", "Crypto.com"),
    ("bitso", "Bitso"),
    ("ftx", "FTX"),
    ("coinex", "CoinEx"),
    ("gemini", "Gemini"),
    ("bitstamp", "Bitstamp"),
];

pub const BRAZILIAN_EXCHANGES: &[Entry] = &[
    ("mercado bitcoin", "Mercado Bitcoin"),
    ("foxbit", "Foxbit"),
    ("novadax", "NovaDAX"),
    ("coinext", "Coinext"),
    ("bitcointrade", "BitcoinTrade"),
    ("bitpreco", "BitPreço"),
    ("brasil bitcoin", "Brasil Bitcoin"),
    ("ripio", "Ripio"),
    ("mynt", "Mynt"),
];

pub const NETWORKS: &[Entry] = &[
    ("bitcoin", "Bitcoin"),
    ("ethereum", "Ethereum"),
    ("solana", "Solana"),
    ("polygon", "Polygon"),
    ("matic", "Polygon"),
    ("arbitrum", "Arbitrum"),
    ("optimism", "Optimism"),
    ("avalanche", "Avalanche"),
    ("bnb smart chain", "BNB Smart Chain"),
    ("bnb chain", "BNB Smart Chain"),
    ("bnb smart chain (antigo)", "BNB Smart Chain (antigo)"),
    ("binance smart chain", "Binance Smart Chain"),
    ("bsc", "BSC"),
    ("base", "Base"),
    ("cardano", "Cardano"),
    ("polkadot", "Polkadot"),
    ("near protocol", "NEAR"),
    ("near", "NEAR"),
    ("cosmos", "Cosmos"),
    ("hedera", "Hedera"),
    ("tron", "Tron"),
    ("litecoin", "Litecoin"),
    ("bitcoin cash", "Bitcoin Cash"),
    ("stellar", "Stellar"),
    ("algorand", "Algorand"),
    ("tezos", "Tezos"),
    ("fantom", "Fantom"),
    ("cronos", "Cronos"),
    ("celo", "Celo"),
    ("zksync", "zkSync"),
    ("starknet", "Starknet"),
    ("aptos", "Aptos"),
    ("sui", "Sui"),
    ("injective", "Injective"),
    ("osmosis", "Osmosis"),
    ("thorchain", "THORChain"),
    ("celestia", "Celestia"),
    ("kava", "Kava"),
    ("zcash", "Zcash"),
    ("monero", "Monero"),
    ("dogecoin", "Dogecoin"),
];

/// Self-custody wallet brands; a match means a personal wallet
pub const WALLET_BRANDS: &[Entry] = &[
    ("ledger", "Ledger"),
    ("trezor", "Trezor"),
    ("metamask", "MetaMask"),
    ("trust wallet", "Trust Wallet"),
    ("exodus", "Exodus"),
    ("atomic wallet", "Atomic Wallet"),
    ("phantom", "Phantom"),
    ("solflare", "Solflare"),
    ("keplr", "Keplr"),
    ("rabby", "Rabby"),
    ("coinomi", "Coinomi"),
    ("myetherwallet", "MyEtherWallet"),
    ("zengo", "ZenGo"),
    ("safepal", "SafePal"),
    ("argent", "Argent"),
    ("electrum", "Electrum"),
    ("carteira pessoal", "Carteira Própria"),
    ("carteira propria", "Carteira Própria"),
];
