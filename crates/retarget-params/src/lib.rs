//! Per-network consensus parameters consumed by the difficulty retargeting core.

pub type Hash256 = [u8; 32];

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Network {
    Main,
    Test,
    Regtest,
}

impl Network {
    pub fn as_str(self) -> &'static str {
        match self {
            Network::Main => "main",
            Network::Test => "test",
            Network::Regtest => "regtest",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "main" | "mainnet" => Some(Network::Main),
            "test" | "testnet" => Some(Network::Test),
            "regtest" => Some(Network::Regtest),
            _ => None,
        }
    }
}

#[derive(Debug, Eq, PartialEq)]
pub enum HexError {
    InvalidLength,
    InvalidHex,
}

impl std::fmt::Display for HexError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HexError::InvalidLength => write!(f, "hash hex string is too long"),
            HexError::InvalidHex => write!(f, "hash hex string contains non-hex digits"),
        }
    }
}

impl std::error::Error for HexError {}

/// Parses a big-endian hash hex string (as displayed by block explorers) into
/// little-endian byte storage, matching this codebase's `Hash256` convention.
pub fn hash256_from_hex(input: &str) -> Result<Hash256, HexError> {
    let mut hex = input.trim();
    if let Some(stripped) = hex.strip_prefix("0x").or_else(|| hex.strip_prefix("0X")) {
        hex = stripped;
    }
    if hex.is_empty() {
        return Err(HexError::InvalidLength);
    }

    let mut hex_owned = if hex.len() % 2 == 1 {
        let mut padded = String::with_capacity(hex.len() + 1);
        padded.push('0');
        padded.push_str(hex);
        padded
    } else {
        hex.to_string()
    };

    if hex_owned.len() > 64 {
        return Err(HexError::InvalidLength);
    }
    if hex_owned.len() < 64 {
        let mut padded = String::with_capacity(64);
        for _ in 0..(64 - hex_owned.len()) {
            padded.push('0');
        }
        padded.push_str(&hex_owned);
        hex_owned = padded;
    }

    let mut bytes = [0u8; 32];
    for (i, byte_out) in bytes.iter_mut().enumerate() {
        let start = i * 2;
        let byte = u8::from_str_radix(&hex_owned[start..start + 2], 16)
            .map_err(|_| HexError::InvalidHex)?;
        *byte_out = byte;
    }
    bytes.reverse();
    Ok(bytes)
}

/// Consensus parameters that the difficulty retargeting core reads. Constructed
/// once at process start from [`consensus_params`] and never mutated afterward.
#[derive(Clone, Debug)]
pub struct ChainParams {
    pub network: Network,
    pub genesis_time: i64,
    pub genesis_bits: u32,
    pub hash_genesis_block: Hash256,
    pub pow_limit: Hash256,
    pub pow_target_spacing: i64,
    pub pow_target_timespan: i64,
    pub allow_min_difficulty_blocks: bool,
    pub no_retargeting: bool,
}

pub fn consensus_params(network: Network) -> ChainParams {
    match network {
        Network::Main => mainnet_params(),
        Network::Test => testnet_params(),
        Network::Regtest => regtest_params(),
    }
}

fn mainnet_params() -> ChainParams {
    ChainParams {
        network: Network::Main,
        genesis_time: 1_498_253_423,
        genesis_bits: 0x1e0f_fff0,
        hash_genesis_block: hash256_from_hex(
            "000002acd994a815401fbaae0e52404b32857efd0b7b0c77b8e0715ccdd6d437",
        )
        .expect("mainnet genesis hash"),
        pow_limit: hash256_from_hex(
            "00000fffff000000000000000000000000000000000000000000000000000000",
        )
        .expect("mainnet pow limit"),
        pow_target_spacing: 40,
        pow_target_timespan: 120,
        allow_min_difficulty_blocks: false,
        no_retargeting: false,
    }
}

fn testnet_params() -> ChainParams {
    ChainParams {
        network: Network::Test,
        genesis_time: 1_498_253_504,
        genesis_bits: 0x1e0f_fff0,
        hash_genesis_block: hash256_from_hex(
            "00000c4e1485ee323e0dfab3c8afa871ceceff8822b9abe68005e22576d47a6f",
        )
        .expect("testnet genesis hash"),
        pow_limit: hash256_from_hex(
            "00000fffff000000000000000000000000000000000000000000000000000000",
        )
        .expect("testnet pow limit"),
        pow_target_spacing: 40,
        pow_target_timespan: 60,
        allow_min_difficulty_blocks: true,
        no_retargeting: false,
    }
}

fn regtest_params() -> ChainParams {
    ChainParams {
        network: Network::Regtest,
        genesis_time: 1_498_253_597,
        genesis_bits: 0x1e0f_fff0,
        hash_genesis_block: hash256_from_hex(
            "0000014536730b6914fb4ce0f3f53c3d204b6602d2637ac83a17eacb13725b53",
        )
        .expect("regtest genesis hash"),
        // Regtest's ceiling is deliberately much looser than the genesis
        // target so `allow_min_difficulty_blocks` has somewhere to go.
        pow_limit: hash256_from_hex(
            "7fffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff",
        )
        .expect("regtest pow limit"),
        pow_target_spacing: 40,
        pow_target_timespan: 24 * 60 * 60,
        allow_min_difficulty_blocks: true,
        no_retargeting: true,
    }
}
