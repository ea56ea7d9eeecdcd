//! Chain configuration, set from the genesis app state and stored in the chain state.

use bifrost_proto::state as proto;
use serde::{Deserialize, Serialize};

use crate::{Address, DomainType, ParseError, format_amount, parse_amount, topup::amount_string};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub chain: ChainConfig,
    pub topup: TopupConfig,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainConfig {
    /// How many main chain blocks must be built on top of a transaction before it is trusted.
    pub main_chain_tx_confirmations: u64,
    /// The main chain contract which emits `TopUpFee` events.
    pub staking_info_address: Address,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            main_chain_tx_confirmations: 6,
            staking_info_address: Address::ZERO,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TopupConfig {
    /// The minimum topup fee, paid to the proposer of a successful topup.
    #[serde(with = "amount_string")]
    pub default_fee_wanted_per_tx: u128,
}

impl DomainType for Config {
    type Proto = proto::Config;

    fn to_proto(&self) -> Self::Proto {
        proto::Config {
            chain: Some(proto::ChainConfig {
                main_chain_tx_confirmations: self.chain.main_chain_tx_confirmations,
                staking_info_address: self.chain.staking_info_address.to_string(),
            }),
            topup: Some(proto::TopupConfig {
                default_fee_wanted_per_tx: format_amount(self.topup.default_fee_wanted_per_tx),
            }),
        }
    }

    fn from_proto(proto: Self::Proto) -> Result<Self, ParseError> {
        let chain = proto
            .chain
            .ok_or_else(|| ParseError::new::<ChainConfig>("missing"))?;
        let topup = proto
            .topup
            .ok_or_else(|| ParseError::new::<TopupConfig>("missing"))?;
        Ok(Config {
            chain: ChainConfig {
                main_chain_tx_confirmations: chain.main_chain_tx_confirmations,
                staking_info_address: chain.staking_info_address.parse()?,
            },
            topup: TopupConfig {
                default_fee_wanted_per_tx: parse_amount(&topup.default_fee_wanted_per_tx)?,
            },
        })
    }
}
