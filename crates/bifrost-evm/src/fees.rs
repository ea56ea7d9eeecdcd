//! EIP-1559 fee parameters for transactions sent to the main chain.

use alloy::{
    eips::BlockNumberOrTag,
    primitives::U64,
    rpc::{client::RpcClient, types::FeeHistory},
    transports::{TransportErrorKind, TransportResult, http::ReqwestTransport},
};

/// Fee parameters of a dynamic-fee transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Eip1559Fees {
    pub max_fee_per_gas: u128,
    pub max_priority_fee_per_gas: u128,
}

impl Eip1559Fees {
    /// Fees that stay valid for a few blocks of rising base fee: `2 * base_fee + tip`, capped at
    /// `max_fee_cap` if given. The tip never exceeds the resulting max fee.
    pub fn from_base_fee(base_fee: u128, tip: u128, max_fee_cap: Option<u128>) -> Self {
        let mut max_fee_per_gas = base_fee.saturating_mul(2).saturating_add(tip);
        if let Some(cap) = max_fee_cap {
            max_fee_per_gas = max_fee_per_gas.min(cap);
        }
        Self {
            max_fee_per_gas,
            max_priority_fee_per_gas: tip.min(max_fee_per_gas),
        }
    }

    /// Ask a node for the latest base fee and suggested tip, and derive fees from them.
    pub async fn estimate(rpc: &RpcClient<ReqwestTransport>, max_fee_cap: Option<u128>) -> TransportResult<Self> {
        let fee_history: FeeHistory = rpc
            .request(
                "eth_feeHistory",
                (U64::from(1), BlockNumberOrTag::Latest, &[] as &[f64]),
            )
            .await?;
        let Some(base_fee) = fee_history.latest_block_base_fee() else {
            return Err(TransportErrorKind::Custom("Base fee not found".into()).into());
        };

        let tip: U64 = rpc.request("eth_maxPriorityFeePerGas", ()).await?;

        Ok(Self::from_base_fee(base_fee, tip.to(), max_fee_cap))
    }
}

#[cfg(test)]
mod test {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn doubles_base_fee_and_adds_tip() {
        assert_eq!(
            Eip1559Fees::from_base_fee(10, 3, None),
            Eip1559Fees {
                max_fee_per_gas: 23,
                max_priority_fee_per_gas: 3
            }
        );
    }

    #[test]
    fn cap_also_limits_tip() {
        assert_eq!(
            Eip1559Fees::from_base_fee(10, 30, Some(20)),
            Eip1559Fees {
                max_fee_per_gas: 20,
                max_priority_fee_per_gas: 20
            }
        );
    }

    proptest! {
        #[test]
        fn tip_never_exceeds_max_fee(base in any::<u64>(), tip in any::<u64>(), cap in any::<Option<u64>>()) {
            let fees = Eip1559Fees::from_base_fee(base.into(), tip.into(), cap.map(Into::into));
            prop_assert!(fees.max_priority_fee_per_gas <= fees.max_fee_per_gas);
            if let Some(cap) = cap {
                prop_assert!(fees.max_fee_per_gas <= u128::from(cap));
            }
        }
    }
}
