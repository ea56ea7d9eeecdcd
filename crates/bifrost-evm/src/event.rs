use alloy::{
    primitives::{Address, U256},
    sol,
    sol_types::SolEvent,
};

use crate::TxReceipt;

sol! {
    /// Emitted by the staking info contract when a user tops up its fee balance.
    event TopUpFee(address indexed user, uint256 indexed fee);
}

/// A decoded `TopUpFee` event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TopupFeeEvent {
    pub user: bifrost_types::Address,
    pub fee: u128,
}

/// Find the `TopUpFee` event at `log_index` in a receipt, emitted by the `staking_info` contract.
///
/// Returns `None` if there is no such log, if it was emitted by another contract, if it is not a
/// `TopUpFee` event, or if its fee does not fit in 128 bits.
pub fn decode_topup_fee_event(
    receipt: &TxReceipt,
    staking_info: bifrost_types::Address,
    log_index: u64,
) -> Option<TopupFeeEvent> {
    let log = receipt.logs.iter().find(|log| log.log_index == log_index)?;

    if log.address != Address::from(staking_info.0) {
        return None;
    }

    let [topic0, user, fee, ..] = log.topics.as_slice() else {
        return None;
    };
    if *topic0 != TopUpFee::SIGNATURE_HASH {
        return None;
    }

    let fee = U256::from_be_bytes(fee.0);
    Some(TopupFeeEvent {
        user: bifrost_types::Address(Address::from_word(*user).0.0),
        fee: u128::try_from(fee).ok()?,
    })
}

#[cfg(test)]
mod test {
    use alloy::primitives::{B256, Bytes};

    use super::*;
    use crate::ReceiptLog;

    const STAKING_INFO: bifrost_types::Address = bifrost_types::Address([0x5a; 20]);

    fn topup_log(log_index: u64, user: [u8; 20], fee: u128) -> ReceiptLog {
        ReceiptLog {
            address: Address::from(STAKING_INFO.0),
            topics: vec![
                TopUpFee::SIGNATURE_HASH,
                Address::from(user).into_word(),
                B256::from(U256::from(fee)),
            ],
            data: Bytes::new(),
            log_index,
        }
    }

    fn receipt(logs: Vec<ReceiptLog>) -> TxReceipt {
        TxReceipt {
            tx_hash: B256::repeat_byte(1),
            block_number: 100,
            status: true,
            logs,
        }
    }

    #[test]
    fn decodes_matching_log() {
        let receipt = receipt(vec![topup_log(0, [1; 20], 7), topup_log(3, [2; 20], 9)]);
        assert_eq!(
            decode_topup_fee_event(&receipt, STAKING_INFO, 3),
            Some(TopupFeeEvent {
                user: bifrost_types::Address([2; 20]),
                fee: 9
            })
        );
    }

    #[test]
    fn ignores_missing_index() {
        let receipt = receipt(vec![topup_log(0, [1; 20], 7)]);
        assert_eq!(decode_topup_fee_event(&receipt, STAKING_INFO, 1), None);
    }

    #[test]
    fn ignores_other_contracts() {
        let mut log = topup_log(0, [1; 20], 7);
        log.address = Address::repeat_byte(0x11);
        assert_eq!(
            decode_topup_fee_event(&receipt(vec![log]), STAKING_INFO, 0),
            None
        );
    }

    #[test]
    fn ignores_other_events() {
        let mut log = topup_log(0, [1; 20], 7);
        log.topics[0] = B256::repeat_byte(0xee);
        assert_eq!(
            decode_topup_fee_event(&receipt(vec![log]), STAKING_INFO, 0),
            None
        );
    }

    #[test]
    fn ignores_oversized_fee() {
        let mut log = topup_log(0, [1; 20], 7);
        log.topics[2] = B256::from(U256::MAX);
        assert_eq!(
            decode_topup_fee_event(&receipt(vec![log]), STAKING_INFO, 0),
            None
        );
    }
}
