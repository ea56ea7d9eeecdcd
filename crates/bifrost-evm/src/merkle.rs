//! Keccak-256 merkle tree over dividend accounts.
//!
//! Each leaf is `keccak256(user || fee_amount)`, with the fee as a 32-byte big-endian integer.
//! Leaves are ordered by user address and padded with zero leaves up to a power of two, and
//! each parent is `keccak256(left || right)`.

use alloy::primitives::{B256, U256, keccak256};
use bifrost_types::{Address, topup::DividendAccount};

/// The leaf committing to one account.
pub fn account_leaf(account: &DividendAccount) -> B256 {
    let mut preimage = [0u8; 20 + 32];
    preimage[..20].copy_from_slice(account.user.as_bytes());
    preimage[20..].copy_from_slice(&U256::from(account.fee_amount).to_be_bytes::<32>());
    keccak256(preimage)
}

fn hash_pair(left: &B256, right: &B256) -> B256 {
    let mut preimage = [0u8; 64];
    preimage[..32].copy_from_slice(left.as_slice());
    preimage[32..].copy_from_slice(right.as_slice());
    keccak256(preimage)
}

/// Sorted, padded leaves for a set of accounts.
fn leaves(accounts: &[DividendAccount]) -> Vec<B256> {
    let mut sorted: Vec<&DividendAccount> = accounts.iter().collect();
    sorted.sort_by_key(|account| account.user);

    let mut leaves: Vec<B256> = sorted.into_iter().map(account_leaf).collect();
    leaves.resize(leaves.len().next_power_of_two(), B256::ZERO);
    leaves
}

fn parent_layer(layer: &[B256]) -> Vec<B256> {
    layer
        .chunks(2)
        .map(|pair| hash_pair(&pair[0], &pair[1]))
        .collect()
}

/// The merkle root over all accounts; zero if there are none.
pub fn account_root(accounts: &[DividendAccount]) -> B256 {
    if accounts.is_empty() {
        return B256::ZERO;
    }
    let mut layer = leaves(accounts);
    while layer.len() > 1 {
        layer = parent_layer(&layer);
    }
    layer[0]
}

/// The sibling path from `user`'s leaf up to the root, and the position of the leaf, if `user`
/// has an account.
pub fn account_proof(accounts: &[DividendAccount], user: Address) -> Option<(Vec<B256>, u64)> {
    let mut users: Vec<Address> = accounts.iter().map(|account| account.user).collect();
    users.sort();
    let index = users.binary_search(&user).ok()?;

    let mut proof = Vec::new();
    let mut layer = leaves(accounts);
    let mut position = index;
    while layer.len() > 1 {
        proof.push(layer[position ^ 1]);
        layer = parent_layer(&layer);
        position /= 2;
    }

    Some((proof, index as u64))
}

/// Check that `proof` links `account`'s leaf at position `index` to `root`.
pub fn verify_account_proof(
    root: B256,
    account: &DividendAccount,
    index: u64,
    proof: &[B256],
) -> bool {
    if proof.len() < 64 && index >> proof.len() != 0 {
        return false;
    }

    let mut hash = account_leaf(account);
    let mut position = index;
    for sibling in proof {
        hash = if position % 2 == 0 {
            hash_pair(&hash, sibling)
        } else {
            hash_pair(sibling, &hash)
        };
        position /= 2;
    }
    hash == root
}

/// Split a concatenated proof into its 32-byte hashes.
pub fn split_proof(bytes: &[u8]) -> Option<Vec<B256>> {
    if bytes.len() % 32 != 0 {
        return None;
    }
    Some(bytes.chunks(32).map(B256::from_slice).collect())
}

/// Concatenate a proof into bytes.
pub fn join_proof(proof: &[B256]) -> Vec<u8> {
    proof.iter().flat_map(|hash| hash.0).collect()
}
