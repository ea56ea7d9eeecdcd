use super::*;
use crate::transaction::{Msg, MsgWithdrawFeeTx, Signature, Transaction, msg};

fn withdraw_tx(public_key: &[u8]) -> Transaction {
    Transaction {
        chain_id: "test_chain".into(),
        msg: Some(Msg {
            msg: Some(msg::Msg::WithdrawFeeTx(MsgWithdrawFeeTx {
                signature: Some(Signature::unsigned(Bytes::copy_from_slice(public_key))),
                amount: "100".into(),
            })),
        }),
    }
}

fn signature_of(tx: &mut Transaction) -> &mut Signature {
    tx.msg
        .as_mut()
        .and_then(Msg::signature_mut)
        .expect("transaction has a signature slot")
}

#[test]
fn sign_and_verify() {
    let keypair = KeyPair::generate().unwrap();
    let tx = withdraw_tx(keypair.public_key());

    let mut signed_tx = tx.clone().sign_all(&keypair).unwrap();
    assert!(!signature_of(&mut signed_tx).signature.is_empty());

    let bytes = signed_tx.encode_to_vec();
    let authenticated = Transaction::authenticate_from_proto(&bytes).unwrap();

    // Signatures are stripped, so the authenticated transaction equals the unsigned one:
    assert_eq!(authenticated, tx);
}

#[test]
fn sign_and_verify_bad_sig() {
    let keypair = KeyPair::generate().unwrap();
    let mut signed_tx = withdraw_tx(keypair.public_key()).sign_all(&keypair).unwrap();

    let signature = signature_of(&mut signed_tx);
    let mut sig_bytes = signature.signature.to_vec();
    sig_bytes[0] ^= 0xFF;
    signature.signature = sig_bytes.into();

    assert!(signed_tx.verify_all().is_err());
}

#[test]
fn sign_and_verify_missing_sig() {
    let keypair = KeyPair::generate().unwrap();
    let mut signed_tx = withdraw_tx(keypair.public_key()).sign_all(&keypair).unwrap();

    signature_of(&mut signed_tx).signature = Bytes::new();

    assert!(signed_tx.verify_all().is_err());
}

#[test]
fn sign_with_wrong_key() {
    let keypair = KeyPair::generate().unwrap();
    let other = KeyPair::generate().unwrap();

    let result = withdraw_tx(keypair.public_key()).sign_all(&other);
    assert!(matches!(result, Err(SignError::MissingKeypair)));
}

#[test]
fn sign_twice() {
    let keypair = KeyPair::generate().unwrap();
    let signed_tx = withdraw_tx(keypair.public_key()).sign_all(&keypair).unwrap();

    assert!(matches!(
        signed_tx.sign_all(&keypair),
        Err(SignError::AlreadySigned)
    ));
}

#[test]
fn hash_ignores_signatures() {
    let keypair = KeyPair::generate().unwrap();
    let tx = withdraw_tx(keypair.public_key());
    let signed_tx = tx.clone().sign_all(&keypair).unwrap();

    assert_eq!(tx.hash().as_ref(), signed_tx.hash().as_ref());
}

#[test]
fn keypair_roundtrips_through_pkcs8() {
    let keypair = KeyPair::generate().unwrap();
    let decoded = KeyPair::decode(&keypair.encode()).unwrap();
    assert_eq!(keypair.public_key(), decoded.public_key());
}

#[test]
fn keypairs_sign_by_public_key() {
    let a = KeyPair::generate().unwrap();
    let b = KeyPair::generate().unwrap();
    let b_public = b.public_key().to_vec();
    let keypairs: KeyPairs = [a, b].into_iter().collect();

    let tx = withdraw_tx(&b_public);
    let bytes = tx.sign_to_proto(&keypairs).unwrap();
    assert!(Transaction::authenticate_from_proto(bytes).is_ok());
}
