//! # Registration Transaction Builder
//!
//! One input (the selected identity output), one data-only output carrying
//! the frame, and change back to the identity. The fee is fixed.
//!
//! ```text
//! in[0]  identity P2PKH output  ──┐
//!                                 ├── out[0]  OP_RETURN "byrd" ‖ hash ‖ name   (0 sat)
//!                                 └── out[1]  change -> identity             (amount - fee)
//! ```
//!
//! Change below the dust limit is left out. Strict validation then rejects
//! the transaction because the implied fee no longer equals the fixed fee.

use super::errors::RegistrationError;
use super::identity::Identity;
use super::utxo::SpendableOutput;
use bitcoin::absolute::LockTime;
use bitcoin::consensus::encode;
use bitcoin::hashes::Hash;
use bitcoin::script::PushBytesBuf;
use bitcoin::secp256k1::{Message, Secp256k1};
use bitcoin::sighash::{EcdsaSighashType, SighashCache};
use bitcoin::transaction::Version;
use bitcoin::{Amount, ScriptBuf, Sequence, Transaction, TxIn, TxOut, Txid, Witness};
use nr_01_name_indexing::Frame;

/// Total fee paid by every registration.
pub const FIXED_FEE: Amount = Amount::from_sat(10_000);

/// Smallest change output worth creating.
pub const DUST_LIMIT: Amount = Amount::from_sat(546);

/// A signed registration ready for broadcast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedRegistration {
    pub transaction: Transaction,
    pub txid: Txid,
    pub raw: Vec<u8>,
}

/// Data-only output carrying `frame`.
pub fn frame_output(frame: &Frame) -> Result<TxOut, RegistrationError> {
    let push = PushBytesBuf::try_from(frame.encode().to_vec())
        .map_err(|e| RegistrationError::SerializationError(e.to_string()))?;
    Ok(TxOut {
        value: Amount::ZERO,
        script_pubkey: ScriptBuf::new_op_return(push),
    })
}

/// Unsigned transaction spending `funding` and carrying `frame`.
pub fn build_unsigned(
    funding: &SpendableOutput,
    frame: &Frame,
    change_script: ScriptBuf,
) -> Result<Transaction, RegistrationError> {
    let change = funding
        .amount
        .checked_sub(FIXED_FEE)
        .ok_or(RegistrationError::InsufficientFunds {
            required: FIXED_FEE.to_sat(),
        })?;

    let mut output = vec![frame_output(frame)?];
    if change >= DUST_LIMIT {
        output.push(TxOut {
            value: change,
            script_pubkey: change_script,
        });
    }

    Ok(Transaction {
        version: Version::TWO,
        lock_time: LockTime::ZERO,
        input: vec![TxIn {
            previous_output: funding.outpoint(),
            script_sig: ScriptBuf::new(),
            sequence: Sequence::MAX,
            witness: Witness::new(),
        }],
        output,
    })
}

/// Sign every input with `identity` (legacy P2PKH, SIGHASH_ALL).
pub fn sign(tx: &mut Transaction, identity: &Identity) -> Result<(), RegistrationError> {
    let secp = Secp256k1::signing_only();
    let script_code = identity.script_pubkey();

    let script_sigs = {
        let cache = SighashCache::new(&*tx);
        (0..tx.input.len())
            .map(|index| {
                let sighash = cache
                    .legacy_signature_hash(index, &script_code, EcdsaSighashType::All.to_u32())
                    .map_err(|e| RegistrationError::SigningError(e.to_string()))?;
                let message = Message::from_digest(sighash.to_byte_array());
                let signature = bitcoin::ecdsa::Signature::sighash_all(
                    secp.sign_ecdsa(&message, &identity.private_key().inner),
                );
                let push = PushBytesBuf::try_from(signature.to_vec())
                    .map_err(|e| RegistrationError::SigningError(e.to_string()))?;
                Ok(ScriptBuf::builder()
                    .push_slice(push)
                    .push_key(identity.public_key())
                    .into_script())
            })
            .collect::<Result<Vec<_>, RegistrationError>>()?
    };

    for (input, script_sig) in tx.input.iter_mut().zip(script_sigs) {
        input.script_sig = script_sig;
    }
    Ok(())
}

/// Strict structural checks before serialization.
pub fn validate(tx: &Transaction, input_value: Amount) -> Result<(), RegistrationError> {
    let reject = |reason: String| Err(RegistrationError::SerializationError(reason));

    if tx.input.is_empty() {
        return reject("transaction has no inputs".into());
    }
    if tx.output.is_empty() {
        return reject("transaction has no outputs".into());
    }
    if tx.input.iter().any(|input| input.script_sig.is_empty()) {
        return reject("transaction has unsigned inputs".into());
    }

    let mut output_value = Amount::ZERO;
    for output in &tx.output {
        if !output.script_pubkey.is_op_return() && output.value < DUST_LIMIT {
            return reject(format!("output of {} sat is dust", output.value.to_sat()));
        }
        output_value = match output_value.checked_add(output.value) {
            Some(total) => total,
            None => return reject("output value overflow".into()),
        };
    }

    let Some(fee) = input_value.checked_sub(output_value) else {
        return reject("outputs exceed inputs".into());
    };
    if fee != FIXED_FEE {
        return reject(format!(
            "fee of {} sat differs from the fixed {} sat",
            fee.to_sat(),
            FIXED_FEE.to_sat()
        ));
    }

    Ok(())
}

/// Build, sign, validate and serialize a registration.
pub fn build_registration(
    identity: &Identity,
    funding: &SpendableOutput,
    frame: &Frame,
) -> Result<SignedRegistration, RegistrationError> {
    let mut transaction = build_unsigned(funding, frame, identity.script_pubkey())?;
    sign(&mut transaction, identity)?;
    validate(&transaction, funding.amount)?;

    Ok(SignedRegistration {
        txid: transaction.compute_txid(),
        raw: encode::serialize(&transaction),
        transaction,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use bitcoin::Network;
    use nr_01_name_indexing::decode_output;
    use shared_types::{ContentHash, Name};

    fn frame() -> Frame {
        Frame::new(Name::new([0x11; 44]), ContentHash::new([0x22; 32]))
    }

    fn funding(identity: &Identity, sats: u64) -> SpendableOutput {
        SpendableOutput {
            txid: Txid::from_byte_array([0xAA; 32]),
            vout: 1,
            amount: Amount::from_sat(sats),
            address: identity.address().to_string(),
        }
    }

    #[test]
    fn test_registration_layout() {
        let identity = Identity::generate(Network::Testnet);
        let signed = build_registration(&identity, &funding(&identity, 100_000), &frame()).unwrap();
        let tx = &signed.transaction;

        assert_eq!(tx.input.len(), 1);
        assert_eq!(tx.input[0].previous_output.vout, 1);
        assert_eq!(tx.output.len(), 2);
        assert_eq!(decode_output(&tx.output[0]), Some(frame()));
        assert_eq!(tx.output[1].value, Amount::from_sat(90_000));
        assert_eq!(tx.output[1].script_pubkey, identity.script_pubkey());
    }

    #[test]
    fn test_raw_bytes_decode_to_same_txid() {
        let identity = Identity::generate(Network::Testnet);
        let signed = build_registration(&identity, &funding(&identity, 50_000), &frame()).unwrap();

        let decoded: Transaction = encode::deserialize(&signed.raw).unwrap();
        assert_eq!(decoded.compute_txid(), signed.txid);
    }

    #[test]
    fn test_inputs_are_signed() {
        let identity = Identity::generate(Network::Testnet);
        let signed = build_registration(&identity, &funding(&identity, 50_000), &frame()).unwrap();

        let script_sig = &signed.transaction.input[0].script_sig;
        // signature push followed by the compressed public key push
        assert_eq!(script_sig.instructions().count(), 2);
    }

    #[test]
    fn test_exact_fee_funding_has_no_change() {
        let identity = Identity::generate(Network::Testnet);
        let signed = build_registration(&identity, &funding(&identity, 10_000), &frame()).unwrap();
        assert_eq!(signed.transaction.output.len(), 1);
    }

    #[test]
    fn test_dust_change_is_rejected() {
        let identity = Identity::generate(Network::Testnet);
        let result = build_registration(&identity, &funding(&identity, 10_100), &frame());
        assert!(matches!(result, Err(RegistrationError::SerializationError(_))));
    }

    #[test]
    fn test_underfunded_output_is_insufficient() {
        let identity = Identity::generate(Network::Testnet);
        let result = build_unsigned(&funding(&identity, 9_999), &frame(), identity.script_pubkey());
        assert_eq!(
            result,
            Err(RegistrationError::InsufficientFunds { required: 10_000 })
        );
    }

    #[test]
    fn test_validate_rejects_unsigned() {
        let identity = Identity::generate(Network::Testnet);
        let funding = funding(&identity, 50_000);
        let tx = build_unsigned(&funding, &frame(), identity.script_pubkey()).unwrap();
        assert!(validate(&tx, funding.amount).is_err());
    }
}
