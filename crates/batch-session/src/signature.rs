use bitcoin::{
    secp256k1::{self, schnorr},
    taproot, TapSighashType,
};
use thiserror::Error;

/// Size of a BIP340 signature without sighash byte.
const SCHNORR_SIG_LEN: usize = 64;

#[derive(Debug, Error)]
pub enum SignatureDecodeError {
    #[error("invalid hex: {0}")]
    Hex(#[from] hex::FromHexError),

    #[error("expected 64 bytes, got {0}")]
    Length(usize),

    #[error("invalid schnorr signature: {0}")]
    Schnorr(#[from] secp256k1::Error),
}

/// Decodes a hex encoded 64-byte tree signature into a key-path signature
/// with the default sighash.
pub fn decode_tap_key_sig(hex_sig: &str) -> Result<taproot::Signature, SignatureDecodeError> {
    let bytes = hex::decode(hex_sig)?;
    if bytes.len() != SCHNORR_SIG_LEN {
        return Err(SignatureDecodeError::Length(bytes.len()));
    }
    Ok(taproot::Signature {
        signature: schnorr::Signature::from_slice(&bytes)?,
        sighash_type: TapSighashType::Default,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode() {
        let sig = decode_tap_key_sig(&"ab".repeat(64)).unwrap();
        assert_eq!(sig.signature.serialize(), [0xab; 64]);
        assert_eq!(sig.sighash_type, TapSighashType::Default);
    }

    #[test]
    fn test_decode_rejects_bad_input() {
        assert!(matches!(
            decode_tap_key_sig("zz"),
            Err(SignatureDecodeError::Hex(_))
        ));
        // 65 bytes: a sighash byte is not accepted on the wire.
        assert!(matches!(
            decode_tap_key_sig(&"01".repeat(65)),
            Err(SignatureDecodeError::Length(65))
        ));
        assert!(matches!(
            decode_tap_key_sig(""),
            Err(SignatureDecodeError::Length(0))
        ));
    }
}
