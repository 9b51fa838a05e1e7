//! Wallet signature recovery for challenge authentication.
//!
//! Clients sign the challenge string with their wallet key using the
//! `personal_sign` scheme: the message is prefixed with
//! `"\x19Ethereum Signed Message:\n" + len` before hashing, and the signer's
//! address is recovered from the 65-byte secp256k1 signature alone. No public
//! key ever reaches the server.

use alloy::primitives::Signature;

use super::error::{AuthError, AuthErrorCode};

/// Recover the lowercased `0x…` address that signed `message`.
///
/// Pure and side-effect free. Fails with `InvalidSignature` when the hex is
/// malformed, the signature is not 65 bytes, or curve recovery fails.
pub fn recover_signer(message: &str, signature_hex: &str) -> Result<String, AuthError> {
    let raw = signature_hex
        .strip_prefix("0x")
        .unwrap_or(signature_hex);

    let bytes = hex::decode(raw)
        .map_err(|_| AuthError::new(AuthErrorCode::InvalidSignature, "Signature is not hex"))?;

    let signature = Signature::from_raw(&bytes).map_err(|e| {
        AuthError::new(
            AuthErrorCode::InvalidSignature,
            format!("Malformed signature: {}", e),
        )
    })?;

    // recover_address_from_msg applies the EIP-191 personal-sign prefix
    // before hashing, matching what wallets sign.
    let address = signature.recover_address_from_msg(message).map_err(|e| {
        AuthError::new(
            AuthErrorCode::InvalidSignature,
            format!("Recovery failed: {}", e),
        )
    })?;

    Ok(format!("0x{}", hex::encode(address.as_slice())))
}

/// `0x` + 40 hex characters.
pub fn is_valid_address(address: &str) -> bool {
    let Some(body) = address.strip_prefix("0x") else {
        return false;
    };
    body.len() == 40 && body.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Validate and lowercase a claimed wallet address.
pub fn normalize_address(address: &str) -> Result<String, AuthError> {
    if !is_valid_address(address) {
        return Err(AuthError::from_code(AuthErrorCode::InvalidAddress));
    }
    Ok(address.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::signers::SignerSync;
    use alloy::signers::local::PrivateKeySigner;

    fn sign(signer: &PrivateKeySigner, message: &str) -> String {
        let sig = signer
            .sign_message_sync(message.as_bytes())
            .expect("signing cannot fail");
        format!("0x{}", hex::encode(sig.as_bytes()))
    }

    fn address_of(signer: &PrivateKeySigner) -> String {
        format!("0x{}", hex::encode(signer.address().as_slice()))
    }

    #[test]
    fn test_recover_round_trip() {
        let signer = PrivateKeySigner::random();
        let message = "Sign this message to authenticate with Infinita Science Hub: abc123";
        let signature = sign(&signer, message);

        let recovered = recover_signer(message, &signature).unwrap();
        assert_eq!(recovered, address_of(&signer));
    }

    #[test]
    fn test_recover_accepts_unprefixed_hex() {
        let signer = PrivateKeySigner::random();
        let message = "hello";
        let signature = sign(&signer, message);

        let recovered = recover_signer(message, signature.trim_start_matches("0x")).unwrap();
        assert_eq!(recovered, address_of(&signer));
    }

    #[test]
    fn test_wrong_key_recovers_different_address() {
        let signer = PrivateKeySigner::random();
        let other = PrivateKeySigner::random();
        let message = "challenge";
        let signature = sign(&other, message);

        let recovered = recover_signer(message, &signature).unwrap();
        assert_ne!(recovered, address_of(&signer));
    }

    #[test]
    fn test_tampered_message_changes_recovery() {
        let signer = PrivateKeySigner::random();
        let signature = sign(&signer, "original");

        let recovered = recover_signer("tampered", &signature).unwrap();
        assert_ne!(recovered, address_of(&signer));
    }

    #[test]
    fn test_malformed_signatures_rejected() {
        assert!(recover_signer("msg", "not-hex").is_err());
        assert!(recover_signer("msg", "0xdeadbeef").is_err());
        assert!(recover_signer("msg", &format!("0x{}", "00".repeat(65))).is_err());
    }

    #[test]
    fn test_address_validation() {
        assert!(is_valid_address(
            "0x52908400098527886E0F7030069857D2E4169EE7"
        ));
        assert!(is_valid_address(
            "0x52908400098527886e0f7030069857d2e4169ee7"
        ));
        assert!(!is_valid_address("52908400098527886e0f7030069857d2e4169ee7"));
        assert!(!is_valid_address("0x123"));
        assert!(!is_valid_address(
            "0xzz908400098527886e0f7030069857d2e4169ee7"
        ));
    }

    #[test]
    fn test_normalize_lowercases() {
        let normalized = normalize_address("0x52908400098527886E0F7030069857D2E4169EE7").unwrap();
        assert_eq!(normalized, "0x52908400098527886e0f7030069857d2e4169ee7");
    }
}
