//! The external signing capability.
//!
//! The codec never generates or stores private keys. Anything that can
//! produce a 64-byte Ed25519 signature over arbitrary bytes — a local key,
//! a hardware wallet, a remote service — plugs in through [`Signer`].

use ed25519_dalek::Signer as DalekSigner;
use ed25519_dalek::SigningKey;

use crate::address::Address;

/// An opaque signing capability: a public identity plus the ability to
/// sign a serialized message.
pub trait Signer {
    fn address(&self) -> Address;

    fn sign(&self, message: &[u8]) -> [u8; 64];
}

impl Signer for SigningKey {
    fn address(&self) -> Address {
        Address::new(self.verifying_key().to_bytes())
    }

    fn sign(&self, message: &[u8]) -> [u8; 64] {
        DalekSigner::sign(self, message).to_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signing_key_signature_verifies_against_its_address() {
        let key = SigningKey::from_bytes(&[7u8; 32]);
        let message = b"payload";

        let signature = Signer::sign(&key, message);

        assert!(key.address().verify(&signature, message));
    }

    #[test]
    fn freshly_generated_keys_sign_and_verify() {
        let mut rng = rand::rngs::OsRng;
        let a = SigningKey::generate(&mut rng);
        let b = SigningKey::generate(&mut rng);
        let message = b"payload";

        assert_ne!(a.address(), b.address());
        assert!(a.address().verify(&Signer::sign(&a, message), message));
        // A signature from one key never verifies against the other.
        assert!(!b.address().verify(&Signer::sign(&a, message), message));
    }

    #[test]
    fn address_matches_verifying_key() {
        let key = SigningKey::from_bytes(&[9u8; 32]);
        assert_eq!(key.address().as_bytes(), &key.verifying_key().to_bytes());
    }
}
