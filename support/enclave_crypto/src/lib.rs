// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! ECDSA P-256 / SHA-256 signing and verifying keys over OpenSSL.
//!
//! The [`SigningKey`] and [`VerifyingKey`] traits are the seam consumers
//! program against; [`EcdsaP256Sha256SigningKey`] is the one scheme the
//! attestation stack currently uses. Private key material only ever leaves
//! a key object inside a [`Zeroizing`] buffer.

use attestation_protocol::keys::SignatureScheme;
use openssl::ec::EcGroup;
use openssl::ec::EcKey;
use openssl::ecdsa::EcdsaSig;
use openssl::nid::Nid;
use openssl::pkey::Private;
use openssl::pkey::Public;
use openssl::sha::sha256;
use thiserror::Error;
use zeroize::Zeroizing;

/// Errors from key construction, serialization, signing, and verification.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// OpenSSL error
    #[error("OpenSSL error {1}: {0}")]
    OpenSSL(#[source] openssl::error::ErrorStack, &'static str),
    /// The key is on the wrong curve
    #[error("key is not on the NIST P-256 curve")]
    NotP256,
    /// The signature does not verify
    #[error("signature verification failed")]
    SignatureVerification,
}

/// A private signing key.
pub trait SigningKey: Send + Sync {
    /// Serializes the private key to DER.
    fn serialize_to_der(&self) -> Result<Zeroizing<Vec<u8>>, CryptoError>;
    /// The signature scheme this key implements.
    fn signature_scheme(&self) -> SignatureScheme;
    /// Signs `message`, returning an encoded signature.
    fn sign(&self, message: &[u8]) -> Result<Vec<u8>, CryptoError>;
}

/// A public verifying key.
pub trait VerifyingKey: Send + Sync {
    /// Serializes the public key to DER (SubjectPublicKeyInfo).
    fn serialize_to_der(&self) -> Result<Vec<u8>, CryptoError>;
    /// The signature scheme this key verifies.
    fn signature_scheme(&self) -> SignatureScheme;
    /// Verifies `signature` over `message`.
    fn verify(&self, message: &[u8], signature: &[u8]) -> Result<(), CryptoError>;
}

fn p256_group() -> Result<EcGroup, CryptoError> {
    EcGroup::from_curve_name(Nid::X9_62_PRIME256V1)
        .map_err(|e| CryptoError::OpenSSL(e, "loading the P-256 group"))
}

fn check_p256(group_curve: Option<Nid>) -> Result<(), CryptoError> {
    if group_curve != Some(Nid::X9_62_PRIME256V1) {
        return Err(CryptoError::NotP256);
    }
    Ok(())
}

/// An ECDSA P-256 signing key producing SHA-256/DER signatures.
#[derive(Debug)]
pub struct EcdsaP256Sha256SigningKey {
    key: EcKey<Private>,
}

impl EcdsaP256Sha256SigningKey {
    /// Generates a fresh random key.
    pub fn generate() -> Result<Self, CryptoError> {
        let group = p256_group()?;
        let key =
            EcKey::generate(&group).map_err(|e| CryptoError::OpenSSL(e, "generating a key"))?;
        Ok(Self { key })
    }

    /// Reconstructs a key from its DER serialization.
    pub fn create_from_der(der: &[u8]) -> Result<Self, CryptoError> {
        let key = EcKey::private_key_from_der(der)
            .map_err(|e| CryptoError::OpenSSL(e, "parsing a DER private key"))?;
        check_p256(key.group().curve_name())?;
        key.check_key()
            .map_err(|e| CryptoError::OpenSSL(e, "validating a private key"))?;
        Ok(Self { key })
    }

    /// Returns the corresponding verifying key.
    pub fn verifying_key(&self) -> Result<EcdsaP256Sha256VerifyingKey, CryptoError> {
        let key = EcKey::from_public_key(self.key.group(), self.key.public_key())
            .map_err(|e| CryptoError::OpenSSL(e, "extracting the public key"))?;
        Ok(EcdsaP256Sha256VerifyingKey { key })
    }
}

impl SigningKey for EcdsaP256Sha256SigningKey {
    fn serialize_to_der(&self) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
        self.key
            .private_key_to_der()
            .map(Zeroizing::new)
            .map_err(|e| CryptoError::OpenSSL(e, "serializing a private key to DER"))
    }

    fn signature_scheme(&self) -> SignatureScheme {
        SignatureScheme::EcdsaP256Sha256
    }

    fn sign(&self, message: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let digest = sha256(message);
        let signature = EcdsaSig::sign(&digest, &self.key)
            .map_err(|e| CryptoError::OpenSSL(e, "signing a digest"))?;
        signature
            .to_der()
            .map_err(|e| CryptoError::OpenSSL(e, "serializing a signature"))
    }
}

/// An ECDSA P-256 verifying key for SHA-256/DER signatures.
pub struct EcdsaP256Sha256VerifyingKey {
    key: EcKey<Public>,
}

impl EcdsaP256Sha256VerifyingKey {
    /// Reconstructs a key from its DER (SubjectPublicKeyInfo) serialization.
    pub fn create_from_der(der: &[u8]) -> Result<Self, CryptoError> {
        let key = EcKey::public_key_from_der(der)
            .map_err(|e| CryptoError::OpenSSL(e, "parsing a DER public key"))?;
        check_p256(key.group().curve_name())?;
        Ok(Self { key })
    }
}

impl VerifyingKey for EcdsaP256Sha256VerifyingKey {
    fn serialize_to_der(&self) -> Result<Vec<u8>, CryptoError> {
        self.key
            .public_key_to_der()
            .map_err(|e| CryptoError::OpenSSL(e, "serializing a public key to DER"))
    }

    fn signature_scheme(&self) -> SignatureScheme {
        SignatureScheme::EcdsaP256Sha256
    }

    fn verify(&self, message: &[u8], signature: &[u8]) -> Result<(), CryptoError> {
        let digest = sha256(message);
        let signature = EcdsaSig::from_der(signature)
            .map_err(|e| CryptoError::OpenSSL(e, "parsing a signature"))?;
        let ok = signature
            .verify(&digest, &self.key)
            .map_err(|e| CryptoError::OpenSSL(e, "verifying a signature"))?;
        if !ok {
            return Err(CryptoError::SignatureVerification);
        }
        Ok(())
    }
}
