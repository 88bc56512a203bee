// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Sealing and unsealing of enclave secrets.
//!
//! [`SecretSealer`] is the contract the attestation stack drives: seal a
//! secret under a header and additional authenticated data, unseal it later
//! in the same trust domain. [`LocalSecretSealer`] implements the contract
//! with AES-256-GCM over a sealing key derived by a [`SealingKeyProvider`];
//! the hardware-rooted derivation itself stays behind that trait.
//!
//! The AEAD additional data binds the serialized header and the caller's
//! authenticated data with length framing, so neither can be swapped
//! independently of the ciphertext.

use attestation_protocol::sealed::SealedEnvelope;
use attestation_protocol::sealed::SecretIdentity;
use openssl::symm::Cipher;
use openssl::symm::decrypt_aead;
use openssl::symm::encrypt_aead;
use thiserror::Error;
use zeroize::Zeroizing;

/// Size in bytes of a sealing key.
pub const SEALING_KEY_SIZE: usize = 32;

/// Version tag a [`LocalSecretSealer`] places in default headers.
pub const SEALER_FORMAT_VERSION: &str = "LocalSecretSealer v1";

const NONCE_SIZE: usize = 12;
const TAG_SIZE: usize = 16;

/// Sealing errors.
#[derive(Debug, Error)]
pub enum SealError {
    /// The sealing key could not be derived
    #[error("failed to derive the sealing key")]
    SealingKey(#[source] Box<dyn std::error::Error + Send + Sync>),
    /// The platform RNG failed
    #[error("failed to generate a sealing nonce")]
    NonceGeneration(#[source] getrandom::Error),
    /// OpenSSL error
    #[error("OpenSSL error {1}: {0}")]
    OpenSSL(#[source] openssl::error::ErrorStack, &'static str),
    /// The envelope cannot contain a nonce and tag
    #[error("sealed ciphertext is too short to contain a nonce and tag")]
    CiphertextTooShort,
    /// The secret header could not be serialized
    #[error("failed to serialize the secret header")]
    SerializeHeader(#[source] serde_json::Error),
}

/// Which enclave identity the sealing key is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SealingPolicy {
    /// Bind to the authority that signed the enclave's code, so any build
    /// signed by the same authority can unseal.
    Signer,
    /// Bind to this exact enclave build.
    Instance,
}

/// Derives hardware-rooted sealing keys.
///
/// Implementations are expected to reach into the platform's key-derivation
/// facility; the derived key must be stable for a given policy within one
/// trust domain and unobtainable outside it.
pub trait SealingKeyProvider: Send + Sync {
    /// Derives the sealing key for `policy`.
    fn sealing_key(
        &self,
        policy: SealingPolicy,
    ) -> Result<Zeroizing<[u8; SEALING_KEY_SIZE]>, Box<dyn std::error::Error + Send + Sync>>;
}

/// Seals and unseals secrets within one trust domain.
pub trait SecretSealer: Send + Sync {
    /// Fills `header` with this sealer's defaults, leaving fields the caller
    /// already set untouched.
    fn set_default_header(&self, header: &mut SecretIdentity);

    /// Seals `secret` under `header`, integrity-binding
    /// `additional_authenticated_data` without encrypting it.
    fn seal(
        &self,
        header: &SecretIdentity,
        additional_authenticated_data: &[u8],
        secret: &[u8],
    ) -> Result<SealedEnvelope, SealError>;

    /// Recovers the secret from `envelope`, authenticating the header, the
    /// additional data, and the ciphertext as one unit.
    fn unseal(&self, envelope: &SealedEnvelope) -> Result<Zeroizing<Vec<u8>>, SealError>;
}

/// AES-256-GCM sealer over a [`SealingKeyProvider`].
pub struct LocalSecretSealer {
    policy: SealingPolicy,
    key_provider: Box<dyn SealingKeyProvider>,
}

impl LocalSecretSealer {
    /// Sealer whose key is bound to the authority that signed the enclave.
    pub fn signer_sealed(key_provider: Box<dyn SealingKeyProvider>) -> Self {
        Self {
            policy: SealingPolicy::Signer,
            key_provider,
        }
    }

    /// Sealer whose key is bound to this exact enclave build.
    pub fn instance_sealed(key_provider: Box<dyn SealingKeyProvider>) -> Self {
        Self {
            policy: SealingPolicy::Instance,
            key_provider,
        }
    }

    fn key(&self) -> Result<Zeroizing<[u8; SEALING_KEY_SIZE]>, SealError> {
        self.key_provider
            .sealing_key(self.policy)
            .map_err(SealError::SealingKey)
    }
}

/// Length-frames the header and caller AAD into the AEAD additional data.
fn aead_binding(header: &[u8], additional_authenticated_data: &[u8]) -> Vec<u8> {
    let mut bound =
        Vec::with_capacity(16 + header.len() + additional_authenticated_data.len());
    bound.extend_from_slice(&(header.len() as u64).to_le_bytes());
    bound.extend_from_slice(header);
    bound.extend_from_slice(&(additional_authenticated_data.len() as u64).to_le_bytes());
    bound.extend_from_slice(additional_authenticated_data);
    bound
}

impl SecretSealer for LocalSecretSealer {
    fn set_default_header(&self, header: &mut SecretIdentity) {
        if header.version.is_empty() {
            header.version = SEALER_FORMAT_VERSION.to_string();
        }
    }

    fn seal(
        &self,
        header: &SecretIdentity,
        additional_authenticated_data: &[u8],
        secret: &[u8],
    ) -> Result<SealedEnvelope, SealError> {
        let header_bytes = serde_json::to_vec(header).map_err(SealError::SerializeHeader)?;
        let bound = aead_binding(&header_bytes, additional_authenticated_data);

        let key = self.key()?;
        let mut nonce = [0u8; NONCE_SIZE];
        getrandom::fill(&mut nonce).map_err(SealError::NonceGeneration)?;

        let mut tag = [0u8; TAG_SIZE];
        let encrypted = encrypt_aead(
            Cipher::aes_256_gcm(),
            key.as_ref(),
            Some(&nonce),
            &bound,
            secret,
            &mut tag,
        )
        .map_err(|e| SealError::OpenSSL(e, "sealing the secret"))?;

        let mut ciphertext = Vec::with_capacity(NONCE_SIZE + encrypted.len() + TAG_SIZE);
        ciphertext.extend_from_slice(&nonce);
        ciphertext.extend_from_slice(&encrypted);
        ciphertext.extend_from_slice(&tag);

        Ok(SealedEnvelope {
            header: header_bytes,
            additional_authenticated_data: additional_authenticated_data.to_vec(),
            ciphertext,
        })
    }

    fn unseal(&self, envelope: &SealedEnvelope) -> Result<Zeroizing<Vec<u8>>, SealError> {
        if envelope.ciphertext.len() < NONCE_SIZE + TAG_SIZE {
            return Err(SealError::CiphertextTooShort);
        }
        let (nonce, rest) = envelope.ciphertext.split_at(NONCE_SIZE);
        let (encrypted, tag) = rest.split_at(rest.len() - TAG_SIZE);

        let bound = aead_binding(&envelope.header, &envelope.additional_authenticated_data);
        let key = self.key()?;
        decrypt_aead(
            Cipher::aes_256_gcm(),
            key.as_ref(),
            Some(nonce),
            &bound,
            encrypted,
            tag,
        )
        .map(Zeroizing::new)
        .map_err(|e| SealError::OpenSSL(e, "unsealing the secret"))
    }
}
