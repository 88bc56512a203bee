// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Records making up a sealed enclave secret.
//!
//! A sealed secret splits into two typed halves from construction onward:
//! [`EnclaveSecret`] is encrypted and never leaves the enclave in cleartext,
//! while [`EnclaveSecretAad`] is integrity-bound to the ciphertext but stored
//! in the clear. Keeping the halves as distinct types (rather than one record
//! with a do-not-log convention) is what prevents the confidential half from
//! leaking through the authenticated one.

use crate::Base64Standard;
use crate::certificate::CertificateChain;
use crate::keys::AsymmetricKeyRecord;
use serde::Deserialize;
use serde::Serialize;
use zeroize::Zeroize;
use zeroize::ZeroizeOnDrop;

/// The identity triple scoping a sealed secret to one protocol.
///
/// Sealing a secret under one identity and presenting it to a consumer
/// expecting another must fail before any decryption is attempted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretIdentity {
    /// Name of the secret.
    pub name: String,
    /// Version of the secret format.
    pub version: String,
    /// Purpose the secret may be used for.
    pub purpose: String,
}

impl SecretIdentity {
    /// Overlays the non-empty fields of `other` onto `self`.
    ///
    /// Empty fields in `other` keep the value already present, so a sealer's
    /// default header can be filled in first and the caller's identity merged
    /// over it.
    pub fn merge_from(&mut self, other: &SecretIdentity) {
        if !other.name.is_empty() {
            self.name.clone_from(&other.name);
        }
        if !other.version.is_empty() {
            self.version.clone_from(&other.version);
        }
        if !other.purpose.is_empty() {
            self.purpose.clone_from(&other.purpose);
        }
    }
}

/// The opaque, persistable unit produced by sealing.
///
/// `header` holds the serialized [`SecretIdentity`]; consumers parse and
/// validate it before the ciphertext is touched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SealedEnvelope {
    /// Serialized [`SecretIdentity`] describing what the secret is for.
    #[serde(with = "Base64Standard")]
    pub header: Vec<u8>,
    /// Serialized [`EnclaveSecretAad`], authenticated but not encrypted.
    #[serde(with = "Base64Standard")]
    pub additional_authenticated_data: Vec<u8>,
    /// The encrypted, authenticated secret.
    #[serde(with = "Base64Standard")]
    pub ciphertext: Vec<u8>,
}

/// The confidential half of a sealed secret: the enclave's attestation key.
///
/// Exists only transiently in memory while sealing or unsealing; wipes
/// itself on drop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct EnclaveSecret {
    /// The attestation signing key.
    pub attestation_key: AsymmetricKeyRecord,
}

/// The authenticated-but-visible half of a sealed secret: the certificate
/// chains vouching for the attestation key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnclaveSecretAad {
    /// Certificate chains, in the order they were bound at seal time.
    pub certificate_chains: Vec<CertificateChain>,
}
