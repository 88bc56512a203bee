// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Portable records describing asymmetric key material.

use crate::Base64Standard;
use serde::Deserialize;
use serde::Serialize;
use zeroize::Zeroize;
use zeroize::ZeroizeOnDrop;

/// How the key bytes in an [`AsymmetricKeyRecord`] are encoded.
///
/// `Unknown` is the mandatory first variant so that a record produced by a
/// newer peer with an unrecognized encoding deserializes as unknown rather
/// than failing into an arbitrary supported encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyEncoding {
    /// Encoding not recognized.
    Unknown,
    /// DER encoding (PKCS#8/RFC 5915 for private keys, SubjectPublicKeyInfo
    /// for public keys).
    Der,
    /// PEM encoding.
    Pem,
}

/// Whether an [`AsymmetricKeyRecord`] holds private signing material or a
/// public verifying key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyType {
    /// Key type not recognized.
    Unknown,
    /// A private signing key.
    Signing,
    /// A public verifying key.
    Verifying,
}

/// Signature scheme implemented by the key in an [`AsymmetricKeyRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignatureScheme {
    /// Scheme not recognized.
    Unknown,
    /// ECDSA over NIST P-256 with SHA-256 digests.
    EcdsaP256Sha256,
}

/// A serialized asymmetric key together with the metadata needed to
/// reconstruct it.
///
/// The key bytes may hold private material, so the record wipes itself on
/// drop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct AsymmetricKeyRecord {
    /// The encoded key bytes.
    #[serde(with = "Base64Standard")]
    pub key: Vec<u8>,
    /// Encoding of `key`.
    #[zeroize(skip)]
    pub encoding: KeyEncoding,
    /// Whether `key` is signing or verifying material.
    #[zeroize(skip)]
    pub key_type: KeyType,
    /// Signature scheme the key implements.
    #[zeroize(skip)]
    pub signature_scheme: SignatureScheme,
}
