// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Conversion between live key objects and portable
//! [`AsymmetricKeyRecord`]s.

use attestation_protocol::keys::AsymmetricKeyRecord;
use attestation_protocol::keys::KeyEncoding;
use attestation_protocol::keys::KeyType;
use enclave_crypto::CryptoError;
use enclave_crypto::EcdsaP256Sha256SigningKey;
use enclave_crypto::SigningKey;
use enclave_crypto::VerifyingKey;
use thiserror::Error;

/// Key record conversion errors.
#[derive(Debug, Error)]
pub enum KeyProtoError {
    /// The key could not be serialized
    #[error("failed to serialize the attestation key to DER")]
    SerializeKey(#[source] CryptoError),
    /// The record does not hold signing material
    #[error("the sealed secret key has invalid key type: {0:?}")]
    InvalidKeyType(KeyType),
    /// PEM decoding is recognized but not supported
    #[error("creating an attestation key from a PEM-encoded key is not supported")]
    PemKeyUnsupported,
    /// The record's encoding is not recognized
    #[error("asymmetric key record has unknown encoding format")]
    UnknownKeyEncoding,
    /// The DER key bytes could not be parsed
    #[error("failed to create the attestation key from DER")]
    CreateFromDer(#[source] CryptoError),
}

/// Encodes a signing key into a portable record.
pub fn signing_key_record(key: &dyn SigningKey) -> Result<AsymmetricKeyRecord, KeyProtoError> {
    let der = key.serialize_to_der().map_err(KeyProtoError::SerializeKey)?;
    Ok(AsymmetricKeyRecord {
        key: der.to_vec(),
        encoding: KeyEncoding::Der,
        key_type: KeyType::Signing,
        signature_scheme: key.signature_scheme(),
    })
}

/// Encodes a verifying key into a portable record.
pub fn verifying_key_record(key: &dyn VerifyingKey) -> Result<AsymmetricKeyRecord, KeyProtoError> {
    let der = key.serialize_to_der().map_err(KeyProtoError::SerializeKey)?;
    Ok(AsymmetricKeyRecord {
        key: der,
        encoding: KeyEncoding::Der,
        key_type: KeyType::Verifying,
        signature_scheme: key.signature_scheme(),
    })
}

/// Reconstructs the enclave's attestation signing key from a record.
///
/// Only DER-encoded signing keys reconstruct. PEM is recognized but
/// unsupported, and stays distinct from an unknown encoding so a future
/// decoder can light it up without reinterpreting old failures.
pub fn attestation_key_from_record(
    record: &AsymmetricKeyRecord,
) -> Result<EcdsaP256Sha256SigningKey, KeyProtoError> {
    if record.key_type != KeyType::Signing {
        return Err(KeyProtoError::InvalidKeyType(record.key_type));
    }
    match record.encoding {
        KeyEncoding::Der => EcdsaP256Sha256SigningKey::create_from_der(&record.key)
            .map_err(KeyProtoError::CreateFromDer),
        KeyEncoding::Pem => Err(KeyProtoError::PemKeyUnsupported),
        KeyEncoding::Unknown => Err(KeyProtoError::UnknownKeyEncoding),
    }
}
