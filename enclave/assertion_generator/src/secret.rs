// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Creating and reopening the enclave's sealed secret: the attestation
//! signing key together with the certificate chains that vouch for it.
//!
//! The key is encrypted; the chains are authenticated but visible. On the
//! unseal path the header is parsed and validated before the ciphertext is
//! touched, so a secret sealed for a different protocol is rejected without
//! any decryption work.

use crate::key_proto;
use crate::key_proto::KeyProtoError;
use attestation_protocol::certificate::CertificateChain;
use attestation_protocol::sealed::EnclaveSecret;
use attestation_protocol::sealed::EnclaveSecretAad;
use attestation_protocol::sealed::SealedEnvelope;
use attestation_protocol::sealed::SecretIdentity;
use enclave_crypto::EcdsaP256Sha256SigningKey;
use enclave_crypto::SigningKey;
use secret_seal::LocalSecretSealer;
use secret_seal::SealError;
use secret_seal::SealingKeyProvider;
use secret_seal::SecretSealer;
use thiserror::Error;
use zeroize::Zeroizing;

/// Name of the enclave secret.
pub const SECRET_NAME: &str = "Assertion Generator Enclave Secret";
/// Version of the enclave secret format.
pub const SECRET_VERSION: &str = "Assertion Generator Enclave Secret v0.1";
/// Purpose the enclave secret is scoped to.
pub const SECRET_PURPOSE: &str =
    "Assertion Generator Enclave Attestation Key and Certificates";

/// Sealed secret errors.
#[derive(Debug, Error)]
pub enum SecretError {
    /// The header names a different secret
    #[error("invalid sealed secret header: incorrect secret name")]
    IncorrectSecretName,
    /// The header carries a different secret version
    #[error("invalid sealed secret header: incorrect secret version")]
    IncorrectSecretVersion,
    /// The header is scoped to a different purpose
    #[error("invalid sealed secret header: incorrect secret purpose")]
    IncorrectSecretPurpose,
    /// The envelope header bytes are not a valid header
    #[error("cannot parse the sealed secret header")]
    ParseHeader(#[source] serde_json::Error),
    /// The decrypted bytes are not a valid enclave secret
    #[error("cannot parse the sealed secret")]
    ParseSecret,
    /// The authenticated data bytes are not valid
    #[error("cannot parse the additional authenticated data")]
    ParseAad(#[source] serde_json::Error),
    /// A record failed to serialize
    #[error("{0} serialization failed")]
    Serialize(&'static str, #[source] serde_json::Error),
    /// Serialization produced no bytes, which means a lower layer misbehaved
    #[error("{0} serialization produced no bytes")]
    EmptySerialization(&'static str),
    /// The sealer failed; its error is returned unchanged
    #[error(transparent)]
    Sealer(#[from] SealError),
    /// Key record conversion failed; its error is returned unchanged
    #[error(transparent)]
    KeyProto(#[from] KeyProtoError),
}

/// Returns the sealer used for this enclave's secret.
///
/// Always signer-scoped: a secret sealed by one build of the enclave must be
/// unsealable by any build signed by the same authority.
pub fn secret_sealer(key_provider: Box<dyn SealingKeyProvider>) -> LocalSecretSealer {
    LocalSecretSealer::signer_sealed(key_provider)
}

/// Returns the fixed identity triple scoping this enclave's sealed secret.
pub fn secret_header() -> SecretIdentity {
    SecretIdentity {
        name: SECRET_NAME.to_string(),
        version: SECRET_VERSION.to_string(),
        purpose: SECRET_PURPOSE.to_string(),
    }
}

/// Validates that `header` matches the fixed identity triple exactly.
pub fn check_secret_header(header: &SecretIdentity) -> Result<(), SecretError> {
    if header.name != SECRET_NAME {
        return Err(SecretError::IncorrectSecretName);
    }
    if header.version != SECRET_VERSION {
        return Err(SecretError::IncorrectSecretVersion);
    }
    if header.purpose != SECRET_PURPOSE {
        return Err(SecretError::IncorrectSecretPurpose);
    }
    Ok(())
}

/// Seals the attestation key and certificate chains into an envelope that
/// can be persisted outside the enclave.
///
/// The sealer's default header is filled in first and the caller's `header`
/// fields merged over it, caller fields winning on conflict. Either a
/// complete envelope is returned or an error; never a partial envelope.
pub fn create_sealed_secret(
    sealer: &dyn SecretSealer,
    header: &SecretIdentity,
    certificate_chains: &[CertificateChain],
    attestation_key: &dyn SigningKey,
) -> Result<SealedEnvelope, SecretError> {
    let mut secret_header = SecretIdentity::default();
    sealer.set_default_header(&mut secret_header);
    secret_header.merge_from(header);

    let enclave_secret = EnclaveSecret {
        attestation_key: key_proto::signing_key_record(attestation_key)?,
    };
    let aad = EnclaveSecretAad {
        certificate_chains: certificate_chains.to_vec(),
    };

    let serialized_secret = Zeroizing::new(
        serde_json::to_vec(&enclave_secret)
            .map_err(|e| SecretError::Serialize("enclave secret", e))?,
    );
    if serialized_secret.is_empty() {
        return Err(SecretError::EmptySerialization("enclave secret"));
    }
    let serialized_aad = serde_json::to_vec(&aad)
        .map_err(|e| SecretError::Serialize("enclave additional authenticated data", e))?;
    if serialized_aad.is_empty() {
        return Err(SecretError::EmptySerialization(
            "enclave additional authenticated data",
        ));
    }

    Ok(sealer.seal(&secret_header, &serialized_aad, &serialized_secret)?)
}

/// Reopens a sealed envelope, returning the attestation key and the
/// certificate chains in the order they were sealed.
///
/// The header is parsed and checked before the sealer's unseal primitive is
/// invoked; a mismatched header never reaches decryption.
pub fn extract_attestation_key_and_certificate_chains(
    sealer: &dyn SecretSealer,
    envelope: &SealedEnvelope,
) -> Result<(EcdsaP256Sha256SigningKey, Vec<CertificateChain>), SecretError> {
    let header: SecretIdentity =
        serde_json::from_slice(&envelope.header).map_err(SecretError::ParseHeader)?;
    check_secret_header(&header)?;

    let serialized_secret = sealer.unseal(envelope)?;
    // The parse detail could describe decrypted content; return a bare error.
    let enclave_secret: EnclaveSecret =
        serde_json::from_slice(&serialized_secret).map_err(|_| SecretError::ParseSecret)?;

    let aad: EnclaveSecretAad =
        serde_json::from_slice(&envelope.additional_authenticated_data)
            .map_err(SecretError::ParseAad)?;

    let attestation_key = key_proto::attestation_key_from_record(&enclave_secret.attestation_key)?;
    Ok((attestation_key, aad.certificate_chains))
}

#[cfg(test)]
mod tests {
    use super::*;
    use enclave_crypto::VerifyingKey;
    use attestation_protocol::certificate::Certificate;
    use attestation_protocol::certificate::CertificateFormat;
    use secret_seal::SealingPolicy;
    use secret_seal::SEALING_KEY_SIZE;
    use std::sync::atomic::AtomicUsize;
    use std::sync::atomic::Ordering;
    use std::sync::Arc;

    struct TestKeyProvider;

    impl SealingKeyProvider for TestKeyProvider {
        fn sealing_key(
            &self,
            policy: SealingPolicy,
        ) -> Result<
            Zeroizing<[u8; SEALING_KEY_SIZE]>,
            Box<dyn std::error::Error + Send + Sync>,
        > {
            let mut key = [0x5au8; SEALING_KEY_SIZE];
            key[0] = match policy {
                SealingPolicy::Signer => 1,
                SealingPolicy::Instance => 2,
            };
            Ok(Zeroizing::new(key))
        }
    }

    /// Sealer wrapper counting how often the unseal primitive runs, to prove
    /// that header validation short-circuits before decryption.
    struct CountingSealer {
        inner: LocalSecretSealer,
        unseal_calls: Arc<AtomicUsize>,
    }

    impl CountingSealer {
        fn new() -> (Self, Arc<AtomicUsize>) {
            let unseal_calls = Arc::new(AtomicUsize::new(0));
            (
                Self {
                    inner: LocalSecretSealer::signer_sealed(Box::new(TestKeyProvider)),
                    unseal_calls: unseal_calls.clone(),
                },
                unseal_calls,
            )
        }
    }

    impl SecretSealer for CountingSealer {
        fn set_default_header(&self, header: &mut SecretIdentity) {
            self.inner.set_default_header(header);
        }

        fn seal(
            &self,
            header: &SecretIdentity,
            additional_authenticated_data: &[u8],
            secret: &[u8],
        ) -> Result<SealedEnvelope, SealError> {
            self.inner.seal(header, additional_authenticated_data, secret)
        }

        fn unseal(&self, envelope: &SealedEnvelope) -> Result<Zeroizing<Vec<u8>>, SealError> {
            self.unseal_calls.fetch_add(1, Ordering::Relaxed);
            self.inner.unseal(envelope)
        }
    }

    fn test_sealer() -> LocalSecretSealer {
        secret_sealer(Box::new(TestKeyProvider))
    }

    fn chain(tag: u8) -> CertificateChain {
        CertificateChain {
            certificates: vec![Certificate {
                format: CertificateFormat::X509Der,
                data: vec![tag; 4],
            }],
        }
    }

    fn with_header(envelope: &SealedEnvelope, header: SecretIdentity) -> SealedEnvelope {
        let mut tampered = envelope.clone();
        tampered.header = serde_json::to_vec(&header).unwrap();
        tampered
    }

    #[test]
    fn seal_unseal_round_trip_preserves_key_and_chain_order() {
        let sealer = test_sealer();
        let key = EcdsaP256Sha256SigningKey::generate().unwrap();
        let chains = [chain(1), chain(2)];

        let envelope =
            create_sealed_secret(&sealer, &secret_header(), &chains, &key).unwrap();
        let (restored_key, restored_chains) =
            extract_attestation_key_and_certificate_chains(&sealer, &envelope).unwrap();

        assert_eq!(
            *key.serialize_to_der().unwrap(),
            *restored_key.serialize_to_der().unwrap()
        );
        assert_eq!(restored_chains, chains.to_vec());
        assert_eq!(
            key.verifying_key().unwrap().serialize_to_der().unwrap(),
            restored_key
                .verifying_key()
                .unwrap()
                .serialize_to_der()
                .unwrap()
        );
    }

    // Zero chains at seal time is legal: nothing in the protocol requires a
    // minimum, so an empty list seals and unseals as-is.
    #[test]
    fn empty_certificate_chain_list_is_legal() {
        let sealer = test_sealer();
        let key = EcdsaP256Sha256SigningKey::generate().unwrap();
        let envelope = create_sealed_secret(&sealer, &secret_header(), &[], &key).unwrap();
        let (_, chains) =
            extract_attestation_key_and_certificate_chains(&sealer, &envelope).unwrap();
        assert!(chains.is_empty());
    }

    #[test]
    fn header_mismatch_fails_per_field_without_decrypting() {
        let (sealer, unseal_calls) = CountingSealer::new();
        let key = EcdsaP256Sha256SigningKey::generate().unwrap();
        let envelope =
            create_sealed_secret(&sealer, &secret_header(), &[chain(1)], &key).unwrap();

        let cases = [
            (
                SecretIdentity {
                    name: "wrong".to_string(),
                    ..secret_header()
                },
                "incorrect secret name",
            ),
            (
                SecretIdentity {
                    version: "wrong".to_string(),
                    ..secret_header()
                },
                "incorrect secret version",
            ),
            (
                SecretIdentity {
                    purpose: "wrong".to_string(),
                    ..secret_header()
                },
                "incorrect secret purpose",
            ),
        ];
        for (header, expected) in cases {
            let tampered = with_header(&envelope, header);
            let err =
                extract_attestation_key_and_certificate_chains(&sealer, &tampered).unwrap_err();
            assert!(err.to_string().contains(expected), "{err}");
        }
        assert_eq!(unseal_calls.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn purpose_mismatch_names_only_the_purpose() {
        let err = check_secret_header(&SecretIdentity {
            purpose: "wrong".to_string(),
            ..secret_header()
        })
        .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("purpose"));
        assert!(!message.contains("version"));
    }

    #[test]
    fn unparsable_header_is_invalid() {
        let sealer = test_sealer();
        let key = EcdsaP256Sha256SigningKey::generate().unwrap();
        let mut envelope =
            create_sealed_secret(&sealer, &secret_header(), &[chain(1)], &key).unwrap();
        envelope.header = b"not a header".to_vec();
        assert!(matches!(
            extract_attestation_key_and_certificate_chains(&sealer, &envelope),
            Err(SecretError::ParseHeader(_))
        ));
    }

    #[test]
    fn ciphertext_tamper_fails_unseal() {
        let sealer = test_sealer();
        let key = EcdsaP256Sha256SigningKey::generate().unwrap();
        let mut envelope =
            create_sealed_secret(&sealer, &secret_header(), &[chain(1)], &key).unwrap();
        let mid = envelope.ciphertext.len() / 2;
        envelope.ciphertext[mid] ^= 0x01;
        assert!(matches!(
            extract_attestation_key_and_certificate_chains(&sealer, &envelope),
            Err(SecretError::Sealer(_))
        ));
    }

    #[test]
    fn aad_tamper_fails_unseal() {
        let sealer = test_sealer();
        let key = EcdsaP256Sha256SigningKey::generate().unwrap();
        let mut envelope =
            create_sealed_secret(&sealer, &secret_header(), &[chain(1)], &key).unwrap();
        envelope.additional_authenticated_data[0] ^= 0x01;
        assert!(matches!(
            extract_attestation_key_and_certificate_chains(&sealer, &envelope),
            Err(SecretError::Sealer(_))
        ));
    }

    #[test]
    fn caller_header_wins_over_sealer_default() {
        let sealer = test_sealer();
        let key = EcdsaP256Sha256SigningKey::generate().unwrap();
        let envelope =
            create_sealed_secret(&sealer, &secret_header(), &[], &key).unwrap();
        let header: SecretIdentity = serde_json::from_slice(&envelope.header).unwrap();
        // The sealer's default version would be its own format tag; the
        // caller's constant must have replaced it.
        assert_eq!(header.version, SECRET_VERSION);
        assert_eq!(header.name, SECRET_NAME);
        assert_eq!(header.purpose, SECRET_PURPOSE);
    }
}
