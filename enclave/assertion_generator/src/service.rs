// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The remote assertion service: signs caller-supplied user data with the
//! enclave's attestation key.

use crate::key_proto;
use crate::key_proto::KeyProtoError;
use attestation_protocol::assertion::SignedAssertion;
use attestation_protocol::certificate::CertificateChain;
use attestation_protocol::keys::AsymmetricKeyRecord;
use enclave_crypto::CryptoError;
use enclave_crypto::EcdsaP256Sha256SigningKey;
use enclave_crypto::SigningKey;
use thiserror::Error;

/// Assertion generation errors.
#[derive(Debug, Error)]
pub enum AssertionError {
    /// The attestation key failed to sign
    #[error("failed to sign the assertion payload")]
    Sign(#[source] CryptoError),
    /// The verifying key could not be derived from the attestation key
    #[error("failed to derive the attestation verifying key")]
    VerifyingKey(#[source] CryptoError),
    /// Key record conversion failed; its error is returned unchanged
    #[error(transparent)]
    KeyProto(#[from] KeyProtoError),
}

/// A service that generates assertions over caller-supplied user data.
///
/// Implementations must be safe to share across the server's connection
/// handlers.
pub trait RemoteAssertionService: Send + Sync {
    /// Generates an assertion binding `user_data` to the enclave's
    /// attestation key.
    fn generate_assertion(&self, user_data: &[u8]) -> Result<SignedAssertion, AssertionError>;
}

/// The assertion generator's service implementation, holding the unsealed
/// attestation key and the certificate chains that vouch for it.
pub struct AssertionGeneratorService {
    attestation_key: EcdsaP256Sha256SigningKey,
    verifying_key_record: AsymmetricKeyRecord,
    certificate_chains: Vec<CertificateChain>,
}

impl AssertionGeneratorService {
    /// Creates the service around an unsealed attestation key and its
    /// certificate chains.
    pub fn new(
        attestation_key: EcdsaP256Sha256SigningKey,
        certificate_chains: Vec<CertificateChain>,
    ) -> Result<Self, AssertionError> {
        let verifying_key = attestation_key
            .verifying_key()
            .map_err(AssertionError::VerifyingKey)?;
        let verifying_key_record = key_proto::verifying_key_record(&verifying_key)?;
        Ok(Self {
            attestation_key,
            verifying_key_record,
            certificate_chains,
        })
    }
}

impl RemoteAssertionService for AssertionGeneratorService {
    fn generate_assertion(&self, user_data: &[u8]) -> Result<SignedAssertion, AssertionError> {
        let signature = self
            .attestation_key
            .sign(user_data)
            .map_err(AssertionError::Sign)?;
        Ok(SignedAssertion {
            payload: user_data.to_vec(),
            signature,
            verifying_key: self.verifying_key_record.clone(),
            certificate_chains: self.certificate_chains.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use attestation_protocol::certificate::Certificate;
    use attestation_protocol::certificate::CertificateFormat;
    use enclave_crypto::EcdsaP256Sha256VerifyingKey;
    use enclave_crypto::VerifyingKey;

    fn chain() -> CertificateChain {
        CertificateChain {
            certificates: vec![Certificate {
                format: CertificateFormat::X509Der,
                data: vec![0xc0; 8],
            }],
        }
    }

    #[test]
    fn assertion_verifies_under_the_attestation_key() {
        let key = EcdsaP256Sha256SigningKey::generate().unwrap();
        let service = AssertionGeneratorService::new(key, vec![chain()]).unwrap();

        let assertion = service.generate_assertion(b"peer nonce").unwrap();
        assert_eq!(assertion.payload, b"peer nonce");
        assert_eq!(assertion.certificate_chains, vec![chain()]);

        let verifying_key =
            EcdsaP256Sha256VerifyingKey::create_from_der(&assertion.verifying_key.key).unwrap();
        verifying_key
            .verify(&assertion.payload, &assertion.signature)
            .unwrap();
    }

    #[test]
    fn assertion_does_not_verify_for_altered_user_data() {
        let key = EcdsaP256Sha256SigningKey::generate().unwrap();
        let service = AssertionGeneratorService::new(key, vec![]).unwrap();

        let assertion = service.generate_assertion(b"peer nonce").unwrap();
        let verifying_key =
            EcdsaP256Sha256VerifyingKey::create_from_der(&assertion.verifying_key.key).unwrap();
        assert!(verifying_key
            .verify(b"other nonce", &assertion.signature)
            .is_err());
    }
}
