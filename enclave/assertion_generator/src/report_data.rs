// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Binding the attestation public key into a hardware report for the
//! sign-report provisioning protocol.
//!
//! The serialized payload bytes are what the peer enclave's hardware report
//! attests to; the structures here exist only long enough to produce them.

use crate::key_proto;
use crate::key_proto::KeyProtoError;
use attestation_protocol::report::AttestationPublicKey;
use attestation_protocol::report::REPORT_DATA_SIZE;
use attestation_protocol::report::ReportData;
use attestation_protocol::report::SignReportPayload;
use enclave_crypto::VerifyingKey;
use report_binding::BINDING_DIGEST_SIZE;
use report_binding::BindingDigestError;
use report_binding::BindingDigestGenerator;
use report_binding::DigestGenerator;
use thiserror::Error;

/// Version tag of the attestation public key format.
pub const ATTESTATION_PUBLIC_KEY_VERSION: &str =
    "Assertion Generator Enclave Attestation Key v0.1";
/// Purpose tag scoping the attestation public key.
pub const ATTESTATION_PUBLIC_KEY_PURPOSE: &str = "Assertion Generator Enclave Attestation Key";
/// Version tag of the sign-report payload format.
pub const SIGN_REPORT_PAYLOAD_VERSION: &str = "PCE Sign Report v0.1";

// The binding generator and the hardware report user-data field must agree
// on the digest size.
static_assertions::const_assert_eq!(BINDING_DIGEST_SIZE, REPORT_DATA_SIZE);

/// Report-binding errors.
#[derive(Debug, Error)]
pub enum ReportDataError {
    /// Key record conversion failed; its error is returned unchanged
    #[error(transparent)]
    KeyProto(#[from] KeyProtoError),
    /// The payload record failed to serialize
    #[error("failed to serialize the sign-report payload")]
    SerializePayload(#[source] serde_json::Error),
    /// The digest generator failed; its error is returned unchanged
    #[error(transparent)]
    Generate(#[from] BindingDigestError),
    /// The generator and this protocol disagree on the digest size
    #[error("unexpected binding digest length: should be {0}, got {1}")]
    DigestLength(usize, usize),
}

/// Serializes the sign-report payload carrying `verifying_key` with the
/// fixed protocol version and purpose tags.
pub fn serialize_sign_report_payload(
    verifying_key: &dyn VerifyingKey,
) -> Result<Vec<u8>, ReportDataError> {
    let payload = SignReportPayload {
        version: SIGN_REPORT_PAYLOAD_VERSION.to_string(),
        attestation_public_key: AttestationPublicKey {
            attestation_public_key: key_proto::verifying_key_record(verifying_key)?,
            version: ATTESTATION_PUBLIC_KEY_VERSION.to_string(),
            purpose: ATTESTATION_PUBLIC_KEY_PURPOSE.to_string(),
        },
    };
    serde_json::to_vec(&payload).map_err(ReportDataError::SerializePayload)
}

/// Produces the report user-data binding `serialized_payload` for the
/// sign-report protocol.
pub fn report_data_for_sign_report(
    serialized_payload: &[u8],
) -> Result<ReportData, ReportDataError> {
    report_data_from_generator(&DigestGenerator::sign_report(), serialized_payload)
}

fn report_data_from_generator(
    generator: &dyn BindingDigestGenerator,
    serialized_payload: &[u8],
) -> Result<ReportData, ReportDataError> {
    let digest = generator.generate(serialized_payload)?;
    if digest.len() != REPORT_DATA_SIZE {
        return Err(ReportDataError::DigestLength(REPORT_DATA_SIZE, digest.len()));
    }
    let mut report_data = ReportData([0; REPORT_DATA_SIZE]);
    report_data.0.copy_from_slice(&digest);
    Ok(report_data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use enclave_crypto::EcdsaP256Sha256SigningKey;

    #[test]
    fn payload_digest_fills_the_user_data_field() {
        let key = EcdsaP256Sha256SigningKey::generate().unwrap();
        let payload =
            serialize_sign_report_payload(&key.verifying_key().unwrap()).unwrap();
        let report_data = report_data_for_sign_report(&payload).unwrap();
        assert_eq!(report_data.0.len(), REPORT_DATA_SIZE);
    }

    #[test]
    fn binding_is_deterministic_per_key() {
        let key = EcdsaP256Sha256SigningKey::generate().unwrap();
        let verifying_key = key.verifying_key().unwrap();
        let payload = serialize_sign_report_payload(&verifying_key).unwrap();
        assert_eq!(
            report_data_for_sign_report(&payload).unwrap(),
            report_data_for_sign_report(&payload).unwrap()
        );
        assert_eq!(payload, serialize_sign_report_payload(&verifying_key).unwrap());
    }

    #[test]
    fn different_keys_produce_different_bindings() {
        let a = EcdsaP256Sha256SigningKey::generate().unwrap();
        let b = EcdsaP256Sha256SigningKey::generate().unwrap();
        let payload_a =
            serialize_sign_report_payload(&a.verifying_key().unwrap()).unwrap();
        let payload_b =
            serialize_sign_report_payload(&b.verifying_key().unwrap()).unwrap();
        assert_ne!(
            report_data_for_sign_report(&payload_a).unwrap(),
            report_data_for_sign_report(&payload_b).unwrap()
        );
    }

    #[test]
    fn one_payload_byte_changes_the_binding() {
        let key = EcdsaP256Sha256SigningKey::generate().unwrap();
        let payload =
            serialize_sign_report_payload(&key.verifying_key().unwrap()).unwrap();
        let mut altered = payload.clone();
        let last = altered.len() - 1;
        altered[last] ^= 0x01;
        assert_ne!(
            report_data_for_sign_report(&payload).unwrap(),
            report_data_for_sign_report(&altered).unwrap()
        );
    }

    #[test]
    fn wrong_generator_length_is_a_contract_violation() {
        struct ShortGenerator;
        impl BindingDigestGenerator for ShortGenerator {
            fn generate(&self, _payload: &[u8]) -> Result<Vec<u8>, BindingDigestError> {
                Ok(vec![0; 32])
            }
        }
        let err = report_data_from_generator(&ShortGenerator, b"payload").unwrap_err();
        assert!(matches!(
            err,
            ReportDataError::DigestLength(REPORT_DATA_SIZE, 32)
        ));
    }

    #[test]
    fn payload_carries_the_protocol_tags() {
        let key = EcdsaP256Sha256SigningKey::generate().unwrap();
        let payload =
            serialize_sign_report_payload(&key.verifying_key().unwrap()).unwrap();
        let parsed: SignReportPayload = serde_json::from_slice(&payload).unwrap();
        assert_eq!(parsed.version, SIGN_REPORT_PAYLOAD_VERSION);
        assert_eq!(
            parsed.attestation_public_key.version,
            ATTESTATION_PUBLIC_KEY_VERSION
        );
        assert_eq!(
            parsed.attestation_public_key.purpose,
            ATTESTATION_PUBLIC_KEY_PURPOSE
        );
    }
}
