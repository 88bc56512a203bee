// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Binding-digest generation for hardware reports.
//!
//! A binding digest compresses an arbitrary payload into a fixed-length
//! value suitable for a hardware report's user-data field, tagged with
//! markers identifying which protocol produced it. A digest generated for
//! one protocol never verifies under another, even for identical payloads.

use openssl::sha::sha256;
use thiserror::Error;

/// Size in bytes of a binding digest: a SHA-256 digest followed by the
/// generator and purpose markers.
pub const BINDING_DIGEST_SIZE: usize = 64;

const MARKER_SIZE: usize = 16;

/// Generator marker for the sign-report protocol.
const SIGN_REPORT_GENERATOR_ID: [u8; MARKER_SIZE] = [
    0x8f, 0x5e, 0x1b, 0x33, 0x27, 0x42, 0x4e, 0xa1, 0x9d, 0x6a, 0x70, 0xc8, 0x55, 0x0b, 0xe2,
    0x47,
];

/// Purpose marker for attestation-key provisioning.
const ATTESTATION_KEY_PURPOSE_ID: [u8; MARKER_SIZE] = [
    0x2c, 0x91, 0xd4, 0x06, 0xbe, 0x7d, 0x4f, 0x58, 0x82, 0x33, 0x4a, 0xef, 0x19, 0x64, 0x0f,
    0xba,
];

/// Binding-digest errors.
#[derive(Debug, Error)]
pub enum BindingDigestError {
    /// The payload is not acceptable for digesting
    #[error("cannot generate a binding digest over an empty payload")]
    EmptyPayload,
}

/// Produces binding digests for one specific protocol.
///
/// The contract is a fixed output length of [`BINDING_DIGEST_SIZE`] bytes;
/// consumers embedding the digest into a report treat any other length as a
/// contract violation.
pub trait BindingDigestGenerator: Send + Sync {
    /// Generates the binding digest over `payload`.
    fn generate(&self, payload: &[u8]) -> Result<Vec<u8>, BindingDigestError>;
}

/// The built-in digest generator: SHA-256 of the payload followed by the
/// variant's generator and purpose markers.
pub struct DigestGenerator {
    generator_id: [u8; MARKER_SIZE],
    purpose_id: [u8; MARKER_SIZE],
}

impl DigestGenerator {
    /// Generator variant for binding an attestation public key into a report
    /// during the sign-report provisioning protocol.
    pub fn sign_report() -> Self {
        Self {
            generator_id: SIGN_REPORT_GENERATOR_ID,
            purpose_id: ATTESTATION_KEY_PURPOSE_ID,
        }
    }
}

impl BindingDigestGenerator for DigestGenerator {
    fn generate(&self, payload: &[u8]) -> Result<Vec<u8>, BindingDigestError> {
        if payload.is_empty() {
            return Err(BindingDigestError::EmptyPayload);
        }
        let mut digest = Vec::with_capacity(BINDING_DIGEST_SIZE);
        digest.extend_from_slice(&sha256(payload));
        digest.extend_from_slice(&self.generator_id);
        digest.extend_from_slice(&self.purpose_id);
        Ok(digest)
    }
}
