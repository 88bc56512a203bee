// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Records for binding an attestation public key into a hardware report.

use crate::keys::AsymmetricKeyRecord;
use serde::Deserialize;
use serde::Serialize;
use zerocopy::FromBytes;
use zerocopy::Immutable;
use zerocopy::IntoBytes;
use zerocopy::KnownLayout;

/// Size in bytes of a hardware report's user-data field.
pub const REPORT_DATA_SIZE: usize = 64;

/// The user-data field embedded in a hardware-signed report.
///
/// The hardware attests to exactly these bytes; a verifier recomputes the
/// binding digest from the payload it was shown and compares.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoBytes, FromBytes, Immutable, KnownLayout)]
pub struct ReportData(pub [u8; REPORT_DATA_SIZE]);

/// An attestation public key wrapped with the version and purpose tags that
/// identify what it may be used for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttestationPublicKey {
    /// The verifying-key record.
    pub attestation_public_key: AsymmetricKeyRecord,
    /// Version tag of the attestation key format.
    pub version: String,
    /// Purpose tag scoping the key's use.
    pub purpose: String,
}

/// The payload whose digest a mutually-trusted enclave binds into its
/// hardware report during the sign-report protocol.
///
/// The serialized bytes of this record, not the structure itself, are the
/// security-relevant artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignReportPayload {
    /// Version of the sign-report protocol.
    pub version: String,
    /// The attestation public key being bound.
    pub attestation_public_key: AttestationPublicKey,
}
