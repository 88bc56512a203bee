// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The record returned to a peer by the remote assertion service.

use crate::Base64Standard;
use crate::certificate::CertificateChain;
use crate::keys::AsymmetricKeyRecord;
use serde::Deserialize;
use serde::Serialize;

/// An assertion over caller-supplied user data, signed with the enclave's
/// attestation key.
///
/// The verifying-key record and certificate chains let the peer check the
/// signature and walk the chains back to a root it trusts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedAssertion {
    /// The bytes that were signed.
    #[serde(with = "Base64Standard")]
    pub payload: Vec<u8>,
    /// Signature over `payload` by the attestation key.
    #[serde(with = "Base64Standard")]
    pub signature: Vec<u8>,
    /// The attestation verifying key.
    pub verifying_key: AsymmetricKeyRecord,
    /// Certificate chains vouching for the attestation key.
    pub certificate_chains: Vec<CertificateChain>,
}
