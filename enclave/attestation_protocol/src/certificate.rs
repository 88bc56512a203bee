// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Certificate and certificate chain records.

use crate::Base64Standard;
use serde::Deserialize;
use serde::Serialize;

/// Encoding of a [`Certificate`]'s data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CertificateFormat {
    /// Format not recognized.
    Unknown,
    /// DER-encoded X.509.
    X509Der,
    /// PEM-encoded X.509.
    X509Pem,
}

/// A single certificate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Certificate {
    /// Encoding of `data`.
    pub format: CertificateFormat,
    /// The encoded certificate.
    #[serde(with = "Base64Standard")]
    pub data: Vec<u8>,
}

/// An ordered certificate chain, end-entity certificate first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateChain {
    /// The certificates in the chain.
    pub certificates: Vec<Certificate>,
}
