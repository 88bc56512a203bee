// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Protocol definitions shared between the assertion generator enclave, the
//! secret sealer, and the report-binding layer.
//!
//! The records here are pure serialization targets. They carry no behavior
//! beyond construction, field access, and (de)serialization; all validation
//! lives with the consumers. Byte fields serialize as base64 so that every
//! record round-trips byte-for-byte through its serialized form.

pub mod assertion;
pub mod certificate;
pub mod keys;
pub mod report;
pub mod sealed;

use base64::engine::general_purpose::STANDARD;
use base64_serde::base64_serde_type;

base64_serde_type!(pub(crate) Base64Standard, STANDARD);
