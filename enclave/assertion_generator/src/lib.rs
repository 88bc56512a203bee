// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Attestation-key protection core of the assertion generator enclave.
//!
//! The enclave's long-lived identity material is an ECDSA attestation
//! signing key and the certificate chains that vouch for it. This crate
//! seals that material so it survives restarts within one trust domain
//! ([`secret`]), converts keys to and from portable records ([`key_proto`]),
//! binds the attestation public key into a hardware report for the
//! sign-report provisioning exchange ([`report_data`]), and assembles the
//! remote assertion endpoint ([`service`], [`server`]).

pub mod key_proto;
pub mod report_data;
pub mod secret;
pub mod server;
pub mod service;
