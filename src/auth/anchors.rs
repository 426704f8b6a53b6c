// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Trust anchors: the key material tokens are verified against.
//!
//! Two kinds coexist:
//!
//! - **Certificate** - the public key of an X.509 certificate (RSA or EC),
//!   verifying `RS*`, `PS*` and `ES*` tokens
//! - **Shared key** - raw HMAC key bytes, verifying `HS*` tokens
//!
//! Anchors are loaded once at start-up and never change afterwards.

use std::path::{Path, PathBuf};

use base64ct::{Base64, Base64UrlUnpadded, Encoding};
use jsonwebtoken::{Algorithm, DecodingKey};
use sha2::{Digest, Sha256};
use x509_parser::{parse_x509_certificate, public_key::PublicKey};

const CERTIFICATE_PEM_TAG: &str = "CERTIFICATE";

/// Errors raised while loading trust anchors.
#[derive(Debug, thiserror::Error)]
pub enum TrustAnchorError {
    #[error("failed to read certificate file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid PEM data: {0}")]
    Pem(#[from] pem::PemError),
    #[error("invalid X.509 certificate: {0}")]
    Certificate(String),
    #[error("certificate {subject} has an unsupported public key type")]
    UnsupportedKey { subject: String },
    #[error("PEM data contains no certificates")]
    NoCertificates,
    #[error("no certificate with subject {0:?}")]
    SubjectNotFound(String),
    #[error("shared key is not valid base64")]
    InvalidSharedKey,
    #[error("shared key is empty")]
    EmptySharedKey,
}

/// Which kind of key a signing algorithm needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyFamily {
    Hmac,
    Rsa,
    Ec,
}

impl KeyFamily {
    /// Key family for a token's `alg`, or `None` if no anchor can verify it.
    pub fn for_algorithm(alg: Algorithm) -> Option<KeyFamily> {
        match alg {
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => Some(KeyFamily::Hmac),
            Algorithm::RS256
            | Algorithm::RS384
            | Algorithm::RS512
            | Algorithm::PS256
            | Algorithm::PS384
            | Algorithm::PS512 => Some(KeyFamily::Rsa),
            Algorithm::ES256 | Algorithm::ES384 => Some(KeyFamily::Ec),
            _ => None,
        }
    }
}

/// Public key taken from an X.509 certificate.
#[derive(Clone)]
pub struct CertificateAnchor {
    subject: String,
    thumbprint: String,
    family: KeyFamily,
    key: DecodingKey,
}

impl CertificateAnchor {
    /// Parse one DER-encoded certificate.
    pub fn from_der(der: &[u8]) -> Result<Self, TrustAnchorError> {
        let (_, cert) = parse_x509_certificate(der)
            .map_err(|e| TrustAnchorError::Certificate(e.to_string()))?;
        let subject = cert.subject().to_string();

        if !cert.validity().is_valid() {
            tracing::warn!(
                subject = %subject,
                not_after = %cert.validity().not_after,
                "Signing certificate is outside its validity period"
            );
        }

        let spki = cert.public_key();
        let key_bytes: &[u8] = &spki.subject_public_key.data;
        let (family, key) = match spki.parsed() {
            Ok(PublicKey::RSA(_)) => (KeyFamily::Rsa, DecodingKey::from_rsa_der(key_bytes)),
            Ok(PublicKey::EC(_)) => (KeyFamily::Ec, DecodingKey::from_ec_der(key_bytes)),
            _ => return Err(TrustAnchorError::UnsupportedKey { subject }),
        };

        Ok(Self {
            subject,
            thumbprint: Base64UrlUnpadded::encode_string(&Sha256::digest(der)),
            family,
            key,
        })
    }

    /// Certificate subject, e.g. `CN=JwtAuthForWebAPI Example`.
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Base64url SHA-256 thumbprint of the DER certificate (`x5t#S256`).
    pub fn thumbprint(&self) -> &str {
        &self.thumbprint
    }

    pub fn family(&self) -> KeyFamily {
        self.family
    }
}

/// Shared symmetric key.
#[derive(Clone)]
pub struct SharedKeyAnchor {
    key: DecodingKey,
}

impl SharedKeyAnchor {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TrustAnchorError> {
        if bytes.is_empty() {
            return Err(TrustAnchorError::EmptySharedKey);
        }
        Ok(Self {
            key: DecodingKey::from_secret(bytes),
        })
    }

    /// Decode standard (padded) base64 key material.
    pub fn from_base64(encoded: &str) -> Result<Self, TrustAnchorError> {
        let bytes = Base64::decode_vec(encoded.trim())
            .map_err(|_| TrustAnchorError::InvalidSharedKey)?;
        Self::from_bytes(&bytes)
    }
}

/// A single trust anchor.
#[derive(Clone)]
pub enum TrustAnchor {
    Certificate(CertificateAnchor),
    SharedKey(SharedKeyAnchor),
}

impl TrustAnchor {
    pub fn family(&self) -> KeyFamily {
        match self {
            TrustAnchor::Certificate(cert) => cert.family,
            TrustAnchor::SharedKey(_) => KeyFamily::Hmac,
        }
    }

    pub fn decoding_key(&self) -> &DecodingKey {
        match self {
            TrustAnchor::Certificate(cert) => &cert.key,
            TrustAnchor::SharedKey(shared) => &shared.key,
        }
    }

    /// Whether a `kid` / `x5t#S256` header value names this anchor.
    fn is_named_by(&self, hint: &str) -> bool {
        match self {
            TrustAnchor::Certificate(cert) => cert.thumbprint == hint,
            TrustAnchor::SharedKey(_) => false,
        }
    }
}

impl std::fmt::Debug for TrustAnchor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrustAnchor::Certificate(cert) => f
                .debug_struct("Certificate")
                .field("subject", &cert.subject)
                .field("thumbprint", &cert.thumbprint)
                .field("family", &cert.family)
                .finish(),
            TrustAnchor::SharedKey(_) => f.write_str("SharedKey(..)"),
        }
    }
}

/// The full, immutable set of anchors a verifier consults.
#[derive(Debug, Clone, Default)]
pub struct TrustAnchors {
    anchors: Vec<TrustAnchor>,
}

impl TrustAnchors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_anchor(mut self, anchor: TrustAnchor) -> Self {
        self.anchors.push(anchor);
        self
    }

    /// Add every certificate in a PEM bundle.
    ///
    /// With `subject` set, only certificates whose subject equals it are
    /// kept, and finding none is an error.
    pub fn with_certificates_pem(
        mut self,
        pem_data: &[u8],
        subject: Option<&str>,
    ) -> Result<Self, TrustAnchorError> {
        let mut loaded = Vec::new();
        for block in pem::parse_many(pem_data)? {
            if block.tag() != CERTIFICATE_PEM_TAG {
                continue;
            }
            loaded.push(CertificateAnchor::from_der(block.contents())?);
        }
        if loaded.is_empty() {
            return Err(TrustAnchorError::NoCertificates);
        }

        if let Some(subject) = subject {
            loaded.retain(|cert| cert.subject == subject);
            if loaded.is_empty() {
                return Err(TrustAnchorError::SubjectNotFound(subject.to_string()));
            }
        }

        for cert in loaded {
            tracing::info!(
                subject = %cert.subject,
                thumbprint = %cert.thumbprint,
                "Loaded signing certificate"
            );
            self.anchors.push(TrustAnchor::Certificate(cert));
        }
        Ok(self)
    }

    /// Read a PEM bundle from disk, see [`TrustAnchors::with_certificates_pem`].
    pub fn with_certificates_file(
        self,
        path: &Path,
        subject: Option<&str>,
    ) -> Result<Self, TrustAnchorError> {
        let data = std::fs::read(path).map_err(|source| TrustAnchorError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.with_certificates_pem(&data, subject)
    }

    pub fn with_shared_key_base64(self, encoded: &str) -> Result<Self, TrustAnchorError> {
        Ok(self.with_anchor(TrustAnchor::SharedKey(SharedKeyAnchor::from_base64(encoded)?)))
    }

    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.anchors.len()
    }

    pub fn count(&self, family: KeyFamily) -> usize {
        self.anchors.iter().filter(|a| a.family() == family).count()
    }

    /// Anchors able to verify a token signed with `family`.
    ///
    /// If `hint` names one of them, only that one is returned.
    pub fn candidates(&self, family: KeyFamily, hint: Option<&str>) -> Vec<&TrustAnchor> {
        let matching: Vec<&TrustAnchor> = self
            .anchors
            .iter()
            .filter(|a| a.family() == family)
            .collect();

        if let Some(hint) = hint {
            if let Some(named) = matching.iter().find(|a| a.is_named_by(hint)) {
                return vec![*named];
            }
        }
        matching
    }
}
