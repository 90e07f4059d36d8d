//! HTTP transport selection for the Jenkins client.
//!
//! [`Transport::Insecure`] turns off certificate verification and with it any
//! protection against active tampering on the network path. It exists for
//! self-signed and internal deployments and is only ever selected when the
//! operator sets `insecure = true`.

use crate::error::Result;
use reqwest::Client;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    /// Platform default: certificates are verified against the webpki roots.
    Default,
    /// Certificate verification disabled.
    Insecure,
}

impl Transport {
    pub fn for_config(insecure: bool) -> Self {
        if insecure {
            Transport::Insecure
        } else {
            Transport::Default
        }
    }

    pub fn accepts_invalid_certs(self) -> bool {
        matches!(self, Transport::Insecure)
    }

    pub fn build_client(self, timeout: Duration) -> Result<Client> {
        match self {
            Transport::Default => default_http_client(timeout),
            Transport::Insecure => insecure_http_client(timeout),
        }
    }
}

fn default_http_client(timeout: Duration) -> Result<Client> {
    Ok(Client::builder().use_rustls_tls().timeout(timeout).build()?)
}

/// Build a client that accepts any server certificate.
pub fn insecure_http_client(timeout: Duration) -> Result<Client> {
    Ok(Client::builder()
        .use_rustls_tls()
        .danger_accept_invalid_certs(true)
        .timeout(timeout)
        .build()?)
}
