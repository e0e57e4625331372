//! Shared HTTP client construction for the REST backends.
//!
//! Every outbound client speaks TLS 1.2 or 1.3 through rustls and verifies
//! server certificates against the webpki root store. Clients built with
//! CRL files also reject any certificate in the chain that those lists
//! revoke, and fail closed when a list from the issuing CA is present but
//! cannot vouch for the certificate.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use farmiq_types::error::ConfigError;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Url;
use rustls::client::WebPkiServerVerifier;
use rustls::crypto::CryptoProvider;
use rustls::pki_types::CertificateRevocationListDer;
use rustls::pki_types::pem::PemObject;
use rustls::{ClientConfig, RootCertStore};
use secrecy::{ExposeSecret, SecretString};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Build a client with validated TLS and the given default headers.
pub fn build_client(default_headers: HeaderMap) -> Result<reqwest::Client, ConfigError> {
    build_client_with_crls(default_headers, &[])
}

/// Build a client whose certificate verifier consults the PEM CRLs in
/// `crl_files`.
pub fn build_client_with_crls(
    default_headers: HeaderMap,
    crl_files: &[PathBuf],
) -> Result<reqwest::Client, ConfigError> {
    let verifier = server_verifier(root_store(), load_crls(crl_files)?)?;
    reqwest::Client::builder()
        .use_preconfigured_tls(tls_config(verifier)?)
        .timeout(REQUEST_TIMEOUT)
        .connect_timeout(CONNECT_TIMEOUT)
        .default_headers(default_headers)
        .build()
        .map_err(|e| ConfigError::HttpClient(e.to_string()))
}

/// Warn when an https backend has no CRLs to check revocation against.
pub fn warn_unchecked_revocation(backend: &str, base_url: &str, crl_files: &[PathBuf]) {
    if crl_files.is_empty() && base_url.starts_with("https://") {
        tracing::warn!(backend, base_url, "No crl_files configured; certificate revocation is not checked");
    }
}

fn crypto_provider() -> Arc<CryptoProvider> {
    Arc::new(rustls::crypto::ring::default_provider())
}

fn root_store() -> RootCertStore {
    RootCertStore::from_iter(webpki_roots::TLS_SERVER_ROOTS.iter().cloned())
}

/// Read every CRL from each PEM file. A file holding none is an error.
fn load_crls(paths: &[PathBuf]) -> Result<Vec<CertificateRevocationListDer<'static>>, ConfigError> {
    let mut crls = Vec::new();
    for path in paths {
        let invalid = |reason: String| ConfigError::InvalidCrl {
            path: path.display().to_string(),
            reason,
        };
        let before = crls.len();
        for crl in CertificateRevocationListDer::pem_file_iter(path).map_err(|e| invalid(e.to_string()))? {
            crls.push(crl.map_err(|e| invalid(e.to_string()))?);
        }
        if crls.len() == before {
            return Err(invalid("no CRL found".to_string()));
        }
    }
    Ok(crls)
}

fn server_verifier(
    roots: RootCertStore,
    crls: Vec<CertificateRevocationListDer<'static>>,
) -> Result<Arc<WebPkiServerVerifier>, ConfigError> {
    if !crls.is_empty() {
        tracing::debug!(crls = crls.len(), "Certificate revocation lists loaded");
    }
    WebPkiServerVerifier::builder_with_provider(Arc::new(roots), crypto_provider())
        .with_crls(crls)
        .build()
        .map_err(|e| ConfigError::HttpClient(e.to_string()))
}

fn tls_config(verifier: Arc<WebPkiServerVerifier>) -> Result<ClientConfig, ConfigError> {
    Ok(ClientConfig::builder_with_provider(crypto_provider())
        .with_protocol_versions(&[&rustls::version::TLS13, &rustls::version::TLS12])
        .map_err(|e| ConfigError::HttpClient(e.to_string()))?
        .with_webpki_verifier(verifier)
        .with_no_client_auth())
}

/// Default headers carrying `key` under `header`, or none when `key` is unset.
///
/// The header value is marked sensitive so it is redacted from debug output.
pub fn key_headers(header: &'static str, key: Option<&SecretString>) -> Result<HeaderMap, ConfigError> {
    let mut headers = HeaderMap::new();
    if let Some(key) = key {
        let mut value = HeaderValue::from_str(key.expose_secret().trim())
            .map_err(|_| ConfigError::MissingValue(format!("{header} must be a valid header value")))?;
        value.set_sensitive(true);
        headers.insert(HeaderName::from_static(header), value);
    }
    Ok(headers)
}

/// Compose an endpoint URL from a host and optional port.
///
/// A host without a scheme gets `http://`. The result has no trailing slash.
pub fn endpoint_url(host: &str, port: Option<u16>) -> Result<String, ConfigError> {
    let host = host.trim();
    let with_scheme = if host.contains("://") {
        host.to_string()
    } else {
        format!("http://{host}")
    };

    let invalid = |reason: String| ConfigError::InvalidEndpoint {
        value: host.to_string(),
        reason,
    };

    let mut url = Url::parse(&with_scheme).map_err(|e| invalid(e.to_string()))?;
    if url.host_str().is_none_or(str::is_empty) {
        return Err(invalid("missing host".to_string()));
    }
    if let Some(port) = port {
        url.set_port(Some(port))
            .map_err(|_| invalid("cannot set port".to_string()))?;
    }
    Ok(url.as_str().trim_end_matches('/').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_adds_scheme_and_port() {
        assert_eq!(endpoint_url("localhost", Some(6333)).unwrap(), "http://localhost:6333");
        assert_eq!(
            endpoint_url("https://qdrant.example.com", Some(443)).unwrap(),
            "https://qdrant.example.com"
        );
        assert_eq!(
            endpoint_url("https://qdrant.example.com/", None).unwrap(),
            "https://qdrant.example.com"
        );
    }

    #[test]
    fn test_endpoint_rejects_garbage() {
        let err = endpoint_url("http://", Some(1)).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEndpoint { .. }));
        assert!(endpoint_url("local host", None).is_err());
    }

    #[test]
    fn test_key_headers() {
        let key = SecretString::from("secret-key");
        let headers = key_headers("api-key", Some(&key)).unwrap();
        assert_eq!(headers.get("api-key").unwrap(), "secret-key");
        assert!(headers.get("api-key").unwrap().is_sensitive());
        assert!(key_headers("api-key", None).unwrap().is_empty());
    }

    mod revocation {
        use super::*;
        use rcgen::{
            BasicConstraints, Certificate, CertificateParams, CertificateRevocationList,
            CertificateRevocationListParams, DnType, IsCa, KeyIdMethod, KeyPair, KeyUsagePurpose,
            RevocationReason, RevokedCertParams, SerialNumber, date_time_ymd,
        };
        use rustls::client::danger::ServerCertVerifier;
        use rustls::pki_types::{ServerName, UnixTime};
        use rustls::{CertificateError, Error};

        const HOST: &str = "qdrant.farmiq.test";

        struct TestCa {
            cert: Certificate,
            key: KeyPair,
        }

        impl TestCa {
            fn new(name: &str) -> Self {
                let key = KeyPair::generate().unwrap();
                let mut params = CertificateParams::new(Vec::<String>::new()).unwrap();
                params.distinguished_name.push(DnType::CommonName, name);
                params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
                params.key_usages = vec![
                    KeyUsagePurpose::KeyCertSign,
                    KeyUsagePurpose::CrlSign,
                    KeyUsagePurpose::DigitalSignature,
                ];
                let cert = params.self_signed(&key).unwrap();
                Self { cert, key }
            }

            fn roots(&self) -> RootCertStore {
                let mut roots = RootCertStore::empty();
                roots.add(self.cert.der().clone()).unwrap();
                roots
            }

            fn leaf(&self, serial: u64) -> Certificate {
                let key = KeyPair::generate().unwrap();
                let mut params = CertificateParams::new(vec![HOST.to_string()]).unwrap();
                params.distinguished_name.push(DnType::CommonName, HOST);
                params.serial_number = Some(SerialNumber::from(serial));
                params.signed_by(&key, &self.cert, &self.key).unwrap()
            }

            fn crl(&self, revoked: &[u64]) -> CertificateRevocationList {
                CertificateRevocationListParams {
                    this_update: date_time_ymd(2024, 1, 1),
                    next_update: date_time_ymd(2099, 1, 1),
                    crl_number: SerialNumber::from(1u64),
                    issuing_distribution_point: None,
                    revoked_certs: revoked
                        .iter()
                        .map(|serial| RevokedCertParams {
                            serial_number: SerialNumber::from(*serial),
                            revocation_time: date_time_ymd(2024, 1, 1),
                            reason_code: Some(RevocationReason::KeyCompromise),
                            invalidity_date: None,
                        })
                        .collect(),
                    key_identifier_method: KeyIdMethod::Sha256,
                }
                .signed_by(&self.cert, &self.key)
                .unwrap()
            }
        }

        fn verify(
            verifier: &WebPkiServerVerifier,
            leaf: &Certificate,
        ) -> Result<(), Error> {
            let name = ServerName::try_from(HOST).unwrap();
            verifier
                .verify_server_cert(leaf.der(), &[], &name, &[], UnixTime::now())
                .map(|_| ())
        }

        #[test]
        fn test_revoked_certificate_is_rejected() {
            let ca = TestCa::new("FarmIQ Test CA");
            let leaf = ca.leaf(42);
            let verifier = server_verifier(ca.roots(), vec![ca.crl(&[42]).der().clone()]).unwrap();

            let err = verify(&verifier, &leaf).unwrap_err();
            assert_eq!(err, Error::InvalidCertificate(CertificateError::Revoked));
        }

        #[test]
        fn test_certificate_absent_from_crl_is_accepted() {
            let ca = TestCa::new("FarmIQ Test CA");
            let leaf = ca.leaf(7);
            let verifier = server_verifier(ca.roots(), vec![ca.crl(&[42]).der().clone()]).unwrap();

            verify(&verifier, &leaf).unwrap();
        }

        #[test]
        fn test_crl_from_another_issuer_fails_closed() {
            let ca = TestCa::new("FarmIQ Test CA");
            let other = TestCa::new("Unrelated CA");
            let leaf = ca.leaf(7);
            let verifier = server_verifier(ca.roots(), vec![other.crl(&[]).der().clone()]).unwrap();

            let err = verify(&verifier, &leaf).unwrap_err();
            assert_eq!(
                err,
                Error::InvalidCertificate(CertificateError::UnknownRevocationStatus)
            );
        }

        #[test]
        fn test_untrusted_issuer_is_rejected() {
            let ca = TestCa::new("FarmIQ Test CA");
            let leaf = TestCa::new("Rogue CA").leaf(7);
            let verifier = server_verifier(ca.roots(), Vec::new()).unwrap();

            assert!(matches!(
                verify(&verifier, &leaf),
                Err(Error::InvalidCertificate(CertificateError::UnknownIssuer))
            ));
        }

        #[test]
        fn test_crl_files_load_into_client() {
            let ca = TestCa::new("FarmIQ Test CA");
            let tmp = tempfile::tempdir().unwrap();
            let path = tmp.path().join("ca.crl.pem");
            std::fs::write(&path, ca.crl(&[42]).pem().unwrap()).unwrap();

            assert_eq!(load_crls(&[path.clone()]).unwrap().len(), 1);
            assert!(build_client_with_crls(HeaderMap::new(), &[path]).is_ok());
        }

        #[test]
        fn test_unreadable_or_empty_crl_file_is_config_error() {
            let tmp = tempfile::tempdir().unwrap();
            let empty = tmp.path().join("empty.pem");
            std::fs::write(&empty, "not a crl").unwrap();

            for path in [empty, tmp.path().join("missing.pem")] {
                let err = load_crls(&[path]).unwrap_err();
                assert!(matches!(err, ConfigError::InvalidCrl { .. }));
            }
        }
    }
}
