use std::time::Duration;

use bytes::Bytes;
use http_body_util::Full;
use hyper_rustls::HttpsConnector;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};

/// HTTP/1.1 + HTTP/2 client over rustls, trusting the platform's root certificates.
pub type HttpsClient = Client<HttpsConnector<HttpConnector>, Full<Bytes>>;

/// Builder for [`HttpsClient`].
#[derive(Default, Debug)]
pub struct ClientBuilder {
    connect_timeout: Option<Duration>,
    enable_tcp_nodelay: bool,
}

impl ClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connect_timeout(self, timeout: Duration) -> Self {
        Self {
            connect_timeout: Some(timeout),
            ..self
        }
    }

    pub fn enable_tcp_nodelay(self, enable_tcp_nodelay: bool) -> Self {
        Self {
            enable_tcp_nodelay,
            ..self
        }
    }

    pub fn build(self) -> Result<HttpsClient, rustls::Error> {
        let mut roots = rustls::RootCertStore::empty();
        let native = rustls_native_certs::load_native_certs();
        for err in &native.errors {
            tracing::debug!(target: "sevlog", "skipping native root certificate: {}", err);
        }
        roots.add_parsable_certificates(native.certs);

        let tls_config = rustls::ClientConfig::builder_with_provider(
            rustls::crypto::aws_lc_rs::default_provider().into(),
        )
        .with_safe_default_protocol_versions()?
        .with_root_certificates(roots)
        .with_no_client_auth();

        let mut http_connector = HttpConnector::new();
        http_connector.enforce_http(false);
        http_connector.set_nodelay(self.enable_tcp_nodelay);
        http_connector.set_connect_timeout(self.connect_timeout);

        let connector = hyper_rustls::HttpsConnectorBuilder::new()
            .with_tls_config(tls_config)
            .https_or_http()
            .enable_http1()
            .enable_http2()
            .wrap_connector(http_connector);

        Ok(Client::builder(TokioExecutor::new()).build(connector))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_keeps_settings() {
        let builder = ClientBuilder::new()
            .connect_timeout(Duration::from_secs(2))
            .enable_tcp_nodelay(true);
        assert_eq!(builder.connect_timeout, Some(Duration::from_secs(2)));
        assert!(builder.enable_tcp_nodelay);
    }

    #[test]
    fn builds_without_a_runtime() {
        assert!(ClientBuilder::new().build().is_ok());
    }
}
