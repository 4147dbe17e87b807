use std::time::Duration;

use bytes::Bytes;
use eyre::WrapErr;
use futures_util::future::BoxFuture;
use http::header::CONTENT_TYPE;
use http_body_util::{BodyExt, Full};
use hyper::{body::Incoming, Response};

use super::{dsn::Dsn, event::Event, Transport};
use crate::{
    error::ConnectError,
    https::client::{ClientBuilder, HttpsClient},
};

const CLIENT_NAME: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Posts events to the store endpoint of a Sentry-compatible backend.
pub struct SentryTransport {
    client: HttpsClient,
    store_url: String,
    auth: String,
    request_timeout: Duration,
}

impl SentryTransport {
    pub fn new(dsn: &Dsn, request_timeout: Duration) -> Result<Self, ConnectError> {
        let client = ClientBuilder::new()
            .enable_tcp_nodelay(true)
            .connect_timeout(request_timeout)
            .build()
            .map_err(|err| ConnectError::Transport(err.into()))?;

        Ok(Self {
            client,
            store_url: dsn.store_url(),
            auth: dsn.auth_header(CLIENT_NAME),
            request_timeout,
        })
    }
}

impl Transport for SentryTransport {
    fn send(&self, event: Event) -> BoxFuture<'static, eyre::Result<()>> {
        let client = self.client.clone();
        let url = self.store_url.clone();
        let auth = self.auth.clone();
        let timeout = self.request_timeout;

        Box::pin(async move {
            let body = serde_json::to_vec(&event.to_json())?;
            let request = http::Request::post(url)
                .header(CONTENT_TYPE, "application/json")
                .header("X-Sentry-Auth", auth)
                .body(Full::new(Bytes::from(body)))?;

            let response = tokio::time::timeout(timeout, client.request(request))
                .await
                .wrap_err_with(|| format!("Delivery of event {} timed out", event.id))?
                .wrap_err_with(|| format!("Failed delivering event {}", event.id))?;

            accept(response)
                .await
                .wrap_err_with(|| format!("Remote backend rejected event {}", event.id))
        })
    }
}

async fn accept(response: Response<Incoming>) -> eyre::Result<()> {
    let status = response.status();
    // Drain the body so the connection can be reused.
    let body = response.into_body().collect().await?.to_bytes();

    if !status.is_success() {
        eyre::bail!("{}: {}", status, String::from_utf8_lossy(&body).trim());
    }

    Ok(())
}
