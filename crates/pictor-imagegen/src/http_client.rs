use std::{sync::OnceLock, time::Duration};

use reqwest::{
    Client,
    header::{CONNECTION, HeaderMap, HeaderValue},
};

/// Shared HTTP client reused by every provider so connections are pooled
/// across the slots of a batch
pub(crate) fn http_client() -> Client {
    static CLIENT: OnceLock<Client> = OnceLock::new();

    CLIENT
        .get_or_init(|| {
            let mut headers = HeaderMap::new();
            headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));

            Client::builder()
                .timeout(Duration::from_secs(120))
                .pool_idle_timeout(Some(Duration::from_secs(30)))
                .tcp_nodelay(true)
                .default_headers(headers)
                .user_agent(concat!("pictor/", env!("CARGO_PKG_VERSION")))
                .build()
                .expect("Failed to build default HTTP client")
        })
        .clone()
}
