//! Provider client for generic station files, local or remote.
//!
//! Many station consoles export a raw text file (clientraw-style) either on
//! local disk or behind HTTP/FTP. This client reuses the same cache-or-fetch
//! routine as the API providers and returns the body verbatim, leaving
//! interpretation to the caller.

use std::sync::Arc;

use async_trait::async_trait;
use suppaftp::native_tls::TlsConnector;
use suppaftp::{FtpStream, NativeTlsConnector, NativeTlsFtpStream};
use url::Url;

use meteohub_core::{
    client::Retriever,
    model::{CacheTtl, Payload, ProviderId, ProviderMeta},
    plugin::ProviderPlugin,
    ports::{AcquisitionError, CacheStore, Fetcher, ObservationPort},
    transport::{HttpFetcher, NO_STATUS, TransportConfig},
};

const DEFAULT_FTP_PORT: u16 = 21;
const ANONYMOUS_LOGIN: &str = "anonymous";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// How the station file is reached.
pub enum ConnectionKind {
    /// Plain path on the local filesystem.
    Local,
    /// Plain HTTP.
    Http,
    /// HTTP over TLS.
    Https,
    /// Plain FTP.
    Ftp,
    /// FTP upgraded to TLS.
    Ftps,
}

impl ConnectionKind {
    /// Map the configured connection type code (1–5) to a kind.
    ///
    /// # Errors
    ///
    /// Returns [`AcquisitionError::Configuration`] for codes outside 1–5.
    pub fn from_code(code: u8) -> Result<Self, AcquisitionError> {
        match code {
            1 => Ok(ConnectionKind::Local),
            2 => Ok(ConnectionKind::Http),
            3 => Ok(ConnectionKind::Https),
            4 => Ok(ConnectionKind::Ftp),
            5 => Ok(ConnectionKind::Ftps),
            other => Err(AcquisitionError::Configuration(format!(
                "Unknown connection type code {other}"
            ))),
        }
    }

    /// Protocol scheme prefixed onto the resource; empty for local paths.
    #[must_use]
    pub const fn scheme(&self) -> &'static str {
        match self {
            ConnectionKind::Local => "",
            ConnectionKind::Http => "http",
            ConnectionKind::Https => "https",
            ConnectionKind::Ftp => "ftp",
            ConnectionKind::Ftps => "ftps",
        }
    }
}

/// Client for one configured station file.
pub struct FileClient {
    retriever: Retriever,
    meta: ProviderMeta,
    kind: ConnectionKind,
    resource: String,
}

impl FileClient {
    /// Create a client bound to one resource and connection kind.
    #[must_use]
    pub fn new(
        fetcher: Arc<dyn Fetcher>,
        cache: Option<Arc<dyn CacheStore>>,
        ttl: CacheTtl,
        kind: ConnectionKind,
        resource: String,
    ) -> Self {
        Self {
            retriever: Retriever::new(fetcher, cache, ttl),
            meta: provider_meta(),
            kind,
            resource,
        }
    }

    /// Resolve the resource location: scheme-prefixed, or the bare path for
    /// local files.
    #[must_use]
    pub fn resource_url(&self) -> String {
        match self.kind {
            ConnectionKind::Local => self.resource.clone(),
            _ => format!("{}://{}", self.kind.scheme(), self.resource),
        }
    }

    /// Fetch the file body verbatim.
    ///
    /// # Errors
    ///
    /// Propagates the classified [`AcquisitionError`] from the transport.
    pub async fn raw_data(&self) -> Result<String, AcquisitionError> {
        self.retriever.retrieve(&self.resource_url()).await
    }
}

#[async_trait]
impl ObservationPort for FileClient {
    fn provider(&self) -> &ProviderMeta {
        &self.meta
    }

    async fn observations(&self) -> Result<Payload, AcquisitionError> {
        Ok(Payload::Raw(self.raw_data().await?))
    }
}

/// Fetcher covering every file connection kind behind one URL surface.
///
/// Local paths are read from disk, `http(s)` URLs delegate to the core HTTP
/// transport, and `ftp(s)` URLs are retrieved through a blocking FTP session
/// on the runtime's blocking pool.
pub struct FileFetcher {
    http: HttpFetcher,
}

impl FileFetcher {
    /// Build a fetcher from the shared transport settings.
    ///
    /// # Errors
    ///
    /// Returns [`AcquisitionError::Configuration`] when the HTTP transport
    /// cannot be constructed.
    pub fn new(transport: &TransportConfig) -> Result<Self, AcquisitionError> {
        Ok(Self {
            http: HttpFetcher::new(transport)?,
        })
    }
}

#[async_trait]
impl Fetcher for FileFetcher {
    async fn fetch(&self, url: &str) -> Result<String, AcquisitionError> {
        if url.starts_with("http://") || url.starts_with("https://") {
            self.http.fetch(url).await
        } else if url.starts_with("ftp://") {
            fetch_over_ftp(url, false).await
        } else if url.starts_with("ftps://") {
            fetch_over_ftp(url, true).await
        } else {
            read_local(url).await
        }
    }
}

async fn read_local(path: &str) -> Result<String, AcquisitionError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|error| AcquisitionError::Transport {
            status: NO_STATUS,
            message: error.to_string(),
        })
}

async fn fetch_over_ftp(url: &str, secure: bool) -> Result<String, AcquisitionError> {
    let parsed = Url::parse(url)
        .map_err(|error| AcquisitionError::Configuration(format!("Invalid FTP URL: {error}")))?;

    let host = parsed
        .host_str()
        .ok_or_else(|| AcquisitionError::Configuration(format!("FTP URL without host: {url}")))?
        .to_owned();
    let port = parsed.port().unwrap_or(DEFAULT_FTP_PORT);

    let user = if parsed.username().is_empty() {
        String::from(ANONYMOUS_LOGIN)
    } else {
        String::from(parsed.username())
    };
    let password = parsed
        .password()
        .map_or_else(|| String::from(ANONYMOUS_LOGIN), String::from);
    let path = parsed.path().to_owned();

    let bytes = tokio::task::spawn_blocking(move || {
        retrieve_over_ftp(&host, port, &user, &password, &path, secure)
    })
    .await
    .map_err(|error| AcquisitionError::Transport {
        status: NO_STATUS,
        message: error.to_string(),
    })??;

    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn retrieve_over_ftp(
    host: &str,
    port: u16,
    user: &str,
    password: &str,
    path: &str,
    secure: bool,
) -> Result<Vec<u8>, AcquisitionError> {
    if secure {
        let connector = NativeTlsConnector::from(
            TlsConnector::new()
                .map_err(|error| AcquisitionError::Configuration(error.to_string()))?,
        );

        let plain = NativeTlsFtpStream::connect((host, port)).map_err(ftp_failure)?;
        let mut session = plain.into_secure(connector, host).map_err(ftp_failure)?;

        session.login(user, password).map_err(ftp_failure)?;
        let buffer = session.retr_as_buffer(path).map_err(ftp_failure)?;
        finish_session(session.quit());

        Ok(buffer.into_inner())
    } else {
        let mut session = FtpStream::connect((host, port)).map_err(ftp_failure)?;

        session.login(user, password).map_err(ftp_failure)?;
        let buffer = session.retr_as_buffer(path).map_err(ftp_failure)?;
        finish_session(session.quit());

        Ok(buffer.into_inner())
    }
}

fn ftp_failure(error: suppaftp::FtpError) -> AcquisitionError {
    AcquisitionError::Transport {
        status: NO_STATUS,
        message: error.to_string(),
    }
}

// The payload is already retrieved at this point; a failed QUIT only loses
// politeness, not data.
fn finish_session(outcome: Result<(), suppaftp::FtpError>) {
    if let Err(error) = outcome {
        tracing::debug!("FTP session close failed: {error}");
    }
}

/// Build the plugin bundle for the generic file provider.
///
/// # Errors
///
/// Returns [`AcquisitionError::Configuration`] for an unknown connection
/// code or when the default transport cannot be constructed.
pub fn plugin(
    transport: &TransportConfig,
    cache: Option<Arc<dyn CacheStore>>,
    ttl: CacheTtl,
    connection_code: u8,
    resource: String,
) -> Result<ProviderPlugin, AcquisitionError> {
    let kind = ConnectionKind::from_code(connection_code)?;
    let fetcher: Arc<dyn Fetcher> = Arc::new(FileFetcher::new(transport)?);
    let client = FileClient::new(fetcher, cache, ttl, kind, resource);

    Ok(ProviderPlugin {
        meta: provider_meta(),
        port: Arc::new(client),
    })
}

fn provider_meta() -> ProviderMeta {
    ProviderMeta {
        id: ProviderId::File,
        name: String::from("Station file"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StubFetcher;

    #[async_trait]
    impl Fetcher for StubFetcher {
        async fn fetch(&self, _url: &str) -> Result<String, AcquisitionError> {
            Ok(String::from("12.5,1013.2,64\n"))
        }
    }

    fn client(kind: ConnectionKind, resource: &str) -> FileClient {
        FileClient::new(
            Arc::new(StubFetcher),
            None,
            CacheTtl::OFF,
            kind,
            String::from(resource),
        )
    }

    #[test]
    fn each_connection_code_maps_to_its_scheme() {
        let cases = [
            (1, ""),
            (2, "http"),
            (3, "https"),
            (4, "ftp"),
            (5, "ftps"),
        ];

        for (code, scheme) in cases {
            let kind = ConnectionKind::from_code(code).expect("codes 1-5 are valid");
            assert_eq!(kind.scheme(), scheme);
        }
    }

    #[test]
    fn unknown_codes_are_configuration_errors() {
        let err = ConnectionKind::from_code(7).unwrap_err();
        assert!(matches!(err, AcquisitionError::Configuration(_)));
    }

    #[test]
    fn local_resources_stay_bare_paths() {
        let local = client(ConnectionKind::Local, "/var/lib/station/clientraw.txt");
        assert_eq!(local.resource_url(), "/var/lib/station/clientraw.txt");
    }

    #[test]
    fn remote_resources_are_scheme_prefixed() {
        let https = client(ConnectionKind::Https, "station.example.test/clientraw.txt");
        assert_eq!(
            https.resource_url(),
            "https://station.example.test/clientraw.txt"
        );

        let ftps = client(ConnectionKind::Ftps, "station.example.test/clientraw.txt");
        assert_eq!(
            ftps.resource_url(),
            "ftps://station.example.test/clientraw.txt"
        );
    }

    #[tokio::test]
    async fn raw_data_returns_the_body_verbatim() {
        let local = client(ConnectionKind::Local, "/var/lib/station/clientraw.txt");

        let body = local.raw_data().await.expect("stub must succeed");
        assert_eq!(body, "12.5,1013.2,64\n");
    }

    #[tokio::test]
    async fn local_reads_go_through_the_filesystem() {
        let path = std::env::temp_dir().join("meteohub-file-provider-test.txt");
        std::fs::write(&path, "raw station line\n").expect("temp file must be writable");

        let transport = TransportConfig::default();
        let fetcher = FileFetcher::new(&transport).expect("fetcher must build");

        let body = fetcher
            .fetch(path.to_str().expect("temp path is valid UTF-8"))
            .await
            .expect("local read must succeed");
        assert_eq!(body, "raw station line\n");

        std::fs::remove_file(&path).expect("temp file must be removable");
    }

    #[tokio::test]
    async fn missing_local_files_are_transport_failures() {
        let transport = TransportConfig::default();
        let fetcher = FileFetcher::new(&transport).expect("fetcher must build");

        let err = fetcher
            .fetch("/nonexistent/meteohub/clientraw.txt")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AcquisitionError::Transport { status: NO_STATUS, .. }
        ));
    }
}
