//! CVM open-data portal client with rate limiting and retries.

use super::retry::RetryConfig;
use super::rows::{decode_latin1, parse_statement_csv};
use crate::error::{DataError, Result};
use crate::model::{FilingKind, RowSet, Scope, StatementKind};
use crate::source::RowSetSource;
use serde::{Deserialize, Serialize};
use std::io::{Cursor, Read};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{Instant, sleep};
use tracing::{debug, info, warn};

/// CVM open-data base URL
const CVM_BASE_URL: &str = "https://dados.cvm.gov.br/dados/CIA_ABERTA/DOC";

/// Default spacing between requests
const DEFAULT_MIN_INTERVAL: Duration = Duration::from_millis(250);

/// User agent for portal requests
const USER_AGENT: &str = "balanco/0.1 (financial statement analysis)";

/// Settings for [`CvmClient`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Portal base URL (overridable for mirrors)
    pub base_url: String,
    /// DFP (annual) or ITR (quarterly) filings
    pub filing: FilingKind,
    /// Consolidated or individual statements
    pub scope: Scope,
    /// Minimum spacing between requests
    pub min_interval: Duration,
    /// Per-request timeout; archives are large
    pub timeout: Duration,
    /// Retry policy for transient failures
    pub retry: RetryConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: CVM_BASE_URL.to_string(),
            filing: FilingKind::Annual,
            scope: Scope::Consolidated,
            min_interval: DEFAULT_MIN_INTERVAL,
            timeout: Duration::from_secs(300),
            retry: RetryConfig::default(),
        }
    }
}

/// Rate limiter to keep a polite distance between requests
struct RateLimiter {
    last_request: Instant,
    min_interval: Duration,
}

impl RateLimiter {
    fn new(min_interval: Duration) -> Self {
        Self {
            last_request: Instant::now() - min_interval,
            min_interval,
        }
    }

    async fn wait(&mut self) {
        let elapsed = self.last_request.elapsed();
        if elapsed < self.min_interval {
            sleep(self.min_interval - elapsed).await;
        }
        self.last_request = Instant::now();
    }
}

/// A failed attempt and whether it is worth repeating.
struct Attempt {
    retryable: bool,
    reason: String,
}

/// Client for the yearly statement archives on the CVM portal.
///
/// The archive of the most recently requested year is kept in memory, so the
/// three statements of a year cost a single download.
pub struct CvmClient {
    client: reqwest::Client,
    config: ClientConfig,
    rate_limiter: Arc<Mutex<RateLimiter>>,
    archive: Mutex<Option<(i32, Arc<Vec<u8>>)>>,
}

impl CvmClient {
    /// Create a client for annual consolidated statements.
    pub fn new() -> Result<Self> {
        Self::with_config(ClientConfig::default())
    }

    /// Create a client with custom settings.
    ///
    /// # Example
    /// ```no_run
    /// use balanco_data::cvm::{ClientConfig, CvmClient};
    /// use balanco_data::model::FilingKind;
    ///
    /// # fn example() -> balanco_data::Result<()> {
    /// let client = CvmClient::with_config(ClientConfig {
    ///     filing: FilingKind::Quarterly,
    ///     ..ClientConfig::default()
    /// })?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.timeout)
            .build()
            .map_err(DataError::Network)?;

        Ok(Self {
            client,
            rate_limiter: Arc::new(Mutex::new(RateLimiter::new(config.min_interval))),
            config,
            archive: Mutex::new(None),
        })
    }

    /// Client settings.
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// URL of the yearly archive.
    pub fn archive_url(&self, year: i32) -> String {
        format!(
            "{}/{}/DADOS/{}_cia_aberta_{}.zip",
            self.config.base_url.trim_end_matches('/'),
            self.config.filing.code(),
            self.config.filing.prefix(),
            year
        )
    }

    /// Name of a statement's CSV inside the yearly archive.
    pub fn member_name(&self, year: i32, statement: StatementKind) -> String {
        format!(
            "{}_cia_aberta_{}_{}_{}.csv",
            self.config.filing.prefix(),
            statement.cvm_code(),
            self.config.scope.code(),
            year
        )
    }

    /// Raw archive bytes for a year, downloading on first use.
    async fn archive(&self, year: i32) -> Result<Arc<Vec<u8>>> {
        let mut slot = self.archive.lock().await;
        if let Some((cached_year, bytes)) = slot.as_ref()
            && *cached_year == year
        {
            return Ok(Arc::clone(bytes));
        }

        let url = self.archive_url(year);
        info!(url = %url, "downloading statement archive");
        let bytes = Arc::new(self.download(&url).await?);
        debug!(year, size = bytes.len(), "archive downloaded");

        *slot = Some((year, Arc::clone(&bytes)));
        Ok(bytes)
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>> {
        let retry = &self.config.retry;
        let mut attempt = 0;

        loop {
            self.rate_limiter.lock().await.wait().await;

            match self.try_download(url).await {
                Ok(bytes) => return Ok(bytes),
                Err(failed) if failed.retryable && retry.allows(attempt) => {
                    let delay = retry.delay(attempt);
                    warn!(
                        url,
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        reason = %failed.reason,
                        "download failed, retrying"
                    );
                    sleep(delay).await;
                    attempt += 1;
                }
                Err(failed) => {
                    return Err(DataError::Retrieval {
                        resource: url.to_string(),
                        reason: failed.reason,
                    });
                }
            }
        }
    }

    async fn try_download(&self, url: &str) -> std::result::Result<Vec<u8>, Attempt> {
        let transport = |e: reqwest::Error| Attempt {
            retryable: e.is_timeout() || e.is_connect() || e.is_request(),
            reason: e.to_string(),
        };

        let response = self.client.get(url).send().await.map_err(transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(Attempt {
                retryable: self.config.retry.retries_status(status.as_u16()),
                reason: format!("HTTP {}", status),
            });
        }

        let bytes = response.bytes().await.map_err(transport)?;
        Ok(bytes.to_vec())
    }
}

/// Read one CSV member out of an archive as text.
fn read_member(archive: &[u8], member: &str) -> Result<String> {
    let mut zip = zip::ZipArchive::new(Cursor::new(archive))?;
    let mut file = zip.by_name(member).map_err(|e| match e {
        zip::result::ZipError::FileNotFound => DataError::Retrieval {
            resource: member.to_string(),
            reason: "not present in archive".to_string(),
        },
        other => DataError::Archive(other),
    })?;

    // a damaged member only costs this year
    let mut buffer = Vec::new();
    file.read_to_end(&mut buffer).map_err(|e| DataError::Retrieval {
        resource: member.to_string(),
        reason: format!("unreadable archive member: {}", e),
    })?;
    Ok(decode_latin1(&buffer))
}

impl RowSetSource for CvmClient {
    async fn fetch(&self, year: i32, statement: StatementKind, company: &str) -> Result<RowSet> {
        let archive = self.archive(year).await?;
        let member = self.member_name(year, statement);
        let text = read_member(&archive, &member)?;
        parse_statement_csv(&text, company, year, statement, self.config.filing)
    }

    fn filing(&self) -> FilingKind {
        self.config.filing
    }

    fn scope(&self) -> Scope {
        self.config.scope
    }
}

impl std::fmt::Debug for CvmClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CvmClient")
            .field("base_url", &self.config.base_url)
            .field("filing", &self.config.filing)
            .field("scope", &self.config.scope)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn archive_with(member: &str, contents: &[u8]) -> Vec<u8> {
        let mut buffer = Cursor::new(Vec::new());
        {
            let mut writer = zip::ZipWriter::new(&mut buffer);
            writer
                .start_file(member, zip::write::SimpleFileOptions::default())
                .unwrap();
            writer.write_all(contents).unwrap();
            writer.finish().unwrap();
        }
        buffer.into_inner()
    }

    #[test]
    fn test_archive_url() {
        let client = CvmClient::new().unwrap();
        assert_eq!(
            client.archive_url(2023),
            "https://dados.cvm.gov.br/dados/CIA_ABERTA/DOC/DFP/DADOS/dfp_cia_aberta_2023.zip"
        );
    }

    #[test]
    fn test_member_name() {
        let client = CvmClient::with_config(ClientConfig {
            filing: FilingKind::Quarterly,
            scope: Scope::Individual,
            ..ClientConfig::default()
        })
        .unwrap();
        assert_eq!(
            client.member_name(2022, StatementKind::LiabilitiesBalance),
            "itr_cia_aberta_BPP_ind_2022.csv"
        );
    }

    #[test]
    fn test_read_member_decodes_latin1() {
        // "Patrimônio" in ISO-8859-1
        let archive = archive_with("a.csv", b"Patrim\xf4nio");
        assert_eq!(read_member(&archive, "a.csv").unwrap(), "Patrimônio");
    }

    #[test]
    fn test_read_member_missing_is_retrieval_error() {
        let archive = archive_with("a.csv", b"x");
        let result = read_member(&archive, "b.csv");
        assert!(matches!(result, Err(DataError::Retrieval { .. })));
    }

    #[test]
    fn test_read_member_corrupt_is_skippable() {
        let contents = b"CD_CVM;CD_CONTA;VL_CONTA\n";
        let mut buffer = Cursor::new(Vec::new());
        {
            let mut writer = zip::ZipWriter::new(&mut buffer);
            let options = zip::write::SimpleFileOptions::default()
                .compression_method(zip::CompressionMethod::Stored);
            writer.start_file("a.csv", options).unwrap();
            writer.write_all(contents).unwrap();
            writer.finish().unwrap();
        }
        let mut archive = buffer.into_inner();
        let offset = archive
            .windows(contents.len())
            .position(|window| window == contents)
            .unwrap();
        archive[offset] ^= 0xff;

        let error = read_member(&archive, "a.csv").unwrap_err();
        assert!(matches!(error, DataError::Retrieval { .. }));
        assert!(error.is_skippable());
    }

    #[tokio::test]
    async fn test_rate_limiter_spacing() {
        let mut limiter = RateLimiter::new(Duration::from_millis(50));
        let start = Instant::now();
        limiter.wait().await;
        limiter.wait().await;
        limiter.wait().await;
        assert!(start.elapsed() >= Duration::from_millis(100));
    }
}
