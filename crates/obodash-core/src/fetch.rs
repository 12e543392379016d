use std::fs::{self, File};
use std::io::{self, BufReader, Read, Write};
use std::path::Path;
use std::thread;
use std::time::Duration;

use reqwest::blocking::Client;
use sha2::{Digest, Sha256};

use crate::config::RuntimeConfig;
use crate::error::{DashError, Result};

const HASH_BUFFER_BYTES: usize = 128 * 1024;
const RETRY_BACKOFF: Duration = Duration::from_secs(2);

/// Where ontology artifacts and text resources come from.
pub trait ArtifactSource {
    fn fetch_to(&self, location: &str, dest: &Path) -> Result<()>;

    fn fetch_text(&self, location: &str) -> Result<String>;
}

/// HTTP status probe used for homepage and version IRI resolution.
pub trait UrlProbe {
    /// `None` when the URL could not be reached at all.
    fn status(&self, url: &str) -> Option<u16>;
}

#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    retries: u32,
}

impl HttpFetcher {
    pub fn new(runtime: &RuntimeConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(runtime.http_timeout)
            .user_agent(concat!("obodash/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            retries: runtime.download_retries.max(1),
        })
    }

    fn download_once(&self, url: &str, dest: &Path) -> Result<()> {
        let mut response = self.client.get(url).send()?.error_for_status()?;
        let partial = dest.with_extension("part");
        let mut file = File::create(&partial)?;
        response.copy_to(&mut file)?;
        file.flush()?;
        drop(file);
        fs::rename(&partial, dest)?;
        Ok(())
    }
}

impl ArtifactSource for HttpFetcher {
    fn fetch_to(&self, location: &str, dest: &Path) -> Result<()> {
        if let Some(path) = local_path(location) {
            fs::copy(path, dest).map_err(|err| {
                DashError::Download(format!("cannot copy {location}: {err}"))
            })?;
            return Ok(());
        }

        let mut last_error = None;
        for attempt in 1..=self.retries {
            match self.download_once(location, dest) {
                Ok(()) => return Ok(()),
                Err(err) => {
                    tracing::warn!(url = location, attempt, error = %err, "download attempt failed");
                    last_error = Some(err);
                    if attempt < self.retries {
                        thread::sleep(RETRY_BACKOFF * attempt);
                    }
                }
            }
        }
        Err(DashError::Download(format!(
            "{location}: {}",
            last_error.map_or_else(|| "no attempt made".to_string(), |err| err.to_string())
        )))
    }

    fn fetch_text(&self, location: &str) -> Result<String> {
        if let Some(path) = local_path(location) {
            return Ok(fs::read_to_string(path)?);
        }
        Ok(self.client.get(location).send()?.error_for_status()?.text()?)
    }
}

impl UrlProbe for HttpFetcher {
    fn status(&self, url: &str) -> Option<u16> {
        match self.client.head(url).send() {
            Ok(response) if response.status() != reqwest::StatusCode::METHOD_NOT_ALLOWED => {
                Some(response.status().as_u16())
            }
            Ok(_) => self
                .client
                .get(url)
                .send()
                .ok()
                .map(|response| response.status().as_u16()),
            Err(err) => {
                tracing::debug!(url, error = %err, "url probe failed");
                None
            }
        }
    }
}

/// Treats `file://` URLs and anything without a scheme as a local path.
fn local_path(location: &str) -> Option<&Path> {
    if let Some(path) = location.strip_prefix("file://") {
        return Some(Path::new(path));
    }
    if location.contains("://") {
        return None;
    }
    Some(Path::new(location))
}

pub fn sha256_file(path: &Path) -> Result<String> {
    let mut reader = BufReader::new(File::open(path)?);
    sha256_reader(&mut reader)
}

pub fn sha256_reader(reader: &mut impl Read) -> Result<String> {
    let mut hasher = Sha256::new();
    let mut buf = vec![0_u8; HASH_BUFFER_BYTES];
    loop {
        let read = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(read) => read,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(err.into()),
        };
        hasher.update(&buf[..read]);
    }
    Ok(format!("{:x}", hasher.finalize()))
}
