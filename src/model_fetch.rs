//! Fetches the pretrained card detector from shared cloud storage.

use anyhow::{Context, Result, bail};
use std::future::Future;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

/// Drive file id of the trained detector weights
pub const BEST_MODEL_DRIVE_ID: &str = "1py_SFvJWV5BLYJuIa6CYFhxhby12LCly";
pub const MODELS_DIR: &str = "models";
pub const BEST_MODEL_FILE: &str = "best.pt";

const DRIVE_DOWNLOAD_URL: &str = "https://drive.usercontent.google.com/download";

/// `<cwd>/models/best.pt`
pub fn default_model_path() -> Result<PathBuf> {
    let cwd = std::env::current_dir().context("Failed to resolve current directory")?;
    Ok(cwd.join(MODELS_DIR).join(BEST_MODEL_FILE))
}

/// Somewhere an artifact can be downloaded from
pub trait ArtifactSource {
    /// Write the artifact to `dest`, returning the number of bytes written
    fn fetch(&self, dest: &Path) -> impl Future<Output = Result<u64>> + Send;

    /// Human-readable origin, for progress output
    fn describe(&self) -> String;
}

/// A publicly shared Google Drive file
pub struct GoogleDriveSource {
    file_id: String,
    client: reqwest::Client,
}

impl GoogleDriveSource {
    pub fn new(file_id: impl Into<String>) -> Self {
        Self {
            file_id: file_id.into(),
            client: reqwest::Client::new(),
        }
    }

    /// The trained detector weights
    pub fn best_model() -> Self {
        Self::new(BEST_MODEL_DRIVE_ID)
    }

    pub fn file_id(&self) -> &str {
        &self.file_id
    }
}

impl ArtifactSource for GoogleDriveSource {
    async fn fetch(&self, dest: &Path) -> Result<u64> {
        // confirm=t skips the virus-scan interstitial served for large files
        let mut response = self
            .client
            .get(DRIVE_DOWNLOAD_URL)
            .query(&[("id", self.file_id.as_str()), ("export", "download"), ("confirm", "t")])
            .send()
            .await
            .with_context(|| format!("Failed to reach Google Drive for {}", self.file_id))?;

        let status = response.status();
        if !status.is_success() {
            bail!("Google Drive returned {} for file {}", status, self.file_id);
        }

        let is_html = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.starts_with("text/html"));
        if is_html {
            bail!(
                "Google Drive served a web page instead of file {} (is it shared publicly?)",
                self.file_id
            );
        }

        let mut partial = dest.as_os_str().to_owned();
        partial.push(".part");
        let partial = PathBuf::from(partial);

        let mut file = tokio::fs::File::create(&partial)
            .await
            .with_context(|| format!("Failed to create {}", partial.display()))?;

        let mut written = 0u64;
        while let Some(chunk) = response
            .chunk()
            .await
            .with_context(|| format!("Failed to download file {}", self.file_id))?
        {
            file.write_all(&chunk)
                .await
                .with_context(|| format!("Failed to write {}", partial.display()))?;
            written += chunk.len() as u64;
        }
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&partial, dest)
            .await
            .with_context(|| format!("Failed to move download into {}", dest.display()))?;

        Ok(written)
    }

    fn describe(&self) -> String {
        format!("Google Drive file {}", self.file_id)
    }
}

/// Makes sure a model file exists locally, downloading it when missing
pub struct ModelFetcher<S> {
    source: S,
    verbose: bool,
}

impl<S: ArtifactSource> ModelFetcher<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            verbose: false,
        }
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Ensure `target` exists, creating its directory and downloading as needed.
    /// No retry or checksum: a failed download is simply reported.
    pub async fn ensure(&self, target: &Path) -> Result<PathBuf> {
        if let Some(dir) = target.parent().filter(|d| !d.as_os_str().is_empty()) {
            if !tokio::fs::try_exists(dir).await? {
                tokio::fs::create_dir_all(dir)
                    .await
                    .with_context(|| format!("Failed to create {}", dir.display()))?;
            }
        }

        if tokio::fs::try_exists(target).await? {
            if self.verbose {
                println!("Model already present at {}", target.display());
            }
            return Ok(target.to_path_buf());
        }

        if self.verbose {
            println!("Downloading trained model from {}...", self.source.describe());
        }

        let written = self.source.fetch(target).await?;

        if self.verbose {
            println!("Saved {} bytes to {}", written, target.display());
        }

        Ok(target.to_path_buf())
    }
}

impl ModelFetcher<GoogleDriveSource> {
    /// Fetcher for the trained detector weights
    pub fn best_model() -> Self {
        Self::new(GoogleDriveSource::best_model())
    }
}
