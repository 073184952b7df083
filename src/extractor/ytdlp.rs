//! yt-dlp subprocess implementation of the extraction seam.

use super::AudioExtractor;
use crate::config::{ExtractorConfig, ProxyConfig};
use crate::error::{Error, Result};
use crate::types::MediaInfo;
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::process::Command;

/// Maximum stderr lines folded into an extraction error message.
const STDERR_TAIL_LINES: usize = 5;

/// [`AudioExtractor`] backed by the yt-dlp command-line tool.
///
/// Each call spawns a fresh subprocess; the tool's own socket timeout and
/// retry count (from [`ExtractorConfig`]) are the only failure bounds. The
/// child is deliberately not killed when the calling future is dropped: a
/// disconnected client does not cancel an in-flight extraction.
///
/// # Examples
///
/// ```no_run
/// use audio_dl::config::{ExtractorConfig, ProxyConfig};
/// use audio_dl::extractor::{AudioExtractor, YtDlpExtractor};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let extractor = YtDlpExtractor::new(ExtractorConfig::default(), ProxyConfig::default())?;
/// let info = extractor
///     .probe("https://www.youtube.com/watch?v=dQw4w9WgXcQ")
///     .await?;
/// println!("{}", info.title);
/// # Ok(())
/// # }
/// ```
pub struct YtDlpExtractor {
    binary_path: PathBuf,
    config: ExtractorConfig,
    proxy: Option<String>,
}

impl YtDlpExtractor {
    /// Create an extractor, discovering the yt-dlp binary on PATH when no
    /// explicit path is configured.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ExtractorUnavailable`] when the binary cannot be
    /// located.
    pub fn new(config: ExtractorConfig, proxy: ProxyConfig) -> Result<Self> {
        let binary_path = match &config.binary {
            Some(path) => path.clone(),
            None => which::which("yt-dlp").map_err(|e| {
                Error::ExtractorUnavailable(format!("yt-dlp not found in PATH: {e}"))
            })?,
        };

        Ok(Self {
            binary_path,
            config,
            proxy: proxy.url,
        })
    }

    /// Arguments shared by probe and fetch invocations.
    fn base_args(&self) -> Vec<String> {
        let mut args = vec![
            "--no-warnings".to_string(),
            "--quiet".to_string(),
            "--socket-timeout".to_string(),
            self.config.socket_timeout_secs.to_string(),
            "--retries".to_string(),
            self.config.retries.to_string(),
            "-f".to_string(),
            self.config.format_preference.clone(),
        ];

        if self.config.geo_bypass {
            args.push("--geo-bypass".to_string());
        }
        if !self.config.check_certificates {
            args.push("--no-check-certificates".to_string());
        }
        if let Some(proxy) = &self.proxy {
            args.push("--proxy".to_string());
            args.push(proxy.clone());
        }
        if !self.config.player_clients.is_empty() {
            args.push("--extractor-args".to_string());
            args.push(format!(
                "youtube:player_client={}",
                self.config.player_clients.join(",")
            ));
        }

        args
    }

    /// Run the tool and parse the JSON object it prints to stdout.
    async fn run(&self, args: Vec<String>) -> Result<serde_json::Value> {
        let output = Command::new(&self.binary_path)
            .args(&args)
            .output()
            .await
            .map_err(|e| {
                Error::ExtractorUnavailable(format!(
                    "failed to execute {}: {e}",
                    self.binary_path.display()
                ))
            })?;

        if !output.status.success() {
            return Err(Error::Extraction(stderr_tail(&output.stderr)));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let line = stdout
            .lines()
            .rev()
            .find(|line| line.trim_start().starts_with('{'))
            .ok_or_else(|| Error::Extraction("yt-dlp produced no JSON output".to_string()))?;

        Ok(serde_json::from_str(line.trim())?)
    }
}

#[async_trait]
impl AudioExtractor for YtDlpExtractor {
    async fn probe(&self, url: &str) -> Result<MediaInfo> {
        tracing::debug!(url = %url, "Probing media metadata");

        let mut args = self.base_args();
        args.push("--skip-download".to_string());
        args.push("--dump-single-json".to_string());
        args.push(url.to_string());

        Ok(parse_info(&self.run(args).await?))
    }

    async fn fetch(&self, url: &str, output_template: &str) -> Result<MediaInfo> {
        tracing::info!(url = %url, template = %output_template, "Downloading audio stream");

        let mut args = self.base_args();
        args.push("--print-json".to_string());
        args.push("-o".to_string());
        args.push(output_template.to_string());
        args.push(url.to_string());

        Ok(parse_info(&self.run(args).await?))
    }
}

/// Map the tool's info JSON onto [`MediaInfo`], applying the documented
/// fallbacks for absent fields.
fn parse_info(value: &serde_json::Value) -> MediaInfo {
    let title = value["title"]
        .as_str()
        .filter(|title| !title.is_empty())
        .unwrap_or("Unknown")
        .to_string();

    // yt-dlp reports fractional durations for some extractors
    let duration_seconds = value["duration"].as_f64().unwrap_or(0.0).max(0.0) as u64;

    let thumbnail = value["thumbnail"].as_str().unwrap_or("").to_string();

    let channel = value["channel"]
        .as_str()
        .or_else(|| value["uploader"].as_str())
        .filter(|channel| !channel.is_empty())
        .unwrap_or("Unknown")
        .to_string();

    let ext = value["ext"].as_str().map(String::from);

    MediaInfo {
        title,
        duration_seconds,
        thumbnail,
        channel,
        ext,
    }
}

/// Fold the last few stderr lines into a single diagnostic string.
fn stderr_tail(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let mut lines: Vec<&str> = text
        .lines()
        .filter(|line| !line.trim().is_empty())
        .collect();
    if lines.is_empty() {
        return "yt-dlp exited with a failure status".to_string();
    }
    if lines.len() > STDERR_TAIL_LINES {
        lines = lines.split_off(lines.len() - STDERR_TAIL_LINES);
    }
    lines.join("; ")
}
