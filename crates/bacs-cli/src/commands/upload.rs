//! Upload command - submit Standard 18 files to the upload service.

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Args;
use console::style;
use reqwest::multipart::{Form, Part};
use reqwest::{Url, header};
use tokio::net::TcpStream;
use tracing::{debug, info, warn};

use bacs_core::BacsError;

use super::load_config;
use super::parse::read_file;

/// Arguments for the upload command.
#[derive(Args)]
pub struct UploadArgs {
    /// Files to upload
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Upload service base URL (default: from config)
    #[arg(long)]
    host: Option<String>,

    /// Directory relative file names are resolved against
    #[arg(short, long)]
    dir: Option<PathBuf>,

    /// Parse each file first and skip files that fail
    #[arg(long)]
    check: bool,
}

pub async fn run(args: UploadArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?.upload;

    let host = args.host.unwrap_or(config.host);
    let base = Url::parse(&host)?;
    let endpoint = base.join(&config.endpoint)?;
    let dir = args.dir.or(config.directory);

    let mut files = valid_files(&args.files, dir.as_deref());
    if args.check {
        files.retain(|path| match read_file(path) {
            Ok(_) => true,
            Err(e) => {
                warn!("Skipping {}: {:#}", path.display(), e);
                false
            }
        });
    }
    if files.is_empty() {
        anyhow::bail!("No valid files to upload");
    }

    check_connectivity(&base, Duration::from_millis(config.connect_timeout_ms)).await?;

    let client = reqwest::Client::builder()
        .user_agent(concat!("bacs-cli/", env!("CARGO_PKG_VERSION")))
        .build()?;

    println!(
        "{} Uploading {} file(s) to {}",
        style("ℹ").blue(),
        files.len(),
        endpoint
    );

    let mut error_count = 0;
    for path in &files {
        match upload_file(&client, &endpoint, &config.form_field, path).await {
            Ok(location) => {
                println!(
                    "  {} {}{}",
                    style("✓").green(),
                    path.display(),
                    location.map(|l| format!(" -> {l}")).unwrap_or_default()
                );
            }
            Err(e) => {
                error_count += 1;
                println!("  {} {}: {}", style("✗").red(), path.display(), e);
            }
        }
    }

    if error_count > 0 {
        anyhow::bail!("{} of {} upload(s) failed", error_count, files.len());
    }

    Ok(())
}

/// Resolve each path against `dir` and keep existing regular files.
fn valid_files(files: &[PathBuf], dir: Option<&Path>) -> Vec<PathBuf> {
    files
        .iter()
        .map(|file| match dir {
            Some(dir) if file.is_relative() => dir.join(file),
            _ => file.clone(),
        })
        .filter(|path| {
            let valid = path.is_file();
            if !valid {
                warn!("Skipping {}: not a regular file", path.display());
            }
            valid
        })
        .collect()
}

/// Open and drop a TCP connection to the host of `url`.
async fn check_connectivity(url: &Url, timeout: Duration) -> Result<(), BacsError> {
    let host = url
        .host_str()
        .ok_or_else(|| BacsError::Config(format!("upload host {url} has no host name")))?;
    let port = url.port_or_known_default().unwrap_or(80);
    let address = format!("{host}:{port}");
    debug!("Checking connectivity to {}", address);

    let connect = tokio::time::timeout(timeout, TcpStream::connect((host, port)));
    match connect.await {
        Ok(Ok(_)) => Ok(()),
        Ok(Err(source)) => Err(BacsError::Connectivity { host: address, source }),
        Err(_) => Err(BacsError::Connectivity {
            host: address,
            source: std::io::Error::new(
                std::io::ErrorKind::TimedOut,
                format!("no connection within {}ms", timeout.as_millis()),
            ),
        }),
    }
}

/// POST one file as a multipart form. Returns the `Location` header, if any.
async fn upload_file(
    client: &reqwest::Client,
    endpoint: &Url,
    field: &str,
    path: &Path,
) -> anyhow::Result<Option<String>> {
    let data = tokio::fs::read(path).await?;
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("upload")
        .to_string();

    let form = Form::new().part(field.to_string(), Part::bytes(data).file_name(file_name));
    let response = client.post(endpoint.clone()).multipart(form).send().await?;

    let status = response.status();
    let location = response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    info!(
        "Uploaded {}: {} (location: {})",
        path.display(),
        status,
        location.as_deref().unwrap_or("none")
    );

    if !status.is_success() {
        anyhow::bail!("HTTP {}", status);
    }

    Ok(location)
}
