//! Downloader for the asteroid and comet element sources
//!
//! Files land in the engine's data directory. Nothing here runs unless a
//! caller asks for it.

use log::info;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::EngineConfig;
use crate::elements::ObjectClass;
use crate::{Result, SkychartError};

/// Lowell Observatory asteroid orbit database
pub const ASTORB_URL: &str = "https://ftp.lowell.edu/pub/elgb/astorb.dat.gz";
/// Minor Planet Center comet elements in the one-line Soft00Cmt format
pub const COMET_ELEMENTS_URL: &str = "https://www.minorplanetcenter.net/iau/Ephemerides/Comets/Soft00Cmt.txt";

const ASTORB_FILE: &str = "astorb.dat";
const COMET_FILE: &str = "Soft00Cmt.txt";

/// Check if a file exists and is not empty
fn file_exists_and_not_empty<P: AsRef<Path>>(path: P) -> bool {
    match fs::metadata(path) {
        Ok(metadata) => metadata.is_file() && metadata.len() > 0,
        Err(_) => false,
    }
}

/// Download `url` to `path` via a temporary file
fn download_file<P: AsRef<Path>>(url: &str, path: P) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let client = reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(300))
        .build()
        .map_err(|e| SkychartError::DataError(format!("Failed to create HTTP client: {}", e)))?;
    let mut response = client
        .get(url)
        .send()
        .map_err(|e| SkychartError::DataError(format!("Failed to download {}: {}", url, e)))?;
    if !response.status().is_success() {
        return Err(SkychartError::DataError(format!(
            "Failed to download {}, status: {}",
            url,
            response.status()
        )));
    }

    let temp_path = path.with_extension("tmp");
    let mut file = BufWriter::new(File::create(&temp_path)?);
    let mut buffer = [0; 8192];
    loop {
        let bytes_read = response
            .read(&mut buffer)
            .map_err(|e| SkychartError::DataError(format!("Failed to read response: {}", e)))?;
        if bytes_read == 0 {
            break;
        }
        file.write_all(&buffer[..bytes_read])?;
    }
    file.flush()?;
    drop(file);

    fs::rename(temp_path, path)?;
    Ok(())
}

/// Decompress a gzipped file, removing partial output on failure
fn decompress_gzip<P: AsRef<Path>, Q: AsRef<Path>>(gz_path: P, output_path: Q) -> Result<()> {
    let mut file = File::open(&gz_path)?;
    let mut header = [0u8; 2];
    if file.read_exact(&mut header).is_err() || header != [0x1F, 0x8B] {
        return Err(SkychartError::DataError(format!(
            "{} is not a gzip file",
            gz_path.as_ref().display()
        )));
    }
    drop(file);

    let mut decoder = flate2::read::GzDecoder::new(BufReader::new(File::open(&gz_path)?));
    let temp_path = output_path.as_ref().with_extension("tmp");
    let mut writer = BufWriter::new(File::create(&temp_path)?);
    let copied = io::copy(&mut decoder, &mut writer).and_then(|_| writer.flush());
    drop(writer);
    if let Err(e) = copied {
        let _ = fs::remove_file(&temp_path);
        return Err(SkychartError::DataError(format!("Failed to decompress file: {}", e)));
    }
    fs::rename(temp_path, output_path)?;
    Ok(())
}

/// Download and unpack `astorb.dat` into the data directory
///
/// An existing non-empty copy is kept unless `force` is set.
pub fn download_astorb(config: &EngineConfig, force: bool) -> Result<PathBuf> {
    let dat_path = config.data_dir.join(ASTORB_FILE);
    if !force && file_exists_and_not_empty(&dat_path) {
        info!("Using existing asteroid elements at {}", dat_path.display());
        return Ok(dat_path);
    }

    let gz_path = config.data_dir.join(format!("{}.gz", ASTORB_FILE));
    info!("Downloading asteroid elements from {}", ASTORB_URL);
    download_file(ASTORB_URL, &gz_path)?;
    decompress_gzip(&gz_path, &dat_path)?;
    fs::remove_file(&gz_path)?;
    info!("Asteroid elements written to {}", dat_path.display());
    Ok(dat_path)
}

/// Download `Soft00Cmt.txt` into the data directory
///
/// An existing non-empty copy is kept unless `force` is set.
pub fn download_comet_elements(config: &EngineConfig, force: bool) -> Result<PathBuf> {
    let path = config.data_dir.join(COMET_FILE);
    if !force && file_exists_and_not_empty(&path) {
        info!("Using existing comet elements at {}", path.display());
        return Ok(path);
    }
    info!("Downloading comet elements from {}", COMET_ELEMENTS_URL);
    download_file(COMET_ELEMENTS_URL, &path)?;
    Ok(path)
}

/// Write a one-line source list for `class` naming `source`, unless one already exists
pub fn ensure_source_list(config: &EngineConfig, class: ObjectClass, source: &Path) -> Result<PathBuf> {
    let list_path = config.source_list_path(class);
    if file_exists_and_not_empty(&list_path) {
        return Ok(list_path);
    }
    let name = source
        .strip_prefix(&config.data_dir)
        .unwrap_or(source)
        .to_string_lossy()
        .into_owned();
    fs::create_dir_all(&config.data_dir)?;
    fs::write(&list_path, format!("{}\n", name))?;
    Ok(list_path)
}

/// Fetch both minor-body sources and register them in their source lists
pub fn download_element_sources(config: &EngineConfig, force: bool) -> Result<()> {
    let astorb = download_astorb(config, force)?;
    ensure_source_list(config, ObjectClass::Asteroid, &astorb)?;
    let comets = download_comet_elements(config, force)?;
    ensure_source_list(config, ObjectClass::Comet, &comets)?;
    Ok(())
}
