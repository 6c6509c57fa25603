//! Batch processing of a directory of photos into `<dir>_processed`.

use anyhow::{Context, Result};
use image::codecs::jpeg::JpegEncoder;
use image::RgbImage;
use std::ffi::OsString;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use crate::isolation::{CardIsolator, load_photo};

pub const PROCESSED_SUFFIX: &str = "_processed";

/// What to do when one photo cannot be isolated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorPolicy {
    /// Stop the batch at the first failing photo
    #[default]
    Abort,
    /// Record the failure and continue with the next photo
    Skip,
}

/// Progress notifications emitted while a batch runs
#[derive(Debug)]
pub enum BatchEvent<'a> {
    Started {
        total: usize,
        output_dir: &'a Path,
    },
    Processed {
        index: usize,
        total: usize,
        source: &'a Path,
        output: &'a Path,
        clamped: bool,
    },
    Skipped {
        index: usize,
        total: usize,
        source: &'a Path,
        error: &'a str,
    },
    Finished {
        report: &'a BatchReport,
    },
}

/// Receives batch progress; presentation is entirely up to the implementor
pub trait BatchObserver {
    fn notify(&mut self, event: &BatchEvent<'_>);
}

impl<F> BatchObserver for F
where
    F: FnMut(&BatchEvent<'_>),
{
    fn notify(&mut self, event: &BatchEvent<'_>) {
        self(event)
    }
}

#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub output_dir: PathBuf,
    pub written: Vec<PathBuf>,
    /// Photos left out under [`ErrorPolicy::Skip`], with the reason
    pub skipped: Vec<(PathBuf, String)>,
    /// Cards whose crop margin was clamped at the frame edge
    pub clamped: usize,
}

/// `<input_dir>_processed`, ignoring trailing separators on `input_dir`
pub fn processed_dir_for(input_dir: &Path) -> PathBuf {
    let mut name: OsString = input_dir.components().as_path().as_os_str().to_owned();
    name.push(PROCESSED_SUFFIX);
    PathBuf::from(name)
}

/// Create the output directory for `input_dir` if it does not exist yet
pub fn create_processed_dir(input_dir: &Path) -> Result<PathBuf> {
    let dir = processed_dir_for(input_dir);
    if !dir.exists() {
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create output directory {}", dir.display()))?;
    }
    Ok(dir)
}

/// Regular files directly inside `dir`, sorted by path
pub fn collect_photo_paths(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir).with_context(|| format!("Failed to read {}", dir.display()))? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            paths.push(entry.path());
        }
    }
    paths.sort();
    Ok(paths)
}

/// `<out_dir>/<name>.jpg` where `name` is the source file name up to its first '.'
pub fn output_path_for(source: &Path, out_dir: &Path) -> PathBuf {
    let file_name = source
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let base = match file_name.split('.').next() {
        Some(prefix) if !prefix.is_empty() => prefix.to_string(),
        _ => source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or(file_name),
    };

    out_dir.join(format!("{}.jpg", base))
}

/// Encode `card` as JPEG at `quality` (1..=100)
pub fn save_card(card: &RgbImage, path: &Path, quality: u8) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    let mut encoder = JpegEncoder::new_with_quality(BufWriter::new(file), quality);
    encoder
        .encode_image(card)
        .with_context(|| format!("Failed to encode {}", path.display()))?;
    Ok(())
}

/// Runs a [`CardIsolator`] over every photo in a directory
pub struct BatchRunner {
    isolator: CardIsolator,
    policy: ErrorPolicy,
    observer: Option<Box<dyn BatchObserver>>,
    verbose: bool,
}

impl BatchRunner {
    pub fn new(isolator: CardIsolator) -> Self {
        Self {
            isolator,
            policy: ErrorPolicy::default(),
            observer: None,
            verbose: false,
        }
    }

    pub fn with_error_policy(mut self, policy: ErrorPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_observer(mut self, observer: impl BatchObserver + 'static) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    fn emit(&mut self, event: BatchEvent<'_>) {
        if let Some(observer) = self.observer.as_mut() {
            observer.notify(&event);
        }
    }

    /// Process every photo in `input_dir`, writing cards to `<input_dir>_processed`
    pub fn run(&mut self, input_dir: &Path) -> Result<BatchReport> {
        let output_dir = create_processed_dir(input_dir)?;
        let photos = collect_photo_paths(input_dir)?;
        let total = photos.len();

        if self.verbose {
            println!("Processing {} input photos from {}", total, input_dir.display());
        }
        self.emit(BatchEvent::Started {
            total,
            output_dir: &output_dir,
        });

        let mut report = BatchReport {
            output_dir: output_dir.clone(),
            ..Default::default()
        };

        for (index, source) in photos.iter().enumerate() {
            let output = output_path_for(source, &output_dir);

            match self.process_one(source, &output) {
                Ok(clamped) => {
                    if clamped {
                        report.clamped += 1;
                    }
                    self.emit(BatchEvent::Processed {
                        index,
                        total,
                        source,
                        output: &output,
                        clamped,
                    });
                    report.written.push(output);
                }
                Err(e) if self.policy == ErrorPolicy::Skip => {
                    let message = format!("{:#}", e);
                    if self.verbose {
                        println!("  Skipping {}: {}", source.display(), message);
                    }
                    self.emit(BatchEvent::Skipped {
                        index,
                        total,
                        source,
                        error: &message,
                    });
                    report.skipped.push((source.clone(), message));
                }
                Err(e) => return Err(e),
            }
        }

        if self.verbose {
            println!(
                "Finished processing. Playing cards saved at: {}",
                output_dir.display()
            );
        }
        self.emit(BatchEvent::Finished { report: &report });

        Ok(report)
    }

    /// Returns whether the crop was clamped
    fn process_one(&self, source: &Path, output: &Path) -> Result<bool> {
        let label = output
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "photo".to_string());

        let photo = load_photo(source).with_context(|| format!("Failed to load {}", source.display()))?;
        let isolation = self
            .isolator
            .isolate_labeled(&photo, &label)
            .with_context(|| format!("Failed to isolate card in {}", source.display()))?;

        save_card(&isolation.card, output, self.isolator.config().jpeg_quality)?;

        if self.verbose {
            println!(
                "  {} → {} ({}x{})",
                source.display(),
                output.display(),
                isolation.card.width(),
                isolation.card.height()
            );
        }

        Ok(isolation.clamped)
    }
}
