use anyhow::{Context, Result, anyhow};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use log::{error, info, warn};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::app_config::Config;
use crate::bilingual::{HtmlProcessor, ProcessingReport, ProcessorOptions};
use crate::document::{parse_html_bytes, to_html};
use crate::errors::AppError;
use crate::file_utils::FileManager;
use crate::translation::TranslationService;

// @module: Application controller for HTML document translation

/// Outcome counts of a folder run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FolderSummary {
    pub translated: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Main application controller for document translation
pub struct Controller {
    // @field: App configuration
    config: Config,
}

impl Controller {
    /// Create a new controller for test purposes with default configuration
    pub fn new_for_test() -> Result<Self> {
        Self::with_config(Config::default())
    }

    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        config
            .validate()
            .map_err(|e| AppError::Config(format!("{:#}", e)))
            .context("Configuration validation failed")?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Check if the controller is properly initialized with configuration
    pub fn is_initialized(&self) -> bool {
        !self.config.source_language.is_empty() && !self.config.target_language.is_empty()
    }

    fn build_processor(&self) -> Result<HtmlProcessor<TranslationService>> {
        let service = TranslationService::new(
            self.config.translation.clone(),
            self.config.source_language.clone(),
            self.config.target_language.clone(),
        )
        .context("Failed to create translation service")?;
        Ok(HtmlProcessor::new(ProcessorOptions::from_config(&self.config), service))
    }

    fn spinner(multi_progress: &MultiProgress, message: String) -> ProgressBar {
        let spinner = multi_progress.add(ProgressBar::new_spinner());
        let style = ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        spinner.set_style(style);
        spinner.set_message(message);
        spinner.enable_steady_tick(Duration::from_millis(120));
        spinner
    }

    /// Translate one document. `output_file` defaults to `<stem>_translated.<ext>`
    /// beside the input. Returns `None` when an existing output was kept.
    pub async fn run(
        &self,
        input_file: PathBuf,
        output_file: Option<PathBuf>,
        force_overwrite: bool,
    ) -> Result<Option<ProcessingReport>> {
        if !FileManager::file_exists(&input_file) {
            return Err(anyhow!("Input file does not exist: {:?}", input_file));
        }
        let output_file = output_file.unwrap_or_else(|| FileManager::generate_output_path(&input_file, None));

        let processor = self.build_processor()?;
        let multi_progress = MultiProgress::new();
        let report = self
            .translate_file(&processor, &input_file, &output_file, force_overwrite, &multi_progress)
            .await
            .with_context(|| format!("Failed to translate {:?}", input_file))?;
        Ok(report)
    }

    async fn translate_file(
        &self,
        processor: &HtmlProcessor<TranslationService>,
        input_file: &Path,
        output_file: &Path,
        force_overwrite: bool,
        multi_progress: &MultiProgress,
    ) -> Result<Option<ProcessingReport>, AppError> {
        if output_file.exists() && !force_overwrite {
            warn!("Skipping {:?}, output already exists (use -f to force overwrite)", output_file);
            return Ok(None);
        }

        let start_time = Instant::now();
        let bytes = FileManager::read_bytes(input_file).map_err(|e| AppError::File(format!("{:#}", e)))?;
        let mut document = parse_html_bytes(&bytes)?;

        let file_name = input_file
            .file_name()
            .map(|f| f.to_string_lossy().to_string())
            .unwrap_or_else(|| "document".to_string());
        let spinner = Self::spinner(
            multi_progress,
            format!(
                "Translating {} with {}",
                file_name,
                self.config.translation.provider.display_name()
            ),
        );

        let result = processor.translate_document(&mut document).await;
        spinner.finish_and_clear();
        let report = result?;

        FileManager::write_to_file(output_file, &to_html(&document)).map_err(|e| AppError::File(format!("{:#}", e)))?;
        info!(
            "{}: {} paragraphs, {} blocks, {} texts translated in {} -> {:?}",
            file_name,
            report.paragraphs,
            report.blocks,
            report.units,
            Self::format_duration(start_time.elapsed()),
            output_file
        );
        Ok(Some(report))
    }

    /// Translate every HTML document under `input_dir`. Outputs go beside
    /// their inputs, or mirror the folder layout under `output_dir`.
    pub async fn run_folder(
        &self,
        input_dir: PathBuf,
        output_dir: Option<PathBuf>,
        force_overwrite: bool,
    ) -> Result<FolderSummary> {
        let start_time = Instant::now();

        if !FileManager::dir_exists(&input_dir) {
            return Err(anyhow!("Input directory does not exist: {:?}", input_dir));
        }

        let html_files = FileManager::find_html_files(&input_dir)?;
        if html_files.is_empty() {
            return Err(anyhow!("No HTML files found in directory: {:?}", input_dir));
        }

        let processor = self.build_processor()?;
        let multi_progress = MultiProgress::new();
        let folder_pb = multi_progress.add(ProgressBar::new(html_files.len() as u64));
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files ({percent}%) {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        folder_pb.set_style(style);

        let mut summary = FolderSummary::default();
        for html_file in &html_files {
            let output_file = match &output_dir {
                Some(dir) => {
                    let relative_parent = html_file
                        .parent()
                        .and_then(|parent| parent.strip_prefix(&input_dir).ok())
                        .unwrap_or_else(|| Path::new(""));
                    FileManager::generate_output_path(html_file, Some(&dir.join(relative_parent)))
                }
                None => FileManager::generate_output_path(html_file, None),
            };

            folder_pb.set_message(format!("{:?}", html_file.file_name().unwrap_or_default()));
            match self
                .translate_file(&processor, html_file, &output_file, force_overwrite, &multi_progress)
                .await
            {
                Ok(Some(_)) => summary.translated += 1,
                Ok(None) => summary.skipped += 1,
                Err(e) => {
                    if e.is_service_failure() {
                        error!("{:?}: translation backend failed: {}", html_file, e);
                    } else {
                        error!("{:?}: {}", html_file, e);
                    }
                    summary.failed += 1;
                }
            }
            folder_pb.inc(1);
        }
        folder_pb.finish_and_clear();

        info!(
            "Folder done in {}: {} translated, {} skipped, {} failed",
            Self::format_duration(start_time.elapsed()),
            summary.translated,
            summary.skipped,
            summary.failed
        );
        Ok(summary)
    }

    fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}
