use std::path::{Path, PathBuf};
use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

use pdf_sanitize::color::Rgb;
use pdf_sanitize::config::job::JobFile;
use pdf_sanitize::config::merged::MergedConfig;
use pdf_sanitize::config::{self};
use pdf_sanitize::matcher::FuzzyOptions;
use pdf_sanitize::pipeline::job_runner::JobConfig;
use pdf_sanitize::pipeline::orchestrator::run_all_jobs;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();

    if args.is_empty() || args.iter().any(|a| a == "--help" || a == "-h") {
        eprintln!("Usage: pdf_sanitize <jobs.yaml>...");
        eprintln!("  Sanitize PDF files according to job specifications.");
        return if args.is_empty() {
            ExitCode::FAILURE
        } else {
            ExitCode::SUCCESS
        };
    }

    if args.iter().any(|a| a == "--version" || a == "-V") {
        eprintln!("pdf_sanitize {}", env!("CARGO_PKG_VERSION"));
        return ExitCode::SUCCESS;
    }

    // Collect job configs from all job files.
    let mut job_configs: Vec<JobConfig> = Vec::new();

    for job_file_arg in &args {
        let job_file_path = Path::new(job_file_arg);

        // Load settings from the same directory as the job file.
        let settings = match config::load_settings_for_job(job_file_path) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("ERROR: Failed to load settings for {job_file_arg}: {e}");
                return ExitCode::FAILURE;
            }
        };

        // Read and parse the job YAML file.
        let yaml_content = match std::fs::read_to_string(job_file_path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("ERROR: Failed to read job file {job_file_arg}: {e}");
                return ExitCode::FAILURE;
            }
        };

        let job_file: JobFile = match serde_yml::from_str(&yaml_content) {
            Ok(jf) => jf,
            Err(e) => {
                eprintln!("ERROR: Failed to parse job file {job_file_arg}: {e}");
                return ExitCode::FAILURE;
            }
        };

        // Resolve job file directory for relative paths.
        let job_dir = job_file_path
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .to_path_buf();

        // Merge settings with each job and construct JobConfig.
        for job in &job_file.jobs {
            let merged = MergedConfig::new(&settings, job);

            if merged.phrases.is_empty() {
                eprintln!(
                    "WARNING: {}: no phrases configured, only QR codes will be redacted",
                    job.input
                );
            }

            job_configs.push(JobConfig {
                input_path: resolve_path(&job_dir, &job.input),
                output_path: resolve_path(&job_dir, &job.output),
                cover_image_path: resolve_path(&job_dir, &job.cover_image),
                phrases: merged.phrases,
                divide: merged.divide,
                padding: merged.padding,
                match_mode: merged.match_mode,
                fuzzy_options: FuzzyOptions {
                    similarity_threshold: merged.similarity_threshold,
                    allow_skipped_words: merged.max_skips > 0,
                    max_skips: merged.max_skips,
                    allow_partial_words: true,
                    partial_match_threshold: merged.partial_match_threshold,
                },
                fill: merged.fill,
                fixed_fill: Rgb::new(
                    merged.fixed_fill[0],
                    merged.fixed_fill[1],
                    merged.fixed_fill[2],
                ),
                ocr_endpoint: merged.ocr_endpoint,
                ocr_timeout_secs: merged.ocr_timeout_secs,
                ocr_max_retries: merged.ocr_max_retries,
            });
        }
    }

    // Run all jobs through the pipeline.
    let results = run_all_jobs(&job_configs);

    // Report results.
    let mut failure_count = 0;
    for result in &results {
        match result {
            Ok(job_result) => {
                eprintln!(
                    "OK: {} -> {} ({} pages, {} redactions)",
                    job_result.input_path.display(),
                    job_result.output_path.display(),
                    job_result.pages_processed,
                    job_result.boxes_painted
                );
                if job_result.boxes_failed > 0 {
                    eprintln!(
                        "WARNING: {}: {} redaction(s) could not be painted",
                        job_result.input_path.display(),
                        job_result.boxes_failed
                    );
                }
            }
            Err(e) => {
                eprintln!("ERROR: {e}");
                failure_count += 1;
            }
        }
    }

    if failure_count > 0 {
        eprintln!(
            "{} of {} job(s) failed",
            failure_count,
            results.len()
        );
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

/// Resolve a potentially relative path against a base directory.
/// If the path is already absolute, return it as-is.
fn resolve_path(base_dir: &Path, path: &str) -> PathBuf {
    let p = Path::new(path);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        base_dir.join(p)
    }
}
