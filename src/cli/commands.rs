//! CLI command implementations
//!
//! All command functions return `CliResult<ExitCode>` instead of calling
//! `process::exit`. Error handling and exits happen in the top-level `run()`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tokio::task::JoinSet;

use crate::backend::synthesize;
use crate::config::RunnerConfig;
use crate::frontend::extract;
use crate::pipeline::Pipeline;
use crate::report::Status;
use crate::runner::ConsoleReporter;
use crate::submission::{self, MAX_SOURCE_SIZE, Rejection, Reply, Upload};

use super::{CliError, CliResult, ExitCode};

// ============================================================================
// check
// ============================================================================

/// Run every file through the pipeline concurrently and print replies in
/// argument order.
///
/// Exit code is the worst over all files: 0 when every reply passes, 1 when a
/// reply fails or an upload is rejected, 2 when a run's environment broke.
pub fn check_files(files: &[PathBuf], config: RunnerConfig, verbose: bool) -> CliResult<ExitCode> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| CliError::environment(format!("Error starting async runtime: {}", e)))?;

    runtime.block_on(check_files_async(files, config, verbose))
}

async fn check_files_async(files: &[PathBuf], config: RunnerConfig, verbose: bool) -> CliResult<ExitCode> {
    let pipeline = Pipeline::new(config);
    tracing::debug!(
        files = files.len(),
        interpreter = %pipeline.evaluator().interpreter().display(),
        "checking submissions"
    );

    let mut tasks = JoinSet::new();
    for (index, path) in files.iter().enumerate() {
        let pipeline = pipeline.clone();
        let path = path.clone();
        tasks.spawn(async move { (index, submit_file(&pipeline, &path, verbose).await) });
    }

    let mut results: Vec<Option<CliResult<Reply>>> = files.iter().map(|_| None).collect();
    while let Some(joined) = tasks.join_next().await {
        let (index, result) = joined.map_err(|e| CliError::failure(format!("Submission task failed: {}", e)))?;
        results[index] = Some(result);
    }

    let mut exit_code = ExitCode::SUCCESS;
    for result in results.into_iter().flatten() {
        match result {
            Ok(reply) => {
                println!("{}", reply.to_json());
                if reply.status() == Status::Fail {
                    exit_code = exit_code.max(ExitCode::FAILURE);
                }
            }
            Err(e) => {
                eprintln!("{}", e.message);
                exit_code = exit_code.max(e.exit_code);
            }
        }
    }
    Ok(exit_code)
}

/// Validate one file as an upload and run it through the pipeline.
async fn submit_file(pipeline: &Pipeline, path: &Path, verbose: bool) -> CliResult<Reply> {
    let source = match load_submission(path)? {
        Ok(source) => source,
        Err(rejection) => {
            tracing::info!(file = %path.display(), reason = %rejection, "upload rejected");
            return Ok(Reply::Rejected(rejection));
        }
    };

    let label = path.display().to_string();
    let report = if verbose {
        let mut reporter = ConsoleReporter::new(label.as_str());
        pipeline.run_with_reporter(&source, &mut reporter).await
    } else {
        pipeline.run(&source).await
    }
    .map_err(|e| CliError::environment(format!("{}: {}", label, e)))?;

    Ok(Reply::Report(report))
}

/// Read a file the way an upload would arrive and validate it.
///
/// A missing path counts as "no file provided"; other I/O errors are CLI errors.
pub fn load_submission(path: &Path) -> CliResult<Result<String, Rejection>> {
    if !path.exists() {
        return Ok(submission::accept(None));
    }

    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    if filename.is_empty() || !submission::allowed_file(&filename) {
        return Ok(submission::accept(Some(&Upload::new(filename, Vec::new()))));
    }

    // Check size before reading
    let metadata = fs::metadata(path).map_err(|e| read_error(path, e))?;
    if metadata.len() > MAX_SOURCE_SIZE as u64 {
        return Ok(Err(Rejection::TooLarge));
    }

    let contents = fs::read(path).map_err(|e| read_error(path, e))?;
    Ok(submission::accept(Some(&Upload::new(filename, contents))))
}

fn read_error(path: &Path, e: io::Error) -> CliError {
    CliError::failure(format!("Error reading file '{}': {}", path.display(), e))
}

// ============================================================================
// Debug commands
// ============================================================================

/// Read and validate a file for the debug commands, failing on rejection.
fn read_source(path: &Path) -> CliResult<String> {
    load_submission(path)?.map_err(|r| CliError::failure(format!("{}: {}", path.display(), r)))
}

/// Print the code blocks extracted from a file.
pub fn extract_file(path: &Path) -> CliResult<ExitCode> {
    let source = read_source(path)?;
    let blocks = extract(&source);

    if blocks.is_empty() {
        println!("No function definitions found");
        return Ok(ExitCode::SUCCESS);
    }

    for block in &blocks {
        println!(
            "--- block {} (line {}, {} line(s)): {}",
            block.index,
            block.start_line,
            block.line_count(),
            block.function_name().unwrap_or("<unnamed>")
        );
        println!("{}", block.text);
    }
    Ok(ExitCode::SUCCESS)
}

/// Print the test modules synthesized for a file.
pub fn emit_tests(path: &Path) -> CliResult<ExitCode> {
    let source = read_source(path)?;
    let artifacts = synthesize(&extract(&source));

    if artifacts.is_empty() {
        println!("No function definitions found");
        return Ok(ExitCode::SUCCESS);
    }

    for artifact in &artifacts {
        match &artifact.body {
            Ok(body) => {
                println!("# ===== {} ({}) =====", artifact.name, artifact.module_file_name());
                print!("{}", body);
            }
            Err(e) => println!("# ===== {}: synthesis error: {} =====", artifact.name, e),
        }
    }
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_no_file_provided() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_submission(&dir.path().join("missing.py")).unwrap();
        assert_eq!(result, Err(Rejection::NoFile));
    }

    #[test]
    fn test_disallowed_extension_is_rejected_without_reading() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("script.sh");
        fs::write(&path, "def f():\n    pass\n").unwrap();
        assert_eq!(load_submission(&path).unwrap(), Err(Rejection::DisallowedExtension));
    }

    #[test]
    fn test_valid_file_is_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("solution.py");
        fs::write(&path, "def f():\n    pass\n").unwrap();
        assert_eq!(load_submission(&path).unwrap(), Ok("def f():\n    pass\n".to_string()));
    }

    #[test]
    fn test_oversized_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.txt");
        fs::write(&path, vec![b'#'; MAX_SOURCE_SIZE + 1]).unwrap();
        assert_eq!(load_submission(&path).unwrap(), Err(Rejection::TooLarge));
    }

    #[test]
    fn test_read_source_fails_on_rejection() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_source(&dir.path().join("nope.py")).unwrap_err();
        assert!(err.message.contains("No file provided"));
        assert_eq!(err.exit_code, ExitCode::FAILURE);
    }
}
