use crate::container::{pack, require_password};
use crate::error::{EcpackError, Result};
use crate::files::{collect_regular_files, container_path, display_name};
use crate::header::Operation;
use crate::pipeline::{Lz77, LOOKAHEAD_SIZE, WINDOW_SIZE};
use crate::report::{compression_rate, LogEntry, LogTag, NOT_APPLICABLE};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Options for the process command
#[derive(Debug, Clone)]
pub struct ProcessOptions {
    pub operation: Operation,
    pub password: Option<String>,
    /// LZ77 history window in bytes
    pub window: usize,
    /// LZ77 lookahead in bytes
    pub lookahead: usize,
}

impl Default for ProcessOptions {
    fn default() -> Self {
        Self {
            operation: Operation::default(),
            password: None,
            window: WINDOW_SIZE,
            lookahead: LOOKAHEAD_SIZE,
        }
    }
}

/// Compress and/or encrypt a file, or every regular file under a directory
///
/// Each file is written next to its source with the extension of the
/// operation's container. Per-file failures are reported through `on_log` as
/// `ERROR_PROCESS` and do not stop the batch; only an inaccessible `path` or
/// an invalid matcher configuration fails the whole call.
pub fn process_path(
    path: &Path,
    options: &ProcessOptions,
    on_progress: &mut dyn FnMut(u8, &str),
    on_log: &mut dyn FnMut(LogEntry),
) -> Result<()> {
    let lz77 = Lz77::new(options.window, options.lookahead)?;
    let metadata =
        std::fs::metadata(path).map_err(|_| EcpackError::SourceNotFound(path.to_path_buf()))?;

    if metadata.is_dir() {
        let files = collect_regular_files(path)?;
        let total = files.len();
        log::info!("processing {} files under {}", total, path.display());

        for (count, file) in files.iter().enumerate() {
            let percent = ((count + 1) * 100 / total) as u8;
            on_progress(percent, &format!("Processing {}", display_name(file)));
            process_file(file, options, &lz77, on_progress, on_log);
        }
    } else {
        process_file(path, options, &lz77, on_progress, on_log);
    }

    Ok(())
}

/// Run one file through the pipeline, turning any failure into a log entry
fn process_file(
    file: &Path,
    options: &ProcessOptions,
    lz77: &Lz77,
    on_progress: &mut dyn FnMut(u8, &str),
    on_log: &mut dyn FnMut(LogEntry),
) {
    let name = display_name(file);
    let start = Instant::now();

    match pack_file(file, options, lz77, on_progress) {
        Ok((output, original_len, packed_len)) => {
            let rate = match options.operation {
                Operation::Encrypt => NOT_APPLICABLE.to_string(),
                _ => compression_rate(original_len, packed_len),
            };
            log::info!(
                "{}: {} -> {} ({} -> {} bytes)",
                LogTag::for_operation(options.operation),
                file.display(),
                output.display(),
                original_len,
                packed_len
            );
            on_log(LogEntry::new(
                LogTag::for_operation(options.operation),
                name.as_str(),
                display_name(&output),
                start.elapsed().as_secs_f64(),
                rate,
                true,
            ));
            on_progress(100, &format!("File processed: {}", name));
        }
        Err(e) => {
            log::error!("failed to process {}: {}", file.display(), e);
            on_log(LogEntry::unsuccessful(LogTag::ErrorProcess, name));
        }
    }
}

/// Returns (output path, input size, output size)
fn pack_file(
    file: &Path,
    options: &ProcessOptions,
    lz77: &Lz77,
    on_progress: &mut dyn FnMut(u8, &str),
) -> Result<(PathBuf, u64, u64)> {
    let password = if options.operation.requires_password() {
        Some(require_password(options.password.as_deref())?)
    } else {
        None
    };

    let data = std::fs::read(file)?;
    let packed = pack(&data, options.operation, password, lz77, on_progress)?;

    let output = container_path(file, options.operation.container())?;
    std::fs::write(&output, &packed)?;

    Ok((output, data.len() as u64, packed.len() as u64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn run(path: &Path, options: &ProcessOptions) -> Vec<LogEntry> {
        let mut entries = Vec::new();
        process_path(path, options, &mut |_, _| {}, &mut |e| entries.push(e)).unwrap();
        entries
    }

    #[test]
    fn test_compress_single_file() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("input.txt");
        std::fs::write(&input, b"Hello, World! Hello, World! Hello, World!").unwrap();

        let entries = run(&input, &ProcessOptions::default());

        assert_eq!(entries.len(), 1);
        let entry = &entries[0];
        assert_eq!(entry.operation, LogTag::Compress);
        assert_eq!(entry.source_name, "input.txt");
        assert_eq!(entry.destination_name, "input.cmp");
        assert!(entry.success);
        assert_ne!(entry.compression_rate, "-");
        assert!(dir.path().join("input.cmp").exists());
    }

    #[test]
    fn test_encrypt_has_no_rate() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("data.bin");
        std::fs::write(&input, b"payload").unwrap();

        let options = ProcessOptions {
            operation: Operation::Encrypt,
            password: Some("pw".into()),
            ..Default::default()
        };
        let entries = run(&input, &options);

        assert_eq!(entries[0].operation, LogTag::Encrypt);
        assert_eq!(entries[0].compression_rate, "-");
        assert_eq!(std::fs::read(dir.path().join("data.enc")).unwrap().len(), 7);
    }

    #[test]
    fn test_missing_password_logs_error() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("data.bin");
        std::fs::write(&input, b"payload").unwrap();

        for operation in [Operation::Encrypt, Operation::Both] {
            let options = ProcessOptions {
                operation,
                password: Some(String::new()),
                ..Default::default()
            };
            let entries = run(&input, &options);
            assert_eq!(entries.len(), 1);
            assert_eq!(entries[0].operation, LogTag::ErrorProcess);
            assert!(!entries[0].success);
        }
        assert!(!dir.path().join("data.enc").exists());
        assert!(!dir.path().join("data.ec").exists());
    }

    #[test]
    fn test_directory_progress_per_file() {
        let dir = tempdir().unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        std::fs::write(dir.path().join("one.txt"), b"one one one one").unwrap();
        std::fs::write(dir.path().join("nested/two.txt"), b"two two two two").unwrap();

        let mut messages = Vec::new();
        let mut entries = Vec::new();
        process_path(
            dir.path(),
            &ProcessOptions::default(),
            &mut |pct, msg| {
                if msg.starts_with("Processing") {
                    messages.push((pct, msg.to_string()));
                }
            },
            &mut |e| entries.push(e),
        )
        .unwrap();

        assert_eq!(
            messages,
            vec![
                (50, "Processing two.txt".to_string()),
                (100, "Processing one.txt".to_string()),
            ]
        );
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().all(|e| e.success));
        assert!(dir.path().join("nested/two.cmp").exists());
    }

    #[test]
    fn test_missing_source_fails_call() {
        let dir = tempdir().unwrap();
        let result = process_path(
            &dir.path().join("absent"),
            &ProcessOptions::default(),
            &mut |_, _| {},
            &mut |_| {},
        );
        assert!(matches!(result, Err(EcpackError::SourceNotFound(_))));
    }

    #[test]
    fn test_invalid_window_fails_call() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("x.txt");
        std::fs::write(&input, b"x").unwrap();
        let options = ProcessOptions {
            window: 0,
            ..Default::default()
        };
        let result = process_path(&input, &options, &mut |_, _| {}, &mut |_| {});
        assert!(matches!(result, Err(EcpackError::InvalidWindow(0))));
    }
}
