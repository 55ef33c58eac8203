use crate::container::unpack;
use crate::error::{EcpackError, Result};
use crate::files::{collect_regular_files, display_name, recovered_path};
use crate::header::ContainerKind;
use crate::report::{compression_rate, LogEntry, LogTag, NOT_APPLICABLE};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Options for the recover command
#[derive(Debug, Clone, Default)]
pub struct RecoverOptions {
    pub password: Option<String>,
}

/// Restore a container, or every container under a directory, into `destination`
///
/// The codec chain is chosen from each file's extension (`.cmp`, `.enc`, `.ec`);
/// anything else is logged as `SKIP`. The destination directory is created
/// when absent. Per-file failures are reported as `ERROR_RECOVER`.
pub fn recover_path(
    source: &Path,
    destination: &Path,
    options: &RecoverOptions,
    on_progress: &mut dyn FnMut(u8, &str),
    on_log: &mut dyn FnMut(LogEntry),
) -> Result<()> {
    let metadata = std::fs::metadata(source)
        .map_err(|_| EcpackError::SourceNotFound(source.to_path_buf()))?;
    prepare_destination(destination)?;

    if metadata.is_dir() {
        let files = collect_regular_files(source)?;
        let total = files.len();
        log::info!("recovering {} files under {}", total, source.display());

        for (count, file) in files.iter().enumerate() {
            let percent = ((count + 1) * 100 / total) as u8;
            on_progress(percent, &format!("Recovering {}", display_name(file)));
            recover_file(file, destination, options, on_progress, on_log);
        }
    } else {
        recover_file(source, destination, options, on_progress, on_log);
    }

    Ok(())
}

fn prepare_destination(destination: &Path) -> Result<()> {
    if destination.exists() && !destination.is_dir() {
        return Err(EcpackError::InvalidDestination(destination.to_path_buf()));
    }
    std::fs::create_dir_all(destination).map_err(|e| {
        log::error!("cannot create {}: {}", destination.display(), e);
        EcpackError::InvalidDestination(destination.to_path_buf())
    })
}

fn recover_file(
    file: &Path,
    destination: &Path,
    options: &RecoverOptions,
    on_progress: &mut dyn FnMut(u8, &str),
    on_log: &mut dyn FnMut(LogEntry),
) {
    let name = display_name(file);
    let start = Instant::now();

    let Some(kind) = ContainerKind::from_path(file) else {
        log::warn!("skipping {}: not a .cmp, .enc or .ec container", file.display());
        on_log(LogEntry::unsuccessful(LogTag::Skip, name.as_str()));
        on_progress(100, &format!("File skipped: {}", name));
        return;
    };

    match unpack_file(file, kind, destination, options, on_progress) {
        Ok((output, container_len, recovered_len)) => {
            let rate = match kind {
                ContainerKind::Encrypted => NOT_APPLICABLE.to_string(),
                _ => compression_rate(recovered_len, container_len),
            };
            log::info!(
                "{}: {} -> {} ({} -> {} bytes)",
                LogTag::for_recovery(kind),
                file.display(),
                output.display(),
                container_len,
                recovered_len
            );
            on_log(LogEntry::new(
                LogTag::for_recovery(kind),
                name.as_str(),
                display_name(&output),
                start.elapsed().as_secs_f64(),
                rate,
                true,
            ));
            on_progress(100, &format!("File recovered: {}", name));
        }
        Err(e) => {
            log::error!("failed to recover {}: {}", file.display(), e);
            on_log(LogEntry::unsuccessful(LogTag::ErrorRecover, name));
        }
    }
}

/// Returns (output path, container size, recovered size)
fn unpack_file(
    file: &Path,
    kind: ContainerKind,
    destination: &Path,
    options: &RecoverOptions,
    on_progress: &mut dyn FnMut(u8, &str),
) -> Result<(PathBuf, u64, u64)> {
    let data = std::fs::read(file)?;
    let recovered = unpack(&data, kind, options.password.as_deref(), on_progress)?;

    let output = recovered_path(file, destination)?;
    std::fs::write(&output, &recovered)?;

    Ok((output, data.len() as u64, recovered.len() as u64))
}
