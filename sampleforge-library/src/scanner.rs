//! Directory scanner: fans the resolver out across a fixed worker pool,
//! the way `ole-library::LibraryScanner::analyze_parallel` does
//! (`Arc<Mutex<_>>` work list + `crossbeam_channel` progress reporting).

use crate::wav_source::HoundWavSource;
use crossbeam_channel::Sender;
use sampleforge_collect::{
    resolve_midi_sample, resolve_unknown_sample, resolve_wav_sample, CollectError, LibrarySink,
    ResolverConfig,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::thread;

/// Progress updates emitted during a directory scan.
#[derive(Debug, Clone)]
pub enum ScanProgress {
    Started { total: usize },
    Analyzing { current: usize, total: usize, path: PathBuf },
    Complete { analyzed: usize, failed: usize },
    Error { path: PathBuf, message: String },
}

#[derive(Debug, Clone)]
pub struct ScanConfig {
    pub directory: PathBuf,
    pub max_threads: usize,
    pub recursive: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::new(),
            max_threads: 4,
            recursive: true,
        }
    }
}

#[derive(Debug, Default)]
pub struct ScanSummary {
    pub analyzed: usize,
    pub failed: usize,
}

/// Walk `dir`, collecting every regular file regardless of extension.
/// Filtering by what counts as a "sample" is not this function's job — that
/// decision belongs to `process_one`, which still runs the filename pass
/// and publishes an unrecognized-format file rather than silently skipping
/// it (spec.md §7's `FormatUnrecognized`).
fn collect_files(dir: &Path, recursive: bool) -> Vec<PathBuf> {
    let mut files = Vec::new();
    let entries = match fs::read_dir(dir) {
        Ok(e) => e,
        Err(_) => return files,
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_file() {
            files.push(path);
        } else if path.is_dir() && recursive {
            files.extend(collect_files(&path, recursive));
        }
    }
    files.sort();
    files
}

/// Scan `config.directory`, resolving every file found (WAV, MIDI, or
/// otherwise) and publishing each through `sink`. Blocks until all files
/// are processed.
pub fn scan(
    config: &ScanConfig,
    resolver_config: ResolverConfig,
    sink: Arc<dyn LibrarySink + Send + Sync>,
    progress_tx: Option<Sender<ScanProgress>>,
) -> ScanSummary {
    let files = collect_files(&config.directory, config.recursive);
    let total = files.len();
    if let Some(ref tx) = progress_tx {
        let _ = tx.send(ScanProgress::Started { total });
    }
    if total == 0 {
        if let Some(ref tx) = progress_tx {
            let _ = tx.send(ScanProgress::Complete { analyzed: 0, failed: 0 });
        }
        return ScanSummary::default();
    }

    let thread_count = config.max_threads.min(total).max(1);
    let work = Arc::new(Mutex::new(files.into_iter().enumerate().collect::<Vec<_>>()));
    let analyzed = Arc::new(Mutex::new(0usize));
    let failed = Arc::new(Mutex::new(0usize));

    let mut handles = Vec::new();
    for _ in 0..thread_count {
        let work = Arc::clone(&work);
        let sink = Arc::clone(&sink);
        let analyzed = Arc::clone(&analyzed);
        let failed = Arc::clone(&failed);
        let progress_tx = progress_tx.clone();
        let resolver_config = resolver_config;

        handles.push(thread::spawn(move || loop {
            let item = work.lock().unwrap().pop();
            let (idx, path) = match item {
                Some(item) => item,
                None => break,
            };

            if let Some(ref tx) = progress_tx {
                let _ = tx.send(ScanProgress::Analyzing {
                    current: idx + 1,
                    total,
                    path: path.clone(),
                });
            }

            match process_one(&path, &resolver_config, sink.as_ref()) {
                Ok(()) => *analyzed.lock().unwrap() += 1,
                Err(err) => {
                    *failed.lock().unwrap() += 1;
                    if let Some(ref tx) = progress_tx {
                        let _ = tx.send(ScanProgress::Error {
                            path: path.clone(),
                            message: err.to_string(),
                        });
                    }
                }
            }
        }));
    }

    for handle in handles {
        let _ = handle.join();
    }

    let summary = ScanSummary {
        analyzed: *analyzed.lock().unwrap(),
        failed: *failed.lock().unwrap(),
    };
    if let Some(ref tx) = progress_tx {
        let _ = tx.send(ScanProgress::Complete {
            analyzed: summary.analyzed,
            failed: summary.failed,
        });
    }
    summary
}

/// Opens and resolves a single file. A `FileOpenFailed`-style error (stat or
/// read failure) aborts the sample with no publication. A WAV that opens but
/// fails to decode is `DecodeFailed`-non-fatal (spec.md §7): the resolver
/// still runs with no PCM source, publishing whatever filename evidence was
/// gathered, and the decode failure is only logged, not returned. A file
/// whose extension is neither WAV nor MIDI is `FormatUnrecognized`, also
/// non-fatal: it still gets a filename-only pass and publish.
fn process_one(
    path: &Path,
    config: &ResolverConfig,
    sink: &(dyn LibrarySink + Send + Sync),
) -> Result<(), CollectError> {
    let path_str = path.to_string_lossy().to_string();
    let meta = fs::metadata(path).map_err(|source| CollectError::FileOpenFailed {
        path: path_str.clone(),
        source,
    })?;
    let file_size = meta.len();
    let modified = meta.modified().map_err(|source| CollectError::FileOpenFailed {
        path: path_str.clone(),
        source,
    })?;
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_string();

    match path.extension().and_then(|e| e.to_str()).map(|e| e.to_ascii_lowercase()) {
        Some(ext) if ext == "mid" || ext == "midi" => {
            let bytes = fs::read(path).map_err(|source| CollectError::FileOpenFailed {
                path: path_str.clone(),
                source,
            })?;
            resolve_midi_sample(&path_str, &name, modified, file_size, Some(&bytes), config, sink);
            Ok(())
        }
        Some(ext) if ext == "wav" => {
            if config.skip_wav_decode {
                resolve_wav_sample(&path_str, &name, modified, file_size, None, config, sink);
                return Ok(());
            }
            match HoundWavSource::open(path) {
                Ok(source) => {
                    resolve_wav_sample(&path_str, &name, modified, file_size, Some(&source), config, sink);
                    Ok(())
                }
                Err(e) => {
                    let err = CollectError::DecodeFailed {
                        path: path_str.clone(),
                        reason: e.to_string(),
                    };
                    tracing::warn!(path = %path_str, error = %err, "WAV decode failed, publishing filename-only sample");
                    resolve_wav_sample(&path_str, &name, modified, file_size, None, config, sink);
                    Ok(())
                }
            }
        }
        _ => {
            resolve_unknown_sample(&path_str, &name, modified, file_size, sink);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_directory_yields_empty_summary() {
        let config = ScanConfig {
            directory: PathBuf::from("/nonexistent-sampleforge-dir"),
            ..Default::default()
        };
        let sink: Arc<dyn LibrarySink + Send + Sync> = Arc::new(crate::InMemoryLibrary::new());
        let summary = scan(&config, ResolverConfig::default(), sink, None);
        assert_eq!(summary.analyzed, 0);
        assert_eq!(summary.failed, 0);
    }

    #[test]
    fn malformed_wav_still_publishes_filename_only_sample() {
        let dir = std::env::temp_dir().join("sampleforge-scanner-test-malformed-wav");
        let _ = fs::create_dir_all(&dir);
        let path = dir.join("kick_120_sub.wav");
        fs::write(&path, b"not a real wav file").unwrap();

        let sink = Arc::new(crate::InMemoryLibrary::new());
        let config = ResolverConfig::default();
        let result = process_one(&path, &config, sink.as_ref());
        assert!(result.is_ok(), "decode failure should be non-fatal: {result:?}");

        let samples = sink.samples();
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].tempo, 120);
        assert!(samples[0].duration.is_none());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn unrecognized_extension_still_publishes_filename_only_sample() {
        let dir = std::env::temp_dir().join("sampleforge-scanner-test-unknown-format");
        let _ = fs::create_dir_all(&dir);
        let path = dir.join("hat_120_open.aiff");
        fs::write(&path, b"whatever bytes an unsupported format has").unwrap();

        let sink = Arc::new(crate::InMemoryLibrary::new());
        let config = ResolverConfig::default();
        let result = process_one(&path, &config, sink.as_ref());
        assert!(result.is_ok(), "unrecognized format should be non-fatal: {result:?}");

        let samples = sink.samples();
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].tempo, 120);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn scan_walks_files_regardless_of_extension() {
        let dir = std::env::temp_dir().join("sampleforge-scanner-test-mixed-extensions");
        let _ = fs::create_dir_all(&dir);
        fs::write(dir.join("readme.txt"), b"not a sample").unwrap();
        fs::write(dir.join("loop_140bpm.wav"), b"not real PCM either").unwrap();

        let config = ScanConfig {
            directory: dir.clone(),
            ..Default::default()
        };
        let sink = Arc::new(crate::InMemoryLibrary::new());
        let summary = scan(
            &config,
            ResolverConfig::default(),
            sink.clone() as Arc<dyn LibrarySink + Send + Sync>,
            None,
        );
        assert_eq!(summary.analyzed, 2);
        assert_eq!(summary.failed, 0);
        assert_eq!(sink.samples().len(), 2);

        let _ = fs::remove_dir_all(&dir);
    }
}
