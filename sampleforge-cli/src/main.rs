//! Scans a directory of samples, classifying tempo, key, and
//! instrument/playback role, and prints a summary grouped by tempo.

use sampleforge_library::{scan, Config, InMemoryLibrary, ScanConfig, ScanProgress};
use std::env;
use std::sync::Arc;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let directory = env::args()
        .nth(1)
        .ok_or_else(|| anyhow::anyhow!("usage: sampleforge <directory>"))?;

    let config = Config::load();
    let library = Arc::new(InMemoryLibrary::new());
    let (tx, rx) = crossbeam_channel::unbounded();

    let scan_config = ScanConfig {
        directory: directory.into(),
        ..Default::default()
    };

    let scan_thread = {
        let config = config;
        let sink: Arc<dyn sampleforge_collect::LibrarySink + Send + Sync> = Arc::clone(&library);
        std::thread::spawn(move || scan(&scan_config, config.resolver, sink, Some(tx)))
    };

    for progress in rx {
        match progress {
            ScanProgress::Started { total } => println!("scanning {total} files"),
            ScanProgress::Analyzing { current, total, path } => {
                println!("[{current}/{total}] {}", path.display())
            }
            ScanProgress::Error { path, message } => {
                eprintln!("failed {}: {message}", path.display())
            }
            ScanProgress::Complete { analyzed, failed } => {
                println!("done: {analyzed} analyzed, {failed} failed")
            }
        }
    }

    let summary = scan_thread.join().map_err(|_| anyhow::anyhow!("scan thread panicked"))?;
    println!("analyzed {} samples ({} failed)", summary.analyzed, summary.failed);

    let mut tempos: Vec<_> = library.tempos().into_iter().collect();
    tempos.sort_by_key(|(bpm, _)| *bpm);
    for (bpm, paths) in tempos {
        println!("{bpm} BPM: {} sample(s)", paths.len());
    }

    Ok(())
}
