//! `check`: the convention enforcement check over a directory tree.

use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use ignore::WalkBuilder;
use regex::Regex;
use serde::Serialize;
use tracing::{debug, warn};

use mockchain::convention::{self, Violation};
use mockchain::java::JavaFile;
use mockchain::{ChainError, clean_path, read_file_lossy};

use super::{CheckArgs, print_json, resolve_config};

#[derive(Debug, Serialize)]
pub(crate) struct FileViolations {
    pub path: String,
    pub violations: Vec<Violation>,
}

pub(crate) fn cmd_check(args: CheckArgs) -> Result<(), ChainError> {
    let start = Instant::now();
    let root = Path::new(&args.dir);
    if !root.is_dir() {
        return Err(ChainError::InvalidArgs(format!("Directory not found: {}", args.dir)));
    }
    let config = resolve_config(root, args.config.as_deref(), args.convention)?;
    let Some(convention) = config.convention else {
        return Err(ChainError::InvalidArgs(
            "No convention to check: pass --convention or set \"convention\" in .mockchain.json".to_string(),
        ));
    };
    let filter = args
        .filter
        .as_deref()
        .map(|pattern| {
            Regex::new(pattern).map_err(|source| ChainError::InvalidRegex { pattern: pattern.to_string(), source })
        })
        .transpose()?;

    let thread_count = if args.threads == 0 {
        std::thread::available_parallelism().map(|n| n.get()).unwrap_or(4)
    } else {
        args.threads
    };
    let mut builder = WalkBuilder::new(root);
    builder.git_ignore(!args.no_ignore);
    builder.git_global(!args.no_ignore);
    builder.git_exclude(!args.no_ignore);
    builder.threads(thread_count);

    let found: Mutex<Vec<FileViolations>> = Mutex::new(Vec::new());
    let file_count = AtomicUsize::new(0);

    builder.build_parallel().run(|| {
        let filter = filter.clone();
        let ext = args.ext.clone();
        let found = &found;
        let file_count = &file_count;

        Box::new(move |entry| {
            let entry = match entry {
                Ok(e) => e,
                Err(_) => return ignore::WalkState::Continue,
            };
            if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                return ignore::WalkState::Continue;
            }
            let matches_ext = entry
                .path()
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case(&ext));
            if !matches_ext {
                return ignore::WalkState::Continue;
            }
            let path = clean_path(&entry.path().to_string_lossy());
            if filter.as_ref().is_some_and(|re| !re.is_match(&path)) {
                return ignore::WalkState::Continue;
            }
            file_count.fetch_add(1, Ordering::Relaxed);

            let file = match read_file_lossy(entry.path()).map_err(ChainError::from).and_then(|(text, _)| JavaFile::parse(text)) {
                Ok(file) => file,
                Err(e) => {
                    warn!(file = %path, error = %e, "Skipping unreadable source");
                    return ignore::WalkState::Continue;
                }
            };
            let violations = convention::check(&file, convention);
            debug!(file = %path, violations = violations.len(), "Checked");
            if !violations.is_empty() {
                let mut guard = found.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
                guard.push(FileViolations { path, violations });
            }
            ignore::WalkState::Continue
        })
    });

    let mut found = found.into_inner().unwrap_or_else(|poisoned| poisoned.into_inner());
    found.sort_by(|a, b| a.path.cmp(&b.path));
    let total: usize = found.iter().map(|f| f.violations.len()).sum();

    if args.json {
        print_json(&found)?;
    } else {
        for file in &found {
            for v in &file.violations {
                println!("{}:{}:{}: {}: {}", file.path, v.line, v.column, v.method, v.message);
            }
        }
    }
    eprintln!(
        "\n{} violations in {} of {} files ({} convention) in {:.3}s ({} threads)",
        total,
        found.len(),
        file_count.load(Ordering::Relaxed),
        convention,
        start.elapsed().as_secs_f64(),
        thread_count
    );
    if total > 0 {
        return Err(ChainError::ConventionViolations(total));
    }
    Ok(())
}
