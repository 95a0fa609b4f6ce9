//! Generate one PNG per input line.

use std::io::BufRead;
use std::path::{Path, PathBuf};

use crate::content::{self, ContentKind};
use crate::error::{Error, Result};
use crate::qr::{EcLevel, Generator, Options, DEFAULT_SIZE};

pub const DEFAULT_PREFIX: &str = "qr_";

#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub output_dir: PathBuf,
    pub prefix: String,
    pub size: u32,
    pub level: EcLevel,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            prefix: DEFAULT_PREFIX.to_string(),
            size: DEFAULT_SIZE,
            level: EcLevel::M,
        }
    }
}

impl BatchOptions {
    fn file_for(&self, index: usize) -> PathBuf {
        self.output_dir.join(format!("{}{index:04}.png", self.prefix))
    }
}

#[derive(Debug, Clone)]
pub struct BatchItem {
    /// 1-based input line number.
    pub line: usize,
    pub kind: ContentKind,
    pub path: PathBuf,
}

#[derive(Debug)]
pub struct BatchFailure {
    pub line: usize,
    pub error: Error,
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub generated: Vec<BatchItem>,
    pub failures: Vec<BatchFailure>,
}

/// Process `reader` line by line. Blank lines and `#` comments are skipped; a
/// line that fails, including one that is not UTF-8, is recorded and the rest
/// still run. Only read errors abort.
pub fn run<R: BufRead>(mut reader: R, opts: &BatchOptions) -> Result<BatchReport> {
    std::fs::create_dir_all(&opts.output_dir)?;

    let generator = Generator::new(Options {
        level: opts.level,
        size: opts.size,
    });
    let mut report = BatchReport::default();
    let mut buf = Vec::new();
    let mut line_no = 0;

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        line_no += 1;

        let Ok(line) = std::str::from_utf8(&buf) else {
            tracing::warn!(line = line_no, "skipping line that is not UTF-8");
            report.failures.push(BatchFailure {
                line: line_no,
                error: Error::InvalidUtf8,
            });
            continue;
        };
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let kind = content::detect(line);
        let payload = content::normalize(line, kind);
        let path = opts.file_for(report.generated.len() + 1);

        match generate_one(&generator, &payload, &path) {
            Ok(()) => report.generated.push(BatchItem {
                line: line_no,
                kind,
                path,
            }),
            Err(error) => {
                tracing::warn!(line = line_no, %error, "skipping line");
                report.failures.push(BatchFailure { line: line_no, error });
            }
        }
    }

    Ok(report)
}

fn generate_one(generator: &Generator, payload: &str, path: &Path) -> Result<()> {
    let symbol = generator.generate(payload)?;
    symbol.save_png(path, generator.options().size)
}
