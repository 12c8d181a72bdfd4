use std::{
    io::{self, Write},
    path::{Path, PathBuf},
};

use anyhow::Context;
use pictor_imagegen::{BatchObserver, GenerationResult, SlotOutcome};

/// Prints batch progress and saves each image as soon as it arrives
pub struct TerminalRenderer<W> {
    out_dir: PathBuf,
    writer: W,
    saved: Vec<PathBuf>,
    error: Option<anyhow::Error>,
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(out_dir: impl Into<PathBuf>, writer: W) -> Self {
        Self {
            out_dir: out_dir.into(),
            writer,
            saved: Vec::new(),
            error: None,
        }
    }

    /// Paths of the images written, or the first output failure hit while
    /// rendering
    pub fn finish(self) -> anyhow::Result<Vec<PathBuf>> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.saved),
        }
    }

    fn line(&mut self, text: &str) {
        if let Err(e) = writeln!(self.writer, "{text}") {
            self.record(anyhow::Error::new(e).context("failed to write output"));
        }
    }

    fn record(&mut self, error: anyhow::Error) {
        tracing::error!(error = %error, "render failure");
        self.error.get_or_insert(error);
    }

    fn save(&self, index: u32, result: &GenerationResult) -> anyhow::Result<PathBuf> {
        let path = self.out_dir.join(GenerationResult::file_name(index));
        write_image(&path, &result.raw_bytes)?;
        Ok(path)
    }
}

fn write_image(path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(path, bytes).with_context(|| format!("failed to write {}", path.display()))
}

impl<W: Write> BatchObserver for TerminalRenderer<W> {
    fn on_warning(&mut self, warning: &str) {
        self.line(&format!("warning: {warning}"));
    }

    fn on_slot_start(&mut self, index: u32, count: u32) {
        self.line(&format!("Generating image {index}/{count}..."));
    }

    fn on_slot(&mut self, outcome: &SlotOutcome) {
        match &outcome.result {
            Ok(result) => match self.save(outcome.index, result) {
                Ok(path) => {
                    self.line(&format!("{} ({})", path.display(), result.size_label));
                    self.saved.push(path);
                }
                Err(e) => self.record(e),
            },
            Err(error) => self.line(&format!("Image {} failed: {error}", outcome.index)),
        }
    }
}

impl TerminalRenderer<io::Stdout> {
    pub fn stdout(out_dir: impl Into<PathBuf>) -> Self {
        Self::new(out_dir, io::stdout())
    }
}
