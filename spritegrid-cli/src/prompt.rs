//! Export sink that asks for the output folder before every export.

use std::io;
use std::path::PathBuf;

use dialoguer::Input;
use spritegrid::{DirectorySink, EncodedImage, ExportReport, ExportSink, SpriteError, SpriteResult};
use tracing::info;

/// Prompts for a folder on the terminal, then writes there like a
/// [`DirectorySink`].
#[derive(Debug, Clone)]
pub struct PromptDirectorySink {
    suggested: PathBuf,
}

impl PromptDirectorySink {
    /// `suggested` is pre-filled in the prompt.
    pub fn new(suggested: PathBuf) -> Self {
        Self { suggested }
    }

    fn ask(&self) -> SpriteResult<PathBuf> {
        let answer: String = Input::new()
            .with_prompt("Save to folder")
            .default(self.suggested.display().to_string())
            .interact_text()
            .map_err(|e| SpriteError::Io {
                path: self.suggested.clone(),
                source: io::Error::other(e.to_string()),
            })?;
        Ok(PathBuf::from(answer.trim()))
    }
}

impl ExportSink for PromptDirectorySink {
    fn export(&mut self, files: Vec<EncodedImage>) -> SpriteResult<ExportReport> {
        let directory = self.ask()?;
        info!(directory = %directory.display(), "Output folder chosen");
        DirectorySink::new(directory).export(files)
    }

    fn name(&self) -> &str {
        "prompt"
    }
}
