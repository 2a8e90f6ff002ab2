use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::Command;

use crate::error::SpeechError;

/// Converts voice clips to 16 kHz mono WAV with an external `ffmpeg`.
#[derive(Debug, Clone)]
pub struct AudioConverter {
    ffmpeg: PathBuf,
}

impl Default for AudioConverter {
    fn default() -> Self {
        Self::new("ffmpeg")
    }
}

impl AudioConverter {
    #[must_use]
    pub fn new(ffmpeg: impl Into<PathBuf>) -> Self {
        Self { ffmpeg: ffmpeg.into() }
    }

    pub(crate) fn args(input: &Path, output: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec!["-y".into(), "-i".into()];
        args.push(input.as_os_str().to_owned());
        args.extend(["-ar", "16000", "-ac", "1"].map(OsString::from));
        args.push(output.as_os_str().to_owned());
        args
    }

    /// Convert `input` into `output` (overwritten if present).
    ///
    /// # Errors
    /// `Io` when ffmpeg cannot be spawned, `Conversion` when it exits unsuccessfully.
    pub async fn convert(&self, input: &Path, output: &Path) -> Result<(), SpeechError> {
        let result = Command::new(&self.ffmpeg)
            .args(Self::args(input, output))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await?;
        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            let lines: Vec<&str> = stderr.lines().collect();
            let tail = lines.get(lines.len().saturating_sub(3)..).unwrap_or_default().join("\n");
            return Err(SpeechError::Conversion { status: result.status.code(), stderr: tail });
        }
        tracing::debug!(input = %input.display(), output = %output.display(), "Voice clip converted");
        Ok(())
    }
}
