use std::io::Write;
use std::process::{Command, Stdio};

use super::ExtractionError;

/// Run the OCR program with the image on stdin and collect the recognized text from stdout.
pub(super) fn extract_text(bytes: &[u8], command: &str) -> Result<String, ExtractionError> {
    let mut child = Command::new(command)
        .args(["stdin", "stdout"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|error| ExtractionError::Ocr(format!("failed to start {command}: {error}")))?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(bytes)?;
    }

    let output = child.wait_with_output()?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ExtractionError::Ocr(format!(
            "{command} exited with {}: {}",
            output.status,
            stderr.trim()
        )));
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
