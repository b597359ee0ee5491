//! Live symbol decoder that shells out to `zbarimg`.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use uuid::Uuid;

use crate::ports::camera::Frame;
use crate::ports::decoder::SymbolDecoder;

/// Exit status `zbarimg` uses when the image held no symbol.
const NO_SYMBOLS_EXIT: i32 = 4;

type EngineError = Box<dyn std::error::Error + Send + Sync>;

/// Decodes frames by writing them as PGM files and running `zbarimg` on them.
pub struct ZbarDecoder {
    program: PathBuf,
}

impl ZbarDecoder {
    /// Creates a decoder that runs `program` (usually just `zbarimg`).
    #[must_use]
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self { program: program.into() }
    }
}

impl SymbolDecoder for ZbarDecoder {
    fn warm_up(&self) -> Result<(), EngineError> {
        let program = self.program.display();
        let output = Command::new(&self.program)
            .arg("--version")
            .output()
            .map_err(|e| format!("cannot run {program}: {e}"))?;
        if !output.status.success() {
            return Err(format!("{program} --version exited with {}", output.status).into());
        }
        tracing::debug!(
            version = %String::from_utf8_lossy(&output.stdout).trim(),
            "zbarimg available"
        );
        Ok(())
    }

    fn decode(&self, frame: &Frame) -> Result<Vec<String>, EngineError> {
        let name = format!("pantry-frame-{}.pgm", Uuid::new_v4().simple());
        let path = std::env::temp_dir().join(name);
        fs::write(&path, encode_pgm(frame))?;
        let result = run_zbarimg(&self.program, &path);
        if let Err(e) = fs::remove_file(&path) {
            tracing::warn!(path = %path.display(), error = %e, "failed to remove frame file");
        }
        result
    }
}

fn run_zbarimg(program: &Path, image: &Path) -> Result<Vec<String>, EngineError> {
    let output = Command::new(program).arg("--raw").arg("--quiet").arg(image).output()?;
    match output.status.code() {
        Some(0) => Ok(String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect()),
        Some(NO_SYMBOLS_EXIT) => Ok(Vec::new()),
        code => {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(format!("zbarimg failed ({code:?}): {}", stderr.trim()).into())
        }
    }
}

/// Binary greyscale PGM (P5) with an 8-bit maxval.
fn encode_pgm(frame: &Frame) -> Vec<u8> {
    let mut header = String::new();
    let _ = write!(header, "P5\n{} {}\n255\n", frame.width, frame.height);
    let mut bytes = header.into_bytes();
    bytes.extend_from_slice(&frame.data);
    bytes
}
