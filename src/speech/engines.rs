//! Subprocess speech engines
//!
//! Capture records through SoX `rec` (or ALSA `arecord`) and hands the
//! WAV to a transcriber CLI; playback shells out to espeak-ng. Both are
//! detected on PATH at startup and the corresponding voice feature is
//! reported unavailable when detection fails.

use super::capture::SpeechRecognizer;
use super::voice::{SpeechSynthesizer, Utterance, VoiceInfo};
use crate::{MoodchatError, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, info};

/// Default transcriber invoked on the recorded WAV; expected to print
/// the transcript on stdout
const DEFAULT_TRANSCRIBER: &str = "whisper-cli";

/// Hard cap on one capture session
const MAX_CAPTURE_SECS: u32 = 30;

/// espeak-ng's default speaking rate in words per minute
const ESPEAK_BASE_WPM: f32 = 175.0;

static CAPTURE_SEQ: AtomicU64 = AtomicU64::new(0);

fn program_on_path(name: &str) -> bool {
    let Some(paths) = std::env::var_os("PATH") else {
        return false;
    };
    std::env::split_paths(&paths).any(|dir| dir.join(name).is_file())
}

/// Speech recognizer backed by a recorder and a transcriber CLI
pub struct CommandRecognizer {
    record_program: String,
    transcribe_program: String,
}

impl CommandRecognizer {
    /// Detect a usable recorder/transcriber pair on PATH.
    ///
    /// `MOODCHAT_TRANSCRIBER` overrides the transcriber binary.
    pub fn detect() -> Option<Self> {
        let record_program = ["rec", "arecord"]
            .into_iter()
            .find(|name| program_on_path(name))?;

        let transcribe_program = std::env::var("MOODCHAT_TRANSCRIBER")
            .ok()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_TRANSCRIBER.to_string());
        if !program_on_path(&transcribe_program) {
            return None;
        }

        info!(recorder = record_program, transcriber = %transcribe_program, "voice capture available");
        Some(Self {
            record_program: record_program.to_string(),
            transcribe_program,
        })
    }

    fn record_command(&self, wav: &Path) -> Command {
        let mut command = Command::new(&self.record_program);
        match self.record_program.as_str() {
            // SoX: 16 kHz mono, stop after the cap
            "rec" => {
                command
                    .arg("-q")
                    .arg(wav)
                    .args(["rate", "16000", "channels", "1"])
                    .args(["trim", "0", &MAX_CAPTURE_SECS.to_string()]);
            }
            // ALSA
            _ => {
                command
                    .arg("-q")
                    .args(["-f", "S16_LE", "-r", "16000", "-c", "1"])
                    .args(["-d", &MAX_CAPTURE_SECS.to_string()])
                    .arg(wav);
            }
        }
        command.stdin(Stdio::null()).stderr(Stdio::null());
        command
    }

    fn record(&self, wav: &Path, cancelled: &AtomicBool) -> Result<bool> {
        let mut child = self
            .record_command(wav)
            .spawn()
            .map_err(|e| MoodchatError::CaptureError(format!("start recorder: {e}")))?;

        loop {
            if cancelled.load(Ordering::SeqCst) {
                let _ = child.kill();
                let _ = child.wait();
                return Ok(false);
            }

            match child.try_wait() {
                Ok(Some(status)) => {
                    if !status.success() {
                        return Err(MoodchatError::CaptureError(format!(
                            "recorder exited with {status}"
                        )));
                    }
                    return Ok(true);
                }
                Ok(None) => std::thread::sleep(Duration::from_millis(50)),
                Err(e) => {
                    return Err(MoodchatError::CaptureError(format!("recorder wait: {e}")))
                }
            }
        }
    }

    fn transcribe(&self, wav: &Path) -> Result<String> {
        let output = Command::new(&self.transcribe_program)
            .arg(wav)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| MoodchatError::CaptureError(format!("start transcriber: {e}")))?;

        if !output.status.success() {
            return Err(MoodchatError::CaptureError(format!(
                "transcriber exited with {}",
                output.status
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

impl SpeechRecognizer for CommandRecognizer {
    fn recognize(&mut self, cancelled: &AtomicBool) -> Result<Option<String>> {
        let wav = capture_wav_path();
        let completed = self.record(&wav, cancelled)?;
        if !completed || cancelled.load(Ordering::SeqCst) {
            let _ = std::fs::remove_file(&wav);
            return Ok(None);
        }

        let transcript = self.transcribe(&wav);
        let _ = std::fs::remove_file(&wav);

        let text = transcript?;
        debug!("recognized {} chars", text.len());
        Ok((!text.is_empty()).then_some(text))
    }
}

fn capture_wav_path() -> PathBuf {
    let seq = CAPTURE_SEQ.fetch_add(1, Ordering::Relaxed);
    std::env::temp_dir().join(format!("moodchat-capture-{}-{seq}.wav", std::process::id()))
}

/// Speech synthesizer backed by espeak-ng
pub struct EspeakSynthesizer {
    program: String,
}

impl EspeakSynthesizer {
    /// Detect espeak-ng (or the older espeak binary) on PATH
    pub fn detect() -> Option<Self> {
        let program = ["espeak-ng", "espeak"]
            .into_iter()
            .find(|name| program_on_path(name))?;

        info!(engine = program, "voice playback available");
        Some(Self {
            program: program.to_string(),
        })
    }
}

impl SpeechSynthesizer for EspeakSynthesizer {
    fn voices(&mut self) -> Result<Vec<VoiceInfo>> {
        let output = Command::new(&self.program)
            .arg("--voices")
            .stdin(Stdio::null())
            .output()
            .map_err(|e| MoodchatError::SynthesisError(format!("list voices: {e}")))?;

        if !output.status.success() {
            return Err(MoodchatError::SynthesisError(format!(
                "voice listing exited with {}",
                output.status
            )));
        }

        Ok(parse_espeak_voices(&String::from_utf8_lossy(
            &output.stdout,
        )))
    }

    fn speak(&mut self, utterance: &Utterance) -> Result<()> {
        let wpm = (ESPEAK_BASE_WPM * utterance.rate).round().clamp(80.0, 450.0) as u32;
        let pitch = (utterance.pitch * 50.0).round().clamp(0.0, 99.0) as u32;

        let mut command = Command::new(&self.program);
        if let Some(voice) = &utterance.voice {
            command.args(["-v", voice]);
        }
        let status = command
            .args(["-s", &wpm.to_string()])
            .args(["-p", &pitch.to_string()])
            .arg(&utterance.text)
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(|e| MoodchatError::SynthesisError(format!("start engine: {e}")))?;

        if !status.success() {
            return Err(MoodchatError::SynthesisError(format!(
                "engine exited with {status}"
            )));
        }
        Ok(())
    }
}

/// Parse `espeak-ng --voices` output.
///
/// Columns: Pty, Language, Age/Gender, VoiceName, File, Other Languages.
/// The language code is what `-v` accepts; the voice name is what the
/// preference substring matches against.
fn parse_espeak_voices(output: &str) -> Vec<VoiceInfo> {
    output
        .lines()
        .skip(1)
        .filter_map(|line| {
            let mut fields = line.split_whitespace();
            let _pty = fields.next()?;
            let language = fields.next()?;
            let _age_gender = fields.next()?;
            let name = fields.next()?;
            Some(VoiceInfo {
                id: language.to_string(),
                name: name.to_string(),
            })
        })
        .collect()
}
