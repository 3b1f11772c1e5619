//! Media capture collaborator
//!
//! The shipped implementation shells out to configurable capture commands
//! (e.g. `fswebcam` for photos, `ffmpeg` for video) that write into the media
//! directory. Files already on disk can be attached with [`import_file`].

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::process::{Child, Command};
use tokio::time::timeout;
use uuid::Uuid;

use crate::config::CaptureConfig;

use super::media::{MediaItem, MediaKind};

/// Errors raised while capturing or importing media
#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("Nenhum comando de captura configurado para {0}")]
    NotConfigured(&'static str),

    #[error("Não foi possível executar a captura: {0}")]
    Failed(String),

    #[error("Uma gravação já está em andamento")]
    AlreadyRecording,

    #[error("Nenhuma gravação em andamento")]
    NotRecording,

    #[error("Aguarde pelo menos {min_secs} segundo(s). Duração atual: {elapsed_secs}s")]
    TooShort { min_secs: u64, elapsed_secs: u64 },

    #[error("Grave por pelo menos 1 segundo.")]
    StoppedBeforeData,

    #[error("Arquivo não encontrado: {0}")]
    FileNotFound(String),

    #[error("Formato de arquivo não suportado: {0}")]
    UnsupportedFile(String),
}

impl CaptureError {
    /// Toast header for the error
    pub fn title(&self) -> &'static str {
        match self {
            CaptureError::TooShort { .. } | CaptureError::StoppedBeforeData => {
                "Gravação muito curta"
            }
            CaptureError::AlreadyRecording | CaptureError::NotRecording => "Gravação",
            CaptureError::FileNotFound(_) | CaptureError::UnsupportedFile(_) => {
                "Erro ao importar mídia"
            }
            CaptureError::NotConfigured(_) | CaptureError::Failed(_) => "Erro na captura",
        }
    }
}

/// Capture device seam; each successful capture yields a resource locator
#[async_trait]
pub trait MediaCapture: Send {
    async fn take_photo(&mut self) -> Result<String, CaptureError>;

    fn start_recording(&mut self) -> Result<(), CaptureError>;

    /// Finish the current recording, honouring the minimum duration
    async fn stop_recording(&mut self) -> Result<String, CaptureError>;

    /// Drop the current recording and its file regardless of duration
    async fn cancel_recording(&mut self);

    fn is_recording(&self) -> bool;

    /// Time since the current recording started
    fn recording_elapsed(&self) -> Option<Duration>;
}

/// Reject recordings stopped before the minimum duration
pub fn check_recording_duration(elapsed: Duration, min: Duration) -> Result<(), CaptureError> {
    if elapsed < min {
        return Err(CaptureError::TooShort {
            min_secs: min.as_secs().max(1),
            elapsed_secs: elapsed.as_secs(),
        });
    }
    Ok(())
}

/// Attach a file that already exists on disk
pub fn import_file(path: &Path) -> Result<MediaItem, CaptureError> {
    if !path.is_file() {
        return Err(CaptureError::FileNotFound(path.display().to_string()));
    }
    let kind = MediaKind::from_path(path)
        .ok_or_else(|| CaptureError::UnsupportedFile(path.display().to_string()))?;
    let absolute = path
        .canonicalize()
        .map_err(|e| CaptureError::Failed(e.to_string()))?;
    Ok(MediaItem {
        uri: file_uri(&absolute),
        kind,
    })
}

fn file_uri(path: &Path) -> String {
    format!("file://{}", path.display())
}

/// Expand `{output}` and `{max_secs}` placeholders in a command template
fn expand_command(template: &[String], output: &Path, max_secs: u64) -> Vec<String> {
    template
        .iter()
        .map(|arg| {
            arg.replace("{output}", &output.to_string_lossy())
                .replace("{max_secs}", &max_secs.to_string())
        })
        .collect()
}

fn has_data(path: &Path) -> bool {
    std::fs::metadata(path)
        .map(|m| m.is_file() && m.len() > 0)
        .unwrap_or(false)
}

/// Send SIGINT so recorders like ffmpeg can write their trailer
#[cfg(unix)]
async fn interrupt(child: &Child) -> bool {
    let Some(pid) = child.id() else {
        return false;
    };
    Command::new("kill")
        .arg("-INT")
        .arg(pid.to_string())
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await
        .map(|status| status.success())
        .unwrap_or(false)
}

#[cfg(not(unix))]
async fn interrupt(_child: &Child) -> bool {
    false
}

/// Ask the recorder to exit, killing it when it ignores the request
async fn finish_recorder(child: &mut Child, grace: Duration) -> Result<(), CaptureError> {
    // The recorder may already have exited on its own at max duration
    if child
        .try_wait()
        .map_err(|e| CaptureError::Failed(e.to_string()))?
        .is_some()
    {
        return Ok(());
    }

    if interrupt(child).await {
        match timeout(grace, child.wait()).await {
            Ok(Ok(_)) => return Ok(()),
            Ok(Err(e)) => return Err(CaptureError::Failed(e.to_string())),
            Err(_) => {
                tracing::warn!(
                    pid = child.id(),
                    grace_ms = grace.as_millis() as u64,
                    "Recorder ignored interrupt; killing"
                );
            }
        }
    }

    child
        .kill()
        .await
        .map_err(|e| CaptureError::Failed(e.to_string()))
}

struct ActiveRecording {
    child: Child,
    output: PathBuf,
    started: Instant,
}

/// How long a recorder gets to finalize its file after SIGINT
pub const DEFAULT_STOP_GRACE: Duration = Duration::from_secs(5);

/// Capture through external programs
pub struct CommandCapture {
    photo_command: Vec<String>,
    video_command: Vec<String>,
    media_dir: PathBuf,
    min_video: Duration,
    max_video: Duration,
    stop_grace: Duration,
    recording: Option<ActiveRecording>,
}

impl CommandCapture {
    pub fn new(config: &CaptureConfig, media_dir: PathBuf) -> Self {
        Self {
            photo_command: config.photo_command.clone(),
            video_command: config.video_command.clone(),
            media_dir,
            min_video: Duration::from_millis(config.min_video_ms),
            max_video: Duration::from_secs(config.max_video_secs),
            stop_grace: DEFAULT_STOP_GRACE,
            recording: None,
        }
    }

    pub fn with_stop_grace(mut self, grace: Duration) -> Self {
        self.stop_grace = grace;
        self
    }

    pub fn max_video(&self) -> Duration {
        self.max_video
    }

    fn output_path(&self, prefix: &str, ext: &str) -> Result<PathBuf, CaptureError> {
        std::fs::create_dir_all(&self.media_dir).map_err(|e| CaptureError::Failed(e.to_string()))?;
        Ok(self
            .media_dir
            .join(format!("{}-{}.{}", prefix, Uuid::new_v4(), ext)))
    }

    fn command_for(args: &[String]) -> Result<Command, CaptureError> {
        let (program, rest) = args
            .split_first()
            .ok_or_else(|| CaptureError::Failed("comando vazio".to_string()))?;
        let mut cmd = Command::new(program);
        cmd.args(rest)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);
        Ok(cmd)
    }
}

#[async_trait]
impl MediaCapture for CommandCapture {
    async fn take_photo(&mut self) -> Result<String, CaptureError> {
        if self.photo_command.is_empty() {
            return Err(CaptureError::NotConfigured("fotos"));
        }
        let output = self.output_path("foto", "jpg")?;
        let args = expand_command(&self.photo_command, &output, self.max_video.as_secs());

        let status = Self::command_for(&args)?
            .status()
            .await
            .map_err(|e| CaptureError::Failed(e.to_string()))?;
        if !status.success() {
            return Err(CaptureError::Failed(format!(
                "{} terminou com {}",
                args[0], status
            )));
        }
        if !has_data(&output) {
            return Err(CaptureError::Failed(
                "Não foi possível tirar a foto.".to_string(),
            ));
        }

        tracing::info!(path = %output.display(), "Photo captured");
        Ok(file_uri(&output))
    }

    fn start_recording(&mut self) -> Result<(), CaptureError> {
        if self.recording.is_some() {
            return Err(CaptureError::AlreadyRecording);
        }
        if self.video_command.is_empty() {
            return Err(CaptureError::NotConfigured("vídeos"));
        }
        let output = self.output_path("video", "mp4")?;
        let args = expand_command(&self.video_command, &output, self.max_video.as_secs());

        let child = Self::command_for(&args)?
            .spawn()
            .map_err(|e| CaptureError::Failed(e.to_string()))?;

        tracing::info!(path = %output.display(), pid = child.id(), "Recording started");
        self.recording = Some(ActiveRecording {
            child,
            output,
            started: Instant::now(),
        });
        Ok(())
    }

    async fn stop_recording(&mut self) -> Result<String, CaptureError> {
        let elapsed = self
            .recording
            .as_ref()
            .map(|r| r.started.elapsed())
            .ok_or(CaptureError::NotRecording)?;

        // Too short: keep recording so the attendant can stop again later
        check_recording_duration(elapsed, self.min_video)?;

        let Some(mut active) = self.recording.take() else {
            return Err(CaptureError::NotRecording);
        };
        finish_recorder(&mut active.child, self.stop_grace).await?;

        if !has_data(&active.output) {
            tracing::warn!(path = %active.output.display(), "Recording stopped before any data");
            return Err(CaptureError::StoppedBeforeData);
        }

        tracing::info!(
            path = %active.output.display(),
            secs = elapsed.as_secs(),
            "Recording stopped"
        );
        Ok(file_uri(&active.output))
    }

    async fn cancel_recording(&mut self) {
        let Some(mut active) = self.recording.take() else {
            return;
        };
        if let Err(e) = active.child.kill().await {
            tracing::warn!(error = %e, "Failed to kill recorder");
        }
        if active.output.exists() {
            if let Err(e) = std::fs::remove_file(&active.output) {
                tracing::warn!(path = %active.output.display(), error = %e, "Failed to remove cancelled recording");
            }
        }
        tracing::info!(path = %active.output.display(), "Recording cancelled");
    }

    fn is_recording(&self) -> bool {
        self.recording.is_some()
    }

    fn recording_elapsed(&self) -> Option<Duration> {
        self.recording.as_ref().map(|r| r.started.elapsed())
    }
}

/// Capture double that hands out `mock://` locators without touching devices
#[derive(Debug, Default)]
pub struct MockCapture {
    taken: usize,
    recording: Option<Instant>,
    min_video: Duration,
    failure: Option<String>,
}

impl MockCapture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enforce a minimum recording length like [`CommandCapture`]
    pub fn with_min_video(mut self, min: Duration) -> Self {
        self.min_video = min;
        self
    }

    /// Make the following captures fail with `message`
    pub fn fail_with(&mut self, message: &str) {
        self.failure = Some(message.to_string());
    }

    fn check_failure(&self) -> Result<(), CaptureError> {
        match &self.failure {
            Some(message) => Err(CaptureError::Failed(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl MediaCapture for MockCapture {
    async fn take_photo(&mut self) -> Result<String, CaptureError> {
        self.check_failure()?;
        self.taken += 1;
        Ok(format!("mock://foto-{}.jpg", self.taken))
    }

    fn start_recording(&mut self) -> Result<(), CaptureError> {
        self.check_failure()?;
        if self.recording.is_some() {
            return Err(CaptureError::AlreadyRecording);
        }
        self.recording = Some(Instant::now());
        Ok(())
    }

    async fn stop_recording(&mut self) -> Result<String, CaptureError> {
        let started = self.recording.ok_or(CaptureError::NotRecording)?;
        check_recording_duration(started.elapsed(), self.min_video)?;
        self.recording = None;
        self.taken += 1;
        Ok(format!("mock://video-{}.mp4", self.taken))
    }

    async fn cancel_recording(&mut self) {
        self.recording = None;
    }

    fn is_recording(&self) -> bool {
        self.recording.is_some()
    }

    fn recording_elapsed(&self) -> Option<Duration> {
        self.recording.map(|started| started.elapsed())
    }
}
