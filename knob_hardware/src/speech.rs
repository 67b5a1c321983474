//! Text-to-speech through an external program (espeak by default),
//! with the talking-face animation driven off the same panel the
//! dispatcher renders to.
//!
//! Each phrase is one subprocess invocation. While the program runs the
//! panel alternates the open and closed mouth every 200ms with the
//! spoken text as caption, then settles on the closed mouth. `speak`
//! blocks until playback completes so callers can sequence phrases
//! without overlap.

use crate::error::HwError;
use knob_traits::{DisplayPanel, ImageId, Speech};
use std::process::{Command, Stdio};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

const MOUTH_FRAME: Duration = Duration::from_millis(200);

/// Clone-able panel handle so speech animation and the dispatcher can
/// drive the same display.
pub struct SharedPanel<D> {
    inner: Arc<Mutex<D>>,
}

impl<D> SharedPanel<D> {
    pub fn new(panel: D) -> Self {
        Self {
            inner: Arc::new(Mutex::new(panel)),
        }
    }
}

impl<D> Clone for SharedPanel<D> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<D: DisplayPanel> DisplayPanel for SharedPanel<D> {
    fn render(
        &mut self,
        image: ImageId,
        caption: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|_| HwError::Framebuffer("panel mutex poisoned".into()))?;
        guard.render(image, caption)
    }
}

pub struct AnimatedSpeech<D> {
    program: String,
    args: Vec<String>,
    panel: SharedPanel<D>,
}

impl<D: DisplayPanel> AnimatedSpeech<D> {
    pub fn new(cfg: &knob_config::SpeechCfg, panel: SharedPanel<D>) -> Self {
        Self {
            program: cfg.program.clone(),
            args: cfg.args.clone(),
            panel,
        }
    }

    /// Animation frames must not kill the phrase; a broken display is
    /// logged and playback continues.
    fn mouth(&mut self, image: ImageId, caption: &str) {
        if let Err(e) = self.panel.render(image, caption) {
            tracing::warn!(error = %e, "mouth frame render failed");
        }
    }

    fn run(&mut self, text: &str) -> Result<(), HwError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .arg(text)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| HwError::Speech(format!("{}: {e}", self.program)))?;

        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) => {
                    self.mouth(ImageId::OpenMouth, text);
                    thread::sleep(MOUTH_FRAME);
                    self.mouth(ImageId::ClosedMouth, text);
                    thread::sleep(MOUTH_FRAME);
                }
                Err(e) => {
                    return Err(HwError::Speech(format!("{}: {e}", self.program)));
                }
            }
        };
        self.mouth(ImageId::ClosedMouth, text);

        if !status.success() {
            return Err(HwError::Speech(format!(
                "{} exited with {status}",
                self.program
            )));
        }
        Ok(())
    }
}

impl<D: DisplayPanel> Speech for AnimatedSpeech<D> {
    fn speak(&mut self, text: &str) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        tracing::debug!(text, "speaking");
        self.run(text).map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Default)]
    struct FrameLog {
        frames: Arc<Mutex<Vec<ImageId>>>,
    }

    impl DisplayPanel for FrameLog {
        fn render(
            &mut self,
            image: ImageId,
            _caption: &str,
        ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
            self.frames.lock().unwrap().push(image);
            Ok(())
        }
    }

    fn speech(program: &str, log: &FrameLog) -> AnimatedSpeech<FrameLog> {
        AnimatedSpeech::new(
            &knob_config::SpeechCfg {
                program: program.into(),
                args: Vec::new(),
            },
            SharedPanel::new(log.clone()),
        )
    }

    #[test]
    fn phrase_ends_with_the_mouth_closed() {
        let log = FrameLog::default();
        speech("true", &log).speak("hello").unwrap();
        let frames = log.frames.lock().unwrap();
        assert_eq!(frames.last(), Some(&ImageId::ClosedMouth));
    }

    #[test]
    fn slow_phrase_animates_the_mouth() {
        let log = FrameLog::default();
        speech("sleep", &log)
            .speak("0.6")
            .expect("sleep exits cleanly");
        let frames = log.frames.lock().unwrap();
        assert!(frames.contains(&ImageId::OpenMouth));
        assert!(frames.contains(&ImageId::ClosedMouth));
    }

    #[test]
    fn nonzero_exit_is_an_error() {
        let log = FrameLog::default();
        assert!(speech("false", &log).speak("hello").is_err());
    }

    #[test]
    fn missing_program_is_an_error() {
        let log = FrameLog::default();
        assert!(
            speech("/nonexistent/tts-binary", &log)
                .speak("hello")
                .is_err()
        );
    }
}
