//! Speech service that prints narration instead of synthesizing it.

use std::sync::Arc;

use async_trait::async_trait;
use pepe_core::error::Result;
use pepe_core::notify::SpeechService;

/// Receives each rendered line.
pub type LineSink = Arc<dyn Fn(&str) + Send + Sync>;

/// Writes every utterance to a line sink.
pub struct ConsoleSpeech {
    sink: LineSink,
}

impl ConsoleSpeech {
    pub fn new(sink: LineSink) -> Self {
        Self { sink }
    }

    /// Prints to stdout.
    pub fn stdout() -> Self {
        Self::new(Arc::new(|line: &str| println!("{line}")))
    }
}

#[async_trait]
impl SpeechService for ConsoleSpeech {
    async fn speak(&self, text: &str, locale: &str) -> Result<()> {
        tracing::debug!(target: "speech", locale, "speak: {}", text);
        (self.sink)(&format!("[coach] {text}"));
        Ok(())
    }

    async fn stop_speaking(&self) -> Result<()> {
        // Lines are printed whole, so there is never anything to cut off.
        tracing::debug!(target: "speech", "stop speaking");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[tokio::test]
    async fn test_speak_writes_tagged_line() {
        let lines = Arc::new(Mutex::new(Vec::new()));
        let captured = lines.clone();
        let speech = ConsoleSpeech::new(Arc::new(move |line: &str| {
            captured.lock().unwrap().push(line.to_string());
        }));

        speech.speak("Rest: 90s.", "en-US").await.unwrap();
        speech.stop_speaking().await.unwrap();
        assert_eq!(*lines.lock().unwrap(), vec!["[coach] Rest: 90s.".to_string()]);
    }
}
