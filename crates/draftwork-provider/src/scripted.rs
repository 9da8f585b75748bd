//! Scripted provider for testing.
//!
//! Yields a fixed sequence of fragments, optionally followed by a failure,
//! so session-level behavior (ordering, mid-stream errors, cancellation) can
//! be exercised without a network or the local transforms.

use crate::{FragmentStream, GenerateOptions, GenerationProvider, ProviderError, ProviderResult};
use async_stream::try_stream;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// One scripted step.
#[derive(Debug, Clone)]
pub enum ScriptedStep {
    /// Yield a fragment.
    Fragment(String),
    /// Fail the stream.
    Fail(String),
}

/// A provider that replays a scripted fragment sequence.
#[derive(Debug, Default, Clone)]
pub struct ScriptedProvider {
    steps: Vec<ScriptedStep>,
    call_count: Arc<Mutex<usize>>,
}

impl ScriptedProvider {
    /// Yield each of `fragments` in order, then end the stream.
    pub fn with_fragments<I, S>(fragments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            steps: fragments
                .into_iter()
                .map(|f| ScriptedStep::Fragment(f.into()))
                .collect(),
            call_count: Arc::new(Mutex::new(0)),
        }
    }

    /// Append a failure after the scripted fragments.
    pub fn then_fail(mut self, message: impl Into<String>) -> Self {
        self.steps.push(ScriptedStep::Fail(message.into()));
        self
    }

    /// Fail immediately when the generation starts.
    pub fn failing(message: impl Into<String>) -> Self {
        Self::with_fragments(Vec::<String>::new()).then_fail(message)
    }

    /// Number of times a generation was started.
    pub fn call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }
}

#[async_trait]
impl GenerationProvider for ScriptedProvider {
    async fn stream_generate(
        &self,
        _system: &str,
        _user: &str,
        _options: GenerateOptions,
    ) -> ProviderResult<FragmentStream> {
        {
            let mut count = self.call_count.lock().unwrap();
            *count += 1;
        }

        let steps = self.steps.clone();
        Ok(Box::pin(try_stream! {
            for step in steps {
                match step {
                    ScriptedStep::Fragment(text) => yield text,
                    ScriptedStep::Fail(message) => {
                        Err(ProviderError::internal(message))?;
                    }
                }
            }
        }))
    }

    fn provider_id(&self) -> &str {
        "scripted"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[tokio::test]
    async fn test_replays_fragments_in_order() {
        let provider = ScriptedProvider::with_fragments(["xy", "z"]);
        let mut stream = provider
            .stream_generate("s", "u", GenerateOptions::default())
            .await
            .unwrap();

        assert_eq!(stream.next().await.unwrap().unwrap(), "xy");
        assert_eq!(stream.next().await.unwrap().unwrap(), "z");
        assert!(stream.next().await.is_none());
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn test_fails_after_fragments() {
        let provider = ScriptedProvider::with_fragments(["ok"]).then_fail("boom");
        let mut stream = provider
            .stream_generate("s", "u", GenerateOptions::default())
            .await
            .unwrap();

        assert_eq!(stream.next().await.unwrap().unwrap(), "ok");
        assert!(stream.next().await.unwrap().is_err());
    }
}
