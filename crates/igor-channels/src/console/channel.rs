//! [`ConsoleChannel`] -- `Channel` trait implementation for a terminal.

use std::io::BufRead;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, Lines};
use tokio::sync::{Mutex, RwLock, mpsc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use igor_types::error::ChannelError;
use igor_types::{Event, EventType, Response};

use crate::filter::{addressed_to, keyword_from_config};
use crate::traits::{Channel, ChannelFactory, ChannelHost, ChannelStatus, EventTranslator};

/// Registered name of the console channel.
pub const CONSOLE_CHANNEL: &str = "console";

/// Input line that stops the channel and the hub.
const QUIT_COMMAND: &str = "q";

const DEFAULT_PROMPT: &str = "> ";

/// Lines buffered between the stdin reader thread and the listen loop.
const STDIN_BUFFER: usize = 16;

/// Boxed line source the console reads from.
pub type ConsoleInput = Box<dyn AsyncBufRead + Send + Unpin>;

/// Boxed sink the console writes prompts and responses to.
pub type ConsoleOutput = Box<dyn AsyncWrite + Send + Unpin>;

/// Where the console takes its input from.
enum Source {
    /// Process stdin, read on a dedicated thread once listening starts.
    Stdin,
    Stream(ConsoleInput),
}

/// Line reader owned by a running listen loop.
enum LineReader {
    Stdin(mpsc::Receiver<std::io::Result<String>>),
    Stream(Lines<ConsoleInput>),
}

impl LineReader {
    async fn next_line(&mut self) -> std::io::Result<Option<String>> {
        match self {
            Self::Stdin(rx) => rx.recv().await.transpose(),
            Self::Stream(lines) => lines.next_line().await,
        }
    }
}

/// Read stdin on a detached thread and forward each line.
///
/// The thread ends at EOF or once the receiver is dropped. Unlike
/// `tokio::io::stdin`, a read blocked here does not hold up runtime
/// shutdown.
fn spawn_stdin_reader() -> std::io::Result<mpsc::Receiver<std::io::Result<String>>> {
    let (tx, rx) = mpsc::channel(STDIN_BUFFER);
    std::thread::Builder::new()
        .name("igor-stdin".into())
        .spawn(move || {
            for line in std::io::stdin().lock().lines() {
                let failed = line.is_err();
                if tx.blocking_send(line).is_err() || failed {
                    break;
                }
            }
        })?;
    Ok(rx)
}

/// Interactive terminal channel.
///
/// The input stream is owned by the channel until
/// [`start_listening`](Channel::start_listening) takes it; it is released
/// when the listen loop exits or when
/// [`stop_listening`](Channel::stop_listening) runs first. A console can
/// therefore listen only once.
///
/// # Configuration
///
/// ```toml
/// [channels.console]
/// keyword = "igor"   # optional
/// prompt = "> "      # optional
/// ```
pub struct ConsoleChannel {
    keyword: String,
    prompt: String,
    input: Mutex<Option<Source>>,
    output: Mutex<ConsoleOutput>,
    status: Arc<RwLock<ChannelStatus>>,
    /// Cancelled by `stop_listening`; observed by the listen loop.
    stop: CancellationToken,
    stopped: AtomicBool,
}

impl ConsoleChannel {
    /// Console bound to the process's stdin and stdout.
    pub fn new(keyword: impl Into<String>) -> Self {
        Self::with_source(keyword, Source::Stdin, Box::new(tokio::io::stdout()))
    }

    /// Console bound to arbitrary streams.
    pub fn with_io(keyword: impl Into<String>, input: ConsoleInput, output: ConsoleOutput) -> Self {
        Self::with_source(keyword, Source::Stream(input), output)
    }

    fn with_source(keyword: impl Into<String>, source: Source, output: ConsoleOutput) -> Self {
        Self {
            keyword: keyword.into(),
            prompt: DEFAULT_PROMPT.into(),
            input: Mutex::new(Some(source)),
            output: Mutex::new(output),
            status: Arc::new(RwLock::new(ChannelStatus::Stopped)),
            stop: CancellationToken::new(),
            stopped: AtomicBool::new(false),
        }
    }

    /// Replace the prompt printed before each read.
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    async fn set_status(&self, status: ChannelStatus) {
        *self.status.write().await = status;
    }

    async fn write(&self, text: &str) -> std::io::Result<()> {
        let mut out = self.output.lock().await;
        out.write_all(text.as_bytes()).await?;
        out.flush().await
    }
}

impl EventTranslator for ConsoleChannel {
    type Native = String;

    fn to_event(&self, line: &String) -> Event {
        Event::new(EventType::Message, line.as_str(), CONSOLE_CHANNEL)
    }
}

#[async_trait]
impl Channel for ConsoleChannel {
    fn name(&self) -> &str {
        CONSOLE_CHANNEL
    }

    fn status(&self) -> ChannelStatus {
        self.status
            .try_read()
            .map(|s| s.clone())
            .unwrap_or(ChannelStatus::Stopped)
    }

    async fn start_listening(
        &self,
        host: Arc<dyn ChannelHost>,
        cancel: CancellationToken,
    ) -> Result<(), ChannelError> {
        let Some(source) = self.input.lock().await.take() else {
            return Err(ChannelError::AlreadyStopped);
        };
        let mut lines = match source {
            Source::Stdin => LineReader::Stdin(
                spawn_stdin_reader().map_err(|e| ChannelError::ConnectionFailed(e.to_string()))?,
            ),
            Source::Stream(input) => LineReader::Stream(input.lines()),
        };

        self.set_status(ChannelStatus::Running).await;
        info!("console channel listening");

        let result = loop {
            if let Err(e) = self.write(&self.prompt).await {
                debug!(error = %e, "failed to write console prompt");
            }

            let next = tokio::select! {
                _ = cancel.cancelled() => {
                    info!("console channel received cancellation");
                    break Ok(());
                }
                _ = self.stop.cancelled() => break Ok(()),
                next = lines.next_line() => next,
            };

            let line = match next {
                Ok(Some(line)) => line,
                Ok(None) => {
                    info!("console input closed");
                    break Ok(());
                }
                Err(e) => {
                    warn!(error = %e, "console read failed");
                    self.set_status(ChannelStatus::Error(e.to_string())).await;
                    break Err(ChannelError::ReceiveFailed(e.to_string()));
                }
            };
            // Leading whitespace is kept: "  igor ..." is not addressed.
            let line = line.trim_end();

            if line.eq_ignore_ascii_case(QUIT_COMMAND) {
                self.stop_listening().await?;
                host.request_shutdown();
                if let Err(e) = self.write("console is shutting down\n").await {
                    debug!(error = %e, "failed to write console farewell");
                }
                break Ok(());
            }

            if addressed_to(line, &self.keyword) {
                let event = self.to_event(&line.to_owned());
                let outcome = host.dispatch(event).await;
                debug!(outcome = %outcome, "console dispatch finished");
            }
        };

        drop(lines);
        if result.is_ok() {
            self.set_status(ChannelStatus::Stopped).await;
        }
        result
    }

    async fn stop_listening(&self) -> Result<(), ChannelError> {
        if self.stopped.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        {
            let mut status = self.status.write().await;
            if *status == ChannelStatus::Running {
                *status = ChannelStatus::Stopping;
            }
        }
        self.stop.cancel();
        // Listening never started: release the input here instead.
        if self.input.lock().await.take().is_some() {
            self.set_status(ChannelStatus::Stopped).await;
        }
        info!("console channel stopped listening");
        Ok(())
    }

    async fn send_response(&self, _event: &Event, response: &Response) -> Result<(), ChannelError> {
        self.write(&format!("Igor: {}\n", response.content))
            .await
            .map_err(|e| ChannelError::SendFailed(e.to_string()))
    }
}

/// Factory for [`ConsoleChannel`] bound to stdin / stdout.
pub struct ConsoleChannelFactory;

impl ChannelFactory for ConsoleChannelFactory {
    fn channel_name(&self) -> &str {
        CONSOLE_CHANNEL
    }

    fn build(&self, config: &serde_json::Value) -> Result<Arc<dyn Channel>, ChannelError> {
        let mut channel = ConsoleChannel::new(keyword_from_config(config));
        if let Some(prompt) = config.get("prompt").and_then(serde_json::Value::as_str) {
            channel = channel.with_prompt(prompt);
        }
        Ok(Arc::new(channel))
    }
}
