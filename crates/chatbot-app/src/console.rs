//! Line-oriented chat console: reads user input and renders the session.

use std::io::Write;
use std::sync::Arc;

use chatbot_ai::{ChatError, ChatSession, Outcome, SessionSnapshot};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::watch;

use crate::render::Transcript;

const PROMPT: &str = "> ";

/// What a line of input asks for.
#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    Send(String),
    Clear,
    Quit,
    Empty,
}

impl Command {
    pub fn parse(line: &str) -> Self {
        match line.trim() {
            "" => Command::Empty,
            "/quit" | "/exit" => Command::Quit,
            "/clear" => Command::Clear,
            text => Command::Send(text.to_string()),
        }
    }
}

pub struct Console<W: Write> {
    session: Arc<ChatSession>,
    max_input_chars: usize,
    snapshots: watch::Receiver<SessionSnapshot>,
    transcript: Transcript,
    out: W,
}

impl<W: Write> Console<W> {
    pub fn new(session: Arc<ChatSession>, max_input_chars: usize, out: W) -> Self {
        let snapshots = session.subscribe();
        Self {
            session,
            max_input_chars,
            snapshots,
            transcript: Transcript::default(),
            out,
        }
    }

    /// Run until `/quit`, end of input, or Ctrl-C at the prompt.
    pub async fn run<R>(&mut self, input: R) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = input.lines();
        self.render()?;

        loop {
            self.write(PROMPT)?;
            let line = tokio::select! {
                line = lines.next_line() => line?,
                _ = tokio::signal::ctrl_c() => {
                    self.write("\n")?;
                    break;
                }
            };
            let Some(line) = line else { break };

            match Command::parse(&line) {
                Command::Empty => {}
                Command::Quit => break,
                Command::Clear => match self.session.clear() {
                    Ok(()) => self.render()?,
                    Err(e) => self.write(&format!("[{e}]\n"))?,
                },
                Command::Send(text) => {
                    let len = text.chars().count();
                    if len > self.max_input_chars {
                        self.write(&format!(
                            "[message too long: {len} characters, limit is {}]\n",
                            self.max_input_chars
                        ))?;
                        continue;
                    }
                    self.exchange(text).await?;
                }
            }
        }

        tracing::debug!(session = %self.session.id(), "console closed");
        Ok(())
    }

    /// Send one message, rendering snapshots until the request settles.
    /// Ctrl-C cancels the request instead of exiting.
    async fn exchange(&mut self, text: String) -> std::io::Result<()> {
        let session = self.session.clone();
        let send = session.send_message(text);
        tokio::pin!(send);

        let result = loop {
            tokio::select! {
                result = &mut send => break result,
                changed = self.snapshots.changed() => {
                    if changed.is_ok() {
                        self.render()?;
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    session.cancel_stream();
                }
            }
        };
        self.render()?;

        match result {
            Ok(Outcome::Completed { .. }) => Ok(()),
            Ok(Outcome::Cancelled { .. }) => self.write("[cancelled]\n"),
            // Already shown through the snapshot's error.
            Err(ChatError::Ai(_)) => Ok(()),
            Err(e) => self.write(&format!("[{e}]\n")),
        }
    }

    fn render(&mut self) -> std::io::Result<()> {
        let snapshot = self.snapshots.borrow_and_update().clone();
        let text = self.transcript.update(&snapshot);
        if text.is_empty() {
            return Ok(());
        }
        self.write(&text)
    }

    fn write(&mut self, text: &str) -> std::io::Result<()> {
        self.out.write_all(text.as_bytes())?;
        self.out.flush()
    }

    #[cfg(test)]
    pub fn into_output(self) -> W {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chatbot_ai::{AiError, ChatClient, ChunkStream, Message};
    use futures_util::stream;
    use std::sync::Mutex;

    /// Replies with fixed chunk lists, one per request.
    struct ScriptedClient {
        replies: Mutex<Vec<Vec<Result<String, AiError>>>>,
    }

    impl ScriptedClient {
        fn new(mut replies: Vec<Vec<Result<String, AiError>>>) -> Self {
            replies.reverse();
            Self {
                replies: Mutex::new(replies),
            }
        }
    }

    #[async_trait]
    impl ChatClient for ScriptedClient {
        async fn stream_chat(&self, _messages: &[Message]) -> Result<ChunkStream, AiError> {
            let items = self.replies.lock().unwrap().pop().unwrap_or_default();
            Ok(Box::pin(stream::iter(items)))
        }
    }

    fn console(client: ScriptedClient, max: usize) -> Console<Vec<u8>> {
        let session = ChatSession::new(Arc::new(client))
            .with_initial_messages(vec![Message::assistant("Hello! Ask me anything.")]);
        Console::new(Arc::new(session), max, Vec::new())
    }

    fn output(console: Console<Vec<u8>>) -> String {
        String::from_utf8(console.into_output()).unwrap()
    }

    #[test]
    fn parses_commands() {
        assert_eq!(Command::parse("  "), Command::Empty);
        assert_eq!(Command::parse("/quit"), Command::Quit);
        assert_eq!(Command::parse("/exit\n"), Command::Quit);
        assert_eq!(Command::parse("/clear"), Command::Clear);
        assert_eq!(Command::parse("  hi there "), Command::Send("hi there".into()));
    }

    #[tokio::test]
    async fn renders_greeting_and_streamed_reply() {
        let client = ScriptedClient::new(vec![vec![Ok("Hel".into()), Ok("lo".into())]]);
        let mut c = console(client, 100);
        c.run("hi\n".as_bytes()).await.unwrap();

        let out = output(c);
        assert!(out.starts_with("bot> Hello! Ask me anything.\n> "));
        assert!(out.contains("bot> Hello\n"));
    }

    #[tokio::test]
    async fn too_long_input_is_not_sent() {
        let client = ScriptedClient::new(Vec::new());
        let mut c = console(client, 3);
        c.run("toolong\n/quit\nnever\n".as_bytes()).await.unwrap();

        assert_eq!(c.session.messages().len(), 1);
        assert!(output(c).contains("[message too long: 7 characters, limit is 3]"));
    }

    #[tokio::test]
    async fn failed_request_prints_error() {
        let client = ScriptedClient::new(vec![vec![
            Ok("part".into()),
            Err(AiError::ApiError("HTTP 500: boom".into())),
        ]]);
        let mut c = console(client, 100);
        c.run("hi\n".as_bytes()).await.unwrap();

        let out = output(c);
        assert!(out.contains("bot> part\n"));
        assert!(out.contains("[error] API error: HTTP 500: boom\n"));
    }

    #[tokio::test]
    async fn clear_resets_to_greeting() {
        let client = ScriptedClient::new(vec![vec![Ok("answer".into())]]);
        let mut c = console(client, 100);
        c.run("question\n/clear\n".as_bytes()).await.unwrap();

        assert_eq!(c.session.messages().len(), 1);
        let out = output(c);
        assert_eq!(out.matches("bot> Hello! Ask me anything.").count(), 2);
    }
}
