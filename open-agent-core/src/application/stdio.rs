use crate::agent::Agent;
use crate::domain::types::ConversationMessage;
use crate::model::CompletionBackend;
use thiserror::Error;
use tokio::io::{self, AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum StdioError {
    #[error("stdin/stdout I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// History carried between turns of one interactive session.
#[derive(Default)]
struct SessionState {
    history: Option<Vec<ConversationMessage>>,
}

impl SessionState {
    fn reset(&mut self) {
        self.history = None;
    }

    fn turns(&self) -> usize {
        self.history.as_ref().map_or(0, |history| {
            history
                .iter()
                .filter(|message| matches!(message, ConversationMessage::User { .. }))
                .count()
        })
    }
}

enum LoopControl {
    Continue,
    Exit,
}

/// Interactive chat over the process's stdin and stdout.
pub async fn run<B: CompletionBackend>(agent: &Agent<B>) -> Result<(), StdioError> {
    let stdin = BufReader::new(io::stdin());
    let mut stdout = io::stdout();
    run_with(agent, stdin, &mut stdout).await
}

pub async fn run_with<B, R, W>(agent: &Agent<B>, input: R, output: &mut W) -> Result<(), StdioError>
where
    B: CompletionBackend,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    let mut state = SessionState::default();

    write_line(output, "Interactive chat. Type /help for commands, /quit to exit.").await?;

    loop {
        output.write_all(b"you> ").await?;
        output.flush().await?;

        let Some(line) = lines.next_line().await? else {
            write_line(output, "").await?;
            break;
        };

        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        if input.starts_with('/') {
            match handle_command(input, &mut state, agent, output).await? {
                LoopControl::Continue => continue,
                LoopControl::Exit => break,
            }
        } else {
            handle_prompt(agent, &mut state, input, output).await?;
        }
    }

    output.flush().await?;
    Ok(())
}

async fn handle_command<B, W>(
    input: &str,
    state: &mut SessionState,
    agent: &Agent<B>,
    output: &mut W,
) -> Result<LoopControl, StdioError>
where
    B: CompletionBackend,
    W: AsyncWrite + Unpin,
{
    match input {
        "/quit" | "/exit" => {
            write_line(output, "Bye.").await?;
            Ok(LoopControl::Exit)
        }
        "/clear" => {
            let turns = state.turns();
            state.reset();
            info!(turns, "Conversation history cleared");
            write_line(output, "Conversation cleared.").await?;
            Ok(LoopControl::Continue)
        }
        "/tools" => {
            match agent.tools().tools().await {
                Ok(tools) => {
                    for tool in tools {
                        write_line(output, &format!("  {}  {}", tool.namespaced_name, tool.description))
                            .await?;
                    }
                    write_line(output, &format!("{} tools available.", tools.len())).await?;
                }
                Err(err) => write_line(output, &format!("Error: {}", err.user_message())).await?,
            }
            Ok(LoopControl::Continue)
        }
        "/help" => {
            write_line(output, "Commands:").await?;
            write_line(output, "  /clear   forget the conversation so far").await?;
            write_line(output, "  /tools   list available tools").await?;
            write_line(output, "  /quit    exit").await?;
            Ok(LoopControl::Continue)
        }
        other => {
            write_line(output, &format!("Unknown command {other}. Type /help.")).await?;
            Ok(LoopControl::Continue)
        }
    }
}

async fn handle_prompt<B, W>(
    agent: &Agent<B>,
    state: &mut SessionState,
    input: &str,
    output: &mut W,
) -> Result<(), StdioError>
where
    B: CompletionBackend,
    W: AsyncWrite + Unpin,
{
    match agent.chat(input, state.history.take()).await {
        Ok(outcome) => {
            state.history = Some(outcome.conversation);
            write_line(output, &format!("\nassistant> {}\n", outcome.response)).await?;
        }
        Err(err) => {
            warn!(error = %err, "Chat turn failed");
            write_line(output, &format!("\nError: {}\n", err.user_message())).await?;
        }
    }
    Ok(())
}

async fn write_line<W: AsyncWrite + Unpin>(output: &mut W, text: &str) -> Result<(), StdioError> {
    output.write_all(text.as_bytes()).await?;
    output.write_all(b"\n").await?;
    Ok(())
}
