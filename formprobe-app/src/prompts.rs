//! Console prompts and the interactive [`Operator`] implementation.
//!
//! All operator-facing text goes to stdout; logging stays on the file sink
//! so the prompt flow is not interleaved with tracing output.

use std::io::{self, Write};

use async_trait::async_trait;
use formprobe_engine::capability::{Operator, OperatorDecision};

/// Print `msg` and read one trimmed line from stdin.
pub fn prompt(msg: &str) -> io::Result<String> {
    print!("{msg}");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

/// Like [`prompt`], but an empty answer means "skip".
pub fn prompt_optional(msg: &str) -> io::Result<Option<String>> {
    let answer = prompt(msg)?;
    Ok((!answer.is_empty()).then_some(answer))
}

/// Like [`prompt`], with a default for an empty answer.
pub fn prompt_with_default(msg: &str, default: &str) -> io::Result<String> {
    let answer = prompt(msg)?;
    Ok(if answer.is_empty() {
        default.to_string()
    } else {
        answer
    })
}

/// Operator backed by stdin/stdout.
pub struct ConsoleOperator;

#[async_trait]
impl Operator for ConsoleOperator {
    async fn checkpoint(&mut self, msg: &str) -> OperatorDecision {
        println!("\n{msg}");
        match prompt("Press Enter to continue (or type 'exit' to stop): ") {
            Ok(answer) if answer.eq_ignore_ascii_case("exit") => OperatorDecision::Abort,
            Ok(_) => OperatorDecision::Continue,
            // A closed stdin cannot confirm anything; stop cleanly.
            Err(_) => OperatorDecision::Abort,
        }
    }

    fn progress(&mut self, index: usize, total: usize, candidate: &str) {
        println!("[{index}/{total}] trying: {candidate}");
    }
}
