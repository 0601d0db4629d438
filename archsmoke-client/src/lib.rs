//! Archsmoke collaborator clients
//!
//! Thin, typed wrappers around the three external commands the orchestrator
//! drives:
//!
//! - [`ImageLookupClient`]: resolves the image for a release stream and architecture
//! - [`RemoteRunClient`]: triggers a remote test run and waits for it
//! - [`ReportClient`]: queries for prior reports and submits new ones
//!
//! Every client streams the subprocess's combined output, line by line in
//! arrival order, into an [`OutputSink`] and also returns it as text.
//!
//! # Example
//!
//! ```no_run
//! use archsmoke_client::{CommandSpec, ImageLookupClient};
//!
//! #[tokio::main]
//! async fn main() -> archsmoke_client::Result<()> {
//!     let lookup = ImageLookupClient::new("./get_image_names.py".parse::<CommandSpec>()?);
//!     let mut log = Vec::new();
//!     let image = lookup.resolve("rawhide", "x86_64", &mut log).await?;
//!     println!("resolved {}", image);
//!     Ok(())
//! }
//! ```

pub mod error;
mod lookup;
mod process;
mod remote_run;
mod reporting;

// Re-export commonly used types
pub use error::{ClientError, Result};
pub use lookup::ImageLookupClient;
pub use process::{OutputSink, ProcessOutput, run_captured};
pub use remote_run::{RemoteRunClient, RemoteRunRequest};
pub use reporting::{ReportClient, Submission};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A program plus the leading arguments it is always invoked with
///
/// Parsed from a string such as `"python3 ./tft-wait.py"`; per-call
/// arguments are appended after these. Words are split on whitespace with
/// shell-like quoting: `'...'` is literal, and outside quotes or inside
/// `"..."` a backslash escapes the next character. No other shell expansion
/// takes place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandSpec {
    /// Create a command with no leading arguments
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Append a leading argument
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }
}

impl FromStr for CommandSpec {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self> {
        let mut parts = split_words(s)?.into_iter();
        let program = parts
            .next()
            .ok_or_else(|| ClientError::InvalidCommand("command cannot be empty".to_string()))?;

        Ok(Self {
            program,
            args: parts.collect(),
        })
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_word(f, &self.program)?;
        for arg in &self.args {
            f.write_str(" ")?;
            write_word(f, arg)?;
        }
        Ok(())
    }
}

fn split_words(s: &str) -> Result<Vec<String>> {
    let mut words = Vec::new();
    let mut word = String::new();
    let mut in_word = false;
    let mut quote: Option<char> = None;
    let mut chars = s.chars();

    while let Some(c) = chars.next() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (None | Some('"'), '\\') => {
                let escaped = chars.next().ok_or_else(|| {
                    ClientError::InvalidCommand(format!("trailing backslash in '{}'", s))
                })?;
                word.push(escaped);
                in_word = true;
            }
            (Some(_), c) => word.push(c),
            (None, '\'' | '"') => {
                quote = Some(c);
                in_word = true;
            }
            (None, c) if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut word));
                    in_word = false;
                }
            }
            (None, c) => {
                word.push(c);
                in_word = true;
            }
        }
    }

    if quote.is_some() {
        return Err(ClientError::InvalidCommand(format!(
            "unterminated quote in '{}'",
            s
        )));
    }
    if in_word {
        words.push(word);
    }
    Ok(words)
}

/// Writes `word` so that parsing it back yields the same word
fn write_word(f: &mut fmt::Formatter<'_>, word: &str) -> fmt::Result {
    let plain = !word.is_empty()
        && !word
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '\'' | '"' | '\\'));
    if plain {
        f.write_str(word)
    } else {
        write!(f, "'{}'", word.replace('\'', "'\\''"))
    }
}
