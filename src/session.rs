use std::fs;
use std::io::{self, BufRead, StdinLock, Stdout, Write};

use tracing::{debug, info};

use crate::config::{Layout, Session};
use crate::error::{Error, Result};

const PROMPT: &str = "Please paste the value of your session cookie> ";

/// A line-oriented source of user input.
pub trait Prompt {
    /// Shows `message` and blocks for the next line. `None` once input is exhausted.
    fn read_line(&mut self, message: &str) -> io::Result<Option<String>>;
}

pub struct TerminalPrompt<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> TerminalPrompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl TerminalPrompt<StdinLock<'static>, Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Prompt for TerminalPrompt<R, W> {
    fn read_line(&mut self, message: &str) -> io::Result<Option<String>> {
        write!(self.output, "{message}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let len = line.trim_end_matches(['\r', '\n']).len();
        line.truncate(len);
        Ok(Some(line))
    }
}

/// Resolves the session: explicit value first, then the persisted file, then
/// the prompt. A prompted value is written to the session file before it is
/// returned.
pub fn resolve(explicit: Option<String>, layout: &Layout, prompt: &mut dyn Prompt) -> Result<Session> {
    if let Some(value) = explicit.filter(|v| !v.is_empty()) {
        debug!("using session from the command line");
        return Ok(Session::new(value));
    }

    let path = layout.session_file();
    if path.exists() {
        let stored = fs::read_to_string(&path).map_err(|source| Error::CredentialIo {
            path: path.clone(),
            source,
        })?;
        let stored = stored.trim_end_matches(['\r', '\n']);
        if !stored.is_empty() {
            debug!(path = %path.display(), "using persisted session");
            return Ok(Session::new(stored));
        }
    }

    let line = loop {
        match prompt.read_line(PROMPT).map_err(Error::Prompt)? {
            Some(line) if !line.is_empty() => break line,
            Some(_) => continue,
            None => {
                return Err(Error::Prompt(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "input closed before a session was entered",
                )))
            }
        }
    };

    fs::write(&path, &line).map_err(|source| Error::CredentialIo {
        path: path.clone(),
        source,
    })?;
    info!(path = %path.display(), "session saved");
    Ok(Session::new(line))
}
