//! Interactive console prompts
//!
//! Every question the tool asks goes through the [`Console`] trait so the
//! credential and extraction flows can be driven by a script in tests. The
//! helpers here implement the prompt loops: y/n confirmations that repeat
//! until answered, required values that repeat until non-empty, and the
//! locator and worker-count prompts that repeat until they parse.

use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

use tokio::runtime::{Handle, RuntimeFlavor};
use tracing::debug;

use crate::app::StorageLocator;
use crate::constants::{extraction, prompts};
use crate::errors::LocatorError;

/// Line-oriented user interaction
pub trait Console: Send {
    /// Print `prompt` and read one line of input, without the line terminator.
    ///
    /// Returns `io::ErrorKind::UnexpectedEof` when input is exhausted.
    fn ask(&mut self, prompt: &str) -> io::Result<String>;

    /// Print an informational message
    fn say(&mut self, message: &str);
}

/// Console backed by the process stdin/stdout
#[derive(Debug, Default)]
pub struct StdConsole;

impl StdConsole {
    pub fn new() -> Self {
        Self
    }
}

impl Console for StdConsole {
    fn ask(&mut self, prompt: &str) -> io::Result<String> {
        print!("{}", prompt);
        io::stdout().flush()?;

        let mut line = String::new();
        let read = off_worker(|| io::stdin().lock().read_line(&mut line))?;
        if read == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "standard input closed",
            ));
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }

    fn say(&mut self, message: &str) {
        println!("{}", message);
    }
}

/// Run a blocking call without holding up the async runtime
///
/// On a multi-threaded runtime the calling worker hands its queued tasks and
/// the I/O and signal drivers to another thread while `call` blocks, so a
/// pending read on stdin cannot starve interrupt handling.
pub(crate) fn off_worker<T>(call: impl FnOnce() -> T) -> T {
    match Handle::try_current() {
        Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
            tokio::task::block_in_place(call)
        }
        _ => call(),
    }
}

/// Console that replays canned answers and records everything shown
#[derive(Debug, Default)]
pub struct ScriptedConsole {
    answers: VecDeque<String>,
    transcript: Vec<String>,
}

impl ScriptedConsole {
    /// Create a console that answers prompts in order
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            transcript: Vec::new(),
        }
    }

    /// Prompts and messages in the order they were shown
    pub fn transcript(&self) -> &[String] {
        &self.transcript
    }

    /// Whether any prompt or message contains `needle`
    pub fn printed(&self, needle: &str) -> bool {
        self.transcript.iter().any(|line| line.contains(needle))
    }

    /// Answers not consumed yet
    pub fn remaining(&self) -> usize {
        self.answers.len()
    }
}

impl Console for ScriptedConsole {
    fn ask(&mut self, prompt: &str) -> io::Result<String> {
        self.transcript.push(prompt.to_string());
        self.answers.pop_front().ok_or_else(|| {
            io::Error::new(io::ErrorKind::UnexpectedEof, "script exhausted")
        })
    }

    fn say(&mut self, message: &str) {
        self.transcript.push(message.to_string());
    }
}

/// Ask a yes/no question until the answer is `y` or `n`
pub fn confirm<C: Console + ?Sized>(console: &mut C, prompt: &str) -> io::Result<bool> {
    loop {
        let answer = console.ask(prompt)?.trim().to_lowercase();
        match answer.as_str() {
            "y" => return Ok(true),
            "n" => return Ok(false),
            other => debug!("Ignoring confirmation answer {:?}", other),
        }
    }
}

/// Ask for an optional value; blank input yields `None`
pub fn prompt_optional<C: Console + ?Sized>(
    console: &mut C,
    prompt: &str,
) -> io::Result<Option<String>> {
    let answer = console.ask(prompt)?;
    let answer = answer.trim();
    Ok((!answer.is_empty()).then(|| answer.to_string()))
}

/// Ask for the maximum number of concurrent downloads
///
/// Blank input selects `default`; anything that is not an integer between 1
/// and [`extraction::MAX_WORKERS`] is rejected and asked again.
pub fn prompt_worker_count<C: Console + ?Sized>(
    console: &mut C,
    default: usize,
) -> io::Result<usize> {
    let prompt = format!(
        "\nEnter max number of download workers (default {}) -> ",
        default
    );
    loop {
        let answer = console.ask(&prompt)?;
        let answer = answer.trim();
        if answer.is_empty() {
            return Ok(default);
        }
        match answer.parse::<usize>() {
            Ok(count) if (1..=extraction::MAX_WORKERS).contains(&count) => return Ok(count),
            _ => console.say(&format!(
                "\n** Worker count must be a whole number from 1 to {} **",
                extraction::MAX_WORKERS
            )),
        }
    }
}

/// Ask for an s3 URI until it parses into a [`StorageLocator`]
pub fn prompt_locator<C: Console + ?Sized>(console: &mut C) -> io::Result<StorageLocator> {
    loop {
        let input = console.ask(prompts::LOCATOR)?;
        match StorageLocator::parse(&input) {
            Ok(locator) => return Ok(locator),
            Err(LocatorError::Empty) => console.say("\n**s3 URI is required!**"),
            Err(e) => {
                debug!("Rejected locator {:?}: {}", input, e);
                console.say("\n** Error parsing s3 URI please try again **");
            }
        }
    }
}
