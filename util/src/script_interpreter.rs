//! # Command script interpreter module
//!
//! This module provides an interpreter for timed command scripts, allowing
//! driver commands to be replayed against the control software. Each script
//! line has the form `<time_s>: <command tokens>;`.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use regex::RegexBuilder;
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

// Internal
use crate::session::get_elapsed_seconds;
use veh_if::cmd::{parse_line, Cmd, CmdParseError};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A group of commands which is scripted to occur at a specific time.
pub struct ScriptedCmds {
    /// The time the commands are supposed to execute at
    exec_time_s: f64,

    /// The commands to run
    cmds: Vec<Cmd>,
}

/// A script interpreter.
///
/// After initialising with the path to the script to run use
/// `.get_pending_cmds` to acquire a list of commands that need executing.
pub struct ScriptInterpreter {
    _script_path: PathBuf,
    pending: VecDeque<ScriptedCmds>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("Could not find the script at {0}")]
    ScriptNotFound(String),

    #[error("Could not load the script: {0}")]
    ScriptLoadError(std::io::Error),

    #[error("The script is empty (or is so bad it can't be read)")]
    ScriptEmpty,

    #[error(
        "Script contains an invalid timestamp: {0}. \
        Should be a float (like 1.0)")]
    InvalidTimestamp(String),

    #[error("Script contains an invalid command at {0} s: {1}")]
    InvalidCmd(f64, CmdParseError),
}

pub enum PendingCmds {
    None,
    Some(Vec<Cmd>),
    EndOfScript,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ScriptInterpreter {
    /// Create a new interpreter from the given script path.
    pub fn new<P: AsRef<Path>>(script_path: P) -> Result<Self, ScriptError> {
        // Get the path in a buffer
        let path = PathBuf::from(script_path.as_ref());

        // Check that the script file exists.
        if !path.exists() {
            return Err(ScriptError::ScriptNotFound(
                path.to_str().unwrap().to_string(),
            ));
        }

        // Load the script into a string
        let script = match fs::read_to_string(script_path) {
            Ok(s) => s,
            Err(e) => return Err(ScriptError::ScriptLoadError(e)),
        };

        // Empty queue of commands
        let mut queue: VecDeque<ScriptedCmds> = VecDeque::new();

        // Go through the script executing __the magic regex__.
        let re = RegexBuilder::new(r"^\s*(\d+(\.\d+)?)\s*:\s*([^;]*);")
            .multi_line(true)
            .build()
            .unwrap();

        let mut num_caps = 0;

        for cap in re.captures_iter(&script) {
            // Parse the exec time
            let exec_time_s: f64 = match cap.get(1).unwrap().as_str().parse() {
                Ok(t) => t,
                Err(e) => {
                    return Err(ScriptError::InvalidTimestamp(format!("{}", e)))
                }
            };

            // Parse the command tokens from the payload
            let cmds = match parse_line(cap.get(3).unwrap().as_str()) {
                Ok(c) => c,
                Err(e) => return Err(ScriptError::InvalidCmd(exec_time_s, e)),
            };

            queue.push_back(ScriptedCmds { exec_time_s, cmds });

            num_caps += 1;
        }

        if num_caps == 0 {
            return Err(ScriptError::ScriptEmpty);
        }

        Ok(ScriptInterpreter {
            _script_path: path,
            pending: queue,
        })
    }

    /// Return a vector of pending commands, or `None` if no commands need
    /// executing now.
    pub fn get_pending_cmds(&mut self) -> PendingCmds {
        // If the queue is empty the script is over and we return the end of
        // script variant
        if self.pending.is_empty() {
            return PendingCmds::EndOfScript;
        }

        let mut cmd_vec: Vec<Cmd> = vec![];

        let current_time_s = get_elapsed_seconds();

        // Peek items from the queue, if the head's exec time is lower than
        // the current time add it to the vector, and keep adding commands
        // until the exec times are larger than the current time.
        while self
            .pending
            .front()
            .map(|c| c.exec_time_s < current_time_s)
            .unwrap_or(false)
        {
            cmd_vec.extend(self.pending.pop_front().unwrap().cmds);
        }

        // If the vector is longer than 0 return Some, otherwise None
        if !cmd_vec.is_empty() {
            PendingCmds::Some(cmd_vec)
        } else {
            PendingCmds::None
        }
    }

    /// Get the number of scripted command groups remaining
    pub fn get_num_cmds(&self) -> usize {
        self.pending.len()
    }

    /// Get the length of the script in seconds
    pub fn get_duration(&self) -> f64 {
        match self.pending.back() {
            Some(c) => c.exec_time_s,
            None => 0f64,
        }
    }
}
