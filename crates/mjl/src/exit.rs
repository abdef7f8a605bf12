use std::process::ExitCode;

/// Outcome of a command: an exit status plus an optional closing message.
///
/// Commands return this instead of printing and exiting inline, so the
/// message lands after all diagnostic output and the status is set in
/// exactly one place.
#[derive(Debug)]
pub struct Exit {
    code: u8,
    message: Option<String>,
}

impl Exit {
    pub fn success() -> Self {
        Self {
            code: 0,
            message: None,
        }
    }

    pub fn error() -> Self {
        Self {
            code: 1,
            message: None,
        }
    }

    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Print the closing message, if any, and produce the exit code.
    pub fn finish(self) -> ExitCode {
        if let Some(message) = &self.message {
            if self.code == 0 {
                println!("{message}");
            } else {
                eprintln!("{message}");
            }
        }
        ExitCode::from(self.code)
    }
}
