use std::io::{self, BufRead, Write};

use form_spec::{Host, NoticeKind};

/// Prompts on stdout and reads answers from stdin; notices go to stderr.
pub struct TerminalHost {
    assume_yes: bool,
}

impl TerminalHost {
    pub fn new(assume_yes: bool) -> Self {
        Self { assume_yes }
    }
}

impl Host for TerminalHost {
    fn confirm(&mut self, prompt: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        let stdin = io::stdin();
        loop {
            print!("{} (y/n) [N]: ", prompt.trim());
            if io::stdout().flush().is_err() {
                return false;
            }
            let mut line = String::new();
            match stdin.lock().read_line(&mut line) {
                Ok(0) | Err(_) => return false,
                Ok(_) => {}
            }
            match parse_answer(&line) {
                Some(answer) => return answer,
                None => println!("Invalid answer '{}'. Expected yes or no.", line.trim()),
            }
        }
    }

    fn notify(&mut self, message: &str, kind: NoticeKind) {
        match kind {
            NoticeKind::Success => eprintln!("✔ {}", message),
            NoticeKind::Error => eprintln!("✖ {}", message),
            NoticeKind::Info => eprintln!("{}", message),
        }
    }
}

fn parse_answer(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "" | "n" | "no" => Some(false),
        "y" | "yes" => Some(true),
        _ => None,
    }
}
