use std::io::{self, BufRead, Write};

use crate::pipeline::{PipelineError, run_source};
use crate::runtime::VmConfig;

pub const PROMPT: &str = ">> ";

/// Read-eval-print loop: each input line goes through the whole pipeline on
/// its own. Returns when `input` reaches end of file.
pub fn start<R: BufRead, W: Write>(mut input: R, output: &mut W, config: &VmConfig) -> io::Result<()> {
    let mut line = String::new();

    loop {
        write!(output, "{}", PROMPT)?;
        output.flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            return Ok(());
        }

        match run_source(&line, config) {
            Ok(Some(value)) => writeln!(output, "{}", value)?,
            Ok(None) => {}
            Err(PipelineError::Parse(errors)) => {
                for err in errors {
                    writeln!(output, "\t{}", err)?;
                }
            }
            Err(err) => writeln!(output, "{}", err)?,
        }
    }
}
