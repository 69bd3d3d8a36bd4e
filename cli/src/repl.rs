use std::io::{BufRead, Write};

pub const PROMPT: &str = "stormclock> ";

/// Read one line from stdin after printing the prompt.
/// Returns None at end of input.
pub fn readline() -> Result<Option<String>, String> {
    let mut out = std::io::stdout();
    write!(out, "{PROMPT}").map_err(|e| e.to_string())?;
    out.flush().map_err(|e| e.to_string())?;

    let mut buffer = String::new();
    let read = std::io::stdin()
        .lock()
        .read_line(&mut buffer)
        .map_err(|e| e.to_string())?;
    if read == 0 {
        return Ok(None);
    }
    Ok(Some(buffer))
}
