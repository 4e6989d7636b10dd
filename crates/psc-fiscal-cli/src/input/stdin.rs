use std::io::{self, Read};

/// Text piped into stdin. `None` when stdin is a terminal or carries
/// only whitespace.
pub fn read_piped() -> io::Result<Option<String>> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }
    let mut text = String::new();
    io::stdin().lock().read_to_string(&mut text)?;
    if text.trim().is_empty() {
        tracing::debug!("stdin is empty");
        return Ok(None);
    }
    Ok(Some(text))
}
