pub mod file;
pub mod stdin;

use serde::de::DeserializeOwned;

/// Syntax of an input document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Yaml,
    /// JSON when the text opens with a brace or bracket, YAML otherwise
    Sniff,
}

impl Format {
    fn resolve(self, text: &str) -> Format {
        match self {
            Format::Sniff => match text.trim_start().chars().next() {
                Some('{') | Some('[') => Format::Json,
                _ => Format::Yaml,
            },
            known => known,
        }
    }
}

/// Parse `text` into `T`. `source` names the input in error messages.
pub fn parse_document<T: DeserializeOwned>(
    text: &str,
    format: Format,
    source: &str,
) -> Result<T, Box<dyn std::error::Error>> {
    let format = format.resolve(text);
    tracing::debug!(source, ?format, bytes = text.len(), "parsing input document");
    let parsed = match format {
        Format::Yaml => serde_yaml::from_str(text).map_err(|e| e.to_string()),
        _ => serde_json::from_str(text).map_err(|e| e.to_string()),
    };
    parsed.map_err(|e| format!("Failed to parse {source} as {format:?}: {e}").into())
}

/// Read a document from `--input`, falling back to piped stdin.
pub fn read_document<T: DeserializeOwned>(
    path: Option<&str>,
    what: &str,
) -> Result<T, Box<dyn std::error::Error>> {
    if let Some(path) = path {
        return file::read_document(path);
    }
    match stdin::read_piped()? {
        Some(text) => parse_document(&text, Format::Sniff, "stdin"),
        None => Err(format!("--input <file.json|file.yaml> or stdin required for {what}").into()),
    }
}
