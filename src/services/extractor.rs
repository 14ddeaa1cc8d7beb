use pulldown_cmark::{Event, Parser, Tag, TagEnd};
use serde_json::Value;

use crate::errors::{AppError, AppResult};
use crate::services::gateway::Attachment;

/// What the extractor hands the rest of the pipeline: plain text that can be
/// embedded in a prompt, or raw bytes forwarded to a multimodal model as an
/// inline attachment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExtractedContent {
    Text(String),
    Attachment(Attachment),
}

/// Converts an uploaded file into pipeline input, dispatching on the file
/// extension. Pure per call, no shared state.
pub fn extract_content(file_name: &str, bytes: &[u8]) -> AppResult<ExtractedContent> {
    let extension = file_name
        .rsplit('.')
        .next()
        .filter(|ext| *ext != file_name)
        .unwrap_or_default()
        .to_lowercase();

    match extension.as_str() {
        "txt" | "text" => Ok(ExtractedContent::Text(decode_utf8(bytes)?)),
        "md" | "markdown" => Ok(ExtractedContent::Text(markdown_to_text(&decode_utf8(
            bytes,
        )?))),
        "json" => json_to_text(bytes).map(ExtractedContent::Text),
        // binary formats a multimodal model can read directly
        "pdf" => Ok(attachment("application/pdf", bytes)),
        "png" => Ok(attachment("image/png", bytes)),
        "jpg" | "jpeg" => Ok(attachment("image/jpeg", bytes)),
        "webp" => Ok(attachment("image/webp", bytes)),
        "gif" => Ok(attachment("image/gif", bytes)),
        "docx" | "xlsx" => Err(AppError::FileParse(format!(
            "Unsupported file format '.{}': convert to PDF, Markdown or plain text first",
            extension
        ))),
        _ => Err(AppError::FileParse(format!(
            "Unsupported file format '.{}'",
            extension
        ))),
    }
}

fn decode_utf8(bytes: &[u8]) -> AppResult<String> {
    String::from_utf8(bytes.to_vec())
        .map_err(|_| AppError::FileParse("File is not valid UTF-8 text".to_string()))
}

fn attachment(mime_type: &str, bytes: &[u8]) -> ExtractedContent {
    use base64::Engine;
    ExtractedContent::Attachment(Attachment {
        mime_type: mime_type.to_string(),
        data_base64: base64::engine::general_purpose::STANDARD.encode(bytes),
    })
}

/// Reduces Markdown to plain text, keeping headings, paragraphs, list items
/// and table cells as separate lines.
fn markdown_to_text(markdown: &str) -> String {
    let mut out = String::new();
    for event in Parser::new(markdown) {
        match event {
            Event::Text(text) | Event::Code(text) => out.push_str(&text),
            Event::SoftBreak | Event::HardBreak => out.push(' '),
            Event::Start(Tag::Item) => out.push_str("- "),
            Event::End(
                TagEnd::Paragraph
                | TagEnd::Heading(_)
                | TagEnd::Item
                | TagEnd::TableCell
                | TagEnd::CodeBlock,
            ) => out.push('\n'),
            _ => {}
        }
    }
    out.trim().to_string()
}

/// Flattens a JSON document into `path: value` lines so the model sees every
/// leaf with its context.
fn json_to_text(bytes: &[u8]) -> AppResult<String> {
    let value: Value = serde_json::from_slice(bytes)
        .map_err(|e| AppError::FileParse(format!("Invalid JSON file: {}", e)))?;

    let mut lines = Vec::new();
    flatten_json(&value, "", &mut lines);
    Ok(lines.join("\n"))
}

fn flatten_json(value: &Value, path: &str, out: &mut Vec<String>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                let child_path = if path.is_empty() {
                    key.clone()
                } else {
                    format!("{}.{}", path, key)
                };
                flatten_json(child, &child_path, out);
            }
        }
        Value::Array(items) => {
            for (i, child) in items.iter().enumerate() {
                flatten_json(child, &format!("{}[{}]", path, i), out);
            }
        }
        Value::String(s) => out.push(format!("{}: {}", path, s)),
        other => out.push(format!("{}: {}", path, other)),
    }
}
