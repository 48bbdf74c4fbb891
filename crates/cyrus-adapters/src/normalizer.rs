// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `RunnerEventNormalizer` (spec §4.6): the shared helpers every runner
//! adapter uses to turn a vendor-specific stream into the uniform
//! `RunnerEvent` shape — cumulative-text accumulation, per-tool
//! parameter/result formatting, and final-marker stripping.

use cyrus_core::RunnerEvent;

/// Sentinel prefix marking the canonical final response, stripped
/// before the text is posted (spec §4.6).
pub const LAST_MESSAGE_MARKER: &str = "___LAST_MESSAGE_MARKER___";

const RESULT_CHAR_CAP: usize = 10_000;

struct PendingText {
    part_id: String,
    text: String,
}

/// Accumulates cumulative text-delta snapshots under a single part id
/// so a runner that re-emits the whole running snapshot on every token
/// yields exactly one `Thought`/`Final` per part id, flushed when a
/// non-text event arrives, a different part id arrives, or the caller
/// signals session completion (spec §4.6).
#[derive(Default)]
pub struct RunnerEventNormalizer {
    pending: Option<PendingText>,
}

impl RunnerEventNormalizer {
    pub fn new() -> Self {
        Self { pending: None }
    }

    /// Feed one cumulative text snapshot for `part_id`. Returns the
    /// flushed event for any *previous* part id this snapshot displaced.
    pub fn feed_text_snapshot(&mut self, part_id: &str, cumulative_text: &str) -> Option<RunnerEvent> {
        match &mut self.pending {
            Some(pending) if pending.part_id == part_id => {
                pending.text = cumulative_text.to_string();
                None
            }
            Some(_) => {
                let flushed = self.flush();
                self.pending = Some(PendingText { part_id: part_id.to_string(), text: cumulative_text.to_string() });
                flushed
            }
            None => {
                self.pending = Some(PendingText { part_id: part_id.to_string(), text: cumulative_text.to_string() });
                None
            }
        }
    }

    /// Feed a non-text event, flushing any pending accumulated text
    /// first. Returns events in emission order.
    pub fn feed_non_text(&mut self, event: RunnerEvent) -> Vec<RunnerEvent> {
        let mut out = Vec::with_capacity(2);
        if let Some(flushed) = self.flush() {
            out.push(flushed);
        }
        out.push(event);
        out
    }

    /// Flush any pending accumulated text without feeding a new event —
    /// called when the session completes (spec §4.6 flush condition c).
    pub fn flush_on_completion(&mut self) -> Option<RunnerEvent> {
        self.flush()
    }

    fn flush(&mut self) -> Option<RunnerEvent> {
        self.pending.take().map(|pending| strip_final_marker(pending.text))
    }
}

/// Strip the `___LAST_MESSAGE_MARKER___` sentinel, if present, emitting
/// a `Final` rather than a `Thought` so callers can distinguish the
/// canonical final response from intermediate narration.
fn strip_final_marker(text: String) -> RunnerEvent {
    match text.strip_prefix(LAST_MESSAGE_MARKER) {
        Some(rest) => RunnerEvent::Final { text: rest.trim_start().to_string() },
        None => RunnerEvent::Thought { text },
    }
}

/// Render an MCP tool name (`mcp_{server}_{tool}`) as `Server: Tool
/// Words`, or `None` if `tool_name` isn't MCP-shaped.
pub fn format_mcp_tool_name(tool_name: &str) -> Option<String> {
    let rest = tool_name.strip_prefix("mcp_")?;
    let (server, tool) = rest.split_once('_')?;
    let title = |s: &str| {
        let mut c = s.chars();
        match c.next() {
            Some(first) => first.to_uppercase().collect::<String>() + c.as_str(),
            None => String::new(),
        }
    };
    let tool_words = tool.split('_').map(title).collect::<Vec<_>>().join(" ");
    Some(format!("{}: {}", title(server), tool_words))
}

/// Render a tool's input into the single-line parameter string shown
/// alongside an `Action` activity (spec §4.6). Unknown tools fall back
/// to compact JSON.
pub fn format_parameter(tool_name: &str, input: &serde_json::Value) -> Option<String> {
    match tool_name {
        "Read" => {
            let path = input.get("file_path")?.as_str()?;
            match (input.get("offset").and_then(|v| v.as_u64()), input.get("limit").and_then(|v| v.as_u64())) {
                (Some(offset), Some(limit)) => Some(format!("{path}:{}-{}", offset, offset + limit)),
                (Some(offset), None) => Some(format!("{path}:{offset}")),
                _ => Some(path.to_string()),
            }
        }
        "Bash" => {
            let command = input.get("command")?.as_str()?;
            match input.get("description").and_then(|v| v.as_str()) {
                Some(desc) if !desc.is_empty() => Some(format!("{command} ({desc})")),
                _ => Some(command.to_string()),
            }
        }
        "Grep" | "Glob" => {
            let pattern = input.get("pattern")?.as_str()?;
            match input.get("path").and_then(|v| v.as_str()) {
                Some(path) if !path.is_empty() => Some(format!("`{pattern}` in {path}")),
                _ => Some(format!("`{pattern}`")),
            }
        }
        "TodoWrite" => {
            let todos = input.get("todos")?.as_array()?;
            let lines: Vec<String> = todos
                .iter()
                .map(|t| {
                    let glyph = match t.get("status").and_then(|v| v.as_str()) {
                        Some("completed") => "✅",
                        Some("in_progress") => "🔄",
                        _ => "⏳",
                    };
                    let content = t.get("content").and_then(|v| v.as_str()).unwrap_or("");
                    format!("{glyph} {content}")
                })
                .collect();
            Some(lines.join("\n"))
        }
        _ => serde_json::to_string(input).ok().filter(|s| s != "{}" && s != "null"),
    }
}

/// Render a tool's raw output as the fenced-code-block `Result` body
/// (spec §4.6): language inferred from `file_ext` when known, truncated
/// at the last line break at or past 80% of the 10,000-character cap.
pub fn format_result(file_ext: Option<&str>, output: &str) -> String {
    let lang = file_ext.and_then(language_for_extension).unwrap_or("");
    let body = truncate_result(output);
    format!("```{lang}\n{body}\n```")
}

fn truncate_result(output: &str) -> String {
    let chars: Vec<char> = output.chars().collect();
    if chars.len() <= RESULT_CHAR_CAP {
        return output.to_string();
    }
    let truncated: String = chars[..RESULT_CHAR_CAP].iter().collect();
    let floor = (RESULT_CHAR_CAP as f64 * 0.8) as usize;
    let cut = truncated.rfind('\n').filter(|&idx| idx >= floor).unwrap_or(RESULT_CHAR_CAP);
    format!("{}\n… (truncated)", &truncated[..cut])
}

fn language_for_extension(ext: &str) -> Option<&'static str> {
    Some(match ext.trim_start_matches('.') {
        "rs" => "rust",
        "py" => "python",
        "js" | "mjs" | "cjs" => "javascript",
        "ts" | "tsx" => "typescript",
        "go" => "go",
        "rb" => "ruby",
        "java" => "java",
        "c" | "h" => "c",
        "cpp" | "cc" | "hpp" => "cpp",
        "json" => "json",
        "yaml" | "yml" => "yaml",
        "toml" => "toml",
        "md" => "markdown",
        "sh" | "bash" => "bash",
        "sql" => "sql",
        "html" => "html",
        "css" => "css",
        _ => return None,
    })
}

/// Reconstruct a unified diff from an `Edit` tool's `old_string`/
/// `new_string` (spec §4.6).
pub fn format_edit_diff(file_path: &str, old_string: &str, new_string: &str) -> String {
    let mut out = format!("--- {file_path}\n+++ {file_path}\n");
    for line in old_string.lines() {
        out.push('-');
        out.push_str(line);
        out.push('\n');
    }
    for line in new_string.lines() {
        out.push('+');
        out.push_str(line);
        out.push('\n');
    }
    out
}

#[cfg(test)]
#[path = "normalizer_tests.rs"]
mod tests;
