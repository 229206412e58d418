//! grep tool - literal recursive search with context lines

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use grep_regex::RegexMatcherBuilder;
use grep_searcher::SearcherBuilder;
use grep_searcher::sinks::Lossy;
use serde::Serialize;
use serde_json::{Value, json};
use tracing::debug;
use walkdir::WalkDir;

use crate::llm::Arguments;
use crate::tools::traits::params;
use crate::tools::{Tool, ToolError};

/// Files larger than this are not searched
const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// A NUL byte this early marks a file as binary
const BINARY_SNIFF_LEN: usize = 512;

/// Upper bounds for the numeric arguments
const MAX_CONTEXT_LINES: usize = 100;
const MAX_RESULTS_LIMIT: usize = 1000;

/// Search for a literal string in files under a directory
pub struct GrepTool;

#[derive(Debug, Serialize)]
struct GrepResult {
    pattern: String,
    path: String,
    case_sensitive: bool,
    context_lines: usize,
    match_count: usize,
    truncated: bool,
    matches: Vec<GrepMatch>,
}

#[derive(Debug, Serialize)]
struct GrepMatch {
    file: String,
    line: u64,
    matched_line: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    before: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    after: Vec<String>,
}

#[derive(Debug, Clone, Copy)]
struct SearchOptions {
    context_lines: usize,
    max_results: usize,
}

#[async_trait]
impl Tool for GrepTool {
    fn name(&self) -> &str {
        "grep"
    }

    fn description(&self) -> &str {
        "Search for a string pattern recursively in files within a directory"
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "required": ["pattern"],
            "properties": {
                "pattern": {
                    "type": "string",
                    "description": "The string pattern to search for"
                },
                "path": {
                    "type": "string",
                    "description": "The directory path to search in (default: current directory)"
                },
                "context_lines": {
                    "type": "number",
                    "description": "Number of context lines before and after match (default: 2)"
                },
                "case_sensitive": {
                    "type": "boolean",
                    "description": "Whether search should be case sensitive (default: true)"
                },
                "max_results": {
                    "type": "number",
                    "description": "Maximum number of matches to return (default: 100)"
                }
            }
        })
    }

    async fn execute(&self, args: &Arguments) -> Result<String, ToolError> {
        debug!(?args, "GrepTool::execute: called");
        let pattern = params::required_non_empty(args, "pattern")?;
        let path = params::opt_str(args, "path").unwrap_or(".");
        let case_sensitive = params::opt_bool(args, "case_sensitive").unwrap_or(true);
        let options = SearchOptions {
            context_lines: bounded_count(params::opt_f64(args, "context_lines"), 2, MAX_CONTEXT_LINES),
            max_results: bounded_count(params::opt_f64(args, "max_results"), 100, MAX_RESULTS_LIMIT),
        };
        debug!(%pattern, %path, %case_sensitive, context_lines = %options.context_lines, max_results = %options.max_results, "GrepTool::execute: parameters parsed");

        tokio::fs::metadata(path)
            .await
            .map_err(|e| ToolError::io("cannot access path", e))?;

        let matches = {
            let pattern = pattern.to_string();
            let root = PathBuf::from(path);
            tokio::task::spawn_blocking(move || search(&pattern, &root, case_sensitive, &options))
                .await
                .map_err(|e| ToolError::Failed(format!("search task failed: {}", e)))??
        };
        debug!(match_count = %matches.len(), "GrepTool::execute: search complete");

        let result = GrepResult {
            pattern: pattern.to_string(),
            path: path.to_string(),
            case_sensitive,
            context_lines: options.context_lines,
            match_count: matches.len(),
            truncated: matches.len() >= options.max_results,
            matches,
        };
        Ok(serde_json::to_string(&result)?)
    }
}

/// Whole, non-negative count capped at `max`; NaN falls back to zero
fn bounded_count(value: Option<f64>, default: usize, max: usize) -> usize {
    match value {
        Some(n) if n.is_nan() => 0,
        Some(n) => n.clamp(0.0, max as f64) as usize,
        None => default.min(max),
    }
}

fn search(pattern: &str, root: &Path, case_sensitive: bool, options: &SearchOptions) -> Result<Vec<GrepMatch>, ToolError> {
    let matcher = RegexMatcherBuilder::new()
        .case_insensitive(!case_sensitive)
        .build(&regex::escape(pattern))
        .map_err(|e| ToolError::Failed(format!("search failed: {}", e)))?;
    let mut searcher = SearcherBuilder::new().line_number(true).build();

    let mut matches = Vec::new();
    let files = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file());

    for entry in files {
        if matches.len() >= options.max_results {
            debug!("search: max results reached");
            break;
        }

        let Some(content) = read_searchable(entry.path()) else {
            continue;
        };

        let mut line_numbers = Vec::new();
        let remaining = options.max_results - matches.len();
        let searched = searcher.search_slice(
            &matcher,
            &content,
            Lossy(|line_num, _line| {
                line_numbers.push(line_num);
                Ok(line_numbers.len() < remaining)
            }),
        );
        if let Err(e) = searched {
            debug!(path = ?entry.path(), %e, "search: skipping file");
            continue;
        }
        if line_numbers.is_empty() {
            continue;
        }

        let text = String::from_utf8_lossy(&content);
        let lines: Vec<&str> = text.lines().collect();
        let file = entry.path().display().to_string();
        for line_num in line_numbers {
            matches.push(with_context(&file, &lines, line_num, options.context_lines));
        }
    }

    Ok(matches)
}

/// File contents, or None for unreadable, oversized and binary files
fn read_searchable(path: &Path) -> Option<Vec<u8>> {
    let meta = std::fs::metadata(path).ok()?;
    if meta.len() > MAX_FILE_SIZE {
        debug!(?path, size = %meta.len(), "read_searchable: file too large");
        return None;
    }

    let content = std::fs::read(path).ok()?;
    let sniff = &content[..content.len().min(BINARY_SNIFF_LEN)];
    if sniff.contains(&0) {
        debug!(?path, "read_searchable: binary file");
        return None;
    }
    Some(content)
}

fn with_context(file: &str, lines: &[&str], line_num: u64, context_lines: usize) -> GrepMatch {
    let idx = (line_num as usize).saturating_sub(1);
    let start = idx.saturating_sub(context_lines);
    let end = idx.saturating_add(context_lines).saturating_add(1).min(lines.len());

    GrepMatch {
        file: file.to_string(),
        line: line_num,
        matched_line: lines.get(idx).copied().unwrap_or_default().to_string(),
        before: lines.get(start..idx).unwrap_or_default().iter().map(|l| l.to_string()).collect(),
        after: lines.get(idx.saturating_add(1)..end).unwrap_or_default().iter().map(|l| l.to_string()).collect(),
    }
}
