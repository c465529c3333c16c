//! Per-extension comment lexing (C2 half one, SPEC_FULL.md §4.2). Only the
//! *interior* text of a comment is handed to the directive extractor; a line
//! with no comment marker on it contributes nothing.

/// A line's worth of comment interior text, tagged with its 1-based source
/// line number.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommentLine {
    pub line: u32,
    pub text: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommentSyntax {
    /// `// ...` and `/* ... */`.
    CLike,
    /// `# ...` to end of line.
    Hash,
}

/// Select a comment syntax by file extension (no leading dot). Unrecognized
/// extensions fall back to the C-like family; `.bzl` is explicitly a Hash
/// family member even though it looks like a build-tool oddball.
pub fn syntax_for_extension(ext: &str) -> CommentSyntax {
    match ext {
        "ts" | "js" | "java" | "c" | "cc" | "cpp" | "h" | "hpp" | "cs" | "go" | "rs" | "swift"
        | "kt" | "kts" | "scala" | "php" => CommentSyntax::CLike,
        "py" | "rb" | "sh" | "bash" | "zsh" | "bzl" => CommentSyntax::Hash,
        _ => CommentSyntax::CLike,
    }
}

pub fn extract_comment_lines(source: &str, syntax: CommentSyntax) -> Vec<CommentLine> {
    match syntax {
        CommentSyntax::Hash => extract_hash_lines(source),
        CommentSyntax::CLike => extract_c_like_lines(source),
    }
}

fn extract_hash_lines(source: &str) -> Vec<CommentLine> {
    let mut out = Vec::new();
    for (i, raw) in source.lines().enumerate() {
        if let Some(idx) = raw.find('#') {
            out.push(CommentLine {
                line: (i + 1) as u32,
                text: raw[idx + 1..].to_string(),
            });
        }
    }
    out
}

fn extract_c_like_lines(source: &str) -> Vec<CommentLine> {
    let mut out = Vec::new();
    let mut in_block = false;
    for (i, raw) in source.lines().enumerate() {
        let line_no = (i + 1) as u32;
        if in_block {
            if let Some(end) = raw.find("*/") {
                out.push(CommentLine {
                    line: line_no,
                    text: raw[..end].to_string(),
                });
                in_block = false;
            } else {
                out.push(CommentLine {
                    line: line_no,
                    text: raw.to_string(),
                });
            }
            continue;
        }

        let line_comment = raw.find("//");
        let block_comment = raw.find("/*");
        match (line_comment, block_comment) {
            (Some(lc), Some(bc)) if bc < lc => {
                push_block_open(&mut out, &mut in_block, raw, bc, line_no)
            }
            (Some(lc), _) => out.push(CommentLine {
                line: line_no,
                text: raw[lc + 2..].to_string(),
            }),
            (None, Some(bc)) => push_block_open(&mut out, &mut in_block, raw, bc, line_no),
            (None, None) => {}
        }
    }
    out
}

fn push_block_open(
    out: &mut Vec<CommentLine>,
    in_block: &mut bool,
    raw: &str,
    open_idx: usize,
    line_no: u32,
) {
    let after_open = &raw[open_idx + 2..];
    if let Some(end) = after_open.find("*/") {
        out.push(CommentLine {
            line: line_no,
            text: after_open[..end].to_string(),
        });
    } else {
        out.push(CommentLine {
            line: line_no,
            text: after_open.to_string(),
        });
        *in_block = true;
    }
}
