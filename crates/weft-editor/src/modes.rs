//! Syntax mode lookup by mimetype and by file name.

struct ModeInfo {
    mode: &'static str,
    mimes: &'static [&'static str],
    extensions: &'static [&'static str],
}

const MODES: &[ModeInfo] = &[
    ModeInfo {
        mode: "python",
        mimes: &["text/x-python"],
        extensions: &["py", "pyw"],
    },
    ModeInfo {
        mode: "javascript",
        mimes: &["text/javascript", "application/javascript", "application/json"],
        extensions: &["js", "mjs", "json"],
    },
    ModeInfo {
        mode: "typescript",
        mimes: &["application/typescript"],
        extensions: &["ts", "tsx"],
    },
    ModeInfo {
        mode: "css",
        mimes: &["text/css"],
        extensions: &["css"],
    },
    ModeInfo {
        mode: "htmlmixed",
        mimes: &["text/html"],
        extensions: &["html", "htm"],
    },
    ModeInfo {
        mode: "markdown",
        mimes: &["text/x-markdown"],
        extensions: &["md", "markdown"],
    },
    ModeInfo {
        mode: "julia",
        mimes: &["text/x-julia"],
        extensions: &["jl"],
    },
    ModeInfo {
        mode: "r",
        mimes: &["text/x-rsrc"],
        extensions: &["r", "R"],
    },
    ModeInfo {
        mode: "rust",
        mimes: &["text/x-rustsrc"],
        extensions: &["rs"],
    },
    ModeInfo {
        mode: "shell",
        mimes: &["text/x-sh"],
        extensions: &["sh", "bash"],
    },
    ModeInfo {
        mode: "text",
        mimes: &["text/plain"],
        extensions: &["txt", "text"],
    },
];

pub fn mode_for_mime(mimetype: &str) -> Option<&'static str> {
    if mimetype.is_empty() {
        return None;
    }
    MODES
        .iter()
        .find(|info| info.mimes.contains(&mimetype))
        .map(|info| info.mode)
}

/// The mode for `name` from its extension, if any. Only the last path
/// segment is considered.
pub fn mode_for_file_name(name: &str) -> Option<&'static str> {
    let base = name.rsplit('/').next().unwrap_or(name);
    let (stem, extension) = base.rsplit_once('.')?;
    if stem.is_empty() && !base[1..].contains('.') {
        // dotfiles such as ".bashrc" have no extension
        return None;
    }
    MODES
        .iter()
        .find(|info| info.extensions.contains(&extension))
        .map(|info| info.mode)
}
