//! MIME type lookup for file paths.
//!
//! Callers talk to a [`MimeDatabase`]; the host decides which one. The built-in
//! database follows the shared-mime-info model: filename globs first, then a
//! look at the first few kilobytes of content when no glob matches.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs::{self, File, FileType};
use std::io::Read;
use std::path::Path;

use serde::Serialize;
use tracing::debug;

use crate::globs::{is_literal, PatternSet};

pub const OCTET_STREAM: &str = "application/octet-stream";
pub const PLAIN_TEXT: &str = "text/plain";
pub const ZERO_SIZE: &str = "application/x-zerosize";
pub const DIRECTORY: &str = "inode/directory";
pub const FIFO: &str = "inode/fifo";
pub const CHAR_DEVICE: &str = "inode/chardevice";
pub const BLOCK_DEVICE: &str = "inode/blockdevice";
pub const SOCKET: &str = "inode/socket";

const UNKNOWN_COMMENT: &str = "unknown";

/// How much of a file is read when sniffing content.
const SNIFF_LEN: u64 = 8 * 1024;

/// A MIME type name with its human-readable description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MimeRecord {
    pub name: String,
    pub comment: String,
}

impl MimeRecord {
    pub fn new(name: impl Into<String>, comment: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            comment: comment.into(),
        }
    }

    /// The record returned when nothing better is known.
    pub fn unknown() -> Self {
        Self::new(OCTET_STREAM, UNKNOWN_COMMENT)
    }

    pub fn is_unknown(&self) -> bool {
        self.name == OCTET_STREAM
    }
}

/// Read-only MIME database queried by the classifiers.
pub trait MimeDatabase: Send + Sync {
    /// Best match for `path`. Never fails: unknown or missing files give
    /// [`MimeRecord::unknown`].
    fn mime_type_for_file(&self, path: &Path) -> MimeRecord;

    /// Record for a MIME name or one of its aliases.
    fn mime_type_for_name(&self, name: &str) -> Option<MimeRecord>;

    /// True when `name` is `ancestor` or a (transitive) sub-class of it.
    fn inherits(&self, name: &str, ancestor: &str) -> bool;
}

/// Resolves `path` against `db`.
pub fn resolve(db: &dyn MimeDatabase, path: &Path) -> MimeRecord {
    db.mime_type_for_file(path)
}

struct MimeType {
    name: &'static str,
    comment: &'static str,
    globs: &'static [&'static str],
    parents: &'static [&'static str],
    aliases: &'static [&'static str],
}

const fn mime(
    name: &'static str,
    comment: &'static str,
    globs: &'static [&'static str],
    parents: &'static [&'static str],
    aliases: &'static [&'static str],
) -> MimeType {
    MimeType {
        name,
        comment,
        globs,
        parents,
        aliases,
    }
}

const EXECUTABLE_TEXT: &[&str] = &["application/x-executable", PLAIN_TEXT];

static MIME_TYPES: &[MimeType] = &[
    mime(PLAIN_TEXT, "plain text document", &["*.txt", "*.asc"], &[], &[]),
    mime("text/markdown", "Markdown document", &["*.md", "*.mkd", "*.markdown"], &[], &["text/x-markdown"]),
    mime("text/x-log", "application log", &["*.log"], &[], &[]),
    mime("text/x-python", "Python script", &["*.py", "*.pyw", "*.pyi"], &[], &["text/x-python3", "application/x-python"]),
    mime("text/x-csrc", "C source code", &["*.c"], &[], &[]),
    mime("text/x-chdr", "C header", &["*.h"], &[], &[]),
    mime("text/x-c++src", "C++ source code", &["*.cpp", "*.cxx", "*.cc", "*.c++"], &["text/x-csrc"], &[]),
    mime("text/x-c++hdr", "C++ header", &["*.hpp", "*.hxx", "*.hh", "*.h++"], &["text/x-chdr"], &[]),
    mime("text/rust", "Rust source code", &["*.rs"], &[], &[]),
    mime("text/x-qml", "Qt Markup Language file", &["*.qml", "*.qmltypes", "*.qmlproject"], &[], &[]),
    mime("text/html", "HTML document", &["*.html", "*.htm"], &[], &[]),
    mime("text/css", "CSS stylesheet", &["*.css"], &[], &[]),
    mime("text/csv", "CSV document", &["*.csv"], &[], &[]),
    mime("text/x-makefile", "Makefile", &["makefile", "gnumakefile", "*.mk", "*.mak"], &[], &[]),
    mime("text/x-cmake", "CMake source code", &["CMakeLists.txt", "*.cmake"], &[], &[]),
    mime("text/x-patch", "differences between files", &["*.diff", "*.patch"], &[], &["text/x-diff"]),
    mime("application/sql", "SQL code", &["*.sql"], &[PLAIN_TEXT], &["text/x-sql"]),
    mime("application/x-subrip", "SubRip subtitles", &["*.srt"], &[PLAIN_TEXT], &[]),
    mime("application/rtf", "RTF document", &["*.rtf"], &[PLAIN_TEXT], &["text/rtf"]),
    mime("application/json", "JSON document", &["*.json"], &["application/javascript"], &[]),
    mime("application/x-yaml", "YAML document", &["*.yaml", "*.yml"], &[PLAIN_TEXT], &["application/yaml", "text/yaml", "text/x-yaml"]),
    mime("application/xml", "XML document", &["*.xml", "*.xsd", "*.xsl"], &[PLAIN_TEXT], &["text/xml"]),
    mime("image/svg+xml", "SVG image", &["*.svg"], &["application/xml"], &[]),
    mime("application/javascript", "JavaScript program", &["*.js", "*.mjs", "*.cjs"], &[PLAIN_TEXT], &["application/x-javascript", "text/javascript"]),
    mime("application/x-shellscript", "shell script", &["*.sh", "*.bash", "*.zsh"], EXECUTABLE_TEXT, &["application/x-sh", "text/x-sh", "text/x-shellscript"]),
    mime("application/x-perl", "Perl script", &["*.pl", "*.pm", "*.perl"], EXECUTABLE_TEXT, &["text/x-perl"]),
    mime("application/x-ruby", "Ruby script", &["*.rb"], EXECUTABLE_TEXT, &["text/x-ruby"]),
    mime("application/x-php", "PHP code", &["*.php", "*.php3", "*.php4", "*.phtml"], &[PLAIN_TEXT], &["text/x-php"]),
    mime("application/x-desktop", "desktop configuration file", &["*.desktop", "*.kdelnk"], &[PLAIN_TEXT], &[]),
    mime("application/toml", "TOML file", &["*.toml"], &[PLAIN_TEXT], &["application/x-toml"]),
    mime("application/x-ini", "INI configuration file", &["*.ini"], &[PLAIN_TEXT], &[]),
    mime("application/x-config", "configuration file", &["*.conf", "*.cfg"], &[PLAIN_TEXT], &[]),
    mime("application/vnd.oasis.opendocument.text", "ODT document", &["*.odt"], &["application/zip"], &[]),
    mime("application/pdf", "PDF document", &["*.pdf"], &[], &["application/x-pdf"]),
    mime("application/zip", "Zip archive", &["*.zip"], &[], &["application/x-zip-compressed"]),
    mime("application/gzip", "Gzip archive", &["*.gz"], &[], &["application/x-gzip"]),
    mime("application/x-tar", "Tar archive", &["*.tar"], &[], &[]),
    mime("application/x-compressed-tar", "Tar archive (gzip-compressed)", &["*.tar.gz", "*.tgz"], &["application/gzip"], &[]),
    mime("application/x-executable", "executable", &[], &[], &[]),
    mime("application/x-sharedlib", "shared library", &["*.so"], &[], &[]),
    mime("image/png", "PNG image", &["*.png"], &[], &[]),
    mime("image/jpeg", "JPEG image", &["*.jpg", "*.jpeg", "*.jpe"], &[], &[]),
    mime("image/gif", "GIF image", &["*.gif"], &[], &[]),
    mime("image/webp", "WebP image", &["*.webp"], &[], &[]),
    mime("audio/mpeg", "MP3 audio", &["*.mp3"], &[], &[]),
    mime("video/mp4", "MPEG-4 video", &["*.mp4", "*.m4v"], &[], &[]),
    mime(ZERO_SIZE, "empty document", &[], &[], &[]),
    mime(DIRECTORY, "folder", &[], &[], &[]),
    mime(FIFO, "pipe", &[], &[], &[]),
    mime(CHAR_DEVICE, "character special file", &[], &[], &[]),
    mime(BLOCK_DEVICE, "block device", &[], &[], &[]),
    mime(SOCKET, "socket", &[], &[], &[]),
    mime(OCTET_STREAM, UNKNOWN_COMMENT, &[], &[], &[]),
];

#[derive(Debug)]
struct GlobRule {
    pattern: String,
    mime: String,
    user: bool,
}

impl GlobRule {
    /// Ordering key: user overrides first, then exact names, then longer patterns.
    fn weight(&self) -> (bool, bool, usize) {
        (self.user, is_literal(&self.pattern), self.pattern.len())
    }
}

/// In-process MIME database with a fixed type table plus optional user globs.
pub struct BuiltinMimeDatabase {
    types: HashMap<&'static str, &'static MimeType>,
    aliases: HashMap<&'static str, &'static str>,
    rules: Vec<GlobRule>,
    patterns: PatternSet,
}

impl BuiltinMimeDatabase {
    pub fn new() -> Self {
        Self::with_overrides(&BTreeMap::new())
    }

    /// Builds the database with user `glob -> MIME name` overrides, which win
    /// over every built-in glob.
    pub fn with_overrides(overrides: &BTreeMap<String, String>) -> Self {
        let types: HashMap<_, _> = MIME_TYPES.iter().map(|t| (t.name, t)).collect();
        let aliases = MIME_TYPES
            .iter()
            .flat_map(|t| t.aliases.iter().map(move |a| (*a, t.name)))
            .collect();

        let mut rules: Vec<GlobRule> = overrides
            .iter()
            .map(|(pattern, mime)| GlobRule {
                pattern: pattern.clone(),
                mime: mime.clone(),
                user: true,
            })
            .collect();
        for t in MIME_TYPES {
            rules.extend(t.globs.iter().map(|g| GlobRule {
                pattern: (*g).to_string(),
                mime: t.name.to_string(),
                user: false,
            }));
        }
        let patterns = PatternSet::compile(rules.iter().enumerate().map(|(i, r)| (i, r.pattern.as_str())));

        Self {
            types,
            aliases,
            rules,
            patterns,
        }
    }

    fn canonical<'a>(&self, name: &'a str) -> &'a str {
        match self.aliases.get(name) {
            Some(target) => *target,
            None => name,
        }
    }

    /// Direct parents, including the implicit ones shared-mime-info defines:
    /// every `text/*` is plain text and every `*+xml` is XML.
    fn parents_of(&self, name: &str) -> Vec<String> {
        let mut parents: Vec<String> = self
            .types
            .get(name)
            .map(|t| t.parents.iter().map(|p| self.canonical(p).to_string()).collect())
            .unwrap_or_default();
        if name.starts_with("text/") && name != PLAIN_TEXT {
            parents.push(PLAIN_TEXT.to_string());
        }
        if name.ends_with("+xml") {
            parents.push("application/xml".to_string());
        }
        parents
    }

    fn glob_match(&self, path: &Path) -> Option<&GlobRule> {
        let mut best: Option<&GlobRule> = None;
        for rule in self.patterns.matches(path).into_iter().map(|i| &self.rules[i]) {
            if best.map_or(true, |b| rule.weight() > b.weight()) {
                best = Some(rule);
            }
        }
        best
    }

    fn record_for(&self, name: &str) -> MimeRecord {
        self.mime_type_for_name(name)
            .unwrap_or_else(|| MimeRecord::new(name, name))
    }
}

impl Default for BuiltinMimeDatabase {
    fn default() -> Self {
        Self::new()
    }
}

impl MimeDatabase for BuiltinMimeDatabase {
    fn mime_type_for_file(&self, path: &Path) -> MimeRecord {
        // Only regular files are ever opened; reading a pipe or device can block.
        let metadata = fs::metadata(path).ok();
        if let Some(name) = metadata.as_ref().and_then(|m| inode_type(m.file_type())) {
            return self.record_for(name);
        }
        if let Some(rule) = self.glob_match(path) {
            debug!(path = %path.display(), pattern = %rule.pattern, mime = %rule.mime, "glob match");
            return self.record_for(&rule.mime);
        }
        if !metadata.is_some_and(|m| m.is_file()) {
            return MimeRecord::unknown();
        }
        match sniff(path) {
            Some(name) => {
                debug!(path = %path.display(), mime = name, "content match");
                self.record_for(name)
            }
            None => MimeRecord::unknown(),
        }
    }

    fn mime_type_for_name(&self, name: &str) -> Option<MimeRecord> {
        let t = self.types.get(self.canonical(name))?;
        Some(MimeRecord::new(t.name, t.comment))
    }

    fn inherits(&self, name: &str, ancestor: &str) -> bool {
        let ancestor = self.canonical(ancestor);
        let mut seen = HashSet::new();
        let mut pending = vec![self.canonical(name).to_string()];
        while let Some(current) = pending.pop() {
            if current == ancestor {
                return true;
            }
            if seen.insert(current.clone()) {
                pending.extend(self.parents_of(&current));
            }
        }
        false
    }
}

/// `inode/*` name for anything that is not a regular file.
fn inode_type(file_type: FileType) -> Option<&'static str> {
    if file_type.is_dir() {
        return Some(DIRECTORY);
    }
    if file_type.is_file() {
        return None;
    }
    #[cfg(unix)]
    {
        use std::os::unix::fs::FileTypeExt;
        if file_type.is_fifo() {
            return Some(FIFO);
        }
        if file_type.is_char_device() {
            return Some(CHAR_DEVICE);
        }
        if file_type.is_block_device() {
            return Some(BLOCK_DEVICE);
        }
        if file_type.is_socket() {
            return Some(SOCKET);
        }
    }
    None
}

/// Guesses a MIME name from the content of a regular file. `None` when the file cannot be read
/// or the bytes are neither a known format nor text.
fn sniff(path: &Path) -> Option<&'static str> {
    let file = File::open(path).ok()?;
    let mut buf = Vec::new();
    if let Err(e) = file.take(SNIFF_LEN).read_to_end(&mut buf) {
        debug!(path = %path.display(), error = %e, "could not read file for sniffing");
        return None;
    }
    if buf.is_empty() {
        return Some(ZERO_SIZE);
    }
    if let Some(kind) = infer::get(&buf) {
        return Some(kind.mime_type());
    }
    looks_like_text(&buf).then_some(PLAIN_TEXT)
}

/// NUL-free UTF-8. A multi-byte sequence cut off by the sniff window still counts.
/// Latin-1 or UTF-16 text with no matching glob is not recognised and ends up
/// as `application/octet-stream`.
fn looks_like_text(buf: &[u8]) -> bool {
    if buf.contains(&0) {
        return false;
    }
    match std::str::from_utf8(buf) {
        Ok(_) => true,
        Err(e) => e.error_len().is_none(),
    }
}
