//! Decides whether a file is worth opening in a text editor.
//!
//! The decision is an ordered list of rules, first match wins. MIME naming is
//! inconsistent across platforms, so the list favours recall: many script and
//! config formats live under `application/`, and the last MIME rule accepts any
//! name mentioning "text".

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use crate::mime::{self, MimeDatabase, OCTET_STREAM, PLAIN_TEXT};

/// MIME types that are text even though they are not `text/*`.
pub static TEXT_MIME_ALLOW_LIST: &[&str] = &[
    "application/json",
    "application/x-yaml",
    "application/yaml",
    "application/xml",
    "application/javascript",
    "application/x-javascript",
    "application/ecmascript",
    "application/x-shellscript",
    "application/x-sh",
    "application/x-csh",
    "application/x-perl",
    "application/x-python",
    "application/x-ruby",
    "application/x-php",
    "application/x-desktop",
    "application/x-config",
    "application/toml",
    "application/x-toml",
    "application/x-ini",
    "application/x-wine-extension-ini",
];

/// File suffixes treated as text when the MIME database has no answer at all.
pub static LEGACY_TEXT_EXTENSIONS: &[&str] = &[
    "txt", "md", "log", "conf", "cfg", "ini", "xml", "json", "qml", "cpp", "h", "py", "js",
];

/// One step of the text decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TextRule {
    /// The MIME name starts with `text/`.
    TextPrefix,
    /// The MIME name is in [`TEXT_MIME_ALLOW_LIST`].
    AllowList,
    /// The database says the type descends from `text/plain`.
    InheritsPlainText,
    /// The MIME name contains "text" in any case. Loose on purpose; it can
    /// accept binary formats such as `application/vnd.oasis.opendocument.text`.
    ContainsText,
    /// The database returned `application/octet-stream` and the file name has
    /// one of the [`LEGACY_TEXT_EXTENSIONS`].
    LegacyExtension,
}

/// Evaluation order of the text rules.
pub const TEXT_RULES: [TextRule; 5] = [
    TextRule::TextPrefix,
    TextRule::AllowList,
    TextRule::InheritsPlainText,
    TextRule::ContainsText,
    TextRule::LegacyExtension,
];

impl TextRule {
    /// Whether this rule alone accepts `mime`. `path` is only consulted by
    /// [`TextRule::LegacyExtension`].
    pub fn matches(self, db: &dyn MimeDatabase, mime: &str, path: Option<&Path>) -> bool {
        match self {
            TextRule::TextPrefix => mime.starts_with("text/"),
            TextRule::AllowList => TEXT_MIME_ALLOW_LIST.iter().any(|m| *m == mime),
            TextRule::InheritsPlainText => db.inherits(mime, PLAIN_TEXT),
            TextRule::ContainsText => mime.to_ascii_lowercase().contains("text"),
            TextRule::LegacyExtension => {
                mime == OCTET_STREAM && path.is_some_and(has_legacy_text_extension)
            }
        }
    }
}

/// Result of classifying one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub path: PathBuf,
    pub is_text: bool,
    pub mime_name: String,
    pub mime_comment: String,
    /// The rule that accepted the file, if any.
    pub rule: Option<TextRule>,
}

/// First rule accepting `mime`, in [`TEXT_RULES`] order.
pub fn matching_rule(db: &dyn MimeDatabase, mime: &str, path: Option<&Path>) -> Option<TextRule> {
    TEXT_RULES.into_iter().find(|rule| rule.matches(db, mime, path))
}

/// Text check for callers that already hold a MIME name.
pub fn is_text_mime(db: &dyn MimeDatabase, mime: &str) -> bool {
    matching_rule(db, mime, None).is_some()
}

pub fn classify(db: &dyn MimeDatabase, path: &Path) -> Classification {
    let record = mime::resolve(db, path);
    let rule = matching_rule(db, &record.name, Some(path));
    debug!(path = %path.display(), mime = %record.name, ?rule, "classified");
    Classification {
        path: path.to_path_buf(),
        is_text: rule.is_some(),
        mime_name: record.name,
        mime_comment: record.comment,
        rule,
    }
}

pub fn is_text_like(db: &dyn MimeDatabase, path: &Path) -> bool {
    classify(db, path).is_text
}

fn has_legacy_text_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .is_some_and(|e| LEGACY_TEXT_EXTENSIONS.iter().any(|l| *l == e))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::fs;

    use super::*;
    use crate::mime::{BuiltinMimeDatabase, MimeRecord};

    /// Answers every path with one fixed MIME name and knows only the
    /// inheritance edges it is given.
    struct FixedDatabase {
        name: &'static str,
        parents: HashMap<&'static str, &'static str>,
    }

    impl FixedDatabase {
        fn new(name: &'static str) -> Self {
            Self {
                name,
                parents: HashMap::new(),
            }
        }

        fn with_parent(mut self, child: &'static str, parent: &'static str) -> Self {
            self.parents.insert(child, parent);
            self
        }
    }

    impl MimeDatabase for FixedDatabase {
        fn mime_type_for_file(&self, _path: &Path) -> MimeRecord {
            MimeRecord::new(self.name, "fixed")
        }

        fn mime_type_for_name(&self, name: &str) -> Option<MimeRecord> {
            (name == self.name).then(|| MimeRecord::new(self.name, "fixed"))
        }

        fn inherits(&self, name: &str, ancestor: &str) -> bool {
            let mut current = name;
            loop {
                if current == ancestor {
                    return true;
                }
                match self.parents.get(current) {
                    Some(parent) => current = *parent,
                    None => return false,
                }
            }
        }
    }

    fn rule_for(db: &FixedDatabase, path: &str) -> Option<TextRule> {
        classify(db, Path::new(path)).rule
    }

    #[test]
    fn text_prefix_rule() {
        let db = FixedDatabase::new("text/x-anything");
        assert_eq!(rule_for(&db, "a.bin"), Some(TextRule::TextPrefix));
    }

    #[test]
    fn allow_list_rule_ignores_content() {
        for name in TEXT_MIME_ALLOW_LIST {
            let db = FixedDatabase::new(*name);
            assert_eq!(rule_for(&db, "whatever"), Some(TextRule::AllowList), "{name}");
        }
    }

    #[test]
    fn inheritance_rule() {
        let db = FixedDatabase::new("application/x-srt").with_parent("application/x-srt", PLAIN_TEXT);
        assert_eq!(rule_for(&db, "movie.srt"), Some(TextRule::InheritsPlainText));
    }

    #[test]
    fn contains_text_rule_is_case_insensitive() {
        let db = FixedDatabase::new("application/vnd.Acme.RichTEXT");
        assert_eq!(rule_for(&db, "doc.acme"), Some(TextRule::ContainsText));
    }

    #[test]
    fn legacy_extension_only_when_database_gives_up() {
        let unknown = FixedDatabase::new(OCTET_STREAM);
        assert_eq!(rule_for(&unknown, "main.QML"), Some(TextRule::LegacyExtension));
        assert_eq!(rule_for(&unknown, "firmware.bin"), None);
        assert_eq!(rule_for(&unknown, "README"), None);

        let png = FixedDatabase::new("image/png");
        assert_eq!(rule_for(&png, "notes.txt"), None);
    }

    #[test]
    fn rules_are_tried_in_order() {
        // "text/plain" also satisfies every later MIME rule.
        let db = FixedDatabase::new(PLAIN_TEXT);
        assert_eq!(rule_for(&db, "a"), Some(TextRule::TextPrefix));
        let json = FixedDatabase::new("application/json").with_parent("application/json", PLAIN_TEXT);
        assert_eq!(rule_for(&json, "a"), Some(TextRule::AllowList));
    }

    #[test]
    fn non_text_types_are_rejected() {
        for name in ["application/octet-stream", "image/png", "application/pdf", "audio/mpeg"] {
            let db = FixedDatabase::new(name);
            assert!(!is_text_like(&db, Path::new("data.bin")), "{name}");
        }
    }

    #[test]
    fn builtin_examples() {
        let db = BuiltinMimeDatabase::new();

        let notes = classify(&db, Path::new("notes.md"));
        assert!(notes.is_text);
        assert_eq!(notes.mime_name, "text/markdown");
        assert_eq!(notes.mime_comment, "Markdown document");

        let photo = classify(&db, Path::new("photo.png"));
        assert!(!photo.is_text);
        assert_eq!(photo.rule, None);

        let yaml = classify(&db, Path::new("config.yaml"));
        assert_eq!(yaml.mime_name, "application/x-yaml");
        assert_eq!(yaml.rule, Some(TextRule::AllowList));

        assert_eq!(classify(&db, Path::new("schema.sql")).rule, Some(TextRule::InheritsPlainText));
        assert_eq!(classify(&db, Path::new("logo.svg")).rule, Some(TextRule::InheritsPlainText));
        assert_eq!(classify(&db, Path::new("report.odt")).rule, Some(TextRule::ContainsText));
    }

    #[test]
    fn missing_unknown_file_is_not_text() {
        let db = BuiltinMimeDatabase::new();
        let c = classify(&db, Path::new("/nowhere/at/all/blob.xyz"));
        assert!(!c.is_text);
        assert_eq!(c.mime_name, OCTET_STREAM);
    }

    #[test]
    fn binary_content_is_not_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dump.bin");
        fs::write(&path, [0u8, 159, 146, 150, 0, 1]).unwrap();
        let db = BuiltinMimeDatabase::new();
        assert!(!is_text_like(&db, &path));
    }

    #[cfg(unix)]
    #[test]
    fn fifo_is_not_text() {
        let dir = tempfile::tempdir().unwrap();
        let pipe = dir.path().join("pipe.md");
        let status = std::process::Command::new("mkfifo").arg(&pipe).status().unwrap();
        assert!(status.success());

        let (tx, rx) = std::sync::mpsc::channel();
        std::thread::spawn(move || {
            let _ = tx.send(classify(&BuiltinMimeDatabase::new(), &pipe));
        });
        let c = rx.recv_timeout(std::time::Duration::from_secs(3)).unwrap();
        assert!(!c.is_text);
        assert_eq!(c.mime_name, "inode/fifo");
    }

    #[test]
    fn classification_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("TODO");
        fs::write(&path, "buy milk\n").unwrap();
        let db = BuiltinMimeDatabase::new();
        let first = classify(&db, &path);
        assert!(first.is_text);
        assert_eq!(first, classify(&db, &path));
    }

    #[test]
    fn is_text_mime_skips_path_rules() {
        let db = BuiltinMimeDatabase::new();
        assert!(is_text_mime(&db, "application/sql"));
        assert!(!is_text_mime(&db, OCTET_STREAM));
    }
}
