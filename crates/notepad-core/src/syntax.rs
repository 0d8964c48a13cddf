//! Picks the syntax-highlighting grammar for a file.
//!
//! Lookup goes by file name first and falls back to the file's MIME type, so a
//! known extension always wins over content sniffing.

use std::fmt;
use std::path::Path;

use serde::{Serialize, Serializer};
use tracing::debug;

use crate::globs::PatternSet;
use crate::mime::{self, MimeDatabase};

/// Grammar name meaning "plain text, no highlighting".
pub const NO_GRAMMAR: &str = "None";

/// A named highlighting grammar and the files it applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxDefinition {
    pub name: String,
    pub file_globs: Vec<String>,
    pub mime_types: Vec<String>,
    /// Higher wins when several definitions claim the same file name.
    pub priority: i32,
}

impl SyntaxDefinition {
    pub fn new(name: impl Into<String>, file_globs: &[&str], mime_types: &[&str]) -> Self {
        Self {
            name: name.into(),
            file_globs: file_globs.iter().map(|s| s.to_string()).collect(),
            mime_types: mime_types.iter().map(|s| s.to_string()).collect(),
            priority: 0,
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}

/// Read-only index of syntax definitions.
pub trait GrammarRepository: Send + Sync {
    fn definition_for_file_name(&self, path: &Path) -> Option<&SyntaxDefinition>;
    fn definition_for_mime_type(&self, name: &str) -> Option<&SyntaxDefinition>;
}

/// Outcome of a grammar lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Grammar {
    Named(String),
    /// Nothing matched; shown as [`NO_GRAMMAR`].
    PlainText,
}

impl Grammar {
    pub fn as_str(&self) -> &str {
        match self {
            Grammar::Named(name) => name,
            Grammar::PlainText => NO_GRAMMAR,
        }
    }

    pub fn is_plain_text(&self) -> bool {
        matches!(self, Grammar::PlainText)
    }

    fn from_definition(def: Option<&SyntaxDefinition>) -> Self {
        def.map_or(Grammar::PlainText, |d| Grammar::Named(d.name.clone()))
    }
}

impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Grammar> for String {
    fn from(grammar: Grammar) -> Self {
        grammar.as_str().to_string()
    }
}

impl Serialize for Grammar {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Grammar for `path`: by file name, then by MIME type.
pub fn resolve_grammar(repo: &dyn GrammarRepository, db: &dyn MimeDatabase, path: &Path) -> Grammar {
    if let Some(def) = repo.definition_for_file_name(path) {
        debug!(path = %path.display(), grammar = %def.name, "grammar by file name");
        return Grammar::Named(def.name.clone());
    }
    let record = mime::resolve(db, path);
    resolve_grammar_for_mime(repo, &record.name)
}

/// Grammar for a MIME name the caller already has.
pub fn resolve_grammar_for_mime(repo: &dyn GrammarRepository, mime: &str) -> Grammar {
    let grammar = Grammar::from_definition(repo.definition_for_mime_type(mime));
    debug!(mime, %grammar, "grammar by MIME type");
    grammar
}

/// Grammars for the common languages and formats a note editor meets.
pub fn builtin_definitions() -> Vec<SyntaxDefinition> {
    vec![
        SyntaxDefinition::new(
            "Python",
            &["*.py", "*.pyw", "*.pyi", "SConstruct", "SConscript"],
            &["text/x-python", "text/x-python3", "application/x-python"],
        ),
        SyntaxDefinition::new(
            "C++",
            &["*.cpp", "*.cxx", "*.cc", "*.c++", "*.hpp", "*.hxx", "*.hh", "*.h++", "*.h", "*.inl"],
            &["text/x-c++src", "text/x-c++hdr", "text/x-chdr"],
        )
        .with_priority(9),
        SyntaxDefinition::new("C", &["*.c"], &["text/x-csrc"]),
        SyntaxDefinition::new("JSON", &["*.json", "*.jsonc", ".babelrc", ".eslintrc"], &["application/json"]),
        SyntaxDefinition::new(
            "Markdown",
            &["*.md", "*.mkd", "*.markdown", "*.mdown"],
            &["text/markdown", "text/x-markdown"],
        ),
        SyntaxDefinition::new(
            "YAML",
            &["*.yaml", "*.yml"],
            &["application/x-yaml", "application/yaml", "text/yaml", "text/x-yaml"],
        ),
        SyntaxDefinition::new(
            "XML",
            &["*.xml", "*.xsd", "*.xsl", "*.xslt", "*.svg", "*.ui", "*.kcfg", "*.qrc"],
            &["application/xml", "text/xml", "image/svg+xml"],
        ),
        SyntaxDefinition::new("HTML", &["*.html", "*.htm", "*.xhtml"], &["text/html"]).with_priority(1),
        SyntaxDefinition::new("CSS", &["*.css"], &["text/css"]),
        SyntaxDefinition::new(
            "JavaScript",
            &["*.js", "*.mjs", "*.cjs"],
            &["application/javascript", "application/x-javascript", "text/javascript"],
        ),
        SyntaxDefinition::new(
            "TypeScript",
            &["*.ts", "*.mts", "*.cts"],
            &["application/typescript", "text/typescript"],
        ),
        SyntaxDefinition::new("Rust", &["*.rs"], &["text/rust"]),
        SyntaxDefinition::new(
            "Bash",
            &["*.sh", "*.bash", "*.zsh", ".bashrc", ".bash_profile", ".profile"],
            &["application/x-shellscript", "application/x-sh", "text/x-sh", "text/x-shellscript"],
        ),
        SyntaxDefinition::new("Perl", &["*.pl", "*.pm", "*.perl"], &["application/x-perl", "text/x-perl"]),
        SyntaxDefinition::new("Ruby", &["*.rb", "Rakefile", "Gemfile"], &["application/x-ruby", "text/x-ruby"]),
        SyntaxDefinition::new(
            "PHP",
            &["*.php", "*.php3", "*.php4", "*.phtml"],
            &["application/x-php", "text/x-php"],
        ),
        SyntaxDefinition::new("QML", &["*.qml", "*.qmltypes", "*.qmlproject"], &["text/x-qml"]),
        SyntaxDefinition::new("TOML", &["*.toml", "Cargo.lock"], &["application/toml", "application/x-toml"]),
        SyntaxDefinition::new(
            "INI Files",
            &["*.ini", "*.cfg", "*.conf", "*.desktop", "*.kdelnk"],
            &["application/x-ini", "application/x-config", "application/x-desktop"],
        ),
        SyntaxDefinition::new(
            "Makefile",
            &["Makefile", "makefile", "GNUmakefile", "*.mk", "*.mak"],
            &["text/x-makefile"],
        ),
        SyntaxDefinition::new("CMake", &["CMakeLists.txt", "*.cmake"], &["text/x-cmake"]).with_priority(1),
        SyntaxDefinition::new("Diff", &["*.diff", "*.patch"], &["text/x-patch", "text/x-diff"]),
        SyntaxDefinition::new("SQL", &["*.sql"], &["application/sql", "text/x-sql"]),
    ]
}

/// Grammar repository over a fixed list of definitions.
pub struct BuiltinGrammarRepository {
    definitions: Vec<SyntaxDefinition>,
    patterns: PatternSet,
}

impl BuiltinGrammarRepository {
    pub fn new() -> Self {
        Self::from_definitions(builtin_definitions())
    }

    pub fn from_definitions(definitions: Vec<SyntaxDefinition>) -> Self {
        let patterns = PatternSet::compile(
            definitions
                .iter()
                .enumerate()
                .flat_map(|(i, d)| d.file_globs.iter().map(move |g| (i, g.as_str()))),
        );
        Self { definitions, patterns }
    }

    pub fn definitions(&self) -> &[SyntaxDefinition] {
        &self.definitions
    }
}

impl Default for BuiltinGrammarRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl GrammarRepository for BuiltinGrammarRepository {
    fn definition_for_file_name(&self, path: &Path) -> Option<&SyntaxDefinition> {
        let mut best: Option<&SyntaxDefinition> = None;
        for def in self.patterns.matches(path).into_iter().map(|i| &self.definitions[i]) {
            if best.map_or(true, |b| def.priority > b.priority) {
                best = Some(def);
            }
        }
        best
    }

    fn definition_for_mime_type(&self, name: &str) -> Option<&SyntaxDefinition> {
        self.definitions
            .iter()
            .filter(|d| d.mime_types.iter().any(|m| m == name))
            .fold(None, |best: Option<&SyntaxDefinition>, def| match best {
                Some(b) if b.priority >= def.priority => Some(b),
                _ => Some(def),
            })
    }
}
