//! All backend logic independent of how the editor is run (CLI or a desktop shell).
//!
//! The UI asks three questions about a file: what MIME type it has
//! ([mime]), whether it is text worth opening ([text]), and which highlighting
//! grammar fits it ([syntax]). [bridge::EditorBridge] bundles those with file
//! I/O and relaunching for the UI layer.

pub mod app_data;
pub mod bridge;
pub mod config;
pub mod fileio;
mod globs;
pub mod launcher;
pub mod mime;
pub mod scan;
pub mod syntax;
pub mod text;

pub use app_data::app_data_dir;
pub use bridge::EditorBridge;
pub use config::{load_config, save_config, set_last_file, Config, ConfigError};
pub use fileio::{read_file, write_file};
pub use launcher::{launch_new_instance, LaunchRequest, ProcessSupervisor, SystemSupervisor};
pub use mime::{BuiltinMimeDatabase, MimeDatabase, MimeRecord};
pub use scan::{scan_files, ScanError};
pub use syntax::{
    resolve_grammar, resolve_grammar_for_mime, BuiltinGrammarRepository, Grammar, GrammarRepository,
    SyntaxDefinition, NO_GRAMMAR,
};
pub use text::{classify, is_text_like, Classification, TextRule, TEXT_MIME_ALLOW_LIST, TEXT_RULES};

/// Returns a short status string. Used to verify the backend is wired up.
pub fn status() -> &'static str {
    "notepad-core ready"
}
