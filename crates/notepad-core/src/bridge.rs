//! The helper object a UI layer holds: file access, text detection, and
//! syntax lookup behind one handle.

use std::path::Path;
use std::sync::Arc;

use crate::config::Config;
use crate::fileio;
use crate::launcher::{self, ProcessSupervisor, SystemSupervisor};
use crate::mime::{self, BuiltinMimeDatabase, MimeDatabase};
use crate::syntax::{self, BuiltinGrammarRepository, GrammarRepository};
use crate::text::{self, Classification};

#[derive(Clone)]
pub struct EditorBridge {
    mime_db: Arc<dyn MimeDatabase>,
    grammars: Arc<dyn GrammarRepository>,
    supervisor: Arc<dyn ProcessSupervisor>,
}

impl EditorBridge {
    pub fn new(
        mime_db: Arc<dyn MimeDatabase>,
        grammars: Arc<dyn GrammarRepository>,
        supervisor: Arc<dyn ProcessSupervisor>,
    ) -> Self {
        Self {
            mime_db,
            grammars,
            supervisor,
        }
    }

    /// Built-in databases, with the user's MIME overrides from `config`.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            Arc::new(BuiltinMimeDatabase::with_overrides(&config.mime_globs)),
            Arc::new(BuiltinGrammarRepository::new()),
            Arc::new(SystemSupervisor),
        )
    }

    pub fn mime_database(&self) -> &dyn MimeDatabase {
        self.mime_db.as_ref()
    }

    pub fn read_file(&self, path: &Path) -> String {
        fileio::read_file(path)
    }

    pub fn write_file(&self, path: &Path, content: &str) -> bool {
        fileio::write_file(path, content)
    }

    pub fn classify(&self, path: &Path) -> Classification {
        text::classify(self.mime_db.as_ref(), path)
    }

    pub fn is_text_file(&self, path: &Path) -> bool {
        text::is_text_like(self.mime_db.as_ref(), path)
    }

    pub fn get_mime_type(&self, path: &Path) -> String {
        mime::resolve(self.mime_db.as_ref(), path).name
    }

    pub fn get_mime_type_comment(&self, path: &Path) -> String {
        mime::resolve(self.mime_db.as_ref(), path).comment
    }

    pub fn detect_syntax(&self, path: &Path) -> String {
        syntax::resolve_grammar(self.grammars.as_ref(), self.mime_db.as_ref(), path).into()
    }

    pub fn detect_syntax_from_mime_type(&self, mime: &str) -> String {
        syntax::resolve_grammar_for_mime(self.grammars.as_ref(), mime).into()
    }

    pub fn open_in_new_instance(&self, path: &Path) {
        launcher::launch_new_instance(self.supervisor.as_ref(), path);
    }
}

impl Default for EditorBridge {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::Mutex;

    use super::*;
    use crate::launcher::LaunchRequest;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<LaunchRequest>>);

    impl ProcessSupervisor for Recorder {
        fn spawn_detached(&self, request: &LaunchRequest) -> io::Result<()> {
            self.0.lock().unwrap().push(request.clone());
            Ok(())
        }
    }

    fn bridge_with(recorder: Arc<Recorder>) -> EditorBridge {
        EditorBridge::new(
            Arc::new(BuiltinMimeDatabase::new()),
            Arc::new(BuiltinGrammarRepository::new()),
            recorder,
        )
    }

    #[test]
    fn end_to_end_markdown() {
        let bridge = EditorBridge::default();
        let path = Path::new("notes.md");
        assert!(bridge.is_text_file(path));
        assert_eq!(bridge.get_mime_type(path), "text/markdown");
        assert_eq!(bridge.get_mime_type_comment(path), "Markdown document");
        assert_eq!(bridge.detect_syntax(path), "Markdown");
    }

    #[test]
    fn end_to_end_png() {
        let bridge = EditorBridge::default();
        let path = Path::new("photo.png");
        assert!(!bridge.is_text_file(path));
        assert_eq!(bridge.detect_syntax(path), "None");
    }

    #[test]
    fn mime_based_syntax_matches_path_based() {
        let bridge = EditorBridge::default();
        let mime = bridge.get_mime_type(Path::new("config.yaml"));
        assert_eq!(mime, "application/x-yaml");
        assert!(bridge.is_text_file(Path::new("config.yaml")));
        assert_eq!(bridge.detect_syntax_from_mime_type(&mime), bridge.detect_syntax(Path::new("config.yaml")));
    }

    #[test]
    fn extensionless_script_resolved_by_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bootstrap");
        std::fs::write(&path, "#!/bin/sh\nset -e\n").unwrap();
        let bridge = EditorBridge::default();
        assert_eq!(bridge.get_mime_type(&path), "application/x-shellscript");
        assert_eq!(bridge.get_mime_type_comment(&path), "shell script");
        assert!(bridge.is_text_file(&path));
        assert_eq!(bridge.detect_syntax(&path), "Bash");
    }

    #[test]
    fn overrides_from_config() {
        let mut config = Config::default();
        config.mime_globs.insert("*.nfo".into(), "text/plain".into());
        let bridge = EditorBridge::from_config(&config);
        assert_eq!(bridge.get_mime_type(Path::new("release.nfo")), "text/plain");
        assert!(bridge.is_text_file(Path::new("release.nfo")));
    }

    #[test]
    fn file_round_trip_through_bridge() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("draft.txt");
        let bridge = EditorBridge::default();
        assert!(bridge.write_file(&path, "hello"));
        assert_eq!(bridge.read_file(&path), "hello");
        assert!(bridge.classify(&path).is_text);
    }

    #[test]
    fn open_in_new_instance_sends_request() {
        let recorder = Arc::new(Recorder::default());
        let bridge = bridge_with(recorder.clone());
        bridge.open_in_new_instance(Path::new("other.md"));
        let requests = recorder.0.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].args, vec![std::ffi::OsString::from("other.md")]);
    }
}
