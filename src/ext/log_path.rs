use std::path::{Path, PathBuf};

/// Renders a path for log and error output. Prefers the canonical form and
/// falls back to an absolute best guess when the path does not resolve.
pub trait LogPathExt {
    fn display_for_log(&self) -> String;
}

impl LogPathExt for Path {
    fn display_for_log(&self) -> String {
        match self.canonicalize() {
            Ok(canonical) => canonical.display().to_string(),
            Err(_) if self.is_absolute() => self.display().to_string(),
            Err(_) => match std::env::current_dir() {
                Ok(current_dir) => current_dir.join(self).display().to_string(),
                Err(_) => self.display().to_string(),
            },
        }
    }
}

impl LogPathExt for PathBuf {
    fn display_for_log(&self) -> String {
        self.as_path().display_for_log()
    }
}
