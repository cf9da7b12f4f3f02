use relative_path::{RelativePath, RelativePathBuf};

/// A scene markup file on disk, with a relative path and display-friendly
/// name.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneFile {
    relative_path: RelativePathBuf,
    display_name: String,
    display_path: String,
}

impl SceneFile {
    /// File extension for scene markup files.
    pub const EXTENSION: &'static str = "nvm";

    pub fn new(relative_path: RelativePathBuf) -> Self {
        let display_name = Self::extract_display_name(&relative_path);
        let display_path = {
            let path_str = relative_path.as_str();
            path_str
                .strip_suffix(".nvm")
                .unwrap_or(path_str)
                .to_string()
        };

        Self {
            relative_path,
            display_name,
            display_path,
        }
    }

    pub fn from_relative_str(path: &str) -> Self {
        Self::new(RelativePathBuf::from(path))
    }

    pub fn relative_path(&self) -> &RelativePath {
        &self.relative_path
    }

    /// File name without the extension.
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Relative path without the extension, for window titles.
    pub fn display_path(&self) -> &str {
        &self.display_path
    }

    fn extract_display_name(path: &RelativePath) -> String {
        path.file_name()
            .map(|name| name.strip_suffix(".nvm").unwrap_or(name))
            .unwrap_or("Untitled")
            .to_string()
    }
}

impl From<RelativePathBuf> for SceneFile {
    fn from(path: RelativePathBuf) -> Self {
        Self::new(path)
    }
}

impl From<&str> for SceneFile {
    fn from(path: &str) -> Self {
        Self::from_relative_str(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_strips_extension() {
        let file = SceneFile::from_relative_str("part-one/opening.nvm");
        assert_eq!(file.display_name(), "opening");
        assert_eq!(file.display_path(), "part-one/opening");
    }

    #[test]
    fn display_name_without_extension_unchanged() {
        let file = SceneFile::from_relative_str("notes");
        assert_eq!(file.display_name(), "notes");
    }
}
