use crate::models::{Book, SceneFile};
use relative_path::RelativePath;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("File not found: {0}")]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid library directory: {0}")]
    InvalidLibraryDir(String),
    #[error("Malformed book file: {0}")]
    MalformedBook(#[from] serde_json::Error),
}

/// Read a scene file and return its markup text.
pub fn read_scene(relative_path: &RelativePath, library_root: &Path) -> Result<String, IoError> {
    let absolute_path = relative_path.to_path(library_root);
    if !absolute_path.exists() {
        return Err(IoError::NotFound(absolute_path));
    }
    fs::read_to_string(&absolute_path).map_err(IoError::Io)
}

/// Write markup text to a scene file.
pub fn write_scene(
    relative_path: &RelativePath,
    library_root: &Path,
    markup: &str,
) -> Result<(), IoError> {
    let absolute_path = relative_path.to_path(library_root);

    if let Some(parent) = absolute_path.parent() {
        fs::create_dir_all(parent).map_err(IoError::Io)?;
    }

    fs::write(&absolute_path, markup).map_err(IoError::Io)
}

/// Scan the library for scene files, sorted by path.
pub fn scan_scene_files(library_root: &Path) -> Result<Vec<PathBuf>, IoError> {
    if !library_root.exists() {
        return Err(IoError::InvalidLibraryDir(
            "library directory not found".to_string(),
        ));
    }

    let mut files = Vec::new();
    scan_directory_recursive(library_root, &mut files)?;
    files.sort();
    Ok(files)
}

fn scan_directory_recursive(dir: &Path, files: &mut Vec<PathBuf>) -> Result<(), IoError> {
    let entries = fs::read_dir(dir).map_err(IoError::Io)?;

    for entry in entries {
        let entry = entry.map_err(IoError::Io)?;
        let path = entry.path();

        if path.is_dir() {
            scan_directory_recursive(&path, files)?;
        } else if let Some(ext) = path.extension()
            && ext == SceneFile::EXTENSION
        {
            files.push(path);
        }
    }

    Ok(())
}

pub fn validate_library_dir(path: &Path) -> Result<(), IoError> {
    if !path.exists() || !path.is_dir() {
        return Err(IoError::InvalidLibraryDir(
            "Directory does not exist".to_string(),
        ));
    }

    Ok(())
}

/// Load a whole book from its JSON file.
///
/// Accepts both current exports and legacy nested exports that carry no
/// ids, statuses or order indices; missing fields take their defaults and
/// order indices are re-spaced afterwards.
pub fn load_book(path: &Path) -> Result<Book, IoError> {
    if !path.exists() {
        return Err(IoError::NotFound(path.to_path_buf()));
    }
    let json = fs::read_to_string(path).map_err(IoError::Io)?;
    let mut book: Book = serde_json::from_str(&json)?;
    book.normalize_orders();
    Ok(book)
}

/// Write a book to its JSON file.
pub fn save_book(book: &Book, path: &Path) -> Result<(), IoError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(IoError::Io)?;
    }
    let json = serde_json::to_string_pretty(book)?;
    fs::write(path, json).map_err(IoError::Io)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ORDER_GAP, RevisionStatus};
    use crate::tests::{create_test_file, create_test_library_dir};

    #[test]
    fn scan_and_load_scene_files() {
        // Given a library with scene files
        let library = create_test_library_dir();
        create_test_file(&library, "one.nvm", "He said @q{hi}q@.");
        create_test_file(&library, "two.nvm", "Plain line");

        // When scanning for files
        let files = scan_scene_files(library.path()).unwrap();

        // Then we find the expected files
        assert_eq!(files.len(), 2);
        assert!(files.iter().any(|f| f.file_name().unwrap() == "one.nvm"));
        assert!(files.iter().any(|f| f.file_name().unwrap() == "two.nvm"));
    }

    #[test]
    fn scan_ignores_other_extensions() {
        let library = create_test_library_dir();
        create_test_file(&library, "scene.nvm", "text");
        create_test_file(&library, "notes.md", "# notes");
        create_test_file(&library, "image.png", "fake image data");

        let files = scan_scene_files(library.path()).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].file_name().unwrap(), "scene.nvm");
    }

    #[test]
    fn scan_nested_directories() {
        let library = create_test_library_dir();
        create_test_file(&library, "root.nvm", "root scene");
        create_test_file(&library, "part-one/nested.nvm", "nested scene");

        let files = scan_scene_files(library.path()).unwrap();
        assert_eq!(files.len(), 2);
        assert!(files.iter().any(|f| f.file_name().unwrap() == "nested.nvm"));
    }

    #[test]
    fn invalid_library_directory() {
        let result = scan_scene_files(Path::new("/this/path/does/not/exist"));
        assert!(matches!(result, Err(IoError::InvalidLibraryDir(_))));

        let result = validate_library_dir(Path::new("/this/path/does/not/exist"));
        assert!(matches!(result, Err(IoError::InvalidLibraryDir(_))));
    }

    #[test]
    fn read_write_scene_round_trip() {
        let library = create_test_library_dir();
        let relative_path = RelativePath::new("part-one/opening.nvm");
        let markup = "She opened with @Q[Palla]{a familiar line}Q@.";

        write_scene(relative_path, library.path(), markup).unwrap();
        let read_back = read_scene(relative_path, library.path()).unwrap();
        assert_eq!(read_back, markup);

        // Parent directories were created on demand
        assert!(library.path().join("part-one").is_dir());
    }

    #[test]
    fn read_scene_not_found() {
        let library = create_test_library_dir();
        let result = read_scene(RelativePath::new("missing.nvm"), library.path());
        assert!(matches!(result, Err(IoError::NotFound(_))));
    }

    #[test]
    fn load_legacy_book_fills_defaults() {
        let library = create_test_library_dir();
        let path = create_test_file(
            &library,
            "book.json",
            r#"{
                "title": "Legacy Book",
                "parts": [{
                    "title": "Part One",
                    "chapters": [{
                        "title": "Chapter One",
                        "scenes": [
                            {"title": "Opening", "content": "@q{hi}q@"},
                            {"title": "Next", "content": "more"}
                        ]
                    }]
                }]
            }"#,
        );

        let book = load_book(&path).unwrap();
        assert_eq!(book.title, "Legacy Book");
        let scenes = &book.parts[0].chapters[0].scenes[..];
        assert_eq!(scenes[0].status, RevisionStatus::Unreviewed);
        // Missing order indices are re-spaced to full gaps
        assert_eq!(scenes[0].order_idx, ORDER_GAP);
        assert_eq!(scenes[1].order_idx, 2.0 * ORDER_GAP);
    }

    #[test]
    fn save_and_load_book_round_trip() {
        let library = create_test_library_dir();
        let path = library.path().join("book.json");

        let mut book = Book::new("Round Trip");
        book.parts.push(crate::models::Part::new("One", ORDER_GAP));
        save_book(&book, &path).unwrap();

        let loaded = load_book(&path).unwrap();
        assert_eq!(loaded.id, book.id);
        assert_eq!(loaded.parts.len(), 1);
    }

    #[test]
    fn load_book_rejects_malformed_json() {
        let library = create_test_library_dir();
        let path = create_test_file(&library, "book.json", "{not json");
        assert!(matches!(load_book(&path), Err(IoError::MalformedBook(_))));
    }
}
