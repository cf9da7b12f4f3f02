use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use novamark_config::Config;
use novamark_engine::{
    editing::Document,
    io,
    markup::{Registry, Tint},
    models::SceneFile,
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};
use relative_path::RelativePathBuf;
use std::{env, io::stdout, path::PathBuf, process};

struct App {
    library_path: PathBuf,
    registry: Registry,
    scene_files: Vec<SceneFile>,
    file_list_state: ListState,
    selected_document: Option<Document>,
    status: String,
}

impl App {
    fn new(library_path: PathBuf, last_scene: Option<&str>) -> Result<Self> {
        let files = io::scan_scene_files(&library_path)?;
        let scene_files = files
            .iter()
            .filter_map(|path| {
                let relative = path.strip_prefix(&library_path).ok()?;
                Some(SceneFile::new(RelativePathBuf::from_path(relative).ok()?))
            })
            .collect();

        let mut app = Self {
            library_path,
            registry: Registry::standard(),
            scene_files,
            file_list_state: ListState::default(),
            selected_document: None,
            status: String::new(),
        };

        if let Some(index) = initial_selection(&app.scene_files, last_scene) {
            app.file_list_state.select(Some(index));
            app.load_selected_scene();
        }

        Ok(app)
    }

    /// Relative path of the currently selected scene, as persisted in the
    /// config for the next start.
    fn selected_scene_path(&self) -> Option<String> {
        let index = self.file_list_state.selected()?;
        let file = self.scene_files.get(index)?;
        Some(file.relative_path().as_str().to_string())
    }

    fn next_file(&mut self) {
        if self.scene_files.is_empty() {
            return;
        }
        let i = match self.file_list_state.selected() {
            Some(i) => (i + 1) % self.scene_files.len(),
            None => 0,
        };
        self.file_list_state.select(Some(i));
        self.load_selected_scene();
    }

    fn previous_file(&mut self) {
        if self.scene_files.is_empty() {
            return;
        }
        let i = match self.file_list_state.selected() {
            Some(i) => {
                if i == 0 {
                    self.scene_files.len() - 1
                } else {
                    i - 1
                }
            }
            None => 0,
        };
        self.file_list_state.select(Some(i));
        self.load_selected_scene();
    }

    fn load_selected_scene(&mut self) {
        let Some(index) = self.file_list_state.selected() else {
            return;
        };
        let Some(file) = self.scene_files.get(index) else {
            return;
        };

        match io::read_scene(file.relative_path(), &self.library_path) {
            Ok(markup) => {
                let document = Document::from_markup(&self.registry, &markup);
                // Round-trip fidelity check: a mismatch means the file holds
                // markup the parser had to repair
                self.status = if document.to_markup(&self.registry) == markup {
                    format!("{} — clean", file.display_path())
                } else {
                    log::warn!("lossy parse of {}", file.display_path());
                    format!("{} — repaired on parse", file.display_path())
                };
                self.selected_document = Some(document);
            }
            Err(e) => {
                self.status = format!("Error reading scene: {e}");
                self.selected_document = None;
            }
        }
    }
}

fn span_style(run: &novamark_engine::editing::Run) -> Style {
    let mut style = Style::default();
    match run.style().tint {
        Some(Tint::Speech) => style = style.fg(Color::Green),
        Some(Tint::SpecialQuote) => style = style.fg(Color::Magenta),
        None => {}
    }
    if run.style().italic {
        style = style.add_modifier(Modifier::ITALIC);
    }
    if run.style().bold {
        style = style.add_modifier(Modifier::BOLD);
    }
    if run.is_glyph() {
        style = style.add_modifier(Modifier::DIM);
    }
    style
}

fn main() -> Result<()> {
    env_logger::init();

    // Determine library path from CLI args or config file
    let args: Vec<String> = env::args().collect();
    let config_path = Config::config_path();

    let mut config: Option<Config> = None;
    let library_path;
    let from_config;

    if args.len() == 2 {
        library_path = PathBuf::from(&args[1]);
        from_config = false;
    } else if args.len() == 1 {
        match Config::load() {
            Ok(Some(loaded)) => {
                library_path = loaded.library_path.clone();
                config = Some(loaded);
                from_config = true;
            }
            Ok(None) => {
                eprintln!("Error: No library path provided and no config file found");
                eprintln!("Usage: {} <library-folder-path>", args[0]);
                eprintln!("Or create a config file at {}", config_path.display());
                process::exit(1);
            }
            Err(e) => {
                eprintln!("Error: Failed to load config file: {e}");
                eprintln!("Usage: {} <library-folder-path>", args[0]);
                process::exit(1);
            }
        }
    } else {
        eprintln!("Usage: {} [library-folder-path]", args[0]);
        process::exit(1);
    };

    if let Err(e) = io::validate_library_dir(&library_path) {
        let source = if from_config {
            format!(" from config file '{}'", config_path.display())
        } else {
            String::new()
        };
        eprintln!(
            "Error: Library path '{}'{} is invalid: {e}",
            library_path.display(),
            source
        );
        process::exit(1);
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let last_scene = config.as_ref().and_then(|c| c.last_scene.clone());
    let mut app = App::new(library_path, last_scene.as_deref())?;

    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    // Remember the open scene for the next start
    if let Some(mut config) = config {
        config.last_scene = app.selected_scene_path();
        if let Err(e) = config.save() {
            log::warn!("failed to save config: {e}");
        }
    }

    if let Err(err) = res {
        println!("{err:?}");
    }

    Ok(())
}

/// Index of the scene opened last time, falling back to the first file.
fn initial_selection(scene_files: &[SceneFile], last_scene: Option<&str>) -> Option<usize> {
    if scene_files.is_empty() {
        return None;
    }
    let index = last_scene
        .and_then(|path| {
            scene_files
                .iter()
                .position(|f| f.relative_path().as_str() == path)
        })
        .unwrap_or(0);
    Some(index)
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()>
where
    B::Error: Send + Sync + 'static,
{
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            match key.code {
                KeyCode::Char('q') => return Ok(()),
                KeyCode::Down | KeyCode::Char('j') => app.next_file(),
                KeyCode::Up | KeyCode::Char('k') => app.previous_file(),
                _ => {}
            }
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .margin(1)
        .constraints([Constraint::Percentage(30), Constraint::Percentage(70)].as_ref())
        .split(f.area());

    // Scene list panel
    let file_items: Vec<ListItem> = app
        .scene_files
        .iter()
        .map(|file| ListItem::new(vec![Line::from(vec![Span::raw(file.display_path())])]))
        .collect();

    let files_list = List::new(file_items)
        .block(Block::default().borders(Borders::ALL).title("Scenes"))
        .highlight_style(Style::default().bg(Color::Yellow).fg(Color::Black));

    f.render_stateful_widget(files_list, chunks[0], &mut app.file_list_state);

    // Scene panel: one line per block, styled per run
    let content_text: Vec<Line> = match &app.selected_document {
        Some(document) => document
            .blocks()
            .iter()
            .map(|block| {
                Line::from(
                    block
                        .runs()
                        .iter()
                        .map(|run| Span::styled(run.text().to_string(), span_style(run)))
                        .collect::<Vec<_>>(),
                )
            })
            .collect(),
        None => vec![Line::from("Select a scene to view it")],
    };

    let content = Paragraph::new(content_text)
        .block(Block::default().borders(Borders::ALL).title("Scene"))
        .wrap(ratatui::widgets::Wrap { trim: false });

    f.render_widget(content, chunks[1]);

    // Status and key help at the bottom
    let help_text = Line::from(vec![
        Span::raw(app.status.clone()),
        Span::raw("  |  q: Quit | ↑/k: Previous | ↓/j: Next"),
    ]);

    let help = Paragraph::new(vec![help_text]).block(Block::default());

    let bottom_chunk = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(3)].as_ref())
        .split(f.area());

    f.render_widget(help, bottom_chunk[1]);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn files(paths: &[&str]) -> Vec<SceneFile> {
        paths
            .iter()
            .map(|p| SceneFile::from_relative_str(p))
            .collect()
    }

    #[test]
    fn initial_selection_restores_last_scene() {
        let scenes = files(&["a.nvm", "part-one/b.nvm", "c.nvm"]);
        assert_eq!(initial_selection(&scenes, Some("part-one/b.nvm")), Some(1));
    }

    #[test]
    fn initial_selection_falls_back_to_first() {
        let scenes = files(&["a.nvm", "b.nvm"]);
        assert_eq!(initial_selection(&scenes, Some("gone.nvm")), Some(0));
        assert_eq!(initial_selection(&scenes, None), Some(0));
    }

    #[test]
    fn initial_selection_with_empty_library() {
        assert_eq!(initial_selection(&[], Some("a.nvm")), None);
    }
}
