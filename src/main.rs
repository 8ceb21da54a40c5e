use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail};
use clap::Parser;
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use lingodrill::app::{App, AppScreen};
use lingodrill::config::Config;
use lingodrill::dataset::catalog::Catalog;
use lingodrill::event::{AppEvent, Command, EventHandler, command_for_key};
use lingodrill::i18n::Language;
use lingodrill::store::json_store::JsonStore;
use lingodrill::store::schema::ExportData;
use lingodrill::ui;
use lingodrill::ui::components::header::Header;
use lingodrill::ui::components::module_view::{ModuleBody, SummaryCard};
use lingodrill::ui::components::progress_bar::ProgressBar;
use lingodrill::ui::layout::{AppLayout, pack_hint_lines, split_hints};

const LOG_ENV: &str = "LINGODRILL_LOG";

#[derive(Parser)]
#[command(name = "lingodrill", version, about = "Terminal vocabulary drills")]
struct Cli {
    #[arg(short, long, help = "Display language (en, es)")]
    lang: Option<String>,

    #[arg(short, long, help = "Shuffle items and matching definitions")]
    random: bool,

    #[arg(short, long, help = "Player name stored with the profile")]
    user: Option<String>,

    #[arg(short, long, help = "Start this module id directly")]
    module: Option<String>,

    #[arg(short, long, help = "Extra dataset file or directory of *.json datasets")]
    data: Vec<PathBuf>,

    #[arg(short, long, help = "Theme name")]
    theme: Option<String>,

    #[arg(long, value_name = "FILE", help = "Write profile, history and config to FILE and exit")]
    export: Option<PathBuf>,

    #[arg(long, value_name = "FILE", help = "Replace profile and history from an export FILE and exit")]
    import: Option<PathBuf>,
}

fn init_logging(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join("lingodrill.log"))
        .context("opening log file")?;
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let store = JsonStore::new().ok();
    let data_dir = store
        .as_ref()
        .map(|s| s.base_dir().to_path_buf())
        .unwrap_or_else(JsonStore::default_dir);
    if let Err(e) = init_logging(&data_dir) {
        eprintln!("logging disabled: {e:#}");
    }

    let mut config = Config::load().unwrap_or_else(|e| {
        error!(target: "lingodrill::config", error = %e, "unreadable config, using defaults");
        Config::default()
    });
    if let Some(ref lang) = cli.lang {
        match Language::from_code(lang) {
            Some(language) => config.set_language(language),
            None => bail!("unsupported language '{lang}' (expected en or es)"),
        }
    }
    if cli.random {
        config.random_mode = true;
    }
    if let Some(ref theme) = cli.theme {
        config.theme = theme.clone();
    }
    if let Some(ref user) = cli.user {
        config.username = Some(user.clone());
    }
    config.validate();

    if let Some(ref path) = cli.export {
        return export_data(store.as_ref(), &config, path);
    }
    if let Some(ref path) = cli.import {
        return import_data(store.as_ref(), path);
    }

    let mut catalog = Catalog::bundled();
    for path in &cli.data {
        catalog
            .load_path(path)
            .with_context(|| format!("loading datasets from {}", path.display()))?;
    }

    let mut app = App::new(config, store, catalog);
    app.config_path = Some(Config::config_path());
    if let Some(ref id) = cli.module
        && !app.start_module_by_id(id)
    {
        bail!("no module with id '{id}'");
    }
    info!(target: "lingodrill::app", modules = app.catalog.len(), "starting");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let events = EventHandler::new(Duration::from_millis(50));
    let result = run_app(&mut terminal, &mut app, &events);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        error!(target: "lingodrill::app", error = %err, "event loop failed");
        eprintln!("Error: {err:?}");
    }

    Ok(())
}

fn export_data(store: Option<&JsonStore>, config: &Config, path: &Path) -> Result<()> {
    let Some(store) = store else {
        bail!("data directory is not available");
    };
    let export = store.export_all(config);
    fs::write(path, serde_json::to_string_pretty(&export)?)
        .with_context(|| format!("writing {}", path.display()))?;
    println!("exported to {}", path.display());
    Ok(())
}

fn import_data(store: Option<&JsonStore>, path: &Path) -> Result<()> {
    let Some(store) = store else {
        bail!("data directory is not available");
    };
    let content = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let export: ExportData = serde_json::from_str(&content)?;
    store.import_all(&export)?;
    export.config.save()?;
    println!("imported from {}", path.display());
    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
) -> Result<()> {
    loop {
        terminal.draw(|frame| render(frame, app))?;

        match events.next()? {
            AppEvent::Key(key) => {
                if let Some(command) = command_for_key(app.screen(), app.shell.view.as_ref(), key) {
                    apply(app, command);
                }
            }
            AppEvent::Tick => app.tick(Instant::now()),
            AppEvent::Resize(_, _) => {}
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn apply(app: &mut App, command: Command) {
    match command {
        Command::Quit => app.quit(),
        Command::Menu => app.go_to_menu(),
        Command::ToggleLanguage => app.toggle_language(),
        Command::ToggleRandom => app.toggle_random(),
        Command::MenuUp => app.menu.prev(),
        Command::MenuDown => app.menu.next(),
        Command::Start => app.start_selected(),
        Command::StartAt(index) => {
            app.start_module(index);
        }
        Command::Restart => app.restart(),
        Command::Undo => app.undo(),
        Command::Next => app.next(),
        Command::Prev => app.prev(),
        Command::Input(input) => app.handle_input(input),
    }
}

fn render(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;
    frame.render_widget(Block::default().style(Style::default().bg(colors.bg())), area);

    let hints = match (app.screen(), app.shell.view.as_ref()) {
        (AppScreen::Menu, _) | (_, None) => app.menu.keys_hint(app.shell.random_mode),
        (_, Some(view)) => view.keys_hint.as_str(),
    };
    let hint_lines = pack_hint_lines(&split_hints(hints), area.width as usize);
    let layout = AppLayout::new(area, hint_lines.len() as u16);

    let session = (app.screen() != AppScreen::Menu).then_some(app.shell.session_score);
    frame.render_widget(
        Header::new(app.menu.title(), &app.profile, session, app.language(), app.theme),
        layout.header,
    );

    match (app.screen(), app.shell.view.as_ref()) {
        (AppScreen::Module, Some(view)) => {
            frame.render_widget(ModuleBody::new(view, &layout, app.theme), layout.main);
            if let (Some(progress_area), Some((done, total))) = (layout.progress, view.progress) {
                let label = view.progress_label.clone().unwrap_or_default();
                frame.render_widget(
                    ProgressBar::from_counts(&label, done, total, app.theme),
                    progress_area,
                );
            }
        }
        (AppScreen::Summary, Some(view)) => {
            let card = ui::layout::centered_rect(50, 60, layout.main);
            frame.render_widget(SummaryCard::new(view, app.theme), card);
        }
        _ => {
            let menu_area = ui::layout::centered_rect(60, 90, layout.main);
            frame.render_widget(&app.menu, menu_area);
        }
    }

    let footer: Vec<Line> = hint_lines
        .into_iter()
        .map(|line| Line::from(Span::styled(line, Style::default().fg(colors.muted()))))
        .collect();
    frame.render_widget(Paragraph::new(footer), layout.footer);
}
