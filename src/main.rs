//! Markpad - markdown toolbar formatting and HTML preview from the terminal.
//!
//! # Usage
//!
//! ```bash
//! markpad render README.md -o preview.html --standalone
//! markpad render --watch README.md -o preview.html
//! markpad format notes.md bold --start 5 --end 9 --in-place
//! markpad format notes.md link --start 0 --end 2 --url https://x.com
//! markpad copy --html README.md
//! markpad css --theme dark > highlight.css
//! ```

use std::fs;
use std::io::{self, BufReader, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;

use markpad::config::{
    ConfigFlags, clear_config_flags, global_config_path, load_config_flags, local_override_path,
    parse_flag_tokens, save_config_flags,
};
use markpad::editor::{Editor, FormatAction, LinePrompter, Prompter, Selection, SystemClipboard};
use markpad::highlight::{self, HighlightTheme};
use markpad::perf;
use markpad::preview::{PreviewRenderer, RenderCounter, standalone_page};
use markpad::watcher::SourceWatcher;

const WATCH_DEBOUNCE: Duration = Duration::from_millis(200);
const WATCH_POLL: Duration = Duration::from_millis(250);

/// Markdown toolbar formatting and live HTML preview
#[derive(Parser, Debug)]
#[command(name = "markpad", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Background the highlight stylesheet is designed for
    #[arg(long, value_enum, global = true)]
    theme: Option<HighlightTheme>,

    /// Log timing of rendering and highlighting
    #[arg(long, global = true)]
    perf: bool,

    /// Save current command-line flags as defaults
    #[arg(long, global = true)]
    save: bool,

    /// Clear saved defaults
    #[arg(long, global = true)]
    clear: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a markdown file to HTML
    Render {
        /// Markdown file to render
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Write HTML here instead of stdout
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,

        /// Re-render whenever the file changes
        #[arg(short, long)]
        watch: bool,

        /// Emit a complete HTML document with the highlight stylesheet
        #[arg(long)]
        standalone: bool,

        /// Omit raw HTML found in the markdown
        #[arg(long)]
        safe: bool,

        /// Leave code blocks unhighlighted
        #[arg(long)]
        no_highlight: bool,
    },

    /// Apply a toolbar action to a markdown file
    Format {
        /// Markdown file to edit
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Toolbar action
        #[arg(value_enum)]
        action: FormatAction,

        /// Selection start (char offset); defaults to the start of the file
        #[arg(long)]
        start: Option<usize>,

        /// Selection end (char offset); defaults to the end of the file
        #[arg(long)]
        end: Option<usize>,

        /// Link URL (prompted for when missing)
        #[arg(long)]
        url: Option<String>,

        /// Link text when nothing is selected (prompted for when missing)
        #[arg(long)]
        text: Option<String>,

        /// Rewrite the file instead of printing the result
        #[arg(short, long)]
        in_place: bool,

        /// Print the result and new selection as JSON
        #[arg(long, conflicts_with = "in_place")]
        json: bool,
    },

    /// Copy a file's markdown, or its rendered HTML, to the clipboard
    Copy {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Copy the rendered HTML instead of the markdown
        #[arg(long)]
        html: bool,
    },

    /// Print the stylesheet for highlighted code blocks
    Css,
}

#[derive(Debug, Serialize)]
struct FormatOutcome {
    changed: bool,
    text: String,
    selection: Selection,
}

/// Answers prompts from command-line flags first, then from the terminal.
struct FlagPrompter<P> {
    answers: std::vec::IntoIter<Option<String>>,
    fallback: P,
}

impl<P: Prompter> Prompter for FlagPrompter<P> {
    fn prompt(&mut self, message: &str, default: Option<&str>) -> Option<String> {
        match self.answers.next().flatten() {
            Some(answer) => Some(answer),
            None => self.fallback.prompt(message, default),
        }
    }
}

fn main() -> Result<()> {
    let raw_args = std::env::args().collect::<Vec<_>>();
    let cli = Cli::parse();
    let global_path = global_config_path();
    let local_path = local_override_path();
    let cli_flags = parse_flag_tokens(&raw_args);

    if cli.clear {
        clear_config_flags(&global_path)?;
    }
    if cli.save {
        save_config_flags(&global_path, &cli_flags)?;
    }

    let file_flags = if cli.clear {
        ConfigFlags::default()
    } else {
        let global_flags = load_config_flags(&global_path)?;
        let local_flags = load_config_flags(&local_path)?;
        global_flags.union(&local_flags)
    };
    let effective = file_flags.union(&cli_flags).union(&ConfigFlags {
        perf: cli.perf,
        theme: cli.theme,
        ..ConfigFlags::default()
    });

    init_logging(effective.perf)?;
    perf::set_enabled(effective.perf);

    match cli.command {
        Command::Render {
            file,
            output,
            watch,
            standalone,
            safe,
            no_highlight,
        } => {
            let flags = effective.union(&ConfigFlags {
                watch,
                standalone,
                safe,
                no_highlight,
                ..ConfigFlags::default()
            });
            render(&file, output.as_deref(), &flags)
        }
        Command::Format {
            file,
            action,
            start,
            end,
            url,
            text,
            in_place,
            json,
        } => {
            let source = read_source(&file)?;
            let len = source.chars().count();
            let selection =
                Selection::checked(start.unwrap_or(0), end.unwrap_or(len), len)
                    .with_context(|| format!("Invalid selection for {}", file.display()))?;

            let mut prompter = FlagPrompter {
                answers: vec![url, text].into_iter(),
                fallback: LinePrompter::new(BufReader::new(io::stdin()), io::stderr()),
            };
            let outcome = apply_action(&source, selection, action, &mut prompter);

            if in_place {
                if outcome.changed {
                    fs::write(&file, &outcome.text)
                        .with_context(|| format!("Failed to write {}", file.display()))?;
                }
                return Ok(());
            }
            let mut out = io::stdout().lock();
            if json {
                serde_json::to_writer_pretty(&mut out, &outcome)?;
                writeln!(out)?;
            } else {
                out.write_all(outcome.text.as_bytes())?;
            }
            Ok(())
        }
        Command::Copy { file, html } => {
            let source = read_source(&file)?;
            let editor = Editor::new(&source, renderer_for(&effective), RenderCounter::default());
            let mut clipboard = SystemClipboard;
            if html {
                editor.copy_html(&mut clipboard);
            } else {
                editor.copy_markdown(&mut clipboard);
            }
            Ok(())
        }
        Command::Css => {
            let css = highlight::stylesheet(effective.theme())?;
            io::stdout().lock().write_all(css.as_bytes())?;
            Ok(())
        }
    }
}

fn init_logging(perf_enabled: bool) -> Result<()> {
    let mut filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::WARN.into());
    if perf_enabled {
        filter = filter.add_directive("markpad::perf=info".parse()?);
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
    Ok(())
}

fn read_source(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn renderer_for(flags: &ConfigFlags) -> PreviewRenderer {
    let renderer = if flags.no_highlight {
        PreviewRenderer::plain()
    } else {
        PreviewRenderer::new()
    };
    renderer.with_raw_html(!flags.safe)
}

fn apply_action(
    source: &str,
    selection: Selection,
    action: FormatAction,
    prompter: &mut dyn Prompter,
) -> FormatOutcome {
    // The preview is not shown here, so skip highlighting work.
    let mut editor = Editor::new(source, PreviewRenderer::plain(), RenderCounter::default());
    editor.select(selection);
    let changed = editor.apply(action, prompter);
    FormatOutcome {
        changed,
        selection: editor.selection(),
        text: editor.text(),
    }
}

fn render(file: &Path, output: Option<&Path>, flags: &ConfigFlags) -> Result<()> {
    let renderer = renderer_for(flags);
    render_once(&renderer, file, output, flags)?;
    if !flags.watch {
        return Ok(());
    }

    let mut watcher = SourceWatcher::new(file, WATCH_DEBOUNCE)
        .with_context(|| format!("Failed to watch {}", file.display()))?;
    tracing::info!(file = %watcher.source().display(), "watching for changes");
    loop {
        if watcher.poll_changed() {
            if let Err(err) = render_once(&renderer, file, output, flags) {
                tracing::warn!("re-render failed: {err:#}");
            }
        }
        std::thread::sleep(WATCH_POLL);
    }
}

fn render_once(
    renderer: &PreviewRenderer,
    file: &Path,
    output: Option<&Path>,
    flags: &ConfigFlags,
) -> Result<()> {
    let source = read_source(file)?;
    let mut html = renderer.render(&source);
    if flags.standalone {
        let css = if flags.no_highlight {
            None
        } else {
            Some(highlight::stylesheet(flags.theme())?)
        };
        let title = file
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        html = standalone_page(&title, &html, css.as_deref());
    }

    match output {
        Some(path) => {
            fs::write(path, html).with_context(|| format!("Failed to write {}", path.display()))
        }
        None => {
            let mut out = io::stdout().lock();
            out.write_all(html.as_bytes())?;
            out.flush()?;
            Ok(())
        }
    }
}
