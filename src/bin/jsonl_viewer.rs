use clap::{Parser, ValueEnum};
use color_eyre::Result;
use color_eyre::eyre::eyre;
use jsonl_viewer::config::Config;
use jsonl_viewer::core::{ConnectionParams, EngineError, TransportError};
use jsonl_viewer::services::export::copy_to_clipboard;
use jsonl_viewer::{PageSize, PageView, Session, TransformLanguage};
use regex::Regex;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::str::FromStr;
use tracing::{error, info};

const MAX_CELL_WIDTH: usize = 40;

/// Page through line-delimited JSON, narrow it to columns and reshape it with SQL or JMESPath.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Local .jsonl file to open on startup
    file: Option<PathBuf>,
    /// Fetch the dataset over SFTP from this host instead
    #[arg(long, value_name = "HOST", requires_all = ["remote_user", "remote_path"])]
    remote_host: Option<String>,
    /// SSH port (defaults to the configured port)
    #[arg(long, value_name = "PORT")]
    remote_port: Option<String>,
    #[arg(long, value_name = "USER")]
    remote_user: Option<String>,
    /// Path of the file on the remote host
    #[arg(long, value_name = "PATH")]
    remote_path: Option<String>,
    /// SSH password
    #[arg(long, env = "JSONL_VIEWER_PASSWORD", hide_env_values = true)]
    remote_password: Option<String>,
    /// Enable file logging at the given level (overrides RUST_LOG)
    #[arg(long = "logging", value_enum)]
    logging: Option<LogLevel>,
    /// Path to a config file (overrides default config discovery)
    #[arg(long = "config", value_name = "PATH")]
    config: Option<PathBuf>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum LogLevel { Error, Warn, Info, Debug, Trace }

/// One line typed at the prompt.
#[derive(Debug, Clone, PartialEq)]
enum Command {
    Open(PathBuf),
    Columns(Vec<String>),
    /// `None` means the configured default dialect.
    Transform(Option<TransformLanguage>, String),
    Undo,
    Reset,
    Page(isize),
    Size(usize),
    Copy(String, String),
    Show,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();
        match word {
            "open" if !rest.is_empty() => Ok(Self::Open(PathBuf::from(rest))),
            "cols" => Ok(Self::Columns(
                rest.split(',')
                    .map(str::trim)
                    .filter(|c| !c.is_empty())
                    .map(str::to_string)
                    .collect(),
            )),
            "sql" => Ok(Self::Transform(Some(TransformLanguage::Sql), rest.to_string())),
            "jmes" => Ok(Self::Transform(Some(TransformLanguage::Jmes), rest.to_string())),
            "expr" => Ok(Self::Transform(None, rest.to_string())),
            "undo" => Ok(Self::Undo),
            "reset" => Ok(Self::Reset),
            "next" | "n" => Ok(Self::Page(1)),
            "prev" | "p" => Ok(Self::Page(-1)),
            "size" => rest
                .parse()
                .map(Self::Size)
                .map_err(|_| format!("size expects a number, got '{rest}'")),
            "copy" => {
                let (rows, cols) = rest.split_once(char::is_whitespace).unwrap_or((rest, "all"));
                Ok(Self::Copy(rows.to_string(), cols.trim().to_string()))
            }
            "" | "show" => Ok(Self::Show),
            "help" | "?" => Ok(Self::Help),
            "quit" | "q" | "exit" => Ok(Self::Quit),
            other => Err(format!("unknown command '{other}', type 'help'")),
        }
    }
}

const HELP: &str = "\
open <path>          load a local .jsonl file
cols a,b,c           show only these columns (empty shows all)
sql <query>          transform with SQL over the table `df`
jmes <expr>          transform every row with JMESPath
expr <text>          transform with the configured default dialect
undo                 revert the last cols/sql/jmes
reset                back to the dataset as loaded
next | prev          move one page
size <n>             rows per page: 5, 10, 20, 50, 100
copy <rows> [cols]   copy cells of this page as JSON lines, e.g. copy 0-2 0,3
show                 redraw the current page
quit";

/// Parse `0-2,5` style index lists; `all` selects `0..len`.
fn parse_indices(spec: &str, len: usize) -> Result<Vec<usize>, String> {
    if spec == "all" || spec == "*" {
        return Ok((0..len).collect());
    }
    let re = Regex::new(r"^(\d+)(?:-(\d+))?$").map_err(|e| e.to_string())?;
    let mut out = Vec::new();
    for part in spec.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let caps = re
            .captures(part)
            .ok_or_else(|| format!("bad index or range '{part}'"))?;
        let start: usize = caps[1].parse().map_err(|_| format!("bad index '{part}'"))?;
        let end: usize = match caps.get(2) {
            Some(m) => m.as_str().parse().map_err(|_| format!("bad index '{part}'"))?,
            None => start,
        };
        out.extend(start..=end);
    }
    Ok(out)
}

fn truncate(s: &str, width: usize) -> String {
    let flat = s.replace('\n', " ");
    if flat.chars().count() <= width {
        flat
    } else {
        let mut t: String = flat.chars().take(width.saturating_sub(1)).collect();
        t.push('…');
        t
    }
}

fn render(view: &PageView, out: &mut impl Write) -> io::Result<()> {
    let cells = view.display_rows();
    let widths: Vec<usize> = view
        .columns
        .iter()
        .enumerate()
        .map(|(i, h)| {
            cells
                .iter()
                .map(|r| r[i].chars().count())
                .chain(std::iter::once(h.chars().count()))
                .max()
                .unwrap_or(0)
                .min(MAX_CELL_WIDTH)
        })
        .collect();
    let number_width = view.window.end.max(1).to_string().len();

    let header: Vec<String> = view
        .columns
        .iter()
        .zip(&widths)
        .map(|(h, w)| format!("{:<w$}", truncate(h, *w), w = *w))
        .collect();
    writeln!(out, "{:>number_width$}  {}", "#", header.join(" | "))?;
    for (i, row) in cells.iter().enumerate() {
        let line: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(c, w)| format!("{:<w$}", truncate(c, *w), w = *w))
            .collect();
        writeln!(out, "{:>number_width$}  {}", view.window.start + i + 1, line.join(" | "))?;
    }
    writeln!(
        out,
        "Page {} of {} ({} rows)",
        view.window.page_index, view.window.total_pages, view.window.total_rows
    )
}

fn report(result: Result<(), EngineError>) {
    if let Err(e) = result {
        error!("{e}");
        eprintln!("Error: {e}");
    }
}

#[cfg(feature = "remote")]
fn load_remote(session: &mut Session, params: ConnectionParams, path: String) -> Result<(), EngineError> {
    use jsonl_viewer::core::SourceType;
    use jsonl_viewer::services::{SftpSource, fetch_in_background};
    use std::sync::Arc;

    println!("Fetching {path} from {}...", params.hostname);
    let host = params.hostname.clone();
    let handle = fetch_in_background(Arc::new(SftpSource), params, path.clone());
    let text = handle
        .join()
        .map_err(|_| TransportError::Transport("remote fetch thread panicked".into()))??;
    session.load_fetched(&text, SourceType::Remote { host, path })
}

#[cfg(not(feature = "remote"))]
fn load_remote(_session: &mut Session, _params: ConnectionParams, _path: String) -> Result<(), EngineError> {
    Err(TransportError::Transport("this build has no remote support (enable the `remote` feature)".into()).into())
}

fn run_command(
    session: &mut Session,
    command: Command,
    default_language: TransformLanguage,
    out: &mut impl Write,
) -> Result<bool> {
    match command {
        Command::Open(path) => report(session.load_local(&path)),
        Command::Columns(names) => {
            for warning in session.project(&names) {
                println!("Warning: {warning}");
            }
        }
        Command::Transform(language, expr) => {
            report(session.transform(&expr, language.unwrap_or(default_language)))
        }
        Command::Undo => {
            report(session.undo());
        }
        Command::Reset => session.reset_to_original(),
        Command::Page(delta) => {
            session.go_to_page(delta);
        }
        Command::Size(n) => match PageSize::try_from(n) {
            Ok(size) => session.set_page_size(size),
            Err(e) => eprintln!("Error: {e}"),
        },
        Command::Copy(rows, cols) => {
            let view = session.page();
            let selection = parse_indices(&rows, view.rows.len())
                .and_then(|r| parse_indices(&cols, view.columns.len()).map(|c| (r, c)));
            match selection {
                Ok((r, c)) => {
                    let text = session.export_selection(&r, &c);
                    if text.is_empty() {
                        return Ok(true);
                    }
                    writeln!(out, "{text}")?;
                    match copy_to_clipboard(&text) {
                        Ok(()) => println!("Copied {} line(s) to the clipboard.", text.lines().count()),
                        Err(e) => eprintln!("Clipboard unavailable: {e}"),
                    }
                }
                Err(e) => eprintln!("Error: {e}"),
            }
            return Ok(true);
        }
        Command::Show => {}
        Command::Help => {
            writeln!(out, "{HELP}")?;
            return Ok(true);
        }
        Command::Quit => return Ok(false),
    }
    render(&session.page(), out)?;
    Ok(true)
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();
    let level = match args.logging {
        Some(LogLevel::Error) => Some(tracing::Level::ERROR),
        Some(LogLevel::Warn) => Some(tracing::Level::WARN),
        Some(LogLevel::Info) => Some(tracing::Level::INFO),
        Some(LogLevel::Debug) => Some(tracing::Level::DEBUG),
        Some(LogLevel::Trace) => Some(tracing::Level::TRACE),
        None => None,
    };
    jsonl_viewer::logging::init_with(None, level)?;

    let cfg = match Config::from_path(args.config.as_ref()) {
        Ok(cfg) => cfg,
        Err(e) if args.config.is_some() => return Err(eyre!("failed to load config: {e}")),
        Err(e) => {
            error!("Falling back to default config: {e}");
            Config::default()
        }
    };
    info!(page_size = %cfg.page_size, language = %cfg.transform_language, "starting");

    let mut session = Session::with_page_size(cfg.page_size);
    if let Some(path) = &args.file {
        report(session.load_local(path));
    } else if let Some(host) = &args.remote_host {
        let port = args.remote_port.clone().unwrap_or_else(|| cfg.default_port.to_string());
        let params = ConnectionParams::from_fields(
            host,
            &port,
            args.remote_user.as_deref().unwrap_or_default(),
            args.remote_password.as_deref().unwrap_or_default(),
        );
        match params {
            Ok(params) => report(load_remote(
                &mut session,
                params,
                args.remote_path.clone().unwrap_or_default(),
            )),
            Err(e) => report(Err(e.into())),
        }
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if session.source().is_some() {
        render(&session.page(), &mut out)?;
    }
    let stdin = io::stdin();
    loop {
        write!(out, "> ")?;
        out.flush()?;
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let command = match line.parse::<Command>() {
            Ok(command) => command,
            Err(e) => {
                eprintln!("{e}");
                continue;
            }
        };
        if !run_command(&mut session, command, cfg.transform_language, &mut out)? {
            break;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!("cols a, b".parse::<Command>().unwrap(), Command::Columns(vec!["a".into(), "b".into()]));
        assert_eq!("cols".parse::<Command>().unwrap(), Command::Columns(vec![]));
        assert_eq!(
            "sql SELECT * FROM df".parse::<Command>().unwrap(),
            Command::Transform(Some(TransformLanguage::Sql), "SELECT * FROM df".into())
        );
        assert_eq!("expr x".parse::<Command>().unwrap(), Command::Transform(None, "x".into()));
        assert_eq!("prev".parse::<Command>().unwrap(), Command::Page(-1));
        assert_eq!("copy 0-1".parse::<Command>().unwrap(), Command::Copy("0-1".into(), "all".into()));
        assert!("size ten".parse::<Command>().is_err());
        assert!("frobnicate".parse::<Command>().is_err());
    }

    #[test]
    fn test_parse_indices() {
        assert_eq!(parse_indices("0-2,5", 10).unwrap(), vec![0, 1, 2, 5]);
        assert_eq!(parse_indices("all", 3).unwrap(), vec![0, 1, 2]);
        assert!(parse_indices("x", 3).is_err());
    }

    #[test]
    fn test_render_page() {
        let mut session = Session::with_page_size(PageSize::Five);
        session.load("{\"a\":1,\"b\":\"x\"}\n{\"a\":2}\n").unwrap();
        let mut buf = Vec::new();
        render(&session.page(), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("a | b"));
        assert!(text.contains("Page 1 of 1 (2 rows)"));
    }
}
