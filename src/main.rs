//zfind/src/main.rs
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::sync::mpsc;
use std::time::Duration;
use std::{env, fs, process};

use zfind::kernel::services::adapters::{load_settings, SearchRuntime};
use zfind::kernel::{EditorSearcher, SearchError, SearchEvent, SearchMode, TextHost};
use zfind::models::{slice_to_cow, TextBuffer};

const USAGE: &str =
    "usage: zfind [--regex|--word] [--ignore-case] [--replace <text>] [--] <file> <pattern>";
const IDLE_TIMEOUT: Duration = Duration::from_secs(60);

struct Args {
    path: PathBuf,
    pattern: String,
    mode: SearchMode,
    ignore_case: bool,
    replace: Option<String>,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Args, String> {
    let mut positional = Vec::new();
    let mut mode = SearchMode::Literal;
    let mut ignore_case = false;
    let mut replace = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--" => {
                positional.extend(args.by_ref());
                break;
            }
            "--regex" => mode = SearchMode::Regex,
            "--word" => mode = SearchMode::WholeWord,
            "--ignore-case" | "-i" => ignore_case = true,
            "--replace" => {
                let text = args.next().ok_or("--replace needs a value")?;
                replace = Some(text);
            }
            _ if arg.starts_with("--") => return Err(format!("unknown flag: {}", arg)),
            _ => positional.push(arg),
        }
    }

    let mut positional = positional.into_iter();
    let (Some(path), Some(pattern), None) =
        (positional.next(), positional.next(), positional.next())
    else {
        return Err("expected <file> and <pattern>".to_string());
    };

    Ok(Args {
        path: PathBuf::from(path),
        pattern,
        mode,
        ignore_case,
        replace,
    })
}

fn search_error(e: SearchError) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidInput, e)
}

fn wait(searcher: &mut EditorSearcher, buffer: &mut TextBuffer) -> io::Result<()> {
    if searcher.wait_for_idle(buffer, IDLE_TIMEOUT) {
        Ok(())
    } else {
        Err(io::Error::new(io::ErrorKind::TimedOut, "search did not finish"))
    }
}

fn main() -> io::Result<()> {
    let _logging = zfind::logging::init(None);

    let args = match parse_args(env::args().skip(1)) {
        Ok(args) => args,
        Err(msg) => {
            eprintln!("zfind: {}\n{}", msg, USAGE);
            process::exit(2);
        }
    };

    let settings = load_settings();
    let runtime = SearchRuntime::new(settings.worker_threads)?;

    let text = fs::read_to_string(&args.path)?;
    let mut buffer = TextBuffer::from_text(&text);
    let mut searcher = EditorSearcher::with_settings(runtime.handle(), &settings);
    let (events_tx, events_rx) = mpsc::channel();
    searcher.set_event_sender(events_tx);

    let mut options = settings.options(args.mode);
    options.case_insensitive |= args.ignore_case;

    searcher
        .search(&buffer, &args.pattern, options)
        .map_err(search_error)?;
    wait(&mut searcher, &mut buffer)?;

    match args.replace {
        None => {
            let results = searcher.results().unwrap_or_default();
            let stdout = io::stdout();
            let mut out = BufWriter::new(stdout.lock());
            for m in results.iter() {
                let (line, col) = buffer.offset_to_line_col(m.start);
                let matched = buffer.rope().slice(m.start..m.end);
                writeln!(
                    out,
                    "{}:{}:{}: {}",
                    args.path.display(),
                    line + 1,
                    col + 1,
                    slice_to_cow(matched)
                )?;
            }
            out.flush()?;
            if results.is_empty() {
                process::exit(1);
            }
        }
        Some(replacement) => {
            searcher
                .replace_all(&buffer, &replacement, None)
                .map_err(search_error)?;
            wait(&mut searcher, &mut buffer)?;

            let mut replaced = 0;
            for event in events_rx.try_iter() {
                match event {
                    SearchEvent::ReplaceCompleted { replaced: n } => replaced = n,
                    SearchEvent::ReplaceFailed { message } => {
                        return Err(io::Error::new(io::ErrorKind::Other, message));
                    }
                    SearchEvent::ResultsUpdated { .. } => {}
                }
            }

            if replaced > 0 {
                let mut writer = BufWriter::new(File::create(&args.path)?);
                buffer.write_to(&mut writer)?;
                writer.flush()?;
            }
            eprintln!("{}: {} replaced", args.path.display(), replaced);
        }
    }

    Ok(())
}
