use clap::Parser;
use mixin_from::{DefinitionForm, Error, MixinFrom, Options, Resolution};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Inline `@mixin name from 'file'` definitions into a stylesheet.
#[derive(Parser, Debug)]
#[command(name = "mixin-from", version)]
struct Args {
    /// Stylesheet to process
    file: PathBuf,

    /// Suffix appended to locations that do not mention it
    #[arg(long, default_value = ".css")]
    suffix: String,

    /// Look for `@mixin-definition` instead of `@define-mixin`
    #[arg(long)]
    deferred: bool,

    /// Let the file loader resolve relative locations
    #[arg(long)]
    loader_relative: bool,
}

/// Path of `location` on disk. With a base, relative locations are taken
/// from the base file's directory.
fn locate(location: &str, base: Option<&str>) -> PathBuf {
    match base {
        Some(base) => Path::new(base)
            .parent()
            .unwrap_or_else(|| Path::new(""))
            .join(location),
        None => PathBuf::from(location),
    }
}

async fn read_file(location: String, base: Option<String>) -> anyhow::Result<String> {
    let path = locate(&location, base.as_deref());
    tracing::debug!(path = %path.display(), "reading");
    tokio::fs::read_to_string(&path)
        .await
        .map_err(|err| anyhow::anyhow!("{}: {}", path.display(), err))
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let source = args.file.to_string_lossy().into_owned();
    let loader_relative = args.loader_relative;

    let input = match tokio::fs::read_to_string(&args.file).await {
        Ok(text) => text,
        Err(err) => {
            eprintln!("{}: {}", source, err);
            std::process::exit(1);
        }
    };

    let options = Options::new()
        .loader(read_file)
        .default_suffix(args.suffix)
        .resolution(if loader_relative {
            Resolution::LoaderRelative
        } else {
            Resolution::PathStack
        })
        .definitions(if args.deferred {
            DefinitionForm::Deferred
        } else {
            DefinitionForm::Direct
        });

    let result = MixinFrom::new(options)
        .process_css(&input, Some(&source))
        .await;
    match result {
        Ok(css) => print!("{}", css),
        Err(Error::Parse { location, source: err }) => {
            let text = if location == source {
                input
            } else {
                let base = loader_relative.then_some(source.as_str());
                tokio::fs::read_to_string(locate(&location, base))
                    .await
                    .unwrap_or_default()
            };
            report_parse_error(&location, &text, &err);
            std::process::exit(1);
        }
        Err(err) => {
            eprintln!("{}", err);
            std::process::exit(1);
        }
    }
}

fn report_parse_error(location: &str, text: &str, err: &mixin_from::ParseError) {
    let line_text = text.lines().nth(err.begin.line).unwrap_or("");
    eprintln!("{}:{}: {}", location, err.begin.line + 1, err.message);
    eprintln!("{}", line_text);
    eprintln!("{}", caret_line(err, line_text));
}

/// `^` under the first offending column, `~` under the rest of the span on
/// the same line.
fn caret_line(err: &mixin_from::ParseError, line_text: &str) -> String {
    let start = err.begin.column;
    let width = if err.end.line == err.begin.line {
        err.end.column.saturating_sub(start).max(1)
    } else {
        line_text.len().saturating_sub(start).max(1)
    };
    format!("{}^{}", " ".repeat(start), "~".repeat(width - 1))
}
