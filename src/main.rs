//! blockmark CLI - Markdown block structure to HTML, tokens or lint results

use std::io::{self, Read, Write};
use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "blockmark", version, about)]
struct Cli {
    /// Input file; reads stdin when omitted or `-`
    file: Option<PathBuf>,

    /// Print the token stream, one token per line, instead of HTML
    #[arg(long)]
    tokens: bool,

    /// Render every line break inside a paragraph as `<br />`
    #[arg(long)]
    hard_breaks: bool,

    /// Check the document against the style rules instead of rendering;
    /// exits with status 1 when any rule is violated
    #[arg(long, conflicts_with = "tokens")]
    lint: bool,
}

fn main() -> io::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let input = match &cli.file {
        Some(path) if path.as_os_str() != "-" => std::fs::read_to_string(path)?,
        _ => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };

    let mut stdout = io::stdout().lock();
    if cli.lint {
        let source = match &cli.file {
            Some(path) if path.as_os_str() != "-" => path.display().to_string(),
            _ => "stdin".to_string(),
        };
        let diagnostics = blockmark::lint::lint(&input);
        for diagnostic in &diagnostics {
            writeln!(stdout, "{source}:{diagnostic}")?;
        }
        stdout.flush()?;
        if !diagnostics.is_empty() {
            std::process::exit(1);
        }
        return Ok(());
    }
    if cli.tokens {
        for token in blockmark::tokenize(&input) {
            writeln!(stdout, "{token}")?;
        }
    } else {
        let options = blockmark::Options {
            hard_line_breaks: cli.hard_breaks,
        };
        let html = blockmark::to_html_with_options(&input, &options);
        stdout.write_all(html.as_bytes())?;
    }
    stdout.flush()
}
