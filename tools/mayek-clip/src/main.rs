use clap::{Arg, Command};
use copypasta::{ClipboardContext, ClipboardProvider};
use tracing::level_filters::LevelFilter;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use mayek_normalize::dictionary_lib::DICT_PATH_ENV;
use mayek_normalize::utils::char_count;
use mayek_normalize::{find_max_utf8_length, format_thousand, CustomDictionaryFile, MayekConverter};

const RED: &str = "\x1B[1;31m";
const GREEN: &str = "\x1B[1;32m";
const YELLOW: &str = "\x1B[1;33m";
const BLUE: &str = "\x1B[1;34m";
const RESET: &str = "\x1B[0m";

/// Preview length, in bytes, for the clipboard echo.
const PREVIEW_BYTES: usize = 600;

fn build_cli() -> Command {
    Command::new("mayek-clip")
        .about("Normalize the Meetei Mayek text on the clipboard in place")
        .arg(
            Arg::new("dict_path")
                .long("dict-path")
                .value_name("file")
                .env(DICT_PATH_ENV)
                .help("Location of the saved custom dictionary."),
        )
}

fn preview(text: &str) -> (&str, &str) {
    if text.len() > PREVIEW_BYTES {
        (&text[..find_max_utf8_length(text, PREVIEW_BYTES)], "...")
    } else {
        (text, "")
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::WARN.into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .init();

    let matches = build_cli().get_matches();

    let converter = match MayekConverter::new() {
        Ok(converter) => converter,
        Err(err) => {
            eprintln!("{RED}Error loading default dictionary: {err}{RESET}");
            return;
        }
    };

    let saved = matches
        .get_one::<String>("dict_path")
        .map(|path| CustomDictionaryFile::new(path))
        .or_else(CustomDictionaryFile::default_location);
    if let Some(saved) = &saved {
        if let Err(err) = converter.store().restore(saved) {
            warn!(path = %saved.path().display(), error = %err, "error loading saved dictionary");
        }
    }

    let mut ctx: ClipboardContext = match ClipboardContext::new() {
        Ok(context) => context,
        Err(err) => {
            eprintln!("{RED}Error creating clipboard context: {err}{RESET}");
            return;
        }
    };

    let contents = match ctx.get_contents() {
        Ok(contents) => contents,
        Err(err) => {
            eprintln!("{RED}No text in clipboard: {err}{RESET}");
            return;
        }
    };

    let output = match converter.convert(&contents) {
        Ok(output) => output,
        Err(err) => {
            eprintln!("{RED}{err}{RESET}");
            return;
        }
    };

    let (display_input, input_ellipsis) = preview(&contents);
    let (display_output, output_ellipsis) = preview(&output);
    let dictionary_label = if converter.store().is_customized() {
        "default + custom"
    } else {
        "default"
    };

    eprintln!("{BLUE}Dictionary: {dictionary_label}{RESET}");
    eprintln!("{GREEN}Clipboard Input:\n{YELLOW}{display_input}{input_ellipsis}\n");
    eprintln!("{GREEN}Converted Output:\n{YELLOW}{display_output}{output_ellipsis}{RESET}");

    let output_length = char_count(&output);
    match ctx.set_contents(output) {
        Ok(()) => eprintln!(
            "{BLUE}(Output set to clipboard: {} chars){RESET}",
            format_thousand(output_length)
        ),
        Err(err) => eprintln!("{RED}Error setting clipboard: {err}{RESET}"),
    }
}
