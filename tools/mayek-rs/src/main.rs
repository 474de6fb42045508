use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, IsTerminal, Read, Write};
use std::process::ExitCode;

use clap::{Arg, ArgAction, Command};
use encoding_rs::Encoding;
use encoding_rs_io::DecodeReaderBytesBuilder;
use tracing::level_filters::LevelFilter;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use mayek_normalize::dictionary_lib::DICT_PATH_ENV;
use mayek_normalize::utils::{char_count, check_input_size, format_thousand};
use mayek_normalize::{CustomDictionaryFile, DictionaryError, MayekConverter};

const DEFAULT_OUTPUT_FILE: &str = "converted-meetei-mayek.txt";

const RED: &str = "\x1B[1;31m";
const GREEN: &str = "\x1B[1;32m";
const BLUE: &str = "\x1B[1;34m";
const RESET: &str = "\x1B[0m";

fn build_cli() -> Command {
    Command::new("mayek-rs")
        .arg(
            Arg::new("input")
                .short('i')
                .long("input")
                .value_name("file")
                .help("Read original text from <file>."),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("file")
                .num_args(0..=1)
                .default_missing_value(DEFAULT_OUTPUT_FILE)
                .help("Write converted text to <file> (bare -o writes converted-meetei-mayek.txt)."),
        )
        .arg(
            Arg::new("dict")
                .short('d')
                .long("dict")
                .value_name("file")
                .help("Merge a custom JSON dictionary over the default and save it."),
        )
        .arg(
            Arg::new("reset_dict")
                .long("reset-dict")
                .action(ArgAction::SetTrue)
                .conflicts_with("dict")
                .help("Reset to the default dictionary and delete the saved custom dictionary."),
        )
        .arg(
            Arg::new("dict_path")
                .long("dict-path")
                .value_name("file")
                .env(DICT_PATH_ENV)
                .help("Location of the saved custom dictionary."),
        )
        .arg(
            Arg::new("in_enc")
                .long("in-enc")
                .value_name("encoding")
                .help("Encoding for input (default: detect BOM, else UTF-8): UTF-8|UTF-16LE|UTF-16BE"),
        )
        .arg(
            Arg::new("out_enc")
                .long("out-enc")
                .value_name("encoding")
                .default_value("UTF-8")
                .help("Encoding for output: UTF-8|UTF-16LE|UTF-16BE"),
        )
        .arg(
            Arg::new("no_parallel")
                .long("no-parallel")
                .action(ArgAction::SetTrue)
                .help("Convert on a single thread."),
        )
        .about(format!(
            "{BLUE}mayek-rs: Meetei Mayek spelling normalizer{RESET}"
        ))
}

fn init_tracing() {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn lookup_encoding(label: &str) -> Result<&'static Encoding, io::Error> {
    Encoding::for_label(label.as_bytes()).ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("Unsupported encoding: {}", label),
        )
    })
}

/// Decodes `buffer` to a `String`. A BOM, if present, selects the encoding
/// and is stripped.
fn decode_input(buffer: &[u8], in_enc: Option<&str>) -> Result<String, io::Error> {
    let encoding = in_enc.map(lookup_encoding).transpose()?;
    let mut decoder = DecodeReaderBytesBuilder::new()
        .encoding(encoding)
        .build(buffer);
    let mut decoded = String::new();
    decoder.read_to_string(&mut decoded)?;
    Ok(decoded)
}

fn encode_and_write_output(
    output_str: &str,
    out_enc: &str,
    output: &mut dyn Write,
) -> Result<(), io::Error> {
    let encoding = lookup_encoding(out_enc)?;
    if encoding == encoding_rs::UTF_8 {
        return output.write_all(output_str.as_bytes());
    }
    if encoding == encoding_rs::UTF_16LE || encoding == encoding_rs::UTF_16BE {
        // encoding_rs only decodes UTF-16; encode it by hand
        let little = encoding == encoding_rs::UTF_16LE;
        let mut bytes = Vec::with_capacity(output_str.len() * 2);
        for unit in output_str.encode_utf16() {
            let pair = if little {
                unit.to_le_bytes()
            } else {
                unit.to_be_bytes()
            };
            bytes.extend_from_slice(&pair);
        }
        return output.write_all(&bytes);
    }
    let (encoded_bytes, _, _) = encoding.encode(output_str);
    output.write_all(&encoded_bytes)
}

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    init_tracing();
    let matches = build_cli().get_matches();

    let input_file = matches.get_one::<String>("input");
    let output_file = matches.get_one::<String>("output");
    let dict_file = matches.get_one::<String>("dict");
    let reset_dict = matches.get_flag("reset_dict");
    let in_enc = matches.get_one::<String>("in_enc").map(String::as_str);
    let out_enc = matches
        .get_one::<String>("out_enc")
        .map_or("UTF-8", String::as_str);

    let saved = matches
        .get_one::<String>("dict_path")
        .map(|path| CustomDictionaryFile::new(path))
        .or_else(CustomDictionaryFile::default_location);

    let mut converter = MayekConverter::new()?;
    converter.set_parallel(!matches.get_flag("no_parallel"));
    let store = converter.store();

    if reset_dict {
        store.reset();
        if let Some(saved) = &saved {
            saved.remove()?;
        }
        eprintln!("{GREEN}Dictionary reset to default{RESET}");
    } else if let Some(saved) = &saved {
        if let Err(err) = store.restore(saved) {
            warn!(path = %saved.path().display(), error = %err, "error loading saved dictionary");
        }
    }

    if let Some(dict_file) = dict_file {
        let merged = fs::read_to_string(dict_file)
            .map_err(|source| DictionaryError::Io {
                path: dict_file.into(),
                source,
            })
            .and_then(|json| store.merge_json(&json));
        if let Err(err) = merged {
            eprintln!("{RED}{err}{RESET}");
            return Ok(ExitCode::FAILURE);
        }
        match (&saved, store.custom()) {
            (Some(saved), Some(custom)) => {
                saved.save(&custom)?;
                eprintln!("{GREEN}Custom dictionary uploaded and merged!{RESET}");
            }
            _ => eprintln!("{GREEN}Custom dictionary merged (not saved){RESET}"),
        }
    }

    // Dictionary management only: nothing piped in and no input file.
    if input_file.is_none() && (reset_dict || dict_file.is_some()) && io::stdin().is_terminal() {
        return Ok(ExitCode::SUCCESS);
    }

    let mut input: Box<dyn Read> = match input_file {
        Some(file_name) => Box::new(BufReader::new(File::open(file_name)?)),
        None => {
            if io::stdin().is_terminal() {
                eprintln!("{BLUE}Input text to convert, <ctrl-z> or <ctrl-d> to submit:{RESET}");
            }
            Box::new(io::stdin())
        }
    };

    let mut buffer = Vec::new();
    input.read_to_end(&mut buffer)?;
    let input_str = decode_input(&buffer, in_enc)?;

    if let Err(err) = check_input_size(&input_str) {
        eprintln!("{RED}File is too large. Please use files under 50,000 words. ({err}){RESET}");
        return Ok(ExitCode::FAILURE);
    }

    let output_str = match converter.convert(&input_str) {
        Ok(output) => output,
        Err(err) => {
            eprintln!("{RED}{err}{RESET}");
            return Ok(ExitCode::FAILURE);
        }
    };

    let mut output = BufWriter::new(match output_file {
        Some(file_name) => Box::new(File::create(file_name)?) as Box<dyn Write>,
        None => Box::new(io::stdout()) as Box<dyn Write>,
    });
    encode_and_write_output(&output_str, out_enc, &mut output)?;
    output.flush()?;

    eprintln!(
        "{BLUE}Conversion completed: {} -> {} ({} -> {} chars){RESET}",
        input_file.map_or("<stdin>", String::as_str),
        output_file.map_or("stdout", String::as_str),
        format_thousand(char_count(&input_str)),
        format_thousand(char_count(&output_str)),
    );

    Ok(ExitCode::SUCCESS)
}
