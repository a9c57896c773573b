//! pagepress – command-line export of edited rich text to a paginated PDF.
//!
//! Usage:
//!   pagepress <input.html> [output.pdf] [flags]
//!   pagepress --template notice [output.pdf] [flags]
//!
//! If `output.pdf` is omitted the PDF is written next to the input file with
//! the same stem, or as `edited_report.pdf` when exporting a template.

use std::collections::HashMap;
use std::{env, fs, path::PathBuf, process};

use pagepress::pipeline::{export_pdf, CancelToken, ExportConfig};
use pagepress::slicer::BandPolicy;
use pagepress::templates;

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    let mut input_path: Option<PathBuf> = None;
    let mut output_path: Option<PathBuf> = None;
    let mut template: Option<String> = None;
    let mut config_path: Option<PathBuf> = None;
    let mut title: Option<String> = None;
    let mut scale: Option<f32> = None;
    let mut margin: Option<f32> = None;
    let mut settle_ms: Option<u64> = None;
    let mut font: Option<PathBuf> = None;
    let mut fixed_capacity = false;
    let mut variables: HashMap<String, String> = HashMap::new();
    let mut positional = 0usize;

    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--template" => template = iter.next().cloned(),
            "--config" => config_path = iter.next().map(PathBuf::from),
            "--title" | "-t" => title = iter.next().cloned(),
            "--scale" => scale = iter.next().and_then(|v| v.parse().ok()),
            "--margin" => margin = iter.next().and_then(|v| v.parse().ok()),
            "--settle-ms" => settle_ms = iter.next().and_then(|v| v.parse().ok()),
            "--font" => font = iter.next().map(PathBuf::from),
            "--fixed-capacity" => fixed_capacity = true,
            "--set" => {
                if let Some(pair) = iter.next() {
                    match pair.split_once('=') {
                        Some((k, v)) => {
                            variables.insert(k.to_string(), v.to_string());
                        }
                        None => {
                            eprintln!("--set expects key=value, got: {pair}");
                            process::exit(1);
                        }
                    }
                }
            }
            "--help" | "-h" => {
                print_usage(&args[0]);
                process::exit(0);
            }
            other if other.starts_with('-') => {
                eprintln!("Unknown flag: {other}");
                print_usage(&args[0]);
                process::exit(1);
            }
            path => {
                if positional == 0 {
                    input_path = Some(PathBuf::from(path));
                } else if positional == 1 {
                    output_path = Some(PathBuf::from(path));
                } else {
                    eprintln!("Unexpected argument: {path}");
                    print_usage(&args[0]);
                    process::exit(1);
                }
                positional += 1;
            }
        }
    }

    // Template mode takes one positional as the output path.
    if template.is_some() && output_path.is_none() && positional == 1 {
        output_path = input_path.take();
    }

    let markup = match (&template, &input_path) {
        (Some(name), _) => {
            let raw = match name.as_str() {
                "notice" => templates::notice_template(),
                "brief" => templates::long_brief_template(),
                "minimal" => templates::minimal_template(),
                other => {
                    eprintln!("Unknown template '{other}' (try: notice, brief, minimal)");
                    process::exit(1);
                }
            };
            templates::fill_placeholders(raw, &variables)
        }
        (None, Some(path)) => match fs::read_to_string(path) {
            Ok(s) => templates::fill_placeholders(&s, &variables),
            Err(e) => {
                eprintln!("Error reading '{}': {e}", path.display());
                process::exit(1);
            }
        },
        (None, None) => {
            eprintln!("Error: no input file or template specified.");
            print_usage(&args[0]);
            process::exit(1);
        }
    };

    let output = output_path.unwrap_or_else(|| match &input_path {
        Some(input) => {
            let mut o = input.clone();
            o.set_extension("pdf");
            o
        }
        None => PathBuf::from("edited_report.pdf"),
    });

    let mut config = match config_path {
        Some(path) => match fs::read_to_string(&path)
            .map_err(|e| e.to_string())
            .and_then(|s| serde_json::from_str::<ExportConfig>(&s).map_err(|e| e.to_string()))
        {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error loading config '{}': {e}", path.display());
                process::exit(1);
            }
        },
        None => ExportConfig::default(),
    };

    if let Some(t) = title {
        config.title = t;
    } else if let Some(stem) = input_path
        .as_ref()
        .and_then(|p| p.file_stem())
        .and_then(|s| s.to_str())
    {
        config.title = stem.to_string();
    }
    if let Some(s) = scale {
        config.scale = s;
    }
    if let Some(m) = margin {
        config.geometry.margin_mm = m;
    }
    if let Some(ms) = settle_ms {
        config.settle_ms = ms;
    }
    if font.is_some() {
        config.host.font = font;
    }
    if fixed_capacity {
        config.policy = BandPolicy::FixedCapacity;
    }

    match export_pdf(&markup, &config, &CancelToken::new()) {
        Ok(bytes) => {
            if let Some(parent) = output.parent() {
                if !parent.as_os_str().is_empty() {
                    if let Err(e) = fs::create_dir_all(parent) {
                        eprintln!("Error creating output directory: {e}");
                        process::exit(1);
                    }
                }
            }
            if let Err(e) = fs::write(&output, &bytes) {
                eprintln!("Error writing '{}': {e}", output.display());
                process::exit(1);
            }
            eprintln!("Wrote '{}' ({} bytes)", output.display(), bytes.len());
        }
        Err(e) => {
            eprintln!("Export failed: {e}");
            process::exit(1);
        }
    }
}

fn print_usage(prog: &str) {
    eprintln!("pagepress – rendered rich text to paginated A4 PDF");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  {prog} <input.html> [output.pdf] [flags]");
    eprintln!("  {prog} --template <notice|brief|minimal> [output.pdf] [flags]");
    eprintln!();
    eprintln!("Flags:");
    eprintln!("  --title, -t <s>     Document title in PDF metadata (default: input stem)");
    eprintln!("  --scale <n>         Master raster oversampling factor (default: 2)");
    eprintln!("  --margin <mm>       Page margin in millimetres (default: 10)");
    eprintln!("  --settle-ms <n>     Render settle delay before capture (default: 300)");
    eprintln!("  --font <file>       TTF/OTF used for text measurement (default: heuristic)");
    eprintln!("  --fixed-capacity    Slice one printable page per band instead of equal bands");
    eprintln!("  --set key=value     Fill a {{{{placeholder}}}} in the input (repeatable)");
    eprintln!("  --config <file>     Load a full ExportConfig as JSON");
    eprintln!("  --help              Print this message");
}
