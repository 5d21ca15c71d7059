use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use log::LevelFilter;
use tokio::io::AsyncReadExt;

use imagify::{
    ClipboardItem, ExportConfig, IntakeConfig, IntakeOrder, Orientation, PageFormat, RawInput,
    Session, Unit,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    A4,
    Letter,
    Legal,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum UnitArg {
    Pt,
    Px,
    Mm,
}

/// Combine images into one PDF, one image per page.
#[derive(Debug, Parser)]
#[command(name = "imagify", version, about)]
struct Cli {
    /// Image files to add; `-` reads one pasted image from stdin
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Name of the document to produce (used verbatim as the file name)
    #[arg(short, long, default_value = "")]
    name: String,

    /// Directory the document is written to
    #[arg(short, long, default_value = ".")]
    out_dir: PathBuf,

    /// Print the document as a data URI instead of writing a file
    #[arg(long)]
    data_uri: bool,

    /// Print a JSON summary of the export
    #[arg(long)]
    report: bool,

    /// Media type declared for the stdin payload
    #[arg(long, default_value = "image/png")]
    paste_type: String,

    #[arg(long, value_enum, default_value_t = FormatArg::A4)]
    format: FormatArg,

    #[arg(long)]
    landscape: bool,

    #[arg(long, value_enum, default_value_t = UnitArg::Px)]
    unit: UnitArg,

    /// Margin on every side, in `--unit`
    #[arg(long, default_value_t = 20.0)]
    margin: f64,

    /// Give up on an image whose decode takes longer than this
    #[arg(long)]
    decode_timeout_ms: Option<u64>,

    /// Keep the input order instead of read-completion order
    #[arg(long)]
    in_order: bool,

    /// More logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn export_config(&self) -> ExportConfig {
        ExportConfig {
            format: match self.format {
                FormatArg::A4 => PageFormat::A4,
                FormatArg::Letter => PageFormat::Letter,
                FormatArg::Legal => PageFormat::Legal,
            },
            orientation: if self.landscape {
                Orientation::Landscape
            } else {
                Orientation::Portrait
            },
            unit: match self.unit {
                UnitArg::Pt => Unit::Pt,
                UnitArg::Px => Unit::Px,
                UnitArg::Mm => Unit::Mm,
            },
            margin: self.margin,
            decode_timeout_ms: self.decode_timeout_ms,
        }
    }

    fn intake_config(&self) -> IntakeConfig {
        IntakeConfig {
            order: if self.in_order {
                IntakeOrder::Input
            } else {
                IntakeOrder::Completion
            },
            ..Default::default()
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

async fn collect_inputs(cli: &Cli) -> anyhow::Result<Vec<RawInput>> {
    let mut inputs = Vec::with_capacity(cli.inputs.len());
    let mut stdin_used = false;
    for path in &cli.inputs {
        if path.as_os_str() != "-" {
            inputs.push(RawInput::file(path));
            continue;
        }
        if stdin_used {
            anyhow::bail!("`-` may only be given once");
        }
        stdin_used = true;

        let mut bytes = Vec::new();
        tokio::io::stdin()
            .read_to_end(&mut bytes)
            .await
            .context("failed to read pasted image from stdin")?;
        let item = ClipboardItem {
            media_type: cli.paste_type.clone(),
            bytes,
        };
        inputs.extend(imagify::intake::first_clipboard_image(vec![item]));
    }
    Ok(inputs)
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let mut session = Session::new(cli.export_config(), cli.intake_config())
        .context("invalid export settings")?;

    let inputs = collect_inputs(&cli).await?;
    let added = session.add(inputs).await;
    log::info!("{} image(s) selected", added);
    session.set_output_name(cli.name.clone());

    if !cli.data_uri && !cli.name.is_empty() {
        if let Err(e) = imagify::export::check_file_name(&cli.name) {
            eprintln!("{}", e);
            return Ok(ExitCode::from(2));
        }
    }

    let document = match session.export().await {
        Ok(Some(document)) => document,
        Ok(None) => {
            eprintln!("nothing to export: need at least one image and a non-empty --name");
            return Ok(ExitCode::from(2));
        }
        Err(e) => {
            eprintln!("export failed: {}", e);
            return Ok(ExitCode::from(1));
        }
    };

    if cli.data_uri {
        println!("{}", document.to_data_uri());
    } else {
        let path = document
            .save_in(&cli.out_dir)
            .await
            .with_context(|| format!("failed to write into {}", cli.out_dir.display()))?;
        if !cli.report {
            println!("{}", path.display());
        }
    }

    if cli.report {
        let summary = serde_json::to_string_pretty(&document.summary())?;
        println!("{}", summary);
    }

    Ok(ExitCode::SUCCESS)
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("imagify: {:#}", e);
            ExitCode::from(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_defaults_match_library_defaults() {
        let cli = Cli::parse_from(["imagify", "a.png", "--name", "out.pdf"]);
        assert_eq!(cli.export_config(), ExportConfig::default());
        assert_eq!(cli.intake_config().order, IntakeOrder::Completion);
    }

    #[test]
    fn cli_maps_geometry_flags() {
        let cli = Cli::parse_from([
            "imagify",
            "a.png",
            "--format",
            "letter",
            "--landscape",
            "--unit",
            "pt",
            "--margin",
            "36",
            "--in-order",
        ]);
        let config = cli.export_config();
        assert_eq!(config.format, PageFormat::Letter);
        assert_eq!(config.orientation, Orientation::Landscape);
        assert_eq!(config.unit, Unit::Pt);
        assert_eq!(config.margin, 36.0);
        assert_eq!(cli.intake_config().order, IntakeOrder::Input);
    }

    #[test]
    fn cli_requires_inputs() {
        assert!(Cli::try_parse_from(["imagify", "--name", "x"]).is_err());
    }
}
