//! WebM to Ogg conversion command.

use std::path::Path;

use anyhow::Context;
use clap::Args;
use giztoy_remux::{ParsePolicy, RemuxOptions, RemuxOutput, Remuxer};
use tracing::debug;

use crate::Cli;
use crate::config::load_options;
use crate::output::{read_input, write_binary, STDIO};

/// Converts a WebM/Opus recording into an Ogg/Opus file.
#[derive(Args)]
pub struct ConvertCommand {
    /// Input file (WebM or Ogg), "-" for stdin
    input: String,

    /// Output file (default: input with .ogg extension, "-" for stdout)
    #[arg(short = 'o', long)]
    output: Option<String>,

    /// Fixed stream serial (overrides config file)
    #[arg(long)]
    serial: Option<u32>,

    /// Maximum packets per page (overrides config file)
    #[arg(long)]
    max_packets: Option<usize>,

    /// Fail on undecodable WebM elements instead of keeping partial frames
    #[arg(long)]
    strict: bool,

    /// Keep blocks of every track, not only the audio track
    #[arg(long)]
    all_tracks: bool,
}

impl ConvertCommand {
    pub fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        let mut options = load_options(cli.config.as_deref()).context("load options")?;
        self.apply(&mut options);

        let output = self.output_path()?;
        let input = read_input(&self.input)?;
        debug!(input = %self.input, output = %output, bytes = input.len(), ?options, "convert: remuxing");

        let remuxer = Remuxer::new(options);
        let out = remuxer
            .remux(&input)
            .with_context(|| format!("remux {}", self.input))?;

        debug!(
            pass_through = out.is_pass_through(),
            pages = out.pages,
            granule = out.granule,
            "convert: done"
        );
        write_binary(&out.data, &output)?;
        eprintln!("{}", summary(&self.input, &output, &out));
        Ok(())
    }

    /// Applies command line overrides on top of the loaded options.
    fn apply(&self, options: &mut RemuxOptions) {
        if let Some(serial) = self.serial {
            options.serial = Some(serial);
        }
        if let Some(max) = self.max_packets {
            options.max_packets_per_page = max;
        }
        if self.strict {
            options.parse_policy = ParsePolicy::Strict;
        }
        if self.all_tracks {
            options.filter_audio_track = false;
        }
    }

    fn output_path(&self) -> anyhow::Result<String> {
        if let Some(output) = &self.output {
            return Ok(output.clone());
        }
        if self.input == STDIO {
            return Ok(STDIO.to_string());
        }
        let path = Path::new(&self.input).with_extension("ogg");
        if path == Path::new(&self.input) {
            anyhow::bail!("output would overwrite {}, use -o", self.input);
        }
        Ok(path.to_string_lossy().into_owned())
    }
}

fn summary(input: &str, output: &str, out: &RemuxOutput<'_>) -> String {
    if out.is_pass_through() {
        return format!("{} -> {}: already Ogg, copied {} bytes", input, output, out.data.len());
    }
    format!(
        "{} -> {}: {} pages, {:.2}s, {} bytes",
        input,
        output,
        out.pages,
        out.granule as f64 / 48000.0,
        out.data.len()
    )
}
