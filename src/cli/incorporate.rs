
use clap::Args;
use log::info;
use std::path::PathBuf;

use crate::cli::core::{check_required_filename, AFTER_HELP, FULL_VERSION};
use crate::parsing::parameters::RunParameters;

#[derive(Args, Clone, Default)]
#[clap(author, about,
    after_help = &**AFTER_HELP
)]
pub struct IncorporateSettings {
    #[clap(default_value = "")]
    #[clap(hide = true)]
    hapsmith_version: String,

    /// Run parameters file (JSON), shared with the upstream simulation steps
    #[clap(required = true)]
    #[clap(short = 'j')]
    #[clap(long = "json")]
    #[clap(value_name = "JSON")]
    #[clap(help_heading = Some("Input/Output"))]
    pub parameters_fn: PathBuf,

    /// Name of the clone to build
    #[clap(required = true)]
    #[clap(short = 'c')]
    #[clap(long = "clone")]
    #[clap(value_name = "CLONE")]
    #[clap(help_heading = Some("Input/Output"))]
    pub clone: String,

    /// Only process this chromosome, overriding the parameters file
    #[clap(short = 'x')]
    #[clap(long = "chromosome")]
    #[clap(value_name = "CHROM")]
    #[clap(help_heading = Some("Input/Output"))]
    pub chromosome: Option<String>,

    /// Also write the final segment layout of every haplotype
    #[clap(long = "output-blocks")]
    #[clap(help_heading = Some("Input/Output"))]
    pub output_blocks: bool,

    /// Number of threads to use
    #[clap(long = "threads")]
    #[clap(value_name = "THREADS")]
    #[clap(default_value = "1")]
    pub threads: usize,

    /// Enable verbose output.
    #[clap(short = 'v')]
    #[clap(long = "verbose")]
    #[clap(action = clap::ArgAction::Count)]
    pub verbosity: u8
}

impl IncorporateSettings {
    pub fn hapsmith_version(&self) -> &str {
        &self.hapsmith_version
    }
}

/// Verifies the settings, loads the run parameters, and logs everything that was resolved
/// # Errors
/// * if the parameters file is missing or invalid
/// * if the reference, its index, or the edit script do not exist
pub fn check_incorporate_settings(mut settings: IncorporateSettings) -> anyhow::Result<(IncorporateSettings, RunParameters)> {
    // hard code the version in
    settings.hapsmith_version = FULL_VERSION.clone();
    info!("Hapsmith version: {:?}", &settings.hapsmith_version);
    info!("Sub-command: incorporate");
    info!("Inputs:");

    check_required_filename(&settings.parameters_fn, "Parameters JSON")?;
    info!("\tParameters: {:?}", &settings.parameters_fn);
    info!("\tClone: {:?}", &settings.clone);

    let parameters = RunParameters::load(&settings.parameters_fn, settings.chromosome.as_deref())?;
    check_required_filename(&parameters.reference_fn, "Reference FASTA")?;
    check_required_filename(&parameters.fai_fn, "Reference FASTA index")?;
    let script_fn = parameters.edit_script_filename();
    check_required_filename(&script_fn, "Variants JSON")?;

    info!("\tReference: {:?}", &parameters.reference_fn);
    info!("\tReference index: {:?}", &parameters.fai_fn);
    info!("\tVariants: {script_fn:?}");
    info!("\tChromosomes: {}", parameters.chromosomes.join(","));

    // outputs
    info!("Outputs:");
    info!("\tOutput folder: {:?}", &parameters.directory);
    info!("\tOutput prefix: {:?}", &parameters.prefix);
    info!("\tBlock dump: {}", if settings.output_blocks { "ENABLED" } else { "DISABLED" });

    if settings.threads == 0 {
        settings.threads = 1;
    }
    info!("Processing threads: {}", settings.threads);

    Ok((settings, parameters))
}
