
use log::{LevelFilter, error, info};
use std::time::Instant;

use hapsmith::cli::core::{Commands, get_cli};
use hapsmith::cli::incorporate::{IncorporateSettings, check_incorporate_settings};
use hapsmith::orchestrator::{output_exit_code, run_clone, write_outputs};
use hapsmith::parsing::edit_script::CloneScript;
use hapsmith::parsing::reference::ReferenceContext;
use hapsmith::writers::OutputLayoutBuilder;

fn run_incorporate(settings: IncorporateSettings) {
    // start the timer
    let start_time = Instant::now();

    // set up logging before we check the other settings
    let filter_level: LevelFilter = match settings.verbosity {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace
    };
    env_logger::builder()
        .format_timestamp_millis()
        .filter_level(filter_level)
        .init();

    let (settings, parameters) = match check_incorporate_settings(settings) {
        Ok(s) => s,
        Err(e) => {
            error!("Error while verifying settings: {e:#}");
            std::process::exit(exitcode::CONFIG);
        }
    };

    // set up the number of threads for rayon
    match rayon::ThreadPoolBuilder::new().num_threads(settings.threads).build_global() {
        Ok(()) => {},
        Err(e) => {
            error!("Error while building thread pool: {e}");
            std::process::exit(exitcode::OSERR);
        }
    };

    // load the reference genome
    info!("Pre-loading reference genome into memory...");
    let reference = match ReferenceContext::load(&parameters.reference_fn, &parameters.chromosomes, parameters.skip_missing) {
        Ok(r) => r,
        Err(e) => {
            error!("Error while loading reference genome: {e:#}");
            std::process::exit(exitcode::IOERR);
        }
    };

    // load the clone's edits
    info!("Loading edit script for {}...", settings.clone);
    let script = match CloneScript::load(&parameters.edit_script_filename(), &settings.clone) {
        Ok(s) => s,
        Err(e) => {
            error!("Error while loading edit script: {e:#}");
            std::process::exit(exitcode::CONFIG);
        }
    };
    info!("Loaded {} events for {}", script.events().len(), script.clone_name());

    // every selected chromosome needs a haplotype list before we start
    for chrom in reference.chromosomes() {
        if let Err(e) = script.haplotypes_for(chrom) {
            error!("Error while checking haplotypes: {e:#}");
            std::process::exit(exitcode::CONFIG);
        }
    }

    let layout = match OutputLayoutBuilder::default()
        .directory(parameters.directory.clone())
        .prefix(parameters.prefix.clone())
        .clone_name(settings.clone.clone())
        .chromosome_tag(settings.chromosome.clone().unwrap_or_default())
        .build() {
        Ok(l) => l,
        Err(e) => {
            error!("Error while building output layout: {e:?}");
            std::process::exit(exitcode::SOFTWARE);
        }
    };

    info!("Incorporating variants...");
    let results = match run_clone(&reference, &script) {
        Ok(r) => r,
        Err(e) => {
            error!("Error while incorporating variants: {e:#}");
            std::process::exit(exitcode::SOFTWARE);
        }
    };

    info!("Variant incorporation complete, saving all outputs...");
    if let Err(e) = write_outputs(&results, &reference, &layout, &parameters.reference_fn, settings.output_blocks) {
        error!("Error while saving output files: {e:#}");
        std::process::exit(output_exit_code(&e));
    }

    info!("Incorporation completed in {} seconds.", start_time.elapsed().as_secs_f64());
}

fn main() {
    let cli = get_cli();
    match cli.command {
        Commands::Incorporate(settings) => {
            run_incorporate(*settings);
        }
    }

    info!("Process finished successfully.");
}
