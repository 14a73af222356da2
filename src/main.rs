use clap::Parser;
use iac_tagger::application::TaggingService;
use iac_tagger::cli::{format_report, Cli};
use iac_tagger::error::TaggerError;
use iac_tagger::infrastructure::{
    logging, FixedRevision, GitRevisionLookup, RevisionLookup, TaggerConfig,
};

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match run(cli) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {}", e.display_with_suggestions());
            std::process::exit(e.exit_code());
        }
    }
}

fn run(cli: Cli) -> Result<i32, TaggerError> {
    let config = TaggerConfig::resolve(cli.config.as_deref())?;

    match cli.revision.clone() {
        Some(revision) => execute(&cli, TaggingService::new(config, FixedRevision(revision))),
        None => {
            let lookup = GitRevisionLookup::new(config.revision_timeout());
            execute(&cli, TaggingService::new(config, lookup))
        }
    }
}

fn execute<R: RevisionLookup>(cli: &Cli, service: TaggingService<R>) -> Result<i32, TaggerError> {
    let report = match &cli.directory {
        Some(dir) => service.process_directory(dir, cli.recursive, cli.dry_run)?,
        None => service.process_files(&cli.files, cli.dry_run),
    };

    println!("{}", format_report(&report, cli.verbose));

    Ok(if report.has_errors() { 1 } else { 0 })
}
