// gramtrace: step-by-step grammar procedures with a time-travel explorer

use std::fs;
use std::io;
use std::path::Path;

use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing_subscriber::EnvFilter;

use gramtrace::controller::{Controller, ControllerConfig};
use gramtrace::grammar::{Grammar, GrammarData, PlainGrammar};
use gramtrace::procedures::Procedure;
use gramtrace::snapshot::Snapshot;
use gramtrace::ui::App;

struct Options {
    input: String,
    procedure: Procedure,
    batch_steps: Option<usize>,
    json: bool,
}

fn usage(program_name: &str) {
    eprintln!(
        "Usage: {} <grammar.json> [--procedure <name>] [--batch N] [--json]",
        program_name
    );
    eprintln!();
    eprintln!("Procedures:");
    for procedure in Procedure::ALL {
        eprintln!("  {}", procedure.name());
    }
    eprintln!();
    eprintln!("Examples:");
    eprintln!(
        "  {} grammar.json                         # Reduce and explore the run",
        program_name
    );
    eprintln!(
        "  {} grammar.json --procedure remove-loops --json",
        program_name
    );
}

fn parse_args(args: &[String]) -> Result<Options, String> {
    let mut input = None;
    let mut procedure = Procedure::Reduce;
    let mut batch_steps = None;
    let mut json = false;

    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--procedure" | "-p" => {
                let name = iter.next().ok_or("--procedure needs a name")?;
                procedure = Procedure::from_name(name)
                    .ok_or_else(|| format!("Unknown procedure '{}'", name))?;
            }
            "--batch" => {
                let value = iter.next().ok_or("--batch needs a number")?;
                let steps = value
                    .parse::<usize>()
                    .map_err(|_| format!("Invalid batch size '{}'", value))?;
                batch_steps = Some(steps);
            }
            "--json" => json = true,
            other if other.starts_with('-') => return Err(format!("Unknown option '{}'", other)),
            other => {
                if input.replace(other.to_string()).is_some() {
                    return Err("Only one input file can be given".to_string());
                }
            }
        }
    }

    Ok(Options {
        input: input.ok_or("No input file provided")?,
        procedure,
        batch_steps,
        json,
    })
}

/// Accepts both the plain list form and the tagged archive form
fn load_grammar(source: &str) -> Result<Grammar, Box<dyn std::error::Error>> {
    if let Ok(plain) = serde_json::from_str::<PlainGrammar>(source) {
        return Ok(Grammar::from_plain(plain)?);
    }
    let data: GrammarData = serde_json::from_str(source)?;
    Ok(Grammar::from_data(&data)?)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Progress goes to stderr until the TUI takes over the terminal
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    let program_name = args.first().map(|s| s.as_str()).unwrap_or("gramtrace");

    let options = match parse_args(&args) {
        Ok(options) => options,
        Err(message) => {
            eprintln!("Error: {}", message);
            eprintln!();
            usage(program_name);
            std::process::exit(1);
        }
    };

    if !Path::new(&options.input).exists() {
        eprintln!("Error: File '{}' not found", options.input);
        usage(program_name);
        std::process::exit(1);
    }

    let source = fs::read_to_string(&options.input)?;
    eprintln!("Loading {}...", options.input);
    let grammar = match load_grammar(&source) {
        Ok(grammar) => grammar,
        Err(e) => {
            eprintln!("Grammar error: {}", e);
            std::process::exit(1);
        }
    };
    eprintln!(
        "Loaded grammar with {} nonterminals, {} terminals and {} rules.",
        grammar.nonterminal_count(),
        grammar.terminal_count(),
        grammar.rule_count()
    );
    if options.procedure.check(&grammar) {
        eprintln!(
            "Note: the grammar already satisfies '{}'.",
            options.procedure.name()
        );
    }

    let mut config = ControllerConfig::default();
    if let Some(steps) = options.batch_steps {
        config = config.batch_steps(steps);
    }
    let mut controller = Controller::new(
        Snapshot::new(grammar),
        options.procedure.program(),
        config,
    );

    eprintln!("Running {}...", options.procedure.name());
    match controller.execute() {
        Ok(()) => {
            eprintln!("Run completed successfully.");
            eprintln!("Total steps: {}", controller.steps());
        }
        Err(e) => {
            eprintln!("Step error: {}", e);
            if options.json {
                std::process::exit(1);
            }
            eprintln!("Entering TUI with the partial run...");
        }
    }

    if options.json {
        if let Some(data) = controller.final_snapshot() {
            println!("{}", serde_json::to_string_pretty(data)?);
        }
        return Ok(());
    }

    // Set up terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create and run app
    let mut app = App::new(controller);
    let res = app.run(&mut terminal);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("Error: {:?}", err);
    }

    Ok(())
}
