use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use logic::{compile, BasicAction, Rule, RuleFile, TruthTable};
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Tables with more variables than this print as hex words unless `--rows`
const MAX_ROW_VARIABLES: u8 = 6;

#[derive(Parser)]
#[command(name = "ruletool")]
#[command(about = "Compile and inspect Tessera map rules", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the truth table of an expression
    Table {
        /// Boolean expression, e.g. "(a|b)&!c"
        expression: String,

        /// Print one row per input even for large tables
        #[arg(long)]
        rows: bool,
    },

    /// Compile a TOML rule source into a binary rule section
    Compile {
        /// Rule source with [[rule]] tables
        input: PathBuf,

        /// Output file (defaults to the input with a .bin extension)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Describe the rules in a binary rule section
    Dump {
        /// Binary rule section
        input: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("ruletool=info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Table { expression, rows } => {
            print!("{}", render_expression(&expression, rows)?);
        }
        Commands::Compile { input, output } => {
            let output = output.unwrap_or_else(|| input.with_extension("bin"));
            let count = compile_file(&input, &output)?;
            info!(rules = count, output = %output.display(), "Compiled rule section");
        }
        Commands::Dump { input } => {
            let bytes =
                fs::read(&input).with_context(|| format!("Failed to read {}", input.display()))?;
            let rules = logic::decode_rules(&bytes)
                .with_context(|| format!("{} is not a rule section", input.display()))?;
            print!("{}", describe_rules(&rules));
        }
    }

    Ok(())
}

/// Compile `input` and write the section to `output`; returns the rule count
fn compile_file(input: &Path, output: &Path) -> Result<usize> {
    let text = fs::read_to_string(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;
    let file: RuleFile =
        toml::from_str(&text).with_context(|| format!("Failed to parse {}", input.display()))?;

    let rules = file
        .rules
        .iter()
        .enumerate()
        .map(|(n, source)| {
            source
                .compile()
                .with_context(|| format!("Rule {n} ('{}')", source.expression))
        })
        .collect::<Result<Vec<_>>>()?;

    let bytes = logic::encode_rules(&rules)?;
    fs::write(output, &bytes).with_context(|| format!("Failed to write {}", output.display()))?;
    Ok(rules.len())
}

fn render_expression(expression: &str, rows: bool) -> Result<String> {
    let compiled =
        compile(expression).with_context(|| format!("Failed to compile '{expression}'"))?;
    let names: Vec<String> = compiled.dictionary.iter().map(char::to_string).collect();
    Ok(render_table(&compiled.table, &names, rows))
}

/// Format a table as rows of inputs, or as hex words when it is large
fn render_table(table: &TruthTable, names: &[String], rows: bool) -> String {
    let mut out = String::new();
    let k = table.variables();

    if k > MAX_ROW_VARIABLES && !rows {
        let _ = writeln!(
            out,
            "{} variables, {} of {} inputs true",
            k,
            table.count_true(),
            table.len()
        );
        for (w, word) in table.words().iter().enumerate() {
            let _ = writeln!(out, "{w:>6}: {word:#018x}");
        }
        return out;
    }

    let _ = writeln!(out, "{} | out", names.join(" "));
    for (index, value) in table.iter().enumerate() {
        let inputs: Vec<String> = names
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let bit = (index >> (k as usize - 1 - i)) & 1;
                format!("{bit:>width$}", width = name.len())
            })
            .collect();
        let _ = writeln!(out, "{} | {}", inputs.join(" "), u8::from(value));
    }
    out
}

fn describe_rules(rules: &[Rule]) -> String {
    let mut out = String::new();
    for (n, rule) in rules.iter().enumerate() {
        let operands: Vec<String> = rule.operands().iter().map(ToString::to_string).collect();
        let table = rule.table();
        let _ = writeln!(
            out,
            "rule {n}: [{}] true for {}/{} inputs",
            operands.join(", "),
            table.count_true(),
            table.len()
        );
        for (id, args) in rule.actions() {
            let name = match BasicAction::from_id(id) {
                Some(action) => format!("{action:?}"),
                None => format!("action {id}"),
            };
            let _ = writeln!(out, "    {name} {args:02x?}");
        }
    }
    out
}
