use clap::{Parser, ValueEnum};
use itertools::Itertools;
use miette::{IntoDiagnostic, miette};
use serde::Serialize;
use solq_ast::{ExtractOptions, Filter, Filters, NodeRef, Offset, SearchOptions, SourceUnit};
use std::io::{self, BufWriter, Read, Write};
use std::path::PathBuf;
use std::{fs, str::FromStr};
use tracing_subscriber::EnvFilter;

const STDIN: &str = "-";

#[derive(Parser, Debug, Default)]
#[command(name = "solq")]
#[command(author = env!("CARGO_PKG_AUTHORS"))]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(after_help = "# Examples:\n\n\
    ## List every function of a compiled project:\n\
    solc --combined-json ast contracts/Vault.sol > out.json\n\
    solq -f '{\"nodeType\": \"FunctionDefinition\"}' out.json\n\n\
    ## Match any of several node types:\n\
    solq -f '[{\"nodeType\": \"IfStatement\"}, {\"nodeType\": \"ForStatement\"}]' out.json\n\n\
    ## Print the source of a function with line numbers:\n\
    solq -f '{\"name\": \"withdraw\"}' -s contracts/Vault.sol --extract -n out.json")]
#[command(
    about = "solq queries the JSON AST produced by the Solidity compiler.",
    long_about = None
)]
pub struct Cli {
    #[clap(flatten)]
    search: SearchArgs,

    #[clap(flatten)]
    output: OutputArgs,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace). RUST_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Compiler standard output or a single AST object; `-` reads from stdin
    #[arg(value_name = "INPUT", default_value = STDIN)]
    input: PathBuf,
}

#[derive(Clone, Debug, Default, clap::Args)]
struct SearchArgs {
    /// Filter as a JSON object, or a list of objects of which any may match
    #[arg(short, long, value_name = "JSON")]
    filter: Option<String>,

    /// Skip nodes matching any key/value pair of this JSON object
    #[arg(short = 'x', long, value_name = "JSON")]
    exclude: Option<String>,

    /// Only search this many levels below the starting node
    #[arg(short = 'd', long)]
    max_depth: Option<usize>,

    /// Let the root of each unit match as well
    #[arg(long, default_value_t = false)]
    include_self: bool,

    /// Drop matches that contain another match
    #[arg(long, default_value_t = false)]
    innermost: bool,

    /// Drop matches nested inside another match
    #[arg(long, default_value_t = false)]
    shallowest: bool,

    /// Only match nodes whose source range contains START:END
    #[arg(long, value_name = "START:END")]
    offset: Option<Offset>,

    /// Only match nodes lying within START:END
    #[arg(long, value_name = "START:END")]
    within: Option<Offset>,

    /// Restrict the search to the unit with this path or absolutePath
    #[arg(short, long, value_name = "PATH")]
    unit: Option<String>,
}

#[derive(Clone, Debug, Default, clap::Args)]
struct OutputArgs {
    /// Set output format
    #[arg(short = 'F', long, value_enum, default_value_t)]
    output_format: OutputFormat,

    /// Source file the offsets point into
    #[arg(short, long, value_name = "FILE")]
    source: Option<PathBuf>,

    /// Print the source text of every match
    #[arg(long, default_value_t = false, requires = "source")]
    extract: bool,

    /// Prefix extracted lines with their line numbers
    #[arg(short = 'n', long, default_value_t = false, requires = "extract")]
    line_numbers: bool,
}

#[derive(Clone, Debug, Default, ValueEnum)]
pub enum OutputFormat {
    /// One `path:start:end <node>` line per match
    #[default]
    Text,
    /// A JSON array of match records
    Json,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Match {
    path: String,
    node_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    category: Option<String>,
    depth: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    offset: Option<[usize; 2]>,
    scope_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    source: Option<String>,
    #[serde(skip)]
    display: String,
}

impl Match {
    fn new(path: &str, node: NodeRef<'_>, source: Option<String>) -> Self {
        Self {
            path: path.to_string(),
            node_type: node.node_type().to_string(),
            category: node.category().map(|category| category.to_string()),
            depth: node.depth(),
            offset: node.offset().map(|offset| [offset.start, offset.end]),
            scope_id: node.scope_id(),
            label: node.display(),
            source,
            display: node.to_string(),
        }
    }

    fn header(&self) -> String {
        match self.offset {
            Some([start, end]) => format!("{}:{start}:{end} {}", self.path, self.display),
            None => format!("{} {}", self.path, self.display),
        }
    }
}

impl Cli {
    pub fn run(&self) -> miette::Result<()> {
        self.init_tracing();

        let units = self.read_units()?;
        let options = self.search_options()?;
        let source = self.read_source()?;
        let extract_options = ExtractOptions {
            line_numbers: self.output.line_numbers,
            ..Default::default()
        };

        let selected = self.selected_units(&units)?;
        if self.output.extract && selected.len() > 1 {
            return Err(miette!(
                "Pick one unit with --unit to extract source text; the input holds {}",
                selected.iter().map(|unit| unit.path()).join(", ")
            ));
        }

        let mut matches = Vec::new();
        for unit in selected {
            let found = unit.root().children(&options);
            tracing::info!(unit = unit.path(), matches = found.len(), "Searched unit");

            for node in found {
                let code = match (&source, node.offset()) {
                    (Some(source), Some(_)) if self.output.extract => {
                        Some(node.extract(source, &extract_options)?)
                    }
                    _ => None,
                };
                matches.push(Match::new(unit.path(), node, code));
            }
        }

        self.print(&matches)
    }

    fn init_tracing(&self) {
        let level = match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        };
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .try_init();
    }

    fn read_units(&self) -> miette::Result<Vec<SourceUnit>> {
        if self.input.as_os_str() == STDIN {
            let mut input = String::new();
            io::stdin().read_to_string(&mut input).into_diagnostic()?;
            let document = serde_json::from_str(&input).into_diagnostic()?;
            Ok(solq_ast::from_json(&document)?)
        } else {
            Ok(solq_ast::from_standard_output_file(&self.input)?)
        }
    }

    fn search_options(&self) -> miette::Result<SearchOptions> {
        let search = &self.search;
        let mut options = SearchOptions::new()
            .include_self(search.include_self)
            .include_parents(!search.innermost)
            .include_children(!search.shallowest);

        if let Some(filter) = &search.filter {
            options = options.filters(Filters::from_str(filter)?);
        }
        if let Some(exclude) = &search.exclude {
            options = options.exclude(Filter::from_str(exclude)?);
        }
        if let Some(max_depth) = search.max_depth {
            options = options.max_depth(max_depth);
        }
        if let Some(offset) = search.offset {
            options = options.required_offset(offset);
        }
        if let Some(within) = search.within {
            options = options.offset_limits(within);
        }

        tracing::debug!(?options, "Search options");
        Ok(options)
    }

    fn read_source(&self) -> miette::Result<Option<String>> {
        self.output
            .source
            .as_ref()
            .map(|path| fs::read_to_string(path).into_diagnostic())
            .transpose()
    }

    fn selected_units<'a>(&self, units: &'a [SourceUnit]) -> miette::Result<Vec<&'a SourceUnit>> {
        let Some(path) = &self.search.unit else {
            return Ok(units.iter().collect());
        };

        let selected = units
            .iter()
            .filter(|unit| unit.path() == path || unit.absolute_path() == Some(path.as_str()))
            .collect::<Vec<_>>();
        if selected.is_empty() {
            return Err(miette!(
                "No source unit named `{path}`; available units: {}",
                units.iter().map(SourceUnit::path).join(", ")
            ));
        }
        Ok(selected)
    }

    fn print(&self, matches: &[Match]) -> miette::Result<()> {
        let stdout = io::stdout();
        let mut handle = BufWriter::new(stdout.lock());

        match self.output.output_format {
            OutputFormat::Text => {
                for m in matches {
                    writeln!(handle, "{}", m.header()).into_diagnostic()?;
                    if let Some(source) = &m.source {
                        writeln!(handle, "{source}").into_diagnostic()?;
                    }
                }
            }
            OutputFormat::Json => {
                serde_json::to_writer_pretty(&mut handle, matches).into_diagnostic()?;
                writeln!(handle).into_diagnostic()?;
            }
        }

        handle.flush().into_diagnostic()
    }
}
