use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use raws_query::config::{self, named_query, QueryConfig, CONFIG_FILE_NAME};
use raws_query::file::{BinFile, FileError, RawFile, WriteResult};
use raws_query::filter::{Filter, FilterSpec, IndexedArg};
use raws_query::query::{ItemKey, PropDictOptions, PropEntry, Queryable, Until};
use raws_query::token::{TokenChain, TokenId, TokenRef};
use serde::Serialize;
use similar::{ChangeTag, TextDiff};
use std::collections::{BTreeMap, HashMap};
use std::env;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

/// Environment variable holding a tracing filter directive.
const LOG_ENV: &str = "RAWS_QUERY_LOG";

#[derive(Parser)]
#[command(name = "raws-query")]
#[command(about = "Query and edit raws token files without disturbing their formatting", long_about = None)]
#[command(version)]
struct Cli {
    /// Query config file (default: discover raws-query.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// More log output (-v debug, -vv trace); RAWS_QUERY_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print tokens matching the criteria
    Find {
        /// Raws files or directories to search
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        #[command(flatten)]
        criteria: Criteria,

        #[command(flatten)]
        select: Selection,

        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Remove tokens matching the criteria
    Remove {
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        #[command(flatten)]
        criteria: Criteria,

        #[command(flatten)]
        select: Selection,

        /// Show what would be removed without writing files
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Show unified diff of changes
        #[arg(short, long)]
        diff: bool,
    },

    /// Print the properties of each object matching --object
    Props {
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Pretty pattern selecting the object tokens, e.g. CREATURE:DOG
        #[arg(long)]
        object: String,

        #[command(flatten)]
        criteria: Criteria,

        /// Group properties by value and full token
        #[arg(long)]
        dict: bool,

        /// With --dict, keep single-token groups as lists
        #[arg(long)]
        always_list: bool,

        #[arg(long)]
        json: bool,
    },

    /// Print tokens by key: `...`, an index, a slice `a..b[/step]` or a pretty pattern
    Item {
        /// Raws file to read
        file: PathBuf,

        #[arg(required = true, allow_hyphen_values = true)]
        keys: Vec<String>,

        #[arg(long)]
        json: bool,
    },

    /// Print the object section table in effect
    Sections {
        #[arg(long)]
        json: bool,
    },
}

/// Criteria flags; together they form one filter.
#[derive(Args, Debug, Default)]
struct Criteria {
    /// Named query from the config file
    #[arg(short, long)]
    query: Option<String>,

    /// Pretty pattern, e.g. NAME or CREATURE:DOG
    #[arg(short, long)]
    pretty: Option<String>,

    #[arg(long)]
    value: Option<String>,

    #[arg(long)]
    except_value: Option<String>,

    /// Anchored regex over the token value
    #[arg(long)]
    re_value: Option<String>,

    #[arg(long, value_delimiter = ',')]
    value_in: Vec<String>,

    #[arg(long)]
    args_count: Option<usize>,

    #[arg(long)]
    args_contains: Option<String>,

    /// Argument list, comma separated; `*` matches anything
    #[arg(long, value_delimiter = ',')]
    args: Option<Vec<String>>,

    /// INDEX=VALUE, may repeat
    #[arg(long = "arg", value_parser = parse_indexed)]
    arg: Vec<IndexedArg>,

    /// INDEX=REGEX, may repeat
    #[arg(long = "re-arg", value_parser = parse_indexed)]
    re_arg: Vec<IndexedArg>,

    /// Negate the criteria
    #[arg(long)]
    invert: bool,
}

/// Which matches an operation returns.
#[derive(Args, Debug, Default)]
struct Selection {
    /// Only the first match
    #[arg(long, conflicts_with = "last")]
    first: bool,

    /// Only the last match
    #[arg(long)]
    last: bool,

    /// Stop scanning at the first token matching this pretty pattern
    #[arg(long)]
    until: Option<String>,
}

fn parse_indexed(text: &str) -> Result<IndexedArg, String> {
    let (index, value) = text
        .split_once('=')
        .ok_or_else(|| format!("expected INDEX=VALUE, got {text:?}"))?;
    let index = index
        .trim()
        .parse()
        .map_err(|_| format!("invalid argument index {index:?}"))?;
    Ok(IndexedArg {
        index,
        value: value.to_string(),
    })
}

impl Criteria {
    fn to_spec(&self) -> FilterSpec {
        FilterSpec {
            pretty: self.pretty.clone(),
            exact_value: self.value.clone(),
            except_value: self.except_value.clone(),
            re_value: self.re_value.clone(),
            value_in: (!self.value_in.is_empty()).then(|| self.value_in.clone()),
            args_count: self.args_count,
            args_contains: self.args_contains.clone(),
            exact_args: self.args.clone(),
            exact_arg: self.arg.clone(),
            re_arg: self.re_arg.clone(),
            invert: self.invert,
            ..FilterSpec::default()
        }
    }

    /// Build the filter from a named query or the flags, never both.
    /// No criteria at all means "every token".
    fn resolve(&self, config: &QueryConfig) -> Result<Filter> {
        let flags = self.to_spec();
        let spec = match &self.query {
            Some(name) => {
                if !flags.is_empty() {
                    anyhow::bail!("--query cannot be combined with other criteria flags");
                }
                let mut spec = named_query(config, name)?.clone();
                spec.invert ^= self.invert;
                spec
            }
            None => flags,
        };
        debug!(?spec, "resolved criteria");
        Ok(spec.build_filter()?)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let cwd = env::current_dir().context("failed to read current directory")?;
    let config = config::discover(cli.config.as_deref(), &cwd)?;

    match cli.command {
        Commands::Find {
            paths,
            criteria,
            select,
            json,
        } => cmd_find(&config, &paths, &criteria, &select, json),

        Commands::Remove {
            paths,
            criteria,
            select,
            dry_run,
            diff,
        } => cmd_remove(&config, &paths, &criteria, &select, dry_run, diff),

        Commands::Props {
            paths,
            object,
            criteria,
            dict,
            always_list,
            json,
        } => cmd_props(&config, &paths, &object, &criteria, dict, always_list, json),

        Commands::Item { file, keys, json } => cmd_item(&file, &keys, json),

        Commands::Sections { json } => cmd_sections(&config, json),
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = env::var(LOG_ENV)
        .ok()
        .and_then(|directive| EnvFilter::try_new(directive).ok())
        .unwrap_or_else(|| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

/// Helper: Collect raws files from the given paths, walking directories for
/// `.txt` files. Files that are not raws text are skipped with a warning.
fn load_raws(paths: &[PathBuf]) -> Result<Vec<RawFile>> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            let mut found = Vec::new();
            for entry in WalkDir::new(path) {
                let entry = entry?;
                if entry.file_type().is_file()
                    && entry.path().extension().and_then(|s| s.to_str()) == Some("txt")
                {
                    found.push(entry.path().to_path_buf());
                }
            }
            found.sort();
            for file in found {
                if let Some(raw) = load_raw(&file)? {
                    files.push(raw);
                }
            }
        } else if let Some(raw) = load_raw(path)? {
            files.push(raw);
        }
    }
    Ok(files)
}

fn load_raw(path: &Path) -> Result<Option<RawFile>> {
    let bin = BinFile::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    match bin.to_raw() {
        Ok(raw) => Ok(Some(raw)),
        Err(err @ FileError::InvalidConversion { .. }) => {
            warn!("skipping {}: {err}", path.display());
            Ok(None)
        }
        Err(err) => Err(err.into()),
    }
}

/// Matches of `filter` in `scope`, narrowed by the selection flags.
fn select<'a, Q>(scope: &'a Q, filter: Filter, select: &Selection) -> Result<Vec<TokenRef<'a>>>
where
    Q: Queryable + ?Sized,
{
    let found = match &select.until {
        Some(halt) => {
            let until = Until::new(Filter::pretty(halt)?, filter);
            if select.first {
                scope.get_until(until).into_iter().collect()
            } else if select.last {
                scope.get_last_until(until).into_iter().collect()
            } else {
                scope.all_until(until)
            }
        }
        None if select.first => scope.get(filter).into_iter().collect(),
        None if select.last => scope.get_last(filter).into_iter().collect(),
        None => scope.all(filter),
    };
    Ok(found)
}

#[derive(Serialize)]
struct Hit {
    file: String,
    position: usize,
    token: String,
    value: String,
    args: Vec<String>,
}

fn position_index(chain: &TokenChain) -> HashMap<TokenId, usize> {
    chain.iter().enumerate().map(|(i, t)| (t.id(), i)).collect()
}

fn hit(file: &RawFile, positions: &HashMap<TokenId, usize>, token: &TokenRef<'_>) -> Hit {
    Hit {
        file: file.path().display().to_string(),
        position: positions.get(&token.id()).copied().unwrap_or_default(),
        token: token.to_string(),
        value: token.value.clone(),
        args: token.args.clone(),
    }
}

fn print_hits(hits: &[Hit], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(hits)?);
        return Ok(());
    }
    for hit in hits {
        println!(
            "{}:{} {}",
            hit.file.dimmed(),
            hit.position.to_string().cyan(),
            hit.token.bold()
        );
    }
    Ok(())
}

fn cmd_find(
    config: &QueryConfig,
    paths: &[PathBuf],
    criteria: &Criteria,
    selection: &Selection,
    json: bool,
) -> Result<()> {
    let filter = criteria.resolve(config)?;
    let mut hits = Vec::new();
    for file in load_raws(paths)? {
        let positions = position_index(file.tokens());
        for token in select(&file, filter.clone(), selection)? {
            hits.push(hit(&file, &positions, &token));
        }
    }
    print_hits(&hits, json)?;
    if !json {
        eprintln!("{}", format!("{} match(es)", hits.len()).dimmed());
    }
    Ok(())
}

fn cmd_remove(
    config: &QueryConfig,
    paths: &[PathBuf],
    criteria: &Criteria,
    selection: &Selection,
    dry_run: bool,
    show_diff: bool,
) -> Result<()> {
    let filter = criteria.resolve(config)?;
    let mut total = 0;

    for mut file in load_raws(paths)? {
        let ids: Vec<TokenId> = select(&file, filter.clone(), selection)?
            .iter()
            .map(TokenRef::id)
            .collect();
        if ids.is_empty() {
            continue;
        }

        let original = file.to_string();
        let removed = file.tokens_mut().remove_selected(ids);
        total += removed.len();

        if show_diff {
            display_diff(file.path(), &original, &file.to_string());
        }

        if dry_run {
            println!(
                "{} {}: would remove {} token(s)",
                "DRY-RUN".yellow(),
                file.path().display(),
                removed.len()
            );
            continue;
        }

        match file.write()? {
            WriteResult::Written { path, .. } => println!(
                "{} {}: removed {} token(s)",
                "✓".green(),
                path.display(),
                removed.len()
            ),
            WriteResult::Unchanged { path } => {
                println!("{} {}: unchanged", "⊙".blue(), path.display())
            }
        }
    }

    eprintln!("{}", format!("{total} token(s) removed").dimmed());
    Ok(())
}

#[derive(Serialize)]
struct ObjectProps {
    file: String,
    object: String,
    props: Vec<String>,
}

#[derive(Serialize)]
struct ObjectPropDict {
    file: String,
    object: String,
    props: BTreeMap<String, Vec<String>>,
}

fn cmd_props(
    config: &QueryConfig,
    paths: &[PathBuf],
    object: &str,
    criteria: &Criteria,
    dict: bool,
    always_list: bool,
    json: bool,
) -> Result<()> {
    let classifier = config.classifier();
    let object_filter = Filter::pretty(object)?;
    let condition = criteria.resolve(config)?;
    let options = PropDictOptions {
        always_list,
        ..PropDictOptions::default()
    };

    let mut listed = Vec::new();
    let mut grouped = Vec::new();
    for file in load_raws(paths)? {
        for anchor in file.all(object_filter.clone()) {
            let path = file.path().display().to_string();
            if dict {
                let props = anchor
                    .prop_dict(&classifier, options, condition.clone())
                    .into_iter()
                    .map(|(key, entry)| (key, entry_strings(&entry)))
                    .collect();
                grouped.push(ObjectPropDict {
                    file: path,
                    object: anchor.to_string(),
                    props,
                });
            } else {
                let props = anchor
                    .all_prop(&classifier, condition.clone())
                    .iter()
                    .map(ToString::to_string)
                    .collect();
                listed.push(ObjectProps {
                    file: path,
                    object: anchor.to_string(),
                    props,
                });
            }
        }
    }

    if json {
        let out = if dict {
            serde_json::to_string_pretty(&grouped)?
        } else {
            serde_json::to_string_pretty(&listed)?
        };
        println!("{out}");
        return Ok(());
    }

    for entry in &listed {
        println!("{} {}", entry.file.dimmed(), entry.object.bold());
        for prop in &entry.props {
            println!("    {prop}");
        }
    }
    for entry in &grouped {
        println!("{} {}", entry.file.dimmed(), entry.object.bold());
        for (key, props) in &entry.props {
            println!("    {} {}", key.cyan(), props.join(" "));
        }
    }
    Ok(())
}

fn entry_strings(entry: &PropEntry<'_>) -> Vec<String> {
    entry.tokens().iter().map(ToString::to_string).collect()
}

fn cmd_item(path: &Path, keys: &[String], json: bool) -> Result<()> {
    let keys = keys
        .iter()
        .map(|key| key.parse::<ItemKey>())
        .collect::<Result<Vec<_>, _>>()?;
    let file = load_raw(path)?
        .with_context(|| format!("{} is not a raws file", path.display()))?;
    let positions = position_index(file.tokens());
    let hits: Vec<Hit> = file
        .items(&keys)?
        .iter()
        .map(|token| hit(&file, &positions, token))
        .collect();
    print_hits(&hits, json)
}

fn cmd_sections(config: &QueryConfig, json: bool) -> Result<()> {
    let table = config.classifier();
    let sections: BTreeMap<&str, Vec<&str>> = table
        .headers()
        .map(|(header, objects)| (header, objects.iter().map(String::as_str).collect()))
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&sections)?);
        return Ok(());
    }

    if config.meta.name.is_empty() {
        println!("{}", format!("{CONFIG_FILE_NAME} not found or unnamed").dimmed());
    } else {
        println!("{}", config.meta.name.bold());
    }
    for (header, objects) in &sections {
        println!("{} ({})", header.cyan(), objects.len());
        println!("    {}", objects.join(" "));
    }
    Ok(())
}

/// Unified diff of a file before and after removal.
fn display_diff(file: &Path, original: &str, modified: &str) {
    println!(
        "\n{}",
        format!("--- {} (original)", file.display()).dimmed()
    );
    println!("{}", format!("+++ {} (modified)", file.display()).dimmed());

    let diff = TextDiff::from_lines(original, modified);

    for change in diff.iter_all_changes() {
        let sign = match change.tag() {
            ChangeTag::Delete => format!("-{}", change).red(),
            ChangeTag::Insert => format!("+{}", change).green(),
            ChangeTag::Equal => format!(" {}", change).normal(),
        };
        print!("{}", sign);
    }
}
