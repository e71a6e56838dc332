#[path = "slotgraph/config.rs"]
mod config;

use std::error::Error;
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use slotgraph::logging::init_logging;
use slotgraph::storage::{
    ChainSide, ChainWalker, FixedRecord, Link, NodeFile, NodeRecord, RecordStore,
    RelationshipFile, RelationshipRecord, StoreOptions,
};
use slotgraph::types::{Index, SlotError, EMPTY};
use tracing::debug;

use config::CliConfig;

const DEFAULT_LOG_LEVEL: &str = "warn";

#[derive(Parser, Debug)]
#[command(
    name = "slotgraph",
    version,
    about = "Inspect and edit fixed-size node and relationship record files"
)]
struct Cli {
    #[arg(
        long,
        global = true,
        env = "SLOTGRAPH_CONFIG",
        value_name = "FILE",
        help = "Path to the CLI config file"
    )]
    config: Option<PathBuf>,

    #[arg(
        long,
        global = true,
        env = "SLOTGRAPH_LOG",
        help = "Tracing filter directive (e.g. debug, slotgraph=trace)"
    )]
    log_level: Option<String>,

    #[arg(long, global = true, value_name = "FILE", help = "Node record file")]
    node_file: Option<PathBuf>,

    #[arg(
        long,
        global = true,
        value_name = "FILE",
        help = "Relationship record file"
    )]
    relationship_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the node record at a slot
    Node {
        #[arg(value_parser = parse_index)]
        index: Index,
        #[arg(long, help = "Also print the encoded bytes as hex")]
        raw: bool,
    },
    /// Print the relationship record at a slot
    Relationship {
        #[arg(value_parser = parse_index)]
        index: Index,
        #[arg(long, help = "Also print the encoded bytes as hex")]
        raw: bool,
    },
    /// Walk and validate a node's relationship chain
    Chain {
        #[arg(value_parser = parse_index)]
        node: Index,
        #[arg(
            long,
            value_enum,
            help = "Link to follow where both links of a relationship qualify"
        )]
        side: Option<SideArg>,
    },
    /// Write a node record
    PutNode(PutNodeArgs),
    /// Write a relationship record
    PutRelationship(PutRelationshipArgs),
    /// Clear the active flag of a record
    Delete {
        #[arg(value_enum)]
        kind: KindArg,
        #[arg(value_parser = parse_index)]
        index: Index,
    },
    /// Count slots and live records in each file
    Stats,
}

#[derive(clap::Args, Debug)]
struct PutNodeArgs {
    #[arg(value_parser = parse_index)]
    index: Index,
    #[arg(long, help = "Write the record with its active flag cleared")]
    inactive: bool,
    #[arg(long, value_parser = parse_index, default_value = "empty")]
    relationships: Index,
    #[arg(long, value_parser = parse_index, default_value = "empty")]
    properties: Index,
}

#[derive(clap::Args, Debug)]
struct PutRelationshipArgs {
    #[arg(value_parser = parse_index)]
    index: Index,
    #[arg(long, help = "Write the record with its active flag cleared")]
    inactive: bool,
    #[arg(long = "type", value_parser = parse_index, default_value = "0")]
    ty: Index,
    #[arg(long, value_parser = parse_index, default_value = "empty")]
    properties: Index,
    #[arg(long, value_parser = parse_index, default_value = "empty")]
    start_previous: Index,
    #[arg(long, value_parser = parse_index, default_value = "empty")]
    start_next: Index,
    #[arg(long, value_parser = parse_index, default_value = "empty")]
    end_previous: Index,
    #[arg(long, value_parser = parse_index, default_value = "empty")]
    end_next: Index,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum KindArg {
    Node,
    Relationship,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum SideArg {
    Start,
    End,
}

impl From<SideArg> for ChainSide {
    fn from(side: SideArg) -> Self {
        match side {
            SideArg::Start => ChainSide::Start,
            SideArg::End => ChainSide::End,
        }
    }
}

fn parse_index(raw: &str) -> Result<Index, String> {
    if raw.eq_ignore_ascii_case("empty") {
        return Ok(EMPTY);
    }
    raw.parse::<u32>()
        .map(Index)
        .map_err(|err| format!("invalid index '{raw}': {err}"))
}

struct Files {
    nodes: Option<PathBuf>,
    relationships: Option<PathBuf>,
}

impl Files {
    fn resolve(cli: &Cli, config: &CliConfig) -> Self {
        Self {
            nodes: cli.node_file.clone().or_else(|| config.nodes_path().cloned()),
            relationships: cli
                .relationship_file
                .clone()
                .or_else(|| config.relationships_path().cloned()),
        }
    }

    fn nodes(&self, create: bool) -> Result<NodeFile, Box<dyn Error>> {
        let path = self
            .nodes
            .as_ref()
            .ok_or("no node file given; pass --node-file or set [files].nodes")?;
        Ok(NodeFile::open(path, open_options(create))?)
    }

    fn relationships(&self, create: bool) -> Result<RelationshipFile, Box<dyn Error>> {
        let path = self
            .relationships
            .as_ref()
            .ok_or(
                "no relationship file given; pass --relationship-file or set [files].relationships",
            )?;
        Ok(RelationshipFile::open(path, open_options(create))?)
    }
}

fn open_options(create: bool) -> StoreOptions {
    StoreOptions::new()
        .create_if_missing(create)
        .sync_on_store(create)
}

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let config = CliConfig::load(cli.config.clone())?;
    let level = cli
        .log_level
        .as_deref()
        .or_else(|| config.log_level())
        .unwrap_or(DEFAULT_LOG_LEVEL);
    init_logging(level)?;
    let files = Files::resolve(&cli, &config);
    debug!(
        config = ?config.path(),
        nodes = ?files.nodes,
        relationships = ?files.relationships,
        "cli.resolved"
    );

    match &cli.command {
        Command::Node { index, raw } => {
            let store = files.nodes(false)?;
            print_record(*index, store.fetch(*index)?, *raw, format_node);
        }
        Command::Relationship { index, raw } => {
            let store = files.relationships(false)?;
            print_record(*index, store.fetch(*index)?, *raw, format_relationship);
        }
        Command::Chain { node, side } => {
            let nodes = files.nodes(false)?;
            let rels = files.relationships(false)?;
            let record = nodes
                .fetch(*node)?
                .ok_or_else(|| format!("node {node} not found"))?;
            run_chain(&rels, *node, &record, (*side).map(ChainSide::from))?;
        }
        Command::PutNode(args) => {
            let record = NodeRecord {
                active: !args.inactive,
                relationships: args.relationships,
                properties: args.properties,
            };
            files.nodes(true)?.store(args.index, &record)?;
            println!("{}", format_node(args.index, &record));
        }
        Command::PutRelationship(args) => {
            let record = RelationshipRecord {
                active: !args.inactive,
                ty: args.ty,
                properties: args.properties,
                start: Link {
                    self_index: args.index,
                    previous: args.start_previous,
                    next: args.start_next,
                },
                end: Link {
                    self_index: args.index,
                    previous: args.end_previous,
                    next: args.end_next,
                },
            };
            files.relationships(true)?.store(args.index, &record)?;
            println!("{}", format_relationship(args.index, &record));
        }
        Command::Delete { kind, index } => {
            match kind {
                KindArg::Node => files.nodes(false)?.delete(*index)?,
                KindArg::Relationship => files.relationships(false)?.delete(*index)?,
            }
            println!("deleted {} {index}", kind_name(*kind));
        }
        Command::Stats => run_stats(&files)?,
    }
    Ok(())
}

fn chain_walker<'a>(
    rels: &'a RelationshipFile,
    node: Index,
    record: &NodeRecord,
    side: Option<ChainSide>,
) -> ChainWalker<'a, RelationshipFile> {
    let walker = ChainWalker::for_node(rels, node, record);
    match side {
        Some(side) => walker.prefer(side),
        None => walker,
    }
}

fn run_chain(
    rels: &RelationshipFile,
    node: Index,
    record: &NodeRecord,
    side: Option<ChainSide>,
) -> Result<(), Box<dyn Error>> {
    match chain_walker(rels, node, record, side).validate() {
        Ok(len) => {
            let slots = chain_walker(rels, node, record, side).slots()?;
            let rendered: Vec<String> = slots.iter().map(Index::to_string).collect();
            println!(
                "node {node} chain: [{}] ({len} relationships)",
                rendered.join(" -> ")
            );
            Ok(())
        }
        Err(err @ (SlotError::BrokenChain { .. } | SlotError::ChainCycle { .. })) => {
            eprintln!("chain violation: {err}");
            std::process::exit(2);
        }
        Err(err) => Err(err.into()),
    }
}

fn run_stats(files: &Files) -> Result<(), Box<dyn Error>> {
    if files.nodes.is_some() {
        let store = files.nodes(false)?;
        print_stats::<NodeRecord>("nodes", store.slot_count()?, store.active_count()?);
    }
    if files.relationships.is_some() {
        let store = files.relationships(false)?;
        print_stats::<RelationshipRecord>(
            "relationships",
            store.slot_count()?,
            store.active_count()?,
        );
    }
    Ok(())
}

fn print_stats<R: FixedRecord>(label: &str, slots: u64, active: u64) {
    println!("{label}: slots={slots} active={active} record_size={}", R::SIZE);
}

fn print_record<R: FixedRecord>(
    index: Index,
    record: Option<R>,
    raw: bool,
    format: fn(Index, &R) -> String,
) {
    match record {
        Some(record) => {
            println!("{}", format(index, &record));
            if raw {
                println!("  bytes: {}", hex::encode(record.encode()));
            }
        }
        None => println!("{} {index}: absent", R::KIND),
    }
}

fn kind_name(kind: KindArg) -> &'static str {
    match kind {
        KindArg::Node => "node",
        KindArg::Relationship => "relationship",
    }
}

fn format_node(index: Index, node: &NodeRecord) -> String {
    format!(
        "node {index}: active={} relationships={} properties={}",
        node.active, node.relationships, node.properties
    )
}

fn format_link(link: &Link) -> String {
    format!(
        "(self={} previous={} next={})",
        link.self_index, link.previous, link.next
    )
}

fn format_relationship(index: Index, rel: &RelationshipRecord) -> String {
    format!(
        "relationship {index}: active={} type={} properties={} start={} end={}",
        rel.active,
        rel.ty,
        rel.properties,
        format_link(&rel.start),
        format_link(&rel.end)
    )
}
