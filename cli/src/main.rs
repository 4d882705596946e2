use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use soundseek_core::{Analyzer, SearchEngine, SearchOptions, SearchResults, SimpleAnalyzer, StandardAnalyzer};
use tracing_subscriber::{fmt, EnvFilter};

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::Duration;

type Engine = SearchEngine<Box<dyn Analyzer>>;

#[derive(Parser)]
#[command(name = "soundseek")]
#[command(about = "Index a folder of text files and run ranked phrase-aware queries", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct CorpusArgs {
    /// Folder holding the .txt documents to index
    #[arg(long, default_value = "./corpus")]
    corpus: PathBuf,
    /// Fail the index build if it takes longer than this many seconds
    #[arg(long)]
    build_timeout_secs: Option<u64>,
    /// Do not substitute similar-sounding terms for unknown query words
    #[arg(long, default_value_t = false)]
    no_phonetic: bool,
    /// Index without stop-word removal and stemming
    #[arg(long, default_value_t = false)]
    simple: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one query and print the ranked documents
    Search {
        #[command(flatten)]
        corpus: CorpusArgs,
        /// Number of results to print
        #[arg(long, default_value_t = 10)]
        limit: usize,
        /// Print results as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
        /// Query text; wrap phrases in double quotes
        #[arg(required = true)]
        query: Vec<String>,
    },
    /// Build the index once, then answer queries read from stdin
    Repl {
        #[command(flatten)]
        corpus: CorpusArgs,
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Print index statistics
    Stats {
        #[command(flatten)]
        corpus: CorpusArgs,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).with_writer(io::stderr).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Search { corpus, limit, json, query } => {
            let engine = build_engine(&corpus)?;
            let query = query.join(" ");
            let results = engine.search(&query);
            let mut out = io::stdout().lock();
            if json {
                let body = serde_json::json!({
                    "query": query,
                    "total_hits": results.len(),
                    "substitutions": results.substitutions,
                    "results": results.hits.iter().take(limit).collect::<Vec<_>>(),
                });
                serde_json::to_writer_pretty(&mut out, &body)?;
                writeln!(out)?;
            } else {
                display_results(&mut out, &results, limit)?;
            }
            Ok(())
        }
        Commands::Repl { corpus, limit } => {
            let engine = build_engine(&corpus)?;
            run_repl(&engine, io::stdin().lock(), io::stdout().lock(), limit)
        }
        Commands::Stats { corpus } => {
            let engine = build_engine(&corpus)?;
            print_stats(&mut io::stdout().lock(), &engine)?;
            Ok(())
        }
    }
}

fn build_engine(args: &CorpusArgs) -> Result<Engine> {
    let analyzer: Box<dyn Analyzer> = if args.simple { Box::new(SimpleAnalyzer) } else { Box::new(StandardAnalyzer) };
    let options = SearchOptions {
        phonetic_fallback: !args.no_phonetic,
        build_timeout: args.build_timeout_secs.map(Duration::from_secs),
    };
    tracing::info!(corpus = %args.corpus.display(), simple = args.simple, "building index");
    SearchEngine::from_corpus_dir(&args.corpus, analyzer, options)
        .with_context(|| format!("failed to build index from {}", args.corpus.display()))
}

fn display_results<W: Write>(out: &mut W, results: &SearchResults, limit: usize) -> io::Result<()> {
    if results.is_empty() {
        return writeln!(out, "no results found.");
    }
    for sub in &results.substitutions {
        writeln!(out, "showing results for '{}' instead of '{}'", sub.replacement, sub.original)?;
    }
    for (i, hit) in results.hits.iter().take(limit).enumerate() {
        writeln!(out, "{}. ('{}', {})", i + 1, hit.name, hit.score)?;
    }
    Ok(())
}

fn run_repl<A: Analyzer, R: BufRead, W: Write>(engine: &SearchEngine<A>, input: R, mut out: W, limit: usize) -> Result<()> {
    writeln!(out, "type a query, use \"phrases in quotes\", or type 'exit' to quit.")?;
    let mut lines = input.lines();
    loop {
        write!(out, "\nquery> ")?;
        out.flush()?;
        let Some(line) = lines.next() else {
            writeln!(out, "\nexiting.")?;
            break;
        };
        let line = line?;
        let query = line.trim();
        if query.is_empty() {
            continue;
        }
        if query.eq_ignore_ascii_case("exit") || query.eq_ignore_ascii_case("quit") {
            writeln!(out, "exiting.")?;
            break;
        }
        display_results(&mut out, &engine.search(query), limit)?;
    }
    Ok(())
}

fn print_stats<A: Analyzer, W: Write>(out: &mut W, engine: &SearchEngine<A>) -> io::Result<()> {
    let index = engine.index();
    writeln!(out, "documents:          {}", index.num_docs())?;
    writeln!(out, "scorable documents: {}", index.total_doc_count())?;
    writeln!(out, "vocabulary:         {}", index.vocabulary_len())?;
    writeln!(out, "phonetic codes:     {}", index.phonetic_code_count())
}
