use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use textfst_core::{NormalizationTree, TokenTable};
use textfst_tools::{init_tracing, load_dictionaries};

/// Compile DELA dictionaries into one bincode trie, and optionally
/// normalization rules against a corpus token table.
#[derive(Parser)]
#[command(name = "compile_dic")]
struct Args {
    /// DELA text files
    #[arg(required = true, num_args = 1..)]
    inputs: Vec<PathBuf>,

    /// Output trie
    #[arg(long, default_value = "dictionary.bin")]
    out: PathBuf,

    /// Normalization rules to compile
    #[arg(long, requires = "tokens")]
    rules: Option<PathBuf>,

    /// tokens.txt of the corpus the rules will be applied to
    #[arg(long)]
    tokens: Option<PathBuf>,

    /// Output of the compiled rules
    #[arg(long, default_value = "normalization.bin")]
    rules_out: PathBuf,
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let trie = load_dictionaries(&args.inputs)?;
    trie.save_bincode(&args.out)
        .with_context(|| format!("writing {}", args.out.display()))?;
    println!(
        "Wrote {} ({} entries, {} nodes)",
        args.out.display(),
        trie.entry_count(),
        trie.node_count()
    );

    if let (Some(rules), Some(tokens)) = (&args.rules, &args.tokens) {
        let table = TokenTable::load(tokens)
            .with_context(|| format!("loading {}", tokens.display()))?;
        let tree = NormalizationTree::load_rules(rules, &table)
            .with_context(|| format!("loading {}", rules.display()))?;
        tree.save_bincode(&args.rules_out)
            .with_context(|| format!("writing {}", args.rules_out.display()))?;
        println!("Wrote {} ({} nodes)", args.rules_out.display(), tree.len());
    }
    Ok(())
}
