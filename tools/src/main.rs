use anyhow::{Context, Result};
use clap::Parser;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::PathBuf;

use textfst_core::tokens::load_newline_positions;
use textfst_core::{
    write_frequencies, Aligner, Config, CorpusBuilder, CorpusSummary, DefaultAligner, Model,
    OverrideQueue, SentenceReader, TagsetFilter, TfstWriter, TokenTable,
};
use textfst_korean::KoreanAligner;
use textfst_tools::{init_tracing, load_dictionaries, load_normalization, CorpusFiles, OutputFiles};

/// Build the text automaton (.tfst) of a tokenized corpus.
#[derive(Parser)]
#[command(name = "txt2tfst")]
struct Args {
    /// Corpus directory holding tokens.txt and text.cod (enter.pos and
    /// tags.ind are used when present)
    corpus: PathBuf,

    /// Dictionaries: DELA text files, or a single compiled `.bin` trie
    #[arg(long = "dic", num_args = 1..)]
    dictionaries: Vec<PathBuf>,

    /// Normalization rules, text or compiled `.bin`
    #[arg(long)]
    normalization: Option<PathBuf>,

    /// Tagset description used to filter dictionary entries
    #[arg(long)]
    tagset: Option<PathBuf>,

    /// TOML configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// Keep only the best paths between two states
    #[arg(long)]
    clean: bool,

    /// Letter-level alignment for Korean
    #[arg(long)]
    korean: bool,

    /// Also dump one JSON record per sentence
    #[arg(long)]
    json: bool,

    /// Output directory (defaults to the corpus directory)
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::load_toml(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => Config::default(),
    };
    config.clean |= args.clean;
    config.korean |= args.korean;

    let corpus = CorpusFiles::new(&args.corpus);
    let tokens = TokenTable::load(&corpus.tokens)
        .with_context(|| format!("loading {}", corpus.tokens.display()))?;
    tracing::info!("{}: {} tokens", corpus.tokens.display(), tokens.len());

    let dictionary = load_dictionaries(&args.dictionaries)?;
    let normalization = match &args.normalization {
        Some(path) => Some(load_normalization(path, &tokens)?),
        None => None,
    };
    let tagset = match &args.tagset {
        Some(path) => Some(
            TagsetFilter::load(path).with_context(|| format!("loading {}", path.display()))?,
        ),
        None => None,
    };
    let overrides = if corpus.overrides.exists() {
        let queue = OverrideQueue::load(&corpus.overrides)
            .with_context(|| format!("loading {}", corpus.overrides.display()))?;
        tracing::info!("{}: {} overrides", corpus.overrides.display(), queue.len());
        queue
    } else {
        OverrideQueue::new()
    };

    let mut model = Model::new(tokens, dictionary, config);
    if let Some(tree) = normalization {
        model = model.with_normalization(tree);
    }
    if let Some(filter) = tagset {
        model = model.with_tagset(filter);
    }

    let out_dir = args.output.clone().unwrap_or_else(|| args.corpus.clone());
    let outputs = OutputFiles::new(&out_dir);
    let summary = if model.config.korean {
        run(&model, KoreanAligner, overrides, &corpus, &outputs, args.json)?
    } else {
        run(&model, DefaultAligner, overrides, &corpus, &outputs, args.json)?
    };

    println!(
        "Wrote {} ({} sentences, {} emptied, {} tags)",
        outputs.tfst.display(),
        summary.sentences,
        summary.emptied,
        summary.tags
    );
    Ok(())
}

fn run<A: Aligner>(
    model: &Model,
    aligner: A,
    overrides: OverrideQueue,
    corpus: &CorpusFiles,
    outputs: &OutputFiles,
    json: bool,
) -> Result<CorpusSummary> {
    let text = File::open(&corpus.text)
        .with_context(|| format!("opening {}", corpus.text.display()))?;
    let mut reader = SentenceReader::new(
        BufReader::new(text),
        &model.tokens,
        model.config.max_tokens_per_sentence,
    );
    if corpus.newlines.exists() {
        let positions = load_newline_positions(&corpus.newlines)
            .with_context(|| format!("loading {}", corpus.newlines.display()))?;
        reader = reader.with_newlines(positions);
    }

    let tfst = BufWriter::new(File::create(&outputs.tfst)?);
    let tind = BufWriter::new(File::create(&outputs.tind)?);
    let mut writer = TfstWriter::new(tfst, tind)?;
    let mut dump = if json {
        Some(BufWriter::new(File::create(&outputs.json)?))
    } else {
        None
    };

    let mut builder = CorpusBuilder::new(model, aligner).with_overrides(overrides);
    let summary = builder
        .run(reader, &mut writer, dump.as_mut().map(|w| w as &mut dyn Write))
        .with_context(|| format!("building {}", outputs.tfst.display()))?;
    writer.finish(builder.tags())?;

    let frequencies = BufWriter::new(File::create(&outputs.frequencies)?);
    write_frequencies(frequencies, builder.frequencies())?;
    Ok(summary)
}
