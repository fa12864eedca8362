use crate::align::Aligner;
use crate::assembler::{AutomatonAssembler, SentenceOutcome};
use crate::overrides::OverrideQueue;
use crate::tag::{TagFrequencies, TagTable};
use crate::tfst::{write_json_record, TfstWriter};
use crate::tokens::SentenceReader;
use crate::{Model, Result};
use std::io::{Read, Seek, Write};

/// Counters of a finished run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CorpusSummary {
    pub sentences: usize,
    /// Sentences written as a single state after trimming emptied them.
    pub emptied: usize,
    /// Size of the corpus tag table, epsilon included.
    pub tags: usize,
}

/// Batch driver: one automaton per sentence, in corpus order.
///
/// Holds the state shared across sentences: the corpus tag table, the tag
/// frequencies and the queue of overrides not consumed yet.
pub struct CorpusBuilder<'m, A> {
    assembler: AutomatonAssembler<'m, A>,
    overrides: OverrideQueue,
    tags: TagTable,
    frequencies: TagFrequencies,
}

impl<'m, A: Aligner> CorpusBuilder<'m, A> {
    pub fn new(model: &'m Model, aligner: A) -> Self {
        Self {
            assembler: AutomatonAssembler::new(model, aligner),
            overrides: OverrideQueue::new(),
            tags: TagTable::new(),
            frequencies: TagFrequencies::new(),
        }
    }

    pub fn with_overrides(mut self, overrides: OverrideQueue) -> Self {
        self.overrides = overrides;
        self
    }

    /// Build and write every sentence of `reader`. Stops at the first error.
    pub fn run<R, W, I>(
        &mut self,
        reader: SentenceReader<'_, R>,
        writer: &mut TfstWriter<W, I>,
        mut json: Option<&mut dyn Write>,
    ) -> Result<CorpusSummary>
    where
        R: Read,
        W: Write + Seek,
        I: Write,
    {
        let interval = self.assembler.model().config.progress_interval;
        let mut summary = CorpusSummary::default();
        for sentence in reader {
            let sentence = sentence?;
            let overrides = self
                .overrides
                .take_for_sentence(sentence.offset_in_tokens, sentence.len());
            let record =
                self.assembler
                    .build(&sentence, &overrides, &mut self.tags, &mut self.frequencies)?;
            if record.outcome == SentenceOutcome::Emptied {
                summary.emptied += 1;
            }
            writer.write_sentence(&record)?;
            if let Some(out) = json.as_deref_mut() {
                write_json_record(out, &record)?;
            }
            summary.sentences += 1;
            if interval > 0 && summary.sentences % interval == 0 {
                tracing::info!("{} sentences built", summary.sentences);
            }
        }
        if let Some(out) = json {
            out.flush()?;
        }
        if !self.overrides.is_empty() {
            tracing::warn!(
                "{} overrides start after the last sentence and were ignored",
                self.overrides.len()
            );
        }
        summary.tags = self.tags.len();
        tracing::info!(
            "{} sentences, {} emptied, {} distinct tags",
            summary.sentences,
            summary.emptied,
            summary.tags
        );
        Ok(summary)
    }

    pub fn tags(&self) -> &TagTable {
        &self.tags
    }

    pub fn frequencies(&self) -> &TagFrequencies {
        &self.frequencies
    }

    pub fn into_tables(self) -> (TagTable, TagFrequencies) {
        (self.tags, self.frequencies)
    }
}
