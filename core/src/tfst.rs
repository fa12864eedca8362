//! `.tfst` / `.tind` output.
//!
//! Layout of the `.tfst` file:
//!
//! ```text
//! 0000000002          sentence count, rewritten on finish
//! $1                  one block per sentence
//! le chat             sentence text
//! 4/2 0/1 7/4         token id / length in chars
//! 0_0                 offset in tokens _ offset in chars
//! : 2 1               one line per state: `t` if final else `:`,
//! : 3 2               then ` tag dest` for each transition
//! t
//! f                   end of sentence
//! ...
//! %4                  corpus tag table: count, then one description per tag
//! @<E>
//! .
//! @STD
//! ...
//! f
//! ```
//!
//! The `.tind` file holds the byte offset of every `$n` line as a 32-bit
//! little-endian integer.

use crate::assembler::SentenceRecord;
use crate::tag::{TagFrequencies, TagTable};
use crate::Result;
use std::fmt::Write as _;
use std::io::{self, Seek, SeekFrom, Write};

/// Width of the sentence count header.
const HEADER_WIDTH: usize = 10;

pub struct TfstWriter<W, I> {
    out: W,
    index: I,
    position: u64,
    sentences: usize,
}

impl<W: Write + Seek, I: Write> TfstWriter<W, I> {
    /// Start a file; writes a placeholder header.
    pub fn new(mut out: W, index: I) -> Result<Self> {
        let header = format!("{:0width$}\n", 0, width = HEADER_WIDTH);
        out.write_all(header.as_bytes())?;
        Ok(Self {
            out,
            index,
            position: header.len() as u64,
            sentences: 0,
        })
    }

    pub fn sentences(&self) -> usize {
        self.sentences
    }

    pub fn write_sentence(&mut self, record: &SentenceRecord) -> Result<()> {
        let offset = u32::try_from(self.position).map_err(|_| {
            io::Error::new(io::ErrorKind::InvalidData, ".tfst file exceeds 4 GiB")
        })?;
        self.index.write_all(&offset.to_le_bytes())?;

        let block = render_sentence(record);
        self.out.write_all(block.as_bytes())?;
        self.position += block.len() as u64;
        self.sentences += 1;
        Ok(())
    }

    /// Write the corpus tag table, fix the header and hand back the writers.
    pub fn finish(mut self, tags: &TagTable) -> Result<(W, I)> {
        let mut tail = format!("%{}\n", tags.len());
        for tag in tags.iter() {
            let _ = write!(tail, "{}", tag);
        }
        tail.push_str("f\n");
        self.out.write_all(tail.as_bytes())?;

        self.out.seek(SeekFrom::Start(0))?;
        write!(self.out, "{:0width$}", self.sentences, width = HEADER_WIDTH)?;
        self.out.seek(SeekFrom::End(0))?;
        self.out.flush()?;
        self.index.flush()?;
        Ok((self.out, self.index))
    }
}

fn render_sentence(record: &SentenceRecord) -> String {
    let mut s = String::new();
    let _ = writeln!(s, "${}", record.number);
    let _ = writeln!(s, "{}", record.text);
    let tokens: Vec<String> = record
        .tokens
        .iter()
        .zip(&record.token_sizes)
        .map(|(id, len)| format!("{}/{}", id, len))
        .collect();
    let _ = writeln!(s, "{}", tokens.join(" "));
    let _ = writeln!(s, "{}_{}", record.offset_in_tokens, record.offset_in_chars);
    for state in &record.states {
        s.push(if state.is_final { 't' } else { ':' });
        for t in &state.transitions {
            let _ = write!(s, " {} {}", t.tag, t.dest);
        }
        s.push('\n');
    }
    s.push_str("f\n");
    s
}

/// `text<TAB>count` lines, most frequent first.
pub fn write_frequencies<W: Write>(mut out: W, frequencies: &TagFrequencies) -> Result<()> {
    for (text, count) in frequencies.sorted() {
        writeln!(out, "{}\t{}", text, count)?;
    }
    out.flush()?;
    Ok(())
}

/// One JSON object per line.
pub fn write_json_record<W: Write>(mut out: W, record: &SentenceRecord) -> Result<()> {
    serde_json::to_writer(&mut out, record)?;
    out.write_all(b"\n")?;
    Ok(())
}
