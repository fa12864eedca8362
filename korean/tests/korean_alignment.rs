//! Korean alignment through the whole sentence pipeline.

#[cfg(test)]
mod tests {
    use textfst_core::{
        tokenize_output, Aligner, AnnotatedSpan, AutomatonAssembler, Config, DefaultAligner,
        DictionaryTrie, Fragment, Model, Sentence, SentenceView, TagTable, TextFstError,
        TokenTable,
    };
    use textfst_korean::KoreanAligner;

    fn aligned(aligner: &dyn Aligner, output: &str, table: &TokenTable, buffer: &[u32]) -> Vec<Fragment> {
        let view = SentenceView::new(table, buffer);
        let mut frags = tokenize_output(output).unwrap();
        aligner.align(&mut frags, 0, buffer.len() - 1, &view).unwrap();
        frags
    }

    #[test]
    fn test_latin_text_matches_default_bounds() {
        let table = TokenTable::from_tokens(["{S}", " ", "de", "le", "Du"]).unwrap();
        for (output, buffer) in [
            ("{de,.PREP} {le,.DET}", vec![2, 1, 3]),
            ("{de,.PREP} {le,.DET}", vec![2]),
            ("{du,.DET}", vec![2, 1, 3]),
        ] {
            let korean = aligned(&KoreanAligner, output, &table, &buffer);
            let default = aligned(&DefaultAligner, output, &table, &buffer);
            for (k, d) in korean.iter().zip(&default) {
                let (k, d) = (k.span.unwrap(), d.span.unwrap());
                assert_eq!(
                    (k.start_token, k.start_char, k.end_token, k.end_char),
                    (d.start_token, d.start_char, d.end_token, d.end_char)
                );
                assert_eq!(k.start_letter, Some(0));
                assert_eq!(k.end_letter, Some(0));
            }
        }
    }

    #[test]
    fn test_override_with_letter_spans() {
        let table = TokenTable::from_tokens(["{S}", " ", "갔다"]).unwrap();
        let model = Model::new(table, DictionaryTrie::new(), Config::default());
        let asm = AutomatonAssembler::new(&model, KoreanAligner);
        let sentence = Sentence::new(1, vec![2]);
        let overrides = [AnnotatedSpan {
            start: 0,
            end: 0,
            output: "{가,가다.V} {ㅆ,.PAST} {다,.END}".to_string(),
        }];
        let built = asm.assemble(&sentence, &overrides).unwrap();
        let mut global = TagTable::new();
        for tag in built.tags.iter() {
            global.intern(tag.clone());
        }
        let described: String = global.iter().map(|t| t.to_string()).collect();
        assert!(described.contains("@{ㅆ,.PAST}\n@0.0.2-0.0.2\n"));
        assert!(described.contains("@{다,.END}\n@0.1.0-0.1.1\n"));
    }

    #[test]
    fn test_mismatching_override_aborts_the_sentence() {
        let table = TokenTable::from_tokens(["{S}", " ", "갔다"]).unwrap();
        let model = Model::new(table, DictionaryTrie::new(), Config::default());
        let asm = AutomatonAssembler::new(&model, KoreanAligner);
        let sentence = Sentence::new(1, vec![2]);
        let overrides = [AnnotatedSpan {
            start: 0,
            end: 0,
            output: "{가,.V} {ㅂ,.X} {다,.END}".to_string(),
        }];
        let err = asm.assemble(&sentence, &overrides).unwrap_err();
        assert!(matches!(err, TextFstError::AlignmentMismatch { .. }));
        assert!(err.is_corpus_inconsistency());
    }
}
