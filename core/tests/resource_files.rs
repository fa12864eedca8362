//! Loading of the resource files read by a corpus run.

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;
    use textfst_core::tokens::load_newline_positions;
    use textfst_core::{
        Config, DictionaryTrie, NormalizationTree, OverrideQueue, TagsetFilter, TextFstError,
        TokenTable,
    };

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("textfst_{}_{}", std::process::id(), name))
    }

    #[test]
    fn test_token_table_file() {
        let path = temp_path("tokens.txt");
        fs::write(&path, "5\n{S}\n \nle\nchat\n{STOP}\n").unwrap();
        let table = TokenTable::load(&path).unwrap();
        assert_eq!(table.len(), 5);
        assert_eq!(table.space(), Some(1));
        assert_eq!(table.id_of("chat"), Some(3));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn test_dela_file_and_compiled_trie() {
        let dela = temp_path("dic.dic");
        fs::write(
            &dela,
            "/ comment line\nchat,.N+z1:ms\nchats,chat.N+z1:mp\n\npomme de terre,.N:fs\n",
        )
        .unwrap();
        let mut trie = DictionaryTrie::new();
        assert_eq!(trie.load_dela(&dela).unwrap(), 3);

        let bin = temp_path("dic.bin");
        trie.save_bincode(&bin).unwrap();
        let loaded = DictionaryTrie::load_bincode(&bin).unwrap();
        assert_eq!(loaded.node_count(), trie.node_count());
        assert_eq!(loaded.lookup("chats")[0].lemma, "chat");
        assert_eq!(loaded.lookup("pomme de terre").len(), 1);

        let _ = fs::remove_file(dela);
        let _ = fs::remove_file(bin);
    }

    #[test]
    fn test_bad_dela_line_is_reported() {
        let dela = temp_path("bad.dic");
        fs::write(&dela, "chat,.N\nnocomma\n").unwrap();
        let err = DictionaryTrie::new().load_dela(&dela).unwrap_err();
        assert!(matches!(err, TextFstError::InvalidFormat { line: 2, .. }));
        let _ = fs::remove_file(dela);
    }

    #[test]
    fn test_normalization_rules_file() {
        let table = TokenTable::from_tokens(["{S}", " ", "j", "'", "du"]).unwrap();
        let rules = temp_path("norm.txt");
        fs::write(&rules, "# contractions\nj '\t{je,.PRO:1s}\ndu\t{de,.PREP} {le,.DET:ms}\n").unwrap();
        let tree = NormalizationTree::load_rules(&rules, &table).unwrap();
        let root = tree.node(tree.root());
        let du = root.child(4).unwrap();
        assert_eq!(tree.node(du).outputs(), ["{de,.PREP} {le,.DET:ms}"]);

        let bin = temp_path("norm.bin");
        tree.save_bincode(&bin).unwrap();
        let loaded = NormalizationTree::load_bincode(&bin).unwrap();
        assert_eq!(loaded.len(), tree.len());

        let _ = fs::remove_file(rules);
        let _ = fs::remove_file(bin);
    }

    #[test]
    fn test_tagset_and_overrides_files() {
        let tagset = temp_path("tagset.def");
        fs::write(&tagset, "N z1\nV\n").unwrap();
        let filter = TagsetFilter::load(&tagset).unwrap();
        let entry = textfst_core::DelaEntry::parse("chat,.N+z1+Anl:ms").unwrap();
        assert_eq!(filter.filter(&entry).unwrap().codes, vec!["N", "z1"]);

        let ind = temp_path("tags.ind");
        fs::write(&ind, "#M\n0.0.0 2.3.0 {le chat,.N}\n").unwrap();
        let queue = OverrideQueue::load(&ind).unwrap();
        assert_eq!(queue.len(), 1);

        let _ = fs::remove_file(tagset);
        let _ = fs::remove_file(ind);
    }

    #[test]
    fn test_newline_positions_file() {
        let path = temp_path("enter.pos");
        let bytes: Vec<u8> = [3u32, 10].iter().flat_map(|p| p.to_le_bytes()).collect();
        fs::write(&path, bytes).unwrap();
        assert_eq!(load_newline_positions(&path).unwrap(), vec![3, 10]);
        let _ = fs::remove_file(path);
    }

    #[test]
    fn test_config_toml_file() {
        let path = temp_path("textfst.toml");
        let mut config = Config::default();
        config.clean = true;
        config.korean = true;
        config.save_toml(&path).unwrap();
        let loaded = Config::load_toml(&path).unwrap();
        assert!(loaded.clean);
        assert!(loaded.korean);
        assert_eq!(loaded.max_tokens_per_sentence, config.max_tokens_per_sentence);
        let _ = fs::remove_file(path);
    }
}
