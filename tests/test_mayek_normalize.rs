use mayek_normalize::{
    convert, ConversionError, CustomDictionaryFile, Dictionary, DictionaryStore, MayekConverter,
};

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    fn tiny_converter() -> MayekConverter {
        let default = Dictionary::from_pairs([("a", "1")]).unwrap();
        MayekConverter::with_store(DictionaryStore::with_default(default))
    }

    #[test]
    fn default_dictionary_test() {
        let converter = MayekConverter::new().unwrap();
        assert_eq!(converter.convert("ꯑꯣꯁꯤ").unwrap(), "ꯑꯁꯤ");
        assert_eq!(converter.convert("ꯒ꯭ ꯇ").unwrap(), "ꯒ꯭ꯇ");
        assert_eq!(converter.convert("ꯋ꯭ ꯔ").unwrap(), "ꯋ꯭ꯔ");
        assert_eq!(converter.convert("ꯁꯣꯪ").unwrap(), "ꯁꯣꯡ");
    }

    #[test]
    fn mixed_text_test() {
        let input = "ꯑꯣꯁꯤ, ꯁꯣꯪ! (Manipur)\t\n";
        let expected_output = "ꯑꯁꯤ, ꯁꯣꯡ! (Manipur)\t\n";
        let converter = MayekConverter::new().unwrap();
        assert_eq!(converter.convert(input).unwrap(), expected_output);
    }

    #[test]
    fn non_matching_text_is_unchanged_test() {
        let converter = MayekConverter::new().unwrap();
        let input = "Hello, world. 12345 [.*+?^${}()|\\]";
        assert_eq!(converter.convert(input).unwrap(), input);
    }

    #[test]
    fn every_key_converts_to_its_value_test() {
        let dictionary = Dictionary::builtin().unwrap();
        for (key, value) in dictionary.iter() {
            let output = convert(key, &dictionary).unwrap();
            assert!(
                output.contains(value),
                "{key:?} converted to {output:?}, expected it to contain {value:?}"
            );
        }
    }

    #[test]
    fn longest_key_first_test() {
        let dictionary = Dictionary::from_json_value(json!({ "ab": "X", "a": "Y" })).unwrap();
        assert_eq!(convert("ab", &dictionary).unwrap(), "X");
    }

    #[test]
    fn blank_input_test() {
        let converter = MayekConverter::new().unwrap();
        assert_eq!(converter.convert(""), Err(ConversionError::EmptyInput));
        assert_eq!(converter.convert("  \n\t "), Err(ConversionError::EmptyInput));
    }

    #[test]
    fn merge_and_reset_test() {
        let converter = tiny_converter();
        let store = converter.store();

        store.merge_value(json!({ "a": "2", "b": "3" })).unwrap();
        assert_eq!(
            *store.current(),
            Dictionary::from_pairs([("a", "2"), ("b", "3")]).unwrap()
        );
        assert_eq!(converter.convert("ab").unwrap(), "23");

        store.reset();
        assert_eq!(
            *store.current(),
            Dictionary::from_pairs([("a", "1")]).unwrap()
        );
        assert_eq!(converter.convert("ab").unwrap(), "1b");
    }

    #[test]
    fn invalid_merge_test() {
        let converter = tiny_converter();
        let store = converter.store();
        store.merge_value(json!({ "b": "3" })).unwrap();

        for value in [json!(null), json!([{ "a": "2" }]), json!(1.5), json!("a")] {
            assert!(store.merge_value(value).is_err());
        }
        assert_eq!(converter.convert("ab").unwrap(), "13");
    }

    #[test]
    fn custom_value_rewritten_by_later_pass_test() {
        // "ꯑꯣꯁꯤ" -> "ꯑꯁꯤ" (default), then the shorter custom key "ꯑꯁꯤ" rewrites it again
        let converter = MayekConverter::new().unwrap();
        converter
            .store()
            .merge_json(r#"{ "ꯑꯁꯤ": "ꯑꯗꯨ" }"#)
            .unwrap();
        assert_eq!(converter.convert("ꯑꯣꯁꯤ").unwrap(), "ꯑꯗꯨ");
    }

    #[test]
    fn conversion_is_not_always_idempotent_test() {
        // One pass replaces non-overlapping matches only; the output still
        // contains the key, so a second run changes it again.
        let dictionary = Dictionary::from_pairs([("ab", "b")]).unwrap();
        let once = convert("aab", &dictionary).unwrap();
        let twice = convert(&once, &dictionary).unwrap();
        assert_eq!(once, "ab");
        assert_eq!(twice, "b");
    }

    #[test]
    fn idempotent_when_values_never_match_keys_test() {
        let dictionary = Dictionary::from_pairs([("x", "1"), ("yz", "2"), ("q", "")]).unwrap();
        let once = convert("xyzqxq yz", &dictionary).unwrap();
        assert_eq!(once, "121 2");
        assert_eq!(convert(&once, &dictionary).unwrap(), once);
    }

    #[test]
    fn parallel_matches_sequential_test() {
        let input = "ꯑꯣꯁꯤ ꯒ꯭ ꯇ ꯁꯣꯪ ꯂꯤ ꯃꯤ\n".repeat(5000);
        let mut converter = MayekConverter::new().unwrap();
        assert!(converter.get_parallel());
        let parallel = converter.convert(&input).unwrap();
        converter.set_parallel(false);
        let sequential = converter.convert(&input).unwrap();
        assert_eq!(parallel, sequential);
        assert!(!parallel.contains("ꯁꯣꯪ"));
    }

    #[test]
    fn saved_dictionary_restore_test() {
        let dir = tempdir().unwrap();
        let saved = CustomDictionaryFile::new(dir.path().join("custom_dictionary.json"));

        let converter = tiny_converter();
        assert!(!converter.store().restore(&saved).unwrap());

        converter.store().merge_json(r#"{ "b": "3" }"#).unwrap();
        saved.save(&converter.store().custom().unwrap()).unwrap();

        // a fresh session picks the saved overrides back up
        let next_session = tiny_converter();
        assert!(next_session.store().restore(&saved).unwrap());
        assert_eq!(next_session.convert("ab").unwrap(), "13");

        saved.remove().unwrap();
        let after_reset = tiny_converter();
        assert!(!after_reset.store().restore(&saved).unwrap());
        assert_eq!(after_reset.convert("ab").unwrap(), "1b");
    }

    #[test]
    fn broken_saved_dictionary_keeps_default_test() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("custom_dictionary.json");
        std::fs::write(&path, "{ not json").unwrap();

        let converter = tiny_converter();
        assert!(converter
            .store()
            .restore(&CustomDictionaryFile::new(&path))
            .is_err());
        assert!(!converter.store().is_customized());
        assert_eq!(converter.convert("a").unwrap(), "1");
    }
}
