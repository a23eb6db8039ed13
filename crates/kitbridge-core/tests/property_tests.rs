//! # Property-Based Tests
//!
//! Determinism and correctness invariants checked with proptest.

use kitbridge_core::tokenizer::tokenize;
use kitbridge_core::{
    ContentStorage, DataType, KitId, Metadata, ProductionOutput, export_canonical,
    import_canonical,
};
use proptest::collection::vec;
use proptest::prelude::*;

fn data_type() -> impl Strategy<Value = DataType> {
    prop::sample::select(DataType::ALL.to_vec())
}

fn output(content: String) -> ProductionOutput {
    ProductionOutput {
        kit_id: KitId::new("prop-kit"),
        output_type: "note".to_string(),
        data_type: DataType::Text,
        content,
        metadata: Metadata::new(),
        timestamp: 0,
    }
}

// =============================================================================
// PROPERTY TESTS
// =============================================================================

proptest! {
    /// Compatibility is symmetric.
    #[test]
    fn compatibility_is_symmetric(a in data_type(), b in data_type()) {
        prop_assert_eq!(a.is_compatible(b), b.is_compatible(a));
    }

    /// Names parse back to the same type.
    #[test]
    fn data_type_names_parse_back(t in data_type()) {
        let parsed: DataType = t.name().parse().expect("parse");
        prop_assert_eq!(parsed, t);
    }

    /// Tokens are lowercase, alphanumeric and at least three characters.
    #[test]
    fn tokens_are_normalized(text in "[a-zA-Z0-9 ,.;:_/-]{0,200}") {
        for token in tokenize(&text) {
            prop_assert!(token.chars().count() >= 3);
            prop_assert!(token.chars().all(char::is_alphanumeric));
            prop_assert_eq!(token.to_lowercase(), token.clone());
        }
    }

    /// Tokenizing is idempotent over its own output.
    #[test]
    fn tokenize_is_stable(words in vec("[a-zA-Z0-9]{1,8}", 0..20)) {
        let text = words.join(" ");
        let once = tokenize(&text);
        let again = tokenize(&once.iter().cloned().collect::<Vec<_>>().join(" "));
        prop_assert_eq!(once, again);
    }

    /// Every hit of a multi-token search contains every query token.
    #[test]
    fn search_is_a_conjunction(
        docs in vec(
            vec(prop::sample::select(vec!["alpha", "beta", "gamma", "delta"]), 1..4),
            1..20,
        ),
        query in vec(prop::sample::select(vec!["alpha", "beta", "gamma", "delta"]), 1..3),
    ) {
        let storage = ContentStorage::new();
        for words in &docs {
            storage.store(output(words.join(" ")), "/p", "p");
        }

        let hits = storage.search(&query.join(" "));
        let expected = docs
            .iter()
            .filter(|words| query.iter().all(|q| words.contains(q)))
            .count();
        prop_assert_eq!(hits.len(), expected);

        for hit in &hits {
            let tokens = tokenize(&hit.output.content);
            for q in &query {
                prop_assert!(tokens.contains(*q));
            }
        }
    }

    /// Content ids are sequential and hits come back in id order.
    #[test]
    fn ids_are_sequential(count in 1usize..50) {
        let storage = ContentStorage::new();
        for i in 0..count {
            storage.store(output(format!("shared item{}", i)), "/p", "p");
        }

        let ids: Vec<u64> = storage.search("shared").iter().map(|c| c.id.0).collect();
        let expected: Vec<u64> = (0..count as u64).collect();
        prop_assert_eq!(ids, expected);
    }

    /// Canonical export is independent of input order.
    #[test]
    fn canonical_export_is_order_independent(contents in vec("[a-z ]{0,30}", 0..20)) {
        let storage = ContentStorage::new();
        for content in contents {
            storage.store(output(content), "/p", "p");
        }

        let records = storage.export_for_ml();
        let mut reversed = records.clone();
        reversed.reverse();

        let a = export_canonical(&records).expect("export");
        let b = export_canonical(&reversed).expect("export");
        prop_assert_eq!(&a, &b);
        prop_assert_eq!(import_canonical(&a).expect("import"), records);
    }
}
