//! Property-based structural checks.
//!
//! Random trees, random fault patterns, one invariant: the stream is
//! always a balanced sequence of blocks, and the diagnostics line up with
//! the summary.

use crate::checker::assert_wellformed;
use grove::{Exporter, MemoryNode, MemoryProperty, MemoryValue, ValueKind};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum ChildCase {
    Healthy(MemoryNode),
    Broken(String),
}

fn arb_fragment() -> impl Strategy<Value = String> {
    "[0-9a-f]{4}".prop_map(|id| format!("segment/{id}"))
}

fn arb_text() -> impl Strategy<Value = String> {
    prop::collection::vec(any::<char>(), 0..16).prop_map(|chars| chars.into_iter().collect())
}

fn arb_text_value() -> impl Strategy<Value = MemoryValue> {
    prop_oneof![
        4 => arb_text().prop_map(MemoryValue::text),
        1 => arb_fragment().prop_map(MemoryValue::unavailable),
    ]
}

fn arb_binary_value() -> impl Strategy<Value = MemoryValue> {
    prop_oneof![
        4 => prop::collection::vec(any::<u8>(), 0..24).prop_map(MemoryValue::bytes),
        1 => arb_fragment().prop_map(MemoryValue::unavailable),
    ]
}

fn arb_kind() -> impl Strategy<Value = ValueKind> {
    prop_oneof![
        Just(ValueKind::String),
        Just(ValueKind::Long),
        Just(ValueKind::Double),
        Just(ValueKind::Boolean),
        Just(ValueKind::Date),
        Just(ValueKind::Decimal),
        Just(ValueKind::Binary),
    ]
}

fn arb_property() -> impl Strategy<Value = MemoryProperty> {
    ("[a-z]{1,8}", arb_kind(), any::<bool>()).prop_flat_map(|(name, kind, is_array)| {
        let value = if kind == ValueKind::Binary {
            arb_binary_value().boxed()
        } else {
            arb_text_value().boxed()
        };
        if is_array {
            prop::collection::vec(value, 0..4)
                .prop_map(move |values| MemoryProperty::array(name.clone(), kind, values))
                .boxed()
        } else {
            value
                .prop_map(move |v| MemoryProperty::scalar(name.clone(), kind, v))
                .boxed()
        }
    })
}

fn arb_node() -> impl Strategy<Value = MemoryNode> {
    let leaf = prop::collection::vec(arb_property(), 0..4).prop_map(|properties| {
        properties
            .into_iter()
            .fold(MemoryNode::new(), MemoryNode::with_property)
    });

    leaf.prop_recursive(4, 32, 3, |inner| {
        let child = prop_oneof![
            3 => inner.prop_map(ChildCase::Healthy),
            1 => arb_fragment().prop_map(ChildCase::Broken),
        ];
        (
            prop::collection::vec(arb_property(), 0..3),
            prop::collection::vec(("[a-z]{1,6}", child), 0..3),
            proptest::option::of((0usize..3, arb_fragment())),
            proptest::option::of((0usize..3, arb_fragment())),
        )
            .prop_map(|(properties, children, property_cut, child_cut)| {
                let mut node = properties
                    .into_iter()
                    .fold(MemoryNode::new(), MemoryNode::with_property);
                for (index, (name, case)) in children.into_iter().enumerate() {
                    // Suffix with the position so sibling names stay unique.
                    let name = format!("{name}{index}");
                    node = match case {
                        ChildCase::Healthy(child) => node.with_child(name, child),
                        ChildCase::Broken(fragment) => node.with_unavailable_child(name, fragment),
                    };
                }
                if let Some((after, fragment)) = property_cut {
                    node = node.cut_properties_after(after, fragment);
                }
                if let Some((after, fragment)) = child_cut {
                    node = node.cut_children_after(after, fragment);
                }
                node
            })
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn output_is_always_wellformed(root in arb_node()) {
        let mut out = Vec::new();
        let mut diag = Vec::new();
        let summary = Exporter::new(&mut out, &mut diag)
            .export(&root)
            .expect("in-memory sinks cannot fail");

        let output = String::from_utf8(out).expect("output is UTF-8");
        assert_wellformed(&output);

        // One diagnostic line per distinct fragment, none without failures.
        let diag = String::from_utf8(diag).expect("diagnostics are UTF-8");
        prop_assert_eq!(diag.lines().count(), summary.fragments.len());
        prop_assert_eq!(summary.is_partial(), summary.omissions > 0);
        prop_assert!(summary.fragments.len() as u64 <= summary.omissions);
    }

    #[test]
    fn exports_are_deterministic(root in arb_node()) {
        let mut first = Vec::new();
        let mut second = Vec::new();
        Exporter::new(&mut first, Vec::new()).export(&root).unwrap();
        Exporter::new(&mut second, Vec::new()).export(&root).unwrap();
        prop_assert_eq!(first, second);
    }
}
