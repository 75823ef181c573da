// klam-core - Property tests for values and the calling convention
// Copyright (c) 2025 Tom Waddington. MIT licensed.

mod common;

use common::*;
use klam_reader::{equate, intern, name_of};
use proptest::prelude::*;

fn small_value() -> impl Strategy<Value = KlamVal> {
    prop_oneof![
        (-1000i32..1000).prop_map(|n| KlamVal::Number(f64::from(n))),
        "[a-z]{1,8}".prop_map(|s| KlamVal::string(&s)),
        "[a-z][a-z0-9-]{0,8}".prop_map(|s| KlamVal::symbol(&s)),
        Just(KlamVal::Empty),
    ]
}

proptest! {
    #[test]
    fn interning_is_identity(name in "[a-z*][a-z0-9*?-]{0,12}") {
        let a = intern(&name);
        let b = intern(&name);
        prop_assert_eq!(&a, &b);
        prop_assert_eq!(name_of(&a), name.as_str());
    }

    #[test]
    fn equate_is_reflexive(items in prop::collection::vec(small_value(), 0..6)) {
        let list = KlamVal::list(items.clone());
        let copy = KlamVal::list(items);
        prop_assert!(equate(&list, &list));
        prop_assert!(equate(&list, &copy));
    }

    #[test]
    fn equate_is_symmetric(a in small_value(), b in small_value()) {
        prop_assert_eq!(equate(&a, &b), equate(&b, &a));
    }

    #[test]
    fn currying_split_does_not_matter(a in -100i32..100, b in -100i32..100, c in -100i32..100) {
        let rt = new_runtime();
        eval_all("(defun f3 (A B C) (- (* A B) C))", &rt).unwrap();
        let expected = f64::from(a * b - c);
        for source in [
            format!("(f3 {} {} {})", a, b, c),
            format!("((f3 {}) {} {})", a, b, c),
            format!("((f3 {} {}) {})", a, b, c),
            format!("(((f3 {}) {}) {})", a, b, c),
        ] {
            prop_assert_eq!(eval_all(&source, &rt).unwrap(), KlamVal::Number(expected));
        }
    }
}
