//! Sequence operators, set algebra and filters, end to end.

use tangle_tests::prelude::*;

mod sequence {
    use super::*;

    pub fn scenario() -> Scenario {
        Scenario::new("sequence")
            .query("limit", "(limit 3 (6 5 4 3 2 1))")
            .query("limit_offset", "(limit 3 2 (6 5 4 3 2 1))")
            .query("limit_past_end", "(limit 4 5 (6 5 4 3 2 1))")
            .query("reverse", "(reverse (6 5 4 3 2 1))")
            .query("count", "(count (6 5 4 3 2 1))")
            .query("count_empty", "(count (filter (< :id 0) (6 5 4)))")
            .query("literal", "(literal 3 2 1)")
            .query("quoted", "'(3 2 1)")
            .step("limit", |a| a.ids([6, 5, 4]))
            .step("limit_offset", |a| a.ids([4, 3, 2]))
            .step("limit_past_end", |a| a.ids([1]))
            .step("reverse", |a| a.ids([1, 2, 3, 4, 5, 6]))
            .step("count", |a| a.value("count", 6))
            .step("count_empty", |a| a.value("count", 0))
            .step("literal", |a| a.ids([3, 2, 1]))
            .step("quoted", |a| a.ids([3, 2, 1]))
    }

    #[test]
    fn test_sequence_operators() {
        scenario().run().unwrap();
    }
}

mod sets {
    use super::*;

    pub fn scenario() -> Scenario {
        Scenario::new("sets")
            .query("and", "(and (6 5 4 3 2 1) (6 3 1))")
            .query("and_three", "(and (6 5 4 3 2 1) (6 3 1) (5 3))")
            .query("or", "(or (6 5 4 3 2 1) (10 6 3 1))")
            .query("index_or", "(index_or (6 4 2) (5 3 1))")
            .query("difference", "(difference (6 5 4 3 2 1) (6 3 1))")
            .query("difference_dedups", "(difference (6 5 5 4 4) (6))")
            .step("and", |a| a.ids([6, 3, 1]))
            .step("and_three", |a| a.ids([3]))
            .step("or", |a| a.ids([10, 6, 5, 4, 3, 2, 1]))
            .step("index_or", |a| a.ids([6, 5, 4, 3, 2, 1]))
            .step("difference", |a| a.id_set([2, 4, 5]))
            .step("difference_dedups", |a| a.id_set([5, 4]))
    }

    #[test]
    fn test_set_operators() {
        scenario().run().unwrap();
    }
}

mod filters {
    use super::*;

    pub fn scenario() -> Scenario {
        Scenario::new("filters")
            .query("less_than", "(filter (< :id 3) (6 5 4 3 2 1))")
            .query("inset", "(filter (inset :id (3 1)) (6 5 4 3 2 1))")
            .query("range", "(filter (range :id (5 2)) (6 5 4 3 2 1))")
            .query("not_equal", "(filter (!= :id 4) (6 5 4))")
            .query(
                "tuple",
                r#"(filter (>= (age rank) (20 2))
                     (json_literal "[{\":id\": 1, \"age\": 20, \"rank\": 1},
                                     {\":id\": 2, \"age\": 20, \"rank\": 3},
                                     {\":id\": 3, \"age\": 25, \"rank\": 0}]"))"#,
            )
            .query(
                "missing_field",
                r#"(filter (!= age 20)
                     (json_literal "[{\":id\": 1, \"age\": 20}, {\":id\": 2}, {\":id\": 3, \"age\": 9}]"))"#,
            )
            .query(
                "prefix",
                r#"(filter (prefix name "id3") (obj 3 30 4))"#,
            )
            .query(
                "contains",
                r#"(filter (contains name "4") (obj 3 4 24))"#,
            )
            .step("less_than", |a| a.ids([2, 1]))
            .step("inset", |a| a.ids([3, 1]))
            .step("range", |a| a.ids([4, 3, 2]))
            .step("not_equal", |a| a.ids([6, 5]))
            .step("tuple", |a| a.ids([2, 3]))
            .step("missing_field", |a| a.ids([3]))
            .step("prefix", |a| a.ids([3, 30]))
            .step("contains", |a| a.ids([4, 24]))
    }

    #[test]
    fn test_filter_predicates() {
        scenario().run().unwrap();
    }
}

mod reshaping {
    use super::*;

    const PEOPLE: &str = r#"(json_literal "[{\":id\": 1, \"age\": 20, \"name\": \"ada\"},
                                             {\":id\": 2, \"age\": 30, \"name\": \"bob\"},
                                             {\":id\": 3, \"age\": 20, \"name\": \"cy\"}]")"#;

    pub fn scenario() -> Scenario {
        Scenario::new("reshaping")
            .query("orderby_default", format!("(orderby age {})", PEOPLE))
            .query("orderby_asc", format!("(orderby ((age asc) (name desc)) {})", PEOPLE))
            .query("project", format!("(project (name) {})", PEOPLE))
            .query("let", format!("(let ((years age)) (limit 1 {}))", PEOPLE))
            .query("groupby", format!("(groupby age (orderby age {}))", PEOPLE))
            .query("nest", "(nest people (3 2 1))")
            .step("orderby_default", |a| a.ids([2, 1, 3]))
            .step("orderby_asc", |a| a.ids([3, 1, 2]))
            .step("project", |a| a.rows(3).column("name", ["ada", "bob", "cy"]))
            .step("let", |a| {
                a.returns(vec![Value::Record(
                    item! { ":id" => 1, "age" => 20, "name" => "ada", "years" => 20 },
                )])
            })
            .step("groupby", |a| {
                a.ids([2, 1, 3]).tree(Value::Record(item! {
                    "_" => vec![
                        Value::Record(item! {
                            "age" => 30,
                            ":group" => vec![Value::Record(item! { ":id" => 2, "age" => 30, "name" => "bob" })],
                        }),
                        Value::Record(item! {
                            "age" => 20,
                            ":group" => vec![
                                Value::Record(item! { ":id" => 1, "age" => 20, "name" => "ada" }),
                                Value::Record(item! { ":id" => 3, "age" => 20, "name" => "cy" }),
                            ],
                        }),
                    ],
                }))
            })
            .step("nest", |a| {
                a.ids([3, 2, 1]).tree(Value::Record(item! {
                    "people" => Value::Record(item! {
                        "_" => vec![id_row(3), id_row(2), id_row(1)],
                    }),
                }))
            })
    }

    #[test]
    fn test_reshaping_operators() {
        scenario().run().unwrap();
    }
}

mod merging {
    use super::*;

    pub fn scenario() -> Scenario {
        Scenario::new("merging")
            .query(
                "records",
                r#"(merge (json_literal "{\"a\": [1], \"b\": [2]}")
                          (json_literal "{\"a\": [3, 4], \"b\": [5, 6]}"))"#,
            )
            .query(
                "counts",
                "(merge (count (3 2 1)) (count (5 4)))",
            )
            .query(
                "conflict",
                r#"(merge (json_literal "{\"a\": \"x\"}") (json_literal "{\"a\": 1}"))"#,
            )
            .step("records", |a| {
                a.returns(vec![Value::Record(item! {
                    "a" => vec![1, 3, 4],
                    "b" => vec![2, 5, 6],
                })])
            })
            .step("counts", |a| a.value("count", 5))
            .step("conflict", |a| a.error_matches("(?i)merge"))
    }

    #[test]
    fn test_merge_combinators() {
        scenario().run().unwrap();
    }
}

mod existence {
    use super::*;

    pub fn scenario() -> Scenario {
        Scenario::new("existence")
            .query("disjoint", "(exists (and (3 2 1) (6 5 4)))")
            .query("overlap", "(exists (and (3 2 1) (5 4 3)))")
            .step("disjoint", |a| a.empty())
            .step("overlap", |a| a.rows(1).value("exists", true))
    }

    #[test]
    fn test_exists_sentinel() {
        scenario().run().unwrap();
    }
}

mod sampling {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_random_draws_a_subset() {
        Scenario::new("random")
            .query("two", "(random 2 (6 5 4 3 2 1))")
            .query("more_than_input", "(random 9 (3 2 1))")
            .step("two", |a| {
                a.rows(2).assert_fn(|out| {
                    let ids = out.ids();
                    ids[0] != ids[1] && ids.iter().all(|id| matches!(id.as_int(), Some(1..=6)))
                })
            })
            .step("more_than_input", |a| a.id_set([3, 2, 1]))
            .run()
            .unwrap();
    }

    fn pick(seed: u64) -> Vec<Value> {
        let picked = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&picked);
        Scenario::new("seeded")
            .config(ExecutorConfig::new().with_seed(seed))
            .query("pick", "(random 3 (9 8 7 6 5 4 3 2 1))")
            .step("pick", move |a| {
                a.rows(3).assert_fn(move |out| {
                    *sink.borrow_mut() = out.ids();
                    true
                })
            })
            .run()
            .unwrap();
        picked.take()
    }

    #[test]
    fn test_same_seed_same_sample() {
        assert_eq!(pick(11), pick(11));
    }
}
