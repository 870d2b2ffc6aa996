//! Association attachment, multi-hop traversal and hierarchical output.

use tangle_tests::prelude::*;

/// Formula graph with a single age so output is fully predictable.
fn steady(fanout: i64) -> MockDriver {
    MockDriver::new(MockConfig::new().with_fanout(fanout).with_ages(vec![18]))
}

fn edge(id: i64, time: i64) -> Item {
    item! { ":id" => id, ":time" => time, "name" => format!("id{}", id), "age" => 18 }
}

fn with_friends(mut item: Item, friends: Vec<Item>) -> Value {
    item.set("friend", friends.into_iter().map(Value::Record).collect::<Vec<_>>());
    Value::Record(item)
}

mod formula_graph {
    use super::*;

    pub fn scenario() -> Scenario {
        Scenario::new("formula_graph")
            .driver(steady(2))
            .operations_source(
                r#"
;;# first_hop
(assoc friend (3 2))

;;# second_hop
(->> (3 2)
     (assoc friend)
     (apply (assoc friend)))

;;# second_hop_limited
(->> (3 2)
     (assoc friend)
     (apply (assoc friend))
     (limit 1))

;;# aggregated
(aggregate (assoc friend (3 2)))

;; A mapping built by the sub-query sits above the whole traversal.
;;# second_hop_nested
(->> (3 2)
     (assoc friend)
     (apply (nest hop (assoc friend))))

;;# second_hop_nested_limited
(->> (3 2)
     (assoc friend)
     (apply (nest hop (assoc friend)))
     (limit 1))

;;# second_hop_merged
(->> (3 2)
     (assoc friend)
     (apply (merge (nest near (assoc friend))
                   (nest far (assoc friend)))))
"#,
            )
            .unwrap()
            .step("first_hop", |a| {
                a.ids([30, 31, 20, 21]).tree(Value::Record(item! {
                    "_" => vec![
                        with_friends(Item::with_id(3), vec![edge(30, 2), edge(31, 1)]),
                        with_friends(Item::with_id(2), vec![edge(20, 2), edge(21, 1)]),
                    ],
                }))
            })
            .step("second_hop", |a| {
                a.ids(SECOND_HOP).tree(Value::Record(item! { "_" => second_hop() }))
            })
            .step("second_hop_limited", |a| a.ids([300, 310, 200, 210]))
            .step("aggregated", |a| {
                a.ids([30, 31, 20, 21]).tree(Value::Record(item! {
                    "_" => vec![edge(30, 2), edge(31, 1), edge(20, 2), edge(21, 1)],
                }))
            })
            .step("second_hop_nested", |a| {
                a.ids(SECOND_HOP).tree(Value::Record(item! {
                    "hop" => Value::Record(item! { "_" => second_hop() }),
                }))
            })
            .step("second_hop_nested_limited", |a| a.ids([300, 310, 200, 210]))
            .step("second_hop_merged", |a| {
                a.ids(SECOND_HOP.into_iter().chain(SECOND_HOP))
                    .tree(Value::Record(item! {
                        "near" => Value::Record(item! { "_" => second_hop() }),
                        "far" => Value::Record(item! { "_" => second_hop() }),
                    }))
            })
    }

    const SECOND_HOP: [i64; 8] = [300, 301, 310, 311, 200, 201, 210, 211];

    /// Both origins with their first and second hops attached.
    fn second_hop() -> Vec<Value> {
        vec![
            with_friends(
                Item::with_id(3),
                vec![friends_of(edge(30, 2), 300), friends_of(edge(31, 1), 310)],
            ),
            with_friends(
                Item::with_id(2),
                vec![friends_of(edge(20, 2), 200), friends_of(edge(21, 1), 210)],
            ),
        ]
    }

    /// `origin` with its two formula edges starting at `first`.
    fn friends_of(origin: Item, first: i64) -> Item {
        let mut origin = origin;
        origin.set(
            "friend",
            vec![Value::Record(edge(first, 2)), Value::Record(edge(first + 1, 1))],
        );
        origin
    }

    #[test]
    fn test_two_level_traversal() {
        scenario().run().unwrap();
    }
}

mod per_branch {
    use super::*;

    pub fn scenario() -> Scenario {
        Scenario::new("per_branch")
            .driver(steady(3))
            .query("limit_each", "(->> (3 2 1) (assoc friend) (limit 1))")
            .query("reverse_each", "(->> (2 1) (assoc friend) reverse)")
            .query("count_each", "(->> (2 1) (assoc friend) count)")
            .query("emptied_branch", "(->> (2 1) (assoc friend) (filter (< :id 11)))")
            .query("orderby_each", "(->> (2 1) (assoc friend) (orderby ((:time asc))) (limit 1))")
            .step("limit_each", |a| a.ids([30, 20, 10]))
            .step("reverse_each", |a| a.ids([22, 21, 20, 12, 11, 10]))
            .step("count_each", |a| {
                a.tree(Value::Record(item! {
                    "_" => vec![
                        Value::Record(item! { ":id" => 2, "friend" => vec![Value::Record(item! { "count" => 3 })] }),
                        Value::Record(item! { ":id" => 1, "friend" => vec![Value::Record(item! { "count" => 3 })] }),
                    ],
                }))
            })
            .step("emptied_branch", |a| {
                a.ids([2, 10]).tree(Value::Record(item! {
                    "_" => vec![
                        Value::Record(Item::with_id(2)),
                        with_friends(Item::with_id(1), vec![edge(10, 3)]),
                    ],
                }))
            })
            .step("orderby_each", |a| a.ids([22, 12]))
    }

    #[test]
    fn test_transforms_apply_per_branch() {
        scenario().run().unwrap();
    }
}

mod pruning {
    use super::*;

    pub fn scenario() -> Scenario {
        Scenario::new("pruning")
            .query(
                "one_sibling_emptied",
                "(merge (nest a (filter (< :id 0) (1 2))) (nest b (3)))",
            )
            .query(
                "all_siblings_emptied",
                "(merge (nest a (filter (< :id 0) (1 2))) (nest b (filter (< :id 0) (3))))",
            )
            .step("one_sibling_emptied", |a| {
                a.ids([3]).tree(Value::Record(item! {
                    "b" => Value::Record(item! { "_" => vec![id_row(3)] }),
                }))
            })
            .step("all_siblings_emptied", |a| a.empty().tree(Value::Record(Item::new())))
    }

    #[test]
    fn test_materialize_pruning() {
        scenario().run().unwrap();
    }
}

mod ordered_store {
    use super::*;

    pub fn scenario() -> Scenario {
        Scenario::new("ordered_store")
            .schema(people_schema().unwrap())
            .driver(social())
            .operations_source(
                r#"
;; Edges come back newest first and stop at the end of their (source, type) pair.
;;# friends
(assoc friend (1))

;;# likes
(assoc likes (1 2))

;;# resolved
(obj (assoc friend (1)))

;;# minors
(->> (1)
     (assoc friend)
     obj
     (filter (< age 18)))

;;# friends_of_friends
(->> (1)
     (assoc friend)
     (apply (assoc friend)))

;;# resolved_friends_of_friends
(->> (1)
     (assoc friend)
     (apply (obj (assoc friend))))

;;# missing
(obj 1 9)
"#,
            )
            .unwrap()
            .step("friends", |a| {
                a.ids([2, 3, 4])
                    .column(":time", [30, 20, 10])
                    .column("data", ["school", "work", ""])
            })
            .step("likes", |a| a.ids([5, 2]))
            .step("resolved", |a| {
                a.column("name", ["bob", "cy", "dee"]).column(":time", [30, 20, 10])
            })
            .step("minors", |a| a.ids([2, 4]).column("age", [17, 16]))
            .step("friends_of_friends", |a| a.ids([1, 4, 4, 4]))
            .step("resolved_friends_of_friends", |a| {
                a.ids([1, 4, 4, 4]).column("name", ["ada", "dee", "dee"])
            })
            .step("missing", |a| a.error("Object not found: 9"))
    }

    #[test]
    fn test_traversal_over_ordered_store() {
        scenario().run().unwrap();
    }
}
