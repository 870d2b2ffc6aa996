//! Reading, expansion and validation, end to end.

use pretty_assertions::assert_eq;
use tangle_parser::{parse, read};
use tangle_tests::prelude::*;

mod expansion {
    use super::*;
    use pretty_assertions::assert_eq;

    fn expands_to(pipeline: &str, nested: &str) {
        assert_eq!(parse(pipeline).unwrap(), read(nested).unwrap());
    }

    #[test]
    fn test_pipeline_forms() {
        expands_to("(->> a b)", "(b a)");
        expands_to("(->> a b c)", "(c (b a))");
        expands_to("(->> (a) (b) (c))", "(c (b (a)))");
        expands_to("(->> (a) (b c) (d))", "(d (b c (a)))");
    }

    pub fn scenario() -> Scenario {
        Scenario::new("pipelines")
            .operations_source(
                r#"
;; Stages run in reading order.
;;# filter_then_limit
(->> (6 5 4 3 2 1)
     (filter (< :id 5))
     (limit 2))

;;# bare_stage
(->> (6 5 4 3 2 1) (limit 3 2) reverse)

;;# nested_pipeline
(and (->> (6 5 4 3 2 1) (limit 4))
     (->> (4 3 2 1) reverse reverse))
"#,
            )
            .unwrap()
            .step("filter_then_limit", |a| a.ids([4, 3]))
            .step("bare_stage", |a| a.ids([2, 3, 4]))
            .step("nested_pipeline", |a| a.ids([4, 3]))
    }

    #[test]
    fn test_pipelines_run() {
        scenario().run().unwrap();
    }
}

mod literals {
    use super::*;

    pub fn scenario() -> Scenario {
        Scenario::new("literals")
            .query("unknown_head", "(frobnicate 1 2)")
            .query("separators", "(3, 2, 1)")
            .query("json_ids", r#"(json_literal "[3, 2, 1]")"#)
            .step("unknown_head", |a| {
                a.ids(vec![Value::from("frobnicate"), Value::Int(1), Value::Int(2)])
            })
            .step("separators", |a| a.ids([3, 2, 1]))
            .step("json_ids", |a| a.ids([3, 2, 1]))
    }

    #[test]
    fn test_literal_interpretation() {
        scenario().run().unwrap();
    }
}

mod errors {
    use super::*;

    pub fn scenario() -> Scenario {
        Scenario::new("errors")
            .schema(people_schema().unwrap())
            .query("open_paren", "(limit 3 (1 2")
            .query("open_quote", r#"(json_literal "[1, 2)"#)
            .query("arity", "(limit 1 2 3 (1 2))")
            .query("direction", "(orderby ((age sideways)) (1 2))")
            .query("predicate", "(filter (like :id 1) (1))")
            .query("operand_type", "(filter (< age old) (1))")
            .query("reserved", "(let ((:id age)) (1))")
            .query("bad_json", r#"(json_literal "{nope")"#)
            .query("join", "(join (1) (2))")
            .step("open_paren", |a| a.error_matches("^syntax error: "))
            .step("open_quote", |a| a.error_matches("^syntax error: "))
            .step("arity", |a| a.error_matches("^validation error: 'limit' expects 2..3"))
            .step("direction", |a| a.error("Unknown sort direction 'sideways'"))
            .step("predicate", |a| a.error("Unknown filter operator 'like'"))
            .step("operand_type", |a| a.error("Operand for field 'age'"))
            .step("reserved", |a| a.error("Field ':id' is reserved"))
            .step("bad_json", |a| a.error("invalid JSON"))
            .step("join", |a| a.error("Unsupported operator: join"))
    }

    #[test]
    fn test_errors_by_stage() {
        scenario().run().unwrap();
    }
}
