//! Pipeline-macro expansion.
//!
//! `(->> e1 e2 ... en)` threads `e1` through the later stages, appending the
//! running form as the last argument of each: `(->> a (b c) d)` becomes
//! `(d (b c a))`. Later stages wrap earlier ones.

use crate::Sexp;

/// The pipeline marker.
pub const PIPELINE: &str = "->>";

/// Expand every pipeline form in `form`, innermost first.
///
/// Quoted forms are left untouched.
pub fn expand(form: Sexp) -> Sexp {
    match form {
        Sexp::List(items) => {
            let items: Vec<Sexp> = items.into_iter().map(expand).collect();
            if is_pipeline(&items) {
                thread_last(items)
            } else {
                Sexp::List(items)
            }
        }
        other => other,
    }
}

fn is_pipeline(items: &[Sexp]) -> bool {
    items.len() >= 3 && items[0].as_symbol() == Some(PIPELINE)
}

fn thread_last(items: Vec<Sexp>) -> Sexp {
    let mut stages = items.into_iter().skip(1);
    let Some(mut acc) = stages.next() else {
        return Sexp::List(vec![]);
    };
    for stage in stages {
        let mut call = match stage {
            Sexp::List(call) => call,
            atom => vec![atom],
        };
        call.push(acc);
        acc = Sexp::List(call);
    }
    acc
}
