//! The nested literal structure produced by the reader.

use std::fmt;

/// A read expression: a list, a bareword symbol, a string or number
/// literal, or an apostrophe-quoted form.
#[derive(Debug, Clone, PartialEq)]
pub enum Sexp {
    List(Vec<Sexp>),
    Symbol(String),
    Str(String),
    Int(i64),
    Float(f64),
    Quote(Box<Sexp>),
}

impl Sexp {
    pub fn symbol(name: impl Into<String>) -> Self {
        Sexp::Symbol(name.into())
    }

    pub fn list(items: impl IntoIterator<Item = Sexp>) -> Self {
        Sexp::List(items.into_iter().collect())
    }

    pub fn as_symbol(&self) -> Option<&str> {
        match self {
            Sexp::Symbol(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Sexp]> {
        match self {
            Sexp::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Sexp::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Symbol at the head of a non-empty list.
    pub fn head(&self) -> Option<&str> {
        self.as_list()?.first()?.as_symbol()
    }

    /// Everything after the head of a list.
    pub fn args(&self) -> &[Sexp] {
        match self {
            Sexp::List(items) if !items.is_empty() => &items[1..],
            _ => &[],
        }
    }

    pub fn is_atom(&self) -> bool {
        !matches!(self, Sexp::List(_))
    }

    /// Symbol or string text, for positions where either spelling is accepted.
    pub fn as_name(&self) -> Option<&str> {
        match self {
            Sexp::Symbol(s) | Sexp::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Sexp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sexp::List(items) => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, ")")
            }
            Sexp::Symbol(s) => write!(f, "{}", s),
            Sexp::Str(s) => write!(f, "\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\"")),
            Sexp::Int(i) => write!(f, "{}", i),
            Sexp::Float(fl) => write!(f, "{:?}", fl),
            Sexp::Quote(inner) => write!(f, "'{}", inner),
        }
    }
}

impl From<&str> for Sexp {
    fn from(s: &str) -> Self {
        Sexp::Symbol(s.to_string())
    }
}

impl From<i64> for Sexp {
    fn from(i: i64) -> Self {
        Sexp::Int(i)
    }
}
