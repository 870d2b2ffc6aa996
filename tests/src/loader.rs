//! Loader for operations sources.
//!
//! An operations source holds named queries separated by step markers
//! (`;;# step_name`). Other lines starting with `;;` are comments.

use std::collections::HashMap;

use crate::error::{ExampleError, ExampleResult};

/// A parsed operations source.
#[derive(Debug, Clone, Default)]
pub struct Operations {
    /// Map of step name to query text.
    pub steps: HashMap<String, String>,
    /// Steps in order of appearance.
    pub step_order: Vec<String>,
}

impl Operations {
    /// Parse an operations source from a string.
    pub fn parse(source: &str) -> ExampleResult<Self> {
        let mut operations = Operations::default();
        let mut current: Option<(String, String)> = None;

        for line in source.lines() {
            let trimmed = line.trim();
            if let Some(suffix) = trimmed.strip_prefix(";;#") {
                if let Some((name, text)) = current.take() {
                    operations.finish(name, text);
                }
                let name = suffix.trim();
                if name.is_empty() {
                    return Err(ExampleError::operations_parse(
                        "<inline>",
                        "empty step name after ;;#",
                    ));
                }
                if operations.steps.contains_key(name) {
                    return Err(ExampleError::operations_parse(
                        "<inline>",
                        format!("duplicate step '{}'", name),
                    ));
                }
                current = Some((name.to_string(), String::new()));
            } else if trimmed.starts_with(";;") {
                continue;
            } else if let Some((_, text)) = current.as_mut() {
                text.push_str(line);
                text.push('\n');
            }
            // Lines before the first marker are ignored.
        }
        if let Some((name, text)) = current {
            operations.finish(name, text);
        }
        Ok(operations)
    }

    fn finish(&mut self, name: String, text: String) {
        let text = text.trim();
        if !text.is_empty() {
            self.steps.insert(name.clone(), text.to_string());
        }
        self.step_order.push(name);
    }

    /// Add or replace one step.
    pub fn insert(&mut self, name: impl Into<String>, text: impl Into<String>) {
        let name = name.into();
        if !self.steps.contains_key(&name) {
            self.step_order.push(name.clone());
        }
        self.steps.insert(name, text.into());
    }

    pub fn get_step(&self, name: &str) -> Option<&str> {
        self.steps.get(name).map(String::as_str)
    }

    pub fn step_names(&self) -> impl Iterator<Item = &str> {
        self.step_order.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_steps() {
        // GIVEN
        let source = r#"
;; Friends of friends.
;;# first_hop
(assoc friend (3 2 1))

;;# second_hop
(->> (3 2 1)
     (assoc friend)
     (apply (assoc friend)))
"#;

        // WHEN
        let ops = Operations::parse(source).unwrap();

        // THEN
        assert_eq!(ops.step_names().collect::<Vec<_>>(), vec!["first_hop", "second_hop"]);
        assert_eq!(ops.get_step("first_hop"), Some("(assoc friend (3 2 1))"));
        assert!(ops.get_step("second_hop").unwrap().ends_with("(apply (assoc friend)))"));
    }

    #[test]
    fn test_empty_step_name_is_rejected() {
        assert!(Operations::parse(";;#\n(1 2)").is_err());
    }

    #[test]
    fn test_duplicate_step_is_rejected() {
        assert!(Operations::parse(";;# a\n(1)\n;;# a\n(2)").is_err());
    }
}
