// A bound, invocable daemon command

use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use crate::client::Dispatcher;
use crate::errors::Result;
use crate::tree::Segment;

/// A leaf of the command tree bound to its namespace path
///
/// Commands are cheap to clone; namespaces cache one per name and hand out
/// clones carrying the arguments for a particular call.
#[derive(Clone)]
pub struct Command {
    name: String,
    namespace: Vec<Segment>,
    arguments: Vec<Value>,
    dispatcher: Arc<Dispatcher>,
}

impl Command {
    pub(crate) fn new(name: impl Into<String>, namespace: Vec<Segment>, dispatcher: Arc<Dispatcher>) -> Self {
        Self {
            name: name.into(),
            namespace,
            arguments: Vec::new(),
            dispatcher,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn namespace(&self) -> &[Segment] {
        &self.namespace
    }

    /// Fully-qualified dotted method name
    pub fn full_name(&self) -> String {
        self.namespace
            .iter()
            .map(Segment::to_string)
            .chain(std::iter::once(self.name.clone()))
            .collect::<Vec<_>>()
            .join(".")
    }

    pub fn arguments(&self) -> &[Value] {
        &self.arguments
    }

    /// Set the call arguments, see [`normalize_arguments`]
    pub fn with_arguments(mut self, arguments: Vec<Value>) -> Self {
        self.arguments = normalize_arguments(arguments);
        self
    }

    pub async fn execute(&self) -> Result<Value> {
        self.dispatcher.execute(self).await
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("method", &self.full_name())
            .field("arguments", &self.arguments)
            .finish()
    }
}

/// Collapse a lone array argument into the argument list itself
///
/// `[a, b, c]` and `[[a, b, c]]` both become `params = [a, b, c]`; a single
/// scalar stays wrapped, so `["x"]` is sent as `["x"]`.
pub fn normalize_arguments(mut arguments: Vec<Value>) -> Vec<Value> {
    if arguments.len() == 1 && arguments[0].is_array() {
        if let Some(Value::Array(inner)) = arguments.pop() {
            return inner;
        }
    }
    arguments
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_single_list_is_not_double_wrapped() {
        assert_eq!(
            normalize_arguments(vec![json!([1, 2, 3])]),
            vec![json!(1), json!(2), json!(3)]
        );
    }

    #[test]
    fn test_variadic_arguments_pass_through() {
        assert_eq!(
            normalize_arguments(vec![json!(1), json!(2), json!(3)]),
            vec![json!(1), json!(2), json!(3)]
        );
    }

    #[test]
    fn test_single_scalar_stays_wrapped() {
        assert_eq!(
            normalize_arguments(vec![json!("magnet:?xt=urn:btih:abc")]),
            vec![json!("magnet:?xt=urn:btih:abc")]
        );
    }

    #[test]
    fn test_only_the_outer_list_is_unwrapped() {
        assert_eq!(
            normalize_arguments(vec![json!([[1, 2]])]),
            vec![json!([1, 2])]
        );
        assert_eq!(
            normalize_arguments(vec![json!([1]), json!([2])]),
            vec![json!([1]), json!([2])]
        );
        assert!(normalize_arguments(Vec::new()).is_empty());
    }
}
