//! Keyword descriptors: declared specs and registered keywords.

use std::fmt;
use std::sync::Arc;

use rfremote_core::{friendly_name, KeywordError, ReturnValue, Value};

use crate::traits::KeywordContext;

/// Invocation entry point of a declared keyword.
///
/// Arguments arrive already coerced to the declared parameter kinds; an
/// enum parameter arrives as a string holding the canonical member name.
pub type KeywordFn =
    Arc<dyn Fn(&[Value], &KeywordContext) -> Result<ReturnValue, KeywordError> + Send + Sync>;

/// Declared type of a keyword parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamKind {
    /// UTF-8 string.
    Str,
    /// Boolean.
    Bool,
    /// 32-bit signed integer.
    Int32,
    /// 64-bit signed integer.
    Int64,
    /// Double-precision float.
    Double,
    /// Enumeration over the given member names, in declaration order.
    Enum(Vec<String>),
    /// A host-side type the remote protocol cannot carry. Keywords with an
    /// opaque parameter are skipped at load time.
    Opaque(String),
}

impl ParamKind {
    /// Short name used in coercion errors and the introspection page.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            ParamKind::Str => "string",
            ParamKind::Bool => "boolean",
            ParamKind::Int32 => "int32",
            ParamKind::Int64 => "int64",
            ParamKind::Double => "double",
            ParamKind::Enum(_) => "enum",
            ParamKind::Opaque(name) => name,
        }
    }
}

/// Declared return type of a keyword.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ReturnKind {
    /// No return value.
    #[default]
    Void,
    /// UTF-8 string.
    Str,
    /// Boolean.
    Bool,
    /// 32-bit signed integer.
    Int32,
    /// 64-bit signed integer.
    Int64,
    /// Double-precision float.
    Double,
    /// List of strings.
    StrList,
    /// Map of string keys to 32-bit integers.
    IntMap,
    /// A host-side type the remote protocol cannot carry. Keywords
    /// returning one are skipped at load time.
    Opaque(String),
}

/// One declared parameter.
#[derive(Debug, Clone)]
pub struct ParamSpec {
    /// Parameter name as shown to clients.
    pub name: String,
    /// Declared type.
    pub kind: ParamKind,
    /// Documentation, possibly empty.
    pub doc: String,
    /// Default value; present iff the parameter is optional.
    pub default: Option<Value>,
}

/// One operation declared by a library.
///
/// Built fluently and consumed by the registry at load time:
///
/// ```text
/// KeywordSpec::new("AddTwoNumbers", |args, _ctx| { ... })
///     .doc("Adds two 32-bit integers.")
///     .param("a", ParamKind::Int32)
///     .param("b", ParamKind::Int32)
///     .returns(ReturnKind::Int32)
/// ```
#[derive(Clone)]
pub struct KeywordSpec {
    pub(crate) ident: String,
    pub(crate) doc: String,
    pub(crate) params: Vec<ParamSpec>,
    pub(crate) returns: ReturnKind,
    pub(crate) deprecated: bool,
    pub(crate) hidden: bool,
    pub(crate) handler: KeywordFn,
}

impl KeywordSpec {
    /// Starts a spec for the operation `ident` backed by `handler`.
    pub fn new<F>(ident: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&[Value], &KeywordContext) -> Result<ReturnValue, KeywordError>
            + Send
            + Sync
            + 'static,
    {
        Self {
            ident: ident.into(),
            doc: String::new(),
            params: Vec::new(),
            returns: ReturnKind::Void,
            deprecated: false,
            hidden: false,
            handler: Arc::new(handler),
        }
    }

    /// Sets the keyword documentation.
    #[must_use]
    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = doc.into();
        self
    }

    /// Appends a required parameter.
    #[must_use]
    pub fn param(mut self, name: impl Into<String>, kind: ParamKind) -> Self {
        self.params.push(ParamSpec {
            name: name.into(),
            kind,
            doc: String::new(),
            default: None,
        });
        self
    }

    /// Appends an optional parameter with its default value.
    #[must_use]
    pub fn optional_param(
        mut self,
        name: impl Into<String>,
        kind: ParamKind,
        default: Value,
    ) -> Self {
        self.params.push(ParamSpec {
            name: name.into(),
            kind,
            doc: String::new(),
            default: Some(default),
        });
        self
    }

    /// Sets documentation for a previously declared parameter.
    #[must_use]
    pub fn arg_doc(mut self, name: &str, doc: impl Into<String>) -> Self {
        if let Some(param) = self.params.iter_mut().find(|p| p.name == name) {
            param.doc = doc.into();
        }
        self
    }

    /// Sets the return kind.
    #[must_use]
    pub fn returns(mut self, returns: ReturnKind) -> Self {
        self.returns = returns;
        self
    }

    /// Marks the operation deprecated; it will not be exposed remotely.
    #[must_use]
    pub fn deprecated(mut self) -> Self {
        self.deprecated = true;
        self
    }

    /// Marks the operation local-only; it will not be exposed remotely.
    #[must_use]
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// The operation's declared identifier.
    #[must_use]
    pub fn ident(&self) -> &str {
        &self.ident
    }
}

impl fmt::Debug for KeywordSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeywordSpec")
            .field("ident", &self.ident)
            .field("params", &self.params)
            .field("returns", &self.returns)
            .field("deprecated", &self.deprecated)
            .field("hidden", &self.hidden)
            .finish_non_exhaustive()
    }
}

/// A keyword admitted to the remote surface.
pub struct Keyword {
    ident: String,
    name: String,
    doc: String,
    params: Vec<ParamSpec>,
    required: usize,
    handler: KeywordFn,
}

impl Keyword {
    /// Builds the registered form of an admitted spec. Parameter ordering
    /// must already be validated: required parameters lead.
    pub(crate) fn from_spec(spec: KeywordSpec) -> Self {
        let required = spec.params.iter().filter(|p| p.default.is_none()).count();
        Self {
            name: friendly_name(&spec.ident),
            ident: spec.ident,
            doc: spec.doc,
            params: spec.params,
            required,
            handler: spec.handler,
        }
    }

    /// The identifier the library declared.
    #[must_use]
    pub fn ident(&self) -> &str {
        &self.ident
    }

    /// The friendly name clients address this keyword by.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Keyword documentation, possibly empty.
    #[must_use]
    pub fn doc(&self) -> &str {
        &self.doc
    }

    /// Declared parameters, in order.
    #[must_use]
    pub fn params(&self) -> &[ParamSpec] {
        &self.params
    }

    /// Parameter names, in order.
    #[must_use]
    pub fn argument_names(&self) -> Vec<&str> {
        self.params.iter().map(|p| p.name.as_str()).collect()
    }

    /// Number of arguments a caller must supply.
    #[must_use]
    pub fn required_args(&self) -> usize {
        self.required
    }

    /// Number of arguments a caller may supply.
    #[must_use]
    pub fn total_args(&self) -> usize {
        self.params.len()
    }

    pub(crate) fn handler(&self) -> &KeywordFn {
        &self.handler
    }
}

impl fmt::Debug for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Keyword")
            .field("ident", &self.ident)
            .field("name", &self.name)
            .field("params", &self.params)
            .field("required", &self.required)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop() -> KeywordSpec {
        KeywordSpec::new("DoNothing", |_args, _ctx| Ok(ReturnValue::Void))
    }

    #[test]
    fn builder_accumulates_params_in_order() {
        let spec = noop()
            .param("first", ParamKind::Str)
            .optional_param("second", ParamKind::Int32, Value::Int32(3))
            .arg_doc("first", "leading argument");
        assert_eq!(spec.params.len(), 2);
        assert_eq!(spec.params[0].doc, "leading argument");
        assert_eq!(spec.params[1].default, Some(Value::Int32(3)));
    }

    #[test]
    fn arg_doc_ignores_unknown_names() {
        let spec = noop().param("a", ParamKind::Str).arg_doc("b", "nope");
        assert_eq!(spec.params[0].doc, "");
    }

    #[test]
    fn registered_keyword_derives_friendly_name_and_counts() {
        let spec = KeywordSpec::new("HTTPGetStatus", |_args, _ctx| Ok(ReturnValue::Void))
            .param("url", ParamKind::Str)
            .optional_param("retries", ParamKind::Int32, Value::Int32(0));
        let keyword = Keyword::from_spec(spec);
        assert_eq!(keyword.name(), "http_get_status");
        assert_eq!(keyword.ident(), "HTTPGetStatus");
        assert_eq!(keyword.required_args(), 1);
        assert_eq!(keyword.total_args(), 2);
        assert_eq!(keyword.argument_names(), vec!["url", "retries"]);
    }

    #[test]
    fn kind_names_for_messages() {
        assert_eq!(ParamKind::Int32.name(), "int32");
        assert_eq!(ParamKind::Enum(vec!["A".into()]).name(), "enum");
        assert_eq!(ParamKind::Opaque("TcpStream".into()).name(), "TcpStream");
    }
}
