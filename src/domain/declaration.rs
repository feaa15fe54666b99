// Declaration and call-site structures for calltrace.
// A declaration is a function-like unit of code; call sites are the call
// expressions found in its body.

use std::path::PathBuf;

/// Stable identity of a function-like declaration in the resolver's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeclId(pub usize);

/// Stable identity of a source file in the resolver's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UnitId(pub usize);

/// A source file known to the resolver.
#[derive(Debug, Clone)]
pub struct SourceUnit {
    pub id: UnitId,
    pub path: PathBuf,
    /// True when the file lives outside the user's codebase (a dependency).
    pub is_foreign: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclKind {
    Function,
    Method,
}

/// A free function or class method.
#[derive(Debug, Clone)]
pub struct Declaration {
    pub id: DeclId,
    /// Member name; `None` for anonymous default-exported functions.
    pub name: Option<String>,
    /// Owning class, if any.
    pub container: Option<String>,
    pub kind: DeclKind,
    pub unit: UnitId,
    /// 1-based line of the declaration's name.
    pub line: usize,
    pub call_sites: Vec<CallSite>,
}

impl Declaration {
    /// `Container.member`, `member`, or `None` when the declaration is unnamed.
    pub fn display_name(&self) -> Option<String> {
        let name = self.name.as_deref()?;
        Some(match &self.container {
            Some(container) => format!("{}.{}", container, name),
            None => name.to_string(),
        })
    }
}

/// A call expression inside a declaration's body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallSite {
    pub callee: Callee,
    pub line: usize,
}

/// Shape of the expression being called.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Callee {
    /// `foo()`
    Name(String),
    /// `receiver.property()`
    Member { receiver: Receiver, property: String },
    /// Computed access, call of a call result, and anything else.
    Other,
}

impl Callee {
    /// The identifier a resolver should look up, or `None` when the call
    /// cannot be followed.
    pub fn callable_name(&self) -> Option<&str> {
        match self {
            Callee::Name(name) => Some(name),
            Callee::Member { property, .. } => Some(property),
            Callee::Other => None,
        }
    }
}

/// Object side of a member call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Receiver {
    This,
    Super,
    /// `x.m()`
    Ident(String),
    /// `this.x.m()`
    ThisField(String),
    /// Any other object expression.
    Expr,
}

/// Kinds of non-callable symbols a call site can resolve to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Class,
    Interface,
    Enum,
    TypeAlias,
    Variable,
    Namespace,
}

/// One definition a call-site identifier resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Definition {
    Callable(DeclId),
    Other(SymbolKind),
}
