use oauth2::Scope as OAuth2Scope;
use std::fmt;
use std::iter::FromIterator;
use std::str::FromStr;

/// A Zoho Books API module that scopes are granted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Module {
    Contacts,
    Settings,
    Invoices,
    CustomerPayments,
    Banking,
    Accountants,
}

impl Module {
    fn as_str(self) -> &'static str {
        match self {
            Self::Contacts => "contacts",
            Self::Settings => "settings",
            Self::Invoices => "invoices",
            Self::CustomerPayments => "customerpayments",
            Self::Banking => "banking",
            Self::Accountants => "accountants",
        }
    }
}

/// Represents the operation a scope permits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Read,
    Update,
    Delete,
    All,
}

impl Operation {
    fn as_str(self) -> &'static str {
        match self {
            Self::Create => "CREATE",
            Self::Read => "READ",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
            Self::All => "ALL",
        }
    }
}

/// Predefined Zoho Books API scopes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeType {
    FullAccess,
    Module(Module, Operation),
}

impl fmt::Display for ScopeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FullAccess => write!(f, "ZohoBooks.fullaccess.all"),
            Self::Module(module, operation) => {
                write!(f, "ZohoBooks.{}.{}", module.as_str(), operation.as_str())
            }
        }
    }
}

/// Error when parsing a scope from a string
#[derive(Debug, Clone)]
pub struct ParseScopeError(String);

impl fmt::Display for ParseScopeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Invalid scope string: {}", self.0)
    }
}

impl std::error::Error for ParseScopeError {}

impl FromStr for ScopeType {
    type Err = ParseScopeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("ZohoBooks.fullaccess.all") {
            return Ok(Self::FullAccess);
        }

        let mut parts = s.split('.');
        let (Some("ZohoBooks"), Some(module), Some(operation), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(ParseScopeError(s.to_string()));
        };

        let module = match module {
            "contacts" => Module::Contacts,
            "settings" => Module::Settings,
            "invoices" => Module::Invoices,
            "customerpayments" => Module::CustomerPayments,
            "banking" => Module::Banking,
            "accountants" => Module::Accountants,
            _ => return Err(ParseScopeError(s.to_string())),
        };
        let operation = match operation.to_ascii_uppercase().as_str() {
            "CREATE" => Operation::Create,
            "READ" => Operation::Read,
            "UPDATE" => Operation::Update,
            "DELETE" => Operation::Delete,
            "ALL" => Operation::All,
            _ => return Err(ParseScopeError(s.to_string())),
        };
        Ok(Self::Module(module, operation))
    }
}

/// Represents a set of Zoho Books API scopes.
#[derive(Debug, Clone)]
pub struct Scope {
    scopes: Vec<OAuth2Scope>,
}

impl Scope {
    /// Creates a new scope collection
    #[must_use]
    pub fn new(scope_types: Vec<ScopeType>) -> Self {
        scope_types.into_iter().collect()
    }

    /// Creates a scope from a single scope type
    #[must_use]
    pub fn from_type(scope_type: ScopeType) -> Self {
        Self {
            scopes: vec![OAuth2Scope::new(scope_type.to_string())],
        }
    }

    /// Creates a scope from a raw string
    #[must_use]
    pub fn from_string(scope: String) -> Self {
        Self {
            scopes: vec![OAuth2Scope::new(scope)],
        }
    }

    /// Add a scope to the collection
    #[must_use]
    pub fn add(mut self, scope_type: ScopeType) -> Self {
        self.scopes.push(OAuth2Scope::new(scope_type.to_string()));
        self
    }

    /// Combine with another scope collection
    #[must_use]
    pub fn combine(mut self, other: Self) -> Self {
        self.scopes.extend(other.scopes);
        self
    }

    /// Get a reference to the contained OAuth2 scopes
    #[must_use]
    pub fn as_oauth2_scopes(&self) -> &[OAuth2Scope] {
        &self.scopes
    }

    /// Full access to every Books module.
    #[must_use]
    pub fn full_access() -> Self {
        Self::from_type(ScopeType::FullAccess)
    }

    /// Everything the resource adapters in this crate touch.
    #[must_use]
    pub fn common_books() -> Self {
        Self::new(vec![
            ScopeType::Module(Module::Contacts, Operation::All),
            ScopeType::Module(Module::Invoices, Operation::All),
            ScopeType::Module(Module::CustomerPayments, Operation::All),
            ScopeType::Module(Module::Banking, Operation::All),
            ScopeType::Module(Module::Settings, Operation::Read),
        ])
    }

    /// Create a scope for an operation on a module
    #[must_use]
    pub fn module(module: Module, operation: Operation) -> Self {
        Self::from_type(ScopeType::Module(module, operation))
    }
}

/// Zoho expects scopes as a comma separated list.
impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let scope_strs: Vec<&str> = self.scopes.iter().map(|s| s.as_str()).collect();
        write!(f, "{}", scope_strs.join(","))
    }
}

impl From<ScopeType> for Scope {
    fn from(scope_type: ScopeType) -> Self {
        Self::from_type(scope_type)
    }
}

impl From<Vec<ScopeType>> for Scope {
    fn from(scope_types: Vec<ScopeType>) -> Self {
        Self::new(scope_types)
    }
}

impl FromIterator<ScopeType> for Scope {
    fn from_iter<I: IntoIterator<Item = ScopeType>>(iter: I) -> Self {
        let scopes = iter
            .into_iter()
            .map(|st| OAuth2Scope::new(st.to_string()))
            .collect();
        Self { scopes }
    }
}
