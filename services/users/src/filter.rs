//! Filter DSL: (field, operator, value) triples parsed against a
//! role-scoped allow-list into store-executable predicates.

use crate::domain::types::User;
use crate::error::UsersServiceError;

// ── Fields ───────────────────────────────────────────────────────────────────

/// User attributes a predicate can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UserField {
    Email,
    Username,
    Active,
    Deleted,
    Purged,
    IsAdmin,
    DiskUsage,
    CreateTime,
}

/// Type class of a field, deciding which operators and value shapes apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldClass {
    Text,
    Bool,
    Number,
}

impl UserField {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Username => "username",
            Self::Active => "active",
            Self::Deleted => "deleted",
            Self::Purged => "purged",
            Self::IsAdmin => "is_admin",
            Self::DiskUsage => "disk_usage",
            Self::CreateTime => "create_time",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "email" => Some(Self::Email),
            "username" => Some(Self::Username),
            "active" => Some(Self::Active),
            "deleted" => Some(Self::Deleted),
            "purged" => Some(Self::Purged),
            "is_admin" => Some(Self::IsAdmin),
            "disk_usage" => Some(Self::DiskUsage),
            "create_time" => Some(Self::CreateTime),
            _ => None,
        }
    }

    fn class(self) -> FieldClass {
        match self {
            Self::Email | Self::Username => FieldClass::Text,
            Self::Active | Self::Deleted | Self::Purged | Self::IsAdmin => FieldClass::Bool,
            Self::DiskUsage | Self::CreateTime => FieldClass::Number,
        }
    }
}

// ── Operators and values ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOperator {
    Eq,
    Contains,
    Like,
    Le,
    Ge,
}

impl FilterOperator {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Contains => "contains",
            Self::Like => "like",
            Self::Le => "le",
            Self::Ge => "ge",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "eq" => Some(Self::Eq),
            "contains" => Some(Self::Contains),
            "like" => Some(Self::Like),
            "le" => Some(Self::Le),
            "ge" => Some(Self::Ge),
            _ => None,
        }
    }
}

/// Literal operand of a filter triple.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Text(String),
    Bool(bool),
    Number(f64),
}

impl FilterValue {
    fn class(&self) -> FieldClass {
        match self {
            Self::Text(_) => FieldClass::Text,
            Self::Bool(_) => FieldClass::Bool,
            Self::Number(_) => FieldClass::Number,
        }
    }
}

impl From<&str> for FilterValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_owned())
    }
}

impl From<String> for FilterValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<bool> for FilterValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<f64> for FilterValue {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

// ── Predicate ────────────────────────────────────────────────────────────────

/// A store-executable filter condition. Opaque to callers; only meaningful
/// when handed back to a store's query executor.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    field: UserField,
    operator: FilterOperator,
    value: FilterValue,
}

impl Predicate {
    /// Construct a predicate directly, bypassing the allow-list. For core
    /// internals (e.g. the admins query); callers go through the parser.
    pub(crate) fn new(field: UserField, operator: FilterOperator, value: FilterValue) -> Self {
        Self {
            field,
            operator,
            value,
        }
    }

    /// Evaluate against a user. Used by the in-memory store executor.
    pub fn matches(&self, user: &User) -> bool {
        match self.field {
            UserField::Email => self.matches_text(&user.email),
            UserField::Username => self.matches_text(&user.username),
            UserField::Active => self.matches_bool(user.active),
            UserField::Deleted => self.matches_bool(user.deleted),
            UserField::Purged => self.matches_bool(user.purged),
            UserField::IsAdmin => self.matches_bool(user.is_admin),
            UserField::DiskUsage => self.matches_number(user.disk_usage as f64),
            UserField::CreateTime => self.matches_number(user.create_time.timestamp() as f64),
        }
    }

    fn matches_text(&self, actual: &str) -> bool {
        let FilterValue::Text(ref wanted) = self.value else {
            return false;
        };
        match self.operator {
            FilterOperator::Eq => actual == wanted,
            FilterOperator::Contains => actual.contains(wanted.as_str()),
            FilterOperator::Like => like_match(wanted, actual),
            _ => false,
        }
    }

    fn matches_bool(&self, actual: bool) -> bool {
        matches!(self.value, FilterValue::Bool(wanted)
            if self.operator == FilterOperator::Eq && actual == wanted)
    }

    fn matches_number(&self, actual: f64) -> bool {
        let FilterValue::Number(wanted) = self.value else {
            return false;
        };
        match self.operator {
            FilterOperator::Le => actual <= wanted,
            FilterOperator::Ge => actual >= wanted,
            FilterOperator::Eq => actual == wanted,
            _ => false,
        }
    }
}

/// SQL `LIKE` matching: `%` matches any run, `_` matches one character.
/// Case-sensitive, consistent with the store's text semantics.
pub fn like_match(pattern: &str, text: &str) -> bool {
    let pat: Vec<char> = pattern.chars().collect();
    let txt: Vec<char> = text.chars().collect();

    // Iterative matcher with backtracking to the last `%`.
    let (mut p, mut t) = (0usize, 0usize);
    let mut star: Option<(usize, usize)> = None;
    while t < txt.len() {
        if p < pat.len() && (pat[p] == '_' || pat[p] == txt[t]) {
            p += 1;
            t += 1;
        } else if p < pat.len() && pat[p] == '%' {
            star = Some((p, t));
            p += 1;
        } else if let Some((sp, st)) = star {
            p = sp + 1;
            t = st + 1;
            star = Some((sp, st + 1));
        } else {
            return false;
        }
    }
    while p < pat.len() && pat[p] == '%' {
        p += 1;
    }
    p == pat.len()
}

// ── Role-scoped parsers ──────────────────────────────────────────────────────

type AllowList = &'static [(UserField, &'static [FilterOperator])];

const TEXT_OPS: &[FilterOperator] = &[
    FilterOperator::Eq,
    FilterOperator::Contains,
    FilterOperator::Like,
];
const BOOL_OPS: &[FilterOperator] = &[FilterOperator::Eq];
const RANGE_OPS: &[FilterOperator] = &[FilterOperator::Le, FilterOperator::Ge];

/// Fields an ordinary registered caller may filter on.
const REGISTERED_FILTERS: AllowList = &[(UserField::Email, TEXT_OPS)];

/// Fields an administrator may filter on.
const ADMIN_FILTERS: AllowList = &[
    (UserField::Email, TEXT_OPS),
    (UserField::Username, TEXT_OPS),
    (UserField::Active, BOOL_OPS),
    (UserField::Deleted, BOOL_OPS),
    (UserField::Purged, BOOL_OPS),
    (UserField::DiskUsage, RANGE_OPS),
    (UserField::CreateTime, RANGE_OPS),
];

/// Parses filter triples against a static, role-scoped allow-list. Pure
/// translation, no I/O; execution is deferred to the store.
#[derive(Debug, Clone, Copy)]
pub struct UserFilterParser {
    allowed: AllowList,
}

impl UserFilterParser {
    /// Parser scoped to an ordinary registered user.
    pub fn registered() -> Self {
        Self {
            allowed: REGISTERED_FILTERS,
        }
    }

    /// Parser scoped to an administrator.
    pub fn admin() -> Self {
        Self {
            allowed: ADMIN_FILTERS,
        }
    }

    /// Translate a `(field, operator, value)` triple into a [`Predicate`].
    ///
    /// Fails with [`UsersServiceError::FilterParsing`] when the field is not
    /// allow-listed for this scope, the operator is not permitted for the
    /// field, or the value's type does not match the field's type class.
    pub fn parse_filter(
        &self,
        field: &str,
        operator: &str,
        value: impl Into<FilterValue>,
    ) -> Result<Predicate, UsersServiceError> {
        let value = value.into();
        let reject = || UsersServiceError::FilterParsing {
            field: field.to_owned(),
            operator: operator.to_owned(),
        };

        let parsed_field = UserField::parse(field).ok_or_else(reject)?;
        let parsed_op = FilterOperator::parse(operator).ok_or_else(reject)?;

        let (_, permitted) = self
            .allowed
            .iter()
            .find(|(f, _)| *f == parsed_field)
            .ok_or_else(reject)?;
        if !permitted.contains(&parsed_op) {
            return Err(reject());
        }
        if value.class() != parsed_field.class() {
            return Err(reject());
        }

        Ok(Predicate::new(parsed_field, parsed_op, value))
    }
}
