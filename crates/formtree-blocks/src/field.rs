//! Leaf fields
//!
//! A [`Field`] stores its value raw, exactly as it was distributed or
//! entered, so collect/apply round trips are lossless. Typing happens only
//! in [`Field::cast_value`], which validation uses to check the value
//! against the field's [`FieldKind`] before running its rules.

use crate::listener::{self, ChangeListener};
use chrono::NaiveDate;
use formtree_node::{
    is_absent, is_reserved_name, ChangeEvent, DataNode, DataValue, Node, NodeId, NodeKind,
    RenderSignal, ValidationContext, ValidationError,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Date format accepted by [`FieldKind::Date`]
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Value type a field expects
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    /// Free text
    #[default]
    Text,
    /// Whole number (numeric strings accepted)
    Integer,
    /// Any number (numeric strings accepted)
    Number,
    /// `true` / `false` (the strings too)
    Boolean,
    /// Calendar date, `YYYY-MM-DD`
    Date,
    /// One of a fixed set of strings
    Choice(Vec<String>),
    /// Anything, unchecked
    Json,
}

impl FieldKind {
    /// Typed view of `value`, or a message describing the mismatch
    ///
    /// Absent values cast to `Null`.
    pub fn cast(&self, value: &DataValue) -> Result<DataValue, String> {
        if value.is_null() {
            return Ok(DataValue::Null);
        }
        match self {
            Self::Json => Ok(value.clone()),
            Self::Text => match value {
                DataValue::String(_) => Ok(value.clone()),
                DataValue::Number(n) => Ok(DataValue::String(n.to_string())),
                DataValue::Bool(b) => Ok(DataValue::String(b.to_string())),
                _ => Err("must be text".to_string()),
            },
            Self::Integer => match value {
                DataValue::Number(n) if n.is_i64() || n.is_u64() => Ok(value.clone()),
                DataValue::String(s) => s
                    .trim()
                    .parse::<i64>()
                    .map(DataValue::from)
                    .map_err(|_| "must be a whole number".to_string()),
                _ => Err("must be a whole number".to_string()),
            },
            Self::Number => match value {
                DataValue::Number(_) => Ok(value.clone()),
                DataValue::String(s) => s
                    .trim()
                    .parse::<f64>()
                    .ok()
                    .and_then(|f| serde_json::Number::from_f64(f).map(DataValue::Number))
                    .ok_or_else(|| "must be a number".to_string()),
                _ => Err("must be a number".to_string()),
            },
            Self::Boolean => match value {
                DataValue::Bool(_) => Ok(value.clone()),
                DataValue::String(s) => match s.trim() {
                    "true" => Ok(DataValue::Bool(true)),
                    "false" => Ok(DataValue::Bool(false)),
                    _ => Err("must be true or false".to_string()),
                },
                _ => Err("must be true or false".to_string()),
            },
            Self::Date => match value {
                DataValue::String(s) => NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
                    .map(|date| DataValue::String(date.format(DATE_FORMAT).to_string()))
                    .map_err(|_| "must be a date (YYYY-MM-DD)".to_string()),
                _ => Err("must be a date (YYYY-MM-DD)".to_string()),
            },
            Self::Choice(options) => match value {
                DataValue::String(s) if options.iter().any(|o| o == s) => Ok(value.clone()),
                _ => Err(format!("must be one of: {}", options.join(", "))),
            },
        }
    }
}

/// Custom rule body
///
/// `Ok(Some(message))` fails the rule; `Err` is an unexpected failure.
pub type RuleFn =
    Arc<dyn Fn(&DataValue, &ValidationContext) -> anyhow::Result<Option<String>> + Send + Sync>;

/// Field validation rule
#[derive(Clone)]
pub enum Rule {
    /// Value must be present
    Required,
    /// Minimum length (characters for text, entries for arrays)
    MinLength(usize),
    /// Maximum length (characters for text, entries for arrays)
    MaxLength(usize),
    /// Minimum numeric value
    Min(f64),
    /// Maximum numeric value
    Max(f64),
    /// Text must match
    Pattern(Regex),
    /// Value must equal one of these
    OneOf(Vec<DataValue>),
    /// Arbitrary check
    Custom(RuleFn),
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Required => write!(f, "Required"),
            Self::MinLength(n) => write!(f, "MinLength({n})"),
            Self::MaxLength(n) => write!(f, "MaxLength({n})"),
            Self::Min(n) => write!(f, "Min({n})"),
            Self::Max(n) => write!(f, "Max({n})"),
            Self::Pattern(re) => write!(f, "Pattern({})", re.as_str()),
            Self::OneOf(values) => write!(f, "OneOf({values:?})"),
            Self::Custom(_) => write!(f, "Custom(..)"),
        }
    }
}

impl Rule {
    /// Create a custom rule
    pub fn custom<F>(check: F) -> Self
    where
        F: Fn(&DataValue, &ValidationContext) -> anyhow::Result<Option<String>>
            + Send
            + Sync
            + 'static,
    {
        Self::Custom(Arc::new(check))
    }

    /// Check a present, successfully cast value
    ///
    /// Returns the failure message, if any.
    fn check(&self, typed: &DataValue, ctx: &ValidationContext) -> anyhow::Result<Option<String>> {
        let failure = match self {
            Self::Required => None,
            Self::MinLength(min) => {
                length(typed).filter(|len| len < min).map(|_| format!("must be at least {min} long"))
            }
            Self::MaxLength(max) => {
                length(typed).filter(|len| len > max).map(|_| format!("must be at most {max} long"))
            }
            Self::Min(min) => typed
                .as_f64()
                .filter(|n| n < min)
                .map(|_| format!("must be at least {min}")),
            Self::Max(max) => typed
                .as_f64()
                .filter(|n| n > max)
                .map(|_| format!("must be at most {max}")),
            Self::Pattern(re) => typed
                .as_str()
                .filter(|s| !re.is_match(s))
                .map(|_| "has an invalid format".to_string()),
            Self::OneOf(allowed) => {
                (!allowed.contains(typed)).then(|| "is not an allowed value".to_string())
            }
            Self::Custom(check) => return check(typed, ctx),
        };
        Ok(failure)
    }
}

fn length(value: &DataValue) -> Option<usize> {
    match value {
        DataValue::String(s) => Some(s.chars().count()),
        DataValue::Array(items) => Some(items.len()),
        _ => None,
    }
}

/// Rule restricted to validation scopes
#[derive(Debug, Clone)]
pub struct ScopedRule {
    /// The rule itself
    pub rule: Rule,
    /// Scopes the rule applies in (empty: every scope)
    pub scopes: Vec<String>,
    /// Message overriding the rule's own
    pub message: Option<String>,
}

impl ScopedRule {
    /// Rule applying in every scope
    #[inline]
    #[must_use]
    pub fn always(rule: Rule) -> Self {
        Self {
            rule,
            scopes: Vec::new(),
            message: None,
        }
    }

    /// Check if the rule applies in `scope`
    ///
    /// A scope-restricted rule applies only when the pass carries one of its
    /// scopes; unscoped passes skip it.
    #[must_use]
    pub fn applies(&self, scope: Option<&str>) -> bool {
        self.scopes.is_empty() || scope.is_some_and(|s| self.scopes.iter().any(|x| x == s))
    }
}

impl From<Rule> for ScopedRule {
    fn from(rule: Rule) -> Self {
        Self::always(rule)
    }
}

/// Leaf data node
pub struct Field {
    id: NodeId,
    name: Option<String>,
    title: String,
    kind: FieldKind,
    rules: Vec<ScopedRule>,
    value: DataValue,
    baseline: DataValue,
    error: Option<ValidationError>,
    render: RenderSignal,
    listeners: Vec<ChangeListener>,
}

impl std::fmt::Debug for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Field")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("value", &self.value)
            .field("rules", &self.rules)
            .field("error", &self.error)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl Field {
    /// Create new text field bound to `name`
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: NodeId::new(),
            title: name.clone(),
            name: Some(name),
            kind: FieldKind::Text,
            rules: Vec::new(),
            value: DataValue::Null,
            baseline: DataValue::Null,
            error: None,
            render: RenderSignal::default(),
            listeners: Vec::new(),
        }
    }

    /// Create a field that is rendered but never collected
    #[must_use]
    pub fn unnamed() -> Self {
        let mut field = Self::new("");
        field.name = None;
        field
    }

    /// Set value kind
    #[inline]
    #[must_use]
    pub fn with_kind(mut self, kind: FieldKind) -> Self {
        self.kind = kind;
        self
    }

    /// Set caption used in error messages
    #[inline]
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Add rule
    #[inline]
    #[must_use]
    pub fn with_rule(mut self, rule: impl Into<ScopedRule>) -> Self {
        self.rules.push(rule.into());
        self
    }

    /// Add rule applying only in `scope`
    #[must_use]
    pub fn with_scoped_rule(mut self, rule: Rule, scope: impl Into<String>) -> Self {
        self.rules.push(ScopedRule {
            rule,
            scopes: vec![scope.into()],
            message: None,
        });
        self
    }

    /// Shorthand for [`Rule::Required`]
    #[inline]
    #[must_use]
    pub fn required(self) -> Self {
        self.with_rule(Rule::Required)
    }

    /// Set initial (clean) value
    #[must_use]
    pub fn with_value(mut self, value: impl Into<DataValue>) -> Self {
        self.value = value.into();
        self.baseline = self.value.clone();
        self
    }

    /// Add change listener
    #[must_use]
    pub fn with_listener(mut self, listener: ChangeListener) -> Self {
        self.listeners.push(listener);
        self
    }

    /// Value kind
    #[inline]
    #[must_use]
    pub fn field_kind(&self) -> &FieldKind {
        &self.kind
    }

    /// Caption
    #[inline]
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Typed view of the current value
    ///
    /// # Errors
    /// Returns a message when the raw value does not fit the field kind.
    pub fn cast_value(&self) -> Result<DataValue, String> {
        self.kind.cast(&self.value)
    }

    fn run_rules(
        &self,
        ctx: &ValidationContext,
        scope: Option<&str>,
    ) -> anyhow::Result<Option<String>> {
        let active: Vec<&ScopedRule> = self.rules.iter().filter(|r| r.applies(scope)).collect();

        if is_absent(&self.value) {
            let required = active.iter().find(|r| matches!(r.rule, Rule::Required));
            return Ok(required.map(|r| {
                r.message.clone().unwrap_or_else(|| "is required".to_string())
            }));
        }

        let typed = match self.cast_value() {
            Ok(typed) => typed,
            Err(message) => return Ok(Some(message)),
        };

        for rule in active {
            if let Some(message) = rule.rule.check(&typed, ctx)? {
                return Ok(Some(rule.message.clone().unwrap_or(message)));
            }
        }
        Ok(None)
    }

    fn listeners(field: &mut Self) -> &mut Vec<ChangeListener> {
        &mut field.listeners
    }
}

impl Node for Field {
    fn id(&self) -> NodeId {
        self.id
    }

    fn kind(&self) -> NodeKind {
        NodeKind::Field
    }

    fn as_data(&self) -> Option<&dyn DataNode> {
        Some(self)
    }

    fn as_data_mut(&mut self) -> Option<&mut dyn DataNode> {
        Some(self)
    }

    fn render_epoch(&self) -> u64 {
        self.render.epoch()
    }
}

impl DataNode for Field {
    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn set_name(&mut self, name: Option<String>) {
        if name.as_deref().is_some_and(is_reserved_name) {
            tracing::warn!(name = name.as_deref(), "ignoring reserved field name");
            return;
        }
        self.name = name;
    }

    fn value(&self) -> DataValue {
        self.value.clone()
    }

    fn set_value(&mut self, value: DataValue) -> bool {
        if self.value == value {
            return false;
        }
        self.value = value;
        self.render.request();
        true
    }

    fn validate(
        &mut self,
        ctx: &ValidationContext,
        scope: Option<&str>,
        apply: bool,
    ) -> anyhow::Result<Option<ValidationError>> {
        let error = self.run_rules(ctx, scope)?.map(|message| {
            ValidationError::field(self.name.clone().unwrap_or_default(), &self.title, message)
                .with_scope(scope)
        });
        if apply {
            self.error = error.clone();
            self.render.request();
        }
        Ok(error)
    }

    fn error(&self) -> Option<&ValidationError> {
        self.error.as_ref()
    }

    fn clear_errors(&mut self) {
        if self.error.take().is_some() {
            self.render.request();
        }
    }

    fn is_dirty(&self) -> bool {
        self.value != self.baseline
    }

    fn mark_clean(&mut self) {
        self.baseline = self.value.clone();
    }

    fn on_value_changed(&mut self, event: &mut ChangeEvent) {
        listener::dispatch(self, Self::listeners, event);
    }
}
