//! Declarative layout documents
//!
//! A [`LayoutSpec`] describes a form as data: fields with kinds and rules,
//! wrappers, blocks, bits, list bits and block-level cross-field rules. It
//! can be read from JSON, YAML or TOML, and [`LayoutSpec::build`] turns it
//! into a live [`Form`].
//!
//! # Example
//!
//! ```yaml
//! title: Person
//! children:
//!   - type: field
//!     name: FirstName
//!     required: true
//!   - type: wrapper
//!     children:
//!       - type: field
//!         name: Age
//!         kind: integer
//!         min: 0
//! rules:
//!   - rule: require_one
//!     fields: [Email, Phone]
//! ```
//!
//! Building first compiles the document (patterns, structure) so that list
//! items can later be instantiated without any failure path.

use crate::block::{self, Block, BlockHook};
use crate::error::BlocksError;
use crate::field::{Field, FieldKind, Rule, ScopedRule};
use crate::{Bit, Form, ListBit, Wrapper};
use formtree_node::{is_reserved_name, DataValue, Node};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Layout document (root form)
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LayoutSpec {
    /// Form caption
    #[serde(default)]
    pub title: Option<String>,

    /// Schema name stamped on the form's composite error
    #[serde(default)]
    pub schema: Option<String>,

    /// Form content
    #[serde(default)]
    pub children: Vec<LayoutNode>,

    /// Form-level cross-field rules
    #[serde(default)]
    pub rules: Vec<BlockRule>,
}

/// One node of a layout document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LayoutNode {
    /// Leaf field
    Field(FieldSpec),
    /// Transparent layout wrapper
    Wrapper(WrapperSpec),
    /// Grouping container
    Block(BlockSpec),
    /// Collapsible bit
    Bit(BitSpec),
    /// Repeating group
    List(ListSpec),
}

/// Leaf field description
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Binding name (unnamed fields are rendered but not collected)
    #[serde(default)]
    pub name: Option<String>,
    /// Caption
    #[serde(default)]
    pub title: Option<String>,
    /// Value kind
    #[serde(default)]
    pub kind: FieldKind,
    /// Initial value
    #[serde(default)]
    pub value: Option<DataValue>,
    /// Value must be present
    #[serde(default)]
    pub required: bool,
    /// Minimum length
    #[serde(default)]
    pub min_length: Option<usize>,
    /// Maximum length
    #[serde(default)]
    pub max_length: Option<usize>,
    /// Minimum numeric value
    #[serde(default)]
    pub min: Option<f64>,
    /// Maximum numeric value
    #[serde(default)]
    pub max: Option<f64>,
    /// Regular expression the text must match
    #[serde(default)]
    pub pattern: Option<String>,
    /// Allowed values
    #[serde(default)]
    pub one_of: Vec<DataValue>,
    /// Restrict every rule of this field to these validation scopes
    #[serde(default)]
    pub scopes: Vec<String>,
    /// Message replacing the rules' own
    #[serde(default)]
    pub message: Option<String>,
}

/// Wrapper description
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WrapperSpec {
    /// Presentation label
    #[serde(default)]
    pub label: Option<String>,
    /// Content
    #[serde(default)]
    pub children: Vec<LayoutNode>,
}

/// Block description
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BlockSpec {
    /// Binding name (an unnamed block binds its members into the parent value)
    #[serde(default)]
    pub name: Option<String>,
    /// Caption
    #[serde(default)]
    pub title: Option<String>,
    /// Schema name
    #[serde(default)]
    pub schema: Option<String>,
    /// Content
    #[serde(default)]
    pub children: Vec<LayoutNode>,
    /// Cross-field rules
    #[serde(default)]
    pub rules: Vec<BlockRule>,
}

/// Bit description
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BitSpec {
    /// Binding name (unnamed bits are transparent)
    #[serde(default)]
    pub name: Option<String>,
    /// Caption
    #[serde(default)]
    pub title: Option<String>,
    /// Start expanded
    #[serde(default)]
    pub expanded: bool,
    /// Presentation-only summary content
    #[serde(default)]
    pub summary: Vec<LayoutNode>,
    /// Data-carrying detail content
    #[serde(default)]
    pub children: Vec<LayoutNode>,
}

/// List bit description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListSpec {
    /// Binding name (required)
    pub name: String,
    /// Caption
    #[serde(default)]
    pub title: Option<String>,
    /// Minimum number of items
    #[serde(default)]
    pub min_items: Option<usize>,
    /// Maximum number of items
    #[serde(default)]
    pub max_items: Option<usize>,
    /// Content of one item
    pub item: Vec<LayoutNode>,
}

/// Block-level cross-field rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum BlockRule {
    /// At most one of the fields may hold a value
    Exclusive {
        /// Field names
        fields: Vec<String>,
        /// Message override
        #[serde(default)]
        message: Option<String>,
    },
    /// At least one of the fields must hold a value
    RequireOne {
        /// Field names
        fields: Vec<String>,
        /// Message override
        #[serde(default)]
        message: Option<String>,
    },
}

impl BlockRule {
    fn hook(&self, title: &str) -> BlockHook {
        match self {
            Self::Exclusive { fields, message } => {
                block::exclusive(title, fields.clone(), message.clone())
            }
            Self::RequireOne { fields, message } => {
                block::require_one(title, fields.clone(), message.clone())
            }
        }
    }

    fn fields(&self) -> &[String] {
        match self {
            Self::Exclusive { fields, .. } | Self::RequireOne { fields, .. } => fields,
        }
    }
}

impl LayoutSpec {
    /// Parse JSON layout
    ///
    /// # Errors
    /// - `BlocksError::Json` on malformed input
    pub fn from_json(content: &str) -> Result<Self, BlocksError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Parse YAML layout
    ///
    /// # Errors
    /// - `BlocksError::Yaml` on malformed input
    pub fn from_yaml(content: &str) -> Result<Self, BlocksError> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Parse TOML layout
    ///
    /// # Errors
    /// - `BlocksError::Toml` on malformed input
    pub fn from_toml(content: &str) -> Result<Self, BlocksError> {
        Ok(toml::from_str(content)?)
    }

    /// Read a layout file, choosing the parser by extension
    ///
    /// # Errors
    /// - `BlocksError::Io` if the file cannot be read
    /// - `BlocksError::UnsupportedFormat` for unknown extensions
    /// - a parse error for malformed content
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, BlocksError> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let content =
            std::fs::read_to_string(path).map_err(|e| BlocksError::io_error(path, e))?;

        tracing::debug!(path = %path.display(), format = %ext, "loading layout");
        match ext.as_str() {
            "json" => Self::from_json(&content),
            "yaml" | "yml" => Self::from_yaml(&content),
            "toml" => Self::from_toml(&content),
            other => Err(BlocksError::UnsupportedFormat(other.to_string())),
        }
    }

    /// Build the live form tree
    ///
    /// # Errors
    /// - `BlocksError::InvalidPattern` if a field pattern does not compile
    /// - `BlocksError::InvalidLayout` for reserved names, a block, bit or list
    ///   sharing its name with another bound node, or rules naming unknown
    ///   fields
    pub fn build(&self) -> Result<Form, BlocksError> {
        let children = compile_all(&self.children)?;
        check_rules(&self.rules, &children)?;

        let title = self.title.clone().unwrap_or_default();
        let mut block = Block::unnamed().with_title(&title);
        if let Some(schema) = &self.schema {
            block = block.with_schema(schema);
        }
        for child in &children {
            block.push(child.instantiate());
        }
        for rule in &self.rules {
            block.push_hook(rule.hook(&title));
        }
        Ok(Form::from_block(block))
    }
}

/// Compiled layout node, instantiable any number of times
#[derive(Debug, Clone)]
enum Template {
    Field {
        name: Option<String>,
        title: Option<String>,
        kind: FieldKind,
        value: Option<DataValue>,
        rules: Vec<ScopedRule>,
    },
    Wrapper {
        label: Option<String>,
        children: Vec<Template>,
    },
    Block {
        name: Option<String>,
        title: Option<String>,
        schema: Option<String>,
        children: Vec<Template>,
        rules: Vec<BlockRule>,
    },
    Bit {
        name: Option<String>,
        title: Option<String>,
        expanded: bool,
        summary: Vec<Template>,
        children: Vec<Template>,
    },
    List {
        name: String,
        title: Option<String>,
        min_items: Option<usize>,
        max_items: Option<usize>,
        item: Vec<Template>,
    },
}

fn compile_all(nodes: &[LayoutNode]) -> Result<Vec<Template>, BlocksError> {
    let compiled = nodes.iter().map(compile).collect::<Result<Vec<_>, _>>()?;
    check_unique_names(&compiled)?;
    Ok(compiled)
}

fn compile(node: &LayoutNode) -> Result<Template, BlocksError> {
    match node {
        LayoutNode::Field(spec) => compile_field(spec),
        LayoutNode::Wrapper(spec) => Ok(Template::Wrapper {
            label: spec.label.clone(),
            children: compile_all(&spec.children)?,
        }),
        LayoutNode::Block(spec) => {
            check_name(spec.name.as_deref())?;
            let children = compile_all(&spec.children)?;
            check_rules(&spec.rules, &children)?;
            Ok(Template::Block {
                name: spec.name.clone(),
                title: spec.title.clone(),
                schema: spec.schema.clone(),
                children,
                rules: spec.rules.clone(),
            })
        }
        LayoutNode::Bit(spec) => {
            check_name(spec.name.as_deref())?;
            Ok(Template::Bit {
                name: spec.name.clone(),
                title: spec.title.clone(),
                expanded: spec.expanded,
                summary: spec.summary.iter().map(compile).collect::<Result<_, _>>()?,
                children: compile_all(&spec.children)?,
            })
        }
        LayoutNode::List(spec) => {
            check_name(Some(&spec.name))?;
            if spec.name.is_empty() {
                return Err(BlocksError::invalid("list bit needs a name"));
            }
            Ok(Template::List {
                name: spec.name.clone(),
                title: spec.title.clone(),
                min_items: spec.min_items,
                max_items: spec.max_items,
                item: compile_all(&spec.item)?,
            })
        }
    }
}

fn compile_field(spec: &FieldSpec) -> Result<Template, BlocksError> {
    check_name(spec.name.as_deref())?;

    let mut rules = Vec::new();
    if spec.required {
        rules.push(Rule::Required);
    }
    if let Some(min) = spec.min_length {
        rules.push(Rule::MinLength(min));
    }
    if let Some(max) = spec.max_length {
        rules.push(Rule::MaxLength(max));
    }
    if let Some(min) = spec.min {
        rules.push(Rule::Min(min));
    }
    if let Some(max) = spec.max {
        rules.push(Rule::Max(max));
    }
    if let Some(pattern) = &spec.pattern {
        let re = Regex::new(pattern).map_err(|source| BlocksError::InvalidPattern {
            field: spec.name.clone().unwrap_or_default(),
            source,
        })?;
        rules.push(Rule::Pattern(re));
    }
    if !spec.one_of.is_empty() {
        rules.push(Rule::OneOf(spec.one_of.clone()));
    }

    Ok(Template::Field {
        name: spec.name.clone(),
        title: spec.title.clone(),
        kind: spec.kind.clone(),
        value: spec.value.clone(),
        rules: rules
            .into_iter()
            .map(|rule| ScopedRule {
                rule,
                scopes: spec.scopes.clone(),
                message: spec.message.clone(),
            })
            .collect(),
    })
}

fn check_name(name: Option<&str>) -> Result<(), BlocksError> {
    match name {
        Some(name) if is_reserved_name(name) => Err(BlocksError::invalid(format!(
            "'{name}' is a reserved name"
        ))),
        _ => Ok(()),
    }
}

/// Names bound to the same parent value, looking through wrappers, unnamed
/// bits and unnamed blocks; the flag marks plain fields
fn bound_names(templates: &[Template], out: &mut Vec<(String, bool)>) {
    for template in templates {
        match template {
            Template::Field { name, .. } => {
                out.extend(name.clone().map(|name| (name, true)));
            }
            Template::Block {
                name: Some(name), ..
            }
            | Template::Bit {
                name: Some(name), ..
            }
            | Template::List { name, .. } => out.push((name.clone(), false)),
            Template::Wrapper { children, .. }
            | Template::Block { children, .. }
            | Template::Bit { children, .. } => bound_names(children, out),
        }
    }
}

/// Same-name fields collect into an array; any other collision is ambiguous
fn check_unique_names(templates: &[Template]) -> Result<(), BlocksError> {
    let mut names = Vec::new();
    bound_names(templates, &mut names);
    for (i, (name, is_field)) in names.iter().enumerate() {
        let clash = names[..i]
            .iter()
            .any(|(other, other_is_field)| other == name && !(*is_field && *other_is_field));
        if clash {
            return Err(BlocksError::invalid(format!(
                "duplicate name '{name}' (only fields may share a name; use a list for repeating groups)"
            )));
        }
    }
    Ok(())
}

fn check_rules(rules: &[BlockRule], children: &[Template]) -> Result<(), BlocksError> {
    let mut names = Vec::new();
    bound_names(children, &mut names);
    for rule in rules {
        if let Some(unknown) = rule
            .fields()
            .iter()
            .find(|f| !names.iter().any(|(name, _)| name == *f))
        {
            return Err(BlocksError::invalid(format!(
                "rule refers to unknown field '{unknown}'"
            )));
        }
    }
    Ok(())
}

impl Template {
    fn instantiate(&self) -> Box<dyn Node> {
        match self {
            Self::Field {
                name,
                title,
                kind,
                value,
                rules,
            } => {
                let mut field = match name {
                    Some(name) => Field::new(name),
                    None => Field::unnamed(),
                }
                .with_kind(kind.clone());
                if let Some(title) = title {
                    field = field.with_title(title);
                }
                if let Some(value) = value {
                    field = field.with_value(value.clone());
                }
                for rule in rules {
                    field = field.with_rule(rule.clone());
                }
                Box::new(field)
            }
            Self::Wrapper { label, children } => {
                let mut wrapper = Wrapper::new();
                if let Some(label) = label {
                    wrapper = wrapper.with_label(label);
                }
                for child in children {
                    wrapper.push(child.instantiate());
                }
                Box::new(wrapper)
            }
            Self::Block {
                name,
                title,
                schema,
                children,
                rules,
            } => {
                let mut block = match name {
                    Some(name) => Block::new(name),
                    None => Block::unnamed(),
                };
                if let Some(title) = title {
                    block = block.with_title(title);
                }
                if let Some(schema) = schema {
                    block = block.with_schema(schema);
                }
                for child in children {
                    block.push(child.instantiate());
                }
                let caption = block.title().to_string();
                for rule in rules {
                    block.push_hook(rule.hook(&caption));
                }
                Box::new(block)
            }
            Self::Bit {
                name,
                title,
                expanded,
                summary,
                children,
            } => {
                let mut bit = match name {
                    Some(name) => Bit::named(name),
                    None => Bit::new(),
                }
                .expanded(*expanded);
                if let Some(title) = title {
                    bit = bit.with_title(title);
                }
                for node in summary {
                    bit.push_summary(node.instantiate());
                }
                for node in children {
                    bit.push_detail(node.instantiate());
                }
                Box::new(bit)
            }
            Self::List {
                name,
                title,
                min_items,
                max_items,
                item,
            } => {
                let item = item.clone();
                let mut list = ListBit::new(name, move || -> Box<dyn Node> {
                    let mut block = Block::unnamed();
                    for node in &item {
                        block.push(node.instantiate());
                    }
                    Box::new(block)
                });
                if let Some(title) = title {
                    list = list.with_title(title);
                }
                if let Some(min) = min_items {
                    list = list.with_min_items(*min);
                }
                if let Some(max) = max_items {
                    list = list.with_max_items(*max);
                }
                Box::new(list)
            }
        }
    }
}
