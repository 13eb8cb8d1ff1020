//! Syntax tree of the schema DSL and resolution into [`Schema`] tables.

use crate::field::FieldKind;
use crate::length::LengthFormat;
use crate::schema::{FieldSpec, Schema};
use crate::validator::Validator;
use std::collections::HashMap;
use std::sync::Arc;

pub const DEFAULT_PREFIX: &str = "DE";
pub const DEFAULT_MAX_INDEX: u8 = 128;

/// One `schema name { ... }` block.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaDef {
    pub name: String,
    pub prefix: Option<String>,
    pub max_index: Option<u8>,
    pub fields: Vec<FieldDef>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldDef {
    pub index: u8,
    pub kind: FieldKind,
    pub format: LengthFormat,
    pub max_length: usize,
    pub validator: Option<Validator>,
    pub description: Option<String>,
    /// `-> name`: schema of the embedded sub-message.
    pub sub_schema: Option<String>,
}

impl FieldDef {
    fn to_spec(&self) -> FieldSpec {
        FieldSpec::new(self.index, self.kind, self.max_length, self.format, self.validator)
            .with_name(self.description.clone().unwrap_or_default())
    }
}

/// Schemas by name, with sub-schema references resolved.
#[derive(Debug, Clone)]
pub struct SchemaSet {
    schemas: HashMap<String, Arc<Schema>>,
    order: Vec<String>,
}

#[derive(Clone, Copy, PartialEq)]
enum Mark {
    Visiting,
    Done,
}

impl SchemaSet {
    /// Resolve `-> name` references and check every table.
    ///
    /// Fails on duplicate schema names, unknown references and reference cycles.
    pub fn resolve(defs: Vec<SchemaDef>) -> Result<Self, String> {
        let mut by_name = HashMap::new();
        for (i, def) in defs.iter().enumerate() {
            if by_name.insert(def.name.clone(), i).is_some() {
                return Err(format!("Duplicate schema name: {}", def.name));
            }
        }
        let mut resolver = Resolver {
            defs: &defs,
            by_name: &by_name,
            marks: HashMap::new(),
            built: HashMap::new(),
        };
        for def in &defs {
            resolver.build(&def.name)?;
        }
        Ok(SchemaSet {
            schemas: resolver.built,
            order: defs.into_iter().map(|d| d.name).collect(),
        })
    }

    pub fn get(&self, name: &str) -> Option<Arc<Schema>> {
        self.schemas.get(name).cloned()
    }

    /// Schema names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

struct Resolver<'a> {
    defs: &'a [SchemaDef],
    by_name: &'a HashMap<String, usize>,
    marks: HashMap<String, Mark>,
    built: HashMap<String, Arc<Schema>>,
}

impl Resolver<'_> {
    fn build(&mut self, name: &str) -> Result<Arc<Schema>, String> {
        match self.marks.get(name) {
            Some(Mark::Done) => {
                return self
                    .built
                    .get(name)
                    .cloned()
                    .ok_or_else(|| format!("Schema {} not built", name));
            }
            Some(Mark::Visiting) => return Err(format!("Cyclic sub-schema reference through {}", name)),
            None => {}
        }
        let defs = self.defs;
        let def = match self.by_name.get(name) {
            Some(&i) => &defs[i],
            None => return Err(format!("Unknown schema: {}", name)),
        };
        self.marks.insert(name.to_string(), Mark::Visiting);

        let mut sub = None;
        for field in &def.fields {
            let Some(target) = &field.sub_schema else {
                continue;
            };
            if field.kind != FieldKind::SubMessage {
                return Err(format!("{}: field {} is {}, only sub fields take -> {}", def.name, field.index, field.kind, target));
            }
            sub = Some(self.build(target)?);
        }
        let schema = Schema::new(
            def.name.clone(),
            def.prefix.clone().unwrap_or_else(|| DEFAULT_PREFIX.to_string()),
            def.max_index.unwrap_or(DEFAULT_MAX_INDEX),
            def.fields.iter().map(FieldDef::to_spec).collect(),
            sub,
        )?;
        let schema = Arc::new(schema);
        self.marks.insert(name.to_string(), Mark::Done);
        self.built.insert(name.to_string(), Arc::clone(&schema));
        Ok(schema)
    }
}
