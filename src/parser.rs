//! Parse schema DSL source into [`SchemaDef`]s using PEST.

use crate::ast::*;
use crate::field::FieldKind;
use crate::length::LengthFormat;
use crate::validator::Validator;
use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser as PestParser;

#[derive(PestParser)]
#[grammar = "schema.pest"]
struct SchemaParser;

/// Parse schema source into definitions. References are not resolved here.
pub fn parse_schemas(source: &str) -> Result<Vec<SchemaDef>, String> {
    let pairs = SchemaParser::parse(Rule::document, source).map_err(|e| format!("Parse error: {}", e))?;
    let document = pairs.into_iter().next().ok_or("Empty parse")?;
    document
        .into_inner()
        .filter(|p| p.as_rule() == Rule::schema)
        .map(build_schema)
        .collect()
}

/// Parse and resolve in one step.
pub fn load_schemas(source: &str) -> Result<SchemaSet, String> {
    SchemaSet::resolve(parse_schemas(source)?)
}

fn build_schema(pair: Pair<Rule>) -> Result<SchemaDef, String> {
    let mut inner = pair.into_inner();
    let name = inner.next().ok_or("schema: missing name")?.as_str().to_string();
    let mut def = SchemaDef {
        name,
        prefix: None,
        max_index: None,
        fields: Vec::new(),
    };
    for item in inner {
        match item.as_rule() {
            Rule::prefix_decl => {
                let ident = item.into_inner().next().ok_or("prefix: missing name")?;
                if def.prefix.replace(ident.as_str().to_string()).is_some() {
                    return Err(format!("schema {}: prefix declared twice", def.name));
                }
            }
            Rule::max_decl => {
                let number = item.into_inner().next().ok_or("max: missing number")?;
                let max = parse_index(number.as_str())?;
                if def.max_index.replace(max).is_some() {
                    return Err(format!("schema {}: max declared twice", def.name));
                }
            }
            Rule::field_decl => {
                let field = build_field(item).map_err(|e| format!("schema {}: {}", def.name, e))?;
                def.fields.push(field);
            }
            _ => {}
        }
    }
    Ok(def)
}

fn build_field(pair: Pair<Rule>) -> Result<FieldDef, String> {
    let mut inner = pair.into_inner();
    let index = parse_index(inner.next().ok_or("field: missing index")?.as_str())?;
    let body = inner.next().ok_or("field: missing body")?;
    let mut field = FieldDef {
        index,
        kind: FieldKind::Reserved,
        format: LengthFormat::Fixed,
        max_length: 0,
        validator: None,
        description: None,
        sub_schema: None,
    };
    if body.as_rule() == Rule::reserved_field {
        for part in body.into_inner() {
            if part.as_rule() == Rule::description {
                field.description = Some(description_text(part));
            }
        }
        return Ok(field);
    }

    let mut parts = body.into_inner();
    let kind = parts.next().ok_or("field: missing kind")?;
    field.kind = kind.as_str().parse::<FieldKind>()?;
    let format = parts.next().ok_or("field: missing length format")?;
    field.format = format.as_str().parse::<LengthFormat>()?;
    let length = parts.next().ok_or("field: missing length")?;
    field.max_length = length
        .as_str()
        .parse::<usize>()
        .map_err(|e| format!("field {}: length {}: {}", index, length.as_str(), e))?;
    for part in parts {
        match part.as_rule() {
            Rule::validate => {
                let name = part.into_inner().next().ok_or("validate: missing name")?;
                field.validator = Some(name.as_str().parse::<Validator>()?);
            }
            Rule::description => field.description = Some(description_text(part)),
            Rule::sub_ref => {
                let target = part.into_inner().next().ok_or("->: missing schema name")?;
                field.sub_schema = Some(target.as_str().to_string());
            }
            _ => {}
        }
    }
    Ok(field)
}

fn description_text(pair: Pair<Rule>) -> String {
    pair.into_inner()
        .flat_map(|string| string.into_inner())
        .map(|inner| inner.as_str().to_string())
        .next()
        .unwrap_or_default()
}

fn parse_index(s: &str) -> Result<u8, String> {
    s.parse::<u8>()
        .ok()
        .filter(|&i| i <= crate::bitmap::MAX_FIELD_INDEX)
        .ok_or_else(|| format!("index {} out of range", s))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_prefix_and_max_are_omitted() {
        let defs = parse_schemas("schema s { 2: n llvar 19; }").unwrap();
        assert_eq!(defs[0].prefix, None);
        assert_eq!(defs[0].max_index, None);
        assert_eq!(defs[0].fields[0].validator, None);
    }

    #[test]
    fn description_keeps_inner_text() {
        let defs = parse_schemas(r#"schema s { 2: ans fixed 29 validate ANS "Cardholder address"; }"#).unwrap();
        assert_eq!(defs[0].fields[0].description.as_deref(), Some("Cardholder address"));
    }

    #[test]
    fn out_of_range_index_is_rejected() {
        assert!(parse_schemas("schema s { 300: n fixed 3; }").is_err());
        assert!(parse_schemas("schema s { max 129; }").is_err());
    }
}
