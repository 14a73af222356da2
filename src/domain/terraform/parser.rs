//! Resource extraction from HCL (Terraform) source

use crate::domain::resource::{
    marker_in_container, Locator, Resource, ResourceContent, ResourceId, FUNC_CALL_PREFIX,
};
use crate::error::{Result, TaggerError};
use hcl::{Block, Body, Expression, ObjectKey, Structure};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Name of the tag container attribute on HCL resources.
pub const TAGS_ATTRIBUTE: &str = "tags";

/// Parse HCL text and collect every `resource "type" "name"` block.
///
/// Blocks of other types are ignored. Duplicate identities keep the last block.
pub fn parse_resources(source: &str) -> Result<BTreeMap<ResourceId, Resource>> {
    let body = hcl::parse(source).map_err(|e| TaggerError::parse("HCL", e.to_string()))?;

    let mut resources = BTreeMap::new();
    for block in body.blocks().filter(|b| b.identifier() == "resource") {
        let [resource_type, name] = block.labels() else {
            tracing::debug!(
                labels = block.labels().len(),
                "skipping resource block without two labels"
            );
            continue;
        };
        let (resource_type, name) = (resource_type.as_str(), name.as_str());

        let id = ResourceId::block(resource_type, name);
        let resource = Resource::new(
            id.clone(),
            ResourceContent::Structured(body_to_value(block.body())),
            Locator::Block {
                resource_type: resource_type.to_string(),
                name: name.to_string(),
            },
        );

        if resources.insert(id.clone(), resource).is_some() {
            tracing::warn!(resource = %id, "duplicate resource identity, keeping the last block");
        }
    }

    Ok(resources)
}

/// Read the current marker from a resource's `tags` attribute.
pub fn last_marker<'a>(resource: &'a Resource, key: &str) -> Option<&'a str> {
    match &resource.content {
        ResourceContent::Structured(value) => value
            .get(TAGS_ATTRIBUTE)
            .and_then(|tags| marker_in_container(tags, key)),
        ResourceContent::Raw(_) => None,
    }
}

fn body_to_value(body: &Body) -> Value {
    let mut map = Map::new();
    for structure in body.iter() {
        match structure {
            Structure::Attribute(attr) => {
                map.insert(attr.key().to_string(), expr_to_value(attr.expr()));
            }
            Structure::Block(block) => {
                let entry = map
                    .entry(block.identifier().to_string())
                    .or_insert_with(|| Value::Array(Vec::new()));
                if let Value::Array(items) = entry {
                    items.push(labelled_block_value(block));
                }
            }
            #[allow(unreachable_patterns)]
            _ => {}
        }
    }
    Value::Object(map)
}

fn labelled_block_value(block: &Block) -> Value {
    block
        .labels()
        .iter()
        .rev()
        .fold(body_to_value(block.body()), |inner, label| {
            let mut map = Map::new();
            map.insert(label.as_str().to_string(), inner);
            Value::Object(map)
        })
}

fn expr_to_value(expr: &Expression) -> Value {
    match expr {
        Expression::Null => Value::Null,
        Expression::Bool(b) => Value::Bool(*b),
        Expression::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Number(i.into())
            } else if let Some(u) = n.as_u64() {
                Value::Number(u.into())
            } else {
                n.as_f64()
                    .and_then(serde_json::Number::from_f64)
                    .map(Value::Number)
                    .unwrap_or_else(|| Value::String(n.to_string()))
            }
        }
        Expression::String(s) => Value::String(s.clone()),
        Expression::Array(items) => Value::Array(items.iter().map(expr_to_value).collect()),
        Expression::Object(object) => {
            let mut map = Map::new();
            for (key, value) in object.iter() {
                map.insert(object_key_text(key), expr_to_value(value));
            }
            Value::Object(map)
        }
        Expression::FuncCall(call) => {
            let mut map = Map::new();
            map.insert(
                format!("{}{}", FUNC_CALL_PREFIX, call.name),
                Value::Array(call.args.iter().map(expr_to_value).collect()),
            );
            Value::Object(map)
        }
        Expression::Parenthesis(inner) => expr_to_value(inner),
        other => Value::String(render(other)),
    }
}

fn object_key_text(key: &ObjectKey) -> String {
    match key {
        ObjectKey::Identifier(ident) => ident.to_string(),
        ObjectKey::Expression(Expression::String(s)) => s.clone(),
        ObjectKey::Expression(expr) => render(expr),
        #[allow(unreachable_patterns)]
        other => format!("{:?}", other),
    }
}

/// Opaque text form of an expression that has no plain-value equivalent.
fn render(expr: &Expression) -> String {
    hcl::format::to_string(expr).unwrap_or_else(|_| format!("{:?}", expr))
}
