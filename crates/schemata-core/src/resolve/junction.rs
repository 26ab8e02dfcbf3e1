//! Junction synthesis for many-to-many (`hasMany` through) relationships.

use super::naming::{lower_first, pluralize, schema_key};
use super::{Draft, Drafts};
use crate::assemble::{default_id, DEFAULT_ID};
use crate::catalog::{Id, PartialRelationship, Relationship};
use crate::error::InvalidSchemaError;
use std::collections::HashMap;
use tracing::debug;

/// One junction, shared by both participants of an unordered pair.
#[derive(Debug, Clone)]
struct Plan {
    key: String,
    /// Foreign key on the junction for each participant, by schema key.
    foreign_keys: HashMap<String, String>,
}

impl Plan {
    fn foreign_key(&self, participant: &str) -> &str {
        self.foreign_keys
            .get(participant)
            .map(String::as_str)
            .unwrap_or_default()
    }
}

fn pair(a: &str, b: &str) -> (String, String) {
    if a <= b {
        (a.to_string(), b.to_string())
    } else {
        (b.to_string(), a.to_string())
    }
}

/// Resolve every through relationship, creating junctions as needed.
pub(super) fn resolve_through(drafts: &mut Drafts) -> Result<(), InvalidSchemaError> {
    let mut plans: HashMap<(String, String), Plan> = HashMap::new();

    for i in 0..drafts.drafts.len() {
        // Through relationships already seen on this owner, by partner.
        let mut partners: HashMap<String, String> = HashMap::new();

        for slot in 0..drafts.drafts[i].declared.len() {
            let declared = drafts.drafts[i].declared[slot].clone();
            if !matches!(
                declared.relationship,
                PartialRelationship::HasMany { through: true, .. }
            ) {
                continue;
            }

            let owner_key = drafts.drafts[i].key.clone();
            if declared.target == owner_key {
                return Err(InvalidSchemaError::SelfThrough {
                    schema: owner_key,
                    relationship: declared.name,
                });
            }
            if let Some(first) = partners.insert(declared.target.clone(), declared.name.clone()) {
                return Err(InvalidSchemaError::AmbiguousThrough {
                    schema: owner_key,
                    target: declared.target,
                    first,
                    second: declared.name,
                });
            }

            let participants = pair(&owner_key, &declared.target);
            let plan = match plans.get(&participants) {
                Some(plan) => plan.clone(),
                None => {
                    let plan = create_junction(drafts, i, &declared.target)?;
                    plans.insert(participants, plan.clone());
                    plan
                }
            };

            let t = drafts.position(&declared.target).unwrap_or(i);
            let resolved = Relationship::HasManyThrough {
                target_schema: declared.target.clone(),
                through: plan.key.clone(),
                through_source_attribute: plan.foreign_key(&owner_key).to_string(),
                through_target_attribute: plan.foreign_key(&declared.target).to_string(),
                source_key: drafts.drafts[i].id.name.clone(),
                target_key: drafts.drafts[t].id.name.clone(),
            };
            drafts.drafts[i].relationships[slot].1 = Some(resolved);
        }
    }

    Ok(())
}

/// Create the junction between the schema at `first` and `second`, and
/// install the plain `hasMany` accessor on both participants.
fn create_junction(
    drafts: &mut Drafts,
    first: usize,
    second: &str,
) -> Result<Plan, InvalidSchemaError> {
    let second = drafts.position(second).unwrap_or(first);
    let (a, b) = (&drafts.drafts[first], &drafts.drafts[second]);

    let name = format!("{}{}", a.name, b.name);
    let namespace = a.namespace.clone();
    let key = schema_key(namespace.as_deref(), &name);
    if drafts.contains(&key) {
        return Err(InvalidSchemaError::JunctionCollision(key));
    }

    let id = default_id()
        .finalize()
        .map_err(|e| e.in_attribute(key.as_str(), DEFAULT_ID))?;
    let plural_name = pluralize(&name);

    let mut junction = Draft {
        key: key.clone(),
        name: name.clone(),
        namespace: namespace.clone(),
        table_name: schema_key(namespace.as_deref(), &plural_name),
        plural_name,
        display_attribute: DEFAULT_ID.to_string(),
        read_only: false,
        junction: true,
        id: Id {
            name: DEFAULT_ID.to_string(),
            attribute: id,
        },
        attributes: Vec::new(),
        declared: Vec::new(),
        relationships: Vec::new(),
    };

    let mut foreign_keys = HashMap::new();
    for participant in [a, b] {
        let leg = lower_first(&participant.name);
        let fk = format!("{}Id", leg);
        junction.add_foreign_key(fk.clone(), participant.id.attribute.as_foreign_key(true))?;
        junction.add_relationship(
            leg,
            Relationship::BelongsTo {
                target_schema: participant.key.clone(),
                source_attribute: fk.clone(),
                target_attribute: participant.id.name.clone(),
                required: true,
            },
        )?;
        foreign_keys.insert(participant.key.clone(), fk);
    }

    let accessor = lower_first(&pluralize(&name));
    for participant in [first, second] {
        let draft = &mut drafts.drafts[participant];
        let target_attribute = foreign_keys
            .get(&draft.key)
            .cloned()
            .unwrap_or_default();
        let source_attribute = draft.id.name.clone();
        draft.add_relationship(
            accessor.clone(),
            Relationship::HasMany {
                target_schema: key.clone(),
                source_attribute,
                target_attribute,
            },
        )?;
    }

    debug!(junction = %key, accessor = %accessor, "synthesized junction");
    drafts.push(junction);

    Ok(Plan { key, foreign_keys })
}

#[cfg(test)]
mod tests {
    use crate::assemble::assemble;
    use crate::catalog::{has_many, FinalSchema, PartialSchema, Relationship, SchemaMap};
    use crate::error::InvalidSchemaError;
    use crate::resolve::resolve;

    fn build(schemas: Vec<PartialSchema>) -> Result<SchemaMap<FinalSchema>, InvalidSchemaError> {
        let mut map = SchemaMap::new();
        for schema in schemas {
            map.declare(schema);
        }
        resolve(assemble(map)?)
    }

    #[test]
    fn test_todo_user_junction() {
        let map = build(vec![
            PartialSchema::new("Todo").with_relationship("users", has_many().through()),
            PartialSchema::new("User").with_relationship("todos", has_many().through()),
        ])
        .unwrap();

        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["Todo", "User", "TodoUser"]);

        let junction = map.get("TodoUser").unwrap();
        assert!(junction.junction);
        assert_eq!(junction.table_name, "TodoUsers");
        assert!(!junction.attribute("todoId").unwrap().control.allow_null);
        assert!(!junction.attribute("userId").unwrap().control.allow_null);
        assert_eq!(
            junction.relationship("todo").unwrap().foreign_key_into("Todo"),
            Some("todoId")
        );
        assert_eq!(
            junction.relationship("user").unwrap().foreign_key_into("User"),
            Some("userId")
        );

        for (schema, fk) in [("Todo", "todoId"), ("User", "userId")] {
            assert_eq!(
                map.get(schema).unwrap().relationship("todoUsers"),
                Some(&Relationship::HasMany {
                    target_schema: "TodoUser".into(),
                    source_attribute: "id".into(),
                    target_attribute: fk.into(),
                })
            );
        }

        assert_eq!(
            map.get("User").unwrap().relationship("todos"),
            Some(&Relationship::HasManyThrough {
                target_schema: "Todo".into(),
                through: "TodoUser".into(),
                through_source_attribute: "userId".into(),
                through_target_attribute: "todoId".into(),
                source_key: "id".into(),
                target_key: "id".into(),
            })
        );
    }

    #[test]
    fn test_junction_name_follows_first_declaration() {
        let map = build(vec![
            PartialSchema::new("User").with_relationship("todos", has_many().through()),
            PartialSchema::new("Todo"),
        ])
        .unwrap();

        assert!(map.contains_key("UserTodo"));
        assert!(map.get("Todo").unwrap().relationship("userTodos").is_some());
    }

    #[test]
    fn test_namespace_of_first_participant() {
        let map = build(vec![
            PartialSchema::new("Todo")
                .in_namespace("app")
                .with_relationship("tags", has_many().through().target("Tag")),
            PartialSchema::new("Tag"),
        ])
        .unwrap();

        let junction = map.get("app_TodoTag").unwrap();
        assert_eq!(junction.namespace.as_deref(), Some("app"));
        assert_eq!(junction.table_name, "app_TodoTags");
    }

    #[test]
    fn test_self_through_rejected() {
        let err = build(vec![
            PartialSchema::new("User").with_relationship("friends", has_many().target("User").through())
        ])
        .unwrap_err();
        assert!(matches!(err, InvalidSchemaError::SelfThrough { .. }));
    }

    #[test]
    fn test_ambiguous_through_rejected() {
        let err = build(vec![
            PartialSchema::new("Todo")
                .with_relationship("users", has_many().through())
                .with_relationship("watchers", has_many().target("User").through()),
            PartialSchema::new("User"),
        ])
        .unwrap_err();
        assert_eq!(
            err,
            InvalidSchemaError::AmbiguousThrough {
                schema: "Todo".into(),
                target: "User".into(),
                first: "users".into(),
                second: "watchers".into(),
            }
        );
    }

    #[test]
    fn test_junction_collision() {
        let err = build(vec![
            PartialSchema::new("Todo").with_relationship("users", has_many().through()),
            PartialSchema::new("User"),
            PartialSchema::new("TodoUser"),
        ])
        .unwrap_err();
        assert_eq!(err, InvalidSchemaError::JunctionCollision("TodoUser".into()));
    }
}
