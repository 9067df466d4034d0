//! One-time normalization of saved worlds written by older builds.
//!
//! Recovers legacy shapes in a raw JSON payload, then rebuilds what the
//! household records imply. Nothing already recorded is dropped: field
//! spellings are renamed, list-shaped registries become maps, missing ids
//! are allocated and missing kinship edges are added.

use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::error::{SimError, SimResult};
use crate::household;
use crate::kinship::{self, KinshipGraph};
use crate::model::{SCHEMA_VERSION, WorldState};

const EDGE_ALIASES: &[(&str, &str)] = &[
    ("type", "kind"),
    ("relation", "kind"),
    ("parent", "from"),
    ("child", "to"),
    ("a", "from"),
    ("b", "to"),
    ("since", "since_turn"),
];

const PERSON_ALIASES: &[(&str, &str)] = &[
    ("is_alive", "alive"),
    ("gender", "sex"),
    ("house_id", "house"),
    ("is_married", "married"),
];

const HOUSE_ALIASES: &[(&str, &str)] = &[("head_id", "head"), ("spouse_id", "spouse")];

/// Normalize `payload` into the current layout and load it.
pub fn migrate(mut payload: Value) -> SimResult<WorldState> {
    let root = payload
        .as_object_mut()
        .ok_or_else(|| SimError::Migration("world payload is not an object".into()))?;
    let version = root
        .get("schema_version")
        .and_then(Value::as_u64)
        .unwrap_or(1);
    let mut recovered = Vec::new();

    let mut max_id = 0;
    for (key, aliases) in [("persons", PERSON_ALIASES), ("houses", HOUSE_ALIASES)] {
        let registry = root.remove(key).unwrap_or_else(|| Value::Object(Map::new()));
        let (map, fixes, top) = registry_to_map(key, registry, max_id, aliases)?;
        max_id = max_id.max(top);
        recovered.extend(fixes);
        root.insert(key.to_string(), Value::Object(map));
    }
    if let Some(Value::Object(persons)) = root.get_mut("persons") {
        for person in persons.values_mut() {
            recovered.extend(normalize_person(person));
        }
    }
    if let Some(Value::Array(edges)) = root.get_mut("kinship") {
        for edge in edges.iter_mut() {
            recovered.extend(normalize_edge(edge)?);
        }
    }

    if !root.contains_key("ids") {
        let mut ids = Map::new();
        ids.insert("next".into(), Value::from(max_id + 1));
        root.insert("ids".into(), Value::Object(ids));
        recovered.push("id generator rebuilt".to_string());
    }
    if version < u64::from(SCHEMA_VERSION) {
        recovered.push(format!("schema {version} upgraded to {SCHEMA_VERSION}"));
    }
    root.insert("schema_version".into(), Value::from(SCHEMA_VERSION));

    let mut world: WorldState = serde_json::from_value(payload)
        .map_err(|e| SimError::Migration(format!("payload does not load: {e}")))?;
    world.ids.bump_past(max_id);
    let added = kinship::sync_household(&mut world)?;
    if added > 0 {
        recovered.push(format!("{added} kinship edges restored from household records"));
    }
    household::recompute_heirs(&mut world)?;
    KinshipGraph::of(&world).assert_spouse_exclusivity()?;

    for shape in &recovered {
        warn!(shape = shape.as_str(), "recovered legacy shape");
    }
    info!(
        from = version,
        to = SCHEMA_VERSION,
        recovered = recovered.len(),
        "world migrated"
    );
    Ok(world)
}

fn rename_fields(object: &mut Map<String, Value>, aliases: &[(&str, &str)]) -> Vec<String> {
    let mut fixes = Vec::new();
    for (old, new) in aliases {
        if object.contains_key(*new) {
            continue;
        }
        if let Some(value) = object.remove(*old) {
            object.insert((*new).to_string(), value);
            fixes.push(format!("field `{old}` renamed to `{new}`"));
        }
    }
    fixes
}

/// A registry stored either as a list of records or as a map keyed by id.
/// Records without an id get one above every id seen so far. Returns the
/// map, the recovered shapes and the highest id in use.
fn registry_to_map(
    key: &str,
    registry: Value,
    floor: u64,
    aliases: &[(&str, &str)],
) -> SimResult<(Map<String, Value>, Vec<String>, u64)> {
    let mut fixes = Vec::new();
    let records: Vec<Value> = match registry {
        Value::Array(list) => {
            fixes.push(format!("{key} list converted to a map"));
            list
        }
        Value::Object(map) => map.into_iter().map(|(_, v)| v).collect(),
        Value::Null => Vec::new(),
        other => {
            return Err(SimError::Migration(format!(
                "{key} is neither a list nor a map: {other}"
            )));
        }
    };

    let mut objects = Vec::with_capacity(records.len());
    for record in records {
        let Value::Object(mut object) = record else {
            return Err(SimError::Migration(format!("{key} entry is not an object")));
        };
        fixes.extend(rename_fields(&mut object, aliases));
        objects.push(object);
    }

    let mut top = objects
        .iter()
        .filter_map(|o| o.get("id").and_then(Value::as_u64))
        .fold(floor, u64::max);
    let mut map = Map::new();
    for mut object in objects {
        let id = match object.get("id").and_then(Value::as_u64) {
            Some(id) => id,
            None => {
                top += 1;
                object.insert("id".into(), Value::from(top));
                fixes.push(format!("{key} record given id {top}"));
                top
            }
        };
        map.insert(id.to_string(), Value::Object(object));
    }
    Ok((map, fixes, top))
}

fn normalize_person(person: &mut Value) -> Vec<String> {
    let Some(object) = person.as_object_mut() else {
        return Vec::new();
    };
    let mut fixes = Vec::new();
    if let Some(Value::String(sex)) = object.get("sex") {
        let canonical = match sex.to_ascii_lowercase().as_str() {
            "m" | "male" => Some("male"),
            "f" | "female" => Some("female"),
            _ => None,
        };
        if let Some(canonical) = canonical.filter(|c| c != sex) {
            fixes.push(format!("sex `{sex}` read as `{canonical}`"));
            object.insert("sex".into(), Value::from(canonical));
        }
    }
    if !object.contains_key("alive") {
        object.insert("alive".into(), Value::Bool(true));
        fixes.push("missing alive flag read as living".to_string());
    }
    fixes
}

fn canonical_kind(kind: &str) -> Option<&'static str> {
    let folded: String = kind
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_lowercase();
    match folded.as_str() {
        "parentof" | "parent" => Some("parent_of"),
        "spouseof" | "spouse" | "married" | "marriage" => Some("spouse_of"),
        _ => None,
    }
}

fn normalize_edge(edge: &mut Value) -> SimResult<Vec<String>> {
    let Some(object) = edge.as_object_mut() else {
        return Err(SimError::Migration("kinship edge is not an object".into()));
    };
    let mut fixes = rename_fields(object, EDGE_ALIASES);
    let kind = object
        .get("kind")
        .and_then(Value::as_str)
        .ok_or_else(|| SimError::Migration("kinship edge has no kind".into()))?
        .to_string();
    let canonical = canonical_kind(&kind)
        .ok_or_else(|| SimError::Migration(format!("unknown kinship kind `{kind}`")))?;
    if canonical != kind {
        fixes.push(format!("kinship kind `{kind}` read as `{canonical}`"));
        object.insert("kind".into(), Value::from(canonical));
    }

    if canonical == "spouse_of" {
        let from = object.get("from").and_then(Value::as_u64);
        let to = object.get("to").and_then(Value::as_u64);
        if let (Some(from), Some(to)) = (from, to)
            && from > to
        {
            object.insert("from".into(), Value::from(to));
            object.insert("to".into(), Value::from(from));
            fixes.push("spousal edge endpoints reordered".to_string());
        }
    }
    Ok(fixes)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::id::{HouseId, PersonId};
    use crate::model::{KinshipKind, Sex};

    fn legacy() -> Value {
        json!({
            "seed": 8,
            "turn": 4,
            "persons": [
                {"id": 3, "name": "Aldric Vane", "gender": "M", "age": 41, "is_alive": true, "house_id": 1},
                {"id": 4, "name": "Mira Vane", "gender": "female", "age": 37, "house_id": 1},
                {"id": 6, "name": "Tom Vane", "sex": "male", "age": 9, "house_id": 1},
                {"name": "Ser Hollis", "sex": "male", "age": 50}
            ],
            "houses": [
                {"id": 1, "name": "Vane", "tier": "minor", "is_player": true,
                 "head_id": 3, "spouse_id": 4, "children": [6]},
                {"id": 2, "name": "Corve", "tier": "great"}
            ],
            "kinship": [
                {"type": "married", "a": 4, "b": 3}
            ],
            "estate": {
                "coin": 12, "bushels": 90, "population": 25,
                "farmers": 15, "builders": 3, "unrest": 20
            },
            "player_house": 1,
            "liege_house": 2
        })
    }

    #[test]
    fn legacy_world_loads() {
        let world = migrate(legacy()).unwrap();
        assert_eq!(world.schema_version, SCHEMA_VERSION);
        assert_eq!(world.persons.len(), 4);
        let mira = world.person(PersonId(4)).unwrap();
        assert_eq!(mira.sex, Sex::Female);
        assert!(mira.alive);
        assert_eq!(mira.house, Some(HouseId(1)));
        assert!(world.persons.contains_key(&PersonId(7)));
    }

    #[test]
    fn kinship_is_kept_and_completed() {
        let world = migrate(legacy()).unwrap();
        let spousal: Vec<_> = world
            .kinship
            .iter()
            .filter(|e| e.kind == KinshipKind::SpouseOf)
            .collect();
        assert_eq!(spousal.len(), 1);
        assert_eq!((spousal[0].from, spousal[0].to), (PersonId(3), PersonId(4)));
        let graph = KinshipGraph::of(&world);
        assert_eq!(graph.parents(PersonId(6)), vec![PersonId(3), PersonId(4)]);
        assert_eq!(world.player().unwrap().heir, Some(PersonId(6)));
    }

    #[test]
    fn new_ids_land_above_legacy_ones() {
        let mut world = migrate(legacy()).unwrap();
        assert!(world.ids.next_id() > 7);
    }

    #[test]
    fn current_payload_is_unchanged() {
        let world = crate::testutil::small_world(2);
        let payload = serde_json::to_value(&world).unwrap();
        assert_eq!(migrate(payload).unwrap(), world);
    }

    #[test]
    fn unknown_kind_is_an_error() {
        let mut payload = legacy();
        payload["kinship"] = json!([{"kind": "cousin_of", "from": 3, "to": 6}]);
        assert!(matches!(migrate(payload), Err(SimError::Migration(_))));
    }
}
