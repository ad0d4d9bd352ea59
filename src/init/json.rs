use crate::simulation::*;
use json::{self, JsonValue};
use std::{fs::File, io::Read, path::Path};

macro_rules! get_json {
    ($json:ident,$($key:literal),+, $func:ident) => {
            get_json!($json$([$key])+, concat!($("/",$key),+), $func)
    };

    ($value:expr, $key:expr, $func:ident) => {
        $value
            .$func()
            .ok_or(concat!("Couldn't find ", $key))?
    };
}

macro_rules! json_value_or_err {
    ($json:ident,$($key:literal),+) => {
            {
                let value = &$json$([$key])+;
                if value.is_null() {
                    Err(concat!("Lacking", concat!($("/",$key),+), " key"))
                }else{
                    Ok(value)
                }
            }
    };
}

/// Optional numeric field, `default` when absent.
macro_rules! f64_or {
    ($json:ident, $key:literal, $default:expr) => {{
        let value = &$json[$key];
        if value.is_null() {
            $default
        } else {
            value
                .as_f64()
                .ok_or(concat!("Field /", $key, " has to be numeric"))?
        }
    }};
}

pub fn parse_scene<P: AsRef<Path>>(scene_file_path: P) -> Result<Scene, String> {
    let scene_json = read_json(scene_file_path.as_ref())?;
    scene_from_json(&scene_json)
}

pub fn parse_from_string(scene: &str) -> Result<Scene, String> {
    let scene_json = json::parse(scene).map_err(|e| format!("Json error: {e}"))?;
    scene_from_json(&scene_json)
}

fn scene_from_json(scene_json: &JsonValue) -> Result<Scene, String> {
    let mut scene = Scene::new();
    scene.spawn(Entity::terrain(parse_terrain(json_value_or_err!(
        scene_json, "Terrain"
    )?)?));
    for (n, entity_json) in scene_json["Entities"].members().enumerate() {
        let entity = parse_entity(entity_json).map_err(|e| format!("Entity {n}: {e}"))?;
        scene.spawn(entity);
    }
    Ok(scene)
}

fn read_json(file_path: &Path) -> Result<JsonValue, String> {
    let mut file_content = String::new();
    let mut file = File::open(file_path)
        .map_err(|e| format!("Error while opening file {}: {e}", file_path.display()))?;

    file.read_to_string(&mut file_content)
        .map_err(|e| format!("Failed to read file: {e}"))?;
    json::parse(&file_content).map_err(|e| format!("Json error: {e}"))
}

fn parse_points(points_array: &JsonValue, err_str: &str) -> Result<Vec<Vector2>, String> {
    points_array
        .members()
        .map(|point_json| -> Result<Vector2, String> {
            let x = point_json[0].as_f64().ok_or(err_str)?;
            let y = point_json[1].as_f64().ok_or(err_str)?;
            Ok(Vector2::new(x, y))
        })
        .collect()
}

fn parse_terrain(terrain_array: &JsonValue) -> Result<Terrain, String> {
    Terrain::from_points(parse_points(
        terrain_array,
        "Terrain has to contain numeric landpoints",
    )?)
}

fn parse_kind(name: &str) -> Result<EntityKind, String> {
    EntityKind::from_name(name).ok_or(format!("Unknown entity kind {name}"))
}

fn parse_entity(json: &JsonValue) -> Result<Entity, String> {
    let kind = parse_kind(get_json!(json, "Kind", as_str))?;
    if kind == EntityKind::Terrain {
        return Err("Terrain belongs in the /Terrain key".to_string());
    }

    let position = Kinematic::at(Vector2::new(
        get_json!(json, "X", as_f64),
        get_json!(json, "Y", as_f64),
    ))
    .with_velocity(Vector2::new(f64_or!(json, "VX", 0.), f64_or!(json, "VY", 0.)))
    .with_acceleration(Vector2::new(f64_or!(json, "AX", 0.), f64_or!(json, "AY", 0.)))
    .with_drag(non_negative(f64_or!(json, "Drag", 0.), "Drag")?);

    let entity = if json["Shape"].is_null() {
        Entity::point(kind, position.value)
    } else {
        let vertices = parse_points(&json["Shape"], "Shape has to contain numeric vertices")?;
        let closed = json["Closed"].as_bool().unwrap_or(true);
        let shape = if closed {
            Shape::polygon(vertices)
        } else {
            Shape::polyline(vertices)
        };
        Entity::polygon(kind, shape, position.value).with_rotation(
            Kinematic::at(f64_or!(json, "Rotation", 0.))
                .with_velocity(f64_or!(json, "RotationSpeed", 0.)),
        )
    }
    .with_position(position);

    let collides_with = if json["CollidesWith"].is_null() {
        LandingRules::targets(kind).to_vec()
    } else {
        json["CollidesWith"]
            .members()
            .map(|name| -> Result<EntityKind, String> {
                parse_kind(name.as_str().ok_or("CollidesWith has to list kind names")?)
            })
            .collect::<Result<Vec<_>, String>>()?
    };
    let entity = entity.with_collides_with(collides_with);

    Ok(match json["Expires"].as_f64() {
        Some(expires_at) => entity.with_expiry(expires_at),
        None => entity,
    })
}

fn non_negative(value: f64, name: &str) -> Result<f64, String> {
    if value >= 0. {
        Ok(value)
    } else {
        Err(format!("{name} can't be negative, got {value}"))
    }
}

#[cfg(test)]
mod json_tests {
    use super::*;

    const SCENE: &str = r#"{
        "Terrain": [[0,100],[1000,500],[1500,100],[3000,100]],
        "Entities": [
            {
                "Kind": "Craft",
                "X": 2000, "Y": 800,
                "VY": -20, "AY": -74,
                "Shape": [[-10,-10],[10,-10],[10,10],[-10,10]],
                "Rotation": 0.1
            },
            { "Kind": "vapour", "X": 100, "Y": 900, "Drag": 0.01, "Expires": 3 }
        ]
    }"#;

    #[test]
    fn parses_terrain_and_entities() {
        let scene = parse_from_string(SCENE).unwrap();
        assert_eq!(scene.len(), 3);

        let kinds: Vec<_> = scene.iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![EntityKind::Terrain, EntityKind::Craft, EntityKind::Vapour]
        );

        let craft = scene.iter().nth(1).unwrap();
        assert_eq!(craft.pose.position.value, Vector2::new(2000., 800.));
        assert_eq!(craft.pose.position.velocity, Vector2::new(0., -20.));
        assert_eq!(craft.pose.angle(), 0.1);
        assert!(craft.collides_with.contains(&EntityKind::Terrain));
        assert!(matches!(&craft.outline, Outline::Polygon(s) if s.closed && s.len() == 4));

        let vapour = scene.iter().nth(2).unwrap();
        assert!(matches!(vapour.outline, Outline::Point));
        assert_eq!(vapour.expires_at, Some(3.));
        assert_eq!(vapour.pose.position.drag, 0.01);
    }

    #[test]
    fn missing_terrain() {
        assert!(parse_from_string(r#"{ "Entities": [] }"#).is_err());
    }

    #[test]
    fn unknown_kind() {
        let err = parse_from_string(
            r#"{ "Terrain": [[0,0],[1,0]], "Entities": [{ "Kind": "Rocket", "X": 0, "Y": 0 }] }"#,
        )
        .unwrap_err();
        assert!(err.contains("Rocket"), "{err}");
    }

    #[test]
    fn unsorted_terrain() {
        assert!(parse_from_string(r#"{ "Terrain": [[5,0],[1,0]] }"#).is_err());
    }

    #[test]
    fn negative_drag() {
        assert!(parse_from_string(
            r#"{ "Terrain": [[0,0],[1,0]], "Entities": [{ "Kind": "Vapour", "X": 0, "Y": 0, "Drag": -1 }] }"#,
        )
        .is_err());
    }
}
