//! Loading catalogs and group definitions from JSON files, then spawning

use item_groups::{GroupRegistry, ItemTypeCatalog, LoadError, LoadResult, SpawnError, TimePoint};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fs;
use tempfile::TempDir;

const ITEMS: &str = r#"[
    { "id": "knife" },
    { "id": "rope" },
    { "id": "shirt", "flags": ["VARSIZE"] },
    { "id": "canteen", "category": "container", "container_capacity": 6 },
    { "id": "water", "liquid": true, "count_by_charges": true, "default_container": "canteen" },
    { "id": "flashlight", "category": "tool", "ammo_types": ["battery"],
      "ammo_default": "battery", "ammo_capacity": 100 },
    { "id": "battery", "category": "ammo", "count_by_charges": true },
    { "id": "pistol", "category": "gun", "ammo_types": ["9mm"], "ammo_default": "9mm_fmj",
      "magazine_default": "pistol_mag", "flags": ["NON_FOULING"] },
    { "id": "pistol_mag", "category": "magazine", "ammo_types": ["9mm"], "ammo_capacity": 15 },
    { "id": "9mm_fmj", "category": "ammo", "count_by_charges": true }
]"#;

const GROUPS: &str = r#"[
    { "id": "survival_kit", "subtype": "collection",
      "items": ["knife", ["rope", 100]],
      "entries": [
        { "item": "water" },
        { "item": "flashlight", "charges": [20, 20], "custom-flags": ["SPARE"] },
        { "group": "sidearm", "prob": 100 }
      ] },
    { "id": "sidearm", "subtype": "distribution", "magazine": 100, "ammo": 100,
      "items": ["pistol"] },
    { "id": "laundry", "subtype": "distribution",
      "entries": [{ "item": "shirt", "count": 3, "contents-group": ["knife"] }] },
    { "id": "dangling", "items": ["spork"], "groups": ["nowhere"] }
]"#;

fn write_fixtures() -> LoadResult<(TempDir, ItemTypeCatalog, GroupRegistry)> {
    let dir = tempfile::tempdir()?;
    let items_path = dir.path().join("items.json");
    let groups_path = dir.path().join("groups.json");
    fs::write(&items_path, ITEMS)?;
    fs::write(&groups_path, GROUPS)?;

    let catalog = ItemTypeCatalog::load_file(&items_path)?;
    let mut registry = GroupRegistry::new();
    registry.load_file(&groups_path)?;
    Ok((dir, catalog, registry))
}

#[test]
fn test_load_and_spawn_survival_kit() -> LoadResult<()> {
    let (_dir, catalog, registry) = write_fixtures()?;
    assert_eq!(catalog.len(), 10);
    // laundry mints one anonymous contents group
    assert_eq!(registry.len(), 5);

    let mut rng = StdRng::seed_from_u64(12345);
    let kit = registry.items_from_at(&catalog, "survival_kit", TimePoint(10), &mut rng);
    let ids: Vec<&str> = kit.iter().map(|item| item.type_id()).collect();
    assert_eq!(ids, vec!["knife", "rope", "canteen", "flashlight", "pistol"]);

    let canteen = &kit[2];
    assert_eq!(canteen.contents()[0].type_id(), "water");
    assert_eq!(canteen.contents()[0].charges, 6);

    let flashlight = &kit[3];
    assert_eq!(flashlight.charges, 20);
    assert_eq!(flashlight.ammo_data(), Some("battery"));
    assert!(flashlight.has_flag("SPARE"));

    let pistol = &kit[4];
    let magazine = pistol.magazine_current().expect("magazine chance is 100");
    assert_eq!(magazine.type_id(), "pistol_mag");
    assert_eq!(magazine.ammo_remaining(), 15);
    assert!(pistol.faults.is_empty());
    Ok(())
}

#[test]
fn test_count_and_contents_group() -> LoadResult<()> {
    let (_dir, catalog, registry) = write_fixtures()?;
    let mut rng = StdRng::seed_from_u64(77);

    let laundry = registry.items_from(&catalog, "laundry", &mut rng);
    assert_eq!(laundry.len(), 3);
    for shirt in &laundry {
        assert_eq!(shirt.type_id(), "shirt");
        assert_eq!(shirt.contents().len(), 1);
        assert_eq!(shirt.contents()[0].type_id(), "knife");
    }
    Ok(())
}

#[test]
fn test_consistency_report() -> LoadResult<()> {
    let (_dir, catalog, registry) = write_fixtures()?;
    let errors = registry.check_consistency(&catalog);

    assert_eq!(
        errors,
        vec![
            SpawnError::UnknownItem {
                id: "spork".to_string(),
                context: "item in dangling".to_string(),
            },
            SpawnError::UnknownGroup {
                id: "nowhere".to_string(),
                context: "item in dangling".to_string(),
            },
        ]
    );
    Ok(())
}

#[test]
fn test_queries_and_mutation() -> LoadResult<()> {
    let (_dir, _catalog, mut registry) = write_fixtures()?;

    assert!(registry.group_contains_item("survival_kit", "pistol"));
    let every = registry.every_possible_item_from("survival_kit");
    assert_eq!(every.len(), 5);
    assert!(!every.contains("canteen"));

    registry.replace_item("pistol", "revolver");
    assert!(registry.group_contains_item("survival_kit", "revolver"));

    registry.remove_item("revolver");
    assert!(!registry.group_contains_item("survival_kit", "revolver"));
    assert!(registry.every_possible_item_from("sidearm").is_empty());
    Ok(())
}

#[test]
fn test_spawned_items_serialize() -> LoadResult<()> {
    let (_dir, catalog, registry) = write_fixtures()?;
    let mut rng = StdRng::seed_from_u64(1);

    let kit = registry.items_from(&catalog, "survival_kit", &mut rng);
    let json = serde_json::to_value(&kit)?;
    assert_eq!(json[0]["type"], "knife");
    assert_eq!(json[2]["contents"][0]["type"], "water");
    Ok(())
}

#[test]
fn test_malformed_files_are_errors() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("groups.json");

    fs::write(&path, "{ not json").unwrap();
    let mut registry = GroupRegistry::new();
    assert!(matches!(registry.load_file(&path), Err(LoadError::Serde(_))));

    fs::write(&path, r#"{ "id": "not_an_array" }"#).unwrap();
    assert!(matches!(registry.load_file(&path), Err(LoadError::InvalidDefinition(_))));

    fs::write(&path, r#"[{ "id": "bad", "entries": [{ "prob": 5 }] }]"#).unwrap();
    assert!(matches!(registry.load_file(&path), Err(LoadError::InvalidDefinition(_))));

    assert!(matches!(
        ItemTypeCatalog::load_file(&dir.path().join("absent.json")),
        Err(LoadError::Io(_))
    ));
}
