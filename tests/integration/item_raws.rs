//! Integration tests over an item raws file.
//!
//! Sibling object types under one header, positional access and file
//! conversion.

use raws_query::filter::{Filter, TokenFilter};
use raws_query::query::{Item, ItemKey, Queryable, Until};
use raws_query::{BinFile, FileError, ObjectHeaders, RawFile};

const ITEM_WEAPON: &str = "item_weapon

[OBJECT:ITEM]

[ITEM_WEAPON:ITEM_WEAPON_CROSSBOW]
[NAME:crossbow:crossbows]
[SIZE:400]
[RANGED:CROSSBOW:BOLT]

[ITEM_AMMO:ITEM_AMMO_BOLTS]
[NAME:bolt:bolts]
[CLASS:BOLT]
[SIZE:150]

[ITEM_WEAPON:ITEM_WEAPON_AXE_BATTLE]
[NAME:battle axe:battle axes]
[SIZE:800]
";

fn value(v: &str) -> Filter {
    TokenFilter::new().exact_value(v).into()
}

fn parse() -> RawFile {
    RawFile::from_text("raw/objects/item_weapon.txt", ITEM_WEAPON).unwrap()
}

#[test]
fn test_sibling_object_types_bound_props() {
    let file = parse();
    let table = ObjectHeaders::default();

    let crossbow = file.get(Filter::pretty("ITEM_WEAPON:ITEM_WEAPON_CROSSBOW").unwrap()).unwrap();
    let sizes = crossbow.all_prop(&table, value("SIZE"));
    assert_eq!(sizes.len(), 1);
    assert_eq!(sizes[0].args[0], "400");
    assert!(crossbow.get_prop(&table, value("CLASS")).is_none());

    let bolts = file.get(value("ITEM_AMMO")).unwrap();
    assert_eq!(bolts.get_prop(&table, value("SIZE")).unwrap().args[0], "150");
}

#[test]
fn test_custom_table_merges_sections() {
    let file = parse();
    let mut table = ObjectHeaders::default();
    // Ammo no longer shares a header with weapons
    table.insert("AMMO", ["ITEM_AMMO"]);

    let crossbow = file.get(value("ITEM_WEAPON")).unwrap();
    assert_eq!(crossbow.all_prop(&table, value("SIZE")).len(), 2);
}

#[test]
fn test_until_next_object() {
    let file = parse();
    let halt = || TokenFilter::new().value_in(["ITEM_WEAPON", "ITEM_AMMO"]);

    let crossbow = file.get(value("ITEM_WEAPON")).unwrap();
    let names = crossbow
        .following()
        .all_until(Until::new(halt(), value("NAME")));
    assert_eq!(names.len(), 1);

    let span = crossbow.following().until(halt());
    assert_eq!(span.last().unwrap().value, "ITEM_AMMO");
    assert_eq!(span.len(), 4);
}

#[test]
fn test_item_keys_on_file() {
    let file = parse();
    let keys: Vec<ItemKey> = ["0", "-1", "1..3", "NAME"]
        .iter()
        .map(|k| k.parse().unwrap())
        .collect();

    let pretty: Vec<String> = file.items(&keys).unwrap().iter().map(|t| t.pretty()).collect();
    assert_eq!(
        pretty,
        [
            "OBJECT:ITEM",
            "SIZE:800",
            "ITEM_WEAPON:ITEM_WEAPON_CROSSBOW",
            "NAME:crossbow:crossbows",
            "SIZE:400",
            "NAME:crossbow:crossbows",
        ]
    );

    match file.item(&ItemKey::All).unwrap() {
        Item::Many(tokens) => assert_eq!(tokens.len(), file.tokens().len()),
        Item::One(_) => panic!("expected every token"),
    }
    assert!(matches!(
        file.item(&"NAME:sword".parse().unwrap()).unwrap(),
        Item::One(None)
    ));
}

#[test]
fn test_bin_file_conversion() {
    let bin = BinFile::new("raw/objects/item_weapon.txt", ITEM_WEAPON.as_bytes());
    let raw = bin.to_raw().unwrap();
    assert_eq!(raw.to_string(), ITEM_WEAPON);
    assert_eq!(raw.header(), Some("item_weapon"));

    let png = BinFile::new("raw/graphics/tiles.png", vec![0x89, 0x50, 0x4e, 0x47, 0xff]);
    assert!(matches!(png.to_raw(), Err(FileError::InvalidConversion { .. })));
}
