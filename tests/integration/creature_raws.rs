//! Integration tests over a creature raws file.
//!
//! Object lookup, property scans bounded by the next creature, and edits
//! written back to disk.

use raws_query::filter::{Filter, TokenFilter};
use raws_query::query::{PropDictOptions, Queryable};
use raws_query::{ObjectHeaders, RawFile, Token, WriteResult};
use std::fs;
use tempfile::TempDir;

const CREATURE_STANDARD: &str = "creature_standard

[OBJECT:CREATURE]

[CREATURE:DOG]
\t[DESCRIPTION:A small domestic animal.]
\t[NAME:dog:dogs:canine]
\t[CASTE_NAME:dog:dogs:canine]
\t[PET]
\t[BODY_SIZE:0:0:1000]
\t[BODY_SIZE:1:0:15000]
\t[BODY_SIZE:2:0:30000]
\t[CASTE:FEMALE]
\t\t[FEMALE]
\t[CASTE:MALE]
\t\t[MALE]

[CREATURE:CAT]
\t[NAME:cat:cats:feline]
\t[PET]
\t[BODY_SIZE:0:0:500]
\t[BODY_SIZE:1:0:5000]

[CREATURE:TOAD]
\t[NAME:toad:toads:toad]
\t[BODY_SIZE:0:0:50]
";

fn setup_raws() -> (TempDir, std::path::PathBuf) {
    let dir = TempDir::new().unwrap();
    let objects = dir.path().join("raw").join("objects");
    fs::create_dir_all(&objects).unwrap();
    let path = objects.join("creature_standard.txt");
    fs::write(&path, CREATURE_STANDARD).unwrap();
    (dir, path)
}

fn value(v: &str) -> Filter {
    TokenFilter::new().exact_value(v).into()
}

fn creature(id: &str) -> Filter {
    TokenFilter::new().exact_value("CREATURE").exact_arg(0, id).into()
}

#[test]
fn test_creatures_and_header() {
    let (_dir, path) = setup_raws();
    let file = RawFile::read(&path).unwrap();

    assert_eq!(file.header(), Some("creature_standard"));
    let ids: Vec<String> = file
        .all(value("CREATURE"))
        .iter()
        .map(|t| t.args[0].clone())
        .collect();
    assert_eq!(ids, ["DOG", "CAT", "TOAD"]);
    assert!(file.contains_pretty("OBJECT:CREATURE").unwrap());
}

#[test]
fn test_props_bounded_by_next_creature() {
    let (_dir, path) = setup_raws();
    let file = RawFile::read(&path).unwrap();
    let table = ObjectHeaders::default();

    let dog = file.get(creature("DOG")).unwrap();
    let sizes = dog.all_prop(&table, value("BODY_SIZE"));
    assert_eq!(sizes.len(), 3);
    assert_eq!(dog.get_last_prop(&table, value("BODY_SIZE")).unwrap().args[2], "30000");

    // CASTE is not an object type, so it does not end the creature
    assert!(dog.get_prop(&table, value("MALE")).is_some());

    let cat = file.get(creature("CAT")).unwrap();
    assert_eq!(cat.all_prop(&table, value("BODY_SIZE")).len(), 2);
    assert!(cat.get_prop(&table, value("CASTE")).is_none());

    // The last creature runs to the end of the file
    let toad = file.get(creature("TOAD")).unwrap();
    assert_eq!(toad.following().list().len(), 2);
    assert_eq!(toad.all_prop(&table, Filter::any_token()).len(), 2);
}

#[test]
fn test_prop_dict_per_creature() {
    let (_dir, path) = setup_raws();
    let file = RawFile::read(&path).unwrap();
    let table = ObjectHeaders::default();
    let options = PropDictOptions {
        always_list: false,
        full_keys: false,
        ..PropDictOptions::default()
    };

    let dog = file.get(creature("DOG")).unwrap();
    let dict = dog.prop_dict(&table, options, Filter::any_token());
    assert_eq!(dict["BODY_SIZE"].tokens().len(), 3);
    assert_eq!(dict["PET"].tokens().len(), 1);
    assert!(!dict.contains_key("CREATURE"));

    let cat = file.get(creature("CAT")).unwrap();
    let dict = cat.prop_dict(&table, options, Filter::any_token());
    assert_eq!(dict.keys().collect::<Vec<_>>(), ["BODY_SIZE", "NAME", "PET"]);
}

#[test]
fn test_remove_pet_from_dog_only() {
    let (_dir, path) = setup_raws();
    let mut file = RawFile::read(&path).unwrap();
    let table = ObjectHeaders::default();

    let dog = file.get(creature("DOG")).unwrap().id();
    let removed = file.tokens_mut().remove_all_prop(dog, &table, value("PET"));
    assert_eq!(removed.len(), 1);

    let result = file.write().unwrap();
    assert!(matches!(result, WriteResult::Written { .. }));

    let reread = RawFile::read(&path).unwrap();
    let text = reread.to_string();
    assert_eq!(text.matches("[PET]").count(), 1);
    assert!(text.contains("\t[CASTE_NAME:dog:dogs:canine]\n\t[BODY_SIZE:0:0:1000]"));

    let cat = reread.get(creature("CAT")).unwrap();
    assert!(cat.get_prop(&table, value("PET")).is_some());
}

#[test]
fn test_insert_after_prop_and_write() {
    let (_dir, path) = setup_raws();
    let mut file = RawFile::read(&path).unwrap();
    let table = ObjectHeaders::default();

    let anchor = {
        let toad = file.get(creature("TOAD")).unwrap();
        toad.get_prop(&table, value("NAME")).unwrap().id()
    };
    let added = Token::with_args("PREFSTRING", ["warts"]).prefixed("\n\t");
    file.tokens_mut().insert_after(anchor, added).unwrap();

    let _ = file.write().unwrap();
    let text = fs::read_to_string(&path).unwrap();
    assert!(text.contains("\t[NAME:toad:toads:toad]\n\t[PREFSTRING:warts]\n\t[BODY_SIZE:0:0:50]\n"));
}

#[test]
fn test_unmodified_file_is_not_rewritten() {
    let (_dir, path) = setup_raws();
    let file = RawFile::read(&path).unwrap();
    assert!(!file.is_modified());
    assert!(matches!(file.write().unwrap(), WriteResult::Unchanged { .. }));
}
