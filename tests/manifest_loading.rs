//! Integration tests for the TOML inputs: crate manifests, catalogs and defaults

use data_access_wiring::{
    Catalog, ConfigValue, CrateContext, DataAccessConfiguration, MemoryStore, WiringConfig,
};
use pretty_assertions::assert_eq;

const SHOP: &str = include_str!("fixtures/shop.toml");
const DEFAULTS: &str = include_str!("fixtures/defaults.toml");
const MINIMAL_CATALOG: &str = include_str!("fixtures/minimal_catalog.toml");

#[test]
fn test_manifest_drives_expansion() {
    let context = CrateContext::from_str(SHOP).expect("Should parse manifest");
    let mut store = MemoryStore::new();
    DataAccessConfiguration::new()
        .apply(&context, &mut store)
        .expect("Should apply");

    let uows = store.parameter("unit_of_works").expect("uows registered");
    assert_eq!(
        uows.get_path("customer::domain_event::event_source::unit_of_work.dependencies.aggregate_root_type")
            .and_then(ConfigValue::as_str),
        Some("acme::shop::customer::CustomerAccountRootType")
    );

    let finders = store.parameter("finders").expect("finders registered");
    assert_eq!(
        finders
            .get_path("customer::projection.standard::view_store::finder.settings.type")
            .and_then(ConfigValue::as_str),
        Some("acme_corp-web_shop-customer_account-standard")
    );
}

#[test]
fn test_defaults_are_extended() {
    let context = CrateContext::from_str(SHOP).expect("Should parse manifest");
    let mut store = MemoryStore::from_str(DEFAULTS).expect("Should parse defaults");
    DataAccessConfiguration::new()
        .apply(&context, &mut store)
        .expect("Should apply");

    let readers = store.parameter("storage_readers").expect("readers registered");
    assert_eq!(
        readers.get_path("acme::audit::reader.settings.rotate"),
        Some(&ConfigValue::Bool(true))
    );
    // 1 default + 2 crate readers + 3 readers for each of 2 resources
    assert_eq!(readers.len(), 9);

    let services = store.parameter("query_services").expect("services registered");
    let keys: Vec<&str> = services.keys().collect();
    assert_eq!(
        keys,
        vec![
            "acme::search::query_service",
            "customer::query_service",
            "order::query_service",
        ]
    );
}

#[test]
fn test_replacement_catalog() {
    let context = CrateContext::from_str(SHOP).expect("Should parse manifest");
    let catalog = Catalog::from_str(MINIMAL_CATALOG).expect("Should parse catalog");
    let mut store = MemoryStore::new();
    DataAccessConfiguration::with_config(WiringConfig::new().with_catalog(catalog))
        .apply(&context, &mut store)
        .expect("Should apply");

    let writers = store.parameter("storage_writers").expect("writers registered");
    assert_eq!(
        writers
            .get_path("acme::log::writer.settings.path")
            .and_then(ConfigValue::as_str),
        Some("acme_corp/web_shop.log")
    );

    // families missing from the catalog still register, empty
    assert_eq!(store.parameter("unit_of_works").map(|p| p.len()), Some(0));

    let finders = store.parameter("finders").expect("finders registered");
    assert_eq!(
        finders
            .get_path("order::finder.dependencies.root")
            .and_then(ConfigValue::as_str),
        Some("acme::shop::order::OrderRootType")
    );
}

#[test]
fn test_output_formats() {
    let context = CrateContext::from_str(SHOP).expect("Should parse manifest");
    let mut store = MemoryStore::new();
    DataAccessConfiguration::new()
        .apply(&context, &mut store)
        .expect("Should apply");

    let finders = store.subset("finders").expect("finders registered");

    let toml_text = finders.to_toml_string().expect("Should write TOML");
    let reparsed = MemoryStore::from_str(&toml_text).expect("Should reparse TOML");
    assert_eq!(reparsed, finders);

    let json_text = finders.to_json_string().expect("Should write JSON");
    let json: serde_json::Value = serde_json::from_str(&json_text).expect("valid JSON");
    assert_eq!(
        json["finders"]["order::projection.standard::view_store::finder"]["settings"]
            ["log_search_query"],
        serde_json::Value::Bool(false)
    );
}
