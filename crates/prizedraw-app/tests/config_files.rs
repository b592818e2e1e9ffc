// Checks on the shipped default config files.

#[test]
fn default_config_is_valid_toml() {
    let content = std::fs::read_to_string("defaults/prizedraw.toml")
        .expect("defaults/prizedraw.toml should exist");
    let parsed: Result<toml::Value, _> = toml::from_str(&content);
    assert!(parsed.is_ok(), "defaults/prizedraw.toml is not valid TOML: {:?}", parsed.err());
}

#[test]
fn example_config_is_valid_toml() {
    let content = std::fs::read_to_string("defaults/prizedraw.toml.example")
        .expect("defaults/prizedraw.toml.example should exist");
    let parsed: Result<toml::Value, _> = toml::from_str(&content);
    assert!(
        parsed.is_ok(),
        "defaults/prizedraw.toml.example is not valid TOML: {:?}",
        parsed.err()
    );
}

#[test]
fn default_config_draws_five() {
    let content = std::fs::read_to_string("defaults/prizedraw.toml").unwrap();
    let config: toml::Value = toml::from_str(&content).unwrap();
    let draw = config.get("draw").expect("draw section should exist");
    assert_eq!(draw.get("winners").unwrap().as_integer().unwrap(), 5);
    assert_eq!(draw.get("exclusion").unwrap().as_str().unwrap(), "row");
}
