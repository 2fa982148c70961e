//! Serialized configurations read back to the same configuration, in order.

use weft_config::{PluginOptions, WeftConfig, presets};

#[test]
fn classic_preset_survives_json() {
    let config = presets::classic().unwrap();
    let json = config.to_json_string().unwrap();
    let reparsed = WeftConfig::from_json_str(&json).unwrap();
    assert_eq!(reparsed, config);
}

#[test]
fn classic_preset_survives_toml() {
    let config = presets::classic().unwrap();
    let toml = config.to_toml_string().unwrap();
    let reparsed = WeftConfig::from_toml_str(&toml).unwrap();
    assert_eq!(reparsed, config);
}

#[test]
fn rule_and_plugin_order_is_preserved() {
    let config = presets::classic().unwrap();
    let reparsed = WeftConfig::from_toml_str(&config.to_toml_string().unwrap()).unwrap();

    let tests: Vec<_> = reparsed
        .module
        .rules
        .iter()
        .map(|r| r.test.as_str().to_string())
        .collect();
    assert_eq!(
        tests,
        vec![
            r"\.js$",
            r"\.(s*)css$",
            r"\.(ttf|otf|eot|woff2?|png|jpe?g|gif|svg|ico)$",
        ]
    );

    let loaders: Vec<_> = reparsed.module.rules[1]
        .chain
        .iter()
        .map(|p| p.loader.as_str())
        .collect();
    assert_eq!(
        loaders,
        vec!["mini-css-extract-plugin/loader", "css-loader", "sass-loader"]
    );
}

#[test]
fn processor_without_options_serializes_as_string() {
    let config = presets::classic().unwrap();
    let value = config.to_value().unwrap();
    assert_eq!(value["module"]["rules"][2]["use"][0], "file-loader");
}

#[test]
fn javascript_regex_literals_are_accepted() {
    let config = WeftConfig::from_json_str(
        r#"{
            "entry": { "main": "./index.js" },
            "module": { "rules": [ { "test": "/\\.JS$/i", "use": ["babel-loader"] } ] }
        }"#,
    )
    .unwrap();

    assert!(config.module.rules[0].test.is_match("src/App.js"));
}

#[test]
fn minimizer_options_keep_their_processor_settings() {
    let config = presets::classic().unwrap();
    let reparsed = WeftConfig::from_json_str(&config.to_json_string().unwrap()).unwrap();

    match reparsed.plugins[1].typed_options().unwrap() {
        Some(PluginOptions::CssMinimizer(options)) => {
            assert!(options.asset_name_reg_exp.is_match("main.optimize.css"));
            assert!(!options.asset_name_reg_exp.is_match("main.css"));
            assert_eq!(
                options.css_processor_plugin_options["preset"][1]["discardComments"]["removeAll"],
                true
            );
        }
        other => panic!("expected minimizer options, got {other:?}"),
    }
}
