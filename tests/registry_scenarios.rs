//! Integration tests for scheme registration and analyzer lookup.

use std::collections::HashMap;

use hanlex::analysis::*;
use hanlex::config::PluginSettings;
use hanlex::error::{HanlexError, Result};
use hanlex::plugin::Plugin;
use hanlex::registry::{AnalyzerDefinition, TokenizerConfig};

const PINYIN_SCHEMES: [&str; 7] = [
    "pinyin",
    "pinyin-head",
    "pinyin-fuzzy",
    "pinyin-stream",
    "pinyin-keyword",
    "pinyin-head-keyword",
    "pinyin-fuzzy-keyword",
];

fn texts(tokens: &[Token]) -> Vec<&str> {
    tokens.iter().map(|t| t.text.as_str()).collect()
}

#[test]
fn test_default_schemes() -> Result<()> {
    let plugin = Plugin::new(PluginSettings::default())?;
    let names = plugin.tokenizers().names();

    for name in ["mynlp", "mynlp-core", "core", "hash", "issue"]
        .into_iter()
        .chain(PINYIN_SCHEMES)
    {
        assert!(names.contains(&name.to_string()), "missing {name}");
        assert!(plugin.tokenizer(name, &TokenizerConfig::default()).is_ok());
    }
    assert!(!names.contains(&"cws".to_string()));

    Ok(())
}

#[test]
fn test_cws_requires_setting() -> Result<()> {
    let mut map = HashMap::new();
    map.insert("mynlp.cws.enabled".to_string(), "true".to_string());
    let plugin = Plugin::new(PluginSettings::from_map(&map)?)?;

    let tokenizer = plugin.tokenizer("mynlp-cws", &TokenizerConfig::default())?;
    assert_eq!(tokenizer.name(), "cws");
    assert!(plugin.analyzer("cws").is_ok());

    let plugin = Plugin::new(PluginSettings::default())?;
    assert!(matches!(
        plugin.tokenizer("cws", &TokenizerConfig::default()),
        Err(HanlexError::UnknownScheme(_))
    ));
    assert!(plugin.analyzer("mynlp-cws").is_err());

    Ok(())
}

#[test]
fn test_unknown_scheme() -> Result<()> {
    let plugin = Plugin::new(PluginSettings::default())?;
    let err = plugin
        .tokenizer("ik_max_word", &TokenizerConfig::default())
        .unwrap_err();
    assert!(err.to_string().contains("ik_max_word"));

    Ok(())
}

#[test]
fn test_tokenizer_config_controls_segmentation() -> Result<()> {
    let plugin = Plugin::new(PluginSettings::default())?;
    let text = "我们，来到了北京。";

    let default: Vec<Token> = plugin
        .tokenizer("mynlp", &TokenizerConfig::default())?
        .tokenize(text)?
        .collect();
    assert!(!texts(&default).contains(&"，"));
    assert!(texts(&default).contains(&"北京"));

    let keep_punctuation = TokenizerConfig::new().with("filter-punctuation", "false");
    let tokens: Vec<Token> = plugin
        .tokenizer("mynlp", &keep_punctuation)?
        .tokenize(text)?
        .collect();
    assert!(texts(&tokens).contains(&"，"));

    let bad = TokenizerConfig::new().with("mode", "sideways");
    assert!(matches!(
        plugin.tokenizer("mynlp", &bad),
        Err(HanlexError::InvalidConfig(_))
    ));

    Ok(())
}

#[test]
fn test_custom_analyzer_definition() -> Result<()> {
    let plugin = Plugin::new(PluginSettings::default())?;
    plugin.analyzers().register(AnalyzerDefinition::new(
        "name_search",
        "pinyin",
        vec![FilterSpec::FuzzyPinyin, FilterSpec::Limit { max: 4 }],
    ));

    let analyzer = plugin.analyzer("name_search")?;
    assert_eq!(analyzer.name(), "name_search");

    let tokens: Vec<Token> = analyzer.analyze("张三")?.collect();
    assert_eq!(texts(&tokens), vec!["zhang", "zan", "san"]);
    assert_eq!(tokens[1].position_increment, 0);
    assert_eq!(tokens[1].token_type, TokenType::PinyinFuzzy);

    Ok(())
}

#[test]
fn test_default_analyzers_lowercase_segment_output() -> Result<()> {
    let plugin = Plugin::new(PluginSettings::default())?;
    let tokens: Vec<Token> = plugin.analyzer("mynlp")?.analyze("Rust语言")?.collect();
    assert!(texts(&tokens).contains(&"rust"));

    Ok(())
}
