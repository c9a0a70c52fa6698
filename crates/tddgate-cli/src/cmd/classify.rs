use crate::context::{load_config, Overrides};
use crate::output::{print_json, print_table};
use anyhow::Context;
use std::path::Path;
use tddgate_core::classifier::Classifier;

pub fn run(root: &Path, overrides: &Overrides, paths: &[String], json: bool) -> anyhow::Result<()> {
    let config = load_config(root, overrides)?;
    let classifier =
        Classifier::from_config(&config).context("invalid test file patterns in config")?;

    let rows: Vec<(String, String, String)> = paths
        .iter()
        .map(|p| {
            let class = classifier.classify(p);
            let cause = classifier
                .matching_rule(p)
                .map(|r| r.matcher.describe())
                .unwrap_or_else(|| "no rule matched".to_string());
            (p.clone(), class.to_string(), cause)
        })
        .collect();

    if json {
        let items: Vec<serde_json::Value> = rows
            .iter()
            .map(|(path, class, cause)| {
                serde_json::json!({ "path": path, "class": class, "matched": cause })
            })
            .collect();
        return print_json(&items);
    }

    print_table(
        &["PATH", "CLASS", "MATCHED"],
        rows.into_iter().map(|(a, b, c)| vec![a, b, c]).collect(),
    );
    Ok(())
}
