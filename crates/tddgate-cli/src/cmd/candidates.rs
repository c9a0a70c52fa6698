use crate::context::{build_gate, Overrides};
use crate::output::{print_json, print_table};
use std::path::Path;
use tddgate_core::types::FileClass;

pub fn run(root: &Path, overrides: &Overrides, path: &str, json: bool) -> anyhow::Result<()> {
    let gate = build_gate(root, overrides)?;
    let class = gate.classifier().classify(path);
    let probed = gate.conventions().probe_all(path, gate.root());

    if json {
        let value = serde_json::json!({
            "path": path,
            "class": class,
            "candidates": probed,
        });
        return print_json(&value);
    }

    if class != FileClass::Implementation {
        println!("{path} is classified as {class}; the gate does not look for its tests.");
    }
    if probed.is_empty() {
        println!("No test convention covers {path}.");
        return Ok(());
    }
    print_table(
        &["CANDIDATE", "STATUS"],
        probed
            .into_iter()
            .map(|p| vec![p.candidate.display, p.status.to_string()])
            .collect(),
    );
    Ok(())
}
