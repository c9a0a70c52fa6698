use crate::context::{build_gate, Overrides};
use crate::output::print_json;
use std::path::Path;
use tddgate_core::request::EditRequest;

/// Evaluate an edit to `path` without a host payload. Exit code follows the
/// hook contract so the command can be scripted.
pub fn run(
    root: &Path,
    overrides: &Overrides,
    path: &str,
    tool: &str,
    no_log: bool,
    json: bool,
) -> anyhow::Result<i32> {
    let gate = build_gate(root, overrides)?;
    let request = EditRequest::new(tool, path);
    let decision = if no_log {
        gate.decide(&request)
    } else {
        gate.evaluate(&request)
    };

    if json {
        print_json(&decision)?;
    } else {
        println!("{} {} {}", decision.action, decision.reason, decision.file_path);
        if let Some(class) = decision.class {
            println!("class: {class}");
        }
        match decision.block_message() {
            Some(message) => print!("{message}"),
            None if !decision.expected.is_empty() => {
                println!("checked: {}", decision.expected.join(", "));
            }
            None => {}
        }
    }
    Ok(decision.action.exit_code())
}
