//! Operations command implementation.

use anyhow::Result;
use clap::Args;
use serde_json::json;

use skyroute_core::list_operations;

use crate::output;

#[derive(Args, Debug)]
pub struct OperationsArgs {
    /// Print one JSON object per operation
    #[arg(long)]
    pub json: bool,
}

pub async fn run(args: OperationsArgs) -> Result<()> {
    for op in list_operations() {
        let descriptor = op.descriptor();

        if args.json {
            let params: Vec<_> = descriptor
                .params
                .iter()
                .map(|p| json!({ "name": p.name, "required": p.required }))
                .collect();
            output::json(&json!({
                "resource": op.resource().name(),
                "action": op.action(),
                "method": descriptor.method,
                "path": descriptor.path,
                "params": params,
            }))?;
        } else {
            let params: Vec<String> = descriptor
                .params
                .iter()
                .map(|p| {
                    if p.required {
                        p.name.to_string()
                    } else {
                        format!("[{}]", p.name)
                    }
                })
                .collect();
            println!(
                "{:<22} {:<5} {:<34} {}",
                op.to_string(),
                descriptor.method.as_str(),
                descriptor.path,
                params.join(" ")
            );
        }
    }

    Ok(())
}
