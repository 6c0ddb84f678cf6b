use crate::engine::generator;
use crate::error::Error;
use crate::output::Output;
use crate::services::ModuleRegistry;

/// Prints every compiled leaf command with its dispatch target.
pub fn execute_list_commands(registry: &ModuleRegistry, output: &Output) -> Result<(), Error> {
    let compiled = generator::compile(&registry.definitions())?;
    if compiled.leaf_count() == 0 {
        output.data("No service modules are registered.");
        return Ok(());
    }

    let mut current_group = String::new();
    for (names, leaf) in compiled.leaves() {
        let Some((command, groups)) = names.split_last() else {
            continue;
        };
        let group = groups.join(" ");
        if group != current_group {
            output.data(format!("{group}:"));
            current_group = group;
        }
        let flags: Vec<String> = leaf
            .descriptors
            .iter()
            .map(|d| {
                if d.required {
                    format!("--{}", d.flag_name)
                } else {
                    format!("[--{}]", d.flag_name)
                }
            })
            .collect();
        output.data(format!(
            "  {command} {}  ({}.{})",
            flags.join(" "),
            leaf.path.sub_service,
            leaf.path.operation
        ));
    }
    Ok(())
}
