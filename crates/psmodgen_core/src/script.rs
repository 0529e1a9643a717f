//! Proxy script assembly and the per-run generation driver.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::fragments::{
    alias_attribute, argument_completer_attribute, begin_block, cmdlet_binding_attribute,
    end_block, help_comment, output_type_attribute, parameter_attributes, parameter_help_comment,
    parameter_name, parameter_type_attribute, process_block, validate_not_null_attribute,
};
use crate::model::{CmdletModel, VariantGroup};
use crate::resolve::resolve_group;

/// One fully rendered proxy cmdlet script.
#[derive(Debug, Clone)]
pub struct ProxyScript {
    pub cmdlet_name: String,
    pub file_name: String,
    pub aliases: Vec<String>,
    pub content: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerateReport {
    pub generated: usize,
    pub scripts: Vec<String>,
    pub failures: Vec<String>,
}

/// Render the complete proxy script for one variant group.
///
/// Fragment order is fixed: help comment, function header, OutputType,
/// CmdletBinding, cmdlet aliases, `param(...)`, then the
/// begin/process/end forwarding blocks.
pub fn build_proxy_script(group: &VariantGroup) -> Result<ProxyScript> {
    let resolved = resolve_group(group)?;
    let cmdlet_name = resolved.cmdlet_name.clone();

    let mut content = String::new();
    content.push_str(&help_comment(group));
    content.push_str(&format!("function {cmdlet_name} {{\n"));
    content.push_str(&output_type_attribute(&group.output_types));
    content.push_str(&cmdlet_binding_attribute(&resolved, group.supports_should_process));
    content.push_str(&alias_attribute(&group.aliases, false));

    if resolved.parameter_groups.is_empty() {
        content.push_str("param()\n");
    } else {
        content.push_str("param(\n");
        let last_index = resolved.parameter_groups.len() - 1;
        for (index, parameter_group) in resolved.parameter_groups.iter().enumerate() {
            content.push_str(&parameter_help_comment(
                parameter_group.help_message.as_deref(),
            ));
            content.push_str(&parameter_attributes(
                parameter_group,
                resolved.multiple_variants,
            ));
            content.push_str(&alias_attribute(&parameter_group.aliases, true));
            content.push_str(&validate_not_null_attribute(
                parameter_group.validate_not_null,
            ));
            content.push_str(&argument_completer_attribute(parameter_group));
            content.push_str(&parameter_type_attribute(&parameter_group.type_name));
            content.push_str(&parameter_name(&parameter_group.name, index == last_index));
        }
        content.push_str(")\n");
    }

    content.push('\n');
    content.push_str(&begin_block(&resolved));
    content.push_str(&process_block());
    content.push_str(&end_block());
    content.push_str("}\n");

    Ok(ProxyScript {
        file_name: format!("{cmdlet_name}.ps1"),
        cmdlet_name,
        aliases: group.aliases.clone(),
        content,
    })
}

/// Generate one `.ps1` file per logical operation into `exports_dir`.
///
/// A group that fails resolution is recorded and skipped; the other
/// groups still generate, and nothing partial is written for the
/// failed one.
pub fn generate_scripts(model: &CmdletModel, exports_dir: &Path) -> Result<GenerateReport> {
    fs::create_dir_all(exports_dir)
        .with_context(|| format!("failed to create {}", exports_dir.display()))?;

    let mut scripts = Vec::new();
    let mut failures = Vec::new();
    for group in &model.groups {
        match build_proxy_script(group) {
            Ok(script) => {
                let path = exports_dir.join(&script.file_name);
                fs::write(&path, &script.content)
                    .with_context(|| format!("failed to write {}", path.display()))?;
                scripts.push(script.cmdlet_name);
            }
            Err(error) => failures.push(format!("{error:#}")),
        }
    }

    Ok(GenerateReport {
        generated: scripts.len(),
        scripts,
        failures,
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct GroupSummary {
    pub cmdlet_name: String,
    pub variants: usize,
    pub parameter_sets: Vec<String>,
    pub parameters: Vec<String>,
    pub shared_parameters: Vec<String>,
    pub default_parameter_set: Option<String>,
    pub failure: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InspectReport {
    pub groups: Vec<GroupSummary>,
    pub total_groups: usize,
    pub failed_groups: usize,
}

/// Resolve every group without emitting anything, for diagnostics.
pub fn inspect_model(model: &CmdletModel) -> InspectReport {
    let mut groups = Vec::new();
    let mut failed_groups = 0usize;
    for group in &model.groups {
        match resolve_group(group) {
            Ok(resolved) => groups.push(GroupSummary {
                cmdlet_name: resolved.cmdlet_name,
                variants: group.variants.len(),
                parameter_sets: resolved
                    .dispatch
                    .iter()
                    .map(|(variant_name, _)| variant_name.clone())
                    .collect(),
                parameters: resolved
                    .parameter_groups
                    .iter()
                    .map(|parameter_group| parameter_group.name.clone())
                    .collect(),
                shared_parameters: resolved
                    .parameter_groups
                    .iter()
                    .filter(|parameter_group| parameter_group.all_variants)
                    .map(|parameter_group| parameter_group.name.clone())
                    .collect(),
                default_parameter_set: resolved.default_parameter_set,
                failure: None,
            }),
            Err(error) => {
                failed_groups += 1;
                groups.push(GroupSummary {
                    cmdlet_name: group.cmdlet_name(),
                    variants: group.variants.len(),
                    parameter_sets: Vec::new(),
                    parameters: Vec::new(),
                    shared_parameters: Vec::new(),
                    default_parameter_set: None,
                    failure: Some(format!("{error:#}")),
                });
            }
        }
    }
    InspectReport {
        total_groups: groups.len(),
        failed_groups,
        groups,
    }
}
