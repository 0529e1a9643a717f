//! Fragment emitters for proxy cmdlet scripts.
//!
//! Each function renders exactly one syntactic fragment from a narrow
//! slice of the resolved model and returns its text, newline-terminated
//! when non-empty, so the assembler can concatenate fragments in a
//! fixed order. No I/O happens here.

use std::fmt::Write;

use crate::format::{join_non_empty, ps_bool, ps_string_literal, ps_type};
use crate::model::{INDENT, ITEM_SEPARATOR, VariantGroup};
use crate::resolve::{ParameterGroup, ResolvedGroup};

/// Comment-based help: synopsis, description, example pointer, one
/// `.Inputs`/`.Outputs` stanza per declared type, and the online link.
pub fn help_comment(group: &VariantGroup) -> String {
    let inputs = group
        .inputs
        .iter()
        .map(|type_name| format!(".Inputs\n{type_name}"))
        .collect::<Vec<_>>()
        .join("\n");
    let inputs_text = if inputs.is_empty() {
        String::new()
    } else {
        format!("\n{inputs}")
    };
    let outputs = group
        .outputs
        .iter()
        .map(|type_name| format!(".Outputs\n{type_name}"))
        .collect::<Vec<_>>()
        .join("\n");
    let outputs_text = if outputs.is_empty() {
        String::new()
    } else {
        format!("\n{outputs}")
    };
    format!(
        "<#\n.Synopsis\n{description}\n.Description\n{description}\n.Example\nTo view examples, please use the -Online parameter with Get-Help or navigate to: {link}{inputs_text}{outputs_text}\n.Link\n{link}\n#>\n",
        description = group.description,
        link = group.link,
    )
}

/// `[OutputType(...)]`, only when at least one output type is declared.
pub fn output_type_attribute(output_types: &[String]) -> String {
    if output_types.is_empty() {
        return String::new();
    }
    let list = join_non_empty(
        output_types.iter().map(|type_name| format!("'{type_name}'")),
        ITEM_SEPARATOR,
    );
    format!("[OutputType({list})]\n")
}

/// `[CmdletBinding(...)]`. `PositionalBinding=$false` is always set so
/// positional assignment follows the per-variant `Position` arguments
/// instead of ambient inference.
pub fn cmdlet_binding_attribute(resolved: &ResolvedGroup, supports_should_process: bool) -> String {
    let default_set = resolved
        .default_parameter_set
        .as_deref()
        .map(|name| format!("DefaultParameterSetName='{name}'"))
        .unwrap_or_default();
    let positional = format!("PositionalBinding={}", ps_bool(false));
    let should_process = if supports_should_process {
        format!("SupportsShouldProcess{ITEM_SEPARATOR}ConfirmImpact='Medium'")
    } else {
        String::new()
    };
    let properties = join_non_empty([default_set, positional, should_process], ITEM_SEPARATOR);
    format!("[CmdletBinding({properties})]\n")
}

/// `[Alias(...)]` at cmdlet level (no indent) or parameter level
/// (indented). Empty alias lists render nothing.
pub fn alias_attribute(aliases: &[String], include_indent: bool) -> String {
    if aliases.is_empty() {
        return String::new();
    }
    let list = join_non_empty(
        aliases.iter().map(|alias| format!("'{alias}'")),
        ITEM_SEPARATOR,
    );
    let indent = if include_indent { INDENT } else { "" };
    format!("{indent}[Alias({list})]\n")
}

/// The `[Parameter(...)]` stack for one parameter group.
///
/// A group missing from some variants of a multi-variant cmdlet gets
/// one attribute line per occurrence, each discriminated with its
/// owning variant's `ParameterSetName`. A group present everywhere (or
/// in a single-variant cmdlet) is unambiguous and gets a single line
/// with no set name.
pub fn parameter_attributes(group: &ParameterGroup, multiple_variants: bool) -> String {
    let discriminate = multiple_variants && !group.all_variants;
    let mut output = String::new();
    // Without discrimination a single representative occurrence (the
    // first in model order) carries the flags.
    let emitted = if discriminate {
        &group.occurrences[..]
    } else {
        &group.occurrences[..1]
    };
    for occurrence in emitted {
        let parameter = &occurrence.parameter;
        let set_name = if discriminate {
            format!("ParameterSetName='{}'", occurrence.variant_name)
        } else {
            String::new()
        };
        let position = parameter
            .position
            .map(|position| format!("Position={position}"))
            .unwrap_or_default();
        let mandatory = if parameter.mandatory { "Mandatory" } else { "" };
        let dont_show = if parameter.dont_show { "DontShow" } else { "" };
        let from_pipeline = if parameter.value_from_pipeline {
            "ValueFromPipeline"
        } else {
            ""
        };
        let help_message = ps_string_literal(parameter.help_message.as_deref());
        let help = if help_message.is_empty() {
            String::new()
        } else {
            format!("HelpMessage='{help_message}'")
        };
        let properties = join_non_empty(
            [
                set_name.as_str(),
                position.as_str(),
                mandatory,
                dont_show,
                from_pipeline,
                help.as_str(),
            ],
            ITEM_SEPARATOR,
        );
        let _ = writeln!(output, "{INDENT}[Parameter({properties})]");
    }
    output
}

pub fn validate_not_null_attribute(has_validate_not_null: bool) -> String {
    if has_validate_not_null {
        format!("{INDENT}[ValidateNotNull()]\n")
    } else {
        String::new()
    }
}

/// `[ArgumentCompleter([Type])]`, only when the group's type carries a
/// completer.
pub fn argument_completer_attribute(group: &ParameterGroup) -> String {
    if group.has_argument_completer {
        format!("{INDENT}[ArgumentCompleter([{}])]\n", ps_type(&group.type_name))
    } else {
        String::new()
    }
}

pub fn parameter_type_attribute(type_name: &str) -> String {
    format!("{INDENT}[{}]\n", ps_type(type_name))
}

/// `${Name}` declaration, trailing comma on all but the last parameter.
pub fn parameter_name(name: &str, is_last: bool) -> String {
    if is_last {
        format!("{INDENT}${{{name}}}\n")
    } else {
        format!("{INDENT}${{{name}}},\n\n")
    }
}

/// Help-message lines as `# ` comments above the attribute stack.
pub fn parameter_help_comment(help_message: Option<&str>) -> String {
    let Some(help_message) = help_message else {
        return String::new();
    };
    let mut output = String::new();
    for line in help_message.lines().filter(|line| !line.is_empty()) {
        let _ = writeln!(output, "{INDENT}# {line}");
    }
    output
}

/// The `begin` block: cap the output buffer for correct streaming,
/// resolve the hidden cmdlet for the bound parameter set through the
/// dispatch table, and start a steppable pipeline around it. Failures
/// re-raise unmodified; the proxy adds no recovery of its own.
pub fn begin_block(resolved: &ResolvedGroup) -> String {
    let mut mapping = String::new();
    let _ = writeln!(mapping, "{INDENT}{INDENT}$mapping = @{{");
    for (variant_name, target) in &resolved.dispatch {
        let _ = writeln!(mapping, "{INDENT}{INDENT}{INDENT}{variant_name} = '{target}';");
    }
    let _ = write!(mapping, "{INDENT}{INDENT}}}");
    format!(
        "begin {{\n{INDENT}try {{\n{INDENT}{INDENT}$outBuffer = $null\n{INDENT}{INDENT}if ($PSBoundParameters.TryGetValue('OutBuffer', [ref]$outBuffer)) {{\n{INDENT}{INDENT}{INDENT}$PSBoundParameters['OutBuffer'] = 1\n{INDENT}{INDENT}}}\n{INDENT}{INDENT}$parameterSet = $PsCmdlet.ParameterSetName\n{mapping}\n{INDENT}{INDENT}$wrappedCmd = $ExecutionContext.InvokeCommand.GetCommand(($mapping[$parameterSet]), [System.Management.Automation.CommandTypes]::Cmdlet)\n{INDENT}{INDENT}$scriptCmd = {{& $wrappedCmd @PSBoundParameters}}\n{INDENT}{INDENT}$steppablePipeline = $scriptCmd.GetSteppablePipeline($myInvocation.CommandOrigin)\n{INDENT}{INDENT}$steppablePipeline.Begin($PSCmdlet)\n{INDENT}}} catch {{\n{INDENT}{INDENT}throw\n{INDENT}}}\n}}\n\n"
    )
}

/// The `process` block: forward the current pipeline object, rethrow.
pub fn process_block() -> String {
    format!(
        "process {{\n{INDENT}try {{\n{INDENT}{INDENT}$steppablePipeline.Process($_)\n{INDENT}}} catch {{\n{INDENT}{INDENT}throw\n{INDENT}}}\n}}\n\n"
    )
}

/// The `end` block: finalize the steppable pipeline, rethrow.
pub fn end_block() -> String {
    format!(
        "end {{\n{INDENT}try {{\n{INDENT}{INDENT}$steppablePipeline.End()\n{INDENT}}} catch {{\n{INDENT}{INDENT}throw\n{INDENT}}}\n}}\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::{group, parameter, variant};
    use crate::resolve::resolve_group;

    fn two_variant_resolved() -> ResolvedGroup {
        let mut name = parameter("Name", "System.String");
        name.mandatory = true;
        name.position = Some(0);
        let mut id = parameter("Id", "System.Int32");
        id.mandatory = true;
        id.position = Some(0);
        let model = group(
            "Get",
            "Widget",
            vec![variant("ByName", vec![name]), variant("ById", vec![id])],
        );
        resolve_group(&model).expect("resolve")
    }

    #[test]
    fn help_comment_lists_inputs_and_outputs() {
        let mut model = group("Get", "Widget", vec![variant("List", Vec::new())]);
        model.inputs = vec!["Widget.Models.IWidgetFilter".to_string()];
        model.outputs = vec!["Widget.Models.IWidget".to_string()];
        let text = help_comment(&model);
        assert!(text.starts_with("<#\n.Synopsis\nGets the Widget.\n"));
        assert!(text.contains(".Inputs\nWidget.Models.IWidgetFilter\n.Outputs\nWidget.Models.IWidget\n.Link\n"));
        assert!(text.ends_with("#>\n"));
    }

    #[test]
    fn output_type_attribute_is_suppressed_without_types() {
        assert_eq!(output_type_attribute(&[]), "");
        assert_eq!(
            output_type_attribute(&["Widget.Models.IWidget".to_string()]),
            "[OutputType('Widget.Models.IWidget')]\n"
        );
    }

    #[test]
    fn cmdlet_binding_always_disables_positional_binding() {
        let resolved = two_variant_resolved();
        assert_eq!(
            cmdlet_binding_attribute(&resolved, false),
            "[CmdletBinding(PositionalBinding=$false)]\n"
        );
    }

    #[test]
    fn cmdlet_binding_with_default_set_and_should_process() {
        let mut model = group(
            "Remove",
            "Widget",
            vec![variant("ByName", Vec::new()), variant("ById", Vec::new())],
        );
        model.default_parameter_set_name = Some("ByName".to_string());
        let resolved = resolve_group(&model).expect("resolve");
        assert_eq!(
            cmdlet_binding_attribute(&resolved, true),
            "[CmdletBinding(DefaultParameterSetName='ByName', PositionalBinding=$false, SupportsShouldProcess, ConfirmImpact='Medium')]\n"
        );
    }

    #[test]
    fn subset_parameter_gets_one_line_per_occurrence_with_set_name() {
        let resolved = two_variant_resolved();
        let name_group = &resolved.parameter_groups[0];
        assert_eq!(
            parameter_attributes(name_group, resolved.multiple_variants),
            "    [Parameter(ParameterSetName='ByName', Position=0, Mandatory)]\n"
        );
    }

    #[test]
    fn all_variant_parameter_gets_single_undiscriminated_line() {
        let shared = parameter("Raw", "System.Boolean");
        let model = group(
            "Get",
            "Widget",
            vec![
                variant("ByName", vec![shared.clone()]),
                variant("ById", vec![shared]),
            ],
        );
        let resolved = resolve_group(&model).expect("resolve");
        assert_eq!(
            parameter_attributes(&resolved.parameter_groups[0], resolved.multiple_variants),
            "    [Parameter()]\n"
        );
    }

    #[test]
    fn single_variant_parameter_never_carries_set_name() {
        let mut name = parameter("Name", "System.String");
        name.mandatory = true;
        name.value_from_pipeline = true;
        name.help_message = Some("The widget's name.".to_string());
        let model = group("Remove", "Widget", vec![variant("Delete", vec![name])]);
        let resolved = resolve_group(&model).expect("resolve");
        assert_eq!(
            parameter_attributes(&resolved.parameter_groups[0], resolved.multiple_variants),
            "    [Parameter(Mandatory, ValueFromPipeline, HelpMessage='The widget''s name.')]\n"
        );
    }

    #[test]
    fn dont_show_is_emitted_between_mandatory_and_pipeline_flags() {
        let mut hidden = parameter("Secret", "System.String");
        hidden.mandatory = true;
        hidden.dont_show = true;
        let model = group("Get", "Widget", vec![variant("List", vec![hidden])]);
        let resolved = resolve_group(&model).expect("resolve");
        assert_eq!(
            parameter_attributes(&resolved.parameter_groups[0], resolved.multiple_variants),
            "    [Parameter(Mandatory, DontShow)]\n"
        );
    }

    #[test]
    fn optional_attribute_fragments() {
        assert_eq!(validate_not_null_attribute(false), "");
        assert_eq!(validate_not_null_attribute(true), "    [ValidateNotNull()]\n");
        assert_eq!(alias_attribute(&[], false), "");
        assert_eq!(
            alias_attribute(&["GW".to_string(), "Get-W".to_string()], false),
            "[Alias('GW', 'Get-W')]\n"
        );
        assert_eq!(
            alias_attribute(&["WN".to_string()], true),
            "    [Alias('WN')]\n"
        );
    }

    #[test]
    fn argument_completer_unwraps_generic_arity() {
        let resolved = two_variant_resolved();
        let mut group = resolved.parameter_groups[0].clone();
        group.has_argument_completer = true;
        group.type_name = "Widget.Support.Completer`1[System.String]".to_string();
        assert_eq!(
            argument_completer_attribute(&group),
            "    [ArgumentCompleter([Widget.Support.Completer[System.String]])]\n"
        );
        group.has_argument_completer = false;
        assert_eq!(argument_completer_attribute(&group), "");
    }

    #[test]
    fn parameter_name_trailing_comma_rules() {
        assert_eq!(parameter_name("Name", false), "    ${Name},\n\n");
        assert_eq!(parameter_name("Name", true), "    ${Name}\n");
    }

    #[test]
    fn parameter_help_comment_renders_each_line() {
        assert_eq!(parameter_help_comment(None), "");
        assert_eq!(
            parameter_help_comment(Some("First line.\n\nSecond line.")),
            "    # First line.\n    # Second line.\n"
        );
    }

    #[test]
    fn begin_block_mapping_has_one_entry_per_variant() {
        let resolved = two_variant_resolved();
        let text = begin_block(&resolved);
        assert!(text.contains("$mapping = @{\n            ByName = 'Widget.private\\Get-Widget_ByName';\n            ById = 'Widget.private\\Get-Widget_ById';\n        }"));
        assert_eq!(text.matches(" = 'Widget.private\\").count(), 2);
        assert!(text.contains("$PSBoundParameters['OutBuffer'] = 1"));
        assert!(text.contains("GetSteppablePipeline($myInvocation.CommandOrigin)"));
        assert!(text.contains("} catch {\n        throw\n    }"));
    }

    #[test]
    fn process_and_end_blocks_rethrow() {
        assert!(process_block().contains("$steppablePipeline.Process($_)"));
        assert!(end_block().contains("$steppablePipeline.End()"));
        assert!(process_block().contains("throw"));
        assert!(end_block().ends_with("}\n"));
    }
}
