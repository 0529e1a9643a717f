//! Variant grouping and parameter-set resolution.
//!
//! Reconciles the N cmdlet variants of one logical operation into a
//! single declared parameter surface plus the runtime dispatch table
//! the generated `begin` block keys on. Everything here is resolved
//! once per generation run; emission reads the result verbatim.

use std::collections::BTreeSet;

use anyhow::{Result, bail};

use crate::model::{ALL_PARAMETER_SETS, NO_PARAMETERS, Parameter, VariantGroup};

/// One appearance of a named parameter inside one variant.
#[derive(Debug, Clone)]
pub struct ParameterOccurrence {
    pub variant_name: String,
    pub parameter: Parameter,
}

/// All occurrences of one parameter name across a group's variants.
/// The proxy declares this once, no matter how many variants carry it.
#[derive(Debug, Clone)]
pub struct ParameterGroup {
    pub name: String,
    pub type_name: String,
    pub occurrences: Vec<ParameterOccurrence>,
    /// Present in every variant of the group. Such parameters need no
    /// `ParameterSetName` discrimination: the binding is unambiguous
    /// regardless of which branch is taken.
    pub all_variants: bool,
    pub aliases: Vec<String>,
    pub validate_not_null: bool,
    pub has_argument_completer: bool,
    pub help_message: Option<String>,
}

/// The per-operation resolution result every fragment emitter reads.
#[derive(Debug, Clone)]
pub struct ResolvedGroup {
    pub cmdlet_name: String,
    /// First-appearance order across variants in model order; stable
    /// across regenerations so generated diffs stay minimal.
    pub parameter_groups: Vec<ParameterGroup>,
    /// Variant name to `PrivateModule\PrivateCmdlet`, exhaustive and
    /// duplicate-free, in model order.
    pub dispatch: Vec<(String, String)>,
    pub multiple_variants: bool,
    /// Validated default set, kept only when it names an actual
    /// variant of a multi-variant group.
    pub default_parameter_set: Option<String>,
}

pub fn resolve_group(group: &VariantGroup) -> Result<ResolvedGroup> {
    let cmdlet_name = group.cmdlet_name();
    if group.variants.is_empty() {
        bail!("{cmdlet_name}: variant group has no variants");
    }

    let mut seen_variants = BTreeSet::new();
    let mut dispatch = Vec::with_capacity(group.variants.len());
    for variant in &group.variants {
        if !seen_variants.insert(variant.variant_name.as_str()) {
            bail!(
                "{cmdlet_name}: duplicate variant name `{}` in dispatch mapping",
                variant.variant_name
            );
        }
        dispatch.push((
            variant.variant_name.clone(),
            format!(
                "{}\\{}",
                variant.private_module_name, variant.private_cmdlet_name
            ),
        ));
    }

    let mut parameter_groups: Vec<ParameterGroup> = Vec::new();
    for variant in &group.variants {
        for parameter in &variant.parameters {
            let occurrence = ParameterOccurrence {
                variant_name: variant.variant_name.clone(),
                parameter: parameter.clone(),
            };
            match parameter_groups
                .iter_mut()
                .find(|existing| existing.name == parameter.name)
            {
                Some(existing) => {
                    if existing.type_name != parameter.type_name {
                        bail!(
                            "{cmdlet_name}: parameter `{}` declared as `{}` in variant `{}` but as `{}` elsewhere",
                            parameter.name,
                            parameter.type_name,
                            variant.variant_name,
                            existing.type_name
                        );
                    }
                    for alias in &parameter.aliases {
                        if !existing.aliases.contains(alias) {
                            existing.aliases.push(alias.clone());
                        }
                    }
                    existing.validate_not_null |= parameter.validate_not_null;
                    existing.has_argument_completer |= parameter.has_argument_completer;
                    if existing.help_message.is_none()
                        && parameter.help_message.as_deref().is_some_and(|m| !m.is_empty())
                    {
                        existing.help_message = parameter.help_message.clone();
                    }
                    existing.occurrences.push(occurrence);
                }
                None => parameter_groups.push(ParameterGroup {
                    name: parameter.name.clone(),
                    type_name: parameter.type_name.clone(),
                    aliases: parameter.aliases.clone(),
                    validate_not_null: parameter.validate_not_null,
                    has_argument_completer: parameter.has_argument_completer,
                    help_message: parameter
                        .help_message
                        .clone()
                        .filter(|m| !m.is_empty()),
                    occurrences: vec![occurrence],
                    all_variants: false,
                }),
            }
        }
    }

    let variant_count = group.variants.len();
    for parameter_group in &mut parameter_groups {
        let owners = parameter_group
            .occurrences
            .iter()
            .map(|occurrence| occurrence.variant_name.as_str())
            .collect::<BTreeSet<_>>();
        parameter_group.all_variants = owners.len() == variant_count;
    }

    let multiple_variants = variant_count > 1;
    let default_parameter_set = group
        .default_parameter_set_name
        .as_deref()
        .filter(|name| {
            multiple_variants
                && !name.is_empty()
                && *name != NO_PARAMETERS
                && *name != ALL_PARAMETER_SETS
                && seen_variants.contains(name)
        })
        .map(ToString::to_string);

    Ok(ResolvedGroup {
        cmdlet_name,
        parameter_groups,
        dispatch,
        multiple_variants,
        default_parameter_set,
    })
}
