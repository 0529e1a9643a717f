//! Module manifest (`.psd1`) assembly.
//!
//! Aggregates the exported cmdlet and alias names across all generated
//! scripts, discovers auxiliary format files, and renders the fixed
//! key/value document. The module GUID is the one piece of state that
//! survives regeneration: an existing manifest's GUID is preserved
//! byte-for-byte, and a fresh one is generated only when none exists or
//! none parses.

use std::collections::BTreeSet;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::Serialize;
use uuid::Uuid;
use walkdir::WalkDir;

use crate::config::ModuleConfig;
use crate::format::ps_list;

const INDENT: &str = "  ";
const GUID_KEY_PREFIX: &str = "  GUID";
const FORMAT_FILE_SUFFIX: &str = ".format.ps1xml";

#[derive(Debug, Clone, Serialize)]
pub struct ManifestReport {
    pub psd1_path: String,
    pub guid: String,
    pub reused_guid: bool,
    pub cmdlets: Vec<String>,
    pub aliases: Vec<String>,
    pub format_files: Vec<String>,
}

/// Assemble and write the module manifest.
pub fn assemble_manifest(
    exports_dir: &Path,
    custom_dir: &Path,
    psd1_path: &Path,
    config: &ModuleConfig,
) -> Result<ManifestReport> {
    if !exports_dir.is_dir() {
        bail!("exports folder '{}' does not exist", exports_dir.display());
    }
    if !custom_dir.is_dir() {
        bail!("custom folder '{}' does not exist", custom_dir.display());
    }

    let existing_guid = read_existing_guid(psd1_path)?;
    let reused_guid = existing_guid.is_some();
    let guid = existing_guid.unwrap_or_else(|| Uuid::new_v4().to_string());

    let (cmdlets, aliases) = collect_exports(exports_dir)?;
    let format_files = collect_format_files(custom_dir, config.custom_folder_relative())?;

    let mut formats_list = vec![config.format_file()];
    formats_list.extend(format_files.iter().cloned());

    let cmdlets_list = cmdlets
        .iter()
        .map(String::as_str)
        .chain(["*"])
        .collect::<Vec<_>>();
    let aliases_list = aliases
        .iter()
        .map(String::as_str)
        .chain(["*"])
        .collect::<Vec<_>>();

    let mut text = String::new();
    text.push_str("@{\n");
    let _ = writeln!(text, "{GUID_KEY_PREFIX} = '{guid}'");
    let _ = writeln!(text, "{INDENT}RootModule = '{}'", config.root_module());
    let _ = writeln!(text, "{INDENT}ModuleVersion = '{}'", config.version());
    let _ = writeln!(text, "{INDENT}CompatiblePSEditions = 'Core', 'Desktop'");
    let _ = writeln!(text, "{INDENT}Author = '{}'", config.author());
    let _ = writeln!(text, "{INDENT}CompanyName = '{}'", config.company());
    let _ = writeln!(text, "{INDENT}Copyright = '{}'", config.copyright());
    let _ = writeln!(text, "{INDENT}Description = '{}'", config.description());
    let _ = writeln!(text, "{INDENT}PowerShellVersion = '5.1'");
    let _ = writeln!(text, "{INDENT}DotNetFrameworkVersion = '4.7.2'");
    let _ = writeln!(
        text,
        "{INDENT}RequiredAssemblies = '{}'",
        config.required_assemblies()
    );
    let _ = writeln!(text, "{INDENT}FormatsToProcess = {}", ps_list(&formats_list));
    let _ = writeln!(text, "{INDENT}CmdletsToExport = {}", ps_list(&cmdlets_list));
    let _ = writeln!(text, "{INDENT}AliasesToExport = {}", ps_list(&aliases_list));
    let _ = writeln!(text, "{INDENT}PrivateData = @{{");
    let _ = writeln!(text, "{INDENT}{INDENT}PSData = @{{");
    let _ = writeln!(
        text,
        "{INDENT}{INDENT}{INDENT}Tags = {}",
        ps_list(&config.metadata.tags)
    );
    let _ = writeln!(
        text,
        "{INDENT}{INDENT}{INDENT}LicenseUri = '{}'",
        config.metadata.license_uri.as_deref().unwrap_or("")
    );
    let _ = writeln!(
        text,
        "{INDENT}{INDENT}{INDENT}ProjectUri = '{}'",
        config.metadata.project_uri.as_deref().unwrap_or("")
    );
    let _ = writeln!(
        text,
        "{INDENT}{INDENT}{INDENT}ReleaseNotes = '{}'",
        config.metadata.release_notes.as_deref().unwrap_or("")
    );
    if !config.metadata.profiles.is_empty() {
        let _ = writeln!(
            text,
            "{INDENT}{INDENT}{INDENT}Profiles = {}",
            ps_list(&config.metadata.profiles)
        );
    }
    let _ = writeln!(text, "{INDENT}{INDENT}}}");
    let _ = writeln!(text, "{INDENT}}}");
    text.push_str("}\n");

    fs::write(psd1_path, &text)
        .with_context(|| format!("failed to write {}", psd1_path.display()))?;

    Ok(ManifestReport {
        psd1_path: psd1_path.to_string_lossy().replace('\\', "/"),
        guid,
        reused_guid,
        cmdlets,
        aliases,
        format_files,
    })
}

/// Scan an existing manifest for its recorded GUID. `None` when the
/// file is missing, has no GUID line, or the value doesn't parse.
fn read_existing_guid(psd1_path: &Path) -> Result<Option<String>> {
    if !psd1_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(psd1_path)
        .with_context(|| format!("failed to read {}", psd1_path.display()))?;
    let Some(line) = content
        .lines()
        .find(|line| line.starts_with(GUID_KEY_PREFIX))
    else {
        return Ok(None);
    };
    let Some(value) = line.splitn(2, " = ").nth(1) else {
        return Ok(None);
    };
    let value = value.trim().replace('\'', "");
    match Uuid::parse_str(&value) {
        Ok(parsed) => Ok(Some(parsed.to_string())),
        Err(_) => Ok(None),
    }
}

/// Distinct cmdlet names (script file stems) and cmdlet-level alias
/// names across every generated script, both sorted.
fn collect_exports(exports_dir: &Path) -> Result<(Vec<String>, Vec<String>)> {
    let mut cmdlets = BTreeSet::new();
    let mut aliases = BTreeSet::new();
    for entry in WalkDir::new(exports_dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry
            .with_context(|| format!("failed to scan {}", exports_dir.display()))?;
        let path = entry.path();
        if !entry.file_type().is_file() || path.extension().is_none_or(|ext| ext != "ps1") {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) else {
            continue;
        };
        cmdlets.insert(stem.to_string());
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        for alias in scan_cmdlet_aliases(&content) {
            aliases.insert(alias);
        }
    }
    Ok((
        cmdlets.into_iter().collect(),
        aliases.into_iter().collect(),
    ))
}

/// Cmdlet-level `[Alias(...)]` attribute lines sit at column zero in
/// generated scripts; indented ones belong to parameters and are not
/// exported.
fn scan_cmdlet_aliases(content: &str) -> Vec<String> {
    let mut aliases = Vec::new();
    for line in content.lines() {
        let Some(rest) = line.strip_prefix("[Alias(") else {
            continue;
        };
        let Some(arguments) = rest.strip_suffix(")]") else {
            continue;
        };
        for argument in arguments.split(',') {
            let name = argument.trim().trim_matches('\'');
            if !name.is_empty() {
                aliases.push(name.to_string());
            }
        }
    }
    aliases
}

/// Auxiliary format-definition files at the top level of the custom
/// folder, rendered as manifest-relative paths, sorted. Nested folders
/// are not scanned; a subdirectory hit could not be rendered against
/// `custom_relative` anyway.
fn collect_format_files(custom_dir: &Path, custom_relative: &str) -> Result<Vec<String>> {
    let mut files = BTreeSet::new();
    for entry in WalkDir::new(custom_dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry
            .with_context(|| format!("failed to scan {}", custom_dir.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(file_name) = entry.path().file_name().and_then(|name| name.to_str()) else {
            continue;
        };
        if file_name.ends_with(FORMAT_FILE_SUFFIX) {
            files.insert(format!("{custom_relative}/{file_name}"));
        }
    }
    Ok(files.into_iter().collect())
}
