use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

/// Sentinel used upstream when no default parameter set was chosen.
pub const NO_PARAMETERS: &str = "__NoParameters";

/// PowerShell's implicit parameter set covering every declared set.
pub const ALL_PARAMETER_SETS: &str = "__AllParameterSets";

pub const INDENT: &str = "    ";

pub const ITEM_SEPARATOR: &str = ", ";

/// One parameter of one cmdlet variant, as reflected upstream.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    pub type_name: String,
    #[serde(default)]
    pub position: Option<i32>,
    #[serde(default)]
    pub mandatory: bool,
    #[serde(default)]
    pub dont_show: bool,
    #[serde(default)]
    pub value_from_pipeline: bool,
    #[serde(default)]
    pub help_message: Option<String>,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub validate_not_null: bool,
    #[serde(default)]
    pub has_argument_completer: bool,
}

/// One concrete hidden cmdlet realizing one overload of a logical
/// operation. `variant_name` doubles as the PowerShell parameter-set
/// name; dispatch targets `private_module_name\private_cmdlet_name`.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct Variant {
    pub variant_name: String,
    pub private_module_name: String,
    pub private_cmdlet_name: String,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
}

/// All variants of one logical operation (verb + noun), unified into a
/// single user-facing proxy cmdlet.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct VariantGroup {
    pub verb: String,
    pub noun: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub supports_should_process: bool,
    #[serde(default)]
    pub default_parameter_set_name: Option<String>,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub output_types: Vec<String>,
    #[serde(default)]
    pub inputs: Vec<String>,
    #[serde(default)]
    pub outputs: Vec<String>,
    pub variants: Vec<Variant>,
}

impl VariantGroup {
    pub fn cmdlet_name(&self) -> String {
        format!("{}-{}", self.verb, self.noun)
    }
}

/// The full reflection-derived description of a generated module, the
/// input to one generation run. Read-only once loaded.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct CmdletModel {
    #[serde(default)]
    pub groups: Vec<VariantGroup>,
}

/// Load and parse a cmdlet model from a JSON file.
pub fn load_model(path: &Path) -> Result<CmdletModel> {
    if !path.exists() {
        bail!("model file not found: {}", path.display());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let model: CmdletModel = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse {}", path.display()))?;
    Ok(model)
}


#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::*;

    #[test]
    fn load_model_parses_minimal_document() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("model.json");
        fs::write(
            &path,
            r#"{
  "groups": [
    {
      "verb": "Get",
      "noun": "Widget",
      "variants": [
        {
          "variant_name": "List",
          "private_module_name": "Widget.private",
          "private_cmdlet_name": "Get-Widget_List",
          "parameters": [
            { "name": "Name", "type_name": "System.String", "mandatory": true, "position": 0 }
          ]
        }
      ]
    }
  ]
}"#,
        )
        .expect("write model");

        let model = load_model(&path).expect("load model");
        assert_eq!(model.groups.len(), 1);
        let group = &model.groups[0];
        assert_eq!(group.cmdlet_name(), "Get-Widget");
        assert_eq!(group.variants[0].parameters[0].position, Some(0));
        assert!(group.variants[0].parameters[0].mandatory);
        assert!(!group.supports_should_process);
        assert!(group.default_parameter_set_name.is_none());
    }

    #[test]
    fn load_model_missing_file_is_an_error() {
        let temp = tempdir().expect("tempdir");
        let error = load_model(&temp.path().join("absent.json")).expect_err("missing file");
        assert!(error.to_string().contains("model file not found"));
    }

    #[test]
    fn load_model_rejects_malformed_json() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("model.json");
        fs::write(&path, "{ not json").expect("write model");
        assert!(load_model(&path).is_err());
    }
}
