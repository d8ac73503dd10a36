//! Role and skill definitions and the immutable catalog that holds them.
//!
//! A [`Catalog`] is built once at startup (either [`Catalog::builtin`] or a
//! TOML file via [`Catalog::load`]) and shared read-only for the lifetime of
//! the process.

use crate::error::CatalogError;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// Declarative description of a task a role can perform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillDefinition {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Instruction template handed to the generation model. Never exposed publicly.
    pub prompt_instructions: String,
    /// Invocation without non-blank caller text is rejected.
    #[serde(default)]
    pub requires_user_input: bool,
    /// Inject recent conversation history into the skill prompt.
    #[serde(default)]
    pub include_history: bool,
    /// Hint shown to callers for the free-text input.
    #[serde(default)]
    pub placeholder: Option<String>,
}

/// Metadata that informs how the generation model plays a character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleDefinition {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub alias: Option<String>,
    #[serde(default)]
    pub tagline: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub background: String,
    #[serde(default)]
    pub style: String,
    #[serde(default)]
    pub knowledge_focus: Vec<String>,
    #[serde(default)]
    pub sample_questions: Vec<String>,
    /// Skill ids in display order.
    #[serde(default)]
    pub skills: Vec<String>,
}

impl RoleDefinition {
    /// The alias, or the display name when no alias is set.
    pub fn alias_or_name(&self) -> &str {
        self.alias
            .as_deref()
            .filter(|alias| !alias.is_empty())
            .unwrap_or(&self.name)
    }
}

/// Public projection of a skill: no prompt internals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicSkillInfo {
    pub id: String,
    pub name: String,
    pub description: String,
    pub requires_user_input: bool,
    pub placeholder: Option<String>,
}

impl From<&SkillDefinition> for PublicSkillInfo {
    fn from(skill: &SkillDefinition) -> Self {
        Self {
            id: skill.id.clone(),
            name: skill.name.clone(),
            description: skill.description.clone(),
            requires_user_input: skill.requires_user_input,
            placeholder: skill.placeholder.clone(),
        }
    }
}

/// Public projection of a role with its skills resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicRoleInfo {
    pub id: String,
    pub name: String,
    pub alias: Option<String>,
    pub tagline: Option<String>,
    pub summary: Option<String>,
    pub background: String,
    pub style: String,
    pub knowledge_focus: Vec<String>,
    pub sample_questions: Vec<String>,
    pub skills: Vec<PublicSkillInfo>,
}

/// On-disk shape of a catalog file.
#[derive(Debug, Deserialize)]
struct CatalogFile {
    default_role_id: String,
    #[serde(default)]
    roles: Vec<RoleDefinition>,
    #[serde(default)]
    skills: Vec<SkillDefinition>,
}

/// Immutable registry of roles and skills.
#[derive(Debug, Clone)]
pub struct Catalog {
    roles: Vec<RoleDefinition>,
    role_index: HashMap<String, usize>,
    skills: HashMap<String, SkillDefinition>,
    default_role_id: String,
}

impl Catalog {
    /// Builds a catalog, rejecting duplicate ids and a dangling default role.
    ///
    /// Roles that reference unknown skills are accepted; those references are
    /// skipped by [`Catalog::public_role_info`].
    pub fn new(
        roles: Vec<RoleDefinition>,
        skills: Vec<SkillDefinition>,
        default_role_id: impl Into<String>,
    ) -> Result<Self, CatalogError> {
        let default_role_id = default_role_id.into();

        let mut role_index = HashMap::with_capacity(roles.len());
        for (position, role) in roles.iter().enumerate() {
            if role_index.insert(role.id.clone(), position).is_some() {
                return Err(CatalogError::Invalid(format!(
                    "duplicate role id: {}",
                    role.id
                )));
            }
        }

        let mut skill_map = HashMap::with_capacity(skills.len());
        for skill in skills {
            if skill_map.contains_key(&skill.id) {
                return Err(CatalogError::Invalid(format!(
                    "duplicate skill id: {}",
                    skill.id
                )));
            }
            skill_map.insert(skill.id.clone(), skill);
        }

        if !role_index.contains_key(&default_role_id) {
            return Err(CatalogError::Invalid(format!(
                "default role {} is not defined",
                default_role_id
            )));
        }

        let catalog = Self {
            roles,
            role_index,
            skills: skill_map,
            default_role_id,
        };
        catalog.warn_dangling_skills();
        Ok(catalog)
    }

    /// Parses a catalog from TOML text.
    pub fn from_toml_str(contents: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = toml::from_str(contents)?;
        Self::new(file.roles, file.skills, file.default_role_id)
    }

    /// Reads and parses a catalog file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        let catalog = Self::from_toml_str(&contents)?;
        tracing::info!(
            path = %path.as_ref().display(),
            roles = catalog.roles.len(),
            skills = catalog.skills.len(),
            "loaded role catalog"
        );
        Ok(catalog)
    }

    /// Assembles a catalog without validation; for compiled-in data.
    pub(crate) fn from_parts(
        roles: Vec<RoleDefinition>,
        skills: Vec<SkillDefinition>,
        default_role_id: &str,
    ) -> Self {
        let role_index = roles
            .iter()
            .enumerate()
            .map(|(position, role)| (role.id.clone(), position))
            .collect();
        let skills = skills
            .into_iter()
            .map(|skill| (skill.id.clone(), skill))
            .collect();
        Self {
            roles,
            role_index,
            skills,
            default_role_id: default_role_id.to_string(),
        }
    }

    fn warn_dangling_skills(&self) {
        for role in &self.roles {
            let mut seen = HashSet::new();
            for skill_id in &role.skills {
                if !self.skills.contains_key(skill_id) && seen.insert(skill_id) {
                    tracing::warn!(
                        role_id = %role.id,
                        skill_id = %skill_id,
                        "role references unknown skill; it will be hidden"
                    );
                }
            }
        }
    }

    /// All roles in definition order.
    pub fn list_roles(&self) -> &[RoleDefinition] {
        &self.roles
    }

    pub fn get_role(&self, role_id: &str) -> Result<&RoleDefinition, CatalogError> {
        self.role_index
            .get(role_id)
            .map(|&position| &self.roles[position])
            .ok_or_else(|| CatalogError::RoleNotFound(role_id.to_string()))
    }

    pub fn get_skill(&self, skill_id: &str) -> Result<&SkillDefinition, CatalogError> {
        self.skills
            .get(skill_id)
            .ok_or_else(|| CatalogError::SkillNotFound(skill_id.to_string()))
    }

    pub fn default_role_id(&self) -> &str {
        &self.default_role_id
    }

    /// Projects a role for external consumers.
    pub fn public_role_info(&self, role: &RoleDefinition) -> PublicRoleInfo {
        let skills = role
            .skills
            .iter()
            .filter_map(|skill_id| self.skills.get(skill_id))
            .map(PublicSkillInfo::from)
            .collect();

        PublicRoleInfo {
            id: role.id.clone(),
            name: role.name.clone(),
            alias: role.alias.clone(),
            tagline: role.tagline.clone(),
            summary: role.summary.clone(),
            background: role.background.clone(),
            style: role.style.clone(),
            knowledge_focus: role.knowledge_focus.clone(),
            sample_questions: role.sample_questions.clone(),
            skills,
        }
    }
}
