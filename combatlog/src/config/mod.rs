//! Plugin configuration
//!
//! Settings are layered with figment: built-in defaults, then a YAML file,
//! then `COMBATLOG_*` environment variables (`COMBATLOG_COMBAT_TIME=45`).
//! A missing or malformed field falls back to its default; configuration
//! problems never reach the combat or death paths.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;
use tracing::warn;

/// Environment variable prefix for overrides
pub const ENV_PREFIX: &str = "COMBATLOG_";

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    NotFound(PathBuf),

    #[error("invalid configuration: {0}")]
    Invalid(#[from] Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(e: figment::Error) -> Self {
        ConfigError::Invalid(Box::new(e))
    }
}

/// Who counts as the killer when the death event and combat history disagree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum KillerAttribution {
    /// The attacker carried by the death event; recent aggressor only as fallback
    #[default]
    Attacker,
    /// A different player still in combat with the victim wins over the event attacker
    RecentAggressor,
}

/// Largest gravestone container (a double chest)
pub const MAX_GRAVESTONE_CAPACITY: usize = 54;
/// Largest horizontal gravestone search radius
pub const MAX_SEARCH_RADIUS: u32 = 16;
/// Largest vertical gravestone search radius
pub const MAX_SEARCH_HEIGHT: u32 = 16;

/// One enchantment on a configured extra item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnchantEntry {
    pub id: i32,
    pub level: i32,
}

/// Accepted shapes of an `enchants` list entry
#[derive(Deserialize)]
#[serde(untagged)]
enum EnchantRepr {
    /// `{ id: 9, level: 5 }`
    Entry(EnchantEntry),
    /// `{ 9: 5 }`, possibly several enchantments in one map
    Levels(BTreeMap<String, i32>),
}

/// Flatten `enchants` entries into id order within each map
fn deserialize_enchants<'de, D>(deserializer: D) -> Result<Vec<EnchantEntry>, D::Error>
where
    D: Deserializer<'de>,
{
    let mut enchants = Vec::new();
    for repr in Vec::<EnchantRepr>::deserialize(deserializer)? {
        match repr {
            EnchantRepr::Entry(entry) => enchants.push(entry),
            EnchantRepr::Levels(levels) => {
                let mut entries = levels
                    .into_iter()
                    .map(|(id, level)| {
                        id.trim()
                            .parse()
                            .map(|id| EnchantEntry { id, level })
                            .map_err(|_| D::Error::custom(format!("invalid enchantment id '{}'", id)))
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                entries.sort_by_key(|e| e.id);
                enchants.extend(entries);
            }
        }
    }
    Ok(enchants)
}

/// Static item injected into every gravestone
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExtraItem {
    pub id: i32,
    pub aux: i32,
    pub count: i32,
    /// Empty for no custom name
    pub custom_name: String,
    pub lore: Vec<String>,
    #[serde(deserialize_with = "deserialize_enchants")]
    pub enchants: Vec<EnchantEntry>,
}

/// Combat logger settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// When false, operators are never flagged
    pub operators_can_be_in_combat: bool,
    /// Combat duration in seconds
    pub combat_time: u32,
    pub combat_time_message_enabled: bool,
    pub initiated_combat_message: String,
    /// `%time%` is replaced by the remaining seconds
    pub combat_time_message: String,
    pub ended_combat_message: String,
    /// `%name%` is replaced by the player's name
    pub logout_while_in_combat_message: String,
    /// `%victim%`, `%killer%` and `%health%` (killer's health)
    pub kill_message: String,
    pub use_resource_pack_glyphs_in_death_message: bool,
    pub execute_death_commands: bool,
    /// Runs as the victim; `%name%` is the victim
    pub death_command: String,
    /// Runs as the killer; `%name%` is the killer, `%victim%` the victim
    pub killer_command: String,
    /// Commands and kill messages only for victims who died in combat
    pub death_sequence_requires_combat: bool,
    pub killer_attribution: KillerAttribution,
    pub clear_killer_combat_on_kill: bool,
    pub set_chest_gravestone_on_death: bool,
    pub set_chest_gravestone_on_log: bool,
    pub gravestone_capacity: usize,
    /// Horizontal search radius around the death position
    pub gravestone_search_radius: u32,
    /// Vertical search radius around the death position
    pub gravestone_search_height: u32,
    pub enable_extra_items_for_chest_gravestone: bool,
    pub extra_items: Vec<ExtraItem>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            operators_can_be_in_combat: true,
            combat_time: 30,
            combat_time_message_enabled: true,
            initiated_combat_message: "You are now in combat. Do not log out!".to_string(),
            combat_time_message: "You are in combat for %time% more seconds!".to_string(),
            ended_combat_message: "You are no longer in combat.".to_string(),
            logout_while_in_combat_message: "%name% logged out while in combat!".to_string(),
            kill_message: "%victim% was slain by %killer% %health%".to_string(),
            use_resource_pack_glyphs_in_death_message: false,
            execute_death_commands: true,
            death_command: "function death".to_string(),
            killer_command: "function killer".to_string(),
            death_sequence_requires_combat: true,
            killer_attribution: KillerAttribution::Attacker,
            clear_killer_combat_on_kill: false,
            set_chest_gravestone_on_death: false,
            set_chest_gravestone_on_log: false,
            gravestone_capacity: 54,
            gravestone_search_radius: 4,
            gravestone_search_height: 3,
            enable_extra_items_for_chest_gravestone: false,
            extra_items: Vec::new(),
        }
    }
}

/// `COMBAT_TIME` -> `combatTime`
fn env_key_to_camel(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut upper = false;
    for c in key.chars() {
        if c == '_' {
            upper = !out.is_empty();
            continue;
        }
        if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.extend(c.to_lowercase());
        }
    }
    out
}

/// Extract one field, keeping the default when it is malformed
fn field_or<T: DeserializeOwned>(figment: &Figment, key: &str, default: T) -> T {
    match figment.extract_inner(key) {
        Ok(value) => value,
        Err(e) => {
            warn!("Config field '{}' is invalid, using default: {}", key, e);
            default
        }
    }
}

impl Settings {
    /// Layered configuration sources for a config file
    pub fn figment(path: impl AsRef<Path>) -> Figment {
        Figment::from(Serialized::defaults(Settings::default()))
            .merge(Yaml::file(path.as_ref()))
            .merge(
                Env::prefixed(ENV_PREFIX)
                    .map(|key| env_key_to_camel(key.as_str()).into())
                    .lowercase(false),
            )
    }

    /// Strict load: the file must exist and every field must be valid
    pub fn try_load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let settings: Settings = Self::figment(path).extract()?;
        Ok(settings.normalized())
    }

    /// Lenient load used at plugin enable.
    ///
    /// A missing file yields defaults; malformed fields fall back one by one.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            warn!("Config file {} not found, using defaults", path.display());
        }
        Self::from_figment(&Self::figment(path))
    }

    /// Extract settings, falling back per field on errors
    pub fn from_figment(figment: &Figment) -> Self {
        match figment.extract::<Settings>() {
            Ok(settings) => settings.normalized(),
            Err(e) => {
                warn!("Config has invalid fields, falling back per field: {}", e);
                Self::from_fields(figment).normalized()
            }
        }
    }

    fn from_fields(figment: &Figment) -> Self {
        let d = Settings::default();
        Self {
            operators_can_be_in_combat: field_or(
                figment,
                "operatorsCanBeInCombat",
                d.operators_can_be_in_combat,
            ),
            combat_time: field_or(figment, "combatTime", d.combat_time),
            combat_time_message_enabled: field_or(
                figment,
                "combatTimeMessageEnabled",
                d.combat_time_message_enabled,
            ),
            initiated_combat_message: field_or(
                figment,
                "initiatedCombatMessage",
                d.initiated_combat_message,
            ),
            combat_time_message: field_or(figment, "combatTimeMessage", d.combat_time_message),
            ended_combat_message: field_or(figment, "endedCombatMessage", d.ended_combat_message),
            logout_while_in_combat_message: field_or(
                figment,
                "logoutWhileInCombatMessage",
                d.logout_while_in_combat_message,
            ),
            kill_message: field_or(figment, "killMessage", d.kill_message),
            use_resource_pack_glyphs_in_death_message: field_or(
                figment,
                "useResourcePackGlyphsInDeathMessage",
                d.use_resource_pack_glyphs_in_death_message,
            ),
            execute_death_commands: field_or(
                figment,
                "executeDeathCommands",
                d.execute_death_commands,
            ),
            death_command: field_or(figment, "deathCommand", d.death_command),
            killer_command: field_or(figment, "killerCommand", d.killer_command),
            death_sequence_requires_combat: field_or(
                figment,
                "deathSequenceRequiresCombat",
                d.death_sequence_requires_combat,
            ),
            killer_attribution: field_or(figment, "killerAttribution", d.killer_attribution),
            clear_killer_combat_on_kill: field_or(
                figment,
                "clearKillerCombatOnKill",
                d.clear_killer_combat_on_kill,
            ),
            set_chest_gravestone_on_death: field_or(
                figment,
                "setChestGravestoneOnDeath",
                d.set_chest_gravestone_on_death,
            ),
            set_chest_gravestone_on_log: field_or(
                figment,
                "setChestGravestoneOnLog",
                d.set_chest_gravestone_on_log,
            ),
            gravestone_capacity: field_or(figment, "gravestoneCapacity", d.gravestone_capacity),
            gravestone_search_radius: field_or(
                figment,
                "gravestoneSearchRadius",
                d.gravestone_search_radius,
            ),
            gravestone_search_height: field_or(
                figment,
                "gravestoneSearchHeight",
                d.gravestone_search_height,
            ),
            enable_extra_items_for_chest_gravestone: field_or(
                figment,
                "enableExtraItemsForChestGravestone",
                d.enable_extra_items_for_chest_gravestone,
            ),
            extra_items: field_or(figment, "extraItems", d.extra_items),
        }
    }

    /// Replace values that parse but cannot work
    pub fn normalized(mut self) -> Self {
        let d = Settings::default();
        if self.combat_time == 0 {
            warn!("combatTime must be positive, using {}", d.combat_time);
            self.combat_time = d.combat_time;
        }
        if self.gravestone_capacity == 0 {
            warn!(
                "gravestoneCapacity must be positive, using {}",
                d.gravestone_capacity
            );
            self.gravestone_capacity = d.gravestone_capacity;
        }
        if self.gravestone_capacity > MAX_GRAVESTONE_CAPACITY {
            warn!(
                "gravestoneCapacity {} too large, using {}",
                self.gravestone_capacity, MAX_GRAVESTONE_CAPACITY
            );
            self.gravestone_capacity = MAX_GRAVESTONE_CAPACITY;
        }
        if self.gravestone_search_radius > MAX_SEARCH_RADIUS {
            warn!(
                "gravestoneSearchRadius {} too large, using {}",
                self.gravestone_search_radius, MAX_SEARCH_RADIUS
            );
            self.gravestone_search_radius = MAX_SEARCH_RADIUS;
        }
        if self.gravestone_search_height > MAX_SEARCH_HEIGHT {
            warn!(
                "gravestoneSearchHeight {} too large, using {}",
                self.gravestone_search_height, MAX_SEARCH_HEIGHT
            );
            self.gravestone_search_height = MAX_SEARCH_HEIGHT;
        }
        self
    }
}
