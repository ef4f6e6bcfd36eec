//! Runtime configuration and its environment loader.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use boss_core::GameConfig;
use directories::ProjectDirs;

/// Runtime configuration shared across the orchestrator and workers.
#[derive(Clone, Debug)]
pub struct RuntimeConfig {
    pub game: GameConfig,
    pub command_buffer: usize,
    pub event_buffer: usize,
    /// Ticker cadence. Zero disables the ticker task.
    pub tick_interval_ms: u64,
    /// Fixed RNG seed; drawn at startup when absent.
    pub rng_seed: Option<u64>,
    /// Where the file store keeps its data.
    pub data_dir: Option<PathBuf>,
    /// Channel owner, always treated as admin.
    pub owner: Option<String>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            game: GameConfig::default(),
            command_buffer: Self::DEFAULT_COMMAND_BUFFER,
            event_buffer: Self::DEFAULT_EVENT_BUFFER,
            tick_interval_ms: Self::DEFAULT_TICK_INTERVAL_MS,
            rng_seed: None,
            data_dir: None,
            owner: None,
        }
    }
}

impl RuntimeConfig {
    pub const DEFAULT_COMMAND_BUFFER: usize = 64;
    pub const DEFAULT_EVENT_BUFFER: usize = 256;
    pub const DEFAULT_TICK_INTERVAL_MS: u64 = 1_000;

    /// Construct configuration from process environment variables.
    ///
    /// Unset or unparsable variables keep their defaults. The game section is
    /// normalized afterwards, so out-of-range values are clamped.
    pub fn from_env() -> Self {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Same as [`RuntimeConfig::from_env`] with a custom variable source.
    pub fn from_vars<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Vars(lookup);
        let mut config = Self::default();
        let game = &mut config.game;

        if let Some(hp) = vars.parse("BOSS_MAX_HP") {
            game.boss.base_hp = hp;
        }
        if let Some(step) = vars.parse("PHASE_HP_STEP") {
            game.boss.phase_hp_step = step;
        }

        if let Some(start) = vars.parse("SKILL_START") {
            game.progression.skill_start = start;
        }
        if let Some(tries) = vars.parse("SKILL_BASE_TRIES") {
            game.progression.skill_base_tries = tries;
        }
        if let Some(growth) = vars.parse("SKILL_GROWTH") {
            game.progression.skill_growth = growth;
        }
        if let Some(tries) = vars.parse("SKILL_TRY_PER_ATTACK") {
            game.progression.skill_tries_per_attack = tries;
        }

        let combat = &mut game.combat;
        if let Some(damage) = vars.parse("CHAT_ATTACK_DAMAGE") {
            combat.attack_damage = damage;
        }
        if let Some(ms) = vars.parse("ATTACK_COOLDOWN_MS") {
            combat.attack_cooldown_ms = ms;
        }
        if let Some(ms) = vars.parse("HEAL_COOLDOWN_MS") {
            combat.heal_cooldown_ms = ms;
        }
        if let Some(ms) = vars.parse("UE_COOLDOWN_MS") {
            combat.charged_cooldown_ms = ms;
        }

        let events = &mut game.events;
        if let Some(ms) = vars.parse("EVENT_MIN_DURATION_MS") {
            events.min_duration_ms = ms;
        }
        if let Some(ms) = vars.parse("EVENT_MAX_DURATION_MS") {
            events.max_duration_ms = ms;
        }
        if let Some(ms) = vars.parse("EVENT_BREAK_MIN_MS") {
            events.break_min_ms = ms;
        }
        if let Some(ms) = vars.parse("EVENT_BREAK_MAX_MS") {
            events.break_max_ms = ms;
        }
        if let Some(mult) = vars.parse("SHIELD_DMG_MULT") {
            events.shield_damage_mult = mult;
        }
        if let Some(target) = vars.parse("MARK_CHARGE_TARGET") {
            events.mark_charge_target = target;
        }
        if let Some(xp) = vars.parse("MARK_BONUS_XP") {
            events.mark_bonus_xp = xp;
        }
        if let Some(mult) = vars.parse("VULNERABLE_DMG_MULT") {
            events.vulnerable_damage_mult = mult;
        }
        if let Some(ms) = vars.parse("MARK_ACTIVE_WINDOW_MS") {
            events.mark_active_window_ms = ms;
        }
        if let Some(ms) = vars.parse("EXHAUST_WINDOW_MS") {
            events.exhaust_window_ms = ms;
        }
        if let Some(mult) = vars.parse("DMG_MULT_EXHAUSTED") {
            events.exhausted_damage_mult = mult;
        }
        if let Some(mult) = vars.parse("XP_MULT_EXHAUSTED") {
            events.exhausted_xp_mult = mult;
        }
        if let Some(hp) = vars.parse("TOTEM_BASE_HP") {
            events.totem_base_hp = hp;
        }
        if let Some(hp) = vars.parse("TOTEM_HP_PER_PHASE") {
            events.totem_hp_per_phase = hp;
        }
        if let Some(mult) = vars.parse("TOTEM_BOSS_REDUCTION") {
            events.totem_boss_reduction = mult;
        }
        if let Some(xp) = vars.parse("TOTEM_XP_EXTRA") {
            events.totem_xp_extra = xp;
        }
        if let Some(live) = vars.flag("STREAM_LIVE_DEFAULT") {
            events.stream_live_default = live;
        }

        let tribute = &mut game.tribute;
        if let Some(damage) = vars.parse("FOLLOW_DAMAGE") {
            tribute.follow_damage = damage;
        }
        if let Some(damage) = vars.parse("SUB_DAMAGE") {
            tribute.sub_damage = damage;
        }
        if let Some(mult) = vars.parse("DONATE_DMG_MULT") {
            tribute.donate_damage_mult = mult;
        }
        if let Some(enabled) = vars.flag("CHAOS_ENABLED") {
            tribute.chaos_enabled = enabled;
        }
        if let Some(threshold) = vars.parse("CHAOS_DONATE_THRESHOLD") {
            tribute.chaos_threshold = threshold;
        }

        config.game = config.game.normalized();

        if let Some(capacity) = vars.parse::<usize>("COMMAND_BUFFER") {
            config.command_buffer = capacity.max(1);
        }
        if let Some(capacity) = vars.parse::<usize>("EVENT_BUFFER") {
            config.event_buffer = capacity.max(1);
        }
        if let Some(ms) = vars.parse("TICK_INTERVAL_MS") {
            config.tick_interval_ms = ms;
        }
        config.rng_seed = vars.parse("RNG_SEED");
        config.data_dir = vars.text("DATA_DIR").map(PathBuf::from);
        config.owner = vars.text("ADMIN_USERNAME");

        config
    }

    /// Configured data directory, or the per-user data directory.
    pub fn resolved_data_dir(&self) -> Option<PathBuf> {
        self.data_dir.clone().or_else(|| {
            ProjectDirs::from("", "", "boss-fight").map(|dirs| dirs.data_dir().to_path_buf())
        })
    }
}

struct Vars<F>(F);

impl<F> Vars<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn text(&self, key: &str) -> Option<String> {
        (self.0)(key)
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty())
    }

    fn parse<T: FromStr>(&self, key: &str) -> Option<T> {
        self.text(key)?.parse().ok()
    }

    fn flag(&self, key: &str) -> Option<bool> {
        parse_bool(&self.text(key)?)
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" | "on" => Some(true),
        "0" | "false" | "no" | "n" | "off" => Some(false),
        _ => None,
    }
}
