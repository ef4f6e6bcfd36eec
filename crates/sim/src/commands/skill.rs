//! Skill curve simulator.

use anyhow::Result;
use clap::Parser;
use console::style;

use boss_core::{ProgressionConfig, award_skill, required_skill_tries};
use boss_runtime::RuntimeConfig;

/// Print skill progression over a run of attacks
#[derive(Parser, Debug)]
pub struct Skill {
    /// Number of attacks to simulate
    #[arg(long, default_value_t = 1000)]
    pub attacks: u32,

    /// Print a line every N attacks (skill ups are always printed)
    #[arg(long, default_value_t = 100)]
    pub log_every: u32,
}

/// One printed line of the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkillLine {
    pub attack: u32,
    pub skill: u32,
    pub skill_tries: u32,
    pub required: u32,
    pub total_ups: u32,
}

impl Skill {
    pub fn execute(self) -> Result<()> {
        let progression = RuntimeConfig::from_env().game.progression;
        let attacks = self.attacks.max(1);

        println!(
            "{} attacks={} tries_per_attack={}",
            style("[skill-sim]").cyan().bold(),
            attacks,
            progression.skill_tries_per_attack
        );
        println!(
            "{} start={} base_tries={} growth={}",
            style("[skill-sim]").cyan().bold(),
            progression.skill_start,
            progression.skill_base_tries,
            progression.skill_growth
        );

        for line in simulate(&progression, attacks, self.log_every) {
            println!(
                "{} attack={} skill={} tries={}/{} skillUps={}",
                style("[skill-sim]").cyan().bold(),
                line.attack,
                style(line.skill).green(),
                line.skill_tries,
                line.required,
                line.total_ups
            );
        }
        Ok(())
    }
}

/// Runs `attacks` attacks from a fresh record and returns the lines worth
/// printing: every `log_every`-th attack, every skill up, and the last one.
pub fn simulate(progression: &ProgressionConfig, attacks: u32, log_every: u32) -> Vec<SkillLine> {
    let log_every = log_every.max(1);
    let mut skill = progression.skill_start;
    let mut skill_tries = 0;
    let mut total_ups = 0;
    let mut lines = Vec::new();

    for attack in 1..=attacks {
        let next = award_skill(
            skill,
            skill_tries,
            progression.skill_tries_per_attack,
            progression,
        );
        skill = next.skill;
        skill_tries = next.skill_tries;
        total_ups += next.skill_ups;

        if attack % log_every == 0 || next.skill_ups > 0 || attack == attacks {
            lines.push(SkillLine {
                attack,
                skill,
                skill_tries,
                required: required_skill_tries(skill, progression),
                total_ups,
            });
        }
    }
    lines
}
