//! Headless raid simulator.
//!
//! Spins up a runtime with a manual clock and an in-memory store, then lets a
//! crowd of simulated viewers hammer the boss one simulated second at a time.

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::broadcast::error::TryRecvError;

use boss_core::{ActionKind, EventMeta, PlayerStore, SessionEvent};
use boss_runtime::{
    Event, FilePlayerStore, InMemoryPlayerStore, ManualClock, Runtime, RuntimeConfig,
    RuntimeHandle, Topic,
};

const SECOND_MS: u64 = 1_000;
const START_MS: u64 = 1_700_000_000_000;

/// Run a headless raid with simulated viewers
#[derive(Parser, Debug)]
pub struct Raid {
    /// Number of simulated viewers
    #[arg(long, default_value_t = 50)]
    pub viewers: u32,

    /// Simulated stream length in seconds (one tick per second)
    #[arg(long, default_value_t = 1800)]
    pub seconds: u64,

    /// Seed for both the session and the viewers (default: RNG_SEED or random)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Chance that a viewer acts in a given second
    #[arg(long, default_value_t = 0.2)]
    pub activity: f64,

    /// Keep player records in the data directory (DATA_DIR or the per-user
    /// data directory) instead of memory
    #[arg(long)]
    pub persist: bool,
}

/// What happened during a raid.
#[derive(Debug, Default)]
pub struct RaidTally {
    pub actions: u64,
    pub cooldown_blocked: u64,
    pub rejected: BTreeMap<&'static str, u64>,
    pub defeats: Vec<(u64, u32, String)>,
    pub events_started: BTreeMap<String, u64>,
    pub marks_broken: u64,
    pub totems_destroyed: u64,
    pub lagged: u64,
}

impl RaidTally {
    fn record(&mut self, second: u64, event: &SessionEvent) {
        match event {
            SessionEvent::BossDefeated { phase, by } => {
                println!(
                    "{} t={}s phase {} cleared by {}",
                    style("[raid]").magenta().bold(),
                    second,
                    style(phase).green(),
                    style(by).cyan()
                );
                self.defeats.push((second, *phase, by.clone()));
            }
            SessionEvent::EventStarted { kind, .. } => {
                println!(
                    "{} t={}s {}",
                    style("[raid]").magenta().bold(),
                    second,
                    kind.title()
                );
                *self.events_started.entry(kind.to_string()).or_default() += 1;
            }
            SessionEvent::MarkBroken { .. } => self.marks_broken += 1,
            SessionEvent::TotemDestroyed { .. } => self.totems_destroyed += 1,
            _ => {}
        }
    }
}

impl Raid {
    pub async fn execute(self) -> Result<()> {
        let mut config = RuntimeConfig::from_env();
        let seed = self
            .seed
            .or(config.rng_seed)
            .unwrap_or_else(rand::random);
        config.rng_seed = Some(seed);

        let store: Arc<dyn PlayerStore + Send + Sync> = if self.persist {
            let dir = config
                .resolved_data_dir()
                .context("no data directory available; set DATA_DIR")?;
            let store = FilePlayerStore::open(&dir)
                .with_context(|| format!("opening player store in {}", dir.display()))?;
            tracing::info!(path = %store.path().display(), "raid persists player records");
            Arc::new(store)
        } else {
            Arc::new(InMemoryPlayerStore::new())
        };
        let clock = ManualClock::new(START_MS);
        let runtime = Runtime::builder()
            .config(config)
            .store(store)
            .clock(Arc::new(clock.clone()))
            .ticker(false)
            .build()
            .await?;

        println!(
            "{} viewers={} seconds={} seed={}",
            style("[raid]").magenta().bold(),
            self.viewers,
            self.seconds,
            seed
        );

        let handle = runtime.handle();
        let tally = self.run(&handle, &clock, seed).await?;
        let snapshot = handle.snapshot().await?;
        drop(handle);
        runtime.shutdown().await?;

        println!();
        println!("{}", style("Summary").bold().underlined());
        println!(
            "  phase {} with {}/{} HP",
            snapshot.phase, snapshot.boss_hp, snapshot.boss_max_hp
        );
        println!(
            "  actions={} cooldown_blocked={} lagged_notices={}",
            tally.actions, tally.cooldown_blocked, tally.lagged
        );
        for (reason, count) in &tally.rejected {
            println!("  rejected {reason}: {count}");
        }
        println!("  phases cleared: {}", tally.defeats.len());
        for (kind, count) in &tally.events_started {
            println!("  event {kind}: {count}");
        }
        println!(
            "  marks broken={} totems destroyed={}",
            tally.marks_broken, tally.totems_destroyed
        );
        if !snapshot.phase_winners.is_empty() {
            println!("{}", style("Last phase winners").bold());
            for winner in &snapshot.phase_winners {
                println!(
                    "  {} xp={} level={} skill={}",
                    style(&winner.username).cyan(),
                    winner.xp,
                    winner.level,
                    winner.skill
                );
            }
        }
        println!("{}", style("Leaderboard").bold());
        for row in &snapshot.leaderboards.top_xp {
            println!(
                "  {} xp={} level={}",
                style(&row.username).cyan(),
                row.xp,
                row.level
            );
        }
        println!("{}", style("Top damage today").bold());
        for row in &snapshot.leaderboards.top_damage {
            println!("  {} dmg={}", style(&row.username).cyan(), row.damage);
        }
        Ok(())
    }

    async fn run(&self, handle: &RuntimeHandle, clock: &ManualClock, seed: u64) -> Result<RaidTally> {
        let mut notices = handle.subscribe(Topic::Session);
        let mut crowd = StdRng::seed_from_u64(seed);
        let viewers: Vec<_> = (1..=self.viewers)
            .map(|n| {
                let name = format!("viewer{n:03}");
                let subscriber = n % 5 == 0;
                handle.actor(&name, "viewer", subscriber)
            })
            .collect();
        let activity = self.activity.clamp(0.0, 1.0);
        let mut tally = RaidTally::default();

        for second in 1..=self.seconds {
            clock.advance(SECOND_MS);
            handle.tick().await?;

            let totem_up = handle
                .snapshot()
                .await?
                .active_event
                .is_some_and(|event| {
                    matches!(event.meta, EventMeta::Totem(totem) if totem.is_standing())
                });

            for viewer in &viewers {
                if !crowd.gen_bool(activity) {
                    continue;
                }
                let action = pick_action(&mut crowd, totem_up);
                match handle.resolve_action(viewer.clone(), action).await {
                    Ok(outcome) if outcome.is_applied() => tally.actions += 1,
                    Ok(_) => tally.cooldown_blocked += 1,
                    Err(err) => {
                        let Some(reason) = err.action_error().map(|e| e.reason_code()) else {
                            return Err(err.into());
                        };
                        *tally.rejected.entry(reason).or_default() += 1;
                    }
                }
            }

            loop {
                match notices.try_recv() {
                    Ok(Event::Session(event)) => tally.record(second, &event),
                    Ok(_) => {}
                    Err(TryRecvError::Lagged(skipped)) => tally.lagged += skipped,
                    Err(_) => break,
                }
            }
        }
        Ok(tally)
    }
}

fn pick_action(rng: &mut impl Rng, totem_up: bool) -> ActionKind {
    if totem_up && rng.gen_bool(0.6) {
        return ActionKind::Totem;
    }
    match rng.gen_range(0..100) {
        0..70 => ActionKind::Attack,
        70..85 => ActionKind::Ue,
        _ => ActionKind::Heal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crowd_only_strikes_the_totem_while_it_stands() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..500 {
            assert_ne!(pick_action(&mut rng, false), ActionKind::Totem);
        }
        let strikes = (0..500)
            .filter(|_| pick_action(&mut rng, true) == ActionKind::Totem)
            .count();
        assert!(strikes > 200);
    }

    #[tokio::test]
    async fn short_raid_clears_the_first_phase() {
        let raid = Raid {
            viewers: 40,
            seconds: 1500,
            seed: Some(5),
            activity: 1.0,
            persist: false,
        };
        let store = Arc::new(InMemoryPlayerStore::new());
        let clock = ManualClock::new(START_MS);
        let runtime = Runtime::builder()
            .store(store.clone())
            .clock(Arc::new(clock.clone()))
            .rng_seed(5)
            .ticker(false)
            .build()
            .await
            .expect("runtime");
        let handle = runtime.handle();

        let tally = raid.run(&handle, &clock, 5).await.expect("raid");

        assert!(tally.actions > 0);
        assert!(!tally.defeats.is_empty());
        assert_eq!(tally.defeats[0].1, 1);
        assert!(handle.snapshot().await.expect("snapshot").phase >= 2);
        assert!(store.len() <= 40);
    }
}
